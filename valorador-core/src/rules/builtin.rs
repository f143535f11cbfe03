//! Built-in detector bank for the researcher-category valorador.
//!
//! Patterns target normalized Spanish CV text (lower-case, no accents).
//! Every rule here is registered under exactly one rubric key; see
//! [`crate::rubric::builtin_rubric`] for the matching rubric rows.
//!
//! Known limitation: nothing prevents one phrase from satisfying detectors of
//! two different items (e.g. "convenio de asistencia tecnica" feeds both
//! extension:transferencia and servicios:tecnicos). Within a single item the
//! `max` combine avoids counting the same achievement twice.

use super::{count, distinct, has, num, years, DetectorRule, SignalRule};

/// Evidence that a credential belongs to the CV owner: a degree title, an
/// institution or a year somewhere nearby.
const CREDENTIAL_CONTEXT: &[&str] = &[
    r"\btitulo\b",
    r"\buniversidad\b",
    r"\bfacultad\b",
    r"\binstituto\b",
    r"\b(?:19|20)\d{2}\b",
    r"\begres",
    r"\btesis\b",
    r"\bacreditad",
    r"\bconeau\b",
];

/// Phrases that put a credential in someone else's (or a committee's) context.
const FOREIGN_CONTEXT: &[&str] = &[
    r"\b(?:co)?director(?:a)? de\b",
    r"\b(?:co)?direccion de\b",
    r"\btribunal\b",
    r"\bjurado\b",
    r"\bcursando\b",
    r"\ben curso\b",
    r"\balumn[oa]s?\b",
    r"\bdocente\b",
    r"\bprofesor(?:a)? (?:de|en)\b",
    r"\bcoordinador(?:a)?\b",
    r"\bbecas?\b",
    r"\bevaluador(?:a)?\b",
];

const TEACHING_CONTEXT: &[&str] = &[
    r"\bdocente\b",
    r"\bdict",
    r"\bprofesor",
    r"\bcoordin",
    r"\bdirector",
];

/// The full built-in bank, in rubric order.
pub fn builtin_detectors() -> Vec<DetectorRule> {
    let mut rules = Vec::with_capacity(54);
    rules.extend(formacion());
    rules.extend(cargos());
    rules.extend(ciencia_y_tecnologia());
    rules.extend(producciones());
    rules.extend(otros());
    rules
}

fn credential(pattern: &str) -> SignalRule {
    has(pattern)
        .within(80)
        .requiring(CREDENTIAL_CONTEXT)
        .excluding_before(FOREIGN_CONTEXT)
}

/// Per-year teaching positions: an explicit "N anos", else the year ranges on
/// the lines mentioning the role, else one unit per mention.
fn per_year(key: &str, role: &str) -> DetectorRule {
    DetectorRule::fallback(
        key,
        vec![
            num(&format!(r"(?:{role})[^\n]{{0,80}}?\b(\d{{1,2}}) anos\b")),
            years(role),
            count(role),
        ],
    )
}

fn formacion() -> Vec<DetectorRule> {
    vec![
        DetectorRule::single(
            "formacion:doctorado",
            credential(r"\b(?:doctorado|doctor(?:a)? en|ph\.?\s?d)\b"),
        ),
        DetectorRule::single(
            "formacion:maestria",
            credential(r"\b(?:maestria|magister|master)\b").excluding_before(&[r"\bmaestrand"]),
        ),
        DetectorRule::single(
            "formacion:especializacion",
            count(r"\b(?:especializacion|especialista) en\b")
                .within(60)
                .excluding_before(FOREIGN_CONTEXT),
        ),
        DetectorRule::single(
            "formacion:diplomatura",
            count(r"\bdiplomatura\b")
                .within(40)
                .excluding_before(TEACHING_CONTEXT),
        ),
        DetectorRule::single(
            "formacion:segundo_grado",
            has(r"\bsegundo titulo\b|\bsegunda (?:carrera|licenciatura)\b|\bdoble titulacion\b"),
        ),
        DetectorRule::fallback(
            "formacion:cursos_posgrado",
            vec![
                num(r"\b(\d{1,3}) cursos de posgrado\b")
                    .within(40)
                    .excluding_before(TEACHING_CONTEXT),
                count(r"\bcursos? de posgrado\b")
                    .within(40)
                    .excluding_before(TEACHING_CONTEXT),
            ],
        ),
        DetectorRule::single(
            "formacion:posdoc",
            has(r"\b(?:pos-?doc(?:torado|toral)?|post-?doc(?:torado|toral)?|estancia posdoctoral)\b")
                .within(40)
                .excluding_before(&[
                    r"\bdirector(?:a)? de\b",
                    r"\bdireccion de\b",
                    r"\btutor(?:a)? de\b",
                ]),
        ),
        DetectorRule::single(
            "formacion:idiomas",
            distinct(r"\b(ingles|frances|portugues|aleman|italiano|chino|japones|ruso|catalan)\b")
                .within(60)
                .requiring(&[
                    r"\bintermedio\b",
                    r"\bavanzado\b",
                    r"\b[bc][12]\b",
                    r"\bfirst\b",
                    r"\bproficiency\b",
                    r"\btoefl\b",
                    r"\bielts\b",
                    r"\bdele\b",
                    r"\bdelf\b",
                    r"\bdalf\b",
                    r"\bcelpe",
                    r"\bgoethe\b",
                    r"\bcertificad",
                    r"\bnativo\b",
                    r"\bbilingue\b",
                ]),
        ),
        DetectorRule::single(
            "formacion:estancias",
            count(
                r"\b(?:estancias? (?:de investigacion|doctoral|posdoctoral|academica|de intercambio)|pasantias? de investigacion|visiting (?:scholar|researcher|professor))\b",
            ),
        ),
    ]
}

fn cargos() -> Vec<DetectorRule> {
    vec![
        per_year(
            "docencia:titular",
            r"\bprofesor(?:a)? titular\b|\bcatedratic[oa]\b",
        ),
        per_year("docencia:asociado", r"\bprofesor(?:a)? asociad[oa]\b"),
        per_year(
            "docencia:adjunto",
            r"\bprofesor(?:a)? adjunt[oa]\b|\badjunt[oa] (?:regular|interin[oa]|ordinari[oa])\b",
        ),
        per_year(
            "docencia:jtp",
            r"\bjefe de trabajos practicos\b|\bj\.?t\.?p\b|\bayudante\b",
        ),
        DetectorRule::fallback(
            "docencia:posgrado",
            vec![
                num(r"\bdict(?:ado|e|o)\s+(?:de\s+)?(\d{1,2}) cursos? de posgrado\b"),
                count(
                    r"\b(?:docente|profesor(?:a)?(?: invitad[oa])?|dictado)\s+(?:de|en)\s+(?:la\s+|el\s+)?(?:curso de\s+)?(?:posgrado|maestria|doctorado|especializacion)\b",
                ),
            ],
        ),
        DetectorRule::single(
            "gestion:rector",
            has(r"\brector(?:a)?\b")
                .within(40)
                .excluding_before(&[r"\basesor(?:a)?\b", r"\bsecretari[oa]\b", r"\bdelegad[oa]\b"]),
        ),
        DetectorRule::single(
            "gestion:vicerrector",
            has(r"\bvice-?rr?ector(?:a)?\b|\b(?:miembro|presidente|director(?:a)?) del directorio\b"),
        ),
        DetectorRule::single(
            "gestion:decano",
            has(r"\b(?:vice)?decan[oa]\b|\bdirector(?:a)? (?:del |de )?instituto\b"),
        ),
        DetectorRule::single(
            "gestion:secretario",
            has(
                r"\bsecretari[oa] (?:academic[oa]|de (?:investigacion|extension|ciencia y (?:tecnica|tecnologia)|posgrado|asuntos academicos))\b",
            ),
        ),
        DetectorRule::single(
            "gestion:coordinador",
            has(
                r"\bcoordinador(?:a)? del? (?:la )?(?:carrera|programa|licenciatura|maestria|doctorado|especializacion|ciclo)\b|\bdirector(?:a)? de (?:la )?carrera\b",
            ),
        ),
        DetectorRule::single(
            "gestion:consejero",
            has(
                r"\bconsejer[oa]\b|\bmiembro (?:titular |suplente )?del consejo (?:superior|directivo|academico|departamental)\b",
            ),
        ),
        DetectorRule::single(
            "otroscargos:funciones",
            count(
                r"\b(?:representante (?:institucional|ante)|delegad[oa] (?:institucional|ante)|responsable del? (?:area|laboratorio|departamento|programa)|director(?:a)? del? (?:departamento|laboratorio|centro)|jefe de (?:departamento|area|laboratorio)|funcion(?:es)? especial(?:es)?)\b",
            ),
        ),
    ]
}

fn ciencia_y_tecnologia() -> Vec<DetectorRule> {
    const DIRECTING: &str = r"\b(?:co)?direc(?:cion|tor(?:a)?) de";

    vec![
        DetectorRule::fallback(
            "ciencia:dir_doctorandos",
            vec![
                num(&format!(
                    r"{DIRECTING} (\d{{1,2}}) (?:tesis doctorales|doctorandos|tesistas (?:de doctorado|doctorales)|posdoc(?:torandos|s)?|becarios posdoctorales)\b"
                )),
                count(
                    r"\bdirec(?:cion|tor(?:a)?) de (?:la )?tesis (?:doctoral|de doctorado)\b|\bdirector(?:a)? de (?:becari[oa]s? )?posdoc(?:torales?|torandos?)?\b|\bdirector(?:a)? de doctorand[oa]s?\b",
                ),
            ],
        ),
        DetectorRule::fallback(
            "ciencia:dir_maestria",
            vec![
                num(&format!(
                    r"{DIRECTING} (\d{{1,2}}) (?:tesis de maestria|maestrandos|tesistas de maestria)\b"
                )),
                count(
                    r"\bdirec(?:cion|tor(?:a)?) de (?:la )?tesis de maestria\b|\bdirector(?:a)? de maestrand[oa]s?\b",
                ),
            ],
        ),
        DetectorRule::fallback(
            "ciencia:dir_grado",
            vec![
                num(&format!(
                    r"{DIRECTING} (\d{{1,2}}) (?:tesis de grado|tesinas|tesistas de grado|trabajos finales)\b"
                )),
                count(
                    r"\bdirec(?:cion|tor(?:a)?) de (?:la )?(?:tesis de (?:grado|licenciatura)|tesina|trabajo final(?: de grado)?)\b",
                ),
            ],
        ),
        DetectorRule::max(
            "ciencia:becarios",
            vec![
                num(r"\bformacion de (\d{1,2}) becari[oa]s\b"),
                count(
                    r"\bbecari[oa]s? (?:doctorales? |posdoctorales? |de (?:investigacion|iniciacion) )?(?:del? )?(?:conicet|agencia|anpcyt|foncyt|cic|cin|secyt)\b",
                )
                .within(60)
                .requiring(&[r"\bdirec", r"\bcodirec", r"\bformacion de\b", r"\ba cargo\b", r"\btutor"]),
            ],
        ),
        DetectorRule::fallback(
            "proyectos:direccion",
            vec![
                num(r"\bdirec(?:cion|tor(?:a)?) de (\d{1,2}) proyectos\b"),
                count(r"\bdirec(?:tor(?:a)?|cion)(?: del?)? proyectos?\b")
                    .within(20)
                    .excluding_before(&[r"\bco-?$"]),
            ],
        ),
        DetectorRule::single(
            "proyectos:codireccion",
            count(r"\bco-?direc(?:tor(?:a)?|cion)(?: del?)? proyectos?\b"),
        ),
        DetectorRule::fallback(
            "proyectos:participacion",
            vec![
                num(r"\bparticipacion en (\d{1,2}) proyectos\b"),
                count(
                    r"\b(?:integrante|miembro|investigador(?:a)?|participante)(?: del?)?(?: equipo(?: del?)?)? proyectos?\b|\bparticipacion en (?:el )?proyectos?\b",
                ),
            ],
        ),
        DetectorRule::single(
            "proyectos:coordinacion",
            has(r"\bcoordinador(?:a)? del? (?:equipo|grupo|nodo)\b|\bcoordinacion del? (?:equipos?|grupos?)\b"),
        ),
        DetectorRule::single(
            "extension:tutorias",
            count(r"\btutor(?:a|ia|ias)? de (?:pasantias?|practicas(?: profesionales| supervisadas)?)\b"),
        ),
        DetectorRule::single(
            "extension:transferencia",
            count(
                r"\b(?:transferencia (?:tecnologica|de conocimientos?|de tecnologia)|vinculacion (?:tecnologica|con el medio)|convenio de (?:vinculacion|transferencia|asistencia tecnica)|proyecto de extension)\b",
            ),
        ),
        DetectorRule::single(
            "extension:eventos_cientificos",
            count(
                r"\b(?:expositor(?:a)?|conferencista|panelista|disertante|ponente|conferencia (?:plenaria|invitada|magistral))\b",
            ),
        ),
        DetectorRule::single(
            "eval:tribunal_grado",
            count(
                r"\b(?:tribunal|jurado)(?: evaluador)? de (?:la )?(?:tesina|trabajo final(?: de grado)?|tesis de (?:grado|licenciatura))\b",
            ),
        ),
        DetectorRule::single(
            "eval:tribunal_posgrado",
            count(
                r"\b(?:tribunal|jurado)(?: evaluador)? de (?:la )?tesis (?:doctoral|de (?:doctorado|maestria|posgrado|especializacion))\b",
            ),
        ),
        DetectorRule::fallback(
            "eval:eval_proyectos",
            vec![
                num(r"\bevaluador(?:a)? de (\d{1,3}) (?:proyectos|programas)\b"),
                count(r"\bevaluador(?:a)? de (?:proyectos|programas)\b|\bevaluacion de (?:proyectos|programas)\b"),
            ],
        ),
        DetectorRule::max(
            "eval:eval_revistas",
            vec![
                count(
                    r"\b(?:revisor(?:a)?|referee|evaluador(?:a)? (?:de|en) (?:la )?(?:revista|congreso|jornadas?))\b",
                ),
                num(r"\bevaluador(?:a)? (?:de|en) (\d{1,3}) revistas\b"),
            ],
        ),
        DetectorRule::single(
            "eval:eval_institucional",
            count(
                r"\bevaluador(?:a)? (?:institucional|externo|de (?:la )?coneau|del? (?:programa de incentivos|conicet|agencia|anpcyt|cic))\b|\bcomision (?:asesora|evaluadora)\b|\bpar evaluador(?:a)?\b",
            ),
        ),
        DetectorRule::single(
            "otras:comites_redes",
            count(r"\bcomite (?:cientifico|academico|evaluador)\b|\bmiembro de (?:la )?red\b"),
        ),
        DetectorRule::fallback(
            "otras:ejercicio_prof",
            vec![
                num(r"\bejercicio profesional[^\n]{0,60}?\b(\d{1,2}) anos\b"),
                years(r"\bejercicio profesional\b|\bactividad profesional\b|\bconsultor(?:a)? independiente\b"),
                has(r"\bejercicio profesional\b"),
            ],
        ),
    ]
}

fn producciones() -> Vec<DetectorRule> {
    const REFEREED: &str = r"\bcon referato\b|\brevista indexada\b|\bpeer[- ]review(?:ed)?\b";

    vec![
        DetectorRule::max(
            "pubs:con_referato",
            vec![
                num(r"\b(\d{1,3}) articulos (?:publicados )?(?:con referato|en revistas (?:indexadas|con referato))\b"),
                count(REFEREED),
                distinct(r"\bdoi:?\s*(10\.\d{4,9}/[^\s,;]+)"),
            ],
        ),
        DetectorRule::fallback(
            "pubs:sin_referato",
            vec![
                count(r"\bsin referato\b|\bde divulgacion\b"),
                count(r"\barticulos?\b").minus(REFEREED),
            ],
        ),
        DetectorRule::single(
            "pubs:libros",
            distinct(
                r"\bisbn(?:-?1[03])?[\s:.]*([0-9](?:[- ]?[0-9]){8,12}(?:[- ]?x)?)\b|\b(97[89](?:[- ]?[0-9]){10})\b",
            )
            .within(10)
            .excluding_near(&[r"\bissn\b"]),
        ),
        DetectorRule::fallback(
            "pubs:capitulos",
            vec![
                num(r"\b(\d{1,2}) capitulos (?:de|en) libros?\b"),
                count(r"\bcapitulo\b").within(200).requiring(&[r"\bisbn\b"]),
                count(r"\bcapitulo (?:de|en) (?:(?:un|el) )?libro\b"),
            ],
        ),
        DetectorRule::single(
            "pubs:documentos",
            count(
                r"\b(?:documentos? tecnicos?|documentos? de trabajo|working papers?|comunicacion(?:es)? (?:a|en) congresos?|resumen(?:es)? en (?:actas|congresos?)|posters?)\b",
            ),
        ),
        DetectorRule::single(
            "desarrollos:software_patente",
            count(
                r"\b(?:patentes?|software registrado|registro de software|modelos? de utilidad|registro de propiedad intelectual)\b",
            ),
        ),
        DetectorRule::single(
            "desarrollos:procesos",
            count(
                r"\b(?:innovacion|procesos?) de gestion\b|\bdesarrollo de procesos\b|\binnovacion (?:organizacional|educativa|tecnologica|institucional)\b",
            ),
        ),
        DetectorRule::single(
            "servicios:tecnicos",
            count(r"\bservicios? (?:tecnicos?|profesionales|a terceros)\b|\basistencia tecnica\b|\bconsultoria\b"),
        ),
        DetectorRule::single(
            "servicios:informes",
            count(r"\binformes? tecnicos?\b|\bdiagnosticos? (?:institucional|tecnic|ambiental|territorial)\w*|\bperitajes?\b"),
        ),
    ]
}

fn otros() -> Vec<DetectorRule> {
    vec![
        DetectorRule::single(
            "redes:participacion",
            count(
                r"\bred (?:de investigacion|academica|tematica|interuniversitaria|internacional|nacional)\b|\bintegrante de (?:la )?red\b",
            ),
        ),
        DetectorRule::single(
            "redes:organizacion_eventos",
            count(
                r"\b(?:organizador(?:a)?|comite organizador|organizacion)(?: del?| de la)? (?:\w+ )?(?:congresos?|jornadas?|simposios?|workshops?|seminarios?|eventos?|encuentros?)\b",
            ),
        ),
        DetectorRule::single(
            "redes:gestion_editorial",
            count(
                r"\b(?:editor(?:a)?(?: asociad[oa]| en jefe| general| invitad[oa]| adjunt[oa])?|(?:comite|consejo) editorial|direccion editorial)\b",
            )
            .within(80)
            .requiring(&[r"\brevistas?\b", r"\bjournal\b"]),
        ),
        DetectorRule::single(
            "premios:internacional",
            count(r"\b(?:premio|galardon|award)\b")
                .within(30)
                .requiring(&[r"\binternacional\b", r"\binternational\b"]),
        ),
        DetectorRule::single(
            "premios:nacional",
            count(r"\b(?:premio|galardon)\b")
                .within(30)
                .requiring(&[r"\bnacional\b"])
                .excluding_near(&[r"\binternacional\b"]),
        ),
        DetectorRule::single(
            "premios:distinciones",
            count(r"\b(?:mencion(?: de honor| especial)?|distincion|reconocimiento)\b")
                .within(20)
                .excluding_before(&[r"\bsin\b"]),
        ),
    ]
}
