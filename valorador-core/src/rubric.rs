// Built-in valorador: rubric rows, section ceilings and block grouping for
// the researcher categorization grid.

use crate::config::BlockConfig;
use crate::types::RubricItem;
use std::collections::BTreeMap;

/// The 54 rubric rows, in presentation order.
pub fn builtin_rubric() -> Vec<RubricItem> {
    const ROWS: &[(&str, &str, f64, f64)] = &[
        // 2. Formación
        ("formacion:doctorado", "Doctorado acreditado", 250.0, 375.0),
        ("formacion:maestria", "Maestría acreditada", 150.0, 225.0),
        ("formacion:especializacion", "Especialización", 70.0, 105.0),
        ("formacion:diplomatura", "Diplomatura >200 hs", 50.0, 100.0),
        ("formacion:segundo_grado", "Segundo título de grado", 30.0, 30.0),
        (
            "formacion:cursos_posgrado",
            "Cursos de posgrado (>40 hs con evaluación)",
            5.0,
            75.0,
        ),
        ("formacion:posdoc", "Posdoctorado acreditado", 100.0, 100.0),
        (
            "formacion:idiomas",
            "Idiomas certificados (intermedio/avanzado)",
            10.0,
            50.0,
        ),
        ("formacion:estancias", "Estancias y pasantías en I+D", 20.0, 60.0),
        // 3. Cargos
        (
            "docencia:titular",
            "Docencia universitaria - Titular (por año)",
            30.0,
            150.0,
        ),
        (
            "docencia:asociado",
            "Docencia universitaria - Asociado (por año)",
            25.0,
            125.0,
        ),
        (
            "docencia:adjunto",
            "Docencia universitaria - Adjunto (por año)",
            20.0,
            100.0,
        ),
        ("docencia:jtp", "JTP o Ayudante (por año)", 10.0, 50.0),
        ("docencia:posgrado", "Docencia en posgrado (por curso)", 20.0, 100.0),
        ("gestion:rector", "Rector", 100.0, 100.0),
        ("gestion:vicerrector", "Vicerrector/Directorio", 80.0, 80.0),
        ("gestion:decano", "Decano / Director Instituto", 60.0, 60.0),
        ("gestion:secretario", "Secretario Acad., Inv. o Ext.", 60.0, 60.0),
        ("gestion:coordinador", "Coordinador de carrera/programas", 40.0, 40.0),
        ("gestion:consejero", "Consejero institucional", 20.0, 20.0),
        (
            "otroscargos:funciones",
            "Funciones especiales (por función)",
            10.0,
            50.0,
        ),
        // 4. Ciencia y Tecnología
        (
            "ciencia:dir_doctorandos",
            "Dirección de doctorandos/posdocs",
            30.0,
            90.0,
        ),
        ("ciencia:dir_maestria", "Dirección de maestrandos", 20.0, 50.0),
        ("ciencia:dir_grado", "Dirección de tesistas de grado", 10.0, 50.0),
        (
            "ciencia:becarios",
            "Formación de becarios (CONICET/Agencia)",
            20.0,
            40.0,
        ),
        (
            "proyectos:direccion",
            "Dirección de proyectos (eval+financ)",
            50.0,
            150.0,
        ),
        ("proyectos:codireccion", "Co-dirección de proyectos", 30.0, 90.0),
        ("proyectos:participacion", "Participación en proyectos", 20.0, 60.0),
        ("proyectos:coordinacion", "Coordinación de equipos", 20.0, 20.0),
        (
            "extension:tutorias",
            "Tutorías de pasantías/prácticas",
            10.0,
            20.0,
        ),
        (
            "extension:transferencia",
            "Vinculación/transferencia (acciones)",
            15.0,
            45.0,
        ),
        (
            "extension:eventos_cientificos",
            "Eventos científicos (expositor/conferencista/panelista)",
            20.0,
            100.0,
        ),
        ("eval:tribunal_grado", "Tribunal de tesis de grado", 5.0, 20.0),
        ("eval:tribunal_posgrado", "Tribunal de tesis de posgrado", 10.0, 30.0),
        (
            "eval:eval_proyectos",
            "Evaluación de proyectos/programas I+D/ext.",
            10.0,
            30.0,
        ),
        (
            "eval:eval_revistas",
            "Evaluación en revistas/congresos/jornadas",
            10.0,
            30.0,
        ),
        (
            "eval:eval_institucional",
            "Evaluación institucional/organismos I+D",
            10.0,
            30.0,
        ),
        (
            "otras:comites_redes",
            "Participación en redes/comités/eventos",
            20.0,
            60.0,
        ),
        (
            "otras:ejercicio_prof",
            "Ejercicio profesional extraacadémico (años)",
            5.0,
            20.0,
        ),
        // 5. Producciones
        (
            "pubs:con_referato",
            "Artículos con referato (indexados)",
            20.0,
            140.0,
        ),
        ("pubs:sin_referato", "Artículos sin referato", 10.0, 80.0),
        ("pubs:libros", "Libros (ISBN)", 40.0, 80.0),
        ("pubs:capitulos", "Capítulos de libro (ISBN)", 20.0, 60.0),
        (
            "pubs:documentos",
            "Documentos técnicos/comunicaciones",
            10.0,
            30.0,
        ),
        (
            "desarrollos:software_patente",
            "Patentes/soft. registrado",
            30.0,
            60.0,
        ),
        (
            "desarrollos:procesos",
            "Procesos de gestión/innovación",
            20.0,
            60.0,
        ),
        (
            "servicios:tecnicos",
            "Servicios técnicos/profesionales",
            20.0,
            40.0,
        ),
        (
            "servicios:informes",
            "Informes técnicos/diagnósticos",
            10.0,
            20.0,
        ),
        // 6. Otros
        ("redes:participacion", "Participación en redes", 10.0, 30.0),
        ("redes:organizacion_eventos", "Organización de eventos", 20.0, 60.0),
        (
            "redes:gestion_editorial",
            "Gestión editorial (revistas)",
            20.0,
            60.0,
        ),
        ("premios:internacional", "Premios internacionales", 50.0, 100.0),
        ("premios:nacional", "Premios nacionales", 20.0, 100.0),
        ("premios:distinciones", "Menciones/distinciones", 20.0, 100.0),
    ];

    ROWS.iter()
        .map(|&(key, label, per_unit, max)| RubricItem::new(key, label, per_unit, max))
        .collect()
}

pub fn builtin_section_limits() -> BTreeMap<String, f64> {
    [
        ("formacion", 400.0),
        ("docencia", 300.0),
        ("gestion", 200.0),
        ("otroscargos", 75.0),
        ("ciencia", 150.0),
        ("proyectos", 150.0),
        ("extension", 60.0),
        ("eval", 100.0),
        ("otras", 60.0),
        ("pubs", 300.0),
        ("desarrollos", 100.0),
        ("servicios", 40.0),
        ("redes", 150.0),
        ("premios", 100.0),
    ]
    .into_iter()
    .map(|(section, limit)| (section.to_string(), limit))
    .collect()
}

/// The five blocks of the grid. `TOTAL_GENERAL` is their sum and is not
/// listed here.
pub fn builtin_blocks() -> Vec<BlockConfig> {
    vec![
        BlockConfig::new("2:Formacion_total", "Formación", &["formacion"], 400.0),
        BlockConfig::new(
            "3:Cargos_total",
            "Cargos (Docencia/Gestión)",
            &["docencia", "gestion", "otroscargos"],
            500.0,
        ),
        BlockConfig::new(
            "4:CyT_total",
            "Ciencia y Tecnología",
            &["ciencia", "proyectos", "extension", "eval", "otras"],
            500.0,
        ),
        BlockConfig::new(
            "5:Producciones_total",
            "Producciones",
            &["pubs", "desarrollos", "servicios"],
            350.0,
        ),
        BlockConfig::new("6:Otros_total", "Otros", &["redes", "premios"], 200.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn rubric_has_54_unique_keys() {
        let rubric = builtin_rubric();
        let keys: BTreeSet<_> = rubric.iter().map(|item| item.key.as_str()).collect();
        assert_eq!(rubric.len(), 54);
        assert_eq!(keys.len(), 54);
    }

    #[test]
    fn every_rubric_section_has_a_limit_and_one_block() {
        let limits = builtin_section_limits();
        let blocks = builtin_blocks();
        for item in builtin_rubric() {
            let section = item.section();
            assert!(limits.contains_key(section), "no limit for {section}");
            let owners = blocks
                .iter()
                .filter(|block| block.sections.iter().any(|s| s == section))
                .count();
            assert_eq!(owners, 1, "section {section} owned by {owners} blocks");
        }
    }

    #[test]
    fn every_item_pays_at_least_one_unit() {
        for item in builtin_rubric() {
            assert!(item.points_per_unit > 0.0, "{}", item.key);
            assert!(item.max_points >= item.points_per_unit, "{}", item.key);
        }
    }
}
