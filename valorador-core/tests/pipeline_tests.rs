//! Pipeline boundary tests over a realistic CV fixture.
//!
//! These tests read `test_fixtures/cv_investigadora.txt` end to end and
//! assert at the pipeline boundaries:
//!
//! - Boundary 1 (reader output): source kind, fingerprint, character count
//! - Boundary 2 (detections): unit counts for the items the CV supports
//! - Boundary 3 (score report): item, section, block and grand totals
//!
//! Individual detector patterns are covered by unit tests next to the bank.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use valorador_core::export::{render_summary, to_csv_string, to_docx, to_json};
use valorador_core::preprocessors::{DocxPreprocessor, Preprocessor};
use valorador_core::{
    DocumentProcessor, DocumentReader, ReaderError, ReportMeta, ScoreReport, SourceKind,
    ValoradorConfig, TOTAL_GENERAL,
};

// ============================================================================
// Fixture helpers
// ============================================================================

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_fixtures")
}

fn cv_path() -> PathBuf {
    fixtures_dir().join("cv_investigadora.txt")
}

fn processor() -> DocumentProcessor {
    let mut config = ValoradorConfig::default();
    config.reference_year = 2024;
    DocumentProcessor::new(config).expect("built-in config is valid")
}

fn score_fixture() -> ScoreReport {
    processor()
        .process_file(&cv_path())
        .expect("fixture should score")
}

fn detected_units(report: &ScoreReport) -> BTreeMap<&str, u32> {
    report
        .items
        .iter()
        .filter(|item| item.units > 0)
        .map(|item| (item.key.as_str(), item.units))
        .collect()
}

// ============================================================================
// Boundary 1: reader output
// ============================================================================

mod reader_boundary {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn txt_fixture_is_read_as_txt() {
        let report = score_fixture();
        let source = report.source.expect("file reports carry source info");
        assert_eq!(source.file_name, "cv_investigadora.txt");
        assert_eq!(source.kind, SourceKind::Txt);
        assert_eq!(source.fingerprint.len(), 64);
        assert!(source.characters > 1000);
    }

    #[test]
    fn legacy_doc_never_reaches_the_core() {
        let err = processor()
            .process_file(Path::new("cv_viejo.doc"))
            .unwrap_err();
        let reader_err = err
            .downcast_ref::<ReaderError>()
            .expect("reader errors stay typed");
        assert!(matches!(reader_err, ReaderError::UnsupportedFormat { .. }));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = processor()
            .process_file(&fixtures_dir().join("no_existe.txt"))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ReaderError>(),
            Some(ReaderError::Io { .. })
        ));
    }
}

// ============================================================================
// Boundary 2: detections
// ============================================================================

mod detection_boundary {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fixture_detections_match_the_cv() {
        let report = score_fixture();
        let expected: BTreeMap<&str, u32> = [
            ("formacion:doctorado", 1),
            ("formacion:maestria", 1),
            ("formacion:especializacion", 1),
            ("formacion:posdoc", 1),
            ("formacion:idiomas", 2),
            ("docencia:adjunto", 10),
            ("docencia:jtp", 6),
            ("gestion:consejero", 1),
            ("ciencia:dir_doctorandos", 2),
            ("ciencia:dir_grado", 4),
            ("proyectos:direccion", 1),
            ("proyectos:codireccion", 1),
            ("proyectos:participacion", 1),
            ("pubs:con_referato", 2),
            ("pubs:libros", 1),
            ("pubs:capitulos", 1),
            ("eval:eval_revistas", 1),
            ("eval:tribunal_posgrado", 1),
            ("premios:nacional", 1),
        ]
        .into_iter()
        .collect();
        assert_eq!(detected_units(&report), expected);
    }

    #[test]
    fn captured_stages_agree_with_the_report() {
        let processor = processor();
        let stages = processor
            .process_file_capture_stages(&cv_path())
            .expect("stages");

        assert!(stages.normalized.as_str().contains("doctora en ciencias biologicas"));
        assert!(!stages.normalized.as_str().contains("\n\n"));
        assert_eq!(stages.detections.len(), 54);
        assert_eq!(stages.report, processor.process_file(&cv_path()).unwrap());

        let evidence_keys: Vec<&str> = stages.evidence.iter().map(|e| e.key.as_str()).collect();
        assert!(evidence_keys.contains(&"formacion:doctorado"));
        assert!(evidence_keys.contains(&"pubs:libros"));

        // stage dumps must serialize
        let json = serde_json::to_string(&stages).unwrap();
        assert!(json.contains("\"normalized\""));
    }

    #[test]
    fn explain_shows_where_each_item_was_found() {
        let raw = std::fs::read_to_string(cv_path()).unwrap();
        let evidence = processor().explain(&raw);
        let doctorado = evidence
            .iter()
            .find(|e| e.key == "formacion:doctorado")
            .unwrap();
        assert!(doctorado.snippets[0].contains("ciencias biologicas"));
    }
}

// ============================================================================
// Boundary 3: score report
// ============================================================================

mod score_boundary {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn formacion_is_clamped_and_blocks_sum_to_grand_total() {
        let report = score_fixture();

        let formacion = report.section("formacion").unwrap();
        assert_eq!(formacion.raw, 590.0);
        assert_eq!(formacion.total, 400.0);

        let totals = report.totals();
        assert_eq!(totals["2:Formacion_total"], 400.0);
        assert_eq!(totals["3:Cargos_total"], 170.0);
        assert_eq!(totals["4:CyT_total"], 220.0);
        assert_eq!(totals["5:Producciones_total"], 100.0);
        assert_eq!(totals["6:Otros_total"], 20.0);
        assert_eq!(totals[TOTAL_GENERAL], 910.0);

        let block_sum: f64 = report.blocks.iter().map(|b| b.total).sum();
        assert_eq!(block_sum, report.grand_total);
    }

    #[test]
    fn yaml_config_changes_only_what_it_overrides() {
        let config = ValoradorConfig::load_from_file(fixtures_dir().join("valorador_2024.yaml"))
            .expect("fixture config loads");
        assert_eq!(config.reference_year, 2024);

        let report = DocumentProcessor::new(config)
            .unwrap()
            .process_file(&cv_path())
            .unwrap();
        assert_eq!(report.section("pubs").unwrap().total, 60.0);
        assert_eq!(report.grand_total, 870.0);
    }

    #[test]
    fn scoring_is_repeatable() {
        let processor = processor();
        let first = processor.process_file(&cv_path()).unwrap();
        let second = processor.process_file(&cv_path()).unwrap();
        assert_eq!(first, second);
    }
}

// ============================================================================
// Exports
// ============================================================================

mod exports {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn every_export_renders_the_fixture() {
        let report = score_fixture();

        let csv = to_csv_string(&report).unwrap();
        assert_eq!(csv.lines().count(), 55);
        assert!(csv.contains("formacion:doctorado,Doctorado acreditado,formacion,1,250,250,375"));

        let json: serde_json::Value = serde_json::from_str(&to_json(&report).unwrap()).unwrap();
        assert_eq!(json["grand_total"], 910.0);
        assert_eq!(json["schema_version"], "1.0.0");

        let summary = render_summary(&report);
        assert!(summary.contains("Formación"));
        assert!(summary.contains("910"));

        let meta = ReportMeta {
            docente: Some("María José Fernández".to_string()),
            institucion: Some("Universidad Nacional de Córdoba".to_string()),
        };
        let date = chrono::NaiveDate::from_ymd_opt(2024, 11, 5).unwrap();
        let docx = to_docx(&report, &meta, date).unwrap();
        let text = DocxPreprocessor.extract_text(&docx).unwrap();
        assert!(text.contains("Docente: María José Fernández"));
        assert!(text.contains("910"));
    }

    #[test]
    fn exported_docx_reads_back_through_the_document_reader() {
        let report = score_fixture();
        let docx = to_docx(
            &report,
            &ReportMeta::default(),
            chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("informe.docx");
        std::fs::write(&path, docx).unwrap();

        let document = DocumentReader::new().read(&path).unwrap();
        assert_eq!(document.source_kind, SourceKind::Docx);
        assert!(document.text.contains("Fecha: 01/01/2024"));
        assert!(document.text.contains("Totales por bloque"));
        assert!(document.text.contains("Desglose por ítem"));
        // one item row per rubric entry, each labelled by the item
        for item in &report.items {
            assert!(document.text.contains(&item.label), "{} missing", item.label);
        }
    }
}
