use super::format_points;
use crate::types::ScoreReport;
use std::io::Write;

pub const CSV_HEADER: [&str; 7] = [
    "Clave",
    "Ítem",
    "Sección",
    "Unidades detectadas",
    "Puntos por unidad",
    "Puntos (c/ tope ítem)",
    "Tope ítem",
];

/// One row per rubric item, in rubric order.
pub fn to_csv<W: Write>(report: &ScoreReport, writer: W) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(CSV_HEADER)?;
    for item in &report.items {
        let units = item.units.to_string();
        let per_unit = format_points(item.points_per_unit);
        let capped = format_points(item.capped_points);
        let max = format_points(item.max_points);
        wtr.write_record([
            item.key.as_str(),
            item.label.as_str(),
            item.section.as_str(),
            units.as_str(),
            per_unit.as_str(),
            capped.as_str(),
            max.as_str(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn to_csv_string(report: &ScoreReport) -> Result<String, csv::Error> {
    let mut buffer = Vec::new();
    to_csv(report, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::DocumentProcessor;
    use std::fs::File;

    #[test]
    fn csv_has_header_and_one_row_per_item() {
        let report = DocumentProcessor::with_defaults()
            .unwrap()
            .score_text("Doctorado en Historia, Universidad de Buenos Aires, 2011");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("valoracion.csv");
        to_csv(&report, File::create(&path).unwrap()).unwrap();

        let mut rdr = csv::Reader::from_path(&path).unwrap();
        let headers = rdr.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), CSV_HEADER.to_vec());

        let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 54);
        let doctorado = rows.iter().find(|r| &r[0] == "formacion:doctorado").unwrap();
        assert_eq!(&doctorado[1], "Doctorado acreditado");
        assert_eq!(&doctorado[3], "1");
        assert_eq!(&doctorado[5], "250");
        assert_eq!(&doctorado[6], "375");
    }

    #[test]
    fn labels_with_commas_are_quoted() {
        let report = DocumentProcessor::with_defaults().unwrap().score_text("");
        let csv = to_csv_string(&report).unwrap();
        assert!(csv.contains("\"Secretario Acad., Inv. o Ext.\""));
    }
}
