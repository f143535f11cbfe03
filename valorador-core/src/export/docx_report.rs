//! Word report.
//!
//! The document is written as a minimal OOXML package: content types, the
//! package relationship and `word/document.xml`. Word, LibreOffice and the
//! DOCX reader in this crate all open it.

use super::{format_points, ReportMeta};
use crate::types::ScoreReport;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use quick_xml::escape::escape;
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::ZipWriter;

const TITLE: &str = "Informe de Valoración – Categorizador Docente en Investigación";
const DISCLAIMER: &str = "Este informe fue generado automáticamente a partir del CV cargado. \
     Las detecciones se basan en expresiones regulares y pueden requerir validación humana.";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

/// Render the report as `.docx` bytes.
pub fn to_docx(report: &ScoreReport, meta: &ReportMeta, date: NaiveDate) -> Result<Vec<u8>> {
    let document = document_xml(report, meta, date);

    let mut buffer = Cursor::new(Vec::new());
    {
        let mut zip = ZipWriter::new(&mut buffer);
        let options = FileOptions::default();
        for (name, body) in [
            ("[Content_Types].xml", CONTENT_TYPES),
            ("_rels/.rels", PACKAGE_RELS),
            ("word/document.xml", document.as_str()),
        ] {
            zip.start_file(name, options)
                .with_context(|| format!("failed to add {name} to docx"))?;
            zip.write_all(body.as_bytes())?;
        }
        zip.finish().context("failed to finish docx archive")?;
    }
    Ok(buffer.into_inner())
}

fn document_xml(report: &ScoreReport, meta: &ReportMeta, date: NaiveDate) -> String {
    let mut body = String::new();

    body.push_str(&paragraph(TITLE, Style::Title));
    body.push_str(&paragraph(
        &format!("Fecha: {}", date.format("%d/%m/%Y")),
        Style::Small,
    ));
    if let Some(docente) = &meta.docente {
        body.push_str(&paragraph(&format!("Docente: {docente}"), Style::Bold));
    }
    if let Some(institucion) = &meta.institucion {
        body.push_str(&paragraph(&format!("Institución: {institucion}"), Style::Normal));
    }

    body.push_str(&paragraph("Totales por bloque", Style::Heading));
    let mut block_rows: Vec<Vec<String>> = report
        .blocks
        .iter()
        .map(|block| vec![block.label.clone(), format!("{:.0}", block.total)])
        .collect();
    block_rows.push(vec![
        "TOTAL GENERAL".to_string(),
        format!("{:.0}", report.grand_total),
    ]);
    body.push_str(&table(&["Bloque", "Puntaje"], &block_rows));

    body.push_str(&paragraph("Desglose por ítem", Style::Heading));
    let item_rows: Vec<Vec<String>> = report
        .items
        .iter()
        .map(|item| {
            vec![
                item.section.clone(),
                item.label.clone(),
                item.units.to_string(),
                format_points(item.points_per_unit),
                format_points(item.capped_points),
            ]
        })
        .collect();
    body.push_str(&table(
        &[
            "Sección",
            "Ítem",
            "Unidades detectadas",
            "Puntos por unidad",
            "Puntos (tope ítem)",
        ],
        &item_rows,
    ));

    body.push_str(&paragraph("Observaciones", Style::Heading));
    body.push_str(&paragraph(DISCLAIMER, Style::Normal));

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}<w:sectPr/></w:body></w:document>"#
    )
}

#[derive(Clone, Copy)]
enum Style {
    Title,
    Heading,
    Bold,
    Small,
    Normal,
}

fn paragraph(text: &str, style: Style) -> String {
    // sizes are in half-points
    let (centered, bold, size) = match style {
        Style::Title => (true, true, 32),
        Style::Heading => (false, true, 26),
        Style::Bold => (false, true, 22),
        Style::Small => (false, false, 20),
        Style::Normal => (false, false, 22),
    };
    let ppr = if centered {
        r#"<w:pPr><w:jc w:val="center"/></w:pPr>"#
    } else {
        ""
    };
    let b = if bold { "<w:b/>" } else { "" };
    format!(
        r#"<w:p>{ppr}<w:r><w:rPr>{b}<w:sz w:val="{size}"/></w:rPr><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
        escape(text)
    )
}

fn cell(text: &str, header: bool) -> String {
    let b = if header { "<w:rPr><w:b/></w:rPr>" } else { "" };
    format!(
        r#"<w:tc><w:p><w:r>{b}<w:t xml:space="preserve">{}</w:t></w:r></w:p></w:tc>"#,
        escape(text)
    )
}

fn table(header: &[&str], rows: &[Vec<String>]) -> String {
    let mut xml = String::from(
        r#"<w:tbl><w:tblPr><w:tblW w:w="0" w:type="auto"/><w:tblBorders><w:top w:val="single" w:sz="4"/><w:left w:val="single" w:sz="4"/><w:bottom w:val="single" w:sz="4"/><w:right w:val="single" w:sz="4"/><w:insideH w:val="single" w:sz="4"/><w:insideV w:val="single" w:sz="4"/></w:tblBorders></w:tblPr>"#,
    );
    xml.push_str("<w:tr>");
    for title in header {
        xml.push_str(&cell(title, true));
    }
    xml.push_str("</w:tr>");
    for row in rows {
        xml.push_str("<w:tr>");
        for value in row {
            xml.push_str(&cell(value, false));
        }
        xml.push_str("</w:tr>");
    }
    xml.push_str("</w:tbl>");
    xml
}
