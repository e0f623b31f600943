use crate::domain::model::{AttributeValue, TableView};
use crate::domain::ports::ExportFormat;
use crate::utils::error::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use std::io::Write;
use zip::write::{SimpleFileOptions, ZipWriter};

pub const XLSX_FILE_NAME: &str = "parcel_results.xlsx";
pub const XLSX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const CSV_FILE_NAME: &str = "parcel_results.csv";
pub const CSV_MIME_TYPE: &str = "text/csv";

const SHEET_NAME: &str = "Sheet1";

/// A downloadable export: bytes plus the name and type to serve them under.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportFormat {
    pub fn default_file_name(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => XLSX_FILE_NAME,
            ExportFormat::Csv => CSV_FILE_NAME,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => XLSX_MIME_TYPE,
            ExportFormat::Csv => CSV_MIME_TYPE,
        }
    }
}

pub fn export_table(
    view: &TableView,
    format: ExportFormat,
    file_name: Option<&str>,
) -> Result<ExportArtifact> {
    let bytes = match format {
        ExportFormat::Xlsx => write_xlsx(view, Utc::now())?,
        ExportFormat::Csv => write_csv(view)?,
    };

    tracing::debug!(
        "Exported {} rows as {:?} ({} bytes)",
        view.rows.len(),
        format,
        bytes.len()
    );

    Ok(ExportArtifact {
        file_name: file_name.unwrap_or(format.default_file_name()).to_string(),
        mime_type: format.mime_type(),
        bytes,
    })
}

pub fn write_csv(view: &TableView) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&view.headers)?;
    for row in &view.rows {
        writer.write_record(row.iter().map(|cell| cell.to_string()))?;
    }
    writer
        .into_inner()
        .map_err(|e| crate::utils::error::ParcelError::IoError(e.into_error()))
}

/// Single-sheet Office Open XML workbook: a header row followed by one row
/// per record. Text uses inline strings, so no shared string table is written.
pub fn write_xlsx(view: &TableView, created: DateTime<Utc>) -> Result<Vec<u8>> {
    let options = SimpleFileOptions::default();
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

    zip.start_file("[Content_Types].xml", options)?;
    zip.write_all(CONTENT_TYPES.as_bytes())?;

    zip.start_file("_rels/.rels", options)?;
    zip.write_all(ROOT_RELS.as_bytes())?;

    zip.start_file("docProps/core.xml", options)?;
    zip.write_all(core_properties(created).as_bytes())?;

    zip.start_file("xl/workbook.xml", options)?;
    zip.write_all(workbook_xml().as_bytes())?;

    zip.start_file("xl/_rels/workbook.xml.rels", options)?;
    zip.write_all(WORKBOOK_RELS.as_bytes())?;

    zip.start_file("xl/worksheets/sheet1.xml", options)?;
    zip.write_all(sheet_xml(view).as_bytes())?;

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/></Relationships>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#;

fn workbook_xml() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
        SHEET_NAME
    )
}

fn core_properties(created: DateTime<Utc>) -> String {
    let stamp = created.to_rfc3339_opts(SecondsFormat::Secs, true);
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><dc:title>Parcel results</dc:title><dcterms:created xsi:type="dcterms:W3CDTF">{0}</dcterms:created><dcterms:modified xsi:type="dcterms:W3CDTF">{0}</dcterms:modified></cp:coreProperties>"#,
        stamp
    )
}

fn sheet_xml(view: &TableView) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );

    let header: Vec<AttributeValue> = view
        .headers
        .iter()
        .map(|h| AttributeValue::Text(h.clone()))
        .collect();

    for (row_index, row) in std::iter::once(&header).chain(view.rows.iter()).enumerate() {
        let row_number = row_index + 1;
        xml.push_str(&format!(r#"<row r="{}">"#, row_number));
        for (col_index, cell) in row.iter().enumerate() {
            let reference = format!("{}{}", column_letters(col_index), row_number);
            push_cell(&mut xml, &reference, cell);
        }
        xml.push_str("</row>");
    }

    xml.push_str("</sheetData></worksheet>");
    xml
}

fn push_cell(xml: &mut String, reference: &str, value: &AttributeValue) {
    match value {
        AttributeValue::Null => {}
        AttributeValue::Integer(i) => {
            xml.push_str(&format!(r#"<c r="{}"><v>{}</v></c>"#, reference, i));
        }
        AttributeValue::Float(f) if f.is_finite() => {
            xml.push_str(&format!(r#"<c r="{}"><v>{}</v></c>"#, reference, f));
        }
        AttributeValue::Bool(b) => {
            xml.push_str(&format!(
                r#"<c r="{}" t="b"><v>{}</v></c>"#,
                reference,
                u8::from(*b)
            ));
        }
        other => {
            let text = other.to_string();
            if text.is_empty() {
                return;
            }
            xml.push_str(&format!(
                r#"<c r="{}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
                reference,
                escape_xml(&text)
            ));
        }
    }
}

/// Zero-based column index to spreadsheet letters (0 -> A, 26 -> AA).
fn column_letters(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            // XML 1.0 不允許的控制字元直接略過
            c if (c as u32) < 0x20 && !matches!(c, '\t' | '\n' | '\r') => {}
            c => escaped.push(c),
        }
    }
    escaped
}
