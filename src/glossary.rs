//! Readers that turn bilingual glossary files into rows of cell text.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;
use zip::ZipArchive;

use crate::error::{Error, Result};
use crate::mapping::TranslationMapping;

const DOCX_BODY: &str = "word/document.xml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlossaryKind {
    /// Two positional columns: source, target.
    Csv,
    /// Word tables with columns: ignored, source, target.
    Docx,
}

impl GlossaryKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(Self::Csv),
            "docx" => Some(Self::Docx),
            _ => None,
        }
    }
}

pub fn load_mapping(path: &Path, kind: GlossaryKind) -> Result<TranslationMapping> {
    match kind {
        GlossaryKind::Csv => Ok(TranslationMapping::from_delimited_rows(read_csv_rows(path)?)),
        GlossaryKind::Docx => Ok(TranslationMapping::from_table_rows(read_docx_rows(path)?)),
    }
}

/// Reads every record of a header-less CSV file; rows may differ in width.
pub fn read_csv_rows(path: &Path) -> Result<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|err| Error::glossary(path, err))?;
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|err| Error::glossary(path, err))?;
        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        if rows.is_empty() {
            if let Some(first) = row.first_mut() {
                if let Some(stripped) = first.strip_prefix('\u{feff}') {
                    *first = stripped.to_string();
                }
            }
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Reads the rows of every top-level table in a `.docx`, tables in document order.
pub fn read_docx_rows(path: &Path) -> Result<Vec<Vec<String>>> {
    let file = File::open(path).map_err(|err| Error::glossary(path, err))?;
    let mut archive = ZipArchive::new(file).map_err(|err| Error::glossary(path, err))?;
    let mut xml = Vec::new();
    archive
        .by_name(DOCX_BODY)
        .map_err(|err| Error::glossary(path, format!("{}: {}", DOCX_BODY, err)))?
        .read_to_end(&mut xml)
        .map_err(|err| Error::glossary(path, err))?;
    docx_table_rows(&xml).map_err(|message| Error::glossary(path, message))
}

/// Cell text follows Word's plain-text view: paragraphs joined by newlines,
/// `w:tab` as a tab and `w:br` as a newline. Nested tables are skipped.
///
/// Rows are positional over the table grid: a cell spanning `w:gridSpan` columns is
/// repeated once per column, and a `w:vMerge` continuation repeats the text of the
/// cell above it.
fn docx_table_rows(xml: &[u8]) -> std::result::Result<Vec<Vec<String>>, String> {
    let mut reader = Reader::from_reader(Cursor::new(xml));
    reader.trim_text(false);
    let mut buf = Vec::new();
    let mut rows = Vec::new();
    let mut table_depth = 0usize;
    let mut row: Option<Vec<String>> = None;
    let mut cell: Option<String> = None;
    let mut layout = CellLayout::default();
    let mut column_text: Vec<String> = Vec::new();
    let mut paragraphs_in_cell = 0usize;
    let mut in_text = false;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|err| format!("failed to parse {}: {}", DOCX_BODY, err))?;
        let top_level = table_depth == 1;
        match event {
            Event::Start(e) => match e.name().as_ref() {
                b"w:tbl" => {
                    if table_depth == 0 {
                        column_text.clear();
                    }
                    table_depth += 1;
                }
                b"w:tr" if top_level => row = Some(Vec::new()),
                b"w:tc" if top_level => {
                    cell = Some(String::new());
                    layout = CellLayout::default();
                    paragraphs_in_cell = 0;
                }
                b"w:p" if top_level => start_paragraph(&mut cell, &mut paragraphs_in_cell),
                b"w:t" if top_level => in_text = true,
                b"w:gridSpan" | b"w:vMerge" if top_level => layout.read(&e),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:p" if top_level => start_paragraph(&mut cell, &mut paragraphs_in_cell),
                b"w:tab" if top_level => push_to(&mut cell, "\t"),
                b"w:br" | b"w:cr" if top_level => push_to(&mut cell, "\n"),
                b"w:gridSpan" | b"w:vMerge" if top_level => layout.read(&e),
                _ => {}
            },
            Event::End(e) => match e.name().as_ref() {
                b"w:tbl" => table_depth = table_depth.saturating_sub(1),
                b"w:tr" if top_level => {
                    if let Some(done) = row.take() {
                        rows.push(done);
                    }
                }
                b"w:tc" if top_level => {
                    if let (Some(row), Some(done)) = (row.as_mut(), cell.take()) {
                        let column = row.len();
                        let text = if layout.continues {
                            column_text.get(column).cloned().unwrap_or_default()
                        } else {
                            done
                        };
                        let end = column + layout.span;
                        if column_text.len() < end {
                            column_text.resize(end, String::new());
                        }
                        for slot in &mut column_text[column..end] {
                            slot.clone_from(&text);
                            row.push(text.clone());
                        }
                    }
                }
                b"w:t" => in_text = false,
                _ => {}
            },
            Event::Text(e) if in_text && top_level => {
                let text = e
                    .unescape()
                    .map_err(|err| format!("failed to decode {} text: {}", DOCX_BODY, err))?;
                push_to(&mut cell, &text);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(rows)
}

/// Merge properties from a cell's `w:tcPr`.
#[derive(Debug, Clone, Copy)]
struct CellLayout {
    span: usize,
    continues: bool,
}

impl Default for CellLayout {
    fn default() -> Self {
        Self {
            span: 1,
            continues: false,
        }
    }
}

impl CellLayout {
    fn read(&mut self, property: &BytesStart<'_>) {
        let value = property
            .try_get_attribute("w:val")
            .ok()
            .flatten()
            .map(|attr| String::from_utf8_lossy(&attr.value).into_owned());
        match property.name().as_ref() {
            b"w:gridSpan" => {
                self.span = value
                    .and_then(|value| value.trim().parse::<usize>().ok())
                    .filter(|span| *span > 0)
                    .unwrap_or(1);
            }
            b"w:vMerge" => self.continues = value.as_deref() != Some("restart"),
            _ => {}
        }
    }
}

fn start_paragraph(cell: &mut Option<String>, paragraphs_in_cell: &mut usize) {
    if let Some(cell) = cell.as_mut() {
        if *paragraphs_in_cell > 0 {
            cell.push('\n');
        }
        *paragraphs_in_cell += 1;
    }
}

fn push_to(cell: &mut Option<String>, text: &str) {
    if let Some(cell) = cell.as_mut() {
        cell.push_str(text);
    }
}
