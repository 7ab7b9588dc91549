//! Streaming XML parsing for XLSX archive entries: the shared-string table,
//! per-sheet header rows, and the workbook's own sheet registry.

use anyhow::{Context, Result};
use log::debug;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::collections::HashMap;
use std::io::BufReader;
use zip::ZipArchive;
use zip::result::ZipError;

use crate::config::SheetMapping;

/// Read the shared-string table from `xl/sharedStrings.xml`.
///
/// A missing entry is not an error: sheets that only carry inline literal
/// values ship no shared-string table, so an empty sequence is returned.
/// Each `<si>` entry contributes exactly one string (its `<t>` runs
/// concatenated) because cells reference entries by position.
pub fn extract_shared_strings(
    archive: &mut ZipArchive<impl std::io::Read + std::io::Seek>,
) -> Result<Vec<String>> {
    let mut strings = Vec::new();
    let ss_xml = match archive.by_name("xl/sharedStrings.xml") {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(strings),
        Err(e) => return Err(e).context("Failed to read xl/sharedStrings.xml"),
    };

    let mut reader = Reader::from_reader(BufReader::new(ss_xml));
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut current_string = String::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.local_name().as_ref() == b"t" => {
                current_string.push_str(&read_text_node(&mut reader)?);
            }
            Event::End(e) if e.local_name().as_ref() == b"si" => {
                strings.push(current_string.clone());
                current_string.clear();
            }
            // Self-closing entry still occupies a position in the table
            Event::Empty(e) if e.local_name().as_ref() == b"si" => {
                strings.push(String::new());
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    debug!("loaded {} shared strings", strings.len());
    Ok(strings)
}

/// Extract the header row from one sheet entry.
///
/// The row whose `r` attribute equals `header_row` is used; sheets without
/// that row fall back to the first row in document order, and sheets with
/// no rows at all yield an empty sequence. Returns `Ok(None)` when the
/// entry itself is missing from the archive, so callers can report it
/// without aborting the remaining sheets. Only the cells of the row
/// actually returned are resolved against the shared-string table.
pub fn extract_header_row(
    archive: &mut ZipArchive<impl std::io::Read + std::io::Seek>,
    entry_path: &str,
    shared_strings: &[String],
    header_row: u32,
) -> Result<Option<Vec<String>>> {
    let sheet_xml = match archive.by_name(entry_path) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read sheet entry '{}'", entry_path));
        }
    };

    let mut reader = Reader::from_reader(BufReader::new(sheet_xml));
    reader.config_mut().trim_text(true);

    let target = header_row.to_string();
    let mut first_row: Option<Vec<RawCell>> = None;

    let mut buf = Vec::new();
    let mut skip_buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.local_name().as_ref() == b"row" => {
                if row_number(&e)?.as_deref() == Some(target.as_str()) {
                    let cells = read_row_cells(&mut reader)
                        .with_context(|| format!("Failed to parse row in '{}'", entry_path))?;
                    return resolve_cells(cells, shared_strings)
                        .with_context(|| {
                            format!("Failed to resolve header cells in '{}'", entry_path)
                        })
                        .map(Some);
                }
                if first_row.is_none() {
                    // Fallback candidate; kept unresolved in case the
                    // numbered header row appears later.
                    first_row = Some(
                        read_row_cells(&mut reader)
                            .with_context(|| format!("Failed to parse row in '{}'", entry_path))?,
                    );
                } else {
                    reader.read_to_end_into(e.name(), &mut skip_buf)?;
                }
            }
            Event::Empty(e) if e.local_name().as_ref() == b"row" => {
                // Self-closing row carries no cells
                if row_number(&e)?.as_deref() == Some(target.as_str()) {
                    return Ok(Some(Vec::new()));
                }
                if first_row.is_none() {
                    first_row = Some(Vec::new());
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    match first_row {
        Some(cells) => {
            debug!(
                "row {} not present in '{}', using first row",
                header_row, entry_path
            );
            resolve_cells(cells, shared_strings)
                .with_context(|| format!("Failed to resolve header cells in '{}'", entry_path))
                .map(Some)
        }
        None => Ok(Some(Vec::new())),
    }
}

fn row_number(e: &BytesStart) -> Result<Option<String>> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == b"r" {
            return Ok(Some(attr.unescape_value()?.to_string()));
        }
    }
    Ok(None)
}

fn cell_type(e: &BytesStart) -> Result<Option<String>> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == b"t" {
            return Ok(Some(attr.unescape_value()?.to_string()));
        }
    }
    Ok(None)
}

/// Cell as it appears in the row: declared type attribute and raw value
/// text, before any shared-string resolution.
struct RawCell {
    cell_type: Option<String>,
    value: Option<String>,
}

/// Collect the cells of the row the reader is positioned in, one raw cell
/// per cell element, in document order. Gaps in column numbering are not
/// reconstructed.
fn read_row_cells<R: std::io::BufRead>(reader: &mut Reader<R>) -> Result<Vec<RawCell>> {
    let mut cells = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.local_name().as_ref() == b"c" => {
                let t_attr = cell_type(&e)?;
                let value = read_cell_value(reader)?;
                cells.push(RawCell {
                    cell_type: t_attr,
                    value,
                });
            }
            // A cell with no children has no value element
            Event::Empty(e) if e.local_name().as_ref() == b"c" => {
                cells.push(RawCell {
                    cell_type: None,
                    value: None,
                });
            }
            Event::End(e) if e.local_name().as_ref() == b"row" => break,
            Event::Eof => anyhow::bail!("Unexpected end of document inside a row"),
            _ => {}
        }
        buf.clear();
    }

    Ok(cells)
}

/// Raw value of the cell the reader is positioned in.
///
/// Only the `<v>` element counts as a value: cells without one (including
/// inline-string cells, which nest their text under `<is>`) yield `None`.
fn read_cell_value<R: std::io::BufRead>(reader: &mut Reader<R>) -> Result<Option<String>> {
    let mut raw: Option<String> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.local_name().as_ref() == b"v" => {
                raw = Some(read_text_node(reader)?);
            }
            Event::Empty(e) if e.local_name().as_ref() == b"v" => {
                raw = Some(String::new());
            }
            Event::End(e) if e.local_name().as_ref() == b"c" => break,
            Event::Eof => anyhow::bail!("Unexpected end of document inside a cell"),
            _ => {}
        }
        buf.clear();
    }

    Ok(raw)
}

/// Resolve raw cells to display strings.
///
/// Shared-string references (`t="s"`) substitute the table entry at the
/// referenced position; a malformed or out-of-range reference is an error.
/// Any other raw text passes through verbatim, and cells without a value
/// element resolve to the empty string.
fn resolve_cells(cells: Vec<RawCell>, shared_strings: &[String]) -> Result<Vec<String>> {
    let mut resolved = Vec::with_capacity(cells.len());

    for cell in cells {
        let raw = match cell.value {
            Some(raw) => raw,
            None => {
                resolved.push(String::new());
                continue;
            }
        };

        if cell.cell_type.as_deref() == Some("s") {
            let idx: usize = raw
                .parse()
                .with_context(|| format!("Invalid shared string reference '{}'", raw))?;
            match shared_strings.get(idx) {
                Some(s) => resolved.push(s.clone()),
                None => {
                    return Err(anyhow::anyhow!(
                        "Shared string index {} out of range (table holds {} entries)",
                        idx,
                        shared_strings.len()
                    ));
                }
            }
        } else {
            resolved.push(raw);
        }
    }

    Ok(resolved)
}

/// Derive the sheet mapping from the workbook's own sheet registry.
///
/// Resolves each `<sheet>` of `xl/workbook.xml` through
/// `xl/_rels/workbook.xml.rels` to its worksheet entry path, preserving
/// workbook order. Relative relationship targets are rooted at `xl/`.
pub fn discover_sheet_map(
    archive: &mut ZipArchive<impl std::io::Read + std::io::Seek>,
) -> Result<Vec<SheetMapping>> {
    // 1. Sheet names and relationship ids, in workbook order
    let mut sheets: Vec<(String, String)> = Vec::new();
    {
        let workbook_xml = archive
            .by_name("xl/workbook.xml")
            .context("Failed to find xl/workbook.xml")?;
        let mut reader = Reader::from_reader(BufReader::new(workbook_xml));
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) | Event::Empty(e) => {
                    if e.local_name().as_ref() == b"sheet" {
                        let mut name = String::new();
                        let mut r_id = String::new();
                        for attr in e.attributes().flatten() {
                            match attr.key.as_ref() {
                                b"name" => name = attr.unescape_value()?.to_string(),
                                b"r:id" => r_id = attr.unescape_value()?.to_string(),
                                _ => {}
                            }
                        }
                        if !name.is_empty() && !r_id.is_empty() {
                            sheets.push((name, r_id));
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }
    }

    // 2. Relationship id to target path
    let mut rels: HashMap<String, String> = HashMap::new();
    {
        let rels_xml = archive
            .by_name("xl/_rels/workbook.xml.rels")
            .context("Failed to find xl/_rels/workbook.xml.rels")?;
        let mut reader = Reader::from_reader(BufReader::new(rels_xml));
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) | Event::Empty(e) => {
                    if e.local_name().as_ref() == b"Relationship" {
                        let mut id = String::new();
                        let mut target = String::new();
                        for attr in e.attributes().flatten() {
                            match attr.key.as_ref() {
                                b"Id" => id = attr.unescape_value()?.to_string(),
                                b"Target" => target = attr.unescape_value()?.to_string(),
                                _ => {}
                            }
                        }
                        if !id.is_empty() {
                            rels.insert(id, target);
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }
    }

    let mut mappings = Vec::with_capacity(sheets.len());
    for (name, r_id) in sheets {
        let target = rels.get(&r_id).ok_or_else(|| {
            anyhow::anyhow!("Relationship '{}' not found for sheet '{}'", r_id, name)
        })?;
        mappings.push(SheetMapping::new(worksheet_entry_path(target), name));
    }

    debug!("discovered {} sheets from workbook registry", mappings.len());
    Ok(mappings)
}

/// Relationship targets are relative to `xl/` unless rooted with a leading
/// slash (package-absolute form).
fn worksheet_entry_path(target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        absolute.to_string()
    } else if target.starts_with("xl/") {
        target.to_string()
    } else {
        format!("xl/{}", target)
    }
}

/// Read text content from an XML node
fn read_text_node<R: std::io::BufRead>(reader: &mut Reader<R>) -> Result<String> {
    let mut buf = Vec::new();
    let mut text = String::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Text(e) => text.push_str(e.unescape()?.as_ref()),
            Event::CData(e) => text.push_str(&String::from_utf8_lossy(e.as_ref())),
            Event::End(_) => break,
            Event::Eof => anyhow::bail!("Unexpected end of document inside a text node"),
            _ => {}
        }
        buf.clear();
    }
    Ok(text)
}
