//! Sheet parts read straight from the xlsx package.
//!
//! calamine keeps only the first column of a `<col min max>` span and does
//! not surface notes at all, so both come from the zip: `xl/workbook.xml`
//! and its rels map sheet names to sheet parts, each sheet part carries
//! its `<cols>`, and each sheet's rels name its comments part.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt::Display;
use std::io::{Cursor, Read};

use quick_xml::Reader;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesRef, BytesStart, Event};
use zip::ZipArchive;
use zip::result::ZipError;

use crate::error::{IngestError, Result};

const WORKBOOK_PART: &str = "xl/workbook.xml";
const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";
const COMMENTS_REL_SUFFIX: &str = "/comments";
const MAX_COLUMN: u32 = 16_384;

/// Calibri 11 metrics: pixels per digit and cell padding.
const DIGIT_PX: f64 = 7.0;
const PADDING_PX: f64 = 5.0;

/// A note as stored in a comments part, at a zero-based position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetNote {
    pub row: u32,
    pub column: u16,
    pub author: String,
    pub text: String,
}

/// Layout and notes of one sheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetParts {
    /// Custom widths in character units, one entry per column.
    pub column_widths: Vec<(u16, f64)>,
    pub notes: Vec<SheetNote>,
}

type Package<'a> = ZipArchive<Cursor<&'a [u8]>>;

struct Relationship {
    kind: String,
    target: String,
}

/// Column widths and notes keyed by sheet name.
pub fn read_sheet_parts(bytes: &[u8]) -> Result<HashMap<String, SheetParts>> {
    let mut package =
        ZipArchive::new(Cursor::new(bytes)).map_err(|error| package_error("[archive]", &error))?;
    let Some(workbook_xml) = read_part(&mut package, WORKBOOK_PART)? else {
        return Ok(HashMap::new());
    };
    let Some(rels_xml) = read_part(&mut package, WORKBOOK_RELS_PART)? else {
        return Ok(HashMap::new());
    };
    let targets = relationships(&rels_xml, WORKBOOK_RELS_PART)?;

    let mut parts = HashMap::new();
    for (name, rel_id) in sheet_relationships(&workbook_xml)? {
        let Some(relationship) = targets.get(&rel_id) else {
            continue;
        };
        let sheet_path = join_part("xl/", &relationship.target);
        let Some(sheet_xml) = read_part(&mut package, &sheet_path)? else {
            continue;
        };
        let mut sheet = SheetParts {
            column_widths: column_widths(&sheet_xml, &sheet_path)?,
            notes: Vec::new(),
        };

        let rels_path = sheet_rels_path(&sheet_path);
        if let Some(sheet_rels) = read_part(&mut package, &rels_path)? {
            let comments = relationships(&sheet_rels, &rels_path)?
                .into_values()
                .find(|relationship| relationship.kind.ends_with(COMMENTS_REL_SUFFIX));
            if let Some(comments) = comments {
                let comments_path = join_part(dir_of(&sheet_path), &comments.target);
                if let Some(xml) = read_part(&mut package, &comments_path)? {
                    sheet.notes = notes(&xml, &comments_path)?;
                }
            }
        }
        parts.insert(name, sheet);
    }
    Ok(parts)
}

fn package_error(part: &str, error: &impl Display) -> IngestError {
    IngestError::Package {
        part: part.to_string(),
        message: error.to_string(),
    }
}

fn read_part(package: &mut Package<'_>, path: &str) -> Result<Option<String>> {
    let mut file = match package.by_name(path) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(error) => return Err(package_error(path, &error)),
    };
    let mut xml = String::new();
    file.read_to_string(&mut xml)
        .map_err(|error| package_error(path, &error))?;
    Ok(Some(xml))
}

/// `(sheet name, relationship id)` in workbook order.
fn sheet_relationships(xml: &str) -> Result<Vec<(String, String)>> {
    let mut reader = Reader::from_str(xml);
    let mut sheets = Vec::new();
    loop {
        match reader
            .read_event()
            .map_err(|error| package_error(WORKBOOK_PART, &error))?
        {
            Event::Start(element) | Event::Empty(element)
                if element.local_name().as_ref() == b"sheet" =>
            {
                if let (Some(name), Some(id)) =
                    (attribute(&element, b"name"), attribute(&element, b"id"))
                {
                    sheets.push((name, id));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(sheets)
}

fn relationships(xml: &str, part: &str) -> Result<HashMap<String, Relationship>> {
    let mut reader = Reader::from_str(xml);
    let mut out = HashMap::new();
    loop {
        match reader
            .read_event()
            .map_err(|error| package_error(part, &error))?
        {
            Event::Start(element) | Event::Empty(element)
                if element.local_name().as_ref() == b"Relationship" =>
            {
                if let (Some(id), Some(target)) =
                    (attribute(&element, b"Id"), attribute(&element, b"Target"))
                {
                    let kind = attribute(&element, b"Type").unwrap_or_default();
                    out.insert(id, Relationship { kind, target });
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(out)
}

/// Custom widths from `<cols>`, expanded over each `min..=max` span.
fn column_widths(xml: &str, part: &str) -> Result<Vec<(u16, f64)>> {
    let mut reader = Reader::from_str(xml);
    let mut widths = Vec::new();
    loop {
        match reader
            .read_event()
            .map_err(|error| package_error(part, &error))?
        {
            Event::Start(element) | Event::Empty(element)
                if element.local_name().as_ref() == b"col" =>
            {
                let custom = attribute(&element, b"customWidth")
                    .is_some_and(|flag| flag != "0" && flag != "false");
                let min = attribute(&element, b"min").and_then(|value| value.parse::<u32>().ok());
                let max = attribute(&element, b"max").and_then(|value| value.parse::<u32>().ok());
                let width =
                    attribute(&element, b"width").and_then(|value| value.parse::<f64>().ok());
                let (true, Some(min), Some(width)) = (custom, min, width) else {
                    continue;
                };
                let max = max.unwrap_or(min).min(MAX_COLUMN);
                for column in min..=max {
                    if let Some(column) = column
                        .checked_sub(1)
                        .and_then(|column| u16::try_from(column).ok())
                    {
                        widths.push((column, character_width(width)));
                    }
                }
            }
            // `<cols>` always precedes the cell data.
            Event::Start(element) if element.local_name().as_ref() == b"sheetData" => break,
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(widths)
}

/// Stored `<col width>` back to the character width a writer takes,
/// through the whole-pixel width Excel actually renders.
fn character_width(stored: f64) -> f64 {
    let pixels = (stored * DIGIT_PX).round();
    let width = if pixels <= DIGIT_PX + PADDING_PX {
        pixels / (DIGIT_PX + PADDING_PX)
    } else {
        (pixels - PADDING_PX) / DIGIT_PX
    };
    (width * 100.0).round() / 100.0
}

fn notes(xml: &str, part: &str) -> Result<Vec<SheetNote>> {
    let mut reader = Reader::from_str(xml);
    let mut authors: Vec<String> = Vec::new();
    let mut out = Vec::new();

    let mut author: Option<String> = None;
    let mut current: Option<(Option<(u32, u16)>, usize)> = None;
    let mut in_text_run = false;
    let mut text = String::new();

    loop {
        match reader
            .read_event()
            .map_err(|error| package_error(part, &error))?
        {
            Event::Start(element) => match element.local_name().as_ref() {
                b"author" => author = Some(String::new()),
                b"comment" => {
                    let position = attribute(&element, b"ref").and_then(|cell| parse_cell_ref(&cell));
                    let author_id = attribute(&element, b"authorId")
                        .and_then(|id| id.parse::<usize>().ok())
                        .unwrap_or(0);
                    current = Some((position, author_id));
                    text.clear();
                }
                b"t" => in_text_run = current.is_some(),
                _ => {}
            },
            Event::End(element) => match element.local_name().as_ref() {
                b"author" => authors.extend(author.take()),
                b"comment" => {
                    if let Some((Some((row, column)), author_id)) = current.take() {
                        out.push(SheetNote {
                            row,
                            column,
                            author: authors.get(author_id).cloned().unwrap_or_default(),
                            text: text.clone(),
                        });
                    }
                }
                b"t" => in_text_run = false,
                _ => {}
            },
            Event::Text(chunk) => {
                let chunk = chunk.decode().map_err(|error| package_error(part, &error))?;
                if let Some(author) = author.as_mut() {
                    author.push_str(&chunk);
                } else if in_text_run {
                    text.push_str(&chunk);
                }
            }
            Event::GeneralRef(reference) => {
                let Some(resolved) = resolve_reference(&reference) else {
                    continue;
                };
                if let Some(author) = author.as_mut() {
                    author.push_str(&resolved);
                } else if in_text_run {
                    text.push_str(&resolved);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(out)
}

/// `&#10;`, `&amp;` and the other predefined entities.
fn resolve_reference(reference: &BytesRef<'_>) -> Option<String> {
    if let Ok(Some(ch)) = reference.resolve_char_ref() {
        return Some(ch.to_string());
    }
    let name = reference.decode().ok()?;
    resolve_predefined_entity(&name).map(str::to_string)
}

fn attribute(element: &BytesStart<'_>, local_name: &[u8]) -> Option<String> {
    element
        .attributes()
        .flatten()
        .find(|attribute| attribute.key.local_name().as_ref() == local_name)
        .and_then(|attribute| attribute.decode_and_unescape_value(element.decoder()).ok().map(Cow::into_owned))
}

/// `B2` to zero-based `(row, column)`.
fn parse_cell_ref(reference: &str) -> Option<(u32, u16)> {
    let reference = reference.replace('$', "");
    let split = reference.find(|ch: char| ch.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    if letters.is_empty() {
        return None;
    }
    let mut column: u32 = 0;
    for ch in letters.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        let ordinal = u32::from(ch.to_ascii_uppercase()) - u32::from('A') + 1;
        column = column.checked_mul(26)?.checked_add(ordinal)?;
    }
    let row = digits.parse::<u32>().ok()?.checked_sub(1)?;
    let column = u16::try_from(column.checked_sub(1)?).ok()?;
    Some((row, column))
}

fn dir_of(path: &str) -> &str {
    path.rfind('/').map_or("", |index| &path[..=index])
}

fn sheet_rels_path(sheet_path: &str) -> String {
    let dir = dir_of(sheet_path);
    let file = &sheet_path[dir.len()..];
    format!("{dir}_rels/{file}.rels")
}

/// Resolves a relationship target against `base_dir`, folding `..`.
fn join_part(base_dir: &str, target: &str) -> String {
    let joined = match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("{base_dir}{target}"),
    };
    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            segment => segments.push(segment),
        }
    }
    segments.join("/")
}
