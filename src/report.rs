//! Human-readable rendering of the extracted metadata.
//!
//! [`inspect`] is the top-level entry point: it checks the path, decodes the
//! tag table, and writes the three report sections (form data, GPS, capture
//! time) in fixed order. Domain faults are printed to the sink, never
//! returned; only a failing sink propagates an error.

use exif::{Exif, Field, Tag, Value};
use std::io::{self, Write};
use std::path::Path;
use walkdir::WalkDir;

use crate::reader::{self, CaptureTime, ReadError};

/// Extensions listed by the missing-file diagnostic.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tiff", "tif"];

/// Decoded UserComment payload.
///
/// The camera app stores its form fields as a JSON document in UserComment,
/// so the payload is decoded as text and reinterpreted as JSON when it
/// parses.
#[derive(Debug, Clone, PartialEq)]
pub enum FormData {
    /// The comment parsed as a JSON document.
    Json(serde_json::Value),
    /// The comment decoded as text but is not valid JSON.
    Text(String),
    /// The comment bytes are not decodable text; the raw payload is kept.
    Binary(Vec<u8>),
}

/// Extract and decode the UserComment payload from a tag table.
pub fn form_data(table: &Exif) -> Option<FormData> {
    reader::user_comment_raw(table).map(decode_user_comment)
}

/// Decode a raw UserComment payload.
///
/// The leading EXIF character-code prefix selects the text encoding:
/// `ASCII\0\0\0` and the all-NUL code mean UTF-8, `UNICODE\0` means UTF-16BE.
/// Decoding is strict; bytes that do not decode yield [`FormData::Binary`]
/// rather than a lossy string. Trailing NUL/space padding is trimmed before
/// the JSON attempt.
pub fn decode_user_comment(raw: &[u8]) -> FormData {
    let text = match comment_text(raw) {
        Some(text) => text,
        None => {
            log::warn!("UserComment payload is not decodable text ({} bytes)", raw.len());
            return FormData::Binary(raw.to_vec());
        }
    };
    let trimmed = text.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    match serde_json::from_str(trimmed) {
        Ok(doc) => FormData::Json(doc),
        Err(_) => FormData::Text(trimmed.to_string()),
    }
}

/// Strip the character-code prefix and decode the remaining payload.
fn comment_text(raw: &[u8]) -> Option<String> {
    if let Some(payload) = raw.strip_prefix(b"UNICODE\0") {
        return decode_utf16be(payload);
    }
    let payload = raw
        .strip_prefix(b"ASCII\0\0\0")
        .or_else(|| raw.strip_prefix(&[0u8; 8]))
        .unwrap_or(raw);
    std::str::from_utf8(payload).ok().map(str::to_owned)
}

fn decode_utf16be(payload: &[u8]) -> Option<String> {
    if payload.len() % 2 != 0 {
        return None;
    }
    let units = payload
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
    char::decode_utf16(units).collect::<Result<String, _>>().ok()
}

/// Name and rendered value for every entry of the GPS IFD.
pub fn gps_entries(table: &Exif) -> Vec<(String, String)> {
    reader::gps_fields(table)
        .map(|field| (gps_tag_name(field.tag), render_gps_value(field)))
        .collect()
}

/// Resolve a human-readable GPS tag name from the static tag table.
fn gps_tag_name(tag: Tag) -> String {
    if tag.description().is_some() {
        tag.to_string()
    } else {
        format!("Unknown Tag ({})", tag.number())
    }
}

/// Render a GPS tag value.
///
/// A single rational is printed as its decimal quotient, except when the
/// denominator is zero: dividing would lose the raw numbers, so the
/// untouched `(num, den)` pair is printed instead. Everything else uses the
/// decoder's display form.
fn render_gps_value(field: &Field) -> String {
    match &field.value {
        Value::Rational(v) if v.len() == 1 => {
            let r = v[0];
            if r.denom == 0 {
                format!("({}, {})", r.num, r.denom)
            } else {
                format!("{:?}", r.to_f64())
            }
        }
        Value::SRational(v) if v.len() == 1 => {
            let r = v[0];
            if r.denom == 0 {
                format!("({}, {})", r.num, r.denom)
            } else {
                format!("{:?}", r.to_f64())
            }
        }
        _ => field.display_value().to_string(),
    }
}

/// Names of image-like files directly inside `dir`, sorted.
///
/// Non-recursive; used as a diagnostic when the requested file is missing.
pub fn image_files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_image_like(e.path()))
        .filter_map(|e| e.file_name().to_str().map(str::to_owned))
        .collect();
    names.sort();
    names
}

fn is_image_like(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Inspect one image file and write the full report to `out`.
///
/// All read and decode faults are reported as messages on the sink; the
/// only error this function returns is a failure to write to the sink
/// itself.
///
/// # Example
///
/// ```rust,no_run
/// use std::path::Path;
///
/// let mut out = std::io::stdout();
/// exif_peek::report::inspect(Path::new("IMG_4343.JPG"), &mut out)?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn inspect<W: Write>(path: &Path, out: &mut W) -> io::Result<()> {
    if !path.is_file() {
        return report_missing(path, out);
    }
    let table = match reader::load_tag_table(path) {
        Ok(table) => table,
        // The file vanished between the check and the read.
        Err(ReadError::NotFound { .. }) => return report_missing(path, out),
        Err(e) => {
            log::warn!("inspection of {} failed: {e}", path.display());
            return writeln!(out, "Error: {e}");
        }
    };

    writeln!(out, "--- EXIF metadata for: {} ---", path.display())?;
    write_form_section(&table, out)?;
    write_gps_section(&table, out)?;
    write_time_section(&table, out)
}

fn report_missing<W: Write>(path: &Path, out: &mut W) -> io::Result<()> {
    writeln!(
        out,
        "Error: {}",
        ReadError::NotFound {
            path: path.to_path_buf()
        }
    )?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    writeln!(out, "Image files in {}:", dir.display())?;
    let names = image_files_in(dir);
    if names.is_empty() {
        writeln!(out, "  (none)")?;
    }
    for name in names {
        writeln!(out, "  - {name}")?;
    }
    Ok(())
}

fn write_form_section<W: Write>(table: &Exif, out: &mut W) -> io::Result<()> {
    match form_data(table) {
        Some(FormData::Json(doc)) => {
            writeln!(out, "\n--- Form data (UserComment) ---")?;
            let pretty = serde_json::to_string_pretty(&doc).unwrap_or_else(|_| doc.to_string());
            writeln!(out, "{pretty}")
        }
        Some(FormData::Text(text)) => {
            writeln!(out, "\n--- Form data (UserComment) ---")?;
            writeln!(out, "Not valid JSON in UserComment:")?;
            writeln!(out, "{text}")
        }
        Some(FormData::Binary(bytes)) => {
            writeln!(out, "\n--- Form data (UserComment, could not be decoded) ---")?;
            writeln!(out, "{bytes:?}")
        }
        None => writeln!(out, "\n--- No form data (UserComment) found ---"),
    }
}

fn write_gps_section<W: Write>(table: &Exif, out: &mut W) -> io::Result<()> {
    let entries = gps_entries(table);
    if entries.is_empty() {
        return writeln!(out, "\n--- No GPS data found ---");
    }
    writeln!(out, "\n--- GPS data ---")?;
    for (name, value) in entries {
        writeln!(out, "{name}: {value}")?;
    }
    Ok(())
}

fn write_time_section<W: Write>(table: &Exif, out: &mut W) -> io::Result<()> {
    match reader::capture_time(table) {
        Some(CaptureTime::Original(text)) => {
            writeln!(out, "\n--- Original capture time ---")?;
            writeln!(out, "{text}")
        }
        Some(CaptureTime::Generic(text)) => {
            writeln!(out, "\n--- Capture time ---")?;
            writeln!(out, "{text}")
        }
        None => Ok(()),
    }
}
