//! EXIF container loading and read-only tag table access.
//!
//! The [`exif::Exif`] value returned by [`load_tag_table`] is the full tag
//! table decoded from the file (0th, Exif, GPS, and 1st IFDs). Everything
//! else in this module is a borrowing projection over that table; nothing
//! here mutates it or holds the file open past the decode call.

use exif::{Context, Exif, Field, In, Reader, Tag, Value};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failures raised while turning a path into a tag table.
#[derive(Debug, Error)]
pub enum ReadError {
    /// The path does not exist, or vanished between the existence check and
    /// the read.
    #[error("file not found: {}", .path.display())]
    NotFound { path: PathBuf },

    /// The file exists but is not a supported image format or carries no
    /// EXIF block.
    #[error("'{}' does not contain valid EXIF data or is not a supported image format", .path.display())]
    InvalidContainer {
        path: PathBuf,
        #[source]
        source: exif::Error,
    },

    /// Any other fault surfaced by the decoder.
    #[error("unexpected failure while reading '{}': {source}", .path.display())]
    Unexpected {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Decode the EXIF tag table from an image file.
///
/// Performs exactly one blocking read of the file's metadata region; the
/// file handle is scoped to this call and released on every exit path.
pub fn load_tag_table(path: &Path) -> Result<Exif, ReadError> {
    let file = File::open(path).map_err(|e| io_fault(path, e))?;
    let mut reader = BufReader::new(file);
    Reader::new()
        .read_from_container(&mut reader)
        .map_err(|e| match e {
            exif::Error::Io(source) => io_fault(path, source),
            other => {
                log::debug!("EXIF decode failed for {}: {other}", path.display());
                ReadError::InvalidContainer {
                    path: path.to_path_buf(),
                    source: other,
                }
            }
        })
}

fn io_fault(path: &Path, source: io::Error) -> ReadError {
    if source.kind() == io::ErrorKind::NotFound {
        ReadError::NotFound {
            path: path.to_path_buf(),
        }
    } else {
        ReadError::Unexpected {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Raw payload bytes of the UserComment tag (Exif IFD), if present.
///
/// The payload is returned as stored, character-code prefix included; the
/// caller decides how to decode it.
pub fn user_comment_raw(table: &Exif) -> Option<&[u8]> {
    let field = table.get_field(Tag::UserComment, In::PRIMARY)?;
    match &field.value {
        Value::Undefined(bytes, _) => Some(bytes),
        // Some writers store the comment as a plain ASCII value instead.
        Value::Ascii(chunks) => chunks.first().map(|c| c.as_slice()),
        _ => None,
    }
}

/// All fields of the GPS IFD, in the table's natural iteration order.
pub fn gps_fields(table: &Exif) -> impl Iterator<Item = &Field> {
    table
        .fields()
        .filter(|f| f.ifd_num == In::PRIMARY && f.tag.context() == Context::Gps)
}

/// Capture timestamp extracted from the tag table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureTime {
    /// DateTimeOriginal from the Exif IFD.
    Original(String),
    /// DateTime from the 0th IFD, used when no original timestamp exists.
    Generic(String),
}

/// Capture timestamp, preferring the Exif-IFD original over the 0th-IFD
/// fallback.
pub fn capture_time(table: &Exif) -> Option<CaptureTime> {
    if let Some(field) = table.get_field(Tag::DateTimeOriginal, In::PRIMARY) {
        return Some(CaptureTime::Original(ascii_text(field)));
    }
    table
        .get_field(Tag::DateTime, In::PRIMARY)
        .map(|field| CaptureTime::Generic(ascii_text(field)))
}

/// Verbatim text of an ASCII-valued field (first component, as stored).
///
/// Reads the raw tag bytes rather than `display_value()`, which reformats
/// datetimes.
fn ascii_text(field: &Field) -> String {
    match &field.value {
        Value::Ascii(chunks) => chunks
            .first()
            .map(|c| String::from_utf8_lossy(c).trim().to_string())
            .unwrap_or_default(),
        _ => field.display_value().to_string().trim_matches('"').to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exif::experimental::Writer;
    use std::fs;
    use std::io::Cursor;
    use tempfile::TempDir;

    /// Write the given fields as a raw TIFF/EXIF blob to `name` under `dir`.
    fn write_exif_fixture(dir: &Path, name: &str, fields: &[Field]) -> PathBuf {
        let mut writer = Writer::new();
        for field in fields {
            writer.push_field(field);
        }
        let mut buf = Cursor::new(Vec::new());
        writer.write(&mut buf, false).unwrap();
        let path = dir.join(name);
        fs::write(&path, buf.into_inner()).unwrap();
        path
    }

    fn ascii(text: &str) -> Value {
        Value::Ascii(vec![text.as_bytes().to_vec()])
    }

    // ── load_tag_table ───────────────────────────────────────────────

    #[test]
    fn load_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = load_tag_table(&dir.path().join("nope.jpg")).err().unwrap();
        assert!(matches!(err, ReadError::NotFound { .. }));
    }

    #[test]
    fn load_non_image_is_invalid_container() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fake.jpg");
        fs::write(&path, b"definitely not a jpeg").unwrap();

        let err = load_tag_table(&path).err().unwrap();
        assert!(matches!(err, ReadError::InvalidContainer { .. }));
        assert!(err.to_string().contains("fake.jpg"));
    }

    #[test]
    fn load_round_trips_written_fields() {
        let dir = TempDir::new().unwrap();
        let path = write_exif_fixture(
            dir.path(),
            "shot.tif",
            &[Field {
                tag: Tag::DateTime,
                ifd_num: In::PRIMARY,
                value: ascii("2024:01:15 10:30:45"),
            }],
        );

        let table = load_tag_table(&path).unwrap();
        assert!(table.get_field(Tag::DateTime, In::PRIMARY).is_some());
    }

    // ── user_comment_raw ─────────────────────────────────────────────

    #[test]
    fn user_comment_bytes_come_back_verbatim() {
        let dir = TempDir::new().unwrap();
        let payload = b"ASCII\0\0\0{\"name\":\"Alice\"}".to_vec();
        let path = write_exif_fixture(
            dir.path(),
            "comment.tif",
            &[Field {
                tag: Tag::UserComment,
                ifd_num: In::PRIMARY,
                value: Value::Undefined(payload.clone(), 0),
            }],
        );

        let table = load_tag_table(&path).unwrap();
        assert_eq!(user_comment_raw(&table), Some(payload.as_slice()));
    }

    #[test]
    fn user_comment_absent_is_none() {
        let dir = TempDir::new().unwrap();
        let path = write_exif_fixture(
            dir.path(),
            "plain.tif",
            &[Field {
                tag: Tag::DateTime,
                ifd_num: In::PRIMARY,
                value: ascii("2024:01:15 10:30:45"),
            }],
        );

        let table = load_tag_table(&path).unwrap();
        assert_eq!(user_comment_raw(&table), None);
    }

    // ── gps_fields ───────────────────────────────────────────────────

    #[test]
    fn gps_fields_only_yields_gps_group() {
        let dir = TempDir::new().unwrap();
        let path = write_exif_fixture(
            dir.path(),
            "gps.tif",
            &[
                Field {
                    tag: Tag::DateTime,
                    ifd_num: In::PRIMARY,
                    value: ascii("2024:01:15 10:30:45"),
                },
                Field {
                    tag: Tag::GPSLatitudeRef,
                    ifd_num: In::PRIMARY,
                    value: ascii("N"),
                },
                Field {
                    tag: Tag::GPSAltitude,
                    ifd_num: In::PRIMARY,
                    value: Value::Rational(vec![exif::Rational { num: 10, denom: 2 }]),
                },
            ],
        );

        let table = load_tag_table(&path).unwrap();
        let tags: Vec<Tag> = gps_fields(&table).map(|f| f.tag).collect();
        assert_eq!(tags.len(), 2);
        assert!(tags.contains(&Tag::GPSLatitudeRef));
        assert!(tags.contains(&Tag::GPSAltitude));
    }

    // ── capture_time ─────────────────────────────────────────────────

    #[test]
    fn capture_time_prefers_original() {
        let dir = TempDir::new().unwrap();
        let path = write_exif_fixture(
            dir.path(),
            "both.tif",
            &[
                Field {
                    tag: Tag::DateTime,
                    ifd_num: In::PRIMARY,
                    value: ascii("2024:02:02 00:00:00"),
                },
                Field {
                    tag: Tag::DateTimeOriginal,
                    ifd_num: In::PRIMARY,
                    value: ascii("2024:01:15 10:30:45"),
                },
            ],
        );

        let table = load_tag_table(&path).unwrap();
        assert_eq!(
            capture_time(&table),
            Some(CaptureTime::Original("2024:01:15 10:30:45".to_string()))
        );
    }

    #[test]
    fn capture_time_falls_back_to_generic() {
        let dir = TempDir::new().unwrap();
        let path = write_exif_fixture(
            dir.path(),
            "generic.tif",
            &[Field {
                tag: Tag::DateTime,
                ifd_num: In::PRIMARY,
                value: ascii("2024:02:02 00:00:00"),
            }],
        );

        let table = load_tag_table(&path).unwrap();
        assert_eq!(
            capture_time(&table),
            Some(CaptureTime::Generic("2024:02:02 00:00:00".to_string()))
        );
    }

    #[test]
    fn capture_time_keeps_raw_colon_form() {
        let dir = TempDir::new().unwrap();
        let path = write_exif_fixture(
            dir.path(),
            "colons.tif",
            &[Field {
                tag: Tag::DateTimeOriginal,
                ifd_num: In::PRIMARY,
                value: ascii("2024:01:15 10:30:45"),
            }],
        );

        // The tag text must come back as stored, not reformatted with dashes.
        let table = load_tag_table(&path).unwrap();
        match capture_time(&table) {
            Some(CaptureTime::Original(text)) => {
                assert_eq!(text, "2024:01:15 10:30:45");
                assert!(!text.contains('-'));
            }
            other => panic!("expected original capture time, got {other:?}"),
        }
    }

    #[test]
    fn capture_time_absent_is_none() {
        let dir = TempDir::new().unwrap();
        let path = write_exif_fixture(
            dir.path(),
            "bare.tif",
            &[Field {
                tag: Tag::GPSLatitudeRef,
                ifd_num: In::PRIMARY,
                value: ascii("N"),
            }],
        );

        let table = load_tag_table(&path).unwrap();
        assert_eq!(capture_time(&table), None);
    }
}
