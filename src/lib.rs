//! # exif-peek
//!
//! A small diagnostic library (and CLI) for inspecting EXIF metadata
//! embedded in JPEG and other EXIF-bearing image files. It extracts three
//! projections of the tag table and renders them as human-readable text:
//!
//! - **Form data** — the `UserComment` tag, which the companion camera app
//!   repurposes to store a JSON document of form fields. The payload is
//!   decoded as text and pretty-printed when it parses as JSON.
//! - **GPS data** — every tag in the GPS IFD, with rational values rendered
//!   as decimal quotients (zero-denominator pairs are printed untouched).
//! - **Capture time** — `DateTimeOriginal` from the Exif IFD, falling back
//!   to `DateTime` from the 0th IFD.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! fn main() -> std::io::Result<()> {
//!     let mut out = std::io::stdout();
//!     exif_peek::report::inspect(Path::new("photo.jpg"), &mut out)
//! }
//! ```
//!
//! Missing files, unsupported formats, and undecodable payloads are all
//! reported as messages on the output sink rather than returned as errors;
//! see [`reader::ReadError`] for the underlying fault taxonomy.
//!
//! ## Modules
//!
//! - [`reader`] — EXIF container decoding and tag table projections
//! - [`report`] — text rendering and the top-level [`report::inspect`] entry point

pub mod reader;
pub mod report;
