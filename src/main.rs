use anyhow::Result;
use std::io::{self, Write};
use std::path::PathBuf;

use exif_peek::report;

/// Fallback target when no path is given, matching the camera app's capture
/// naming.
const DEFAULT_IMAGE: &str = "IMG_4343.JPG";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_IMAGE));

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "Checking file: {}", path.display())?;
    report::inspect(&path, &mut out)?;

    Ok(())
}
