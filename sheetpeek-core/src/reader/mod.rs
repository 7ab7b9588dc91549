//! Spreadsheet archive access

use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use zip::ZipArchive;

pub mod xlsx_parser;

pub use xlsx_parser::{discover_sheet_map, extract_header_row, extract_shared_strings};

/// Open a spreadsheet archive for reading.
///
/// The returned handle owns the underlying file; dropping it releases the
/// file once processing completes.
pub fn open_archive<P: AsRef<Path>>(path: P) -> Result<ZipArchive<BufReader<File>>> {
    let path = path.as_ref();
    let file =
        File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    ZipArchive::new(BufReader::new(file))
        .with_context(|| format!("Failed to open archive: {}", path.display()))
}
