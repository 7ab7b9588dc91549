//! sheetpeek: Core library for XLSX header inspection
//!
//! This library reads workbook archives directly at the XML level and reports
//! the header row of each mapped worksheet without loading full sheet contents.

pub mod config;
pub mod reader;
pub mod report;

use anyhow::Result;
use std::path::Path;

pub use config::{InspectorConfig, SheetMapping};
pub use report::SheetHeaders;

/// Main inspector interface
pub struct Inspector {
    config: InspectorConfig,
}

impl Inspector {
    /// Create a new inspector with the built-in sheet mapping
    pub fn new() -> Self {
        Self::with_config(InspectorConfig::default())
    }

    /// Create a new inspector with custom configuration
    pub fn with_config(config: InspectorConfig) -> Self {
        Self { config }
    }

    /// Inspect a workbook file and return one report per mapped sheet
    pub fn inspect_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<SheetHeaders>> {
        let mut archive = reader::open_archive(path)?;
        self.inspect_archive(&mut archive)
    }

    /// Inspect an already opened archive.
    ///
    /// The shared-string table is loaded once up front, then sheets are
    /// visited in mapping order. A mapping whose entry is absent from the
    /// archive yields a not-found report instead of aborting the rest.
    pub fn inspect_archive(
        &self,
        archive: &mut zip::ZipArchive<impl std::io::Read + std::io::Seek>,
    ) -> Result<Vec<SheetHeaders>> {
        let shared_strings = reader::extract_shared_strings(archive)?;
        let mut reports = Vec::with_capacity(self.config.sheets.len());

        for mapping in &self.config.sheets {
            let headers = reader::extract_header_row(
                archive,
                &mapping.path,
                &shared_strings,
                self.config.header_row,
            )?;
            reports.push(match headers {
                Some(headers) => SheetHeaders::found(&mapping.label, &mapping.path, headers),
                None => SheetHeaders::not_found(&mapping.label, &mapping.path),
            });
        }

        Ok(reports)
    }
}

impl Default for Inspector {
    fn default() -> Self {
        Self::new()
    }
}
