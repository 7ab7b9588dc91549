//! Output formatters for header reports

use anyhow::Result;
use sheetpeek_core::SheetHeaders;
use std::path::Path;

/// Print one line per mapped sheet, in mapping order
pub fn print_human(reports: &[SheetHeaders]) {
    for report in reports {
        println!("{}", report);
    }
}

/// Print reports in JSON format
pub fn print_json(file_path: &Path, reports: &[SheetHeaders]) -> Result<()> {
    let found = reports.iter().filter(|r| r.is_found()).count();
    let output = serde_json::json!({
        "file": file_path.display().to_string(),
        "sheets": reports,
        "summary": {
            "total": reports.len(),
            "found": found,
            "missing": reports.len() - found,
        }
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
