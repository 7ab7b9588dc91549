//! Configuration for the header inspector: which archive entries to read
//! and which row to treat as the header row.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Spreadsheet rows are 1-based; row 1 conventionally holds the headers.
const DEFAULT_HEADER_ROW: u32 = 1;

/// One sheet-path-to-label association.
///
/// `path` is the entry name inside the archive (e.g.
/// `xl/worksheets/sheet4.xml`), `label` the human-readable name printed
/// next to the extracted headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetMapping {
    pub path: String,
    pub label: String,
}

impl SheetMapping {
    pub fn new(path: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            label: label.into(),
        }
    }
}

/// Inspector configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectorConfig {
    /// Row number to read headers from (1-based)
    #[serde(default = "default_header_row")]
    pub header_row: u32,
    /// Ordered mapping of archive entry paths to sheet labels; output
    /// follows this order
    #[serde(default)]
    pub sheets: Vec<SheetMapping>,
}

fn default_header_row() -> u32 {
    DEFAULT_HEADER_ROW
}

impl InspectorConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: InspectorConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Check that the configuration can drive an inspection run
    pub fn validate(&self) -> Result<()> {
        if self.header_row == 0 {
            anyhow::bail!("Configuration error: header_row is 1-based and must be at least 1");
        }

        if self.sheets.is_empty() {
            anyhow::bail!("Configuration error: no sheet mappings defined");
        }

        for mapping in &self.sheets {
            if mapping.path.is_empty() {
                anyhow::bail!(
                    "Configuration error: sheet mapping for '{}' has an empty path",
                    mapping.label
                );
            }
            if mapping.label.is_empty() {
                anyhow::bail!(
                    "Configuration error: sheet mapping for '{}' has an empty label",
                    mapping.path
                );
            }
        }

        Ok(())
    }
}

impl Default for InspectorConfig {
    fn default() -> Self {
        // Built-in mapping for the project-tracker workbook layout this
        // tool ships against. Entry order is output order.
        Self {
            header_row: DEFAULT_HEADER_ROW,
            sheets: vec![
                SheetMapping::new("xl/worksheets/sheet4.xml", "Project Master"),
                SheetMapping::new("xl/worksheets/sheet5.xml", "Invoice Tracker"),
                SheetMapping::new("xl/worksheets/sheet6.xml", "Income"),
                SheetMapping::new("xl/worksheets/sheet7.xml", "Expenses"),
                SheetMapping::new("xl/worksheets/sheet2.xml", "Operations"),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mapping() {
        let config = InspectorConfig::default();

        assert_eq!(config.header_row, 1);
        assert_eq!(config.sheets.len(), 5);
        assert_eq!(config.sheets[0].path, "xl/worksheets/sheet4.xml");
        assert_eq!(config.sheets[0].label, "Project Master");
        assert_eq!(config.sheets[4].path, "xl/worksheets/sheet2.xml");
        assert_eq!(config.sheets[4].label, "Operations");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_toml() {
        let config: InspectorConfig = toml::from_str(
            r#"
            header_row = 3

            [[sheets]]
            path = "xl/worksheets/sheet1.xml"
            label = "Summary"

            [[sheets]]
            path = "xl/worksheets/sheet2.xml"
            label = "Detail"
            "#,
        )
        .unwrap();

        assert_eq!(config.header_row, 3);
        assert_eq!(
            config.sheets,
            vec![
                SheetMapping::new("xl/worksheets/sheet1.xml", "Summary"),
                SheetMapping::new("xl/worksheets/sheet2.xml", "Detail"),
            ]
        );
    }

    #[test]
    fn test_header_row_defaults_to_one() {
        let config: InspectorConfig = toml::from_str(
            r#"
            [[sheets]]
            path = "xl/worksheets/sheet1.xml"
            label = "Summary"
            "#,
        )
        .unwrap();

        assert_eq!(config.header_row, 1);
    }

    #[test]
    fn test_validation() {
        let mut config = InspectorConfig::default();
        config.header_row = 0;
        assert!(config.validate().is_err());

        let config = InspectorConfig {
            header_row: 1,
            sheets: Vec::new(),
        };
        assert!(config.validate().is_err());

        let config = InspectorConfig {
            header_row: 1,
            sheets: vec![SheetMapping::new("", "Summary")],
        };
        assert!(config.validate().is_err());

        let config = InspectorConfig {
            header_row: 1,
            sheets: vec![SheetMapping::new("xl/worksheets/sheet1.xml", "")],
        };
        assert!(config.validate().is_err());
    }
}
