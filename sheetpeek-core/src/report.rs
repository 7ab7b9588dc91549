//! Inspection results: the headers recovered (or not) for each mapped sheet

use serde::{Deserialize, Serialize};
use std::fmt;

/// Header row extracted from one mapped sheet entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetHeaders {
    /// Human-readable sheet label from the mapping
    pub label: String,
    /// Archive entry path that was inspected
    pub path: String,
    /// Resolved header cells in document order, or `None` when the entry
    /// is missing from the archive
    pub headers: Option<Vec<String>>,
}

impl SheetHeaders {
    pub fn found(label: impl Into<String>, path: impl Into<String>, headers: Vec<String>) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
            headers: Some(headers),
        }
    }

    pub fn not_found(label: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
            headers: None,
        }
    }

    /// Whether the mapped entry existed in the archive
    pub fn is_found(&self) -> bool {
        self.headers.is_some()
    }
}

impl fmt::Display for SheetHeaders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.headers {
            Some(headers) => write!(f, "{}: {:?}", self.label, headers),
            None => write!(f, "{}: Not found at {}", self.label, self.path),
        }
    }
}
