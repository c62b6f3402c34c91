//! Data validation utilities.

use std::path::Path;

use serde::Serialize;
use tech_core::graph::ValidationIssue;
use tech_core::layout::Relocation;

use crate::dataset::DataSet;
use crate::error::Result;

/// Outcome of validating a data directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationSummary {
    /// Number of tech nodes loaded.
    pub nodes: usize,
    /// Structural problems in the tree.
    pub issues: Vec<ValidationIssue>,
    /// Tech nodes with no content item.
    pub missing_content: Vec<String>,
    /// Nodes placed from the origin for lack of a layout entry.
    pub unmapped: Vec<String>,
    /// Nodes moved off an occupied cell.
    pub relocated: Vec<Relocation>,
}

impl ValidationSummary {
    /// Number of problems that fail validation.
    ///
    /// Layout fallbacks are reported but do not count.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.issues.len() + self.missing_content.len()
    }

    /// True if nothing fails validation.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.error_count() == 0
    }
}

/// Validate all RON data files in a directory.
///
/// Parse failures, duplicate names and malformed dependency tokens are
/// errors; everything else is collected into the summary.
///
/// # Errors
///
/// Returns an error if any data file fails to read, parse or assemble.
pub fn validate_data_directory(path: &Path) -> Result<ValidationSummary> {
    let data = DataSet::load(path)?;
    let missing_content: Vec<String> = data
        .tree
        .nodes
        .iter()
        .filter(|n| data.content.find_item(&n.name).is_none())
        .map(|n| n.name.clone())
        .collect();

    let context = data.into_context()?;
    let layout = context.layout_report();
    let summary = ValidationSummary {
        nodes: context.nodes().len(),
        issues: context.validate(),
        missing_content,
        unmapped: layout.unmapped.clone(),
        relocated: layout.relocated.clone(),
    };

    for issue in &summary.issues {
        tracing::error!("{issue}");
    }
    for name in &summary.missing_content {
        tracing::error!("'{name}' has no content item");
    }
    for r in &summary.relocated {
        tracing::warn!("'{}' moved from {} to {}", r.node, r.from, r.to);
    }
    Ok(summary)
}
