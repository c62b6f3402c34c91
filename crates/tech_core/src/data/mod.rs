//! Data structures for tech-tree and content configuration.
//!
//! Pure serde definitions loaded from RON text. This module performs no
//! IO: callers read the files and hand over the text.

mod content_data;
mod tech_tree_data;

pub use content_data::ContentData;
pub use tech_tree_data::{SectorEntry, TechNodeData, TechTreeData};

/// Parse RON text, tagging errors with what was being parsed.
fn parse_ron<T: serde::de::DeserializeOwned>(text: &str, what: &str) -> crate::error::Result<T> {
    ron::from_str(text).map_err(|e| crate::error::TechError::DataParseError {
        what: what.to_string(),
        message: e.to_string(),
    })
}
