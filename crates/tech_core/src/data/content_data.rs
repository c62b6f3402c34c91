//! Content database file format.

use serde::{Deserialize, Serialize};

use crate::content::{ContentItem, ContentRegistry};
use crate::error::Result;

/// Serialized content database.
///
/// # Example RON
///
/// ```ron
/// ContentData(
///     items: [
///         (name: "Copper", kind: Resource((hardness: 1))),
///         (name: "Conveyor", kind: Block((category: "distribution", health: 45))),
///         (name: "Ground Zero", kind: Sector((planet: "serpulo", capture_wave: 10))),
///     ],
/// )
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentData {
    /// Items in declaration order.
    #[serde(default)]
    pub items: Vec<ContentItem>,
}

impl ContentData {
    /// Parse content data from RON text.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::TechError::DataParseError`] on malformed input.
    pub fn from_ron_str(text: &str) -> Result<Self> {
        super::parse_ron(text, "content data")
    }

    /// Build a registry from the parsed items.
    ///
    /// # Errors
    ///
    /// Fails if two items share a name.
    pub fn into_registry(self) -> Result<ContentRegistry> {
        ContentRegistry::from_items(self.items)
    }
}
