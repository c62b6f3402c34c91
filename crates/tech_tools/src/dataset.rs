//! Loading a data directory.
//!
//! A data directory holds `content.ron` and `tech_tree.ron`, and optionally
//! `engine.ron`. Missing optional files fall back to defaults.

use std::fs;
use std::path::{Path, PathBuf};

use tech_core::config::EngineConfig;
use tech_core::content::ContentRegistry;
use tech_core::context::ResearchContext;
use tech_core::data::{ContentData, TechTreeData};
use tech_core::error::TechError;

use crate::error::{Result, ToolError};

/// Content table file name.
pub const CONTENT_FILE: &str = "content.ron";
/// Tech tree file name.
pub const TECH_TREE_FILE: &str = "tech_tree.ron";
/// Engine configuration file name.
pub const CONFIG_FILE: &str = "engine.ron";

/// Everything loaded from one data directory.
#[derive(Debug, Clone)]
pub struct DataSet {
    /// Content registry.
    pub content: ContentRegistry,
    /// Tech tree definition.
    pub tree: TechTreeData,
    /// Engine settings.
    pub config: EngineConfig,
}

impl DataSet {
    /// Load and parse every file in a data directory.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Io`] if a required file cannot be read and
    /// [`ToolError::Data`] if any file fails to parse.
    pub fn load(dir: &Path) -> Result<Self> {
        let content_path = dir.join(CONTENT_FILE);
        let content = parse(&content_path, &read(&content_path)?, |text| {
            ContentData::from_ron_str(text)?.into_registry()
        })?;

        let tree_path = dir.join(TECH_TREE_FILE);
        let tree = parse(&tree_path, &read(&tree_path)?, TechTreeData::from_ron_str)?;

        let config_path = dir.join(CONFIG_FILE);
        let config = if config_path.exists() {
            parse(&config_path, &read(&config_path)?, EngineConfig::from_ron_str)?
        } else {
            tracing::debug!(path = %config_path.display(), "No engine config, using defaults");
            EngineConfig::default()
        };

        tracing::info!(
            items = content.len(),
            nodes = tree.nodes.len(),
            "Loaded data from {}",
            dir.display()
        );
        Ok(Self {
            content,
            tree,
            config,
        })
    }

    /// Start a research session over this data.
    ///
    /// # Errors
    ///
    /// Fails on duplicate nodes, layout entries or resources.
    pub fn into_context(self) -> Result<ResearchContext> {
        Ok(ResearchContext::new(self.content, &self.tree, self.config)?)
    }
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| ToolError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn parse<T>(
    path: &Path,
    text: &str,
    parser: impl FnOnce(&str) -> std::result::Result<T, TechError>,
) -> Result<T> {
    parser(text).map_err(|source| ToolError::Data {
        path: PathBuf::from(path),
        source,
    })
}
