//! Engine configuration.
//!
//! Every field has a default, so an empty RON struct `()` is a valid
//! configuration.
//!
//! # Example RON
//!
//! ```ron
//! EngineConfig(
//!     smart_routing: true,
//!     sector_chain: AllPredecessors,
//!     router: RouterConfig(open_set_cap: 250),
//! )
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Result, TechError};
use crate::graph::{SectorChainPolicy, UnlockRules};
use crate::router::RouterConfig;

/// Top-level engine settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Route connectors around nodes instead of drawing a plain bend.
    pub smart_routing: bool,
    /// Sector-chain dependency synthesis.
    pub sector_chain: SectorChainPolicy,
    /// Research sector nodes once their sector is captured.
    pub sector_auto_research: bool,
    /// Connector routing parameters.
    pub router: RouterConfig,
    /// Log a warning for every node missing from the layout table.
    pub warn_on_unmapped_layout: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            smart_routing: true,
            sector_chain: SectorChainPolicy::default(),
            sector_auto_research: true,
            router: RouterConfig::default(),
            warn_on_unmapped_layout: true,
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from RON text.
    ///
    /// # Errors
    ///
    /// Returns [`TechError::DataParseError`] if the text is not a valid
    /// `EngineConfig`.
    pub fn from_ron_str(text: &str) -> Result<Self> {
        ron::from_str(text).map_err(|e| TechError::DataParseError {
            what: "engine config".into(),
            message: e.to_string(),
        })
    }

    /// The unlock rules this configuration selects.
    #[must_use]
    pub const fn unlock_rules(&self) -> UnlockRules {
        UnlockRules {
            sector_chain: self.sector_chain,
            sector_auto_research: self.sector_auto_research,
        }
    }
}
