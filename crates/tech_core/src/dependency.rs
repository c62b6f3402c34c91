//! Dependency tokens.
//!
//! Data files encode dependencies as strings: a plain node name, or a
//! structured sector token `sector:<name>:<condition>`. Tokens are parsed
//! once at load time into [`Dependency`] so the engine never splits strings
//! while evaluating unlocks.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TechError;
use crate::sector::SectorStatus;

/// Prefix marking a structured sector token.
pub const SECTOR_TOKEN_PREFIX: &str = "sector:";

/// Sector progress required by a sector dependency.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SectorCondition {
    /// The sector has been completed.
    Captured,
    /// The sector has been reached (available, in progress or completed).
    Landed,
    /// A condition this engine does not know. Never satisfied.
    Unrecognized(String),
}

impl SectorCondition {
    /// Check a sector status against this condition.
    #[must_use]
    pub fn is_met_by(&self, status: SectorStatus) -> bool {
        match self {
            Self::Captured => status == SectorStatus::Completed,
            Self::Landed => matches!(
                status,
                SectorStatus::Available | SectorStatus::InProgress | SectorStatus::Completed
            ),
            Self::Unrecognized(_) => false,
        }
    }

    fn as_str(&self) -> &str {
        match self {
            Self::Captured => "captured",
            Self::Landed => "landed",
            Self::Unrecognized(raw) => raw,
        }
    }
}

impl From<&str> for SectorCondition {
    fn from(raw: &str) -> Self {
        match raw {
            "captured" => Self::Captured,
            "landed" => Self::Landed,
            other => {
                tracing::warn!(condition = other, "Unknown sector condition, never satisfied");
                Self::Unrecognized(other.to_string())
            }
        }
    }
}

/// A single precondition of a tech node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Dependency {
    /// Another node must be researched.
    Researched(String),
    /// A campaign sector must have reached a given state.
    Sector {
        /// Sector name.
        name: String,
        /// Required progress.
        condition: SectorCondition,
    },
}

impl Dependency {
    /// Shorthand for a plain node dependency.
    pub fn researched(name: impl Into<String>) -> Self {
        Self::Researched(name.into())
    }

    /// Shorthand for a `captured` sector dependency.
    pub fn sector_captured(name: impl Into<String>) -> Self {
        Self::Sector {
            name: name.into(),
            condition: SectorCondition::Captured,
        }
    }

    /// Shorthand for a `landed` sector dependency.
    pub fn sector_landed(name: impl Into<String>) -> Self {
        Self::Sector {
            name: name.into(),
            condition: SectorCondition::Landed,
        }
    }

    /// True for sector tokens.
    #[must_use]
    pub const fn is_sector(&self) -> bool {
        matches!(self, Self::Sector { .. })
    }
}

impl FromStr for Dependency {
    type Err = TechError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let malformed = |reason| TechError::MalformedDependency {
            token: token.to_string(),
            reason,
        };

        let Some(rest) = token.strip_prefix(SECTOR_TOKEN_PREFIX) else {
            if token.trim().is_empty() {
                return Err(malformed("empty node name"));
            }
            return Ok(Self::Researched(token.to_string()));
        };

        // Sector names may contain ':' so the condition is the last segment.
        let (name, condition) = rest
            .rsplit_once(':')
            .ok_or_else(|| malformed("missing sector condition"))?;
        if name.trim().is_empty() {
            return Err(malformed("empty sector name"));
        }

        Ok(Self::Sector {
            name: name.to_string(),
            condition: SectorCondition::from(condition),
        })
    }
}

impl TryFrom<String> for Dependency {
    type Error = TechError;

    fn try_from(token: String) -> Result<Self, Self::Error> {
        token.parse()
    }
}

impl From<Dependency> for String {
    fn from(dep: Dependency) -> Self {
        dep.to_string()
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Researched(name) => f.write_str(name),
            Self::Sector { name, condition } => {
                write!(f, "{SECTOR_TOKEN_PREFIX}{name}:{}", condition.as_str())
            }
        }
    }
}
