//! # Tech Core
//!
//! Research-tree engine for a factory-building campaign.
//!
//! This crate contains the rules behind the research screen:
//! - Dependency evaluation and the unlock/discovery fixed point
//! - Resource accounting for research costs
//! - Sector-gated research driven by campaign progress
//! - Node placement and connector routing for the tree view
//!
//! It does no rendering and no IO beyond parsing RON text handed to it.
//! Every operation is deterministic for identical inputs.
//!
//! ## Crate Structure
//!
//! - [`context`] - Session facade tying everything together
//! - [`graph`] - Tech nodes, unlock rules and research
//! - [`ledger`] - Resource quantities and cost payment
//! - [`router`] - Connector routing between node cells
//! - [`layout`] - Static placement and collision resolution
//! - [`data`] - RON file formats

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod config;
pub mod content;
pub mod context;
pub mod data;
pub mod dependency;
pub mod error;
pub mod graph;
pub mod grid;
pub mod layout;
pub mod ledger;
pub mod router;
pub mod sector;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::EngineConfig;
    pub use crate::content::{ContentCategory, ContentItem, ContentKind, ContentRegistry};
    pub use crate::context::ResearchContext;
    pub use crate::data::{ContentData, TechTreeData};
    pub use crate::dependency::{Dependency, SectorCondition};
    pub use crate::error::{Result, TechError};
    pub use crate::graph::{
        NodeState, ResearchBlocker, SectorChainPolicy, SettleReport, TechGraph, TechNode,
        UnlockRules, ValidationIssue,
    };
    pub use crate::grid::{GridBounds, GridPosition};
    pub use crate::layout::{LayoutEntry, LayoutReport, LayoutTable};
    pub use crate::ledger::{ResourceCost, ResourceItem, ResourceLedger, Shortfall};
    pub use crate::router::{route, Connection, Route, RouteStrategy, RouterConfig};
    pub use crate::sector::{SectorBoard, SectorHooks, SectorResolver, SectorStatus};
}
