//! Tech-tree file format.

use serde::{Deserialize, Serialize};

use crate::dependency::Dependency;
use crate::error::Result;
use crate::graph::{TechGraph, TechNode, UnlockRules};
use crate::layout::{LayoutEntry, LayoutTable};
use crate::ledger::{ResourceCost, ResourceItem, ResourceLedger};
use crate::sector::{SectorBoard, SectorStatus};

/// Data-driven tech node definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechNodeData {
    /// Content-item name.
    pub name: String,

    /// Dependency tokens: node names or `sector:<name>:<condition>`.
    #[serde(default)]
    pub dependencies: Vec<Dependency>,

    /// Nodes drawn as connected to this one.
    #[serde(default)]
    pub visual_connections: Vec<String>,

    /// Research price.
    #[serde(default)]
    pub research_costs: Vec<ResourceCost>,
}

impl TechNodeData {
    /// Check if this node has a plain dependency on another node.
    #[must_use]
    pub fn requires(&self, node: &str) -> bool {
        self.dependencies
            .iter()
            .any(|d| matches!(d, Dependency::Researched(name) if name == node))
    }

    fn to_node(&self) -> TechNode {
        TechNode::new(self.name.clone())
            .with_dependencies(self.dependencies.iter().cloned())
            .with_visual_connections(self.visual_connections.iter().cloned())
            .with_costs(self.research_costs.iter().cloned())
    }
}

/// Initial state of a campaign sector for offline simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorEntry {
    /// Sector name.
    pub name: String,
    /// Status at startup.
    #[serde(default)]
    pub status: SectorStatus,
}

/// Complete tech-tree definition.
///
/// # Example RON
///
/// ```ron
/// TechTreeData(
///     nodes: [
///         (name: "Ground Zero"),
///         (name: "Frozen Forest", visual_connections: ["Ground Zero"]),
///         (name: "Copper"),
///         (
///             name: "Graphite Press",
///             dependencies: ["Copper", "sector:Ground Zero:captured"],
///             research_costs: [(resource: "Copper", amount: 100)],
///         ),
///     ],
///     layout: [
///         (name: "Ground Zero", x: 0, y: 0),
///         (name: "Frozen Forest", x: 0, y: 2),
///     ],
///     starting_resources: [(name: "Copper", quantity: 50)],
///     sectors: [(name: "Ground Zero", status: Available)],
/// )
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechTreeData {
    /// Nodes in declaration order.
    pub nodes: Vec<TechNodeData>,

    /// Static placement table.
    #[serde(default)]
    pub layout: Vec<LayoutEntry>,

    /// Ledger contents at startup.
    #[serde(default)]
    pub starting_resources: Vec<ResourceItem>,

    /// Sector states for offline simulation.
    #[serde(default)]
    pub sectors: Vec<SectorEntry>,
}

impl TechTreeData {
    /// Parse a tech tree from RON text.
    ///
    /// Dependency tokens are parsed here; a malformed token fails the
    /// whole file.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::TechError::DataParseError`] on malformed input.
    pub fn from_ron_str(text: &str) -> Result<Self> {
        super::parse_ron(text, "tech tree data")
    }

    /// Find a node definition by name.
    #[must_use]
    pub fn get_node(&self, name: &str) -> Option<&TechNodeData> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// Build the node graph with every node locked and at the origin.
    ///
    /// # Errors
    ///
    /// Fails if two nodes share a name.
    pub fn build_graph(&self, rules: UnlockRules) -> Result<TechGraph> {
        TechGraph::from_nodes(self.nodes.iter().map(TechNodeData::to_node), rules)
    }

    /// Build the layout table.
    ///
    /// # Errors
    ///
    /// Fails if a name is placed twice.
    pub fn layout_table(&self) -> Result<LayoutTable> {
        LayoutTable::from_entries(self.layout.iter().cloned())
    }

    /// Build the starting ledger.
    ///
    /// # Errors
    ///
    /// Fails if a resource is listed twice.
    pub fn starting_ledger(&self) -> Result<ResourceLedger> {
        ResourceLedger::from_entries(self.starting_resources.iter().cloned())
    }

    /// Build a sector board from the sector table.
    #[must_use]
    pub fn sector_board(&self) -> SectorBoard {
        self.sectors
            .iter()
            .fold(SectorBoard::new(), |board, s| board.with(s.name.clone(), s.status))
    }
}
