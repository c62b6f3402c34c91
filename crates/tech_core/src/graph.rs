//! Tech node graph and unlock engine.
//!
//! Nodes are keyed by content-item name. Each node carries stored
//! dependencies, research costs and two pieces of derived state:
//!
//! - `unlocked`: every effective dependency is met.
//! - `researched`: the node was paid for (or discovered passively) and
//!   committed. Never reverts.
//!
//! Two kinds of node resolve themselves instead of being researched by hand:
//!
//! - **Resource nodes** (the node name matches a ledger entry) are
//!   researched as soon as the player holds any of that resource.
//! - **Sector nodes** are researched when their own sector is captured.
//!
//! All rules are re-applied by [`TechGraph::settle`], which loops until a
//! pass changes nothing. Every operation is synchronous and runs on the
//! caller's thread.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::dependency::Dependency;
use crate::error::{Result, TechError};
use crate::grid::GridPosition;
use crate::ledger::{ResourceCost, ResourceLedger, Shortfall};
use crate::sector::{SectorResolver, SectorStatus};

/// Lexical prefixes that mark a node name as a sector.
const SECTOR_NAME_PREFIXES: [&str; 2] = ["sector ", "sector:"];

/// How visual links between sector nodes turn into dependencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SectorChainPolicy {
    /// Require only the first sector predecessor in stored order.
    #[default]
    FirstPredecessor,
    /// Require every sector predecessor.
    AllPredecessors,
}

/// Tunable unlock rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockRules {
    /// Sector-chain dependency synthesis.
    pub sector_chain: SectorChainPolicy,
    /// Research sector nodes once their sector is captured.
    pub sector_auto_research: bool,
}

impl Default for UnlockRules {
    fn default() -> Self {
        Self {
            sector_chain: SectorChainPolicy::FirstPredecessor,
            sector_auto_research: true,
        }
    }
}

/// Display state of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeState {
    /// Some dependency is unmet.
    Locked,
    /// Dependencies met, not yet researched.
    Available,
    /// Researched.
    Researched,
}

/// A research wrapper around a content item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechNode {
    name: String,
    position: GridPosition,
    dependencies: Vec<Dependency>,
    visual_connections: Vec<String>,
    research_costs: Vec<ResourceCost>,
    unlocked: bool,
    researched: bool,
}

impl TechNode {
    /// Create a node with no dependencies, connections or costs.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: GridPosition::ORIGIN,
            dependencies: Vec::new(),
            visual_connections: Vec::new(),
            research_costs: Vec::new(),
            unlocked: false,
            researched: false,
        }
    }

    /// Set stored dependencies. Repeats are dropped, first occurrence wins.
    #[must_use]
    pub fn with_dependencies(mut self, dependencies: impl IntoIterator<Item = Dependency>) -> Self {
        self.dependencies.clear();
        for dep in dependencies {
            if !self.dependencies.contains(&dep) {
                self.dependencies.push(dep);
            }
        }
        self
    }

    /// Set visual connections. Repeats are dropped, first occurrence wins.
    #[must_use]
    pub fn with_visual_connections<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.visual_connections.clear();
        for source in sources {
            let source = source.into();
            if !self.visual_connections.contains(&source) {
                self.visual_connections.push(source);
            }
        }
        self
    }

    /// Set research costs.
    #[must_use]
    pub fn with_costs(mut self, costs: impl IntoIterator<Item = ResourceCost>) -> Self {
        self.research_costs = costs.into_iter().collect();
        self
    }

    /// Set the initial grid position.
    #[must_use]
    pub const fn at(mut self, position: GridPosition) -> Self {
        self.position = position;
        self
    }

    /// Content-item name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Grid cell.
    #[must_use]
    pub const fn position(&self) -> GridPosition {
        self.position
    }

    /// Stored dependencies.
    #[must_use]
    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    /// Nodes drawn as connected to this one.
    #[must_use]
    pub fn visual_connections(&self) -> &[String] {
        &self.visual_connections
    }

    /// Research price.
    #[must_use]
    pub fn research_costs(&self) -> &[ResourceCost] {
        &self.research_costs
    }

    /// Every effective dependency was met at some point.
    #[must_use]
    pub const fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    /// Committed.
    #[must_use]
    pub const fn is_researched(&self) -> bool {
        self.researched
    }

    /// Display state.
    #[must_use]
    pub const fn state(&self) -> NodeState {
        if self.researched {
            NodeState::Researched
        } else if self.unlocked {
            NodeState::Available
        } else {
            NodeState::Locked
        }
    }

    fn commit(&mut self) {
        self.unlocked = true;
        self.researched = true;
    }
}

fn has_sector_prefix(name: &str) -> bool {
    let lower = name.to_lowercase();
    SECTOR_NAME_PREFIXES.iter().any(|p| lower.starts_with(p))
}

fn strip_sector_prefix(name: &str) -> Option<&str> {
    SECTOR_NAME_PREFIXES.iter().find_map(|p| {
        let head = name.get(..p.len())?;
        head.eq_ignore_ascii_case(p).then(|| name[p.len()..].trim_start())
    })
}

/// Why a node cannot be researched right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResearchBlocker {
    /// No node with this name.
    UnknownNode,
    /// Already researched.
    AlreadyResearched,
    /// Resource nodes are discovered by holding the resource.
    ResourceProxy,
    /// Sector nodes follow campaign progress.
    SectorProxy,
    /// An effective dependency is unmet.
    UnmetDependency(Dependency),
    /// Not enough of a resource.
    MissingResources(Shortfall),
}

/// Outcome of [`TechGraph::settle`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettleReport {
    /// Passes run, including the final pass that changed nothing.
    pub passes: usize,
    /// Nodes newly unlocked, in the order they changed.
    pub unlocked: Vec<String>,
    /// Nodes newly researched without payment, in the order they changed.
    pub researched: Vec<String>,
    /// False if the pass cap was hit before a quiet pass.
    pub converged: bool,
}

impl SettleReport {
    /// True if no node changed.
    #[must_use]
    pub fn is_quiet(&self) -> bool {
        self.unlocked.is_empty() && self.researched.is_empty()
    }
}

/// Structural problem found by [`TechGraph::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationIssue {
    /// A dependency names a node that does not exist; the node never unlocks.
    UnknownDependency {
        /// Dependent node.
        node: String,
        /// Missing node name.
        dependency: String,
    },
    /// A visual connection names a node that does not exist.
    UnknownVisualConnection {
        /// Node drawing the connection.
        node: String,
        /// Missing node name.
        source: String,
    },
    /// Nodes that depend on each other in a loop; none of them can unlock.
    DependencyCycle(Vec<String>),
    /// A cost names a resource the ledger does not track.
    UnknownCostResource {
        /// Node with the cost.
        node: String,
        /// Untracked resource.
        resource: String,
    },
    /// A resource or sector node lists research costs. Such nodes resolve
    /// without payment, so the costs are never charged.
    CostOnAutoResolvedNode {
        /// Node with the dead costs.
        node: String,
    },
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownDependency { node, dependency } => {
                write!(f, "'{node}' depends on unknown node '{dependency}'")
            }
            Self::UnknownVisualConnection { node, source } => {
                write!(f, "'{node}' is drawn from unknown node '{source}'")
            }
            Self::DependencyCycle(cycle) => write!(f, "dependency cycle: {}", cycle.join(" -> ")),
            Self::UnknownCostResource { node, resource } => {
                write!(f, "'{node}' costs untracked resource '{resource}'")
            }
            Self::CostOnAutoResolvedNode { node } => {
                write!(f, "'{node}' resolves without research but lists research costs")
            }
        }
    }
}

/// The full tech tree.
#[derive(Debug, Clone, Default)]
pub struct TechGraph {
    nodes: Vec<TechNode>,
    by_name: HashMap<String, usize>,
    rules: UnlockRules,
}

impl TechGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new(rules: UnlockRules) -> Self {
        Self {
            nodes: Vec::new(),
            by_name: HashMap::new(),
            rules,
        }
    }

    /// Build a graph from nodes in declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`TechError::DuplicateNode`] if two nodes share a name.
    pub fn from_nodes<I>(nodes: I, rules: UnlockRules) -> Result<Self>
    where
        I: IntoIterator<Item = TechNode>,
    {
        let mut graph = Self::new(rules);
        for node in nodes {
            graph.insert(node)?;
        }
        Ok(graph)
    }

    /// Add a node.
    ///
    /// # Errors
    ///
    /// Returns [`TechError::DuplicateNode`] if the name is taken.
    pub fn insert(&mut self, node: TechNode) -> Result<()> {
        if self.by_name.contains_key(&node.name) {
            return Err(TechError::DuplicateNode(node.name));
        }
        self.by_name.insert(node.name.clone(), self.nodes.len());
        self.nodes.push(node);
        Ok(())
    }

    /// Unlock rules in force.
    #[must_use]
    pub const fn rules(&self) -> UnlockRules {
        self.rules
    }

    /// All nodes in declaration order.
    #[must_use]
    pub fn nodes(&self) -> &[TechNode] {
        &self.nodes
    }

    /// Look up a node.
    #[must_use]
    pub fn node(&self, name: &str) -> Option<&TechNode> {
        self.index_of(name).map(|i| &self.nodes[i])
    }

    /// True if a node has this name.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Declaration index of a node.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub(crate) fn set_position(&mut self, index: usize, position: GridPosition) {
        self.nodes[index].position = position;
    }

    /// Display state of a node.
    #[must_use]
    pub fn node_state(&self, name: &str) -> Option<NodeState> {
        self.node(name).map(TechNode::state)
    }

    // ------------------------------------------------------------------
    // Classification
    // ------------------------------------------------------------------

    fn is_sector_name(name: &str, sectors: &dyn SectorResolver) -> bool {
        sectors.is_sector_name(name) || has_sector_prefix(name)
    }

    /// True if a node stands for a campaign sector.
    ///
    /// Either its name is a sector (known to the resolver, or prefixed with
    /// `"sector "`/`"sector:"`), or it depends on a sector token. Synthesized
    /// sector-chain tokens only exist for nodes that already qualify, so
    /// stored dependencies are enough here.
    #[must_use]
    pub fn is_sector_node(&self, node: &TechNode, sectors: &dyn SectorResolver) -> bool {
        Self::is_sector_name(&node.name, sectors)
            || node.dependencies.iter().any(Dependency::is_sector)
    }

    fn is_sector_target(&self, name: &str, sectors: &dyn SectorResolver) -> bool {
        match self.node(name) {
            Some(node) => self.is_sector_node(node, sectors),
            None => Self::is_sector_name(name, sectors),
        }
    }

    /// True if a node stands for a material tracked by the ledger.
    #[must_use]
    pub fn is_resource_node(&self, node: &TechNode, ledger: &ResourceLedger) -> bool {
        ledger.contains(&node.name)
    }

    /// The sector whose capture researches this node, if it names one.
    fn own_sector<'a>(node: &'a TechNode, sectors: &dyn SectorResolver) -> Option<&'a str> {
        if sectors.is_sector_name(&node.name) {
            Some(node.name.as_str())
        } else {
            strip_sector_prefix(&node.name)
        }
    }

    // ------------------------------------------------------------------
    // Dependencies
    // ------------------------------------------------------------------

    /// Stored dependencies plus sector-chain synthesis.
    ///
    /// For a sector node, each visual connection that is itself a sector
    /// contributes `sector:<source>:captured`: only the first one under
    /// [`SectorChainPolicy::FirstPredecessor`], all of them under
    /// [`SectorChainPolicy::AllPredecessors`]. Stored state is not touched.
    #[must_use]
    pub fn effective_dependencies(
        &self,
        node: &TechNode,
        sectors: &dyn SectorResolver,
    ) -> Vec<Dependency> {
        let mut deps = node.dependencies.clone();
        if !self.is_sector_node(node, sectors) {
            return deps;
        }

        let predecessors = node
            .visual_connections
            .iter()
            .filter(|source| self.is_sector_target(source, sectors));
        let take = match self.rules.sector_chain {
            SectorChainPolicy::FirstPredecessor => 1,
            SectorChainPolicy::AllPredecessors => usize::MAX,
        };
        for source in predecessors.take(take) {
            let synthesized = Dependency::sector_captured(source.as_str());
            if !deps.contains(&synthesized) {
                deps.push(synthesized);
            }
        }
        deps
    }

    /// Evaluate one dependency.
    ///
    /// A plain dependency on a node that does not exist is never met.
    #[must_use]
    pub fn is_dependency_met(&self, dep: &Dependency, sectors: &dyn SectorResolver) -> bool {
        match dep {
            Dependency::Researched(name) => self.node(name).is_some_and(TechNode::is_researched),
            Dependency::Sector { name, condition } => condition.is_met_by(sectors.status(name)),
        }
    }

    fn dependencies_met(&self, node: &TechNode, sectors: &dyn SectorResolver) -> bool {
        self.effective_dependencies(node, sectors)
            .iter()
            .all(|dep| self.is_dependency_met(dep, sectors))
    }

    // ------------------------------------------------------------------
    // Research
    // ------------------------------------------------------------------

    /// Check if a node can be researched by spending resources now.
    #[must_use]
    pub fn can_research(
        &self,
        name: &str,
        ledger: &ResourceLedger,
        sectors: &dyn SectorResolver,
    ) -> bool {
        let Some(node) = self.node(name) else {
            return false;
        };
        !node.researched
            && !self.is_resource_node(node, ledger)
            && !self.is_sector_node(node, sectors)
            && self.dependencies_met(node, sectors)
            && ledger.can_afford(&node.research_costs)
    }

    /// Everything standing between a node and research, for UI display.
    ///
    /// Empty exactly when [`TechGraph::can_research`] is true.
    #[must_use]
    pub fn research_blockers(
        &self,
        name: &str,
        ledger: &ResourceLedger,
        sectors: &dyn SectorResolver,
    ) -> Vec<ResearchBlocker> {
        let Some(node) = self.node(name) else {
            return vec![ResearchBlocker::UnknownNode];
        };
        if node.researched {
            return vec![ResearchBlocker::AlreadyResearched];
        }

        let mut blockers = Vec::new();
        if self.is_resource_node(node, ledger) {
            blockers.push(ResearchBlocker::ResourceProxy);
        }
        if self.is_sector_node(node, sectors) {
            blockers.push(ResearchBlocker::SectorProxy);
        }
        blockers.extend(
            self.effective_dependencies(node, sectors)
                .into_iter()
                .filter(|dep| !self.is_dependency_met(dep, sectors))
                .map(ResearchBlocker::UnmetDependency),
        );
        blockers.extend(
            ledger
                .shortfalls(&node.research_costs)
                .into_iter()
                .map(ResearchBlocker::MissingResources),
        );
        blockers
    }

    /// Spend the node's costs and commit it, then settle the graph.
    ///
    /// Does nothing and returns `false` if [`TechGraph::can_research`] is
    /// false; the ledger is untouched in that case.
    pub fn research(
        &mut self,
        name: &str,
        ledger: &mut ResourceLedger,
        sectors: &dyn SectorResolver,
    ) -> bool {
        if !self.can_research(name, ledger, sectors) {
            tracing::debug!(node = name, "Research rejected");
            return false;
        }
        let Some(index) = self.index_of(name) else {
            return false;
        };
        if let Err(e) = ledger.spend_all(&self.nodes[index].research_costs) {
            tracing::debug!(node = name, error = %e, "Research payment failed");
            return false;
        }

        self.nodes[index].commit();
        tracing::debug!(node = name, "Researched");
        self.settle(ledger, sectors);
        true
    }

    // ------------------------------------------------------------------
    // Propagation
    // ------------------------------------------------------------------

    /// One unlock pass over all nodes.
    ///
    /// Every candidate is judged against the state at the start of the pass.
    /// Returns the indices of nodes that became unlocked.
    pub fn unlock_pass(&mut self, sectors: &dyn SectorResolver) -> Vec<usize> {
        let newly: Vec<usize> = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| !node.unlocked && self.dependencies_met(node, sectors))
            .map(|(i, _)| i)
            .collect();

        for &i in &newly {
            self.nodes[i].unlocked = true;
            tracing::debug!(node = %self.nodes[i].name, "Unlocked");
        }
        newly
    }

    fn auto_resolves(
        &self,
        node: &TechNode,
        ledger: &ResourceLedger,
        sectors: &dyn SectorResolver,
    ) -> bool {
        if node.researched || !self.dependencies_met(node, sectors) {
            return false;
        }
        if self.is_resource_node(node, ledger) {
            return ledger.quantity(&node.name) > 0;
        }
        if self.rules.sector_auto_research && self.is_sector_node(node, sectors) {
            return Self::own_sector(node, sectors)
                .map_or(true, |sector| sectors.status(sector) == SectorStatus::Completed);
        }
        false
    }

    /// One passive-discovery pass over all nodes.
    ///
    /// Resource nodes held in non-zero quantity and captured sector nodes
    /// are researched without payment, provided their dependencies are met.
    /// Returns the indices of nodes that became researched.
    pub fn auto_research_pass(
        &mut self,
        ledger: &ResourceLedger,
        sectors: &dyn SectorResolver,
    ) -> Vec<usize> {
        let newly: Vec<usize> = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| self.auto_resolves(node, ledger, sectors))
            .map(|(i, _)| i)
            .collect();

        for &i in &newly {
            self.nodes[i].commit();
            tracing::debug!(node = %self.nodes[i].name, "Auto-researched");
        }
        newly
    }

    /// Apply unlock and auto-research passes until one changes nothing.
    ///
    /// Each pass either changes at least one node or ends the loop, and node
    /// state only moves forward, so the loop stops within `len() + 1`
    /// passes. That bound is enforced as a cap.
    pub fn settle(&mut self, ledger: &ResourceLedger, sectors: &dyn SectorResolver) -> SettleReport {
        let cap = self.nodes.len() + 1;
        let mut report = SettleReport::default();

        while report.passes < cap {
            report.passes += 1;
            let unlocked = self.unlock_pass(sectors);
            let researched = self.auto_research_pass(ledger, sectors);
            if unlocked.is_empty() && researched.is_empty() {
                report.converged = true;
                break;
            }
            report
                .unlocked
                .extend(unlocked.into_iter().map(|i| self.nodes[i].name.clone()));
            report
                .researched
                .extend(researched.into_iter().map(|i| self.nodes[i].name.clone()));
        }

        if report.converged {
            tracing::debug!(
                passes = report.passes,
                unlocked = report.unlocked.len(),
                researched = report.researched.len(),
                "Tech graph settled"
            );
        } else {
            tracing::warn!(passes = report.passes, "Tech graph settle hit pass cap");
        }
        report
    }

    // ------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------

    /// Find structural problems that leave nodes permanently locked or
    /// connections undrawable.
    #[must_use]
    pub fn validate(
        &self,
        ledger: &ResourceLedger,
        sectors: &dyn SectorResolver,
    ) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        for node in &self.nodes {
            for dep in &node.dependencies {
                if let Dependency::Researched(target) = dep {
                    if !self.contains(target) {
                        issues.push(ValidationIssue::UnknownDependency {
                            node: node.name.clone(),
                            dependency: target.clone(),
                        });
                    }
                }
            }
            for source in &node.visual_connections {
                if !self.contains(source) {
                    issues.push(ValidationIssue::UnknownVisualConnection {
                        node: node.name.clone(),
                        source: source.clone(),
                    });
                }
            }
            for cost in &node.research_costs {
                if !ledger.contains(&cost.resource) {
                    issues.push(ValidationIssue::UnknownCostResource {
                        node: node.name.clone(),
                        resource: cost.resource.clone(),
                    });
                }
            }
            if !node.research_costs.is_empty()
                && (self.is_resource_node(node, ledger) || self.is_sector_node(node, sectors))
            {
                issues.push(ValidationIssue::CostOnAutoResolvedNode {
                    node: node.name.clone(),
                });
            }
        }

        issues.extend(self.find_cycles().into_iter().map(ValidationIssue::DependencyCycle));
        issues
    }

    /// Plain-dependency cycles, each reported once, in declaration order.
    ///
    /// Depth-first with an explicit stack of `(node, next dependency)`
    /// frames; the frames double as the current path.
    fn find_cycles(&self) -> Vec<Vec<String>> {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Mark {
            Unvisited,
            OnStack,
            Done,
        }

        let mut marks = vec![Mark::Unvisited; self.nodes.len()];
        let mut frames: Vec<(usize, usize)> = Vec::new();
        let mut cycles = Vec::new();

        for root in 0..self.nodes.len() {
            if marks[root] != Mark::Unvisited {
                continue;
            }
            marks[root] = Mark::OnStack;
            frames.push((root, 0));

            while let Some(frame) = frames.last_mut() {
                let (index, cursor) = *frame;
                let Some(dep) = self.nodes[index].dependencies.get(cursor) else {
                    marks[index] = Mark::Done;
                    frames.pop();
                    continue;
                };
                frame.1 += 1;

                let Dependency::Researched(target) = dep else {
                    continue;
                };
                let Some(next) = self.index_of(target) else {
                    continue;
                };
                match marks[next] {
                    Mark::Unvisited => {
                        marks[next] = Mark::OnStack;
                        frames.push((next, 0));
                    }
                    Mark::OnStack => {
                        if let Some(start) = frames.iter().position(|&(i, _)| i == next) {
                            cycles.push(
                                frames[start..]
                                    .iter()
                                    .map(|&(i, _)| self.nodes[i].name.clone())
                                    .collect(),
                            );
                        }
                    }
                    Mark::Done => {}
                }
            }
        }
        cycles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::ResourceItem;
    use crate::sector::SectorBoard;

    fn ledger(entries: &[(&str, u32)]) -> ResourceLedger {
        ResourceLedger::from_entries(entries.iter().map(|&(n, q)| ResourceItem::new(n, q))).unwrap()
    }

    fn graph(nodes: Vec<TechNode>) -> TechGraph {
        TechGraph::from_nodes(nodes, UnlockRules::default()).unwrap()
    }

    fn copper_graphite() -> TechGraph {
        graph(vec![
            TechNode::new("Copper"),
            TechNode::new("Graphite")
                .with_dependencies([Dependency::researched("Copper")])
                .with_costs([ResourceCost::new("Copper", 100)]),
        ])
    }

    #[test]
    fn test_duplicate_node_rejected() {
        let result = TechGraph::from_nodes(
            [TechNode::new("Copper"), TechNode::new("Copper")],
            UnlockRules::default(),
        );
        assert!(matches!(result, Err(TechError::DuplicateNode(_))));
    }

    #[test]
    fn test_builder_dedups_dependencies() {
        let node = TechNode::new("Kiln").with_dependencies([
            Dependency::researched("Copper"),
            Dependency::researched("Copper"),
            Dependency::researched("Lead"),
        ]);
        assert_eq!(node.dependencies().len(), 2);
    }

    #[test]
    fn test_unknown_dependency_never_met() {
        let mut g = graph(vec![
            TechNode::new("Kiln").with_dependencies([Dependency::researched("Nonexistent")])
        ]);
        let board = SectorBoard::new();
        let report = g.settle(&ResourceLedger::new(), &board);
        assert!(report.converged);
        assert_eq!(g.node_state("Kiln"), Some(NodeState::Locked));
    }

    #[test]
    fn test_resource_node_is_auto_researched() {
        let mut g = copper_graphite();
        let board = SectorBoard::new();
        let mut ledger = ledger(&[("Copper", 0)]);

        g.settle(&ledger, &board);
        assert_eq!(g.node_state("Copper"), Some(NodeState::Available));
        assert!(!g.can_research("Copper", &ledger, &board));
        assert!(!g.can_research("Graphite", &ledger, &board));

        ledger.set_quantity("Copper", 100);
        let report = g.settle(&ledger, &board);
        assert_eq!(report.researched, vec!["Copper".to_string()]);
        assert_eq!(report.unlocked, vec!["Graphite".to_string()]);
        assert!(g.can_research("Graphite", &ledger, &board));
    }

    #[test]
    fn test_research_spends_and_commits() {
        let mut g = copper_graphite();
        let board = SectorBoard::new();
        let mut ledger = ledger(&[("Copper", 120)]);
        g.settle(&ledger, &board);

        assert!(g.research("Graphite", &mut ledger, &board));
        assert_eq!(ledger.quantity("Copper"), 20);
        assert_eq!(g.node_state("Graphite"), Some(NodeState::Researched));

        // Second attempt is a no-op.
        assert!(!g.research("Graphite", &mut ledger, &board));
        assert_eq!(ledger.quantity("Copper"), 20);
    }

    #[test]
    fn test_research_rejected_leaves_ledger_untouched() {
        let mut g = graph(vec![
            TechNode::new("Silicon Smelter")
                .with_costs([ResourceCost::new("Copper", 30), ResourceCost::new("Lead", 25)]),
        ]);
        let board = SectorBoard::new();
        let mut ledger = ledger(&[("Copper", 30), ("Lead", 24)]);
        g.settle(&ledger, &board);

        let before = ledger.clone();
        assert!(!g.research("Silicon Smelter", &mut ledger, &board));
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_research_unlocks_dependents_transitively() {
        let mut g = graph(vec![
            TechNode::new("Conveyor"),
            TechNode::new("Junction").with_dependencies([Dependency::researched("Conveyor")]),
            TechNode::new("Router").with_dependencies([Dependency::researched("Junction")]),
        ]);
        let board = SectorBoard::new();
        let mut ledger = ResourceLedger::new();
        g.settle(&ledger, &board);

        assert!(g.research("Conveyor", &mut ledger, &board));
        assert_eq!(g.node_state("Junction"), Some(NodeState::Available));
        assert_eq!(g.node_state("Router"), Some(NodeState::Locked));

        assert!(g.research("Junction", &mut ledger, &board));
        assert_eq!(g.node_state("Router"), Some(NodeState::Available));
    }

    #[test]
    fn test_settle_chains_resource_discovery() {
        // Sand is discovered only after Scrap is held; both have stock.
        let mut g = graph(vec![
            TechNode::new("Scrap"),
            TechNode::new("Sand").with_dependencies([Dependency::researched("Scrap")]),
            TechNode::new("Silicon").with_dependencies([Dependency::researched("Sand")]),
        ]);
        let board = SectorBoard::new();
        let ledger = ledger(&[("Scrap", 5), ("Sand", 5)]);

        let report = g.settle(&ledger, &board);
        assert!(report.converged);
        assert_eq!(report.researched, vec!["Scrap".to_string(), "Sand".to_string()]);
        assert_eq!(g.node_state("Silicon"), Some(NodeState::Available));
    }

    #[test]
    fn test_unlock_pass_is_idempotent() {
        let mut g = copper_graphite();
        let board = SectorBoard::new();
        g.unlock_pass(&board);
        let snapshot: Vec<bool> = g.nodes().iter().map(TechNode::is_unlocked).collect();
        assert!(g.unlock_pass(&board).is_empty());
        let again: Vec<bool> = g.nodes().iter().map(TechNode::is_unlocked).collect();
        assert_eq!(snapshot, again);
    }

    #[test]
    fn test_sector_node_classification() {
        let g = graph(vec![
            TechNode::new("Ground Zero"),
            TechNode::new("sector Outpost"),
            TechNode::new("Drop Zone").with_dependencies([Dependency::sector_landed("Ground Zero")]),
            TechNode::new("Copper"),
        ]);
        let board = SectorBoard::new().with("Ground Zero", SectorStatus::Available);

        let is_sector = |name: &str| g.is_sector_node(g.node(name).unwrap(), &board);
        assert!(is_sector("Ground Zero"));
        assert!(is_sector("sector Outpost"));
        assert!(is_sector("Drop Zone"));
        assert!(!is_sector("Copper"));
    }

    #[test]
    fn test_sector_chain_synthesis() {
        let g = graph(vec![
            TechNode::new("Starting Grounds"),
            TechNode::new("Ferrum Ridge").with_visual_connections(["Starting Grounds"]),
        ]);
        let board = SectorBoard::new()
            .with("Starting Grounds", SectorStatus::Completed)
            .with("Ferrum Ridge", SectorStatus::Locked);

        let node = g.node("Ferrum Ridge").unwrap();
        let deps = g.effective_dependencies(node, &board);
        assert_eq!(deps, vec![Dependency::sector_captured("Starting Grounds")]);
        assert!(node.dependencies().is_empty(), "stored dependencies untouched");
    }

    #[test]
    fn test_no_synthesis_for_non_sector_nodes() {
        let g = graph(vec![
            TechNode::new("Starting Grounds"),
            TechNode::new("Mechanical Drill").with_visual_connections(["Starting Grounds"]),
        ]);
        let board = SectorBoard::new().with("Starting Grounds", SectorStatus::Completed);
        let node = g.node("Mechanical Drill").unwrap();
        assert!(g.effective_dependencies(node, &board).is_empty());
    }

    #[test]
    fn test_sector_chain_policies() {
        let nodes = vec![
            TechNode::new("Alpha"),
            TechNode::new("Beta"),
            TechNode::new("Gamma").with_visual_connections(["Copper", "Alpha", "Beta"]),
            TechNode::new("Copper"),
        ];
        let board = SectorBoard::new()
            .with("Alpha", SectorStatus::Completed)
            .with("Beta", SectorStatus::Available)
            .with("Gamma", SectorStatus::Locked);

        let first = graph(nodes.clone());
        let gamma = first.node("Gamma").unwrap();
        assert_eq!(
            first.effective_dependencies(gamma, &board),
            vec![Dependency::sector_captured("Alpha")]
        );

        let all = TechGraph::from_nodes(
            nodes,
            UnlockRules {
                sector_chain: SectorChainPolicy::AllPredecessors,
                ..UnlockRules::default()
            },
        )
        .unwrap();
        let gamma = all.node("Gamma").unwrap();
        assert_eq!(
            all.effective_dependencies(gamma, &board),
            vec![
                Dependency::sector_captured("Alpha"),
                Dependency::sector_captured("Beta"),
            ]
        );
    }

    #[test]
    fn test_sector_node_auto_research_on_capture() {
        let mut g = graph(vec![
            TechNode::new("Ground Zero"),
            TechNode::new("Frozen Forest").with_visual_connections(["Ground Zero"]),
        ]);
        let mut board = SectorBoard::new()
            .with("Ground Zero", SectorStatus::InProgress)
            .with("Frozen Forest", SectorStatus::Locked);
        let ledger = ResourceLedger::new();

        g.settle(&ledger, &board);
        assert_eq!(g.node_state("Ground Zero"), Some(NodeState::Available));
        assert_eq!(g.node_state("Frozen Forest"), Some(NodeState::Locked));
        assert!(!g.can_research("Ground Zero", &ledger, &board));

        board.set("Ground Zero", SectorStatus::Completed);
        g.settle(&ledger, &board);
        assert_eq!(g.node_state("Ground Zero"), Some(NodeState::Researched));
        assert_eq!(g.node_state("Frozen Forest"), Some(NodeState::Available));
    }

    #[test]
    fn test_sector_auto_research_can_be_disabled() {
        let mut g = TechGraph::from_nodes(
            [TechNode::new("Ground Zero")],
            UnlockRules {
                sector_auto_research: false,
                ..UnlockRules::default()
            },
        )
        .unwrap();
        let board = SectorBoard::new().with("Ground Zero", SectorStatus::Completed);
        g.settle(&ResourceLedger::new(), &board);
        assert_eq!(g.node_state("Ground Zero"), Some(NodeState::Available));
    }

    #[test]
    fn test_research_blockers_explain_rejection() {
        let mut g = copper_graphite();
        let board = SectorBoard::new();
        let ledger = ledger(&[("Copper", 0)]);
        g.settle(&ledger, &board);

        let blockers = g.research_blockers("Graphite", &ledger, &board);
        assert_eq!(
            blockers,
            vec![
                ResearchBlocker::UnmetDependency(Dependency::researched("Copper")),
                ResearchBlocker::MissingResources(Shortfall {
                    resource: "Copper".into(),
                    required: 100,
                    available: 0,
                }),
            ]
        );
        assert_eq!(
            g.research_blockers("Copper", &ledger, &board),
            vec![ResearchBlocker::ResourceProxy]
        );
        assert_eq!(
            g.research_blockers("Missing", &ledger, &board),
            vec![ResearchBlocker::UnknownNode]
        );
    }

    #[test]
    fn test_validate_reports_structural_issues() {
        let g = graph(vec![
            TechNode::new("A").with_dependencies([Dependency::researched("B")]),
            TechNode::new("B").with_dependencies([Dependency::researched("A")]),
            TechNode::new("C")
                .with_dependencies([Dependency::researched("Ghost")])
                .with_visual_connections(["Phantom"])
                .with_costs([ResourceCost::new("Unobtainium", 1)]),
        ]);
        let issues = g.validate(&ResourceLedger::new(), &SectorBoard::new());

        assert!(issues.contains(&ValidationIssue::DependencyCycle(vec![
            "A".to_string(),
            "B".to_string(),
        ])));
        assert!(issues.contains(&ValidationIssue::UnknownDependency {
            node: "C".into(),
            dependency: "Ghost".into(),
        }));
        assert!(issues.contains(&ValidationIssue::UnknownVisualConnection {
            node: "C".into(),
            source: "Phantom".into(),
        }));
        assert!(issues.contains(&ValidationIssue::UnknownCostResource {
            node: "C".into(),
            resource: "Unobtainium".into(),
        }));
        assert_eq!(issues.len(), 4);
    }

    #[test]
    fn test_validate_flags_costs_on_auto_resolved_nodes() {
        let g = graph(vec![
            TechNode::new("Copper").with_costs([ResourceCost::new("Lead", 5)]),
            TechNode::new("Survey Drone")
                .with_dependencies([Dependency::sector_captured("Outpost")])
                .with_costs([ResourceCost::new("Copper", 40)]),
            TechNode::new("Conveyor").with_costs([ResourceCost::new("Copper", 1)]),
        ]);
        let issues = g.validate(&ledger(&[("Copper", 0), ("Lead", 0)]), &SectorBoard::new());

        assert_eq!(
            issues,
            vec![
                ValidationIssue::CostOnAutoResolvedNode { node: "Copper".into() },
                ValidationIssue::CostOnAutoResolvedNode {
                    node: "Survey Drone".into()
                },
            ]
        );
    }

    #[test]
    fn test_cycle_search_handles_long_chains() {
        let n = 200_000;
        let mut nodes: Vec<TechNode> = (0..n - 1)
            .map(|i| {
                TechNode::new(format!("Node {i}"))
                    .with_dependencies([Dependency::researched(format!("Node {}", i + 1))])
            })
            .collect();
        nodes.push(
            TechNode::new(format!("Node {}", n - 1))
                .with_dependencies([Dependency::researched(format!("Node {}", n - 2))]),
        );
        let g = graph(nodes);

        let issues = g.validate(&ResourceLedger::new(), &SectorBoard::new());
        assert_eq!(
            issues,
            vec![ValidationIssue::DependencyCycle(vec![
                format!("Node {}", n - 2),
                format!("Node {}", n - 1),
            ])]
        );
    }

    #[test]
    fn test_raw_prefixed_node_is_resource_of_plain_entry() {
        let mut g = graph(vec![
            TechNode::new("Raw Copper"),
            TechNode::new("Wire").with_dependencies([Dependency::researched("Raw Copper")]),
        ]);
        let board = SectorBoard::new();
        let mut ledger = ledger(&[("copper", 0)]);

        let raw = g.node("Raw Copper").unwrap().clone();
        assert!(g.is_resource_node(&raw, &ledger));

        g.settle(&ledger, &board);
        assert_eq!(g.node_state("Raw Copper"), Some(NodeState::Available));
        assert_eq!(
            g.research_blockers("Raw Copper", &ledger, &board),
            vec![ResearchBlocker::ResourceProxy]
        );

        ledger.credit("copper", 3).unwrap();
        let report = g.settle(&ledger, &board);
        assert_eq!(report.researched, vec!["Raw Copper".to_string()]);
        assert_eq!(g.node_state("Wire"), Some(NodeState::Available));
        assert_eq!(ledger.quantity("copper"), 3);
    }

    #[test]
    fn test_strip_sector_prefix() {
        assert_eq!(strip_sector_prefix("sector Outpost"), Some("Outpost"));
        assert_eq!(strip_sector_prefix("Sector:Outpost"), Some("Outpost"));
        assert_eq!(strip_sector_prefix("Sectorial"), None);
    }
}
