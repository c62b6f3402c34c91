//! Research context: the tech tree, ledger and sector wiring for one
//! session.
//!
//! Constructed once at startup and handed to whoever needs it. Every
//! state-changing call settles the graph before returning, so callers
//! always observe a converged unlock state.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use crate::content::{ContentCategory, ContentItem, ContentRegistry};
use crate::config::EngineConfig;
use crate::data::TechTreeData;
use crate::dependency::Dependency;
use crate::error::Result;
use crate::graph::{
    NodeState, ResearchBlocker, SettleReport, TechGraph, TechNode, ValidationIssue,
};
use crate::layout::{assign_positions, LayoutReport};
use crate::ledger::{ResourceItem, ResourceLedger};
use crate::router::{route_connections, Connection};
use crate::sector::{SectorBoard, SectorHooks, SectorResolver, SectorStatus};

/// One player's research session.
#[derive(Debug)]
pub struct ResearchContext {
    content: ContentRegistry,
    graph: TechGraph,
    ledger: ResourceLedger,
    sectors: SectorHooks,
    known_sectors: Rc<HashSet<String>>,
    config: EngineConfig,
    layout: LayoutReport,
}

impl ResearchContext {
    /// Build a session from content and tech-tree data.
    ///
    /// Nodes are laid out, every registry resource gets a ledger entry
    /// (zero unless the data says otherwise), sector names default to the
    /// registry's sectors, and the graph is settled once.
    ///
    /// # Errors
    ///
    /// Fails on duplicate nodes, layout entries or ledger entries.
    pub fn new(content: ContentRegistry, data: &TechTreeData, config: EngineConfig) -> Result<Self> {
        let mut graph = data.build_graph(config.unlock_rules())?;
        let layout = assign_positions(&mut graph, &data.layout_table()?, config.warn_on_unmapped_layout);

        let mut ledger = data.starting_ledger()?;
        for name in content.resource_names() {
            if !ledger.contains(name) {
                ledger.declare(name, 0)?;
            }
        }

        for node in graph.nodes() {
            if content.find_item(node.name()).is_none() {
                tracing::warn!(node = node.name(), "Tech node has no content item");
            }
        }

        let mut known_sectors: HashSet<String> =
            content.sectors().map(|(item, _)| item.name.clone()).collect();
        known_sectors.extend(data.sectors.iter().map(|s| s.name.clone()));

        let known_sectors = Rc::new(known_sectors);

        let mut sectors = SectorHooks::new();
        let board = data.sector_board();
        sectors.set_status_resolver(move |name| board.status(name));
        let known = Rc::clone(&known_sectors);
        sectors.set_is_sector_name_resolver(move |name| known.contains(name));

        let mut context = Self {
            content,
            graph,
            ledger,
            sectors,
            known_sectors,
            config,
            layout,
        };
        context.settle();
        tracing::debug!(
            nodes = context.graph.len(),
            resources = context.ledger.len(),
            "Research context ready"
        );
        Ok(context)
    }

    // ------------------------------------------------------------------
    // Content registry
    // ------------------------------------------------------------------

    /// Look up a content item by name.
    #[must_use]
    pub fn find_item(&self, name: &str) -> Option<&ContentItem> {
        self.content.find_item(name)
    }

    /// All content items of one kind.
    pub fn items_of_kind(&self, category: ContentCategory) -> impl Iterator<Item = &ContentItem> {
        self.content.items_of_kind(category)
    }

    /// The content registry.
    #[must_use]
    pub const fn content(&self) -> &ContentRegistry {
        &self.content
    }

    // ------------------------------------------------------------------
    // Sector wiring
    // ------------------------------------------------------------------

    /// Replace the sector status lookup and re-settle.
    pub fn set_sector_status_resolver(&mut self, f: impl Fn(&str) -> SectorStatus + 'static) -> SettleReport {
        self.sectors.set_status_resolver(f);
        self.settle()
    }

    /// Replace the sector-name predicate and re-settle.
    pub fn set_is_sector_name_resolver(&mut self, f: impl Fn(&str) -> bool + 'static) -> SettleReport {
        self.sectors.set_is_sector_name_resolver(f);
        self.settle()
    }

    /// Wire both sector hooks to a shared board and re-settle.
    ///
    /// Names on the board count as sectors alongside the ones known at
    /// startup. Later changes to the board take effect on the next settle.
    pub fn attach_sector_board(&mut self, board: &Rc<RefCell<SectorBoard>>) -> SettleReport {
        let status_board = Rc::clone(board);
        self.sectors
            .set_status_resolver(move |name| status_board.borrow().status(name));
        let name_board = Rc::clone(board);
        let known = Rc::clone(&self.known_sectors);
        self.sectors.set_is_sector_name_resolver(move |name| {
            known.contains(name) || name_board.borrow().is_sector_name(name)
        });
        self.settle()
    }

    // ------------------------------------------------------------------
    // Nodes and resources
    // ------------------------------------------------------------------

    /// All nodes in declaration order.
    #[must_use]
    pub fn nodes(&self) -> &[TechNode] {
        self.graph.nodes()
    }

    /// Look up a node.
    #[must_use]
    pub fn node(&self, name: &str) -> Option<&TechNode> {
        self.graph.node(name)
    }

    /// The node graph.
    #[must_use]
    pub const fn graph(&self) -> &TechGraph {
        &self.graph
    }

    /// Ledger entries in declaration order.
    #[must_use]
    pub fn resources(&self) -> &[ResourceItem] {
        self.ledger.entries()
    }

    /// The ledger.
    #[must_use]
    pub const fn ledger(&self) -> &ResourceLedger {
        &self.ledger
    }

    /// Credit produced or awarded resources, then re-settle.
    ///
    /// # Errors
    ///
    /// Fails if the counter would overflow; nothing changes in that case.
    pub fn credit_resource(&mut self, name: &str, amount: u32) -> Result<u32> {
        let total = self.ledger.credit(name, amount)?;
        self.settle();
        Ok(total)
    }

    /// Overwrite a resource quantity, then re-settle.
    pub fn set_resource(&mut self, name: &str, quantity: u32) -> SettleReport {
        self.ledger.set_quantity(name, quantity);
        self.settle()
    }

    /// Layout decisions made at startup.
    #[must_use]
    pub const fn layout_report(&self) -> &LayoutReport {
        &self.layout
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Research
    // ------------------------------------------------------------------

    /// Research a node if possible. Returns whether it happened.
    pub fn research_node(&mut self, name: &str) -> bool {
        self.graph.research(name, &mut self.ledger, &self.sectors)
    }

    /// Check if a node can be researched now.
    #[must_use]
    pub fn can_research(&self, name: &str) -> bool {
        self.graph.can_research(name, &self.ledger, &self.sectors)
    }

    /// Display state of a node.
    #[must_use]
    pub fn node_state(&self, name: &str) -> Option<NodeState> {
        self.graph.node_state(name)
    }

    /// Stored plus synthesized dependencies of a node.
    #[must_use]
    pub fn effective_dependencies(&self, name: &str) -> Option<Vec<Dependency>> {
        self.graph
            .node(name)
            .map(|node| self.graph.effective_dependencies(node, &self.sectors))
    }

    /// Everything preventing research of a node.
    #[must_use]
    pub fn research_blockers(&self, name: &str) -> Vec<ResearchBlocker> {
        self.graph.research_blockers(name, &self.ledger, &self.sectors)
    }

    /// Re-apply unlock and discovery rules until nothing changes.
    ///
    /// Call after campaign progress changes sector states behind the hooks.
    pub fn settle(&mut self) -> SettleReport {
        self.graph.settle(&self.ledger, &self.sectors)
    }

    /// Structural problems in the loaded tree.
    #[must_use]
    pub fn validate(&self) -> Vec<ValidationIssue> {
        self.graph.validate(&self.ledger, &self.sectors)
    }

    // ------------------------------------------------------------------
    // Rendering support
    // ------------------------------------------------------------------

    /// Route every visual connection using the configured mode.
    #[must_use]
    pub fn connection_paths(&self) -> Vec<Connection> {
        self.connection_paths_with(self.config.smart_routing)
    }

    /// Route every visual connection with an explicit mode.
    #[must_use]
    pub fn connection_paths_with(&self, use_smart_routing: bool) -> Vec<Connection> {
        route_connections(&self.graph, use_smart_routing, &self.config.router)
    }
}
