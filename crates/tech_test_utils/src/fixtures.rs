//! Test fixtures and helpers.
//!
//! Small, hand-checked trees and campaign states for consistent testing.

use std::collections::HashSet;

use tech_core::config::EngineConfig;
use tech_core::content::{ContentItem, ContentKind, ContentRegistry, ResourceInfo, SectorInfo};
use tech_core::context::ResearchContext;
use tech_core::data::TechTreeData;
use tech_core::dependency::Dependency;
use tech_core::graph::{SectorChainPolicy, TechGraph, TechNode, UnlockRules};
use tech_core::grid::GridPosition;
use tech_core::ledger::{ResourceCost, ResourceLedger};
use tech_core::sector::{SectorBoard, SectorStatus};

/// Shorthand for a grid cell.
#[must_use]
pub const fn pos(x: i32, y: i32) -> GridPosition {
    GridPosition::new(x, y)
}

/// Build an obstacle set from coordinate pairs.
#[must_use]
pub fn obstacles(cells: &[(i32, i32)]) -> HashSet<GridPosition> {
    cells.iter().map(|&c| c.into()).collect()
}

/// Build a ledger from `(name, quantity)` pairs.
///
/// # Panics
///
/// Panics if a name repeats.
#[must_use]
pub fn ledger(entries: &[(&str, u32)]) -> ResourceLedger {
    let mut ledger = ResourceLedger::new();
    for &(name, quantity) in entries {
        ledger
            .declare(name, quantity)
            .expect("fixture ledger names are unique");
    }
    ledger
}

/// Build a sector board from `(name, status)` pairs.
#[must_use]
pub fn sector_board(entries: &[(&str, SectorStatus)]) -> SectorBoard {
    entries
        .iter()
        .fold(SectorBoard::new(), |board, &(name, status)| board.with(name, status))
}

/// Build a graph, panicking on duplicate names.
///
/// # Panics
///
/// Panics if two nodes share a name.
#[must_use]
pub fn graph(nodes: Vec<TechNode>, rules: UnlockRules) -> TechGraph {
    TechGraph::from_nodes(nodes, rules).expect("fixture node names are unique")
}

/// Copper and a Graphite node that costs 100 Copper and depends on it.
///
/// The ledger tracks Copper only, at zero.
#[must_use]
pub fn graphite_tree() -> (TechGraph, ResourceLedger) {
    let nodes = vec![
        TechNode::new("Copper").at(pos(0, 0)),
        TechNode::new("Graphite")
            .with_dependencies([Dependency::researched("Copper")])
            .with_visual_connections(["Copper"])
            .with_costs([ResourceCost::new("Copper", 100)])
            .at(pos(0, 2)),
    ];
    (graph(nodes, UnlockRules::default()), ledger(&[("Copper", 0)]))
}

/// Two sectors chained by a visual connection, plus a third reached from
/// both.
///
/// "Ferrum Ridge" follows "Starting Grounds"; "Crossroads" follows
/// "Starting Grounds" then "Ferrum Ridge".
#[must_use]
pub fn sector_chain_tree(policy: SectorChainPolicy) -> TechGraph {
    let nodes = vec![
        TechNode::new("Starting Grounds").at(pos(0, 0)),
        TechNode::new("Ferrum Ridge")
            .with_visual_connections(["Starting Grounds"])
            .at(pos(0, 2)),
        TechNode::new("Crossroads")
            .with_visual_connections(["Starting Grounds", "Ferrum Ridge"])
            .at(pos(2, 2)),
    ];
    let rules = UnlockRules {
        sector_chain: policy,
        ..UnlockRules::default()
    };
    graph(nodes, rules)
}

/// A chain of `len` free nodes, each depending on the one before.
///
/// Nodes are named `"Node 0"`, `"Node 1"`, ... and sit one row apart.
#[must_use]
pub fn linear_chain(len: usize) -> TechGraph {
    let nodes = (0..len)
        .map(|i| {
            let node = TechNode::new(format!("Node {i}")).at(pos(0, row(i)));
            if i == 0 {
                node
            } else {
                let prev = format!("Node {}", i - 1);
                node.with_dependencies([Dependency::researched(prev.as_str())])
                    .with_visual_connections([prev])
            }
        })
        .collect();
    graph(nodes, UnlockRules::default())
}

/// A `cols` x `rows` lattice of nodes two cells apart, each connected to
/// the node diagonally up-left of it where one exists.
///
/// Dense enough that most connectors need a bend or a search.
#[must_use]
pub fn lattice(cols: usize, rows: usize) -> TechGraph {
    let name = |c: usize, r: usize| format!("Cell {c}-{r}");
    let mut nodes = Vec::with_capacity(cols * rows);
    for r in 0..rows {
        for c in 0..cols {
            let mut node = TechNode::new(name(c, r)).at(pos(row(c) * 2, row(r) * 2));
            if c > 0 && r > 0 {
                node = node.with_visual_connections([name(c - 1, r - 1)]);
            }
            nodes.push(node);
        }
    }
    graph(nodes, UnlockRules::default())
}

fn row(i: usize) -> i32 {
    i32::try_from(i).expect("fixture sizes fit in i32")
}

/// Content for [`SAMPLE_TECH_TREE`].
///
/// # Panics
///
/// Panics only if the fixture itself is broken.
#[must_use]
pub fn sample_content() -> ContentRegistry {
    let resource = |hardness| ContentKind::Resource(ResourceInfo { hardness });
    ContentRegistry::from_items([
        ContentItem::new("Copper", resource(1)),
        ContentItem::new("Lead", resource(1)),
        ContentItem::new("Graphite", resource(0)),
        ContentItem::new("Ground Zero", ContentKind::Sector(SectorInfo::default())),
        ContentItem::new("Frozen Forest", ContentKind::Sector(SectorInfo::default())),
    ])
    .expect("fixture content names are unique")
}

/// A small campaign tree exercising every kind of node.
pub const SAMPLE_TECH_TREE: &str = r#"(
    nodes: [
        (name: "Ground Zero"),
        (name: "Frozen Forest", visual_connections: ["Ground Zero"]),
        (name: "Copper"),
        (name: "Lead", dependencies: ["Copper"], visual_connections: ["Copper"]),
        (
            name: "Conveyor",
            dependencies: ["Copper"],
            visual_connections: ["Copper"],
            research_costs: [(resource: "Copper", amount: 10)],
        ),
        (
            name: "Graphite Press",
            dependencies: ["Conveyor", "sector:Ground Zero:captured"],
            visual_connections: ["Conveyor"],
        ),
        (name: "Graphite", dependencies: ["Graphite Press"], visual_connections: ["Graphite Press"]),
    ],
    layout: [
        (name: "Ground Zero", x: 0, y: 0),
        (name: "Frozen Forest", x: 0, y: 2),
        (name: "Copper", x: 4, y: 0),
        (name: "Lead", x: 6, y: 0),
        (name: "Conveyor", x: 4, y: 2),
        (name: "Graphite Press", x: 6, y: 4),
        (name: "Graphite", x: 8, y: 4),
    ],
    starting_resources: [(name: "Copper", quantity: 0)],
)"#;

/// A session over [`SAMPLE_TECH_TREE`] with the given config.
///
/// # Panics
///
/// Panics only if the fixture itself is broken.
#[must_use]
pub fn sample_context(config: EngineConfig) -> ResearchContext {
    let data = TechTreeData::from_ron_str(SAMPLE_TECH_TREE).expect("fixture tree parses");
    ResearchContext::new(sample_content(), &data, config).expect("fixture tree builds")
}
