//! Research flow tests over whole trees.
//!
//! These drive the unlock engine through realistic campaign sequences
//! using the shared fixtures.

use std::cell::RefCell;
use std::rc::Rc;

use tech_core::prelude::*;
use tech_test_utils::fixtures::{
    graphite_tree, ledger, sample_context, sector_board, sector_chain_tree,
};

// =============================================================================
// Resource discovery
// =============================================================================

#[test]
fn test_graphite_waits_for_copper_discovery() {
    let (mut graph, mut ledger) = graphite_tree();
    let sectors = SectorBoard::new();
    graph.settle(&ledger, &sectors);

    assert!(!graph.can_research("Graphite", &ledger, &sectors));
    assert_eq!(graph.node_state("Graphite"), Some(NodeState::Locked));

    ledger.set_quantity("Copper", 100);
    // Copper is a resource node: it is never researched by paying for it.
    assert!(!graph.research("Copper", &mut ledger, &sectors));
    assert_eq!(ledger.quantity("Copper"), 100);
    assert!(!graph.node("Copper").unwrap().is_researched());

    let report = graph.settle(&ledger, &sectors);
    assert_eq!(report.researched, vec!["Copper".to_string()]);
    assert_eq!(report.unlocked, vec!["Graphite".to_string()]);
    assert!(graph.can_research("Graphite", &ledger, &sectors));

    assert!(graph.research("Graphite", &mut ledger, &sectors));
    assert_eq!(ledger.quantity("Copper"), 0);
    assert!(graph.node("Copper").unwrap().is_researched());
}

#[test]
fn test_graphite_blockers_name_what_is_missing() {
    let (mut graph, ledger) = graphite_tree();
    let sectors = SectorBoard::new();
    graph.settle(&ledger, &sectors);

    let blockers = graph.research_blockers("Graphite", &ledger, &sectors);
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
}

#[test]
fn test_unaffordable_research_changes_nothing() {
    let (mut graph, _) = graphite_tree();
    let mut ledger = ledger(&[("Copper", 99)]);
    let sectors = SectorBoard::new();
    graph.settle(&ledger, &sectors);

    assert!(graph.node("Copper").unwrap().is_researched());
    assert!(!graph.research("Graphite", &mut ledger, &sectors));
    assert_eq!(ledger.quantity("Copper"), 99);
    assert_eq!(graph.node_state("Graphite"), Some(NodeState::Available));
}

// =============================================================================
// Sector chains
// =============================================================================

#[test]
fn test_ferrum_ridge_follows_starting_grounds_capture() {
    let graph = sector_chain_tree(SectorChainPolicy::FirstPredecessor);
    let captured_dep = Dependency::sector_captured("Starting Grounds");

    let completed = sector_board(&[
        ("Starting Grounds", SectorStatus::Completed),
        ("Ferrum Ridge", SectorStatus::Locked),
    ]);
    let ridge = graph.node("Ferrum Ridge").unwrap();
    assert_eq!(graph.effective_dependencies(ridge, &completed), vec![captured_dep.clone()]);
    assert!(graph.is_dependency_met(&captured_dep, &completed));

    let available = sector_board(&[
        ("Starting Grounds", SectorStatus::Available),
        ("Ferrum Ridge", SectorStatus::Locked),
    ]);
    assert!(!graph.is_dependency_met(&captured_dep, &available));
}

#[test]
fn test_sector_chain_unlocks_as_campaign_advances() {
    let mut graph = sector_chain_tree(SectorChainPolicy::FirstPredecessor);
    let ledger = ResourceLedger::new();
    let mut board = sector_board(&[
        ("Starting Grounds", SectorStatus::InProgress),
        ("Ferrum Ridge", SectorStatus::Locked),
        ("Crossroads", SectorStatus::Locked),
    ]);

    graph.settle(&ledger, &board);
    assert_eq!(graph.node_state("Starting Grounds"), Some(NodeState::Available));
    assert_eq!(graph.node_state("Ferrum Ridge"), Some(NodeState::Locked));
    assert_eq!(graph.node_state("Crossroads"), Some(NodeState::Locked));

    board.set("Starting Grounds", SectorStatus::Completed);
    graph.settle(&ledger, &board);
    assert_eq!(graph.node_state("Starting Grounds"), Some(NodeState::Researched));
    assert_eq!(graph.node_state("Ferrum Ridge"), Some(NodeState::Available));
    // Only the first sector predecessor gates Crossroads.
    assert_eq!(graph.node_state("Crossroads"), Some(NodeState::Available));
}

#[test]
fn test_all_predecessors_policy_gates_on_every_sector() {
    let mut graph = sector_chain_tree(SectorChainPolicy::AllPredecessors);
    let ledger = ResourceLedger::new();
    let mut board = sector_board(&[
        ("Starting Grounds", SectorStatus::Completed),
        ("Ferrum Ridge", SectorStatus::InProgress),
        ("Crossroads", SectorStatus::Locked),
    ]);

    graph.settle(&ledger, &board);
    assert_eq!(graph.node_state("Crossroads"), Some(NodeState::Locked));
    assert_eq!(
        graph.research_blockers("Crossroads", &ledger, &board),
        vec![
            ResearchBlocker::SectorProxy,
            ResearchBlocker::UnmetDependency(Dependency::sector_captured("Ferrum Ridge")),
        ]
    );

    board.set("Ferrum Ridge", SectorStatus::Completed);
    graph.settle(&ledger, &board);
    assert_eq!(graph.node_state("Ferrum Ridge"), Some(NodeState::Researched));
    assert_eq!(graph.node_state("Crossroads"), Some(NodeState::Available));
}

#[test]
fn test_prefixed_sector_name_tracks_bare_sector() {
    let mut graph = TechGraph::from_nodes(
        [TechNode::new("Sector: Craters")],
        UnlockRules::default(),
    )
    .unwrap();
    let ledger = ResourceLedger::new();
    let mut board = sector_board(&[("Craters", SectorStatus::InProgress)]);

    graph.settle(&ledger, &board);
    assert_eq!(graph.node_state("Sector: Craters"), Some(NodeState::Available));
    assert!(!graph.can_research("Sector: Craters", &ledger, &board));

    board.set("Craters", SectorStatus::Completed);
    graph.settle(&ledger, &board);
    assert_eq!(graph.node_state("Sector: Craters"), Some(NodeState::Researched));
}

// =============================================================================
// Full session
// =============================================================================

#[test]
fn test_sample_session_walkthrough() {
    let mut ctx = sample_context(EngineConfig::default());
    assert!(ctx.validate().is_empty());
    assert_eq!(ctx.node_state("Copper"), Some(NodeState::Available));
    assert_eq!(ctx.node_state("Lead"), Some(NodeState::Locked));
    assert_eq!(ctx.node_state("Frozen Forest"), Some(NodeState::Locked));

    ctx.credit_resource("Copper", 10).unwrap();
    assert_eq!(ctx.node_state("Copper"), Some(NodeState::Researched));
    assert_eq!(ctx.node_state("Lead"), Some(NodeState::Available));
    assert!(ctx.research_node("Conveyor"));
    assert_eq!(ctx.ledger().quantity("Copper"), 0);

    // Gated on a sector token, so it follows the campaign instead of research.
    assert_eq!(ctx.node_state("Graphite Press"), Some(NodeState::Locked));
    assert!(!ctx.research_node("Graphite Press"));

    let board = Rc::new(RefCell::new(SectorBoard::new()));
    board
        .borrow_mut()
        .set("Ground Zero", SectorStatus::InProgress);
    ctx.attach_sector_board(&board);
    assert_eq!(ctx.node_state("Graphite Press"), Some(NodeState::Locked));

    board.borrow_mut().set("Ground Zero", SectorStatus::Completed);
    let report = ctx.settle();
    assert_eq!(
        report.researched,
        vec!["Ground Zero".to_string(), "Graphite Press".to_string()]
    );
    assert_eq!(ctx.node_state("Frozen Forest"), Some(NodeState::Available));
    assert_eq!(ctx.node_state("Graphite"), Some(NodeState::Available));

    ctx.credit_resource("Graphite", 1).unwrap();
    assert_eq!(ctx.node_state("Graphite"), Some(NodeState::Researched));
}

#[test]
fn test_sample_effective_dependencies_include_sector_chain() {
    let ctx = sample_context(EngineConfig::default());
    assert_eq!(
        ctx.effective_dependencies("Frozen Forest"),
        Some(vec![Dependency::sector_captured("Ground Zero")])
    );
    assert_eq!(ctx.effective_dependencies("Nowhere"), None);
}

#[test]
fn test_sample_layout_and_connections() {
    let ctx = sample_context(EngineConfig::default());
    assert!(ctx.layout_report().unmapped.is_empty());
    assert!(ctx.layout_report().relocated.is_empty());

    let connections = ctx.connection_paths();
    assert_eq!(connections.len(), 5);
    for c in &connections {
        assert_eq!(ctx.node(&c.from).unwrap().position(), c.start);
        assert_eq!(ctx.node(&c.to).unwrap().position(), c.end);
    }

    let press = connections
        .iter()
        .find(|c| c.to == "Graphite Press")
        .unwrap();
    assert_eq!(press.route.strategy, RouteStrategy::PrimaryBend);
    assert_eq!(press.route.waypoints, vec![GridPosition::new(6, 2)]);
}
