//! Offline research simulation.
//!
//! Plays a tree forward without a game: every round, each resource that is
//! minable earns a fixed income, then everything affordable is researched
//! in declaration order. Used to sanity-check pacing and to find nodes that
//! can never be reached.

use std::collections::HashSet;

use serde::Serialize;
use tech_core::context::ResearchContext;
use tech_core::graph::NodeState;

use crate::error::Result;

/// Simulation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationConfig {
    /// Rounds to play.
    pub rounds: u32,
    /// Amount credited per minable resource per round.
    pub income: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            rounds: 20,
            income: 25,
        }
    }
}

/// A node that became researched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResearchEvent {
    /// Round it happened in, starting at 1.
    pub round: u32,
    /// Node name.
    pub node: String,
    /// False if it was discovered rather than paid for.
    pub paid: bool,
}

/// What the simulation did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SimulationSummary {
    /// Rounds played.
    pub rounds: u32,
    /// Research in the order it happened.
    pub events: Vec<ResearchEvent>,
    /// Nodes researched at the end.
    pub researched: usize,
    /// Nodes in the tree.
    pub total: usize,
    /// Nodes whose dependencies were never met.
    pub still_locked: Vec<String>,
}

/// A resource is minable once its node is unlocked, or always if the tree
/// has no node for it.
fn minable_resources(context: &ResearchContext) -> Vec<String> {
    context
        .resources()
        .iter()
        .filter(|r| {
            context
                .node(&r.name)
                .map_or(true, |node| node.is_unlocked())
        })
        .map(|r| r.name.clone())
        .collect()
}

fn record(
    context: &ResearchContext,
    seen: &mut HashSet<String>,
    round: u32,
    paid_for: Option<&str>,
    events: &mut Vec<ResearchEvent>,
) {
    for node in context.nodes() {
        if node.is_researched() && seen.insert(node.name().to_string()) {
            events.push(ResearchEvent {
                round,
                node: node.name().to_string(),
                paid: paid_for == Some(node.name()),
            });
        }
    }
}

/// Play the session forward.
///
/// Nodes researched before the first round are not reported as events.
///
/// # Errors
///
/// Fails if a resource counter would overflow.
pub fn simulate(context: &mut ResearchContext, config: &SimulationConfig) -> Result<SimulationSummary> {
    let mut seen: HashSet<String> = context
        .nodes()
        .iter()
        .filter(|n| n.is_researched())
        .map(|n| n.name().to_string())
        .collect();
    let mut events = Vec::new();

    for round in 1..=config.rounds {
        for resource in minable_resources(context) {
            context.credit_resource(&resource, config.income)?;
        }
        record(context, &mut seen, round, None, &mut events);

        loop {
            let next = context
                .nodes()
                .iter()
                .map(|n| n.name().to_string())
                .find(|name| context.can_research(name));
            let Some(name) = next else {
                break;
            };
            if !context.research_node(&name) {
                break;
            }
            record(context, &mut seen, round, Some(&name), &mut events);
        }
        tracing::debug!(round, researched = seen.len(), "Simulation round done");
    }

    let still_locked = context
        .nodes()
        .iter()
        .filter(|n| n.state() == NodeState::Locked)
        .map(|n| n.name().to_string())
        .collect();

    Ok(SimulationSummary {
        rounds: config.rounds,
        events,
        researched: seen.len(),
        total: context.nodes().len(),
        still_locked,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tech_core::config::EngineConfig;
    use tech_test_utils::fixtures::sample_context;

    #[test]
    fn test_sample_progression() {
        let mut ctx = sample_context(EngineConfig::default());
        let summary = simulate(
            &mut ctx,
            &SimulationConfig {
                rounds: 3,
                income: 10,
            },
        )
        .unwrap();

        let first: Vec<(&str, bool)> = summary
            .events
            .iter()
            .filter(|e| e.round == 1)
            .map(|e| (e.node.as_str(), e.paid))
            .collect();
        assert_eq!(first, vec![("Copper", false), ("Conveyor", true)]);

        // Lead becomes minable once Copper is known.
        assert!(summary
            .events
            .iter()
            .any(|e| e.node == "Lead" && e.round == 2 && !e.paid));

        // Campaign-gated nodes never move without sector progress.
        assert!(summary.still_locked.contains(&"Graphite Press".to_string()));
        assert!(summary.still_locked.contains(&"Frozen Forest".to_string()));
        assert_eq!(summary.total, 7);
    }

    #[test]
    fn test_zero_rounds_changes_nothing() {
        let mut ctx = sample_context(EngineConfig::default());
        let summary = simulate(&mut ctx, &SimulationConfig { rounds: 0, income: 10 }).unwrap();
        assert!(summary.events.is_empty());
        assert_eq!(ctx.ledger().quantity("Copper"), 0);
    }
}
