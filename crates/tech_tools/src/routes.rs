//! Connector route reports.
//!
//! Lists every visual connection of a tree as a full polyline, the way a
//! renderer would draw it.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::Serialize;
use tech_core::context::ResearchContext;
use tech_core::grid::GridPosition;
use tech_core::router::{collapse_collinear, RouteStrategy};

/// One connector as drawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteLine {
    /// Source node.
    pub from: String,
    /// Target node.
    pub to: String,
    /// How the route was found.
    pub strategy: RouteStrategy,
    /// Polyline from source cell to target cell, inclusive.
    pub points: Vec<GridPosition>,
}

/// Route every connection of a session.
///
/// With `corners_only`, straight runs are collapsed so each point is a
/// corner of the polyline.
#[must_use]
pub fn route_lines(context: &ResearchContext, smart: bool, corners_only: bool) -> Vec<RouteLine> {
    context
        .connection_paths_with(smart)
        .into_iter()
        .map(|c| {
            let interior = if corners_only {
                collapse_collinear(c.start, &c.route.waypoints, c.end)
            } else {
                c.route.waypoints
            };
            let mut points = Vec::with_capacity(interior.len() + 2);
            points.push(c.start);
            points.extend(interior);
            points.push(c.end);
            RouteLine {
                from: c.from,
                to: c.to,
                strategy: c.route.strategy,
                points,
            }
        })
        .collect()
}

/// How many connectors each strategy produced.
#[must_use]
pub fn strategy_counts(lines: &[RouteLine]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for line in lines {
        *counts.entry(format!("{:?}", line.strategy)).or_insert(0) += 1;
    }
    counts
}

/// Plain-text rendering, one connector per line.
#[must_use]
pub fn render_text(lines: &[RouteLine]) -> String {
    let mut out = String::new();
    for line in lines {
        let _ = write!(out, "{} -> {} [{:?}]:", line.from, line.to, line.strategy);
        for point in &line.points {
            let _ = write!(out, " {point}");
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tech_core::config::EngineConfig;
    use tech_test_utils::fixtures::sample_context;

    #[test]
    fn test_lines_include_endpoints() {
        let ctx = sample_context(EngineConfig::default());
        let lines = route_lines(&ctx, true, false);
        assert_eq!(lines.len(), 5);

        let conveyor = lines.iter().find(|l| l.to == "Conveyor").unwrap();
        assert_eq!(conveyor.strategy, RouteStrategy::Direct);
        assert_eq!(
            conveyor.points,
            vec![GridPosition::new(4, 0), GridPosition::new(4, 2)]
        );
    }

    #[test]
    fn test_render_and_counts() {
        let ctx = sample_context(EngineConfig::default());
        let lines = route_lines(&ctx, false, true);
        let text = render_text(&lines);
        assert_eq!(text.lines().count(), 5);
        assert!(text.contains("Conveyor -> Graphite Press [PrimaryBend]: (4, 2) (6, 2) (6, 4)"));

        let counts = strategy_counts(&lines);
        assert_eq!(counts.values().sum::<usize>(), 5);
    }
}
