//! Connector routing between tech-tree nodes.
//!
//! Produces the interior waypoints of a polyline from one grid cell to
//! another, preferring a single axis-aligned bend and steering around cells
//! occupied by other nodes. Strategies are tried cheapest first:
//!
//! 1. Straight line when the endpoints share a row or column.
//! 2. Horizontal-first bend at `(to.x, from.y)`.
//! 3. Vertical-first bend at `(from.x, to.y)`.
//! 4. Bounded 4-connected A* search.
//! 5. A fixed detour beside the straight line (may still cross nodes).
//!
//! Routing never fails; the worst case is a cosmetic overlap.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::graph::TechGraph;
use crate::grid::{GridBounds, GridPosition};

/// Router tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Free cells added around the endpoints and obstacles to form the
    /// search rectangle.
    pub search_margin: i32,
    /// Search is abandoned once the open set holds more entries than this.
    pub open_set_cap: usize,
    /// Distance of the fallback detour from the straight line.
    pub detour_offset: i32,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            search_margin: 5,
            open_set_cap: 100,
            detour_offset: 2,
        }
    }
}

/// Which strategy produced a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RouteStrategy {
    /// Endpoints aligned, no waypoint needed.
    Direct,
    /// Horizontal-first bend.
    PrimaryBend,
    /// Vertical-first bend.
    AlternateBend,
    /// A* search result.
    Search,
    /// Best-effort detour after the search gave up.
    Detour,
}

/// A computed connector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// How the route was found.
    pub strategy: RouteStrategy,
    /// Interior waypoints, endpoints excluded.
    pub waypoints: Vec<GridPosition>,
}

/// Route with the default configuration and return only the waypoints.
#[must_use]
pub fn route(
    from: GridPosition,
    to: GridPosition,
    obstacles: &HashSet<GridPosition>,
    use_smart_routing: bool,
) -> Vec<GridPosition> {
    plan_route(from, to, obstacles, use_smart_routing, &RouterConfig::default()).waypoints
}

/// Route a connector from `from` to `to`.
///
/// `from` and `to` are never treated as obstacles even if present in
/// `obstacles`. With `use_smart_routing` off the horizontal-first bend is
/// returned unconditionally.
#[must_use]
pub fn plan_route(
    from: GridPosition,
    to: GridPosition,
    obstacles: &HashSet<GridPosition>,
    use_smart_routing: bool,
    config: &RouterConfig,
) -> Route {
    if from.is_aligned_with(to) {
        return Route {
            strategy: RouteStrategy::Direct,
            waypoints: Vec::new(),
        };
    }

    let primary = GridPosition::new(to.x, from.y);
    if !use_smart_routing || !obstacles.contains(&primary) {
        return Route {
            strategy: RouteStrategy::PrimaryBend,
            waypoints: vec![primary],
        };
    }

    let alternate = GridPosition::new(from.x, to.y);
    if !obstacles.contains(&alternate) {
        return Route {
            strategy: RouteStrategy::AlternateBend,
            waypoints: vec![alternate],
        };
    }

    if let Some(waypoints) = search(from, to, obstacles, config) {
        return Route {
            strategy: RouteStrategy::Search,
            waypoints,
        };
    }

    tracing::debug!(%from, %to, "Connector search gave up, using detour");
    Route {
        strategy: RouteStrategy::Detour,
        waypoints: detour(from, to, config.detour_offset),
    }
}

/// A node in the A* open set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenEntry {
    pos: GridPosition,
    /// g + h.
    f_score: u32,
    /// Push order; earlier entries win ties so expansion order is stable.
    seq: u64,
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap: reverse both keys for min-first.
        other
            .f_score
            .cmp(&self.f_score)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// 4-connected A* with unit edge cost and a Manhattan heuristic.
///
/// Returns interior waypoints, or `None` if the goal is unreachable inside
/// the search rectangle or the open set outgrew its cap.
fn search(
    from: GridPosition,
    to: GridPosition,
    obstacles: &HashSet<GridPosition>,
    config: &RouterConfig,
) -> Option<Vec<GridPosition>> {
    let bounds = GridBounds::enclosing(
        obstacles
            .iter()
            .copied()
            .chain([from, to]),
    )?
    .expand(config.search_margin);

    let blocked = |pos: &GridPosition| *pos != to && *pos != from && obstacles.contains(pos);

    let mut open_set = BinaryHeap::new();
    let mut came_from: HashMap<GridPosition, GridPosition> = HashMap::new();
    let mut g_score: HashMap<GridPosition, u32> = HashMap::new();
    let mut closed: HashSet<GridPosition> = HashSet::new();
    let mut seq = 0u64;

    g_score.insert(from, 0);
    open_set.push(OpenEntry {
        pos: from,
        f_score: from.manhattan_distance(to),
        seq,
    });

    while let Some(current) = open_set.pop() {
        if current.pos == to {
            return Some(reconstruct_path(&came_from, from, to));
        }
        if !closed.insert(current.pos) {
            continue;
        }

        let current_g = g_score.get(&current.pos).copied().unwrap_or(u32::MAX);

        for next in current.pos.neighbors() {
            if !bounds.contains(next) || blocked(&next) || closed.contains(&next) {
                continue;
            }

            let tentative_g = current_g.saturating_add(1);
            let neighbor_g = g_score.get(&next).copied().unwrap_or(u32::MAX);
            if tentative_g < neighbor_g {
                came_from.insert(next, current.pos);
                g_score.insert(next, tentative_g);
                seq += 1;
                open_set.push(OpenEntry {
                    pos: next,
                    f_score: tentative_g.saturating_add(next.manhattan_distance(to)),
                    seq,
                });
            }
        }

        if open_set.len() > config.open_set_cap {
            tracing::debug!(
                %from,
                %to,
                open = open_set.len(),
                "Connector search exceeded open-set cap"
            );
            return None;
        }
    }

    None
}

/// Walk parent links back from the goal, dropping both endpoints.
fn reconstruct_path(
    came_from: &HashMap<GridPosition, GridPosition>,
    from: GridPosition,
    to: GridPosition,
) -> Vec<GridPosition> {
    let mut path = Vec::new();
    let mut current = to;

    while let Some(&prev) = came_from.get(&current) {
        if prev == from {
            break;
        }
        path.push(prev);
        current = prev;
    }

    path.reverse();
    path
}

/// Three waypoints running parallel to the straight line, offset above it
/// for mostly-horizontal links and to the right of it otherwise.
fn detour(from: GridPosition, to: GridPosition, offset: i32) -> Vec<GridPosition> {
    let mid = from.midpoint(to);

    if from.x.abs_diff(to.x) > from.y.abs_diff(to.y) {
        let y = mid.y.saturating_sub(offset);
        vec![
            GridPosition::new(from.x, y),
            GridPosition::new(mid.x, y),
            GridPosition::new(to.x, y),
        ]
    } else {
        let x = mid.x.saturating_add(offset);
        vec![
            GridPosition::new(x, from.y),
            GridPosition::new(x, mid.y),
            GridPosition::new(x, to.y),
        ]
    }
}

/// Drop interior waypoints that sit on a straight run between their
/// neighbours, leaving only the corners of the polyline.
#[must_use]
pub fn collapse_collinear(
    from: GridPosition,
    waypoints: &[GridPosition],
    to: GridPosition,
) -> Vec<GridPosition> {
    let mut corners: Vec<GridPosition> = Vec::with_capacity(waypoints.len());
    let mut prev = from;

    for (i, &point) in waypoints.iter().enumerate() {
        let next = waypoints.get(i + 1).copied().unwrap_or(to);
        let straight = (prev.x == point.x && point.x == next.x)
            || (prev.y == point.y && point.y == next.y);
        if !straight {
            corners.push(point);
            prev = point;
        }
    }
    corners
}

/// A routed visual connection between two nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    /// Source node name.
    pub from: String,
    /// Target node name.
    pub to: String,
    /// Source cell.
    pub start: GridPosition,
    /// Target cell.
    pub end: GridPosition,
    /// Computed route.
    pub route: Route,
}

/// Route every visual connection in the graph.
///
/// Every node's cell is an obstacle; the two endpoints of each connection
/// are exempt. Connections to unknown nodes are skipped. Output order
/// follows node declaration order, then stored connection order.
#[must_use]
pub fn route_connections(
    graph: &TechGraph,
    use_smart_routing: bool,
    config: &RouterConfig,
) -> Vec<Connection> {
    let obstacles: HashSet<GridPosition> = graph.nodes().iter().map(|n| n.position()).collect();

    graph
        .nodes()
        .iter()
        .flat_map(|target| {
            target.visual_connections().iter().filter_map(|source_name| {
                let source = graph.node(source_name)?;
                let route = plan_route(
                    source.position(),
                    target.position(),
                    &obstacles,
                    use_smart_routing,
                    config,
                );
                Some(Connection {
                    from: source.name().to_string(),
                    to: target.name().to_string(),
                    start: source.position(),
                    end: target.position(),
                    route,
                })
            })
        })
        .collect()
}
