//! Determinism testing utilities.
//!
//! Provides a harness for verifying that settling, research and routing
//! produce identical results given identical inputs.
//!
//! Sources of non-determinism to watch for:
//!
//! - **HashMap iteration order**: the std hasher is randomized per process.
//!   The engine iterates nodes in declaration order and the router breaks
//!   A* ties by push order, never by hash order.
//! - **Closure-backed sector hooks**: hooks that read external mutable
//!   state must be driven identically between runs.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use tech_core::graph::TechGraph;
use tech_core::router::Connection;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of steps applied per run.
    pub steps: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic run).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run matched, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Runs are non-deterministic!\n\
                 Runs: {}\n\
                 Steps: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.steps,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a scenario multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run the scenario
/// * `steps` - Number of steps to apply per run
/// * `setup` - Function to create initial state
/// * `step` - Function to advance state by one step, given the step index
/// * `hash` - Function to compute the state hash
///
/// # Example
///
/// ```ignore
/// use tech_test_utils::determinism::{graph_state_hash, verify_determinism};
/// use tech_test_utils::fixtures::sample_context;
///
/// let result = verify_determinism(
///     5,
///     20,
///     || sample_context(EngineConfig::default()),
///     |ctx, _| { ctx.credit_resource("Copper", 10).unwrap(); },
///     |ctx| graph_state_hash(ctx.graph()),
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    steps: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S, u64),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for i in 0..steps {
            step(&mut state, i);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        steps,
    }
}

/// Hash of every node's name, cell and state, in declaration order.
#[must_use]
pub fn graph_state_hash(graph: &TechGraph) -> u64 {
    let mut hasher = DefaultHasher::new();
    for node in graph.nodes() {
        node.name().hash(&mut hasher);
        node.position().hash(&mut hasher);
        node.state().hash(&mut hasher);
    }
    hasher.finish()
}

/// Hash of a routed connection list, in order.
#[must_use]
pub fn connections_hash(connections: &[Connection]) -> u64 {
    let mut hasher = DefaultHasher::new();
    for c in connections {
        c.from.hash(&mut hasher);
        c.to.hash(&mut hasher);
        c.route.strategy.hash(&mut hasher);
        c.route.waypoints.hash(&mut hasher);
    }
    hasher.finish()
}

/// Proptest strategies for engine inputs.
pub mod strategies {
    use std::collections::HashSet;

    use proptest::prelude::*;
    use tech_core::grid::GridPosition;
    use tech_core::ledger::ResourceCost;

    /// Resource names used by generated ledgers and costs.
    pub const RESOURCES: [&str; 4] = ["Copper", "Lead", "Sand", "Coal"];

    /// Generate a cell within `-extent..=extent` on both axes.
    pub fn arb_position(extent: i32) -> impl Strategy<Value = GridPosition> {
        (-extent..=extent, -extent..=extent).prop_map(|(x, y)| GridPosition::new(x, y))
    }

    /// Generate an obstacle set of up to `max` cells.
    pub fn arb_obstacles(extent: i32, max: usize) -> impl Strategy<Value = HashSet<GridPosition>> {
        proptest::collection::hash_set(arb_position(extent), 0..max)
    }

    /// Generate a full router input: endpoints plus obstacles.
    pub fn arb_route_input(
        extent: i32,
        max_obstacles: usize,
    ) -> impl Strategy<Value = (GridPosition, GridPosition, HashSet<GridPosition>)> {
        (
            arb_position(extent),
            arb_position(extent),
            arb_obstacles(extent, max_obstacles),
        )
    }

    /// Generate a coordinate biased toward the ends of the `i32` range.
    pub fn arb_far_coordinate() -> impl Strategy<Value = i32> {
        prop_oneof![
            any::<i32>(),
            Just(i32::MIN),
            Just(i32::MAX),
            (i32::MIN..=i32::MIN + 8),
            (i32::MAX - 8..=i32::MAX),
        ]
    }

    /// Router input anywhere on the grid with both single-bend cells
    /// blocked, so search and detour always run.
    pub fn arb_far_route_input(
    ) -> impl Strategy<Value = (GridPosition, GridPosition, HashSet<GridPosition>)> {
        (
            arb_far_coordinate(),
            arb_far_coordinate(),
            arb_far_coordinate(),
            arb_far_coordinate(),
        )
            .prop_map(|(fx, fy, tx, ty)| {
                let from = GridPosition::new(fx, fy);
                let to = GridPosition::new(tx, ty);
                let blocked = [GridPosition::new(tx, fy), GridPosition::new(fx, ty)]
                    .into_iter()
                    .collect();
                (from, to, blocked)
            })
    }

    /// Generate a quantity for each of [`RESOURCES`].
    pub fn arb_quantities() -> impl Strategy<Value = [u32; 4]> {
        proptest::array::uniform4(0u32..200)
    }

    /// Generate a cost list over [`RESOURCES`], repeats allowed.
    pub fn arb_costs(max_len: usize) -> impl Strategy<Value = Vec<ResourceCost>> {
        proptest::collection::vec(
            (0..RESOURCES.len(), 1u32..150)
                .prop_map(|(i, amount)| ResourceCost::new(RESOURCES[i], amount)),
            0..max_len,
        )
    }
}
