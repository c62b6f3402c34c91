//! Static node placement and collision resolution.
//!
//! Positions come from a fixed name-to-cell table. Nodes missing from the
//! table start at the origin. Collisions are then resolved by probing
//! downwards one row at a time until a free cell is found.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TechError};
use crate::graph::TechGraph;
use crate::grid::GridPosition;

/// One row of the layout table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutEntry {
    /// Node name.
    pub name: String,
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl LayoutEntry {
    /// Create a layout entry.
    pub fn new(name: impl Into<String>, x: i32, y: i32) -> Self {
        Self {
            name: name.into(),
            x,
            y,
        }
    }

    /// The cell this entry names.
    #[must_use]
    pub const fn position(&self) -> GridPosition {
        GridPosition::new(self.x, self.y)
    }
}

/// Ordered name-to-cell table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutTable {
    entries: Vec<LayoutEntry>,
    by_name: HashMap<String, usize>,
}

impl LayoutTable {
    /// Build a table, keeping declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`TechError::DataParseError`] if a name appears twice.
    pub fn from_entries<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = LayoutEntry>,
    {
        let mut table = Self::default();
        for entry in entries {
            if table.by_name.contains_key(&entry.name) {
                return Err(TechError::DataParseError {
                    what: "layout table".into(),
                    message: format!("'{}' is placed twice", entry.name),
                });
            }
            table.by_name.insert(entry.name.clone(), table.entries.len());
            table.entries.push(entry);
        }
        Ok(table)
    }

    /// Cell assigned to a name.
    #[must_use]
    pub fn position_of(&self, name: &str) -> Option<GridPosition> {
        self.by_name.get(name).map(|&i| self.entries[i].position())
    }

    /// Entries in declaration order.
    #[must_use]
    pub fn entries(&self) -> &[LayoutEntry] {
        &self.entries
    }
}

/// A node moved off an occupied cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relocation {
    /// Node name.
    pub node: String,
    /// Cell it asked for.
    pub from: GridPosition,
    /// Cell it got.
    pub to: GridPosition,
}

/// What layout assignment had to improvise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutReport {
    /// Nodes absent from the table, placed from the origin.
    pub unmapped: Vec<String>,
    /// Nodes moved to resolve collisions.
    pub relocated: Vec<Relocation>,
}

/// Place every node from the table, then resolve collisions.
///
/// Table entries for unknown nodes are ignored. Collision resolution runs
/// over mapped nodes in table order, then unmapped nodes in declaration
/// order, so designed positions win over fallbacks.
pub fn assign_positions(graph: &mut TechGraph, table: &LayoutTable, warn_unmapped: bool) -> LayoutReport {
    let mut report = LayoutReport::default();

    let mut order: Vec<usize> = table
        .entries()
        .iter()
        .filter_map(|entry| graph.index_of(&entry.name))
        .collect();

    for index in 0..graph.len() {
        let name = graph.nodes()[index].name();
        match table.position_of(name) {
            Some(position) => graph.set_position(index, position),
            None => {
                if warn_unmapped {
                    tracing::warn!(node = name, "Tech node has no layout entry, placing at origin");
                }
                report.unmapped.push(name.to_string());
                graph.set_position(index, GridPosition::ORIGIN);
                order.push(index);
            }
        }
    }

    report.relocated = resolve_overlaps(graph, &order);
    report
}

/// Move nodes down until no two share a cell.
///
/// Nodes are visited in `order`; each keeps its cell if free, otherwise its
/// row grows by one until a free cell is found. Earlier nodes never move
/// for later ones.
pub fn resolve_overlaps(graph: &mut TechGraph, order: &[usize]) -> Vec<Relocation> {
    let mut occupied: HashSet<GridPosition> = HashSet::with_capacity(order.len());
    let mut relocated = Vec::new();

    for &index in order {
        let requested = graph.nodes()[index].position();
        let mut position = requested;
        while occupied.contains(&position) {
            position = position.offset_y(1);
        }
        occupied.insert(position);

        if position != requested {
            graph.set_position(index, position);
            let node = graph.nodes()[index].name().to_string();
            tracing::debug!(%node, from = %requested, to = %position, "Resolved layout overlap");
            relocated.push(Relocation {
                node,
                from: requested,
                to: position,
            });
        }
    }
    relocated
}
