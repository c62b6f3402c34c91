//! Integer grid coordinates shared by layout and routing.

use serde::{Deserialize, Serialize};

/// A cell on the tech-tree grid.
///
/// Ordering is row-major (`y` first, then `x`) so that sorted collections of
/// positions iterate top-to-bottom, left-to-right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridPosition {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl GridPosition {
    /// The origin cell.
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    /// Create a new grid position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan (taxicab) distance to another cell, saturating at `u32::MAX`.
    #[must_use]
    pub const fn manhattan_distance(self, other: Self) -> u32 {
        self.x.abs_diff(other.x).saturating_add(self.y.abs_diff(other.y))
    }

    /// True if both cells share a row or a column.
    #[must_use]
    pub const fn is_aligned_with(self, other: Self) -> bool {
        self.x == other.x || self.y == other.y
    }

    /// The four orthogonal neighbours in a fixed order: east, south, west, north.
    ///
    /// On the edge of the `i32` range a neighbour clamps to `self`.
    #[must_use]
    pub const fn neighbors(self) -> [Self; 4] {
        [
            Self::new(self.x.saturating_add(1), self.y),
            Self::new(self.x, self.y.saturating_add(1)),
            Self::new(self.x.saturating_sub(1), self.y),
            Self::new(self.x, self.y.saturating_sub(1)),
        ]
    }

    /// Shift this position down by `rows`, wrapping past the last row.
    #[must_use]
    pub const fn offset_y(self, rows: i32) -> Self {
        Self::new(self.x, self.y.wrapping_add(rows))
    }

    /// The cell halfway between two cells, rounded toward `self`.
    #[must_use]
    pub fn midpoint(self, other: Self) -> Self {
        Self::new(midpoint(self.x, other.x), midpoint(self.y, other.y))
    }
}

/// Halfway point of two coordinates without intermediate overflow.
fn midpoint(a: i32, b: i32) -> i32 {
    let mid = i64::from(a) + (i64::from(b) - i64::from(a)) / 2;
    // Always between `a` and `b`, so it fits.
    i32::try_from(mid).unwrap_or(a)
}

impl Ord for GridPosition {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.y.cmp(&other.y).then(self.x.cmp(&other.x))
    }
}

impl PartialOrd for GridPosition {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl From<(i32, i32)> for GridPosition {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl std::fmt::Display for GridPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Inclusive rectangle of grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridBounds {
    /// Smallest column.
    pub min_x: i32,
    /// Smallest row.
    pub min_y: i32,
    /// Largest column.
    pub max_x: i32,
    /// Largest row.
    pub max_y: i32,
}

impl GridBounds {
    /// Bounds containing exactly one cell.
    #[must_use]
    pub const fn around(pos: GridPosition) -> Self {
        Self {
            min_x: pos.x,
            min_y: pos.y,
            max_x: pos.x,
            max_y: pos.y,
        }
    }

    /// Smallest bounds containing every position, or `None` if empty.
    pub fn enclosing<I>(positions: I) -> Option<Self>
    where
        I: IntoIterator<Item = GridPosition>,
    {
        let mut iter = positions.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Self::around(first), Self::include))
    }

    /// Grow to include a position.
    #[must_use]
    pub fn include(self, pos: GridPosition) -> Self {
        Self {
            min_x: self.min_x.min(pos.x),
            min_y: self.min_y.min(pos.y),
            max_x: self.max_x.max(pos.x),
            max_y: self.max_y.max(pos.y),
        }
    }

    /// Grow by `margin` cells on every side, clamped to the `i32` range.
    #[must_use]
    pub const fn expand(self, margin: i32) -> Self {
        Self {
            min_x: self.min_x.saturating_sub(margin),
            min_y: self.min_y.saturating_sub(margin),
            max_x: self.max_x.saturating_add(margin),
            max_y: self.max_y.saturating_add(margin),
        }
    }

    /// True if the position lies inside (edges included).
    #[must_use]
    pub const fn contains(&self, pos: GridPosition) -> bool {
        pos.x >= self.min_x && pos.x <= self.max_x && pos.y >= self.min_y && pos.y <= self.max_y
    }

    /// Width in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.max_x.abs_diff(self.min_x).saturating_add(1)
    }

    /// Height in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.max_y.abs_diff(self.min_y).saturating_add(1)
    }
}
