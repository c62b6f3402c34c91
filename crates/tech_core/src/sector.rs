//! Campaign sector status, as seen by the unlock engine.
//!
//! The engine does not own campaign progress. It asks a [`SectorResolver`]
//! two questions: what state a named sector is in, and whether a name refers
//! to a sector at all.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Progress state of a campaign sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SectorStatus {
    /// Not reachable yet.
    #[default]
    Locked,
    /// Reachable but not started.
    Available,
    /// Landed and being played.
    InProgress,
    /// Captured.
    Completed,
}

/// Source of sector state for dependency evaluation.
pub trait SectorResolver {
    /// Current status of a sector. Unknown sectors are [`SectorStatus::Locked`].
    fn status(&self, sector: &str) -> SectorStatus;

    /// True if `name` names a campaign sector.
    fn is_sector_name(&self, name: &str) -> bool;
}

/// Boxed status lookup closure.
pub type StatusFn = Box<dyn Fn(&str) -> SectorStatus>;

/// Boxed sector-name predicate closure.
pub type SectorNameFn = Box<dyn Fn(&str) -> bool>;

/// Closure-based resolver wiring the engine to an external campaign system.
///
/// Until replaced, every sector reports `Locked` and no name is a sector.
pub struct SectorHooks {
    status: StatusFn,
    is_sector_name: SectorNameFn,
}

impl SectorHooks {
    /// Hooks that know no sectors.
    #[must_use]
    pub fn new() -> Self {
        Self {
            status: Box::new(|_| SectorStatus::Locked),
            is_sector_name: Box::new(|_| false),
        }
    }

    /// Replace the status lookup.
    pub fn set_status_resolver(&mut self, f: impl Fn(&str) -> SectorStatus + 'static) {
        self.status = Box::new(f);
    }

    /// Replace the sector-name predicate.
    pub fn set_is_sector_name_resolver(&mut self, f: impl Fn(&str) -> bool + 'static) {
        self.is_sector_name = Box::new(f);
    }
}

impl Default for SectorHooks {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SectorHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SectorHooks").finish_non_exhaustive()
    }
}

impl SectorResolver for SectorHooks {
    fn status(&self, sector: &str) -> SectorStatus {
        (self.status)(sector)
    }

    fn is_sector_name(&self, name: &str) -> bool {
        (self.is_sector_name)(name)
    }
}

/// In-memory table of sector states.
///
/// Used for offline simulation and tests; a live client plugs its campaign
/// state in through [`SectorHooks`] instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorBoard {
    sectors: BTreeMap<String, SectorStatus>,
}

impl SectorBoard {
    /// Create an empty board.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sector or change its status.
    pub fn set(&mut self, sector: impl Into<String>, status: SectorStatus) {
        self.sectors.insert(sector.into(), status);
    }

    /// Builder form of [`SectorBoard::set`].
    #[must_use]
    pub fn with(mut self, sector: impl Into<String>, status: SectorStatus) -> Self {
        self.set(sector, status);
        self
    }

    /// Iterate over sectors in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, SectorStatus)> {
        self.sectors.iter().map(|(name, status)| (name.as_str(), *status))
    }
}

impl SectorResolver for SectorBoard {
    fn status(&self, sector: &str) -> SectorStatus {
        self.sectors.get(sector).copied().unwrap_or_default()
    }

    fn is_sector_name(&self, name: &str) -> bool {
        self.sectors.contains_key(name)
    }
}

impl<R: SectorResolver + ?Sized> SectorResolver for &R {
    fn status(&self, sector: &str) -> SectorStatus {
        (**self).status(sector)
    }

    fn is_sector_name(&self, name: &str) -> bool {
        (**self).is_sector_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_default_hooks_know_nothing() {
        let hooks = SectorHooks::default();
        assert_eq!(hooks.status("Ground Zero"), SectorStatus::Locked);
        assert!(!hooks.is_sector_name("Ground Zero"));
    }

    #[test]
    fn test_hooks_follow_shared_board() {
        let board = Rc::new(RefCell::new(
            SectorBoard::new().with("Ground Zero", SectorStatus::Available),
        ));

        let mut hooks = SectorHooks::new();
        let status_board = Rc::clone(&board);
        hooks.set_status_resolver(move |name| status_board.borrow().status(name));
        let name_board = Rc::clone(&board);
        hooks.set_is_sector_name_resolver(move |name| name_board.borrow().is_sector_name(name));

        assert_eq!(hooks.status("Ground Zero"), SectorStatus::Available);
        board.borrow_mut().set("Ground Zero", SectorStatus::Completed);
        assert_eq!(hooks.status("Ground Zero"), SectorStatus::Completed);
        assert!(hooks.is_sector_name("Ground Zero"));
        assert!(!hooks.is_sector_name("Copper"));
    }

    #[test]
    fn test_board_unknown_sector_is_locked() {
        let board = SectorBoard::new();
        assert_eq!(board.status("Nowhere"), SectorStatus::Locked);
    }
}
