//! # Busy Flags
//!
//! Each delivering worker owns a [`BusyFlag`] that it raises while it is
//! trying to take work and lowers right after. A [`BusyBoard`] is the fixed
//! set of those flags that another worker reads to answer "is anyone busy
//! right now?".
//!
//! The answer is a snapshot. Nothing stops a flag from being raised the
//! instant after [`BusyBoard::all_idle`] returns.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A shared on/off status cell.
#[derive(Clone, Default)]
pub struct BusyFlag {
    busy: Arc<AtomicBool>,
}

impl std::fmt::Debug for BusyFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("BusyFlag").field(&self.is_set()).finish()
    }
}

impl BusyFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self) {
        self.busy.store(true, Ordering::SeqCst);
    }

    pub fn clear(&self) {
        self.busy.store(false, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }
}

/// A fixed collection of [`BusyFlag`]s, one per worker.
#[derive(Clone, Debug, Default)]
pub struct BusyBoard {
    flags: Vec<BusyFlag>,
}

impl BusyBoard {
    pub fn new(flags: Vec<BusyFlag>) -> Self {
        Self { flags }
    }

    /// True when no flag on the board is raised.
    pub fn all_idle(&self) -> bool {
        self.flags.iter().all(|flag| !flag.is_set())
    }

    pub fn busy_count(&self) -> usize {
        self.flags.iter().filter(|flag| flag.is_set()).count()
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

impl FromIterator<BusyFlag> for BusyBoard {
    fn from_iter<I: IntoIterator<Item = BusyFlag>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_reflects_flag_changes() {
        let alice = BusyFlag::new();
        let charlie = BusyFlag::new();
        let board: BusyBoard = [alice.clone(), charlie.clone()].into_iter().collect();

        assert!(board.all_idle());

        alice.set();
        assert!(!board.all_idle());
        assert_eq!(board.busy_count(), 1);

        charlie.set();
        alice.clear();
        assert!(!board.all_idle());

        charlie.clear();
        assert!(board.all_idle());
        assert_eq!(board.len(), 2);
    }

    #[test]
    fn test_empty_board_is_idle() {
        assert!(BusyBoard::default().all_idle());
    }
}
