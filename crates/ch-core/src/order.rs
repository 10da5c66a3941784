//! Tile Order Model.
//!
//! Orders are plain sequences of [`TileId`]s. All reordering is computed here
//! as pure sequence operations; the engine then moves the existing DOM nodes
//! to match, so listeners and observers attached to them stay valid.

use crate::id::TileId;
use std::collections::HashMap;

/// The captured original order and the live current order of the board.
///
/// Invariant: once captured, `current` is always a permutation of the
/// identifier set of `original`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TileOrder {
    original: Vec<TileId>,
    current: Vec<TileId>,
}

impl TileOrder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture `live` as the original order. No-op (returns `false`) if an
    /// original order has already been captured.
    pub fn capture_original(&mut self, live: &[TileId]) -> bool {
        if self.is_captured() {
            return false;
        }
        self.original = live.to_vec();
        self.current = live.to_vec();
        true
    }

    pub fn is_captured(&self) -> bool {
        !self.original.is_empty()
    }

    /// Whether `live` holds exactly the captured identifier set.
    pub fn matches_tiles(&self, live: &[TileId]) -> bool {
        same_members(&self.original, live)
    }

    /// Forget the captured order so the next capture takes effect.
    pub fn forget(&mut self) {
        self.original.clear();
        self.current.clear();
    }

    pub fn original(&self) -> &[TileId] {
        &self.original
    }

    pub fn current(&self) -> &[TileId] {
        &self.current
    }

    /// Adopt the order the page currently shows.
    pub fn sync_current(&mut self, live: &[TileId]) {
        self.current = live.to_vec();
    }

    /// Exchange the positions of `a` and `b` in the current order.
    /// Returns `false` when nothing moved.
    pub fn swap(&mut self, a: TileId, b: TileId) -> bool {
        match swap_positions(&self.current, a, b) {
            Some(next) => {
                self.current = next;
                true
            }
            None => false,
        }
    }

    /// Put the current order back to the captured original.
    /// Returns `false` when it already was.
    pub fn reset_to_original(&mut self) -> bool {
        if self.current.len() < 2 {
            return false;
        }
        let next = arrange_by(&self.current, &self.original);
        if next == self.current {
            return false;
        }
        self.current = next;
        true
    }

    /// Apply a previously persisted order to the current one; see [`arrange_by`].
    pub fn restore(&mut self, persisted: &[TileId]) -> bool {
        if persisted.is_empty() || self.current.is_empty() {
            return false;
        }
        let next = arrange_by(&self.current, persisted);
        if next == self.current {
            return false;
        }
        self.current = next;
        true
    }
}

/// Exchange the positions of `a` and `b`, keeping every other tile in place.
///
/// Returns `None` for the no-op cases: fewer than two tiles, `a == b`, or
/// either id not present.
pub fn swap_positions(order: &[TileId], a: TileId, b: TileId) -> Option<Vec<TileId>> {
    if order.len() < 2 || a == b {
        return None;
    }
    let ia = order.iter().position(|id| *id == a)?;
    let ib = order.iter().position(|id| *id == b)?;
    let mut next = order.to_vec();
    next.swap(ia, ib);
    Some(next)
}

/// Stable sort of `live` by each id's position in `preferred`.
///
/// Ids missing from `preferred` sort after all known ids and keep their
/// relative order from `live`. Ids in `preferred` that are not live are
/// ignored.
pub fn arrange_by(live: &[TileId], preferred: &[TileId]) -> Vec<TileId> {
    let rank: HashMap<TileId, usize> = preferred
        .iter()
        .enumerate()
        .rev()
        .map(|(i, id)| (*id, i))
        .collect();
    let mut next = live.to_vec();
    next.sort_by_key(|id| rank.get(id).copied().unwrap_or(usize::MAX));
    next
}

/// Whether two sequences hold the same ids with the same multiplicities.
pub fn same_members(a: &[TileId], b: &[TileId]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut counts: HashMap<TileId, isize> = HashMap::with_capacity(a.len());
    for id in a {
        *counts.entry(*id).or_default() += 1;
    }
    for id in b {
        *counts.entry(*id).or_default() -= 1;
    }
    counts.values().all(|n| *n == 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::tile_ids;
    use pretty_assertions::assert_eq;

    #[test]
    fn swap_exchanges_two_positions() {
        let order = tile_ids(["t1", "t2", "t3", "t4"]);
        let next = swap_positions(&order, "t1".into(), "t3".into()).unwrap();
        assert_eq!(next, tile_ids(["t3", "t2", "t1", "t4"]));
    }

    #[test]
    fn swap_adjacent() {
        let order = tile_ids(["t1", "t2", "t3"]);
        let next = swap_positions(&order, "t2".into(), "t3".into()).unwrap();
        assert_eq!(next, tile_ids(["t1", "t3", "t2"]));
    }

    #[test]
    fn swap_noop_cases() {
        let order = tile_ids(["t1", "t2"]);
        assert_eq!(swap_positions(&order, "t1".into(), "t1".into()), None);
        assert_eq!(swap_positions(&order, "t1".into(), "t9".into()), None);
        let single = tile_ids(["t1"]);
        assert_eq!(swap_positions(&single, "t1".into(), "t1".into()), None);
        assert_eq!(swap_positions(&[], "t1".into(), "t2".into()), None);
    }

    #[test]
    fn arrange_puts_unknown_ids_last_in_live_order() {
        let live = tile_ids(["n1", "t1", "n2", "t2", "t3"]);
        let preferred = tile_ids(["t3", "t1", "t2"]);
        assert_eq!(
            arrange_by(&live, &preferred),
            tile_ids(["t3", "t1", "t2", "n1", "n2"])
        );
    }

    #[test]
    fn arrange_ignores_stale_ids() {
        let live = tile_ids(["t1", "t2"]);
        let preferred = tile_ids(["gone", "t2", "t1"]);
        assert_eq!(arrange_by(&live, &preferred), tile_ids(["t2", "t1"]));
    }

    #[test]
    fn capture_is_idempotent() {
        let mut order = TileOrder::new();
        assert!(order.capture_original(&tile_ids(["t1", "t2"])));
        assert!(!order.capture_original(&tile_ids(["t2", "t1"])));
        assert_eq!(order.original(), tile_ids(["t1", "t2"]).as_slice());
    }

    #[test]
    fn reset_returns_to_original() {
        let mut order = TileOrder::new();
        order.capture_original(&tile_ids(["t1", "t2", "t3", "t4"]));
        assert!(order.swap("t1".into(), "t4".into()));
        assert!(order.swap("t2".into(), "t4".into()));
        assert!(order.reset_to_original());
        assert_eq!(order.current(), order.original());
        assert!(!order.reset_to_original());
    }

    #[test]
    fn restore_with_empty_order_is_noop() {
        let mut order = TileOrder::new();
        order.capture_original(&tile_ids(["t1", "t2"]));
        assert!(!order.restore(&[]));
        assert_eq!(order.current(), tile_ids(["t1", "t2"]).as_slice());
    }

    #[test]
    fn same_members_detects_differences() {
        assert!(same_members(
            &tile_ids(["a", "b", "c"]),
            &tile_ids(["c", "a", "b"])
        ));
        assert!(!same_members(&tile_ids(["a", "b"]), &tile_ids(["a", "a"])));
        assert!(!same_members(&tile_ids(["a"]), &tile_ids(["a", "b"])));
    }
}
