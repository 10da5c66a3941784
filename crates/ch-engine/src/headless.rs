//! In-memory [`HostPage`] for tests and native embedding.
//!
//! Behaves like the puzzle page as far as the engine can tell: tiles in
//! order with class sets, a date element, per-tile class observers that
//! queue mutation records, and a log of status messages and select keys.

use crate::controller::Controller;
use crate::input::PageEvent;
use crate::page::HostPage;
use ch_core::id::TileId;
use ch_core::store::SessionStore;
use std::collections::{BTreeSet, HashMap, VecDeque};

#[derive(Debug, Clone)]
struct HeadlessTile {
    id: TileId,
    /// Identity of the rendered node; a re-render gets a new one.
    node: u64,
    text: String,
    classes: BTreeSet<String>,
    drag_marker: bool,
}

/// Handle to a headless class observer, bound to one rendered node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeadlessObserver {
    handle: u64,
    tile: TileId,
    node: u64,
}

#[derive(Debug, Default)]
pub struct HeadlessPage {
    tiles: Vec<HeadlessTile>,
    date: Option<String>,
    connected: HashMap<u64, (TileId, u64)>,
    next_handle: u64,
    next_node: u64,
    mutations: VecDeque<TileId>,
    statuses: Vec<String>,
    select_keys: Vec<TileId>,
    decorations: usize,
}

impl HeadlessPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// A page whose tile text equals the upper-cased id.
    pub fn with_tiles(ids: &[&str]) -> Self {
        let mut page = Self::new();
        page.render(ids);
        page
    }

    pub fn with_date(mut self, date: &str) -> Self {
        self.date = Some(date.to_string());
        self
    }

    pub fn set_date(&mut self, date: Option<&str>) {
        self.date = date.map(str::to_string);
    }

    /// Replace the board with freshly rendered tiles (new nodes, no classes,
    /// no drag markers), as the host page does on re-render. Observers of
    /// the old nodes stay connected but never fire again.
    pub fn render(&mut self, ids: &[&str]) {
        let mut tiles = Vec::with_capacity(ids.len());
        for id in ids {
            self.next_node += 1;
            tiles.push(HeadlessTile {
                id: TileId::intern(id),
                node: self.next_node,
                text: id.to_uppercase(),
                classes: BTreeSet::new(),
                drag_marker: false,
            });
        }
        self.tiles = tiles;
    }

    /// Unmount the board.
    pub fn unmount(&mut self) {
        self.tiles.clear();
    }

    /// The host page rewriting a tile's class list on a selection toggle,
    /// which drops every class it did not set itself.
    pub fn host_reset_classes(&mut self, id: TileId) {
        if let Some(tile) = self.tile_mut(id) {
            tile.classes.clear();
            self.record_mutation(id);
        }
    }

    /// Pending class mutation records, oldest first.
    pub fn take_mutations(&mut self) -> Vec<TileId> {
        self.mutations.drain(..).collect()
    }

    pub fn classes(&self, id: TileId) -> Vec<String> {
        self.tile(id)
            .map(|t| t.classes.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn statuses(&self) -> &[String] {
        &self.statuses
    }

    pub fn last_status(&self) -> Option<&str> {
        self.statuses.last().map(String::as_str)
    }

    pub fn select_keys(&self) -> &[TileId] {
        &self.select_keys
    }

    pub fn connected_observers(&self) -> usize {
        self.connected.len()
    }

    pub fn decorations(&self) -> usize {
        self.decorations
    }

    pub fn has_drag_marker(&self, id: TileId) -> bool {
        self.tile(id).is_some_and(|t| t.drag_marker)
    }

    fn tile(&self, id: TileId) -> Option<&HeadlessTile> {
        self.tiles.iter().find(|t| t.id == id)
    }

    fn tile_mut(&mut self, id: TileId) -> Option<&mut HeadlessTile> {
        self.tiles.iter_mut().find(|t| t.id == id)
    }

    fn record_mutation(&mut self, id: TileId) {
        let Some(node) = self.tile(id).map(|t| t.node) else {
            return;
        };
        if self.connected.values().any(|watched| *watched == (id, node)) {
            self.mutations.push_back(id);
        }
    }
}

impl HostPage for HeadlessPage {
    type Observer = HeadlessObserver;

    fn tile_ids(&self) -> Vec<TileId> {
        self.tiles.iter().map(|t| t.id).collect()
    }

    fn tile_text(&self, id: TileId) -> Option<String> {
        self.tile(id).map(|t| t.text.clone())
    }

    fn game_date(&self) -> Option<String> {
        self.date.clone()
    }

    fn has_class(&self, id: TileId, class: &str) -> bool {
        self.tile(id).is_some_and(|t| t.classes.contains(class))
    }

    fn add_class(&mut self, id: TileId, class: &str) {
        let changed = self
            .tile_mut(id)
            .is_some_and(|t| t.classes.insert(class.to_string()));
        if changed {
            self.record_mutation(id);
        }
    }

    fn remove_class(&mut self, id: TileId, class: &str) {
        let changed = self.tile_mut(id).is_some_and(|t| t.classes.remove(class));
        if changed {
            self.record_mutation(id);
        }
    }

    fn arrange(&mut self, order: &[TileId]) {
        for id in order {
            if let Some(pos) = self.tiles.iter().position(|t| t.id == *id) {
                let tile = self.tiles.remove(pos);
                self.tiles.push(tile);
            }
        }
    }

    fn send_select_key(&mut self, id: TileId) {
        if self.tile(id).is_some() {
            self.select_keys.push(id);
        }
    }

    fn show_status(&mut self, message: &str, _duration_ms: u32) {
        self.statuses.push(message.to_string());
    }

    fn decorate(&mut self) {
        self.decorations += 1;
    }

    fn observe_classes(&mut self, id: TileId) -> Option<Self::Observer> {
        let node = self.tile(id)?.node;
        let handle = self.next_handle;
        self.next_handle += 1;
        self.connected.insert(handle, (id, node));
        Some(HeadlessObserver {
            handle,
            tile: id,
            node,
        })
    }

    fn disconnect(&mut self, observer: &Self::Observer) {
        self.connected.remove(&observer.handle);
    }

    fn reconnect(&mut self, observer: &Self::Observer) {
        self.connected
            .insert(observer.handle, (observer.tile, observer.node));
    }

    fn instrument_drag(&mut self, id: TileId) -> bool {
        match self.tile_mut(id) {
            Some(tile) if !tile.drag_marker => {
                tile.drag_marker = true;
                true
            }
            _ => false,
        }
    }
}

impl<S: SessionStore> Controller<HeadlessPage, S> {
    /// Deliver queued class mutation records until none are left.
    pub fn pump_mutations(&mut self) -> usize {
        let mut delivered = 0;
        loop {
            let batch = self.page_mut().take_mutations();
            if batch.is_empty() {
                return delivered;
            }
            for id in batch {
                self.handle(PageEvent::ClassMutated(id));
                delivered += 1;
            }
        }
    }

    /// Fire requested wakeups immediately, in request order, until no more
    /// are requested (at most [`MAX_TIMER_ROUNDS`] rounds). Mutation records
    /// are delivered between rounds. Returns the number of wakeups fired.
    pub fn run_timers(&mut self) -> usize {
        let mut fired = 0;
        for _ in 0..MAX_TIMER_ROUNDS {
            self.pump_mutations();
            let due = self.take_wakeups();
            if due.is_empty() {
                break;
            }
            for wakeup in due {
                self.on_timer(wakeup.timer);
                fired += 1;
            }
        }
        self.pump_mutations();
        fired
    }
}

/// Retries never give up, so a page without tiles would fire forever.
pub const MAX_TIMER_ROUNDS: usize = 16;

#[cfg(test)]
mod tests {
    use super::*;
    use ch_core::id::tile_ids;
    use pretty_assertions::assert_eq;

    #[test]
    fn arrange_moves_existing_tiles() {
        let mut page = HeadlessPage::with_tiles(&["a", "b", "c"]);
        page.add_class(TileId::intern("b"), "keep");
        page.arrange(&tile_ids(["c", "a", "b"]));
        assert_eq!(page.tile_ids(), tile_ids(["c", "a", "b"]));
        assert!(page.has_class(TileId::intern("b"), "keep"));
    }

    #[test]
    fn only_observed_tiles_record_mutations() {
        let mut page = HeadlessPage::with_tiles(&["a", "b"]);
        let a = TileId::intern("a");
        let b = TileId::intern("b");
        let observer = page.observe_classes(a).unwrap();

        page.add_class(a, "x");
        page.add_class(b, "x");
        assert_eq!(page.take_mutations(), vec![a]);

        page.disconnect(&observer);
        page.remove_class(a, "x");
        assert_eq!(page.take_mutations(), Vec::<TileId>::new());
    }

    #[test]
    fn observers_do_not_follow_rerendered_nodes() {
        let mut page = HeadlessPage::with_tiles(&["a"]);
        let a = TileId::intern("a");
        let stale = page.observe_classes(a).unwrap();

        page.render(&["a"]);
        page.disconnect(&stale);
        page.reconnect(&stale);
        page.add_class(a, "x");
        assert_eq!(page.take_mutations(), Vec::<TileId>::new());

        page.observe_classes(a).unwrap();
        page.remove_class(a, "x");
        assert_eq!(page.take_mutations(), vec![a]);
    }

    #[test]
    fn instrument_is_guarded_by_marker() {
        let mut page = HeadlessPage::with_tiles(&["a"]);
        let a = TileId::intern("a");
        assert!(page.instrument_drag(a));
        assert!(!page.instrument_drag(a));
        page.render(&["a"]);
        assert!(page.instrument_drag(a));
    }
}
