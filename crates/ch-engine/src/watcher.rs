//! DOM Reconciliation Watcher.
//!
//! The host page rewrites a tile's class list whenever it toggles its own
//! selection state, which strips our color tag. One observer per tile
//! reports that churn; [`ReconciliationWatcher::reconcile`] then repaints the
//! recorded color. Repainting is self-healing only and never writes to
//! persistence.
//!
//! Multi-step DOM edits (bulk color swap, clear-all) remove tags on purpose,
//! so they bracket themselves with [`ReconciliationWatcher::suspend`] and
//! [`ReconciliationWatcher::resume`].

use crate::page::{HostPage, painted_color};
use ch_core::config::HelperConfig;
use ch_core::id::TileId;
use ch_core::palette::ColorAssignment;
use std::collections::HashMap;

/// Observers detached by [`ReconciliationWatcher::suspend`].
/// Hand it back to [`ReconciliationWatcher::resume`] to reattach them.
#[must_use = "dropping the token leaves tiles unwatched until a fresh resume"]
pub struct SuppressionToken<O> {
    detached: Vec<(TileId, O)>,
}

impl<O> SuppressionToken<O> {
    pub fn len(&self) -> usize {
        self.detached.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detached.is_empty()
    }
}

/// Per-tile class observers, owned by tile id.
pub struct ReconciliationWatcher<O> {
    observers: HashMap<TileId, O>,
}

impl<O> Default for ReconciliationWatcher<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O> ReconciliationWatcher<O> {
    pub fn new() -> Self {
        Self {
            observers: HashMap::new(),
        }
    }

    pub fn is_watching(&self, id: TileId) -> bool {
        self.observers.contains_key(&id)
    }

    pub fn watched(&self) -> usize {
        self.observers.len()
    }

    /// Observe every live tile that has no observer yet. Returns how many
    /// observers were created.
    pub fn attach_all<P>(&mut self, page: &mut P) -> usize
    where
        P: HostPage<Observer = O>,
    {
        let mut attached = 0;
        for id in page.tile_ids() {
            if self.observers.contains_key(&id) {
                continue;
            }
            if let Some(observer) = page.observe_classes(id) {
                self.observers.insert(id, observer);
                attached += 1;
            }
        }
        attached
    }

    /// Replace the observer of a tile whose node the host page re-rendered.
    pub fn rewatch<P>(&mut self, page: &mut P, id: TileId) -> bool
    where
        P: HostPage<Observer = O>,
    {
        if let Some(stale) = self.observers.remove(&id) {
            page.disconnect(&stale);
        }
        match page.observe_classes(id) {
            Some(observer) => {
                self.observers.insert(id, observer);
                true
            }
            None => false,
        }
    }

    /// Detach every observer and hand them out as a token.
    pub fn suspend<P>(&mut self, page: &mut P) -> SuppressionToken<O>
    where
        P: HostPage<Observer = O>,
    {
        let detached: Vec<(TileId, O)> = self.observers.drain().collect();
        for (_, observer) in &detached {
            page.disconnect(observer);
        }
        log::debug!("suspended {} class observers", detached.len());
        SuppressionToken { detached }
    }

    /// Reattach the observers in `token`. Without a token, or with an empty
    /// one, observers are re-established from scratch.
    pub fn resume<P>(&mut self, page: &mut P, token: Option<SuppressionToken<O>>)
    where
        P: HostPage<Observer = O>,
    {
        match token {
            Some(token) if !token.is_empty() => {
                let count = token.len();
                for (id, observer) in token.detached {
                    page.reconnect(&observer);
                    self.observers.insert(id, observer);
                }
                log::debug!("re-enabled {count} class observers");
            }
            _ => {
                let count = self.attach_all(page);
                log::debug!("re-established {count} class observers");
            }
        }
    }

    /// Disconnect and drop every observer, including those held by `token`.
    pub fn shutdown<P>(&mut self, page: &mut P, token: Option<SuppressionToken<O>>)
    where
        P: HostPage<Observer = O>,
    {
        for (_, observer) in self.observers.drain() {
            page.disconnect(&observer);
        }
        if let Some(token) = token {
            for (_, observer) in token.detached {
                page.disconnect(&observer);
            }
        }
    }

    /// React to class churn on `id`: if the tile shows no tag but the model
    /// records one, paint it back. Returns `true` if a tag was reapplied.
    pub fn reconcile<P>(
        &self,
        page: &mut P,
        config: &HelperConfig,
        colors: &ColorAssignment,
        id: TileId,
    ) -> bool
    where
        P: HostPage<Observer = O>,
    {
        if !self.is_watching(id) {
            return false;
        }
        let Some(recorded) = colors.get(id) else {
            return false;
        };
        if painted_color(page, config, id).is_some() {
            return false;
        }
        page.add_class(id, &config.color_class(recorded));
        log::debug!("reapplied {recorded} to {id}");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessPage;
    use ch_core::color::{ColorChoice, ColorTag};

    fn setup() -> (HeadlessPage, HelperConfig, ColorAssignment) {
        let page = HeadlessPage::with_tiles(&["t1", "t2", "t3"]);
        let config = HelperConfig::default();
        let mut colors = ColorAssignment::new();
        colors.set(TileId::intern("t1"), ColorChoice::Tag(ColorTag::Yellow));
        (page, config, colors)
    }

    #[test]
    fn attach_is_idempotent() {
        let (mut page, _, _) = setup();
        let mut watcher = ReconciliationWatcher::new();
        assert_eq!(watcher.attach_all(&mut page), 3);
        assert_eq!(watcher.attach_all(&mut page), 0);
        assert_eq!(page.connected_observers(), 3);
    }

    #[test]
    fn reconcile_repaints_stripped_tile() {
        let (mut page, config, colors) = setup();
        let mut watcher = ReconciliationWatcher::new();
        watcher.attach_all(&mut page);
        let t1 = TileId::intern("t1");

        assert!(watcher.reconcile(&mut page, &config, &colors, t1));
        assert!(page.has_class(t1, "connections-helper-yellow"));
        // Already painted: nothing to do.
        assert!(!watcher.reconcile(&mut page, &config, &colors, t1));
    }

    #[test]
    fn reconcile_ignores_uncolored_tiles() {
        let (mut page, config, colors) = setup();
        let mut watcher = ReconciliationWatcher::new();
        watcher.attach_all(&mut page);
        assert!(!watcher.reconcile(&mut page, &config, &colors, TileId::intern("t2")));
    }

    #[test]
    fn suspended_tiles_are_not_reconciled() {
        let (mut page, config, colors) = setup();
        let mut watcher = ReconciliationWatcher::new();
        watcher.attach_all(&mut page);

        let token = watcher.suspend(&mut page);
        assert_eq!(token.len(), 3);
        assert_eq!(page.connected_observers(), 0);
        assert!(!watcher.reconcile(&mut page, &config, &colors, TileId::intern("t1")));

        watcher.resume(&mut page, Some(token));
        assert_eq!(page.connected_observers(), 3);
        assert_eq!(watcher.watched(), 3);
    }

    #[test]
    fn rewatch_replaces_the_stale_observer() {
        let (mut page, _, _) = setup();
        let mut watcher = ReconciliationWatcher::new();
        watcher.attach_all(&mut page);
        assert!(watcher.rewatch(&mut page, TileId::intern("t2")));
        assert_eq!(page.connected_observers(), 3);
        assert!(!watcher.rewatch(&mut page, TileId::intern("gone")));
    }

    #[test]
    fn resume_without_token_starts_fresh() {
        let (mut page, _, _) = setup();
        let mut watcher = ReconciliationWatcher::new();
        watcher.resume(&mut page, None);
        assert_eq!(watcher.watched(), 3);
        assert_eq!(page.connected_observers(), 3);
    }
}
