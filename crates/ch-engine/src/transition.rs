//! Bulk color transitions.
//!
//! A group color swap is paced as `idle → removing → applying → settling →
//! idle`: old tags come off, a short pause lets the CSS transition show, new
//! tags go on, a longer pause lets it finish, then the transition class is
//! removed. Clear-all strips every tag at once and only waits in `settling`
//! before watchers come back.
//!
//! Reconciliation watchers stay suspended for the whole run; otherwise they
//! would repaint the intermediate untagged state. Only one bulk transition
//! runs at a time.

use crate::page::{HostPage, strip_colors};
use crate::watcher::{ReconciliationWatcher, SuppressionToken};
use ch_core::config::HelperConfig;
use ch_core::palette::{ColorAssignment, GroupSwap};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkPhase {
    Idle,
    /// Old tags removed; waiting before new tags go on.
    Removing,
    /// New tags applied; waiting for the visual transition to finish.
    Applying,
    /// Final cleanup pending.
    Settling,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkOp {
    SwapColors(GroupSwap),
    ClearAll,
}

/// Outcome of one scheduler step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Call [`BulkTransition::advance`] again after this many milliseconds.
    Wait(u32),
    /// The transition completed; the caller persists the result.
    Finished(BulkOp),
    /// Nothing was in flight.
    Idle,
}

pub struct BulkTransition<O> {
    phase: BulkPhase,
    op: Option<BulkOp>,
    token: Option<SuppressionToken<O>>,
}

impl<O> Default for BulkTransition<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O> BulkTransition<O> {
    pub fn new() -> Self {
        Self {
            phase: BulkPhase::Idle,
            op: None,
            token: None,
        }
    }

    pub fn phase(&self) -> BulkPhase {
        self.phase
    }

    pub fn in_flight(&self) -> bool {
        self.phase != BulkPhase::Idle
    }

    /// Start a group swap: suspend watchers and take the old tags off.
    /// Returns `None` if another transition is still running.
    pub fn begin_swap<P>(
        &mut self,
        page: &mut P,
        config: &HelperConfig,
        watcher: &mut ReconciliationWatcher<O>,
        swap: GroupSwap,
    ) -> Option<Step>
    where
        P: HostPage<Observer = O>,
    {
        if self.in_flight() {
            return None;
        }
        self.token = Some(watcher.suspend(page));

        for id in swap.tiles() {
            page.add_class(id, &config.transition_class);
        }
        for id in &swap.source_tiles {
            page.remove_class(*id, &config.color_class(swap.source));
        }
        for id in &swap.target_tiles {
            page.remove_class(*id, &config.color_class(swap.target));
        }

        log::debug!(
            "swapping colors: {} ({} tiles) <-> {} ({} tiles)",
            swap.source,
            swap.source_tiles.len(),
            swap.target,
            swap.target_tiles.len()
        );
        self.op = Some(BulkOp::SwapColors(swap));
        self.phase = BulkPhase::Removing;
        Some(Step::Wait(config.swap_remove_pause_ms))
    }

    /// Start clearing every tag: suspend watchers, strip all live tiles and
    /// empty the model. Returns `None` if another transition is still running.
    pub fn begin_clear<P>(
        &mut self,
        page: &mut P,
        config: &HelperConfig,
        watcher: &mut ReconciliationWatcher<O>,
        colors: &mut ColorAssignment,
    ) -> Option<Step>
    where
        P: HostPage<Observer = O>,
    {
        if self.in_flight() {
            return None;
        }
        self.token = Some(watcher.suspend(page));
        for id in page.tile_ids() {
            strip_colors(page, config, id);
        }
        colors.clear();
        self.op = Some(BulkOp::ClearAll);
        self.phase = BulkPhase::Settling;
        Some(Step::Wait(config.clear_resume_delay_ms))
    }

    /// Run the next phase.
    pub fn advance<P>(
        &mut self,
        page: &mut P,
        config: &HelperConfig,
        watcher: &mut ReconciliationWatcher<O>,
        colors: &mut ColorAssignment,
    ) -> Step
    where
        P: HostPage<Observer = O>,
    {
        match (self.phase, &self.op) {
            (BulkPhase::Removing, Some(BulkOp::SwapColors(swap))) => {
                for id in &swap.source_tiles {
                    page.add_class(*id, &config.color_class(swap.target));
                }
                for id in &swap.target_tiles {
                    page.add_class(*id, &config.color_class(swap.source));
                }
                colors.apply_swap(swap);
                self.phase = BulkPhase::Applying;
                Step::Wait(config.swap_settle_pause_ms)
            }
            (BulkPhase::Applying, Some(BulkOp::SwapColors(swap))) => {
                self.phase = BulkPhase::Settling;
                for id in swap.tiles() {
                    page.remove_class(id, &config.transition_class);
                }
                self.finish(page, watcher)
            }
            (BulkPhase::Settling, Some(_)) => self.finish(page, watcher),
            _ => {
                self.phase = BulkPhase::Idle;
                self.op = None;
                Step::Idle
            }
        }
    }

    /// Drop an in-flight transition and disconnect its suspended observers.
    pub fn abort<P>(&mut self, page: &mut P, watcher: &mut ReconciliationWatcher<O>)
    where
        P: HostPage<Observer = O>,
    {
        watcher.shutdown(page, self.token.take());
        self.phase = BulkPhase::Idle;
        self.op = None;
    }

    fn finish<P>(&mut self, page: &mut P, watcher: &mut ReconciliationWatcher<O>) -> Step
    where
        P: HostPage<Observer = O>,
    {
        watcher.resume(page, self.token.take());
        self.phase = BulkPhase::Idle;
        match self.op.take() {
            Some(op) => Step::Finished(op),
            None => Step::Idle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessPage;
    use crate::page::painted_color;
    use ch_core::color::{ColorChoice, ColorTag};
    use ch_core::id::TileId;

    fn id(s: &str) -> TileId {
        TileId::intern(s)
    }

    struct Fixture {
        page: HeadlessPage,
        config: HelperConfig,
        watcher: ReconciliationWatcher<<HeadlessPage as HostPage>::Observer>,
        colors: ColorAssignment,
    }

    fn fixture() -> Fixture {
        let mut page = HeadlessPage::with_tiles(&["a", "b", "c"]);
        let config = HelperConfig::default();
        let mut colors = ColorAssignment::new();
        for (tile, tag) in [("a", ColorTag::Yellow), ("b", ColorTag::Green)] {
            colors.set(id(tile), ColorChoice::Tag(tag));
            page.add_class(id(tile), &config.color_class(tag));
        }
        let mut watcher = ReconciliationWatcher::new();
        watcher.attach_all(&mut page);
        Fixture {
            page,
            config,
            watcher,
            colors,
        }
    }

    #[test]
    fn swap_walks_through_every_phase() {
        let mut f = fixture();
        let mut t = BulkTransition::new();
        let swap = f.colors.plan_swap(ColorTag::Yellow, ColorTag::Green).unwrap();

        let step = t.begin_swap(&mut f.page, &f.config, &mut f.watcher, swap);
        assert_eq!(step, Some(Step::Wait(50)));
        assert_eq!(t.phase(), BulkPhase::Removing);
        assert_eq!(painted_color(&f.page, &f.config, id("a")), None);
        assert!(f.page.has_class(id("a"), "color-transition"));
        assert_eq!(f.page.connected_observers(), 0);

        let step = t.advance(&mut f.page, &f.config, &mut f.watcher, &mut f.colors);
        assert_eq!(step, Step::Wait(600));
        assert_eq!(t.phase(), BulkPhase::Applying);
        assert_eq!(
            painted_color(&f.page, &f.config, id("a")),
            Some(ColorTag::Green)
        );
        assert_eq!(f.colors.get(id("b")), Some(ColorTag::Yellow));

        let step = t.advance(&mut f.page, &f.config, &mut f.watcher, &mut f.colors);
        assert!(matches!(step, Step::Finished(BulkOp::SwapColors(_))));
        assert_eq!(t.phase(), BulkPhase::Idle);
        assert!(!f.page.has_class(id("a"), "color-transition"));
        assert_eq!(f.page.connected_observers(), 3);
    }

    #[test]
    fn second_bulk_operation_is_rejected_while_running() {
        let mut f = fixture();
        let mut t = BulkTransition::new();
        let swap = f.colors.plan_swap(ColorTag::Yellow, ColorTag::Green).unwrap();
        t.begin_swap(&mut f.page, &f.config, &mut f.watcher, swap.clone());

        assert_eq!(
            t.begin_swap(&mut f.page, &f.config, &mut f.watcher, swap),
            None
        );
        assert_eq!(
            t.begin_clear(&mut f.page, &f.config, &mut f.watcher, &mut f.colors),
            None
        );
    }

    #[test]
    fn clear_waits_in_settling() {
        let mut f = fixture();
        let mut t = BulkTransition::new();
        let step = t.begin_clear(&mut f.page, &f.config, &mut f.watcher, &mut f.colors);
        assert_eq!(step, Some(Step::Wait(100)));
        assert_eq!(t.phase(), BulkPhase::Settling);
        assert!(f.colors.is_empty());
        assert_eq!(painted_color(&f.page, &f.config, id("a")), None);

        let step = t.advance(&mut f.page, &f.config, &mut f.watcher, &mut f.colors);
        assert_eq!(step, Step::Finished(BulkOp::ClearAll));
        assert_eq!(f.watcher.watched(), 3);
    }

    #[test]
    fn advance_when_idle_does_nothing() {
        let mut f = fixture();
        let mut t = BulkTransition::new();
        assert_eq!(
            t.advance(&mut f.page, &f.config, &mut f.watcher, &mut f.colors),
            Step::Idle
        );
    }

    #[test]
    fn abort_disconnects_suspended_observers() {
        let mut f = fixture();
        let mut t = BulkTransition::new();
        let swap = f.colors.plan_swap(ColorTag::Yellow, ColorTag::Green).unwrap();
        t.begin_swap(&mut f.page, &f.config, &mut f.watcher, swap);
        t.abort(&mut f.page, &mut f.watcher);
        assert!(!t.in_flight());
        assert_eq!(f.watcher.watched(), 0);
        assert_eq!(f.page.connected_observers(), 0);
    }
}
