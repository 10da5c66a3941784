//! Session Lifecycle Manager.
//!
//! [`Controller`] is the one explicitly owned helper object. The extension
//! entry point constructs it and hands every page event, timer and message
//! to it. It owns the host page, the session store and the order model; the
//! per-instance state (colors, pending target, watchers, interaction state)
//! lives in an [`Instance`] that exists only while the board is rendered.
//!
//! Timers are requested, not run: operations push [`Wakeup`]s that the host
//! drains with [`Controller::take_wakeups`], schedules, and feeds back
//! through [`Controller::on_timer`].

use crate::drag::DragController;
use crate::input::PageEvent;
use crate::menu::{ContextMenu, SwapPicker};
use crate::page::{HostPage, paint};
use crate::transition::{BulkPhase, BulkTransition};
use crate::watcher::ReconciliationWatcher;
use ch_core::config::HelperConfig;
use ch_core::id::TileId;
use ch_core::model::{EpochCheck, PendingTarget, SessionEpoch};
use ch_core::order::TileOrder;
use ch_core::palette::ColorAssignment;
use ch_core::protocol::Message;
use ch_core::store::{Persistence, SessionStore};

/// What a scheduled wakeup should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timer {
    /// Initialization attempt (initial delay or retry backoff).
    Init,
    /// Next phase of a bulk color transition. Wakeups from an instance that
    /// has since been torn down carry a stale generation and are ignored.
    Bulk { generation: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wakeup {
    pub timer: Timer,
    pub delay_ms: u32,
}

/// State that lives exactly as long as the rendered board.
pub(crate) struct Instance<O> {
    pub(crate) colors: ColorAssignment,
    pub(crate) pending: Option<PendingTarget>,
    pub(crate) watcher: ReconciliationWatcher<O>,
    pub(crate) drag: DragController,
    pub(crate) menu: ContextMenu,
    pub(crate) picker: SwapPicker,
    pub(crate) transition: BulkTransition<O>,
    /// Tiles re-rendered during a bulk transition, still watched through
    /// observers bound to their old nodes.
    pub(crate) rerendered: Vec<TileId>,
}

impl<O> Instance<O> {
    fn new() -> Self {
        Self {
            colors: ColorAssignment::new(),
            pending: None,
            watcher: ReconciliationWatcher::new(),
            drag: DragController::new(),
            menu: ContextMenu::default(),
            picker: SwapPicker::default(),
            transition: BulkTransition::new(),
            rerendered: Vec::new(),
        }
    }
}

pub struct Controller<P: HostPage, S: SessionStore> {
    pub(crate) page: P,
    pub(crate) store: S,
    pub(crate) config: HelperConfig,
    pub(crate) persistence: Persistence,
    pub(crate) order: TileOrder,
    pub(crate) instance: Option<Instance<P::Observer>>,
    pub(crate) generation: u64,
    wakeups: Vec<Wakeup>,
    init_scheduled: bool,
}

impl<P: HostPage, S: SessionStore> Controller<P, S> {
    pub fn new(page: P, store: S, config: HelperConfig) -> Self {
        let persistence = Persistence::new(config.storage_prefix.clone());
        Self {
            page,
            store,
            config,
            persistence,
            order: TileOrder::new(),
            instance: None,
            generation: 0,
            wakeups: Vec::new(),
            init_scheduled: false,
        }
    }

    // ─── Lifecycle ───────────────────────────────────────────────────────

    /// Schedule the first initialization attempt.
    pub fn start(&mut self) {
        if self.instance.is_none() {
            self.schedule_init(self.config.init_delay_ms);
        }
    }

    /// Try to initialize now. Without tiles, a retry is scheduled at the
    /// fixed retry interval; retries never give up.
    pub fn try_initialize(&mut self) -> bool {
        if self.instance.is_some() {
            return true;
        }
        let live = self.page.tile_ids();
        if live.is_empty() {
            log::info!("game not loaded yet, retrying");
            self.schedule_init(self.config.retry_interval_ms);
            return false;
        }
        self.initialize();
        true
    }

    pub fn is_initialized(&self) -> bool {
        self.instance.is_some()
    }

    /// React to a structural change of the page: tear down when the board
    /// disappears, initialize when it (re)appears, otherwise just refresh
    /// drag instrumentation on whatever tiles are present.
    pub fn on_tree_mutated(&mut self) {
        let live = self.page.tile_ids();
        if live.is_empty() {
            if self.instance.is_some() {
                self.teardown();
            }
            return;
        }
        if self.instance.is_none() {
            self.initialize();
            log::info!("helper re-initialized");
        } else {
            self.refresh_instrumentation();
        }
    }

    /// Invalidate the live instance: disconnect its observers and abandon any
    /// in-flight transition. Persisted state is kept.
    pub fn teardown(&mut self) {
        if let Some(mut inst) = self.instance.take() {
            inst.transition.abort(&mut self.page, &mut inst.watcher);
            inst.watcher.shutdown(&mut self.page, None);
            log::info!("board unmounted, helper torn down");
        }
        self.generation += 1;
    }

    fn initialize(&mut self) {
        let live = self.page.tile_ids();

        let displayed = self.page.game_date().map(SessionEpoch::new);
        let stored = self.persistence.epoch(&self.store);
        let check = EpochCheck::compare(stored, displayed);
        log::debug!("epoch check: {check:?}");
        if let EpochCheck::Changed { previous, current } = &check {
            log::info!("game date changed from {previous} to {current}, clearing stored state");
            self.persistence.invalidate_epoch(&mut self.store);
            self.order.forget();
        }
        if let Some(current) = check.current() {
            self.persistence.save_epoch(&mut self.store, current);
        }

        self.page.decorate();

        if self.order.is_captured() && !self.order.matches_tiles(&live) {
            self.order.forget();
        }
        if self.order.capture_original(&live) {
            log::debug!("original order stored: {:?}", self.order.original());
        }
        self.order.sync_current(&live);

        let mut inst = Instance::new();
        for id in &live {
            if self.page.instrument_drag(*id) {
                inst.drag.note_instrumented(*id);
            }
        }
        inst.watcher.attach_all(&mut self.page);
        self.instance = Some(inst);

        self.restore_colors();
        self.restore_order();
        self.restore_target();
        log::info!("helper initialized with {} tiles", live.len());
    }

    fn refresh_instrumentation(&mut self) {
        let Some(inst) = self.instance.as_mut() else {
            return;
        };
        // A tile without the drag marker is a node the host rendered anew.
        let mut fresh = 0;
        for id in self.page.tile_ids() {
            if self.page.instrument_drag(id) {
                inst.drag.note_instrumented(id);
                if !inst.rerendered.contains(&id) {
                    inst.rerendered.push(id);
                }
                fresh += 1;
            }
        }
        if fresh > 0 {
            log::debug!("refreshed drag and drop on {fresh} tiles");
        }
        self.rewatch_rerendered();
    }

    /// Bind observers to re-rendered nodes and repaint them. Waits while a
    /// bulk transition holds the observers.
    pub(crate) fn rewatch_rerendered(&mut self) {
        let Some(inst) = self.instance.as_mut() else {
            return;
        };
        if inst.transition.in_flight() {
            return;
        }
        for id in std::mem::take(&mut inst.rerendered) {
            inst.watcher.rewatch(&mut self.page, id);
            inst.watcher
                .reconcile(&mut self.page, &self.config, &inst.colors, id);
        }
        inst.watcher.attach_all(&mut self.page);
    }

    fn restore_colors(&mut self) {
        let Some(inst) = self.instance.as_mut() else {
            return;
        };
        match self.persistence.load_colors(&self.store) {
            Ok(Some(colors)) => {
                log::debug!("restored colors for {} cards", colors.len());
                for id in self.page.tile_ids() {
                    if let Some(tag) = colors.get(id) {
                        paint(&mut self.page, &self.config, id, Some(tag));
                    }
                }
                inst.colors = colors;
            }
            Ok(None) => {}
            Err(e) => log::error!("error restoring card colors: {e}"),
        }
    }

    fn restore_order(&mut self) {
        match self.persistence.load_order(&self.store) {
            Ok(Some(persisted)) => {
                if self.order.restore(&persisted) {
                    self.page.arrange(self.order.current());
                    log::debug!("card order restored");
                }
            }
            Ok(None) => {}
            Err(e) => log::error!("error restoring card order: {e}"),
        }
    }

    fn restore_target(&mut self) {
        let Some(inst) = self.instance.as_mut() else {
            return;
        };
        if let Some(target) = self.persistence.load_target(&self.store)
            && self.page.tile_text(target.id).is_some()
        {
            log::debug!("restored target {} ({})", target.id, target.text);
            inst.pending = Some(target);
        }
    }

    // ─── Dispatch ────────────────────────────────────────────────────────

    /// Handle one page event. Returns `true` if menu or picker state changed
    /// and the injected UI should be re-rendered.
    pub fn handle(&mut self, event: PageEvent) -> bool {
        if let PageEvent::TreeMutated = event {
            let was = self.instance.is_some();
            self.on_tree_mutated();
            return was != self.instance.is_some();
        }
        if self.instance.is_none() {
            return false;
        }
        match event {
            PageEvent::ClassMutated(id) => {
                self.reconcile(id);
                false
            }
            PageEvent::TreeMutated => false,
            PageEvent::DragStart(id) => self.with_drag(|drag| drag.drag_start(id)),
            PageEvent::DragOver(id) => self.with_drag(|drag| drag.drag_over(id)),
            PageEvent::DragLeave(id) => self.with_drag(|drag| drag.drag_leave(id)),
            PageEvent::DragEnd(_) => self.with_drag(|drag| drag.drag_end()),
            PageEvent::Drop { target, payload } => {
                self.with_drag(|drag| drag.drop_on(target, payload))
            }
            PageEvent::ContextMenu { tile, x, y } => {
                self.open_context_menu(tile, x, y);
                true
            }
            PageEvent::DocumentClick => self.close_menu(),
            PageEvent::Menu(action) => {
                self.menu_action(action);
                true
            }
            PageEvent::PickerConfirm { source, target } => {
                self.confirm_picker(source, target);
                true
            }
            PageEvent::PickerCancel => self
                .instance
                .as_mut()
                .is_some_and(|inst| inst.picker.cancel()),
            PageEvent::ResetButton => {
                self.reset_order();
                false
            }
        }
    }

    /// Handle a message from the background script. Messages that arrive
    /// before initialization are dropped.
    pub fn handle_message(&mut self, message: Message) -> bool {
        if self.instance.is_none() {
            log::warn!("helper not initialized yet, dropping {message:?}");
            return false;
        }
        match message {
            Message::ColorElement { color } => match self.find_target() {
                Some(target) => {
                    if self.set_color(target.id, color) {
                        self.page.send_select_key(target.id);
                    }
                    true
                }
                None => {
                    log::warn!("no target found for coloring");
                    false
                }
            },
            Message::ResetOrder => self.reset_order(),
            Message::ClearColors => self.clear_colors(),
        }
    }

    /// Decode and handle a JSON message; undecodable messages are dropped.
    pub fn handle_message_json(&mut self, json: &str) -> bool {
        match Message::from_json(json) {
            Ok(message) => self.handle_message(message),
            Err(e) => {
                log::warn!("{e}");
                false
            }
        }
    }

    // ─── Timers ──────────────────────────────────────────────────────────

    pub fn on_timer(&mut self, timer: Timer) {
        match timer {
            Timer::Init => {
                self.init_scheduled = false;
                self.try_initialize();
            }
            Timer::Bulk { generation } if generation == self.generation => self.advance_bulk(),
            Timer::Bulk { .. } => log::debug!("ignoring stale transition wakeup"),
        }
    }

    /// Drain the wakeups requested since the last call.
    pub fn take_wakeups(&mut self) -> Vec<Wakeup> {
        std::mem::take(&mut self.wakeups)
    }

    pub(crate) fn schedule(&mut self, timer: Timer, delay_ms: u32) {
        self.wakeups.push(Wakeup { timer, delay_ms });
    }

    fn schedule_init(&mut self, delay_ms: u32) {
        if !self.init_scheduled {
            self.init_scheduled = true;
            self.schedule(Timer::Init, delay_ms);
        }
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut P {
        &mut self.page
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &HelperConfig {
        &self.config
    }

    pub fn order(&self) -> &TileOrder {
        &self.order
    }

    pub fn colors(&self) -> Option<&ColorAssignment> {
        self.instance.as_ref().map(|inst| &inst.colors)
    }

    pub fn pending_target(&self) -> Option<&PendingTarget> {
        self.instance.as_ref().and_then(|inst| inst.pending.as_ref())
    }

    pub fn menu(&self) -> Option<ContextMenu> {
        self.instance.as_ref().map(|inst| inst.menu)
    }

    pub fn picker(&self) -> Option<SwapPicker> {
        self.instance.as_ref().map(|inst| inst.picker)
    }

    pub fn bulk_phase(&self) -> BulkPhase {
        self.instance
            .as_ref()
            .map_or(BulkPhase::Idle, |inst| inst.transition.phase())
    }

    pub fn watched_tiles(&self) -> usize {
        self.instance
            .as_ref()
            .map_or(0, |inst| inst.watcher.watched())
    }
}
