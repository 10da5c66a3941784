//! Interaction Controller operations.
//!
//! Every user-facing action ends up here: coloring a tile, swapping two
//! tiles, resetting the order, group color swaps and clear-all. Each one
//! keeps the page, the in-memory models and the session store in step.

use crate::controller::{Controller, Timer};
use crate::drag::{DragController, DragEffect};
use crate::menu::MenuAction;
use crate::page::{HostPage, paint};
use crate::transition::{BulkOp, Step};
use ch_core::color::{ColorChoice, ColorTag};
use ch_core::id::TileId;
use ch_core::model::PendingTarget;
use ch_core::store::SessionStore;

const BUSY: &str = "Please wait for the current color change to finish";

impl<P: HostPage, S: SessionStore> Controller<P, S> {
    // ─── Colors ──────────────────────────────────────────────────────────

    /// Color one tile (or clear its color) and persist the whole mapping.
    /// Refused while a bulk transition is running, since its plan would
    /// overwrite the new tag.
    pub fn set_color(&mut self, id: TileId, choice: ColorChoice) -> bool {
        let Some(inst) = self.instance.as_mut() else {
            return false;
        };
        if inst.transition.in_flight() {
            self.page.show_status(BUSY, self.config.status_duration_ms);
            return false;
        }
        inst.colors.set(id, choice);
        paint(&mut self.page, &self.config, id, choice.tag());
        self.persistence.save_colors(&mut self.store, &inst.colors);
        let message = format!("Card colored {}!", choice.display_name());
        self.page.show_status(&message, self.config.status_duration_ms);
        log::debug!("colored {id} {choice:?}");
        true
    }

    /// Exchange every `source` tile with every `target` tile. The change is
    /// staged over several wakeups; the result is persisted once it settles.
    pub fn swap_color_group(&mut self, source: ColorTag, target: ColorTag) -> bool {
        let Some(inst) = self.instance.as_mut() else {
            return false;
        };
        if source == target {
            self.page
                .show_status("Can't swap a color with itself!", self.config.status_duration_ms);
            return false;
        }
        if inst.transition.in_flight() {
            self.page.show_status(BUSY, self.config.status_duration_ms);
            return false;
        }
        let Some(swap) = inst.colors.plan_swap(source, target) else {
            return false;
        };
        let Some(step) =
            inst.transition
                .begin_swap(&mut self.page, &self.config, &mut inst.watcher, swap)
        else {
            return false;
        };
        self.follow(step);
        let message = format!("Swapped {} with {}", source.title(), target.title());
        self.page
            .show_status(&message, self.config.swap_status_duration_ms);
        true
    }

    /// Remove every color. The persisted mapping is deleted, not emptied.
    pub fn clear_colors(&mut self) -> bool {
        let Some(inst) = self.instance.as_mut() else {
            return false;
        };
        let Some(step) = inst.transition.begin_clear(
            &mut self.page,
            &self.config,
            &mut inst.watcher,
            &mut inst.colors,
        ) else {
            self.page.show_status(BUSY, self.config.status_duration_ms);
            return false;
        };
        self.persistence.delete_colors(&mut self.store);
        self.follow(step);
        self.page
            .show_status("All colors cleared!", self.config.status_duration_ms);
        log::info!("all card colors cleared");
        true
    }

    /// Repaint a tile whose tag the host page stripped.
    pub fn reconcile(&mut self, id: TileId) -> bool {
        let Some(inst) = self.instance.as_ref() else {
            return false;
        };
        inst.watcher
            .reconcile(&mut self.page, &self.config, &inst.colors, id)
    }

    pub(crate) fn advance_bulk(&mut self) {
        let Some(inst) = self.instance.as_mut() else {
            return;
        };
        let step = inst.transition.advance(
            &mut self.page,
            &self.config,
            &mut inst.watcher,
            &mut inst.colors,
        );
        self.follow(step);
    }

    fn follow(&mut self, step: Step) {
        match step {
            Step::Wait(delay_ms) => {
                let generation = self.generation;
                self.schedule(Timer::Bulk { generation }, delay_ms);
            }
            Step::Finished(BulkOp::SwapColors(swap)) => {
                if let Some(inst) = self.instance.as_ref() {
                    self.persistence.save_colors(&mut self.store, &inst.colors);
                }
                self.rewatch_rerendered();
                log::info!("color swap {} <-> {} finished", swap.source, swap.target);
            }
            Step::Finished(BulkOp::ClearAll) => {
                self.rewatch_rerendered();
                log::debug!("class observers re-enabled after color clearing");
            }
            Step::Idle => {}
        }
    }

    // ─── Order ───────────────────────────────────────────────────────────

    /// Exchange the positions of two tiles, moving the existing nodes.
    /// Colors follow the tiles since they are keyed by id.
    pub fn swap_tiles(&mut self, a: TileId, b: TileId) -> bool {
        if self.instance.is_none() {
            return false;
        }
        self.order.sync_current(&self.page.tile_ids());
        if !self.order.swap(a, b) {
            return false;
        }
        self.page.arrange(self.order.current());
        self.persistence.save_order(&mut self.store, self.order.current());
        log::debug!("swapped {a} and {b}");
        true
    }

    /// Put the tiles back in the order captured at initialization.
    pub fn reset_order(&mut self) -> bool {
        if self.instance.is_none() {
            return false;
        }
        let live = self.page.tile_ids();
        if live.is_empty() {
            return false;
        }
        self.order.sync_current(&live);
        if self.order.reset_to_original() {
            self.page.arrange(self.order.current());
        }
        self.persistence.save_order(&mut self.store, self.order.current());
        self.page
            .show_status("Order reset to original!", self.config.status_duration_ms);
        true
    }

    // ─── Targeting and menus ─────────────────────────────────────────────

    /// The tile the next menu action applies to: the in-memory target, or the
    /// one persisted before a reload if that tile is still on the board.
    pub fn find_target(&mut self) -> Option<PendingTarget> {
        let inst = self.instance.as_mut()?;
        if let Some(target) = &inst.pending {
            return Some(target.clone());
        }
        let target = self.persistence.load_target(&self.store)?;
        self.page.tile_text(target.id)?;
        inst.pending = Some(target.clone());
        Some(target)
    }

    pub(crate) fn open_context_menu(&mut self, tile: TileId, x: f64, y: f64) {
        let Some(inst) = self.instance.as_mut() else {
            return;
        };
        let target = PendingTarget {
            id: tile,
            text: self.page.tile_text(tile).unwrap_or_default(),
        };
        self.persistence.save_target(&mut self.store, &target);
        log::debug!("target set: {} ({})", target.id, target.text);
        inst.pending = Some(target);
        inst.menu.open_at(x, y);
        self.page.send_select_key(tile);
    }

    pub(crate) fn close_menu(&mut self) -> bool {
        self.instance
            .as_mut()
            .is_some_and(|inst| inst.menu.close())
    }

    pub(crate) fn menu_action(&mut self, action: MenuAction) {
        self.close_menu();
        match action {
            MenuAction::Color(choice) => match self.find_target() {
                Some(target) => {
                    self.set_color(target.id, choice);
                }
                None => log::warn!("no target found for coloring"),
            },
            MenuAction::SwapColors => {
                let Some(inst) = self.instance.as_mut() else {
                    return;
                };
                let current = inst.pending.as_ref().and_then(|t| inst.colors.get(t.id));
                inst.picker.open(current);
            }
            MenuAction::ResetOrder => {
                self.reset_order();
            }
            MenuAction::ClearColors => {
                self.clear_colors();
            }
        }
    }

    pub(crate) fn confirm_picker(&mut self, source: ColorTag, target: ColorTag) {
        let Some(inst) = self.instance.as_mut() else {
            return;
        };
        inst.picker.select(source, target);
        match inst.picker.confirm() {
            Some((source, target)) => {
                self.swap_color_group(source, target);
            }
            None => {
                self.page
                    .show_status("Can't swap a color with itself!", self.config.status_duration_ms);
            }
        }
    }

    // ─── Drag and drop ───────────────────────────────────────────────────

    pub(crate) fn with_drag(
        &mut self,
        f: impl FnOnce(&mut DragController) -> Vec<DragEffect>,
    ) -> bool {
        let Some(inst) = self.instance.as_mut() else {
            return false;
        };
        for effect in f(&mut inst.drag) {
            self.apply_drag(effect);
        }
        false
    }

    fn apply_drag(&mut self, effect: DragEffect) {
        match effect {
            DragEffect::MarkDragging(id) => self.page.add_class(id, &self.config.dragging_class),
            DragEffect::MarkDragOver(id) => self.page.add_class(id, &self.config.drag_over_class),
            DragEffect::UnmarkDragOver(id) => {
                self.page.remove_class(id, &self.config.drag_over_class)
            }
            DragEffect::ClearDragStyles => {
                for id in self.page.tile_ids() {
                    self.page.remove_class(id, &self.config.dragging_class);
                    self.page.remove_class(id, &self.config.drag_over_class);
                }
            }
            DragEffect::SwapTiles(a, b) => {
                self.swap_tiles(a, b);
            }
            DragEffect::SelectKey(id) => self.page.send_select_key(id),
            DragEffect::Status(message) => {
                self.page.show_status(message, self.config.status_duration_ms)
            }
        }
    }
}
