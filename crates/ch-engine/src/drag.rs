//! Drag-and-drop state machine.
//!
//! Each tile is `idle → dragging (drag start) → idle (drag end)`. A drop on a
//! different tile produces a swap. The controller turns DOM drag events into
//! [`DragEffect`]s that the helper applies to the page and the order model.

use ch_core::id::TileId;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragState {
    Idle,
    Dragging { source: TileId },
}

/// A side effect requested by the drag controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragEffect {
    MarkDragging(TileId),
    MarkDragOver(TileId),
    UnmarkDragOver(TileId),
    /// Remove drag feedback classes from every tile.
    ClearDragStyles,
    SwapTiles(TileId, TileId),
    SelectKey(TileId),
    Status(&'static str),
}

pub struct DragController {
    state: DragState,
    /// Tiles whose listeners this instance installed.
    instrumented: HashSet<TileId>,
}

impl Default for DragController {
    fn default() -> Self {
        Self::new()
    }
}

impl DragController {
    pub fn new() -> Self {
        Self {
            state: DragState::Idle,
            instrumented: HashSet::new(),
        }
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn note_instrumented(&mut self, id: TileId) {
        self.instrumented.insert(id);
    }

    pub fn instrumented(&self) -> usize {
        self.instrumented.len()
    }

    pub fn drag_start(&mut self, id: TileId) -> Vec<DragEffect> {
        self.state = DragState::Dragging { source: id };
        vec![DragEffect::MarkDragging(id), DragEffect::Status("Dragging card...")]
    }

    pub fn drag_over(&mut self, id: TileId) -> Vec<DragEffect> {
        vec![DragEffect::MarkDragOver(id)]
    }

    pub fn drag_leave(&mut self, id: TileId) -> Vec<DragEffect> {
        vec![DragEffect::UnmarkDragOver(id)]
    }

    pub fn drag_end(&mut self) -> Vec<DragEffect> {
        self.state = DragState::Idle;
        vec![DragEffect::ClearDragStyles]
    }

    /// A drop on `target`. The drag payload wins over the tracked source,
    /// since the payload survives drags that started before this instance.
    pub fn drop_on(&mut self, target: TileId, payload: Option<TileId>) -> Vec<DragEffect> {
        let source = payload.or(match self.state {
            DragState::Dragging { source } => Some(source),
            DragState::Idle => None,
        });
        self.state = DragState::Idle;

        let mut effects = Vec::new();
        if let Some(source) = source {
            if source != target {
                effects.push(DragEffect::SwapTiles(source, target));
                effects.push(DragEffect::Status("Cards swapped!"));
            }
            effects.push(DragEffect::SelectKey(source));
        }
        effects.push(DragEffect::ClearDragStyles);
        effects
    }
}
