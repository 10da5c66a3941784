//! Normalized page events.
//!
//! The wasm bridge translates DOM events (drag/drop, right-click, clicks on
//! injected UI, mutation records) into [`PageEvent`]s and feeds them to the
//! [`crate::controller::Controller`].

use crate::menu::MenuAction;
use ch_core::color::ColorTag;
use ch_core::id::TileId;

#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    /// A tile's `class` attribute changed.
    ClassMutated(TileId),
    /// The page's element tree changed (children added or removed anywhere).
    TreeMutated,

    DragStart(TileId),
    DragOver(TileId),
    DragLeave(TileId),
    DragEnd(TileId),
    /// A drop on `target`. `payload` is the id carried by the drag data.
    Drop {
        target: TileId,
        payload: Option<TileId>,
    },

    /// Right-click on a tile at page coordinates.
    ContextMenu { tile: TileId, x: f64, y: f64 },
    /// Any click on the document; closes the custom menu.
    DocumentClick,
    Menu(MenuAction),

    PickerConfirm { source: ColorTag, target: ColorTag },
    PickerCancel,

    /// The injected reset button.
    ResetButton,
}
