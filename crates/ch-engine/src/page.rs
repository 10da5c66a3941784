//! The host-page seam.
//!
//! The engine never touches the DOM directly. Everything it needs from the
//! third-party puzzle page goes through [`HostPage`]: reading tiles, editing
//! their class lists, moving nodes, observing class churn and showing status
//! messages. The browser implementation lives in the wasm bridge;
//! [`crate::headless::HeadlessPage`] implements it in memory.

use ch_core::color::ColorTag;
use ch_core::config::HelperConfig;
use ch_core::id::TileId;

pub trait HostPage {
    /// Handle of one per-tile class observer.
    type Observer;

    /// Tile identifiers in live DOM order. Empty while the board is not rendered.
    fn tile_ids(&self) -> Vec<TileId>;

    fn tile_text(&self, id: TileId) -> Option<String>;

    /// Raw text of the puzzle date element, if present.
    fn game_date(&self) -> Option<String>;

    fn has_class(&self, id: TileId, class: &str) -> bool;
    fn add_class(&mut self, id: TileId, class: &str);
    fn remove_class(&mut self, id: TileId, class: &str);

    /// Move the existing tile nodes so their order matches `order`.
    /// Nodes are moved, never recreated. Ids that are not live are skipped.
    fn arrange(&mut self, order: &[TileId]);

    /// Send the synthetic "select" keystroke to the tile's clickable child so
    /// the host page's selection UI follows a programmatic change.
    fn send_select_key(&mut self, id: TileId);

    /// Show a transient status message.
    fn show_status(&mut self, message: &str, duration_ms: u32);

    /// Install the injected page chrome (reset button, status element).
    /// Idempotent.
    fn decorate(&mut self);

    /// Start observing class changes on a tile.
    fn observe_classes(&mut self, id: TileId) -> Option<Self::Observer>;
    /// Stop an observer without discarding it.
    fn disconnect(&mut self, observer: &Self::Observer);
    /// Re-attach a previously disconnected observer.
    fn reconnect(&mut self, observer: &Self::Observer);

    /// Install drag/drop listeners on a tile unless its marker says they are
    /// already present. Returns `true` if listeners were installed now.
    fn instrument_drag(&mut self, id: TileId) -> bool;
}

/// The color tag currently painted on a tile, if any.
pub fn painted_color<P: HostPage + ?Sized>(
    page: &P,
    config: &HelperConfig,
    id: TileId,
) -> Option<ColorTag> {
    ColorTag::ALL
        .into_iter()
        .find(|tag| page.has_class(id, &config.color_class(*tag)))
}

/// Remove every color tag class from a tile.
pub fn strip_colors<P: HostPage + ?Sized>(page: &mut P, config: &HelperConfig, id: TileId) {
    for tag in ColorTag::ALL {
        page.remove_class(id, &config.color_class(tag));
    }
}

/// Replace whatever tag a tile shows with `tag` (or nothing).
pub fn paint<P: HostPage + ?Sized>(
    page: &mut P,
    config: &HelperConfig,
    id: TileId,
    tag: Option<ColorTag>,
) {
    strip_colors(page, config, id);
    if let Some(tag) = tag {
        page.add_class(id, &config.color_class(tag));
    }
}
