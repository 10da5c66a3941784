//! Runtime configuration: host-page selectors, class names and timings.

use crate::color::ColorTag;
use serde::{Deserialize, Serialize};

/// Every fixed constant the helper depends on.
///
/// Defaults target the current puzzle page. A partial JSON override can be
/// supplied by the extension entry point; missing fields keep their default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HelperConfig {
    /// Prefix of every persisted key.
    pub storage_prefix: String,

    /// Selector matching every tile element.
    pub tile_selector: String,
    /// Attribute holding a tile's stable identifier.
    pub tile_id_attribute: String,
    /// Selector of the element showing the puzzle date.
    pub date_selector: String,
    /// Selector of the host page's action-button group.
    pub button_group_selector: String,

    /// Prefix of color tag classes (`<prefix>yellow`).
    pub color_class_prefix: String,
    /// Class present on tiles while a bulk color swap animates.
    pub transition_class: String,
    pub dragging_class: String,
    pub drag_over_class: String,
    /// Marker attribute on tiles whose drag listeners are installed.
    pub drag_marker_attribute: String,

    /// Delay before the first initialization attempt.
    pub init_delay_ms: u32,
    /// Fixed interval between initialization retries.
    pub retry_interval_ms: u32,
    /// Pause after removing old tags during a color swap.
    pub swap_remove_pause_ms: u32,
    /// Pause after applying new tags during a color swap.
    pub swap_settle_pause_ms: u32,
    /// Delay before watchers are reattached after clearing all colors.
    pub clear_resume_delay_ms: u32,

    pub status_duration_ms: u32,
    pub swap_status_duration_ms: u32,
}

impl Default for HelperConfig {
    fn default() -> Self {
        Self {
            storage_prefix: "connections-helper-".to_string(),
            tile_selector: r#"label[data-testid="card-label"]"#.to_string(),
            tile_id_attribute: "for".to_string(),
            date_selector: "#portal-game-date span".to_string(),
            button_group_selector: r#"[class^="Board-module_boardActionGroup"]"#.to_string(),
            color_class_prefix: "connections-helper-".to_string(),
            transition_class: "color-transition".to_string(),
            dragging_class: "connections-helper-dragging".to_string(),
            drag_over_class: "connections-helper-drag-over".to_string(),
            drag_marker_attribute: "data-drag-setup".to_string(),
            init_delay_ms: 500,
            retry_interval_ms: 1000,
            swap_remove_pause_ms: 50,
            swap_settle_pause_ms: 600,
            clear_resume_delay_ms: 100,
            status_duration_ms: 2000,
            swap_status_duration_ms: 3000,
        }
    }
}

impl HelperConfig {
    /// Parse a (possibly partial) JSON override.
    ///
    /// # Errors
    /// Returns a message if `json` is not a valid config object.
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("invalid config: {e}"))
    }

    /// Class painted onto a tile for `tag`.
    pub fn color_class(&self, tag: ColorTag) -> String {
        tag.class_name(&self.color_class_prefix)
    }
}
