//! Custom in-page context menu and the swap-colors picker.

use ch_core::color::{ColorChoice, ColorTag};

/// An entry of the custom menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Color(ColorChoice),
    /// Open the swap-colors picker.
    SwapColors,
    ResetOrder,
    ClearColors,
}

impl MenuAction {
    /// Menu entries in display order: the color section, then utilities.
    pub fn all() -> Vec<MenuAction> {
        ColorChoice::ALL
            .into_iter()
            .map(MenuAction::Color)
            .chain([
                MenuAction::SwapColors,
                MenuAction::ResetOrder,
                MenuAction::ClearColors,
            ])
            .collect()
    }

    pub fn title(self) -> &'static str {
        match self {
            MenuAction::Color(choice) => choice.title(),
            MenuAction::SwapColors => "🔄 Swap Colors",
            MenuAction::ResetOrder => "🔄 Reset to Original Order",
            MenuAction::ClearColors => "🧹 Clear All Colors",
        }
    }

    /// Swatch for the entry's left border, if it is a color entry.
    pub fn swatch(self) -> Option<&'static str> {
        match self {
            MenuAction::Color(choice) => Some(choice.hex()),
            _ => None,
        }
    }
}

/// Open/closed state of the custom menu, positioned at the pointer.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ContextMenu {
    position: Option<(f64, f64)>,
}

impl ContextMenu {
    pub fn open_at(&mut self, x: f64, y: f64) {
        self.position = Some((x, y));
    }

    pub fn close(&mut self) -> bool {
        self.position.take().is_some()
    }

    pub fn is_open(&self) -> bool {
        self.position.is_some()
    }

    /// Page coordinates of the open menu.
    pub fn position(&self) -> Option<(f64, f64)> {
        self.position
    }
}

/// Modal picker selecting the two color groups to exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapPicker {
    open: bool,
    source: ColorTag,
    target: ColorTag,
}

impl Default for SwapPicker {
    fn default() -> Self {
        Self {
            open: false,
            source: ColorTag::ALL[0],
            target: ColorTag::ALL[1],
        }
    }
}

impl SwapPicker {
    /// Open with defaults seeded from the right-clicked tile's color: that
    /// color as source and the next palette entry as target. Without a color
    /// the first two palette entries are used.
    pub fn open(&mut self, current: Option<ColorTag>) {
        let source = current.map(ColorTag::index).unwrap_or(0);
        let target = match current {
            Some(_) => (source + 1) % ColorTag::ALL.len(),
            None => 1,
        };
        self.source = ColorTag::ALL[source];
        self.target = ColorTag::ALL[target];
        self.open = true;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn source(&self) -> ColorTag {
        self.source
    }

    pub fn target(&self) -> ColorTag {
        self.target
    }

    pub fn select(&mut self, source: ColorTag, target: ColorTag) {
        self.source = source;
        self.target = target;
    }

    /// The selected pair. The picker stays open when both sides are equal so
    /// the user can correct the choice.
    pub fn confirm(&mut self) -> Option<(ColorTag, ColorTag)> {
        if !self.open || self.source == self.target {
            return None;
        }
        self.open = false;
        Some((self.source, self.target))
    }

    pub fn cancel(&mut self) -> bool {
        std::mem::replace(&mut self.open, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_lists_nine_colors_and_three_utilities() {
        let all = MenuAction::all();
        assert_eq!(all.len(), 12);
        assert_eq!(all[8], MenuAction::Color(ColorChoice::Clear));
        assert_eq!(all[9], MenuAction::SwapColors);
        assert_eq!(all[8].swatch(), Some("#ffffff"));
        assert_eq!(all[10].swatch(), None);
    }

    #[test]
    fn context_menu_open_close() {
        let mut menu = ContextMenu::default();
        assert!(!menu.close());
        menu.open_at(120.0, 340.5);
        assert_eq!(menu.position(), Some((120.0, 340.5)));
        assert!(menu.close());
        assert!(!menu.is_open());
    }

    #[test]
    fn picker_defaults_follow_tile_color() {
        let mut picker = SwapPicker::default();
        picker.open(Some(ColorTag::Blue));
        assert_eq!(picker.source(), ColorTag::Blue);
        assert_eq!(picker.target(), ColorTag::Purple);

        picker.open(Some(ColorTag::Lavender));
        assert_eq!(picker.source(), ColorTag::Lavender);
        assert_eq!(picker.target(), ColorTag::Yellow);

        picker.open(None);
        assert_eq!(picker.source(), ColorTag::Yellow);
        assert_eq!(picker.target(), ColorTag::Green);
    }

    #[test]
    fn picker_rejects_same_color() {
        let mut picker = SwapPicker::default();
        picker.open(None);
        picker.select(ColorTag::Cyan, ColorTag::Cyan);
        assert_eq!(picker.confirm(), None);
        assert!(picker.is_open());

        picker.select(ColorTag::Cyan, ColorTag::Pink);
        assert_eq!(picker.confirm(), Some((ColorTag::Cyan, ColorTag::Pink)));
        assert!(!picker.is_open());
    }

    #[test]
    fn cancel_closes_without_result() {
        let mut picker = SwapPicker::default();
        picker.open(None);
        assert!(picker.cancel());
        assert!(!picker.cancel());
        assert_eq!(picker.confirm(), None);
    }
}
