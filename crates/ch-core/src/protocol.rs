//! Messages from the privileged (background) context to the content script,
//! and the native context-menu tree the background script registers.

use crate::color::ColorChoice;
use serde::{Deserialize, Serialize};

/// A message delivered through `chrome.runtime.onMessage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Message {
    ColorElement { color: ColorChoice },
    ResetOrder,
    ClearColors,
}

impl Message {
    /// # Errors
    /// Returns a message for unknown actions or colors.
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("invalid message: {e}"))
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Id of the native menu's root entry.
pub const MENU_ROOT_ID: &str = "connections-helper";

/// Pages the native menu is shown on.
pub const MENU_URL_PATTERN: &str = "https://www.nytimes.com/games/connections*";

/// An entry of the native context menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeMenuItem {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub contexts: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_url_patterns: Option<Vec<String>>,
}

/// A child item of the native menu, identified by its string id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItemId {
    Color(ColorChoice),
    ResetOrder,
    ClearColors,
}

impl MenuItemId {
    pub fn parse(id: &str) -> Option<Self> {
        match id {
            "reset-order" => Some(MenuItemId::ResetOrder),
            "clear-colors" => Some(MenuItemId::ClearColors),
            _ => id
                .strip_prefix("color-")
                .and_then(ColorChoice::parse)
                .map(MenuItemId::Color),
        }
    }

    pub fn id(self) -> String {
        match self {
            MenuItemId::Color(choice) => format!("color-{}", choice.as_str()),
            MenuItemId::ResetOrder => "reset-order".to_string(),
            MenuItemId::ClearColors => "clear-colors".to_string(),
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            MenuItemId::Color(choice) => choice.title(),
            MenuItemId::ResetOrder => "🔄 Reset to Original Order",
            MenuItemId::ClearColors => "🧹 Clear All Colors",
        }
    }

    /// The message the background script forwards for a click on this item.
    pub fn message(self) -> Message {
        match self {
            MenuItemId::Color(color) => Message::ColorElement { color },
            MenuItemId::ResetOrder => Message::ResetOrder,
            MenuItemId::ClearColors => Message::ClearColors,
        }
    }
}

/// The full native menu: root, nine colors, reset and clear-all.
pub fn native_menu() -> Vec<NativeMenuItem> {
    let all = vec!["all".to_string()];
    let mut items = vec![NativeMenuItem {
        id: MENU_ROOT_ID.to_string(),
        title: "Color Code".to_string(),
        parent_id: None,
        contexts: all.clone(),
        document_url_patterns: Some(vec![MENU_URL_PATTERN.to_string()]),
    }];
    let children = ColorChoice::ALL
        .into_iter()
        .map(MenuItemId::Color)
        .chain([MenuItemId::ResetOrder, MenuItemId::ClearColors]);
    items.extend(children.map(|item| NativeMenuItem {
        id: item.id(),
        title: item.title().to_string(),
        parent_id: Some(MENU_ROOT_ID.to_string()),
        contexts: all.clone(),
        document_url_patterns: None,
    }));
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorTag;
    use pretty_assertions::assert_eq;

    #[test]
    fn decode_messages() {
        assert_eq!(
            Message::from_json(r#"{"action":"colorElement","color":"blue"}"#),
            Ok(Message::ColorElement {
                color: ColorChoice::Tag(ColorTag::Blue)
            })
        );
        assert_eq!(
            Message::from_json(r#"{"action":"colorElement","color":"clear"}"#),
            Ok(Message::ColorElement {
                color: ColorChoice::Clear
            })
        );
        assert_eq!(
            Message::from_json(r#"{"action":"resetOrder"}"#),
            Ok(Message::ResetOrder)
        );
        assert_eq!(
            Message::from_json(r#"{"action":"clearColors"}"#),
            Ok(Message::ClearColors)
        );
    }

    #[test]
    fn unknown_messages_are_errors() {
        assert!(Message::from_json(r#"{"action":"explode"}"#).is_err());
        assert!(Message::from_json(r#"{"action":"colorElement","color":"teal"}"#).is_err());
        assert!(Message::from_json("").is_err());
    }

    #[test]
    fn encode_matches_wire_shape() {
        let msg = Message::ColorElement {
            color: ColorChoice::Tag(ColorTag::Pink),
        };
        assert_eq!(msg.to_json(), r#"{"action":"colorElement","color":"pink"}"#);
        assert_eq!(Message::ResetOrder.to_json(), r#"{"action":"resetOrder"}"#);
    }

    #[test]
    fn menu_ids_translate_to_messages() {
        assert_eq!(
            MenuItemId::parse("color-orange").map(MenuItemId::message),
            Some(Message::ColorElement {
                color: ColorChoice::Tag(ColorTag::Orange)
            })
        );
        assert_eq!(
            MenuItemId::parse("clear-colors").map(MenuItemId::message),
            Some(Message::ClearColors)
        );
        assert_eq!(MenuItemId::parse("color-teal"), None);
        assert_eq!(MenuItemId::parse(MENU_ROOT_ID), None);
    }

    #[test]
    fn native_menu_has_root_and_eleven_children() {
        let menu = native_menu();
        assert_eq!(menu.len(), 12);
        assert_eq!(menu[0].id, MENU_ROOT_ID);
        assert!(
            menu[1..]
                .iter()
                .all(|item| item.parent_id.as_deref() == Some(MENU_ROOT_ID))
        );
        assert_eq!(menu[9].id, "color-clear");
        assert_eq!(menu[11].id, "clear-colors");
    }
}
