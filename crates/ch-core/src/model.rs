//! Session-level data carried alongside the order and color models.

use crate::id::TileId;
use std::fmt;

/// One puzzle word-card as read from the host page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub id: TileId,
    pub text: String,
}

/// The tile most recently right-clicked; routes the next menu action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTarget {
    pub id: TileId,
    /// Display text at the time of the click, kept for logging.
    pub text: String,
}

/// The puzzle's displayed date. All persisted tile state is scoped to one epoch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionEpoch(String);

impl SessionEpoch {
    /// Trims surrounding whitespace, matching how the date is read from the page.
    pub fn new(raw: impl AsRef<str>) -> Self {
        SessionEpoch(raw.as_ref().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionEpoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of comparing the displayed date to the stored one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EpochCheck {
    /// No date element on the page; persisted state is left alone.
    Unknown,
    /// First visit this session; nothing to invalidate.
    Fresh(SessionEpoch),
    Unchanged(SessionEpoch),
    /// The puzzle changed; epoch-scoped state must be discarded.
    Changed {
        previous: SessionEpoch,
        current: SessionEpoch,
    },
}

impl EpochCheck {
    pub fn compare(stored: Option<SessionEpoch>, displayed: Option<SessionEpoch>) -> Self {
        match (stored, displayed) {
            (_, None) => EpochCheck::Unknown,
            (None, Some(current)) => EpochCheck::Fresh(current),
            (Some(previous), Some(current)) if previous == current => {
                EpochCheck::Unchanged(current)
            }
            (Some(previous), Some(current)) => EpochCheck::Changed { previous, current },
        }
    }

    pub fn is_changed(&self) -> bool {
        matches!(self, EpochCheck::Changed { .. })
    }

    /// The epoch to persist, if the page showed one.
    pub fn current(&self) -> Option<&SessionEpoch> {
        match self {
            EpochCheck::Unknown => None,
            EpochCheck::Fresh(current)
            | EpochCheck::Unchanged(current)
            | EpochCheck::Changed { current, .. } => Some(current),
        }
    }
}
