//! Color Assignment Model: tile id → color tag.

use crate::color::{ColorChoice, ColorTag};
use crate::id::TileId;
use smallvec::SmallVec;
use std::collections::{BTreeMap, HashMap};

/// Tiles affected by one group swap. A board holds 16 tiles in four groups,
/// so each side rarely exceeds four entries.
pub type TileGroup = SmallVec<[TileId; 4]>;

/// The tiles that trade colors in a `swap_groups` operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSwap {
    pub source: ColorTag,
    pub target: ColorTag,
    /// Tiles currently tagged `source`; they become `target`.
    pub source_tiles: TileGroup,
    /// Tiles currently tagged `target`; they become `source`.
    pub target_tiles: TileGroup,
}

impl GroupSwap {
    pub fn is_empty(&self) -> bool {
        self.source_tiles.is_empty() && self.target_tiles.is_empty()
    }

    /// Every affected tile, source side first.
    pub fn tiles(&self) -> impl Iterator<Item = TileId> + '_ {
        self.source_tiles
            .iter()
            .chain(self.target_tiles.iter())
            .copied()
    }
}

/// Mapping from tile to its single color tag; absence means uncolored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorAssignment {
    colors: HashMap<TileId, ColorTag>,
}

impl ColorAssignment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: TileId) -> Option<ColorTag> {
        self.colors.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Set or clear the tag for `id`. Returns the previous tag.
    pub fn set(&mut self, id: TileId, choice: ColorChoice) -> Option<ColorTag> {
        match choice {
            ColorChoice::Tag(tag) => self.colors.insert(id, tag),
            ColorChoice::Clear => self.colors.remove(&id),
        }
    }

    pub fn clear(&mut self) {
        self.colors.clear();
    }

    /// Tiles tagged `color`, sorted by id text for a stable iteration order.
    pub fn tiles_with(&self, color: ColorTag) -> TileGroup {
        let mut tiles: TileGroup = self
            .colors
            .iter()
            .filter(|(_, c)| **c == color)
            .map(|(id, _)| *id)
            .collect();
        tiles.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        tiles
    }

    /// Plan the exchange of two color groups without applying it.
    /// Returns `None` when `source == target`.
    pub fn plan_swap(&self, source: ColorTag, target: ColorTag) -> Option<GroupSwap> {
        if source == target {
            return None;
        }
        Some(GroupSwap {
            source,
            target,
            source_tiles: self.tiles_with(source),
            target_tiles: self.tiles_with(target),
        })
    }

    /// Retag the tiles of a planned swap.
    pub fn apply_swap(&mut self, swap: &GroupSwap) {
        for id in &swap.source_tiles {
            self.colors.insert(*id, swap.target);
        }
        for id in &swap.target_tiles {
            self.colors.insert(*id, swap.source);
        }
    }

    /// Exchange two color groups in one step.
    pub fn swap_groups(&mut self, source: ColorTag, target: ColorTag) -> Option<GroupSwap> {
        let swap = self.plan_swap(source, target)?;
        self.apply_swap(&swap);
        Some(swap)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TileId, ColorTag)> + '_ {
        self.colors.iter().map(|(id, c)| (*id, *c))
    }

    /// Encode as the persisted JSON object, keys in lexical order.
    pub fn to_json(&self) -> String {
        let sorted: BTreeMap<&str, ColorTag> =
            self.colors.iter().map(|(id, c)| (id.as_str(), *c)).collect();
        serde_json::to_string(&sorted).unwrap_or_else(|_| "{}".to_string())
    }

    /// Decode the persisted JSON object.
    ///
    /// # Errors
    /// Returns a message if `json` is not an object of known color names.
    pub fn from_json(json: &str) -> Result<Self, String> {
        let raw: HashMap<TileId, ColorTag> =
            serde_json::from_str(json).map_err(|e| format!("invalid card colors: {e}"))?;
        Ok(Self { colors: raw })
    }
}

impl FromIterator<(TileId, ColorTag)> for ColorAssignment {
    fn from_iter<I: IntoIterator<Item = (TileId, ColorTag)>>(iter: I) -> Self {
        Self {
            colors: iter.into_iter().collect(),
        }
    }
}
