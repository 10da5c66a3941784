use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

/// Global string interner for tile identifiers.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Stable identifier of a puzzle tile, taken from the tile's `for` attribute.
///
/// Interned: 4 bytes, `Copy`, O(1) equality and hashing. Ordering of the
/// underlying key is interning order, so anything that needs a deterministic
/// textual order sorts on [`TileId::as_str`] instead.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileId(Spur);

impl TileId {
    /// Intern a string as a tile id, or return the existing one.
    pub fn intern(s: &str) -> Self {
        TileId(INTERNER.get_or_intern(s))
    }

    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }
}

impl fmt::Debug for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for TileId {
    fn from(s: &str) -> Self {
        TileId::intern(s)
    }
}

impl Serialize for TileId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TileId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(TileId::intern(&s))
    }
}

/// Intern a list of string ids, preserving order.
pub fn tile_ids<'a>(ids: impl IntoIterator<Item = &'a str>) -> Vec<TileId> {
    ids.into_iter().map(TileId::intern).collect()
}
