pub mod color;
pub mod config;
pub mod id;
pub mod model;
pub mod order;
pub mod palette;
pub mod protocol;
pub mod store;

pub use color::{ColorChoice, ColorTag};
pub use config::HelperConfig;
pub use id::TileId;
pub use model::{EpochCheck, PendingTarget, SessionEpoch, Tile};
pub use order::{TileOrder, arrange_by, swap_positions};
pub use palette::{ColorAssignment, GroupSwap, TileGroup};
pub use protocol::{MenuItemId, Message, NativeMenuItem, native_menu};
pub use store::{MemoryStore, Persistence, SessionStore, StoreKey};
