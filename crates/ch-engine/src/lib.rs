pub mod actions;
pub mod controller;
pub mod drag;
pub mod headless;
pub mod input;
pub mod menu;
pub mod page;
pub mod transition;
pub mod watcher;

pub use controller::{Controller, Timer, Wakeup};
pub use drag::{DragController, DragEffect, DragState};
pub use headless::{HeadlessObserver, HeadlessPage};
pub use input::PageEvent;
pub use menu::{ContextMenu, MenuAction, SwapPicker};
pub use page::HostPage;
pub use transition::{BulkOp, BulkPhase, BulkTransition, Step};
pub use watcher::{ReconciliationWatcher, SuppressionToken};
