//! Tray core functionality.
//!
//! This module contains the tray model, the render snapshot handed to
//! backends, loop events and the owning [`TrayHandle`].

pub mod control;
pub mod event;
pub mod handle;
pub mod model;

pub use control::{ExitSignal, Waker};
pub use event::{Activation, LoopEvent};
pub use handle::TrayHandle;
pub use model::{EntryKind, MenuEntry, Snapshot, Tray};
