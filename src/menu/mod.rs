//! Menu item data structures.
//!
//! The tray menu is a flat list of [`MenuItem`]s. Items carry their own
//! callback and optional context; there is no nesting.

pub mod item;

pub use item::{Callback, ItemFlags, MenuItem};
