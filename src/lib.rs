//! # minitray
//!
//! A minimal system tray icon: one icon, one tooltip and a flat menu of items
//! with callbacks, shown through whatever the desktop provides.
//!
//! | Platform | Backend | Native loop |
//! |----------|---------|-------------|
//! | Linux    | StatusNotifierItem via [ksni](https://crates.io/crates/ksni) | ksni's D-Bus thread, events forwarded to the caller |
//! | macOS    | [tray-icon](https://crates.io/crates/tray-icon) status item | AppKit, pumped through winit |
//! | Windows  | [tray-icon](https://crates.io/crates/tray-icon) notification icon | Win32 messages, pumped through winit |
//!
//! A simulated backend is always available for headless runs and tests.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use minitray::{MenuItem, Tray, TrayConfig};
//!
//! # fn main() -> minitray::Result<()> {
//! let tray = Tray::new("mail-unread", "Inbox")
//!     .with_item(MenuItem::new("Hello").on_activate(|item| println!("{} clicked", item.text)));
//!
//! let mut handle = minitray::initialize(tray, TrayConfig::default().with_id("com.example.inbox"))?;
//! let exit = handle.exit_signal();
//! handle.tray_mut().menu.push(MenuItem::new("Quit").on_activate(move |_| exit.request()));
//! handle.redraw();
//!
//! while !handle.run_once(true) {}
//! handle.shutdown();
//! # Ok(())
//! # }
//! ```
//!
//! All calls belong on the thread that runs the loop. Callbacks run inside
//! [`TrayHandle::run_once`] on that thread and get the activated
//! [`MenuItem`]; after changing the menu, call [`TrayHandle::redraw`].

pub mod backend;
pub mod config;
pub mod error;
pub mod menu;
pub mod tray;

pub use backend::{Backend, SimulatedBackend, SimulatedShell};
pub use config::{Category, TrayConfig};
pub use error::{Result, TrayError};
pub use menu::{Callback, ItemFlags, MenuItem};
pub use tray::{ExitSignal, Tray, TrayHandle};

/// Shows `tray` through the native backend of the current platform.
///
/// Fails with [`TrayError::Unsupported`] when no backend is compiled in and
/// with [`TrayError::Unavailable`] when the desktop cannot host a tray.
pub fn initialize(tray: Tray, config: TrayConfig) -> Result<TrayHandle<impl Backend>> {
    TrayHandle::initialize(tray, config, backend::native()?)
}
