//! Platform backends.
//!
//! Exactly one native backend is compiled per target:
//! StatusNotifierItem through `ksni` on Linux, `tray-icon` driven by a pumped
//! `winit` loop on macOS and Windows. The simulated backend is always
//! available and renders into an in-process shell.

use crate::config::TrayConfig;
use crate::error::Result;
use crate::tray::{Activation, Snapshot, Waker};

pub mod simulated;

#[cfg(all(feature = "native", target_os = "linux"))]
pub mod ksni_impl;

#[cfg(all(feature = "native", any(target_os = "macos", target_os = "windows")))]
pub mod tray_icon_impl;

pub use simulated::{SimulatedBackend, SimulatedShell};

#[cfg(all(feature = "native", target_os = "linux"))]
pub type NativeBackend = ksni_impl::KsniBackend;

#[cfg(all(feature = "native", any(target_os = "macos", target_os = "windows")))]
pub type NativeBackend = tray_icon_impl::TrayIconBackend;

/// What a platform must provide to show a tray.
///
/// Backends receive owned [`Snapshot`]s and report clicks as
/// [`Activation`]s; dispatching to callbacks is done by the handle on the
/// loop thread.
pub trait Backend {
    fn name(&self) -> &'static str;

    /// Creates the native icon and menu.
    fn start(&mut self, config: &TrayConfig, snapshot: &Snapshot) -> Result<()>;

    /// Discards the native menu and builds it again, along with icon and
    /// tooltip. Failures are logged, not returned.
    fn redraw(&mut self, snapshot: &Snapshot);

    /// Runs one iteration of the native loop and returns at most one
    /// activation. A non-blocking pump returns immediately.
    fn pump(&mut self, blocking: bool) -> Option<Activation>;

    /// A closure that makes a blocked [`pump`](Backend::pump) return.
    fn waker(&self) -> Waker;

    /// Removes the native icon.
    fn stop(&mut self);
}

/// Creates the backend for the platform this binary was built for.
#[cfg(all(
    feature = "native",
    any(target_os = "linux", target_os = "macos", target_os = "windows")
))]
pub fn native() -> Result<NativeBackend> {
    NativeBackend::new()
}

#[cfg(not(all(
    feature = "native",
    any(target_os = "linux", target_os = "macos", target_os = "windows")
)))]
pub fn native() -> Result<SimulatedBackend> {
    Err(crate::error::TrayError::Unsupported)
}
