//! Error types.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrayError {
    /// The native toolkit could not be brought up (no display server, no
    /// status notifier host, ...). Fatal for the session.
    #[error("native tray unavailable: {0}")]
    Unavailable(String),

    /// No backend is compiled in for this target or feature set.
    #[error("no tray backend for this platform")]
    Unsupported,

    /// An icon file could not be loaded. Backends log this and carry on
    /// without an icon.
    #[error("failed to load icon {path:?}: {reason}")]
    Icon { path: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, TrayError>;
