//! Tray configuration.
//!
//! Values here describe the tray to the desktop shell but never change while
//! the tray is active. Anything that does change (icon, tooltip, menu) lives in
//! [`Tray`](crate::Tray) and is pushed with a redraw.

/// Category reported to the status notifier host.
///
/// Only the StatusNotifierItem backend uses this; other shells have no
/// equivalent and ignore it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Category {
    #[default]
    ApplicationStatus,
    Communications,
    SystemServices,
    Hardware,
}

/// Static description of the tray icon.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrayConfig {
    /// Identifier of the icon. Should be unique per application.
    pub id: String,
    /// Human readable name shown by shells that display one.
    pub title: String,
    pub category: Category,
}

impl Default for TrayConfig {
    fn default() -> Self {
        Self {
            id: "tray-id".to_string(),
            title: "Tray Icon".to_string(),
            category: Category::default(),
        }
    }
}

impl TrayConfig {
    /// Sets the StatusNotifierItem id; other backends ignore it.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Sets the human-readable tray title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the category hint passed to status notifier hosts.
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }
}
