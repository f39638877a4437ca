//! Tray model and its render snapshot.
//!
//! [`Tray`] is the application-facing model. Backends never look at it
//! directly: every redraw turns it into a [`Snapshot`], an owned description
//! of what the shell should show, so no native object ever borrows menu text
//! or callback state.

use crate::menu::MenuItem;

/// The tray icon: one icon, one tooltip, one flat menu.
#[derive(Debug, Default)]
pub struct Tray {
    /// Icon name from the freedesktop icon theme, or a path to an icon file.
    pub icon: String,
    /// Text shown when hovering the icon.
    pub tooltip: String,
    /// Menu items in display order.
    pub menu: Vec<MenuItem>,
}

impl Tray {
    /// Creates a tray with an empty menu.
    pub fn new(icon: impl Into<String>, tooltip: impl Into<String>) -> Self {
        Self {
            icon: icon.into(),
            tooltip: tooltip.into(),
            menu: Vec::new(),
        }
    }

    /// Appends one item to the menu.
    pub fn with_item(mut self, item: MenuItem) -> Self {
        self.menu.push(item);
        self
    }

    /// Appends several items, in order.
    pub fn with_menu(mut self, menu: impl IntoIterator<Item = MenuItem>) -> Self {
        self.menu.extend(menu);
        self
    }

    /// The items that are rendered: everything before the first terminator.
    pub fn visible_items(&self) -> &[MenuItem] {
        let end = self
            .menu
            .iter()
            .position(MenuItem::is_terminator)
            .unwrap_or(self.menu.len());
        &self.menu[..end]
    }

    pub(crate) fn visible_items_mut(&mut self) -> &mut [MenuItem] {
        let end = self
            .menu
            .iter()
            .position(MenuItem::is_terminator)
            .unwrap_or(self.menu.len());
        &mut self.menu[..end]
    }

    /// Builds the render description for the given redraw generation.
    pub fn snapshot(&self, generation: u64) -> Snapshot {
        Snapshot {
            generation,
            icon: self.icon.clone(),
            tooltip: self.tooltip.clone(),
            entries: self
                .visible_items()
                .iter()
                .enumerate()
                .map(|(index, item)| MenuEntry::from_item(index, item))
                .collect(),
        }
    }
}

/// What a backend renders for one redraw.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    /// Increases whenever the rendered entries change. Activations carry it
    /// back so clicks on a menu that has since changed can be checked.
    pub generation: u64,
    pub icon: String,
    pub tooltip: String,
    pub entries: Vec<MenuEntry>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    Standard,
    Checkmark { checked: bool },
    Separator,
}

/// One rendered menu position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuEntry {
    /// Position of the source item in [`Tray::menu`].
    pub index: usize,
    pub label: String,
    pub icon: Option<String>,
    pub kind: EntryKind,
    pub enabled: bool,
}

impl MenuEntry {
    fn from_item(index: usize, item: &MenuItem) -> Self {
        let kind = if item.is_separator() {
            EntryKind::Separator
        } else if item.is_checked() {
            EntryKind::Checkmark { checked: true }
        } else {
            EntryKind::Standard
        };
        Self {
            index,
            label: item.text.clone(),
            icon: item.icon.clone(),
            kind,
            enabled: item.is_enabled(),
        }
    }

    /// Whether a click on `self` may be delivered to `other`: same position,
    /// label and kind. Enabled state is checked at dispatch time instead.
    pub fn same_target(&self, other: &MenuEntry) -> bool {
        self.index == other.index && self.label == other.label && self.kind == other.kind
    }

    /// Whether the shell should report clicks on this entry.
    pub fn is_activatable(&self) -> bool {
        self.enabled && self.kind != EntryKind::Separator
    }
}
