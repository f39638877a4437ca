//! Menu item data structures.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// Callback run when a menu item is activated.
///
/// It receives the item itself, so label, flags and context are all reachable
/// from inside the handler.
pub type Callback = Box<dyn FnMut(&mut MenuItem)>;

/// Rendering flags for a menu item.
///
/// Backends that cannot express a flag ignore it.
///
/// ```
/// use minitray::ItemFlags;
///
/// let mut flags = ItemFlags::CHECKED;
/// flags.insert(ItemFlags::DISABLED);
/// flags.toggle(ItemFlags::CHECKED);
/// assert_eq!(flags, ItemFlags::DISABLED);
/// flags.remove(ItemFlags::DISABLED);
/// assert_eq!(flags.bits(), 0);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ItemFlags(u32);

impl ItemFlags {
    pub const NONE: ItemFlags = ItemFlags(0);
    /// Shown greyed out and never activated.
    pub const DISABLED: ItemFlags = ItemFlags(1 << 0);
    /// Shown with a check mark.
    pub const CHECKED: ItemFlags = ItemFlags(1 << 1);
    /// Rendered as a separator line; label and callback are ignored.
    pub const SEPARATOR: ItemFlags = ItemFlags(1 << 2);

    /// Raw bit representation.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Builds flags from raw bits.
    pub const fn from_bits(bits: u32) -> Self {
        ItemFlags(bits)
    }

    /// Whether every flag in `other` is set.
    pub const fn contains(self, other: ItemFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Sets the flags in `other`.
    pub fn insert(&mut self, other: ItemFlags) {
        self.0 |= other.0;
    }

    /// Clears the flags in `other`.
    pub fn remove(&mut self, other: ItemFlags) {
        self.0 &= !other.0;
    }

    /// Flips the flags in `other`.
    pub fn toggle(&mut self, other: ItemFlags) {
        self.0 ^= other.0;
    }
}

impl std::ops::BitOr for ItemFlags {
    type Output = ItemFlags;

    fn bitor(self, rhs: ItemFlags) -> ItemFlags {
        ItemFlags(self.0 | rhs.0)
    }
}

/// A single entry of the tray menu.
///
/// An item with an empty label terminates the menu: neither it nor anything
/// after it is rendered.
pub struct MenuItem {
    /// Icon name from the freedesktop icon theme, or a path to an icon file.
    pub icon: Option<String>,
    /// Display text. Empty means terminator.
    pub text: String,
    /// Rendering flags.
    pub flags: ItemFlags,
    /// Run on activation; `None` leaves the item inert.
    pub callback: Option<Callback>,
    /// Arbitrary caller state handed back through the item on activation.
    pub context: Option<Box<dyn Any>>,
}

impl MenuItem {
    /// Creates an enabled item with the given label and no callback.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            icon: None,
            text: text.into(),
            flags: ItemFlags::NONE,
            callback: None,
            context: None,
        }
    }

    /// A separator line.
    pub fn separator() -> Self {
        Self::new("-").with_flags(ItemFlags::SEPARATOR)
    }

    /// An explicit end-of-menu marker.
    pub fn terminator() -> Self {
        Self::new("")
    }

    /// Sets the item icon: a theme icon name or a path.
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Replaces the item's flags.
    pub fn with_flags(mut self, flags: ItemFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Sets the callback run when the item is clicked.
    pub fn on_activate<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&mut MenuItem) + 'static,
    {
        self.callback = Some(Box::new(callback));
        self
    }

    /// Attaches caller state, read back with [`context`](Self::context).
    pub fn with_context<T: Any>(mut self, context: T) -> Self {
        self.context = Some(Box::new(context));
        self
    }

    pub fn is_terminator(&self) -> bool {
        self.text.is_empty()
    }

    pub fn is_separator(&self) -> bool {
        self.flags.contains(ItemFlags::SEPARATOR)
    }

    pub fn is_enabled(&self) -> bool {
        !self.flags.contains(ItemFlags::DISABLED)
    }

    pub fn is_checked(&self) -> bool {
        self.flags.contains(ItemFlags::CHECKED)
    }

    /// Whether activating this item should reach its callback.
    pub fn is_activatable(&self) -> bool {
        !self.is_terminator() && !self.is_separator() && self.is_enabled()
    }

    /// The attached context, if it is a `T`.
    pub fn context<T: Any>(&self) -> Option<&T> {
        self.context.as_ref()?.downcast_ref()
    }

    /// Mutable access to the attached context, if it is a `T`.
    pub fn context_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.context.as_mut()?.downcast_mut()
    }

    /// Runs the callback once with this item as argument.
    ///
    /// A placeholder occupies `callback` during the call so the handler can
    /// borrow the item mutably and still be told apart from whatever it
    /// leaves behind: a replacement callback wins, `None` disarms the item,
    /// and an untouched placeholder gets the original callback back.
    pub(crate) fn invoke(&mut self) -> bool {
        let Some(mut callback) = self.callback.take() else {
            return false;
        };

        // The token is alive exactly as long as the placeholder is, so a freed
        // placeholder whose address got reused cannot be mistaken for it.
        let token = Rc::new(());
        let held = Rc::clone(&token);
        let placeholder: Callback = Box::new(move |_: &mut MenuItem| {
            let _ = &held;
        });
        let placeholder_addr = callback_addr(&placeholder);
        self.callback = Some(placeholder);

        callback(self);

        let untouched = Rc::strong_count(&token) == 2
            && self
                .callback
                .as_ref()
                .is_some_and(|current| callback_addr(current) == placeholder_addr);
        if untouched {
            self.callback = Some(callback);
        }
        true
    }
}

fn callback_addr(callback: &Callback) -> *const () {
    &**callback as *const dyn FnMut(&mut MenuItem) as *const ()
}

impl fmt::Debug for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuItem")
            .field("icon", &self.icon)
            .field("text", &self.text)
            .field("flags", &self.flags)
            .field("callback", &self.callback.is_some())
            .field("context", &self.context.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_label_is_terminator() {
        assert!(MenuItem::terminator().is_terminator());
        assert!(!MenuItem::terminator().is_activatable());
        assert!(!MenuItem::new("Open").is_terminator());
    }

    #[test]
    fn flags_control_activation() {
        assert!(MenuItem::new("a").is_activatable());
        assert!(!MenuItem::new("a").with_flags(ItemFlags::DISABLED).is_activatable());
        assert!(!MenuItem::separator().is_activatable());
        assert!(MenuItem::new("a").with_flags(ItemFlags::CHECKED).is_activatable());
    }

    #[test]
    fn flag_set_operations() {
        let mut flags = ItemFlags::CHECKED | ItemFlags::DISABLED;
        assert!(flags.contains(ItemFlags::CHECKED));
        flags.remove(ItemFlags::DISABLED);
        assert!(!flags.contains(ItemFlags::DISABLED));
        flags.toggle(ItemFlags::CHECKED);
        assert_eq!(flags, ItemFlags::NONE);
        assert_eq!(ItemFlags::from_bits(ItemFlags::SEPARATOR.bits()), ItemFlags::SEPARATOR);
    }

    #[test]
    fn invoke_passes_item_and_context() {
        let mut item = MenuItem::new("Count")
            .with_context(0u32)
            .on_activate(|item| {
                if let Some(n) = item.context_mut::<u32>() {
                    *n += 1;
                }
                item.text = format!("Count {}", item.context::<u32>().copied().unwrap_or(0));
            });

        assert!(item.invoke());
        assert!(item.invoke());
        assert_eq!(item.context::<u32>(), Some(&2));
        assert_eq!(item.text, "Count 2");
        assert!(item.callback.is_some());
    }

    #[test]
    fn callback_may_replace_itself() {
        let mut item = MenuItem::new("Once").on_activate(|item| {
            item.text = "first".into();
            item.callback = Some(Box::new(|item: &mut MenuItem| item.text = "second".into()));
        });

        item.invoke();
        assert_eq!(item.text, "first");
        item.invoke();
        assert_eq!(item.text, "second");
    }

    #[test]
    fn callback_may_clear_itself() {
        let mut item = MenuItem::new("Once").on_activate(|item| {
            item.text = "used".into();
            item.callback = None;
        });

        assert!(item.invoke());
        assert_eq!(item.text, "used");
        assert!(item.callback.is_none());
        assert!(!item.invoke());
    }

    #[test]
    fn invoke_without_callback_is_noop() {
        let mut item = MenuItem::new("Label");
        assert!(!item.invoke());
    }

    #[test]
    fn context_downcast_to_wrong_type_is_none() {
        let item = MenuItem::new("x").with_context("hello");
        assert_eq!(item.context::<&str>(), Some(&"hello"));
        assert!(item.context::<u32>().is_none());
    }
}
