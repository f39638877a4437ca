//! KSNI tray bridge implementation.
//!
//! Renders snapshots through the StatusNotifierItem D-Bus protocol. ksni runs
//! the D-Bus service on its own thread; menu activations are sent over a
//! channel and only reach callbacks when the loop thread pumps.

use crate::backend::Backend;
use crate::config::{Category, TrayConfig};
use crate::error::{Result, TrayError};
use crate::tray::{Activation, EntryKind, LoopEvent, MenuEntry, Snapshot, Waker};
use ksni::blocking::TrayMethods;
use ksni::menu::*;
use std::path::Path;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, TryRecvError, channel};
use tracing::{debug, info, warn};

/// Implementation of the ksni::Tray trait over the latest snapshot.
pub struct KsniTray {
    id: String,
    title: String,
    category: Category,
    snapshot: Snapshot,
    icon: KsniIcon,
    events: Sender<LoopEvent>,
}

impl KsniTray {
    fn build_menu_item(&self, entry: &MenuEntry) -> MenuItem<KsniTray> {
        let activation = Activation {
            generation: self.snapshot.generation,
            index: entry.index,
        };
        let sender = self.events.clone();
        let activate = Box::new(move |_this: &mut KsniTray| {
            let _ = sender.send(LoopEvent::Activated(activation));
        });
        let icon_name = entry.icon.clone().unwrap_or_default();

        match entry.kind {
            EntryKind::Separator => MenuItem::Separator,
            EntryKind::Standard => StandardItem {
                label: entry.label.clone(),
                icon_name,
                enabled: entry.enabled,
                activate,
                ..Default::default()
            }
            .into(),
            EntryKind::Checkmark { checked } => CheckmarkItem {
                label: entry.label.clone(),
                icon_name,
                enabled: entry.enabled,
                checked,
                activate,
                ..Default::default()
            }
            .into(),
        }
    }
}

impl ksni::Tray for KsniTray {
    const MENU_ON_ACTIVATE: bool = true;

    fn id(&self) -> String {
        self.id.clone()
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn category(&self) -> ksni::Category {
        match self.category {
            Category::ApplicationStatus => ksni::Category::ApplicationStatus,
            Category::Communications => ksni::Category::Communications,
            Category::SystemServices => ksni::Category::SystemServices,
            Category::Hardware => ksni::Category::Hardware,
        }
    }

    fn icon_name(&self) -> String {
        self.icon.name.clone()
    }

    fn icon_pixmap(&self) -> Vec<ksni::Icon> {
        self.icon.pixmap.clone()
    }

    fn tool_tip(&self) -> ksni::ToolTip {
        ksni::ToolTip {
            icon_name: String::new(),
            icon_pixmap: vec![],
            title: self.snapshot.tooltip.clone(),
            description: String::new(),
        }
    }

    fn menu(&self) -> Vec<MenuItem<Self>> {
        self.snapshot
            .entries
            .iter()
            .map(|entry| self.build_menu_item(entry))
            .collect()
    }
}

/// Tray icon in the form the host asks for it.
///
/// Resolved once per icon change, not on every D-Bus property read.
#[derive(Clone, Debug, Default)]
struct KsniIcon {
    name: String,
    pixmap: Vec<ksni::Icon>,
}

impl KsniIcon {
    /// Existing files are decoded into an ARGB pixmap, anything else is taken
    /// as a theme icon name. An unreadable file leaves the tray without icon.
    fn resolve(source: &str) -> Self {
        let path = Path::new(source);
        if !path.is_file() {
            return Self {
                name: source.to_string(),
                pixmap: Vec::new(),
            };
        }

        match load_pixmap(path) {
            Ok(icon) => Self {
                name: String::new(),
                pixmap: vec![icon],
            },
            Err(e) => {
                warn!("{e}");
                Self::default()
            }
        }
    }
}

fn load_pixmap(path: &Path) -> Result<ksni::Icon> {
    let icon_error = |reason: String| TrayError::Icon {
        path: path.to_path_buf(),
        reason,
    };

    let image = image::open(path)
        .map_err(|e| icon_error(e.to_string()))?
        .into_rgba8();
    let (width, height) = image.dimensions();
    let width = i32::try_from(width).map_err(|e| icon_error(e.to_string()))?;
    let height = i32::try_from(height).map_err(|e| icon_error(e.to_string()))?;

    let mut data = image.into_raw();
    for pixel in data.chunks_exact_mut(4) {
        pixel.rotate_right(1); // rgba to argb
    }
    Ok(ksni::Icon {
        width,
        height,
        data,
    })
}

/// StatusNotifierItem backend.
pub struct KsniBackend {
    handle: Option<ksni::blocking::Handle<KsniTray>>,
    /// Icon reference the current pixmap was resolved from.
    icon_source: String,
    events: Sender<LoopEvent>,
    receiver: Receiver<LoopEvent>,
}

impl KsniBackend {
    pub fn new() -> Result<Self> {
        let (events, receiver) = channel();
        Ok(Self {
            handle: None,
            icon_source: String::new(),
            events,
            receiver,
        })
    }
}

impl Backend for KsniBackend {
    fn name(&self) -> &'static str {
        "ksni"
    }

    fn start(&mut self, config: &TrayConfig, snapshot: &Snapshot) -> Result<()> {
        if self.handle.is_some() {
            warn!("tray already spawned");
            return Ok(());
        }

        let tray = KsniTray {
            id: config.id.clone(),
            title: config.title.clone(),
            category: config.category,
            snapshot: snapshot.clone(),
            icon: KsniIcon::resolve(&snapshot.icon),
            events: self.events.clone(),
        };
        self.icon_source = snapshot.icon.clone();

        match tray.spawn() {
            Ok(handle) => {
                self.handle = Some(handle);
                Ok(())
            }
            Err(e) => Err(TrayError::Unavailable(format!(
                "failed to spawn status notifier item: {e}"
            ))),
        }
    }

    fn redraw(&mut self, snapshot: &Snapshot) {
        let Some(handle) = &self.handle else {
            warn!("redraw before the tray was spawned");
            return;
        };
        let icon = (snapshot.icon != self.icon_source).then(|| {
            self.icon_source = snapshot.icon.clone();
            KsniIcon::resolve(&snapshot.icon)
        });
        let snapshot = snapshot.clone();
        let updated = handle.update(move |tray| {
            tray.snapshot = snapshot;
            if let Some(icon) = icon {
                tray.icon = icon;
            }
        });
        if updated.is_none() {
            warn!("status notifier service has shut down, redraw ignored");
        }
    }

    fn pump(&mut self, blocking: bool) -> Option<Activation> {
        let event = if blocking {
            self.receiver.recv().ok()
        } else {
            match self.receiver.try_recv() {
                Ok(event) => Some(event),
                Err(TryRecvError::Empty) => None,
                Err(TryRecvError::Disconnected) => {
                    debug!("tray event channel disconnected");
                    None
                }
            }
        };

        match event? {
            LoopEvent::Activated(activation) => Some(activation),
            LoopEvent::Wake => None,
        }
    }

    fn waker(&self) -> Waker {
        let sender = self.events.clone();
        Arc::new(move || {
            let _ = sender.send(LoopEvent::Wake);
        })
    }

    fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            // Blocks until the item is unregistered, so the icon is gone from
            // the host once teardown returns.
            handle.shutdown().wait();
            info!("status notifier item unregistered");
        }
    }
}
