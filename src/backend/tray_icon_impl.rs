//! tray-icon implementation for macOS and Windows.
//!
//! tray-icon renders the icon and menu but relies on the platform UI loop,
//! which is driven here one iteration at a time through winit's pump API.
//! Native menu item ids encode `generation:index` so a click can be mapped
//! back to the snapshot it was rendered from.

use crate::backend::Backend;
use crate::config::TrayConfig;
use crate::error::{Result, TrayError};
use crate::tray::{Activation, EntryKind, LoopEvent, Snapshot, Waker};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, warn};
use tray_icon::menu::{CheckMenuItem, Menu, MenuEvent, MenuItem, PredefinedMenuItem};
use tray_icon::{Icon, TrayIcon, TrayIconBuilder};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::WindowId;

/// Collects activations delivered during a pump.
#[derive(Default)]
struct Pump {
    pending: VecDeque<Activation>,
}

impl ApplicationHandler<LoopEvent> for Pump {
    fn resumed(&mut self, _event_loop: &ActiveEventLoop) {}

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _id: WindowId, _event: WindowEvent) {}

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: LoopEvent) {
        if let LoopEvent::Activated(activation) = event {
            self.pending.push_back(activation);
        }
    }
}

/// `tray-icon` backend for macOS and Windows.
///
/// Owns the winit event loop, which must live on the main thread; `pump`
/// drives it one batch of events at a time.
pub struct TrayIconBackend {
    event_loop: EventLoop<LoopEvent>,
    proxy: EventLoopProxy<LoopEvent>,
    pump: Pump,
    tray_icon: Option<TrayIcon>,
    icon_source: String,
}

impl TrayIconBackend {
    pub fn new() -> Result<Self> {
        #[allow(unused_mut)]
        let mut builder = EventLoop::<LoopEvent>::with_user_event();

        // No dock icon, no menu bar: the status item is the whole UI.
        #[cfg(target_os = "macos")]
        {
            use winit::platform::macos::{ActivationPolicy, EventLoopBuilderExtMacOS};
            builder.with_activation_policy(ActivationPolicy::Accessory);
        }

        let event_loop = builder
            .build()
            .map_err(|e| TrayError::Unavailable(format!("failed to create event loop: {e}")))?;
        let proxy = event_loop.create_proxy();

        Ok(Self {
            event_loop,
            proxy,
            pump: Pump::default(),
            tray_icon: None,
            icon_source: String::new(),
        })
    }

    fn pump_native(&mut self, timeout: Option<Duration>) {
        if let PumpStatus::Exit(code) = self.event_loop.pump_app_events(timeout, &mut self.pump) {
            debug!(code, "native event loop exited");
        }
    }
}

impl Backend for TrayIconBackend {
    fn name(&self) -> &'static str {
        "tray-icon"
    }

    fn start(&mut self, _config: &TrayConfig, snapshot: &Snapshot) -> Result<()> {
        if self.tray_icon.is_some() {
            warn!("tray already spawned");
            return Ok(());
        }

        // Let the application finish launching before the status item exists.
        self.pump_native(Some(Duration::ZERO));

        let proxy = Mutex::new(self.proxy.clone());
        MenuEvent::set_event_handler(Some(move |event: MenuEvent| {
            let Some(activation) = parse_menu_id(&event.id.0) else {
                debug!(id = %event.id.0, "ignoring foreign menu id");
                return;
            };
            if let Ok(proxy) = proxy.lock() {
                let _ = proxy.send_event(LoopEvent::Activated(activation));
            }
        }));

        let mut builder = TrayIconBuilder::new()
            .with_menu(Box::new(build_menu(snapshot)))
            .with_tooltip(&snapshot.tooltip);
        match load_icon(&snapshot.icon) {
            Ok(icon) => builder = builder.with_icon(icon),
            Err(e) => warn!("{e}"),
        }

        let tray_icon = builder
            .build()
            .map_err(|e| TrayError::Unavailable(format!("failed to create tray icon: {e}")))?;
        self.tray_icon = Some(tray_icon);
        self.icon_source = snapshot.icon.clone();
        Ok(())
    }

    fn redraw(&mut self, snapshot: &Snapshot) {
        let Some(tray_icon) = &self.tray_icon else {
            warn!("redraw before the tray was spawned");
            return;
        };

        tray_icon.set_menu(Some(Box::new(build_menu(snapshot))));
        if let Err(e) = tray_icon.set_tooltip(Some(&snapshot.tooltip)) {
            warn!("failed to set tooltip: {e}");
        }

        if snapshot.icon != self.icon_source {
            match load_icon(&snapshot.icon) {
                Ok(icon) => {
                    if let Err(e) = tray_icon.set_icon(Some(icon)) {
                        warn!("failed to set icon: {e}");
                    }
                }
                Err(e) => warn!("{e}"),
            }
            self.icon_source = snapshot.icon.clone();
        }
    }

    fn pump(&mut self, blocking: bool) -> Option<Activation> {
        if let Some(activation) = self.pump.pending.pop_front() {
            return Some(activation);
        }
        let timeout = if blocking { None } else { Some(Duration::ZERO) };
        self.pump_native(timeout);
        self.pump.pending.pop_front()
    }

    fn waker(&self) -> Waker {
        let proxy = Mutex::new(self.proxy.clone());
        Arc::new(move || {
            if let Ok(proxy) = proxy.lock() {
                let _ = proxy.send_event(LoopEvent::Wake);
            }
        })
    }

    fn stop(&mut self) {
        MenuEvent::set_event_handler::<fn(MenuEvent)>(None);
        // Dropping the TrayIcon removes it from the status bar / notification area.
        self.tray_icon = None;
        self.pump.pending.clear();
    }
}

fn build_menu(snapshot: &Snapshot) -> Menu {
    let menu = Menu::new();
    for entry in &snapshot.entries {
        let id = menu_id(snapshot.generation, entry.index);
        if entry.icon.is_some() {
            debug!(label = %entry.label, "menu item icons are not rendered by this backend");
        }
        let appended = match entry.kind {
            EntryKind::Separator => menu.append(&PredefinedMenuItem::separator()),
            EntryKind::Standard => {
                menu.append(&MenuItem::with_id(id, &entry.label, entry.enabled, None))
            }
            EntryKind::Checkmark { checked } => menu.append(&CheckMenuItem::with_id(
                id,
                &entry.label,
                entry.enabled,
                checked,
                None,
            )),
        };
        if let Err(e) = appended {
            warn!(label = %entry.label, "failed to append menu item: {e}");
        }
    }
    menu
}

fn menu_id(generation: u64, index: usize) -> String {
    format!("{generation}:{index}")
}

fn parse_menu_id(id: &str) -> Option<Activation> {
    let (generation, index) = id.split_once(':')?;
    Some(Activation {
        generation: generation.parse().ok()?,
        index: index.parse().ok()?,
    })
}

fn load_icon(source: &str) -> Result<Icon> {
    let path = Path::new(source);
    let icon_error = |reason: String| TrayError::Icon {
        path: path.to_path_buf(),
        reason,
    };

    let image = image::open(path)
        .map_err(|e| icon_error(e.to_string()))?
        .into_rgba8();
    let (width, height) = image.dimensions();
    Icon::from_rgba(image.into_raw(), width, height).map_err(|e| icon_error(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_ids_round_trip() {
        assert_eq!(
            parse_menu_id(&menu_id(12, 3)),
            Some(Activation {
                generation: 12,
                index: 3
            })
        );
    }

    #[test]
    fn foreign_ids_are_rejected() {
        assert_eq!(parse_menu_id("quit"), None);
        assert_eq!(parse_menu_id("1:x"), None);
        assert_eq!(parse_menu_id(":1"), None);
    }

    #[test]
    fn missing_icon_is_reported() {
        let err = load_icon("/nonexistent/tray.png").unwrap_err();
        assert!(matches!(err, TrayError::Icon { .. }));
    }
}
