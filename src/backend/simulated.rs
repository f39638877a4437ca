//! In-process tray shell.
//!
//! [`SimulatedBackend`] renders into a [`SimulatedShell`] instead of a desktop
//! shell. The shell records what would be visible and lets callers click
//! entries the way a user would, from any thread. Used for headless runs and
//! for exercising the dispatch path in tests.

use crate::backend::Backend;
use crate::config::TrayConfig;
use crate::error::{Result, TrayError};
use crate::tray::{Activation, LoopEvent, MenuEntry, Snapshot, Waker};
use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use tracing::debug;

#[derive(Default)]
struct ShellState {
    visible: bool,
    config: Option<TrayConfig>,
    snapshot: Option<Snapshot>,
    queue: VecDeque<LoopEvent>,
    redraws: usize,
}

#[derive(Default)]
struct Shared {
    state: Mutex<ShellState>,
    ready: Condvar,
}

/// Observable side of the simulated tray.
#[derive(Clone, Default)]
pub struct SimulatedShell {
    shared: Arc<Shared>,
}

impl SimulatedShell {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ShellState> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, event: LoopEvent) {
        self.lock().queue.push_back(event);
        self.shared.ready.notify_all();
    }

    /// Whether the icon is currently shown.
    pub fn is_visible(&self) -> bool {
        self.lock().visible
    }

    pub fn config(&self) -> Option<TrayConfig> {
        self.lock().config.clone()
    }

    pub fn icon(&self) -> Option<String> {
        let state = self.lock();
        state.visible.then(|| state.snapshot.as_ref().map(|s| s.icon.clone()))?
    }

    pub fn tooltip(&self) -> Option<String> {
        let state = self.lock();
        state.visible.then(|| state.snapshot.as_ref().map(|s| s.tooltip.clone()))?
    }

    /// The menu as it would appear when opened. Empty while hidden.
    pub fn entries(&self) -> Vec<MenuEntry> {
        let state = self.lock();
        match (&state.snapshot, state.visible) {
            (Some(snapshot), true) => snapshot.entries.clone(),
            _ => Vec::new(),
        }
    }

    pub fn labels(&self) -> Vec<String> {
        self.entries().into_iter().map(|e| e.label).collect()
    }

    /// Number of times the menu was rebuilt after the initial render.
    pub fn redraw_count(&self) -> usize {
        self.lock().redraws
    }

    /// Events delivered but not yet pumped.
    pub fn pending(&self) -> usize {
        self.lock().queue.len()
    }

    /// Clicks the entry at `position` of the open menu.
    ///
    /// Returns `false` when nothing is shown at that position or the entry
    /// does not react to clicks; in that case no event is queued.
    pub fn click(&self, position: usize) -> bool {
        let activation = {
            let state = self.lock();
            let Some(snapshot) = state.snapshot.as_ref().filter(|_| state.visible) else {
                return false;
            };
            match snapshot.entries.get(position) {
                Some(entry) if entry.is_activatable() => Activation {
                    generation: snapshot.generation,
                    index: entry.index,
                },
                _ => return false,
            }
        };
        debug!(?activation, "simulated click");
        self.push(LoopEvent::Activated(activation));
        true
    }

    /// Clicks the first entry whose label equals `label`.
    pub fn click_label(&self, label: &str) -> bool {
        let position = self.entries().iter().position(|e| e.label == label);
        position.is_some_and(|p| self.click(p))
    }
}

/// Backend that renders into a [`SimulatedShell`].
pub struct SimulatedBackend {
    shell: SimulatedShell,
    unavailable: Option<String>,
}

impl SimulatedBackend {
    pub fn new(shell: SimulatedShell) -> Self {
        Self {
            shell,
            unavailable: None,
        }
    }

    /// A backend whose toolkit refuses to start, as with no display server.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            shell: SimulatedShell::new(),
            unavailable: Some(reason.into()),
        }
    }

    pub fn shell(&self) -> &SimulatedShell {
        &self.shell
    }
}

impl Default for SimulatedBackend {
    fn default() -> Self {
        Self::new(SimulatedShell::new())
    }
}

impl Backend for SimulatedBackend {
    fn name(&self) -> &'static str {
        "simulated"
    }

    fn start(&mut self, config: &TrayConfig, snapshot: &Snapshot) -> Result<()> {
        if let Some(reason) = &self.unavailable {
            return Err(TrayError::Unavailable(reason.clone()));
        }
        let mut state = self.shell.lock();
        state.visible = true;
        state.config = Some(config.clone());
        state.snapshot = Some(snapshot.clone());
        Ok(())
    }

    fn redraw(&mut self, snapshot: &Snapshot) {
        let mut state = self.shell.lock();
        state.snapshot = Some(snapshot.clone());
        state.redraws += 1;
    }

    fn pump(&mut self, blocking: bool) -> Option<Activation> {
        let mut state = self.shell.lock();
        loop {
            match state.queue.pop_front() {
                Some(LoopEvent::Activated(activation)) => return Some(activation),
                Some(LoopEvent::Wake) => return None,
                None if !blocking => return None,
                None => {
                    state = self
                        .shell
                        .shared
                        .ready
                        .wait(state)
                        .unwrap_or_else(PoisonError::into_inner);
                }
            }
        }
    }

    fn waker(&self) -> Waker {
        let shell = self.shell.clone();
        Arc::new(move || shell.push(LoopEvent::Wake))
    }

    fn stop(&mut self) {
        let mut state = self.shell.lock();
        state.visible = false;
        state.queue.clear();
    }
}
