//! The owning handle of an active tray.

use crate::backend::Backend;
use crate::config::TrayConfig;
use crate::error::Result;
use crate::tray::control::ExitSignal;
use crate::tray::event::Activation;
use crate::tray::model::{Snapshot, Tray};
use std::collections::VecDeque;
use tracing::{debug, info};

/// How many superseded snapshots are kept to resolve late activations.
const SNAPSHOT_HISTORY: usize = 16;

/// An active tray icon.
///
/// Created by [`TrayHandle::initialize`], which takes ownership of the
/// [`Tray`] model; [`TrayHandle::shutdown`] removes the icon and gives the
/// model back. All methods must be called from the thread that owns the
/// platform's UI loop.
pub struct TrayHandle<B: Backend> {
    tray: Tray,
    config: TrayConfig,
    backend: B,
    generation: u64,
    /// What the shell currently shows.
    shown: Snapshot,
    /// Menus shown before `shown`, newest last.
    history: VecDeque<Snapshot>,
    exit: ExitSignal,
    active: bool,
}

impl<B: Backend> TrayHandle<B> {
    /// Shows the tray through `backend`.
    ///
    /// An error means the native toolkit could not come up at all; there is
    /// nothing to retry.
    pub fn initialize(tray: Tray, config: TrayConfig, mut backend: B) -> Result<Self> {
        let generation = 1;
        let shown = tray.snapshot(generation);
        backend.start(&config, &shown)?;

        let exit = ExitSignal::new();
        exit.set_waker(Some(backend.waker()));

        info!(
            backend = backend.name(),
            id = %config.id,
            items = tray.visible_items().len(),
            "tray initialized"
        );

        Ok(Self {
            tray,
            config,
            backend,
            generation,
            shown,
            history: VecDeque::new(),
            exit,
            active: true,
        })
    }

    /// Runs one iteration of the native loop.
    ///
    /// With `blocking` set, waits until the toolkit delivers an event or exit
    /// is requested. Returns `true` once the loop should terminate; after an
    /// exit request this returns immediately without touching the toolkit.
    pub fn run_once(&mut self, blocking: bool) -> bool {
        if self.exit.is_requested() {
            return true;
        }

        if let Some(activation) = self.backend.pump(blocking) {
            self.dispatch(activation);
        }

        self.exit.is_requested()
    }

    /// Rebuilds the native menu from the current model.
    ///
    /// Call after every change to [`Tray`]; nothing is tracked automatically.
    /// The generation only moves when the menu entries changed, so redraws
    /// that touch just the icon or tooltip keep pending clicks valid.
    pub fn redraw(&mut self) {
        let mut snapshot = self.tray.snapshot(self.generation);
        if snapshot.entries != self.shown.entries {
            self.generation += 1;
            snapshot.generation = self.generation;
            let previous = std::mem::replace(&mut self.shown, snapshot);
            if self.history.len() == SNAPSHOT_HISTORY {
                self.history.pop_front();
            }
            self.history.push_back(previous);
        } else {
            self.shown = snapshot;
        }

        debug!(
            generation = self.generation,
            entries = self.shown.entries.len(),
            "redrawing tray"
        );
        self.backend.redraw(&self.shown);
    }

    /// Makes the current or next `run_once` return `true`.
    pub fn request_exit(&self) {
        self.exit.request();
    }

    /// A cloneable handle for requesting exit from callbacks or other threads.
    pub fn exit_signal(&self) -> ExitSignal {
        self.exit.clone()
    }

    /// Removes the native icon and returns the model.
    pub fn shutdown(mut self) -> Tray {
        self.teardown();
        std::mem::take(&mut self.tray)
    }

    pub fn tray(&self) -> &Tray {
        &self.tray
    }

    /// Mutable access to the model. Follow changes with [`redraw`](Self::redraw).
    pub fn tray_mut(&mut self) -> &mut Tray {
        &mut self.tray
    }

    pub fn config(&self) -> &TrayConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Generation of the snapshot currently shown.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn dispatch(&mut self, activation: Activation) -> bool {
        if activation.generation != self.generation && !self.still_targets(activation) {
            debug!(
                ?activation,
                current = self.generation,
                "dropping activation for an entry that has changed since"
            );
            return false;
        }

        let Some(item) = self.tray.visible_items_mut().get_mut(activation.index) else {
            debug!(?activation, "dropping activation past the end of the menu");
            return false;
        };
        if !item.is_activatable() {
            debug!(?activation, label = %item.text, "entry is not activatable");
            return false;
        }

        debug!(index = activation.index, label = %item.text, "menu item activated");
        item.invoke()
    }

    /// Whether the entry clicked in an older menu is still shown, unchanged,
    /// at the same position.
    fn still_targets(&self, activation: Activation) -> bool {
        let Some(source) = self
            .history
            .iter()
            .rev()
            .find(|snapshot| snapshot.generation == activation.generation)
        else {
            return false;
        };
        let clicked = source
            .entries
            .iter()
            .find(|entry| entry.index == activation.index);
        let current = self
            .shown
            .entries
            .iter()
            .find(|entry| entry.index == activation.index);
        match (clicked, current) {
            (Some(clicked), Some(current)) => clicked.same_target(current),
            _ => false,
        }
    }

    fn teardown(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        self.exit.set_waker(None);
        self.backend.stop();
        info!(backend = self.backend.name(), "tray shut down");
    }
}

impl<B: Backend> Drop for TrayHandle<B> {
    fn drop(&mut self) {
        self.teardown();
    }
}
