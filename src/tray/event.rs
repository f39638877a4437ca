//! Events travelling from the native toolkit to the loop thread.

/// A click on a rendered menu entry, tagged with the redraw it came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Activation {
    pub generation: u64,
    pub index: usize,
}

/// Messages delivered to a backend's loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopEvent {
    /// A menu entry was activated.
    Activated(Activation),
    /// Nothing to dispatch; unblocks a waiting `run_once` so it can observe
    /// an exit request.
    Wake,
}
