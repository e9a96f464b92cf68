//! Fire-once signal bus. Phases never hold references to each other; every
//! hand-off goes through a named signal emitted exactly once.
//!
//! Listeners may attach after their signal has fired (phases boot independently),
//! so emission also latches a durable flag and `once_signal` checks it first.

use crate::api::types::Signal;

/// Process-wide record of which signals have fired.
///
/// Write-once, read-many: a flag is set on the first emission of its signal and is
/// never cleared for the rest of the run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignalFlags {
    fired: [bool; Signal::COUNT],
}

impl SignalFlags {
    pub fn is_set(&self, signal: Signal) -> bool {
        self.fired[signal.index()]
    }

    /// Whether the eyes-opening prologue has finished.
    pub fn prologue_complete(&self) -> bool {
        self.is_set(Signal::BlinkComplete)
    }

    /// Set the flag. Returns false if it was already set.
    fn latch(&mut self, signal: Signal) -> bool {
        let slot = &mut self.fired[signal.index()];
        let fresh = !*slot;
        *slot = true;
        fresh
    }
}

/// Handle to a queued listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u32);

/// How `once_signal` delivered a handler.
#[derive(Debug, PartialEq, Eq)]
pub enum Delivery<H> {
    /// The signal had already fired; the caller invokes the handler now.
    Immediate(H),
    /// The handler waits for the next emission.
    Queued(ListenerId),
}

/// Signal bus carrying handler payloads of type `H`.
#[derive(Debug)]
pub struct EventBus<H> {
    flags: SignalFlags,
    listeners: Vec<(ListenerId, Signal, H)>,
    next_id: u32,
    /// Signals emitted since the last drain, for the host.
    emitted: Vec<Signal>,
}

impl<H> EventBus<H> {
    pub fn new() -> Self {
        Self {
            flags: SignalFlags::default(),
            listeners: Vec::new(),
            next_id: 0,
            emitted: Vec::new(),
        }
    }

    pub fn flags(&self) -> &SignalFlags {
        &self.flags
    }

    pub fn has_fired(&self, signal: Signal) -> bool {
        self.flags.is_set(signal)
    }

    /// Register `handler` for exactly one delivery of `signal`.
    pub fn once_signal(&mut self, signal: Signal, handler: H) -> Delivery<H> {
        if self.flags.is_set(signal) {
            return Delivery::Immediate(handler);
        }
        let id = ListenerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.listeners.push((id, signal, handler));
        Delivery::Queued(id)
    }

    /// Fire `signal`. Returns the handlers to invoke, in registration order.
    /// Emitting a signal that already fired returns nothing.
    pub fn emit(&mut self, signal: Signal) -> Vec<H> {
        if !self.flags.latch(signal) {
            log::debug!("signal {} already fired; ignoring", signal.name());
            return Vec::new();
        }
        self.emitted.push(signal);

        let (fired, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.listeners)
            .into_iter()
            .partition(|(_, s, _)| *s == signal);
        self.listeners = kept;
        log::debug!("signal {} -> {} listener(s)", signal.name(), fired.len());
        fired.into_iter().map(|(_, _, h)| h).collect()
    }

    /// Drop a queued listener. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(l, _, _)| *l != id);
        self.listeners.len() != before
    }

    /// Number of queued listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Drain signals emitted since the last call (for forwarding to the host).
    pub fn drain_emitted(&mut self) -> impl Iterator<Item = Signal> + '_ {
        self.emitted.drain(..)
    }
}

impl<H> Default for EventBus<H> {
    fn default() -> Self {
        Self::new()
    }
}
