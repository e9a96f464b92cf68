//! Cancellable delays.
//!
//! A `Delays` set belongs to exactly one owner (a timeline run, a card sequence).
//! Each `wait` is chained onto the previous deadline rather than onto the frame
//! that noticed it, so a chain of waits adds up to its exact total no matter how
//! frames fall. `cancel_all` resolves every outstanding wait at once; owners check
//! their own stopped flag after each resolution.

use std::collections::HashMap;

/// Handle to one pending wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DelayHandle(u32);

/// Result of polling a wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayStatus {
    /// Deadline not reached yet.
    Pending,
    /// Deadline reached. The handle is consumed.
    Elapsed,
    /// Cleared by `cancel_all`, or already consumed.
    Cancelled,
}

#[derive(Debug, Default)]
pub struct Delays {
    /// Outstanding deadlines by handle.
    pending: HashMap<DelayHandle, u64>,
    next_id: u32,
    /// Deadline of the most recent wait; the next wait starts here.
    cursor_ms: u64,
}

impl Delays {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restart the chain at `now_ms`. Call when the owner starts a fresh sequence.
    pub fn rebase(&mut self, now_ms: u64) {
        self.cursor_ms = now_ms;
    }

    /// Schedule a wait of `ms` after the previous deadline.
    pub fn wait(&mut self, ms: u64) -> DelayHandle {
        let id = DelayHandle(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.cursor_ms = self.cursor_ms.saturating_add(ms);
        self.pending.insert(id, self.cursor_ms);
        id
    }

    /// Check a wait against the current time.
    pub fn poll(&mut self, handle: DelayHandle, now_ms: u64) -> DelayStatus {
        match self.pending.get(&handle) {
            None => DelayStatus::Cancelled,
            Some(&deadline) if now_ms >= deadline => {
                self.pending.remove(&handle);
                DelayStatus::Elapsed
            }
            Some(_) => DelayStatus::Pending,
        }
    }

    /// Clear every outstanding wait. Returns how many were cleared, so a repeat
    /// call returns 0 and changes nothing.
    pub fn cancel_all(&mut self) -> usize {
        let cleared = self.pending.len();
        self.pending.clear();
        cleared
    }

    /// Deadline of a pending wait.
    pub fn deadline(&self, handle: DelayHandle) -> Option<u64> {
        self.pending.get(&handle).copied()
    }

    /// Where the next wait will start.
    pub fn cursor_ms(&self) -> u64 {
        self.cursor_ms
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waits_chain_from_previous_deadline() {
        let mut delays = Delays::new();
        delays.rebase(100);
        let a = delays.wait(50);
        let b = delays.wait(25);
        assert_eq!(delays.deadline(a), Some(150));
        assert_eq!(delays.deadline(b), Some(175));
    }

    #[test]
    fn poll_resolves_once() {
        let mut delays = Delays::new();
        let h = delays.wait(10);
        assert_eq!(delays.poll(h, 9), DelayStatus::Pending);
        assert_eq!(delays.poll(h, 12), DelayStatus::Elapsed);
        assert_eq!(delays.poll(h, 12), DelayStatus::Cancelled);
    }

    #[test]
    fn cancel_all_is_idempotent() {
        let mut delays = Delays::new();
        let a = delays.wait(10);
        let b = delays.wait(10);
        assert_eq!(delays.cancel_all(), 2);
        assert_eq!(delays.cancel_all(), 0);
        assert_eq!(delays.poll(a, 0), DelayStatus::Cancelled);
        assert_eq!(delays.poll(b, 1_000), DelayStatus::Cancelled);
        assert!(delays.is_empty());
    }

    #[test]
    fn zero_wait_is_due_immediately() {
        let mut delays = Delays::new();
        delays.rebase(40);
        let h = delays.wait(0);
        assert_eq!(delays.poll(h, 40), DelayStatus::Elapsed);
    }
}
