//! Gap planning for a fixed-budget timeline.
//!
//! A timeline of `n` segments has `n` gap slots: one of silence before the first
//! segment and one between each pair, with no trailing gap. The time left over
//! after the segments is split evenly across the slots; the leftover
//! milliseconds of the integer division go one each to the earliest slots.

use crate::api::error::ScheduleError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GapPlan {
    gaps: Vec<u64>,
    base_gap_ms: u64,
    remainder: u64,
    total_gap_ms: u64,
}

impl GapPlan {
    /// Plan gaps for `durations` inside `budget_ms`. A budget shorter than the
    /// segments is clamped to zero gap.
    pub fn new(durations: &[u64], budget_ms: u64) -> Result<Self, ScheduleError> {
        if durations.is_empty() {
            return Err(ScheduleError::EmptyTimeline);
        }
        let required_ms = required(durations)?;
        if required_ms > budget_ms {
            log::warn!(
                "segments need {} ms but the budget is {} ms; playing back to back",
                required_ms,
                budget_ms
            );
        }
        Ok(Self::distribute(durations.len(), budget_ms.saturating_sub(required_ms)))
    }

    /// Like `new`, but a budget shorter than the segments is an error.
    pub fn strict(durations: &[u64], budget_ms: u64) -> Result<Self, ScheduleError> {
        let required_ms = required(durations)?;
        if required_ms > budget_ms {
            return Err(ScheduleError::OverBudget { required_ms, budget_ms });
        }
        Self::new(durations, budget_ms)
    }

    fn distribute(slots: usize, total_gap_ms: u64) -> Self {
        let n = slots as u64;
        let base_gap_ms = total_gap_ms / n;
        let remainder = total_gap_ms % n;
        let gaps = (0..n).map(|i| base_gap_ms + u64::from(i < remainder)).collect();
        Self { gaps, base_gap_ms, remainder, total_gap_ms }
    }

    /// Silence before the first segment.
    pub fn initial_gap(&self) -> u64 {
        self.gaps[0]
    }

    /// Gap after segment `index`; `None` after the last one.
    pub fn gap_after(&self, index: usize) -> Option<u64> {
        self.gaps.get(index + 1).copied()
    }

    /// All gap slots in order, initial gap first.
    pub fn gaps(&self) -> &[u64] {
        &self.gaps
    }

    pub fn base_gap_ms(&self) -> u64 {
        self.base_gap_ms
    }

    /// How many slots carry the extra millisecond.
    pub fn remainder(&self) -> u64 {
        self.remainder
    }

    pub fn total_gap_ms(&self) -> u64 {
        self.total_gap_ms
    }
}

fn required(durations: &[u64]) -> Result<u64, ScheduleError> {
    durations
        .iter()
        .try_fold(0u64, |total, &d| total.checked_add(d))
        .ok_or(ScheduleError::Overflow)
}
