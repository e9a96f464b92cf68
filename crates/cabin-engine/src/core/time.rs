/// Frame-driven millisecond clock.
/// The host advances it once per display refresh; every deadline in the engine is
/// measured against `now_ms`.
#[derive(Debug, Clone, Default)]
pub struct Clock {
    /// Accumulated time, kept fractional so sub-millisecond frame deltas add up.
    elapsed_ms: f64,
    /// Frames seen so far.
    frame: u64,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by one rendered frame of `dt_ms`. Returns the new `now_ms`.
    /// Negative or non-finite deltas still count as a frame but add no time.
    pub fn advance(&mut self, dt_ms: f64) -> u64 {
        if dt_ms.is_finite() && dt_ms > 0.0 {
            self.elapsed_ms += dt_ms;
        }
        self.frame += 1;
        self.now_ms()
    }

    /// Whole milliseconds elapsed since the clock was created.
    pub fn now_ms(&self) -> u64 {
        self.elapsed_ms.floor() as u64
    }

    /// Number of frames advanced so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }
}
