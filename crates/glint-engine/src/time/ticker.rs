use std::time::{Duration, Instant};

/// One frame's timing.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Tick {
    /// Monotonic frame counter, starting at 0.
    pub index: u64,

    /// Seconds since the previous tick, clamped.
    pub dt: f32,

    /// Sum of all clamped deltas so far, in seconds.
    pub elapsed: f64,
}

/// Produces a [`Tick`] per frame.
///
/// Delta time is clamped so a debugger pause or a minimised window does not
/// produce a huge step, and a tight loop never reports zero.
#[derive(Debug, Clone)]
pub struct FrameTicker {
    last: Instant,
    index: u64,
    elapsed: f64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameTicker {
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            last: Instant::now(),
            index: 0,
            elapsed: 0.0,
            dt_min,
            dt_max,
        }
    }

    /// Moves the baseline to now without producing a tick.
    ///
    /// Call after a resume so the first frame does not count the pause.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    pub fn tick(&mut self) -> Tick {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> Tick {
        let dt = now.saturating_duration_since(self.last).clamp(self.dt_min, self.dt_max);
        self.last = now;
        self.elapsed += dt.as_secs_f64();

        let tick = Tick {
            index: self.index,
            dt: dt.as_secs_f32(),
            elapsed: self.elapsed,
        };
        self.index = self.index.wrapping_add(1);
        tick
    }

    /// Ticks produced so far.
    #[inline]
    pub fn frames(&self) -> u64 {
        self.index
    }
}

impl Default for FrameTicker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_count_up_from_zero() {
        let mut ticker = FrameTicker::new();
        assert_eq!(ticker.tick().index, 0);
        assert_eq!(ticker.tick().index, 1);
        assert_eq!(ticker.frames(), 2);
    }

    #[test]
    fn delta_is_clamped_both_ways() {
        let mut ticker = FrameTicker::with_clamps(Duration::from_millis(1), Duration::from_millis(100));
        let start = ticker.last;

        let stalled = ticker.tick_at(start + Duration::from_secs(5));
        assert!((stalled.dt - 0.1).abs() < 1e-6);

        let tight = ticker.tick_at(start + Duration::from_secs(5));
        assert!((tight.dt - 0.001).abs() < 1e-6);
    }

    #[test]
    fn elapsed_accumulates_clamped_deltas() {
        let mut ticker = FrameTicker::with_clamps(Duration::ZERO, Duration::from_millis(250));
        let start = ticker.last;
        ticker.tick_at(start + Duration::from_millis(100));
        let tick = ticker.tick_at(start + Duration::from_millis(300));
        assert!((tick.elapsed - 0.3).abs() < 1e-9);
    }
}
