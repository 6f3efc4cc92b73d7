//! Wall-clock countdown
//!
//! A repeating task fed by wall-clock time, separate from the render tick's `dt`, so
//! time limits run at the same rate regardless of frame rate.

/// Repeating fixed-period task
#[derive(Debug, Clone, PartialEq)]
pub struct Countdown {
    period: f32,
    elapsed: f32,
    armed: bool,
}

impl Countdown {
    pub fn new(period: f32) -> Self {
        Self {
            period: period.max(f32::EPSILON),
            elapsed: 0.0,
            armed: false,
        }
    }

    /// Start (or restart) from a full period
    pub fn arm(&mut self) {
        self.elapsed = 0.0;
        self.armed = true;
    }

    /// Stop firing. Pending partial time is dropped.
    pub fn cancel(&mut self) {
        self.elapsed = 0.0;
        self.armed = false;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Feed wall-clock time, returning how many periods completed
    pub fn advance(&mut self, wall_dt: f32) -> u32 {
        if !self.armed || !wall_dt.is_finite() || wall_dt <= 0.0 {
            return 0;
        }
        self.elapsed += wall_dt;
        let fired = (self.elapsed / self.period).floor();
        self.elapsed %= self.period;
        // Float-to-int `as` saturates
        fired as u32
    }
}
