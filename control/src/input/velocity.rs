//! Estimate how fast the encoder is being turned.

/// Smoothed rotation speed in steps per second.
///
/// Call `step` whenever logical steps were decoded. The estimate blends
/// the latest instantaneous speed into the previous one, leaning towards
/// the new value so the acceleration reacts quickly once the user starts
/// spinning the knob.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VelocityEstimator {
    weight: f32,
    smoothed: f32,
    last_step: Option<u32>,
}

impl Default for VelocityEstimator {
    fn default() -> Self {
        Self::new(0.6)
    }
}

impl VelocityEstimator {
    /// `weight` is the share of the newest measurement in the estimate.
    #[must_use]
    pub fn new(weight: f32) -> Self {
        Self {
            weight: weight.clamp(0.0, 1.0),
            smoothed: 0.0,
            last_step: None,
        }
    }

    /// Register `steps` decoded at `now` (milliseconds) and return the new
    /// estimate.
    pub fn step(&mut self, now: u32, steps: u32) -> f32 {
        if let Some(last_step) = self.last_step {
            let elapsed = now.wrapping_sub(last_step).max(1);
            let instant = steps as f32 * 1000.0 / elapsed as f32;
            self.smoothed = self.weight * instant + (1.0 - self.weight) * self.smoothed;
        }
        self.last_step = Some(now);
        self.smoothed
    }

    #[must_use]
    pub fn velocity(&self) -> f32 {
        self.smoothed
    }

    /// Average time between steps in milliseconds, if moving at all.
    #[must_use]
    pub fn interval(&self) -> Option<f32> {
        if self.smoothed > 0.0 {
            Some(1000.0 / self.smoothed)
        } else {
            None
        }
    }

    pub fn reset(&mut self) {
        self.smoothed = 0.0;
        self.last_step = None;
    }
}
