//! Process the encoder's pins over time.

use heapless::Vec;

use super::button::{Debouncer, Edge};
use super::quadrature::{Decoder, REST};
use super::snapshot::Snapshot;
use super::value::InputValue;
use super::velocity::VelocityEstimator;

/// Discrete event produced by a single poll.
///
/// Rotation events carry the value after the range was applied, not the
/// delta, so listeners never need to track the value themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    Increment(i32),
    Decrement(i32),
    PressStart,
    PressEnd,
}

/// One poll yields at most one rotation and one button event.
pub type Events = Vec<Event, 4>;

/// Tunables of the input processing.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputConfig {
    /// Base change of the value per detent.
    pub steps: u16,
    /// How long the button must hold a level before it is accepted.
    pub debounce_ms: u32,
    /// Step intervals at or under this turn on the fast multiplier.
    pub fast_interval_ms: u32,
    pub medium_interval_ms: u32,
    pub fast_multiplier: u8,
    pub medium_multiplier: u8,
    /// Share of the newest measurement in the smoothed velocity.
    pub smoothing: f32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            steps: 1,
            debounce_ms: 50,
            fast_interval_ms: 40,
            medium_interval_ms: 100,
            fast_multiplier: 3,
            medium_multiplier: 2,
            smoothing: 0.6,
        }
    }
}

/// Stateful processor of the encoder.
///
/// It turns the raw snapshot into an accelerated, bounded value and a
/// stream of events. Whether rotation during a button press means anything
/// is up to the caller, both are decoded independently here.
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputEngine {
    config: InputConfig,
    decoder: Decoder,
    velocity: VelocityEstimator,
    button: Debouncer,
    value: InputValue,
    acceleration: bool,
}

impl Default for InputEngine {
    fn default() -> Self {
        Self::new(InputConfig::default())
    }
}

impl InputEngine {
    #[must_use]
    pub fn new(config: InputConfig) -> Self {
        Self {
            config: InputConfig {
                steps: config.steps.max(1),
                ..config
            },
            decoder: Decoder::with_reference(REST),
            velocity: VelocityEstimator::new(config.smoothing),
            button: Debouncer::default(),
            value: InputValue::default(),
            acceleration: true,
        }
    }

    pub fn poll(&mut self, snapshot: Snapshot, now: u32) -> Events {
        let mut events = Events::new();

        let detents = self.decoder.update(snapshot.quadrature());
        if detents != 0 {
            if let Some(event) = self.rotate(detents, now) {
                let _ = events.push(event);
            }
        }

        match self.button.update(snapshot.button, now, self.config.debounce_ms) {
            Some(Edge::Pressed) => {
                let _ = events.push(Event::PressStart);
            }
            Some(Edge::Released) => {
                let _ = events.push(Event::PressEnd);
            }
            None => (),
        }

        events
    }

    fn rotate(&mut self, detents: i8, now: u32) -> Option<Event> {
        let count = u32::from(detents.unsigned_abs());
        self.velocity.step(now, count);

        let delta =
            i32::from(detents) * i32::from(self.config.steps) * i32::from(self.multiplier());
        if !self.value.apply(delta) {
            return None;
        }

        let value = self.value.get();
        if detents > 0 {
            Some(Event::Increment(value))
        } else {
            Some(Event::Decrement(value))
        }
    }

    fn multiplier(&self) -> u8 {
        if !self.acceleration {
            return 1;
        }
        match self.velocity.interval() {
            Some(interval) if interval <= self.config.fast_interval_ms as f32 => {
                self.config.fast_multiplier
            }
            Some(interval) if interval <= self.config.medium_interval_ms as f32 => {
                self.config.medium_multiplier
            }
            _ => 1,
        }
    }

    pub fn set_range(&mut self, min: i32, max: i32, wrap: bool) {
        self.value.set_range(min, max, wrap);
    }

    pub fn set_value(&mut self, value: i32) {
        self.value.set(value);
    }

    #[must_use]
    pub fn value(&self) -> i32 {
        self.value.get()
    }

    #[must_use]
    pub fn range(&self) -> &InputValue {
        &self.value
    }

    pub fn set_acceleration(&mut self, enabled: bool) {
        self.acceleration = enabled;
    }

    #[must_use]
    pub fn acceleration(&self) -> bool {
        self.acceleration
    }

    pub fn set_acceleration_thresholds(&mut self, medium_ms: u32, fast_ms: u32) {
        self.config.medium_interval_ms = medium_ms;
        self.config.fast_interval_ms = fast_ms;
    }

    pub fn set_acceleration_multipliers(&mut self, medium: u8, fast: u8) {
        self.config.medium_multiplier = medium;
        self.config.fast_multiplier = fast;
    }

    pub fn set_steps(&mut self, steps: u16) {
        self.config.steps = steps.max(1);
    }

    /// Whether the debounced button is currently held down.
    #[must_use]
    pub fn is_pressed(&self) -> bool {
        self.button.pressed
    }

    /// Drop everything the previous mode could leak into the next one.
    ///
    /// The button and the value are kept.
    pub fn reset_context(&mut self) {
        self.decoder.reset();
        self.velocity.reset();
    }
}
