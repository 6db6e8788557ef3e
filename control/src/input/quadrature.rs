//! Decode rotation from the two quadrature lines.
//!
//! The lines are sampled as `AB`. Turning clockwise walks through
//!
//! ```text
//!   11 -> 01 -> 00 -> 10 -> 11
//! ```
//!
//! and counter-clockwise the other way around. Any other change, such as
//! both lines flipping at once, is a bounce and carries no direction.
//!
//! The encoder has a detent on every other state, so two valid transitions
//! in the same direction make one logical step.

/// Direction of a transition, indexed by `previous << 2 | current`.
const TRANSITIONS: [i8; 16] = [
    0,  // 00 -> 00
    -1, // 00 -> 01
    1,  // 00 -> 10
    0,  // 00 -> 11
    1,  // 01 -> 00
    0,  // 01 -> 01
    0,  // 01 -> 10
    -1, // 01 -> 11
    -1, // 10 -> 00
    0,  // 10 -> 01
    0,  // 10 -> 10
    1,  // 10 -> 11
    0,  // 11 -> 00
    1,  // 11 -> 01
    -1, // 11 -> 10
    0,  // 11 -> 11
];

const MICRO_STEPS_PER_DETENT: i8 = 2;

/// Both lines are pulled up while the encoder rests in a detent.
pub const REST: u8 = 0b11;

/// Per-encoder decoding state.
///
/// The first sample only serves as a reference, it never produces a step.
#[derive(Debug, Default, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Decoder {
    previous: Option<u8>,
    accumulated: i8,
}

impl Decoder {
    /// Start from the given reference instead of waiting for the first sample.
    #[must_use]
    pub const fn with_reference(sample: u8) -> Self {
        Self {
            previous: Some(sample & 0b11),
            accumulated: 0,
        }
    }

    /// Feed a new `0bAB` sample, returning the number of completed detents.
    ///
    /// Positive result means clockwise rotation. Partial progress towards
    /// the next detent is kept for the following samples.
    pub fn update(&mut self, sample: u8) -> i8 {
        let sample = sample & 0b11;
        let Some(previous) = self.previous.replace(sample) else {
            return 0;
        };
        if previous == sample {
            return 0;
        }

        let micro_step = TRANSITIONS[usize::from((previous << 2) | sample)];
        if micro_step == 0 {
            return 0;
        }

        self.accumulated += micro_step;
        let detents = self.accumulated / MICRO_STEPS_PER_DETENT;
        self.accumulated -= detents * MICRO_STEPS_PER_DETENT;
        detents
    }

    /// Forget partial progress, keeping the reference sample.
    pub fn reset(&mut self) {
        self.accumulated = 0;
    }

    #[must_use]
    pub fn accumulated(&self) -> i8 {
        self.accumulated
    }
}
