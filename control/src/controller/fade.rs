//! Progress of the power-on and power-off fades.

/// Direction of a fade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    In,
    Out,
}

/// Progress in `0..=255` moving with the elapsed time.
///
/// Fractions of a unit are carried over to the next step, so even very
/// short ticks eventually move the fade. A single step never goes further
/// than `max_step`, a stalled tick would otherwise skip the whole fade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Fade {
    direction: Direction,
    progress: u8,
    remainder: u32,
}

impl Fade {
    #[must_use]
    pub fn new(direction: Direction, progress: u8) -> Self {
        Self {
            direction,
            progress,
            remainder: 0,
        }
    }

    pub fn step(&mut self, elapsed: u32, duration: u32, max_step: u8) {
        let duration = duration.max(1);
        let scaled = u64::from(elapsed) * 255 + u64::from(self.remainder);
        let delta = scaled / u64::from(duration);
        self.remainder = if delta > u64::from(max_step) {
            0
        } else {
            (scaled % u64::from(duration)) as u32
        };
        let delta = delta.min(u64::from(max_step)) as u8;

        self.progress = match self.direction {
            Direction::In => self.progress.saturating_add(delta),
            Direction::Out => self.progress.saturating_sub(delta),
        };
    }

    #[must_use]
    pub fn progress(&self) -> u8 {
        self.progress
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        match self.direction {
            Direction::In => self.progress == u8::MAX,
            Direction::Out => self.progress == 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fade_in_reaches_full_after_its_duration() {
        let mut fade = Fade::new(Direction::In, 0);
        for _ in 0..100 {
            fade.step(30, 3000, 16);
        }
        assert_eq!(fade.progress(), 255);
        assert!(fade.is_complete());
    }

    #[test]
    fn fade_out_continues_from_the_given_progress() {
        let mut fade = Fade::new(Direction::Out, 128);
        fade.step(200, 2000, 255);
        assert_eq!(fade.progress(), 128 - 25);
        assert!(!fade.is_complete());
    }

    #[test]
    fn short_ticks_still_move_the_fade() {
        let mut fade = Fade::new(Direction::In, 0);
        for _ in 0..100 {
            fade.step(1, 3000, 16);
        }
        assert_eq!(fade.progress(), 8);
    }

    #[test]
    fn long_tick_is_capped() {
        let mut fade = Fade::new(Direction::In, 0);
        fade.step(10_000, 3000, 16);
        assert_eq!(fade.progress(), 16);
    }

    #[test]
    fn zero_duration_does_not_divide_by_zero() {
        let mut fade = Fade::new(Direction::Out, 255);
        fade.step(5, 0, 255);
        assert!(fade.is_complete());
    }
}
