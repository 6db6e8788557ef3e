//! Tunables of the controller.

use crate::dirty::Autosave;
use crate::input::InputConfig;

/// Timing and range constants of the user interface.
///
/// All durations are in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControllerConfig {
    pub input: InputConfig,
    pub fps: u32,
    pub min_brightness: u8,
    pub max_brightness: u8,
    /// Detents needed to go from the lowest to the highest brightness.
    pub brightness_ticks: u16,
    /// Detents needed to go around the whole hue circle.
    pub color_ticks: u16,
    /// Leave animation selection and color editing after this long without
    /// any interaction.
    pub idle_timeout_ms: u32,
    pub autosave: Autosave,
    /// User requests are refused this long after any state change.
    pub state_guard_ms: u32,
    /// Presses starting this soon after the previous button edge are ignored.
    pub button_guard_ms: u32,
    pub startup_fade_ms: u32,
    /// The most a fade may progress within a single tick.
    pub fade_max_step: u8,
    /// Time spent at full startup progress before the controls unlock.
    pub startup_settle_ms: u32,
    /// Holding the button this long starts the power-off preview.
    pub poweroff_preview_start_ms: u32,
    /// Duration of a complete power-off fade, both the preview and the
    /// shutdown itself.
    pub poweroff_fade_ms: u32,
    /// Presses held at least this long turn the device off.
    pub shutdown_threshold_ms: u32,
    pub gamma: f32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            input: InputConfig::default(),
            fps: 30,
            min_brightness: 15,
            max_brightness: 255,
            brightness_ticks: 30,
            color_ticks: 60,
            idle_timeout_ms: 60_000,
            autosave: Autosave::default(),
            state_guard_ms: 250,
            button_guard_ms: 600,
            startup_fade_ms: 3000,
            fade_max_step: 16,
            startup_settle_ms: 500,
            poweroff_preview_start_ms: 500,
            poweroff_fade_ms: 2000,
            shutdown_threshold_ms: 2500,
            gamma: 2.2,
        }
    }
}

impl ControllerConfig {
    pub(crate) fn frame_interval_ms(&self) -> u32 {
        if self.fps == 0 {
            33
        } else {
            (1000 / self.fps).max(1)
        }
    }

    pub(crate) fn brightness_ticks(&self) -> u16 {
        self.brightness_ticks.max(1)
    }

    pub(crate) fn color_ticks(&self) -> u16 {
        self.color_ticks.max(1)
    }

    pub(crate) fn brightness_range(&self) -> (u8, u8) {
        if self.min_brightness <= self.max_brightness {
            (self.min_brightness, self.max_brightness)
        } else {
            (self.max_brightness, self.min_brightness)
        }
    }

    /// Brightness level of the given position of the dial.
    pub(crate) fn brightness_for_ticks(&self, ticks: i32) -> u8 {
        let (min, max) = self.brightness_range();
        let total = u32::from(self.brightness_ticks());
        let ticks = ticks.clamp(0, total as i32) as u32;
        let span = u32::from(max - min);
        (u32::from(min) + div_round(ticks * span, total)) as u8
    }

    /// Position of the dial closest to the given brightness level.
    pub(crate) fn ticks_for_brightness(&self, level: u8) -> i32 {
        let (min, max) = self.brightness_range();
        let span = u32::from(max - min);
        if span == 0 {
            return 0;
        }
        let level = u32::from(level.clamp(min, max) - min);
        div_round(level * u32::from(self.brightness_ticks()), span) as i32
    }

    pub(crate) fn hue_for_ticks(&self, ticks: i32) -> u8 {
        let total = u32::from(self.color_ticks());
        let ticks = ticks.clamp(0, total as i32) as u32;
        div_round(ticks * 255, total) as u8
    }

    pub(crate) fn ticks_for_hue(&self, hue: u8) -> i32 {
        div_round(u32::from(hue) * u32::from(self.color_ticks()), 255) as i32
    }
}

fn div_round(numerator: u32, denominator: u32) -> u32 {
    (numerator + denominator / 2) / denominator
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brightness_dial_covers_the_whole_range() {
        let config = ControllerConfig::default();
        assert_eq!(config.brightness_for_ticks(0), 15);
        assert_eq!(config.brightness_for_ticks(30), 255);
        assert_eq!(config.brightness_for_ticks(15), 135);
    }

    #[test]
    fn brightness_out_of_the_dial_is_clamped() {
        let config = ControllerConfig::default();
        assert_eq!(config.brightness_for_ticks(-3), 15);
        assert_eq!(config.brightness_for_ticks(100), 255);
    }

    #[test]
    fn brightness_converts_back_to_the_same_ticks() {
        let config = ControllerConfig::default();
        for ticks in 0..=30 {
            let level = config.brightness_for_ticks(ticks);
            assert_eq!(config.ticks_for_brightness(level), ticks);
        }
    }

    #[test]
    fn hue_converts_back_to_the_same_ticks() {
        let config = ControllerConfig::default();
        assert_eq!(config.hue_for_ticks(60), 255);
        for ticks in 0..=60 {
            let hue = config.hue_for_ticks(ticks);
            assert_eq!(config.ticks_for_hue(hue), ticks);
        }
    }

    #[test]
    fn degenerate_configuration_does_not_divide_by_zero() {
        let config = ControllerConfig {
            fps: 0,
            brightness_ticks: 0,
            color_ticks: 0,
            min_brightness: 100,
            max_brightness: 100,
            ..ControllerConfig::default()
        };
        assert_eq!(config.frame_interval_ms(), 33);
        assert_eq!(config.brightness_for_ticks(1), 100);
        assert_eq!(config.ticks_for_brightness(100), 0);
        assert_eq!(config.hue_for_ticks(1), 255);
    }
}
