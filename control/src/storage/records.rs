//! Concrete records persisted by the controller and the registry.

use core::fmt::Write;

use heapless::String;
use lumen_render::ColorConfig;

use super::{Record, MAX_KEY_LEN};

/// Device-wide settings restored on boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AppConfig {
    pub master_brightness: u16,
    pub power_on: bool,
}

impl Record for AppConfig {
    const SIZE: usize = 3;

    fn write_bytes(&self, buffer: &mut [u8]) {
        buffer[..2].copy_from_slice(&self.master_brightness.to_le_bytes());
        buffer[2] = u8::from(self.power_on);
    }

    fn read_bytes(bytes: &[u8]) -> Self {
        Self {
            master_brightness: u16::from_le_bytes([bytes[0], bytes[1]]),
            power_on: bytes[2] != 0,
        }
    }
}

impl Record for ColorConfig {
    const SIZE: usize = 1;

    fn write_bytes(&self, buffer: &mut [u8]) {
        buffer[0] = self.hue;
    }

    fn read_bytes(bytes: &[u8]) -> Self {
        Self::with_hue(bytes[0])
    }
}

/// Bookkeeping of the animation registry.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegistryConfig {
    pub last_animation_id: u16,
}

impl Record for RegistryConfig {
    const SIZE: usize = 2;

    fn write_bytes(&self, buffer: &mut [u8]) {
        buffer.copy_from_slice(&self.last_animation_id.to_le_bytes());
    }

    fn read_bytes(bytes: &[u8]) -> Self {
        Self {
            last_animation_id: u16::from_le_bytes([bytes[0], bytes[1]]),
        }
    }
}

pub type AnimationKey = String<MAX_KEY_LEN>;

/// Key of the color record of an animation.
///
/// It is derived from the stable identifier, never from the position in the
/// list, so reordering animations keeps their colors.
#[must_use]
pub fn animation_key(id: u16) -> AnimationKey {
    let mut key = AnimationKey::new();
    // At most 6 characters, always fits.
    let _ = write!(key, "a{id:05}");
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_config_is_stored_little_endian() {
        let config = AppConfig {
            master_brightness: 0x0102,
            power_on: true,
        };
        let mut buffer = [0; AppConfig::SIZE];
        config.write_bytes(&mut buffer);
        assert_eq!(buffer, [0x02, 0x01, 0x01]);
        assert_eq!(AppConfig::read_bytes(&buffer), config);
    }

    #[test]
    fn any_nonzero_power_byte_means_on() {
        let config = AppConfig::read_bytes(&[0, 0, 7]);
        assert!(config.power_on);
    }

    #[test]
    fn color_config_is_a_single_hue_byte() {
        let mut buffer = [0; 1];
        ColorConfig::with_hue(120).write_bytes(&mut buffer);
        assert_eq!(buffer, [120]);
    }

    #[test]
    fn registry_config_keeps_the_whole_identifier() {
        let config = RegistryConfig {
            last_animation_id: 65_000,
        };
        let mut buffer = [0; RegistryConfig::SIZE];
        config.write_bytes(&mut buffer);
        assert_eq!(RegistryConfig::read_bytes(&buffer), config);
    }

    #[test]
    fn animation_key_is_zero_padded_identifier() {
        assert_eq!(animation_key(42).as_str(), "a00042");
        assert_eq!(animation_key(0).as_str(), "a00000");
        assert_eq!(animation_key(u16::MAX).as_str(), "a65535");
    }
}
