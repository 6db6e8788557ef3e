//! Per-animation color settings.

/// Color tweak of an animation, changed by the user in the color mode.
///
/// Only the hue is adjustable at the moment. Saturation and value are
/// decided by the animation itself, and the final brightness is controlled
/// globally through the framebuffer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ColorConfig {
    pub hue: u8,
}

impl ColorConfig {
    #[must_use]
    pub const fn with_hue(hue: u8) -> Self {
        Self { hue }
    }
}
