//! Interface of animations shown on the display.

use crate::color::ColorConfig;
use crate::framebuffer::Framebuffer;

/// A renderable animation.
///
/// The registry in the control crate keeps a homogeneous list of these, so
/// firmware with multiple animations is expected to wrap them in an enum
/// and dispatch from there.
///
/// The color is owned by the registry and only lent to the animation.
pub trait Animation {
    /// Identifier persisted alongside the color. It must stay the same across
    /// firmware versions, even when animations get reordered.
    fn id(&self) -> u16;

    fn name(&self) -> &str;

    /// Color used when nothing was persisted yet.
    fn default_color(&self) -> ColorConfig {
        ColorConfig::default()
    }

    /// Called once, the first time the animation gets selected or preloaded.
    fn on_activate(&mut self, _color: &ColorConfig) {}

    /// Draw one frame. The caller takes care of committing it.
    fn render<F: Framebuffer>(&mut self, framebuffer: &mut F, color: &ColorConfig, now: u32);
}

/// Fill the whole matrix with a single color.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Solid {
    id: u16,
    default_hue: u8,
    saturation: u8,
}

impl Solid {
    #[must_use]
    pub const fn new(id: u16, default_hue: u8, saturation: u8) -> Self {
        Self {
            id,
            default_hue,
            saturation,
        }
    }
}

impl Animation for Solid {
    fn id(&self) -> u16 {
        self.id
    }

    fn name(&self) -> &str {
        "solid"
    }

    fn default_color(&self) -> ColorConfig {
        ColorConfig::with_hue(self.default_hue)
    }

    fn render<F: Framebuffer>(&mut self, framebuffer: &mut F, color: &ColorConfig, _now: u32) {
        for y in 0..framebuffer.height() {
            for x in 0..framebuffer.width() {
                framebuffer.set_pixel(x, y, color.hue, self.saturation, 255);
            }
        }
    }
}
