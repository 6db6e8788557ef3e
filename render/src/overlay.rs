//! Progress bar drawn over the animation during power transitions.

use crate::framebuffer::Framebuffer;

/// Fill the matrix column by column from left to right.
///
/// With `progress` of 0 nothing is lit, with 255 every column is. The column
/// on the boundary is partially dimmed, so the bar glides smoothly instead
/// of jumping a whole column at a time.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProgressFill {
    hue: u8,
    saturation: u8,
    value: u8,
    progress: u8,
}

impl ProgressFill {
    #[must_use]
    pub const fn new(hue: u8, saturation: u8, value: u8) -> Self {
        Self {
            hue,
            saturation,
            value,
            progress: 0,
        }
    }

    pub fn set_progress(&mut self, progress: u8) {
        self.progress = progress;
    }

    #[must_use]
    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn render<F: Framebuffer>(&self, framebuffer: &mut F) {
        framebuffer.clear();

        let width = u32::from(framebuffer.width());
        let scaled = u32::from(self.progress) * width;
        let filled_columns = scaled / 255;
        let remainder = scaled % 255;

        for x in 0..width {
            let column_value = if x < filled_columns {
                self.value
            } else if x == filled_columns {
                (remainder * u32::from(self.value) / 255) as u8
            } else {
                0
            };
            if column_value == 0 {
                continue;
            }
            for y in 0..framebuffer.height() {
                framebuffer.set_pixel(x as u16, y, self.hue, self.saturation, column_value);
            }
        }
    }
}
