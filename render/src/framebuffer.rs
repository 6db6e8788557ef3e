//! Write-only sink of pixels.

/// Pixel buffer of the LED matrix.
///
/// Colors are set in HSV with all components in `0..=255`. The global
/// brightness scales every pixel on its way to the hardware, so it can be
/// changed without redrawing. Nothing is shown until `commit` is called.
pub trait Framebuffer {
    fn width(&self) -> u16;

    fn height(&self) -> u16;

    /// Turn every pixel of the buffer black.
    fn clear(&mut self);

    /// Push the buffer to the hardware.
    fn commit(&mut self);

    /// Coordinates outside of the matrix must be ignored.
    fn set_pixel(&mut self, x: u16, y: u16, hue: u8, sat: u8, value: u8);

    fn set_global_brightness(&mut self, level: u8);
}

#[cfg(test)]
pub(crate) mod tests {
    use super::Framebuffer;

    pub(crate) const WIDTH: u16 = 8;
    pub(crate) const HEIGHT: u16 = 2;

    /// Keeps the last written value of each pixel.
    #[derive(Debug)]
    pub(crate) struct Matrix {
        pub pixels: [[(u8, u8, u8); WIDTH as usize]; HEIGHT as usize],
        pub commits: usize,
        pub brightness: u8,
    }

    impl Default for Matrix {
        fn default() -> Self {
            Self {
                pixels: [[(0, 0, 0); WIDTH as usize]; HEIGHT as usize],
                commits: 0,
                brightness: 255,
            }
        }
    }

    impl Matrix {
        pub fn value_at(&self, x: usize, y: usize) -> u8 {
            self.pixels[y][x].2
        }
    }

    impl Framebuffer for Matrix {
        fn width(&self) -> u16 {
            WIDTH
        }

        fn height(&self) -> u16 {
            HEIGHT
        }

        fn clear(&mut self) {
            self.pixels = [[(0, 0, 0); WIDTH as usize]; HEIGHT as usize];
        }

        fn commit(&mut self) {
            self.commits += 1;
        }

        fn set_pixel(&mut self, x: u16, y: u16, hue: u8, sat: u8, value: u8) {
            if x < WIDTH && y < HEIGHT {
                self.pixels[y as usize][x as usize] = (hue, sat, value);
            }
        }

        fn set_global_brightness(&mut self, level: u8) {
            self.brightness = level;
        }
    }
}
