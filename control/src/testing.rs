//! Doubles of the rendering collaborators.

use lumen_render::{Animation, ColorConfig, Framebuffer};

pub const WIDTH: u16 = 8;
pub const HEIGHT: u16 = 2;

/// Framebuffer remembering what was drawn and how often it was pushed out.
#[derive(Debug, Default)]
pub struct Recorder {
    pub pixels: [[u8; WIDTH as usize]; HEIGHT as usize],
    pub hues: [[u8; WIDTH as usize]; HEIGHT as usize],
    pub commits: usize,
    pub clears: usize,
    pub brightness: Option<u8>,
}

impl Recorder {
    pub fn lit(&self) -> usize {
        self.pixels.iter().flatten().filter(|v| **v > 0).count()
    }
}

impl Framebuffer for Recorder {
    fn width(&self) -> u16 {
        WIDTH
    }

    fn height(&self) -> u16 {
        HEIGHT
    }

    fn clear(&mut self) {
        self.clears += 1;
        self.pixels = Default::default();
        self.hues = Default::default();
    }

    fn commit(&mut self) {
        self.commits += 1;
    }

    fn set_pixel(&mut self, x: u16, y: u16, hue: u8, _saturation: u8, value: u8) {
        if x >= WIDTH || y >= HEIGHT {
            return;
        }
        self.pixels[y as usize][x as usize] = value;
        self.hues[y as usize][x as usize] = hue;
    }

    fn set_global_brightness(&mut self, level: u8) {
        self.brightness = Some(level);
    }
}

/// Animation counting how it was used.
#[derive(Debug)]
pub struct Probe {
    pub id: u16,
    pub default_hue: u8,
    pub activations: usize,
    pub renders: usize,
    pub last_hue: Option<u8>,
}

impl Probe {
    pub fn new(id: u16) -> Self {
        Self {
            id,
            default_hue: 0,
            activations: 0,
            renders: 0,
            last_hue: None,
        }
    }
}

impl Animation for Probe {
    fn id(&self) -> u16 {
        self.id
    }

    fn name(&self) -> &str {
        "probe"
    }

    fn default_color(&self) -> ColorConfig {
        ColorConfig::with_hue(self.default_hue)
    }

    fn on_activate(&mut self, _color: &ColorConfig) {
        self.activations += 1;
    }

    fn render<F: Framebuffer>(&mut self, framebuffer: &mut F, color: &ColorConfig, _now: u32) {
        self.renders += 1;
        self.last_hue = Some(color.hue);
        framebuffer.set_pixel(0, 0, color.hue, 255, 255);
    }
}
