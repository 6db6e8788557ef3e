//! Manage button's state.

/// Edge of a debounced button signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    Pressed,
    Released,
}

/// Use this to filter contact bounces of the button.
///
/// Any change of the raw level restarts the guard timer. The level is only
/// accepted once it stayed the same for the whole guard interval.
#[derive(Debug, Default, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Debouncer {
    raw: bool,
    raw_since: u32,
    pub pressed: bool,
}

impl Debouncer {
    pub fn update(&mut self, down: bool, now: u32, guard: u32) -> Option<Edge> {
        if down != self.raw {
            self.raw = down;
            self.raw_since = now;
            return None;
        }

        if self.raw == self.pressed || now.wrapping_sub(self.raw_since) < guard {
            return None;
        }

        self.pressed = self.raw;
        if self.pressed {
            Some(Edge::Pressed)
        } else {
            Some(Edge::Released)
        }
    }
}
