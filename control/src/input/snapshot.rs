//! Structures used to pass the current state of the encoder pins.

/// The current state of the encoder's pins.
///
/// `Snapshot` is meant to be passed from the hardware binding to the control
/// package. It should pass raw levels, with one exception: the button is
/// reported as `true` when pressed, no matter whether the physical line is
/// pulled up or down.
///
/// Debouncing and quadrature decoding is done here, not by the caller.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Snapshot {
    pub a: bool,
    pub b: bool,
    pub button: bool,
}

impl Snapshot {
    /// Both quadrature lines packed as `0bAB`.
    #[must_use]
    pub fn quadrature(&self) -> u8 {
        (u8::from(self.a) << 1) | u8::from(self.b)
    }

    #[must_use]
    pub fn from_quadrature(state: u8, button: bool) -> Self {
        Self {
            a: state & 0b10 != 0,
            b: state & 0b01 != 0,
            button,
        }
    }
}
