//! Perceptual correction of the master brightness.

/// Lookup table mapping linear brightness to LED duty.
///
/// Human eye perceives brightness logarithmically, so without this the
/// lower half of the brightness dial would look nearly identical.
#[derive(Clone)]
pub struct Gamma {
    table: [u8; 256],
}

impl Gamma {
    #[must_use]
    pub fn new(gamma: f32) -> Self {
        let mut table = [0; 256];
        for (i, x) in table.iter_mut().enumerate() {
            let normalized = i as f32 / 255.0;
            let corrected = libm::roundf(libm::powf(normalized, gamma) * 255.0);
            *x = corrected.clamp(0.0, 255.0) as u8;
        }
        Self { table }
    }

    #[must_use]
    pub fn apply(&self, level: u8) -> u8 {
        self.table[level as usize]
    }
}

impl core::fmt::Debug for Gamma {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Gamma")
            .field("mid", &self.table[128])
            .finish()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Gamma {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Gamma(mid={})", self.table[128]);
    }
}
