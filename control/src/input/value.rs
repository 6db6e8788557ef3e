//! The bounded value controlled by turning the encoder.

/// Integer dialed in by the encoder.
///
/// The same physical dial means something else in every mode, so the range
/// gets reconfigured whenever the mode changes. With `wrap` enabled the
/// value rolls over between the bounds, otherwise it sticks to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputValue {
    value: i32,
    min: i32,
    max: i32,
    wrap: bool,
}

impl Default for InputValue {
    fn default() -> Self {
        Self::new(0, 127, false)
    }
}

impl InputValue {
    #[must_use]
    pub fn new(min: i32, max: i32, wrap: bool) -> Self {
        let mut value = Self {
            value: 0,
            min: 0,
            max: 0,
            wrap,
        };
        value.set_range(min, max, wrap);
        value.value = value.min;
        value
    }

    /// Reconfigure the bounds, pulling the current value into them.
    pub fn set_range(&mut self, min: i32, max: i32, wrap: bool) {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        self.min = min;
        self.max = max;
        self.wrap = wrap;
        self.value = self.value.clamp(min, max);
    }

    pub fn set(&mut self, value: i32) {
        self.value = value.clamp(self.min, self.max);
    }

    #[must_use]
    pub fn get(&self) -> i32 {
        self.value
    }

    #[must_use]
    pub fn min(&self) -> i32 {
        self.min
    }

    #[must_use]
    pub fn max(&self) -> i32 {
        self.max
    }

    #[must_use]
    pub fn wraps(&self) -> bool {
        self.wrap
    }

    /// Move the value by `delta`, returning whether it changed.
    pub fn apply(&mut self, delta: i32) -> bool {
        let old = self.value;
        self.value = if self.wrap {
            let span = i64::from(self.max) - i64::from(self.min) + 1;
            let offset = i64::from(self.value) - i64::from(self.min) + i64::from(delta);
            (i64::from(self.min) + offset.rem_euclid(span)) as i32
        } else {
            self.value.saturating_add(delta).clamp(self.min, self.max)
        };
        self.value != old
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    #[test]
    fn when_clamped_it_sticks_to_the_bounds() {
        let mut value = InputValue::new(0, 30, false);
        assert!(!value.apply(-1));
        assert_eq!(value.get(), 0);
        assert!(value.apply(100));
        assert_eq!(value.get(), 30);
        assert!(!value.apply(1));
    }

    #[test]
    fn when_wrapping_it_rolls_over_in_both_directions() {
        let mut value = InputValue::new(0, 4, true);
        value.set(4);
        assert!(value.apply(1));
        assert_eq!(value.get(), 0);
        assert!(value.apply(-1));
        assert_eq!(value.get(), 4);
        assert!(value.apply(-7));
        assert_eq!(value.get(), 2);
    }

    #[test]
    fn when_range_has_a_single_value_wrapping_never_changes_it() {
        let mut value = InputValue::new(3, 3, true);
        assert!(!value.apply(1));
        assert!(!value.apply(-5));
        assert_eq!(value.get(), 3);
    }

    #[test]
    fn when_range_changes_the_value_is_pulled_into_it() {
        let mut value = InputValue::new(0, 127, false);
        value.set(100);
        value.set_range(0, 30, false);
        assert_eq!(value.get(), 30);
    }

    #[test]
    fn when_bounds_are_swapped_they_get_sorted() {
        let value = InputValue::new(10, -10, false);
        assert_eq!(value.min(), -10);
        assert_eq!(value.max(), 10);
    }

    #[test]
    fn extreme_deltas_do_not_overflow() {
        let mut value = InputValue::new(i32::MIN, i32::MAX, true);
        value.set(i32::MAX);
        assert!(value.apply(1));
        assert_eq!(value.get(), i32::MIN);

        let mut value = InputValue::new(0, 10, false);
        value.set(10);
        value.apply(i32::MAX);
        assert_eq!(value.get(), 10);
    }

    proptest! {
        #[test]
        fn clamped_value_never_leaves_its_range(
            min in -1000_i32..1000,
            span in 0_i32..1000,
            deltas in proptest::collection::vec(-5000_i32..5000, 0..50),
        ) {
            let mut value = InputValue::new(min, min + span, false);
            for delta in deltas {
                value.apply(delta);
                prop_assert!(value.get() >= min && value.get() <= min + span);
            }
        }

        #[test]
        fn wrapped_value_is_congruent_with_the_cumulative_delta(
            min in -1000_i32..1000,
            span in 0_i32..1000,
            deltas in proptest::collection::vec(-5000_i32..5000, 0..50),
        ) {
            let mut value = InputValue::new(min, min + span, true);
            let size = i64::from(span) + 1;
            let mut cumulative = 0_i64;
            for delta in deltas {
                value.apply(delta);
                cumulative += i64::from(delta);
                let offset = i64::from(value.get()) - i64::from(min);
                prop_assert_eq!(offset, cumulative.rem_euclid(size));
            }
        }
    }
}
