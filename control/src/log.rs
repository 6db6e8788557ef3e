//! Logging forwarded to `defmt` when the feature is enabled.
//!
//! Without the feature the arguments are only borrowed, so bindings kept
//! for logging do not turn into unused variables.

macro_rules! info {
    ( $fmt:literal $(, $arg:expr)* $(,)? ) => {
        #[cfg(feature = "defmt")]
        defmt::info!($fmt $(, $arg)*);
        #[cfg(not(feature = "defmt"))]
        {
            $( let _ = &$arg; )*
        }
    };
}

// Named to stay clear of the built-in `warn` attribute.
macro_rules! warning {
    ( $fmt:literal $(, $arg:expr)* $(,)? ) => {
        #[cfg(feature = "defmt")]
        defmt::warn!($fmt $(, $arg)*);
        #[cfg(not(feature = "defmt"))]
        {
            $( let _ = &$arg; )*
        }
    };
}

macro_rules! debug {
    ( $fmt:literal $(, $arg:expr)* $(,)? ) => {
        #[cfg(feature = "defmt")]
        defmt::debug!($fmt $(, $arg)*);
        #[cfg(not(feature = "defmt"))]
        {
            $( let _ = &$arg; )*
        }
    };
}

pub(crate) use debug;
pub(crate) use info;
pub(crate) use warning;
