//! Abstraction of the rotary encoder with its push button.
//!
//! The hardware binding samples the pins into a [`Snapshot`] and feeds it to
//! [`InputEngine::poll`] on every control cycle. Decoding, debouncing and
//! acceleration all happen here, the caller only reacts to [`Event`]s.

mod button;
mod engine;
mod quadrature;
mod snapshot;
mod value;
mod velocity;

pub use button::{Debouncer, Edge};
pub use engine::{Event, Events, InputConfig, InputEngine};
pub use quadrature::{Decoder, REST};
pub use snapshot::Snapshot;
pub use value::InputValue;
pub use velocity::VelocityEstimator;
