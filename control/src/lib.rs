//! Control core of a rotary encoder driven LED display.
//!
//! It turns the noisy encoder pins into a clean stream of user intents,
//! runs them through the state machine of power, brightness, color and
//! animation modes, and keeps the configuration persisted.
//!
//! The firmware is expected to call the controller from a single loop,
//! owning all the pieces and lending it the framebuffer for each tick:
//!
//! ```text
//!   [ Pins ] --(Snapshot)--> [ InputEngine ] --(Event)--+
//!                                                       |
//!                                                       V
//!   [ Framebuffer ] <--(frame)-- [ Controller ] --> [ Registry ]
//!                                      |                 |
//!                                      +--> {ConfigStore} <--+
//! ```

#![cfg_attr(not(test), no_std)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_precision_loss)]

#[cfg(test)]
#[macro_use]
extern crate approx;

pub mod controller;
pub mod dirty;
pub mod input;
mod log;
pub mod registry;
pub mod storage;

#[cfg(test)]
mod testing;

pub use controller::{Controller, ControllerConfig, Request, Source, State};
pub use dirty::{Autosave, DirtyTracker};
pub use input::{Event, InputConfig, InputEngine, InputValue, Snapshot};
pub use registry::Registry;
pub use storage::{
    AppConfig, ConfigStore, MemoryStore, Record, RegistryConfig, StoreError,
};
