//! Rendering side of the display, driven by the control loop.
//!
//! The control crate never touches pixels directly. It talks to the LED
//! hardware through a [`Framebuffer`], asks the active [`Animation`] to draw
//! itself, and draws its own power-on and power-off fades through
//! [`ProgressFill`].
//!
//! ```text
//!   [ Controller ] --(which renderable)--> [ Animation | ProgressFill ]
//!         |                                           |
//!         +--(global brightness)--> [ Framebuffer ] <-+
//! ```

#![cfg_attr(not(test), no_std)]

pub mod animation;
pub mod color;
pub mod framebuffer;
pub mod gamma;
pub mod overlay;

pub use animation::{Animation, Solid};
pub use color::ColorConfig;
pub use framebuffer::Framebuffer;
pub use gamma::Gamma;
pub use overlay::ProgressFill;
