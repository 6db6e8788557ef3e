//! States of the controller and requests to change them.

/// The current mode of the device.
///
/// The three live modes form a ring the user cycles through with short
/// presses: animation selection, color, brightness and back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    Off,
    Startup,
    Brightness,
    AnimationSelect,
    Color,
    Shutdown,
}

impl State {
    /// Whether the user is in control of the device.
    #[must_use]
    pub fn is_live(self) -> bool {
        matches!(
            self,
            State::Brightness | State::AnimationSelect | State::Color
        )
    }

    /// The state a short press leads to.
    #[must_use]
    pub fn next_in_ring(self) -> Option<State> {
        match self {
            State::AnimationSelect => Some(State::Color),
            State::Color => Some(State::Brightness),
            State::Brightness => Some(State::AnimationSelect),
            _ => None,
        }
    }
}

/// Origin of a state change request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Source {
    User,
    /// A power-on or power-off fade finished.
    Overlay,
    Idle,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Request {
    pub target: State,
    pub source: Source,
    pub requested_at: u32,
}
