//! The top-level state machine of the device.
//!
//! Every control cycle the hardware binding calls [`Controller::tick`] with
//! the current pins and a framebuffer. The controller interprets the input
//! according to its state, decides what to show, and keeps the persisted
//! configuration in sync.
//!
//! State changes are never applied directly. Whoever wants one, be it the
//! user, an idle timer, a finished fade or the system, files a [`Request`]
//! tagged with its [`Source`]. At most one request waits at a time and it is
//! applied at the very end of a tick, after the frame was rendered.

mod config;
mod fade;
mod state;

pub use config::ControllerConfig;
pub use fade::{Direction, Fade};
pub use state::{Request, Source, State};

use lumen_render::{Animation, Framebuffer, Gamma, ProgressFill};

use crate::dirty::DirtyTracker;
use crate::input::{Event, InputEngine, Snapshot};
use crate::log;
use crate::registry::Registry;
use crate::storage::{
    load_record, save_record, AppConfig, ConfigStore, StoreError, APP_NAMESPACE, CONFIG_KEY,
};

const STARTUP_FILL: ProgressFill = ProgressFill::new(0, 0, 255);
const POWEROFF_FILL: ProgressFill = ProgressFill::new(0, 255, 255);

/// The button as seen by the controller.
#[derive(Debug, Default, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
struct Press {
    started_at: u32,
    token: u32,
}

/// Owner of the whole control loop.
///
/// The input engine, the registry of `N` animations and the store are owned
/// here. The framebuffer is only borrowed for each tick.
#[derive(Debug)]
pub struct Controller<A, S, const N: usize> {
    config: ControllerConfig,
    state: State,
    pending: Option<Request>,
    last_change: Option<(Source, u32)>,

    input: InputEngine,
    registry: Registry<A, N>,
    store: S,

    gamma: Gamma,
    app: AppConfig,
    saved_app: AppConfig,
    app_tracker: DirtyTracker,
    brightness_stale: bool,

    press: Option<Press>,
    last_button_edge: Option<u32>,
    next_token: u32,
    handled_token: Option<u32>,
    rotation_blocked: bool,
    block_rotation_next_tick: bool,
    last_activity: u32,

    startup: Fade,
    startup_full_at: Option<u32>,
    poweroff: Option<Fade>,
    last_tick: Option<u32>,
    last_frame: Option<u32>,
}

impl<A: Animation, S: ConfigStore, const N: usize> Controller<A, S, N> {
    #[must_use]
    pub fn new(config: ControllerConfig, registry: Registry<A, N>, store: S) -> Self {
        let (min_brightness, _) = config.brightness_range();
        let app = AppConfig {
            master_brightness: u16::from(min_brightness),
            power_on: true,
        };
        Self {
            config,
            state: State::Off,
            pending: None,
            last_change: None,
            input: InputEngine::new(config.input),
            registry,
            store,
            gamma: Gamma::new(config.gamma),
            app,
            saved_app: app,
            app_tracker: DirtyTracker::default(),
            brightness_stale: true,
            press: None,
            last_button_edge: None,
            next_token: 0,
            handled_token: None,
            rotation_blocked: false,
            block_rotation_next_tick: false,
            last_activity: 0,
            startup: Fade::new(Direction::In, 0),
            startup_full_at: None,
            poweroff: None,
            last_tick: None,
            last_frame: None,
        }
    }

    /// Restore the persisted configuration and enter the initial state.
    ///
    /// Without any saved configuration the device starts powered on with
    /// the lowest brightness.
    pub fn begin<F: Framebuffer>(&mut self, now: u32, framebuffer: &mut F) {
        let (min, max) = self.config.brightness_range();
        if let Some(mut app) = load_record::<_, AppConfig>(&mut self.store, APP_NAMESPACE, CONFIG_KEY)
        {
            app.master_brightness = app
                .master_brightness
                .clamp(u16::from(min), u16::from(max));
            self.saved_app = app;
            self.app = app;
        } else {
            log::info!("No app config found, starting with defaults");
        }
        log::info!(
            "Restored brightness={} power_on={}",
            self.app.master_brightness,
            self.app.power_on
        );

        self.registry.init(&mut self.store);

        framebuffer.set_global_brightness(self.gamma.apply(self.brightness()));
        self.brightness_stale = false;

        let initial = if self.app.power_on {
            State::Startup
        } else {
            State::Off
        };
        self.enter(initial, Source::System, now, framebuffer);
    }

    /// Run one control cycle.
    pub fn tick<F: Framebuffer>(&mut self, snapshot: Snapshot, now: u32, framebuffer: &mut F) {
        self.rotation_blocked = self.block_rotation_next_tick;
        self.block_rotation_next_tick = false;

        for event in self.input.poll(snapshot, now) {
            self.dispatch(event, now);
        }

        let elapsed = self.last_tick.map_or(0, |last| now.wrapping_sub(last));
        self.last_tick = Some(now);
        self.advance_overlays(elapsed, now);

        self.check_idle(now);
        self.autosave_app(now);
        self.registry.update(&mut self.store, now);

        if self.frame_due(now) {
            self.render(framebuffer, now);
        }

        if let Some(request) = self.pending.take() {
            self.enter(request.target, request.source, now, framebuffer);
        }
    }

    fn dispatch(&mut self, event: Event, now: u32) {
        match event {
            Event::PressStart => self.press_started(now),
            Event::PressEnd => self.press_ended(now),
            Event::Increment(value) | Event::Decrement(value) => self.rotated(value, now),
        }
    }

    fn press_started(&mut self, now: u32) {
        if let Some(edge) = self.last_button_edge {
            if now.wrapping_sub(edge) < self.config.button_guard_ms {
                log::debug!("Ignoring press within the button guard");
                return;
            }
        }

        self.last_button_edge = Some(now);
        self.last_activity = now;
        self.press = Some(Press {
            started_at: now,
            token: self.next_token,
        });
        self.next_token = self.next_token.wrapping_add(1);
    }

    fn press_ended(&mut self, now: u32) {
        // Release of an ignored press is ignored too.
        let Some(press) = self.press.take() else {
            return;
        };
        self.last_button_edge = Some(now);
        self.last_activity = now;

        let held = now.wrapping_sub(press.started_at);
        let long = held >= self.config.shutdown_threshold_ms;

        if self.state == State::Off {
            if held < self.config.poweroff_preview_start_ms {
                self.request_for_click(press.token, State::Startup, now);
            } else {
                log::debug!("Hold of {}ms is not a click, staying off", held);
            }
            return;
        }

        if !self.state.is_live() {
            return;
        }

        if long {
            if !self.request_for_click(press.token, State::Shutdown, now) {
                self.poweroff = None;
            }
        } else if held >= self.config.poweroff_preview_start_ms {
            log::debug!("Power-off preview cancelled");
            self.poweroff = None;
        } else if let Some(next) = self.state.next_in_ring() {
            if self.request_for_click(press.token, next, now) && self.state == State::Color {
                self.persist_current_color();
            }
        }
    }

    fn request_for_click(&mut self, token: u32, target: State, now: u32) -> bool {
        if self.handled_token == Some(token) {
            log::debug!("Click token={} was already handled", token);
            return false;
        }
        let accepted = self.request(target, Source::User, now);
        if accepted {
            self.handled_token = Some(token);
        }
        accepted
    }

    fn rotated(&mut self, value: i32, now: u32) {
        if self.rotation_blocked || self.press.is_some() {
            self.sync_input();
            return;
        }
        self.last_activity = now;

        match self.state {
            State::Brightness => self.set_brightness(self.config.brightness_for_ticks(value), now),
            State::AnimationSelect => {
                let index = usize::try_from(value).unwrap_or(0);
                self.registry.activate_index(&mut self.store, index, now);
            }
            State::Color => {
                let hue = self.config.hue_for_ticks(value);
                self.registry.set_current_hue(hue, now);
            }
            State::Off | State::Startup | State::Shutdown => (),
        }
    }

    fn set_brightness(&mut self, level: u8, now: u32) {
        let level = u16::from(level);
        if self.app.master_brightness == level {
            return;
        }
        self.app.master_brightness = level;
        self.brightness_stale = true;
        self.app_changed(now);
    }

    fn app_changed(&mut self, now: u32) {
        if self.app == self.saved_app {
            self.app_tracker.saved();
        } else {
            self.app_tracker.mark(now);
        }
    }

    /// File a request for a state change.
    ///
    /// Returns whether it was accepted. Rejected requests are dropped, the
    /// requester may try again on the next tick.
    pub fn request(&mut self, target: State, source: Source, now: u32) -> bool {
        let since_change = self
            .last_change
            .map(|(by, at)| (by, now.wrapping_sub(at)));
        let guard = self.config.state_guard_ms;

        if source == Source::User {
            if let Some((_, since)) = since_change {
                if since < guard {
                    log::info!("Rejecting {:?}: user request within guard", target);
                    return false;
                }
            }
        } else {
            if matches!(self.pending, Some(pending) if pending.source == Source::User) {
                log::info!("Rejecting {:?} from {:?}: user request pending", target, source);
                return false;
            }
            let terminal = source == Source::Overlay && target == State::Off;
            if let Some((Source::User, since)) = since_change {
                if since < guard && !terminal {
                    log::info!("Rejecting {:?} from {:?}: user change within guard", target, source);
                    return false;
                }
            }
        }

        if let Some(pending) = self.pending {
            log::info!(
                "Rejecting {:?} from {:?}: {:?} already pending",
                target,
                source,
                pending.target
            );
            return false;
        }

        if source == Source::User
            && self.state.is_live()
            && target != State::Shutdown
            && self.state.next_in_ring() != Some(target)
        {
            log::info!("Rejecting {:?}: out of ring order from {:?}", target, self.state);
            return false;
        }

        self.pending = Some(Request {
            target,
            source,
            requested_at: now,
        });
        true
    }

    fn persist_current_color(&mut self) {
        if let Err(error) = self.registry.save_current(&mut self.store) {
            log::warning!("Failed to persist color: {:?}", error);
        }
    }

    fn advance_overlays(&mut self, elapsed: u32, now: u32) {
        match self.state {
            State::Startup => {
                self.startup.step(
                    elapsed,
                    self.config.startup_fade_ms,
                    self.config.fade_max_step,
                );
                if !self.startup.is_complete() {
                    return;
                }
                let full_at = *self.startup_full_at.get_or_insert(now);
                if now.wrapping_sub(full_at) >= self.config.startup_settle_ms {
                    self.request(State::Brightness, Source::Overlay, now);
                }
            }
            State::Shutdown => {
                let Some(fade) = self.poweroff.as_mut() else {
                    self.request(State::Off, Source::Overlay, now);
                    return;
                };
                fade.step(
                    elapsed,
                    self.config.poweroff_fade_ms,
                    self.config.fade_max_step,
                );
                if fade.is_complete() {
                    self.request(State::Off, Source::Overlay, now);
                }
            }
            state if state.is_live() => self.preview_poweroff(now),
            _ => (),
        }
    }

    fn preview_poweroff(&mut self, now: u32) {
        let Some(press) = self.press else {
            return;
        };
        let held = now.wrapping_sub(press.started_at);
        let start = self.config.poweroff_preview_start_ms;
        if held < start {
            return;
        }
        let duration = u64::from(self.config.poweroff_fade_ms.max(1));
        let faded = (u64::from(held - start) * 255 / duration).min(255) as u8;
        self.poweroff = Some(Fade::new(Direction::Out, 255 - faded));
    }

    fn check_idle(&mut self, now: u32) {
        if !matches!(self.state, State::AnimationSelect | State::Color) {
            return;
        }
        if self.pending.is_some() || self.press.is_some() {
            return;
        }
        if now.wrapping_sub(self.last_activity) < self.config.idle_timeout_ms {
            return;
        }
        if self.request(State::Brightness, Source::Idle, now) {
            log::info!("Idle for too long, returning to brightness");
            if self.state == State::Color {
                self.persist_current_color();
            }
        }
    }

    fn autosave_app(&mut self, now: u32) {
        let autosave = self.config.autosave;
        if !self.app_tracker.due(now, autosave) {
            return;
        }
        log::debug!("Autosaving app config");
        match self.save_app() {
            Ok(()) => self.app_tracker.saved(),
            Err(error) => {
                log::warning!("Autosave of app config failed: {:?}", error);
                self.app_tracker.failed(now, autosave);
            }
        }
    }

    /// Write the app config unless the stored copy is already the same.
    fn save_app(&mut self) -> Result<(), StoreError> {
        if self.app == self.saved_app {
            return Ok(());
        }
        save_record(&mut self.store, APP_NAMESPACE, CONFIG_KEY, &self.app)?;
        self.saved_app = self.app;
        Ok(())
    }

    /// Persist everything unsaved right away.
    ///
    /// # Errors
    ///
    /// Returns the last error of the store. Whatever failed stays dirty and
    /// is retried by the autosave.
    pub fn force_save(&mut self) -> Result<(), StoreError> {
        let registry = self.registry.force_save(&mut self.store);
        let app = self.save_app();
        if app.is_ok() {
            self.app_tracker.saved();
        }
        registry.and(app)
    }

    fn frame_due(&mut self, now: u32) -> bool {
        let due = self
            .last_frame
            .map_or(true, |last| now.wrapping_sub(last) >= self.config.frame_interval_ms());
        if due {
            self.last_frame = Some(now);
        }
        due
    }

    fn render<F: Framebuffer>(&mut self, framebuffer: &mut F, now: u32) {
        if self.state == State::Off {
            return;
        }

        if self.brightness_stale {
            framebuffer.set_global_brightness(self.gamma.apply(self.brightness()));
            self.brightness_stale = false;
        }

        if self.state == State::Startup {
            let mut fill = STARTUP_FILL;
            fill.set_progress(self.startup.progress());
            fill.render(framebuffer);
        } else if let Some(fade) = self.poweroff {
            let mut fill = POWEROFF_FILL;
            fill.set_progress(fade.progress());
            fill.render(framebuffer);
        } else if self.state == State::Shutdown {
            framebuffer.clear();
        } else {
            framebuffer.clear();
            self.registry.render(framebuffer, now);
        }
        framebuffer.commit();
    }

    fn enter<F: Framebuffer>(&mut self, target: State, source: Source, now: u32, framebuffer: &mut F) {
        log::info!("Entering {:?} from {:?} by {:?}", target, self.state, source);
        self.state = target;
        self.last_change = Some((source, now));
        self.last_activity = now;
        self.block_rotation_next_tick = true;
        self.input.reset_context();

        match target {
            State::Off => {
                self.poweroff = None;
                framebuffer.clear();
                framebuffer.commit();
                if let Err(error) = self.force_save() {
                    log::warning!("Failed to flush config before power off: {:?}", error);
                }
            }
            State::Startup => {
                self.startup = Fade::new(Direction::In, 0);
                self.startup_full_at = None;
                self.poweroff = None;
                self.app.power_on = true;
                self.app_changed(now);
            }
            State::Shutdown => {
                // Continue from wherever the preview got.
                let progress = self.poweroff.map_or(u8::MAX, |fade| fade.progress());
                self.poweroff = Some(Fade::new(Direction::Out, progress));
                self.app.power_on = false;
                self.app_changed(now);
            }
            State::Brightness | State::AnimationSelect | State::Color => {
                self.poweroff = None;
            }
        }

        self.sync_input();
    }

    /// Set range and value of the input to what the current state controls.
    fn sync_input(&mut self) {
        let (max, value, wrap, acceleration) = match self.state {
            State::Brightness => (
                i32::from(self.config.brightness_ticks()),
                self.config.ticks_for_brightness(self.brightness()),
                false,
                true,
            ),
            State::AnimationSelect => (
                i32::try_from(self.registry.len().saturating_sub(1)).unwrap_or(i32::MAX),
                i32::try_from(self.registry.current_index()).unwrap_or(0),
                true,
                false,
            ),
            State::Color => (
                i32::from(self.config.color_ticks()),
                self.config.ticks_for_hue(self.registry.current_hue()),
                false,
                true,
            ),
            State::Off | State::Startup | State::Shutdown => return,
        };
        self.input.set_acceleration(acceleration);
        self.input.set_range(0, max, wrap);
        self.input.set_value(value);
    }

    #[must_use]
    pub fn state(&self) -> State {
        self.state
    }

    #[must_use]
    pub fn pending(&self) -> Option<Request> {
        self.pending
    }

    /// Master brightness before the gamma correction.
    #[must_use]
    pub fn brightness(&self) -> u8 {
        self.app.master_brightness.min(u16::from(u8::MAX)) as u8
    }

    #[must_use]
    pub fn app_config(&self) -> AppConfig {
        self.app
    }

    /// Progress of the fade currently shown, if any.
    #[must_use]
    pub fn overlay_progress(&self) -> Option<u8> {
        match self.state {
            State::Startup => Some(self.startup.progress()),
            _ => self.poweroff.map(|fade| fade.progress()),
        }
    }

    #[must_use]
    pub fn registry(&self) -> &Registry<A, N> {
        &self.registry
    }

    #[must_use]
    pub fn input(&self) -> &InputEngine {
        &self.input
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}
