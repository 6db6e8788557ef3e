//! Ordered set of animations with lazily loaded and autosaved colors.

use heapless::Vec;
use lumen_render::{Animation, ColorConfig, Framebuffer};

use crate::dirty::{Autosave, DirtyTracker};
use crate::log;
use crate::storage::{
    animation_key, load_record, save_record, ConfigStore, RegistryConfig, StoreError,
    ANIMATION_NAMESPACE, CONFIG_KEY, REGISTRY_NAMESPACE,
};

/// Bookkeeping wrapped around every animation.
///
/// The animation only ever gets the color lent for rendering, activation
/// and persistence stay in the hands of the registry.
#[derive(Debug)]
struct Slot<A> {
    animation: A,
    color: ColorConfig,
    activated: bool,
    tracker: DirtyTracker,
}

/// Owner of all the animations, `N` at most.
///
/// Animations are added once during setup and never removed. An animation
/// gets activated the first time it is selected or becomes a neighbor of
/// the selected one, and stays activated from then on.
#[derive(Debug)]
pub struct Registry<A, const N: usize> {
    slots: Vec<Slot<A>, N>,
    current: usize,
    config: RegistryConfig,
    /// Copy of the config as it is in the store, if known.
    saved_config: Option<RegistryConfig>,
    config_tracker: DirtyTracker,
    autosave: Autosave,
}

impl<A: Animation, const N: usize> Default for Registry<A, N> {
    fn default() -> Self {
        Self::new(Autosave::default())
    }
}

impl<A: Animation, const N: usize> Registry<A, N> {
    #[must_use]
    pub fn new(autosave: Autosave) -> Self {
        Self {
            slots: Vec::new(),
            current: 0,
            config: RegistryConfig::default(),
            saved_config: None,
            config_tracker: DirtyTracker::default(),
            autosave,
        }
    }

    /// Append an animation. Meant to be called during setup only.
    ///
    /// # Errors
    ///
    /// When the registry is full, the animation is returned back.
    pub fn add(&mut self, animation: A) -> Result<(), A> {
        let color = animation.default_color();
        self.slots
            .push(Slot {
                animation,
                color,
                activated: false,
                tracker: DirtyTracker::default(),
            })
            .map_err(|slot| slot.animation)
    }

    /// Restore the last selected animation and activate it.
    ///
    /// Falls back to the first animation when nothing was saved or the saved
    /// one is not available anymore.
    pub fn init<S: ConfigStore>(&mut self, store: &mut S) {
        if self.slots.is_empty() {
            log::warning!("Registry has no animations");
            return;
        }

        let saved = load_record::<_, RegistryConfig>(store, REGISTRY_NAMESPACE, CONFIG_KEY);
        self.saved_config = saved;
        let index = saved
            .and_then(|config| self.position(config.last_animation_id))
            .unwrap_or(0);

        self.select(store, index);
        self.config.last_animation_id = self.slots[index].animation.id();
        log::info!("Registry initialized with animation index={}", index);
    }

    /// Make the animation at `index` the active one.
    ///
    /// Returns `false` when there is no such animation.
    pub fn activate_index<S: ConfigStore>(&mut self, store: &mut S, index: usize, now: u32) -> bool {
        if index >= self.slots.len() {
            log::warning!("Ignoring activation of missing index={}", index);
            return false;
        }

        self.select(store, index);

        let id = self.slots[index].animation.id();
        if self.config.last_animation_id != id {
            self.config.last_animation_id = id;
            if self.saved_config == Some(self.config) {
                self.config_tracker.saved();
            } else {
                self.config_tracker.mark(now);
            }
        }
        true
    }

    pub fn switch_next<S: ConfigStore>(&mut self, store: &mut S, now: u32) -> bool {
        if self.slots.is_empty() {
            return false;
        }
        let index = self.next_of(self.current);
        self.activate_index(store, index, now)
    }

    pub fn switch_previous<S: ConfigStore>(&mut self, store: &mut S, now: u32) -> bool {
        if self.slots.is_empty() {
            return false;
        }
        let index = self.previous_of(self.current);
        self.activate_index(store, index, now)
    }

    pub fn select_by_id<S: ConfigStore>(&mut self, store: &mut S, id: u16, now: u32) -> bool {
        match self.position(id) {
            Some(index) => self.activate_index(store, index, now),
            None => {
                log::warning!("Ignoring selection of unknown id={}", id);
                false
            }
        }
    }

    fn select<S: ConfigStore>(&mut self, store: &mut S, index: usize) {
        self.ensure_activated(store, index);
        self.current = index;
        // Neighbors are loaded upfront so switching to them never stalls.
        self.ensure_activated(store, self.previous_of(index));
        self.ensure_activated(store, self.next_of(index));
    }

    fn ensure_activated<S: ConfigStore>(&mut self, store: &mut S, index: usize) {
        let slot = &mut self.slots[index];
        if slot.activated {
            return;
        }

        let id = slot.animation.id();
        slot.color = load_record(store, ANIMATION_NAMESPACE, &animation_key(id))
            .unwrap_or_else(|| slot.animation.default_color());
        slot.animation.on_activate(&slot.color);
        slot.activated = true;
        log::debug!("Activated animation id={} hue={}", id, slot.color.hue);
    }

    fn next_of(&self, index: usize) -> usize {
        (index + 1) % self.slots.len()
    }

    fn previous_of(&self, index: usize) -> usize {
        (index + self.slots.len() - 1) % self.slots.len()
    }

    fn position(&self, id: u16) -> Option<usize> {
        self.slots.iter().position(|s| s.animation.id() == id)
    }

    /// Change the hue of the active animation. It is saved later in
    /// `update`, or by an explicit save.
    pub fn set_current_hue(&mut self, hue: u8, now: u32) {
        let Some(slot) = self.slots.get_mut(self.current) else {
            return;
        };
        if slot.color.hue != hue {
            slot.color.hue = hue;
            slot.tracker.mark(now);
        }
    }

    #[must_use]
    pub fn current_hue(&self) -> u8 {
        self.slots.get(self.current).map_or(0, |s| s.color.hue)
    }

    #[must_use]
    pub fn current_id(&self) -> Option<u16> {
        self.slots.get(self.current).map(|s| s.animation.id())
    }

    #[must_use]
    pub fn current_name(&self) -> Option<&str> {
        self.slots.get(self.current).map(|s| s.animation.name())
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[must_use]
    pub fn animation(&self, index: usize) -> Option<&A> {
        self.slots.get(index).map(|s| &s.animation)
    }

    #[must_use]
    pub fn is_activated(&self, index: usize) -> bool {
        self.slots.get(index).map_or(false, |s| s.activated)
    }

    /// Whether the registry or any animation holds unsaved changes.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.config_tracker.is_dirty() || self.slots.iter().any(|s| s.tracker.is_dirty())
    }

    /// Autosave everything that has been dirty for long enough.
    pub fn update<S: ConfigStore>(&mut self, store: &mut S, now: u32) {
        let autosave = self.autosave;

        if self.config_tracker.due(now, autosave) {
            log::debug!("Autosaving registry config");
            match save_record(store, REGISTRY_NAMESPACE, CONFIG_KEY, &self.config) {
                Ok(()) => self.config_saved(),
                Err(error) => {
                    log::warning!("Autosave of registry config failed: {:?}", error);
                    self.config_tracker.failed(now, autosave);
                }
            }
        }

        for slot in self.slots.iter_mut() {
            if !slot.tracker.due(now, autosave) {
                continue;
            }
            let id = slot.animation.id();
            log::debug!("Autosaving color of animation id={}", id);
            match save_record(store, ANIMATION_NAMESPACE, &animation_key(id), &slot.color) {
                Ok(()) => slot.tracker.saved(),
                Err(error) => {
                    log::warning!("Autosave of animation id={} failed: {:?}", id, error);
                    slot.tracker.failed(now, autosave);
                }
            }
        }
    }

    /// Save everything dirty right away, ignoring timers and retry limits.
    ///
    /// Failures are not counted against the autosave retries.
    ///
    /// # Errors
    ///
    /// Returns the last error of the store. Entities that failed stay dirty.
    pub fn force_save<S: ConfigStore>(&mut self, store: &mut S) -> Result<(), StoreError> {
        let mut result = Ok(());

        if self.config_tracker.is_dirty() {
            match save_record(store, REGISTRY_NAMESPACE, CONFIG_KEY, &self.config) {
                Ok(()) => self.config_saved(),
                Err(error) => result = Err(error),
            }
        }

        for index in 0..self.slots.len() {
            if let Err(error) = self.save_slot(store, index) {
                result = Err(error);
            }
        }

        if let Err(error) = result {
            log::warning!("Forced save failed: {:?}", error);
        }
        result
    }

    fn config_saved(&mut self) {
        self.saved_config = Some(self.config);
        self.config_tracker.saved();
    }

    /// Save the color of the active animation right away, if it changed.
    ///
    /// # Errors
    ///
    /// Propagates the error of the store. The animation stays dirty then.
    pub fn save_current<S: ConfigStore>(&mut self, store: &mut S) -> Result<(), StoreError> {
        self.save_slot(store, self.current)
    }

    fn save_slot<S: ConfigStore>(&mut self, store: &mut S, index: usize) -> Result<(), StoreError> {
        let Some(slot) = self.slots.get_mut(index) else {
            return Ok(());
        };
        if !slot.tracker.is_dirty() {
            return Ok(());
        }
        save_record(store, ANIMATION_NAMESPACE, &animation_key(slot.animation.id()), &slot.color)?;
        slot.tracker.saved();
        Ok(())
    }

    /// Draw a frame of the active animation. Nothing is drawn when empty.
    pub fn render<F: Framebuffer>(&mut self, framebuffer: &mut F, now: u32) {
        if let Some(slot) = self.slots.get_mut(self.current) {
            slot.animation.render(framebuffer, &slot.color, now);
        }
    }
}
