//! Keyboard state: the active layout and theme, and which keys are pressed.

use ::parking_lot::{MappedRwLockReadGuard, RwLock, RwLockReadGuard};
use ::std::{collections::HashMap, fmt};
use ::tracing::{debug, trace, warn};

use crate::{
    config::KeyboardConfig,
    errors::{Error, Resource, Result},
    layout::{
        builtin_qwerty, validate_layout, Key, KeyState, Layout, LayoutParser, Theme,
        BUILTIN_LAYOUT,
    },
};

/// A callback fired when a key is pressed.
pub type KeyCallback = Box<dyn Fn(&Key) + Send + Sync>;

/// The central object which owns the active layout and theme and tracks the
/// press state of every key.
///
/// # Key State Tracking
///
/// Press state is recorded per key id. Any id may be pressed or released,
/// including ids which do not exist in the active layout (input handlers may
/// refer to keys of another layout). Ids which were never touched report
/// [`KeyState::Released`]. For ids which do exist in the layout, the
/// [`Key::state`] embedded in the layout is kept in agreement with the
/// recorded state, including across layout switches.
///
/// # Layouts and Themes
///
/// Layouts are strict: [`load_layout`] either installs a fully validated
/// layout or returns an error and keeps the previous one. The only exception
/// is the built-in [`BUILTIN_LAYOUT`], which is used when no file for it
/// exists. Themes are best-effort: [`load_theme`] never fails and falls back
/// to [`Theme::fallback`] instead.
///
/// # Threading
///
/// All methods take `&self` and may be called from any thread. Reads proceed
/// concurrently; every mutation holds an exclusive lock.
///
/// Press callbacks run on the caller's thread while that exclusive lock is
/// held. A callback must not call back into the same [`Keyboard`] or it will
/// deadlock.
///
/// # Example
///
/// ```
/// use ::oskway::{config::KeyboardConfig, input::keyboard::Keyboard, layout::KeyState};
///
/// let keyboard = Keyboard::new(KeyboardConfig::with_asset_root("/nonexistent"))
///     .expect("built-in layout is always available");
///
/// keyboard.press_key("q");
/// assert_eq!(keyboard.key_state("q"), KeyState::Pressed);
///
/// keyboard.release_key("q");
/// assert_eq!(keyboard.key_state("q"), KeyState::Released);
/// ```
///
/// [`load_layout`]: Self::load_layout
/// [`load_theme`]: Self::load_theme
pub struct Keyboard {
    config: KeyboardConfig,
    state: RwLock<State>,
}

struct State {
    layout: Option<Layout>,
    /// Resource name the active layout was loaded under, which may differ
    /// from the layout's own `name`.
    layout_resource: Option<String>,
    theme: Theme,
    key_states: HashMap<String, KeyState>,
    callbacks: HashMap<String, KeyCallback>,
}

impl Keyboard {
    /// Constructs a keyboard with the configured default layout and theme.
    ///
    /// Fails if the default layout cannot be loaded. A missing theme is not an
    /// error.
    pub fn new(config: KeyboardConfig) -> Result<Self> {
        let keyboard = Self::unloaded(config);
        keyboard.load_layout(&keyboard.config.default_layout)?;
        keyboard.load_theme(&keyboard.config.default_theme);
        Ok(keyboard)
    }

    /// Constructs a keyboard with no active layout and the fallback theme.
    ///
    /// <p style="background:rgba(255,181,77,0.16);padding:0.75em;">
    /// <strong>Warning:</strong> This API is for advanced use only.
    /// </p>
    ///
    /// Most callers want [`Keyboard::new`]. Until a layout is loaded, hit
    /// testing finds no keys and [`refresh_layout`] fails.
    ///
    /// [`refresh_layout`]: Self::refresh_layout
    pub fn unloaded(config: KeyboardConfig) -> Self {
        let theme = Theme::fallback(&config.default_theme);
        Self {
            config,
            state: RwLock::new(State {
                layout: None,
                layout_resource: None,
                theme,
                key_states: HashMap::new(),
                callbacks: HashMap::new(),
            }),
        }
    }

    pub fn config(&self) -> &KeyboardConfig {
        &self.config
    }

    /// Loads, validates and activates the named layout.
    ///
    /// On failure the active layout is left untouched.
    pub fn load_layout(&self, name: &str) -> Result<()> {
        let parser = self.config.layout_parser();
        let mut layout = match parser.load(name) {
            Ok(layout) => layout,
            Err(err) if err.is_not_found() && name == BUILTIN_LAYOUT => {
                debug!(layout = %name, "No layout file, using built-in layout");
                let layout = builtin_qwerty();
                validate_layout(&layout).map_err(|source| Error::ValidationFailed {
                    resource: Resource::Layout,
                    name: name.to_owned(),
                    source,
                })?;
                layout
            }
            Err(err) => {
                warn!(layout = %name, error = %err, "Failed to load layout");
                return Err(err);
            }
        };

        let mut state = self.state.write();
        for key in &mut layout.keys {
            key.state = state.key_states.get(&key.id).copied().unwrap_or_default();
        }
        debug!(layout = %name, keys = layout.keys.len(), "Activated layout");
        state.layout = Some(layout);
        state.layout_resource = Some(name.to_owned());
        Ok(())
    }

    /// Alias of [`load_layout`].
    ///
    /// [`load_layout`]: Self::load_layout
    pub fn switch_layout(&self, name: &str) -> Result<()> {
        self.load_layout(name)
    }

    /// Reloads the active layout from storage, picking up any edits.
    ///
    /// The layout is reloaded under the name it was loaded by, not the name
    /// recorded inside the layout file.
    pub fn refresh_layout(&self) -> Result<()> {
        let name = self
            .state
            .read()
            .layout_resource
            .clone()
            .ok_or(Error::NoActiveLayout)?;
        self.load_layout(&name)
    }

    /// Loads and activates the named theme, or the fallback theme if it
    /// cannot be loaded.
    pub fn load_theme(&self, name: &str) {
        let theme = self
            .config
            .theme_loader()
            .load(name)
            .unwrap_or_else(|err| {
                warn!(theme = %name, error = %err, "Using fallback theme");
                Theme::fallback(name)
            });

        self.state.write().theme = theme;
    }

    /// The active layout, if any. A read lock is held while the guard lives.
    pub fn layout(&self) -> Option<MappedRwLockReadGuard<'_, Layout>> {
        RwLockReadGuard::try_map(self.state.read(), |state| state.layout.as_ref()).ok()
    }

    /// The active theme. A read lock is held while the guard lives.
    pub fn theme(&self) -> MappedRwLockReadGuard<'_, Theme> {
        RwLockReadGuard::map(self.state.read(), |state| &state.theme)
    }

    /// Name of the active layout, if any.
    pub fn current_layout_name(&self) -> Option<String> {
        self.state
            .read()
            .layout
            .as_ref()
            .map(|layout| layout.name.clone())
    }

    /// Layout names available on disk, plus the built-in layout.
    pub fn available_layouts(&self) -> Result<Vec<String>> {
        let mut names = self.config.layout_parser().list()?;
        if !names.iter().any(|name| name == BUILTIN_LAYOUT) {
            names.push(BUILTIN_LAYOUT.to_owned());
        }
        Ok(names)
    }

    /// The layout parser backing this keyboard.
    pub fn layout_parser(&self) -> LayoutParser {
        self.config.layout_parser()
    }

    /// Marks the key as pressed and runs its callback, if the key is part of
    /// the active layout and has one.
    pub fn press_key(&self, id: &str) {
        let mut state = self.state.write();
        let State {
            layout,
            key_states,
            callbacks,
            ..
        } = &mut *state;

        key_states.insert(id.to_owned(), KeyState::Pressed);
        trace!(key = %id, "Key pressed");

        if let Some(key) = layout.as_mut().and_then(|layout| layout.key_mut(id)) {
            key.state = KeyState::Pressed;
            if let Some(callback) = callbacks.get(id) {
                callback(key);
            }
        }
    }

    /// Marks the key as released.
    pub fn release_key(&self, id: &str) {
        let mut state = self.state.write();
        let State {
            layout, key_states, ..
        } = &mut *state;

        key_states.insert(id.to_owned(), KeyState::Released);
        trace!(key = %id, "Key released");

        if let Some(key) = layout.as_mut().and_then(|layout| layout.key_mut(id)) {
            key.state = KeyState::Released;
        }
    }

    /// The recorded state of a key. Unknown ids are released.
    pub fn key_state(&self, id: &str) -> KeyState {
        self.state
            .read()
            .key_states
            .get(id)
            .copied()
            .unwrap_or_default()
    }

    /// Returns `true` if the key is currently held down.
    pub fn is_key_pressed(&self, id: &str) -> bool {
        self.key_state(id).is_down()
    }

    /// Registers the press callback for a key id, replacing any previous one.
    ///
    /// The callback runs while the keyboard is locked and must not call back
    /// into this keyboard.
    pub fn register_callback<F>(&self, id: &str, callback: F)
    where
        F: Fn(&Key) + Send + Sync + 'static,
    {
        self.state
            .write()
            .callbacks
            .insert(id.to_owned(), Box::new(callback));
    }

    /// Releases every key.
    pub fn reset(&self) {
        let mut state = self.state.write();
        state.key_states.clear();
        if let Some(layout) = state.layout.as_mut() {
            for key in &mut layout.keys {
                key.state = KeyState::Released;
            }
        }
    }
}

impl fmt::Debug for Keyboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("Keyboard")
            .field("layout", &state.layout.as_ref().map(|l| &l.name))
            .field("theme", &state.theme.name)
            .field("key_states", &state.key_states)
            .field("callbacks", &state.callbacks.keys().collect::<Vec<_>>())
            .finish()
    }
}
