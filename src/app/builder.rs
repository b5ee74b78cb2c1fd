//! Builder object which constructs [`App`]s
//!
//! [`App`]: crate::app::App

use ::std::{sync::Arc, time::Duration};

use crate::{
    app::App,
    config::KeyboardConfig,
    display::{DisplayClient, HeadlessClient, DEFAULT_FRAME_INTERVAL},
    errors::Result,
    input::{keyboard::Keyboard, EVENT_QUEUE_CAPACITY},
    render::{GpuRenderer, RenderBackend},
};

/// A builder pattern object which simplifies the process of creating an
/// [`App`].
///
/// The same builder can be re-used to create multiple apps with the same
/// configuration, as a type of prototype.
///
/// ```no_run
/// use ::oskway::{app::Builder, render::RenderBackend};
///
/// let mut app = Builder::new()
///     .with_position(0, 680)
///     .with_render_backend(RenderBackend::Vulkan)
///     .build()
///     .expect("App creation failed");
///
/// app.run().expect("App failed to start");
/// ```
#[derive(Clone, Debug)]
pub struct Builder {
    keyboard_config: KeyboardConfig,
    position: (i32, i32),
    render_backend: RenderBackend,
    queue_capacity: usize,
    frame_interval: Duration,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder {
    /// Construct a new builder. Default values will be used for all properties
    /// until explicitly set.
    pub fn new() -> Self {
        Self {
            keyboard_config: KeyboardConfig::default(),
            position: (0, 0),
            render_backend: RenderBackend::default(),
            queue_capacity: EVENT_QUEUE_CAPACITY,
            frame_interval: DEFAULT_FRAME_INTERVAL,
        }
    }

    /// Set where layouts and themes are loaded from, and which load first.
    pub fn with_keyboard_config(self, keyboard_config: KeyboardConfig) -> Self {
        Self {
            keyboard_config,
            ..self
        }
    }

    /// Set the keyboard widget's position on the surface.
    ///
    /// Defaults to the origin if not set.
    pub fn with_position(self, x: i32, y: i32) -> Self {
        Self {
            position: (x, y),
            ..self
        }
    }

    /// Defaults to [`RenderBackend::OpenGl`] if not set.
    pub fn with_render_backend(self, render_backend: RenderBackend) -> Self {
        Self {
            render_backend,
            ..self
        }
    }

    /// Set how many input events may wait between frames before new ones are
    /// dropped. Raised to 1 if zero.
    ///
    /// Defaults to [`EVENT_QUEUE_CAPACITY`] if not set.
    pub fn with_queue_capacity(self, queue_capacity: usize) -> Self {
        Self {
            queue_capacity: queue_capacity.max(1),
            ..self
        }
    }

    /// Set the frame pacing of the headless display client.
    ///
    /// Defaults to [`DEFAULT_FRAME_INTERVAL`] if not set.
    pub fn with_frame_interval(self, frame_interval: Duration) -> Self {
        Self {
            frame_interval,
            ..self
        }
    }

    pub fn keyboard_config(&self) -> &KeyboardConfig {
        &self.keyboard_config
    }

    pub fn position(&self) -> (i32, i32) {
        self.position
    }

    pub fn render_backend(&self) -> RenderBackend {
        self.render_backend
    }

    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    /// Build a new [`App`] with a freshly loaded [`Keyboard`] and a headless
    /// display client.
    ///
    /// Fails if the configured default layout cannot be loaded.
    pub fn build(&self) -> Result<App> {
        let keyboard = Keyboard::new(self.keyboard_config.clone())?;
        Ok(self.build_with(
            Arc::new(keyboard),
            Box::new(HeadlessClient::new(self.frame_interval)),
        ))
    }

    /// Build a new [`App`] around an existing keyboard and display client.
    /// The builder's keyboard config and frame interval are not used.
    pub fn build_with(&self, keyboard: Arc<Keyboard>, client: Box<dyn DisplayClient>) -> App {
        let app = App::new(
            keyboard,
            GpuRenderer::new(self.render_backend),
            client,
            self.queue_capacity,
        );
        let (x, y) = self.position;
        app.widget().set_position(x, y);
        app
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;

    use ::pretty_assertions::assert_eq;
    use ::std::fs;
    use ::tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let builder = Builder::new();

        assert_eq!(builder.position(), (0, 0));
        assert_eq!(builder.render_backend(), RenderBackend::OpenGl);
        assert_eq!(builder.queue_capacity(), 100);
        assert_eq!(builder.frame_interval(), Duration::from_millis(16));
        assert_eq!(builder.keyboard_config(), &KeyboardConfig::default());
    }

    #[test]
    fn test_build_applies_settings() {
        let dir = TempDir::new().unwrap();
        let app = Builder::new()
            .with_keyboard_config(KeyboardConfig::with_asset_root(dir.path()))
            .with_position(40, 300)
            .with_render_backend(RenderBackend::Vulkan)
            .with_queue_capacity(0)
            .build()
            .unwrap();

        assert_eq!(app.widget().position(), (40, 300));
        assert_eq!(app.renderer().backend(), RenderBackend::Vulkan);
        assert_eq!(app.dispatcher().capacity(), 1);
        assert_eq!(app.keyboard().current_layout_name().as_deref(), Some("qwerty"));
    }

    #[test]
    fn test_build_fails_without_default_layout() {
        let dir = TempDir::new().unwrap();
        let config = KeyboardConfig {
            default_layout: "dvorak".into(),
            ..KeyboardConfig::with_asset_root(dir.path())
        };

        let err = Builder::new()
            .with_keyboard_config(config)
            .build()
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_build_surfaces_invalid_default_layout() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("layouts")).unwrap();
        fs::write(dir.path().join("layouts/qwerty.json"), "{ not json").unwrap();

        let err = Builder::new()
            .with_keyboard_config(KeyboardConfig::with_asset_root(dir.path()))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Malformed { .. }));
    }
}
