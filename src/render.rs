//! Renderer capability consumed by the keyboard widget.
//!
//! Pixel output is out of scope for this crate. [`GpuRenderer`] tracks the
//! backend lifecycle and records what it is asked to draw so the render pass
//! can be driven and inspected without a GPU.

use ::strum::{Display, EnumIter, IntoStaticStr};
use ::tracing::{debug, trace};

use crate::{
    errors::{Error, Result},
    layout::Rgba,
};

/// An axis-aligned rectangle in screen units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// What the keyboard widget needs from a graphics backend.
pub trait Renderer {
    fn initialize(&mut self) -> Result<()>;

    /// Draws `text` centered on `(x, y)`.
    fn render_text(&mut self, x: i32, y: i32, text: &str, color: Rgba) -> Result<()>;

    /// Fills a rectangle with rounded corners. Backends without shape support
    /// may ignore this.
    fn fill_rect(&mut self, _rect: Rect, _radius: i32, _color: Rgba) -> Result<()> {
        Ok(())
    }

    fn close(&mut self);
}

/// The graphics backend a [`GpuRenderer`] targets. Chosen once when the
/// application is composed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumIter, IntoStaticStr)]
pub enum RenderBackend {
    #[default]
    #[strum(serialize = "opengl")]
    OpenGl,
    #[strum(serialize = "vulkan")]
    Vulkan,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Lifecycle {
    Created,
    Initialized,
    Closed,
}

/// A single draw request, as recorded by [`GpuRenderer`].
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Rect {
        rect: Rect,
        radius: i32,
        color: Rgba,
    },
    Text {
        x: i32,
        y: i32,
        text: String,
        color: Rgba,
    },
}

/// Renderer for the selected [`RenderBackend`].
///
/// Draw calls are only accepted between [`initialize`] and [`close`]. Each
/// accepted call is appended to the current frame, which the application
/// clears with [`begin_frame`].
///
/// [`initialize`]: Renderer::initialize
/// [`close`]: Renderer::close
/// [`begin_frame`]: Self::begin_frame
#[derive(Debug)]
pub struct GpuRenderer {
    backend: RenderBackend,
    lifecycle: Lifecycle,
    frame: Vec<DrawCommand>,
}

impl GpuRenderer {
    pub fn new(backend: RenderBackend) -> Self {
        Self {
            backend,
            lifecycle: Lifecycle::Created,
            frame: Vec::new(),
        }
    }

    pub fn backend(&self) -> RenderBackend {
        self.backend
    }

    pub fn is_initialized(&self) -> bool {
        self.lifecycle == Lifecycle::Initialized
    }

    /// Discards the previous frame's draw commands.
    pub fn begin_frame(&mut self) {
        self.frame.clear();
    }

    /// Draw commands issued since the last [`begin_frame`].
    ///
    /// [`begin_frame`]: Self::begin_frame
    pub fn frame(&self) -> &[DrawCommand] {
        &self.frame
    }

    fn ensure_ready(&self) -> Result<()> {
        match self.lifecycle {
            Lifecycle::Initialized => Ok(()),
            Lifecycle::Created => Err(self.error("renderer not initialized")),
            Lifecycle::Closed => Err(self.error("renderer closed")),
        }
    }

    fn error(&self, message: &str) -> Error {
        Error::Backend {
            backend: self.backend.into(),
            message: message.to_owned(),
        }
    }
}

impl Renderer for GpuRenderer {
    fn initialize(&mut self) -> Result<()> {
        if self.lifecycle == Lifecycle::Closed {
            return Err(self.error("renderer closed"));
        }
        debug!(backend = %self.backend, "Initializing renderer");
        self.lifecycle = Lifecycle::Initialized;
        Ok(())
    }

    fn render_text(&mut self, x: i32, y: i32, text: &str, color: Rgba) -> Result<()> {
        self.ensure_ready()?;
        trace!(x, y, text, "Render text");
        self.frame.push(DrawCommand::Text {
            x,
            y,
            text: text.to_owned(),
            color,
        });
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, radius: i32, color: Rgba) -> Result<()> {
        self.ensure_ready()?;
        self.frame.push(DrawCommand::Rect {
            rect,
            radius,
            color,
        });
        Ok(())
    }

    fn close(&mut self) {
        if self.lifecycle != Lifecycle::Closed {
            debug!(backend = %self.backend, "Closing renderer");
            self.lifecycle = Lifecycle::Closed;
            self.frame.clear();
        }
    }
}
