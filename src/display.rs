//! Display-server client consumed by the application loop.

use ::std::{thread, time::Duration};
use ::tracing::debug;

use crate::errors::{Error, Result};

/// Default pacing of [`HeadlessClient::dispatch`], roughly 60 frames per
/// second.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// A connection to the display server.
///
/// Input read by [`dispatch`] is expected to reach the keyboard core through
/// an [`EventSender`].
///
/// [`dispatch`]: Self::dispatch
/// [`EventSender`]: crate::input::EventSender
pub trait DisplayClient {
    fn create_surface(&mut self) -> Result<()>;

    /// Reads and handles pending events from the display server.
    fn dispatch(&mut self) -> Result<()>;

    /// Submits buffered requests to the display server.
    fn flush(&mut self) -> Result<()>;

    fn close(&mut self);
}

/// A display client with no display server behind it, for headless runs and
/// tests. [`dispatch`] just waits out one frame interval.
///
/// [`dispatch`]: DisplayClient::dispatch
#[derive(Debug)]
pub struct HeadlessClient {
    frame_interval: Duration,
    running: bool,
    has_surface: bool,
}

impl Default for HeadlessClient {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_INTERVAL)
    }
}

impl HeadlessClient {
    pub fn new(frame_interval: Duration) -> Self {
        Self {
            frame_interval,
            running: true,
            has_surface: false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn has_surface(&self) -> bool {
        self.has_surface
    }

    fn ensure_running(&self) -> Result<()> {
        if self.running {
            Ok(())
        } else {
            Err(Error::Backend {
                backend: "headless",
                message: "client closed".to_owned(),
            })
        }
    }
}

impl DisplayClient for HeadlessClient {
    fn create_surface(&mut self) -> Result<()> {
        self.ensure_running()?;
        debug!("Created headless surface");
        self.has_surface = true;
        Ok(())
    }

    fn dispatch(&mut self) -> Result<()> {
        self.ensure_running()?;
        if !self.frame_interval.is_zero() {
            thread::sleep(self.frame_interval);
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.ensure_running()
    }

    fn close(&mut self) {
        self.running = false;
        self.has_surface = false;
    }
}
