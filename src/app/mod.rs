//! Composition root and frame loop.
//!
//! An [`App`] wires a [`Keyboard`] to its [`KeyboardWidget`] through an
//! [`EventDispatcher`], and drives rendering and the display client once per
//! frame. Construct one with a [`Builder`].
//!
//! [`Keyboard`]: crate::input::keyboard::Keyboard

mod builder;

pub use builder::*;

use ::std::{
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};
use ::tracing::{debug, error, info, warn};

use crate::{
    display::DisplayClient,
    errors::Result,
    input::{keyboard::Keyboard, Event, EventDispatcher, EventSender, EventType},
    render::{GpuRenderer, Renderer},
    ui::{KeyboardWidget, Widget},
};

/// Requests that a running [`App`] leave its frame loop. Cloneable and usable
/// from any thread.
#[derive(Clone, Debug)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    /// The loop exits after the iteration in progress completes.
    pub fn stop(&self) {
        self.0.store(false, Ordering::Release);
    }

    pub fn is_running(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// The on-screen keyboard application.
///
/// Input arrives from other threads through an [`EventSender`] (see
/// [`sender`]) and is handled at the start of each frame, oldest first, so
/// that key state never changes in the middle of a render pass.
///
/// ```
/// use ::oskway::{app::Builder, config::KeyboardConfig, input::{ButtonState, PointerEvent}};
/// use ::std::time::Duration;
///
/// let mut app = Builder::new()
///     .with_keyboard_config(KeyboardConfig::with_asset_root("does-not-exist"))
///     .with_frame_interval(Duration::ZERO)
///     .build()
///     .expect("Failed to build app");
///
/// app.sender().send_event(
///     PointerEvent { serial: 0, x: 15, y: 15, button: 1, state: ButtonState::Pressed, time: 0 }.into(),
/// );
/// app.initialize().unwrap();
/// app.step().unwrap();
///
/// assert!(app.keyboard().is_key_pressed("q"));
/// ```
///
/// [`sender`]: Self::sender
pub struct App {
    keyboard: Arc<Keyboard>,
    widget: Arc<KeyboardWidget>,
    dispatcher: EventDispatcher,
    renderer: GpuRenderer,
    client: Box<dyn DisplayClient>,
    running: StopHandle,
    closed: bool,
}

impl App {
    pub(crate) fn new(
        keyboard: Arc<Keyboard>,
        renderer: GpuRenderer,
        client: Box<dyn DisplayClient>,
        queue_capacity: usize,
    ) -> Self {
        let widget = Arc::new(KeyboardWidget::new(keyboard.clone()));
        let mut dispatcher = EventDispatcher::with_capacity(queue_capacity);

        let target = widget.clone();
        dispatcher.register_handler(EventType::Pointer, move |event: &Event| {
            target.handle_pointer_event(event.as_pointer()?)
        });
        let target = widget.clone();
        dispatcher.register_handler(EventType::Keyboard, move |event: &Event| {
            target.handle_keyboard_event(event.as_keyboard()?)
        });
        let target = widget.clone();
        dispatcher.register_handler(EventType::Touch, move |event: &Event| {
            target.handle_touch_event(event.as_touch()?)
        });

        Self {
            keyboard,
            widget,
            dispatcher,
            renderer,
            client,
            running: StopHandle::new(),
            closed: false,
        }
    }

    pub fn keyboard(&self) -> &Arc<Keyboard> {
        &self.keyboard
    }

    pub fn widget(&self) -> &Arc<KeyboardWidget> {
        &self.widget
    }

    pub fn renderer(&self) -> &GpuRenderer {
        &self.renderer
    }

    pub fn dispatcher(&self) -> &EventDispatcher {
        &self.dispatcher
    }

    /// Mutable access to the dispatcher, e.g. to register handlers for
    /// protocol event categories.
    pub fn dispatcher_mut(&mut self) -> &mut EventDispatcher {
        &mut self.dispatcher
    }

    /// A handle for feeding input events from any thread.
    pub fn sender(&self) -> EventSender {
        self.dispatcher.sender()
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.running.clone()
    }

    /// Creates the surface and initializes the renderer.
    pub fn initialize(&mut self) -> Result<()> {
        debug!("Initializing application");
        self.client.create_surface()?;
        self.renderer.initialize()?;
        info!(
            backend = %self.renderer.backend(),
            layout = ?self.keyboard.current_layout_name(),
            "Application initialized"
        );
        Ok(())
    }

    /// Initializes, then runs frames until stopped, then cleans up.
    ///
    /// Errors inside a frame are logged and the loop carries on. Only a
    /// failure to initialize is returned.
    pub fn run(&mut self) -> Result<()> {
        self.initialize()?;

        info!("Entering frame loop");
        while self.running.is_running() {
            if let Err(err) = self.step() {
                error!(error = %err, "Frame failed");
            }
        }

        self.cleanup();
        Ok(())
    }

    /// Runs a single frame: handle queued input, render, then let the display
    /// client dispatch.
    pub fn step(&mut self) -> Result<()> {
        self.process_events();
        let rendered = self.render();
        let dispatched = self.client.dispatch();
        rendered.and(dispatched)
    }

    /// Handles the events queued right now, returning how many there were.
    /// Handler failures are logged and do not stop the remaining events.
    pub fn process_events(&mut self) -> usize {
        let events = self.dispatcher.drain_pending().collect::<Vec<_>>();
        for event in &events {
            if let Err(err) = self.dispatcher.dispatch_event(event) {
                warn!(event_type = %event.event_type(), error = %err, "Failed to handle event");
            }
        }
        events.len()
    }

    /// Draws the keyboard and flushes the display client.
    pub fn render(&mut self) -> Result<()> {
        self.renderer.begin_frame();
        self.widget.render(&mut self.renderer)?;
        self.client.flush()
    }

    /// Closes the renderer and the display client. Idempotent, and also run
    /// on drop.
    pub fn cleanup(&mut self) {
        if self.closed {
            return;
        }
        self.running.stop();
        self.renderer.close();
        self.client.close();
        self.closed = true;
        info!("Application closed");
    }
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("keyboard", &self.keyboard)
            .field("widget_position", &self.widget.position())
            .field("dispatcher", &self.dispatcher)
            .field("renderer", &self.renderer)
            .field("running", &self.running.is_running())
            .field("closed", &self.closed)
            .finish()
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::KeyboardConfig,
        errors::Error,
        input::{ButtonState, PointerEvent, TouchEvent},
        layout::KeyState,
        render::DrawCommand,
    };

    use ::pretty_assertions::assert_eq;
    use ::std::{thread, time::Duration};
    use ::tempfile::TempDir;

    fn app() -> (App, TempDir) {
        let dir = TempDir::new().unwrap();
        let app = Builder::new()
            .with_keyboard_config(KeyboardConfig::with_asset_root(dir.path()))
            .with_frame_interval(Duration::ZERO)
            .build()
            .unwrap();
        (app, dir)
    }

    fn pointer(x: i32, y: i32, state: ButtonState) -> Event {
        PointerEvent {
            serial: 0,
            x,
            y,
            button: 1,
            state,
            time: 0,
        }
        .into()
    }

    #[test]
    fn test_queued_input_is_handled_in_order() {
        let (mut app, _dir) = app();
        app.initialize().unwrap();

        let sender = app.sender();
        sender.send_event(pointer(15, 15, ButtonState::Pressed));
        sender.send_event(pointer(15, 15, ButtonState::Released));
        sender.send_event(pointer(85, 15, ButtonState::Pressed));

        app.step().unwrap();
        assert_eq!(app.keyboard().key_state("q"), KeyState::Released);
        assert_eq!(app.keyboard().key_state("w"), KeyState::Pressed);
    }

    #[test]
    fn test_step_renders_a_frame() {
        let (mut app, _dir) = app();
        app.initialize().unwrap();

        app.step().unwrap();
        let labels = app
            .renderer()
            .frame()
            .iter()
            .filter(|cmd| matches!(cmd, DrawCommand::Text { .. }))
            .count();
        assert_eq!(labels, 30);

        // Each frame starts from scratch.
        app.step().unwrap();
        assert_eq!(app.renderer().frame().len(), 61);
    }

    #[test]
    fn test_handler_failure_does_not_stop_processing() {
        let (mut app, _dir) = app();
        app.initialize().unwrap();
        app.dispatcher_mut()
            .register_handler(EventType::Touch, |_: &Event| Err(Error::NoActiveLayout));

        let sender = app.sender();
        sender.send_event(
            TouchEvent {
                serial: 0,
                id: 0,
                x: 15,
                y: 15,
                time: 0,
            }
            .into(),
        );
        sender.send_event(pointer(85, 15, ButtonState::Pressed));

        assert_eq!(app.process_events(), 2);
        assert!(!app.keyboard().is_key_pressed("q"));
        assert!(app.keyboard().is_key_pressed("w"));
    }

    #[test]
    fn test_step_before_initialize_fails() {
        let (mut app, _dir) = app();

        assert!(matches!(app.step(), Err(Error::Backend { .. })));
    }

    #[test]
    fn test_step_after_cleanup_fails() {
        let (mut app, _dir) = app();
        app.initialize().unwrap();
        app.cleanup();
        app.cleanup();

        assert!(!app.stop_handle().is_running());
        assert!(app.step().is_err());
    }

    #[test]
    fn test_debug_output() {
        let (app, _dir) = app();
        let debug = format!("{app:?}");

        assert!(debug.starts_with("App {"));
        assert!(debug.contains("qwerty"));
        assert!(debug.contains("closed: false"));
    }

    #[test]
    fn test_run_until_stopped() {
        let (mut app, _dir) = app();
        let keyboard = app.keyboard().clone();
        let sender = app.sender();
        let stop = app.stop_handle();

        let feeder = thread::spawn(move || {
            sender.send_event(pointer(15, 15, ButtonState::Pressed));
            thread::sleep(Duration::from_millis(50));
            stop.stop();
        });

        app.run().unwrap();
        feeder.join().unwrap();

        assert!(keyboard.is_key_pressed("q"));
        assert!(!app.renderer().is_initialized());
    }
}
