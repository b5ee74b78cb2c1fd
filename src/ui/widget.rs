use ::parking_lot::RwLock;
use ::std::sync::Arc;
use ::tracing::trace;

use crate::{
    errors::Result,
    input::{keyboard::Keyboard, ButtonState, KeyboardEvent, PointerEvent, TouchEvent},
    layout::Key,
    render::{Rect, Renderer},
};

/// A visual element which draws itself and reacts to input.
pub trait Widget {
    fn render(&self, renderer: &mut dyn Renderer) -> Result<()>;

    fn handle_pointer_event(&self, event: &PointerEvent) -> Result<()>;

    fn handle_keyboard_event(&self, event: &KeyboardEvent) -> Result<()>;

    fn handle_touch_event(&self, event: &TouchEvent) -> Result<()>;
}

/// Presents a [`Keyboard`] on screen and turns pointer and touch input into
/// key presses.
///
/// Event coordinates are in surface space. The widget's position is
/// subtracted before hit testing against the layout, so a widget at
/// `(100, 50)` maps surface point `(115, 65)` onto layout point `(15, 15)`.
///
/// Pointer presses and releases of the primary button press and release the
/// key under the pointer. Touches only ever press: a touch-up carries no
/// position and is not tracked back to the key it started on.
#[derive(Debug)]
pub struct KeyboardWidget {
    keyboard: Arc<Keyboard>,
    position: RwLock<(i32, i32)>,
}

impl KeyboardWidget {
    pub fn new(keyboard: Arc<Keyboard>) -> Self {
        Self {
            keyboard,
            position: RwLock::new((0, 0)),
        }
    }

    pub fn keyboard(&self) -> &Arc<Keyboard> {
        &self.keyboard
    }

    pub fn set_position(&self, x: i32, y: i32) {
        *self.position.write() = (x, y);
    }

    pub fn position(&self) -> (i32, i32) {
        *self.position.read()
    }

    /// Canvas size of the active layout, or `(0, 0)` without one.
    pub fn size(&self) -> (i32, i32) {
        self.keyboard
            .layout()
            .map(|layout| (layout.width, layout.height))
            .unwrap_or_default()
    }

    /// The first key of the active layout containing the surface point.
    pub fn find_key_at_position(&self, x: i32, y: i32) -> Option<Key> {
        let (left, top) = self.position();
        let layout = self.keyboard.layout()?;
        layout
            .key_at(x.saturating_sub(left), y.saturating_sub(top))
            .cloned()
    }

    fn key_id_at(&self, x: i32, y: i32) -> Option<String> {
        self.find_key_at_position(x, y).map(|key| key.id)
    }
}

impl Widget for KeyboardWidget {
    fn render(&self, renderer: &mut dyn Renderer) -> Result<()> {
        let (left, top) = self.position();
        // Cloned up front so only one read lock is held during the pass.
        let theme = self.keyboard.theme().clone();
        let Some(layout) = self.keyboard.layout() else {
            return Ok(());
        };

        renderer.fill_rect(
            Rect {
                x: left,
                y: top,
                width: layout.width,
                height: layout.height,
            },
            0,
            theme.background_color,
        )?;

        for key in &layout.keys {
            let color = if key.state.is_down() {
                theme.key_pressed_color
            } else {
                theme.key_color
            };
            renderer.fill_rect(
                Rect {
                    x: left.saturating_add(key.x),
                    y: top.saturating_add(key.y),
                    width: key.width,
                    height: key.height,
                },
                theme.border_radius,
                color,
            )?;

            let (cx, cy) = key.center();
            renderer.render_text(
                left.saturating_add(cx),
                top.saturating_add(cy),
                &key.label,
                theme.text_color,
            )?;
        }

        Ok(())
    }

    fn handle_pointer_event(&self, event: &PointerEvent) -> Result<()> {
        if !event.is_primary() {
            return Ok(());
        }

        if let Some(id) = self.key_id_at(event.x, event.y) {
            match event.state {
                ButtonState::Pressed => self.keyboard.press_key(&id),
                ButtonState::Released => self.keyboard.release_key(&id),
            }
        }
        Ok(())
    }

    fn handle_keyboard_event(&self, event: &KeyboardEvent) -> Result<()> {
        trace!(key = event.key, state = ?event.state, "Physical key event");
        Ok(())
    }

    fn handle_touch_event(&self, event: &TouchEvent) -> Result<()> {
        if let Some(id) = self.key_id_at(event.x, event.y) {
            self.keyboard.press_key(&id);
        }
        Ok(())
    }
}
