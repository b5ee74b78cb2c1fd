//! Keyboard layout and theme data model.
//!
//! Everything in here is passive data. Layouts are loaded and checked by the
//! [`LayoutParser`], themes by [`ThemeLoader`], and both are owned at runtime
//! by a [`Keyboard`].
//!
//! [`Keyboard`]: crate::input::keyboard::Keyboard

mod builtin;
mod parser;
mod theme;

pub use builtin::*;
pub use parser::*;
pub use theme::*;

use ::serde::{Deserialize, Serialize};
use ::strum::{Display, EnumIter};

/// The press state of a single key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum KeyState {
    #[default]
    Released,
    Pressed,
    Repeating,
}

impl KeyState {
    /// Returns `true` for any state in which the key is held down.
    pub const fn is_down(self) -> bool {
        matches!(self, Self::Pressed | Self::Repeating)
    }
}

/// A single key on the keyboard.
///
/// Geometry is in layout-local units with the origin at the top left of the
/// layout canvas. The runtime [`state`] is never serialized.
///
/// [`state`]: Key::state
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key {
    pub id: String,
    pub label: String,
    /// Abstract key code. Negative values are used for special, non-printable
    /// keys.
    pub code: i32,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    #[serde(default, skip_serializing_if = "is_false")]
    pub modifier: bool,
    #[serde(skip)]
    pub state: KeyState,
}

impl Key {
    /// Construct a released, non-modifier key.
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        code: i32,
        (x, y): (i32, i32),
        (width, height): (i32, i32),
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            code,
            x,
            y,
            width,
            height,
            modifier: false,
            state: KeyState::Released,
        }
    }

    /// Marks the key as a modifier key.
    pub fn into_modifier(self) -> Self {
        Self {
            modifier: true,
            ..self
        }
    }

    /// Returns `true` if the layout-local point lies within the key.
    ///
    /// The box is half-open: the left and top edges are inside, the right and
    /// bottom edges are not.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        let (x, y) = (i64::from(x), i64::from(y));
        let (left, top) = (i64::from(self.x), i64::from(self.y));
        x >= left
            && x < left + i64::from(self.width)
            && y >= top
            && y < top + i64::from(self.height)
    }

    /// Returns `true` if the interiors of the two keys intersect.
    ///
    /// Keys that merely share an edge do not overlap. The test is symmetric.
    pub fn overlaps(&self, other: &Key) -> bool {
        let (a_left, a_top) = (i64::from(self.x), i64::from(self.y));
        let (a_right, a_bottom) = (a_left + i64::from(self.width), a_top + i64::from(self.height));
        let (b_left, b_top) = (i64::from(other.x), i64::from(other.y));
        let (b_right, b_bottom) = (
            b_left + i64::from(other.width),
            b_top + i64::from(other.height),
        );

        !(a_right <= b_left || b_right <= a_left || a_bottom <= b_top || b_bottom <= a_top)
    }

    /// The center of the key in layout-local units.
    pub fn center(&self) -> (i32, i32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }
}

/// A named arrangement of keys on a fixed-size canvas.
///
/// Key order is preserved through serialization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    pub name: String,
    pub keys: Vec<Key>,
    pub width: i32,
    pub height: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Layout {
    /// Looks up a key by its identifier.
    pub fn key(&self, id: &str) -> Option<&Key> {
        self.keys.iter().find(|key| key.id == id)
    }

    pub(crate) fn key_mut(&mut self, id: &str) -> Option<&mut Key> {
        self.keys.iter_mut().find(|key| key.id == id)
    }

    /// Returns the first key containing the layout-local point, if any.
    pub fn key_at(&self, x: i32, y: i32) -> Option<&Key> {
        self.keys.iter().find(|key| key.contains(x, y))
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}
