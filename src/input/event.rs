//! Strongly-typed input and display-protocol events.
//!
//! Events arrive from the display client and are routed by category through
//! the [`EventDispatcher`]. Pointer, touch and keyboard events are interpreted
//! by the keyboard widget. The protocol housekeeping categories are carried
//! opaquely.
//!
//! [`EventDispatcher`]: crate::input::EventDispatcher

use ::strum::{Display, EnumDiscriminants, EnumIter, IntoStaticStr};

use crate::errors::{Error, Result};

/// Button code of the primary (left) pointer button.
pub const PRIMARY_BUTTON: u32 = 1;

/// Whether a button, key or contact went down or came up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ButtonState {
    Released,
    Pressed,
}

impl From<u32> for ButtonState {
    /// Protocol encoding: `1` is pressed, anything else is released.
    fn from(raw: u32) -> Self {
        if raw == 1 {
            Self::Pressed
        } else {
            Self::Released
        }
    }
}

/// A pointer (mouse) button event at device coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PointerEvent {
    pub serial: u32,
    pub x: i32,
    pub y: i32,
    pub button: u32,
    pub state: ButtonState,
    /// Timestamp in milliseconds with an undefined base.
    pub time: u32,
}

impl PointerEvent {
    /// Returns `true` if the event is for the primary button.
    pub const fn is_primary(&self) -> bool {
        self.button == PRIMARY_BUTTON
    }
}

/// A physical keyboard key event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyboardEvent {
    pub serial: u32,
    pub key: u32,
    pub state: ButtonState,
    pub time: u32,
}

/// A touch contact at device coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TouchEvent {
    pub serial: u32,
    /// Identifies the contact point for multi-touch input.
    pub id: i32,
    pub x: i32,
    pub y: i32,
    pub time: u32,
}

/// A global advertised by the compositor's registry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegistryEvent {
    pub name: u32,
    pub interface: String,
    pub version: u32,
}

/// A display-protocol message which the keyboard core passes along without
/// interpreting.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProtocolEvent {
    pub opcode: u32,
    pub payload: Vec<u8>,
}

/// An event delivered to the keyboard core.
///
/// [`EventType`] names the category of each variant and is the key under
/// which handlers are registered.
#[derive(Clone, Debug, PartialEq, Eq, EnumDiscriminants)]
#[strum_discriminants(
    name(EventType),
    derive(Hash, Display, EnumIter, IntoStaticStr),
    strum(serialize_all = "lowercase")
)]
pub enum Event {
    Registry(RegistryEvent),
    Compositor(ProtocolEvent),
    Shell(ProtocolEvent),
    Output(ProtocolEvent),
    Seat(ProtocolEvent),
    Keyboard(KeyboardEvent),
    Pointer(PointerEvent),
    Touch(TouchEvent),
}

impl Event {
    /// The category of this event.
    pub fn event_type(&self) -> EventType {
        self.into()
    }

    /// Borrows the pointer payload, failing if this is not a pointer event.
    pub fn as_pointer(&self) -> Result<&PointerEvent> {
        match self {
            Self::Pointer(evt) => Ok(evt),
            _ => Err(self.mismatch(EventType::Pointer)),
        }
    }

    /// Borrows the keyboard payload, failing if this is not a keyboard event.
    pub fn as_keyboard(&self) -> Result<&KeyboardEvent> {
        match self {
            Self::Keyboard(evt) => Ok(evt),
            _ => Err(self.mismatch(EventType::Keyboard)),
        }
    }

    /// Borrows the touch payload, failing if this is not a touch event.
    pub fn as_touch(&self) -> Result<&TouchEvent> {
        match self {
            Self::Touch(evt) => Ok(evt),
            _ => Err(self.mismatch(EventType::Touch)),
        }
    }

    fn mismatch(&self, expected: EventType) -> Error {
        Error::InvalidEventData {
            expected,
            actual: self.event_type(),
        }
    }
}

impl From<PointerEvent> for Event {
    fn from(evt: PointerEvent) -> Self {
        Self::Pointer(evt)
    }
}

impl From<KeyboardEvent> for Event {
    fn from(evt: KeyboardEvent) -> Self {
        Self::Keyboard(evt)
    }
}

impl From<TouchEvent> for Event {
    fn from(evt: TouchEvent) -> Self {
        Self::Touch(evt)
    }
}
