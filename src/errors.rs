//! Crate-specific error and result types, plus common conversions.

use ::std::{io, path::PathBuf};
use ::strum::Display;
use ::thiserror::Error;

use crate::input::EventType;

/// Result type returned by fallible operations in this crate.
pub type Result<T> = ::std::result::Result<T, Error>;

/// The kind of named resource which failed to load.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Resource {
    Layout,
    Theme,
}

/// Error type for the keyboard engine.
///
/// Layout and theme failures carry the resource kind and the requested name so
/// that operators can tell which file needs fixing. Dropped events on a full
/// queue are deliberately not represented here; see
/// [`EventDispatcher::send_event`].
///
/// [`EventDispatcher::send_event`]: crate::input::EventDispatcher::send_event
#[derive(Debug, Error)]
pub enum Error {
    /// The named layout or theme resource does not exist.
    #[error("{resource} `{name}` not found at {}", path.display())]
    NotFound {
        resource: Resource,
        name: String,
        path: PathBuf,
    },

    /// The resource exists but could not be deserialized.
    #[error("{resource} `{name}` is malformed")]
    Malformed {
        resource: Resource,
        name: String,
        #[source]
        source: ::serde_json::Error,
    },

    /// The resource deserialized but violates a data-model invariant.
    #[error("{resource} `{name}` is invalid")]
    ValidationFailed {
        resource: Resource,
        name: String,
        #[source]
        source: ValidationError,
    },

    /// An event payload did not match the category it was delivered under.
    #[error("expected {expected} event data, got {actual}")]
    InvalidEventData {
        expected: EventType,
        actual: EventType,
    },

    /// An operation required an active layout but none has been loaded.
    #[error("no active layout")]
    NoActiveLayout,

    /// A filesystem operation failed.
    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    /// A renderer or display client reported a failure.
    #[error("{backend}: {message}")]
    Backend {
        backend: &'static str,
        message: String,
    },
}

impl Error {
    /// Returns `true` if the error indicates a missing resource.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// A layout or theme invariant which was violated.
///
/// Validation stops at the first violation, so only one is ever reported.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ValidationError {
    #[error("name cannot be empty")]
    EmptyName,

    #[error("layout dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },

    #[error("layout must contain at least one key")]
    NoKeys,

    #[error("key {index} (`{id}`) is invalid: {violation}")]
    InvalidKey {
        index: usize,
        id: String,
        violation: KeyViolation,
    },

    #[error("keys {first} (`{first_id}`) and {second} (`{second_id}`) overlap")]
    Overlap {
        first: usize,
        first_id: String,
        second: usize,
        second_id: String,
    },

    #[error("font size must be positive, got {0}")]
    InvalidFontSize(i32),

    #[error("border radius must be non-negative, got {0}")]
    NegativeBorderRadius(i32),

    #[error("{color} color channel {channel} must be within [0, 1], got {value}")]
    ColorOutOfRange {
        color: &'static str,
        channel: usize,
        value: f32,
    },
}

/// The rule a single key broke.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum KeyViolation {
    #[error("key ID cannot be empty")]
    EmptyId,
    #[error("key label cannot be empty")]
    EmptyLabel,
    #[error("key dimensions must be positive")]
    NonPositiveSize,
    #[error("key position must be non-negative")]
    NegativePosition,
    #[error("key extends beyond the layout bounds")]
    OutOfBounds,
    #[error("key ID is already used by key {first}")]
    DuplicateId { first: usize },
}

/// A crate-private trait which allows context information to be attached to
/// fallible filesystem operations.
///
/// The bare [`io::Error`] rarely says which file was involved, so every
/// conversion into [`Error::Io`] goes through here.
pub(crate) trait Context<T> {
    /// Attach a context message to a fallible type and return crate error.
    fn context(self, ctx: impl AsRef<str>) -> Result<T>
    where
        Self: Sized;

    /// Like [`context`], but only builds the message on failure.
    ///
    /// [`context`]: Self::context
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        Self: Sized,
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> Context<T> for io::Result<T> {
    fn context(self, ctx: impl AsRef<str>) -> Result<T> {
        self.map_err(|source| Error::Io {
            context: ctx.as_ref().to_owned(),
            source,
        })
    }

    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|source| Error::Io {
            context: f().into(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ::pretty_assertions::assert_eq;

    #[test]
    fn test_io_context_is_attached() {
        let res: io::Result<()> = Err(io::Error::new(io::ErrorKind::Other, "disk on fire"));
        let err = res.context("Failed to read layout file").unwrap_err();

        assert_eq!(err.to_string(), "Failed to read layout file");
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_validation_messages_name_offending_keys() {
        let err = ValidationError::Overlap {
            first: 0,
            first_id: "a".into(),
            second: 3,
            second_id: "b".into(),
        };
        assert_eq!(err.to_string(), "keys 0 (`a`) and 3 (`b`) overlap");

        let err = ValidationError::InvalidKey {
            index: 2,
            id: "q".into(),
            violation: KeyViolation::OutOfBounds,
        };
        assert_eq!(
            err.to_string(),
            "key 2 (`q`) is invalid: key extends beyond the layout bounds"
        );
    }

    #[test]
    fn test_not_found_display() {
        let err = Error::NotFound {
            resource: Resource::Theme,
            name: "glass".into(),
            path: PathBuf::from("themes/glass.json"),
        };
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "theme `glass` not found at themes/glass.json");
    }
}
