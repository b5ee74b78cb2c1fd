//! Key press state and the active layout and theme.

mod keyboard;

pub use keyboard::*;
