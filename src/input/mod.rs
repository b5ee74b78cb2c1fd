//! Input events, their dispatch, and the keyboard state they drive.

mod dispatcher;
mod event;
pub mod keyboard;

pub use dispatcher::*;
pub use event::*;
