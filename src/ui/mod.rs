//! On-screen presentation of the keyboard.

mod widget;

pub use widget::*;
