//! Keyboard state and event routing for an on-screen keyboard.
//!
//! A [`Keyboard`] owns the active [`Layout`] and [`Theme`] together with the
//! press state of every key. Input events are routed to it by an
//! [`EventDispatcher`] through the [`KeyboardWidget`], which hit tests pointer
//! and touch positions against the layout. The [`app`] module wires these
//! together behind a frame loop.
//!
//! [`Keyboard`]: crate::input::keyboard::Keyboard
//! [`Layout`]: crate::layout::Layout
//! [`Theme`]: crate::layout::Theme
//! [`EventDispatcher`]: crate::input::EventDispatcher
//! [`KeyboardWidget`]: crate::ui::KeyboardWidget

pub mod app;
pub mod config;
pub mod display;
pub mod errors;
pub mod input;
pub mod layout;
pub mod render;
pub mod ui;
