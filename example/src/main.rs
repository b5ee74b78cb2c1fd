use ::oskway::{
    app::Builder,
    config::KeyboardConfig,
    input::{ButtonState, PointerEvent},
};
use ::std::{thread, time::Duration};
use ::tracing::{error, info};
use ::tracing_subscriber::{fmt, prelude::*, EnvFilter};

const ASSET_ROOT: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../assets");

pub fn main() {
    ::tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let mut app = Builder::new()
        .with_keyboard_config(KeyboardConfig::with_asset_root(ASSET_ROOT))
        .with_position(0, 680)
        .build()
        .expect("Failed to create keyboard app");

    let keyboard = app.keyboard().clone();
    match keyboard.available_layouts() {
        Ok(layouts) => info!(?layouts, "Available layouts"),
        Err(err) => error!(error = %err, "Failed to list layouts"),
    }
    for id in ["h", "i", "space"] {
        keyboard.register_callback(id, |key| info!(key = %key.id, code = key.code, "Typed"));
    }

    // Stand in for the display server: tap a few keys from another thread,
    // then shut the loop down.
    let sender = app.sender();
    let stop = app.stop_handle();
    let widget = app.widget().clone();
    let input = thread::spawn(move || {
        let (left, top) = widget.position();
        for (serial, id) in ["h", "i", "space"].into_iter().enumerate() {
            let Some((x, y)) = widget
                .keyboard()
                .layout()
                .and_then(|layout| layout.key(id).map(|key| key.center()))
            else {
                continue;
            };
            for state in [ButtonState::Pressed, ButtonState::Released] {
                sender.send_event(
                    PointerEvent {
                        serial: serial as u32,
                        x: left + x,
                        y: top + y,
                        button: 1,
                        state,
                        time: 0,
                    }
                    .into(),
                );
                thread::sleep(Duration::from_millis(50));
            }
        }
        stop.stop();
    });

    if let Err(err) = app.run() {
        error!(error = %err, "Keyboard app failed");
    }
    input.join().expect("Input thread panicked");
}
