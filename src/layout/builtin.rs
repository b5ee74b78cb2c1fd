//! Built-in fallback layout.

use super::{Key, Layout};

/// Name of the layout which is always available, whether or not a file for
/// it exists on disk.
pub const BUILTIN_LAYOUT: &str = "qwerty";

const KEY_SIZE: (i32, i32) = (60, 60);

/// Construct the built-in QWERTY layout.
pub fn builtin_qwerty() -> Layout {
    Layout {
        name: BUILTIN_LAYOUT.to_owned(),
        keys: qwerty_keys(),
        width: 900,
        height: 400,
        description: None,
    }
}

fn qwerty_keys() -> Vec<Key> {
    let row = |y: i32, x0: i32, keys: &[(&str, &str, i32)]| {
        keys.iter()
            .zip((x0..).step_by(70))
            .map(|(&(id, label, code), x)| Key::new(id, label, code, (x, y), KEY_SIZE))
            .collect::<Vec<_>>()
    };

    let mut keys = row(
        10,
        10,
        &[
            ("q", "Q", 16),
            ("w", "W", 17),
            ("e", "E", 18),
            ("r", "R", 19),
            ("t", "T", 20),
            ("y", "Y", 21),
            ("u", "U", 22),
            ("i", "I", 23),
            ("o", "O", 24),
            ("p", "P", 25),
        ],
    );
    keys.extend(row(
        80,
        45,
        &[
            ("a", "A", 30),
            ("s", "S", 31),
            ("d", "D", 32),
            ("f", "F", 33),
            ("g", "G", 34),
            ("h", "H", 35),
            ("j", "J", 36),
            ("k", "K", 37),
            ("l", "L", 38),
        ],
    ));
    keys.extend(row(
        150,
        80,
        &[
            ("z", "Z", 44),
            ("x", "X", 45),
            ("c", "C", 46),
            ("v", "V", 47),
            ("b", "B", 48),
            ("n", "N", 49),
            ("m", "M", 50),
        ],
    ));

    keys.extend([
        Key::new("space", "Space", 57, (200, 220), (300, 60)),
        Key::new("shift", "Shift", 42, (10, 150), KEY_SIZE).into_modifier(),
        Key::new("backspace", "⌫", 14, (710, 10), (80, 60)),
        Key::new("enter", "Enter", 28, (675, 80), (115, 60)),
    ]);
    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::validate_layout;

    use ::pretty_assertions::assert_eq;

    #[test]
    fn test_builtin_qwerty_is_valid() {
        let layout = builtin_qwerty();

        assert_eq!(validate_layout(&layout), Ok(()));
        assert_eq!(layout.keys.len(), 30);
    }

    #[test]
    fn test_builtin_qwerty_geometry() {
        let layout = builtin_qwerty();

        let p = layout.key("p").unwrap();
        assert_eq!((p.x, p.y, p.code), (640, 10, 25));
        let l = layout.key("l").unwrap();
        assert_eq!((l.x, l.y, l.code), (605, 80, 38));
        let m = layout.key("m").unwrap();
        assert_eq!((m.x, m.y, m.code), (500, 150, 50));
        assert!(layout.key("shift").unwrap().modifier);
        assert!(!layout.key("space").unwrap().modifier);
    }
}
