//! Where layouts and themes are found, and which ones load at startup.

use ::std::path::PathBuf;

use crate::layout::{LayoutParser, ThemeLoader, BUILTIN_LAYOUT};

/// Default directory for layout files, relative to the working directory.
pub const DEFAULT_LAYOUT_DIR: &str = "assets/layouts";

/// Default theme search path, in lookup order.
pub const DEFAULT_THEME_DIRS: [&str; 3] = ["assets/themes", "themes", "../assets/themes"];

/// Theme loaded when the keyboard starts.
pub const DEFAULT_THEME: &str = "glass";

/// Storage locations and startup choices for a [`Keyboard`].
///
/// [`Keyboard`]: crate::input::keyboard::Keyboard
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyboardConfig {
    pub layout_dir: PathBuf,
    pub theme_dirs: Vec<PathBuf>,
    pub default_layout: String,
    pub default_theme: String,
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self {
            layout_dir: DEFAULT_LAYOUT_DIR.into(),
            theme_dirs: DEFAULT_THEME_DIRS.iter().map(PathBuf::from).collect(),
            default_layout: BUILTIN_LAYOUT.to_owned(),
            default_theme: DEFAULT_THEME.to_owned(),
        }
    }
}

impl KeyboardConfig {
    /// Config rooted at a single asset directory containing `layouts/` and
    /// `themes/`.
    pub fn with_asset_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            layout_dir: root.join("layouts"),
            theme_dirs: vec![root.join("themes")],
            ..Self::default()
        }
    }

    pub fn layout_parser(&self) -> LayoutParser {
        LayoutParser::new(&self.layout_dir)
    }

    pub fn theme_loader(&self) -> ThemeLoader {
        ThemeLoader::new(&self.theme_dirs)
    }
}
