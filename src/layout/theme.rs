//! Visual themes and their loading.

use ::serde::{Deserialize, Serialize};
use ::std::{
    fs,
    path::{Path, PathBuf},
};
use ::tracing::{debug, warn};

use crate::errors::{Context, Error, Resource, Result, ValidationError};

/// An RGBA color with each channel in `[0, 1]`.
pub type Rgba = [f32; 4];

/// Named visual parameters for drawing the keyboard.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub background_color: Rgba,
    pub key_color: Rgba,
    pub key_pressed_color: Rgba,
    pub text_color: Rgba,
    pub font_size: i32,
    pub border_radius: i32,
}

impl Theme {
    /// The hard-coded theme used whenever a named theme cannot be loaded. It
    /// takes the requested name so that the active theme still reports what
    /// was asked for.
    pub fn fallback(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            background_color: [0.2, 0.2, 0.2, 1.0],
            key_color: [0.8, 0.8, 0.8, 1.0],
            key_pressed_color: [0.6, 0.6, 0.6, 1.0],
            text_color: [0.0, 0.0, 0.0, 1.0],
            font_size: 16,
            border_radius: 4,
        }
    }

    fn colors(&self) -> [(&'static str, &Rgba); 4] {
        [
            ("background", &self.background_color),
            ("key", &self.key_color),
            ("key_pressed", &self.key_pressed_color),
            ("text", &self.text_color),
        ]
    }
}

/// Checks a theme against its schema: non-empty name, positive font size,
/// non-negative border radius, and every color channel within `[0, 1]`.
pub fn validate_theme(theme: &Theme) -> ::std::result::Result<(), ValidationError> {
    if theme.name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if theme.font_size <= 0 {
        return Err(ValidationError::InvalidFontSize(theme.font_size));
    }
    if theme.border_radius < 0 {
        return Err(ValidationError::NegativeBorderRadius(theme.border_radius));
    }

    for (color, rgba) in theme.colors() {
        if let Some((channel, &value)) = rgba
            .iter()
            .enumerate()
            .find(|(_, v)| !(0.0..=1.0).contains(*v))
        {
            return Err(ValidationError::ColorOutOfRange {
                color,
                channel,
                value,
            });
        }
    }

    Ok(())
}

/// Finds and loads themes from an ordered list of directories.
///
/// A theme named `glass` is looked for as `glass.json` in each directory in
/// turn. Candidates which cannot be read, parsed or validated are skipped in
/// favour of the next directory.
#[derive(Clone, Debug)]
pub struct ThemeLoader {
    search_dirs: Vec<PathBuf>,
}

impl ThemeLoader {
    pub fn new<I, P>(search_dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            search_dirs: search_dirs.into_iter().map(Into::into).collect(),
        }
    }

    pub fn search_dirs(&self) -> &[PathBuf] {
        &self.search_dirs
    }

    /// Load and validate the named theme.
    ///
    /// Returns the error from the last candidate file that was found, or
    /// [`Error::NotFound`] if no directory contained the theme.
    pub fn load(&self, name: &str) -> Result<Theme> {
        let file_name = format!("{name}.json");
        let mut last_err = None;

        for path in self.search_dirs.iter().map(|dir| dir.join(&file_name)) {
            if !path.is_file() {
                continue;
            }
            match Self::load_file(&path, name) {
                Ok(theme) => {
                    debug!(theme = %name, path = %path.display(), "Loaded theme");
                    return Ok(theme);
                }
                Err(err) => {
                    warn!(theme = %name, path = %path.display(), error = %err, "Skipping theme candidate");
                    last_err = Some(err);
                }
            }
        }

        Err(last_err.unwrap_or_else(|| Error::NotFound {
            resource: Resource::Theme,
            name: name.to_owned(),
            path: self
                .search_dirs
                .first()
                .map(|dir| dir.join(&file_name))
                .unwrap_or_else(|| PathBuf::from(&file_name)),
        }))
    }

    fn load_file(path: &Path, name: &str) -> Result<Theme> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read theme file {}", path.display()))?;
        let theme: Theme = ::serde_json::from_str(&data).map_err(|source| Error::Malformed {
            resource: Resource::Theme,
            name: name.to_owned(),
            source,
        })?;
        validate_theme(&theme).map_err(|source| Error::ValidationFailed {
            resource: Resource::Theme,
            name: name.to_owned(),
            source,
        })?;
        Ok(theme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ::pretty_assertions::assert_eq;
    use ::tempfile::TempDir;

    const GLASS: &str = r#"{
        "name": "glass",
        "background_color": [0.1, 0.1, 0.15, 0.8],
        "key_color": [1.0, 1.0, 1.0, 0.2],
        "key_pressed_color": [1.0, 1.0, 1.0, 0.5],
        "text_color": [1.0, 1.0, 1.0, 1.0],
        "font_size": 18,
        "border_radius": 8
    }"#;

    #[test]
    fn test_fallback_theme_is_valid() {
        assert_eq!(validate_theme(&Theme::fallback("glass")), Ok(()));
    }

    #[test]
    fn test_negative_font_size_is_rejected() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("broken.json"),
            GLASS.replace("\"font_size\": 18", "\"font_size\": -1"),
        )
        .unwrap();

        let err = ThemeLoader::new([dir.path()]).load("broken").unwrap_err();
        assert!(
            matches!(
                err,
                Error::ValidationFailed {
                    source: ValidationError::InvalidFontSize(-1),
                    ..
                }
            ),
            "{err:?}"
        );
    }

    #[test]
    fn test_color_channel_range() {
        let mut theme = Theme::fallback("hot");
        theme.key_pressed_color = [0.5, 1.5, 0.5, 1.0];

        assert_eq!(
            validate_theme(&theme),
            Err(ValidationError::ColorOutOfRange {
                color: "key_pressed",
                channel: 1,
                value: 1.5
            })
        );
    }

    #[test]
    fn test_search_order_skips_bad_candidates() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        fs::write(first.path().join("glass.json"), "{ not json").unwrap();
        fs::write(second.path().join("glass.json"), GLASS).unwrap();

        let theme = ThemeLoader::new([first.path(), second.path()])
            .load("glass")
            .unwrap();
        assert_eq!(theme.font_size, 18);
        assert_eq!(theme.border_radius, 8);
    }

    #[test]
    fn test_missing_theme_is_not_found() {
        let dir = TempDir::new().unwrap();

        let err = ThemeLoader::new([dir.path()]).load("nope").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_theme_round_trip() {
        let theme: Theme = ::serde_json::from_str(GLASS).unwrap();
        let json = ::serde_json::to_string(&theme).unwrap();

        assert_eq!(::serde_json::from_str::<Theme>(&json).unwrap(), theme);
    }
}
