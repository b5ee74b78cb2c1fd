//! Layout file loading, saving and validation.

use ::std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};
use ::tap::Pipe;
use ::tracing::{debug, trace};

use super::{Key, Layout};
use crate::errors::{Context, Error, KeyViolation, Resource, Result, ValidationError};

const LAYOUT_EXTENSION: &str = "json";

/// Reads and writes layout files within a single directory.
///
/// A layout named `qwerty` lives at `<dir>/qwerty.json`.
#[derive(Clone, Debug)]
pub struct LayoutParser {
    layout_dir: PathBuf,
}

impl LayoutParser {
    pub fn new(layout_dir: impl Into<PathBuf>) -> Self {
        Self {
            layout_dir: layout_dir.into(),
        }
    }

    pub fn layout_dir(&self) -> &Path {
        &self.layout_dir
    }

    /// The path at which the named layout is stored.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.layout_dir.join(format!("{name}.{LAYOUT_EXTENSION}"))
    }

    /// Deserialize the named layout.
    ///
    /// The result is not validated; see [`validate_layout`].
    pub fn parse(&self, name: &str) -> Result<Layout> {
        let path = self.path_for(name);
        if !path.is_file() {
            return Err(Error::NotFound {
                resource: Resource::Layout,
                name: name.to_owned(),
                path,
            });
        }

        trace!(layout = %name, path = %path.display(), "Parsing layout");
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read layout file {}", path.display()))?
            .pipe(|data| ::serde_json::from_str(&data))
            .map_err(|source| Error::Malformed {
                resource: Resource::Layout,
                name: name.to_owned(),
                source,
            })
    }

    /// Parse and then validate the named layout.
    pub fn load(&self, name: &str) -> Result<Layout> {
        let layout = self.parse(name)?;
        validate_layout(&layout).map_err(|source| Error::ValidationFailed {
            resource: Resource::Layout,
            name: name.to_owned(),
            source,
        })?;
        Ok(layout)
    }

    /// Serialize a layout as pretty-printed JSON under `name`, creating the
    /// layout directory if needed.
    pub fn save(&self, layout: &Layout, name: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.layout_dir).with_context(|| {
            format!(
                "Failed to create layout directory {}",
                self.layout_dir.display()
            )
        })?;

        let path = self.path_for(name);
        let data = ::serde_json::to_string_pretty(layout).map_err(|source| Error::Malformed {
            resource: Resource::Layout,
            name: name.to_owned(),
            source,
        })?;
        fs::write(&path, data)
            .with_context(|| format!("Failed to write layout file {}", path.display()))?;

        debug!(layout = %name, path = %path.display(), "Saved layout");
        Ok(path)
    }

    /// Names of all layout files in the layout directory, sorted.
    ///
    /// A missing directory simply has no layouts.
    pub fn list(&self) -> Result<Vec<String>> {
        if !self.layout_dir.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.layout_dir).with_context(|| {
            format!(
                "Failed to read layout directory {}",
                self.layout_dir.display()
            )
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let path = entry
                .context("Failed to read layout directory entry")?
                .path();
            if !path.is_file() || path.extension().map_or(true, |ext| ext != LAYOUT_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_owned());
            }
        }
        names.sort();
        Ok(names)
    }
}

/// Checks the structural and geometric invariants of a layout.
///
/// Checks run in order and stop at the first failure: name, canvas size, key
/// count, then each key's own fields, bounds and ID uniqueness, and finally
/// pairwise overlap.
/// The first overlapping pair in index order is reported.
pub fn validate_layout(layout: &Layout) -> ::std::result::Result<(), ValidationError> {
    if layout.name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if layout.width <= 0 || layout.height <= 0 {
        return Err(ValidationError::InvalidDimensions {
            width: layout.width,
            height: layout.height,
        });
    }
    if layout.keys.is_empty() {
        return Err(ValidationError::NoKeys);
    }

    let mut seen = HashMap::with_capacity(layout.keys.len());
    for (index, key) in layout.keys.iter().enumerate() {
        validate_key(key, layout)
            .and_then(|()| match seen.insert(key.id.as_str(), index) {
                Some(first) => Err(KeyViolation::DuplicateId { first }),
                None => Ok(()),
            })
            .map_err(|violation| ValidationError::InvalidKey {
                index,
                id: key.id.clone(),
                violation,
            })?;
    }

    // Keyboards have tens of keys, so the quadratic scan is fine.
    for (i, first) in layout.keys.iter().enumerate() {
        for (j, second) in layout.keys.iter().enumerate().skip(i + 1) {
            if first.overlaps(second) {
                return Err(ValidationError::Overlap {
                    first: i,
                    first_id: first.id.clone(),
                    second: j,
                    second_id: second.id.clone(),
                });
            }
        }
    }

    Ok(())
}

fn validate_key(key: &Key, layout: &Layout) -> ::std::result::Result<(), KeyViolation> {
    if key.id.is_empty() {
        return Err(KeyViolation::EmptyId);
    }
    if key.label.is_empty() {
        return Err(KeyViolation::EmptyLabel);
    }
    if key.width <= 0 || key.height <= 0 {
        return Err(KeyViolation::NonPositiveSize);
    }
    if key.x < 0 || key.y < 0 {
        return Err(KeyViolation::NegativePosition);
    }
    if i64::from(key.x) + i64::from(key.width) > i64::from(layout.width)
        || i64::from(key.y) + i64::from(key.height) > i64::from(layout.height)
    {
        return Err(KeyViolation::OutOfBounds);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::builtin_qwerty;

    use ::pretty_assertions::assert_eq;
    use ::tempfile::TempDir;

    fn key(id: &str, (x, y): (i32, i32), (w, h): (i32, i32)) -> Key {
        Key::new(id, id.to_uppercase(), 0, (x, y), (w, h))
    }

    fn layout(keys: Vec<Key>) -> Layout {
        Layout {
            name: "test".into(),
            keys,
            width: 200,
            height: 100,
            description: None,
        }
    }

    #[test]
    fn test_validate_rejects_empty_name_first() {
        let mut l = layout(vec![]);
        l.name.clear();
        l.width = 0;

        assert_eq!(validate_layout(&l), Err(ValidationError::EmptyName));
    }

    #[test]
    fn test_validate_layout_fields() {
        let mut l = layout(vec![]);
        assert_eq!(validate_layout(&l), Err(ValidationError::NoKeys));

        l.height = -5;
        assert_eq!(
            validate_layout(&l),
            Err(ValidationError::InvalidDimensions {
                width: 200,
                height: -5
            })
        );
    }

    #[test]
    fn test_validate_reports_first_bad_key() {
        let mut bad_label = key("b", (60, 0), (50, 50));
        bad_label.label.clear();
        let l = layout(vec![
            key("a", (0, 0), (50, 50)),
            bad_label,
            key("c", (-1, 0), (50, 50)),
        ]);

        assert_eq!(
            validate_layout(&l),
            Err(ValidationError::InvalidKey {
                index: 1,
                id: "b".into(),
                violation: KeyViolation::EmptyLabel,
            })
        );
    }

    #[test]
    fn test_validate_key_rules() {
        for (k, violation) in [
            (key("", (0, 0), (10, 10)), KeyViolation::EmptyId),
            (key("z", (0, 0), (0, 10)), KeyViolation::NonPositiveSize),
            (key("z", (0, -1), (10, 10)), KeyViolation::NegativePosition),
            (key("z", (190, 0), (11, 10)), KeyViolation::OutOfBounds),
            (key("z", (0, 95), (10, 6)), KeyViolation::OutOfBounds),
        ] {
            let id = k.id.clone();
            assert_eq!(
                validate_layout(&layout(vec![k])),
                Err(ValidationError::InvalidKey {
                    index: 0,
                    id,
                    violation
                })
            );
        }
    }

    #[test]
    fn test_validate_rejects_duplicate_ids() {
        let l = layout(vec![
            key("a", (0, 0), (50, 50)),
            key("b", (60, 0), (50, 50)),
            key("a", (120, 0), (50, 50)),
        ]);

        assert_eq!(
            validate_layout(&l),
            Err(ValidationError::InvalidKey {
                index: 2,
                id: "a".into(),
                violation: KeyViolation::DuplicateId { first: 0 },
            })
        );
    }

    #[test]
    fn test_key_touching_layout_edge_is_in_bounds() {
        let l = layout(vec![key("z", (150, 50), (50, 50))]);
        assert_eq!(validate_layout(&l), Ok(()));
    }

    #[test]
    fn test_overlap_names_both_keys() {
        let l = layout(vec![
            key("first", (0, 0), (50, 50)),
            key("second", (0, 0), (50, 50)),
        ]);

        assert_eq!(
            validate_layout(&l),
            Err(ValidationError::Overlap {
                first: 0,
                first_id: "first".into(),
                second: 1,
                second_id: "second".into(),
            })
        );
    }

    #[test]
    fn test_overlap_reports_first_pair_in_index_order() {
        let l = layout(vec![
            key("a", (0, 0), (40, 40)),
            key("b", (100, 0), (40, 40)),
            key("c", (120, 20), (40, 40)),
            key("d", (20, 20), (40, 40)),
        ]);

        // (0, 3) comes before (1, 2) because the outer index is lower.
        assert_eq!(
            validate_layout(&l),
            Err(ValidationError::Overlap {
                first: 0,
                first_id: "a".into(),
                second: 3,
                second_id: "d".into(),
            })
        );
    }

    #[test]
    fn test_field_checks_run_before_overlap() {
        let l = layout(vec![
            key("a", (0, 0), (50, 50)),
            key("a2", (0, 0), (50, 50)),
            key("", (100, 0), (50, 50)),
        ]);

        assert!(matches!(
            validate_layout(&l),
            Err(ValidationError::InvalidKey { index: 2, .. })
        ));
    }

    #[test]
    fn test_save_then_parse_round_trip() {
        let dir = TempDir::new().unwrap();
        let parser = LayoutParser::new(dir.path().join("nested/layouts"));
        let mut original = builtin_qwerty();
        original.description = Some("Standard QWERTY".into());

        let path = parser.save(&original, "qwerty").unwrap();
        assert!(path.ends_with("nested/layouts/qwerty.json"));

        let parsed = parser.parse("qwerty").unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_saved_field_order_is_stable() {
        let dir = TempDir::new().unwrap();
        let parser = LayoutParser::new(dir.path());
        let l = layout(vec![key("a", (0, 0), (10, 10))]);

        let path = parser.save(&l, "test").unwrap();
        let data = fs::read_to_string(path).unwrap();
        let name = data.find("\"name\"").unwrap();
        let keys = data.find("\"keys\"").unwrap();
        let width = data.rfind("\"width\"").unwrap();
        assert!(name < keys && keys < width);
        assert!(!data.contains("description"));
        assert!(!data.contains("state"));
    }

    #[test]
    fn test_parse_errors() {
        let dir = TempDir::new().unwrap();
        let parser = LayoutParser::new(dir.path());
        fs::write(dir.path().join("broken.json"), r#"{"name": "broken", "keys": 4}"#).unwrap();

        assert!(parser.parse("missing").unwrap_err().is_not_found());
        assert!(matches!(
            parser.parse("broken"),
            Err(Error::Malformed {
                resource: Resource::Layout,
                ..
            })
        ));
    }

    #[test]
    fn test_load_validates() {
        let dir = TempDir::new().unwrap();
        let parser = LayoutParser::new(dir.path());
        parser
            .save(
                &layout(vec![key("a", (0, 0), (50, 50)), key("b", (10, 10), (50, 50))]),
                "overlapping",
            )
            .unwrap();

        assert!(parser.parse("overlapping").is_ok());
        assert!(matches!(
            parser.load("overlapping"),
            Err(Error::ValidationFailed {
                source: ValidationError::Overlap { .. },
                ..
            })
        ));
    }

    #[test]
    fn test_list_layouts() {
        let dir = TempDir::new().unwrap();
        let parser = LayoutParser::new(dir.path());
        assert_eq!(
            LayoutParser::new(dir.path().join("absent")).list().unwrap(),
            Vec::<String>::new()
        );

        fs::write(dir.path().join("numpad.json"), "{}").unwrap();
        fs::write(dir.path().join("azerty.json"), "{}").unwrap();
        fs::write(dir.path().join("README.md"), "").unwrap();
        fs::create_dir(dir.path().join("nested.json")).unwrap();

        assert_eq!(parser.list().unwrap(), vec!["azerty", "numpad"]);
    }
}
