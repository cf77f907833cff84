//! Emoji name normalization
//!
//! Custom emoji names are derived from the local file name: everything from the
//! first `.` onward is dropped, the rest is lowercased and `-` becomes `_`.
//! Other characters are passed through untouched. Non-alphanumeric names are
//! accepted but may not render everywhere on the fediverse.

use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::error::{Error, Result};

/// A normalized, non-empty emoji name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EmojiName(String);

impl EmojiName {
    /// Derive the emoji name from the final component of `path`
    pub fn from_path(path: &Path) -> Result<Self> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::InvalidName(path.display().to_string()))?;
        normalize(file_name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for EmojiName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmojiName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalize a file name into an emoji name
///
/// Fails with [`Error::InvalidName`] when the part before the first `.` is
/// empty, e.g. for `.hidden` or an empty string.
pub fn normalize(file_name: &str) -> Result<EmojiName> {
    let stem = file_name.split('.').next().unwrap_or_default();
    if stem.is_empty() {
        return Err(Error::InvalidName(file_name.to_string()));
    }
    Ok(EmojiName(stem.to_lowercase().replace('-', "_")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_extension() {
        assert_eq!(normalize("Cool-Face.png").unwrap().as_str(), "cool_face");
    }

    #[test]
    fn test_normalize_multiple_dots() {
        assert_eq!(normalize("ANGRY.CAT.gif").unwrap().as_str(), "angry");
    }

    #[test]
    fn test_normalize_no_dot() {
        assert_eq!(normalize("simple").unwrap().as_str(), "simple");
        assert_eq!(normalize("Big-Smile").unwrap().as_str(), "big_smile");
    }

    #[test]
    fn test_normalize_empty_stem() {
        assert!(matches!(normalize(".hidden"), Err(Error::InvalidName(_))));
        assert!(matches!(normalize(""), Err(Error::InvalidName(_))));
        assert!(matches!(normalize("..png"), Err(Error::InvalidName(_))));
    }

    #[test]
    fn test_normalize_passes_other_characters() {
        assert_eq!(normalize("ねこ+1.png").unwrap().as_str(), "ねこ+1");
        assert_eq!(normalize("a b!.webp").unwrap().as_str(), "a b!");
    }

    #[test]
    fn test_normalize_matches_definition() {
        for f in ["Party-Parrot.gif", "x.y.z", "A-B-C.tar.gz", "MiXeD.Png"] {
            let before_dot = &f[..f.find('.').unwrap()];
            let expected = before_dot.replace('-', "_").to_lowercase();
            assert_eq!(normalize(f).unwrap().as_str(), expected, "{f}");
        }
    }

    #[test]
    fn test_normalize_idempotent() {
        for f in ["Cool-Face", "blob_cat", "UPPER", "mixed-Case_name"] {
            let once = normalize(f).unwrap();
            let twice = normalize(&format!("{once}.ext")).unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_from_path_uses_file_name() {
        let name = EmojiName::from_path(Path::new("/tmp/some.dir/Happy-Face.png")).unwrap();
        assert_eq!(name.as_str(), "happy_face");

        let name = EmojiName::from_path(Path::new("emojis/Sad.Face.jpg")).unwrap();
        assert_eq!(name.as_str(), "sad");
    }

    #[test]
    fn test_from_path_without_file_name() {
        assert!(EmojiName::from_path(Path::new("/")).is_err());
        assert!(EmojiName::from_path(Path::new("dir/.hidden")).is_err());
    }
}
