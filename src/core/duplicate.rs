use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::{Path, PathBuf};

use super::hash::Fingerprint;

/// First image seen for every (class, fingerprint) pair during a run.
///
/// Fingerprints are class scoped: the same fingerprint under two labels is
/// two distinct keys.
#[derive(Debug, Default)]
pub struct DuplicateIndex {
    seen: HashMap<(String, Fingerprint), PathBuf>,
}

impl DuplicateIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the original path when `(class, fingerprint)` was already
    /// claimed; otherwise records `path` as the original and returns `None`.
    pub fn check_or_insert(
        &mut self,
        class: &str,
        fingerprint: Fingerprint,
        path: &Path,
    ) -> Option<&Path> {
        match self.seen.entry((class.to_string(), fingerprint)) {
            Entry::Occupied(entry) => Some(entry.into_mut().as_path()),
            Entry::Vacant(entry) => {
                entry.insert(path.to_path_buf());
                None
            }
        }
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_path_wins() {
        let mut index = DuplicateIndex::new();
        let fp = Fingerprint(42);

        assert_eq!(index.check_or_insert("du_the", fp, Path::new("a.jpg")), None);
        assert_eq!(
            index.check_or_insert("du_the", fp, Path::new("b.jpg")),
            Some(Path::new("a.jpg"))
        );
        assert_eq!(
            index.check_or_insert("du_the", fp, Path::new("c.jpg")),
            Some(Path::new("a.jpg"))
        );
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_fingerprints_are_class_scoped() {
        let mut index = DuplicateIndex::new();
        let fp = Fingerprint(7);

        assert_eq!(index.check_or_insert("pizza", fp, Path::new("pizza/a.jpg")), None);
        assert_eq!(index.check_or_insert("samosa", fp, Path::new("samosa/a.jpg")), None);
        assert_eq!(index.len(), 2);
        assert_eq!(
            index.check_or_insert("samosa", fp, Path::new("samosa/b.jpg")),
            Some(Path::new("samosa/a.jpg"))
        );
        assert_eq!(index.check_or_insert("mine", fp, Path::new("mine/a.jpg")), None);
    }

    #[test]
    fn test_empty() {
        assert!(DuplicateIndex::new().is_empty());
    }
}
