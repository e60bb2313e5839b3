use std::collections::HashMap;

use crate::hasher::FileIdentity;

/// A file already placed into a category folder during this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub name: String,
    pub size: u64,
    pub content_hash: String,
    /// Name the file arrived with when it was stored under a `_N` name.
    pub variant_of: Option<String>,
}

impl FileRecord {
    pub fn new(name: impl Into<String>, identity: FileIdentity) -> Self {
        Self {
            name: name.into(),
            size: identity.size,
            content_hash: identity.content_hash,
            variant_of: None,
        }
    }

    pub fn variant(
        name: impl Into<String>,
        original: impl Into<String>,
        identity: FileIdentity,
    ) -> Self {
        Self {
            variant_of: Some(original.into()),
            ..Self::new(name, identity)
        }
    }

    pub fn same_content(&self, identity: &FileIdentity) -> bool {
        self.size == identity.size && self.content_hash == identity.content_hash
    }
}

/// Per-category record of files organized so far, in insertion order.
///
/// Holds at most one record per (category, name). Files diverted to the
/// archive without being registered are kept aside so their content can
/// still be matched, but their names stay free.
#[derive(Debug, Default)]
pub struct Registry {
    categories: HashMap<String, Vec<FileRecord>>,
    archived: HashMap<String, Vec<FileRecord>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// First record in `category` whose name equals `name`.
    pub fn find(&self, category: &str, name: &str) -> Option<&FileRecord> {
        self.categories
            .get(category)
            .and_then(|records| records.iter().find(|r| r.name == name))
    }

    pub fn contains(&self, category: &str, name: &str) -> bool {
        self.find(category, name).is_some()
    }

    /// Add `record` under `category`. Returns false, leaving the registry
    /// unchanged, when the name is already registered there.
    pub fn register(&mut self, category: &str, record: FileRecord) -> bool {
        let records = self.categories.entry(category.to_string()).or_default();
        if records.iter().any(|r| r.name == record.name) {
            return false;
        }
        records.push(record);
        true
    }

    pub fn record_archived(&mut self, category: &str, record: FileRecord) {
        self.archived
            .entry(category.to_string())
            .or_default()
            .push(record);
    }

    /// First `_N` variant of `original` in `category` with identical content,
    /// registered or archived.
    pub fn find_variant(
        &self,
        category: &str,
        original: &str,
        identity: &FileIdentity,
    ) -> Option<&FileRecord> {
        let registered = self.categories.get(category).into_iter().flatten();
        let archived = self.archived.get(category).into_iter().flatten();
        registered.chain(archived).find(|r| {
            r.variant_of.as_deref() == Some(original) && r.same_content(identity)
        })
    }

    pub fn records(&self, category: &str) -> &[FileRecord] {
        self.categories
            .get(category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    pub fn len(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(size: u64, hash: &str) -> FileIdentity {
        FileIdentity {
            size,
            content_hash: hash.to_string(),
        }
    }

    #[test]
    fn test_find_is_scoped_to_category() {
        let mut registry = Registry::new();
        assert!(registry.register("TXT", FileRecord::new("a.txt", identity(5, "aa"))));

        assert!(registry.find("TXT", "a.txt").is_some());
        assert!(registry.find("MD", "a.txt").is_none());
        assert!(registry.find("TXT", "A.txt").is_none());
    }

    #[test]
    fn test_register_keeps_first_record_for_a_name() {
        let mut registry = Registry::new();
        assert!(registry.register("TXT", FileRecord::new("a.txt", identity(5, "aa"))));
        assert!(!registry.register("TXT", FileRecord::new("a.txt", identity(6, "bb"))));

        let record = registry.find("TXT", "a.txt").unwrap();
        assert_eq!(record.size, 5);
        assert_eq!(registry.records("TXT").len(), 1);
    }

    #[test]
    fn test_records_preserve_insertion_order() {
        let mut registry = Registry::new();
        registry.register("TXT", FileRecord::new("b.txt", identity(1, "b")));
        registry.register("TXT", FileRecord::new("a.txt", identity(1, "a")));
        registry.register("JPG", FileRecord::new("c.jpg", identity(1, "c")));

        let names: Vec<&str> = registry
            .records("TXT")
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(names, vec!["b.txt", "a.txt"]);
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.category_count(), 2);
        assert!(registry.records("PNG").is_empty());
    }

    #[test]
    fn test_find_variant_matches_content_of_renamed_and_archived() {
        let mut registry = Registry::new();
        registry.register("TXT", FileRecord::new("a.txt", identity(3, "zz")));
        registry.register("TXT", FileRecord::variant("a_1.txt", "a.txt", identity(5, "hh")));
        registry.record_archived("TXT", FileRecord::variant("a_1.txt", "a.txt", identity(3, "yy")));

        let renamed = registry.find_variant("TXT", "a.txt", &identity(5, "hh")).unwrap();
        assert_eq!(renamed.name, "a_1.txt");
        assert!(registry.find_variant("TXT", "a.txt", &identity(3, "yy")).is_some());
        assert!(registry.find_variant("TXT", "a.txt", &identity(3, "zz")).is_none());
        assert!(registry.find_variant("TXT", "b.txt", &identity(5, "hh")).is_none());
        // Archived names are not reserved.
        assert_eq!(registry.records("TXT").len(), 2);
    }

    #[test]
    fn test_same_content_requires_size_and_hash() {
        let record = FileRecord::new("a.txt", identity(5, "aa"));
        assert!(record.same_content(&identity(5, "aa")));
        assert!(!record.same_content(&identity(5, "bb")));
        assert!(!record.same_content(&identity(6, "aa")));
    }
}
