use std::hash::{Hash, Hasher};

/// An immutable, value-like description of a single file or folder.
///
/// Equality and hashing are defined by [`path`](FileDescriptor::path)
/// alone: two descriptors with the same path are the same entry even if
/// one carries a realm-specific [`attachment`](FileDescriptor::attachment)
/// and the other doesn't. The planner copies descriptors rather than
/// aliasing them, so `Clone` is cheap and unsurprising to reach for.
#[derive(Debug, Clone)]
pub struct FileDescriptor {
    path: String,
    is_folder: bool,
    /// The device library's numeric object id, present only for
    /// descriptors produced by the remote collector.
    attachment: Option<u32>,
}

impl FileDescriptor {
    /// Creates a new descriptor. `path` is taken as already-canonical;
    /// callers normalize through [`paths::resolve`] or [`paths::join`]
    /// before constructing a descriptor.
    #[must_use]
    pub fn new(path: impl Into<String>, is_folder: bool) -> Self {
        Self {
            path: path.into(),
            is_folder,
            attachment: None,
        }
    }

    /// Creates a descriptor carrying a realm-specific object id.
    #[must_use]
    pub fn with_attachment(path: impl Into<String>, is_folder: bool, attachment: u32) -> Self {
        Self {
            path: path.into(),
            is_folder,
            attachment: Some(attachment),
        }
    }

    /// Returns a deep copy of this descriptor.
    #[must_use]
    pub fn dup(&self) -> Self {
        self.clone()
    }

    /// Returns the canonical absolute path of this entry.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Reports whether this entry is a folder.
    #[must_use]
    pub const fn is_folder(&self) -> bool {
        self.is_folder
    }

    /// Returns the realm-specific attachment, if any.
    #[must_use]
    pub const fn attachment(&self) -> Option<u32> {
        self.attachment
    }

    /// Returns a copy of this descriptor with `is_folder` overridden.
    #[must_use]
    pub fn with_is_folder(&self, is_folder: bool) -> Self {
        Self {
            path: self.path.clone(),
            is_folder,
            attachment: self.attachment,
        }
    }
}

impl PartialEq for FileDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for FileDescriptor {}

impl Hash for FileDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
    }
}

/// Deduplicates a sequence of descriptors by path, keeping the last
/// occurrence of each path (later entries in the sequence are assumed to
/// be more authoritative, e.g. a freshly reloaded remote listing).
#[must_use]
pub fn unique_by_path(files: impl IntoIterator<Item = FileDescriptor>) -> Vec<FileDescriptor> {
    let mut by_path: rustc_hash::FxHashMap<String, FileDescriptor> = rustc_hash::FxHashMap::default();
    for file in files {
        by_path.insert(file.path().to_string(), file);
    }
    by_path.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_and_hash_ignore_is_folder_and_attachment() {
        let a = FileDescriptor::new("/a/b", false);
        let b = FileDescriptor::with_attachment("/a/b", true, 42);
        assert_eq!(a, b);

        let mut set = std::collections::HashSet::new();
        set.insert(a);
        assert!(!set.insert(b));
    }

    #[test]
    fn unique_by_path_keeps_one_entry_per_path() {
        let files = vec![
            FileDescriptor::new("/a", false),
            FileDescriptor::new("/b", false),
            FileDescriptor::new("/a", true),
        ];
        let unique = unique_by_path(files);
        assert_eq!(unique.len(), 2);
    }
}
