use crate::descriptor::FileDescriptor;

/// A path-keyed collection of [`FileDescriptor`]s that is always closed
/// under ancestors: if `/a/b/c` is present, so are `/a/b` and `/a`, each
/// recorded as a folder. The root `/` is always present.
///
/// Both the local and remote collectors build an `Inventory` independently;
/// the planner only ever compares two inventories against each other, never
/// reaching past this type into a realm's native representation.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    by_path: rustc_hash::FxHashMap<String, FileDescriptor>,
}

impl Inventory {
    /// Creates an empty inventory, seeded with the root folder.
    #[must_use]
    pub fn new() -> Self {
        let mut by_path = rustc_hash::FxHashMap::default();
        by_path.insert("/".to_string(), FileDescriptor::new("/", true));
        Self { by_path }
    }

    /// Builds an inventory from a sequence of descriptors, closing the
    /// result over ancestors as required.
    #[must_use]
    pub fn from_files(files: impl IntoIterator<Item = FileDescriptor>) -> Self {
        let mut inventory = Self::new();
        for file in files {
            inventory.insert(file);
        }
        inventory
    }

    /// Inserts a descriptor, materializing any missing ancestor folders.
    ///
    /// An ancestor materialized this way is inserted as a folder even if a
    /// later call inserts the same path explicitly; callers that collect
    /// ancestors from a real filesystem or device should insert those
    /// first so `is_folder` reflects the real entry where one exists.
    pub fn insert(&mut self, file: FileDescriptor) {
        self.close_over_ancestors(file.path());
        self.by_path.insert(file.path().to_string(), file);
    }

    fn close_over_ancestors(&mut self, path: &str) {
        let mut current = paths::dirname(path);
        loop {
            if self.by_path.contains_key(&current) {
                return;
            }
            self.by_path
                .insert(current.clone(), FileDescriptor::new(current.clone(), true));
            if current == "/" {
                return;
            }
            current = paths::dirname(&current);
        }
    }

    /// Looks up a descriptor by exact path.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&FileDescriptor> {
        self.by_path.get(path)
    }

    /// Reports whether `path` is present in this inventory.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.by_path.contains_key(path)
    }

    /// Removes a descriptor by exact path, returning it if present. Does
    /// not remove descendants or re-close ancestors; callers that remove a
    /// folder are expected to remove its descendants explicitly first.
    pub fn remove(&mut self, path: &str) -> Option<FileDescriptor> {
        self.by_path.remove(path)
    }

    /// Returns the number of entries, including the root and all
    /// materialized ancestor folders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    /// Reports whether this inventory contains nothing but the root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_path.len() <= 1
    }

    /// Iterates over all descriptors in unspecified order.
    pub fn values(&self) -> impl Iterator<Item = &FileDescriptor> {
        self.by_path.values()
    }

    /// Returns every descriptor equal to `prefix` or lexically nested
    /// under it, sorted ascending by path. `"/"` matches every entry.
    #[must_use]
    pub fn filter_prefix(&self, prefix: &str) -> Vec<FileDescriptor> {
        let mut matches: Vec<FileDescriptor> = self
            .by_path
            .values()
            .filter(|file| is_prefix_or_self(prefix, file.path()))
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.path().cmp(b.path()));
        matches
    }
}

/// Reports whether `path` is equal to `prefix` or nested under it.
///
/// `"/"` is the prefix of every path. Otherwise nesting requires a `/`
/// boundary so that `/ab` is not considered nested under `/a`.
#[must_use]
pub fn is_prefix_or_self(prefix: &str, path: &str) -> bool {
    if prefix == "/" {
        return true;
    }
    if path == prefix {
        return true;
    }
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.starts_with('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_inventory_contains_only_root() {
        let inventory = Inventory::new();
        assert_eq!(inventory.len(), 1);
        assert!(inventory.get("/").unwrap().is_folder());
    }

    #[test]
    fn insert_materializes_missing_ancestors_as_folders() {
        let mut inventory = Inventory::new();
        inventory.insert(FileDescriptor::new("/a/b/c", false));

        assert!(inventory.get("/a").unwrap().is_folder());
        assert!(inventory.get("/a/b").unwrap().is_folder());
        let leaf = inventory.get("/a/b/c").unwrap();
        assert!(!leaf.is_folder());
    }

    #[test]
    fn insert_does_not_clobber_an_already_present_ancestor() {
        let mut inventory = Inventory::new();
        inventory.insert(FileDescriptor::with_attachment("/a", true, 7));
        inventory.insert(FileDescriptor::new("/a/b", false));

        assert_eq!(inventory.get("/a").unwrap().attachment(), Some(7));
    }

    #[test]
    fn filter_prefix_matches_self_and_descendants_only() {
        let mut inventory = Inventory::new();
        inventory.insert(FileDescriptor::new("/a/b", false));
        inventory.insert(FileDescriptor::new("/ab", false));
        inventory.insert(FileDescriptor::new("/a/c", false));

        let matches = inventory.filter_prefix("/a");
        let paths: Vec<&str> = matches.iter().map(FileDescriptor::path).collect();
        assert_eq!(paths, vec!["/a", "/a/b", "/a/c"]);
    }

    #[test]
    fn filter_prefix_root_matches_everything() {
        let mut inventory = Inventory::new();
        inventory.insert(FileDescriptor::new("/x/y", false));
        assert_eq!(inventory.filter_prefix("/").len(), inventory.len());
    }
}
