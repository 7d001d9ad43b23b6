//! Local filesystem inventory collection.
//!
//! Mirrors the traversal shape of the remote device collector: a
//! descendant walk for the contents of a tree, and a separate ancestor
//! probe for the chain of parent folders leading down to it. Keeping the
//! two walks distinct, rather than always walking from `/`, is what lets
//! the planner handle source and target paths that don't share a common
//! collected root.

use std::io;

use jwalk::WalkDir;

use crate::descriptor::FileDescriptor;

/// Walks the tree rooted at `path` and returns a descriptor for every
/// file found under it (directories are not themselves returned; they
/// are implied by [`crate::Inventory::insert`]'s ancestor closure).
///
/// A missing root is not an error: an empty vector is returned, matching
/// the behavior of syncing against a source path that does not exist yet.
///
/// The walk is single-threaded by construction ([`jwalk::Parallelism::Serial`]),
/// since callers append the collected files into a planner inventory and
/// depend on collection order only for reproducibility of logs, not
/// correctness.
pub fn collect_descendants(path: &str) -> io::Result<Vec<FileDescriptor>> {
    if std::fs::symlink_metadata(path).is_err() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path).parallelism(jwalk::Parallelism::Serial) {
        let entry = entry?;
        if entry.file_type().is_dir() {
            continue;
        }
        let entry_path = entry.path();
        let entry_path = entry_path.to_string_lossy();
        files.push(FileDescriptor::new(paths::resolve(&entry_path)?, false));
    }
    Ok(files)
}

/// Probes each ancestor of `path`, from `/` down to (and including) `path`
/// itself, and returns a folder descriptor for every one that exists on
/// disk. Stops at the first missing ancestor, so a path none of whose
/// components exist yields an empty vector.
pub fn collect_ancestors(path: &str) -> io::Result<Vec<FileDescriptor>> {
    let resolved = paths::resolve(path)?;

    // Build the full prefix chain root-to-leaf.
    let segments: Vec<&str> = resolved.trim_start_matches('/').split('/').collect();
    let mut prefixes = vec!["/".to_string()];
    let mut running = String::new();
    for segment in &segments {
        if segment.is_empty() {
            continue;
        }
        running.push('/');
        running.push_str(segment);
        prefixes.push(running.clone());
    }

    let mut files = Vec::new();
    for prefix in prefixes {
        match std::fs::symlink_metadata(&prefix) {
            Ok(_) => files.push(FileDescriptor::new(prefix, true)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => break,
            Err(err) => return Err(err),
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn collect_descendants_of_missing_path_is_empty() {
        let files = collect_descendants("/definitely/not/a/real/path/for/this/test").unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn collect_descendants_returns_files_not_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir(root.join("sub")).unwrap();
        fs::write(root.join("a.txt"), b"hi").unwrap();
        fs::write(root.join("sub").join("b.txt"), b"there").unwrap();

        let files = collect_descendants(root.to_str().unwrap()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| !f.is_folder()));
    }

    #[test]
    fn collect_ancestors_stops_at_first_missing_component() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir(root.join("present")).unwrap();

        let probe = root.join("present").join("missing").join("deeper");
        let files = collect_ancestors(probe.to_str().unwrap()).unwrap();

        let last_existing = root.join("present");
        assert!(files
            .iter()
            .any(|f| f.path() == last_existing.to_str().unwrap()));
        assert!(!files
            .iter()
            .any(|f| f.path().ends_with("missing") || f.path().ends_with("deeper")));
    }

    #[test]
    fn collect_ancestors_all_marked_as_folders() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let files = collect_ancestors(root.to_str().unwrap()).unwrap();
        assert!(files.iter().all(FileDescriptor::is_folder));
    }
}
