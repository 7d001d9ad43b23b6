//! The sync planner: compares a source and target inventory against a set
//! of [`SyncSpec`]s and produces an ordered [`PlanStep`] sequence.
//!
//! The planner touches no I/O and holds no state between calls; every
//! entry point is a pure function over its inputs, which is what makes
//! the idempotence and ordering properties checkable without a device or
//! a filesystem.

use std::cmp::Ordering;
use std::collections::HashSet;

use flist::{FileDescriptor, Inventory};

use crate::error::EngineError;
use crate::plan::{PlanStep, SyncAction, SyncSpec};

/// Computes the ordered plan that brings `target_inv` in line with
/// `source_inv` according to `specs`.
///
/// Walks each spec's target path upward from the leaf, emitting a
/// `MKDIR` for every missing ancestor folder and an `XFER` for the leaf
/// itself (or a `MKDIR` if the leaf is itself a folder), stopping as
/// soon as an ancestor is already present in the working index. When
/// `cleanup` is set, a second pass removes every target entry that
/// ended up outside the set of paths the sync legitimately produced.
///
/// # Errors
///
/// Returns [`EngineError::SourceMissing`] if a spec names a source path
/// absent from `source_inv`. A planning failure yields no partial plan.
pub fn plan_sync(
    source_inv: &Inventory,
    target_inv: &Inventory,
    specs: &[SyncSpec],
    cleanup: bool,
) -> Result<Vec<PlanStep>, EngineError> {
    let mut working = target_inv.clone();
    let mut expected: HashSet<String> = HashSet::new();
    let mut steps = Vec::new();

    for spec in specs {
        let source_desc = source_inv
            .get(&spec.source_path)
            .ok_or_else(|| EngineError::SourceMissing(spec.source_path.clone()))?;
        let leaf_is_folder = source_desc.is_folder();

        mark_expected(&mut expected, &spec.target_path);
        materialize_missing_ancestors(
            &mut working,
            &mut steps,
            source_desc,
            &spec.target_path,
            leaf_is_folder,
        );
    }

    if cleanup {
        for stray in working
            .values()
            .filter(|file| file.path() != "/" && !expected.contains(file.path()))
        {
            steps.push(PlanStep::rm(stray.dup()));
        }
    }

    steps.sort_by(compare_steps);
    Ok(steps)
}

/// Adds `target_path` and every proper ancestor up to (not including)
/// `/` to the expected-paths set.
fn mark_expected(expected: &mut HashSet<String>, target_path: &str) {
    expected.insert(target_path.to_string());
    let mut current = paths::dirname(target_path);
    while current != "/" {
        expected.insert(current.clone());
        current = paths::dirname(&current);
    }
}

/// Walks from `target_path` upward through its ancestors, emitting a
/// plan step and inserting into `working` for each one missing, and
/// stopping at the first ancestor already present.
fn materialize_missing_ancestors(
    working: &mut Inventory,
    steps: &mut Vec<PlanStep>,
    source_desc: &FileDescriptor,
    target_path: &str,
    leaf_is_folder: bool,
) {
    let mut chain = Vec::new();
    let mut current = target_path.to_string();
    loop {
        chain.push(current.clone());
        if current == "/" {
            break;
        }
        current = paths::dirname(&current);
    }

    for (depth, path) in chain.iter().enumerate() {
        if working.contains(path) {
            break;
        }
        let is_leaf = depth == 0;
        let is_folder = if is_leaf { leaf_is_folder } else { true };
        let target_desc = FileDescriptor::new(path.clone(), is_folder);

        let step = if is_leaf && !is_folder {
            PlanStep::xfer(source_desc.dup(), target_desc.clone())
        } else {
            PlanStep::mkdir(target_desc.clone())
        };
        steps.push(step);
        working.insert(target_desc);
    }
}

/// Computes the plan that removes every entry in `files`, deduplicated
/// by path, ordered so that a folder is removed only after its contents.
#[must_use]
pub fn plan_remove(files: impl IntoIterator<Item = FileDescriptor>) -> Vec<PlanStep> {
    let mut steps: Vec<PlanStep> = flist::unique_by_path(files)
        .into_iter()
        .map(PlanStep::rm)
        .collect();
    steps.sort_by(compare_steps);
    steps
}

/// Builds one [`SyncSpec`] per non-folder descriptor in `files`, rewriting
/// its path from under `from_prefix` to under `to_prefix`. Folders are
/// skipped; their targets are inferred as ancestors of the files that do
/// get specs.
#[must_use]
pub fn build_specs(files: &[FileDescriptor], from_prefix: &str, to_prefix: &str) -> Vec<SyncSpec> {
    files
        .iter()
        .filter(|file| !file.is_folder())
        .map(|file| {
            let suffix = strip_prefix(file.path(), from_prefix);
            SyncSpec {
                source_path: file.path().to_string(),
                target_path: paths::join(to_prefix, &suffix),
            }
        })
        .collect()
}

fn strip_prefix(path: &str, prefix: &str) -> String {
    if prefix == "/" {
        return path.trim_start_matches('/').to_string();
    }
    path.strip_prefix(prefix)
        .map(|rest| rest.trim_start_matches('/').to_string())
        .unwrap_or_else(|| path.to_string())
}

fn slash_count(path: &str) -> usize {
    path.matches('/').count()
}

/// Orders plan steps for execution: `RM` before `MKDIR` before `XFER`,
/// `RM` deepest-first, `MKDIR` shallowest-first, ties broken
/// lexicographically by target path.
#[must_use]
pub fn compare_steps(a: &PlanStep, b: &PlanStep) -> Ordering {
    a.action
        .cmp(&b.action)
        .then_with(|| match a.action {
            SyncAction::Rm => slash_count(b.target.path()).cmp(&slash_count(a.target.path())),
            SyncAction::Mkdir => slash_count(a.target.path()).cmp(&slash_count(b.target.path())),
            SyncAction::Xfer => Ordering::Equal,
        })
        .then_with(|| a.target.path().cmp(b.target.path()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inventory_from(paths: &[&str]) -> Inventory {
        Inventory::from_files(paths.iter().map(|p| FileDescriptor::new(*p, false)))
    }

    fn action_tag(step: &PlanStep) -> &'static str {
        match step.action {
            SyncAction::Rm => "RM",
            SyncAction::Mkdir => "MKDIR",
            SyncAction::Xfer => "XFER",
        }
    }

    fn rendered(steps: &[PlanStep]) -> Vec<String> {
        steps
            .iter()
            .map(|s| format!("{} {}", action_tag(s), s.target.path()))
            .collect()
    }

    fn seed_source() -> Inventory {
        inventory_from(&[
            "/src/test/one/01.mp3",
            "/src/test/one/02.mp3",
            "/src/test/one/03.mp3",
            "/src/test/one/nested/subfolder/04.mp3",
            "/src/test/two/11.mp3",
            "/src/test/two/12.mp3",
            "/src/test/two/13.mp3",
            "/src/three/21.mp3",
        ])
    }

    fn seed_target() -> Inventory {
        inventory_from(&["/tgt/test/one/03.mp3", "/tgt/four/five/six/31.mp3"])
    }

    fn seed_specs() -> Vec<SyncSpec> {
        build_specs(
            &seed_source().values().cloned().collect::<Vec<_>>(),
            "/src",
            "/tgt",
        )
    }

    #[test]
    fn push_with_cleanup_matches_seeded_plan() {
        let plan = plan_sync(&seed_source(), &seed_target(), &seed_specs(), true).unwrap();
        assert_eq!(
            rendered(&plan),
            vec![
                "RM /tgt/four/five/six/31.mp3",
                "RM /tgt/four/five/six",
                "RM /tgt/four/five",
                "RM /tgt/four",
                "MKDIR /tgt/three",
                "MKDIR /tgt/test/two",
                "MKDIR /tgt/test/one/nested",
                "MKDIR /tgt/test/one/nested/subfolder",
                "XFER /tgt/test/one/01.mp3",
                "XFER /tgt/test/one/02.mp3",
                "XFER /tgt/test/one/nested/subfolder/04.mp3",
                "XFER /tgt/test/two/11.mp3",
                "XFER /tgt/test/two/12.mp3",
                "XFER /tgt/test/two/13.mp3",
                "XFER /tgt/three/21.mp3",
            ]
        );
    }

    #[test]
    fn push_without_cleanup_omits_leading_rm_steps() {
        let plan = plan_sync(&seed_source(), &seed_target(), &seed_specs(), false).unwrap();
        assert!(plan.iter().all(|s| s.action != SyncAction::Rm));
        assert_eq!(plan.len(), 11);
    }

    #[test]
    fn already_present_target_is_skipped() {
        let plan = plan_sync(&seed_source(), &seed_target(), &seed_specs(), false).unwrap();
        assert!(!plan
            .iter()
            .any(|s| s.target.path() == "/tgt/test/one/03.mp3"));
    }

    #[test]
    fn missing_source_is_a_planning_failure() {
        let specs = vec![SyncSpec {
            source_path: "/does/not/exist".to_string(),
            target_path: "/tgt/x".to_string(),
        }];
        let err = plan_sync(&seed_source(), &seed_target(), &specs, false).unwrap_err();
        assert!(matches!(err, EngineError::SourceMissing(_)));
    }

    #[test]
    fn order_law_mkdir_ancestors_precede_their_xfer() {
        let plan = plan_sync(&seed_source(), &seed_target(), &seed_specs(), true).unwrap();
        for (i, step) in plan.iter().enumerate() {
            if step.action != SyncAction::Xfer {
                continue;
            }
            let mut ancestor = paths::dirname(step.target.path());
            while ancestor != "/" {
                let already_present = seed_target().contains(&ancestor);
                let appears_earlier = plan[..i].iter().any(|s| {
                    s.action == SyncAction::Mkdir && s.target.path() == ancestor
                });
                assert!(already_present || appears_earlier, "{ancestor} missing before index {i}");
                ancestor = paths::dirname(&ancestor);
            }
        }
    }

    #[test]
    fn order_law_rm_descendants_precede_their_folder() {
        let plan = plan_sync(&seed_source(), &seed_target(), &seed_specs(), true).unwrap();
        let rm_positions: Vec<(usize, &str)> = plan
            .iter()
            .enumerate()
            .filter(|(_, s)| s.action == SyncAction::Rm)
            .map(|(i, s)| (i, s.target.path()))
            .collect();
        for &(i, path) in &rm_positions {
            for &(j, other) in &rm_positions {
                if i == j {
                    continue;
                }
                if is_strict_descendant(other, path) {
                    assert!(j < i, "{other} must precede {path}");
                }
            }
        }
    }

    fn is_strict_descendant(candidate: &str, ancestor: &str) -> bool {
        candidate != ancestor && flist::is_prefix_or_self(ancestor, candidate)
    }

    #[test]
    fn idempotent_replan_after_successful_execution_is_empty() {
        let plan = plan_sync(&seed_source(), &seed_target(), &seed_specs(), false).unwrap();
        let mut next_target = seed_target();
        for step in &plan {
            next_target.insert(step.target.dup());
        }
        let replan = plan_sync(&seed_source(), &next_target, &seed_specs(), false).unwrap();
        assert!(replan.is_empty());
    }

    #[test]
    fn cleanup_removed_set_equals_working_minus_expected() {
        let plan = plan_sync(&seed_source(), &seed_target(), &seed_specs(), true).unwrap();
        let removed: HashSet<&str> = plan
            .iter()
            .filter(|s| s.action == SyncAction::Rm)
            .map(|s| s.target.path())
            .collect();
        assert_eq!(removed.len(), 4);
        assert!(removed.contains("/tgt/four/five/six/31.mp3"));
        assert!(removed.contains("/tgt/four/five/six"));
        assert!(removed.contains("/tgt/four/five"));
        assert!(removed.contains("/tgt/four"));
    }

    #[test]
    fn plan_remove_dedups_and_orders_descendants_first() {
        let files = vec![
            FileDescriptor::new("/test/one", true),
            FileDescriptor::new("/test/one/a.mp3", false),
            FileDescriptor::new("/test/one/a.mp3", false),
            FileDescriptor::new("/test/one/sub", true),
            FileDescriptor::new("/test/one/sub/b.mp3", false),
        ];
        let plan = plan_remove(files);
        let paths: Vec<&str> = plan.iter().map(|s| s.target.path()).collect();
        assert_eq!(paths.len(), 4);
        assert!(paths.iter().position(|p| *p == "/test/one/sub/b.mp3").unwrap()
            < paths.iter().position(|p| *p == "/test/one/sub").unwrap());
        assert!(paths.iter().position(|p| *p == "/test/one/sub").unwrap()
            < paths.iter().position(|p| *p == "/test/one").unwrap());
    }

    #[test]
    fn build_specs_skips_folders_and_rewrites_prefix() {
        let files = vec![
            FileDescriptor::new("/src/a", true),
            FileDescriptor::new("/src/a/b.mp3", false),
        ];
        let specs = build_specs(&files, "/src", "/tgt");
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].source_path, "/src/a/b.mp3");
        assert_eq!(specs[0].target_path, "/tgt/a/b.mp3");
    }
}
