//! The `push` command: sync a local source tree onto a device target.
//!
//! Grounded on original_source `mtp_push.c`. One deliberate divergence,
//! called out in the crate's design ledger: the original bails out
//! before ever touching a device when the local source tree is empty;
//! this port still opens the device so `--cleanup` can prune stray
//! device files even when there is nothing new to send.

use std::io::Write;

use engine::device_library::{collect_remote, for_each_matching_device, DeviceLibrary};
use engine::executor::{PlanExecutor, RemoteExecutor};
use engine::{build_specs, plan_sync};
use flist::local::collect_descendants;
use flist::Inventory;

use crate::confirm::Confirm;
use crate::error::{CoreError, CoreResult, ErrorKind};
use crate::output::{self, Direction};

/// Pushes every file under `from_path` onto `to_path` on every matching
/// device/storage pair, pruning stray device files first when `cleanup`
/// is set.
///
/// # Errors
///
/// Returns [`ErrorKind::NoDevice`] if a filter was given and matched no
/// device, [`ErrorKind::Rejected`] if the user declines the confirmation
/// prompt, or whatever [`engine::EngineError`] the planner or executor
/// surfaces.
#[allow(clippy::too_many_arguments)]
pub fn push<D: DeviceLibrary>(
    device: &D,
    device_filter: Option<&str>,
    storage_filter: Option<&str>,
    from_path: &str,
    to_path: &str,
    cleanup: bool,
    yes: bool,
    confirm: &mut impl Confirm,
    out: &mut impl Write,
    colorize: bool,
) -> CoreResult<()> {
    let from_path_r = paths::resolve(from_path)?;
    let to_path_r = paths::resolve_cwd("/", to_path);

    let files = collect_descendants(&from_path_r)?;
    if files.is_empty() {
        writeln!(out, "No files in local path: {from_path_r}")?;
    }

    let local_inventory = Inventory::from_files(files.iter().cloned());
    let specs = build_specs(&files, &from_path_r, &to_path_r);

    let matched = for_each_matching_device(device, device_filter, storage_filter, |dev, handle, _raw, _serial, storage| {
        let mut remote_inventory = collect_remote(dev, handle, storage.id)?;
        let plan = plan_sync(&local_inventory, &remote_inventory, &specs, cleanup)?;

        if plan.is_empty() {
            writeln!(out, "All files already present on the device.")?;
            return Ok::<_, CoreError>(());
        }

        output::print_plan(out, &plan, Direction::Push, colorize)?;

        if !yes && !confirm.confirm("Proceed [y/n]? ")? {
            return Err(CoreError::new(ErrorKind::Rejected, "Action declined by user, exiting."));
        }

        let mut executor = RemoteExecutor::new(dev, handle, storage.id, &mut remote_inventory, storage.free_bytes);
        for step in &plan {
            executor.apply(step, &mut |done, total| {
                let _ = output::print_progress(out, "PUSH", step.target.path(), done, total);
            })?;
            if step.action == engine::SyncAction::Xfer {
                output::finish_progress(out)?;
            }
        }

        Ok(())
    })?;

    if (device_filter.is_some() || storage_filter.is_some()) && !matched {
        return Err(CoreError::new(
            ErrorKind::NoDevice,
            "no device matched the given --device/--storage filter",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests_support::seeded_library;
    use crate::confirm::AlwaysYes;

    #[test]
    fn pushes_local_tree_onto_empty_device() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.mp3"), b"hi").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub").join("b.mp3"), b"there").unwrap();

        let lib = seeded_library();
        let mut out = Vec::new();
        push(
            &lib,
            Some("0"),
            None,
            dir.path().to_str().unwrap(),
            "/music",
            false,
            true,
            &mut AlwaysYes,
            &mut out,
            false,
        )
        .unwrap();

        let nodes = lib.nodes(0);
        assert!(nodes.iter().any(|n| n.name == "music"));
        assert!(nodes.iter().any(|n| n.name == "a.mp3"));
        assert!(nodes.iter().any(|n| n.name == "sub"));
        assert!(nodes.iter().any(|n| n.name == "b.mp3"));
    }

    #[test]
    fn empty_source_with_cleanup_still_prunes_device() {
        let dir = tempfile::tempdir().unwrap();

        let lib = seeded_library();
        lib.add_entry(0, 1, engine::device_library::ROOT_PARENT, "stray.mp3", engine::device_library::EntryKind::File, 4);

        let mut out = Vec::new();
        push(
            &lib,
            Some("0"),
            None,
            dir.path().to_str().unwrap(),
            "/",
            true,
            true,
            &mut AlwaysYes,
            &mut out,
            false,
        )
        .unwrap();

        assert_eq!(lib.deleted(0), vec![1]);
    }

    #[test]
    fn declined_confirmation_is_rejected_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.mp3"), b"hi").unwrap();

        let lib = seeded_library();
        let mut out = Vec::new();
        let mut confirm = crate::confirm::ScriptedConfirm::new([false]);
        let err = push(
            &lib,
            Some("0"),
            None,
            dir.path().to_str().unwrap(),
            "/",
            false,
            false,
            &mut confirm,
            &mut out,
            false,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Rejected);
    }
}
