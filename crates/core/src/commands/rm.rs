//! The `rm` command: delete files and folders from a device.
//!
//! Grounded on original_source `mtp_rm.c`: each given path is resolved
//! against the storage root, every matching remote entry across all
//! given paths is pooled (deduplicated by path), and the resulting
//! removal plan executes through the same remote executor `push` uses.

use std::io::Write;

use engine::device_library::{collect_remote, for_each_matching_device, DeviceLibrary};
use engine::executor::{PlanExecutor, RemoteExecutor};
use engine::plan_remove;

use crate::confirm::Confirm;
use crate::error::{CoreError, CoreResult, ErrorKind};
use crate::output::{self, Direction};

/// Deletes every remote entry at or under any of `paths`, pooled and
/// deduplicated, on every matching device/storage pair.
///
/// # Errors
///
/// Returns [`ErrorKind::NoDevice`] if a filter was given and matched no
/// device, [`ErrorKind::Rejected`] if the user declines the confirmation
/// prompt, or whatever [`engine::EngineError`] the executor surfaces.
pub fn rm<D: DeviceLibrary>(
    device: &D,
    device_filter: Option<&str>,
    storage_filter: Option<&str>,
    paths: &[String],
    yes: bool,
    confirm: &mut impl Confirm,
    out: &mut impl Write,
    colorize: bool,
) -> CoreResult<()> {
    let resolved_paths: Vec<String> = paths.iter().map(|path| paths::resolve_cwd("/", path)).collect();

    let matched = for_each_matching_device(device, device_filter, storage_filter, |dev, handle, _raw, _serial, storage| {
        let mut remote_inventory = collect_remote(dev, handle, storage.id)?;

        let pooled = flist::unique_by_path(
            resolved_paths
                .iter()
                .flat_map(|path| remote_inventory.filter_prefix(path)),
        );
        let plan = plan_remove(pooled);

        if plan.is_empty() {
            writeln!(out, "No files to delete.")?;
            return Ok::<_, CoreError>(());
        }

        output::print_plan(out, &plan, Direction::Push, colorize)?;

        if !yes && !confirm.confirm("Proceed [y/n]? ")? {
            return Err(CoreError::new(ErrorKind::Rejected, "Action declined by user, exiting."));
        }

        let mut executor = RemoteExecutor::new(dev, handle, storage.id, &mut remote_inventory, storage.free_bytes);
        for step in &plan {
            executor.apply(step, &mut |done, total| {
                let _ = output::print_progress(out, "RM", step.target.path(), done, total);
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
