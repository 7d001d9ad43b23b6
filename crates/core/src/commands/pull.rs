//! The `pull` command: sync a device source tree onto the local
//! filesystem.
//!
//! Grounded on original_source `mtp_pull.c`: the destination defaults to
//! the source's basename under the current directory when omitted, and
//! pulling the device's root with no destination is a syntax error
//! rather than an implicit `.`.

use std::io::Write;

use engine::device_library::{collect_remote, for_each_matching_device, DeviceLibrary};
use engine::executor::{LocalExecutor, PlanExecutor};
use engine::{build_specs, plan_sync};
use flist::local::{collect_ancestors, collect_descendants};
use flist::Inventory;

use crate::confirm::Confirm;
use crate::error::{CoreError, CoreResult, ErrorKind};
use crate::output::{self, Direction};

/// Pulls every entry at or under `from_path` on the device down to
/// `to_path` (or, if omitted, `./<basename of from_path>`), pruning
/// stray local files first when `cleanup` is set.
///
/// # Errors
///
/// Returns [`ErrorKind::Syntax`] if `to_path` is omitted while pulling
/// the device root, [`ErrorKind::NoDevice`] if a filter was given and
/// matched no device, [`ErrorKind::Rejected`] if the user declines the
/// confirmation prompt, or whatever [`engine::EngineError`] the planner
/// or executor surfaces.
#[allow(clippy::too_many_arguments)]
pub fn pull<D: DeviceLibrary>(
    device: &D,
    device_filter: Option<&str>,
    storage_filter: Option<&str>,
    from_path: &str,
    to_path: Option<&str>,
    cleanup: bool,
    yes: bool,
    confirm: &mut impl Confirm,
    out: &mut impl Write,
    colorize: bool,
) -> CoreResult<()> {
    let from_path_r = paths::resolve_cwd("/", from_path);

    let to_path_r = match to_path {
        Some(explicit) => paths::resolve(explicit)?,
        None => {
            if from_path_r == "/" {
                return Err(CoreError::new(
                    ErrorKind::Syntax,
                    "Destination required when pulling device's root folder",
                ));
            }
            let basename = paths::basename(&from_path_r);
            paths::resolve(&format!("./{basename}"))?
        }
    };

    let ancestors = collect_ancestors(&to_path_r)?;
    let descendants = collect_descendants(&to_path_r)?;
    let local_inventory = Inventory::from_files(ancestors.into_iter().chain(descendants));

    let matched = for_each_matching_device(device, device_filter, storage_filter, |dev, handle, _raw, _serial, storage| {
        let remote_inventory = collect_remote(dev, handle, storage.id)?;
        let filtered = remote_inventory.filter_prefix(&from_path_r);
        let specs = build_specs(&filtered, &from_path_r, &to_path_r);

        let plan = plan_sync(&remote_inventory, &local_inventory, &specs, cleanup)?;

        if plan.is_empty() {
            writeln!(out, "All files already present on the local system.")?;
            return Ok::<_, CoreError>(());
        }

        output::print_plan(out, &plan, Direction::Pull, colorize)?;

        if !yes && !confirm.confirm("Proceed [y/n]? ")? {
            return Err(CoreError::new(ErrorKind::Rejected, "Action declined by user, exiting."));
        }

        let mut executor = LocalExecutor::new(dev, handle);
        for step in &plan {
            executor.apply(step, &mut |done, total| {
                let _ = output::print_progress(out, "PULL", step.target.path(), done, total);
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
