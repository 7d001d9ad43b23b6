//! The `ls` command: list every remote entry at or under a path.
//!
//! Grounded on original_source `mtp_ls.c`: resolve the requested path
//! against the storage root, collect the device's full object tree, then
//! print every entry equal to or nested under that path, one per line,
//! with a trailing `/` for folders.

use std::io::Write;

use engine::device_library::{collect_remote, for_each_matching_device, DeviceLibrary};

use crate::error::{CoreError, CoreResult, ErrorKind};

/// Lists every remote entry at or under `path` on every device/storage
/// pair matching `device_filter`/`storage_filter`.
///
/// # Errors
///
/// Returns [`ErrorKind::NoDevice`] if a filter was given and matched no
/// device, or [`ErrorKind::DeviceError`] if the device library itself
/// fails.
pub fn ls<D: DeviceLibrary>(
    device: &D,
    device_filter: Option<&str>,
    storage_filter: Option<&str>,
    path: &str,
    out: &mut impl Write,
) -> CoreResult<()> {
    let resolved = paths::resolve_cwd("/", path);

    let matched = for_each_matching_device(device, device_filter, storage_filter, |dev, handle, _raw, _serial, storage| {
        let inventory = collect_remote(dev, handle, storage.id)?;
        for entry in inventory.filter_prefix(&resolved) {
            let suffix = if entry.is_folder() { "/" } else { "" };
            writeln!(out, "{}{suffix}", entry.path()).map_err(|e| e.to_string())?;
        }
        Ok::<_, CoreError>(())
    })?;

    if (device_filter.is_some() || storage_filter.is_some()) && !matched {
        return Err(CoreError::new(
            ErrorKind::NoDevice,
            "no device matched the given --device/--storage filter",
        ));
    }

    Ok(())
}
