//! The `devices` command: enumerate attached (device, storage) pairs.
//!
//! Grounded on original_source `mtp_devices.c`: print a device header only
//! the first time a new device index is seen, then one storage block per
//! matching volume.

use std::io::Write;

use engine::device_library::{for_each_matching_device, DeviceLibrary};

use crate::error::{CoreError, CoreResult, ErrorKind};
use crate::output;

/// Prints every attached device/storage pair matching `device_filter` and
/// `storage_filter`.
///
/// An empty enumeration is not an error when no filter was given — that is
/// simply "no devices attached". A filter that matches nothing *is* an
/// error, so a typo in `--device`/`--storage` is never silently a no-op.
///
/// # Errors
///
/// Returns [`ErrorKind::NoDevice`] if a filter was given and matched no
/// device, or [`ErrorKind::DeviceError`] if the device library itself
/// fails.
pub fn devices<D: DeviceLibrary>(
    device: &D,
    device_filter: Option<&str>,
    storage_filter: Option<&str>,
    out: &mut impl Write,
    colorize: bool,
) -> CoreResult<()> {
    let mut last_index: Option<u32> = None;

    let matched = for_each_matching_device(device, device_filter, storage_filter, |dev, handle, raw, serial, storage| {
        if last_index != Some(raw.index) {
            last_index = Some(raw.index);
            let friendly_name = dev.friendly_name(handle).unwrap_or_else(|_| "Unknown".to_string());
            output::print_device_header(out, &friendly_name, raw.index, serial, colorize)?;
        }
        output::print_storage(out, storage, colorize)?;
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests_support::{seeded_library, FakeLibrary};

    #[test]
    fn no_filter_and_no_devices_is_not_an_error() {
        let lib = FakeLibrary::empty();
        let mut out = Vec::new();
        devices(&lib, None, None, &mut out, false).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn lists_every_device_and_storage_without_filter() {
        let lib = seeded_library();
        let mut out = Vec::new();
        devices(&lib, None, None, &mut out, false).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Device:"));
        assert!(text.contains("Storage:"));
    }

    #[test]
    fn unmatched_filter_is_no_device_error() {
        let lib = seeded_library();
        let mut out = Vec::new();
        let err = devices(&lib, Some("SN:nope"), None, &mut out, false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoDevice);
    }
}
