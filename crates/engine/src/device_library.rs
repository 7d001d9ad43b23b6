//! The capability abstraction the planner and remote executor depend on,
//! instead of reaching into a specific MTP binding directly.
//!
//! The original implementation calls straight into libmtp throughout
//! `mtp.c` and `device.c`. Expressing the same surface as a trait here
//! means the remote executor, and anything that tests it, can be written
//! once against `DeviceLibrary` and never recompiled against a different
//! device backend. The `device` crate supplies the only production
//! implementor, bound to the real libmtp library; tests in this crate
//! use an in-memory fake.

use std::path::Path;

use flist::FileDescriptor;

/// One attached MTP device, before it has been opened.
#[derive(Debug, Clone)]
pub struct RawDevice {
    /// Index of this device within the current enumeration.
    pub index: u32,
}

/// A storage volume on an open device.
#[derive(Debug, Clone)]
pub struct StorageVolume {
    /// The device library's numeric id for this volume.
    pub id: u32,
    /// Bytes currently free.
    pub free_bytes: u64,
    /// Total capacity in bytes.
    pub max_bytes: u64,
    /// Human-readable description (e.g. "Internal storage").
    pub description: String,
}

/// Whether a remote entry is a file or a folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A regular file.
    File,
    /// A folder.
    Folder,
}

/// One entry returned by [`DeviceLibrary::list_files`].
#[derive(Debug, Clone)]
pub struct RemoteEntry {
    /// The device library's numeric object id.
    pub id: u32,
    /// The numeric id of the containing folder.
    pub parent_id: u32,
    /// The entry's name, not a full path.
    pub name: String,
    /// Size in bytes (meaningless for folders).
    pub size: u64,
    /// File or folder.
    pub kind: EntryKind,
}

/// A hint passed to [`DeviceLibrary::send_file`] describing the kind of
/// content being transferred, derived from the lowercased file extension
/// against a fixed table (§9 open question 3: this table is a
/// configuration constant, not a behavioral contract — transfers of an
/// unrecognized type must succeed exactly as well as a recognized one).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileTypeHint {
    /// No table entry matched the extension.
    Unknown,
    Mp3,
    Wav,
    Wma,
    Ogg,
    Flac,
    Aac,
    M4a,
    Mp2,
    Jpeg,
    Png,
    Gif,
    Bmp,
    Tiff,
    Mp4,
    Avi,
    Mpeg,
    Wmv,
    Asf,
    Quicktime,
    Text,
    Html,
    Xml,
    Doc,
    Xls,
    Ppt,
    Firmware,
    Playlist,
    Album,
    VCalendar,
    VCard,
}

/// Maps a lowercased file extension (without the leading `.`) onto a
/// [`FileTypeHint`]. Unmatched extensions return [`FileTypeHint::Unknown`].
#[must_use]
pub fn hint_for_extension(extension: &str) -> FileTypeHint {
    match extension {
        "mp3" => FileTypeHint::Mp3,
        "wav" => FileTypeHint::Wav,
        "wma" => FileTypeHint::Wma,
        "ogg" | "oga" => FileTypeHint::Ogg,
        "flac" => FileTypeHint::Flac,
        "aac" => FileTypeHint::Aac,
        "m4a" | "m4b" | "m4p" => FileTypeHint::M4a,
        "mp2" => FileTypeHint::Mp2,
        "jpg" | "jpeg" | "jpe" | "jfif" => FileTypeHint::Jpeg,
        "png" => FileTypeHint::Png,
        "gif" => FileTypeHint::Gif,
        "bmp" => FileTypeHint::Bmp,
        "tif" | "tiff" => FileTypeHint::Tiff,
        "mp4" | "m4v" => FileTypeHint::Mp4,
        "avi" => FileTypeHint::Avi,
        "mpg" | "mpeg" | "mpe" => FileTypeHint::Mpeg,
        "wmv" => FileTypeHint::Wmv,
        "asf" => FileTypeHint::Asf,
        "mov" | "qt" => FileTypeHint::Quicktime,
        "txt" | "log" | "md" => FileTypeHint::Text,
        "htm" | "html" => FileTypeHint::Html,
        "xml" => FileTypeHint::Xml,
        "doc" | "docx" => FileTypeHint::Doc,
        "xls" | "xlsx" => FileTypeHint::Xls,
        "ppt" | "pptx" => FileTypeHint::Ppt,
        "bin" | "fw" | "img" => FileTypeHint::Firmware,
        "m3u" | "m3u8" | "pls" => FileTypeHint::Playlist,
        "zpl" => FileTypeHint::Album,
        "vcs" | "ics" => FileTypeHint::VCalendar,
        "vcf" => FileTypeHint::VCard,
        _ => FileTypeHint::Unknown,
    }
}

/// Per-call progress, `(bytes_done, bytes_total)`.
pub type ProgressFn<'a> = dyn FnMut(u64, u64) + 'a;

/// The numeric parent id meaning "the storage volume's root folder".
pub const ROOT_PARENT: u32 = 0xFFFF_FFFF;

/// Inbound dependency the engine consumes to talk to MTP devices.
///
/// Every method that reaches the physical device can fail; errors are
/// returned as plain strings rather than a typed error, matching the
/// spec's treatment of the device library as an opaque external
/// dependency whose own error representation we don't control.
pub trait DeviceLibrary {
    /// An opened device handle.
    type Handle;

    /// Initializes the underlying library. Must be called once per
    /// process before any other method.
    fn init() -> Result<(), String>;

    /// Enumerates currently attached raw devices.
    fn enumerate() -> Result<Vec<RawDevice>, String>;

    /// Opens a raw device, returning a live handle.
    fn open(&self, raw: &RawDevice) -> Result<Self::Handle, String>;

    /// Releases a device handle, flushing any pending state.
    fn release(&self, handle: Self::Handle);

    /// Returns the device's user-assigned friendly name.
    fn friendly_name(&self, handle: &Self::Handle) -> Result<String, String>;

    /// Returns the device's serial number.
    fn serial(&self, handle: &Self::Handle) -> Result<String, String>;

    /// Lists the storage volumes available on the device.
    fn storage_volumes(&self, handle: &Self::Handle) -> Result<Vec<StorageVolume>, String>;

    /// Lists the immediate children of `folder_id` on `storage_id`.
    /// Pass [`ROOT_PARENT`] to list the volume's root.
    fn list_files(
        &self,
        handle: &Self::Handle,
        storage_id: u32,
        folder_id: u32,
    ) -> Result<Vec<RemoteEntry>, String>;

    /// Creates a folder named `name` under `parent_id`, returning its new id.
    fn create_folder(
        &self,
        handle: &Self::Handle,
        storage_id: u32,
        parent_id: u32,
        name: &str,
    ) -> Result<u32, String>;

    /// Sends `local_path`'s contents to the device under `parent_id`,
    /// returning the new object's id.
    #[allow(clippy::too_many_arguments)]
    fn send_file(
        &self,
        handle: &Self::Handle,
        local_path: &Path,
        parent_id: u32,
        storage_id: u32,
        filename: &str,
        size: u64,
        type_hint: FileTypeHint,
        progress: &mut ProgressFn<'_>,
    ) -> Result<u32, String>;

    /// Retrieves object `id` from the device into `local_path`.
    fn get_file(
        &self,
        handle: &Self::Handle,
        id: u32,
        local_path: &Path,
        progress: &mut ProgressFn<'_>,
    ) -> Result<(), String>;

    /// Deletes object `id` from the device.
    fn delete_object(&self, handle: &Self::Handle, id: u32) -> Result<(), String>;

    /// Prints the library's pending error stack to stderr.
    fn dump_errorstack(&self, handle: &Self::Handle);

    /// Clears the library's pending error stack.
    fn clear_errorstack(&self, handle: &Self::Handle);
}

/// Walks a device's storage volume breadth-first from its root folder and
/// returns a descriptor for every file and folder found, with paths
/// rendered under `mount_path` (mirrors [`flist::local::collect_descendants`],
/// the local-filesystem counterpart of this walk).
///
/// Each descriptor's attachment carries the device's own object id, so a
/// later [`crate::executor::RemoteExecutor`] can address an existing
/// remote entry without relooking it up by path.
pub fn collect_remote<D: DeviceLibrary>(
    device: &D,
    handle: &D::Handle,
    storage_id: u32,
) -> Result<flist::Inventory, String> {
    let mut inventory = flist::Inventory::new();
    let mut pending = vec![(ROOT_PARENT, "/".to_string())];

    while let Some((folder_id, folder_path)) = pending.pop() {
        for entry in device.list_files(handle, storage_id, folder_id)? {
            let path = paths::join(&folder_path, &entry.name);
            let is_folder = entry.kind == EntryKind::Folder;
            inventory.insert(FileDescriptor::with_attachment(path.clone(), is_folder, entry.id));
            if is_folder {
                pending.push((entry.id, path));
            }
        }
    }

    Ok(inventory)
}

/// Pure predicate mirroring original_source `mtp.c`'s `match_device`'s
/// device half: a filter beginning with `SN:` compares the remainder
/// against the device's serial number; otherwise it must parse as an
/// unsigned integer equal to the device's enumeration index. `None`
/// (no `--device`/`-d` given) matches everything.
#[must_use]
pub fn device_matches(serial: &str, index: u32, filter: Option<&str>) -> bool {
    match filter {
        None => true,
        Some(id) => match id.strip_prefix("SN:") {
            Some(sn) => sn == serial,
            None => id.parse::<u32>().is_ok_and(|n| n == index),
        },
    }
}

/// Pure predicate mirroring `match_device`'s storage half: the volume's id
/// is compared, zero-padded to 8 lowercase hex digits, against the literal
/// filter string. `None` (no `--storage`/`-s` given) matches everything.
#[must_use]
pub fn storage_matches(storage_id: u32, filter: Option<&str>) -> bool {
    match filter {
        None => true,
        Some(id) => format!("{storage_id:08x}") == id,
    }
}

/// Opens every attached device in turn and invokes `on_match` once for
/// every `(device, storage volume)` pair passing `device_filter` and
/// `storage_filter`, mirroring original_source's `mtp_each_device` loop
/// over `match_device`.
///
/// Returns whether at least one pair matched, so a caller can distinguish
/// "matched nothing" from "matched, and `on_match` did nothing".
///
/// `E` need only be constructible from the device library's plain-string
/// errors (`From<String>`), so this function stays usable from any
/// caller's own error type without this crate depending on it.
///
/// # Errors
///
/// Propagates the first error from `D::init`, `D::enumerate`, `device.open`,
/// `device.storage_volumes`, or `on_match`. A device is always released
/// before its error (or `on_match`'s) is returned.
pub fn for_each_matching_device<D, E, F>(
    device: &D,
    device_filter: Option<&str>,
    storage_filter: Option<&str>,
    mut on_match: F,
) -> Result<bool, E>
where
    D: DeviceLibrary,
    E: From<String>,
    F: FnMut(&D, &D::Handle, &RawDevice, &str, &StorageVolume) -> Result<(), E>,
{
    D::init().map_err(E::from)?;
    let raw_devices = D::enumerate().map_err(E::from)?;
    let mut matched_any = false;

    for raw in &raw_devices {
        let handle = device.open(raw).map_err(E::from)?;
        let serial = device.serial(&handle).unwrap_or_default();

        let outcome = (|| -> Result<(), E> {
            let volumes = device.storage_volumes(&handle).map_err(E::from)?;
            for storage in &volumes {
                if device_matches(&serial, raw.index, device_filter)
                    && storage_matches(storage.id, storage_filter)
                {
                    matched_any = true;
                    on_match(device, &handle, raw, &serial, storage)?;
                }
            }
            Ok(())
        })();

        device.release(handle);
        outcome?;
    }

    Ok(matched_any)
}
