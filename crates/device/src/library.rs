//! Safe wrapper binding [`engine::DeviceLibrary`] to the raw `libmtp` FFI
//! surface in [`crate::raw`].
//!
//! This module is the only place in the workspace carrying `unsafe` code.
//! Every `unsafe` block is narrowly scoped to one FFI call, with the
//! pointer-lifetime and null-checking invariant it depends on documented
//! immediately above it, mirroring how original_source's `device.c` and
//! `mtp.c` centralize raw `LIBMTP_*` calls behind one `Device` abstraction
//! instead of scattering them through callers.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_void;
use std::path::Path;
use std::sync::Once;

use engine::device_library::{
    DeviceLibrary, EntryKind, FileTypeHint, ProgressFn, RawDevice, RemoteEntry, StorageVolume,
};

use crate::raw;

static INIT: Once = Once::new();

/// Binds [`DeviceLibrary`] to the system `libmtp` shared library.
///
/// `enumerate()` has no `&self` (it mirrors `LIBMTP_Detect_Raw_Devices`,
/// which is a process-global call with no device-library state of its
/// own), so the raw device array it returns is cached in thread-local
/// storage rather than on this struct; `open()` reads it back by index.
#[derive(Default)]
pub struct LibmtpDevice;

/// An opened device handle, released on drop.
pub struct Handle {
    ptr: *mut raw::LIBMTPDevice,
}

impl Drop for Handle {
    fn drop(&mut self) {
        // SAFETY: `ptr` was returned by a successful
        // `LIBMTP_Open_Raw_Device_Uncached` call and has not been released
        // yet; `Handle` owns it exclusively.
        unsafe { raw::LIBMTP_Release_Device(self.ptr) };
    }
}

/// Converts a `libmtp`-owned, NUL-terminated C string into an owned
/// [`String`], freeing the original allocation. Returns `None` for a null
/// pointer.
///
/// # Safety
///
/// `ptr` must either be null or point at a NUL-terminated buffer allocated
/// by `libmtp` with `malloc`/`strdup`, not referenced again after this
/// call.
unsafe fn take_c_string(ptr: *mut std::os::raw::c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    // SAFETY: caller guarantees `ptr` is a valid NUL-terminated buffer.
    let owned = unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned();
    // SAFETY: `ptr` was allocated by libmtp's C allocator and is not used
    // again after this point.
    unsafe { libc::free(ptr.cast::<c_void>()) };
    Some(owned)
}

fn drain_errorstack_to_string(device: *mut raw::LIBMTPDevice) -> Option<String> {
    // SAFETY: `device` is a live, opened device pointer for the duration
    // of this call.
    let head = unsafe { (*device).errorstack };
    if head.is_null() {
        return None;
    }
    let mut messages = Vec::new();
    let mut node = head;
    while !node.is_null() {
        // SAFETY: `node` is a non-null link in libmtp's own error list,
        // valid until `LIBMTP_Clear_Errorstack` is called.
        let text = unsafe { (*node).error_text };
        if !text.is_null() {
            // SAFETY: `text` is a NUL-terminated buffer owned by the
            // error stack entry, not freed independently here.
            let message = unsafe { CStr::from_ptr(text) }.to_string_lossy().into_owned();
            messages.push(message);
        }
        // SAFETY: see above.
        node = unsafe { (*node).next };
    }
    Some(messages.join("; "))
}

fn extension_hint_code(hint: FileTypeHint) -> raw::LIBMTPFiletype {
    // The table is a configuration constant (spec §9 open question 3);
    // unmapped values fall back to the generic "unknown" filetype, which
    // libmtp accepts for any extension.
    raw::filetype_for_hint(hint)
}

impl DeviceLibrary for LibmtpDevice {
    type Handle = Handle;

    fn init() -> Result<(), String> {
        INIT.call_once(|| {
            // SAFETY: `LIBMTP_Init` is documented to be idempotent but is
            // still only called once per process via `Once`.
            unsafe { raw::LIBMTP_Init() };
        });
        Ok(())
    }

    fn enumerate() -> Result<Vec<RawDevice>, String> {
        let mut devices_ptr: *mut raw::LIBMTPRawDevice = std::ptr::null_mut();
        let mut count: std::os::raw::c_int = 0;

        // SAFETY: both output pointers are valid local stack slots;
        // `libmtp` writes through them exactly once.
        let status =
            unsafe { raw::LIBMTP_Detect_Raw_Devices(&mut devices_ptr, &mut count) };

        if status == raw::LIBMTP_ERROR_NO_DEVICE_ATTACHED {
            return Ok(Vec::new());
        }
        if status != raw::LIBMTP_ERROR_NONE {
            return Err(format!("LIBMTP_Detect_Raw_Devices failed (code {status})"));
        }

        let count = usize::try_from(count).unwrap_or(0);
        let mut owned = Vec::with_capacity(count);
        for i in 0..count {
            // SAFETY: `devices_ptr` points at a contiguous, `count`-long
            // array allocated by `libmtp`; `i < count`.
            let entry = unsafe { std::ptr::read(devices_ptr.add(i)) };
            owned.push(entry);
        }
        if !devices_ptr.is_null() {
            // SAFETY: the array itself (not its elements' nested
            // allocations) was allocated by libmtp's C allocator and has
            // been fully copied out above.
            unsafe { libc::free(devices_ptr.cast::<c_void>()) };
        }

        tracing::debug!(count = owned.len(), "enumerated raw MTP devices");
        let result = (0..owned.len())
            .map(|index| RawDevice {
                index: u32::try_from(index).unwrap_or(u32::MAX),
            })
            .collect();
        RAW_DEVICES.with_borrow_mut(|store| *store = owned);
        Ok(result)
    }

    fn open(&self, raw_device: &RawDevice) -> Result<Self::Handle, String> {
        let index = raw_device.index as usize;

        // SAFETY: the pointer handed to `LIBMTP_Open_Raw_Device_Uncached`
        // below only needs to stay valid for the duration of that single
        // call, so it is taken from the thread-local cache inside this
        // closure and not retained past it.
        let device = RAW_DEVICES.with_borrow_mut(|store| {
            let entry = store
                .get_mut(index)
                .ok_or_else(|| format!("no enumerated raw device at index {index}"))?;
            Ok::<_, String>(unsafe { raw::LIBMTP_Open_Raw_Device_Uncached(entry) })
        })?;
        if device.is_null() {
            return Err(format!("unable to open raw device {index}"));
        }

        // SAFETY: `device` was just opened successfully.
        let storage_status = unsafe { raw::LIBMTP_Get_Storage(device, 0) };
        if storage_status != 0 {
            // SAFETY: `device` is still valid; released on the error path.
            unsafe { raw::LIBMTP_Release_Device(device) };
            return Err("could not load device storage".to_string());
        }

        Ok(Handle { ptr: device })
    }

    fn release(&self, handle: Self::Handle) {
        drop(handle);
    }

    fn friendly_name(&self, handle: &Self::Handle) -> Result<String, String> {
        // SAFETY: `handle.ptr` is a live, opened device.
        let name = unsafe { raw::LIBMTP_Get_Friendlyname(handle.ptr) };
        // SAFETY: `name`, if non-null, is an owned allocation from libmtp.
        Ok(unsafe { take_c_string(name) }.unwrap_or_else(|| "Unknown".to_string()))
    }

    fn serial(&self, handle: &Self::Handle) -> Result<String, String> {
        // SAFETY: `handle.ptr` is a live, opened device.
        let serial = unsafe { raw::LIBMTP_Get_Serialnumber(handle.ptr) };
        // SAFETY: `serial`, if non-null, is an owned allocation from libmtp.
        unsafe { take_c_string(serial) }.ok_or_else(|| "device has no serial number".to_string())
    }

    fn storage_volumes(&self, handle: &Self::Handle) -> Result<Vec<StorageVolume>, String> {
        let mut volumes = Vec::new();
        // SAFETY: `handle.ptr` is a live, opened device whose `storage`
        // field was populated by `LIBMTP_Get_Storage` in `open`.
        let mut node = unsafe { (*handle.ptr).storage };
        while !node.is_null() {
            // SAFETY: `node` is a non-null link in the device's own
            // storage list, valid for the handle's lifetime.
            let storage = unsafe { &*node };
            volumes.push(StorageVolume {
                id: storage.id,
                free_bytes: storage.free_space_in_bytes,
                max_bytes: storage.max_capacity,
                description: storage
                    .storage_description_lossy()
                    .unwrap_or_else(|| "Storage".to_string()),
            });
            node = storage.next;
        }
        Ok(volumes)
    }

    fn list_files(
        &self,
        handle: &Self::Handle,
        storage_id: u32,
        folder_id: u32,
    ) -> Result<Vec<RemoteEntry>, String> {
        // SAFETY: `handle.ptr` is a live, opened device.
        let files = unsafe {
            raw::LIBMTP_Get_Files_And_Folders(handle.ptr, storage_id, folder_id)
        };
        if let Some(message) = drain_errorstack_to_string(handle.ptr) {
            // SAFETY: `handle.ptr` is live; clearing after dumping matches
            // original_source's dump-then-clear sequence (§7).
            unsafe { raw::LIBMTP_Clear_Errorstack(handle.ptr) };
            return Err(message);
        }

        let mut entries = Vec::new();
        let mut node = files;
        while !node.is_null() {
            // SAFETY: `node` is a non-null link in the list just returned
            // by `LIBMTP_Get_Files_And_Folders`, not yet destroyed.
            let file = unsafe { &*node };
            entries.push(RemoteEntry {
                id: file.item_id,
                parent_id: file.parent_id,
                name: file
                    .filename_lossy()
                    .unwrap_or_else(|| format!("object-{}", file.item_id)),
                size: file.filesize,
                kind: if file.filetype == raw::LIBMTP_FILETYPE_FOLDER {
                    EntryKind::Folder
                } else {
                    EntryKind::File
                },
            });
            node = file.next;
        }

        let mut cursor = files;
        while !cursor.is_null() {
            // SAFETY: `cursor` is a valid node owned by this call's
            // result list; `LIBMTP_destroy_file_t` frees exactly one node
            // and we have already read `next` before destroying it.
            let next = unsafe { (*cursor).next };
            unsafe { raw::LIBMTP_destroy_file_t(cursor) };
            cursor = next;
        }

        Ok(entries)
    }

    fn create_folder(
        &self,
        handle: &Self::Handle,
        storage_id: u32,
        parent_id: u32,
        name: &str,
    ) -> Result<u32, String> {
        let c_name = CString::new(name).map_err(|err| err.to_string())?;
        // SAFETY: `handle.ptr` is live; `c_name` outlives the call.
        let id = unsafe {
            raw::LIBMTP_Create_Folder(handle.ptr, c_name.as_ptr().cast_mut(), parent_id, storage_id)
        };
        if id == 0 {
            if let Some(message) = drain_errorstack_to_string(handle.ptr) {
                // SAFETY: `handle.ptr` is live.
                unsafe { raw::LIBMTP_Clear_Errorstack(handle.ptr) };
                return Err(message);
            }
            return Err(format!("failed to create folder {name}"));
        }
        Ok(id)
    }

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
    ) -> Result<u32, String> {
        let c_path = path_to_cstring(local_path)?;
        let c_name = CString::new(filename).map_err(|err| err.to_string())?;

        // SAFETY: `LIBMTP_new_file_t` returns an owned, non-null
        // allocation that this function populates and then hands to
        // `LIBMTP_Send_File_From_File`, which consumes it.
        let filedata = unsafe { raw::LIBMTP_new_file_t() };
        if filedata.is_null() {
            return Err("failed to allocate libmtp file descriptor".to_string());
        }
        // SAFETY: `filedata` was just allocated and is exclusively owned
        // here until passed to `send_file_from_file` below. `into_raw`
        // hands `libmtp` a buffer from Rust's global allocator, which on
        // every platform this crate targets is the system `malloc`, so
        // `LIBMTP_destroy_file_t`'s matching `free` is valid.
        unsafe {
            (*filedata).filename = c_name.into_raw();
            (*filedata).filesize = size;
            (*filedata).parent_id = parent_id;
            (*filedata).storage_id = storage_id;
            (*filedata).filetype = extension_hint_code(type_hint);
        }

        let mut progress = progress;
        // SAFETY: `progress_cell` is a local of this stack frame, kept
        // alive for the duration of the call below.
        let context = std::ptr::addr_of_mut!(progress).cast::<c_void>();
        // SAFETY: `handle.ptr` is live; `filedata` is a freshly populated,
        // uniquely owned descriptor consumed by this call regardless of
        // outcome; `context` points at `progress`, which outlives the
        // call.
        let status = unsafe {
            raw::LIBMTP_Send_File_From_File(
                handle.ptr,
                c_path.as_ptr(),
                filedata,
                Some(progress_trampoline_fn),
                context,
            )
        };

        if status != 0 {
            if let Some(message) = drain_errorstack_to_string(handle.ptr) {
                // SAFETY: `handle.ptr` is live.
                unsafe { raw::LIBMTP_Clear_Errorstack(handle.ptr) };
                return Err(message);
            }
            return Err(format!("failed to send file {filename}"));
        }

        // SAFETY: `filedata` is still valid; libmtp fills in `item_id` on
        // success.
        let new_id = unsafe { (*filedata).item_id };
        // SAFETY: ownership of `filedata` returns to us after the call.
        unsafe { raw::LIBMTP_destroy_file_t(filedata) };
        Ok(new_id)
    }

    fn get_file(
        &self,
        handle: &Self::Handle,
        id: u32,
        local_path: &Path,
        progress: &mut ProgressFn<'_>,
    ) -> Result<(), String> {
        let c_path = path_to_cstring(local_path)?;
        let mut progress = progress;
        let context = std::ptr::addr_of_mut!(progress).cast::<c_void>();

        // SAFETY: `handle.ptr` is live; `c_path` outlives the call and
        // `context` points at `progress`, a local of this stack frame
        // that outlives it too.
        let status = unsafe {
            raw::LIBMTP_Get_File_To_File(
                handle.ptr,
                id,
                c_path.as_ptr(),
                Some(progress_trampoline_fn),
                context,
            )
        };

        if status != 0 {
            if let Some(message) = drain_errorstack_to_string(handle.ptr) {
                // SAFETY: `handle.ptr` is live.
                unsafe { raw::LIBMTP_Clear_Errorstack(handle.ptr) };
                return Err(message);
            }
            return Err(format!("failed to fetch object {id}"));
        }
        Ok(())
    }

    fn delete_object(&self, handle: &Self::Handle, id: u32) -> Result<(), String> {
        // SAFETY: `handle.ptr` is live.
        let status = unsafe { raw::LIBMTP_Delete_Object(handle.ptr, id) };
        if status != 0 {
            if let Some(message) = drain_errorstack_to_string(handle.ptr) {
                // SAFETY: `handle.ptr` is live.
                unsafe { raw::LIBMTP_Clear_Errorstack(handle.ptr) };
                return Err(message);
            }
            return Err(format!("failed to delete object {id}"));
        }
        Ok(())
    }

    fn dump_errorstack(&self, handle: &Self::Handle) {
        // SAFETY: `handle.ptr` is live; libmtp writes the dump to stderr.
        unsafe { raw::LIBMTP_Dump_Errorstack(handle.ptr) };
    }

    fn clear_errorstack(&self, handle: &Self::Handle) {
        // SAFETY: `handle.ptr` is live.
        unsafe { raw::LIBMTP_Clear_Errorstack(handle.ptr) };
    }
}

thread_local! {
    /// Raw device structs from the most recent `LibmtpDevice::enumerate`
    /// call. See the note on [`LibmtpDevice`] for why this lives here
    /// instead of on the struct.
    static RAW_DEVICES: RefCell<Vec<raw::LIBMTPRawDevice>> = const { RefCell::new(Vec::new()) };
}

fn path_to_cstring(path: &Path) -> Result<CString, String> {
    let text = path.to_str().ok_or_else(|| "path is not valid UTF-8".to_string())?;
    CString::new(text).map_err(|err| err.to_string())
}

extern "C" fn progress_trampoline_fn(sent: u64, total: u64, data: *const c_void) -> std::os::raw::c_int {
    // SAFETY: `data` points at a `&mut ProgressFn` local that the caller
    // (`send_file`/`get_file`) keeps alive on its own stack frame for the
    // duration of the libmtp call this trampoline is invoked from.
    let callback = unsafe { &mut *(data.cast_mut().cast::<&mut ProgressFn<'_>>()) };
    callback(sent, total);
    0
}
