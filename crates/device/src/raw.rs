//! Minimal raw FFI surface over `libmtp`.
//!
//! Only the functions and struct fields this crate actually touches are
//! declared; this is not a general-purpose libmtp binding. Struct layouts
//! mirror the public `libmtp.h` headers closely enough to read the fields
//! [`super::library`] needs (storage list, error stack, file list) without
//! claiming ABI completeness for fields nothing here uses.

use std::ffi::CStr;
use std::os::raw::{c_char, c_int, c_void};

use engine::device_library::FileTypeHint;

pub const LIBMTP_ERROR_NONE: c_int = 0;
pub const LIBMTP_ERROR_NO_DEVICE_ATTACHED: c_int = 2;

pub const LIBMTP_FILETYPE_FOLDER: c_int = 1;
const LIBMTP_FILETYPE_UNKNOWN: c_int = 0;
const LIBMTP_FILETYPE_WAV: c_int = 2;
const LIBMTP_FILETYPE_MP3: c_int = 3;
const LIBMTP_FILETYPE_WMA: c_int = 4;
const LIBMTP_FILETYPE_OGG: c_int = 5;
const LIBMTP_FILETYPE_MP4: c_int = 7;
const LIBMTP_FILETYPE_WMV: c_int = 9;
const LIBMTP_FILETYPE_AVI: c_int = 10;
const LIBMTP_FILETYPE_MPEG: c_int = 11;
const LIBMTP_FILETYPE_ASF: c_int = 12;
const LIBMTP_FILETYPE_QT: c_int = 13;
const LIBMTP_FILETYPE_JPEG: c_int = 15;
const LIBMTP_FILETYPE_TIFF: c_int = 17;
const LIBMTP_FILETYPE_BMP: c_int = 18;
const LIBMTP_FILETYPE_GIF: c_int = 19;
const LIBMTP_FILETYPE_PNG: c_int = 21;
const LIBMTP_FILETYPE_VCALENDAR2: c_int = 23;
const LIBMTP_FILETYPE_VCARD3: c_int = 25;
const LIBMTP_FILETYPE_TEXT: c_int = 29;
const LIBMTP_FILETYPE_HTML: c_int = 30;
const LIBMTP_FILETYPE_FIRMWARE: c_int = 31;
const LIBMTP_FILETYPE_AAC: c_int = 32;
const LIBMTP_FILETYPE_FLAC: c_int = 34;
const LIBMTP_FILETYPE_MP2: c_int = 35;
const LIBMTP_FILETYPE_M4A: c_int = 36;
const LIBMTP_FILETYPE_DOC: c_int = 37;
const LIBMTP_FILETYPE_XML: c_int = 38;
const LIBMTP_FILETYPE_XLS: c_int = 39;
const LIBMTP_FILETYPE_PPT: c_int = 40;
const LIBMTP_FILETYPE_ALBUM: c_int = 44;
const LIBMTP_FILETYPE_PLAYLIST: c_int = 45;

pub type LIBMTPFiletype = c_int;

/// Maps a [`FileTypeHint`] onto the numeric `LIBMTP_FILETYPE_*` constant
/// `libmtp` expects in `LIBMTP_file_t::filetype`. Values not covered by
/// the table fall back to `LIBMTP_FILETYPE_UNKNOWN`.
#[must_use]
pub fn filetype_for_hint(hint: FileTypeHint) -> LIBMTPFiletype {
    match hint {
        FileTypeHint::Unknown => LIBMTP_FILETYPE_UNKNOWN,
        FileTypeHint::Mp3 => LIBMTP_FILETYPE_MP3,
        FileTypeHint::Wav => LIBMTP_FILETYPE_WAV,
        FileTypeHint::Wma => LIBMTP_FILETYPE_WMA,
        FileTypeHint::Ogg => LIBMTP_FILETYPE_OGG,
        FileTypeHint::Flac => LIBMTP_FILETYPE_FLAC,
        FileTypeHint::Aac => LIBMTP_FILETYPE_AAC,
        FileTypeHint::M4a => LIBMTP_FILETYPE_M4A,
        FileTypeHint::Mp2 => LIBMTP_FILETYPE_MP2,
        FileTypeHint::Jpeg => LIBMTP_FILETYPE_JPEG,
        FileTypeHint::Png => LIBMTP_FILETYPE_PNG,
        FileTypeHint::Gif => LIBMTP_FILETYPE_GIF,
        FileTypeHint::Bmp => LIBMTP_FILETYPE_BMP,
        FileTypeHint::Tiff => LIBMTP_FILETYPE_TIFF,
        FileTypeHint::Mp4 => LIBMTP_FILETYPE_MP4,
        FileTypeHint::Avi => LIBMTP_FILETYPE_AVI,
        FileTypeHint::Mpeg => LIBMTP_FILETYPE_MPEG,
        FileTypeHint::Wmv => LIBMTP_FILETYPE_WMV,
        FileTypeHint::Asf => LIBMTP_FILETYPE_ASF,
        FileTypeHint::Quicktime => LIBMTP_FILETYPE_QT,
        FileTypeHint::Text => LIBMTP_FILETYPE_TEXT,
        FileTypeHint::Html => LIBMTP_FILETYPE_HTML,
        FileTypeHint::Xml => LIBMTP_FILETYPE_XML,
        FileTypeHint::Doc => LIBMTP_FILETYPE_DOC,
        FileTypeHint::Xls => LIBMTP_FILETYPE_XLS,
        FileTypeHint::Ppt => LIBMTP_FILETYPE_PPT,
        FileTypeHint::Firmware => LIBMTP_FILETYPE_FIRMWARE,
        FileTypeHint::Playlist => LIBMTP_FILETYPE_PLAYLIST,
        FileTypeHint::Album => LIBMTP_FILETYPE_ALBUM,
        FileTypeHint::VCalendar => LIBMTP_FILETYPE_VCALENDAR2,
        FileTypeHint::VCard => LIBMTP_FILETYPE_VCARD3,
    }
}

#[repr(C)]
pub struct LIBMTPDeviceEntry {
    pub vendor: *mut c_char,
    pub vendor_id: u16,
    pub product: *mut c_char,
    pub product_id: u16,
    pub device_flags: u32,
}

#[repr(C)]
pub struct LIBMTPRawDevice {
    pub device_entry: LIBMTPDeviceEntry,
    pub bus_location: u32,
    pub devnum: u8,
}

#[repr(C)]
pub struct LIBMTPDeviceStorage {
    pub id: u32,
    pub storage_type: u16,
    pub filesystem_type: u16,
    pub access_capability: u16,
    pub max_capacity: u64,
    pub free_space_in_bytes: u64,
    pub free_space_in_objects: u64,
    pub storage_description: *mut c_char,
    pub volume_identifier: *mut c_char,
    pub next: *mut LIBMTPDeviceStorage,
    pub prev: *mut LIBMTPDeviceStorage,
}

impl LIBMTPDeviceStorage {
    /// Reads `storage_description` without taking ownership of it.
    pub fn storage_description_lossy(&self) -> Option<String> {
        if self.storage_description.is_null() {
            return None;
        }
        // SAFETY: `storage_description` is non-null and owned by the
        // device's still-live storage list.
        Some(unsafe { CStr::from_ptr(self.storage_description) }.to_string_lossy().into_owned())
    }
}

#[repr(C)]
pub struct LIBMTPError {
    pub errornumber: c_int,
    pub error_text: *mut c_char,
    pub next: *mut LIBMTPError,
}

#[repr(C)]
pub struct LIBMTPDevice {
    pub object_bitsize: u8,
    pub params: *mut c_void,
    pub usbinfo: *mut c_void,
    pub storage: *mut LIBMTPDeviceStorage,
    pub errorstack: *mut LIBMTPError,
}

#[repr(C)]
pub struct LIBMTPFile {
    pub item_id: u32,
    pub parent_id: u32,
    pub storage_id: u32,
    pub filename: *mut c_char,
    pub filesize: u64,
    pub modificationdate: libc::time_t,
    pub filetype: c_int,
    pub next: *mut LIBMTPFile,
}

impl LIBMTPFile {
    /// Reads `filename` without taking ownership of it.
    pub fn filename_lossy(&self) -> Option<String> {
        if self.filename.is_null() {
            return None;
        }
        // SAFETY: `filename` is non-null and owned by this still-live
        // list node.
        Some(unsafe { CStr::from_ptr(self.filename) }.to_string_lossy().into_owned())
    }
}

pub type ProgressFunc = extern "C" fn(sent: u64, total: u64, data: *const c_void) -> c_int;

unsafe extern "C" {
    pub fn LIBMTP_Init();

    pub fn LIBMTP_Detect_Raw_Devices(
        devices: *mut *mut LIBMTPRawDevice,
        numdevs: *mut c_int,
    ) -> c_int;

    pub fn LIBMTP_Open_Raw_Device_Uncached(raw_device: *mut LIBMTPRawDevice) -> *mut LIBMTPDevice;

    pub fn LIBMTP_Release_Device(device: *mut LIBMTPDevice);

    pub fn LIBMTP_Get_Storage(device: *mut LIBMTPDevice, sort_by: c_int) -> c_int;

    pub fn LIBMTP_Get_Friendlyname(device: *mut LIBMTPDevice) -> *mut c_char;

    pub fn LIBMTP_Get_Serialnumber(device: *mut LIBMTPDevice) -> *mut c_char;

    pub fn LIBMTP_Get_Files_And_Folders(
        device: *mut LIBMTPDevice,
        storage_id: u32,
        folder_id: u32,
    ) -> *mut LIBMTPFile;

    pub fn LIBMTP_new_file_t() -> *mut LIBMTPFile;

    pub fn LIBMTP_destroy_file_t(file: *mut LIBMTPFile);

    pub fn LIBMTP_Create_Folder(
        device: *mut LIBMTPDevice,
        name: *mut c_char,
        parent_id: u32,
        storage_id: u32,
    ) -> u32;

    pub fn LIBMTP_Send_File_From_File(
        device: *mut LIBMTPDevice,
        path: *const c_char,
        filedata: *mut LIBMTPFile,
        callback: Option<ProgressFunc>,
        data: *const c_void,
    ) -> c_int;

    pub fn LIBMTP_Get_File_To_File(
        device: *mut LIBMTPDevice,
        id: u32,
        path: *const c_char,
        callback: Option<ProgressFunc>,
        data: *const c_void,
    ) -> c_int;

    pub fn LIBMTP_Delete_Object(device: *mut LIBMTPDevice, object_id: u32) -> c_int;

    pub fn LIBMTP_Dump_Errorstack(device: *mut LIBMTPDevice);

    pub fn LIBMTP_Clear_Errorstack(device: *mut LIBMTPDevice);
}
