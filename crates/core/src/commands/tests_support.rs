//! An in-memory [`DeviceLibrary`] fake shared by every orchestrator's test
//! module. Two devices are always enumerated (matching the shape of
//! `engine::device_library`'s own fake), each holding a mutable object
//! tree a test can pre-populate before driving a command against it.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;

use engine::device_library::{
    DeviceLibrary, EntryKind, FileTypeHint, ProgressFn, RawDevice, RemoteEntry, StorageVolume,
};

#[derive(Clone)]
pub struct FakeNode {
    pub id: u32,
    pub parent_id: u32,
    pub name: String,
    pub kind: EntryKind,
    pub size: u64,
}

#[derive(Default)]
struct FakeDeviceState {
    serial: String,
    storage_id: u32,
    storage_description: String,
    free_bytes: u64,
    max_bytes: u64,
    next_id: u32,
    nodes: Vec<FakeNode>,
    blobs: HashMap<u32, Vec<u8>>,
    deleted: Vec<u32>,
}

/// A two-device fake. Tests seed each device's object tree with
/// [`FakeLibrary::add_entry`]/[`FakeLibrary::set_blob`] before driving an
/// orchestrator; `enumerate()` always reports both devices, so tests that
/// only care about one restrict with a `--device` filter, same as a real
/// invocation would.
pub struct FakeLibrary {
    devices: RefCell<Vec<FakeDeviceState>>,
}

impl FakeLibrary {
    pub fn empty() -> Self {
        Self {
            devices: RefCell::new(vec![FakeDeviceState::default(), FakeDeviceState::default()]),
        }
    }

    pub fn add_entry(&self, device_index: usize, id: u32, parent_id: u32, name: &str, kind: EntryKind, size: u64) {
        let mut devices = self.devices.borrow_mut();
        let state = &mut devices[device_index];
        state.next_id = state.next_id.max(id + 1);
        state.nodes.push(FakeNode {
            id,
            parent_id,
            name: name.to_string(),
            kind,
            size,
        });
    }

    pub fn set_blob(&self, device_index: usize, id: u32, bytes: Vec<u8>) {
        self.devices.borrow_mut()[device_index].blobs.insert(id, bytes);
    }

    pub fn deleted(&self, device_index: usize) -> Vec<u32> {
        self.devices.borrow()[device_index].deleted.clone()
    }

    pub fn nodes(&self, device_index: usize) -> Vec<FakeNode> {
        self.devices.borrow()[device_index].nodes.clone()
    }
}

pub fn seeded_library() -> FakeLibrary {
    let lib = FakeLibrary::empty();
    {
        let mut devices = lib.devices.borrow_mut();
        devices[0] = FakeDeviceState {
            serial: "ABC123".to_string(),
            storage_id: 0x0001_0002,
            storage_description: "Internal".to_string(),
            free_bytes: 1_000_000,
            max_bytes: 2_000_000,
            next_id: 1,
            ..Default::default()
        };
        devices[1] = FakeDeviceState {
            serial: "XYZ999".to_string(),
            storage_id: 0x0003_0004,
            storage_description: "SD card".to_string(),
            free_bytes: 1_000_000,
            max_bytes: 2_000_000,
            next_id: 1,
            ..Default::default()
        };
    }
    lib
}

impl DeviceLibrary for FakeLibrary {
    type Handle = usize;

    fn init() -> Result<(), String> {
        Ok(())
    }

    fn enumerate() -> Result<Vec<RawDevice>, String> {
        Ok(vec![RawDevice { index: 0 }, RawDevice { index: 1 }])
    }

    fn open(&self, raw: &RawDevice) -> Result<Self::Handle, String> {
        Ok(raw.index as usize)
    }

    fn release(&self, _handle: Self::Handle) {}

    fn friendly_name(&self, _handle: &Self::Handle) -> Result<String, String> {
        Ok("Fake Device".to_string())
    }

    fn serial(&self, handle: &Self::Handle) -> Result<String, String> {
        Ok(self.devices.borrow()[*handle].serial.clone())
    }

    fn storage_volumes(&self, handle: &Self::Handle) -> Result<Vec<StorageVolume>, String> {
        let state = &self.devices.borrow()[*handle];
        Ok(vec![StorageVolume {
            id: state.storage_id,
            free_bytes: state.free_bytes,
            max_bytes: state.max_bytes,
            description: state.storage_description.clone(),
        }])
    }

    fn list_files(
        &self,
        handle: &Self::Handle,
        _storage_id: u32,
        folder_id: u32,
    ) -> Result<Vec<RemoteEntry>, String> {
        Ok(self.devices.borrow()[*handle]
            .nodes
            .iter()
            .filter(|node| node.parent_id == folder_id)
            .map(|node| RemoteEntry {
                id: node.id,
                parent_id: node.parent_id,
                name: node.name.clone(),
                size: node.size,
                kind: node.kind,
            })
            .collect())
    }

    fn create_folder(
        &self,
        handle: &Self::Handle,
        _storage_id: u32,
        parent_id: u32,
        name: &str,
    ) -> Result<u32, String> {
        let mut devices = self.devices.borrow_mut();
        let state = &mut devices[*handle];
        let id = state.next_id;
        state.next_id += 1;
        state.nodes.push(FakeNode {
            id,
            parent_id,
            name: name.to_string(),
            kind: EntryKind::Folder,
            size: 0,
        });
        Ok(id)
    }

    #[allow(clippy::too_many_arguments)]
    fn send_file(
        &self,
        handle: &Self::Handle,
        local_path: &Path,
        parent_id: u32,
        _storage_id: u32,
        filename: &str,
        size: u64,
        _type_hint: FileTypeHint,
        _progress: &mut ProgressFn<'_>,
    ) -> Result<u32, String> {
        let bytes = std::fs::read(local_path).map_err(|e| e.to_string())?;
        let mut devices = self.devices.borrow_mut();
        let state = &mut devices[*handle];
        let id = state.next_id;
        state.next_id += 1;
        state.nodes.push(FakeNode {
            id,
            parent_id,
            name: filename.to_string(),
            kind: EntryKind::File,
            size,
        });
        state.blobs.insert(id, bytes);
        Ok(id)
    }

    fn get_file(
        &self,
        handle: &Self::Handle,
        id: u32,
        local_path: &Path,
        _progress: &mut ProgressFn<'_>,
    ) -> Result<(), String> {
        let bytes = self.devices.borrow()[*handle]
            .blobs
            .get(&id)
            .cloned()
            .ok_or_else(|| format!("no blob for object {id}"))?;
        std::fs::write(local_path, bytes).map_err(|e| e.to_string())
    }

    fn delete_object(&self, handle: &Self::Handle, id: u32) -> Result<(), String> {
        let mut devices = self.devices.borrow_mut();
        let state = &mut devices[*handle];
        state.nodes.retain(|node| node.id != id);
        state.deleted.push(id);
        Ok(())
    }

    fn dump_errorstack(&self, _handle: &Self::Handle) {}
    fn clear_errorstack(&self, _handle: &Self::Handle) {}
}
