//! Plan executors: apply an ordered [`PlanStep`] sequence to a realm.
//!
//! Local and remote share one trait so command orchestrators in `core`
//! never branch on which realm they're driving; only construction of the
//! executor differs between push, pull, and rm.

use std::path::Path;

use flist::{FileDescriptor, Inventory};

use crate::device_library::{hint_for_extension, DeviceLibrary, ProgressFn, ROOT_PARENT};
use crate::error::EngineError;
use crate::plan::{PlanStep, SyncAction};

/// Applies one plan step to a realm, reporting progress for transfers.
pub trait PlanExecutor {
    /// Applies `step`. `progress` is invoked for the duration of an
    /// `XFER` step only; other actions ignore it.
    fn apply(&mut self, step: &PlanStep, progress: &mut ProgressFn<'_>) -> Result<(), EngineError>;
}

/// Executes plan steps against the local filesystem.
///
/// `XFER` steps pull their content from a device via `D`; `push`
/// executes against the remote realm instead (see [`RemoteExecutor`]) so
/// a `LocalExecutor` only ever needs to read from a device, never write
/// to one.
pub struct LocalExecutor<'a, D: DeviceLibrary> {
    device: &'a D,
    handle: &'a D::Handle,
}

impl<'a, D: DeviceLibrary> LocalExecutor<'a, D> {
    /// Creates a local executor bound to the given device handle, used
    /// to satisfy `XFER` steps pulled from the device.
    pub fn new(device: &'a D, handle: &'a D::Handle) -> Self {
        Self { device, handle }
    }
}

impl<'a, D: DeviceLibrary> PlanExecutor for LocalExecutor<'a, D> {
    fn apply(&mut self, step: &PlanStep, progress: &mut ProgressFn<'_>) -> Result<(), EngineError> {
        match step.action {
            SyncAction::Mkdir => mkdir_local(step.target.path()),
            SyncAction::Xfer => {
                let source = step.source.as_ref().ok_or_else(|| {
                    EngineError::Internal("XFER step missing source descriptor".to_string())
                })?;
                let id = source.attachment().ok_or_else(|| {
                    EngineError::Internal("XFER source missing device attachment".to_string())
                })?;
                self.device
                    .get_file(self.handle, id, Path::new(step.target.path()), progress)
                    .map_err(EngineError::Device)?;
                tracing::info!(target = step.target.path(), "fetched file from device");
                Ok(())
            }
            SyncAction::Rm => rm_local(step.target.path()),
        }
    }
}

fn mkdir_local(path: &str) -> Result<(), EngineError> {
    match std::fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(EngineError::AlreadyExists(path.to_string())),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            std::fs::create_dir(path)?;
            tracing::debug!(target = path, "created local folder");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

fn rm_local(path: &str) -> Result<(), EngineError> {
    let meta = std::fs::symlink_metadata(path)?;
    if meta.is_dir() {
        std::fs::remove_dir(path)?;
    } else {
        std::fs::remove_file(path)?;
    }
    tracing::debug!(target = path, "removed local entry");
    Ok(())
}

/// Executes plan steps against an open (device, storage-volume) pair.
///
/// Keeps the device's live inventory and remaining free capacity in sync
/// with applied steps so a multi-step plan never needs to reload from
/// the device mid-execution.
pub struct RemoteExecutor<'a, D: DeviceLibrary> {
    device: &'a D,
    handle: &'a D::Handle,
    storage_id: u32,
    inventory: &'a mut Inventory,
    free_bytes: u64,
}

impl<'a, D: DeviceLibrary> RemoteExecutor<'a, D> {
    /// Creates a remote executor. `free_bytes` should be the storage
    /// volume's current free capacity, as reported by the device library.
    pub fn new(
        device: &'a D,
        handle: &'a D::Handle,
        storage_id: u32,
        inventory: &'a mut Inventory,
        free_bytes: u64,
    ) -> Self {
        Self {
            device,
            handle,
            storage_id,
            inventory,
            free_bytes,
        }
    }

    /// Remaining free capacity as tracked after applied transfers.
    #[must_use]
    pub const fn free_bytes(&self) -> u64 {
        self.free_bytes
    }

    fn parent_id(&self, target_path: &str) -> Result<u32, EngineError> {
        let parent_path = paths::dirname(target_path);
        if parent_path == "/" {
            return Ok(ROOT_PARENT);
        }
        self.inventory
            .get(&parent_path)
            .and_then(FileDescriptor::attachment)
            .ok_or_else(|| {
                EngineError::Internal(format!("parent folder {parent_path} has no device id"))
            })
    }
}

impl<'a, D: DeviceLibrary> PlanExecutor for RemoteExecutor<'a, D> {
    fn apply(&mut self, step: &PlanStep, progress: &mut ProgressFn<'_>) -> Result<(), EngineError> {
        match step.action {
            SyncAction::Mkdir => self.mkdir(step),
            SyncAction::Xfer => self.xfer(step, progress),
            SyncAction::Rm => self.rm(step),
        }
    }
}

impl<'a, D: DeviceLibrary> RemoteExecutor<'a, D> {
    fn mkdir(&mut self, step: &PlanStep) -> Result<(), EngineError> {
        let path = step.target.path();
        if let Some(existing) = self.inventory.get(path) {
            return if existing.is_folder() {
                Ok(())
            } else {
                Err(EngineError::AlreadyExists(path.to_string()))
            };
        }

        let parent_id = self.parent_id(path)?;
        let name = paths::basename(path);
        let new_id = self
            .device
            .create_folder(self.handle, self.storage_id, parent_id, &name)
            .map_err(EngineError::Device)?;
        tracing::debug!(target = path, id = new_id, "created remote folder");
        self.inventory
            .insert(FileDescriptor::with_attachment(path, true, new_id));
        Ok(())
    }

    fn xfer(&mut self, step: &PlanStep, progress: &mut ProgressFn<'_>) -> Result<(), EngineError> {
        let path = step.target.path();
        if self.inventory.contains(path) {
            tracing::warn!(target = path, "push target already exists, skipping");
            return Ok(());
        }

        let source = step
            .source
            .as_ref()
            .ok_or_else(|| EngineError::Internal("XFER step missing source descriptor".to_string()))?;
        let local_meta = std::fs::metadata(source.path())?;
        let size = local_meta.len();
        if size > self.free_bytes {
            return Err(EngineError::NoSpace {
                needed: size,
                available: self.free_bytes,
            });
        }

        let parent_id = self.parent_id(path)?;
        let filename = paths::basename(path);
        let extension = filename
            .rsplit_once('.')
            .map_or("", |(_, ext)| ext)
            .to_ascii_lowercase();
        let hint = hint_for_extension(&extension);

        let new_id = self
            .device
            .send_file(
                self.handle,
                Path::new(source.path()),
                parent_id,
                self.storage_id,
                &filename,
                size,
                hint,
                progress,
            )
            .map_err(EngineError::Device)?;

        tracing::info!(target = path, bytes = size, "sent file to device");
        self.inventory
            .insert(FileDescriptor::with_attachment(path, false, new_id));
        self.free_bytes -= size;
        Ok(())
    }

    fn rm(&mut self, step: &PlanStep) -> Result<(), EngineError> {
        let path = step.target.path();
        let descriptor = self
            .inventory
            .remove(path)
            .ok_or_else(|| EngineError::Internal(format!("{path} missing from live inventory")))?;
        let id = descriptor
            .attachment()
            .ok_or_else(|| EngineError::Internal(format!("{path} has no device id")))?;
        self.device
            .delete_object(self.handle, id)
            .map_err(EngineError::Device)?;
        tracing::debug!(target = path, id, "deleted remote object");
        Ok(())
    }
}

/// Drains a device's pending error stack: dumps it to stderr, then
/// clears it, so a subsequent call starts clean. Call after any
/// `DeviceLibrary` method surfaces an error.
pub fn drain_device_errors<D: DeviceLibrary>(device: &D, handle: &D::Handle) {
    device.dump_errorstack(handle);
    device.clear_errorstack(handle);
}
