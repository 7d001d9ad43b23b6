//! One orchestrator per CLI command.
//!
//! Each function is a thin composition of inventory collection, planning,
//! printing, confirmation, and execution, generic over `D:
//! `[`engine::device_library::DeviceLibrary`] so production code drives it
//! with the real `device` crate binding and tests drive it with an
//! in-memory fake. Every orchestrator iterates every `(device, storage)`
//! pair matching the caller's `--device`/`--storage` filters, mirroring
//! original_source `mtp_each_device`.

mod devices;
mod ls;
mod pull;
mod push;
mod rm;
#[cfg(test)]
mod tests_support;

pub use devices::devices;
pub use ls::ls;
pub use pull::pull;
pub use push::push;
pub use rm::rm;
