#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
//! File descriptor and inventory model shared by every realm.
//!
//! A [`FileDescriptor`] is a realm-agnostic description of one file or
//! folder; an [`Inventory`] is a path-keyed set of descriptors closed
//! under ancestors. The local collector in [`local`] fills an inventory
//! from the filesystem; the `device` crate fills one the same shape from
//! an MTP device. The planner in the `engine` crate never sees either
//! source directly, only the resulting `Inventory`.

mod descriptor;
mod inventory;
pub mod local;

pub use descriptor::{unique_by_path, FileDescriptor};
pub use inventory::{is_prefix_or_self, Inventory};
