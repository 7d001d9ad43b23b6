#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
//! The sync planner, the device capability abstraction it and its
//! executors are built against, and the two realm-specific plan
//! executors.
//!
//! Nothing in this crate touches a physical device or talks libmtp: the
//! `device` crate supplies the one production [`device_library::DeviceLibrary`]
//! implementor, and everything here is written and tested against that
//! trait (or, in tests, an in-memory fake) so the planner and executors
//! stay free of any FFI concern.

pub mod device_library;
pub mod error;
pub mod executor;
pub mod plan;
pub mod planner;

pub use error::EngineError;
pub use plan::{PlanStep, SyncAction, SyncSpec};
pub use planner::{build_specs, compare_steps, plan_remove, plan_sync};
