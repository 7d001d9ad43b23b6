#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
//! Command orchestration shared by the `mtpsync` CLI.
//!
//! Each function in [`commands`] implements one of the five subcommands
//! (`devices`, `ls`, `push`, `pull`, `rm`) as a thin composition of
//! [`engine`]'s planner and executors, generic over
//! [`engine::device_library::DeviceLibrary`] so the `cli` crate drives
//! them with the real `device` binding while this crate's own tests
//! drive them with an in-memory fake. Interactive confirmation is
//! abstracted behind [`confirm::Confirm`]; rendering plans and device
//! listings to a writer lives in [`output`]; the closed error taxonomy
//! and its process exit codes live in [`error`].

pub mod commands;
pub mod confirm;
pub mod error;
pub mod output;

pub use confirm::{AlwaysYes, Confirm, StdinConfirm};
pub use error::{CoreError, CoreResult, ErrorKind};
pub use output::Direction;
