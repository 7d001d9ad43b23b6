//! Binds [`engine::DeviceLibrary`] to the real `libmtp` C library.
//!
//! This is the only crate in the workspace where `unsafe` is allowed; see
//! [`library`] for where it is used and why.

mod library;
mod raw;

pub use library::{Handle, LibmtpDevice};
