//! The closed error taxonomy shared by every orchestrator, and the process
//! exit code each kind maps onto.
//!
//! Grounded on original_source `mtp.h`'s `MtpStatusCode` enum: each
//! variant below keeps that enum's discriminant as its exit code
//! (`MTP_STATUS_OK` through `MTP_STATUS_ESYNTAX`), with one addition —
//! `NoDevice` — called out by SPEC_FULL as a redesign: the original
//! silently returns `OK` when a device filter matches nothing, which masks
//! a typo'd `--device`/`--storage` filter as a successful no-op.

use std::fmt;

/// The result type used throughout `core`.
pub type CoreResult<T> = Result<T, CoreError>;

/// The closed set of ways a command can fail (or, for [`ErrorKind::Ok`],
/// not fail at all).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Success.
    Ok,
    /// Unspecified internal failure.
    Generic,
    /// The requested subcommand does not exist.
    NoCommand,
    /// Reserved for a feature not yet implemented.
    NotImplemented,
    /// A transfer would exceed the target's remaining free capacity.
    NoSpace,
    /// An allocation failed.
    NoMemory,
    /// The device library surfaced an error.
    DeviceError,
    /// A plan step's target existed with a kind other than expected.
    AlreadyExists,
    /// The user declined the confirmation prompt.
    Rejected,
    /// The command line was invalid.
    Syntax,
    /// No device matched the `--device`/`--storage` filter.
    NoDevice,
}

impl ErrorKind {
    /// The process exit code this kind maps to. Matches original_source
    /// `mtp.h`'s `MtpStatusCode` discriminants for every kind it defines;
    /// `NoDevice` is assigned the next free value since the original has
    /// no equivalent.
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        match self {
            Self::Ok => 0,
            Self::Generic => 1,
            Self::NoCommand => 2,
            Self::NotImplemented => 3,
            Self::NoSpace => 4,
            Self::NoMemory => 5,
            Self::DeviceError => 6,
            Self::AlreadyExists => 7,
            Self::Rejected => 8,
            Self::Syntax => 9,
            Self::NoDevice => 10,
        }
    }
}

/// An error surfaced by a command orchestrator, carrying the closed
/// [`ErrorKind`] plus a human-readable message for display on stderr.
#[derive(Debug)]
pub struct CoreError {
    kind: ErrorKind,
    message: String,
}

impl CoreError {
    /// Builds an error of `kind` with an explicit message.
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// The error's kind, used to compute the process exit code.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CoreError {}

impl From<String> for CoreError {
    /// Device-library methods report failure as a plain string; any such
    /// failure is a device error by construction.
    fn from(message: String) -> Self {
        Self::new(ErrorKind::DeviceError, message)
    }
}

impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        Self::new(ErrorKind::Generic, err.to_string())
    }
}

impl From<engine::EngineError> for CoreError {
    fn from(err: engine::EngineError) -> Self {
        let kind = match &err {
            engine::EngineError::SourceMissing(_)
            | engine::EngineError::Io(_)
            | engine::EngineError::Internal(_) => ErrorKind::Generic,
            engine::EngineError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            engine::EngineError::NoSpace { .. } => ErrorKind::NoSpace,
            engine::EngineError::Device(_) => ErrorKind::DeviceError,
        };
        Self::new(kind, err.to_string())
    }
}
