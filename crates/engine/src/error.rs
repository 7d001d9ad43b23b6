/// Errors the planner and executors can report.
///
/// This type stays below the CLI's closed error taxonomy; `core` maps each
/// variant onto an `ErrorKind` and its exit code. Device-library failures
/// carry only a message because the capability abstraction in
/// [`crate::device`] does not assume any particular error representation
/// from its implementor.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A spec named a source path absent from the source inventory.
    #[error("source path not found: {0}")]
    SourceMissing(String),
    /// A local filesystem operation failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// A plan step's target exists with a kind other than the one expected.
    #[error("already exists with a different kind: {0}")]
    AlreadyExists(String),
    /// A transfer would exceed the target's remaining storage capacity.
    #[error("insufficient space: need {needed} bytes, {available} available")]
    NoSpace {
        /// Bytes the transfer requires.
        needed: u64,
        /// Bytes currently free on the target storage volume.
        available: u64,
    },
    /// The device library surfaced an unrecoverable error.
    #[error("device error: {0}")]
    Device(String),
    /// An invariant the planner or executor depends on did not hold.
    #[error("internal inconsistency: {0}")]
    Internal(String),
}
