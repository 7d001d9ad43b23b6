use flist::FileDescriptor;

/// A request that the file at `source_path` in the source realm should
/// end up at `target_path` in the target realm. Directories are never
/// named directly; they are inferred from the ancestry of a file's path.
#[derive(Debug, Clone)]
pub struct SyncSpec {
    /// Canonical absolute path in the source realm.
    pub source_path: String,
    /// Canonical absolute path in the target realm.
    pub target_path: String,
}

/// The three kinds of step a plan can contain.
///
/// Declaration order is significant: the derived [`Ord`] impl is what
/// gives `RM < MKDIR < XFER` its execution-order meaning in
/// [`crate::planner::compare_steps`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SyncAction {
    /// Remove a file or an empty folder.
    Rm,
    /// Create a folder.
    Mkdir,
    /// Transfer a file's content from source to target.
    Xfer,
}

/// A single unit of work produced by the planner.
///
/// `source` is populated only for `Xfer`; every other action leaves it
/// `None`. `target` always carries an accurate `is_folder` so executors
/// and printers never need a side lookup to know how to treat it.
#[derive(Debug, Clone)]
pub struct PlanStep {
    /// What to do.
    pub action: SyncAction,
    /// The transfer's input, present only for `Xfer`.
    pub source: Option<FileDescriptor>,
    /// The entry being acted on.
    pub target: FileDescriptor,
}

impl PlanStep {
    /// Convenience constructor for an `RM` step.
    #[must_use]
    pub fn rm(target: FileDescriptor) -> Self {
        Self {
            action: SyncAction::Rm,
            source: None,
            target,
        }
    }

    /// Convenience constructor for a `MKDIR` step.
    #[must_use]
    pub fn mkdir(target: FileDescriptor) -> Self {
        Self {
            action: SyncAction::Mkdir,
            source: None,
            target,
        }
    }

    /// Convenience constructor for an `XFER` step.
    #[must_use]
    pub fn xfer(source: FileDescriptor, target: FileDescriptor) -> Self {
        Self {
            action: SyncAction::Xfer,
            source: Some(source),
            target,
        }
    }
}
