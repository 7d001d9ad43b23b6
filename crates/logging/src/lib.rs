#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
//! Verbosity levels for mtpsync, and (behind the `tracing` feature) a
//! small bridge installing a [`tracing_subscriber`] `fmt` layer filtered
//! to match.
//!
//! The teacher this workspace is grown from (`oferchen-rsync`) carries a
//! `logging` crate with one flag per rsync `--info`/`--debug` category;
//! this program has no such per-category surface, so the axis here is
//! collapsed to the three levels a CLI this size actually needs: quiet,
//! normal, and verbose (stacking `-v`).

/// How much mtpsync should report about what it's doing.
///
/// `--quiet` always wins regardless of how many `-v` flags also appear;
/// see [`Verbosity::from_flags`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    /// Only warnings and fatal errors.
    Quiet,
    /// The program's normal informational output.
    #[default]
    Normal,
    /// Step-by-step detail, including device I/O.
    Verbose,
}

impl Verbosity {
    /// Derives a verbosity level from a `-v` repeat count and an explicit
    /// `--quiet` flag. `quiet` takes precedence over any `-v` count, since
    /// it is meant as an unambiguous "suppress everything but problems".
    #[must_use]
    pub fn from_flags(verbose_count: u8, quiet: bool) -> Self {
        if quiet {
            return Self::Quiet;
        }
        Self::from_flag_count(verbose_count)
    }

    /// Derives a verbosity level purely from a `-v` repeat count: zero
    /// stays at [`Verbosity::Normal`], any repeat raises it to
    /// [`Verbosity::Verbose`] (there is no level above it to cap at).
    #[must_use]
    pub fn from_flag_count(count: u8) -> Self {
        if count == 0 {
            Self::Normal
        } else {
            Self::Verbose
        }
    }

    /// The `tracing_subscriber` `EnvFilter` directive this level maps to.
    #[must_use]
    pub const fn filter_directive(self) -> &'static str {
        match self {
            Self::Quiet => "warn",
            Self::Normal => "info",
            Self::Verbose => "debug",
        }
    }
}

#[cfg(feature = "tracing")]
mod tracing_bridge {
    use super::Verbosity;
    use std::sync::Once;

    static INIT: Once = Once::new();

    /// Installs a process-global `tracing-subscriber` `fmt` subscriber
    /// filtered to `verbosity`'s directive. Idempotent: only the first
    /// call in a process takes effect, matching how the teacher's own
    /// logging init is expected to be called exactly once from `main`.
    pub fn init(verbosity: Verbosity) {
        INIT.call_once(|| {
            let filter = tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(verbosity.filter_directive()));
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .without_time()
                .try_init();
        });
    }
}

#[cfg(feature = "tracing")]
pub use tracing_bridge::init;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_repeats_is_normal() {
        assert_eq!(Verbosity::from_flag_count(0), Verbosity::Normal);
    }

    #[test]
    fn any_repeat_is_verbose() {
        assert_eq!(Verbosity::from_flag_count(1), Verbosity::Verbose);
        assert_eq!(Verbosity::from_flag_count(5), Verbosity::Verbose);
    }

    #[test]
    fn quiet_flag_overrides_verbose_count() {
        assert_eq!(Verbosity::from_flags(3, true), Verbosity::Quiet);
    }

    #[test]
    fn filter_directives_match_expected_levels() {
        assert_eq!(Verbosity::Quiet.filter_directive(), "warn");
        assert_eq!(Verbosity::Normal.filter_directive(), "info");
        assert_eq!(Verbosity::Verbose.filter_directive(), "debug");
    }

    #[test]
    fn ordering_is_quiet_lt_normal_lt_verbose() {
        assert!(Verbosity::Quiet < Verbosity::Normal);
        assert!(Verbosity::Normal < Verbosity::Verbose);
    }
}
