#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
//! Argument parsing and command dispatch for the `mtpsync` binary.
//!
//! [`run`] parses the global options table with [`argparse`], dispatches
//! on the first positional to one of the five commands in
//! [`core::commands`], and maps whatever [`core::ErrorKind`] comes back to
//! a process exit code via [`exit_code_from`]. Grounded on original_source
//! `main.c`'s `mtpsync`/`main` pair.

pub mod argparse;

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use is_terminal::IsTerminal;
use tracing::debug;

use argparse::{value_handler, ArgDef};
use core::{AlwaysYes, Confirm, CoreError, CoreResult, ErrorKind, StdinConfirm};
use device::LibmtpDevice;
use logging::Verbosity;

/// The options recognized before the command name: `--device`/`-d`,
/// `--storage`/`-s`, `--cleanup`/`-x`, `--yes`/`-y`, plus the ambient
/// `--verbose`/`-v` (repeatable) and `--quiet`/`-q` logging controls.
#[derive(Debug, Default)]
pub struct GlobalArgs {
    /// Value of `--device`/`-d`, if given.
    pub device: Option<String>,
    /// Value of `--storage`/`-s`, if given.
    pub storage: Option<String>,
    /// Whether `--cleanup`/`-x` was given.
    pub cleanup: bool,
    /// Whether `--yes`/`-y` was given.
    pub yes: bool,
    /// Number of times `--verbose`/`-v` was given.
    pub verbose: u8,
    /// Whether `--quiet`/`-q` was given.
    pub quiet: bool,
}

/// Builds the global option definitions, in the order `main()` in
/// original_source registers them, plus the ambient verbosity pair.
fn build_defs<'d>() -> Vec<ArgDef<'d, GlobalArgs>> {
    vec![
        ArgDef::new(
            Some('x'),
            "cleanup",
            |_args, _i, ctx: &mut GlobalArgs| {
                ctx.cleanup = true;
                Ok(())
            },
        ),
        ArgDef::new(
            Some('d'),
            "device",
            value_handler("Please specify a device ID", |ctx: &mut GlobalArgs, v| ctx.device = Some(v)),
        ),
        ArgDef::new(
            Some('s'),
            "storage",
            value_handler("Please specify a storage ID", |ctx: &mut GlobalArgs, v| ctx.storage = Some(v)),
        ),
        ArgDef::new(
            Some('y'),
            "yes",
            |_args, _i, ctx: &mut GlobalArgs| {
                ctx.yes = true;
                Ok(())
            },
        ),
        ArgDef::new(
            Some('v'),
            "verbose",
            |_args, _i, ctx: &mut GlobalArgs| {
                ctx.verbose = ctx.verbose.saturating_add(1);
                Ok(())
            },
        ),
        ArgDef::new(
            Some('q'),
            "quiet",
            |_args, _i, ctx: &mut GlobalArgs| {
                ctx.quiet = true;
                Ok(())
            },
        ),
    ]
}

/// Prints the program's usage summary, as original_source `usage()` does.
fn print_usage(out: &mut impl Write, program: &str) {
    let _ = writeln!(out, "Usage: {program} [OPTIONS] COMMAND [ARGS]...");
    let _ = writeln!(out);
    let _ = writeln!(out, "OPTIONS:");
    let _ = writeln!(out, "  -d, --device ID     Restrict to the device matching ID (serial prefix or index)");
    let _ = writeln!(out, "  -s, --storage ID     Restrict to the storage volume matching ID");
    let _ = writeln!(out, "  -x, --cleanup        Remove destination entries absent from the source");
    let _ = writeln!(out, "  -y, --yes            Do not prompt for confirmation before changing anything");
    let _ = writeln!(out, "  -v, --verbose        Increase logging detail (repeatable)");
    let _ = writeln!(out, "  -q, --quiet          Suppress all but warnings and errors");
    let _ = writeln!(out);
    let _ = writeln!(out, "COMMANDS:");
    let _ = writeln!(out, "  devices              List attached devices and their storage volumes");
    let _ = writeln!(out, "  ls PATH              List files at or under PATH on the device");
    let _ = writeln!(out, "  push FROM TO         Copy a local source tree onto the device");
    let _ = writeln!(out, "  pull FROM [TO]       Copy a device source tree onto the local filesystem");
    let _ = writeln!(out, "  rm PATH...           Delete one or more paths from the device");
}

/// Parses `args`, dispatches to the matching command orchestrator, and
/// writes its output to `stdout`. Used by [`run`], which additionally maps
/// the result onto a process exit code.
///
/// # Errors
///
/// Returns whatever [`core::CoreError`] the argument parser, the arity
/// check for the chosen command, or the orchestrator itself surfaces.
pub fn dispatch<Out: Write>(args: &[String], stdout: &mut Out) -> CoreResult<()> {
    let mut global = GlobalArgs::default();
    let mut defs = build_defs();
    let positional = argparse::parse(args, &mut defs, &mut global).map_err(|message| CoreError::new(ErrorKind::Syntax, message))?;

    logging::init(Verbosity::from_flags(global.verbose, global.quiet));

    let program = positional.first().map_or("mtpsync", String::as_str);
    if positional.len() < 2 {
        print_usage(stdout, program);
        return Ok(());
    }

    debug!(command = positional[1].as_str(), "dispatching command");

    let device = LibmtpDevice::default();
    let colorize = std::io::stdout().is_terminal();
    let mut always_yes = AlwaysYes;
    let mut stdin_confirm = StdinConfirm;
    let confirm: &mut dyn Confirm = if global.yes { &mut always_yes } else { &mut stdin_confirm };

    match positional[1].as_str() {
        "devices" => core::commands::devices(&device, global.device.as_deref(), global.storage.as_deref(), stdout, colorize),
        "ls" => {
            let path = positional
                .get(2)
                .ok_or_else(|| CoreError::new(ErrorKind::Syntax, "Specify a path to list"))?;
            core::commands::ls(&device, global.device.as_deref(), global.storage.as_deref(), path, stdout)
        }
        "push" => {
            let from = positional.get(2);
            let to = positional.get(3);
            let (Some(from), Some(to)) = (from, to) else {
                return Err(CoreError::new(ErrorKind::Syntax, "Specify a source and target path"));
            };
            core::commands::push(
                &device,
                global.device.as_deref(),
                global.storage.as_deref(),
                from,
                to,
                global.cleanup,
                global.yes,
                confirm,
                stdout,
                colorize,
            )
        }
        "pull" => {
            let from = positional
                .get(2)
                .ok_or_else(|| CoreError::new(ErrorKind::Syntax, "Specify a path to pull"))?;
            let to = positional.get(3).map(String::as_str);
            core::commands::pull(
                &device,
                global.device.as_deref(),
                global.storage.as_deref(),
                from,
                to,
                global.cleanup,
                global.yes,
                confirm,
                stdout,
                colorize,
            )
        }
        "rm" => {
            let paths = &positional[2..];
            if paths.is_empty() {
                return Err(CoreError::new(ErrorKind::Syntax, "Specify at least one path to delete"));
            }
            core::commands::rm(
                &device,
                global.device.as_deref(),
                global.storage.as_deref(),
                paths,
                global.yes,
                confirm,
                stdout,
                colorize,
            )
        }
        _ => Err(CoreError::new(ErrorKind::NoCommand, "Please specify a valid command.")),
    }
}

/// Maps a [`core::ErrorKind`] onto the process exit code `main` returns.
/// The single place this mapping happens.
#[must_use]
pub fn exit_code_from(kind: ErrorKind) -> ExitCode {
    ExitCode::from(kind.exit_code())
}

/// Parses `args` (including the program name at index 0), runs the chosen
/// command, writing its output to `stdout` and any failure message to
/// `stderr`, and returns the process exit code.
pub fn run<I, Out, Err>(args: I, stdout: &mut Out, stderr: &mut Err) -> ExitCode
where
    I: IntoIterator,
    I::Item: Into<OsString>,
    Out: Write,
    Err: Write,
{
    let args: Vec<String> = args
        .into_iter()
        .map(|arg| arg.into().to_string_lossy().into_owned())
        .collect();

    match dispatch(&args, stdout) {
        Ok(()) => exit_code_from(ErrorKind::Ok),
        Err(err) => {
            let _ = writeln!(stderr, "{err}");
            exit_code_from(err.kind())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(words: &[&str]) -> Vec<String> {
        words.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn no_command_prints_usage_and_succeeds() {
        let mut out = Vec::new();
        dispatch(&args(&["mtpsync"]), &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("Usage:"));
    }

    #[test]
    fn repeated_verbose_flags_are_a_valid_global_option() {
        let mut out = Vec::new();
        dispatch(&args(&["mtpsync", "-v", "-v", "devices"]), &mut out).unwrap();
    }

    #[test]
    fn quiet_flag_is_a_valid_global_option() {
        let mut out = Vec::new();
        dispatch(&args(&["mtpsync", "--quiet", "devices"]), &mut out).unwrap();
    }

    #[test]
    fn unknown_command_is_no_command_error() {
        let mut out = Vec::new();
        let err = dispatch(&args(&["mtpsync", "frobnicate"]), &mut out).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoCommand);
        assert_eq!(err.to_string(), "Please specify a valid command.");
    }

    #[test]
    fn ls_without_path_is_syntax_error() {
        let mut out = Vec::new();
        let err = dispatch(&args(&["mtpsync", "ls"]), &mut out).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert_eq!(err.to_string(), "Specify a path to list");
    }

    #[test]
    fn rm_without_paths_is_syntax_error() {
        let mut out = Vec::new();
        let err = dispatch(&args(&["mtpsync", "rm"]), &mut out).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
    }

    #[test]
    fn push_without_target_is_syntax_error() {
        let mut out = Vec::new();
        let err = dispatch(&args(&["mtpsync", "push", "/tmp/src"]), &mut out).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
    }

    #[test]
    fn pull_without_source_is_syntax_error() {
        let mut out = Vec::new();
        let err = dispatch(&args(&["mtpsync", "pull"]), &mut out).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
    }

    #[test]
    fn invalid_option_is_syntax_error() {
        let mut out = Vec::new();
        let err = dispatch(&args(&["mtpsync", "--nope", "devices"]), &mut out).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
    }

    #[test]
    fn devices_with_no_attached_hardware_succeeds() {
        let mut out = Vec::new();
        dispatch(&args(&["mtpsync", "devices"]), &mut out).unwrap();
    }

    #[test]
    fn run_writes_errors_to_stderr() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let _code = run(["mtpsync", "frobnicate"], &mut out, &mut err);
        assert!(String::from_utf8(err).unwrap().contains("Please specify a valid command."));
    }
}
