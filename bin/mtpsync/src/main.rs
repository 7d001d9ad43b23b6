#![deny(unsafe_code)]

use std::io::Write;
use std::{env, io, process::ExitCode};

fn main() -> ExitCode {
    let mut stdout = io::stdout().lock();
    let mut stderr = io::stderr().lock();
    run_with(env::args_os(), &mut stdout, &mut stderr)
}

fn run_with<I, Out, Err>(args: I, stdout: &mut Out, stderr: &mut Err) -> ExitCode
where
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString>,
    Out: Write,
    Err: Write,
{
    cli::run(args, stdout, stderr)
}

#[cfg(test)]
mod tests {
    use super::run_with;

    #[test]
    fn no_command_reports_success_and_prints_usage() {
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let _exit = run_with(["mtpsync"], &mut stdout, &mut stderr);
        assert!(String::from_utf8(stdout).unwrap().contains("Usage:"));
        assert!(stderr.is_empty());
    }

    #[test]
    fn unknown_command_reports_failure_on_stderr() {
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let _exit = run_with(["mtpsync", "frobnicate"], &mut stdout, &mut stderr);
        assert!(!stderr.is_empty());
    }
}
