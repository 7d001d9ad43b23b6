#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
//! Disk-free path normalization for POSIX-style, slash-separated paths.
//!
//! Every path stored anywhere in the workspace is absolute and lexically
//! canonical: no `.` segments, no repeated or trailing `/`, and `..`
//! segments resolved as far as the path allows. The normalizer never
//! touches the filesystem; resolving `..` above an already-known root is a
//! matter of string algebra, not `stat()` calls.
//!
//! The algorithm walks path segments left to right and maintains a small
//! component stack, which is the idiomatic equivalent of the append-style
//! state machine (`START`, `NAME`, `SEP`, `DOT`, `DOTDOT`) used by the
//! original C implementation this crate's behavior is ported from: each
//! segment either pushes a name, pops the stack (`..`), or is dropped
//! (`.`, empty). A leading `..` that cannot pop anything is retained
//! literally so that resolving a purely relative path stays faithful to
//! what the caller wrote.

use std::env;
use std::io;

/// Normalizes `path` into an absolute, canonical form, using the process's
/// current working directory to resolve relative input.
///
/// # Errors
///
/// Returns an error only if the current working directory cannot be
/// determined (e.g. it has been deleted out from under the process).
pub fn resolve(path: &str) -> io::Result<String> {
    if is_absolute(path) {
        return Ok(normalize_absolute(path));
    }
    let cwd = env::current_dir()?;
    let cwd = cwd.to_string_lossy().into_owned();
    Ok(resolve_cwd(&cwd, path))
}

/// Normalizes `path` into an absolute, canonical form, using `cwd` as the
/// base for relative input instead of the process's working directory.
#[must_use]
pub fn resolve_cwd(cwd: &str, path: &str) -> String {
    if is_absolute(path) {
        return normalize_absolute(path);
    }
    join(cwd, path)
}

/// Joins two paths and normalizes the result.
///
/// If `a` is absolute, the result is absolute. If `a` is relative, `..`
/// segments that exhaust the available prefix are retained literally
/// (`join("one", "../../../test")` yields `"../../test"`).
#[must_use]
pub fn join(a: &str, b: &str) -> String {
    let absolute = is_absolute(a);
    let mut stack = Vec::new();
    append_segments(&mut stack, a, absolute);
    append_segments(&mut stack, b, absolute);
    render(&stack, absolute)
}

/// Returns the basename of `path`, matching POSIX `basename(3)` semantics.
#[must_use]
pub fn basename(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return "/".to_string();
    }
    match trimmed.rsplit_once('/') {
        Some((_, name)) => name.to_string(),
        None => trimmed.to_string(),
    }
}

/// Returns the parent directory of `path`, matching POSIX `dirname(3)`
/// semantics.
#[must_use]
pub fn dirname(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return "/".to_string();
    }
    match trimmed.rsplit_once('/') {
        Some(("", _)) => "/".to_string(),
        Some((parent, _)) => parent.to_string(),
        None => ".".to_string(),
    }
}

fn is_absolute(path: &str) -> bool {
    path.starts_with('/')
}

fn normalize_absolute(path: &str) -> String {
    let mut stack = Vec::new();
    append_segments(&mut stack, path, true);
    render(&stack, true)
}

/// Appends the segments of `path` onto `stack`, applying `.`/`..`
/// resolution. `absolute` controls whether an unresolvable `..` is
/// dropped (absolute paths can't go above `/`) or retained literally
/// (relative paths preserve faithfully what the caller wrote).
fn append_segments(stack: &mut Vec<String>, path: &str, absolute: bool) {
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if matches!(stack.last(), Some(top) if top != "..") {
                    stack.pop();
                } else if !absolute {
                    stack.push("..".to_string());
                }
                // absolute paths silently drop a leading ".." past root
            }
            name => stack.push(name.to_string()),
        }
    }
}

fn render(stack: &[String], absolute: bool) -> String {
    if stack.is_empty() {
        return if absolute { "/".to_string() } else { ".".to_string() };
    }
    let joined = stack.join("/");
    if absolute {
        format!("/{joined}")
    } else {
        joined
    }
}
