//! Terminal rendering of plan steps, device listings, and transfer
//! progress.
//!
//! Grounded on original_source `mtp.h`'s `MTP_*_MSG` tag macros and
//! `mtp.c`'s `mtp_progress` (the `\33[2K\r` redraw), plus `mtp_devices.c`'s
//! device/storage listing. Colorization is driven by an explicit
//! `colorize` flag rather than reaching for `is-terminal` internally, so
//! these functions stay testable against an in-memory writer; `cli` is
//! the one place that actually decides whether stdout is a terminal.

use std::io::{self, Write};

use engine::device_library::StorageVolume;
use engine::{PlanStep, SyncAction};

/// Which realm a transfer moves a file *into*, used to pick `PUSH` or
/// `PULL` as the tag for an `XFER` step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Local file going to the device.
    Push,
    /// Device file coming to local.
    Pull,
}

fn tag_style(colorize: bool, style: anstyle::Style) -> (String, String) {
    if colorize {
        (style.render().to_string(), style.render_reset().to_string())
    } else {
        (String::new(), String::new())
    }
}

fn render_tag(colorize: bool, tag: &str, color: anstyle::Color) -> String {
    let style = anstyle::Style::new().bold().fg_color(Some(color));
    let (on, off) = tag_style(colorize, style);
    format!("{on}{tag}{off}")
}

/// Renders a single plan step as `TAG: path`, with a trailing `/` for
/// folder targets, matching `sync_plan_print`'s per-line format.
#[must_use]
pub fn render_step(step: &PlanStep, direction: Direction, colorize: bool) -> String {
    let tag = match step.action {
        SyncAction::Rm => render_tag(colorize, "RM", anstyle::AnsiColor::Red.into()),
        SyncAction::Mkdir => render_tag(colorize, "MKDIR", anstyle::AnsiColor::Blue.into()),
        SyncAction::Xfer => match direction {
            Direction::Push => render_tag(colorize, "PUSH", anstyle::AnsiColor::Green.into()),
            Direction::Pull => render_tag(colorize, "PULL", anstyle::AnsiColor::Cyan.into()),
        },
    };
    let suffix = if step.target.is_folder() { "/" } else { "" };
    format!("{tag}: {}{suffix}", step.target.path())
}

/// Prints every step of `plan` to `out`, one per line.
///
/// # Errors
///
/// Propagates any write failure from `out`.
pub fn print_plan(
    out: &mut impl Write,
    plan: &[PlanStep],
    direction: Direction,
    colorize: bool,
) -> io::Result<()> {
    for step in plan {
        writeln!(out, "{}", render_step(step, direction, colorize))?;
    }
    Ok(())
}

/// Redraws a single progress line for an in-flight transfer, matching
/// `mtp_progress`'s `\33[2K\r<name>: <file>: <percent>%` redraw.
///
/// # Errors
///
/// Propagates any write or flush failure from `out`.
pub fn print_progress(
    out: &mut impl Write,
    name: &str,
    file: &str,
    bytes_done: u64,
    bytes_total: u64,
) -> io::Result<()> {
    let percent = if bytes_total == 0 {
        100
    } else {
        (bytes_done * 100) / bytes_total
    };
    write!(out, "\x1b[2K\r{name}: {file}: {percent}%")?;
    out.flush()
}

/// Prints a newline to end a redrawn progress line once a transfer
/// finishes.
///
/// # Errors
///
/// Propagates any write failure from `out`.
pub fn finish_progress(out: &mut impl Write) -> io::Result<()> {
    writeln!(out)
}

/// Prints one device header (friendly name, index, serial) the first time
/// a new device is seen, matching `mtp_devices_callback`'s "print header
/// only when the device changes" behavior.
///
/// # Errors
///
/// Propagates any write failure from `out`.
pub fn print_device_header(
    out: &mut impl Write,
    friendly_name: &str,
    index: u32,
    serial: &str,
    colorize: bool,
) -> io::Result<()> {
    let (on, off) = tag_style(colorize, anstyle::Style::new().bold());
    writeln!(out)?;
    writeln!(out, "{on}Device:{off} {friendly_name}")?;
    writeln!(out, " * {on}Number{off}: {index}")?;
    writeln!(out, " * {on}Serial{off}: SN:{serial}")?;
    Ok(())
}

/// Prints one storage volume's listing under its device header, matching
/// `mtp_devices_callback`'s storage block.
///
/// # Errors
///
/// Propagates any write failure from `out`.
pub fn print_storage(out: &mut impl Write, storage: &StorageVolume, colorize: bool) -> io::Result<()> {
    let (on, off) = tag_style(colorize, anstyle::Style::new().bold());
    let free_percent = if storage.max_bytes == 0 {
        0
    } else {
        (storage.free_bytes * 100) / storage.max_bytes
    };
    writeln!(out, " * {on}Storage{off}: {}", storage.description)?;
    writeln!(out, "   - {on}ID{off}: {:08x}", storage.id)?;
    writeln!(
        out,
        "   - {on}Free Space{off}: {free_percent}% ({} bytes)",
        storage.free_bytes
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flist::FileDescriptor;

    #[test]
    fn render_step_without_color_has_no_escape_codes() {
        let step = PlanStep::mkdir(FileDescriptor::new("/a/b", true));
        let rendered = render_step(&step, Direction::Push, false);
        assert_eq!(rendered, "MKDIR: /a/b/");
        assert!(!rendered.contains('\x1b'));
    }

    #[test]
    fn render_step_with_color_wraps_tag_in_escapes() {
        let step = PlanStep::rm(FileDescriptor::new("/a/b", false));
        let rendered = render_step(&step, Direction::Push, true);
        assert!(rendered.contains('\x1b'));
        assert!(rendered.ends_with(": /a/b"));
    }

    #[test]
    fn xfer_tag_depends_on_direction() {
        let step = PlanStep::xfer(
            FileDescriptor::new("/src/a.mp3", false),
            FileDescriptor::new("/dst/a.mp3", false),
        );
        assert!(render_step(&step, Direction::Push, false).starts_with("PUSH:"));
        assert!(render_step(&step, Direction::Pull, false).starts_with("PULL:"));
    }

    #[test]
    fn print_plan_writes_one_line_per_step() {
        let plan = vec![
            PlanStep::mkdir(FileDescriptor::new("/a", true)),
            PlanStep::rm(FileDescriptor::new("/b", false)),
        ];
        let mut buf = Vec::new();
        print_plan(&mut buf, &plan, Direction::Push, false).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn progress_line_computes_percent() {
        let mut buf = Vec::new();
        print_progress(&mut buf, "PUSH", "a.mp3", 50, 200).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("25%"));
        assert!(text.starts_with("\x1b[2K\r"));
    }
}
