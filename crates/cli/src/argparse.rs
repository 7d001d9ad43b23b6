//! A direct, closure-based port of original_source `args.c`'s `arg_parse`.
//!
//! Given a list of `(short, long, handler)` definitions and a raw argument
//! list — including `argv[0]`, which the original treats as an ordinary
//! leading positional — walks left to right, dispatching `--name` and `-n`
//! tokens to their handler and collecting everything else as positional,
//! until a bare `--` is seen, after which every remaining argument
//! (including ones that look like options) is taken as positional. An
//! unrecognized `-`/`--`-prefixed token is a syntax error.
//!
//! Per REDESIGN FLAGS (spec §9), the original's function-pointer-plus-
//! `void*` handler becomes an `FnMut` closure capturing typed state
//! directly; there is no "with data" / "without data" overload split.

/// One recognized option: its short (`-x`) and/or long (`--name`) spelling,
/// plus the handler invoked when either form is seen.
///
/// A handler that consumes a following value argument is expected to
/// advance `*index` past it itself (mirroring `device_arg`/`storage_arg` in
/// original_source `main.c`); the caller advances `*index` once more after
/// the handler returns, exactly as the original's `for` loop does.
pub struct ArgDef<'d, T> {
    short: Option<char>,
    long: &'static str,
    handler: Box<dyn FnMut(&[String], &mut usize, &mut T) -> Result<(), String> + 'd>,
}

impl<'d, T> ArgDef<'d, T> {
    /// Defines one option, recognized by `short` (`Some('d')` for `-d`),
    /// `long` (`"device"` for `--device`), or both.
    pub fn new(
        short: Option<char>,
        long: &'static str,
        handler: impl FnMut(&[String], &mut usize, &mut T) -> Result<(), String> + 'd,
    ) -> Self {
        Self {
            short,
            long,
            handler: Box::new(handler),
        }
    }
}

/// Parses `args` against `defs`, threading matched options through `ctx`.
///
/// Returns the positional arguments in order, with every recognized option
/// (and any value it consumed) removed. An argument starting with `-` that
/// matches no definition is a syntax error, matching `arg_parse`'s
/// "Invalid argument" failure.
///
/// # Errors
///
/// Returns the handler's own error message, or `"Invalid argument: {arg}"`
/// for an unrecognized `-`/`--`-prefixed token.
pub fn parse<T>(args: &[String], defs: &mut [ArgDef<'_, T>], ctx: &mut T) -> Result<Vec<String>, String> {
    let mut positional = Vec::with_capacity(args.len());
    let mut i = 0usize;

    while i < args.len() {
        let arg = args[i].clone();

        if let Some(rest) = arg.strip_prefix("--") {
            if rest.is_empty() {
                i += 1;
                break;
            }
            match defs.iter_mut().find(|d| d.long == rest) {
                Some(def) => (def.handler)(args, &mut i, ctx)?,
                None => return Err(format!("Invalid argument: {arg}")),
            }
            i += 1;
            continue;
        }

        if arg.starts_with('-') {
            let matched = if arg.len() == 2 {
                let ch = arg.as_bytes()[1] as char;
                defs.iter_mut().find(|d| d.short == Some(ch))
            } else {
                None
            };
            match matched {
                Some(def) => {
                    (def.handler)(args, &mut i, ctx)?;
                    i += 1;
                    continue;
                }
                None => return Err(format!("Invalid argument: {arg}")),
            }
        }

        positional.push(arg);
        i += 1;
    }

    while i < args.len() {
        positional.push(args[i].clone());
        i += 1;
    }

    Ok(positional)
}

/// Builds a value-consuming handler: advances past the option token, reads
/// the next argument as its value (failing with `missing_message` if none
/// remains), and hands it to `set`.
pub fn value_handler<'d, T: 'd>(
    missing_message: &'static str,
    mut set: impl FnMut(&mut T, String) + 'd,
) -> impl FnMut(&[String], &mut usize, &mut T) -> Result<(), String> + 'd {
    move |args, i, ctx| {
        *i += 1;
        let value = args.get(*i).ok_or(missing_message)?;
        set(ctx, value.clone());
        Ok(())
    }
}
