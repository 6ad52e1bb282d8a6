//! Go-style flag compatibility.
//!
//! The tools have always been invoked with single-dash long flags
//! (`-database stress`, `-firstrun`). clap only understands `--database`, so
//! argv is rewritten before parsing: a single-dash argument of more than one
//! character whose first character after the dash is a letter gains a second
//! dash. Short flags (`-h`), negative numbers (`-3`) and everything after a
//! bare `--` pass through untouched.

use std::ffi::OsString;

/// Rewrite single-dash long flags to double-dash form. The first element
/// (the program name) is never rewritten.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut normalized = Vec::new();
    let mut args = args.into_iter().map(Into::into);

    if let Some(program) = args.next() {
        normalized.push(program);
    }

    while let Some(arg) = args.next() {
        if arg == "--" {
            normalized.push(arg);
            normalized.extend(args.by_ref());
            break;
        }

        match arg.to_str() {
            Some(flag) if is_single_dash_long_flag(flag) => {
                normalized.push(OsString::from(format!("-{}", flag)));
            }
            _ => normalized.push(arg),
        }
    }

    normalized
}

fn is_single_dash_long_flag(arg: &str) -> bool {
    let mut chars = arg.chars();
    chars.next() == Some('-')
        && chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.next().is_some()
}
