// src/process/sanitize.rs

//! Terminal escape-sequence stripping for captured output.
//!
//! Two forms are derived from every raw output line:
//! - the *display* form keeps SGR (colour/style) sequences like `ESC[31m`
//!   and drops everything else (cursor movement, erase, window title, ...);
//! - the *match* form drops every escape sequence, SGR included, so readiness
//!   patterns can be written against plain text.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

/// CSI (`ESC [ params intermediates final`), OSC terminated by BEL or ST,
/// charset designation (`ESC ( B`), and two-byte Fe escapes, in that order of
/// preference.
static ESCAPE_SEQUENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"\x1b\[[0-?]*[ -/]*[@-~]",
        r"|\x1b\][^\x07\x1b]*(?:\x07|\x1b\\)",
        r"|\x1b[()*+][0-9A-Za-z]",
        r"|\x1b[@-Z\\-_]",
    ))
    .expect("escape sequence regex is valid")
});

fn is_sgr(seq: &str) -> bool {
    seq.starts_with("\x1b[") && seq.ends_with('m')
}

/// Strip every escape sequence except SGR.
pub fn display_form(line: &str) -> Cow<'_, str> {
    ESCAPE_SEQUENCE.replace_all(line, |caps: &Captures<'_>| {
        let seq = &caps[0];
        if is_sgr(seq) { seq.to_string() } else { String::new() }
    })
}

/// Strip every escape sequence, SGR included.
pub fn match_form(line: &str) -> Cow<'_, str> {
    ESCAPE_SEQUENCE.replace_all(line, "")
}
