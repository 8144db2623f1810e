//! Comment and string-literal removal.
//!
//! Both passes rely on look-around and backreferences, so they run on
//! `fancy_regex` instead of the automaton-based `regex` crate.

use crate::error::Result;
use crate::record::ContentRecord;
use crate::scan;
use crate::stage::{Emitter, Stage};
use fancy_regex::{Captures, Regex, RegexBuilder};
use log::warn;

/// Group 1: a run of block/line comments (with the blank lines they swallow).
/// Group 2: a quoted span or an ordinary run of code, kept verbatim.
const COMMENTS_PATTERN: &str = concat!(
    r"((?:(?:^[ \t]*)?(?:",
    r"/\*[^*]*\*+(?:[^/*][^*]*\*+)*/(?:[ \t]*\r?\n(?=[ \t]*(?:\r?\n|/\*|//)))?",
    r"|//(?:[^\\]|\\(?:\r?\n)?)*?(?:\r?\n(?=[ \t]*(?:\r?\n|/\*|//))|(?=\r?\n)|$)",
    r"))+)",
    r#"|("[^"\\]*(?:\\[\S\s][^"\\]*)*""#,
    r"|'[^'\\]*(?:\\[\S\s][^'\\]*)*'",
    r#"|(?:\r?\n|[\S\s])[^/"'\\\s]*)"#,
);

/// A single-line span opened by `"`, `'` or a backtick and closed by the same
/// quote. The atomic group makes an escaped quote unable to close the span.
const STRINGS_PATTERN: &str = r#"(["'`])(?:(?>\\?).)*?\1"#;

pub const DEFAULT_BACKTRACK_LIMIT: usize = 10_000_000;

fn build(pattern: &str, backtrack_limit: usize) -> Result<Regex> {
    Ok(RegexBuilder::new(pattern)
        .backtrack_limit(backtrack_limit)
        .build()?)
}

pub fn comments_regex(backtrack_limit: usize) -> Result<Regex> {
    build(COMMENTS_PATTERN, backtrack_limit)
}

pub fn strings_regex(backtrack_limit: usize) -> Result<Regex> {
    build(STRINGS_PATTERN, backtrack_limit)
}

/// Rewrite every match of `re` with the text chosen by `replace`.
fn replace_all_with<F>(
    re: &Regex,
    text: &str,
    mut replace: F,
) -> std::result::Result<String, fancy_regex::Error>
where
    F: FnMut(&Captures<'_>, &mut String),
{
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in re.captures_iter(text) {
        let caps = caps?;
        let Some(whole) = caps.get(0) else { continue };
        out.push_str(&text[last..whole.start()]);
        replace(&caps, &mut out);
        last = whole.end();
    }
    out.push_str(&text[last..]);
    Ok(out)
}

/// Falls back to `fallback` when the backtracking engine runs out of stack or
/// step budget on `text`. Other pattern errors are returned.
fn or_scan(
    attempt: std::result::Result<String, fancy_regex::Error>,
    pass: &str,
    text: &str,
    fallback: fn(&str) -> String,
) -> Result<String> {
    match attempt {
        Err(fancy_regex::Error::RuntimeError(e)) => {
            warn!(
                "{pass}: pattern gave up on {} bytes ({e}); using linear scan",
                text.len()
            );
            Ok(fallback(text))
        }
        other => Ok(other?),
    }
}

/// Replace each comment run with one space; quoted text is left untouched.
pub fn strip_comments(re: &Regex, text: &str) -> Result<String> {
    let attempt = replace_all_with(re, text, |caps, out| match caps.get(2) {
        Some(kept) => out.push_str(kept.as_str()),
        None => out.push(' '),
    });
    or_scan(attempt, "strip-comments", text, scan::strip_comments)
}

/// Remove every quoted span including its delimiters.
pub fn strip_strings(re: &Regex, text: &str) -> Result<String> {
    let attempt = replace_all_with(re, text, |_, _| {});
    or_scan(attempt, "strip-strings", text, scan::strip_strings)
}

/// Comment-removal worker. Each worker compiles its own copy of the pattern.
pub struct CommentStripper {
    re: Regex,
}

impl CommentStripper {
    pub fn new(backtrack_limit: usize) -> Result<Self> {
        Ok(Self {
            re: comments_regex(backtrack_limit)?,
        })
    }
}

impl Stage for CommentStripper {
    type Input = ContentRecord;
    type Output = ContentRecord;
    const NAME: &'static str = "strip-comments";

    fn process(&mut self, mut record: ContentRecord, out: &Emitter<ContentRecord>) -> Result<()> {
        record.content = strip_comments(&self.re, &record.content)?;
        out.emit(record)
    }
}

/// String-removal worker.
pub struct StringStripper {
    re: Regex,
}

impl StringStripper {
    pub fn new(backtrack_limit: usize) -> Result<Self> {
        Ok(Self {
            re: strings_regex(backtrack_limit)?,
        })
    }
}

impl Stage for StringStripper {
    type Input = ContentRecord;
    type Output = ContentRecord;
    const NAME: &'static str = "strip-strings";

    fn process(&mut self, mut record: ContentRecord, out: &Emitter<ContentRecord>) -> Result<()> {
        record.content = strip_strings(&self.re, &record.content)?;
        out.emit(record)
    }
}
