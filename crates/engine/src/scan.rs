//! Single-pass scanners used when a backtracking pattern gives up.
//!
//! Very long comments or literals (inlined data URIs, bundled sources) can
//! exhaust the backtracking engine's stack or step budget. These scanners
//! follow the same token rules in linear time so such a file is still
//! cleaned and counted instead of failing the run. Unlike the comment
//! pattern they do not fold the blank lines that follow a comment, which
//! only changes whitespace.

/// Byte index just past the quote that closes the literal opened at `open`,
/// or `None` when it is never closed. Backslash escapes any byte, newlines
/// included.
fn close_multiline(bytes: &[u8], open: usize) -> Option<usize> {
    let quote = bytes[open];
    let mut i = open + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return Some(i + 1),
            _ => i += 1,
        }
    }
    None
}

/// End of a `//` comment starting at `start`: the next line break that is not
/// escaped by a backslash, or the end of input. The line break is not part of
/// the comment.
fn line_comment_end(bytes: &[u8], start: usize) -> usize {
    let mut i = start + 2;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                i += 1;
                if bytes.get(i) == Some(&b'\r') && bytes.get(i + 1) == Some(&b'\n') {
                    i += 2;
                } else if bytes.get(i) == Some(&b'\n') {
                    i += 1;
                }
            }
            b'\n' => return i,
            b'\r' if bytes.get(i + 1) == Some(&b'\n') => return i,
            _ => i += 1,
        }
    }
    bytes.len()
}

fn block_comment_end(text: &str, start: usize) -> Option<usize> {
    text[start + 2..].find("*/").map(|off| start + 2 + off + 2)
}

/// Replace each comment with one space, leaving quoted text untouched.
pub fn strip_comments(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut i = 0;
    while i < bytes.len() {
        let comment_end = match (bytes[i], bytes.get(i + 1)) {
            (b'"' | b'\'', _) => {
                i = close_multiline(bytes, i).unwrap_or(i + 1);
                continue;
            }
            (b'/', Some(b'*')) => block_comment_end(text, i),
            (b'/', Some(b'/')) => Some(line_comment_end(bytes, i)),
            _ => None,
        };
        match comment_end {
            Some(end) => {
                out.push_str(&text[last..i]);
                out.push(' ');
                last = end;
                i = end;
            }
            None => i += 1,
        }
    }
    out.push_str(&text[last..]);
    out
}

/// Byte index just past the closing quote of a single-line literal opened at
/// `open`. A backslash escapes the next character unless it is a newline.
fn close_single_line(bytes: &[u8], open: usize) -> Option<usize> {
    let quote = bytes[open];
    let mut i = open + 1;
    while i < bytes.len() {
        match bytes[i] {
            b if b == quote => return Some(i + 1),
            b'\n' => return None,
            b'\\' => match bytes.get(i + 1) {
                Some(b'\n') | None => return None,
                Some(_) => i += 2,
            },
            _ => i += 1,
        }
    }
    None
}

/// Remove every single-line `"`, `'` or backtick literal with its quotes.
pub fn strip_strings(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut i = 0;
    while i < bytes.len() {
        if matches!(bytes[i], b'"' | b'\'' | b'`')
            && let Some(end) = close_single_line(bytes, i)
        {
            out.push_str(&text[last..i]);
            last = end;
            i = end;
            continue;
        }
        i += 1;
    }
    out.push_str(&text[last..]);
    out
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Call-like uses of `operator`: not preceded by a word character, followed
/// by optional whitespace and `(` or `{`. Matches do not overlap.
pub fn count_call_sites(text: &str, operator: &str) -> u64 {
    if operator.is_empty() {
        return 0;
    }
    let mut total = 0;
    let mut pos = 0;
    while let Some(found) = text[pos..].find(operator) {
        let start = pos + found;
        let rest = text[start + operator.len()..].trim_start();
        let bounded = !text[..start].chars().next_back().is_some_and(is_word_char);
        if bounded && rest.starts_with(['(', '{']) {
            total += 1;
            pos = text.len() - rest.len() + 1;
        } else {
            pos = start + text[start..].chars().next().map_or(1, char::len_utf8);
        }
    }
    total
}
