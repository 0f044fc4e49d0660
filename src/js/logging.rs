//! Logging call neutralization.
//!
//! Three textual passes, each optional past the first depending on
//! [`LoggingStrictness`]:
//!
//! 1. Call pass: `console.<method>(<args>)` (or `window.console.<method>`)
//!    with balanced parentheses and no `;` outside literals becomes `void 0`,
//!    keeping a trailing `;` if there was one. A call followed by
//!    [`SKIP_MARKER`] on the same line, before or after its `;`, is kept
//!    verbatim and shielded from the later passes.
//! 2. Reference pass: leftover `console.<method>` becomes `true`.
//! 3. Namespace pass: leftover bare `console` becomes `true`.
//!
//! The namespace pass can hit unrelated text that happens to spell `console`,
//! including inside string literals.
use super::{
    is_ident_byte, line_end, regex_allowed_before, skip_block_comment, skip_quoted, skip_regex,
    skip_template, SKIP_MARKER,
};
use crate::config::LoggingStrictness;
use anyhow::{Context, Result};
use regex::Regex;

/// Every method of the console API.
pub const CONSOLE_METHODS: [&str; 23] = [
    "log",
    "warn",
    "error",
    "info",
    "debug",
    "trace",
    "dir",
    "dirxml",
    "table",
    "time",
    "timeLog",
    "timeEnd",
    "assert",
    "clear",
    "count",
    "countReset",
    "group",
    "groupCollapsed",
    "groupEnd",
    "profile",
    "profileEnd",
    "timeStamp",
    "timeOrigin",
];

const CALL_REPLACEMENT: &str = "void 0";
const REFERENCE_REPLACEMENT: &str = "true";

/// Counts gathered while rewriting one file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoggingStats {
    pub calls_removed: usize,
    pub calls_exempt: usize,
    pub references_replaced: usize,
    pub namespaces_replaced: usize,
}

impl LoggingStats {
    pub fn changed(&self) -> bool {
        self.calls_removed + self.references_replaced + self.namespaces_replaced > 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingRewrite {
    pub text: String,
    pub stats: LoggingStats,
}

struct Segment {
    text: String,
    protected: bool,
}

/// Compiled patterns for one strictness level; build once, reuse per file.
#[derive(Debug, Clone)]
pub struct LoggingRewriter {
    strictness: LoggingStrictness,
    call_head: Regex,
    reference: Regex,
    namespace: Regex,
}

impl LoggingRewriter {
    pub fn new(strictness: LoggingStrictness) -> Result<Self> {
        let mut methods: Vec<&str> = CONSOLE_METHODS.to_vec();
        // Longest first so `timeLog` is never cut short at `time`.
        methods.sort_by_key(|method| std::cmp::Reverse(method.len()));
        let methods = methods.join("|");
        let call_head = Regex::new(&format!(r"(?:\bwindow\.)?\bconsole\.(?:{methods})\s*\("))
            .context("compile logging call pattern")?;
        let reference = Regex::new(&format!(r"(?:\bwindow\.)?\bconsole\.(?:{methods})\b"))
            .context("compile logging reference pattern")?;
        let namespace =
            Regex::new(r"(?:\bwindow\.)?\bconsole\b").context("compile logging namespace pattern")?;
        Ok(Self {
            strictness,
            call_head,
            reference,
            namespace,
        })
    }

    pub fn rewrite(&self, source: &str) -> LoggingRewrite {
        let mut stats = LoggingStats::default();
        let mut segments = self.rewrite_calls(source, &mut stats);

        if self.strictness != LoggingStrictness::Calls {
            for segment in segments.iter_mut().filter(|segment| !segment.protected) {
                let (text, count) =
                    replace_tokens(&segment.text, &self.reference, REFERENCE_REPLACEMENT);
                segment.text = text;
                stats.references_replaced += count;
            }
        }
        if self.strictness == LoggingStrictness::Namespace {
            for segment in segments.iter_mut().filter(|segment| !segment.protected) {
                let (text, count) =
                    replace_tokens(&segment.text, &self.namespace, REFERENCE_REPLACEMENT);
                segment.text = text;
                stats.namespaces_replaced += count;
            }
        }

        let text = segments.into_iter().map(|segment| segment.text).collect();
        LoggingRewrite { text, stats }
    }

    fn rewrite_calls(&self, source: &str, stats: &mut LoggingStats) -> Vec<Segment> {
        let bytes = source.as_bytes();
        let mut segments = Vec::new();
        let mut pending = String::new();
        let mut copied_to = 0;
        let mut search_from = 0;

        while let Some(head) = self.call_head.find_at(source, search_from) {
            search_from = head.end();
            if head.start() > 0 {
                let before = bytes[head.start() - 1];
                if is_ident_byte(before) || before == b'.' {
                    continue;
                }
            }
            let Some(close) = find_call_close(bytes, head.end()) else {
                continue;
            };
            let call = classify_tail(bytes, close);
            pending.push_str(&source[copied_to..head.start()]);
            match call {
                CallTail::Exempt { end } => {
                    segments.push(Segment {
                        text: std::mem::take(&mut pending),
                        protected: false,
                    });
                    segments.push(Segment {
                        text: source[head.start()..end].to_string(),
                        protected: true,
                    });
                    stats.calls_exempt += 1;
                    copied_to = end;
                }
                CallTail::Terminated { end } => {
                    pending.push_str(CALL_REPLACEMENT);
                    pending.push(';');
                    stats.calls_removed += 1;
                    copied_to = end;
                }
                CallTail::Open { end } => {
                    pending.push_str(CALL_REPLACEMENT);
                    stats.calls_removed += 1;
                    copied_to = end;
                }
            }
            search_from = copied_to;
        }
        pending.push_str(&source[copied_to..]);
        segments.push(Segment {
            text: pending,
            protected: false,
        });
        segments
    }
}

enum CallTail {
    /// Followed by the skip marker; `end` is just past the marker.
    Exempt { end: usize },
    /// Followed by `;`; `end` is just past it.
    Terminated { end: usize },
    /// No terminator; `end` is just past the closing parenthesis.
    Open { end: usize },
}

fn skip_inline_space(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && matches!(bytes[i], b' ' | b'\t') {
        i += 1;
    }
    i
}

fn starts_with_marker(bytes: &[u8], at: usize) -> bool {
    bytes[at..].starts_with(SKIP_MARKER.as_bytes())
}

fn classify_tail(bytes: &[u8], close: usize) -> CallTail {
    let next = skip_inline_space(bytes, close);
    if starts_with_marker(bytes, next) {
        return CallTail::Exempt {
            end: next + SKIP_MARKER.len(),
        };
    }
    if bytes.get(next) == Some(&b';') {
        let after = skip_inline_space(bytes, next + 1);
        if starts_with_marker(bytes, after) {
            return CallTail::Exempt {
                end: after + SKIP_MARKER.len(),
            };
        }
        return CallTail::Terminated { end: next + 1 };
    }
    CallTail::Open { end: close }
}

/// Offset just past the `)` matching the call's `(`, where `start` is the
/// first byte of the argument list.
///
/// Gives up (returns `None`) on a `;` outside literals, on unbalanced
/// brackets, and on unterminated literals.
fn find_call_close(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 1usize;
    let mut i = start;
    while i < bytes.len() {
        match bytes[i] {
            b'\'' | b'"' => i = skip_quoted(bytes, i)?,
            b'`' => i = skip_template(bytes, i)?,
            b'/' if bytes.get(i + 1) == Some(&b'/') => i = line_end(bytes, i),
            b'/' if bytes.get(i + 1) == Some(&b'*') => i = skip_block_comment(bytes, i)?,
            b'/' if regex_allowed_before(bytes, i) => i = skip_regex(bytes, i)?,
            b';' => return None,
            b'(' | b'[' | b'{' => {
                depth += 1;
                i += 1;
            }
            b')' | b']' | b'}' => {
                depth -= 1;
                i += 1;
                if depth == 0 {
                    return (bytes[i - 1] == b')').then_some(i);
                }
            }
            _ => i += 1,
        }
    }
    None
}

/// Replace every match of `pattern` not glued to a neighboring identifier.
fn replace_tokens(text: &str, pattern: &Regex, replacement: &str) -> (String, usize) {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut copied_to = 0;
    let mut count = 0;
    for found in pattern.find_iter(text) {
        let glued_before = found.start() > 0 && is_ident_byte(bytes[found.start() - 1]);
        let glued_after = bytes.get(found.end()).is_some_and(|&byte| is_ident_byte(byte));
        if glued_before || glued_after {
            continue;
        }
        out.push_str(&text[copied_to..found.start()]);
        out.push_str(replacement);
        copied_to = found.end();
        count += 1;
    }
    out.push_str(&text[copied_to..]);
    (out, count)
}
