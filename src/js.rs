//! Best-effort JavaScript text heuristics.
//!
//! Nothing here parses JavaScript. The helpers below recognize just enough
//! lexical structure (string, template and regex literals, comments) to keep
//! textual rewrites from landing inside a literal. Input that defeats the
//! heuristics is left as-is rather than guessed at.
//!
//! All scanning works on byte offsets. Every delimiter is ASCII, so each
//! offset handed back is a valid `str` char boundary.
pub mod comments;
pub mod logging;

/// Opt-out marker that exempts a single logging call from removal.
pub const SKIP_MARKER: &str = "/*RemoveLogging:skip*/";

const REGEX_PRECEDING_KEYWORDS: [&str; 14] = [
    "return",
    "typeof",
    "case",
    "do",
    "else",
    "in",
    "of",
    "new",
    "delete",
    "void",
    "throw",
    "yield",
    "await",
    "instanceof",
];

pub(crate) fn is_ident_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'$'
}

/// End (exclusive) of a quoted string starting at `start`.
///
/// Returns `None` when the string is not closed before a newline or EOF.
pub(crate) fn skip_quoted(bytes: &[u8], start: usize) -> Option<usize> {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\n' => return None,
            byte if byte == quote => return Some(i + 1),
            _ => i += 1,
        }
    }
    None
}

/// End (exclusive) of a template literal starting at the backtick at `start`,
/// including any nested `${...}` interpolations.
pub(crate) fn skip_template(bytes: &[u8], start: usize) -> Option<usize> {
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'`' => return Some(i + 1),
            b'$' if bytes.get(i + 1) == Some(&b'{') => i = skip_interpolation(bytes, i + 2)?,
            _ => i += 1,
        }
    }
    None
}

/// End (exclusive) of the code inside `${...}`, starting just after the brace.
fn skip_interpolation(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 1usize;
    let mut i = start;
    while i < bytes.len() {
        match bytes[i] {
            b'\'' | b'"' => i = skip_quoted(bytes, i)?,
            b'`' => i = skip_template(bytes, i)?,
            b'/' if bytes.get(i + 1) == Some(&b'/') => i = line_end(bytes, i),
            b'/' if bytes.get(i + 1) == Some(&b'*') => i = skip_block_comment(bytes, i)?,
            b'{' => {
                depth += 1;
                i += 1;
            }
            b'}' => {
                depth -= 1;
                i += 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => i += 1,
        }
    }
    None
}

/// End (exclusive) of a `/* ... */` comment starting at `start`.
pub(crate) fn skip_block_comment(bytes: &[u8], start: usize) -> Option<usize> {
    let mut i = start + 2;
    while i + 1 < bytes.len() {
        if bytes[i] == b'*' && bytes[i + 1] == b'/' {
            return Some(i + 2);
        }
        i += 1;
    }
    None
}

/// Offset of the next `\n` at or after `start`, or the input length.
pub(crate) fn line_end(bytes: &[u8], start: usize) -> usize {
    bytes[start..]
        .iter()
        .position(|&byte| byte == b'\n')
        .map_or(bytes.len(), |offset| start + offset)
}

/// End (exclusive) of a regex literal starting at the slash at `start`,
/// flags included. `None` if no closing slash appears on the same line.
pub(crate) fn skip_regex(bytes: &[u8], start: usize) -> Option<usize> {
    let mut i = start + 1;
    let mut in_class = false;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\n' => return None,
            b'[' => {
                in_class = true;
                i += 1;
            }
            b']' => {
                in_class = false;
                i += 1;
            }
            b'/' if !in_class => {
                i += 1;
                while i < bytes.len() && bytes[i].is_ascii_alphabetic() {
                    i += 1;
                }
                return Some(i);
            }
            _ => i += 1,
        }
    }
    None
}

/// Whether a `/` at `pos` starts a regex literal rather than a division,
/// judged from the previous significant token.
pub(crate) fn regex_allowed_before(bytes: &[u8], pos: usize) -> bool {
    let mut i = pos;
    while i > 0 && bytes[i - 1].is_ascii_whitespace() {
        i -= 1;
    }
    if i == 0 {
        return true;
    }
    let prev = bytes[i - 1];
    if is_ident_byte(prev) {
        let end = i;
        while i > 0 && is_ident_byte(bytes[i - 1]) {
            i -= 1;
        }
        let word = &bytes[i..end];
        return REGEX_PRECEDING_KEYWORDS
            .iter()
            .any(|keyword| keyword.as_bytes() == word);
    }
    // Postfix `++`/`--` closes an operand, so a following `/` divides.
    if matches!(prev, b'+' | b'-') && i >= 2 && bytes[i - 2] == prev {
        return false;
    }
    !matches!(prev, b')' | b']' | b'\'' | b'"' | b'`' | b'.')
}
