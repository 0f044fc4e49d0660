//! Comment stripping for bundled JavaScript.
//!
//! Line comments are dropped up to (not including) the newline. Block comments
//! collapse to a newline when they spanned lines, to a single space when they
//! separated two tokens, and to nothing otherwise. Block comments equal to
//! [`SKIP_MARKER`] survive so a later logging pass can still see them.
use super::{
    line_end, regex_allowed_before, skip_block_comment, skip_quoted, skip_regex, skip_template,
    SKIP_MARKER,
};

/// Result of a comment-stripping pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrippedComments {
    pub text: String,
    pub removed: usize,
}

/// Strip line and block comments outside of string, template and regex literals.
pub fn strip_comments(source: &str) -> StrippedComments {
    let bytes = source.as_bytes();
    let mut out = String::with_capacity(source.len());
    let mut copied_to = 0;
    let mut removed = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\'' | b'"' => i = skip_quoted(bytes, i).unwrap_or(i + 1),
            b'`' => i = skip_template(bytes, i).unwrap_or(bytes.len()),
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                out.push_str(&source[copied_to..i]);
                i = line_end(bytes, i);
                copied_to = i;
                removed += 1;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let Some(end) = skip_block_comment(bytes, i) else {
                    // Unterminated; leave the tail untouched.
                    break;
                };
                let comment = &source[i..end];
                if comment == SKIP_MARKER {
                    i = end;
                    continue;
                }
                out.push_str(&source[copied_to..i]);
                out.push_str(block_replacement(bytes, i, end, comment));
                copied_to = end;
                removed += 1;
                i = end;
            }
            b'/' if regex_allowed_before(bytes, i) => {
                i = skip_regex(bytes, i).unwrap_or(i + 1);
            }
            _ => i += 1,
        }
    }
    out.push_str(&source[copied_to..]);

    StrippedComments { text: out, removed }
}

fn block_replacement(bytes: &[u8], start: usize, end: usize, comment: &str) -> &'static str {
    if comment.contains('\n') {
        return "\n";
    }
    let before = start.checked_sub(1).map(|idx| bytes[idx]);
    let after = bytes.get(end).copied();
    let separates = matches!(
        (before, after),
        (Some(b), Some(a)) if !b.is_ascii_whitespace() && !a.is_ascii_whitespace()
    );
    if separates {
        " "
    } else {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip(source: &str) -> String {
        strip_comments(source).text
    }

    #[test]
    fn removes_line_and_block_comments() {
        let source = "// header\nvar a = 1; // trailing\n/* block */var b = 2;\n";
        let stripped = strip_comments(source);
        assert_eq!(stripped.text, "\nvar a = 1; \nvar b = 2;\n");
        assert_eq!(stripped.removed, 3);
    }

    #[test]
    fn keeps_comment_lookalikes_inside_literals() {
        let source = concat!(
            "var url = \"https://example.com/*x*/\";\n",
            "var s = 'a // b';\n",
            "var t = `c /* d */ ${e // f\n}`;\n",
            "var r = /\\/\\/[/*]+/g;\n",
        );
        assert_eq!(strip(source), source);
    }

    #[test]
    fn division_is_not_mistaken_for_regex() {
        let source = "var x = a / b; // half\nvar y = c / d;";
        assert_eq!(strip(source), "var x = a / b; \nvar y = c / d;");
    }

    #[test]
    fn division_after_postfix_update_keeps_strings_intact() {
        let source = "a = b++ / c; t = 'it/s'; u = 'http://x';\nrun();\n";
        assert_eq!(strip(source), source);
        let source = "n = m-- / 2; s = \"//keep\"; // drop\n";
        assert_eq!(strip(source), "n = m-- / 2; s = \"//keep\"; \n");
    }

    #[test]
    fn block_comment_never_fuses_tokens() {
        assert_eq!(strip("return/**/x;"), "return x;");
        assert_eq!(strip("a = 1 /* one */ + 2;"), "a = 1  + 2;");
    }

    #[test]
    fn multiline_block_comment_keeps_a_line_break() {
        assert_eq!(strip("a()/*\n*/b()"), "a()\nb()");
    }

    #[test]
    fn preserves_logging_skip_marker() {
        let source = "console.log(\"x\"); /*RemoveLogging:skip*/ /* other */\n";
        assert_eq!(
            strip(source),
            "console.log(\"x\"); /*RemoveLogging:skip*/ \n"
        );
    }

    #[test]
    fn unterminated_block_comment_is_left_alone() {
        let source = "a(); /* never closed";
        assert_eq!(strip(source), source);
    }
}
