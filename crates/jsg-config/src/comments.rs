//! Removal of `//` line comments from JSON-like configuration text.

/// Strips `//` comments that occur outside double-quoted strings.
///
/// The comment runs to the end of its line; the newline itself is kept so
/// that line numbers reported by the JSON parser still match the source.
/// Escaped quotes inside strings do not terminate the string.
pub fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut in_string = false;
    let mut escaped = false;
    while let Some(ch) = chars.next() {
        if in_string {
            out.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => {
                in_string = true;
                out.push(ch);
            }
            '/' if chars.peek() == Some(&'/') => {
                while let Some(&next) = chars.peek() {
                    if next == '\n' || next == '\r' {
                        break;
                    }
                    chars.next();
                }
            }
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::strip_comments;

    #[test]
    fn removes_trailing_and_full_line_comments() {
        let text = "{\n  // account settings\n  \"a\": 1, // inline\n  \"b\": 2\n}";
        assert_eq!(strip_comments(text), "{\n  \n  \"a\": 1, \n  \"b\": 2\n}");
    }

    #[test]
    fn keeps_slashes_inside_strings() {
        let text = r#"{"executable": "//scratch/bin/bfs", "url": "http://x"} // tail"#;
        assert_eq!(
            strip_comments(text),
            r#"{"executable": "//scratch/bin/bfs", "url": "http://x"} "#
        );
    }

    #[test]
    fn escaped_quote_does_not_close_string() {
        let text = r#"{"a": "say \"//hi\""} // gone"#;
        assert_eq!(strip_comments(text), r#"{"a": "say \"//hi\""} "#);
    }

    #[test]
    fn single_slash_is_preserved() {
        assert_eq!(strip_comments("{\"r\": 1/2}"), "{\"r\": 1/2}");
    }
}
