//! Literal escaping for the selector grammar.
//!
//! `css_escape` follows the CSSOM `CSS.escape()` algorithm; `css_unescape` is its
//! inverse and is what the query parser applies to identifiers and quoted strings.

/// Escape a value so it can be embedded as an identifier or inside a quoted string.
pub fn css_escape(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    let mut out = String::with_capacity(value.len());

    for (i, &ch) in chars.iter().enumerate() {
        let code = ch as u32;
        if ch == '\0' {
            out.push('\u{FFFD}');
        } else if (0x01..=0x1F).contains(&code) || code == 0x7F {
            out.push_str(&format!("\\{:x} ", code));
        } else if i == 0 && ch.is_ascii_digit() {
            out.push_str(&format!("\\{:x} ", code));
        } else if i == 1 && ch.is_ascii_digit() && chars[0] == '-' {
            out.push_str(&format!("\\{:x} ", code));
        } else if i == 0 && ch == '-' && chars.len() == 1 {
            out.push_str("\\-");
        } else if code >= 0x80 || ch == '-' || ch == '_' || ch.is_ascii_alphanumeric() {
            out.push(ch);
        } else {
            out.push('\\');
            out.push(ch);
        }
    }

    out
}

/// Decode CSS escapes: `\` + 1..6 hex digits (+ one optional whitespace), or `\` + any char.
pub fn css_unescape(src: &str) -> String {
    if !src.contains('\\') {
        return src.to_string();
    }

    let chars: Vec<char> = src.chars().collect();
    let mut out = String::with_capacity(src.len());
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        if ch != '\\' {
            out.push(ch);
            i += 1;
            continue;
        }

        i += 1;
        let Some(&next) = chars.get(i) else {
            // Trailing backslash escapes nothing; keep U+FFFD like the CSS tokenizer.
            out.push('\u{FFFD}');
            break;
        };

        if next.is_ascii_hexdigit() {
            let start = i;
            while i < chars.len() && i - start < 6 && chars[i].is_ascii_hexdigit() {
                i += 1;
            }
            let hex: String = chars[start..i].iter().collect();
            let decoded = u32::from_str_radix(&hex, 16)
                .ok()
                .filter(|c| *c != 0)
                .and_then(char::from_u32)
                .unwrap_or('\u{FFFD}');
            out.push(decoded);
            if chars.get(i).is_some_and(|c| c.is_ascii_whitespace()) {
                i += 1;
            }
        } else {
            out.push(next);
            i += 1;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_leading_digit() {
        assert_eq!(css_escape("123abc"), "\\31 23abc");
        assert_eq!(css_unescape("\\31 23abc"), "123abc");
    }

    #[test]
    fn escapes_quotes_and_spaces() {
        assert_eq!(css_escape("say \"hi\""), "say\\ \\\"hi\\\"");
        assert_eq!(css_unescape(&css_escape("say \"hi\"")), "say \"hi\"");
    }

    #[test]
    fn lone_hyphen_and_hyphen_digit() {
        assert_eq!(css_escape("-"), "\\-");
        assert_eq!(css_escape("-1a"), "-\\31 a");
    }

    #[test]
    fn passes_non_ascii_through() {
        assert_eq!(css_escape("选择日期"), "选择日期");
    }
}
