//! `?` placeholder scanning.
//!
//! The scanner walks SQL text the way the server lexer would and only treats a
//! `?` as a placeholder when it sits in plain statement text. Skipped regions:
//!
//! - single-quoted literals, including `E'...'` strings with backslash escapes
//! - double-quoted identifiers
//! - `--` line comments and nested `/* */` block comments
//! - dollar-quoted bodies (`$$...$$`, `$tag$...$tag$`)
//!
//! A doubled `??` is emitted as a single literal `?`, which is how the
//! PostgreSQL jsonb operators `?`, `?|` and `?&` are written in raw fragments.

enum Piece<'a> {
    Text(&'a str),
    Placeholder,
}

/// Rewrite `?` placeholders to PostgreSQL's `$1, $2, ...` numbering.
///
/// ```
/// use sqlweave::number_placeholders;
///
/// assert_eq!(
///     number_placeholders("SELECT * FROM t WHERE tags ??| ? AND note <> '?'"),
///     "SELECT * FROM t WHERE tags ?| $1 AND note <> '?'"
/// );
/// ```
pub fn number_placeholders(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len() + 8);
    let mut index = 0usize;
    scan(sql, |piece| match piece {
        Piece::Text(text) => out.push_str(text),
        Piece::Placeholder => {
            index += 1;
            out.push('$');
            out.push_str(&index.to_string());
        }
    });
    out
}

/// Number of placeholders [`number_placeholders`] would rewrite.
pub fn count_placeholders(sql: &str) -> usize {
    let mut count = 0;
    scan(sql, |piece| {
        if let Piece::Placeholder = piece {
            count += 1;
        }
    });
    count
}

fn scan<'a>(sql: &'a str, mut emit: impl FnMut(Piece<'a>)) {
    let bytes = sql.as_bytes();
    let len = bytes.len();
    let mut start = 0;
    let mut i = 0;

    while i < len {
        i = match bytes[i] {
            b'\'' => skip_quoted(bytes, i, b'\'', is_escape_string(bytes, i)),
            b'"' => skip_quoted(bytes, i, b'"', false),
            b'-' if bytes.get(i + 1) == Some(&b'-') => bytes[i..]
                .iter()
                .position(|&b| b == b'\n')
                .map_or(len, |p| i + p + 1),
            b'/' if bytes.get(i + 1) == Some(&b'*') => skip_block_comment(bytes, i),
            b'$' => dollar_quote_end(bytes, i).unwrap_or(i + 1),
            b'?' => {
                if start < i {
                    emit(Piece::Text(&sql[start..i]));
                }
                let next = if bytes.get(i + 1) == Some(&b'?') {
                    emit(Piece::Text("?"));
                    i + 2
                } else {
                    emit(Piece::Placeholder);
                    i + 1
                };
                start = next;
                next
            }
            _ => i + 1,
        };
    }

    if start < len {
        emit(Piece::Text(&sql[start..]));
    }
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b >= 0x80
}

// `E'` or `e'` not preceded by an identifier character.
fn is_escape_string(bytes: &[u8], quote: usize) -> bool {
    quote > 0
        && matches!(bytes[quote - 1], b'E' | b'e')
        && (quote < 2 || !is_ident_byte(bytes[quote - 2]))
}

/// Index just past the closing quote. Unterminated text runs to the end.
fn skip_quoted(bytes: &[u8], open: usize, quote: u8, backslash: bool) -> usize {
    let mut i = open + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if backslash => i += 2,
            b if b == quote => {
                if bytes.get(i + 1) == Some(&quote) {
                    i += 2;
                } else {
                    return i + 1;
                }
            }
            _ => i += 1,
        }
    }
    bytes.len()
}

fn skip_block_comment(bytes: &[u8], open: usize) -> usize {
    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        match (bytes[i], bytes.get(i + 1)) {
            (b'/', Some(b'*')) => {
                depth += 1;
                i += 2;
            }
            (b'*', Some(b'/')) => {
                depth -= 1;
                i += 2;
                if depth == 0 {
                    return i;
                }
            }
            _ => i += 1,
        }
    }
    bytes.len()
}

/// End of a dollar-quoted body opened at `open`, or `None` when the `$` does
/// not open one (`$1`, `a$b`).
fn dollar_quote_end(bytes: &[u8], open: usize) -> Option<usize> {
    if open > 0 && is_ident_byte(bytes[open - 1]) {
        return None;
    }
    let mut close = open + 1;
    while close < bytes.len() && bytes[close] != b'$' {
        if !is_ident_byte(bytes[close]) {
            return None;
        }
        close += 1;
    }
    if close >= bytes.len() || bytes.get(open + 1).is_some_and(u8::is_ascii_digit) {
        return None;
    }

    let tag = &bytes[open..=close];
    let body = close + 1;
    Some(
        bytes[body..]
            .windows(tag.len())
            .position(|w| w == tag)
            .map_or(bytes.len(), |p| body + p + tag.len()),
    )
}
