//! Escape Sequence Processing
//!
//! Recognized escapes: `\n`, `\r`, `\t`, `\\`, `\"`, `\'`, `\0`, `\xHH`,
//! `\uXXXX` and backslash-newline (removed). Unrecognized escapes are
//! preserved literally (`\q` stays `\q`).

/// Resolve a single-character escape.
#[inline]
fn resolve_escape(c: char) -> Option<char> {
    match c {
        'n' => Some('\n'),
        'r' => Some('\r'),
        't' => Some('\t'),
        '\\' => Some('\\'),
        '"' => Some('"'),
        '\'' => Some('\''),
        '0' => Some('\0'),
        'a' => Some('\x07'),
        'b' => Some('\x08'),
        'f' => Some('\x0C'),
        'v' => Some('\x0B'),
        _ => None,
    }
}

/// Read `digits` hex digits from the front of `chars` as a code point.
fn take_hex(chars: &mut std::str::Chars<'_>, digits: usize) -> Option<char> {
    let text: String = chars.clone().take(digits).collect();
    if text.len() != digits {
        return None;
    }
    let code = u32::from_str_radix(&text, 16).ok()?;
    let c = char::from_u32(code)?;
    for _ in 0..digits {
        chars.next();
    }
    Some(c)
}

/// Process the escape sequences of a string literal body.
pub(crate) fn unescape_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('\n') => {}
            Some('\r') => {
                let mut ahead = chars.clone();
                if ahead.next() == Some('\n') {
                    chars = ahead;
                }
            }
            Some(esc @ ('x' | 'u')) => {
                let digits = if esc == 'x' { 2 } else { 4 };
                match take_hex(&mut chars, digits) {
                    Some(resolved) => result.push(resolved),
                    None => {
                        result.push('\\');
                        result.push(esc);
                    }
                }
            }
            Some(esc) => match resolve_escape(esc) {
                Some(resolved) => result.push(resolved),
                None => {
                    result.push('\\');
                    result.push(esc);
                }
            },
            None => result.push('\\'),
        }
    }

    result
}

#[cfg(test)]
mod tests;
