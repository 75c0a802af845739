//! Decoding of backslash escapes inside MI C strings.
//!
//! gdb escapes non-printable and non-ASCII bytes as octal (`\303\251`), so escapes are
//! decoded to raw bytes first and the result is read back as UTF-8. Bytes that do not form
//! UTF-8 are taken as Latin-1, which is what a target `char` in a non-UTF-8 locale holds.

use std::iter::Peekable;
use std::str::Chars;

/// The escape sequence that could not be decoded, backslash included.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct InvalidEscape(pub String);

pub fn unescape(raw: &str) -> Result<String, InvalidEscape> {
    if !raw.contains('\\') {
        return Ok(raw.to_string());
    }

    let mut bytes = Vec::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            push_char(&mut bytes, c);
            continue;
        }

        let Some(escape) = chars.next() else {
            return Err(InvalidEscape("\\".to_string()));
        };

        match escape {
            '\n' => {}
            '\\' => bytes.push(b'\\'),
            '\'' => bytes.push(b'\''),
            '"' => bytes.push(b'"'),
            'a' => bytes.push(0x07),
            'b' => bytes.push(0x08),
            'f' => bytes.push(0x0c),
            'n' => bytes.push(b'\n'),
            'r' => bytes.push(b'\r'),
            't' => bytes.push(b'\t'),
            'v' => bytes.push(0x0b),
            '0'..='7' => {
                let mut value = escape.to_digit(8).unwrap_or_default();
                for _ in 0..2 {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(digit) => {
                            value = value * 8 + digit;
                            chars.next();
                        }
                        None => break,
                    }
                }

                match u8::try_from(value) {
                    Ok(byte) => bytes.push(byte),
                    // \400 to \777 name code points rather than bytes.
                    Err(_) => push_char(&mut bytes, char::from_u32(value).unwrap_or('\u{FFFD}')),
                }
            }
            'x' => {
                let value = hex_digits(&mut chars, escape, 2)?;
                bytes.push(value as u8);
            }
            'u' => {
                let value = hex_digits(&mut chars, escape, 4)?;
                push_char(&mut bytes, code_point(value, escape)?);
            }
            'U' => {
                let value = hex_digits(&mut chars, escape, 8)?;
                push_char(&mut bytes, code_point(value, escape)?);
            }
            other => {
                bytes.push(b'\\');
                push_char(&mut bytes, other);
            }
        }
    }

    Ok(match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => latin1_fallback(e.as_bytes()),
    })
}

fn latin1_fallback(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
        text.extend(chunk.invalid().iter().map(|&byte| byte as char));
    }
    text
}

#[inline(always)]
fn push_char(bytes: &mut Vec<u8>, c: char) {
    let mut buf = [0; 4];
    bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
}

fn hex_digits(chars: &mut Peekable<Chars>, escape: char, len: usize) -> Result<u32, InvalidEscape> {
    let mut digits = String::with_capacity(len);

    for _ in 0..len {
        match chars.peek() {
            Some(c) if c.is_ascii_hexdigit() => {
                digits.push(*c);
                chars.next();
            }
            _ => return Err(InvalidEscape(format!("\\{}{}", escape, digits))),
        }
    }

    u32::from_str_radix(&digits, 16).map_err(|_| InvalidEscape(format!("\\{}{}", escape, digits)))
}

fn code_point(value: u32, escape: char) -> Result<char, InvalidEscape> {
    let width = if escape == 'u' { 4 } else { 8 };
    char::from_u32(value).ok_or_else(|| InvalidEscape(format!("\\{}{:0width$x}", escape, value)))
}
