//! Encoding cleanup at the input boundary

use std::borrow::Cow;

/// Decode one input line, dropping bytes that are not valid UTF-8
///
/// Every dropped byte is reported in a single warning that lists the
/// byte positions within the line.
pub fn decode_line(bytes: &[u8], line_number: usize) -> Cow<'_, str> {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Cow::Borrowed(text);
    }

    let mut text = String::with_capacity(bytes.len());
    let mut dropped = Vec::new();
    let mut rest = bytes;
    let mut offset = 0;
    loop {
        match std::str::from_utf8(rest) {
            Ok(valid) => {
                text.push_str(valid);
                break;
            }
            Err(e) => {
                let (valid, after) = rest.split_at(e.valid_up_to());
                text.push_str(&String::from_utf8_lossy(valid));
                let bad = e.error_len().unwrap_or(after.len());
                let start = offset + valid.len();
                dropped.extend(start..start + bad);
                offset = start + bad;
                rest = &after[bad..];
            }
        }
    }

    log::warn!(
        "Line {}: deleted {} non-decodable byte{} at position{} {}",
        line_number,
        dropped.len(),
        if dropped.len() == 1 { "" } else { "s" },
        if dropped.len() == 1 { "" } else { "s" },
        dropped
            .iter()
            .map(|pos| pos.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );
    Cow::Owned(text)
}
