//! Frame checksum
//!
//! PIXSE frames carry a single-byte XOR of every character between the
//! leading `$` and the `*` trailer, rendered as lowercase hex without padding.

/// XOR of all bytes
pub fn xor_checksum(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |acc, &b| acc ^ b)
}

/// Checksum of a sentence body, skipping a leading `$` if present
pub fn sentence_checksum(sentence: &str) -> u8 {
    let body = sentence.strip_prefix('$').unwrap_or(sentence);
    xor_checksum(body.as_bytes())
}

/// Render a checksum the way the device expects it (`{:x}`, no `0x`, no padding)
pub fn render(checksum: u8) -> String {
    format!("{checksum:x}")
}

/// Verify a complete `$...*hh` frame, ignoring any trailing CR/LF.
///
/// Returns `false` when there is no `*` trailer or the hex does not parse.
pub fn verify(frame: &str) -> bool {
    let frame = frame.trim_end_matches(['\r', '\n']);
    let Some((body, trailer)) = frame.rsplit_once('*') else {
        return false;
    };
    match u8::from_str_radix(trailer, 16) {
        Ok(expected) => sentence_checksum(body) == expected,
        Err(_) => false,
    }
}
