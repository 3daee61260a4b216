//! Human-readable rendering of payload bytes
//!
//! Printable ASCII passes through; control characters and non-ASCII bytes
//! become angle-bracket tokens such as `<GS>`. A literal `<` is written as
//! `<LT>`, so every `<` in the output opens a token.

/// Token for a byte that does not pass through, `None` for printable ASCII
fn token(byte: u8) -> Option<&'static str> {
    match byte {
        0x04 => Some("EOT"),
        0x09 => Some("TAB"),
        0x0A => Some("LF"),
        0x0D => Some("CR"),
        0x1C => Some("FS"),
        0x1D => Some("GS"),
        0x1E => Some("RS"),
        0x1F => Some("US"),
        b'<' => Some("LT"),
        _ => None,
    }
}

/// Render payload bytes for display
pub fn format_payload(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() + 8);
    for &byte in bytes {
        if let Some(name) = token(byte) {
            out.push('<');
            out.push_str(name);
            out.push('>');
        } else if (0x20..=0x7E).contains(&byte) {
            out.push(byte as char);
        } else {
            out.push_str(&format!("<0x{byte:02X}>"));
        }
    }
    out
}
