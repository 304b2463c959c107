//! Cookie-mirror codec.
//!
//! SYSTEM CONTEXT
//! ==============
//! The edge route guard runs before any page code and can only see request
//! headers, so the session store mirrors its full payload into one cookie.
//! The payload is the same JSON blob the storage backend persists,
//! percent-encoded because raw JSON is not a legal cookie value.
//!
//! Parsing fails closed: any malformed value decodes to `None`, which the
//! guard treats as unauthenticated.

use super::types::Session;

/// Cookie carrying the session mirror.
pub const SESSION_COOKIE: &str = "ab_session";

/// Percent-encode for a cookie value (RFC 3986 unreserved chars pass through).
fn percent_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char);
            }
            _ => {
                out.push_str(&format!("%{byte:02X}"));
            }
        }
    }
    out
}

fn hex_nibble(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Reverse of `percent_encode`. `None` on truncated or non-hex escapes and
/// on invalid UTF-8.
fn percent_decode(s: &str) -> Option<String> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if i + 2 >= bytes.len() {
                return None;
            }
            let hi = hex_nibble(bytes[i + 1])?;
            let lo = hex_nibble(bytes[i + 2])?;
            out.push((hi << 4) | lo);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

/// Encode a session into its cookie value.
#[must_use]
pub fn encode(session: &Session) -> String {
    // Serializing a plain struct of strings/ints cannot fail; an empty value
    // parses back to None, which fails closed.
    let json = serde_json::to_string(session).unwrap_or_default();
    percent_encode(&json)
}

/// Parse a cookie value back into a session.
///
/// Returns `None` for malformed encodings, malformed JSON, and payloads
/// that violate the token/user pairing invariant.
#[must_use]
pub fn parse(raw: &str) -> Option<Session> {
    let json = percent_decode(raw)?;
    let session: Session = serde_json::from_str(&json).ok()?;
    if session.access_token.is_empty() {
        return None;
    }
    Some(session)
}

#[cfg(test)]
#[path = "cookie_test.rs"]
mod tests;
