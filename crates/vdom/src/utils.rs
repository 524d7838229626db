//! Utility functions for building markup

use std::borrow::Cow;
use uuid::Uuid;

/// Characters that require escaping in text content
const ESCAPE_CHARS: [char; 6] = ['&', '<', '>', '"', '\'', '/'];

#[inline]
fn entity(c: char) -> Option<&'static str> {
    match c {
        '&' => Some("&amp;"),
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '"' => Some("&quot;"),
        '\'' => Some("&#39;"),
        '/' => Some("&#x2F;"),
        _ => None,
    }
}

/// HTML entity encoding
///
/// Borrows when nothing needs replacing.
pub fn escape_html(text: &str) -> Cow<'_, str> {
    if !text.contains(&ESCAPE_CHARS[..]) {
        return Cow::Borrowed(text);
    }

    let mut result = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match entity(c) {
            Some(e) => result.push_str(e),
            None => result.push(c),
        }
    }
    Cow::Owned(result)
}

const ID_ALPHABET: &[u8; 16] = b"ABCDEF0123456789";

/// 32-character identifier from 16 random bytes
///
/// Pure: the same bytes always give the same id.
pub fn random_id_from(bytes: [u8; 16]) -> String {
    let mut id = String::with_capacity(32);
    for byte in bytes {
        id.push(ID_ALPHABET[(byte >> 4) as usize] as char);
        id.push(ID_ALPHABET[(byte & 0x0f) as usize] as char);
    }
    id
}

/// Bytes of a v4 UUID that carry no version or variant bits
const UUID_RANDOM_BYTES: [usize; 14] = [0, 1, 2, 3, 4, 5, 7, 9, 10, 11, 12, 13, 14, 15];

/// 16 uniformly random bytes, drawn from v4 UUIDs
fn random_bytes() -> [u8; 16] {
    let mut bytes = [0u8; 16];
    let mut filled = 0;
    while filled < bytes.len() {
        let uuid = Uuid::new_v4();
        for &i in &UUID_RANDOM_BYTES {
            if filled == bytes.len() {
                break;
            }
            bytes[filled] = uuid.as_bytes()[i];
            filled += 1;
        }
    }
    bytes
}

/// 32-character identifier from system randomness
pub fn random_id() -> String {
    random_id_from(random_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"a & b < c > d " e ' f / g"#),
            "a &amp; b &lt; c &gt; d &quot; e &#39; f &#x2F; g"
        );
    }

    #[test]
    fn test_escape_html_borrows_clean_input() {
        assert!(matches!(escape_html("plain text"), Cow::Borrowed(_)));
        assert_eq!(escape_html("ünïcödé"), "ünïcödé");
    }

    #[test]
    fn test_random_id_from_is_pure() {
        let bytes = [0x00, 0x1f, 0xab, 0xff, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x10];
        let id = random_id_from(bytes);
        assert_eq!(id, random_id_from(bytes));
        assert!(id.starts_with("AAB94599"));
        assert!(id.ends_with("BA"));
    }

    #[test]
    fn test_random_id_shape() {
        let id = random_id();
        assert_eq!(id.len(), 32);
        assert!(id.bytes().all(|b| ID_ALPHABET.contains(&b)));
        assert_ne!(id, random_id());
    }

    #[test]
    fn test_random_id_every_position_varies() {
        let ids: Vec<String> = (0..1000).map(|_| random_id()).collect();

        for pos in 0..32 {
            let seen: HashSet<u8> = ids.iter().map(|id| id.as_bytes()[pos]).collect();
            assert_eq!(seen.len(), 16, "position {pos} saw only {seen:?}");
        }
    }
}
