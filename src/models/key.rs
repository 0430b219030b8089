//! Canonical storage keys and raw-path normalization.

use percent_encoding::percent_decode_str;
use std::fmt;

/// Outcome of normalizing one raw path component.
///
/// `Fallback` carries the slash-stripped original when percent-decoding hits a
/// sequence that is not valid UTF-8; the request proceeds with that value
/// instead of failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyDecode {
    Decoded(String),
    Fallback(String),
}

impl KeyDecode {
    pub fn into_key(self) -> StorageKey {
        match self {
            KeyDecode::Decoded(key) | KeyDecode::Fallback(key) => StorageKey(key),
        }
    }
}

/// Canonical object key: percent-decoded at most once, never `/`-prefixed.
/// The empty key addresses the bucket root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKey(String);

impl StorageKey {
    /// The root key (empty string).
    pub fn root() -> Self {
        StorageKey(String::new())
    }

    /// Normalize a raw, possibly encoded, possibly `/`-prefixed path.
    pub fn normalize(raw: &str) -> Self {
        Self::decode(raw).into_key()
    }

    /// Strip one leading `/` and percent-decode once if `%` is present.
    ///
    /// Paths without `%` are passed through untouched so keys the routing
    /// layer already decoded are not decoded a second time.
    pub fn decode(raw: &str) -> KeyDecode {
        let cleaned = raw.strip_prefix('/').unwrap_or(raw);
        if !cleaned.contains('%') {
            return KeyDecode::Decoded(cleaned.to_string());
        }
        match percent_decode_str(cleaned).decode_utf8() {
            Ok(decoded) => KeyDecode::Decoded(decoded.into_owned()),
            Err(_) => KeyDecode::Fallback(cleaned.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_input_passes_through() {
        assert_eq!(StorageKey::normalize("docs/readme.md").as_str(), "docs/readme.md");
        assert_eq!(StorageKey::normalize("a b.txt").as_str(), "a b.txt");
    }

    #[test]
    fn empty_input_is_root() {
        assert!(StorageKey::normalize("").is_root());
        assert!(StorageKey::normalize("/").is_root());
        assert_eq!(StorageKey::root(), StorageKey::normalize(""));
    }

    #[test]
    fn exactly_one_leading_slash_is_stripped() {
        assert_eq!(
            StorageKey::normalize("/docs/readme.md"),
            StorageKey::normalize("docs/readme.md")
        );
        assert_eq!(StorageKey::normalize("//a").as_str(), "/a");
    }

    #[test]
    fn percent_sequences_decode_once() {
        assert_eq!(StorageKey::normalize("a%20b.txt").as_str(), "a b.txt");
        assert_eq!(
            StorageKey::normalize("/docs/r%C3%A9sum%C3%A9.pdf").as_str(),
            "docs/résumé.pdf"
        );
        // Decoded exactly once: the escaped percent survives as a literal.
        assert_eq!(StorageKey::normalize("a%2520b").as_str(), "a%20b");
    }

    #[test]
    fn invalid_utf8_escape_falls_back_to_original() {
        match StorageKey::decode("/%FF%FE") {
            KeyDecode::Fallback(kept) => assert_eq!(kept, "%FF%FE"),
            other => panic!("expected fallback, got {other:?}"),
        }
        assert_eq!(StorageKey::normalize("%FF%FE").as_str(), "%FF%FE");
    }

    #[test]
    fn stray_percent_does_not_fail() {
        assert_eq!(StorageKey::normalize("100%").as_str(), "100%");
        assert_eq!(StorageKey::normalize("%zz").as_str(), "%zz");
    }
}
