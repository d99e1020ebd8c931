//! Content hashing for artifact identity.

use std::fmt;
use std::str::FromStr;

/// A 128-bit content digest computed with BLAKE3.
///
/// Two diagram bodies with the same `ContentHash` are assumed to be identical.
/// The hex form is part of every artifact filename, so the encoding must stay
/// stable across releases.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContentHash([u8; 16]);

impl ContentHash {
    /// Number of hex characters in the display form.
    pub const HEX_LEN: usize = 32;

    /// Computes a content hash from a byte slice.
    ///
    /// The BLAKE3 output is truncated to its first 16 bytes.
    pub fn from_bytes(data: &[u8]) -> Self {
        let digest = blake3::hash(data);
        let mut out = [0u8; 16];
        out.copy_from_slice(&digest.as_bytes()[..16]);
        Self(out)
    }

    /// Returns the raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({:02x}{:02x}..)", self.0[0], self.0[1])
    }
}

/// Error returned when parsing a hex digest fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid content hash '{0}': expected 32 lowercase hex characters")]
pub struct ParseContentHashError(pub String);

impl FromStr for ContentHash {
    type Err = ParseContentHashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || ParseContentHashError(s.to_string());
        if s.len() != Self::HEX_LEN
            || !s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
        {
            return Err(bad());
        }
        let mut out = [0u8; 16];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16).map_err(|_| bad())?;
        }
        Ok(Self(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        let a = ContentHash::from_bytes(b"graph TD; A-->B");
        let b = ContentHash::from_bytes(b"graph TD; A-->B");
        assert_eq!(a, b);
    }

    #[test]
    fn different_inputs_differ() {
        let a = ContentHash::from_bytes(b"graph TD; A-->B");
        let b = ContentHash::from_bytes(b"graph TD; A-->C");
        assert_ne!(a, b);
    }

    #[test]
    fn display_format() {
        let h = ContentHash::from_bytes(b"test");
        let s = format!("{h}");
        assert_eq!(s.len(), ContentHash::HEX_LEN);
        assert!(s.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn known_digest_is_stable() {
        // BLAKE3("") begins af1349b9f5f9a1a6a0404dea36dcc949
        let h = ContentHash::from_bytes(b"");
        assert_eq!(h.to_string(), "af1349b9f5f9a1a6a0404dea36dcc949");
    }

    #[test]
    fn parse_display_form() {
        let h = ContentHash::from_bytes(b"parse me");
        let back: ContentHash = h.to_string().parse().unwrap();
        assert_eq!(h, back);
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert!("abc".parse::<ContentHash>().is_err());
        assert!("AF1349B9F5F9A1A6A0404DEA36DCC949".parse::<ContentHash>().is_err());
        assert!("zz1349b9f5f9a1a6a0404dea36dcc949".parse::<ContentHash>().is_err());
    }

    #[test]
    fn debug_abbreviated() {
        let h = ContentHash::from_bytes(b"test");
        let s = format!("{h:?}");
        assert!(s.starts_with("ContentHash("));
        assert!(s.ends_with(")"));
    }
}
