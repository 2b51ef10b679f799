//! Deterministic cache-key derivation.

use sha2::{Digest, Sha256};

use super::store::RequestKind;

/// Hex characters of the digest kept as the key. Long enough to make
/// collisions negligible, short enough for efficient indexed lookup.
const KEY_HEX_LEN: usize = 32;

/// Derive a stable cache key from `(text, kind)`.
///
/// Lower-cases the text and collapses internal whitespace runs to single
/// spaces independently of the sanitizer's normalization — some caller
/// paths reach this on text that bypassed full sanitization. The kind
/// prefixes the hashed input so identical text under different kinds never
/// collides.
pub fn derive_key(text: &str, kind: RequestKind) -> String {
    let normalized = text
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    let mut hasher = Sha256::new();
    hasher.update(kind.to_string().as_bytes());
    hasher.update(b":");
    hasher.update(normalized.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..KEY_HEX_LEN].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_deterministic() {
        let k1 = derive_key("what is sourdough", RequestKind::Ask);
        let k2 = derive_key("what is sourdough", RequestKind::Ask);
        assert_eq!(k1, k2);
        assert_eq!(k1.len(), KEY_HEX_LEN);
    }

    #[test]
    fn test_key_kind_partitions_space() {
        let ask = derive_key("sourdough", RequestKind::Ask);
        let recipe = derive_key("sourdough", RequestKind::Recipe);
        assert_ne!(ask, recipe);
    }

    #[test]
    fn test_key_text_aware() {
        let k1 = derive_key("baguette", RequestKind::Ask);
        let k2 = derive_key("ciabatta", RequestKind::Ask);
        assert_ne!(k1, k2);
    }

    #[test]
    fn test_key_normalizes_case_and_whitespace() {
        let k1 = derive_key("  What   IS \t Sourdough ", RequestKind::Ask);
        let k2 = derive_key("what is sourdough", RequestKind::Ask);
        assert_eq!(k1, k2);
    }

    #[test]
    fn test_key_is_lowercase_hex() {
        let key = derive_key("rye", RequestKind::Recipe);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}
