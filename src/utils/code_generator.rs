//! Short code derivation and validation.
//!
//! Codes are deterministic per owner: the `n`th link an owner creates gets
//! the base62 encoding of the first six bytes of `sha256("{owner_id}:{n}")`.
//! On collision the caller moves on to the next index.

use sha2::{Digest, Sha256};
use uuid::Uuid;

const BASE62_CHARS: &[u8; 62] =
    b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Longest code the derivation can produce (62^9 > 2^48).
pub const MAX_CODE_LENGTH: usize = 9;

/// Codes that would shadow application routes.
const RESERVED_CODES: &[&str] = &["health", "links", "verify-password", "secure", "admin", "api"];

/// Encodes an integer in base62, most significant digit first.
pub fn base62_encode(mut num: u64) -> String {
    if num == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::with_capacity(MAX_CODE_LENGTH);
    while num > 0 {
        digits.push(BASE62_CHARS[(num % 62) as usize]);
        num /= 62;
    }
    digits.reverse();

    String::from_utf8_lossy(&digits).into_owned()
}

/// Derives the short code for an owner's `index`th link.
pub fn derive_short_code(owner_id: Uuid, index: i64) -> String {
    let digest = Sha256::digest(format!("{owner_id}:{index}").as_bytes());

    let mut prefix = [0u8; 8];
    prefix[2..].copy_from_slice(&digest[..6]);

    base62_encode(u64::from_be_bytes(prefix))
}

pub fn is_reserved(code: &str) -> bool {
    RESERVED_CODES.contains(&code)
}

/// Cheap shape check for path parameters before touching cache or store.
pub fn is_well_formed(code: &str) -> bool {
    !code.is_empty() && code.len() <= 32 && code.chars().all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_base62_encode_known_values() {
        assert_eq!(base62_encode(0), "0");
        assert_eq!(base62_encode(61), "Z");
        assert_eq!(base62_encode(62), "10");
        assert_eq!(base62_encode(3843), "ZZ");
    }

    #[test]
    fn test_derive_is_deterministic() {
        let owner = Uuid::new_v4();

        assert_eq!(derive_short_code(owner, 1), derive_short_code(owner, 1));
        assert_ne!(derive_short_code(owner, 1), derive_short_code(owner, 2));
    }

    #[test]
    fn test_derived_codes_are_short_and_alphanumeric() {
        let owner = Uuid::new_v4();
        let mut seen = HashSet::new();

        for index in 1..=500 {
            let code = derive_short_code(owner, index);
            assert!(code.len() <= MAX_CODE_LENGTH);
            assert!(is_well_formed(&code));
            seen.insert(code);
        }

        assert_eq!(seen.len(), 500);
    }

    #[test]
    fn test_reserved_codes() {
        assert!(is_reserved("health"));
        assert!(is_reserved("links"));
        assert!(!is_reserved("abc123"));
    }

    #[test]
    fn test_is_well_formed() {
        assert!(is_well_formed("abc123"));
        assert!(!is_well_formed(""));
        assert!(!is_well_formed("abc-123"));
        assert!(!is_well_formed("../etc"));
        assert!(!is_well_formed(&"a".repeat(33)));
    }
}
