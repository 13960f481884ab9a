//! Content-addressing helpers shared by every identity key.

use sha2::{Digest, Sha256};

/// Provider placeholder for "no value".
const NONE_SENTINEL: &str = "none";

/// SHA-256 of the UTF-8 bytes, as lower-case hex.
pub fn hash_string(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// True when the value is the upstream `"none"` placeholder (any case, padded).
pub fn is_none_sentinel(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case(NONE_SENTINEL)
}

/// Convert a display name to a URL-safe slug.
///
/// Lower-cases, turns every run of characters outside `[a-z0-9]` into one
/// `-`, and trims dashes from both ends. Non-ASCII letters are treated as
/// separators.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_lowercase_hex_sha256() {
        assert_eq!(
            hash_string(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            hash_string("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn hash_is_deterministic() {
        let a = hash_string("https://www.linkedin.com/in/jane-doe");
        let b = hash_string("https://www.linkedin.com/in/jane-doe");
        assert_eq!(a, b);
        assert_ne!(a, hash_string("https://www.linkedin.com/in/Jane-Doe"));
    }

    #[test]
    fn none_sentinel() {
        assert!(is_none_sentinel("none"));
        assert!(is_none_sentinel(" None "));
        assert!(is_none_sentinel("NONE"));
        assert!(!is_none_sentinel("nonesuch"));
        assert!(!is_none_sentinel(""));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("San Francisco, CA"), "san-francisco-ca");
        assert_eq!(slugify("  --Node.js--  "), "node-js");
        assert_eq!(slugify("UNKNOWN"), "unknown");
        assert_eq!(slugify("Azure Cosmos DB (API for MongoDB)"), "azure-cosmos-db-api-for-mongodb");
    }

    #[test]
    fn slugify_collapses_symbol_only_differences() {
        // C, C# and C++ share one slug.
        assert_eq!(slugify("C"), "c");
        assert_eq!(slugify("C#"), "c");
        assert_eq!(slugify("C++"), "c");
        assert_eq!(slugify("+++"), "");
    }
}
