//! Org API key generation.
//!
//! The key is an opaque random token stored on the org row and matched
//! exactly on lookup. Presenting it authenticates a request as the org's
//! admin representative, so it must carry enough entropy to be unguessable.

const API_KEY_BYTES: usize = 16;

/// Generate a fresh org API key: 16 random bytes, hex-encoded.
pub fn generate_org_api_key() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let random_bytes: Vec<u8> = (0..API_KEY_BYTES).map(|_| rng.random()).collect();
    hex::encode(random_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_hex_of_expected_length() {
        let key = generate_org_api_key();
        assert_eq!(key.len(), API_KEY_BYTES * 2);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_keys_are_unique() {
        let a = generate_org_api_key();
        let b = generate_org_api_key();
        assert_ne!(a, b);
    }
}
