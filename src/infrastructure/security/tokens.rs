use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Mint a fresh opaque bearer token. Only its hash is ever stored.
pub fn generate_token() -> String {
    format!("pdk_{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

/// Hash a bearer token for storage and lookup.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_are_unique_and_hash_stable() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
        assert!(a.starts_with("pdk_"));

        assert_eq!(hash_token(&a), hash_token(&a));
        assert_ne!(hash_token(&a), hash_token(&b));
        assert_eq!(hash_token(&a).len(), 64);
    }
}
