use sha2::{Digest, Sha256};

/// Hex prefix of the SHA-256 digest of `text`, `len` digits long.
pub fn short_hash(text: &str, len: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let mut hash = hex::encode(hasher.finalize());
    hash.truncate(len.clamp(1, 64));
    hash
}

/// First `max` characters of `text`, never splitting a code point.
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_hash_is_deterministic() {
        let a = short_hash("html>body>div", 8);
        assert_eq!(a.len(), 8);
        assert_eq!(a, short_hash("html>body>div", 8));
        assert_ne!(a, short_hash("html>body>span", 8));
    }

    #[test]
    fn truncates_on_char_boundaries() {
        assert_eq!(truncate_chars("héllo wörld", 4), "héll");
        assert_eq!(truncate_chars("ab", 25), "ab");
    }
}
