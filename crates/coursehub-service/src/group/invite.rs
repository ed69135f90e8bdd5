//! Invite code generation.
//!
//! Codes look like `GRP-7K2Q9XAB`. Uniqueness is enforced by the store;
//! the coordinator regenerates on collision.

use rand::Rng;

/// Prefix of every invite code.
pub const INVITE_PREFIX: &str = "GRP-";

/// Number of random characters after the prefix.
pub const INVITE_CODE_LEN: usize = 8;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generate a fresh invite code.
pub fn generate_invite_code() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..INVITE_CODE_LEN)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    format!("{INVITE_PREFIX}{suffix}")
}

/// Whether `code` matches `GRP-[A-Z0-9]{8}`.
pub fn is_valid_invite_code(code: &str) -> bool {
    code.strip_prefix(INVITE_PREFIX).is_some_and(|suffix| {
        suffix.len() == INVITE_CODE_LEN
            && suffix
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generated_codes_match_format() {
        for _ in 0..500 {
            let code = generate_invite_code();
            assert!(is_valid_invite_code(&code), "bad code {code}");
        }
    }

    #[test]
    fn test_generated_codes_are_unique() {
        let codes: HashSet<String> = (0..2000).map(|_| generate_invite_code()).collect();
        assert_eq!(codes.len(), 2000);
    }

    #[test]
    fn test_rejects_malformed_codes() {
        assert!(is_valid_invite_code("GRP-AB12CD34"));
        assert!(!is_valid_invite_code("GRP-ab12cd34"));
        assert!(!is_valid_invite_code("GRP-AB12CD3"));
        assert!(!is_valid_invite_code("GRX-AB12CD34"));
        assert!(!is_valid_invite_code("GRP-AB12CD3!"));
    }
}
