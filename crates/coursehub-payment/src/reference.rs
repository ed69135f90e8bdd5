//! Gateway reference minting.

/// Prefix of every reference this service mints.
pub const REFERENCE_PREFIX: &str = "ps_";

/// Mint a fresh reference: `ps_` followed by 128 random bits in lower-case hex.
pub fn new_reference() -> String {
    format!("{REFERENCE_PREFIX}{:032x}", rand::random::<u128>())
}

/// Whether `reference` has the shape produced by [`new_reference`].
pub fn is_valid_reference(reference: &str) -> bool {
    reference
        .strip_prefix(REFERENCE_PREFIX)
        .is_some_and(|hex| {
            hex.len() == 32 && hex.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_reference_shape() {
        let reference = new_reference();
        assert_eq!(reference.len(), 35);
        assert!(is_valid_reference(&reference));
        assert!(!is_valid_reference("ps_XYZ"));
        assert!(!is_valid_reference("tx_0123456789abcdef0123456789abcdef"));
    }

    #[test]
    fn test_references_are_unique() {
        let refs: HashSet<String> = (0..1000).map(|_| new_reference()).collect();
        assert_eq!(refs.len(), 1000);
    }
}
