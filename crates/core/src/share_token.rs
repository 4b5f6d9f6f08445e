//! Share token generation.
//!
//! A share token is the only credential for unauthenticated read access to a
//! note, so it is drawn from the thread-local CSPRNG. 32 alphanumeric
//! characters carry ~190 bits of entropy and need no escaping in a URL.

use rand::Rng;

/// Length of a generated share token.
pub const SHARE_TOKEN_LENGTH: usize = 32;

/// How many fresh tokens to try before giving up on a uniqueness collision.
pub const MAX_GENERATION_ATTEMPTS: usize = 5;

/// Generate a new random share token.
pub fn generate_share_token() -> String {
    rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(SHARE_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Whether `token` could have been produced by [`generate_share_token`].
///
/// Lookups short-circuit on malformed tokens without querying the store.
pub fn is_well_formed(token: &str) -> bool {
    token.len() == SHARE_TOKEN_LENGTH && token.bytes().all(|b| b.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_token_has_correct_length() {
        assert_eq!(generate_share_token().len(), SHARE_TOKEN_LENGTH);
    }

    #[test]
    fn generated_token_is_url_safe() {
        let token = generate_share_token();
        assert!(
            token.chars().all(|c| c.is_ascii_alphanumeric()),
            "Token should be purely alphanumeric"
        );
    }

    #[test]
    fn tokens_differ() {
        assert_ne!(generate_share_token(), generate_share_token());
    }

    #[test]
    fn generated_token_is_well_formed() {
        assert!(is_well_formed(&generate_share_token()));
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        assert!(!is_well_formed(""));
        assert!(!is_well_formed("short"));
        assert!(!is_well_formed(&"a".repeat(SHARE_TOKEN_LENGTH + 1)));
        assert!(!is_well_formed(&"-".repeat(SHARE_TOKEN_LENGTH)));
    }
}
