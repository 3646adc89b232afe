use thiserror::Error;

/// Failures in the offline Solana primitives: key parsing, address
/// derivation and message assembly.
#[derive(Debug, Error)]
pub enum SolError {
    #[error("invalid secret key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid seeds: {0}")]
    InvalidSeeds(String),

    /// Every bump from 255 down to 0 produced an on-curve point.
    #[error("no viable bump seed for program derived address")]
    PdaNotFound,

    #[error("cannot compile message: {0}")]
    TransactionBuildError(String),

    #[error("cannot sign message: {0}")]
    SigningError(String),

    #[error("cannot serialize message: {0}")]
    SerializationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_detail() {
        let cases = [
            (SolError::InvalidPrivateKey("need 32 or 64 bytes".into()), "invalid secret key"),
            (SolError::InvalidSeeds("seed of 40 bytes".into()), "invalid seeds"),
            (SolError::TransactionBuildError("257 accounts".into()), "cannot compile"),
            (SolError::SerializationError("overflow".into()), "cannot serialize"),
        ];
        for (err, prefix) in cases {
            assert!(err.to_string().starts_with(prefix), "{err}");
        }
    }

    #[test]
    fn pda_not_found_has_fixed_message() {
        assert_eq!(
            SolError::PdaNotFound.to_string(),
            "no viable bump seed for program derived address"
        );
    }
}
