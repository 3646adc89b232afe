//! Base58 address text form.
//!
//! A Solana address is the Base58 encoding of 32 raw bytes: an ed25519 public
//! key for wallets, or an off-curve digest for program-derived addresses.

use crate::error::SolError;

/// Decode a Base58 address string into its 32 bytes.
///
/// The input must be exact: surrounding whitespace is a decode error.
pub fn address_to_bytes(address: &str) -> Result<[u8; 32], SolError> {
    let bytes = bs58::decode(address)
        .into_vec()
        .map_err(|e| SolError::InvalidAddress(format!("base58 decode failed: {e}")))?;

    let arr: [u8; 32] = bytes.try_into().map_err(|v: Vec<u8>| {
        SolError::InvalidAddress(format!("expected 32 bytes, got {}", v.len()))
    })?;

    Ok(arr)
}

/// Encode 32 bytes as a Base58 address string.
pub fn bytes_to_address(bytes: &[u8; 32]) -> String {
    bs58::encode(bytes).into_string()
}

/// Check that `address` is Base58 text decoding to exactly 32 bytes.
pub fn validate_address(address: &str) -> Result<(), SolError> {
    address_to_bytes(address).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_program_is_all_zero_bytes() {
        assert_eq!(bytes_to_address(&[0u8; 32]), "11111111111111111111111111111111");
        assert_eq!(
            address_to_bytes("11111111111111111111111111111111").unwrap(),
            [0u8; 32]
        );
    }

    #[test]
    fn token_program_roundtrip() {
        let address = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";
        let bytes = address_to_bytes(address).unwrap();
        assert_eq!(bytes_to_address(&bytes), address);
    }

    #[test]
    fn surrounding_whitespace_is_rejected() {
        for padded in [
            " TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA",
            "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA\n",
        ] {
            let err = validate_address(padded).unwrap_err();
            assert!(matches!(err, SolError::InvalidAddress(_)), "{padded:?}");
        }
    }

    #[test]
    fn garbage_is_rejected() {
        let err = address_to_bytes("not-a-valid-address!!!").unwrap_err();
        assert!(err.to_string().contains("base58"));
    }

    #[test]
    fn short_address_is_rejected() {
        // "1" decodes to a single zero byte.
        let err = address_to_bytes("1").unwrap_err();
        assert!(err.to_string().contains("expected 32 bytes, got 1"));
    }
}
