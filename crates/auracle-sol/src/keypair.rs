//! Ed25519 signing identity for a fee payer.

use ed25519_dalek::{Signer, SigningKey};
use zeroize::Zeroize;

use crate::address::bytes_to_address;
use crate::error::SolError;

/// A payer keypair. The signing key is zeroized on drop by `ed25519-dalek`.
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Build from the 32-byte ed25519 seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Build from raw secret bytes: a 32-byte seed, or the 64-byte Solana
    /// layout `seed || public_key`. For the 64-byte form the embedded public
    /// key must match the one derived from the seed.
    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self, SolError> {
        let mut seed: [u8; 32] = match bytes.len() {
            32 | 64 => bytes[..32]
                .try_into()
                .map_err(|_| SolError::InvalidPrivateKey("seed slice".into()))?,
            n => {
                return Err(SolError::InvalidPrivateKey(format!(
                    "expected 32 or 64 bytes, got {n}"
                )))
            }
        };
        let keypair = Self::from_seed(&seed);
        seed.zeroize();

        if bytes.len() == 64 && bytes[32..] != keypair.pubkey() {
            return Err(SolError::InvalidPrivateKey(
                "embedded public key does not match seed".into(),
            ));
        }

        Ok(keypair)
    }

    /// Parse the JSON byte-array form written by `solana-keygen`.
    pub fn from_json(text: &str) -> Result<Self, SolError> {
        let mut bytes: Vec<u8> = serde_json::from_str(text.trim())
            .map_err(|e| SolError::InvalidPrivateKey(format!("not a JSON byte array: {e}")))?;
        let result = Self::from_secret_bytes(&bytes);
        bytes.zeroize();
        result
    }

    /// Parse a Base58-encoded 64-byte secret key.
    pub fn from_base58(text: &str) -> Result<Self, SolError> {
        let mut bytes = bs58::decode(text.trim())
            .into_vec()
            .map_err(|e| SolError::InvalidPrivateKey(format!("base58 decode failed: {e}")))?;
        let result = Self::from_secret_bytes(&bytes);
        bytes.zeroize();
        result
    }

    /// Raw 32-byte ed25519 public key, which is also the account address.
    pub fn pubkey(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Base58 address of the public key.
    pub fn address(&self) -> String {
        bytes_to_address(&self.pubkey())
    }

    /// Ed25519 signature over `message`. For transactions, `message` is the
    /// serialized legacy message.
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }
}

impl std::fmt::Debug for Keypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keypair")
            .field("pubkey", &self.address())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signature, VerifyingKey};

    fn solana_secret(seed: [u8; 32]) -> Vec<u8> {
        let mut out = seed.to_vec();
        out.extend_from_slice(&Keypair::from_seed(&seed).pubkey());
        out
    }

    #[test]
    fn seed_and_64_byte_forms_agree() {
        let seed = [0x42u8; 32];
        let a = Keypair::from_seed(&seed);
        let b = Keypair::from_secret_bytes(&solana_secret(seed)).unwrap();
        assert_eq!(a.pubkey(), b.pubkey());
    }

    #[test]
    fn mismatched_public_half_is_rejected() {
        let mut secret = solana_secret([0x42u8; 32]);
        secret[40] ^= 0xff;
        let err = Keypair::from_secret_bytes(&secret).unwrap_err();
        assert!(err.to_string().contains("does not match"));
    }

    #[test]
    fn wrong_length_is_rejected() {
        assert!(Keypair::from_secret_bytes(&[1u8; 48]).is_err());
    }

    #[test]
    fn json_array_form() {
        let secret = solana_secret([7u8; 32]);
        let json = serde_json::to_string(&secret).unwrap();
        let keypair = Keypair::from_json(&json).unwrap();
        assert_eq!(keypair.pubkey(), Keypair::from_seed(&[7u8; 32]).pubkey());
    }

    #[test]
    fn json_garbage_is_rejected() {
        assert!(Keypair::from_json("{\"not\": \"bytes\"}").is_err());
    }

    #[test]
    fn base58_form() {
        let secret = solana_secret([9u8; 32]);
        let text = bs58::encode(&secret).into_string();
        let keypair = Keypair::from_base58(&text).unwrap();
        assert_eq!(keypair.pubkey(), Keypair::from_seed(&[9u8; 32]).pubkey());
    }

    #[test]
    fn signature_verifies() {
        let keypair = Keypair::from_seed(&rand::random::<[u8; 32]>());
        let sig = keypair.sign(b"resolve");
        let vk = VerifyingKey::from_bytes(&keypair.pubkey()).unwrap();
        assert!(vk.verify_strict(b"resolve", &Signature::from_bytes(&sig)).is_ok());
    }

    #[test]
    fn debug_hides_secret() {
        let keypair = Keypair::from_seed(&[3u8; 32]);
        let debug = format!("{keypair:?}");
        assert!(debug.contains(&keypair.address()));
        assert!(!debug.contains("signing_key"));
    }
}
