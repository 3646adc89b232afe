//! Instruction data for the program's `resolve_event` method.
//!
//! ```text
//! offset  size  field
//!      0     8  discriminator = sha256("global:resolve_event")[..8]
//!      8     8  event_id                 u64 LE
//!     16    32  truth_signal             raw bytes
//!     48     8  transaction_fee_lamports u64 LE
//! ```
//!
//! The layout has to match the deployed program byte for byte. A mismatch is
//! only ever reported by the program rejecting the transaction.

use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine};
use once_cell::sync::Lazy;
use sha2::{Digest, Sha256};

use crate::error::OracleError;

/// Total length of encoded `resolve_event` data.
pub const RESOLVE_EVENT_DATA_LEN: usize = 8 + 8 + TruthSignal::LEN + 8;

/// `sha256("global:resolve_event")[..8]`, computed once per process.
pub static RESOLVE_EVENT_DISCRIMINATOR: Lazy<[u8; 8]> =
    Lazy::new(|| instruction_discriminator("global", "resolve_event"));

/// Method selector: first 8 bytes of `sha256("{namespace}:{name}")`.
pub fn instruction_discriminator(namespace: &str, name: &str) -> [u8; 8] {
    let digest = Sha256::digest(format!("{namespace}:{name}").as_bytes());
    let mut discriminator = [0u8; 8];
    discriminator.copy_from_slice(&digest[..8]);
    discriminator
}

/// The 32-byte outcome assertion carried by `resolve_event`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TruthSignal([u8; 32]);

impl TruthSignal {
    /// Encoded width in bytes.
    pub const LEN: usize = 32;

    /// Wrap 32 bytes. Infallible; use `TryFrom` for unchecked input.
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// All-zero signal.
    pub const fn zeroed() -> Self {
        Self([0u8; 32])
    }

    /// The bytes exactly as they appear in instruction data.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for TruthSignal {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for TruthSignal {
    type Error = OracleError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let arr: [u8; 32] = bytes.try_into().map_err(|_| {
            OracleError::Validation(format!(
                "truth signal must be exactly {} bytes, got {}",
                Self::LEN,
                bytes.len()
            ))
        })?;
        Ok(Self(arr))
    }
}

impl TryFrom<Vec<u8>> for TruthSignal {
    type Error = OracleError;

    fn try_from(bytes: Vec<u8>) -> Result<Self, Self::Error> {
        Self::try_from(bytes.as_slice())
    }
}

/// Text form: 64 hex characters (optional `0x` prefix), otherwise standard
/// base64 decoding to 32 bytes.
impl FromStr for TruthSignal {
    type Err = OracleError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        let unprefixed = input.strip_prefix("0x").unwrap_or(input);

        if unprefixed.len() == 64 && unprefixed.bytes().all(|b| b.is_ascii_hexdigit()) {
            let bytes = hex::decode(unprefixed)
                .map_err(|e| OracleError::Validation(format!("truth signal hex: {e}")))?;
            return Self::try_from(bytes);
        }

        let bytes = BASE64_STANDARD.decode(input).map_err(|e| {
            OracleError::Validation(format!("truth signal is neither hex nor base64: {e}"))
        })?;
        Self::try_from(bytes)
    }
}

impl fmt::Debug for TruthSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TruthSignal(0x{})", hex::encode(self.0))
    }
}

/// Arguments of one `resolve_event` invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveEventArgs {
    pub event_id: u64,
    pub truth_signal: TruthSignal,
    pub transaction_fee_lamports: u64,
}

impl ResolveEventArgs {
    /// Arguments with an explicit fee. The estimate pass uses a fee of 0.
    pub fn new(event_id: u64, truth_signal: TruthSignal, transaction_fee_lamports: u64) -> Self {
        Self {
            event_id,
            truth_signal,
            transaction_fee_lamports,
        }
    }

    /// Same event and signal, different fee.
    pub fn with_fee(self, transaction_fee_lamports: u64) -> Self {
        Self {
            transaction_fee_lamports,
            ..self
        }
    }

    /// Instruction data, see [`encode_resolve_event`].
    pub fn encode(&self) -> Vec<u8> {
        encode_resolve_event(self.event_id, &self.truth_signal, self.transaction_fee_lamports)
    }
}

/// `discriminator || le_u64(event_id) || truth_signal || le_u64(fee)`.
pub fn encode_resolve_event(
    event_id: u64,
    truth_signal: &TruthSignal,
    fee_lamports: u64,
) -> Vec<u8> {
    let mut data = Vec::with_capacity(RESOLVE_EVENT_DATA_LEN);
    data.extend_from_slice(RESOLVE_EVENT_DISCRIMINATOR.as_slice());
    data.extend_from_slice(&event_id.to_le_bytes());
    data.extend_from_slice(truth_signal.as_bytes());
    data.extend_from_slice(&fee_lamports.to_le_bytes());
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn discriminator_constant() {
        assert_eq!(
            *RESOLVE_EVENT_DISCRIMINATOR,
            [0xb8, 0x37, 0x4e, 0x2f, 0x72, 0x26, 0x32, 0x5a]
        );
        assert_eq!(
            instruction_discriminator("global", "resolve_event"),
            *RESOLVE_EVENT_DISCRIMINATOR
        );
    }

    #[test]
    fn discriminator_depends_on_method_name() {
        assert_ne!(
            instruction_discriminator("global", "initialize"),
            *RESOLVE_EVENT_DISCRIMINATOR
        );
    }

    #[test]
    fn field_layout() {
        let signal = TruthSignal::new([0xAB; 32]);
        let data = encode_resolve_event(0x0102_0304_0506_0708, &signal, 5000);

        assert_eq!(data.len(), RESOLVE_EVENT_DATA_LEN);
        assert_eq!(data.len(), 56);
        assert_eq!(&data[..8], RESOLVE_EVENT_DISCRIMINATOR.as_slice());
        assert_eq!(&data[8..16], &[0x08u8, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01]);
        assert_eq!(&data[16..48], &[0xABu8; 32]);
        assert_eq!(&data[48..], &5000u64.to_le_bytes());
    }

    #[test]
    fn args_encode_matches_free_function() {
        let args = ResolveEventArgs::new(42, TruthSignal::zeroed(), 0);
        assert_eq!(args.encode(), encode_resolve_event(42, &TruthSignal::zeroed(), 0));

        let priced = args.with_fee(5000);
        assert_eq!(priced.event_id, 42);
        assert_eq!(&priced.encode()[48..], &5000u64.to_le_bytes());
    }

    #[test]
    fn signal_length_is_enforced() {
        for len in [0usize, 16, 31, 33, 64] {
            let err = TruthSignal::try_from(vec![0u8; len]).unwrap_err();
            assert!(matches!(err, OracleError::Validation(_)), "len {len}");
        }
        assert!(TruthSignal::try_from(&[0u8; 32][..]).is_ok());
    }

    #[test]
    fn signal_from_hex_text() {
        let hex_text = "11".repeat(32);
        let plain: TruthSignal = hex_text.parse().unwrap();
        let prefixed: TruthSignal = format!("0x{hex_text}").parse().unwrap();
        assert_eq!(plain, TruthSignal::new([0x11; 32]));
        assert_eq!(plain, prefixed);
    }

    #[test]
    fn signal_from_base64_text() {
        let encoded = BASE64_STANDARD.encode([0x5Au8; 32]);
        let signal: TruthSignal = encoded.parse().unwrap();
        assert_eq!(signal, TruthSignal::new([0x5A; 32]));
    }

    #[test]
    fn short_text_signal_is_rejected() {
        let encoded = BASE64_STANDARD.encode([1u8; 16]);
        assert!(matches!(
            encoded.parse::<TruthSignal>(),
            Err(OracleError::Validation(_))
        ));
        assert!("zz-not-base64".parse::<TruthSignal>().is_err());
    }

    #[test]
    fn debug_is_hex() {
        let debug = format!("{:?}", TruthSignal::new([0xFF; 32]));
        assert_eq!(debug, format!("TruthSignal(0x{})", "ff".repeat(32)));
    }

    proptest! {
        #[test]
        fn encoding_is_deterministic(
            event_id in any::<u64>(),
            signal in any::<[u8; 32]>(),
            fee in any::<u64>(),
        ) {
            let signal = TruthSignal::new(signal);
            let first = encode_resolve_event(event_id, &signal, fee);
            let second = encode_resolve_event(event_id, &signal, fee);
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(first.len(), RESOLVE_EVENT_DATA_LEN);
            prop_assert_eq!(&first[8..16], &event_id.to_le_bytes()[..]);
        }
    }
}
