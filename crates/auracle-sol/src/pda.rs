//! Program Derived Address (PDA) search.
//!
//! A PDA is `SHA-256(seed_0 || ... || seed_n || bump || program_id || "ProgramDerivedAddress")`
//! for the first bump seed, counting down from 255, whose digest is NOT a
//! valid compressed ed25519 point. Landing off the curve guarantees no
//! private key exists for the address, so only the owning program can sign
//! for it.

use sha2::{Digest, Sha256};

use crate::error::SolError;

/// Domain tag appended to every PDA preimage.
const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

/// Runtime limit on the number of seeds, bump included.
pub const MAX_SEEDS: usize = 16;

/// Runtime limit on the length of a single seed.
pub const MAX_SEED_LEN: usize = 32;

/// Find the canonical PDA and its bump for `seeds` under `program_id`.
pub fn find_program_address(
    seeds: &[&[u8]],
    program_id: &[u8; 32],
) -> Result<([u8; 32], u8), SolError> {
    // One slot is reserved for the bump.
    if seeds.len() >= MAX_SEEDS {
        return Err(SolError::InvalidSeeds(format!(
            "at most {} seeds allowed, got {}",
            MAX_SEEDS - 1,
            seeds.len()
        )));
    }
    if let Some(seed) = seeds.iter().find(|s| s.len() > MAX_SEED_LEN) {
        return Err(SolError::InvalidSeeds(format!(
            "seed of {} bytes exceeds {MAX_SEED_LEN}",
            seed.len()
        )));
    }

    for bump in (0u8..=255).rev() {
        if let Some(address) = create_program_address(seeds, bump, program_id) {
            return Ok((address, bump));
        }
    }

    Err(SolError::PdaNotFound)
}

/// Hash `seeds || [bump] || program_id || marker` and return the digest if
/// it lies off the ed25519 curve, `None` otherwise.
pub fn create_program_address(
    seeds: &[&[u8]],
    bump: u8,
    program_id: &[u8; 32],
) -> Option<[u8; 32]> {
    let mut hasher = Sha256::new();
    for seed in seeds {
        hasher.update(seed);
    }
    hasher.update([bump]);
    hasher.update(program_id);
    hasher.update(PDA_MARKER);

    let hash: [u8; 32] = hasher.finalize().into();

    if is_on_curve(&hash) {
        return None;
    }

    Some(hash)
}

/// Whether 32 bytes decompress to an ed25519 curve point.
pub fn is_on_curve(bytes: &[u8; 32]) -> bool {
    curve25519_dalek::edwards::CompressedEdwardsY(*bytes)
        .decompress()
        .is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROGRAM: [u8; 32] = [0x5au8; 32];

    #[test]
    fn found_address_is_off_curve() {
        let (address, _) =
            find_program_address(&[b"market", &7u64.to_le_bytes()], &PROGRAM).unwrap();
        assert!(!is_on_curve(&address));
    }

    #[test]
    fn bump_reproduces_address() {
        let seeds: [&[u8]; 2] = [b"market", &42u64.to_le_bytes()];
        let (address, bump) = find_program_address(&seeds, &PROGRAM).unwrap();
        assert_eq!(create_program_address(&seeds, bump, &PROGRAM), Some(address));
    }

    #[test]
    fn every_higher_bump_lands_on_curve() {
        let seeds: [&[u8]; 2] = [b"market", &1234u64.to_le_bytes()];
        let (_, bump) = find_program_address(&seeds, &PROGRAM).unwrap();
        for higher in (bump as u16 + 1)..=255 {
            assert!(create_program_address(&seeds, higher as u8, &PROGRAM).is_none());
        }
    }

    #[test]
    fn program_id_changes_address() {
        let seeds: [&[u8]; 1] = [b"market"];
        let (a, _) = find_program_address(&seeds, &[1u8; 32]).unwrap();
        let (b, _) = find_program_address(&seeds, &[2u8; 32]).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn oversized_seed_is_rejected() {
        let long = [0u8; 33];
        assert!(find_program_address(&[&long], &PROGRAM).is_err());
    }

    #[test]
    fn too_many_seeds_are_rejected() {
        let seeds: Vec<&[u8]> = vec![&b"s"[..]; MAX_SEEDS];
        assert!(find_program_address(&seeds, &PROGRAM).is_err());
    }

    #[test]
    fn basepoint_is_on_curve() {
        let mut basepoint = [0x66u8; 32];
        basepoint[0] = 0x58;
        assert!(is_on_curve(&basepoint));
    }

    #[test]
    fn arbitrary_bytes_are_off_curve() {
        assert!(!is_on_curve(&[0x02; 32]));
    }
}
