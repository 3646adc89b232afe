//! Assembles the `resolve_event` program invocation.
//!
//! The program reads its accounts by position, so the order below is part of
//! the wire contract:
//!
//! | # | account              | signer | writable |
//! |---|----------------------|--------|----------|
//! | 0 | payer                | yes    | yes      |
//! | 1 | market state PDA     | no     | yes      |
//! | 2 | payer token account  | no     | yes      |
//! | 3 | mint                 | no     | no       |
//! | 4 | SPL token program    | no     | no       |
//! | 5 | system program       | no     | no       |

use auracle_sol::{SolAccountMeta, SolInstruction, SYSTEM_PROGRAM_ID, TOKEN_PROGRAM_ID};

use crate::codec::ResolveEventArgs;

/// Per-call accounts of a `resolve_event` instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveEventAccounts {
    pub payer: [u8; 32],
    pub market_state: [u8; 32],
    pub payer_token_account: [u8; 32],
}

/// Build the instruction. Pure: no I/O, no validation beyond the types.
pub fn build_resolve_event_instruction(
    program_id: &[u8; 32],
    mint: &[u8; 32],
    accounts: &ResolveEventAccounts,
    args: &ResolveEventArgs,
) -> SolInstruction {
    SolInstruction {
        program_id: *program_id,
        accounts: vec![
            SolAccountMeta::new(accounts.payer, true),
            SolAccountMeta::new(accounts.market_state, false),
            SolAccountMeta::new(accounts.payer_token_account, false),
            SolAccountMeta::new_readonly(*mint, false),
            SolAccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),
            SolAccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
        ],
        data: args.encode(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{TruthSignal, RESOLVE_EVENT_DISCRIMINATOR};

    fn accounts() -> ResolveEventAccounts {
        ResolveEventAccounts {
            payer: [0x01; 32],
            market_state: [0x02; 32],
            payer_token_account: [0x03; 32],
        }
    }

    #[test]
    fn six_accounts_in_contract_order() {
        let mint = [0x04; 32];
        let ix = build_resolve_event_instruction(
            &[0x99; 32],
            &mint,
            &accounts(),
            &ResolveEventArgs::new(7, TruthSignal::zeroed(), 0),
        );

        let expected = [
            ([0x01; 32], true, true),
            ([0x02; 32], false, true),
            ([0x03; 32], false, true),
            (mint, false, false),
            (TOKEN_PROGRAM_ID, false, false),
            (SYSTEM_PROGRAM_ID, false, false),
        ];
        assert_eq!(ix.accounts.len(), expected.len());
        for (meta, (pubkey, signer, writable)) in ix.accounts.iter().zip(expected) {
            assert_eq!(meta.pubkey, pubkey);
            assert_eq!(meta.is_signer, signer);
            assert_eq!(meta.is_writable, writable);
        }
    }

    #[test]
    fn targets_configured_program() {
        let ix = build_resolve_event_instruction(
            &[0x99; 32],
            &[0x04; 32],
            &accounts(),
            &ResolveEventArgs::new(7, TruthSignal::zeroed(), 0),
        );
        assert_eq!(ix.program_id, [0x99; 32]);
    }

    #[test]
    fn data_is_codec_output() {
        let args = ResolveEventArgs::new(9, TruthSignal::new([0x7E; 32]), 1234);
        let ix = build_resolve_event_instruction(&[0x99; 32], &[0x04; 32], &accounts(), &args);
        assert_eq!(ix.data, args.encode());
        assert_eq!(&ix.data[..8], RESOLVE_EVENT_DISCRIMINATOR.as_slice());
    }

    #[test]
    fn only_fee_differs_between_phases() {
        let args = ResolveEventArgs::new(9, TruthSignal::zeroed(), 0);
        let draft = build_resolve_event_instruction(&[0x99; 32], &[0x04; 32], &accounts(), &args);
        let final_ix = build_resolve_event_instruction(
            &[0x99; 32],
            &[0x04; 32],
            &accounts(),
            &args.with_fee(5000),
        );

        assert_eq!(draft.accounts, final_ix.accounts);
        assert_eq!(draft.data[..48], final_ix.data[..48]);
        assert_ne!(draft.data[48..], final_ix.data[48..]);
    }
}
