use anchor_lang::prelude::*;
use anchor_lang::solana_program::ed25519_program;
use anchor_lang::solana_program::sysvar::instructions::{
    load_current_index_checked, load_instruction_at_checked, ID as SYSVAR_INSTRUCTIONS_ID,
};
use anchor_lang::system_program;

use crate::decision::{
    compute_decision_hash, is_valid_session_id, DECISION_TOLERANCE_SECS, MAX_MESSAGE_LEN,
    MAX_SESSION_ID_LEN,
};
use crate::ed25519::{check_verification_data, Ed25519DataError};
use crate::errors::BountyPoolError;
use crate::events::DecisionSettled;
use crate::state::{BountyPool, DecisionRecord};

#[derive(AnchorSerialize, AnchorDeserialize, Clone)]
pub struct ProcessAiDecisionArgs {
    pub user_message: String,
    pub ai_response: String,
    pub is_successful_jailbreak: bool,
    pub user_id: u64,
    pub session_id: String,
    pub timestamp: i64,
    pub decision_hash: [u8; 32],
    pub signature: [u8; 64],
    /// Index hint of the ed25519 verify pre-instruction in this transaction
    pub ed25519_instr_index: u8,
}

/// Payload bounds and freshness, checked in order before any fund movement.
/// Signature length is fixed by the `[u8; 64]` type at the wire boundary.
pub fn validate_payload(args: &ProcessAiDecisionArgs, now: i64) -> Result<()> {
    require!(
        args.user_message.len() <= MAX_MESSAGE_LEN && args.ai_response.len() <= MAX_MESSAGE_LEN,
        BountyPoolError::InputTooLong
    );
    require!(
        args.session_id.len() <= MAX_SESSION_ID_LEN,
        BountyPoolError::InputTooLong
    );
    require!(
        is_valid_session_id(&args.session_id),
        BountyPoolError::InvalidSessionId
    );
    require!(
        !args.user_message.is_empty() && !args.ai_response.is_empty(),
        BountyPoolError::InvalidInput
    );
    require!(args.user_id > 0, BountyPoolError::InvalidInput);

    require!(args.timestamp > 0, BountyPoolError::InvalidTimestamp);
    // Inclusive window: a decision exactly TOLERANCE old is still accepted.
    let age = now
        .checked_sub(args.timestamp)
        .ok_or(BountyPoolError::ArithmeticOverflow)?;
    require!(
        age.abs() <= DECISION_TOLERANCE_SECS,
        BountyPoolError::TimestampOutOfRange
    );
    Ok(())
}

#[derive(Accounts)]
#[instruction(args: ProcessAiDecisionArgs)]
pub struct ProcessAiDecision<'info> {
    /// Transaction fee payer; also funds the decision record
    #[account(mut)]
    pub payer: Signer<'info>,

    #[account(
        mut,
        constraint = bounty.is_active @ BountyPoolError::BountyInactive,
    )]
    pub bounty: Account<'info, BountyPool>,

    /// The vault PDA holding the pool
    /// CHECK: Validated by seeds constraint
    #[account(
        mut,
        seeds = [b"vault", bounty.key().as_ref()],
        bump = bounty.vault_bump,
    )]
    pub vault: UncheckedAccount<'info>,

    /// Receiver of the pool on a winning decision
    /// CHECK: Key is validated against the default pubkey on the win path
    #[account(mut)]
    pub winner: UncheckedAccount<'info>,

    /// Seeded by the decision hash: a replayed decision collides here and
    /// the whole transaction fails before any funds move.
    #[account(
        init,
        payer = payer,
        space = DecisionRecord::MAX_SIZE,
        seeds = [b"decision", bounty.key().as_ref(), args.decision_hash.as_ref()],
        bump,
    )]
    pub decision_record: Account<'info, DecisionRecord>,

    /// CHECK: Address-checked instructions sysvar, read-only introspection
    #[account(address = SYSVAR_INSTRUCTIONS_ID)]
    pub instructions_sysvar: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}

pub fn handle_process_ai_decision(
    ctx: Context<ProcessAiDecision>,
    args: ProcessAiDecisionArgs,
) -> Result<()> {
    // Reentrancy guard: set on entry, cleared on the single success exit.
    // Every error path aborts the transaction, which reverts the flag along
    // with the rest of the account.
    {
        let bounty = &mut ctx.accounts.bounty;
        require!(!bounty.is_processing, BountyPoolError::ReentrancyDetected);
        bounty.is_processing = true;
    }

    let clock = Clock::get()?;
    validate_payload(&args, clock.unix_timestamp)?;

    let decision_hash = compute_decision_hash(
        &args.user_message,
        &args.ai_response,
        args.is_successful_jailbreak,
        args.user_id,
        &args.session_id,
        args.timestamp,
    );
    require!(
        decision_hash == args.decision_hash,
        BountyPoolError::InvalidDecisionHash
    );

    verify_backend_signature(
        &ctx.accounts.instructions_sysvar.to_account_info(),
        args.ed25519_instr_index,
        &ctx.accounts.bounty.backend_authority.to_bytes(),
        &decision_hash,
        &args.signature,
    )?;

    let bounty_key = ctx.accounts.bounty.key();
    let vault_bump = ctx.accounts.bounty.vault_bump;
    let pool_before = ctx.accounts.bounty.current_pool_amount;
    let mut paid_amount: u64 = 0;

    if args.is_successful_jailbreak {
        require!(
            ctx.accounts.winner.key() != Pubkey::default(),
            BountyPoolError::InvalidPubkey
        );

        // Keep the vault rent-exempt; pay out the tracked pool, capped by
        // what the vault actually holds.
        let rent_floor = Rent::get()?.minimum_balance(0);
        let vault_balance = ctx.accounts.vault.lamports();
        paid_amount = pool_before.min(vault_balance.saturating_sub(rent_floor));

        if paid_amount > 0 {
            let bump_slice = [vault_bump];
            let vault_signer_seeds: &[&[u8]] = &[b"vault", bounty_key.as_ref(), &bump_slice];
            system_program::transfer(
                CpiContext::new_with_signer(
                    ctx.accounts.system_program.to_account_info(),
                    system_program::Transfer {
                        from: ctx.accounts.vault.to_account_info(),
                        to: ctx.accounts.winner.to_account_info(),
                    },
                    &[vault_signer_seeds],
                ),
                paid_amount,
            )?;
        }

        let bounty = &mut ctx.accounts.bounty;
        bounty.current_pool_amount = 0;
        bounty.is_active = false;
    }

    let record = &mut ctx.accounts.decision_record;
    record.bounty = bounty_key;
    record.decision_hash = decision_hash;
    record.outcome = args.is_successful_jailbreak;
    record.paid_amount = paid_amount;
    record.pool_before = pool_before;
    record.timestamp = args.timestamp;
    record.bump = ctx.bumps.decision_record;

    let bounty = &mut ctx.accounts.bounty;
    bounty.total_decisions = bounty
        .total_decisions
        .checked_add(1)
        .ok_or(BountyPoolError::ArithmeticOverflow)?;
    bounty.is_processing = false;

    emit!(DecisionSettled {
        bounty_id: bounty.bounty_id,
        decision_hash,
        outcome: args.is_successful_jailbreak,
        paid_amount,
        pool_before,
        timestamp: args.timestamp,
    });

    msg!(
        "Decision settled: bounty={}, win={}, paid={} lamports",
        bounty.bounty_id,
        args.is_successful_jailbreak,
        paid_amount
    );
    Ok(())
}

/// Locate the ed25519-program verify instruction in this transaction and
/// confirm it attests `(backend_authority, decision_hash, signature)`.
///
/// The hinted index is tried first; if it does not hold a matching ed25519
/// instruction, every instruction before the current one is scanned.
fn verify_backend_signature(
    instructions_sysvar: &AccountInfo,
    index_hint: u8,
    backend_authority: &[u8; 32],
    decision_hash: &[u8; 32],
    signature: &[u8; 64],
) -> Result<()> {
    let mut mismatch: Option<Ed25519DataError> = None;

    let mut candidates: Vec<usize> = Vec::new();
    candidates.push(index_hint as usize);
    let current = load_current_index_checked(instructions_sysvar)?;
    for i in 0..current as usize {
        if i != index_hint as usize {
            candidates.push(i);
        }
    }

    for index in candidates {
        let Ok(ix) = load_instruction_at_checked(index, instructions_sysvar) else {
            continue;
        };
        if ix.program_id != ed25519_program::ID {
            continue;
        }
        match check_verification_data(&ix.data, backend_authority, decision_hash, signature) {
            Ok(()) => return Ok(()),
            Err(e) => mismatch = Some(e),
        }
    }

    // An ed25519 instruction signed by the wrong key is an authorization
    // failure; anything else is a missing or malformed attestation.
    match mismatch {
        Some(Ed25519DataError::PubkeyMismatch) => err!(BountyPoolError::UnauthorizedBackend),
        _ => err!(BountyPoolError::InvalidSignature),
    }
}
