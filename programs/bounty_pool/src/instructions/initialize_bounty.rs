use anchor_lang::prelude::*;

use crate::errors::BountyPoolError;
use crate::events::BountyInitialized;
use crate::state::{BountyPool, BPS_DENOMINATOR, PRECISION};

#[derive(Accounts)]
#[instruction(bounty_id: u64)]
pub struct InitializeBounty<'info> {
    #[account(mut)]
    pub authority: Signer<'info>,

    /// The backend key whose ed25519 signature authorizes decisions
    /// CHECK: Stored as a pubkey only, never dereferenced
    pub backend_authority: UncheckedAccount<'info>,

    #[account(
        init,
        payer = authority,
        space = BountyPool::MAX_SIZE,
        seeds = [b"bounty", bounty_id.to_le_bytes().as_ref()],
        bump,
    )]
    pub bounty: Account<'info, BountyPool>,

    /// The vault PDA that accumulates the pool share of every entry
    /// CHECK: PDA used as a SOL vault, validated by seeds
    #[account(
        seeds = [b"vault", bounty.key().as_ref()],
        bump,
    )]
    pub vault: UncheckedAccount<'info>,

    /// Fee receiver for split slot 1
    /// CHECK: Stored as a pubkey only
    pub treasury: UncheckedAccount<'info>,

    /// Fee receiver for split slot 2
    /// CHECK: Stored as a pubkey only
    pub operations: UncheckedAccount<'info>,

    /// Fee receiver for split slot 3
    /// CHECK: Stored as a pubkey only
    pub community: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}

pub fn handle_initialize_bounty(
    ctx: Context<InitializeBounty>,
    bounty_id: u64,
    base_entry_price: u64,
    escalation_factor: u64,
    split_rates: [u16; 4],
) -> Result<()> {
    require!(base_entry_price > 0, BountyPoolError::InvalidInput);
    require!(
        escalation_factor as u128 >= PRECISION,
        BountyPoolError::InvalidEscalationFactor
    );

    let rate_sum: u64 = split_rates.iter().map(|r| *r as u64).sum();
    require!(rate_sum == BPS_DENOMINATOR, BountyPoolError::InvalidSplitConfig);

    require!(
        ctx.accounts.backend_authority.key() != Pubkey::default(),
        BountyPoolError::InvalidPubkey
    );

    let bounty = &mut ctx.accounts.bounty;
    bounty.authority = ctx.accounts.authority.key();
    bounty.backend_authority = ctx.accounts.backend_authority.key();
    bounty.bounty_id = bounty_id;
    bounty.base_entry_price = base_entry_price;
    bounty.escalation_factor = escalation_factor;
    bounty.split_rates = split_rates;
    bounty.destinations = [
        ctx.accounts.vault.key(),
        ctx.accounts.treasury.key(),
        ctx.accounts.operations.key(),
        ctx.accounts.community.key(),
    ];
    bounty.current_pool_amount = 0;
    bounty.total_entries = 0;
    bounty.total_decisions = 0;
    bounty.is_active = true;
    bounty.is_processing = false;
    bounty.vault_bump = ctx.bumps.vault;
    bounty.bump = ctx.bumps.bounty;

    emit!(BountyInitialized {
        bounty_id,
        authority: bounty.authority,
        backend_authority: bounty.backend_authority,
        base_entry_price,
        escalation_factor,
        split_rates,
    });

    msg!(
        "Bounty created: id={}, base_price={} lamports, factor={}",
        bounty_id,
        base_entry_price,
        escalation_factor
    );
    Ok(())
}
