use anchor_lang::prelude::*;

use crate::errors::BountyPoolError;
use crate::events::{BackendAuthorityRotated, BountyStatusChanged};
use crate::state::BountyPool;

#[derive(Accounts)]
pub struct UpdateBackendAuthority<'info> {
    pub authority: Signer<'info>,

    /// The replacement backend signing key
    /// CHECK: Stored as a pubkey only, never dereferenced
    pub new_backend_authority: UncheckedAccount<'info>,

    #[account(
        mut,
        constraint = bounty.authority == authority.key() @ BountyPoolError::UnauthorizedAuthority,
    )]
    pub bounty: Account<'info, BountyPool>,
}

/// Rotate the backend authority. Decisions signed by the old key fail
/// verification from this point on; in-flight transactions race on the
/// bounty account and one of them loses, as with any other write.
pub fn handle_update_backend_authority(ctx: Context<UpdateBackendAuthority>) -> Result<()> {
    let new_key = ctx.accounts.new_backend_authority.key();
    require!(new_key != Pubkey::default(), BountyPoolError::InvalidPubkey);

    let bounty = &mut ctx.accounts.bounty;
    let old_key = bounty.backend_authority;
    bounty.backend_authority = new_key;

    emit!(BackendAuthorityRotated {
        bounty_id: bounty.bounty_id,
        old_authority: old_key,
        new_authority: new_key,
    });

    msg!("Backend authority rotated: bounty={}", bounty.bounty_id);
    Ok(())
}

#[derive(Accounts)]
pub struct SetBountyActive<'info> {
    pub authority: Signer<'info>,

    #[account(
        mut,
        constraint = bounty.authority == authority.key() @ BountyPoolError::UnauthorizedAuthority,
        constraint = !bounty.is_processing @ BountyPoolError::ReentrancyDetected,
    )]
    pub bounty: Account<'info, BountyPool>,
}

/// Pause a bounty, or roll a drained one back into service for a new round.
pub fn handle_set_bounty_active(ctx: Context<SetBountyActive>, active: bool) -> Result<()> {
    let bounty = &mut ctx.accounts.bounty;
    bounty.is_active = active;

    emit!(BountyStatusChanged {
        bounty_id: bounty.bounty_id,
        is_active: active,
    });

    msg!("Bounty {} active={}", bounty.bounty_id, active);
    Ok(())
}
