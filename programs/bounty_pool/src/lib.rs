use anchor_lang::prelude::*;

pub mod decision;
pub mod ed25519;
pub mod errors;
pub mod events;
pub mod instructions;
pub mod state;

use instructions::*;

declare_id!("8qXNZGRTwYeAw3fdKm2vJ3cq5ieyZWtxrXTZizmuZFeQ");

#[program]
pub mod bounty_pool {
    use super::*;

    /// Create a bounty pool with its vault, split configuration and
    /// backend authority
    pub fn initialize_bounty(
        ctx: Context<InitializeBounty>,
        bounty_id: u64,
        base_entry_price: u64,
        escalation_factor: u64,
        split_rates: [u16; 4],
    ) -> Result<()> {
        handle_initialize_bounty(ctx, bounty_id, base_entry_price, escalation_factor, split_rates)
    }

    /// Pay the current entry price, split four ways per configuration
    pub fn submit_entry(ctx: Context<SubmitEntry>, bounty_id: u64, amount: u64) -> Result<()> {
        handle_submit_entry(ctx, bounty_id, amount)
    }

    /// Settle one backend-signed AI decision; pays out the pool on a win
    /// and records an audit entry either way
    pub fn process_ai_decision(
        ctx: Context<ProcessAiDecision>,
        args: ProcessAiDecisionArgs,
    ) -> Result<()> {
        handle_process_ai_decision(ctx, args)
    }

    /// Rotate the backend signing authority (bounty admin only)
    pub fn update_backend_authority(ctx: Context<UpdateBackendAuthority>) -> Result<()> {
        handle_update_backend_authority(ctx)
    }

    /// Pause or resume a bounty (bounty admin only)
    pub fn set_bounty_active(ctx: Context<SetBountyActive>, active: bool) -> Result<()> {
        handle_set_bounty_active(ctx, active)
    }
}
