use anchor_lang::prelude::*;
use anchor_lang::system_program;

use crate::errors::BountyPoolError;
use crate::events::EntrySubmitted;
use crate::state::{BountyPool, BPS_DENOMINATOR, PRECISION};

/// Current entry price: `base * factor^entries` in 1e6 fixed point,
/// computed by exponentiation by squaring in u128.
///
/// `entry_price(base, factor, 0) == base` exactly.
pub fn entry_price(base: u64, factor_fp: u64, entries: u64) -> Result<u64> {
    fn mul_fp(a: u128, b: u128) -> Result<u128> {
        Ok(a.checked_mul(b).ok_or(BountyPoolError::ArithmeticOverflow)? / PRECISION)
    }

    let mut result: u128 = PRECISION;
    let mut factor = factor_fp as u128;
    let mut exp = entries;
    while exp > 0 {
        if exp & 1 == 1 {
            result = mul_fp(result, factor)?;
        }
        exp >>= 1;
        if exp > 0 {
            factor = mul_fp(factor, factor)?;
        }
    }

    let price = (base as u128)
        .checked_mul(result)
        .ok_or(BountyPoolError::ArithmeticOverflow)?
        / PRECISION;
    u64::try_from(price).map_err(|_| BountyPoolError::ArithmeticOverflow.into())
}

/// Split `amount` across the four destinations by basis points. Slots 1..4
/// take their exact floored share; slot 0 (the pool vault) takes its share
/// plus the rounding remainder, so no lamport is ever lost.
pub fn split_amount(amount: u64, rates: &[u16; 4]) -> Result<[u64; 4]> {
    let mut splits = [0u64; 4];
    let mut fees: u64 = 0;
    for i in 1..4 {
        let share = (amount as u128) * (rates[i] as u128) / (BPS_DENOMINATOR as u128);
        splits[i] = share as u64;
        fees = fees
            .checked_add(splits[i])
            .ok_or(BountyPoolError::ArithmeticOverflow)?;
    }
    splits[0] = amount
        .checked_sub(fees)
        .ok_or(BountyPoolError::ArithmeticOverflow)?;
    Ok(splits)
}

#[derive(Accounts)]
#[instruction(bounty_id: u64)]
pub struct SubmitEntry<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,

    #[account(
        mut,
        seeds = [b"bounty", bounty_id.to_le_bytes().as_ref()],
        bump = bounty.bump,
        constraint = bounty.is_active @ BountyPoolError::BountyInactive,
        constraint = !bounty.is_processing @ BountyPoolError::ReentrancyDetected,
    )]
    pub bounty: Account<'info, BountyPool>,

    /// The vault PDA receiving the pool share
    /// CHECK: Validated by seeds constraint
    #[account(
        mut,
        seeds = [b"vault", bounty.key().as_ref()],
        bump = bounty.vault_bump,
    )]
    pub vault: UncheckedAccount<'info>,

    /// CHECK: Must match the configured destination for slot 1
    #[account(mut, constraint = treasury.key() == bounty.destinations[1] @ BountyPoolError::InvalidPubkey)]
    pub treasury: UncheckedAccount<'info>,

    /// CHECK: Must match the configured destination for slot 2
    #[account(mut, constraint = operations.key() == bounty.destinations[2] @ BountyPoolError::InvalidPubkey)]
    pub operations: UncheckedAccount<'info>,

    /// CHECK: Must match the configured destination for slot 3
    #[account(mut, constraint = community.key() == bounty.destinations[3] @ BountyPoolError::InvalidPubkey)]
    pub community: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}

pub fn handle_submit_entry(ctx: Context<SubmitEntry>, bounty_id: u64, amount: u64) -> Result<()> {
    let bounty = &ctx.accounts.bounty;

    let price = entry_price(
        bounty.base_entry_price,
        bounty.escalation_factor,
        bounty.total_entries,
    )?;
    require!(amount >= price, BountyPoolError::InsufficientAmount);

    let splits = split_amount(amount, &bounty.split_rates)?;

    // All four transfers and the ledger update land in one instruction, so
    // they succeed or fail together.
    let receivers = [
        ctx.accounts.vault.to_account_info(),
        ctx.accounts.treasury.to_account_info(),
        ctx.accounts.operations.to_account_info(),
        ctx.accounts.community.to_account_info(),
    ];
    for (receiver, share) in receivers.iter().zip(splits.iter()) {
        if *share > 0 {
            system_program::transfer(
                CpiContext::new(
                    ctx.accounts.system_program.to_account_info(),
                    system_program::Transfer {
                        from: ctx.accounts.payer.to_account_info(),
                        to: receiver.clone(),
                    },
                ),
                *share,
            )?;
        }
    }

    let bounty = &mut ctx.accounts.bounty;
    let entry_index = bounty.total_entries;
    bounty.total_entries = bounty
        .total_entries
        .checked_add(1)
        .ok_or(BountyPoolError::ArithmeticOverflow)?;
    bounty.current_pool_amount = bounty
        .current_pool_amount
        .checked_add(splits[0])
        .ok_or(BountyPoolError::ArithmeticOverflow)?;

    emit!(EntrySubmitted {
        bounty_id,
        payer: ctx.accounts.payer.key(),
        amount,
        splits,
        entry_index,
        price,
    });

    msg!(
        "Entry #{} paid: amount={}, pool_share={}, pool={}",
        entry_index,
        amount,
        splits[0],
        bounty.current_pool_amount
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FACTOR_1_0078: u64 = 1_007_800;
    const FACTOR_1_0: u64 = 1_000_000;

    #[test]
    fn price_of_first_entry_is_exactly_base() {
        assert_eq!(entry_price(10_000_000, FACTOR_1_0078, 0).unwrap(), 10_000_000);
    }

    #[test]
    fn price_escalates_by_factor() {
        // 10.000000 * 1.0078 = 10.078000
        assert_eq!(entry_price(10_000_000, FACTOR_1_0078, 1).unwrap(), 10_078_000);
    }

    #[test]
    fn price_is_monotonic_for_factor_at_least_one() {
        let mut prev = 0u64;
        for n in 0..200 {
            let p = entry_price(10_000_000, FACTOR_1_0078, n).unwrap();
            assert!(p >= prev, "price regressed at entry {n}");
            prev = p;
        }
    }

    #[test]
    fn unit_factor_keeps_price_flat() {
        for n in [0u64, 1, 17, 1_000, 1_000_000] {
            assert_eq!(entry_price(5_000, FACTOR_1_0, n).unwrap(), 5_000);
        }
    }

    #[test]
    fn extreme_exponent_overflows_cleanly() {
        assert!(entry_price(u64::MAX, 2_000_000, 200).is_err());
    }

    #[test]
    fn split_matches_configured_rates() {
        // $10 at 60/20/10/10 -> $6/$2/$1/$1
        let splits = split_amount(10_000_000, &[6000, 2000, 1000, 1000]).unwrap();
        assert_eq!(splits, [6_000_000, 2_000_000, 1_000_000, 1_000_000]);
    }

    #[test]
    fn split_conserves_every_lamport() {
        for amount in [1u64, 3, 33, 9_999, 123_456_789, u64::MAX / 2] {
            for rates in [[6000, 2000, 1000, 1000], [2500, 2500, 2500, 2500], [9997, 1, 1, 1]] {
                let splits = split_amount(amount, &rates).unwrap();
                let total: u64 = splits.iter().sum();
                assert_eq!(total, amount);
            }
        }
    }

    #[test]
    fn rounding_remainder_goes_to_the_pool() {
        // 33 at 25% each floors to 8 per fee slot; pool takes 33 - 24 = 9.
        let splits = split_amount(33, &[2500, 2500, 2500, 2500]).unwrap();
        assert_eq!(splits, [9, 8, 8, 8]);
    }
}
