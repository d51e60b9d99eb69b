use anchor_lang::prelude::*;

#[event]
pub struct BountyInitialized {
    pub bounty_id: u64,
    pub authority: Pubkey,
    pub backend_authority: Pubkey,
    pub base_entry_price: u64,
    pub escalation_factor: u64,
    pub split_rates: [u16; 4],
}

#[event]
pub struct EntrySubmitted {
    pub bounty_id: u64,
    pub payer: Pubkey,
    pub amount: u64,
    pub splits: [u64; 4],
    pub entry_index: u64,
    pub price: u64,
}

/// Audit event appended on every decision settlement, win or lose.
#[event]
pub struct DecisionSettled {
    pub bounty_id: u64,
    pub decision_hash: [u8; 32],
    pub outcome: bool,
    pub paid_amount: u64,
    pub pool_before: u64,
    pub timestamp: i64,
}

#[event]
pub struct BackendAuthorityRotated {
    pub bounty_id: u64,
    pub old_authority: Pubkey,
    pub new_authority: Pubkey,
}

#[event]
pub struct BountyStatusChanged {
    pub bounty_id: u64,
    pub is_active: bool,
}
