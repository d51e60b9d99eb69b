use anchor_lang::prelude::*;

/// Basis-point denominator for the four-way entry split.
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Fixed-point precision for the escalation factor (1e6).
pub const PRECISION: u128 = 1_000_000;

/// One AI-challenge bounty: pooled entry fees paid out on a backend-signed
/// winning decision.
#[account]
pub struct BountyPool {
    /// Admin who created the bounty and may rotate the backend key
    pub authority: Pubkey,
    /// Ed25519 key whose signature proves a decision was rendered off-chain
    pub backend_authority: Pubkey,
    /// Unique bounty identifier
    pub bounty_id: u64,
    /// Price of entry #0 in lamports
    pub base_entry_price: u64,
    /// Multiplicative price escalation per entry, fixed-point 1e6
    /// (e.g. 1_007_800 = +0.78% per entry)
    pub escalation_factor: u64,
    /// Basis-point split of every entry across `destinations`; sums to 10000
    pub split_rates: [u16; 4],
    /// Split receivers; index 0 is the pool vault PDA
    pub destinations: [Pubkey; 4],
    /// Lamports accumulated in the vault for the eventual winner
    pub current_pool_amount: u64,
    /// Number of paid entries so far
    pub total_entries: u64,
    /// Number of decisions settled so far, wins and losses
    pub total_decisions: u64,
    /// Accepting entries and decisions
    pub is_active: bool,
    /// Settlement in flight; at most one per bounty
    pub is_processing: bool,
    /// Bump seed for the vault PDA
    pub vault_bump: u8,
    /// Bump seed for this bounty PDA
    pub bump: u8,
}

impl BountyPool {
    /// discriminator(8) + pubkey(32)*2 + u64(8)*3 + u16(2)*4 + pubkey(32)*4
    /// + u64(8)*3 + bool(1)*2 + u8(1)*2
    pub const MAX_SIZE: usize =
        8 + 32 + 32 + 8 + 8 + 8 + (2 * 4) + (32 * 4) + 8 + 8 + 8 + 1 + 1 + 1 + 1;
}

/// Write-once record of one settled decision. Its PDA is seeded by the
/// decision hash, so resubmitting an already-processed decision fails at
/// account creation; the record doubles as the persisted audit entry.
#[account]
pub struct DecisionRecord {
    /// The bounty this decision was settled against
    pub bounty: Pubkey,
    /// Canonical digest of the decision payload
    pub decision_hash: [u8; 32],
    /// True if the decision was a winning jailbreak
    pub outcome: bool,
    /// Lamports paid to the winner (0 on a losing decision)
    pub paid_amount: u64,
    /// Pool size at settlement time
    pub pool_before: u64,
    /// Decision timestamp as signed by the backend
    pub timestamp: i64,
    /// Bump seed for this record PDA
    pub bump: u8,
}

impl DecisionRecord {
    /// discriminator(8) + pubkey(32) + hash(32) + bool(1) + u64(8)*2
    /// + i64(8) + u8(1)
    pub const MAX_SIZE: usize = 8 + 32 + 32 + 1 + 8 + 8 + 8 + 1;
}
