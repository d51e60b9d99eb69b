use anchor_lang::prelude::*;

#[error_code]
pub enum BountyPoolError {
    #[msg("Entry amount is below the current entry price")]
    InsufficientAmount,

    #[msg("Bounty is not active")]
    BountyInactive,

    #[msg("Another settlement is already in flight for this bounty")]
    ReentrancyDetected,

    #[msg("Message or response exceeds the maximum length")]
    InputTooLong,

    #[msg("Session id is empty, too long, or contains invalid characters")]
    InvalidSessionId,

    #[msg("Decision payload field is invalid")]
    InvalidInput,

    #[msg("Timestamp must be positive")]
    InvalidTimestamp,

    #[msg("Timestamp is outside the accepted tolerance window")]
    TimestampOutOfRange,

    #[msg("Ed25519 signature verification data is missing or does not match")]
    InvalidSignature,

    #[msg("Signature was not produced by the configured backend authority")]
    UnauthorizedBackend,

    #[msg("Recomputed decision hash does not match the submitted hash")]
    InvalidDecisionHash,

    #[msg("Account key is missing or default")]
    InvalidPubkey,

    #[msg("Unauthorized: only the bounty authority can call this")]
    UnauthorizedAuthority,

    #[msg("Split rates must sum to exactly 10000 basis points")]
    InvalidSplitConfig,

    #[msg("Escalation factor must be at least 1.0 in fixed-point")]
    InvalidEscalationFactor,

    #[msg("Arithmetic overflow")]
    ArithmeticOverflow,
}
