//! Byte layout of the native ed25519 program's verify instruction.
//!
//! The program never runs signature math itself: the transaction must carry
//! an ed25519-program pre-instruction, and the runtime rejects the whole
//! transaction if that instruction's signature check fails. Our job here is
//! only to confirm, via the instructions sysvar, that the verified tuple
//! `(public key, message, signature)` is exactly the one the settlement
//! instruction claims.

/// Ed25519 signatures are always 64 bytes.
pub const SIGNATURE_LEN: usize = 64;

/// Ed25519 public keys are always 32 bytes.
pub const PUBKEY_LEN: usize = 32;

// Single-signature layout produced by the SDK's verify-instruction builder:
// u8 num_signatures, u8 padding, then seven u16 LE fields (signature offset
// and instruction index, public key offset and instruction index, message
// offset, size and instruction index), then pubkey, signature, message.
const HEADER_LEN: usize = 16;
const PUBKEY_OFFSET: usize = HEADER_LEN;
const SIGNATURE_OFFSET: usize = PUBKEY_OFFSET + PUBKEY_LEN;
const MESSAGE_OFFSET: usize = SIGNATURE_OFFSET + SIGNATURE_LEN;

/// Why a candidate ed25519 instruction does not attest the expected tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ed25519DataError {
    /// Not a single self-contained signature in the canonical layout.
    Malformed,
    /// The attested public key is not the expected backend authority.
    PubkeyMismatch,
    /// The attested message is not the expected decision hash.
    MessageMismatch,
    /// The attested signature differs from the submitted one.
    SignatureMismatch,
}

/// Build verify-instruction data for one signature over `message`.
///
/// Clients prepend this (as data of an ed25519-program instruction) to the
/// settlement instruction; [`check_verification_data`] accepts exactly this
/// layout on the program side.
pub fn build_verification_data(
    pubkey: &[u8; PUBKEY_LEN],
    signature: &[u8; SIGNATURE_LEN],
    message: &[u8],
) -> Vec<u8> {
    let mut data = Vec::with_capacity(MESSAGE_OFFSET + message.len());
    data.push(1); // num_signatures
    data.push(0); // padding
    data.extend_from_slice(&(SIGNATURE_OFFSET as u16).to_le_bytes());
    data.extend_from_slice(&u16::MAX.to_le_bytes());
    data.extend_from_slice(&(PUBKEY_OFFSET as u16).to_le_bytes());
    data.extend_from_slice(&u16::MAX.to_le_bytes());
    data.extend_from_slice(&(MESSAGE_OFFSET as u16).to_le_bytes());
    data.extend_from_slice(&(message.len() as u16).to_le_bytes());
    data.extend_from_slice(&u16::MAX.to_le_bytes());
    data.extend_from_slice(pubkey);
    data.extend_from_slice(signature);
    data.extend_from_slice(message);
    data
}

fn read_u16(data: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([data[at], data[at + 1]])
}

/// Check that `data` (an ed25519-program instruction's data) attests exactly
/// one self-contained signature of `message` by `pubkey`, and that the
/// embedded signature equals `signature`.
pub fn check_verification_data(
    data: &[u8],
    pubkey: &[u8; PUBKEY_LEN],
    message: &[u8],
    signature: &[u8; SIGNATURE_LEN],
) -> Result<(), Ed25519DataError> {
    if data.len() < HEADER_LEN {
        return Err(Ed25519DataError::Malformed);
    }
    if data[0] != 1 {
        return Err(Ed25519DataError::Malformed);
    }

    let sig_off = read_u16(data, 2) as usize;
    let sig_ix = read_u16(data, 4);
    let pk_off = read_u16(data, 6) as usize;
    let pk_ix = read_u16(data, 8);
    let msg_off = read_u16(data, 10) as usize;
    let msg_size = read_u16(data, 12) as usize;
    let msg_ix = read_u16(data, 14);

    // Offsets referencing other instructions would let the attested bytes
    // live outside this instruction; only self-contained data is accepted.
    if sig_ix != u16::MAX || pk_ix != u16::MAX || msg_ix != u16::MAX {
        return Err(Ed25519DataError::Malformed);
    }
    if data.len() < pk_off + PUBKEY_LEN
        || data.len() < sig_off + SIGNATURE_LEN
        || data.len() < msg_off + msg_size
    {
        return Err(Ed25519DataError::Malformed);
    }

    if &data[pk_off..pk_off + PUBKEY_LEN] != pubkey.as_slice() {
        return Err(Ed25519DataError::PubkeyMismatch);
    }
    if msg_size != message.len() || &data[msg_off..msg_off + msg_size] != message {
        return Err(Ed25519DataError::MessageMismatch);
    }
    if &data[sig_off..sig_off + SIGNATURE_LEN] != signature.as_slice() {
        return Err(Ed25519DataError::SignatureMismatch);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PUBKEY: [u8; 32] = [7u8; 32];
    const SIGNATURE: [u8; 64] = [9u8; 64];
    const MESSAGE: [u8; 32] = [3u8; 32];

    #[test]
    fn round_trip_accepts() {
        let data = build_verification_data(&PUBKEY, &SIGNATURE, &MESSAGE);
        assert_eq!(
            check_verification_data(&data, &PUBKEY, &MESSAGE, &SIGNATURE),
            Ok(())
        );
    }

    #[test]
    fn wrong_pubkey_is_flagged_as_pubkey_mismatch() {
        let data = build_verification_data(&PUBKEY, &SIGNATURE, &MESSAGE);
        let other = [8u8; 32];
        assert_eq!(
            check_verification_data(&data, &other, &MESSAGE, &SIGNATURE),
            Err(Ed25519DataError::PubkeyMismatch)
        );
    }

    #[test]
    fn wrong_message_is_flagged() {
        let data = build_verification_data(&PUBKEY, &SIGNATURE, &MESSAGE);
        let other = [4u8; 32];
        assert_eq!(
            check_verification_data(&data, &PUBKEY, &other, &SIGNATURE),
            Err(Ed25519DataError::MessageMismatch)
        );
    }

    #[test]
    fn wrong_signature_is_flagged() {
        let data = build_verification_data(&PUBKEY, &SIGNATURE, &MESSAGE);
        let other = [1u8; 64];
        assert_eq!(
            check_verification_data(&data, &PUBKEY, &MESSAGE, &other),
            Err(Ed25519DataError::SignatureMismatch)
        );
    }

    #[test]
    fn multi_signature_data_is_rejected() {
        let mut data = build_verification_data(&PUBKEY, &SIGNATURE, &MESSAGE);
        data[0] = 2;
        assert_eq!(
            check_verification_data(&data, &PUBKEY, &MESSAGE, &SIGNATURE),
            Err(Ed25519DataError::Malformed)
        );
    }

    #[test]
    fn cross_instruction_references_are_rejected() {
        let mut data = build_verification_data(&PUBKEY, &SIGNATURE, &MESSAGE);
        // Point the message at instruction 0 instead of self-contained data.
        data[14] = 0;
        data[15] = 0;
        assert_eq!(
            check_verification_data(&data, &PUBKEY, &MESSAGE, &SIGNATURE),
            Err(Ed25519DataError::Malformed)
        );
    }

    #[test]
    fn truncated_data_is_rejected() {
        let data = build_verification_data(&PUBKEY, &SIGNATURE, &MESSAGE);
        assert_eq!(
            check_verification_data(&data[..40], &PUBKEY, &MESSAGE, &SIGNATURE),
            Err(Ed25519DataError::Malformed)
        );
    }
}
