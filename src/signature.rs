//! Wallet signature verification (EIP-191 `personal_sign`).

use crate::domain::Address;
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use sha3::{Digest, Keccak256};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("signature is not valid hex")]
    InvalidHex,
    #[error("signature must be 65 bytes, got {0}")]
    InvalidLength(usize),
    #[error("invalid recovery id {0}")]
    InvalidRecoveryId(u8),
    #[error("signature could not be recovered")]
    RecoveryFailed,
    #[error("signer {recovered} does not match {expected}")]
    AddressMismatch { expected: Address, recovered: Address },
}

/// Keccak-256 of the EIP-191 prefixed message.
pub fn hash_message(message: &str) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(format!("\x19Ethereum Signed Message:\n{}", message.len()).as_bytes());
    hasher.update(message.as_bytes());
    hasher.finalize().into()
}

/// Derive the wallet address of a secp256k1 public key.
pub fn address_of(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let hash = Keccak256::digest(&point.as_bytes()[1..]);
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&hash[12..]);
    Address::from_bytes(&bytes)
}

/// Recover the signer of `message` and optionally check it against `expected`.
pub fn verify_signature(
    message: &str,
    signature_hex: &str,
    expected: Option<&Address>,
) -> Result<Address, SignatureError> {
    let raw = signature_hex.trim();
    let raw = raw.strip_prefix("0x").unwrap_or(raw);
    let bytes = hex::decode(raw).map_err(|_| SignatureError::InvalidHex)?;
    if bytes.len() != 65 {
        return Err(SignatureError::InvalidLength(bytes.len()));
    }

    let v = bytes[64];
    let parity = match v {
        0 | 1 => v,
        27 | 28 => v - 27,
        other => return Err(SignatureError::InvalidRecoveryId(other)),
    };
    let mut recovery_id =
        RecoveryId::from_byte(parity).ok_or(SignatureError::InvalidRecoveryId(v))?;

    let mut signature =
        Signature::from_slice(&bytes[..64]).map_err(|_| SignatureError::RecoveryFailed)?;
    // k256 only accepts low-s; flipping s mirrors the recovered point's y parity.
    if let Some(normalized) = signature.normalize_s() {
        signature = normalized;
        recovery_id = RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced());
    }

    let key = VerifyingKey::recover_from_prehash(&hash_message(message), &signature, recovery_id)
        .map_err(|_| SignatureError::RecoveryFailed)?;
    let recovered = address_of(&key);

    match expected {
        Some(expected) if !expected.matches(&recovered) => Err(SignatureError::AddressMismatch {
            expected: expected.clone(),
            recovered,
        }),
        _ => Ok(recovered),
    }
}
