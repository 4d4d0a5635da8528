//! Ed25519 one-shot sign and verify.
//!
//! Key material convention: an `Ed25519KeyPair` slot holds the 32-byte
//! seed (the public half is recomputed on demand); an `Ed25519PublicKey`
//! slot holds the 32-byte compressed public point.

use cryptcell_proto::{Algorithm, ErrorCode, KeyType};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};

/// Ed25519 signature length in bytes.
pub const SIGNATURE_LEN: usize = 64;

/// Ed25519 seed and public-key length in bytes.
pub const KEY_LEN: usize = 32;

fn signing_key(material: &[u8]) -> Result<SigningKey, ErrorCode> {
    let seed: &[u8; KEY_LEN] = material.try_into().map_err(|_| ErrorCode::InvalidArgument)?;
    Ok(SigningKey::from_bytes(seed))
}

fn verifying_key(key_type: KeyType, material: &[u8]) -> Result<VerifyingKey, ErrorCode> {
    match key_type {
        KeyType::Ed25519KeyPair => Ok(signing_key(material)?.verifying_key()),
        KeyType::Ed25519PublicKey => {
            let point: &[u8; KEY_LEN] =
                material.try_into().map_err(|_| ErrorCode::InvalidArgument)?;
            VerifyingKey::from_bytes(point).map_err(|_| ErrorCode::InvalidArgument)
        },
        _ => Err(ErrorCode::InvalidArgument),
    }
}

/// Sign a precomputed hash with the key pair in `material`.
pub fn sign(
    alg: Algorithm,
    key_type: KeyType,
    material: &[u8],
    hash: &[u8],
    signature: &mut [u8],
) -> Result<usize, ErrorCode> {
    if alg != Algorithm::Ed25519 {
        return Err(ErrorCode::NotSupported);
    }
    if key_type != KeyType::Ed25519KeyPair {
        return Err(ErrorCode::InvalidArgument);
    }
    if signature.len() < SIGNATURE_LEN {
        return Err(ErrorCode::BufferTooSmall);
    }

    let key = signing_key(material)?;
    signature[..SIGNATURE_LEN].copy_from_slice(&key.sign(hash).to_bytes());
    Ok(SIGNATURE_LEN)
}

/// Verify a signature over a precomputed hash.
pub fn verify(
    alg: Algorithm,
    key_type: KeyType,
    material: &[u8],
    hash: &[u8],
    signature: &[u8],
) -> Result<(), ErrorCode> {
    if alg != Algorithm::Ed25519 {
        return Err(ErrorCode::NotSupported);
    }
    let key = verifying_key(key_type, material)?;
    let signature = Signature::from_slice(signature).map_err(|_| ErrorCode::InvalidSignature)?;
    key.verify(hash, &signature).map_err(|_| ErrorCode::InvalidSignature)
}

/// The 32-byte public half of the key pair in `material`.
pub fn public_key(key_type: KeyType, material: &[u8]) -> Result<[u8; KEY_LEN], ErrorCode> {
    Ok(verifying_key(key_type, material)?.to_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: [u8; KEY_LEN] = [7; KEY_LEN];

    #[test]
    fn sign_verify_round_trip() {
        let hash = [0xAB; 32];
        let mut signature = [0u8; SIGNATURE_LEN];
        sign(Algorithm::Ed25519, KeyType::Ed25519KeyPair, &SEED, &hash, &mut signature).unwrap();

        verify(Algorithm::Ed25519, KeyType::Ed25519KeyPair, &SEED, &hash, &signature).unwrap();
    }

    #[test]
    fn verify_with_exported_public_key() {
        let hash = [0xAB; 32];
        let mut signature = [0u8; SIGNATURE_LEN];
        sign(Algorithm::Ed25519, KeyType::Ed25519KeyPair, &SEED, &hash, &mut signature).unwrap();

        let public = public_key(KeyType::Ed25519KeyPair, &SEED).unwrap();
        verify(Algorithm::Ed25519, KeyType::Ed25519PublicKey, &public, &hash, &signature).unwrap();
    }

    #[test]
    fn flipped_bit_fails_verification() {
        let hash = [0xAB; 32];
        let mut signature = [0u8; SIGNATURE_LEN];
        sign(Algorithm::Ed25519, KeyType::Ed25519KeyPair, &SEED, &hash, &mut signature).unwrap();
        signature[10] ^= 1;

        assert_eq!(
            verify(Algorithm::Ed25519, KeyType::Ed25519KeyPair, &SEED, &hash, &signature),
            Err(ErrorCode::InvalidSignature)
        );
    }

    #[test]
    fn signing_with_public_key_is_rejected() {
        let public = public_key(KeyType::Ed25519KeyPair, &SEED).unwrap();
        let mut signature = [0u8; SIGNATURE_LEN];
        assert_eq!(
            sign(Algorithm::Ed25519, KeyType::Ed25519PublicKey, &public, &[1], &mut signature),
            Err(ErrorCode::InvalidArgument)
        );
    }

    #[test]
    fn short_seed_is_invalid() {
        let mut signature = [0u8; SIGNATURE_LEN];
        assert_eq!(
            sign(Algorithm::Ed25519, KeyType::Ed25519KeyPair, &[1; 16], &[1], &mut signature),
            Err(ErrorCode::InvalidArgument)
        );
    }
}
