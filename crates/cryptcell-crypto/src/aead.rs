//! One-shot authenticated encryption (XChaCha20-Poly1305).

use chacha20poly1305::{
    XChaCha20Poly1305, XNonce,
    aead::{Aead, KeyInit, Payload},
};
use cryptcell_proto::{Algorithm, ErrorCode};

/// Poly1305 tag length in bytes.
pub const TAG_LEN: usize = 16;

/// XChaCha20 nonce length in bytes.
pub const NONCE_LEN: usize = 24;

/// Build the 24-byte XChaCha20 nonce from a shorter caller nonce.
///
/// Request structures cap the inline nonce at 16 bytes, so the remaining
/// positions are zero. Uniqueness is the caller's responsibility, exactly
/// as with a full-length nonce.
fn extend_nonce(nonce: &[u8]) -> Result<XNonce, ErrorCode> {
    if nonce.is_empty() || nonce.len() > NONCE_LEN {
        return Err(ErrorCode::InvalidArgument);
    }
    let mut full = [0u8; NONCE_LEN];
    full[..nonce.len()].copy_from_slice(nonce);
    Ok(XNonce::from(full))
}

fn cipher_for(alg: Algorithm, key: &[u8]) -> Result<XChaCha20Poly1305, ErrorCode> {
    if alg != Algorithm::XChaCha20Poly1305 {
        return Err(ErrorCode::NotSupported);
    }
    XChaCha20Poly1305::new_from_slice(key).map_err(|_| ErrorCode::InvalidArgument)
}

/// Encrypt and authenticate, writing payload-plus-tag into `ciphertext`.
pub fn seal(
    alg: Algorithm,
    key: &[u8],
    nonce: &[u8],
    additional_data: &[u8],
    plaintext: &[u8],
    ciphertext: &mut [u8],
) -> Result<usize, ErrorCode> {
    let cipher = cipher_for(alg, key)?;
    let nonce = extend_nonce(nonce)?;

    let sealed = cipher
        .encrypt(&nonce, Payload { msg: plaintext, aad: additional_data })
        .map_err(|_| ErrorCode::GenericError)?;
    if ciphertext.len() < sealed.len() {
        return Err(ErrorCode::BufferTooSmall);
    }
    ciphertext[..sealed.len()].copy_from_slice(&sealed);
    Ok(sealed.len())
}

/// Verify and decrypt, writing the payload into `plaintext`.
pub fn open(
    alg: Algorithm,
    key: &[u8],
    nonce: &[u8],
    additional_data: &[u8],
    ciphertext: &[u8],
    plaintext: &mut [u8],
) -> Result<usize, ErrorCode> {
    let cipher = cipher_for(alg, key)?;
    let nonce = extend_nonce(nonce)?;

    let opened = cipher
        .decrypt(&nonce, Payload { msg: ciphertext, aad: additional_data })
        .map_err(|_| ErrorCode::InvalidSignature)?;
    if plaintext.len() < opened.len() {
        return Err(ErrorCode::BufferTooSmall);
    }
    plaintext[..opened.len()].copy_from_slice(&opened);
    Ok(opened.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: [u8; 32] = [0x42; 32];
    const NONCE: [u8; 16] = [0x4E; 16];

    #[test]
    fn seal_open_round_trip_with_aad() {
        let plaintext = b"attack at dawn";
        let aad = b"header";

        let mut ciphertext = vec![0u8; plaintext.len() + TAG_LEN];
        let sealed =
            seal(Algorithm::XChaCha20Poly1305, &KEY, &NONCE, aad, plaintext, &mut ciphertext)
                .unwrap();
        assert_eq!(sealed, plaintext.len() + TAG_LEN);

        let mut opened = vec![0u8; plaintext.len()];
        let len =
            open(Algorithm::XChaCha20Poly1305, &KEY, &NONCE, aad, &ciphertext, &mut opened)
                .unwrap();
        assert_eq!(&opened[..len], plaintext);
    }

    #[test]
    fn tampered_ciphertext_is_rejected() {
        let mut ciphertext = vec![0u8; 4 + TAG_LEN];
        seal(Algorithm::XChaCha20Poly1305, &KEY, &NONCE, b"", b"data", &mut ciphertext).unwrap();
        ciphertext[0] ^= 1;

        let mut opened = vec![0u8; 4];
        assert_eq!(
            open(Algorithm::XChaCha20Poly1305, &KEY, &NONCE, b"", &ciphertext, &mut opened),
            Err(ErrorCode::InvalidSignature)
        );
    }

    #[test]
    fn wrong_aad_is_rejected() {
        let mut ciphertext = vec![0u8; 4 + TAG_LEN];
        seal(Algorithm::XChaCha20Poly1305, &KEY, &NONCE, b"aad", b"data", &mut ciphertext).unwrap();

        let mut opened = vec![0u8; 4];
        assert_eq!(
            open(Algorithm::XChaCha20Poly1305, &KEY, &NONCE, b"other", &ciphertext, &mut opened),
            Err(ErrorCode::InvalidSignature)
        );
    }

    #[test]
    fn empty_nonce_is_invalid() {
        let mut ciphertext = vec![0u8; TAG_LEN];
        assert_eq!(
            seal(Algorithm::XChaCha20Poly1305, &KEY, &[], b"", b"", &mut ciphertext),
            Err(ErrorCode::InvalidArgument)
        );
    }

    #[test]
    fn wrong_key_length_is_invalid() {
        let mut ciphertext = vec![0u8; TAG_LEN];
        assert_eq!(
            seal(Algorithm::XChaCha20Poly1305, &[1; 16], &NONCE, b"", b"", &mut ciphertext),
            Err(ErrorCode::InvalidArgument)
        );
    }
}
