//! Streaming hash contexts (SHA-256 / SHA-512).

use cryptcell_proto::{Algorithm, ErrorCode};
use sha2::{Digest, Sha256, Sha512};

/// SHA-256 digest length in bytes.
pub const SHA256_LEN: usize = 32;
/// SHA-512 digest length in bytes.
pub const SHA512_LEN: usize = 64;

/// In-progress streaming hash.
///
/// `Clone` is what makes the service-level hash-clone operation possible:
/// the sha2 hashers carry their full compression state by value.
#[derive(Debug, Clone, Default)]
pub enum HashOp {
    /// No hash in progress.
    #[default]
    Idle,
    /// SHA-256 in progress.
    Sha256(Sha256),
    /// SHA-512 in progress.
    Sha512(Sha512),
}

impl HashOp {
    /// Begin a hash for `alg`, discarding any previous state.
    pub fn setup(&mut self, alg: Algorithm) -> Result<(), ErrorCode> {
        *self = match alg {
            Algorithm::Sha256 => Self::Sha256(Sha256::new()),
            Algorithm::Sha512 => Self::Sha512(Sha512::new()),
            _ => return Err(ErrorCode::NotSupported),
        };
        Ok(())
    }

    /// Feed message bytes.
    pub fn update(&mut self, input: &[u8]) -> Result<(), ErrorCode> {
        match self {
            Self::Idle => Err(ErrorCode::BadState),
            Self::Sha256(hasher) => {
                hasher.update(input);
                Ok(())
            },
            Self::Sha512(hasher) => {
                hasher.update(input);
                Ok(())
            },
        }
    }

    /// Finalize, consuming the state either way, and write the digest.
    pub fn finish(&mut self, digest: &mut [u8]) -> Result<usize, ErrorCode> {
        let out = self.finalize()?;
        if digest.len() < out.len() {
            return Err(ErrorCode::BufferTooSmall);
        }
        digest[..out.len()].copy_from_slice(&out);
        Ok(out.len())
    }

    /// Finalize and compare against an expected digest without leaking the
    /// position of the first difference.
    pub fn verify(&mut self, expected: &[u8]) -> Result<(), ErrorCode> {
        let out = self.finalize()?;
        if expected.len() != out.len() {
            return Err(ErrorCode::InvalidSignature);
        }
        let diff = out.iter().zip(expected).fold(0u8, |acc, (a, b)| acc | (a ^ b));
        if diff == 0 { Ok(()) } else { Err(ErrorCode::InvalidSignature) }
    }

    fn finalize(&mut self) -> Result<Vec<u8>, ErrorCode> {
        match std::mem::take(self) {
            Self::Idle => Err(ErrorCode::BadState),
            Self::Sha256(hasher) => Ok(hasher.finalize().to_vec()),
            Self::Sha512(hasher) => Ok(hasher.finalize().to_vec()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_matches_known_vector() {
        let mut op = HashOp::default();
        op.setup(Algorithm::Sha256).unwrap();
        op.update(b"abc").unwrap();

        let mut digest = [0u8; SHA256_LEN];
        assert_eq!(op.finish(&mut digest), Ok(SHA256_LEN));
        assert_eq!(
            hex::encode(digest),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn split_updates_equal_one_shot() {
        let mut split = HashOp::default();
        split.setup(Algorithm::Sha512).unwrap();
        split.update(b"hello ").unwrap();
        split.update(b"world").unwrap();

        let mut whole = HashOp::default();
        whole.setup(Algorithm::Sha512).unwrap();
        whole.update(b"hello world").unwrap();

        let mut a = [0u8; SHA512_LEN];
        let mut b = [0u8; SHA512_LEN];
        split.finish(&mut a).unwrap();
        whole.finish(&mut b).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn finish_consumes_state_on_small_buffer() {
        let mut op = HashOp::default();
        op.setup(Algorithm::Sha256).unwrap();

        let mut digest = [0u8; 4];
        assert_eq!(op.finish(&mut digest), Err(ErrorCode::BufferTooSmall));
        assert_eq!(op.finish(&mut [0u8; SHA256_LEN]), Err(ErrorCode::BadState));
    }

    #[test]
    fn verify_rejects_wrong_digest() {
        let mut op = HashOp::default();
        op.setup(Algorithm::Sha256).unwrap();
        op.update(b"abc").unwrap();
        assert_eq!(op.verify(&[0u8; SHA256_LEN]), Err(ErrorCode::InvalidSignature));
    }

    #[test]
    fn cloned_state_diverges_independently() {
        let mut source = HashOp::default();
        source.setup(Algorithm::Sha256).unwrap();
        source.update(b"prefix").unwrap();

        let mut cloned = source.clone();
        source.update(b"-a").unwrap();
        cloned.update(b"-b").unwrap();

        let mut a = [0u8; SHA256_LEN];
        let mut b = [0u8; SHA256_LEN];
        source.finish(&mut a).unwrap();
        cloned.finish(&mut b).unwrap();
        assert_ne!(a, b);
    }
}
