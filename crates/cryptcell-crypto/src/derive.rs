//! Key-derivation generator (HKDF-SHA-256).
//!
//! A generator is a bounded stream of pseudorandom bytes. Capacity is fixed
//! at derivation time; reads and key imports consume it front to back and a
//! request past the end is a caller state error, not a truncated read.

use cryptcell_proto::{Algorithm, ErrorCode};
use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroize;

/// Maximum capacity of one HKDF-SHA-256 generator (255 blocks).
pub const MAX_CAPACITY: u32 = 255 * 32;

/// In-progress derivation generator.
#[derive(Default)]
pub struct DerivationOp {
    hkdf: Option<Hkdf<Sha256>>,
    info: Vec<u8>,
    position: u32,
    capacity: u32,
}

impl DerivationOp {
    /// Start HKDF expansion from `secret`, `salt` and `info` with a fixed
    /// total capacity.
    pub fn derive(
        &mut self,
        alg: Algorithm,
        secret: &[u8],
        salt: &[u8],
        info: &[u8],
        capacity: u32,
    ) -> Result<(), ErrorCode> {
        if alg != Algorithm::HkdfSha256 {
            return Err(ErrorCode::NotSupported);
        }
        if capacity > MAX_CAPACITY {
            return Err(ErrorCode::InvalidArgument);
        }
        let salt = (!salt.is_empty()).then_some(salt);
        *self = Self {
            hkdf: Some(Hkdf::<Sha256>::new(salt, secret)),
            info: info.to_vec(),
            position: 0,
            capacity,
        };
        Ok(())
    }

    /// Remaining capacity in bytes.
    pub fn capacity(&self) -> Result<u32, ErrorCode> {
        if self.hkdf.is_none() {
            return Err(ErrorCode::BadState);
        }
        Ok(self.capacity)
    }

    /// Read the next `output.len()` bytes of the stream.
    pub fn read(&mut self, output: &mut [u8]) -> Result<(), ErrorCode> {
        let hkdf = self.hkdf.as_ref().ok_or(ErrorCode::BadState)?;
        let len = output.len() as u32;
        if len > self.capacity {
            return Err(ErrorCode::BadState);
        }

        // HKDF expansion is stateless, so the stream position is replayed:
        // expand up to position + len and hand out the tail.
        let total = (self.position + len) as usize;
        let mut okm = vec![0u8; total];
        hkdf.expand(&self.info, &mut okm).map_err(|_| ErrorCode::InvalidArgument)?;
        output.copy_from_slice(&okm[self.position as usize..]);
        okm.zeroize();

        self.position += len;
        self.capacity -= len;
        Ok(())
    }

    /// Discard the generator state.
    pub fn abort(&mut self) {
        self.info.zeroize();
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator(capacity: u32) -> DerivationOp {
        let mut op = DerivationOp::default();
        op.derive(Algorithm::HkdfSha256, b"secret", b"salt", b"label", capacity).unwrap();
        op
    }

    #[test]
    fn stream_is_deterministic_across_read_sizes() {
        let mut whole = generator(32);
        let mut one = [0u8; 32];
        whole.read(&mut one).unwrap();

        let mut split = generator(32);
        let mut first = [0u8; 10];
        let mut second = [0u8; 22];
        split.read(&mut first).unwrap();
        split.read(&mut second).unwrap();

        assert_eq!(&one[..10], first);
        assert_eq!(&one[10..], second);
    }

    #[test]
    fn capacity_is_consumed_and_enforced() {
        let mut op = generator(16);
        op.read(&mut [0u8; 10]).unwrap();
        assert_eq!(op.capacity(), Ok(6));

        assert_eq!(op.read(&mut [0u8; 7]), Err(ErrorCode::BadState));
        op.read(&mut [0u8; 6]).unwrap();
        assert_eq!(op.capacity(), Ok(0));
    }

    #[test]
    fn different_labels_produce_different_streams() {
        let mut a = DerivationOp::default();
        a.derive(Algorithm::HkdfSha256, b"secret", b"salt", b"one", 32).unwrap();
        let mut b = DerivationOp::default();
        b.derive(Algorithm::HkdfSha256, b"secret", b"salt", b"two", 32).unwrap();

        let mut out_a = [0u8; 32];
        let mut out_b = [0u8; 32];
        a.read(&mut out_a).unwrap();
        b.read(&mut out_b).unwrap();
        assert_ne!(out_a, out_b);
    }

    #[test]
    fn unstarted_generator_is_bad_state() {
        let mut op = DerivationOp::default();
        assert_eq!(op.capacity(), Err(ErrorCode::BadState));
        assert_eq!(op.read(&mut [0u8; 1]), Err(ErrorCode::BadState));
    }

    #[test]
    fn oversized_capacity_is_rejected() {
        let mut op = DerivationOp::default();
        assert_eq!(
            op.derive(Algorithm::HkdfSha256, b"s", b"", b"l", MAX_CAPACITY + 1),
            Err(ErrorCode::InvalidArgument)
        );
    }
}
