//! Streaming MAC context (HMAC-SHA-256).

use cryptcell_proto::{Algorithm, ErrorCode};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// HMAC-SHA-256 tag length in bytes.
pub const HMAC_SHA256_LEN: usize = 32;

/// In-progress streaming MAC.
#[derive(Clone, Default)]
pub enum MacOp {
    /// No MAC in progress.
    #[default]
    Idle,
    /// HMAC-SHA-256 in progress.
    HmacSha256(HmacSha256),
}

impl MacOp {
    /// Begin a MAC for `alg` keyed by `key`, discarding any previous state.
    pub fn setup(&mut self, alg: Algorithm, key: &[u8]) -> Result<(), ErrorCode> {
        if alg != Algorithm::HmacSha256 {
            return Err(ErrorCode::NotSupported);
        }
        let mac = HmacSha256::new_from_slice(key).map_err(|_| ErrorCode::InvalidArgument)?;
        *self = Self::HmacSha256(mac);
        Ok(())
    }

    /// Feed message bytes.
    pub fn update(&mut self, input: &[u8]) -> Result<(), ErrorCode> {
        match self {
            Self::Idle => Err(ErrorCode::BadState),
            Self::HmacSha256(mac) => {
                mac.update(input);
                Ok(())
            },
        }
    }

    /// Finalize, consuming the state either way, and write the tag.
    pub fn sign_finish(&mut self, tag: &mut [u8]) -> Result<usize, ErrorCode> {
        let mac = self.take()?;
        let out = mac.finalize().into_bytes();
        if tag.len() < out.len() {
            return Err(ErrorCode::BufferTooSmall);
        }
        tag[..out.len()].copy_from_slice(&out);
        Ok(out.len())
    }

    /// Finalize and compare against an expected tag in constant time.
    pub fn verify_finish(&mut self, expected: &[u8]) -> Result<(), ErrorCode> {
        let mac = self.take()?;
        mac.verify_slice(expected).map_err(|_| ErrorCode::InvalidSignature)
    }

    fn take(&mut self) -> Result<HmacSha256, ErrorCode> {
        match std::mem::take(self) {
            Self::Idle => Err(ErrorCode::BadState),
            Self::HmacSha256(mac) => Ok(mac),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // RFC 4231 test case 2.
    const RFC_KEY: &[u8] = b"Jefe";
    const RFC_DATA: &[u8] = b"what do ya want for nothing?";
    const RFC_TAG: &str = "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843";

    #[test]
    fn hmac_matches_rfc_vector() {
        let mut op = MacOp::default();
        op.setup(Algorithm::HmacSha256, RFC_KEY).unwrap();
        op.update(RFC_DATA).unwrap();

        let mut tag = [0u8; HMAC_SHA256_LEN];
        assert_eq!(op.sign_finish(&mut tag), Ok(HMAC_SHA256_LEN));
        assert_eq!(hex::encode(tag), RFC_TAG);
    }

    #[test]
    fn verify_accepts_matching_tag() {
        let mut op = MacOp::default();
        op.setup(Algorithm::HmacSha256, RFC_KEY).unwrap();
        op.update(RFC_DATA).unwrap();
        op.verify_finish(&hex::decode(RFC_TAG).unwrap()).unwrap();
    }

    #[test]
    fn verify_rejects_truncated_tag() {
        let mut op = MacOp::default();
        op.setup(Algorithm::HmacSha256, RFC_KEY).unwrap();
        op.update(RFC_DATA).unwrap();

        let tag = hex::decode(RFC_TAG).unwrap();
        assert_eq!(op.verify_finish(&tag[..16]), Err(ErrorCode::InvalidSignature));
    }

    #[test]
    fn idle_operation_is_bad_state() {
        let mut op = MacOp::default();
        assert_eq!(op.update(b"x"), Err(ErrorCode::BadState));
        assert_eq!(op.sign_finish(&mut [0u8; 32]), Err(ErrorCode::BadState));
    }
}
