//! Fixed-size request structures.
//!
//! Every call message carries one of these structures in input parameter 0,
//! serialized as raw little-endian binary at fixed offsets. A declared
//! parameter size that differs from the structure size is a recoverable
//! [`ErrorCode::CommunicationFailure`]: the transport delivered a frame this
//! layer cannot interpret for the selector, but subsequent messages can
//! still be trusted.
//!
//! Selectors and key handles stay raw (`u32`) here; conversion to typed
//! enums happens at the family layer where failures map to statuses.

use thiserror::Error;

use crate::ErrorCode;

/// Maximum inline nonce length in an [`AeadRequest`].
pub const AEAD_NONCE_MAX: usize = 16;

/// Decode failure for a request structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RequestError {
    /// The byte length does not match the fixed structure size.
    #[error("request size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch {
        /// Fixed structure size for this request type.
        expected: usize,
        /// Length actually declared or delivered.
        actual: usize,
    },

    /// A field carries a value outside its valid range.
    #[error("invalid field value: {field}")]
    InvalidField {
        /// Name of the offending field.
        field: &'static str,
    },
}

impl From<RequestError> for ErrorCode {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::SizeMismatch { .. } => ErrorCode::CommunicationFailure,
            RequestError::InvalidField { .. } => ErrorCode::InvalidArgument,
        }
    }
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([bytes[offset], bytes[offset + 1], bytes[offset + 2], bytes[offset + 3]])
}

fn check_size(bytes: &[u8], expected: usize) -> Result<(), RequestError> {
    if bytes.len() != expected {
        return Err(RequestError::SizeMismatch { expected, actual: bytes.len() });
    }
    Ok(())
}

/// Request structure for the MAC, Hash and Cipher families (12 bytes).
///
/// Layout: selector u32 | handle u32 | alg u32.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CryptoRequest {
    /// Operation selector (family-scoped).
    pub selector: u32,
    /// Key handle, where the operation consumes one (0 otherwise).
    pub handle: u32,
    /// Raw algorithm identifier.
    pub alg: u32,
}

impl CryptoRequest {
    /// Serialized size in bytes.
    pub const SIZE: usize = 12;

    /// Encode to the wire form.
    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[0..4].copy_from_slice(&self.selector.to_le_bytes());
        out[4..8].copy_from_slice(&self.handle.to_le_bytes());
        out[8..12].copy_from_slice(&self.alg.to_le_bytes());
        out
    }

    /// Decode from the wire form.
    pub fn decode(bytes: &[u8]) -> Result<Self, RequestError> {
        check_size(bytes, Self::SIZE)?;
        Ok(Self {
            selector: read_u32(bytes, 0),
            handle: read_u32(bytes, 4),
            alg: read_u32(bytes, 8),
        })
    }
}

/// Request structure for the asymmetric family (20 bytes).
///
/// Layout: selector u32 | handle u32 | alg u32 | input_length u32 |
/// salt_length u32. For encrypt/decrypt, input parameter 1 carries the
/// plaintext/ciphertext followed by the salt; the two sub-lengths slice it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AsymmetricRequest {
    /// Operation selector.
    pub selector: u32,
    /// Key handle.
    pub handle: u32,
    /// Raw algorithm identifier.
    pub alg: u32,
    /// Length of the input sub-region of parameter 1.
    pub input_length: u32,
    /// Length of the salt sub-region of parameter 1.
    pub salt_length: u32,
}

impl AsymmetricRequest {
    /// Serialized size in bytes.
    pub const SIZE: usize = 20;

    /// Encode to the wire form.
    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[0..4].copy_from_slice(&self.selector.to_le_bytes());
        out[4..8].copy_from_slice(&self.handle.to_le_bytes());
        out[8..12].copy_from_slice(&self.alg.to_le_bytes());
        out[12..16].copy_from_slice(&self.input_length.to_le_bytes());
        out[16..20].copy_from_slice(&self.salt_length.to_le_bytes());
        out
    }

    /// Decode from the wire form.
    pub fn decode(bytes: &[u8]) -> Result<Self, RequestError> {
        check_size(bytes, Self::SIZE)?;
        Ok(Self {
            selector: read_u32(bytes, 0),
            handle: read_u32(bytes, 4),
            alg: read_u32(bytes, 8),
            input_length: read_u32(bytes, 12),
            salt_length: read_u32(bytes, 16),
        })
    }
}

/// Request structure for the AEAD family (40 bytes).
///
/// Layout: selector u32 | handle u32 | alg u32 | nonce_length u32 |
/// additional_data_length u32 | input_length u32 | nonce `[u8; 16]`.
/// The nonce travels inline; input parameter 1 carries the additional data
/// followed by the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AeadRequest {
    /// Operation selector.
    pub selector: u32,
    /// Key handle.
    pub handle: u32,
    /// Raw algorithm identifier.
    pub alg: u32,
    /// Valid prefix length of `nonce` (at most [`AEAD_NONCE_MAX`]).
    pub nonce_length: u32,
    /// Length of the additional-data sub-region of parameter 1.
    pub additional_data_length: u32,
    /// Length of the payload sub-region of parameter 1.
    pub input_length: u32,
    /// Inline nonce bytes.
    pub nonce: [u8; AEAD_NONCE_MAX],
}

impl AeadRequest {
    /// Serialized size in bytes.
    pub const SIZE: usize = 40;

    /// Encode to the wire form.
    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[0..4].copy_from_slice(&self.selector.to_le_bytes());
        out[4..8].copy_from_slice(&self.handle.to_le_bytes());
        out[8..12].copy_from_slice(&self.alg.to_le_bytes());
        out[12..16].copy_from_slice(&self.nonce_length.to_le_bytes());
        out[16..20].copy_from_slice(&self.additional_data_length.to_le_bytes());
        out[20..24].copy_from_slice(&self.input_length.to_le_bytes());
        out[24..40].copy_from_slice(&self.nonce);
        out
    }

    /// Decode from the wire form.
    pub fn decode(bytes: &[u8]) -> Result<Self, RequestError> {
        check_size(bytes, Self::SIZE)?;
        let nonce_length = read_u32(bytes, 12);
        if nonce_length as usize > AEAD_NONCE_MAX {
            return Err(RequestError::InvalidField { field: "nonce_length" });
        }
        let mut nonce = [0u8; AEAD_NONCE_MAX];
        nonce.copy_from_slice(&bytes[24..40]);
        Ok(Self {
            selector: read_u32(bytes, 0),
            handle: read_u32(bytes, 4),
            alg: read_u32(bytes, 8),
            nonce_length,
            additional_data_length: read_u32(bytes, 16),
            input_length: read_u32(bytes, 20),
            nonce,
        })
    }

    /// The valid nonce bytes.
    pub fn nonce_bytes(&self) -> &[u8] {
        &self.nonce[..self.nonce_length as usize]
    }
}

/// Request structure for the key-management family (16 bytes).
///
/// Layout: selector u32 | handle u32 | lifetime u32 | key_type u32.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyManagementRequest {
    /// Operation selector.
    pub selector: u32,
    /// Key handle (0 where the operation allocates one).
    pub handle: u32,
    /// Raw lifetime value.
    pub lifetime: u32,
    /// Raw key type value.
    pub key_type: u32,
}

impl KeyManagementRequest {
    /// Serialized size in bytes.
    pub const SIZE: usize = 16;

    /// Encode to the wire form.
    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[0..4].copy_from_slice(&self.selector.to_le_bytes());
        out[4..8].copy_from_slice(&self.handle.to_le_bytes());
        out[8..12].copy_from_slice(&self.lifetime.to_le_bytes());
        out[12..16].copy_from_slice(&self.key_type.to_le_bytes());
        out
    }

    /// Decode from the wire form.
    pub fn decode(bytes: &[u8]) -> Result<Self, RequestError> {
        check_size(bytes, Self::SIZE)?;
        Ok(Self {
            selector: read_u32(bytes, 0),
            handle: read_u32(bytes, 4),
            lifetime: read_u32(bytes, 8),
            key_type: read_u32(bytes, 12),
        })
    }
}

/// Request structure for the generator/derivation family (16 bytes).
///
/// Layout: selector u32 | handle u32 | alg u32 | capacity u32.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DerivationRequest {
    /// Operation selector.
    pub selector: u32,
    /// Key handle (base key or agreement key).
    pub handle: u32,
    /// Raw algorithm identifier.
    pub alg: u32,
    /// Requested generator capacity in bytes.
    pub capacity: u32,
}

impl DerivationRequest {
    /// Serialized size in bytes.
    pub const SIZE: usize = 16;

    /// Encode to the wire form.
    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[0..4].copy_from_slice(&self.selector.to_le_bytes());
        out[4..8].copy_from_slice(&self.handle.to_le_bytes());
        out[8..12].copy_from_slice(&self.alg.to_le_bytes());
        out[12..16].copy_from_slice(&self.capacity.to_le_bytes());
        out
    }

    /// Decode from the wire form.
    pub fn decode(bytes: &[u8]) -> Result<Self, RequestError> {
        check_size(bytes, Self::SIZE)?;
        Ok(Self {
            selector: read_u32(bytes, 0),
            handle: read_u32(bytes, 4),
            alg: read_u32(bytes, 8),
            capacity: read_u32(bytes, 12),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crypto_request_round_trip() {
        let req = CryptoRequest { selector: 0x0101, handle: 7, alg: 0x109 };
        assert_eq!(CryptoRequest::decode(&req.encode()), Ok(req));
    }

    #[test]
    fn crypto_request_rejects_wrong_size() {
        let bytes = [0u8; CryptoRequest::SIZE + 1];
        assert_eq!(
            CryptoRequest::decode(&bytes),
            Err(RequestError::SizeMismatch { expected: 12, actual: 13 })
        );
    }

    #[test]
    fn asymmetric_request_round_trip() {
        let req = AsymmetricRequest {
            selector: 0x0403,
            handle: 3,
            alg: 0x301,
            input_length: 32,
            salt_length: 8,
        };
        assert_eq!(AsymmetricRequest::decode(&req.encode()), Ok(req));
    }

    #[test]
    fn aead_request_round_trip() {
        let mut nonce = [0u8; AEAD_NONCE_MAX];
        nonce[..12].copy_from_slice(&[9; 12]);
        let req = AeadRequest {
            selector: 0x0501,
            handle: 5,
            alg: 0x205,
            nonce_length: 12,
            additional_data_length: 4,
            input_length: 100,
            nonce,
        };
        let decoded = AeadRequest::decode(&req.encode()).unwrap();
        assert_eq!(decoded, req);
        assert_eq!(decoded.nonce_bytes(), &[9; 12]);
    }

    #[test]
    fn aead_request_rejects_oversized_nonce() {
        let req = AeadRequest { nonce_length: 17, ..AeadRequest::default() };
        let mut bytes = req.encode();
        bytes[12..16].copy_from_slice(&17u32.to_le_bytes());
        assert_eq!(
            AeadRequest::decode(&bytes),
            Err(RequestError::InvalidField { field: "nonce_length" })
        );
    }

    #[test]
    fn key_management_request_round_trip() {
        let req =
            KeyManagementRequest { selector: 0x060B, handle: 0, lifetime: 1, key_type: 0x1101 };
        assert_eq!(KeyManagementRequest::decode(&req.encode()), Ok(req));
    }

    #[test]
    fn derivation_request_round_trip() {
        let req = DerivationRequest { selector: 0x0705, handle: 11, alg: 0x409, capacity: 64 };
        assert_eq!(DerivationRequest::decode(&req.encode()), Ok(req));
    }

    #[test]
    fn size_mismatch_maps_to_communication_failure() {
        let err = RequestError::SizeMismatch { expected: 12, actual: 4 };
        assert_eq!(ErrorCode::from(err), ErrorCode::CommunicationFailure);
    }
}
