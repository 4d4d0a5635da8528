//! Key attribute types crossing the boundary.
//!
//! Algorithms, key types, lifetimes and usage policies are encoded as u32
//! values inside the request structures. Unknown values survive decoding
//! (the structs carry raw u32s); conversion to these enums happens at the
//! family layer, where an unknown value maps to a recoverable status.

use crate::ErrorCode;

/// Cryptographic algorithm identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    /// SHA-256 hash.
    Sha256,
    /// SHA-512 hash.
    Sha512,
    /// HMAC over SHA-256.
    HmacSha256,
    /// XChaCha20-Poly1305 AEAD.
    XChaCha20Poly1305,
    /// Ed25519 signature.
    Ed25519,
    /// HKDF expansion over SHA-256.
    HkdfSha256,
}

impl Algorithm {
    /// Wire value of this algorithm.
    pub fn to_u32(self) -> u32 {
        match self {
            Self::Sha256 => 0x0000_0009,
            Self::Sha512 => 0x0000_000B,
            Self::HmacSha256 => 0x0000_0109,
            Self::XChaCha20Poly1305 => 0x0000_0205,
            Self::Ed25519 => 0x0000_0301,
            Self::HkdfSha256 => 0x0000_0409,
        }
    }
}

impl TryFrom<u32> for Algorithm {
    type Error = ErrorCode;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        match raw {
            0x0000_0009 => Ok(Self::Sha256),
            0x0000_000B => Ok(Self::Sha512),
            0x0000_0109 => Ok(Self::HmacSha256),
            0x0000_0205 => Ok(Self::XChaCha20Poly1305),
            0x0000_0301 => Ok(Self::Ed25519),
            0x0000_0409 => Ok(Self::HkdfSha256),
            _ => Err(ErrorCode::NotSupported),
        }
    }
}

/// Type of key material held in a key slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyType {
    /// Unstructured byte string (HMAC keys, derivation secrets).
    RawData,
    /// 256-bit AEAD key for XChaCha20-Poly1305.
    XChaCha20,
    /// Ed25519 signing key pair.
    Ed25519KeyPair,
    /// Ed25519 public key only.
    Ed25519PublicKey,
}

impl KeyType {
    /// Wire value of this key type.
    pub fn to_u32(self) -> u32 {
        match self {
            Self::RawData => 0x0000_1001,
            Self::XChaCha20 => 0x0000_1002,
            Self::Ed25519KeyPair => 0x0000_1101,
            Self::Ed25519PublicKey => 0x0000_1102,
        }
    }
}

impl TryFrom<u32> for KeyType {
    type Error = ErrorCode;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        match raw {
            0x0000_1001 => Ok(Self::RawData),
            0x0000_1002 => Ok(Self::XChaCha20),
            0x0000_1101 => Ok(Self::Ed25519KeyPair),
            0x0000_1102 => Ok(Self::Ed25519PublicKey),
            _ => Err(ErrorCode::NotSupported),
        }
    }
}

/// Key persistence class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifetime {
    /// Key disappears when the slot is destroyed or the service restarts.
    #[default]
    Volatile,
    /// Key is addressable by persistent composite identifier.
    Persistent,
}

impl Lifetime {
    /// Wire value of this lifetime.
    pub fn to_u32(self) -> u32 {
        match self {
            Self::Volatile => 0,
            Self::Persistent => 1,
        }
    }
}

impl TryFrom<u32> for Lifetime {
    type Error = ErrorCode;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(Self::Volatile),
            1 => Ok(Self::Persistent),
            _ => Err(ErrorCode::InvalidArgument),
        }
    }
}

/// Permitted-usage bitset attached to a key by its policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UsageFlags(pub u32);

impl UsageFlags {
    /// Key material may be exported.
    pub const EXPORT: UsageFlags = UsageFlags(1 << 0);
    /// Key may sign or MAC.
    pub const SIGN: UsageFlags = UsageFlags(1 << 1);
    /// Key may verify signatures or MACs.
    pub const VERIFY: UsageFlags = UsageFlags(1 << 2);
    /// Key may encrypt.
    pub const ENCRYPT: UsageFlags = UsageFlags(1 << 3);
    /// Key may decrypt.
    pub const DECRYPT: UsageFlags = UsageFlags(1 << 4);
    /// Key may feed derivation.
    pub const DERIVE: UsageFlags = UsageFlags(1 << 5);

    /// True iff all flags in `other` are set in `self`.
    pub fn allows(self, other: UsageFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Union of two flag sets.
    pub fn union(self, other: UsageFlags) -> UsageFlags {
        UsageFlags(self.0 | other.0)
    }
}

/// Usage policy attached to a key slot.
///
/// Crosses the wire as 8 bytes: usage u32 then algorithm u32, both
/// little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyPolicy {
    /// Permitted usages.
    pub usage: UsageFlags,
    /// Raw algorithm the key is restricted to (0 = unrestricted).
    pub alg: u32,
}

impl KeyPolicy {
    /// Serialized size in bytes.
    pub const SIZE: usize = 8;

    /// Encode to the 8-byte wire form.
    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[0..4].copy_from_slice(&self.usage.0.to_le_bytes());
        out[4..8].copy_from_slice(&self.alg.to_le_bytes());
        out
    }

    /// Decode from the 8-byte wire form.
    ///
    /// Returns `None` unless `bytes` is exactly [`Self::SIZE`] long.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != Self::SIZE {
            return None;
        }
        let usage = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let alg = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        Some(Self { usage: UsageFlags(usage), alg })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn algorithm_round_trip() {
        for alg in [
            Algorithm::Sha256,
            Algorithm::Sha512,
            Algorithm::HmacSha256,
            Algorithm::XChaCha20Poly1305,
            Algorithm::Ed25519,
            Algorithm::HkdfSha256,
        ] {
            assert_eq!(Algorithm::try_from(alg.to_u32()), Ok(alg));
        }
    }

    #[test]
    fn unknown_algorithm_is_not_supported() {
        assert_eq!(Algorithm::try_from(0xDEAD_BEEF), Err(ErrorCode::NotSupported));
    }

    #[test]
    fn key_type_round_trip() {
        for ty in [
            KeyType::RawData,
            KeyType::XChaCha20,
            KeyType::Ed25519KeyPair,
            KeyType::Ed25519PublicKey,
        ] {
            assert_eq!(KeyType::try_from(ty.to_u32()), Ok(ty));
        }
    }

    #[test]
    fn usage_flags_allows() {
        let policy = UsageFlags::SIGN.union(UsageFlags::VERIFY);
        assert!(policy.allows(UsageFlags::SIGN));
        assert!(policy.allows(UsageFlags::SIGN.union(UsageFlags::VERIFY)));
        assert!(!policy.allows(UsageFlags::EXPORT));
    }

    #[test]
    fn key_policy_encode_decode() {
        let policy = KeyPolicy {
            usage: UsageFlags::SIGN.union(UsageFlags::EXPORT),
            alg: Algorithm::Ed25519.to_u32(),
        };
        let bytes = policy.encode();
        assert_eq!(KeyPolicy::decode(&bytes), Some(policy));
        assert_eq!(KeyPolicy::decode(&bytes[..7]), None);
    }
}
