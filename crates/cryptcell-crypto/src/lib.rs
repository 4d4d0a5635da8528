//! Cryptcell software primitive provider.
//!
//! [`SoftProvider`] implements the service core's
//! [`CryptoPrimitives`](cryptcell_core::CryptoPrimitives) seam in pure
//! software:
//!
//! - Hash: streaming SHA-256 / SHA-512 with cheap state cloning
//! - MAC: HMAC-SHA-256
//! - AEAD: XChaCha20-Poly1305
//! - Asymmetric: Ed25519 sign/verify
//! - Derivation: HKDF-SHA-256 generator
//! - Randomness: OS entropy masked by caller-injected seed material
//!
//! Key material lives in an in-memory [`key_store::KeyStore`] with
//! monotone, never-reused handles; material is zeroized when a slot is
//! dropped. Streaming unauthenticated ciphers, asymmetric
//! encryption/decryption and raw key agreement have no primitive in this
//! stack and report `NotSupported`.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod aead;
pub mod derive;
pub mod hash;
pub mod key_store;
pub mod mac;
pub mod provider;
pub mod sign;

pub use derive::DerivationOp;
pub use hash::HashOp;
pub use mac::MacOp;
pub use provider::{CipherOp, SoftProvider};
