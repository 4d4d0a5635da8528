//! Cryptcell wire contract.
//!
//! Defines everything that crosses the message-passing boundary between
//! caller partitions and the secure-side crypto service:
//!
//! - [`Category`]: the fixed message groups the dispatch loop waits on
//! - [`Message`]: one unit of request metadata (kind, caller, parameter sizes)
//! - Request structures ([`CryptoRequest`], [`AsymmetricRequest`], ...):
//!   fixed-size little-endian structs carried in input parameter 0
//! - [`Status`] / [`ErrorCode`]: the single per-request reply value
//! - Key attribute types ([`Algorithm`], [`KeyType`], [`KeyPolicy`], ...)
//!
//! The selector values and parameter layouts in this crate are the wire
//! contract: existing callers depend on them byte-for-byte. Changing a
//! discriminant or a field offset is a breaking protocol change.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod category;
mod message;
mod request;
mod selector;
mod status;
mod types;

pub use category::{Category, CategoryMask};
pub use message::{ConnectionId, MAX_PARAMS, Message, MessageKind, PartitionId};
pub use request::{
    AEAD_NONCE_MAX, AeadRequest, AsymmetricRequest, CryptoRequest, DerivationRequest,
    KeyManagementRequest, RequestError,
};
pub use selector::{
    AeadSelector, AsymmetricSelector, CipherSelector, GeneratorSelector, HashSelector,
    KeySelector, MacSelector,
};
pub use status::{ErrorCode, Status};
pub use types::{Algorithm, KeyPolicy, KeyType, Lifetime, UsageFlags};
