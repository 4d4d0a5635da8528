//! Cryptcell service core.
//!
//! The request-dispatch and access-control layer of a crypto service that
//! lives behind an asynchronous message-passing boundary. Callers
//! ("partitions") are untrusted; the core enforces that a partition may only
//! operate on key handles it owns, streams large payloads across the
//! boundary in bounded chunks, and multiplexes all operation families over
//! one logical thread of control.
//!
//! # Architecture
//!
//! ```text
//! CryptoService<P>
//!   ├─ state: ServiceState (init refcount, AccessControlTable, HashClonePool)
//!   ├─ contexts: ContextArena<P> (per-connection typed operation state)
//!   └─ primitives: P (impl CryptoPrimitives)
//! ```
//!
//! The service is driven by [`CryptoService::run`] over a [`Transport`]:
//! wait for ready categories, fetch one message per ready category in fixed
//! priority order, route it through the matching family state machine, and
//! send exactly one reply. Handlers run to completion; the only shared
//! mutable structures (access table, clone pool) are touched exclusively
//! from this single thread of control.
//!
//! Actual cryptographic algorithms live behind the [`CryptoPrimitives`]
//! trait; the transport/scheduler behind [`Transport`]. Both are external
//! collaborators.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod access_control;
pub mod clone_pool;
mod context;
mod dispatch;
mod error;
mod families;
mod primitives;
mod state;
mod transfer;
mod transport;

pub use access_control::{AccessControlTable, CompositeKeyId};
pub use clone_pool::HashClonePool;
pub use context::ContextArena;
pub use dispatch::CryptoService;
pub use error::FatalError;
pub use primitives::{CryptoPrimitives, KeyHandle};
pub use state::{ServiceConfig, ServiceState};
pub use transport::{MemoryTransport, Transport};
