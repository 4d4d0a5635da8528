//! Service-level error types.
//!
//! Recoverable failures travel as [`ErrorCode`] and end up in the reply
//! status; [`FatalError`] means the transport and this layer have diverged
//! on message framing, no further message can be trusted, and the dispatch
//! loop must stop.

use cryptcell_proto::{Category, ConnectionId, ErrorCode, RequestError};
use thiserror::Error;

/// Unrecoverable contract violations that terminate the dispatch loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FatalError {
    /// The transport transferred a different number of bytes than the
    /// message declared for a parameter.
    #[error(
        "transfer length mismatch on connection {connection} param {param}: \
         expected {expected} bytes, got {actual}"
    )]
    TransferLengthMismatch {
        /// Connection the read was issued on.
        connection: ConnectionId,
        /// Input parameter index.
        param: usize,
        /// Bytes requested (bounded by the declared size).
        expected: usize,
        /// Bytes the transport actually produced.
        actual: usize,
    },

    /// A message arrived with a kind this layer does not recognize.
    #[error("unrecognized message kind {kind} for category {category:?}")]
    UnknownMessageKind {
        /// Category the message was fetched from.
        category: Category,
        /// Raw wire kind.
        kind: i32,
    },
}

/// Internal handler failure: either a recoverable status or a fatal abort.
///
/// Lets handler bodies use `?` uniformly; the family entry points unwrap
/// this into a reply status or a loop-terminating [`FatalError`].
#[derive(Debug)]
pub(crate) enum CallError {
    /// Recoverable: becomes the reply status for this call.
    Status(ErrorCode),
    /// Unrecoverable: propagates out of the dispatch loop.
    Fatal(FatalError),
}

impl From<ErrorCode> for CallError {
    fn from(err: ErrorCode) -> Self {
        Self::Status(err)
    }
}

impl From<FatalError> for CallError {
    fn from(err: FatalError) -> Self {
        Self::Fatal(err)
    }
}

impl From<RequestError> for CallError {
    fn from(err: RequestError) -> Self {
        Self::Status(err.into())
    }
}
