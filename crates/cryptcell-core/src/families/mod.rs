//! Operation-family state machines.
//!
//! One module per message category. Each family exposes the subset of
//! `on_connect` / `on_call` / `on_disconnect` it participates in; the
//! dispatch loop routes `(category, kind)` pairs here and replies with the
//! returned status. Families without per-connection state accept connect
//! and disconnect implicitly (the dispatcher replies success without
//! calling in).
//!
//! Common rules, enforced uniformly:
//! - the request structure is decoded from input parameter 0 before
//!   anything else; a size mismatch is a recoverable communication failure
//! - handle-consuming operations check the access table first and perform
//!   no side effects on rejection
//! - variable-length outputs go to output slot 0, their u32 length to
//!   slot 1 (little-endian)

pub(crate) mod aead;
pub(crate) mod asymmetric;
pub(crate) mod cipher;
pub(crate) mod entropy;
pub(crate) mod generator;
pub(crate) mod hash;
pub(crate) mod init;
pub(crate) mod key_management;
pub(crate) mod mac;
pub(crate) mod rng;

use cryptcell_proto::{ConnectionId, ErrorCode, Message, PartitionId, Status};

use crate::error::{CallError, FatalError};
use crate::primitives::KeyHandle;
use crate::state::ServiceState;
use crate::transfer::read_param;
use crate::transport::Transport;

/// Collapse a handler outcome into a reply status, letting fatal errors
/// escape to the dispatch loop.
pub(crate) fn into_status(result: Result<(), CallError>) -> Result<Status, FatalError> {
    match result {
        Ok(()) => Ok(Status::Success),
        Err(CallError::Status(code)) => Ok(Status::Failure(code)),
        Err(CallError::Fatal(fatal)) => Err(fatal),
    }
}

/// Reject the call unless `partition` owns `handle`.
pub(crate) fn check_access(
    state: &ServiceState,
    handle: KeyHandle,
    partition: PartitionId,
) -> Result<(), CallError> {
    if !state.access.is_permitted(handle, partition) {
        tracing::warn!(handle, partition, "access denied for key handle");
        return Err(ErrorCode::InvalidHandle.into());
    }
    Ok(())
}

/// Read an input parameter that must be exactly one little-endian u32.
///
/// Any other declared size means the caller and this layer disagree on the
/// parameter layout for the selector.
pub(crate) fn read_u32_param<T: Transport>(
    transport: &mut T,
    message: &Message,
    param: usize,
) -> Result<u32, CallError> {
    if message.in_sizes[param] != 4 {
        return Err(ErrorCode::CommunicationFailure.into());
    }
    let bytes = read_param(transport, message, param)?;
    Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Write a little-endian u32 to an output slot.
pub(crate) fn write_u32<T: Transport>(
    transport: &mut T,
    connection: ConnectionId,
    slot: usize,
    value: u32,
) {
    transport.write(connection, slot, &value.to_le_bytes());
}
