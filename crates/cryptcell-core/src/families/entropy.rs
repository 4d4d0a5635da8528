//! Entropy seed injection.
//!
//! The seed travels in input parameter 0 (no request structure). An
//! oversized seed is rejected before any bytes are read.

use cryptcell_proto::{ErrorCode, Message, Status};

use crate::dispatch::CryptoService;
use crate::error::{CallError, FatalError};
use crate::families::into_status;
use crate::primitives::CryptoPrimitives;
use crate::transfer::read_param;
use crate::transport::Transport;

pub(crate) fn on_call<P: CryptoPrimitives, T: Transport>(
    svc: &mut CryptoService<P>,
    transport: &mut T,
    message: &Message,
) -> Result<Status, FatalError> {
    into_status(call(svc, transport, message))
}

fn call<P: CryptoPrimitives, T: Transport>(
    svc: &mut CryptoService<P>,
    transport: &mut T,
    message: &Message,
) -> Result<(), CallError> {
    if message.in_sizes[0] > svc.config.max_entropy_seed {
        return Err(ErrorCode::InvalidArgument.into());
    }
    let seed = read_param(transport, message, 0)?;
    svc.primitives.inject_entropy(&seed)?;
    Ok(())
}
