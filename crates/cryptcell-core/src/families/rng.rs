//! Random-byte generation.
//!
//! The caller's declared output-0 capacity is the requested byte count;
//! the full buffer is written on success.

use cryptcell_proto::{Message, Status};

use crate::dispatch::CryptoService;
use crate::error::{CallError, FatalError};
use crate::families::into_status;
use crate::primitives::CryptoPrimitives;
use crate::transfer::try_buffer;
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
    let mut random = try_buffer(message.out_sizes[0])?;
    svc.primitives.generate_random(&mut random)?;
    transport.write(message.connection, 0, &random);
    Ok(())
}
