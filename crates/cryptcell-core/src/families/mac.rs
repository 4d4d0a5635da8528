//! Streaming MAC family.
//!
//! Parameter layout: input 0 carries the request structure. Update streams
//! message bytes through input 1 in chunks. Sign-finish reads the caller's
//! MAC capacity as a u32 in input 1 and writes the tag to output 0 and its
//! length to output 1, both only on success. Verify-finish reads the
//! expected length (input 1) and tag (input 2).

use cryptcell_proto::{Algorithm, CryptoRequest, ErrorCode, MacSelector, Message, Status};

use crate::dispatch::CryptoService;
use crate::error::{CallError, FatalError};
use crate::families::{check_access, into_status, read_u32_param, write_u32};
use crate::primitives::CryptoPrimitives;
use crate::transfer::{pull_chunks, read_param, try_buffer};
use crate::transport::Transport;

pub(crate) fn on_connect<P: CryptoPrimitives>(
    svc: &mut CryptoService<P>,
    message: &Message,
) -> Result<Status, FatalError> {
    svc.contexts.attach_mac(message.connection);
    Ok(Status::Success)
}

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
    let bytes = read_param(transport, message, 0)?;
    let request = CryptoRequest::decode(&bytes)?;
    let selector = MacSelector::try_from(request.selector)?;
    let CryptoService { state, contexts, primitives, config, .. } = svc;

    match selector {
        MacSelector::SignSetup => {
            check_access(state, request.handle, message.partition)?;
            let alg = Algorithm::try_from(request.alg)?;
            let op = contexts.mac_mut(message.connection)?;
            primitives.mac_sign_setup(op, request.handle, alg)?;
        },
        MacSelector::VerifySetup => {
            check_access(state, request.handle, message.partition)?;
            let alg = Algorithm::try_from(request.alg)?;
            let op = contexts.mac_mut(message.connection)?;
            primitives.mac_verify_setup(op, request.handle, alg)?;
        },
        MacSelector::Update => {
            let op = contexts.mac_mut(message.connection)?;
            pull_chunks(transport, message, 1, config.chunk_size, |chunk| {
                primitives.mac_update(op, chunk)
            })?;
        },
        MacSelector::SignFinish => {
            let mac_size = read_u32_param(transport, message, 1)? as usize;
            let mut mac = try_buffer(mac_size)?;
            let op = contexts.mac_mut(message.connection)?;
            let length = primitives.mac_sign_finish(op, &mut mac)?;
            transport.write(message.connection, 0, &mac[..length]);
            write_u32(transport, message.connection, 1, length as u32);
        },
        MacSelector::VerifyFinish => {
            let mac_length = read_u32_param(transport, message, 1)? as usize;
            if message.in_sizes[2] != mac_length {
                return Err(ErrorCode::CommunicationFailure.into());
            }
            let expected = read_param(transport, message, 2)?;
            let op = contexts.mac_mut(message.connection)?;
            primitives.mac_verify_finish(op, &expected)?;
        },
        MacSelector::Abort => {
            let op = contexts.mac_mut(message.connection)?;
            primitives.mac_abort(op);
        },
    }
    Ok(())
}

pub(crate) fn on_disconnect<P: CryptoPrimitives>(
    svc: &mut CryptoService<P>,
    message: &Message,
) -> Result<Status, FatalError> {
    if let Some(mut op) = svc.contexts.remove_mac(message.connection) {
        svc.primitives.mac_abort(&mut op);
    }
    Ok(Status::Success)
}
