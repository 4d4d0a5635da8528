//! Streaming symmetric-cipher family.
//!
//! Setup binds the operation to a key (access-checked); the IV is either
//! generated on the secure side (output 0 + u32 length in output 1) or
//! supplied by the caller (input 1). Update transforms input 1 into
//! output 0 with the produced length in output 1; finish flushes trailing
//! bytes the same way. Outputs are written only on success.

use cryptcell_proto::{Algorithm, CipherSelector, CryptoRequest, Message, Status};

use crate::dispatch::CryptoService;
use crate::error::{CallError, FatalError};
use crate::families::{check_access, into_status, write_u32};
use crate::primitives::CryptoPrimitives;
use crate::transfer::{read_param, try_buffer};
use crate::transport::Transport;

pub(crate) fn on_connect<P: CryptoPrimitives>(
    svc: &mut CryptoService<P>,
    message: &Message,
) -> Result<Status, FatalError> {
    svc.contexts.attach_cipher(message.connection);
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
    let selector = CipherSelector::try_from(request.selector)?;
    let CryptoService { state, contexts, primitives, .. } = svc;

    match selector {
        CipherSelector::EncryptSetup => {
            check_access(state, request.handle, message.partition)?;
            let alg = Algorithm::try_from(request.alg)?;
            let op = contexts.cipher_mut(message.connection)?;
            primitives.cipher_encrypt_setup(op, request.handle, alg)?;
        },
        CipherSelector::DecryptSetup => {
            check_access(state, request.handle, message.partition)?;
            let alg = Algorithm::try_from(request.alg)?;
            let op = contexts.cipher_mut(message.connection)?;
            primitives.cipher_decrypt_setup(op, request.handle, alg)?;
        },
        CipherSelector::GenerateIv => {
            let mut iv = try_buffer(message.out_sizes[0])?;
            let op = contexts.cipher_mut(message.connection)?;
            let length = primitives.cipher_generate_iv(op, &mut iv)?;
            transport.write(message.connection, 0, &iv[..length]);
            write_u32(transport, message.connection, 1, length as u32);
        },
        CipherSelector::SetIv => {
            let iv = read_param(transport, message, 1)?;
            let op = contexts.cipher_mut(message.connection)?;
            primitives.cipher_set_iv(op, &iv)?;
        },
        CipherSelector::Update => {
            let input = read_param(transport, message, 1)?;
            let mut output = try_buffer(message.out_sizes[0])?;
            let op = contexts.cipher_mut(message.connection)?;
            let length = primitives.cipher_update(op, &input, &mut output)?;
            transport.write(message.connection, 0, &output[..length]);
            write_u32(transport, message.connection, 1, length as u32);
        },
        CipherSelector::Finish => {
            let mut output = try_buffer(message.out_sizes[0])?;
            let op = contexts.cipher_mut(message.connection)?;
            let length = primitives.cipher_finish(op, &mut output)?;
            transport.write(message.connection, 0, &output[..length]);
            write_u32(transport, message.connection, 1, length as u32);
        },
        CipherSelector::Abort => {
            let op = contexts.cipher_mut(message.connection)?;
            primitives.cipher_abort(op);
        },
    }
    Ok(())
}

pub(crate) fn on_disconnect<P: CryptoPrimitives>(
    svc: &mut CryptoService<P>,
    message: &Message,
) -> Result<Status, FatalError> {
    if let Some(mut op) = svc.contexts.remove_cipher(message.connection) {
        svc.primitives.cipher_abort(&mut op);
    }
    Ok(Status::Success)
}
