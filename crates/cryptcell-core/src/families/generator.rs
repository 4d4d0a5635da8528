//! Key-derivation generator family.
//!
//! A connection owns at most one generator. Derive and key-agreement seed
//! it from an access-checked base key (salt in input 1, label in input 2,
//! or the peer key in input 1); capacity and read then drain the stream,
//! and import-key moves generator output directly into an access-checked
//! key slot without it ever crossing the boundary.

use cryptcell_proto::{Algorithm, DerivationRequest, GeneratorSelector, KeyType, Message, Status};

use crate::dispatch::CryptoService;
use crate::error::{CallError, FatalError};
use crate::families::{check_access, into_status, read_u32_param, write_u32};
use crate::primitives::CryptoPrimitives;
use crate::transfer::{read_param, try_buffer};
use crate::transport::Transport;

pub(crate) fn on_connect<P: CryptoPrimitives>(
    svc: &mut CryptoService<P>,
    message: &Message,
) -> Result<Status, FatalError> {
    svc.contexts.attach_derivation(message.connection);
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
    let request = DerivationRequest::decode(&bytes)?;
    let selector = GeneratorSelector::try_from(request.selector)?;
    let CryptoService { state, contexts, primitives, .. } = svc;

    match selector {
        GeneratorSelector::GetCapacity => {
            let op = contexts.derivation(message.connection)?;
            let capacity = primitives.generator_capacity(op)?;
            write_u32(transport, message.connection, 0, capacity);
        },
        GeneratorSelector::Read => {
            let mut output = try_buffer(message.out_sizes[0])?;
            let op = contexts.derivation_mut(message.connection)?;
            primitives.generator_read(op, &mut output)?;
            transport.write(message.connection, 0, &output);
        },
        GeneratorSelector::ImportKey => {
            check_access(state, request.handle, message.partition)?;
            let key_type = KeyType::try_from(read_u32_param(transport, message, 1)?)?;
            let bits = read_u32_param(transport, message, 2)?;
            let op = contexts.derivation_mut(message.connection)?;
            primitives.generator_import_key(op, request.handle, key_type, bits)?;
        },
        GeneratorSelector::Abort => {
            let op = contexts.derivation_mut(message.connection)?;
            primitives.generator_abort(op);
        },
        GeneratorSelector::Derive => {
            check_access(state, request.handle, message.partition)?;
            let alg = Algorithm::try_from(request.alg)?;
            let salt = read_param(transport, message, 1)?;
            let label = read_param(transport, message, 2)?;
            let op = contexts.derivation_mut(message.connection)?;
            primitives.derive_key(op, request.handle, alg, &salt, &label, request.capacity)?;
        },
        GeneratorSelector::KeyAgreement => {
            check_access(state, request.handle, message.partition)?;
            let alg = Algorithm::try_from(request.alg)?;
            let peer_key = read_param(transport, message, 1)?;
            let op = contexts.derivation_mut(message.connection)?;
            primitives.key_agreement(op, request.handle, &peer_key, alg)?;
        },
    }
    Ok(())
}

pub(crate) fn on_disconnect<P: CryptoPrimitives>(
    svc: &mut CryptoService<P>,
    message: &Message,
) -> Result<Status, FatalError> {
    if let Some(mut op) = svc.contexts.remove_derivation(message.connection) {
        svc.primitives.generator_abort(&mut op);
    }
    Ok(Status::Success)
}
