//! Streaming hash family.
//!
//! Unkeyed, so no access-control check applies. In addition to the usual
//! setup/update/finish/verify/abort protocol, a hash operation can be
//! snapshotted across connections: clone-begin on the source connection
//! reserves a pool slot and returns its index (output 0, u32); clone-end
//! on the target connection names that index (input 1, u32) and receives a
//! copy of the source's streaming state. Every terminal transition of the
//! source (finish, verify, abort, disconnect) force-clears its pool slot.

use cryptcell_proto::{Algorithm, CryptoRequest, ErrorCode, HashSelector, Message, Status};

use crate::dispatch::CryptoService;
use crate::error::{CallError, FatalError};
use crate::families::{into_status, read_u32_param, write_u32};
use crate::primitives::CryptoPrimitives;
use crate::transfer::{pull_chunks, read_param, try_buffer};
use crate::transport::Transport;

pub(crate) fn on_connect<P: CryptoPrimitives>(
    svc: &mut CryptoService<P>,
    message: &Message,
) -> Result<Status, FatalError> {
    svc.contexts.attach_hash(message.connection);
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
    let selector = HashSelector::try_from(request.selector)?;
    let CryptoService { state, contexts, primitives, config, .. } = svc;

    match selector {
        HashSelector::Setup => {
            let alg = Algorithm::try_from(request.alg)?;
            let op = contexts.hash_mut(message.connection)?;
            primitives.hash_setup(op, alg)?;
        },
        HashSelector::Update => {
            let op = contexts.hash_mut(message.connection)?;
            pull_chunks(transport, message, 1, config.chunk_size, |chunk| {
                primitives.hash_update(op, chunk)
            })?;
        },
        HashSelector::Finish => {
            let digest_size = read_u32_param(transport, message, 1)? as usize;
            let mut digest = try_buffer(digest_size)?;
            let op = contexts.hash_mut(message.connection)?;
            let result = primitives.hash_finish(op, &mut digest);
            state.clones.destroy(message.connection);
            let length = result?;
            transport.write(message.connection, 0, &digest[..length]);
            write_u32(transport, message.connection, 1, length as u32);
        },
        HashSelector::Verify => {
            let digest_length = read_u32_param(transport, message, 1)? as usize;
            if message.in_sizes[2] != digest_length {
                return Err(ErrorCode::CommunicationFailure.into());
            }
            let expected = read_param(transport, message, 2)?;
            let op = contexts.hash_mut(message.connection)?;
            let result = primitives.hash_verify(op, &expected);
            state.clones.destroy(message.connection);
            result?;
        },
        HashSelector::Abort => {
            let op = contexts.hash_mut(message.connection)?;
            primitives.hash_abort(op);
            state.clones.destroy(message.connection);
        },
        HashSelector::CloneBegin => {
            let index = state.clones.reserve(message.partition, message.connection)?;
            write_u32(transport, message.connection, 0, index as u32);
        },
        HashSelector::CloneEnd => {
            let index = read_u32_param(transport, message, 1)? as usize;
            let source = state.clones.get(index, message.partition)?;

            // The source operation must still be live on its own
            // connection; cloning an operation into itself is rejected.
            let mut target = contexts.take_hash(message.connection)?;
            let result = match contexts.hash(source) {
                Ok(source_op) => {
                    let result = primitives.hash_clone(source_op, &mut target);
                    state.clones.release(index);
                    result
                },
                Err(code) => Err(code),
            };
            contexts.put_hash(message.connection, target);
            result?;
        },
    }
    Ok(())
}

pub(crate) fn on_disconnect<P: CryptoPrimitives>(
    svc: &mut CryptoService<P>,
    message: &Message,
) -> Result<Status, FatalError> {
    if let Some(mut op) = svc.contexts.remove_hash(message.connection) {
        svc.primitives.hash_abort(&mut op);
        svc.state.clones.destroy(message.connection);
    }
    Ok(Status::Success)
}
