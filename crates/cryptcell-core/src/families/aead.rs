//! One-shot AEAD family.
//!
//! Stateless, access-checked before the selector is examined. The nonce
//! travels inline in the request structure; input parameter 1 packs the
//! additional data followed by the payload, sliced by the request's two
//! sub-lengths. Output 0 (ciphertext or plaintext) and the u32 length in
//! output 1 are written only on success.

use cryptcell_proto::{AeadRequest, AeadSelector, Algorithm, ErrorCode, Message, Status};

use crate::dispatch::CryptoService;
use crate::error::{CallError, FatalError};
use crate::families::{check_access, into_status, write_u32};
use crate::primitives::CryptoPrimitives;
use crate::transfer::{read_param, try_buffer};
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
    let bytes = read_param(transport, message, 0)?;
    let request = AeadRequest::decode(&bytes)?;
    check_access(&svc.state, request.handle, message.partition)?;
    let selector = AeadSelector::try_from(request.selector)?;
    let alg = Algorithm::try_from(request.alg)?;

    let additional_data_length = request.additional_data_length as usize;
    let input_length = request.input_length as usize;
    if additional_data_length + input_length != message.in_sizes[1] {
        return Err(ErrorCode::InvalidArgument.into());
    }

    let buffer = read_param(transport, message, 1)?;
    let (additional_data, input) = buffer.split_at(additional_data_length);
    let mut output = try_buffer(message.out_sizes[0])?;

    let length = match selector {
        AeadSelector::Encrypt => svc.primitives.aead_encrypt(
            request.handle,
            alg,
            request.nonce_bytes(),
            additional_data,
            input,
            &mut output,
        )?,
        AeadSelector::Decrypt => svc.primitives.aead_decrypt(
            request.handle,
            alg,
            request.nonce_bytes(),
            additional_data,
            input,
            &mut output,
        )?,
    };

    transport.write(message.connection, 0, &output[..length]);
    write_u32(transport, message.connection, 1, length as u32);
    Ok(())
}
