//! One-shot asymmetric family.
//!
//! Stateless: no connect/disconnect handlers, every call stands alone.
//! The access check runs once, before the selector is even examined.
//!
//! Sign writes the signature to output 0 on success; the u32 length in
//! output 1 is written on every outcome (zero on failure), which callers
//! rely on when sizing retry buffers. Encrypt and decrypt share a packed
//! input parameter 1 of payload followed by salt, sliced by the request's
//! two sub-lengths, and write outputs with the same always-write-length
//! rule as sign.

use cryptcell_proto::{
    Algorithm, AsymmetricRequest, AsymmetricSelector, ErrorCode, Message, Status,
};

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
    let request = AsymmetricRequest::decode(&bytes)?;
    check_access(&svc.state, request.handle, message.partition)?;
    let selector = AsymmetricSelector::try_from(request.selector)?;
    let alg = Algorithm::try_from(request.alg)?;
    let CryptoService { primitives, .. } = svc;

    match selector {
        AsymmetricSelector::Sign => {
            let hash = read_param(transport, message, 1)?;
            let mut signature = try_buffer(message.out_sizes[0])?;

            let result = primitives.asymmetric_sign(request.handle, alg, &hash, &mut signature);
            let length = result.as_ref().copied().unwrap_or(0);
            if result.is_ok() {
                transport.write(message.connection, 0, &signature[..length]);
            }
            write_u32(transport, message.connection, 1, length as u32);
            result?;
        },
        AsymmetricSelector::Verify => {
            let signature = read_param(transport, message, 1)?;
            let hash = read_param(transport, message, 2)?;
            primitives.asymmetric_verify(request.handle, alg, &hash, &signature)?;
        },
        AsymmetricSelector::Encrypt | AsymmetricSelector::Decrypt => {
            let input_length = request.input_length as usize;
            let salt_length = request.salt_length as usize;
            if input_length + salt_length != message.in_sizes[1] {
                return Err(ErrorCode::InvalidArgument.into());
            }

            let buffer = read_param(transport, message, 1)?;
            let (input, salt) = buffer.split_at(input_length);
            let mut output = try_buffer(message.out_sizes[0])?;

            let result = if selector == AsymmetricSelector::Encrypt {
                primitives.asymmetric_encrypt(request.handle, alg, input, salt, &mut output)
            } else {
                primitives.asymmetric_decrypt(request.handle, alg, input, salt, &mut output)
            };
            let length = result.as_ref().copied().unwrap_or(0);
            if result.is_ok() {
                transport.write(message.connection, 0, &output[..length]);
            }
            write_u32(transport, message.connection, 1, length as u32);
            result?;
        },
    }
    Ok(())
}
