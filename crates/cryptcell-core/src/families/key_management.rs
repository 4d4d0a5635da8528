//! Key-management family.
//!
//! Stateless per connection; ownership changes go through the access
//! table. Allocate/create/open register the fresh handle to the caller
//! and return it as a u32 in output 0; destroy and close unregister on
//! success. Create and open read a 4-byte application key id from input 1
//! and fold the caller partition into the composite identifier, so two
//! partitions using the same id name different keys.
//!
//! Export and export-public write the material to output 0 on success and
//! the u32 length to output 1 on every outcome. Get-information writes
//! zeroed type/bits defaults even on failure, for any output slot large
//! enough to hold them.

use cryptcell_proto::{
    ErrorCode, KeyManagementRequest, KeyPolicy, KeySelector, KeyType, Lifetime, Message, Status,
};

use crate::access_control::CompositeKeyId;
use crate::dispatch::CryptoService;
use crate::error::{CallError, FatalError};
use crate::families::{check_access, into_status, read_u32_param, write_u32};
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
    let request = KeyManagementRequest::decode(&bytes)?;
    let selector = KeySelector::try_from(request.selector)?;
    let CryptoService { state, primitives, .. } = svc;

    match selector {
        KeySelector::GetLifetime => {
            check_access(state, request.handle, message.partition)?;
            let lifetime = primitives.key_lifetime(request.handle)?;
            write_u32(transport, message.connection, 0, lifetime.to_u32());
        },
        KeySelector::SetPolicy => {
            check_access(state, request.handle, message.partition)?;
            let bytes = read_param(transport, message, 1)?;
            let policy =
                KeyPolicy::decode(&bytes).ok_or(ErrorCode::CommunicationFailure)?;
            primitives.set_key_policy(request.handle, policy)?;
        },
        KeySelector::GetPolicy => {
            check_access(state, request.handle, message.partition)?;
            let policy = primitives.key_policy(request.handle)?;
            transport.write(message.connection, 0, &policy.encode());
        },
        KeySelector::Import => {
            check_access(state, request.handle, message.partition)?;
            let key_type = KeyType::try_from(request.key_type)?;
            let data = read_param(transport, message, 1)?;
            primitives.import_key(request.handle, key_type, &data)?;
        },
        KeySelector::Destroy => {
            check_access(state, request.handle, message.partition)?;
            primitives.destroy_key(request.handle)?;
            state.access.unregister(request.handle);
        },
        KeySelector::GetInformation => {
            let result = check_access(state, request.handle, message.partition)
                .and_then(|()| Ok(primitives.key_information(request.handle)?));

            // Defaults are written even on failure so callers probing a
            // handle always see well-defined values.
            let (key_type, bits) = match &result {
                Ok((ty, bits)) => (ty.to_u32(), *bits),
                Err(_) => (0, 0),
            };
            if message.out_sizes[0] >= 4 {
                write_u32(transport, message.connection, 0, key_type);
            }
            if message.out_sizes[1] >= 4 {
                write_u32(transport, message.connection, 1, bits);
            }
            result.map(|_| ())?;
        },
        KeySelector::Export => {
            check_access(state, request.handle, message.partition)?;
            let mut material = try_buffer(message.out_sizes[0])?;
            let result = primitives.export_key(request.handle, &mut material);
            let length = result.as_ref().copied().unwrap_or(0);
            if result.is_ok() {
                transport.write(message.connection, 0, &material[..length]);
            }
            write_u32(transport, message.connection, 1, length as u32);
            result?;
        },
        KeySelector::ExportPublic => {
            check_access(state, request.handle, message.partition)?;
            let mut material = try_buffer(message.out_sizes[0])?;
            let result = primitives.export_public_key(request.handle, &mut material);
            let length = result.as_ref().copied().unwrap_or(0);
            if result.is_ok() {
                transport.write(message.connection, 0, &material[..length]);
            }
            write_u32(transport, message.connection, 1, length as u32);
            result?;
        },
        KeySelector::Generate => {
            check_access(state, request.handle, message.partition)?;
            let key_type = KeyType::try_from(request.key_type)?;
            let bits = read_u32_param(transport, message, 1)?;

            // Only key-pair generation takes extra type-specific
            // parameters.
            let params = if key_type == KeyType::Ed25519KeyPair && message.in_sizes[2] != 0 {
                read_param(transport, message, 2)?
            } else {
                Vec::new()
            };
            primitives.generate_key(request.handle, key_type, bits, &params)?;
        },
        KeySelector::Allocate => {
            let handle = primitives.allocate_key()?;
            state.access.register(handle, message.partition);
            write_u32(transport, message.connection, 0, handle);
        },
        KeySelector::Create | KeySelector::Open => {
            let lifetime = Lifetime::try_from(request.lifetime)?;
            let app_id = read_u32_param(transport, message, 1)?;
            let id = CompositeKeyId::assemble(app_id, message.partition);

            let handle = if selector == KeySelector::Create {
                primitives.create_key(lifetime, id)?
            } else {
                primitives.open_key(lifetime, id)?
            };
            state.access.register(handle, message.partition);
            write_u32(transport, message.connection, 0, handle);
        },
        KeySelector::Close => {
            check_access(state, request.handle, message.partition)?;
            primitives.close_key(request.handle)?;
            state.access.unregister(request.handle);
        },
    }
    Ok(())
}
