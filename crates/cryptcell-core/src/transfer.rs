//! Chunked parameter transfer.
//!
//! Large input parameters never materialize whole on the secure side:
//! they are pulled through the transport in bounded rounds and fed to a
//! consumer (a streaming update primitive) between reads. A read that
//! produces fewer bytes than requested means the transport and this layer
//! disagree on framing, which is fatal for the whole dispatch loop, not
//! just the current call.

use cryptcell_proto::{ErrorCode, Message};

use crate::error::{CallError, FatalError};
use crate::transport::Transport;

/// Allocate a zeroed buffer, mapping allocator refusal to a recoverable
/// out-of-memory status.
pub(crate) fn try_buffer(len: usize) -> Result<Vec<u8>, CallError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len).map_err(|_| ErrorCode::InsufficientMemory)?;
    buf.resize(len, 0);
    Ok(buf)
}

/// Read one input parameter in full.
///
/// Short reads are fatal ([`FatalError::TransferLengthMismatch`]).
pub(crate) fn read_param<T: Transport>(
    transport: &mut T,
    message: &Message,
    param: usize,
) -> Result<Vec<u8>, CallError> {
    let expected = message.in_sizes[param];
    let mut buf = try_buffer(expected)?;
    let actual = transport.read(message.connection, param, &mut buf);
    if actual != expected {
        return Err(FatalError::TransferLengthMismatch {
            connection: message.connection,
            param,
            expected,
            actual,
        }
        .into());
    }
    Ok(buf)
}

/// Pull one input parameter in rounds of at most `chunk_size` bytes,
/// handing each chunk to `consume`.
///
/// A consumer failure stops the loop immediately and becomes the call's
/// outcome; remaining bytes of the parameter are abandoned with it.
pub(crate) fn pull_chunks<T: Transport>(
    transport: &mut T,
    message: &Message,
    param: usize,
    chunk_size: usize,
    mut consume: impl FnMut(&[u8]) -> Result<(), ErrorCode>,
) -> Result<(), CallError> {
    let mut remaining = message.in_sizes[param];
    let mut buf = try_buffer(chunk_size.min(remaining))?;

    while remaining > 0 {
        let want = remaining.min(chunk_size);
        let got = transport.read(message.connection, param, &mut buf[..want]);
        if got != want {
            return Err(FatalError::TransferLengthMismatch {
                connection: message.connection,
                param,
                expected: want,
                actual: got,
            }
            .into());
        }
        consume(&buf[..want])?;
        remaining -= want;
    }
    Ok(())
}
