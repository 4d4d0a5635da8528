//! Service initialization and teardown (reference-counted).
//!
//! Callers bracket their use of the service with init and free. The
//! reference count is global across partitions; shared structures are
//! reset on the first successful init and torn down when frees balance
//! inits.

use cryptcell_proto::Status;

use crate::dispatch::CryptoService;
use crate::error::FatalError;
use crate::primitives::CryptoPrimitives;

pub(crate) fn on_init<P: CryptoPrimitives>(
    svc: &mut CryptoService<P>,
) -> Result<Status, FatalError> {
    if let Err(code) = svc.primitives.init() {
        return Ok(Status::Failure(code));
    }

    svc.state.acquire();
    if svc.state.init_refs() == 1 {
        svc.state.clones.clear();
        svc.state.access.clear();
        tracing::debug!("crypto service initialized");
    }
    Ok(Status::Success)
}

/// A free that balances the last init tears down the shared structures;
/// frees beyond that are tolerated and tear down again (idempotent).
pub(crate) fn on_free<P: CryptoPrimitives>(
    svc: &mut CryptoService<P>,
) -> Result<Status, FatalError> {
    if svc.state.release() {
        svc.state.clones.clear();
        svc.state.access.clear();
        svc.primitives.release();
        tracing::debug!("crypto service torn down");
    }
    Ok(Status::Success)
}
