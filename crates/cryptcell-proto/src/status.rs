//! Reply status codes.
//!
//! Every request receives exactly one reply carrying a signed 32-bit status.
//! [`Status`] is the wire-level value (success included); [`ErrorCode`] is
//! the failure subset used as the `Err` type throughout the service core.

use thiserror::Error;

/// Wire-level reply status for one request.
///
/// Zero is success; failures are negative, following the convention of the
/// original secure-partition service. The numeric values are part of the
/// wire contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The operation completed successfully.
    Success,
    /// The operation failed.
    Failure(ErrorCode),
}

impl Status {
    /// Wire code for this status.
    pub fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Failure(err) => err.code(),
        }
    }

    /// True iff this status is [`Status::Success`].
    pub fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

impl From<Result<(), ErrorCode>> for Status {
    fn from(result: Result<(), ErrorCode>) -> Self {
        match result {
            Ok(()) => Self::Success,
            Err(err) => Self::Failure(err),
        }
    }
}

impl From<ErrorCode> for Status {
    fn from(err: ErrorCode) -> Self {
        Self::Failure(err)
    }
}

/// Recoverable failure outcomes.
///
/// All of these leave the service loop running: the call fails, resources
/// held by the call are released, and the caller receives the code in its
/// reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ErrorCode {
    /// Unclassified failure inside the primitive layer.
    #[error("generic error")]
    GenericError,

    /// Unrecognized operation selector within a known category.
    #[error("operation not supported")]
    NotSupported,

    /// A request argument is out of range (e.g. oversized entropy seed).
    #[error("invalid argument")]
    InvalidArgument,

    /// The access-control check failed: the handle does not exist or is
    /// owned by a different partition.
    #[error("invalid key handle")]
    InvalidHandle,

    /// A bounded resource is exhausted or an operation was invoked out of
    /// sequence (e.g. clone pool full, update before setup).
    #[error("bad state")]
    BadState,

    /// A declared output capacity is too small for the result.
    #[error("output buffer too small")]
    BufferTooSmall,

    /// A persistent key with this identifier already exists.
    #[error("key already exists")]
    AlreadyExists,

    /// No persistent key with this identifier exists.
    #[error("key does not exist")]
    DoesNotExist,

    /// Scratch-buffer allocation failed.
    #[error("insufficient memory")]
    InsufficientMemory,

    /// A declared parameter size does not match the fixed structure size
    /// expected for the selector.
    #[error("communication failure")]
    CommunicationFailure,

    /// A signature or MAC failed verification.
    #[error("invalid signature")]
    InvalidSignature,
}

impl ErrorCode {
    /// Wire code for this failure.
    pub fn code(self) -> i32 {
        match self {
            Self::GenericError => -132,
            Self::NotSupported => -134,
            Self::InvalidArgument => -135,
            Self::InvalidHandle => -136,
            Self::BadState => -137,
            Self::BufferTooSmall => -138,
            Self::AlreadyExists => -139,
            Self::DoesNotExist => -140,
            Self::InsufficientMemory => -141,
            Self::CommunicationFailure => -145,
            Self::InvalidSignature => -149,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_is_zero() {
        assert_eq!(Status::Success.code(), 0);
        assert!(Status::Success.is_success());
    }

    #[test]
    fn failure_codes_are_negative_and_distinct() {
        let all = [
            ErrorCode::GenericError,
            ErrorCode::NotSupported,
            ErrorCode::InvalidArgument,
            ErrorCode::InvalidHandle,
            ErrorCode::BadState,
            ErrorCode::BufferTooSmall,
            ErrorCode::AlreadyExists,
            ErrorCode::DoesNotExist,
            ErrorCode::InsufficientMemory,
            ErrorCode::CommunicationFailure,
            ErrorCode::InvalidSignature,
        ];

        for err in all {
            assert!(err.code() < 0);
        }

        let mut codes: Vec<i32> = all.iter().map(|e| e.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), all.len());
    }

    #[test]
    fn status_from_result() {
        assert_eq!(Status::from(Ok(())), Status::Success);
        assert_eq!(
            Status::from(Err(ErrorCode::InvalidHandle)),
            Status::Failure(ErrorCode::InvalidHandle)
        );
    }
}
