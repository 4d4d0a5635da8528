//! Fuzz target for the fixed-size request decoders
//!
//! This fuzzer feeds arbitrary byte sequences to every request structure to
//! find:
//! - Parser crashes or panics
//! - Out-of-bounds reads at field offsets
//! - Field values that bypass range validation
//!
//! The fuzzer should NEVER panic. All invalid inputs should return an error.

#![no_main]

use cryptcell_proto::{
    AeadRequest, AsymmetricRequest, CryptoRequest, DerivationRequest, KeyManagementRequest,
    KeyPolicy,
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = CryptoRequest::decode(data);
    let _ = AsymmetricRequest::decode(data);
    let _ = AeadRequest::decode(data);
    let _ = KeyManagementRequest::decode(data);
    let _ = DerivationRequest::decode(data);
    let _ = KeyPolicy::decode(data);
});
