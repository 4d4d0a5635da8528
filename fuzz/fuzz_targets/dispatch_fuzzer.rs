//! Fuzz target for the dispatch loop
//!
//! Drives a full service over the in-memory transport with arbitrary
//! message streams: random categories, kinds, parameter payloads and
//! declared output sizes. Recoverable failures must come back as reply
//! statuses and framing violations as returned fatal errors — the loop
//! itself should NEVER panic.

#![no_main]

use arbitrary::Arbitrary;
use cryptcell_core::{CryptoService, MemoryTransport};
use cryptcell_crypto::SoftProvider;
use cryptcell_proto::{Category, Message, MessageKind};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct FuzzMessage {
    category: u8,
    kind: i32,
    partition: i8,
    connection: u8,
    params: Vec<Vec<u8>>,
    out_sizes: [u8; 4],
}

fuzz_target!(|messages: Vec<FuzzMessage>| {
    let mut service = CryptoService::new(SoftProvider::new());
    let mut transport = MemoryTransport::new();

    for fuzz in messages {
        let category = Category::PRIORITY[fuzz.category as usize % Category::PRIORITY.len()];
        let mut message = Message::new(MessageKind::Call, i32::from(fuzz.partition), u32::from(fuzz.connection));
        message.kind = fuzz.kind;

        let mut params = fuzz.params;
        params.truncate(4);
        for (slot, param) in params.iter_mut().enumerate() {
            param.truncate(1 << 12);
            message.in_sizes[slot] = param.len();
        }
        for (slot, size) in fuzz.out_sizes.iter().enumerate() {
            message.out_sizes[slot] = *size as usize;
        }

        transport.push(category, message, params);
        if service.run_once(&mut transport, false).is_err() {
            // Fatal framing violation: the loop stops, which is the
            // documented contract. Start a fresh service for the rest of
            // the stream.
            service = CryptoService::new(SoftProvider::new());
            transport = MemoryTransport::new();
        }
    }
});
