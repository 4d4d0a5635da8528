//! Per-connection operation state.
//!
//! Each open connection runs at most one multi-part operation, typed by
//! its family. The arena maps connection ids to the engine's opaque
//! context values and encodes the protocol-order rules: operating on a
//! connection with no active context, or setting up twice, is a
//! recoverable bad-state outcome decided here before the engine is ever
//! consulted.

use std::collections::HashMap;

use cryptcell_proto::{ConnectionId, ErrorCode};

use crate::primitives::CryptoPrimitives;

/// Typed per-connection context storage for all multi-part families.
#[derive(Debug)]
pub struct ContextArena<P: CryptoPrimitives> {
    mac: HashMap<ConnectionId, P::MacOp>,
    hash: HashMap<ConnectionId, P::HashOp>,
    cipher: HashMap<ConnectionId, P::CipherOp>,
    derivation: HashMap<ConnectionId, P::DerivationOp>,
}

impl<P: CryptoPrimitives> Default for ContextArena<P> {
    fn default() -> Self {
        Self {
            mac: HashMap::new(),
            hash: HashMap::new(),
            cipher: HashMap::new(),
            derivation: HashMap::new(),
        }
    }
}

macro_rules! arena_accessors {
    ($field:ident, $ty:ident, $attach:ident, $get:ident, $get_mut:ident, $take:ident,
     $put:ident, $remove:ident) => {
        /// Bind a fresh default context to `connection`, replacing any
        /// previous one.
        pub fn $attach(&mut self, connection: ConnectionId) -> &mut P::$ty {
            self.$field.entry(connection).insert_entry(P::$ty::default()).into_mut()
        }

        /// Shared view of an active context.
        pub fn $get(&self, connection: ConnectionId) -> Result<&P::$ty, ErrorCode> {
            self.$field.get(&connection).ok_or(ErrorCode::BadState)
        }

        /// Exclusive view of an active context.
        pub fn $get_mut(&mut self, connection: ConnectionId) -> Result<&mut P::$ty, ErrorCode> {
            self.$field.get_mut(&connection).ok_or(ErrorCode::BadState)
        }

        /// Detach and return an active context.
        pub fn $take(&mut self, connection: ConnectionId) -> Result<P::$ty, ErrorCode> {
            self.$field.remove(&connection).ok_or(ErrorCode::BadState)
        }

        /// Re-attach a previously taken context.
        pub fn $put(&mut self, connection: ConnectionId, op: P::$ty) {
            self.$field.insert(connection, op);
        }

        /// Drop the context for `connection`, if any.
        pub fn $remove(&mut self, connection: ConnectionId) -> Option<P::$ty> {
            self.$field.remove(&connection)
        }
    };
}

impl<P: CryptoPrimitives> ContextArena<P> {
    /// Empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    arena_accessors!(mac, MacOp, attach_mac, mac, mac_mut, take_mac, put_mac, remove_mac);
    arena_accessors!(hash, HashOp, attach_hash, hash, hash_mut, take_hash, put_hash, remove_hash);
    arena_accessors!(
        cipher,
        CipherOp,
        attach_cipher,
        cipher,
        cipher_mut,
        take_cipher,
        put_cipher,
        remove_cipher
    );
    arena_accessors!(
        derivation,
        DerivationOp,
        attach_derivation,
        derivation,
        derivation_mut,
        take_derivation,
        put_derivation,
        remove_derivation
    );

    /// Drop every context.
    pub fn clear(&mut self) {
        self.mac.clear();
        self.hash.clear();
        self.cipher.clear();
        self.derivation.clear();
    }
}
