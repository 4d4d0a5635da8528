//! Seam between the dispatch layer and the cryptographic engine.
//!
//! The dispatch layer owns trust decisions, framing and per-connection
//! state; everything algorithmic lives behind [`CryptoPrimitives`]. The
//! trait is deliberately wide and flat: one method per primitive
//! operation, all fallible with [`ErrorCode`], so the family state
//! machines can forward outcomes into reply statuses without translation.
//!
//! Multi-part operation state is held in implementation-defined context
//! values (the associated types). The core stores them per connection in
//! the [`ContextArena`](crate::ContextArena) and hands out `&mut`
//! references; implementations keep whatever they need inside.

use cryptcell_proto::{Algorithm, ErrorCode, KeyPolicy, KeyType, Lifetime};

use crate::access_control::CompositeKeyId;

/// Engine-issued identifier of a key slot.
pub type KeyHandle = u32;

/// Cryptographic engine behind the dispatch layer.
#[allow(clippy::missing_errors_doc)]
pub trait CryptoPrimitives {
    /// In-progress streaming hash state.
    type HashOp: Default;
    /// In-progress streaming MAC state.
    type MacOp: Default;
    /// In-progress streaming cipher state.
    type CipherOp: Default;
    /// In-progress key-derivation generator state.
    type DerivationOp: Default;

    /// Initialize the engine (entropy, key store). Idempotent.
    fn init(&mut self) -> Result<(), ErrorCode>;
    /// Release engine-wide resources. Idempotent.
    fn release(&mut self);

    // Hash.

    /// Begin a streaming hash in `op`.
    fn hash_setup(&mut self, op: &mut Self::HashOp, alg: Algorithm) -> Result<(), ErrorCode>;
    /// Feed message bytes.
    fn hash_update(&mut self, op: &mut Self::HashOp, input: &[u8]) -> Result<(), ErrorCode>;
    /// Produce the digest into `digest`, returning its length. Consumes the
    /// operation state either way.
    fn hash_finish(&mut self, op: &mut Self::HashOp, digest: &mut [u8])
    -> Result<usize, ErrorCode>;
    /// Finish and compare against an expected digest in constant time.
    fn hash_verify(&mut self, op: &mut Self::HashOp, expected: &[u8]) -> Result<(), ErrorCode>;
    /// Discard the operation state.
    fn hash_abort(&mut self, op: &mut Self::HashOp);
    /// Copy the streaming state of `source` into `target`.
    fn hash_clone(&mut self, source: &Self::HashOp, target: &mut Self::HashOp)
    -> Result<(), ErrorCode>;

    // MAC.

    /// Begin a streaming MAC for signing.
    fn mac_sign_setup(
        &mut self,
        op: &mut Self::MacOp,
        handle: KeyHandle,
        alg: Algorithm,
    ) -> Result<(), ErrorCode>;
    /// Begin a streaming MAC for verification.
    fn mac_verify_setup(
        &mut self,
        op: &mut Self::MacOp,
        handle: KeyHandle,
        alg: Algorithm,
    ) -> Result<(), ErrorCode>;
    /// Feed message bytes.
    fn mac_update(&mut self, op: &mut Self::MacOp, input: &[u8]) -> Result<(), ErrorCode>;
    /// Produce the tag into `mac`, returning its length.
    fn mac_sign_finish(&mut self, op: &mut Self::MacOp, mac: &mut [u8])
    -> Result<usize, ErrorCode>;
    /// Finish and compare against an expected tag in constant time.
    fn mac_verify_finish(&mut self, op: &mut Self::MacOp, expected: &[u8])
    -> Result<(), ErrorCode>;
    /// Discard the operation state.
    fn mac_abort(&mut self, op: &mut Self::MacOp);

    // Cipher.

    /// Begin a streaming cipher encryption.
    fn cipher_encrypt_setup(
        &mut self,
        op: &mut Self::CipherOp,
        handle: KeyHandle,
        alg: Algorithm,
    ) -> Result<(), ErrorCode>;
    /// Begin a streaming cipher decryption.
    fn cipher_decrypt_setup(
        &mut self,
        op: &mut Self::CipherOp,
        handle: KeyHandle,
        alg: Algorithm,
    ) -> Result<(), ErrorCode>;
    /// Generate a fresh IV into `iv`, returning its length.
    fn cipher_generate_iv(
        &mut self,
        op: &mut Self::CipherOp,
        iv: &mut [u8],
    ) -> Result<usize, ErrorCode>;
    /// Set an explicit IV.
    fn cipher_set_iv(&mut self, op: &mut Self::CipherOp, iv: &[u8]) -> Result<(), ErrorCode>;
    /// Transform `input` into `output`, returning the bytes produced.
    fn cipher_update(
        &mut self,
        op: &mut Self::CipherOp,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<usize, ErrorCode>;
    /// Finalize, flushing any trailing bytes into `output`.
    fn cipher_finish(
        &mut self,
        op: &mut Self::CipherOp,
        output: &mut [u8],
    ) -> Result<usize, ErrorCode>;
    /// Discard the operation state.
    fn cipher_abort(&mut self, op: &mut Self::CipherOp);

    // Asymmetric.

    /// Sign a precomputed hash, returning the signature length.
    fn asymmetric_sign(
        &mut self,
        handle: KeyHandle,
        alg: Algorithm,
        hash: &[u8],
        signature: &mut [u8],
    ) -> Result<usize, ErrorCode>;
    /// Verify a signature over a precomputed hash.
    fn asymmetric_verify(
        &mut self,
        handle: KeyHandle,
        alg: Algorithm,
        hash: &[u8],
        signature: &[u8],
    ) -> Result<(), ErrorCode>;
    /// One-shot asymmetric encryption, returning the ciphertext length.
    fn asymmetric_encrypt(
        &mut self,
        handle: KeyHandle,
        alg: Algorithm,
        input: &[u8],
        salt: &[u8],
        output: &mut [u8],
    ) -> Result<usize, ErrorCode>;
    /// One-shot asymmetric decryption, returning the plaintext length.
    fn asymmetric_decrypt(
        &mut self,
        handle: KeyHandle,
        alg: Algorithm,
        input: &[u8],
        salt: &[u8],
        output: &mut [u8],
    ) -> Result<usize, ErrorCode>;

    // AEAD.

    /// One-shot authenticated encryption, returning the ciphertext length
    /// (payload plus tag).
    fn aead_encrypt(
        &mut self,
        handle: KeyHandle,
        alg: Algorithm,
        nonce: &[u8],
        additional_data: &[u8],
        plaintext: &[u8],
        ciphertext: &mut [u8],
    ) -> Result<usize, ErrorCode>;
    /// One-shot authenticated decryption, returning the plaintext length.
    fn aead_decrypt(
        &mut self,
        handle: KeyHandle,
        alg: Algorithm,
        nonce: &[u8],
        additional_data: &[u8],
        ciphertext: &[u8],
        plaintext: &mut [u8],
    ) -> Result<usize, ErrorCode>;

    // Key management.

    /// Allocate an empty volatile key slot, returning its handle.
    fn allocate_key(&mut self) -> Result<KeyHandle, ErrorCode>;
    /// Create an empty key slot addressable by persistent identifier.
    fn create_key(
        &mut self,
        lifetime: Lifetime,
        id: CompositeKeyId,
    ) -> Result<KeyHandle, ErrorCode>;
    /// Open an existing persistent key by identifier.
    fn open_key(&mut self, lifetime: Lifetime, id: CompositeKeyId)
    -> Result<KeyHandle, ErrorCode>;
    /// Close a handle without destroying persistent material.
    fn close_key(&mut self, handle: KeyHandle) -> Result<(), ErrorCode>;
    /// Destroy the key material and free the slot.
    fn destroy_key(&mut self, handle: KeyHandle) -> Result<(), ErrorCode>;
    /// Import key material into an allocated slot.
    fn import_key(
        &mut self,
        handle: KeyHandle,
        key_type: KeyType,
        data: &[u8],
    ) -> Result<(), ErrorCode>;
    /// Export key material, returning its length.
    fn export_key(&mut self, handle: KeyHandle, output: &mut [u8]) -> Result<usize, ErrorCode>;
    /// Export the public half of an asymmetric key.
    fn export_public_key(
        &mut self,
        handle: KeyHandle,
        output: &mut [u8],
    ) -> Result<usize, ErrorCode>;
    /// Generate fresh key material of `bits` into an allocated slot.
    ///
    /// `params` carries type-specific extra parameters and is empty for
    /// most key types.
    fn generate_key(
        &mut self,
        handle: KeyHandle,
        key_type: KeyType,
        bits: u32,
        params: &[u8],
    ) -> Result<(), ErrorCode>;
    /// The lifetime of a key slot.
    fn key_lifetime(&mut self, handle: KeyHandle) -> Result<Lifetime, ErrorCode>;
    /// Attach a usage policy to an empty slot.
    fn set_key_policy(&mut self, handle: KeyHandle, policy: KeyPolicy) -> Result<(), ErrorCode>;
    /// The usage policy of a key slot.
    fn key_policy(&mut self, handle: KeyHandle) -> Result<KeyPolicy, ErrorCode>;
    /// The type and bit size of the key in a slot.
    fn key_information(&mut self, handle: KeyHandle) -> Result<(KeyType, u32), ErrorCode>;

    // Derivation.

    /// Remaining capacity of a generator, in bytes.
    fn generator_capacity(&mut self, op: &Self::DerivationOp) -> Result<u32, ErrorCode>;
    /// Read the next `output.len()` bytes out of a generator.
    fn generator_read(
        &mut self,
        op: &mut Self::DerivationOp,
        output: &mut [u8],
    ) -> Result<(), ErrorCode>;
    /// Fill an allocated key slot from generator output.
    fn generator_import_key(
        &mut self,
        op: &mut Self::DerivationOp,
        handle: KeyHandle,
        key_type: KeyType,
        bits: u32,
    ) -> Result<(), ErrorCode>;
    /// Discard the generator state.
    fn generator_abort(&mut self, op: &mut Self::DerivationOp);
    /// Start a key derivation from a base key, salt and label.
    fn derive_key(
        &mut self,
        op: &mut Self::DerivationOp,
        handle: KeyHandle,
        alg: Algorithm,
        salt: &[u8],
        label: &[u8],
        capacity: u32,
    ) -> Result<(), ErrorCode>;
    /// Start a key-agreement derivation from a private key and a peer
    /// public key.
    fn key_agreement(
        &mut self,
        op: &mut Self::DerivationOp,
        handle: KeyHandle,
        peer_key: &[u8],
        alg: Algorithm,
    ) -> Result<(), ErrorCode>;

    // Randomness.

    /// Fill `output` with cryptographically secure random bytes.
    fn generate_random(&mut self, output: &mut [u8]) -> Result<(), ErrorCode>;
    /// Mix caller-supplied seed material into the entropy pool.
    fn inject_entropy(&mut self, seed: &[u8]) -> Result<(), ErrorCode>;
}
