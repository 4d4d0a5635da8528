//! Software implementation of the service's primitive engine.

use cryptcell_core::{CompositeKeyId, CryptoPrimitives, KeyHandle};
use cryptcell_proto::{Algorithm, ErrorCode, KeyPolicy, KeyType, Lifetime};
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

use crate::aead;
use crate::derive::DerivationOp;
use crate::hash::HashOp;
use crate::key_store::KeyStore;
use crate::mac::MacOp;
use crate::sign;

/// Streaming-cipher placeholder.
///
/// The crate's primitive stack has no multi-part unauthenticated cipher;
/// every cipher operation reports [`ErrorCode::NotSupported`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CipherOp;

/// Pure-software primitive engine.
///
/// Random output comes from the operating system, additionally masked by a
/// hash chain over caller-injected seed material.
#[derive(Default)]
pub struct SoftProvider {
    store: KeyStore,
    entropy_pool: [u8; 32],
    mask_counter: u64,
}

impl SoftProvider {
    /// Create a provider with an empty key store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live key slots.
    pub fn key_count(&self) -> usize {
        self.store.len()
    }

    fn filled_key(&self, handle: KeyHandle) -> Result<(KeyType, &[u8]), ErrorCode> {
        let slot = self.store.slot(handle)?;
        let key_type = slot.key_type.ok_or(ErrorCode::BadState)?;
        Ok((key_type, &slot.material))
    }

    fn validate_material(key_type: KeyType, material: &[u8]) -> Result<(), ErrorCode> {
        let valid = match key_type {
            KeyType::RawData => !material.is_empty(),
            KeyType::XChaCha20 | KeyType::Ed25519KeyPair | KeyType::Ed25519PublicKey => {
                material.len() == 32
            },
        };
        if !valid {
            return Err(ErrorCode::InvalidArgument);
        }
        if key_type == KeyType::Ed25519PublicKey {
            // Reject off-curve points at import time rather than at first use.
            sign::public_key(key_type, material)?;
        }
        Ok(())
    }
}

impl CryptoPrimitives for SoftProvider {
    type HashOp = HashOp;
    type MacOp = MacOp;
    type CipherOp = CipherOp;
    type DerivationOp = DerivationOp;

    fn init(&mut self) -> Result<(), ErrorCode> {
        tracing::debug!("software primitive engine ready");
        Ok(())
    }

    fn release(&mut self) {
        self.store.clear();
        tracing::debug!("software primitive engine released");
    }

    fn hash_setup(&mut self, op: &mut HashOp, alg: Algorithm) -> Result<(), ErrorCode> {
        op.setup(alg)
    }

    fn hash_update(&mut self, op: &mut HashOp, input: &[u8]) -> Result<(), ErrorCode> {
        op.update(input)
    }

    fn hash_finish(&mut self, op: &mut HashOp, digest: &mut [u8]) -> Result<usize, ErrorCode> {
        op.finish(digest)
    }

    fn hash_verify(&mut self, op: &mut HashOp, expected: &[u8]) -> Result<(), ErrorCode> {
        op.verify(expected)
    }

    fn hash_abort(&mut self, op: &mut HashOp) {
        *op = HashOp::default();
    }

    fn hash_clone(&mut self, source: &HashOp, target: &mut HashOp) -> Result<(), ErrorCode> {
        if matches!(source, HashOp::Idle) {
            return Err(ErrorCode::BadState);
        }
        *target = source.clone();
        Ok(())
    }

    fn mac_sign_setup(
        &mut self,
        op: &mut MacOp,
        handle: KeyHandle,
        alg: Algorithm,
    ) -> Result<(), ErrorCode> {
        let (_, key) = self.filled_key(handle)?;
        op.setup(alg, key)
    }

    fn mac_verify_setup(
        &mut self,
        op: &mut MacOp,
        handle: KeyHandle,
        alg: Algorithm,
    ) -> Result<(), ErrorCode> {
        let (_, key) = self.filled_key(handle)?;
        op.setup(alg, key)
    }

    fn mac_update(&mut self, op: &mut MacOp, input: &[u8]) -> Result<(), ErrorCode> {
        op.update(input)
    }

    fn mac_sign_finish(&mut self, op: &mut MacOp, mac: &mut [u8]) -> Result<usize, ErrorCode> {
        op.sign_finish(mac)
    }

    fn mac_verify_finish(&mut self, op: &mut MacOp, expected: &[u8]) -> Result<(), ErrorCode> {
        op.verify_finish(expected)
    }

    fn mac_abort(&mut self, op: &mut MacOp) {
        *op = MacOp::default();
    }

    fn cipher_encrypt_setup(
        &mut self,
        _op: &mut CipherOp,
        _handle: KeyHandle,
        _alg: Algorithm,
    ) -> Result<(), ErrorCode> {
        Err(ErrorCode::NotSupported)
    }

    fn cipher_decrypt_setup(
        &mut self,
        _op: &mut CipherOp,
        _handle: KeyHandle,
        _alg: Algorithm,
    ) -> Result<(), ErrorCode> {
        Err(ErrorCode::NotSupported)
    }

    fn cipher_generate_iv(
        &mut self,
        _op: &mut CipherOp,
        _iv: &mut [u8],
    ) -> Result<usize, ErrorCode> {
        Err(ErrorCode::NotSupported)
    }

    fn cipher_set_iv(&mut self, _op: &mut CipherOp, _iv: &[u8]) -> Result<(), ErrorCode> {
        Err(ErrorCode::NotSupported)
    }

    fn cipher_update(
        &mut self,
        _op: &mut CipherOp,
        _input: &[u8],
        _output: &mut [u8],
    ) -> Result<usize, ErrorCode> {
        Err(ErrorCode::NotSupported)
    }

    fn cipher_finish(
        &mut self,
        _op: &mut CipherOp,
        _output: &mut [u8],
    ) -> Result<usize, ErrorCode> {
        Err(ErrorCode::NotSupported)
    }

    fn cipher_abort(&mut self, _op: &mut CipherOp) {}

    fn asymmetric_sign(
        &mut self,
        handle: KeyHandle,
        alg: Algorithm,
        hash: &[u8],
        signature: &mut [u8],
    ) -> Result<usize, ErrorCode> {
        let (key_type, material) = self.filled_key(handle)?;
        sign::sign(alg, key_type, material, hash, signature)
    }

    fn asymmetric_verify(
        &mut self,
        handle: KeyHandle,
        alg: Algorithm,
        hash: &[u8],
        signature: &[u8],
    ) -> Result<(), ErrorCode> {
        let (key_type, material) = self.filled_key(handle)?;
        sign::verify(alg, key_type, material, hash, signature)
    }

    fn asymmetric_encrypt(
        &mut self,
        _handle: KeyHandle,
        _alg: Algorithm,
        _input: &[u8],
        _salt: &[u8],
        _output: &mut [u8],
    ) -> Result<usize, ErrorCode> {
        Err(ErrorCode::NotSupported)
    }

    fn asymmetric_decrypt(
        &mut self,
        _handle: KeyHandle,
        _alg: Algorithm,
        _input: &[u8],
        _salt: &[u8],
        _output: &mut [u8],
    ) -> Result<usize, ErrorCode> {
        Err(ErrorCode::NotSupported)
    }

    fn aead_encrypt(
        &mut self,
        handle: KeyHandle,
        alg: Algorithm,
        nonce: &[u8],
        additional_data: &[u8],
        plaintext: &[u8],
        ciphertext: &mut [u8],
    ) -> Result<usize, ErrorCode> {
        let (key_type, key) = self.filled_key(handle)?;
        if key_type != KeyType::XChaCha20 {
            return Err(ErrorCode::InvalidArgument);
        }
        aead::seal(alg, key, nonce, additional_data, plaintext, ciphertext)
    }

    fn aead_decrypt(
        &mut self,
        handle: KeyHandle,
        alg: Algorithm,
        nonce: &[u8],
        additional_data: &[u8],
        ciphertext: &[u8],
        plaintext: &mut [u8],
    ) -> Result<usize, ErrorCode> {
        let (key_type, key) = self.filled_key(handle)?;
        if key_type != KeyType::XChaCha20 {
            return Err(ErrorCode::InvalidArgument);
        }
        aead::open(alg, key, nonce, additional_data, ciphertext, plaintext)
    }

    fn allocate_key(&mut self) -> Result<KeyHandle, ErrorCode> {
        Ok(self.store.allocate())
    }

    fn create_key(
        &mut self,
        lifetime: Lifetime,
        id: CompositeKeyId,
    ) -> Result<KeyHandle, ErrorCode> {
        if lifetime != Lifetime::Persistent {
            return Err(ErrorCode::InvalidArgument);
        }
        self.store.create(lifetime, id)
    }

    fn open_key(&mut self, lifetime: Lifetime, id: CompositeKeyId) -> Result<KeyHandle, ErrorCode> {
        if lifetime != Lifetime::Persistent {
            return Err(ErrorCode::InvalidArgument);
        }
        self.store.open(id)
    }

    fn close_key(&mut self, handle: KeyHandle) -> Result<(), ErrorCode> {
        self.store.slot(handle).map(|_| ())
    }

    fn destroy_key(&mut self, handle: KeyHandle) -> Result<(), ErrorCode> {
        self.store.destroy(handle)
    }

    fn import_key(
        &mut self,
        handle: KeyHandle,
        key_type: KeyType,
        data: &[u8],
    ) -> Result<(), ErrorCode> {
        Self::validate_material(key_type, data)?;
        let bits = (data.len() * 8) as u32;
        self.store.slot_mut(handle)?.fill(key_type, bits, data.to_vec())
    }

    fn export_key(&mut self, handle: KeyHandle, output: &mut [u8]) -> Result<usize, ErrorCode> {
        let material = self.store.slot(handle)?.material()?;
        if output.len() < material.len() {
            return Err(ErrorCode::BufferTooSmall);
        }
        output[..material.len()].copy_from_slice(material);
        Ok(material.len())
    }

    fn export_public_key(
        &mut self,
        handle: KeyHandle,
        output: &mut [u8],
    ) -> Result<usize, ErrorCode> {
        let (key_type, material) = self.filled_key(handle)?;
        let public = sign::public_key(key_type, material)?;
        if output.len() < public.len() {
            return Err(ErrorCode::BufferTooSmall);
        }
        output[..public.len()].copy_from_slice(&public);
        Ok(public.len())
    }

    fn generate_key(
        &mut self,
        handle: KeyHandle,
        key_type: KeyType,
        bits: u32,
        _params: &[u8],
    ) -> Result<(), ErrorCode> {
        let bytes = match key_type {
            KeyType::RawData => {
                if bits == 0 || bits % 8 != 0 {
                    return Err(ErrorCode::InvalidArgument);
                }
                (bits / 8) as usize
            },
            KeyType::XChaCha20 | KeyType::Ed25519KeyPair => {
                if bits != 256 {
                    return Err(ErrorCode::InvalidArgument);
                }
                32
            },
            KeyType::Ed25519PublicKey => return Err(ErrorCode::InvalidArgument),
        };

        let mut material = vec![0u8; bytes];
        self.generate_random(&mut material)?;
        self.store.slot_mut(handle)?.fill(key_type, bits, material)
    }

    fn key_lifetime(&mut self, handle: KeyHandle) -> Result<Lifetime, ErrorCode> {
        Ok(self.store.slot(handle)?.lifetime)
    }

    fn set_key_policy(&mut self, handle: KeyHandle, policy: KeyPolicy) -> Result<(), ErrorCode> {
        let slot = self.store.slot_mut(handle)?;
        // Policy binds at fill time; changing it afterwards is rejected.
        if slot.key_type.is_some() {
            return Err(ErrorCode::AlreadyExists);
        }
        slot.policy = policy;
        Ok(())
    }

    fn key_policy(&mut self, handle: KeyHandle) -> Result<KeyPolicy, ErrorCode> {
        Ok(self.store.slot(handle)?.policy)
    }

    fn key_information(&mut self, handle: KeyHandle) -> Result<(KeyType, u32), ErrorCode> {
        let slot = self.store.slot(handle)?;
        let key_type = slot.key_type.ok_or(ErrorCode::BadState)?;
        Ok((key_type, slot.bits))
    }

    fn generator_capacity(&mut self, op: &DerivationOp) -> Result<u32, ErrorCode> {
        op.capacity()
    }

    fn generator_read(
        &mut self,
        op: &mut DerivationOp,
        output: &mut [u8],
    ) -> Result<(), ErrorCode> {
        op.read(output)
    }

    fn generator_import_key(
        &mut self,
        op: &mut DerivationOp,
        handle: KeyHandle,
        key_type: KeyType,
        bits: u32,
    ) -> Result<(), ErrorCode> {
        if bits == 0 || bits % 8 != 0 {
            return Err(ErrorCode::InvalidArgument);
        }
        let mut material = vec![0u8; (bits / 8) as usize];
        op.read(&mut material)?;
        Self::validate_material(key_type, &material)?;
        self.store.slot_mut(handle)?.fill(key_type, bits, material)
    }

    fn generator_abort(&mut self, op: &mut DerivationOp) {
        op.abort();
    }

    fn derive_key(
        &mut self,
        op: &mut DerivationOp,
        handle: KeyHandle,
        alg: Algorithm,
        salt: &[u8],
        label: &[u8],
        capacity: u32,
    ) -> Result<(), ErrorCode> {
        let secret = self.store.slot(handle)?.material()?;
        op.derive(alg, secret, salt, label, capacity)
    }

    fn key_agreement(
        &mut self,
        _op: &mut DerivationOp,
        _handle: KeyHandle,
        _peer_key: &[u8],
        _alg: Algorithm,
    ) -> Result<(), ErrorCode> {
        Err(ErrorCode::NotSupported)
    }

    fn generate_random(&mut self, output: &mut [u8]) -> Result<(), ErrorCode> {
        OsRng.fill_bytes(output);

        // Fold in caller-injected entropy: each 32-byte block of output is
        // masked by a hash over the pool and a monotone counter.
        for block in output.chunks_mut(32) {
            let mut hasher = Sha256::new();
            hasher.update(self.entropy_pool);
            hasher.update(self.mask_counter.to_le_bytes());
            self.mask_counter = self.mask_counter.wrapping_add(1);
            let mask = hasher.finalize();
            for (byte, mask_byte) in block.iter_mut().zip(mask.iter()) {
                *byte ^= mask_byte;
            }
        }
        Ok(())
    }

    fn inject_entropy(&mut self, seed: &[u8]) -> Result<(), ErrorCode> {
        if seed.is_empty() {
            return Err(ErrorCode::InvalidArgument);
        }
        let mut hasher = Sha256::new();
        hasher.update(self.entropy_pool);
        hasher.update(seed);
        self.entropy_pool = hasher.finalize().into();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_key(provider: &mut SoftProvider, data: &[u8]) -> KeyHandle {
        let handle = provider.allocate_key().unwrap();
        provider.import_key(handle, KeyType::RawData, data).unwrap();
        handle
    }

    #[test]
    fn mac_uses_stored_key_material() {
        let mut provider = SoftProvider::new();
        let handle = raw_key(&mut provider, b"Jefe");

        let mut op = MacOp::default();
        provider.mac_sign_setup(&mut op, handle, Algorithm::HmacSha256).unwrap();
        provider.mac_update(&mut op, b"what do ya want for nothing?").unwrap();

        let mut tag = [0u8; 32];
        provider.mac_sign_finish(&mut op, &mut tag).unwrap();
        assert_eq!(
            hex::encode(tag),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn aead_requires_matching_key_type() {
        let mut provider = SoftProvider::new();
        let handle = raw_key(&mut provider, &[1; 32]);

        let mut out = [0u8; 32];
        assert_eq!(
            provider.aead_encrypt(
                handle,
                Algorithm::XChaCha20Poly1305,
                &[1; 12],
                b"",
                b"hi",
                &mut out,
            ),
            Err(ErrorCode::InvalidArgument)
        );
    }

    #[test]
    fn generated_keypair_signs_and_exports_public() {
        let mut provider = SoftProvider::new();
        let handle = provider.allocate_key().unwrap();
        provider.generate_key(handle, KeyType::Ed25519KeyPair, 256, &[]).unwrap();

        let mut signature = [0u8; 64];
        provider.asymmetric_sign(handle, Algorithm::Ed25519, &[9; 32], &mut signature).unwrap();

        let mut public = [0u8; 32];
        assert_eq!(provider.export_public_key(handle, &mut public), Ok(32));

        let verify_handle = provider.allocate_key().unwrap();
        provider.import_key(verify_handle, KeyType::Ed25519PublicKey, &public).unwrap();
        provider
            .asymmetric_verify(verify_handle, Algorithm::Ed25519, &[9; 32], &signature)
            .unwrap();
    }

    #[test]
    fn generator_fills_key_slot_with_stream_bytes() {
        let mut provider = SoftProvider::new();
        let base = raw_key(&mut provider, b"base secret");
        let target = provider.allocate_key().unwrap();

        let mut op = DerivationOp::default();
        provider.derive_key(&mut op, base, Algorithm::HkdfSha256, b"salt", b"label", 64).unwrap();
        provider.generator_import_key(&mut op, target, KeyType::XChaCha20, 256).unwrap();

        assert_eq!(provider.key_information(target), Ok((KeyType::XChaCha20, 256)));
        assert_eq!(provider.generator_capacity(&op), Ok(32));
    }

    #[test]
    fn policy_is_frozen_once_slot_is_filled() {
        let mut provider = SoftProvider::new();
        let handle = raw_key(&mut provider, &[1; 16]);
        assert_eq!(
            provider.set_key_policy(handle, KeyPolicy::default()),
            Err(ErrorCode::AlreadyExists)
        );
    }

    #[test]
    fn release_clears_key_store() {
        let mut provider = SoftProvider::new();
        raw_key(&mut provider, &[1; 16]);
        assert_eq!(provider.key_count(), 1);

        provider.release();
        assert_eq!(provider.key_count(), 0);
    }

    #[test]
    fn random_output_varies() {
        let mut provider = SoftProvider::new();
        provider.inject_entropy(b"seed material").unwrap();

        let mut a = [0u8; 64];
        let mut b = [0u8; 64];
        provider.generate_random(&mut a).unwrap();
        provider.generate_random(&mut b).unwrap();
        assert_ne!(a, b);
    }
}
