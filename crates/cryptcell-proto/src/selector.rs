//! Per-family operation selectors.
//!
//! Each call message carries a u32 selector in its request structure. The
//! values are grouped per family (high byte = family) and are part of the
//! wire contract. Unknown selectors within a known family decode to
//! [`ErrorCode::NotSupported`], a recoverable outcome.

use crate::ErrorCode;

macro_rules! selector_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $( $(#[$vmeta:meta])* $variant:ident = $value:expr ),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// Wire value of this selector.
            pub fn to_u32(self) -> u32 {
                match self {
                    $( Self::$variant => $value, )+
                }
            }
        }

        impl TryFrom<u32> for $name {
            type Error = ErrorCode;

            fn try_from(raw: u32) -> Result<Self, Self::Error> {
                match raw {
                    $( $value => Ok(Self::$variant), )+
                    _ => Err(ErrorCode::NotSupported),
                }
            }
        }
    };
}

selector_enum! {
    /// MAC family operations.
    MacSelector {
        /// Bind a MAC signing operation to a key.
        SignSetup = 0x0101,
        /// Bind a MAC verification operation to a key.
        VerifySetup = 0x0102,
        /// Feed input bytes (chunked).
        Update = 0x0103,
        /// Produce the MAC.
        SignFinish = 0x0104,
        /// Compare against a caller-supplied MAC.
        VerifyFinish = 0x0105,
        /// Discard the operation state.
        Abort = 0x0106,
    }
}

selector_enum! {
    /// Hash family operations.
    HashSelector {
        /// Start a hash computation (unkeyed, no permission check).
        Setup = 0x0201,
        /// Feed input bytes (chunked).
        Update = 0x0202,
        /// Produce the digest.
        Finish = 0x0203,
        /// Compare against a caller-supplied digest.
        Verify = 0x0204,
        /// Discard the operation state.
        Abort = 0x0205,
        /// Reserve a clone slot for this in-progress hash.
        CloneBegin = 0x0206,
        /// Clone a reserved source state into this connection's operation.
        CloneEnd = 0x0207,
    }
}

selector_enum! {
    /// Symmetric cipher family operations.
    CipherSelector {
        /// Bind an encryption operation to a key.
        EncryptSetup = 0x0301,
        /// Bind a decryption operation to a key.
        DecryptSetup = 0x0302,
        /// Generate and return a fresh IV.
        GenerateIv = 0x0303,
        /// Set a caller-supplied IV.
        SetIv = 0x0304,
        /// Transform one block of input.
        Update = 0x0305,
        /// Finalize and emit remaining output.
        Finish = 0x0306,
        /// Discard the operation state.
        Abort = 0x0307,
    }
}

selector_enum! {
    /// Asymmetric family operations (one-shot).
    AsymmetricSelector {
        /// Sign a pre-computed hash.
        Sign = 0x0401,
        /// Verify a signature over a pre-computed hash.
        Verify = 0x0402,
        /// Public-key encrypt.
        Encrypt = 0x0403,
        /// Private-key decrypt.
        Decrypt = 0x0404,
    }
}

selector_enum! {
    /// AEAD family operations (one-shot).
    AeadSelector {
        /// Authenticated encryption.
        Encrypt = 0x0501,
        /// Authenticated decryption.
        Decrypt = 0x0502,
    }
}

selector_enum! {
    /// Key management family operations.
    KeySelector {
        /// Query a key's lifetime.
        GetLifetime = 0x0601,
        /// Attach a usage policy to a key slot.
        SetPolicy = 0x0602,
        /// Read back a key slot's usage policy.
        GetPolicy = 0x0603,
        /// Import caller-supplied key material.
        Import = 0x0604,
        /// Destroy a key and unregister its handle.
        Destroy = 0x0605,
        /// Query a key's type and bit size.
        GetInformation = 0x0606,
        /// Export key material.
        Export = 0x0607,
        /// Export the public half of a key pair.
        ExportPublic = 0x0608,
        /// Generate fresh key material into a slot.
        Generate = 0x0609,
        /// Allocate an empty volatile key slot.
        Allocate = 0x060A,
        /// Create a persistent key named by a composite identifier.
        Create = 0x060B,
        /// Open an existing persistent key.
        Open = 0x060C,
        /// Close a handle without destroying the key.
        Close = 0x060D,
    }
}

selector_enum! {
    /// Generator / derivation family operations.
    GeneratorSelector {
        /// Query remaining generator capacity.
        GetCapacity = 0x0701,
        /// Read bytes out of the generator stream.
        Read = 0x0702,
        /// Import generator output into a key slot.
        ImportKey = 0x0703,
        /// Discard the generator state.
        Abort = 0x0704,
        /// Set up key derivation from a base key.
        Derive = 0x0705,
        /// Set up key agreement with a peer private key.
        KeyAgreement = 0x0706,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mac_selector_round_trip() {
        for sel in [
            MacSelector::SignSetup,
            MacSelector::VerifySetup,
            MacSelector::Update,
            MacSelector::SignFinish,
            MacSelector::VerifyFinish,
            MacSelector::Abort,
        ] {
            assert_eq!(MacSelector::try_from(sel.to_u32()), Ok(sel));
        }
    }

    #[test]
    fn unknown_selector_is_not_supported() {
        assert_eq!(MacSelector::try_from(0x9999), Err(ErrorCode::NotSupported));
        assert_eq!(HashSelector::try_from(0x0101), Err(ErrorCode::NotSupported));
        assert_eq!(KeySelector::try_from(0), Err(ErrorCode::NotSupported));
    }

    #[test]
    fn hash_clone_selectors_are_stable() {
        // Wire contract values; callers depend on them.
        assert_eq!(HashSelector::CloneBegin.to_u32(), 0x0206);
        assert_eq!(HashSelector::CloneEnd.to_u32(), 0x0207);
    }
}
