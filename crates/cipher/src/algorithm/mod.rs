// Copyright (C) Microsoft Corporation. All rights reserved.

//! Cipher algorithm, key type and engine configuration catalogue.
//!
//! A streaming cipher operation is identified by a [`CipherAlgorithm`] (the
//! mode of operation) and a key described by [`KeyAttributes`] (the cipher
//! family and its bit length). [`EngineConfig::lookup`] resolves the triple
//! to the configuration an engine is built from, or `None` when no engine
//! configuration exists for the combination.
//!
//! # Supported Combinations
//!
//! | Key type   | Bits          | Algorithms                                   |
//! |------------|---------------|----------------------------------------------|
//! | AES        | 128, 192, 256 | ECB, CBC (no padding / PKCS#7), CTR, CFB, OFB |
//! | Camellia   | 128, 192, 256 | ECB, CBC (no padding / PKCS#7), CTR, CFB, OFB |
//! | DES        | 64, 128, 192  | ECB, CBC (no padding / PKCS#7), CTR, CFB, OFB |
//! | ChaCha20   | 256           | stream cipher                                |
//!
//! The table above is what the catalogue accepts. An engine backend may still
//! lack an individual primitive (for example Camellia-CTR in OpenSSL), in which
//! case engine initialization reports it and setup fails with `NotSupported`.

/// Largest block length of any supported block cipher, in bytes.
pub const MAX_BLOCK_LENGTH: usize = 16;

/// Largest IV or nonce length of any supported algorithm, in bytes.
pub const MAX_IV_LENGTH: usize = 16;

/// Nonce length of the ChaCha20 stream cipher, in bytes.
pub const CHACHA20_NONCE_LENGTH: usize = 12;

/// Cipher algorithm (mode of operation) of a streaming operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CipherAlgorithm {
    /// Stream cipher with its own nonce (ChaCha20).
    StreamCipher,
    /// Counter mode over a block cipher.
    Ctr,
    /// Cipher feedback mode over a block cipher (full-block feedback).
    Cfb,
    /// Output feedback mode over a block cipher.
    Ofb,
    /// Raw electronic codebook mode; input must be block aligned at finish.
    EcbNoPadding,
    /// Cipher block chaining without padding; input must be block aligned at finish.
    CbcNoPadding,
    /// Cipher block chaining with PKCS#7 padding.
    CbcPkcs7,
}

impl CipherAlgorithm {
    /// Returns `true` for the stream cipher algorithm.
    pub fn is_stream_cipher(self) -> bool {
        matches!(self, CipherAlgorithm::StreamCipher)
    }

    /// Returns `true` for algorithms built on top of a block cipher.
    pub fn is_block_derived(self) -> bool {
        !self.is_stream_cipher()
    }

    /// Mode of operation the engine runs in.
    pub fn mode(self) -> CipherMode {
        match self {
            CipherAlgorithm::StreamCipher => CipherMode::Stream,
            CipherAlgorithm::Ctr => CipherMode::Ctr,
            CipherAlgorithm::Cfb => CipherMode::Cfb,
            CipherAlgorithm::Ofb => CipherMode::Ofb,
            CipherAlgorithm::EcbNoPadding => CipherMode::Ecb,
            CipherAlgorithm::CbcNoPadding | CipherAlgorithm::CbcPkcs7 => CipherMode::Cbc,
        }
    }

    /// Padding mode to program into the engine.
    ///
    /// Only the block chaining algorithms carry padding semantics; every other
    /// algorithm returns `None` and leaves the engine configuration unchanged.
    pub fn padding(self) -> Option<PaddingMode> {
        match self {
            CipherAlgorithm::CbcNoPadding => Some(PaddingMode::None),
            CipherAlgorithm::CbcPkcs7 => Some(PaddingMode::Pkcs7),
            _ => None,
        }
    }

    /// Returns `true` if a partial final block is a caller error.
    pub fn requires_aligned_input(self) -> bool {
        matches!(
            self,
            CipherAlgorithm::EcbNoPadding | CipherAlgorithm::CbcNoPadding
        )
    }

    /// Returns `true` if the mode only emits whole blocks and carries the
    /// remainder to the next call. CTR, CFB, OFB and the stream cipher emit
    /// one output byte per input byte.
    pub fn buffers_blocks(self) -> bool {
        matches!(self.mode(), CipherMode::Ecb | CipherMode::Cbc)
    }

    /// Block size the streaming operation aligns output to.
    ///
    /// The block length of the key type for ECB and CBC; 1 for the stream
    /// cipher and the byte-granular CTR, CFB and OFB modes.
    pub fn block_size(self, key_type: KeyType) -> usize {
        if self.buffers_blocks() {
            key_type.block_length()
        } else {
            1
        }
    }

    /// IV length the algorithm requires for the given key type.
    ///
    /// Block-derived algorithms other than raw ECB take one block; the stream
    /// cipher with a ChaCha20 key takes a 12-byte nonce; everything else has no
    /// IV.
    pub fn iv_size(self, key_type: KeyType) -> usize {
        if self.is_block_derived() && self != CipherAlgorithm::EcbNoPadding {
            key_type.block_length()
        } else if self.is_stream_cipher() && key_type == KeyType::ChaCha20 {
            CHACHA20_NONCE_LENGTH
        } else {
            0
        }
    }
}

/// Mode of operation as seen by an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CipherMode {
    Ecb,
    Cbc,
    Ctr,
    Cfb,
    Ofb,
    Stream,
}

/// Padding scheme applied by the engine at finalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PaddingMode {
    /// No padding; the final block must be complete.
    #[default]
    None,
    /// PKCS#7 padding.
    Pkcs7,
}

/// Direction of a cipher operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Encrypt,
    Decrypt,
}

/// Key type (cipher family) of the key material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyType {
    /// AES, 128/192/256-bit keys.
    Aes,
    /// Camellia, 128/192/256-bit keys.
    Camellia,
    /// DES family: 64-bit single DES, 128-bit two-key and 192-bit three-key
    /// Triple-DES. Bit lengths include the parity bits.
    Des,
    /// ChaCha20, 256-bit keys.
    ChaCha20,
}

impl KeyType {
    /// Block length of the cipher family in bytes; 1 for stream ciphers.
    pub fn block_length(self) -> usize {
        match self {
            KeyType::Aes | KeyType::Camellia => 16,
            KeyType::Des => 8,
            KeyType::ChaCha20 => 1,
        }
    }

    /// Returns `true` if `bits` is a valid key length for the family.
    pub fn is_valid_bits(self, bits: usize) -> bool {
        match self {
            KeyType::Aes | KeyType::Camellia => matches!(bits, 128 | 192 | 256),
            KeyType::Des => matches!(bits, 64 | 128 | 192),
            KeyType::ChaCha20 => bits == 256,
        }
    }

    /// Returns `true` if the family is a block cipher.
    pub fn is_block_cipher(self) -> bool {
        self.block_length() > 1
    }
}

/// Attributes of the key material handed to setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyAttributes {
    /// Cipher family of the key.
    pub key_type: KeyType,
    /// Key length in bits.
    pub bits: usize,
}

impl KeyAttributes {
    /// Creates key attributes for the given family and bit length.
    pub fn new(key_type: KeyType, bits: usize) -> Self {
        Self { key_type, bits }
    }
}

/// Primitive cipher an engine is instantiated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CipherFamily {
    Aes,
    Camellia,
    Des,
    /// Three-key Triple-DES (EDE3). Two-key keys are expanded before they
    /// reach the engine.
    TripleDes,
    ChaCha20,
}

/// Engine configuration resolved from an algorithm / key type / bit length
/// triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EngineConfig {
    /// Primitive cipher.
    pub family: CipherFamily,
    /// Mode of operation.
    pub mode: CipherMode,
    /// Key length the engine's key schedule expects, in bits.
    pub key_bits: usize,
    /// Native block length of the primitive.
    pub block_size: usize,
    /// IV (or nonce) length accepted by the engine's IV installation.
    pub iv_len: usize,
}

impl EngineConfig {
    /// Resolves the engine configuration for an algorithm and key.
    ///
    /// # Returns
    ///
    /// `None` if the bit length is invalid for the key type, or the algorithm
    /// cannot be used with the key type (stream algorithm with a block cipher
    /// key or vice versa).
    pub fn lookup(algorithm: CipherAlgorithm, key_type: KeyType, bits: usize) -> Option<Self> {
        if !key_type.is_valid_bits(bits) {
            return None;
        }
        if algorithm.is_stream_cipher() == key_type.is_block_cipher() {
            return None;
        }

        let (family, key_bits) = match (key_type, bits) {
            (KeyType::Aes, _) => (CipherFamily::Aes, bits),
            (KeyType::Camellia, _) => (CipherFamily::Camellia, bits),
            (KeyType::Des, 64) => (CipherFamily::Des, 64),
            (KeyType::Des, _) => (CipherFamily::TripleDes, 192),
            (KeyType::ChaCha20, _) => (CipherFamily::ChaCha20, bits),
        };

        Some(Self {
            family,
            mode: algorithm.mode(),
            key_bits,
            block_size: key_type.block_length(),
            iv_len: algorithm.iv_size(key_type),
        })
    }
}
