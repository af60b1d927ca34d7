// Copyright (C) Microsoft Corporation. All rights reserved.

//! OpenSSL-based cipher engine.
//!
//! This module implements [`CipherEngine`] on top of OpenSSL's `EVP_CIPHER_CTX`
//! (via [`openssl::cipher_ctx::CipherCtx`]). The cipher, key and IV are
//! installed in separate init calls, which OpenSSL supports by passing `None`
//! for the parts that are not being changed.
//!
//! # Backend Notes
//!
//! - OpenSSL buffers partial blocks internally in ECB/CBC mode and, when
//!   decrypting with padding, keeps the last complete block until finalization.
//!   The engine tracks the difference between bytes accepted and bytes emitted
//!   so [`CipherEngine::unprocessed_len`] reflects that buffering.
//! - OpenSSL's ChaCha20 takes a 16-byte IV made of a 32-bit little endian block
//!   counter followed by the 12-byte nonce. The engine accepts the 12-byte nonce
//!   and starts the counter at zero.
//! - Single DES lives in OpenSSL 3's legacy provider. Engine creation binds
//!   the cipher to the context once, so a cipher the loaded providers cannot
//!   supply is reported as `EngineError::FeatureUnavailable`.

use openssl::cipher::Cipher;
use openssl::cipher::CipherRef;
use openssl::cipher_ctx::CipherCtx;
use zeroize::Zeroizing;

use super::*;

/// OpenSSL cipher context wrapped as a [`CipherEngine`].
///
/// # Thread Safety
///
/// The engine is `Send` but not meant to be shared; the owning operation
/// serializes all calls.
pub struct OsslCipherEngine {
    /// OpenSSL cipher selected from the engine configuration.
    cipher: &'static CipherRef,

    /// Live context; `None` once freed.
    ctx: Option<CipherCtx>,

    /// Direction of the key schedule; `None` until `set_key` succeeds.
    direction: Option<Direction>,

    /// Padding re-applied after every context (re)initialization.
    padding: PaddingMode,

    /// Whether the mode buffers partial blocks.
    buffering: bool,

    /// Whether the cipher is ChaCha20, whose IV carries a block counter.
    chacha20: bool,

    /// Bytes accepted by `update` but not yet emitted.
    unprocessed: usize,
}

impl OsslCipherEngine {
    /// Maps an engine configuration to the OpenSSL cipher implementing it.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::FeatureUnavailable` for combinations OpenSSL does
    /// not provide: Camellia-CTR, Triple-DES-CTR and single DES outside ECB
    /// and CBC.
    fn cipher(config: &EngineConfig) -> Result<&'static CipherRef, EngineError> {
        let cipher = match (config.family, config.key_bits, config.mode) {
            (CipherFamily::Aes, 128, CipherMode::Ecb) => Cipher::aes_128_ecb(),
            (CipherFamily::Aes, 128, CipherMode::Cbc) => Cipher::aes_128_cbc(),
            (CipherFamily::Aes, 128, CipherMode::Ctr) => Cipher::aes_128_ctr(),
            (CipherFamily::Aes, 128, CipherMode::Cfb) => Cipher::aes_128_cfb128(),
            (CipherFamily::Aes, 128, CipherMode::Ofb) => Cipher::aes_128_ofb(),
            (CipherFamily::Aes, 192, CipherMode::Ecb) => Cipher::aes_192_ecb(),
            (CipherFamily::Aes, 192, CipherMode::Cbc) => Cipher::aes_192_cbc(),
            (CipherFamily::Aes, 192, CipherMode::Ctr) => Cipher::aes_192_ctr(),
            (CipherFamily::Aes, 192, CipherMode::Cfb) => Cipher::aes_192_cfb128(),
            (CipherFamily::Aes, 192, CipherMode::Ofb) => Cipher::aes_192_ofb(),
            (CipherFamily::Aes, 256, CipherMode::Ecb) => Cipher::aes_256_ecb(),
            (CipherFamily::Aes, 256, CipherMode::Cbc) => Cipher::aes_256_cbc(),
            (CipherFamily::Aes, 256, CipherMode::Ctr) => Cipher::aes_256_ctr(),
            (CipherFamily::Aes, 256, CipherMode::Cfb) => Cipher::aes_256_cfb128(),
            (CipherFamily::Aes, 256, CipherMode::Ofb) => Cipher::aes_256_ofb(),
            (CipherFamily::Camellia, 128, CipherMode::Ecb) => Cipher::camellia128_ecb(),
            (CipherFamily::Camellia, 128, CipherMode::Cbc) => Cipher::camellia128_cbc(),
            (CipherFamily::Camellia, 128, CipherMode::Cfb) => Cipher::camellia128_cfb128(),
            (CipherFamily::Camellia, 128, CipherMode::Ofb) => Cipher::camellia128_ofb(),
            (CipherFamily::Camellia, 192, CipherMode::Ecb) => Cipher::camellia192_ecb(),
            (CipherFamily::Camellia, 192, CipherMode::Cbc) => Cipher::camellia192_cbc(),
            (CipherFamily::Camellia, 192, CipherMode::Cfb) => Cipher::camellia192_cfb128(),
            (CipherFamily::Camellia, 192, CipherMode::Ofb) => Cipher::camellia192_ofb(),
            (CipherFamily::Camellia, 256, CipherMode::Ecb) => Cipher::camellia256_ecb(),
            (CipherFamily::Camellia, 256, CipherMode::Cbc) => Cipher::camellia256_cbc(),
            (CipherFamily::Camellia, 256, CipherMode::Cfb) => Cipher::camellia256_cfb128(),
            (CipherFamily::Camellia, 256, CipherMode::Ofb) => Cipher::camellia256_ofb(),
            (CipherFamily::Des, 64, CipherMode::Ecb) => Cipher::des_ecb(),
            (CipherFamily::Des, 64, CipherMode::Cbc) => Cipher::des_cbc(),
            (CipherFamily::TripleDes, 192, CipherMode::Ecb) => Cipher::des_ede3_ecb(),
            (CipherFamily::TripleDes, 192, CipherMode::Cbc) => Cipher::des_ede3_cbc(),
            (CipherFamily::TripleDes, 192, CipherMode::Cfb) => Cipher::des_ede3_cfb64(),
            (CipherFamily::TripleDes, 192, CipherMode::Ofb) => Cipher::des_ede3_ofb(),
            (CipherFamily::ChaCha20, 256, CipherMode::Stream) => Cipher::chacha20(),
            _ => return Err(EngineError::FeatureUnavailable),
        };
        Ok(cipher)
    }

    fn ctx_mut(&mut self) -> Result<&mut CipherCtx, EngineError> {
        self.ctx.as_mut().ok_or(EngineError::InvalidContext)
    }

    /// (Re)initializes the context in the scheduled direction and re-applies
    /// the padding setting, which OpenSSL ties to the init call.
    fn init(
        &mut self,
        cipher: Option<&CipherRef>,
        key: Option<&[u8]>,
        iv: Option<&[u8]>,
    ) -> Result<(), EngineError> {
        let direction = self.direction.ok_or(EngineError::InvalidContext)?;
        let pad = self.padding == PaddingMode::Pkcs7;
        let ctx = self.ctx_mut()?;
        let result = match direction {
            Direction::Encrypt => ctx.encrypt_init(cipher, key, iv),
            Direction::Decrypt => ctx.decrypt_init(cipher, key, iv),
        };
        result.map_err(|openssl_error_stack| {
            tracing::error!(?openssl_error_stack);
            EngineError::Backend(openssl_error_stack.to_string())
        })?;
        ctx.set_padding(pad);
        self.unprocessed = 0;
        Ok(())
    }
}

impl CipherEngine for OsslCipherEngine {
    fn new(config: &EngineConfig) -> Result<Self, EngineError> {
        let cipher = Self::cipher(config)?;
        let mut ctx = CipherCtx::new().map_err(|openssl_error_stack| {
            tracing::error!(?openssl_error_stack);
            EngineError::AllocFailed
        })?;

        // Binding the cipher without a key fetches its implementation.
        ctx.encrypt_init(Some(cipher), None, None)
            .map_err(|openssl_error_stack| {
                tracing::warn!(?openssl_error_stack, "cipher not provided by OpenSSL");
                EngineError::FeatureUnavailable
            })?;

        Ok(Self {
            cipher,
            ctx: Some(ctx),
            direction: None,
            padding: PaddingMode::None,
            buffering: matches!(config.mode, CipherMode::Ecb | CipherMode::Cbc),
            chacha20: config.family == CipherFamily::ChaCha20,
            unprocessed: 0,
        })
    }

    fn set_key(&mut self, key: &[u8], direction: Direction) -> Result<(), EngineError> {
        if key.len() != self.cipher.key_length() {
            return Err(EngineError::BadInputData);
        }
        let cipher = self.cipher;
        self.direction = Some(direction);
        self.init(Some(cipher), Some(key), None)
    }

    fn set_padding(&mut self, padding: PaddingMode) -> Result<(), EngineError> {
        let pad = padding == PaddingMode::Pkcs7;
        self.ctx_mut()?.set_padding(pad);
        self.padding = padding;
        Ok(())
    }

    fn set_iv(&mut self, iv: &[u8]) -> Result<(), EngineError> {
        let native_len = self.cipher.iv_length();
        if native_len == 0 {
            return if iv.is_empty() {
                Ok(())
            } else {
                Err(EngineError::BadInputData)
            };
        }

        if self.chacha20 {
            if iv.len() != CHACHA20_NONCE_LENGTH {
                return Err(EngineError::BadInputData);
            }
            let mut counter_and_nonce = Zeroizing::new([0u8; 16]);
            counter_and_nonce[16 - CHACHA20_NONCE_LENGTH..].copy_from_slice(iv);
            return self.init(None, None, Some(&counter_and_nonce[..]));
        }

        if iv.len() != native_len {
            return Err(EngineError::BadInputData);
        }
        self.init(None, None, Some(iv))
    }

    fn update(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize, EngineError> {
        let block_size = self.cipher.block_size();
        let ctx = self.ctx_mut()?;

        // OpenSSL wants one spare block of output space; stage the result so
        // the caller's buffer only has to fit what is actually produced.
        let mut staged = Zeroizing::new(vec![0u8; input.len() + block_size]);
        let count = ctx
            .cipher_update(input, Some(&mut staged[..]))
            .map_err(|openssl_error_stack| {
                tracing::error!(?openssl_error_stack);
                EngineError::Backend(openssl_error_stack.to_string())
            })?;

        if count > output.len() {
            return Err(EngineError::BadInputData);
        }
        output[..count].copy_from_slice(&staged[..count]);

        if self.buffering {
            self.unprocessed = (self.unprocessed + input.len()).saturating_sub(count);
        }
        Ok(count)
    }

    fn finish(&mut self, output: &mut [u8]) -> Result<usize, EngineError> {
        let block_size = self.cipher.block_size();
        if output.len() < block_size {
            return Err(EngineError::BadInputData);
        }

        // A padded decryption must end on exactly one held-back block; a
        // mode without padding must end on a block boundary.
        let decrypt_padded =
            self.direction == Some(Direction::Decrypt) && self.padding == PaddingMode::Pkcs7;
        let tail_error = if decrypt_padded {
            if self.unprocessed == block_size {
                Some(EngineError::InvalidPadding)
            } else {
                Some(EngineError::FullBlockExpected)
            }
        } else if self.buffering && self.padding == PaddingMode::None && self.unprocessed != 0 {
            Some(EngineError::FullBlockExpected)
        } else {
            None
        };

        let ctx = self.ctx_mut()?;
        let count = ctx.cipher_final(output).map_err(|openssl_error_stack| {
            tracing::error!(?openssl_error_stack);
            tail_error.unwrap_or_else(|| EngineError::Backend(openssl_error_stack.to_string()))
        })?;
        self.unprocessed = 0;
        Ok(count)
    }

    fn unprocessed_len(&self) -> usize {
        self.unprocessed
    }

    fn free(&mut self) {
        self.ctx = None;
        self.direction = None;
        self.unprocessed = 0;
    }
}
