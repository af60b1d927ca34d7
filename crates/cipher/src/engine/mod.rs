// Copyright (C) Microsoft Corporation. All rights reserved.

//! Cipher engine abstraction.
//!
//! A [`CipherEngine`] is the primitive a [`CipherOperation`] wraps: it owns the
//! key schedule and chaining state of one cipher context and exposes the
//! classic init / set key / set padding / set IV / update / finish / free
//! sequence. The engine is allowed two limitations the operation layer
//! compensates for:
//!
//! - In ECB mode it transforms at most [`CipherEngine::ecb_blocks_per_update`]
//!   blocks per call.
//! - In block buffering modes it may hold back input internally; the amount
//!   is reported by [`CipherEngine::unprocessed_len`].
//!
//! Engine errors use the engine-native [`EngineError`] taxonomy and are
//! translated to [`CipherError`] by a pure `From` conversion.
//!
//! # Platform Implementations
//!
//! - **OpenSSL** (`use-openssl` feature): [`OsslCipherEngine`]

use super::*;

cfg_if::cfg_if! {
    if #[cfg(feature = "use-openssl")] {
        mod engine_ossl;

        pub use engine_ossl::OsslCipherEngine;

        /// Engine used by [`CipherOperation`] when no engine type is named.
        pub type DefaultEngine = OsslCipherEngine;
    } else {
        compile_error!("No cipher engine backend selected; enable the `use-openssl` feature");
    }
}

/// Errors reported by a cipher engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The engine has no implementation of the requested primitive.
    #[error("feature unavailable")]
    FeatureUnavailable,
    /// Input data (key, IV or data length) is invalid for the primitive.
    #[error("bad input data")]
    BadInputData,
    /// A partial block was supplied where a full block is required.
    #[error("full block expected")]
    FullBlockExpected,
    /// Padding check failed during decryption.
    #[error("invalid padding")]
    InvalidPadding,
    /// Context allocation failed.
    #[error("allocation failed")]
    AllocFailed,
    /// The engine context is not initialized or has been freed.
    #[error("invalid context")]
    InvalidContext,
    /// Backend specific failure.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Translates an engine error into the operation error taxonomy.
///
/// Errors with a dedicated [`CipherError`] variant are mapped to it; every
/// other error is preserved inside [`CipherError::EngineFailure`].
impl From<EngineError> for CipherError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::FeatureUnavailable => CipherError::NotSupported,
            EngineError::BadInputData | EngineError::FullBlockExpected => {
                CipherError::InvalidArgument
            }
            EngineError::InvalidPadding => CipherError::InvalidPadding,
            EngineError::AllocFailed => CipherError::InsufficientMemory,
            err @ (EngineError::InvalidContext | EngineError::Backend(_)) => {
                CipherError::EngineFailure(err)
            }
        }
    }
}

/// Block or stream cipher engine wrapped by a [`CipherOperation`].
///
/// Implementations are single-context objects: one engine instance serves
/// exactly one operation, and all calls are serialized by the owner.
pub trait CipherEngine: Sized {
    /// Initializes an engine for the resolved configuration.
    ///
    /// # Errors
    ///
    /// - `EngineError::FeatureUnavailable` - the backend lacks the primitive
    /// - `EngineError::AllocFailed` - the context could not be allocated
    fn new(config: &EngineConfig) -> Result<Self, EngineError>;

    /// Runs the key schedule for the given direction.
    ///
    /// `key` has exactly `config.key_bits / 8` bytes.
    fn set_key(&mut self, key: &[u8], direction: Direction) -> Result<(), EngineError>;

    /// Selects the padding applied (encrypt) or removed (decrypt) at finish.
    fn set_padding(&mut self, padding: PaddingMode) -> Result<(), EngineError>;

    /// Installs the IV or nonce. `iv` has exactly `config.iv_len` bytes;
    /// modes without an IV receive an empty slice.
    fn set_iv(&mut self, iv: &[u8]) -> Result<(), EngineError>;

    /// Transforms `input`, writing the produced bytes to `output`.
    ///
    /// `output` holds at least `floor((unprocessed_len() + input.len()) /
    /// block) * block` bytes for block buffering modes and `input.len()` bytes
    /// otherwise. In ECB mode `input` is a whole number of blocks, at most
    /// [`Self::ecb_blocks_per_update`] of them.
    ///
    /// # Returns
    ///
    /// Number of bytes written to `output`.
    fn update(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize, EngineError>;

    /// Flushes the final block, applying or checking padding.
    ///
    /// `output` holds at least [`MAX_BLOCK_LENGTH`] bytes.
    fn finish(&mut self, output: &mut [u8]) -> Result<usize, EngineError>;

    /// Number of input bytes the engine has accepted but not yet transformed.
    fn unprocessed_len(&self) -> usize;

    /// Number of whole blocks a single ECB update call may carry.
    fn ecb_blocks_per_update(&self) -> usize {
        1
    }

    /// Releases the engine context. Further calls fail with
    /// `EngineError::InvalidContext`; calling `free` again is a no-op.
    fn free(&mut self);
}
