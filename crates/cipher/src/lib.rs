// Copyright (C) Microsoft Corporation. All rights reserved.

//! Streaming cipher operations for HSM clients.
//!
//! This crate adapts a block or stream cipher engine, which only understands
//! whole blocks (and, in ECB mode, a single block per call), to a streaming
//! interface that accepts input of any length across any number of calls.
//!
//! - **Setup**: engine selection, key schedule (including the two-key
//!   Triple-DES expansion), padding selection, block and IV sizing
//! - **IV management**: exact-length IV installation and random IV generation
//! - **Update**: block-aligned streaming output with partial-block carry
//! - **Finish**: padding / alignment checks with a zeroized scratch block
//! - **Abort**: release of engine resources at any point of the lifecycle
//!
//! # Lifecycle
//!
//! ```text
//! encrypt_setup / decrypt_setup -> [set_iv | generate_iv] -> update* -> finish
//!                  \____________________ abort ______________________/
//! ```
//!
//! # Platform Support
//!
//! The default engine and random source are OpenSSL based and selected by the
//! `use-openssl` feature. Any type implementing [`CipherEngine`] can be used
//! in its place.

mod algorithm;
mod cipher;
mod engine;
mod operation;
mod rand;

pub use algorithm::*;
pub use cipher::*;
pub use engine::*;
pub use operation::*;
pub use rand::*;
use thiserror::Error;

/// Error type for all streaming cipher operations.
///
/// Every public operation returns either success or one of these variants.
/// Errors reported by the underlying engine are translated through
/// `From<EngineError>`; errors that have no dedicated variant are carried
/// verbatim in [`CipherError::EngineFailure`].
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CipherError {
    /// No engine configuration exists for the algorithm / key combination.
    #[error("algorithm not supported for this key")]
    NotSupported,
    /// An argument is invalid: wrong IV length, key length mismatch or a
    /// partial final block under a scheme without padding.
    #[error("invalid argument")]
    InvalidArgument,
    /// The output buffer is too small. Checked before any state is mutated,
    /// so the call can be retried with a larger buffer.
    #[error("output buffer too small")]
    BufferTooSmall,
    /// The operation is not in a state that allows the call.
    #[error("operation in bad state")]
    BadState,
    /// Padding verification failed while decrypting.
    #[error("invalid padding")]
    InvalidPadding,
    /// The random source failed to produce bytes.
    #[error("insufficient entropy")]
    InsufficientEntropy,
    /// The engine could not allocate its context.
    #[error("insufficient memory")]
    InsufficientMemory,
    /// Any other engine failure, cause preserved.
    #[error("cipher engine failure: {0}")]
    EngineFailure(EngineError),
}
