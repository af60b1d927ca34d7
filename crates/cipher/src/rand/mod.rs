// Copyright (C) Microsoft Corporation. All rights reserved.

//! Random byte sources used for IV generation.
//!
//! The random source is an explicit handle passed to the operations that need
//! it, so callers decide which generator backs IV generation and tests can
//! substitute a deterministic or failing source.
//!
//! # Platform Implementations
//!
//! - **OpenSSL** (`use-openssl` feature): [`OsslRng`]

use super::*;

cfg_if::cfg_if! {
    if #[cfg(feature = "use-openssl")] {
        mod rand_ossl;

        pub use rand_ossl::OsslRng;

        /// Random source backed by the selected platform library.
        pub type DefaultRng = OsslRng;
    } else {
        compile_error!("No random source backend selected; enable the `use-openssl` feature");
    }
}

/// Error reported by a random source that could not produce bytes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("random source failure")]
pub struct RngError;

impl From<RngError> for CipherError {
    fn from(_: RngError) -> Self {
        CipherError::InsufficientEntropy
    }
}

/// Source of cryptographically secure random bytes.
pub trait RandomSource {
    /// Fills `buf` completely with random bytes.
    ///
    /// # Errors
    ///
    /// Returns [`RngError`] if the source cannot produce the requested bytes;
    /// the buffer contents are unspecified in that case.
    fn fill_bytes(&mut self, buf: &mut [u8]) -> Result<(), RngError>;
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn fill_bytes(&mut self, buf: &mut [u8]) -> Result<(), RngError> {
        (**self).fill_bytes(buf)
    }
}

#[cfg(test)]
mod tests;
