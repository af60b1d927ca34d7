// Copyright (C) Microsoft Corporation. All rights reserved.

//! OpenSSL random byte source.

use super::*;

/// Random source drawing from OpenSSL's `RAND_bytes`.
///
/// Zero-sized; OpenSSL keeps the generator state process wide.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsslRng;

impl OsslRng {
    /// Creates a handle to the OpenSSL generator.
    pub fn new() -> Self {
        Self
    }
}

impl RandomSource for OsslRng {
    fn fill_bytes(&mut self, buf: &mut [u8]) -> Result<(), RngError> {
        openssl::rand::rand_bytes(buf).map_err(|openssl_error_stack| {
            tracing::error!(?openssl_error_stack);
            RngError
        })
    }
}
