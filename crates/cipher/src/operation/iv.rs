// Copyright (C) Microsoft Corporation. All rights reserved.

use super::*;

impl<E: CipherEngine> CipherOperation<E> {
    /// Installs the IV or nonce.
    ///
    /// `iv` must be exactly [`Self::iv_size`] bytes; algorithms without an IV
    /// take an empty slice.
    ///
    /// # Errors
    ///
    /// - `CipherError::BadState` - not set up, or an IV is already installed
    /// - `CipherError::InvalidArgument` - wrong IV length
    /// - any translated engine error
    pub fn set_iv(&mut self, iv: &[u8]) -> Result<(), CipherError> {
        self.check_can_set_iv()?;
        if iv.len() != self.iv_size {
            return Err(CipherError::InvalidArgument);
        }

        self.engine_mut()?.set_iv(iv)?;
        self.state = OperationState::IvReady;
        Ok(())
    }

    /// Draws a random IV from `rng`, writes it to the front of `iv` and
    /// installs it.
    ///
    /// # Returns
    ///
    /// Number of IV bytes written, equal to [`Self::iv_size`].
    ///
    /// # Errors
    ///
    /// - `CipherError::BadState` - not set up, or an IV is already installed
    /// - `CipherError::BufferTooSmall` - `iv` is shorter than the IV size
    /// - `CipherError::InsufficientEntropy` - the random source failed
    pub fn generate_iv<R: RandomSource + ?Sized>(
        &mut self,
        rng: &mut R,
        iv: &mut [u8],
    ) -> Result<usize, CipherError> {
        self.check_can_set_iv()?;
        let iv_size = self.iv_size;
        if iv.len() < iv_size {
            return Err(CipherError::BufferTooSmall);
        }

        let iv = &mut iv[..iv_size];
        rng.fill_bytes(iv)?;
        self.set_iv(iv)?;
        Ok(iv_size)
    }
}
