// Copyright (C) Microsoft Corporation. All rights reserved.

use super::*;

impl<E: CipherEngine> CipherOperation<E> {
    /// Completes the operation, flushing the final block.
    ///
    /// With `output` set to `None` the call only reports the largest output
    /// finish can produce.
    ///
    /// # Returns
    ///
    /// Bytes written to `output`: a full padding block when encrypting with
    /// PKCS#7, the unpadded tail when decrypting, 0 otherwise.
    ///
    /// # Errors
    ///
    /// - `CipherError::BadState` - not set up, IV missing, or already finished
    /// - `CipherError::InvalidArgument` - a partial block is pending under a
    ///   scheme without padding; nothing is written
    /// - `CipherError::BufferTooSmall` - `output` cannot hold the largest
    ///   possible final block; the operation is unchanged. For PKCS#7 that is
    ///   one block when encrypting and one block minus one byte when
    ///   decrypting, even if the unpadded tail turns out to be empty.
    /// - `CipherError::InvalidPadding` - padding check failed when decrypting
    /// - any other translated engine error
    pub fn finish(&mut self, output: Option<&mut [u8]>) -> Result<usize, CipherError> {
        self.check_can_stream()?;
        let algorithm = self.algorithm.ok_or(CipherError::BadState)?;

        let pending = self.pending_len(algorithm);
        if algorithm.requires_aligned_input() && pending != 0 {
            tracing::warn!(?algorithm, pending, "partial block at finish without padding");
            return Err(CipherError::InvalidArgument);
        }

        let max_len = self.max_finish_length(algorithm);
        let Some(output) = output else {
            return Ok(max_len);
        };
        if output.len() < max_len {
            return Err(CipherError::BufferTooSmall);
        }

        // Erased on every return path.
        let mut scratch = Zeroizing::new([0u8; MAX_BLOCK_LENGTH]);
        let produced = self.engine_mut()?.finish(&mut scratch[..])?;
        if produced > 0 {
            let dest = output
                .get_mut(..produced)
                .ok_or(CipherError::BufferTooSmall)?;
            dest.copy_from_slice(&scratch[..produced]);
        }

        self.wipe_residual();
        self.state = OperationState::Finalized;
        Ok(produced)
    }

    /// Allocating variant of [`Self::finish`].
    pub fn finish_vec(&mut self) -> Result<Vec<u8>, CipherError> {
        let len = self.finish(None)?;
        let mut output = vec![0u8; len];
        let written = self.finish(Some(&mut output))?;
        output.truncate(written);
        Ok(output)
    }

    /// Largest output finish can produce: one padding block when encrypting
    /// with PKCS#7, one block minus the minimal pad when decrypting, nothing
    /// otherwise.
    fn max_finish_length(&self, algorithm: CipherAlgorithm) -> usize {
        match (algorithm.padding(), self.direction) {
            (Some(PaddingMode::Pkcs7), Direction::Encrypt) => self.block_size,
            (Some(PaddingMode::Pkcs7), Direction::Decrypt) => self.block_size.saturating_sub(1),
            _ => 0,
        }
    }
}
