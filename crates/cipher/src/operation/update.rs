// Copyright (C) Microsoft Corporation. All rights reserved.

use super::*;

impl<E: CipherEngine> CipherOperation<E> {
    /// Encrypts or decrypts `input`, writing whatever output becomes
    /// available to `output`.
    ///
    /// With `output` set to `None` the call only reports the buffer size the
    /// same `input` would need.
    ///
    /// # Returns
    ///
    /// Bytes written to `output`, or the required size for a size query. For
    /// CBC decryption with padding the engine holds back the last block, so
    /// fewer bytes than the reported size may be written.
    ///
    /// # Errors
    ///
    /// - `CipherError::BadState` - not set up, IV missing, or already finished
    /// - `CipherError::BufferTooSmall` - `output` is too small; nothing changed
    /// - any translated engine error
    pub fn update(&mut self, input: &[u8], output: Option<&mut [u8]>) -> Result<usize, CipherError> {
        self.check_can_stream()?;
        let algorithm = self.algorithm.ok_or(CipherError::BadState)?;

        let expected_len = self.expected_output_length(algorithm, input.len());
        let Some(output) = output else {
            return Ok(expected_len);
        };
        if output.len() < expected_len {
            return Err(CipherError::BufferTooSmall);
        }

        let written = if algorithm == CipherAlgorithm::EcbNoPadding {
            self.update_ecb(input, output)?
        } else {
            self.engine_mut()?.update(input, output)?
        };

        self.state = OperationState::Streaming;
        Ok(written)
    }

    /// Allocating variant of [`Self::update`].
    pub fn update_vec(&mut self, input: &[u8]) -> Result<Vec<u8>, CipherError> {
        let len = self.update(input, None)?;
        let mut output = vec![0u8; len];
        let written = self.update(input, Some(&mut output))?;
        output.truncate(written);
        Ok(output)
    }

    /// Upper bound of the output an update of `input_len` bytes produces.
    ///
    /// Block buffering modes emit only whole blocks of the pending plus new
    /// input; every other mode emits one byte per input byte.
    fn expected_output_length(&self, algorithm: CipherAlgorithm, input_len: usize) -> usize {
        if !algorithm.buffers_blocks() || self.block_size == 0 {
            return input_len;
        }
        let total = self.pending_len(algorithm) + input_len;
        total - total % self.block_size
    }

    /// ECB path: the engine takes whole blocks only, and a bounded number of
    /// them per call.
    fn update_ecb(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize, CipherError> {
        let block_size = self.block_size;
        let engine = self.engine.as_mut().ok_or(CipherError::BadState)?;
        let batch_len = engine.ecb_blocks_per_update().max(1) * block_size;

        let mut input = input;
        let mut written = 0;

        if self.residual_len > 0 {
            let carried = self.residual_len;
            let take = (block_size - carried).min(input.len());
            self.residual[carried..carried + take].copy_from_slice(&input[..take]);
            self.residual_len += take;
            input = &input[take..];

            if self.residual_len < block_size {
                return Ok(0);
            }

            // A rejected block leaves the residual as it was before the call.
            match engine.update(&self.residual[..block_size], &mut output[..block_size]) {
                Ok(count) => written += count,
                Err(err) => {
                    self.residual[carried..].zeroize();
                    self.residual_len = carried;
                    return Err(err.into());
                }
            }
            self.residual.zeroize();
            self.residual_len = 0;
        }

        let (blocks, tail) = input.split_at(input.len() - input.len() % block_size);
        for batch in blocks.chunks(batch_len) {
            written += engine.update(batch, &mut output[written..written + batch.len()])?;
        }

        self.residual[..tail.len()].copy_from_slice(tail);
        self.residual_len = tail.len();
        Ok(written)
    }
}
