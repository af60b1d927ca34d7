// Copyright (C) Microsoft Corporation. All rights reserved.

use super::*;

impl<E: CipherEngine> CipherOperation<E> {
    /// Releases the engine and wipes any buffered input.
    ///
    /// Safe at every point of the lifecycle, including after a failed setup
    /// or a completed finish. The operation can be set up again afterwards.
    ///
    /// # Errors
    ///
    /// `CipherError::BadState` if the operation was never set up or has
    /// already been aborted. Nothing is released in that case.
    pub fn abort(&mut self) -> Result<(), CipherError> {
        let Some(algorithm) = self.algorithm.take() else {
            return Err(CipherError::BadState);
        };

        self.release_engine();
        self.wipe_residual();
        self.block_size = 0;
        self.iv_size = 0;
        self.state = OperationState::Aborted;

        tracing::debug!(?algorithm, "cipher operation aborted");
        Ok(())
    }
}
