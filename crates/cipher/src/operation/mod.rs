// Copyright (C) Microsoft Corporation. All rights reserved.

//! Streaming cipher operation.
//!
//! [`CipherOperation`] owns one engine instance and adapts it to a streaming
//! interface:
//!
//! - input of any length can be fed across any number of [`update`] calls
//! - output is aligned to whole blocks for the block buffering modes
//! - the ECB path feeds the engine at most
//!   [`CipherEngine::ecb_blocks_per_update`] blocks per call and carries the
//!   partial tail in a zeroizing residual buffer
//! - [`finish`] applies or checks padding and rejects a partial block under
//!   the schemes without padding
//!
//! Output buffers are passed as `Option<&mut [u8]>`; `None` turns the call
//! into a size query that does not change the operation.
//!
//! [`update`]: CipherOperation::update
//! [`finish`]: CipherOperation::finish

mod abort;
mod finish;
mod iv;
mod setup;
mod state;
mod update;

pub use state::OperationState;
use zeroize::Zeroize;
use zeroize::Zeroizing;

use super::*;

/// A single in-flight encryption or decryption.
///
/// The operation exclusively owns its engine; methods take `&mut self` and
/// sharing one operation between threads requires external serialization.
/// Dropping the operation releases the engine and wipes buffered input.
pub struct CipherOperation<E: CipherEngine = DefaultEngine> {
    /// Algorithm recorded at setup; `None` before setup and after abort.
    algorithm: Option<CipherAlgorithm>,

    direction: Direction,

    /// Output alignment in bytes; 1 for the byte-granular modes.
    block_size: usize,

    /// Exact IV length `set_iv` accepts.
    iv_size: usize,

    engine: Option<E>,

    /// Partial ECB block carried between updates.
    residual: Zeroizing<[u8; MAX_BLOCK_LENGTH]>,

    /// Bytes used in `residual`; always smaller than `block_size`.
    residual_len: usize,

    state: OperationState,
}

impl<E: CipherEngine> Default for CipherOperation<E> {
    fn default() -> Self {
        Self {
            algorithm: None,
            direction: Direction::Encrypt,
            block_size: 0,
            iv_size: 0,
            engine: None,
            residual: Zeroizing::new([0u8; MAX_BLOCK_LENGTH]),
            residual_len: 0,
            state: OperationState::Uninitialized,
        }
    }
}

impl<E: CipherEngine> CipherOperation<E> {
    /// Algorithm the operation was set up with, if any.
    pub fn algorithm(&self) -> Option<CipherAlgorithm> {
        self.algorithm
    }

    /// Direction the operation was set up for.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Block size output is aligned to: the cipher block length for ECB and
    /// CBC, 1 for CTR, CFB, OFB and the stream cipher, 0 before setup.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// IV length required by [`Self::set_iv`].
    pub fn iv_size(&self) -> usize {
        self.iv_size
    }

    /// Current lifecycle state.
    pub fn state(&self) -> OperationState {
        self.state
    }

    fn engine_mut(&mut self) -> Result<&mut E, CipherError> {
        self.engine.as_mut().ok_or(CipherError::BadState)
    }

    /// Input accepted but not yet emitted, whether carried by the ECB path or
    /// buffered inside the engine.
    fn pending_len(&self, algorithm: CipherAlgorithm) -> usize {
        if algorithm == CipherAlgorithm::EcbNoPadding {
            self.residual_len
        } else {
            self.engine.as_ref().map_or(0, |engine| engine.unprocessed_len())
        }
    }

    fn wipe_residual(&mut self) {
        self.residual.zeroize();
        self.residual_len = 0;
    }

    fn release_engine(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            engine.free();
        }
    }
}

impl<E: CipherEngine> Drop for CipherOperation<E> {
    fn drop(&mut self) {
        self.release_engine();
        self.wipe_residual();
    }
}

#[cfg(test)]
mod tests;
