// Copyright (C) Microsoft Corporation. All rights reserved.

use super::*;

/// Lifecycle state of a [`CipherOperation`].
///
/// ```text
/// Uninitialized -> Configured -> IvReady -> Streaming -> Finalized
///                       \__________________________________/
///                       (algorithms without an IV skip IvReady)
/// ```
///
/// `Aborted` is reachable from every state that has an algorithm recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperationState {
    /// Not set up, or a setup attempt failed.
    #[default]
    Uninitialized,
    /// Key scheduled; waiting for an IV.
    Configured,
    /// IV installed; no data processed yet.
    IvReady,
    /// At least one update completed.
    Streaming,
    /// Finish completed; only abort or drop remain.
    Finalized,
    /// Aborted; the operation may be set up again.
    Aborted,
}

impl<E: CipherEngine> CipherOperation<E> {
    pub(super) fn check_can_setup(&self) -> Result<(), CipherError> {
        match self.state {
            OperationState::Uninitialized | OperationState::Aborted => Ok(()),
            state => {
                tracing::warn!(?state, "setup on an operation already in use");
                Err(CipherError::BadState)
            }
        }
    }

    pub(super) fn check_can_set_iv(&self) -> Result<(), CipherError> {
        match self.state {
            OperationState::Configured => Ok(()),
            _ => Err(CipherError::BadState),
        }
    }

    /// Update and finish need an IV unless the algorithm takes none.
    pub(super) fn check_can_stream(&self) -> Result<(), CipherError> {
        match self.state {
            OperationState::IvReady | OperationState::Streaming => Ok(()),
            OperationState::Configured if self.iv_size == 0 => Ok(()),
            _ => Err(CipherError::BadState),
        }
    }
}
