// Copyright (C) Microsoft Corporation. All rights reserved.

//! Deterministic engine used to observe how the operation drives an engine.
//!
//! The "cipher" XORs each byte with the key and IV, which is its own inverse,
//! but the engine enforces the same contract as a real backend: whole blocks
//! only in ECB mode (at most `ecb_batch` of them per call), block buffering
//! and held-back padding block in CBC mode, PKCS#7 at finish. Per-thread
//! hooks let a test inject failures and count engine calls.

use std::cell::Cell;
use std::cell::RefCell;

use super::*;

/// Engine entry point a failure can be injected into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    New,
    SetKey,
    SetPadding,
    SetIv,
    Update,
    Finish,
}

thread_local! {
    static FAILURE: RefCell<Option<(Stage, EngineError)>> = const { RefCell::new(None) };
    static ECB_BATCH: Cell<usize> = const { Cell::new(1) };
    static UPDATE_CALLS: Cell<usize> = const { Cell::new(0) };
    static FREE_CALLS: Cell<usize> = const { Cell::new(0) };
    static LAST_KEY: RefCell<Vec<u8>> = const { RefCell::new(Vec::new()) };
    static LAST_PADDING: Cell<Option<PaddingMode>> = const { Cell::new(None) };
}

/// Makes the next call to `stage` fail with `err`.
pub fn fail_at(stage: Stage, err: EngineError) {
    FAILURE.with(|failure| *failure.borrow_mut() = Some((stage, err)));
}

/// Sets how many ECB blocks engines created afterwards accept per update.
pub fn set_ecb_batch(blocks: usize) {
    ECB_BATCH.with(|batch| batch.set(blocks));
}

pub fn update_calls() -> usize {
    UPDATE_CALLS.with(Cell::get)
}

pub fn free_calls() -> usize {
    FREE_CALLS.with(Cell::get)
}

/// Key bytes most recently handed to `set_key`.
pub fn last_key() -> Vec<u8> {
    LAST_KEY.with(|key| key.borrow().clone())
}

/// Padding most recently selected through `set_padding`.
pub fn last_padding() -> Option<PaddingMode> {
    LAST_PADDING.with(Cell::get)
}

fn injected(stage: Stage) -> Result<(), EngineError> {
    FAILURE.with(|failure| {
        let mut failure = failure.borrow_mut();
        match failure.take() {
            Some((at, err)) if at == stage => Err(err),
            other => {
                *failure = other;
                Ok(())
            }
        }
    })
}

pub struct MockEngine {
    config: EngineConfig,
    ecb_batch: usize,
    key: Vec<u8>,
    iv: Vec<u8>,
    direction: Option<Direction>,
    padding: PaddingMode,
    pending: Vec<u8>,
    position: usize,
    freed: bool,
}

impl MockEngine {
    fn check_live(&self) -> Result<(), EngineError> {
        if self.freed || self.direction.is_none() {
            return Err(EngineError::InvalidContext);
        }
        Ok(())
    }

    fn keystream(&self, index: usize) -> u8 {
        let iv = if self.iv.is_empty() {
            0
        } else {
            self.iv[index % self.iv.len()]
        };
        self.key[index % self.key.len()] ^ iv ^ (index as u8)
    }

    /// Transforms `data` in place as the stream continues.
    fn apply(&mut self, data: &mut [u8]) {
        for byte in data.iter_mut() {
            let index = if self.config.mode == CipherMode::Ecb {
                self.position % self.config.block_size
            } else {
                self.position
            };
            *byte ^= self.keystream(index);
            self.position += 1;
        }
    }

    fn buffering(&self) -> bool {
        self.config.mode == CipherMode::Cbc
    }

    fn holds_back_last_block(&self) -> bool {
        self.direction == Some(Direction::Decrypt) && self.padding == PaddingMode::Pkcs7
    }
}

impl CipherEngine for MockEngine {
    fn new(config: &EngineConfig) -> Result<Self, EngineError> {
        injected(Stage::New)?;
        Ok(Self {
            config: *config,
            ecb_batch: ECB_BATCH.with(Cell::get),
            key: Vec::new(),
            iv: Vec::new(),
            direction: None,
            padding: PaddingMode::None,
            pending: Vec::new(),
            position: 0,
            freed: false,
        })
    }

    fn set_key(&mut self, key: &[u8], direction: Direction) -> Result<(), EngineError> {
        injected(Stage::SetKey)?;
        if self.freed {
            return Err(EngineError::InvalidContext);
        }
        if key.len() * 8 != self.config.key_bits {
            return Err(EngineError::BadInputData);
        }
        LAST_KEY.with(|last| *last.borrow_mut() = key.to_vec());
        self.key = key.to_vec();
        self.direction = Some(direction);
        Ok(())
    }

    fn set_padding(&mut self, padding: PaddingMode) -> Result<(), EngineError> {
        injected(Stage::SetPadding)?;
        self.check_live()?;
        LAST_PADDING.with(|last| last.set(Some(padding)));
        self.padding = padding;
        Ok(())
    }

    fn set_iv(&mut self, iv: &[u8]) -> Result<(), EngineError> {
        injected(Stage::SetIv)?;
        self.check_live()?;
        if iv.len() != self.config.iv_len {
            return Err(EngineError::BadInputData);
        }
        self.iv = iv.to_vec();
        self.position = 0;
        Ok(())
    }

    fn update(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize, EngineError> {
        injected(Stage::Update)?;
        self.check_live()?;
        UPDATE_CALLS.with(|calls| calls.set(calls.get() + 1));
        let block_size = self.config.block_size;

        if self.config.mode == CipherMode::Ecb {
            if input.is_empty() || input.len() % block_size != 0 {
                return Err(EngineError::FullBlockExpected);
            }
            if input.len() > self.ecb_batch * block_size || output.len() < input.len() {
                return Err(EngineError::BadInputData);
            }
            output[..input.len()].copy_from_slice(input);
            self.apply(&mut output[..input.len()]);
            return Ok(input.len());
        }

        if !self.buffering() {
            if output.len() < input.len() {
                return Err(EngineError::BadInputData);
            }
            output[..input.len()].copy_from_slice(input);
            self.apply(&mut output[..input.len()]);
            return Ok(input.len());
        }

        self.pending.extend_from_slice(input);
        let mut ready = self.pending.len() - self.pending.len() % block_size;
        if self.holds_back_last_block() && ready == self.pending.len() && ready > 0 {
            ready -= block_size;
        }
        if output.len() < ready {
            return Err(EngineError::BadInputData);
        }
        let mut blocks: Vec<u8> = self.pending.drain(..ready).collect();
        self.apply(&mut blocks);
        output[..ready].copy_from_slice(&blocks);
        Ok(ready)
    }

    fn finish(&mut self, output: &mut [u8]) -> Result<usize, EngineError> {
        injected(Stage::Finish)?;
        self.check_live()?;
        let block_size = self.config.block_size;
        if output.len() < MAX_BLOCK_LENGTH {
            return Err(EngineError::BadInputData);
        }

        if !self.buffering() {
            return Ok(0);
        }

        let mut tail = std::mem::take(&mut self.pending);
        match (self.direction, self.padding) {
            (Some(Direction::Encrypt), PaddingMode::Pkcs7) => {
                let pad = block_size - tail.len();
                tail.resize(block_size, pad as u8);
                self.apply(&mut tail);
                output[..block_size].copy_from_slice(&tail);
                Ok(block_size)
            }
            (Some(Direction::Decrypt), PaddingMode::Pkcs7) => {
                if tail.len() != block_size {
                    return Err(EngineError::FullBlockExpected);
                }
                self.apply(&mut tail);
                let pad = tail[block_size - 1] as usize;
                if pad == 0
                    || pad > block_size
                    || tail[block_size - pad..].iter().any(|&b| b as usize != pad)
                {
                    return Err(EngineError::InvalidPadding);
                }
                let len = block_size - pad;
                output[..len].copy_from_slice(&tail[..len]);
                Ok(len)
            }
            _ if !tail.is_empty() => Err(EngineError::FullBlockExpected),
            _ => Ok(0),
        }
    }

    fn unprocessed_len(&self) -> usize {
        self.pending.len()
    }

    fn ecb_blocks_per_update(&self) -> usize {
        self.ecb_batch
    }

    fn free(&mut self) {
        if !self.freed {
            FREE_CALLS.with(|calls| calls.set(calls.get() + 1));
        }
        self.freed = true;
        self.key.clear();
        self.pending.clear();
    }
}
