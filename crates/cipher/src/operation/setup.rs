// Copyright (C) Microsoft Corporation. All rights reserved.

use super::*;

/// Length in bytes of one DES subkey, parity bits included.
const DES_SUBKEY_LENGTH: usize = 8;

impl<E: CipherEngine> CipherOperation<E> {
    /// Creates an operation set up for encryption.
    ///
    /// # Errors
    ///
    /// Any error of [`Self::encrypt_setup`]. The partially built operation is
    /// released before the error is returned.
    pub fn new_encrypt(
        attrs: KeyAttributes,
        key: &[u8],
        algorithm: CipherAlgorithm,
    ) -> Result<Self, CipherError> {
        let mut op = Self::default();
        op.encrypt_setup(attrs, key, algorithm)?;
        Ok(op)
    }

    /// Creates an operation set up for decryption.
    ///
    /// # Errors
    ///
    /// Any error of [`Self::decrypt_setup`]. The partially built operation is
    /// released before the error is returned.
    pub fn new_decrypt(
        attrs: KeyAttributes,
        key: &[u8],
        algorithm: CipherAlgorithm,
    ) -> Result<Self, CipherError> {
        let mut op = Self::default();
        op.decrypt_setup(attrs, key, algorithm)?;
        Ok(op)
    }

    /// Sets the operation up for encryption with `key` under `algorithm`.
    ///
    /// # Errors
    ///
    /// - `CipherError::BadState` - the operation is already set up
    /// - `CipherError::NotSupported` - no engine exists for the algorithm and key
    /// - `CipherError::InvalidArgument` - `key` does not hold `attrs.bits` bits
    /// - any translated engine error from key scheduling or padding selection
    ///
    /// After a failure the operation can still be aborted.
    pub fn encrypt_setup(
        &mut self,
        attrs: KeyAttributes,
        key: &[u8],
        algorithm: CipherAlgorithm,
    ) -> Result<(), CipherError> {
        self.setup(attrs, key, algorithm, Direction::Encrypt)
    }

    /// Sets the operation up for decryption with `key` under `algorithm`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::encrypt_setup`].
    pub fn decrypt_setup(
        &mut self,
        attrs: KeyAttributes,
        key: &[u8],
        algorithm: CipherAlgorithm,
    ) -> Result<(), CipherError> {
        self.setup(attrs, key, algorithm, Direction::Decrypt)
    }

    fn setup(
        &mut self,
        attrs: KeyAttributes,
        key: &[u8],
        algorithm: CipherAlgorithm,
        direction: Direction,
    ) -> Result<(), CipherError> {
        self.check_can_setup()?;

        // Recorded first so a failed setup can still be aborted.
        self.release_engine();
        self.wipe_residual();
        self.algorithm = Some(algorithm);
        self.direction = direction;
        self.block_size = 0;
        self.iv_size = 0;
        self.state = OperationState::Uninitialized;

        tracing::debug!(
            ?algorithm,
            key_type = ?attrs.key_type,
            bits = attrs.bits,
            ?direction,
            "cipher setup"
        );

        let config = EngineConfig::lookup(algorithm, attrs.key_type, attrs.bits)
            .ok_or(CipherError::NotSupported)?;
        if key.len() * 8 != attrs.bits {
            return Err(CipherError::InvalidArgument);
        }

        let engine = self.engine.insert(E::new(&config)?);

        if config.family == CipherFamily::TripleDes && key.len() == 2 * DES_SUBKEY_LENGTH {
            // Two-key Triple-DES: K3 = K1.
            let mut expanded = Zeroizing::new([0u8; 3 * DES_SUBKEY_LENGTH]);
            expanded[..key.len()].copy_from_slice(key);
            expanded[key.len()..].copy_from_slice(&key[..DES_SUBKEY_LENGTH]);
            engine.set_key(&expanded[..], direction)?;
        } else {
            engine.set_key(key, direction)?;
        }

        if let Some(padding) = algorithm.padding() {
            engine.set_padding(padding)?;
        }

        self.block_size = algorithm.block_size(attrs.key_type);
        self.iv_size = algorithm.iv_size(attrs.key_type);
        self.state = OperationState::Configured;
        Ok(())
    }
}
