// Copyright (C) Microsoft Corporation. All rights reserved.

//! Single-call encryption and decryption.
//!
//! [`Cipher`] runs a complete [`CipherOperation`] over one message. The IV is
//! generated on encryption and carried in front of the ciphertext:
//!
//! ```text
//! IV (iv_size bytes) || ciphertext
//! ```
//!
//! Algorithms without an IV produce the bare ciphertext. As everywhere in
//! this crate, passing `None` as output returns the required buffer size.

use super::*;

/// Single-call cipher wrapper.
pub struct Cipher;

impl Cipher {
    /// Encrypts `input` with a freshly generated IV using the default engine.
    ///
    /// # Arguments
    ///
    /// * `rng` - Random source for the IV
    /// * `attrs` - Key type and bit length
    /// * `key` - Raw key bytes
    /// * `algorithm` - Cipher algorithm
    /// * `input` - Plaintext
    /// * `output` - Output buffer for `IV || ciphertext`. If `None`, only
    ///   calculates the required size.
    ///
    /// # Returns
    ///
    /// Bytes written to `output`, or the required size if `output` is `None`.
    ///
    /// # Errors
    ///
    /// Any error of the setup, IV, update or finish stages. `BufferTooSmall`
    /// is reported before anything is written.
    pub fn encrypt<R: RandomSource + ?Sized>(
        rng: &mut R,
        attrs: KeyAttributes,
        key: &[u8],
        algorithm: CipherAlgorithm,
        input: &[u8],
        output: Option<&mut [u8]>,
    ) -> Result<usize, CipherError> {
        Self::encrypt_with::<DefaultEngine, R>(rng, attrs, key, algorithm, input, output)
    }

    /// Allocating variant of [`Self::encrypt`].
    pub fn encrypt_vec<R: RandomSource + ?Sized>(
        rng: &mut R,
        attrs: KeyAttributes,
        key: &[u8],
        algorithm: CipherAlgorithm,
        input: &[u8],
    ) -> Result<Vec<u8>, CipherError> {
        let required_size = Self::encrypt(&mut *rng, attrs, key, algorithm, input, None)?;
        let mut output = vec![0u8; required_size];
        let written_size = Self::encrypt(rng, attrs, key, algorithm, input, Some(&mut output))?;
        output.truncate(written_size);
        Ok(output)
    }

    /// Decrypts `IV || ciphertext` using the default engine.
    ///
    /// # Returns
    ///
    /// Bytes written to `output`, or an upper bound of the plaintext size if
    /// `output` is `None`.
    ///
    /// # Errors
    ///
    /// - `CipherError::InvalidArgument` - `input` is shorter than the IV
    /// - any error of the setup, IV, update or finish stages
    pub fn decrypt(
        attrs: KeyAttributes,
        key: &[u8],
        algorithm: CipherAlgorithm,
        input: &[u8],
        output: Option<&mut [u8]>,
    ) -> Result<usize, CipherError> {
        Self::decrypt_with::<DefaultEngine>(attrs, key, algorithm, input, output)
    }

    /// Allocating variant of [`Self::decrypt`].
    pub fn decrypt_vec(
        attrs: KeyAttributes,
        key: &[u8],
        algorithm: CipherAlgorithm,
        input: &[u8],
    ) -> Result<Vec<u8>, CipherError> {
        let required_size = Self::decrypt(attrs, key, algorithm, input, None)?;
        let mut output = vec![0u8; required_size];
        let written_size = Self::decrypt(attrs, key, algorithm, input, Some(&mut output))?;
        output.truncate(written_size);
        Ok(output)
    }

    /// [`Self::encrypt`] on an explicit engine type.
    pub fn encrypt_with<E: CipherEngine, R: RandomSource + ?Sized>(
        rng: &mut R,
        attrs: KeyAttributes,
        key: &[u8],
        algorithm: CipherAlgorithm,
        input: &[u8],
        output: Option<&mut [u8]>,
    ) -> Result<usize, CipherError> {
        let required_size = Self::encrypted_len::<E>(attrs, key, algorithm, input)?;
        let Some(output) = output else {
            return Ok(required_size);
        };
        if output.len() < required_size {
            return Err(CipherError::BufferTooSmall);
        }

        let mut op = CipherOperation::<E>::new_encrypt(attrs, key, algorithm)?;
        let (iv, body) = output.split_at_mut(op.iv_size());
        let iv_len = op.generate_iv(rng, iv)?;
        let mut written = op.update(input, Some(&mut body[..]))?;
        written += op.finish(Some(&mut body[written..]))?;
        Ok(iv_len + written)
    }

    /// [`Self::decrypt`] on an explicit engine type.
    pub fn decrypt_with<E: CipherEngine>(
        attrs: KeyAttributes,
        key: &[u8],
        algorithm: CipherAlgorithm,
        input: &[u8],
        output: Option<&mut [u8]>,
    ) -> Result<usize, CipherError> {
        let mut op = CipherOperation::<E>::new_decrypt(attrs, key, algorithm)?;
        if input.len() < op.iv_size() {
            return Err(CipherError::InvalidArgument);
        }
        let (iv, body) = input.split_at(op.iv_size());
        op.set_iv(iv)?;

        let required_size = op.update(body, None)? + op.finish(None)?;
        let Some(output) = output else {
            return Ok(required_size);
        };
        if output.len() < required_size {
            return Err(CipherError::BufferTooSmall);
        }

        let mut written = op.update(body, Some(&mut output[..]))?;
        written += op.finish(Some(&mut output[written..]))?;
        Ok(written)
    }

    /// Size of `IV || ciphertext` for `input`, computed on a throwaway
    /// operation with an all-zero IV.
    fn encrypted_len<E: CipherEngine>(
        attrs: KeyAttributes,
        key: &[u8],
        algorithm: CipherAlgorithm,
        input: &[u8],
    ) -> Result<usize, CipherError> {
        let mut op = CipherOperation::<E>::new_encrypt(attrs, key, algorithm)?;
        let iv = [0u8; MAX_IV_LENGTH];
        let iv_size = op.iv_size();
        op.set_iv(&iv[..iv_size])?;
        Ok(iv_size + op.update(input, None)? + op.finish(None)?)
    }
}
