// Copyright (C) Microsoft Corporation. All rights reserved.

use test_with_tracing::test;

use super::*;

struct FailingRng;

impl RandomSource for FailingRng {
    fn fill_bytes(&mut self, _buf: &mut [u8]) -> Result<(), RngError> {
        Err(RngError)
    }
}

#[test]
fn test_ossl_fill_bytes() {
    let mut rng = OsslRng::new();
    let mut buf = [0u8; 1024];
    rng.fill_bytes(&mut buf).expect("Failed to generate random bytes");
    // All zeros is vanishingly unlikely for random data
    assert_ne!(buf, [0u8; 1024]);

    let mut empty = [0u8; 0];
    assert!(rng.fill_bytes(&mut empty).is_ok());
}

fn fill<R: RandomSource>(mut rng: R, buf: &mut [u8]) -> Result<(), RngError> {
    rng.fill_bytes(buf)
}

#[test]
fn test_fill_bytes_through_reference() {
    let mut rng = DefaultRng::default();
    let mut buf = [0u8; 32];
    assert!(fill(&mut rng, &mut buf).is_ok());
    assert_eq!(fill(&mut FailingRng, &mut buf), Err(RngError));
}

#[test]
fn test_rng_error_maps_to_insufficient_entropy() {
    let mut buf = [0u8; 16];
    let err = FailingRng.fill_bytes(&mut buf).unwrap_err();
    assert_eq!(CipherError::from(err), CipherError::InsufficientEntropy);
}
