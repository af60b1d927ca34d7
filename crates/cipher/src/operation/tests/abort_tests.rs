// Copyright (C) Microsoft Corporation. All rights reserved.

use test_with_tracing::test;

use super::*;

#[test]
fn test_abort_without_setup() {
    let mut op = CipherOperation::<MockEngine>::default();
    assert_eq!(op.state(), OperationState::Uninitialized);
    assert_eq!(op.abort(), Err(CipherError::BadState));
    assert_eq!(free_calls(), 0);
}

#[test]
fn test_abort_twice() {
    let mut op = mock_ready(Direction::Encrypt, CipherAlgorithm::CbcPkcs7);
    assert!(op.abort().is_ok());
    assert_eq!(op.state(), OperationState::Aborted);
    assert_eq!(op.algorithm(), None);
    assert_eq!(op.abort(), Err(CipherError::BadState));
    assert_eq!(free_calls(), 1);

    drop(op);
    assert_eq!(free_calls(), 1);
}

#[test]
fn test_abort_after_failed_setup() {
    fail_at(Stage::New, EngineError::AllocFailed);
    let mut op = CipherOperation::<MockEngine>::default();
    assert_eq!(
        op.decrypt_setup(aes128(), &KEY, CipherAlgorithm::Ofb),
        Err(CipherError::InsufficientMemory)
    );
    assert!(op.abort().is_ok());
    assert_eq!(op.abort(), Err(CipherError::BadState));
}

#[test]
fn test_abort_mid_stream() {
    let mut op = mock_ready(Direction::Encrypt, CipherAlgorithm::EcbNoPadding);
    op.update_vec(&message(21)).unwrap();
    op.abort().unwrap();
    assert_eq!(free_calls(), 1);
    assert_eq!(op.update_vec(&message(4)), Err(CipherError::BadState));
    assert_eq!(op.finish_vec(), Err(CipherError::BadState));

    // A fresh setup starts from an empty residual.
    op.encrypt_setup(aes128(), &KEY, CipherAlgorithm::EcbNoPadding)
        .unwrap();
    assert_eq!(op.update(&message(11), None), Ok(0));
    assert_eq!(op.finish_vec(), Ok(Vec::new()));
}

#[test]
fn test_abort_after_finish() {
    let mut op = mock_ready(Direction::Decrypt, CipherAlgorithm::Cfb);
    op.update_vec(&message(3)).unwrap();
    op.finish_vec().unwrap();
    assert!(op.abort().is_ok());
    assert_eq!(op.state(), OperationState::Aborted);
}

#[test]
fn test_drop_releases_engine() {
    {
        let mut op = mock_ready(Direction::Encrypt, CipherAlgorithm::CbcPkcs7);
        op.update_vec(&message(7)).unwrap();
    }
    assert_eq!(free_calls(), 1);

    drop(CipherOperation::<MockEngine>::default());
    assert_eq!(free_calls(), 1);
}
