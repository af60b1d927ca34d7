// Copyright (C) Microsoft Corporation. All rights reserved.

mod abort_tests;
mod mock;

use mock::*;

use super::*;

const KEY: [u8; 16] = [
    0x2b, 0x7e, 0x15, 0x16, 0x28, 0xae, 0xd2, 0xa6, 0xab, 0xf7, 0x15, 0x88, 0x09, 0xcf, 0x4f,
    0x3c,
];
const IV: [u8; 16] = [
    0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e,
    0x0f,
];

fn aes128() -> KeyAttributes {
    KeyAttributes::new(KeyType::Aes, 128)
}

/// Mock-backed AES-128 operation with its IV installed.
fn mock_ready(direction: Direction, algorithm: CipherAlgorithm) -> CipherOperation<MockEngine> {
    let mut op = match direction {
        Direction::Encrypt => CipherOperation::<MockEngine>::new_encrypt(aes128(), &KEY, algorithm),
        Direction::Decrypt => CipherOperation::<MockEngine>::new_decrypt(aes128(), &KEY, algorithm),
    }
    .expect("setup failed");
    let iv_size = op.iv_size();
    op.set_iv(&IV[..iv_size]).expect("set_iv failed");
    op
}

/// Feeds `chunks` through `op` and appends the finish output.
fn run<E: CipherEngine>(op: &mut CipherOperation<E>, chunks: &[&[u8]]) -> Vec<u8> {
    let mut output = Vec::new();
    for chunk in chunks {
        output.extend(op.update_vec(chunk).expect("update failed"));
    }
    output.extend(op.finish_vec().expect("finish failed"));
    output
}

/// Sample message of `len` bytes.
fn message(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 7 + 3) as u8).collect()
}
