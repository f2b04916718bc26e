// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Cryptographic primitives: ECDH secret derivation and the message cipher.

pub mod ecdh;
pub mod encryption;
pub mod error;

pub use ecdh::derive_shared_secret;
pub use encryption::{decrypt_message, encrypt_message, ALGORITHM_ID, NONCE_SIZE};
pub use error::CryptoError;
