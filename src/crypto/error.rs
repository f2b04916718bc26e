// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Crypto Error Types
//!
//! Closed error taxonomy for key handling, secret derivation and the
//! message cipher. All variants carry enough context to log a useful
//! failure without ever including key material.

use std::fmt;

/// Error type for all cryptographic operations
#[derive(Debug, Clone)]
pub enum CryptoError {
    /// Invalid cryptographic key (wrong size, invalid curve point, malformed)
    InvalidKey {
        /// Which key failed (e.g. "local_private_key", "counterparty_public_key")
        key_type: String,
        /// Specific failure reason
        reason: String,
    },

    /// ECDH or HKDF key derivation failed
    KeyDerivationFailed {
        /// Specific failure reason
        reason: String,
    },

    /// AEAD encryption failed
    EncryptionFailed {
        /// Specific failure reason
        reason: String,
    },

    /// AEAD decryption failed (wrong key, corrupted ciphertext, tag mismatch)
    DecryptionFailed {
        /// Specific failure reason
        reason: String,
    },

    /// Ciphertext envelope is structurally invalid (e.g. too short for a nonce)
    InvalidEnvelope {
        /// Specific failure reason
        reason: String,
    },
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CryptoError::InvalidKey { key_type, reason } => {
                write!(f, "Invalid key ({}): {}", key_type, reason)
            }
            CryptoError::KeyDerivationFailed { reason } => {
                write!(f, "Key derivation failed: {}", reason)
            }
            CryptoError::EncryptionFailed { reason } => {
                write!(f, "Encryption failed: {}", reason)
            }
            CryptoError::DecryptionFailed { reason } => {
                write!(f, "Decryption failed: {}", reason)
            }
            CryptoError::InvalidEnvelope { reason } => {
                write!(f, "Invalid ciphertext envelope: {}", reason)
            }
        }
    }
}

impl std::error::Error for CryptoError {}
