// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! ECDH Shared-Secret Derivation
//!
//! Derives the per-conversation message key via Elliptic Curve
//! Diffie-Hellman on secp256k1 (the same curve the ledger's address
//! scheme uses), followed by HKDF-SHA256 expansion to a 32-byte cipher
//! key.
//!
//! The derivation is static-static: the local wallet secret combined
//! with the counterparty's long-lived public key. Both sides of a
//! conversation therefore recompute the identical key independently,
//! which is what makes stored ciphertexts decryptable by either party.
//! Note that this scheme has no forward secrecy; upgrading to an
//! agreed ephemeral scheme is tracked in DESIGN.md.

use hkdf::Hkdf;
use k256::{
    ecdh,
    elliptic_curve::sec1::FromEncodedPoint,
    EncodedPoint, PublicKey, SecretKey,
};
use sha2::Sha256;

use super::error::CryptoError;

/// Derive the shared 32-byte message key for a conversation
///
/// # Arguments
///
/// * `local_secret` - Local wallet private key (32 bytes)
/// * `counterparty_public_key` - Counterparty's public key; accepts the
///   64-byte raw form stored on-chain as well as SEC1 compressed
///   (33 bytes) or uncompressed (65 bytes) encodings
///
/// # Returns
///
/// A 32-byte key suitable for the XChaCha20-Poly1305 message cipher.
/// `derive_shared_secret(a, B) == derive_shared_secret(b, A)` for any
/// key pairs (a, A) and (b, B).
pub fn derive_shared_secret(
    local_secret: &[u8],
    counterparty_public_key: &[u8],
) -> Result<[u8; 32], CryptoError> {
    if local_secret.len() != 32 {
        return Err(CryptoError::InvalidKey {
            key_type: "local_private_key".to_string(),
            reason: format!("expected 32 bytes, got {}", local_secret.len()),
        });
    }

    let secret = SecretKey::from_slice(local_secret).map_err(|e| CryptoError::InvalidKey {
        key_type: "local_private_key".to_string(),
        reason: e.to_string(),
    })?;

    // The contract stores the 64-byte raw form; SEC1 needs the 0x04 tag.
    let sec1_bytes: Vec<u8> = match counterparty_public_key.len() {
        64 => {
            let mut uncompressed = Vec::with_capacity(65);
            uncompressed.push(0x04);
            uncompressed.extend_from_slice(counterparty_public_key);
            uncompressed
        }
        33 | 65 => counterparty_public_key.to_vec(),
        other => {
            return Err(CryptoError::InvalidKey {
                key_type: "counterparty_public_key".to_string(),
                reason: format!("expected 33, 64 or 65 bytes, got {}", other),
            });
        }
    };

    let encoded_point =
        EncodedPoint::from_bytes(&sec1_bytes).map_err(|e| CryptoError::InvalidKey {
            key_type: "counterparty_public_key".to_string(),
            reason: e.to_string(),
        })?;

    let counterparty = PublicKey::from_encoded_point(&encoded_point);
    let counterparty = if counterparty.is_some().into() {
        counterparty.unwrap()
    } else {
        return Err(CryptoError::InvalidKey {
            key_type: "counterparty_public_key".to_string(),
            reason: "not a valid curve point".to_string(),
        });
    };

    let shared_point =
        ecdh::diffie_hellman(secret.to_nonzero_scalar(), counterparty.as_affine());

    let hkdf = Hkdf::<Sha256>::new(None, shared_point.raw_secret_bytes().as_slice());
    let mut key = [0u8; 32];
    hkdf.expand(&[], &mut key)
        .map_err(|e| CryptoError::KeyDerivationFailed {
            reason: e.to_string(),
        })?;

    Ok(key)
}
