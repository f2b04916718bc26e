//! XChaCha20-Poly1305 Message Cipher
//!
//! Authenticated encryption for chat payloads using the key derived in
//! [`super::ecdh`]. The envelope format is self-contained:
//!
//! ```text
//! [nonce (24 bytes) | ciphertext+tag (variable length)]
//! ```
//!
//! The algorithm identifier travels alongside the ciphertext in the
//! on-chain record so recipients know which cipher to apply.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    XChaCha20Poly1305, XNonce,
};
use rand::{rngs::OsRng, RngCore};

use super::error::CryptoError;

/// Identifier for the cipher suite, transmitted with each message
pub const ALGORITHM_ID: &str = "xchacha20-poly1305";

/// Nonce size for XChaCha20 (24 bytes)
pub const NONCE_SIZE: usize = 24;

/// Encrypt a message payload under a derived conversation key
///
/// A fresh random nonce is generated per message and prepended to the
/// ciphertext, so the returned envelope is all a recipient needs
/// besides the key.
pub fn encrypt_message(plaintext: &[u8], key: &[u8; 32]) -> Result<Vec<u8>, CryptoError> {
    let cipher =
        XChaCha20Poly1305::new_from_slice(key).map_err(|e| CryptoError::EncryptionFailed {
            reason: e.to_string(),
        })?;

    let mut nonce = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce);

    let ciphertext = cipher
        .encrypt(XNonce::from_slice(&nonce), plaintext)
        .map_err(|e| CryptoError::EncryptionFailed {
            reason: e.to_string(),
        })?;

    let mut envelope = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    envelope.extend_from_slice(&nonce);
    envelope.extend_from_slice(&ciphertext);
    Ok(envelope)
}

/// Decrypt a message envelope produced by [`encrypt_message`]
///
/// # Errors
///
/// Returns [`CryptoError::InvalidEnvelope`] if the envelope is too short
/// to contain a nonce, or [`CryptoError::DecryptionFailed`] when the
/// authentication tag does not verify (wrong key or tampered data).
pub fn decrypt_message(envelope: &[u8], key: &[u8; 32]) -> Result<Vec<u8>, CryptoError> {
    if envelope.len() < NONCE_SIZE {
        return Err(CryptoError::InvalidEnvelope {
            reason: format!(
                "expected at least {} bytes for the nonce, got {}",
                NONCE_SIZE,
                envelope.len()
            ),
        });
    }

    let cipher =
        XChaCha20Poly1305::new_from_slice(key).map_err(|e| CryptoError::DecryptionFailed {
            reason: e.to_string(),
        })?;

    let (nonce, ciphertext) = envelope.split_at(NONCE_SIZE);
    cipher
        .decrypt(XNonce::from_slice(nonce), ciphertext)
        .map_err(|_| CryptoError::DecryptionFailed {
            reason: "authentication failed (wrong key or corrupted data)".to_string(),
        })
}
