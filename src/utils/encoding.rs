// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Hex-ASCII Text Fields
//!
//! Short profile text (display names, avatar URLs) is stored on-chain in
//! fixed-width `bytes32` slots: the ASCII bytes right-padded with zeros.
//! These helpers convert between Rust strings and that representation.

use thiserror::Error;

/// Conversion failure for a `bytes32` text field
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    /// Input does not fit in a single 32-byte slot
    #[error("text field too long: {len} bytes, limit is 32")]
    TooLong { len: usize },

    /// Input contains non-ASCII characters
    #[error("text field must be ASCII")]
    NotAscii,
}

/// Encode a short ASCII string into a right-zero-padded `bytes32` slot
pub fn ascii_to_bytes32(text: &str) -> Result<[u8; 32], EncodingError> {
    if !text.is_ascii() {
        return Err(EncodingError::NotAscii);
    }
    let bytes = text.as_bytes();
    if bytes.len() > 32 {
        return Err(EncodingError::TooLong { len: bytes.len() });
    }

    let mut slot = [0u8; 32];
    slot[..bytes.len()].copy_from_slice(bytes);
    Ok(slot)
}

/// Decode a `bytes32` slot back into a string, trimming the zero padding
///
/// Decoding is lenient: on-chain data is not under our control, so any
/// non-ASCII bytes are replaced rather than rejected.
pub fn bytes32_to_ascii(slot: &[u8; 32]) -> String {
    let end = slot
        .iter()
        .position(|&b| b == 0)
        .unwrap_or(slot.len());
    String::from_utf8_lossy(&slot[..end]).into_owned()
}
