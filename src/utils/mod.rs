// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod encoding;

pub use encoding::{ascii_to_bytes32, bytes32_to_ascii, EncodingError};
