// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use ethers::types::{Address, Bytes, H256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::crypto::CryptoError;
use crate::utils::EncodingError;

/// Delivery status of an outbound message record
///
/// Starts at `Pending` and transitions exactly once, driven by the
/// lifecycle outcome of the underlying transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageStatus {
    Pending,
    Success,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Outbound,
    Inbound,
}

/// An encrypted message record as handed to the persistence collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncryptedMessage {
    pub ciphertext: Bytes,
    /// Cipher identifier transmitted with the payload
    pub algorithm: String,
    pub counterparty: Address,
    pub direction: Direction,
    pub status: MessageStatus,
    pub transaction_hash: Option<H256>,
}

/// A member's on-chain profile
#[derive(Debug, Clone, PartialEq)]
pub struct MemberProfile {
    pub address: Address,
    /// 64-byte raw public key, reassembled from its two on-chain halves
    pub public_key: [u8; 64],
    pub name: String,
    pub avatar_url: String,
}

/// One entry of the on-chain contact list
#[derive(Debug, Clone, PartialEq)]
pub struct Contact {
    pub address: Address,
    pub name: String,
    pub avatar_url: String,
}

/// Events the core publishes to its callers (persistence, UI)
#[derive(Debug, Clone)]
pub enum ChatEvent {
    /// A new outbound message record should be persisted (status Pending)
    MessageStored { message: EncryptedMessage },
    /// The status of a previously stored message changed
    MessageStatusChanged {
        counterparty: Address,
        transaction_hash: H256,
        status: MessageStatus,
    },
    /// The local member's profile was loaded from the contract
    ProfileLoaded { profile: MemberProfile },
}

/// Failures preparing a message or profile call
#[derive(Debug, Error)]
pub enum MessageError {
    #[error("no identity installed")]
    NoIdentity,
    #[error(transparent)]
    Crypto(#[from] CryptoError),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
}
