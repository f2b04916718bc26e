// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Lifecycle Events
//!
//! The closed set of outcomes a submitted call can produce, delivered
//! over a per-call channel. `Approved` fires at most once, before any
//! terminal event; exactly one of `Rejected`, `Receipt` or `Error` ends
//! the stream.

use ethers::types::H256;
use std::fmt;

use crate::contracts::Confirmation;

/// Why a call was rejected before the node assigned it a transaction hash
#[derive(Debug, Clone)]
pub enum RejectReason {
    /// No identity is installed; there is nothing to sign with
    NoIdentity,
    /// Nonce or gas-price lookup failed
    Preflight(String),
    /// The node could not estimate gas for the encoded payload
    GasEstimation(String),
    /// The node refused the signed transaction during validation
    Submission(String),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::NoIdentity => write!(f, "no identity installed"),
            RejectReason::Preflight(reason) => write!(f, "preflight query failed: {}", reason),
            RejectReason::GasEstimation(reason) => {
                write!(f, "gas estimation failed: {}", reason)
            }
            RejectReason::Submission(reason) => {
                write!(f, "submission rejected by node: {}", reason)
            }
        }
    }
}

/// Lifecycle outcome of one submitted call
#[derive(Debug, Clone)]
pub enum LifecycleEvent {
    /// The node accepted the submission; confirmation is still pending
    Approved(H256),
    /// The call failed before any transaction hash existed; nothing was
    /// submitted and no persisted side effect should occur
    Rejected(RejectReason),
    /// The transaction was included and confirmed successfully
    Receipt(Confirmation),
    /// The transaction failed after submission; always carries the hash
    Error { detail: String, hash: H256 },
}

impl LifecycleEvent {
    /// Terminal events end the stream; only `Approved` is non-terminal
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LifecycleEvent::Approved(_))
    }
}
