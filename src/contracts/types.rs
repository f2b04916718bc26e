// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use ethers::types::{H256, U256};
use serde::{Deserialize, Serialize};

/// Confirmation data for a transaction included on the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Confirmation {
    pub transaction_hash: H256,
    pub block_number: Option<u64>,
    pub gas_used: Option<U256>,
    /// False when the transaction was included but reverted
    pub status: bool,
}

impl Confirmation {
    pub fn succeeded(&self) -> bool {
        self.status
    }
}
