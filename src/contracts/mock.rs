// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! In-memory [`LedgerClient`] for tests
//!
//! Behaves like a well-formed node: decodes submitted raw transactions,
//! tracks the per-address transaction count, and produces receipts.
//! Failure injection covers the interesting paths: gas-estimation
//! failure, pre-hash submission rejection, reverted receipts, slow
//! receipts, and a transaction count that lags behind accepted
//! submissions.

use anyhow::{anyhow, Result};
use ethers::types::{Address, Bytes, Transaction, H256, U256};
use ethers::utils::{keccak256, rlp};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

use super::client::LedgerClient;
use super::types::Confirmation;

#[derive(Debug, Clone)]
struct AcceptedTx {
    hash: H256,
    nonce: U256,
    input: Bytes,
}

/// Test double for the ledger-client collaborator
pub struct MockLedger {
    gas_price: U256,
    base_count: AtomicU64,
    count_lag: AtomicU64,
    fail_estimate: AtomicBool,
    reject_submission: AtomicBool,
    revert_receipts: AtomicBool,
    receipt_delay: RwLock<Duration>,
    accepted: RwLock<Vec<AcceptedTx>>,
    call_response: RwLock<Option<Bytes>>,
    balances: RwLock<HashMap<Address, U256>>,
}

impl MockLedger {
    pub fn new() -> Self {
        Self {
            gas_price: U256::from(1_000_000_000u64), // 1 gwei
            base_count: AtomicU64::new(0),
            count_lag: AtomicU64::new(0),
            fail_estimate: AtomicBool::new(false),
            reject_submission: AtomicBool::new(false),
            revert_receipts: AtomicBool::new(false),
            receipt_delay: RwLock::new(Duration::from_millis(0)),
            accepted: RwLock::new(Vec::new()),
            call_response: RwLock::new(None),
            balances: RwLock::new(HashMap::new()),
        }
    }

    /// Starting transaction count for the identity under test
    pub fn set_transaction_count(&self, count: u64) {
        self.base_count.store(count, Ordering::SeqCst);
    }

    /// Report a transaction count that trails accepted submissions by
    /// `lag`, simulating a node that has not indexed them yet.
    pub fn set_count_lag(&self, lag: u64) {
        self.count_lag.store(lag, Ordering::SeqCst);
    }

    pub fn fail_gas_estimation(&self, fail: bool) {
        self.fail_estimate.store(fail, Ordering::SeqCst);
    }

    pub fn reject_submissions(&self, reject: bool) {
        self.reject_submission.store(reject, Ordering::SeqCst);
    }

    pub fn revert_receipts(&self, revert: bool) {
        self.revert_receipts.store(revert, Ordering::SeqCst);
    }

    pub async fn set_receipt_delay(&self, delay: Duration) {
        *self.receipt_delay.write().await = delay;
    }

    /// Raw response returned by [`LedgerClient::call`]
    pub async fn set_call_response(&self, response: Bytes) {
        *self.call_response.write().await = Some(response);
    }

    pub async fn set_balance(&self, address: Address, balance: U256) {
        self.balances.write().await.insert(address, balance);
    }

    /// Nonces of accepted submissions, in acceptance order
    pub async fn accepted_nonces(&self) -> Vec<U256> {
        self.accepted.read().await.iter().map(|tx| tx.nonce).collect()
    }

    pub async fn accepted_hashes(&self) -> Vec<H256> {
        self.accepted.read().await.iter().map(|tx| tx.hash).collect()
    }

    /// Calldata of accepted submissions, in acceptance order
    pub async fn accepted_inputs(&self) -> Vec<Bytes> {
        self.accepted
            .read()
            .await
            .iter()
            .map(|tx| tx.input.clone())
            .collect()
    }
}

impl Default for MockLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl LedgerClient for MockLedger {
    async fn get_transaction_count(&self, _address: Address) -> Result<U256> {
        let accepted = self.accepted.read().await.len() as u64;
        let count = self.base_count.load(Ordering::SeqCst) + accepted;
        let lag = self.count_lag.load(Ordering::SeqCst);
        Ok(U256::from(count.saturating_sub(lag)))
    }

    async fn get_gas_price(&self) -> Result<U256> {
        Ok(self.gas_price)
    }

    async fn estimate_gas(
        &self,
        _from: Address,
        _to: Address,
        _data: Bytes,
        gas_cap: U256,
    ) -> Result<U256> {
        if self.fail_estimate.load(Ordering::SeqCst) {
            return Err(anyhow!("execution reverted: gas estimation failed"));
        }
        Ok(std::cmp::min(U256::from(100_000u64), gas_cap))
    }

    async fn send_signed_transaction(&self, raw: Bytes) -> Result<H256> {
        if self.reject_submission.load(Ordering::SeqCst) {
            return Err(anyhow!("invalid transaction: rejected by node"));
        }

        let decoded: Transaction = rlp::decode(raw.as_ref())
            .map_err(|e| anyhow!("could not decode raw transaction: {}", e))?;

        let hash = H256::from(keccak256(raw.as_ref()));
        self.accepted.write().await.push(AcceptedTx {
            hash,
            nonce: decoded.nonce,
            input: decoded.input,
        });
        Ok(hash)
    }

    async fn wait_for_receipt(&self, hash: H256) -> Result<Confirmation> {
        let delay = *self.receipt_delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        Ok(Confirmation {
            transaction_hash: hash,
            block_number: Some(1),
            gas_used: Some(U256::from(21_000u64)),
            status: !self.revert_receipts.load(Ordering::SeqCst),
        })
    }

    async fn call(&self, _from: Option<Address>, _to: Address, _data: Bytes) -> Result<Bytes> {
        Ok(self
            .call_response
            .read()
            .await
            .clone()
            .unwrap_or_default())
    }

    async fn get_balance(&self, address: Address) -> Result<U256> {
        Ok(self
            .balances
            .read()
            .await
            .get(&address)
            .copied()
            .unwrap_or_default())
    }
}
