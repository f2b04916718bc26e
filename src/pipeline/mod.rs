// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Transaction Pipeline
//!
//! Turns a prepared contract call into a signed, submitted transaction
//! and drives its lifecycle to a terminal outcome:
//!
//! ```text
//! BUILDING -> SIGNED -> SUBMITTED -> Approved -> Receipt | Error
//!                    \-> Rejected (no hash, nothing submitted)
//! ```
//!
//! Submissions for the one local identity are serialized: the mutex is
//! held from the nonce query until the node accepts (or refuses) the
//! raw transaction, so nonces are assigned and consumed strictly in
//! increasing order. There is no automatic retry and no fee escalation;
//! after an `Error` the caller resubmits with a freshly queried nonce.

pub mod events;

pub use events::{LifecycleEvent, RejectReason};

use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Bytes, TransactionRequest, H256, U256};
use ethers::utils::keccak256;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, Mutex};
use tracing::{info, warn};

use crate::config::ChatConfig;
use crate::contracts::{ChatCall, LedgerClient};
use crate::identity::IdentityManager;

/// Read-only query failures
#[derive(Debug, Clone, Error)]
pub enum QueryError {
    #[error("read-only call failed: {0}")]
    CallFailed(String),
    #[error("could not decode call result: {0}")]
    Decode(String),
}

/// Tracks the last nonce the node accepted, guarding against a lagging
/// transaction count handing out a duplicate.
#[derive(Debug, Default)]
struct NonceState {
    last_consumed: Option<U256>,
}

impl NonceState {
    fn assign(&self, queried: U256) -> U256 {
        match self.last_consumed {
            Some(last) if queried <= last => last + 1,
            _ => queried,
        }
    }

    fn consume(&mut self, nonce: U256) {
        self.last_consumed = Some(nonce);
    }
}

#[derive(Clone)]
struct PipelineConfig {
    contract: ethers::types::Address,
    chain_id: u64,
    gas_cap: U256,
    receipt_timeout: std::time::Duration,
}

/// Builds, signs, submits and tracks state-changing ledger calls
#[derive(Clone)]
pub struct TransactionPipeline {
    identity: Arc<IdentityManager>,
    ledger: Arc<dyn LedgerClient>,
    config: PipelineConfig,
    nonce_gate: Arc<Mutex<NonceState>>,
}

impl TransactionPipeline {
    pub fn new(
        identity: Arc<IdentityManager>,
        ledger: Arc<dyn LedgerClient>,
        config: &ChatConfig,
    ) -> Self {
        Self {
            identity,
            ledger,
            config: PipelineConfig {
                contract: config.contract_address,
                chain_id: config.chain.chain_id,
                gas_cap: config.gas_cap,
                receipt_timeout: config.receipt_timeout,
            },
            nonce_gate: Arc::new(Mutex::new(NonceState::default())),
        }
    }

    /// Submit a state-changing call
    ///
    /// Returns the per-call lifecycle stream. The sender is dropped
    /// after the terminal event, closing the channel.
    pub fn submit(&self, call: ChatCall) -> mpsc::Receiver<LifecycleEvent> {
        let (events, receiver) = mpsc::channel(8);
        let pipeline = self.clone();
        tokio::spawn(async move {
            pipeline.run_submission(call, events).await;
        });
        receiver
    }

    /// Read-only contract call: one round trip, no nonce, no signature
    pub async fn query(&self, call: ChatCall) -> Result<Bytes, QueryError> {
        let from = self.identity.address().await;
        self.ledger
            .call(from, self.config.contract, call.data)
            .await
            .map_err(|e| QueryError::CallFailed(e.to_string()))
    }

    async fn run_submission(&self, call: ChatCall, events: mpsc::Sender<LifecycleEvent>) {
        let from = match self.identity.address().await {
            Some(address) => address,
            None => {
                let _ = events
                    .send(LifecycleEvent::Rejected(RejectReason::NoIdentity))
                    .await;
                return;
            }
        };

        // Serialization point: held from the nonce query until the node
        // has accepted or refused the submission.
        let mut gate = self.nonce_gate.lock().await;

        let queried = match self.ledger.get_transaction_count(from).await {
            Ok(count) => count,
            Err(e) => {
                drop(gate);
                let _ = events
                    .send(LifecycleEvent::Rejected(RejectReason::Preflight(
                        e.to_string(),
                    )))
                    .await;
                return;
            }
        };

        let gas_price = match self.ledger.get_gas_price().await {
            Ok(price) => price,
            Err(e) => {
                drop(gate);
                let _ = events
                    .send(LifecycleEvent::Rejected(RejectReason::Preflight(
                        e.to_string(),
                    )))
                    .await;
                return;
            }
        };

        let gas_limit = match self
            .ledger
            .estimate_gas(
                from,
                self.config.contract,
                call.data.clone(),
                self.config.gas_cap,
            )
            .await
        {
            Ok(limit) => limit,
            Err(e) => {
                drop(gate);
                warn!("⛽ gas estimation failed for {}: {}", call.name, e);
                let _ = events
                    .send(LifecycleEvent::Rejected(RejectReason::GasEstimation(
                        e.to_string(),
                    )))
                    .await;
                return;
            }
        };

        let nonce = gate.assign(queried);

        let request = TransactionRequest::new()
            .from(from)
            .to(self.config.contract)
            .nonce(nonce)
            .gas_price(gas_price)
            .gas(gas_limit)
            .value(0u64)
            .data(call.data.clone())
            .chain_id(self.config.chain_id);
        let tx: TypedTransaction = request.into();

        let signature = match self.identity.sign_transaction(&tx).await {
            Ok(signature) => signature,
            Err(e) => {
                drop(gate);
                let _ = events
                    .send(LifecycleEvent::Rejected(RejectReason::Preflight(
                        e.to_string(),
                    )))
                    .await;
                return;
            }
        };

        let raw = tx.rlp_signed(&signature);
        let local_hash = H256::from(keccak256(raw.as_ref()));

        let hash = match self.ledger.send_signed_transaction(raw).await {
            Ok(hash) => {
                gate.consume(nonce);
                drop(gate);
                hash
            }
            Err(e) => {
                // Nonce not consumed: the node never saw a valid submission.
                drop(gate);
                warn!("🚫 {} rejected before submission: {}", call.name, e);
                let _ = events
                    .send(LifecycleEvent::Rejected(RejectReason::Submission(
                        e.to_string(),
                    )))
                    .await;
                return;
            }
        };

        if hash != local_hash {
            warn!(
                "node-reported hash {:?} differs from locally computed {:?}",
                hash, local_hash
            );
        }

        info!(
            "📤 {} submitted with nonce {} ({:?})",
            call.name, nonce, hash
        );
        let _ = events.send(LifecycleEvent::Approved(hash)).await;

        let outcome = match tokio::time::timeout(
            self.config.receipt_timeout,
            self.ledger.wait_for_receipt(hash),
        )
        .await
        {
            Err(_) => LifecycleEvent::Error {
                detail: format!(
                    "receipt wait timed out after {:?}",
                    self.config.receipt_timeout
                ),
                hash,
            },
            Ok(Err(e)) => LifecycleEvent::Error {
                detail: e.to_string(),
                hash,
            },
            Ok(Ok(confirmation)) if !confirmation.succeeded() => LifecycleEvent::Error {
                detail: "transaction reverted".to_string(),
                hash,
            },
            Ok(Ok(confirmation)) => LifecycleEvent::Receipt(confirmation),
        };

        if let LifecycleEvent::Error { detail, .. } = &outcome {
            warn!("❌ {} failed: {}", call.name, detail);
        } else {
            info!("✅ {} confirmed ({:?})", call.name, hash);
        }
        let _ = events.send(outcome).await;
    }
}
