use anyhow::{anyhow, Result};
use ethers::prelude::*;
use ethers::providers::{Http, Provider};
use ethers::types::transaction::eip2718::TypedTransaction;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::config::ChatConfig;

use super::types::Confirmation;

/// Ledger-client collaborator surface
///
/// Everything the core needs from the ledger node: nonce and gas
/// queries, raw submission, receipt waits, read-only calls and balance
/// lookups. Implemented by [`RpcLedgerClient`] for real nodes and by
/// [`super::MockLedger`] in tests.
#[async_trait::async_trait]
pub trait LedgerClient: Send + Sync {
    /// Number of transactions ever sent from `address` (the next nonce)
    async fn get_transaction_count(&self, address: Address) -> Result<U256>;

    /// Current gas price quote
    async fn get_gas_price(&self) -> Result<U256>;

    /// Estimate the gas limit for a contract call, bounded by `gas_cap`
    async fn estimate_gas(
        &self,
        from: Address,
        to: Address,
        data: Bytes,
        gas_cap: U256,
    ) -> Result<U256>;

    /// Submit a signed raw transaction; returns the hash the node accepted
    async fn send_signed_transaction(&self, raw: Bytes) -> Result<H256>;

    /// Wait until the transaction is included and confirmed
    ///
    /// May wait indefinitely; callers bound it with a timeout.
    async fn wait_for_receipt(&self, hash: H256) -> Result<Confirmation>;

    /// Read-only contract call (no nonce, no signature)
    async fn call(&self, from: Option<Address>, to: Address, data: Bytes) -> Result<Bytes>;

    /// Native balance of an address
    async fn get_balance(&self, address: Address) -> Result<U256>;
}

/// [`LedgerClient`] backed by an HTTP JSON-RPC provider
pub struct RpcLedgerClient {
    provider: Arc<Provider<Http>>,
    polling_interval: Duration,
    confirmation_blocks: u64,
}

impl RpcLedgerClient {
    /// Connect to the configured RPC endpoint and verify its chain id
    pub async fn connect(config: &ChatConfig) -> Result<Self> {
        let provider = Provider::<Http>::try_from(&config.chain.rpc_url)
            .map_err(|e| anyhow!("Failed to create provider: {}", e))?
            .interval(config.polling_interval);

        let chain_id = provider
            .get_chainid()
            .await
            .map_err(|e| anyhow!("Failed to connect to RPC: {}", e))?;

        if chain_id.as_u64() != config.chain.chain_id {
            return Err(anyhow!(
                "Chain ID mismatch: expected {}, got {}",
                config.chain.chain_id,
                chain_id
            ));
        }

        Ok(Self {
            provider: Arc::new(provider),
            polling_interval: config.polling_interval,
            confirmation_blocks: config.chain.confirmation_blocks,
        })
    }

    pub async fn is_connected(&self) -> bool {
        self.provider.get_block_number().await.is_ok()
    }
}

#[async_trait::async_trait]
impl LedgerClient for RpcLedgerClient {
    async fn get_transaction_count(&self, address: Address) -> Result<U256> {
        let count = self.provider.get_transaction_count(address, None).await?;
        Ok(count)
    }

    async fn get_gas_price(&self) -> Result<U256> {
        let gas_price = self.provider.get_gas_price().await?;
        Ok(gas_price)
    }

    async fn estimate_gas(
        &self,
        from: Address,
        to: Address,
        data: Bytes,
        gas_cap: U256,
    ) -> Result<U256> {
        let tx: TypedTransaction = TransactionRequest::new()
            .from(from)
            .to(to)
            .data(data)
            .gas(gas_cap)
            .into();

        let gas = self.provider.estimate_gas(&tx, None).await?;
        Ok(gas)
    }

    async fn send_signed_transaction(&self, raw: Bytes) -> Result<H256> {
        let pending = self.provider.send_raw_transaction(raw).await?;
        Ok(pending.tx_hash())
    }

    async fn wait_for_receipt(&self, hash: H256) -> Result<Confirmation> {
        loop {
            if let Some(receipt) = self.provider.get_transaction_receipt(hash).await? {
                if self.confirmation_blocks > 1 {
                    let current = self.provider.get_block_number().await?;
                    let included = receipt.block_number.unwrap_or(current);
                    let confirmations = current.saturating_sub(included).as_u64() + 1;
                    if confirmations < self.confirmation_blocks {
                        debug!(
                            "⏳ waiting for confirmations: {}/{} for {:?}",
                            confirmations, self.confirmation_blocks, hash
                        );
                        tokio::time::sleep(self.polling_interval).await;
                        continue;
                    }
                }

                return Ok(Confirmation {
                    transaction_hash: receipt.transaction_hash,
                    block_number: receipt.block_number.map(|b| b.as_u64()),
                    gas_used: receipt.gas_used,
                    status: receipt.status.map(|s| s.as_u64() == 1).unwrap_or(true),
                });
            }

            tokio::time::sleep(self.polling_interval).await;
        }
    }

    async fn call(&self, from: Option<Address>, to: Address, data: Bytes) -> Result<Bytes> {
        let mut request = TransactionRequest::new().to(to).data(data);
        if let Some(from) = from {
            request = request.from(from);
        }

        let tx: TypedTransaction = request.into();
        let result = self.provider.call(&tx, None).await?;
        Ok(result)
    }

    async fn get_balance(&self, address: Address) -> Result<U256> {
        let balance = self.provider.get_balance(address, None).await?;
        Ok(balance)
    }
}
