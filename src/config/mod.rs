// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Configuration for the chat core: chain profile, contract address and
//! pipeline tuning knobs. Values come from `Default`, a JSON file, or
//! environment overrides.

pub mod chains;

pub use chains::ChainProfile;

use anyhow::{anyhow, Context, Result};
use ethers::types::{Address, U256};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Top-level configuration for the messaging core
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatConfig {
    pub chain: ChainProfile,
    /// Address of the deployed chat contract
    pub contract_address: Address,
    /// Upper bound passed to gas estimation
    pub gas_cap: U256,
    /// Bounded wait for a receipt before the pipeline escalates to an error
    pub receipt_timeout: Duration,
    /// Receipt polling cadence for the RPC client
    pub polling_interval: Duration,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            chain: ChainProfile::local(),
            contract_address: Address::zero(),
            gas_cap: U256::from(3_000_000u64),
            receipt_timeout: Duration::from_secs(120),
            polling_interval: Duration::from_millis(500),
        }
    }
}

impl ChatConfig {
    /// Build a config from environment variables
    ///
    /// `CHAT_CONTRACT_ADDRESS` is required; `CHAT_RPC_URL` and
    /// `CHAT_CHAIN_ID` override the local-devnet defaults.
    pub fn from_env() -> Result<Self> {
        let contract_address = std::env::var("CHAT_CONTRACT_ADDRESS")
            .map_err(|_| anyhow!("CHAT_CONTRACT_ADDRESS environment variable not set"))?;
        let contract_address = Address::from_str(contract_address.trim())
            .map_err(|e| anyhow!("Invalid CHAT_CONTRACT_ADDRESS: {}", e))?;

        let mut chain = ChainProfile::local();
        if let Ok(chain_id) = std::env::var("CHAT_CHAIN_ID") {
            chain.chain_id = chain_id
                .parse()
                .map_err(|e| anyhow!("Invalid CHAT_CHAIN_ID: {}", e))?;
        }

        Ok(Self {
            chain,
            contract_address,
            ..Self::default()
        })
    }

    /// Load a config from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("failed to read config file {:?}", path.as_ref()))?;
        serde_json::from_str(&raw).context("failed to parse config file")
    }
}
