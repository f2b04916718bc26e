use serde::{Deserialize, Serialize};

/// Connection profile for one ledger network
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ChainProfile {
    pub chain_id: u64,
    pub name: String,
    pub rpc_url: String,
    pub confirmation_blocks: u64,
}

impl ChainProfile {
    /// Local development node (anvil/hardhat defaults)
    pub fn local() -> Self {
        ChainProfile {
            chain_id: 31337,
            name: "Local Devnet".to_string(),
            rpc_url: std::env::var("CHAT_RPC_URL")
                .unwrap_or_else(|_| "http://localhost:8545".to_string()),
            confirmation_blocks: 1,
        }
    }

    pub fn sepolia() -> Self {
        ChainProfile {
            chain_id: 11155111,
            name: "Sepolia".to_string(),
            rpc_url: std::env::var("SEPOLIA_RPC_URL")
                .unwrap_or_else(|_| "https://rpc.sepolia.org".to_string()),
            confirmation_blocks: 3,
        }
    }
}

impl Default for ChainProfile {
    fn default() -> Self {
        Self::local()
    }
}
