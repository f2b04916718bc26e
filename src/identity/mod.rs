// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Identity Management
//!
//! Custody of the user's secp256k1 private key and everything derived
//! from it. The public key and ledger address are pure functions of the
//! private key and are recomputed together whenever a new key is
//! installed; the three never drift apart. Private-key bytes stay inside
//! this module: callers get the address, the public key, signatures and
//! derived shared secrets, never the secret itself.
//!
//! ## Security
//!
//! - The key is NEVER logged or serialized
//! - A failed install leaves any previously installed identity untouched
//! - `Debug` output redacts the key material

use ethers::signers::{LocalWallet, Signer};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, Signature};
use k256::ecdsa::SigningKey;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use std::fmt;
use std::sync::Arc;
use tiny_keccak::{Hasher, Keccak};
use tokio::sync::{mpsc, RwLock};
use tracing::{info, warn};

use crate::contracts::LedgerClient;
use crate::crypto::{derive_shared_secret, CryptoError};

/// Identity install/refresh failures
#[derive(Debug, Clone)]
pub enum IdentityError {
    /// The candidate secret could not be parsed as a valid key
    InvalidKeyFormat { reason: String },
    /// No identity is installed
    NoIdentity,
    /// Transaction signing failed
    Signing(String),
}

impl fmt::Display for IdentityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityError::InvalidKeyFormat { reason } => {
                write!(f, "Invalid private key format: {}", reason)
            }
            IdentityError::NoIdentity => write!(f, "No identity installed"),
            IdentityError::Signing(reason) => write!(f, "Signing failed: {}", reason),
        }
    }
}

impl std::error::Error for IdentityError {}

/// Events published when the identity record changes
#[derive(Debug, Clone)]
pub enum IdentityEvent {
    Installed { address: Address },
    Cleared,
    BalanceRefreshed { address: Address, balance: ethers::types::U256 },
}

/// The installed identity: wallet plus derived public values
struct Identity {
    wallet: LocalWallet,
    public_key: [u8; 64],
    address: Address,
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("address", &self.address)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Holds the single logical identity of this running instance
pub struct IdentityManager {
    identity: Arc<RwLock<Option<Identity>>>,
    ledger: Arc<dyn LedgerClient>,
    chain_id: u64,
    subscribers: Arc<RwLock<Vec<mpsc::Sender<IdentityEvent>>>>,
}

impl IdentityManager {
    pub fn new(ledger: Arc<dyn LedgerClient>, chain_id: u64) -> Self {
        Self {
            identity: Arc::new(RwLock::new(None)),
            ledger,
            chain_id,
            subscribers: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Subscribe to identity events
    pub async fn subscribe(&self) -> mpsc::Receiver<IdentityEvent> {
        let (tx, rx) = mpsc::channel(32);
        self.subscribers.write().await.push(tx);
        rx
    }

    /// Install a new identity from a 32-byte secret
    ///
    /// Validates the candidate, derives the public key and address, and
    /// replaces any existing identity atomically. On failure the
    /// previous identity (if any) is left unchanged. A successful
    /// install triggers a balance refresh against the ledger client.
    pub async fn set_private_key(&self, secret: &[u8]) -> Result<Address, IdentityError> {
        if secret.len() != 32 {
            return Err(IdentityError::InvalidKeyFormat {
                reason: format!("expected 32 bytes, got {}", secret.len()),
            });
        }

        let signing_key =
            SigningKey::from_slice(secret).map_err(|e| IdentityError::InvalidKeyFormat {
                reason: e.to_string(),
            })?;

        let (public_key, address) = derive_public_values(&signing_key);
        let wallet = LocalWallet::from(signing_key).with_chain_id(self.chain_id);

        let identity = Identity {
            wallet,
            public_key,
            address,
        };

        *self.identity.write().await = Some(identity);
        info!("🔑 identity installed for 0x{}", hex::encode(address));

        self.emit(IdentityEvent::Installed { address }).await;
        self.spawn_balance_refresh(address);
        Ok(address)
    }

    /// Install from the conventional hex rendering (`0x` prefix optional)
    pub async fn set_private_key_hex(&self, secret: &str) -> Result<Address, IdentityError> {
        let trimmed = secret.trim();
        let hex_str = trimmed.strip_prefix("0x").unwrap_or(trimmed);

        let bytes = hex::decode(hex_str).map_err(|e| IdentityError::InvalidKeyFormat {
            reason: format!("invalid hex: {}", e),
        })?;

        self.set_private_key(&bytes).await
    }

    /// Uninstall the identity wholesale
    pub async fn clear(&self) {
        let removed = self.identity.write().await.take();
        if removed.is_some() {
            info!("identity cleared");
            self.emit(IdentityEvent::Cleared).await;
        }
    }

    /// Ledger address of the installed identity, if any
    pub async fn address(&self) -> Option<Address> {
        self.identity.read().await.as_ref().map(|i| i.address)
    }

    /// Lowercase hex rendering of the address, `0x`-prefixed
    pub async fn address_hex(&self) -> Option<String> {
        self.address().await.map(|a| format!("0x{}", hex::encode(a)))
    }

    /// 64-byte uncompressed public key of the installed identity
    pub async fn public_key(&self) -> Option<[u8; 64]> {
        self.identity.read().await.as_ref().map(|i| i.public_key)
    }

    /// Sign a prepared transaction with the identity's private key
    pub async fn sign_transaction(
        &self,
        tx: &TypedTransaction,
    ) -> Result<Signature, IdentityError> {
        let guard = self.identity.read().await;
        let identity = guard.as_ref().ok_or(IdentityError::NoIdentity)?;
        identity
            .wallet
            .sign_transaction_sync(tx)
            .map_err(|e| IdentityError::Signing(e.to_string()))
    }

    /// Derive the shared message key with a counterparty
    ///
    /// The secret bytes never leave this module; the derivation happens
    /// against the installed key in place.
    pub async fn shared_secret(
        &self,
        counterparty_public_key: &[u8],
    ) -> Result<[u8; 32], CryptoError> {
        let guard = self.identity.read().await;
        let identity = guard.as_ref().ok_or_else(|| CryptoError::InvalidKey {
            key_type: "local_private_key".to_string(),
            reason: "no identity installed".to_string(),
        })?;

        let secret = identity.wallet.signer().to_bytes();
        derive_shared_secret(secret.as_slice(), counterparty_public_key)
    }

    fn spawn_balance_refresh(&self, address: Address) {
        let ledger = self.ledger.clone();
        let subscribers = self.subscribers.clone();
        tokio::spawn(async move {
            match ledger.get_balance(address).await {
                Ok(balance) => {
                    let subs = subscribers.read().await;
                    for tx in subs.iter() {
                        let _ = tx
                            .send(IdentityEvent::BalanceRefreshed { address, balance })
                            .await;
                    }
                }
                Err(e) => warn!("balance refresh failed: {}", e),
            }
        });
    }

    async fn emit(&self, event: IdentityEvent) {
        let subs = self.subscribers.read().await;
        for tx in subs.iter() {
            let _ = tx.send(event.clone()).await;
        }
    }
}

/// Derive the uncompressed public key and keccak address from a signing key
fn derive_public_values(signing_key: &SigningKey) -> ([u8; 64], Address) {
    let verifying_key = signing_key.verifying_key();
    let point = verifying_key.to_encoded_point(false);

    // Skip the 0x04 SEC1 tag; the remaining 64 bytes are the raw key.
    let mut public_key = [0u8; 64];
    public_key.copy_from_slice(&point.as_bytes()[1..]);

    // Address = last 20 bytes of keccak256(public key)
    let mut hasher = Keccak::v256();
    let mut hash = [0u8; 32];
    hasher.update(&public_key);
    hasher.finalize(&mut hash);

    (public_key, Address::from_slice(&hash[12..]))
}
