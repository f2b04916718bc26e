// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Chat Orchestration
//!
//! The operations a messaging client performs against the chat
//! contract: membership, contacts, profile, and encrypted messages.
//! State-changing calls go through the [`TransactionPipeline`]; this
//! module adds the encryption glue and maps lifecycle outcomes onto
//! message-status decisions for the persistence collaborator.
//!
//! A `Rejected` outcome deliberately produces no message record at all:
//! the message is treated as never sent.

pub mod types;

pub use types::{
    ChatEvent, Contact, Direction, EncryptedMessage, MemberProfile, MessageError, MessageStatus,
};

use ethers::abi::AbiDecode;
use ethers::types::{Address, Bytes};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info};

use crate::config::ChatConfig;
use crate::contracts::{ChatCall, GetContactListReturn, LedgerClient, MembersReturn};
use crate::crypto::{decrypt_message, encrypt_message, ALGORITHM_ID};
use crate::identity::IdentityManager;
use crate::pipeline::{LifecycleEvent, QueryError, TransactionPipeline};
use crate::utils::{ascii_to_bytes32, bytes32_to_ascii};

/// The client-side core: identity, pipeline and chat operations
pub struct ChatService {
    identity: Arc<IdentityManager>,
    pipeline: TransactionPipeline,
    subscribers: Arc<RwLock<Vec<mpsc::Sender<ChatEvent>>>>,
}

impl ChatService {
    pub fn new(config: ChatConfig, ledger: Arc<dyn LedgerClient>) -> Self {
        let identity = Arc::new(IdentityManager::new(ledger.clone(), config.chain.chain_id));
        let pipeline = TransactionPipeline::new(identity.clone(), ledger, &config);

        Self {
            identity,
            pipeline,
            subscribers: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn identity(&self) -> Arc<IdentityManager> {
        self.identity.clone()
    }

    pub fn pipeline(&self) -> &TransactionPipeline {
        &self.pipeline
    }

    /// Subscribe to chat events (message records, status transitions)
    pub async fn subscribe(&self) -> mpsc::Receiver<ChatEvent> {
        let (tx, rx) = mpsc::channel(64);
        self.subscribers.write().await.push(tx);
        rx
    }

    /// Register the local identity as a member of the chat contract
    pub async fn join(&self) -> Result<mpsc::Receiver<LifecycleEvent>, MessageError> {
        let public_key = self
            .identity
            .public_key()
            .await
            .ok_or(MessageError::NoIdentity)?;
        Ok(self.pipeline.submit(ChatCall::join(&public_key)))
    }

    /// Request a contact relationship with another member
    pub fn add_contact(&self, contact: Address) -> mpsc::Receiver<LifecycleEvent> {
        self.pipeline.submit(ChatCall::add_contact(contact))
    }

    pub fn accept_contact_request(&self, contact: Address) -> mpsc::Receiver<LifecycleEvent> {
        self.pipeline
            .submit(ChatCall::accept_contact_request(contact))
    }

    /// Update the on-chain display name and avatar URL
    pub fn update_profile(
        &self,
        name: &str,
        avatar_url: &str,
    ) -> Result<mpsc::Receiver<LifecycleEvent>, MessageError> {
        let name = ascii_to_bytes32(name)?;
        let avatar_url = ascii_to_bytes32(avatar_url)?;
        Ok(self.pipeline.submit(ChatCall::update_profile(name, avatar_url)))
    }

    /// Encrypt and send a message to a contact
    ///
    /// The returned stream mirrors the underlying call's lifecycle. In
    /// parallel, [`ChatEvent`]s carry the persistence decisions:
    /// `Approved` stores the pending record, `Receipt` marks it
    /// `Success`, `Error` marks it `Failed`, and `Rejected` stores
    /// nothing.
    pub async fn send_message(
        &self,
        to: Address,
        counterparty_public_key: &[u8],
        plaintext: &[u8],
    ) -> Result<mpsc::Receiver<LifecycleEvent>, MessageError> {
        let key = self.identity.shared_secret(counterparty_public_key).await?;
        let envelope = Bytes::from(encrypt_message(plaintext, &key)?);
        let algorithm = ascii_to_bytes32(ALGORITHM_ID).expect("algorithm id fits in bytes32");

        let call = ChatCall::send_message(to, envelope.clone(), algorithm);
        let mut lifecycle = self.pipeline.submit(call);

        let (forward, receiver) = mpsc::channel(8);
        let subscribers = self.subscribers.clone();
        tokio::spawn(async move {
            while let Some(event) = lifecycle.recv().await {
                match &event {
                    LifecycleEvent::Approved(hash) => {
                        let message = EncryptedMessage {
                            ciphertext: envelope.clone(),
                            algorithm: ALGORITHM_ID.to_string(),
                            counterparty: to,
                            direction: Direction::Outbound,
                            status: MessageStatus::Pending,
                            transaction_hash: Some(*hash),
                        };
                        emit(&subscribers, ChatEvent::MessageStored { message }).await;
                    }
                    LifecycleEvent::Receipt(confirmation) => {
                        emit(
                            &subscribers,
                            ChatEvent::MessageStatusChanged {
                                counterparty: to,
                                transaction_hash: confirmation.transaction_hash,
                                status: MessageStatus::Success,
                            },
                        )
                        .await;
                    }
                    LifecycleEvent::Error { hash, .. } => {
                        emit(
                            &subscribers,
                            ChatEvent::MessageStatusChanged {
                                counterparty: to,
                                transaction_hash: *hash,
                                status: MessageStatus::Failed,
                            },
                        )
                        .await;
                    }
                    // Never submitted: the message is treated as never sent.
                    LifecycleEvent::Rejected(reason) => {
                        debug!("message to 0x{} rejected: {}", hex::encode(to), reason);
                    }
                }
                let _ = forward.send(event).await;
            }
        });

        Ok(receiver)
    }

    /// Decrypt an inbound message envelope from a known sender
    pub async fn decrypt_incoming(
        &self,
        sender_public_key: &[u8],
        envelope: &[u8],
    ) -> Result<Vec<u8>, MessageError> {
        let key = self.identity.shared_secret(sender_public_key).await?;
        Ok(decrypt_message(envelope, &key)?)
    }

    /// Fetch a member's profile; `None` when the address never joined
    pub async fn profile(&self, member: Address) -> Result<Option<MemberProfile>, QueryError> {
        let raw = self.pipeline.query(ChatCall::members(member)).await?;
        let decoded =
            MembersReturn::decode(raw.as_ref()).map_err(|e| QueryError::Decode(e.to_string()))?;

        if !decoded.is_member {
            return Ok(None);
        }

        let mut public_key = [0u8; 64];
        public_key[..32].copy_from_slice(&decoded.public_key_left);
        public_key[32..].copy_from_slice(&decoded.public_key_right);

        let profile = MemberProfile {
            address: member,
            public_key,
            name: bytes32_to_ascii(&decoded.name),
            avatar_url: bytes32_to_ascii(&decoded.avatar_url),
        };

        info!("👤 profile loaded for 0x{}", hex::encode(member));
        emit(
            &self.subscribers,
            ChatEvent::ProfileLoaded {
                profile: profile.clone(),
            },
        )
        .await;

        Ok(Some(profile))
    }

    /// Fetch the caller's contact list
    pub async fn contact_list(&self) -> Result<Vec<Contact>, QueryError> {
        let raw = self.pipeline.query(ChatCall::contact_list()).await?;
        let decoded = GetContactListReturn::decode(raw.as_ref())
            .map_err(|e| QueryError::Decode(e.to_string()))?;

        let contacts = decoded
            .contact_addresses
            .into_iter()
            .zip(decoded.contact_names)
            .zip(decoded.contact_avatar_urls)
            .map(|((address, name), avatar_url)| Contact {
                address,
                name: bytes32_to_ascii(&name),
                avatar_url: bytes32_to_ascii(&avatar_url),
            })
            .collect();

        Ok(contacts)
    }
}

async fn emit(subscribers: &Arc<RwLock<Vec<mpsc::Sender<ChatEvent>>>>, event: ChatEvent) {
    let subs = subscribers.read().await;
    for tx in subs.iter() {
        let _ = tx.send(event.clone()).await;
    }
}
