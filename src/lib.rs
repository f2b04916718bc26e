// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod config;
pub mod contracts;
pub mod crypto;
pub mod identity;
pub mod messaging;
pub mod pipeline;
pub mod utils;
pub mod version;

// Re-export main types
pub use config::{ChainProfile, ChatConfig};
pub use contracts::{ChatCall, Confirmation, LedgerClient, MockLedger, RpcLedgerClient};
pub use crypto::{
    decrypt_message, derive_shared_secret, encrypt_message, CryptoError, ALGORITHM_ID,
};
pub use identity::{IdentityError, IdentityEvent, IdentityManager};
pub use messaging::{
    ChatEvent, ChatService, Contact, Direction, EncryptedMessage, MemberProfile, MessageError,
    MessageStatus,
};
pub use pipeline::{LifecycleEvent, QueryError, RejectReason, TransactionPipeline};
pub use utils::{ascii_to_bytes32, bytes32_to_ascii, EncodingError};
