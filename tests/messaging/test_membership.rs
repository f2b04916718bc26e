//! Membership and profile operations through the pipeline

use ethers::abi::AbiDecode;
use ethers::types::Address;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use etherchat_core::contracts::abi::{AddContactCall, JoinCall, UpdateProfileCall};
use etherchat_core::{
    ChatConfig, ChatService, LifecycleEvent, MessageError, MockLedger,
};

const DEVNET_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

fn test_config() -> ChatConfig {
    let mut config = ChatConfig::default();
    config.contract_address = Address::repeat_byte(0x42);
    config.receipt_timeout = Duration::from_millis(250);
    config
}

async fn service_with(ledger: Arc<MockLedger>) -> ChatService {
    let service = ChatService::new(test_config(), ledger);
    service
        .identity()
        .set_private_key_hex(DEVNET_KEY)
        .await
        .unwrap();
    service
}

async fn drain(mut events: mpsc::Receiver<LifecycleEvent>) -> Vec<LifecycleEvent> {
    let mut collected = Vec::new();
    while let Some(event) = events.recv().await {
        collected.push(event);
    }
    collected
}

#[tokio::test]
async fn test_join_submits_the_public_key_halves() {
    let ledger = Arc::new(MockLedger::new());
    let service = service_with(ledger.clone()).await;

    let events = drain(service.join().await.unwrap()).await;
    assert!(matches!(events.last(), Some(LifecycleEvent::Receipt(_))));

    let public_key = service.identity().public_key().await.unwrap();
    let inputs = ledger.accepted_inputs().await;
    let call = JoinCall::decode(inputs[0].as_ref()).unwrap();
    assert_eq!(call.public_key_left, public_key[..32]);
    assert_eq!(call.public_key_right, public_key[32..]);
}

#[tokio::test]
async fn test_join_without_identity_fails_upfront() {
    let ledger = Arc::new(MockLedger::new());
    let service = ChatService::new(test_config(), ledger);

    assert!(matches!(
        service.join().await,
        Err(MessageError::NoIdentity)
    ));
}

#[tokio::test]
async fn test_add_and_accept_contact_confirm() {
    let ledger = Arc::new(MockLedger::new());
    let service = service_with(ledger.clone()).await;
    let contact = Address::repeat_byte(0x33);

    let events = drain(service.add_contact(contact)).await;
    assert!(matches!(events.last(), Some(LifecycleEvent::Receipt(_))));

    let events = drain(service.accept_contact_request(contact)).await;
    assert!(matches!(events.last(), Some(LifecycleEvent::Receipt(_))));

    let inputs = ledger.accepted_inputs().await;
    assert_eq!(inputs.len(), 2);
    let decoded = AddContactCall::decode(inputs[0].as_ref()).unwrap();
    assert_eq!(decoded.contact, contact);
}

#[tokio::test]
async fn test_update_profile_encodes_the_text_fields() {
    let ledger = Arc::new(MockLedger::new());
    let service = service_with(ledger.clone()).await;

    let events = drain(
        service
            .update_profile("alice", "https://example.org/a.png")
            .unwrap(),
    )
    .await;
    assert!(matches!(events.last(), Some(LifecycleEvent::Receipt(_))));

    let inputs = ledger.accepted_inputs().await;
    let call = UpdateProfileCall::decode(inputs[0].as_ref()).unwrap();
    assert_eq!(&call.name[..5], b"alice");
    assert!(call.name[5..].iter().all(|&b| b == 0));
}

#[tokio::test]
async fn test_oversize_profile_name_is_rejected_locally() {
    let ledger = Arc::new(MockLedger::new());
    let service = service_with(ledger.clone()).await;

    let long_name = "a".repeat(33);
    let result = service.update_profile(&long_name, "");
    assert!(matches!(result, Err(MessageError::Encoding(_))));
    // Nothing reached the node.
    assert!(ledger.accepted_inputs().await.is_empty());
}
