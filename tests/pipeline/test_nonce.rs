//! Nonce discipline: strictly increasing, no repeats, serialized
//! assignment even under concurrent submissions or a lagging node

use ethers::types::{Address, U256};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use etherchat_core::{
    ChatCall, ChatConfig, IdentityManager, LifecycleEvent, MockLedger, TransactionPipeline,
};

const DEVNET_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

fn test_config() -> ChatConfig {
    let mut config = ChatConfig::default();
    config.contract_address = Address::repeat_byte(0x42);
    config.receipt_timeout = Duration::from_millis(250);
    config
}

async fn pipeline_with(ledger: Arc<MockLedger>) -> TransactionPipeline {
    let identity = Arc::new(IdentityManager::new(ledger.clone(), 31337));
    identity.set_private_key_hex(DEVNET_KEY).await.unwrap();
    TransactionPipeline::new(identity, ledger, &test_config())
}

async fn drain(mut events: mpsc::Receiver<LifecycleEvent>) {
    while events.recv().await.is_some() {}
}

fn assert_strictly_increasing(nonces: &[U256]) {
    for pair in nonces.windows(2) {
        assert!(pair[1] > pair[0], "nonces must strictly increase: {:?}", nonces);
    }
}

#[tokio::test]
async fn test_sequential_nonces_start_at_the_node_count() {
    let ledger = Arc::new(MockLedger::new());
    ledger.set_transaction_count(5);
    let pipeline = pipeline_with(ledger.clone()).await;

    for _ in 0..3 {
        drain(pipeline.submit(ChatCall::add_contact(Address::repeat_byte(9)))).await;
    }

    let nonces = ledger.accepted_nonces().await;
    assert_eq!(
        nonces,
        vec![U256::from(5u64), U256::from(6u64), U256::from(7u64)]
    );
}

#[tokio::test]
async fn test_lagging_node_count_never_repeats_a_nonce() {
    let ledger = Arc::new(MockLedger::new());
    // The node keeps reporting a count that trails accepted submissions.
    ledger.set_count_lag(2);
    let pipeline = pipeline_with(ledger.clone()).await;

    for _ in 0..4 {
        drain(pipeline.submit(ChatCall::add_contact(Address::repeat_byte(9)))).await;
    }

    let nonces = ledger.accepted_nonces().await;
    assert_eq!(nonces.len(), 4);
    assert_strictly_increasing(&nonces);
}

#[tokio::test]
async fn test_concurrent_submissions_are_serialized() {
    let ledger = Arc::new(MockLedger::new());
    let pipeline = pipeline_with(ledger.clone()).await;

    let mut handles = Vec::new();
    for _ in 0..5 {
        let events = pipeline.submit(ChatCall::add_contact(Address::repeat_byte(9)));
        handles.push(tokio::spawn(drain(events)));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let nonces = ledger.accepted_nonces().await;
    assert_eq!(nonces.len(), 5);
    assert_strictly_increasing(&nonces);
}

#[tokio::test]
async fn test_rejected_submission_does_not_consume_a_nonce() {
    let ledger = Arc::new(MockLedger::new());
    let pipeline = pipeline_with(ledger.clone()).await;

    drain(pipeline.submit(ChatCall::add_contact(Address::repeat_byte(9)))).await;

    ledger.reject_submissions(true);
    drain(pipeline.submit(ChatCall::add_contact(Address::repeat_byte(9)))).await;
    ledger.reject_submissions(false);

    drain(pipeline.submit(ChatCall::add_contact(Address::repeat_byte(9)))).await;

    // The refused submission left no gap behind.
    let nonces = ledger.accepted_nonces().await;
    assert_eq!(nonces, vec![U256::from(0u64), U256::from(1u64)]);
}
