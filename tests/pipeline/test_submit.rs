//! Submission lifecycle: Approved/Receipt/Error/Rejected ordering and
//! terminal-event exclusivity

use ethers::types::Address;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use etherchat_core::{
    ChatCall, ChatConfig, IdentityManager, LifecycleEvent, MockLedger, RejectReason,
    TransactionPipeline,
};

const DEVNET_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

fn test_config() -> ChatConfig {
    let mut config = ChatConfig::default();
    config.contract_address = Address::repeat_byte(0x42);
    config.receipt_timeout = Duration::from_millis(250);
    config
}

async fn pipeline_with(ledger: Arc<MockLedger>) -> TransactionPipeline {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let identity = Arc::new(IdentityManager::new(ledger.clone(), 31337));
    identity.set_private_key_hex(DEVNET_KEY).await.unwrap();
    TransactionPipeline::new(identity, ledger, &test_config())
}

async fn collect(mut events: mpsc::Receiver<LifecycleEvent>) -> Vec<LifecycleEvent> {
    let mut collected = Vec::new();
    while let Some(event) = events.recv().await {
        collected.push(event);
    }
    collected
}

fn terminal_count(events: &[LifecycleEvent]) -> usize {
    events.iter().filter(|e| e.is_terminal()).count()
}

#[tokio::test]
async fn test_approved_then_receipt() {
    let ledger = Arc::new(MockLedger::new());
    let pipeline = pipeline_with(ledger.clone()).await;

    let events = collect(pipeline.submit(ChatCall::add_contact(Address::repeat_byte(9)))).await;

    assert_eq!(events.len(), 2);
    let hash = match &events[0] {
        LifecycleEvent::Approved(hash) => *hash,
        other => panic!("expected Approved first, got {:?}", other),
    };
    match &events[1] {
        LifecycleEvent::Receipt(confirmation) => {
            assert_eq!(confirmation.transaction_hash, hash);
            assert!(confirmation.succeeded());
        }
        other => panic!("expected Receipt, got {:?}", other),
    }
    assert_eq!(terminal_count(&events), 1);
}

#[tokio::test]
async fn test_node_rejection_emits_rejected_only() {
    let ledger = Arc::new(MockLedger::new());
    ledger.reject_submissions(true);
    let pipeline = pipeline_with(ledger.clone()).await;

    let events = collect(pipeline.submit(ChatCall::add_contact(Address::repeat_byte(9)))).await;

    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        LifecycleEvent::Rejected(RejectReason::Submission(_))
    ));
    assert!(ledger.accepted_nonces().await.is_empty());
}

#[tokio::test]
async fn test_gas_estimation_failure_rejects_before_hash() {
    let ledger = Arc::new(MockLedger::new());
    ledger.fail_gas_estimation(true);
    let pipeline = pipeline_with(ledger.clone()).await;

    let events = collect(pipeline.submit(ChatCall::add_contact(Address::repeat_byte(9)))).await;

    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        LifecycleEvent::Rejected(RejectReason::GasEstimation(_))
    ));
}

#[tokio::test]
async fn test_missing_identity_rejects() {
    let ledger = Arc::new(MockLedger::new());
    let identity = Arc::new(IdentityManager::new(ledger.clone(), 31337));
    let pipeline = TransactionPipeline::new(identity, ledger, &test_config());

    let events = collect(pipeline.submit(ChatCall::add_contact(Address::repeat_byte(9)))).await;

    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        LifecycleEvent::Rejected(RejectReason::NoIdentity)
    ));
}

#[tokio::test]
async fn test_reverted_transaction_surfaces_as_error_with_hash() {
    let ledger = Arc::new(MockLedger::new());
    ledger.revert_receipts(true);
    let pipeline = pipeline_with(ledger.clone()).await;

    let events = collect(pipeline.submit(ChatCall::add_contact(Address::repeat_byte(9)))).await;

    assert_eq!(events.len(), 2);
    let approved_hash = match &events[0] {
        LifecycleEvent::Approved(hash) => *hash,
        other => panic!("expected Approved first, got {:?}", other),
    };
    match &events[1] {
        LifecycleEvent::Error { detail, hash } => {
            assert_eq!(*hash, approved_hash);
            assert!(detail.contains("reverted"));
        }
        other => panic!("expected Error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_receipt_timeout_escalates_to_error() {
    let ledger = Arc::new(MockLedger::new());
    ledger.set_receipt_delay(Duration::from_secs(5)).await;
    let pipeline = pipeline_with(ledger.clone()).await;

    let events = collect(pipeline.submit(ChatCall::add_contact(Address::repeat_byte(9)))).await;

    assert_eq!(events.len(), 2);
    assert!(matches!(&events[0], LifecycleEvent::Approved(_)));
    match &events[1] {
        LifecycleEvent::Error { detail, .. } => {
            assert!(detail.contains("timed out"), "detail: {}", detail);
        }
        other => panic!("expected Error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_query_bypasses_the_pipeline() {
    let ledger = Arc::new(MockLedger::new());
    ledger
        .set_call_response(ethers::types::Bytes::from(vec![0u8; 32]))
        .await;
    let pipeline = pipeline_with(ledger.clone()).await;

    let result = pipeline.query(ChatCall::contact_list()).await.unwrap();
    assert_eq!(result.len(), 32);
    // Read-only calls never touch the node's transaction count.
    assert!(ledger.accepted_nonces().await.is_empty());
}
