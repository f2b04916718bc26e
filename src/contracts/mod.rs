// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod abi;
pub mod client;
pub mod mock;
pub mod types;

pub use abi::{ChatCall, GetContactListReturn, MembersReturn};
pub use client::{LedgerClient, RpcLedgerClient};
pub use mock::MockLedger;
pub use types::Confirmation;
