// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Chat Contract ABI
//!
//! Bindings for the on-chain chat contract and the catalogue of call
//! payloads the pipeline can submit. State-changing calls are prepared
//! as raw calldata ([`ChatCall`]) so the pipeline owns nonce, gas and
//! signing; read-only calls are decoded with the generated return
//! structs.

use ethers::abi::AbiEncode;
use ethers::prelude::abigen;
use ethers::types::{Address, Bytes};

abigen!(
    EtherChat,
    r#"[
        function join(bytes32 publicKeyLeft, bytes32 publicKeyRight)
        function addContact(address contact)
        function acceptContactRequest(address contact)
        function updateProfile(bytes32 name, bytes32 avatarUrl)
        function sendMessage(address to, bytes message, bytes32 encryptAlgorithm)
        function members(address member) external view returns (bytes32 publicKeyLeft, bytes32 publicKeyRight, bytes32 name, bytes32 avatarUrl, bool isMember)
        function getContactList() external view returns (address[] contactAddresses, bytes32[] contactNames, bytes32[] contactAvatarUrls)
    ]"#
);

/// A prepared contract call: ABI-encoded payload plus a label for logs
#[derive(Debug, Clone)]
pub struct ChatCall {
    pub name: &'static str,
    pub data: Bytes,
}

impl ChatCall {
    /// Register the local identity; the 64-byte public key is stored as
    /// two `bytes32` halves.
    pub fn join(public_key: &[u8; 64]) -> Self {
        let mut left = [0u8; 32];
        let mut right = [0u8; 32];
        left.copy_from_slice(&public_key[..32]);
        right.copy_from_slice(&public_key[32..]);

        Self {
            name: "join",
            data: JoinCall {
                public_key_left: left,
                public_key_right: right,
            }
            .encode()
            .into(),
        }
    }

    pub fn add_contact(contact: Address) -> Self {
        Self {
            name: "addContact",
            data: AddContactCall { contact }.encode().into(),
        }
    }

    pub fn accept_contact_request(contact: Address) -> Self {
        Self {
            name: "acceptContactRequest",
            data: AcceptContactRequestCall { contact }.encode().into(),
        }
    }

    pub fn update_profile(name: [u8; 32], avatar_url: [u8; 32]) -> Self {
        Self {
            name: "updateProfile",
            data: UpdateProfileCall { name, avatar_url }.encode().into(),
        }
    }

    pub fn send_message(to: Address, envelope: Bytes, algorithm: [u8; 32]) -> Self {
        Self {
            name: "sendMessage",
            data: SendMessageCall {
                to,
                message: envelope,
                encrypt_algorithm: algorithm,
            }
            .encode()
            .into(),
        }
    }

    pub fn members(member: Address) -> Self {
        Self {
            name: "members",
            data: MembersCall { member }.encode().into(),
        }
    }

    pub fn contact_list() -> Self {
        Self {
            name: "getContactList",
            data: GetContactListCall.encode().into(),
        }
    }
}
