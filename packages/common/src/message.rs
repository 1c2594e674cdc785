//! Cross-chain message and its canonical leaf encoding.
//!
//! # Byte Layout
//! - Bytes 0-7:   source_chain (u64, big-endian)
//! - Bytes 8-15:  nonce (u64, big-endian)
//! - Bytes 16-31: amount (u128, big-endian)
//! - then `sender`, `recipient` and `data`, each prefixed with its length as
//!   a big-endian u32
//!
//! The Merkle leaf of a message is `keccak256` of this encoding. Length
//! prefixes keep the variable-size fields from being shifted into each other.

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Binary, Uint128};

use crate::hash::{keccak256, Bytes32};

/// A message exchanged between L1 and the Fuel L2.
///
/// Deposits emit one of these towards L2; withdrawals present one that was
/// committed into an L2 state root.
#[cw_serde]
pub struct Message {
    /// Originating account on the source chain
    pub sender: String,
    /// Receiving account on the destination chain
    pub recipient: String,
    /// Amount in the source chain's decimals for the asset
    pub amount: Uint128,
    /// Unique per source chain, used for replay protection
    pub nonce: u64,
    /// Payload; for asset transfers, the 32-byte L2 asset id
    pub data: Binary,
    /// Chain the message originates from
    pub source_chain: u64,
}

impl Message {
    /// Canonical byte encoding hashed into the Merkle leaf.
    pub fn encode(&self) -> Vec<u8> {
        let sender = self.sender.as_bytes();
        let recipient = self.recipient.as_bytes();
        let data = self.data.as_slice();

        let mut out = Vec::with_capacity(32 + 12 + sender.len() + recipient.len() + data.len());
        out.extend_from_slice(&self.source_chain.to_be_bytes());
        out.extend_from_slice(&self.nonce.to_be_bytes());
        out.extend_from_slice(&self.amount.u128().to_be_bytes());
        for field in [sender, recipient, data] {
            out.extend_from_slice(&(field.len() as u32).to_be_bytes());
            out.extend_from_slice(field);
        }
        out
    }

    /// Merkle leaf committed on the source chain for this message.
    pub fn leaf(&self) -> Bytes32 {
        keccak256(&self.encode())
    }

    /// The 32-byte asset id carried in `data`, if the payload is one.
    pub fn asset_id(&self) -> Option<Bytes32> {
        self.data.as_slice().try_into().ok()
    }
}
