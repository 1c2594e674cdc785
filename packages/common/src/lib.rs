//! Common - Shared Types for the Fuel Bridge Contracts
//!
//! Wire-level types shared between the L1 gateway contract and the off-chain
//! tooling that relays messages and builds inclusion proofs:
//! - `Message` and its canonical Merkle leaf encoding
//! - Merkle tree builders and verifiers for both proof schemes
//! - keccak256 and 32-byte hex helpers

pub mod hash;
pub mod merkle;
pub mod message;

pub use hash::{bytes32_to_hex, keccak256, parse_bytes32_hex, Bytes32};
pub use merkle::MerkleProof;
pub use message::Message;
