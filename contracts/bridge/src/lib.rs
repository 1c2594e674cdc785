//! Fuel Bridge Gateway - L1 side of a token bridge to the Fuel L2
//!
//! The contract accepts L2 state commitments from authorized committers and
//! lets anyone withdraw tokens on L1 by proving a message against a
//! finalized commitment.
//!
//! # Deposit (L1 -> L2)
//! 1. User grants an allowance (or sends via CW20 `Send`)
//! 2. Tokens are locked and a nonce-stamped message is emitted
//! 3. The L2 relays the message and mints the bound asset
//!
//! # Withdraw (L2 -> L1)
//! 1. A committer records the L2 state root for a block height
//! 2. After the finality delay the commitment is final
//! 3. Anyone submits the message with an inclusion proof
//! 4. Locked tokens are released to the recipient
//!
//! # Security
//! - Role-based governance (admin, committer, pauser)
//! - Per-asset, per-direction rate limits over fixed epochs
//! - (source chain, nonce) replay protection
//! - Independent pause switches for deposits and withdrawals

pub mod assets;
pub mod commitments;
pub mod contract;
pub mod error;
mod execute;
pub mod governance;
pub mod msg;
pub mod proof;
mod query;
pub mod rate_limit;
pub mod state;

pub use crate::error::ContractError;
pub use crate::proof::{ProofScheme, ProofVerifier};
pub use common::{MerkleProof, Message};
