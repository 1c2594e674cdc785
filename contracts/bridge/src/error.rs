//! Error types for the Fuel bridge gateway.
//!
//! Retryable conditions are `RateLimitExceeded` (wait for the next epoch) and
//! `NotYetFinalized` (wait for the finality delay). Everything else is final
//! for the given inputs.

use cosmwasm_std::{StdError, Uint128};
use thiserror::Error;

use crate::msg::{Role, Subsystem};

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    // ========================================================================
    // Access Control Errors
    // ========================================================================

    #[error("Unauthorized: {role} role required")]
    Unauthorized { role: Role },

    #[error("Cannot revoke the last admin")]
    CannotRevokeLastAdmin,

    #[error("{subsystem} are paused")]
    SubsystemPaused { subsystem: Subsystem },

    // ========================================================================
    // Chain State Registry Errors
    // ========================================================================

    #[error("Out of order commitment: expected height {expected}, got {got}")]
    OutOfOrderCommitment { expected: u64, got: u64 },

    #[error("Invalid commitment timestamp: {reason}")]
    InvalidTimestamp { reason: String },

    #[error("Height {height} not yet finalized")]
    NotYetFinalized { height: u64 },

    #[error("Invalid inclusion proof at height {height}")]
    InvalidProof { height: u64 },

    #[error("Invalid finality delay: must be at most {max} seconds")]
    InvalidFinalityDelay { max: u64 },

    // ========================================================================
    // Asset Registry Errors
    // ========================================================================

    #[error("Unbound asset: {asset}")]
    UnboundAsset { asset: String },

    #[error("L2 asset {l2_asset_id} already bound to {l1_token}")]
    AssetIdInUse {
        l2_asset_id: String,
        l1_token: String,
    },

    // ========================================================================
    // Rate Limit Errors
    // ========================================================================

    #[error("Rate limit exceeded: limit {limit}, consumed {consumed}, requested {requested}")]
    RateLimitExceeded {
        limit: Uint128,
        consumed: Uint128,
        requested: Uint128,
    },

    #[error("Invalid epoch duration: must be between 1 and {max} seconds")]
    InvalidEpochDuration { max: u64 },

    // ========================================================================
    // Gateway Errors
    // ========================================================================

    #[error("Message from chain {got} rejected: expected chain {expected}")]
    UnexpectedSourceChain { expected: u64, got: u64 },

    #[error("Message already processed: source chain {source_chain}, nonce {nonce}")]
    ReplayedMessage { source_chain: u64, nonce: u64 },

    #[error("Transfer failed: {reason}")]
    TransferFailed { reason: String },

    #[error("Invalid amount: {reason}")]
    InvalidAmount { reason: String },

    #[error("Invalid address: {reason}")]
    InvalidAddress { reason: String },

    #[error("Invalid hash length: expected 32 bytes, got {got}")]
    InvalidHashLength { got: usize },

    // ========================================================================
    // Migration Errors
    // ========================================================================

    #[error("Invalid migration: {reason}")]
    InvalidMigration { reason: String },
}
