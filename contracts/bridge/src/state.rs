//! State definitions for the Fuel bridge gateway.
//!
//! The durable footprint of the bridge is four maps: commitments by height,
//! asset bindings by L1 token, rate limit state by (flow, L1 token) and
//! consumed nonces by (source chain, nonce). Everything else is configuration
//! or bookkeeping derived from those operations.

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Timestamp, Uint128};
use cw_storage_plus::{Item, Map};

use crate::proof::ProofScheme;

// ============================================================================
// Core Configuration
// ============================================================================

/// Contract configuration
#[cw_serde]
pub struct Config {
    /// Chain id every withdrawn message must originate from
    pub l2_chain_id: u64,
    /// Chain id stamped on messages emitted by deposits
    pub l1_chain_id: u64,
    /// Seconds a commitment must age before withdrawals may rely on it
    pub finality_delay: u64,
    /// Active inclusion proof scheme
    pub proof_scheme: ProofScheme,
    /// First height the registry accepts
    pub start_height: u64,
}

/// Pause flags, one per subsystem. Unpaused at genesis.
#[cw_serde]
#[derive(Default)]
pub struct GovernanceState {
    pub deposits_paused: bool,
    pub withdrawals_paused: bool,
}

// ============================================================================
// Chain State Registry
// ============================================================================

/// An accepted L2 block state root. Never modified once stored.
#[cw_serde]
pub struct BlockCommitment {
    pub block_height: u64,
    pub state_root: [u8; 32],
    pub timestamp: Timestamp,
}

// ============================================================================
// Asset Registry
// ============================================================================

/// Canonical mapping between an L1 token and its L2 representation
#[cw_serde]
pub struct AssetBinding {
    /// CW20 token contract on this chain
    pub l1_token: Addr,
    /// Asset id on the L2
    pub l2_asset_id: [u8; 32],
    pub l1_decimals: u8,
    pub l2_decimals: u8,
}

// ============================================================================
// Rate Limiter
// ============================================================================

/// A limit change waiting for the next epoch boundary
#[cw_serde]
pub struct PendingLimit {
    pub limit: Uint128,
    pub epoch_duration: u64,
}

/// Per-asset, per-flow epoch accounting. Amounts are in L1 decimals.
#[cw_serde]
pub struct RateLimitState {
    /// Index of the epoch starting at `epoch_start`
    pub epoch: u64,
    /// Start of the current epoch, always on the epoch grid
    pub epoch_start: Timestamp,
    pub epoch_duration: u64,
    pub limit: Uint128,
    pub consumed: Uint128,
    /// Applied when the next epoch opens
    pub pending: Option<PendingLimit>,
}

// ============================================================================
// Constants
// ============================================================================

/// Contract name for cw2 migration info
pub const CONTRACT_NAME: &str = "crates.io:fuel-bridge";

/// Contract version for cw2 migration info
pub const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Upper bound for the finality delay (30 days)
pub const MAX_FINALITY_DELAY: u64 = 2_592_000;

/// Upper bound for a rate limit epoch (365 days)
pub const MAX_EPOCH_DURATION: u64 = 31_536_000;

/// Default and maximum page sizes for enumeration queries
pub const DEFAULT_PAGE_LIMIT: u32 = 10;
pub const MAX_PAGE_LIMIT: u32 = 50;

// ============================================================================
// Core State Storage
// ============================================================================

/// Primary config storage
pub const CONFIG: Item<Config> = Item::new("config");

/// Pause flags
pub const GOVERNANCE: Item<GovernanceState> = Item::new("governance");

/// Role membership
/// Key: (role key, address), Value: always true while the role is held
pub const ROLES: Map<(&str, &Addr), bool> = Map::new("roles");

/// Number of current admins (the last one can't be revoked)
pub const ADMIN_COUNT: Item<u32> = Item::new("admin_count");

// ============================================================================
// Registry State
// ============================================================================

/// Accepted commitments
/// Key: block height, Value: BlockCommitment
pub const COMMITMENTS: Map<u64, BlockCommitment> = Map::new("commitments");

/// Height of the latest accepted commitment (absent before the first commit)
pub const LAST_HEIGHT: Item<u64> = Item::new("last_height");

/// Asset bindings
/// Key: L1 token address, Value: AssetBinding
pub const BINDINGS: Map<&Addr, AssetBinding> = Map::new("bindings");

/// Reverse index for withdrawals
/// Key: 32-byte L2 asset id, Value: L1 token address
pub const L2_ASSET_INDEX: Map<&[u8], Addr> = Map::new("l2_asset_index");

/// Rate limit accounting
/// Key: (flow key, L1 token), Value: RateLimitState
pub const RATE_LIMITS: Map<(u8, &Addr), RateLimitState> = Map::new("rate_limits");

// ============================================================================
// Gateway State
// ============================================================================

/// Consumed withdrawal nonces, never pruned
/// Key: (source chain, nonce), Value: true once released
pub const CONSUMED_NONCES: Map<(u64, u64), bool> = Map::new("consumed_nonces");

/// Next nonce for outgoing deposit messages
pub const OUTGOING_NONCE: Item<u64> = Item::new("outgoing_nonce");

/// Token balances locked in the bridge
/// Key: L1 token address, Value: locked amount
pub const LOCKED_BALANCES: Map<&Addr, Uint128> = Map::new("locked_balances");
