//! Message types for the Fuel bridge gateway
//!
//! This module defines all messages for instantiation, execution, and queries.

use std::fmt;

use common::{MerkleProof, Message};
use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, Binary, Timestamp, Uint128};

use crate::proof::ProofScheme;

// ============================================================================
// Shared Enums
// ============================================================================

/// Capability tags. Roles never imply one another.
#[cw_serde]
#[derive(Copy, Eq)]
pub enum Role {
    /// Governance: grants and revokes roles, binds assets, sets limits, unpauses
    Admin,
    /// Submits L2 block commitments
    Committer,
    /// Pauses subsystems
    Pauser,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Committer => "committer",
            Role::Pauser => "pauser",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Independently pausable parts of the gateway
#[cw_serde]
#[derive(Copy, Eq)]
pub enum Subsystem {
    Deposits,
    Withdrawals,
}

impl Subsystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            Subsystem::Deposits => "deposits",
            Subsystem::Withdrawals => "withdrawals",
        }
    }
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of an asset movement, each with its own rate limit
#[cw_serde]
#[derive(Copy, Eq)]
pub enum Flow {
    Deposit,
    Withdrawal,
}

impl Flow {
    /// Storage key prefix
    pub fn key(&self) -> u8 {
        match self {
            Flow::Deposit => 0,
            Flow::Withdrawal => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Flow::Deposit => "deposit",
            Flow::Withdrawal => "withdrawal",
        }
    }
}

// ============================================================================
// Instantiate & Migrate
// ============================================================================

/// Migrate message
#[cw_serde]
pub struct MigrateMsg {}

/// Instantiate message
#[cw_serde]
pub struct InstantiateMsg {
    /// Initial governance admins (at least one)
    pub admins: Vec<String>,
    /// Initial committers
    pub committers: Vec<String>,
    /// Initial pausers
    pub pausers: Vec<String>,
    /// Chain id of the Fuel L2; withdrawn messages must originate there
    pub l2_chain_id: u64,
    /// Chain id of this chain, stamped on deposit messages
    pub l1_chain_id: u64,
    /// First L2 height the registry accepts
    pub start_height: u64,
    /// Seconds before a commitment is final
    pub finality_delay: u64,
    /// Inclusion proof scheme, defaults to `IndexedKeccakV2`
    pub proof_scheme: Option<ProofScheme>,
}

// ============================================================================
// Execute Messages
// ============================================================================

/// Execute messages
#[cw_serde]
pub enum ExecuteMsg {
    // ========================================================================
    // Gateway
    // ========================================================================
    /// Lock `amount` of a CW20 token and emit a message towards L2.
    ///
    /// The caller must have granted this contract an allowance of at least
    /// `amount` on `l1_token`.
    Deposit {
        l1_token: String,
        amount: Uint128,
        /// 32-byte Fuel address, `0x`-prefixed hex
        l2_recipient: String,
    },

    /// Deposit through CW20 `Send` (tokens arrive with the call)
    Receive(cw20::Cw20ReceiveMsg),

    /// Release funds for an L2 message proven against the root at `height`.
    ///
    /// Authorization: Anyone (funds always go to `message.recipient`)
    Withdraw {
        message: Message,
        proof: MerkleProof,
        height: u64,
    },

    // ========================================================================
    // Chain State Registry
    // ========================================================================
    /// Accept the state root of the next L2 block
    ///
    /// Authorization: Committer only
    Commit {
        height: u64,
        /// 32-byte state root
        state_root: Binary,
        /// Seconds since epoch when the L2 block was produced
        timestamp: u64,
    },

    // ========================================================================
    // Governance
    // ========================================================================
    /// Authorization: Admin only
    GrantRole { role: Role, address: String },

    /// Authorization: Admin only
    RevokeRole { role: Role, address: String },

    /// Authorization: Pauser or Admin
    Pause { subsystem: Subsystem },

    /// Authorization: Admin only
    Unpause { subsystem: Subsystem },

    /// Bind (or rebind) an L1 token to an L2 asset id
    ///
    /// Authorization: Admin only
    BindAsset {
        l1_token: String,
        /// 32-byte L2 asset id
        l2_asset_id: Binary,
        l1_decimals: u8,
        l2_decimals: u8,
    },

    /// Set the per-epoch cap of a token for one flow. Applies from the next
    /// epoch boundary when the flow already has an open epoch.
    ///
    /// Authorization: Admin only
    SetRateLimit {
        l1_token: String,
        flow: Flow,
        limit: Uint128,
        epoch_duration: u64,
    },

    /// Authorization: Admin only
    SetFinalityDelay { seconds: u64 },

    /// Authorization: Admin only
    SetProofScheme { scheme: ProofScheme },
}

/// Payload of a CW20 `Send` to the gateway
#[cw_serde]
pub enum ReceiveMsg {
    Deposit { l2_recipient: String },
}

// ============================================================================
// Query Messages
// ============================================================================

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(ConfigResponse)]
    Config {},

    /// Pause flags, latest height and next outgoing nonce
    #[returns(StatusResponse)]
    Status {},

    #[returns(CommitmentResponse)]
    Commitment { height: u64 },

    #[returns(Option<CommitmentResponse>)]
    LatestCommitment {},

    #[returns(IsFinalizedResponse)]
    IsFinalized { height: u64 },

    /// Check a proof without touching any state
    #[returns(VerifyInclusionResponse)]
    VerifyInclusion {
        height: u64,
        leaf: Binary,
        proof: MerkleProof,
    },

    /// Compute the Merkle leaf of a message
    #[returns(MessageLeafResponse)]
    MessageLeaf { message: Message },

    #[returns(AssetBindingResponse)]
    AssetBinding { l1_token: String },

    #[returns(AssetBindingResponse)]
    AssetByL2Id { l2_asset_id: Binary },

    #[returns(AssetBindingsResponse)]
    AssetBindings {
        start_after: Option<String>,
        limit: Option<u32>,
    },

    /// Rate limit state as of the current block time
    #[returns(Option<RateLimitResponse>)]
    RateLimit { l1_token: String, flow: Flow },

    #[returns(NonceConsumedResponse)]
    NonceConsumed { source_chain: u64, nonce: u64 },

    #[returns(HasRoleResponse)]
    HasRole { role: Role, address: String },

    #[returns(RoleMembersResponse)]
    RoleMembers {
        role: Role,
        start_after: Option<String>,
        limit: Option<u32>,
    },

    #[returns(LockedBalanceResponse)]
    LockedBalance { l1_token: String },

    /// Nonce the next deposit message will carry
    #[returns(NonceResponse)]
    CurrentNonce {},
}

// ============================================================================
// Query Responses
// ============================================================================

#[cw_serde]
pub struct ConfigResponse {
    pub l2_chain_id: u64,
    pub l1_chain_id: u64,
    pub finality_delay: u64,
    pub proof_scheme: ProofScheme,
    pub start_height: u64,
}

#[cw_serde]
pub struct StatusResponse {
    pub deposits_paused: bool,
    pub withdrawals_paused: bool,
    pub last_height: Option<u64>,
    pub next_nonce: u64,
}

#[cw_serde]
pub struct CommitmentResponse {
    pub block_height: u64,
    pub state_root: Binary,
    pub timestamp: Timestamp,
    pub finalized: bool,
}

#[cw_serde]
pub struct IsFinalizedResponse {
    pub finalized: bool,
}

#[cw_serde]
pub struct VerifyInclusionResponse {
    pub valid: bool,
}

#[cw_serde]
pub struct MessageLeafResponse {
    pub leaf: Binary,
}

#[cw_serde]
pub struct AssetBindingResponse {
    pub l1_token: Addr,
    pub l2_asset_id: Binary,
    pub l1_decimals: u8,
    pub l2_decimals: u8,
}

#[cw_serde]
pub struct AssetBindingsResponse {
    pub bindings: Vec<AssetBindingResponse>,
}

#[cw_serde]
pub struct RateLimitResponse {
    pub epoch: u64,
    pub epoch_start: Timestamp,
    pub epoch_duration: u64,
    pub limit: Uint128,
    pub consumed: Uint128,
    pub remaining: Uint128,
    pub pending_limit: Option<Uint128>,
    pub pending_epoch_duration: Option<u64>,
}

#[cw_serde]
pub struct NonceConsumedResponse {
    pub consumed: bool,
}

#[cw_serde]
pub struct HasRoleResponse {
    pub has_role: bool,
}

#[cw_serde]
pub struct RoleMembersResponse {
    pub members: Vec<Addr>,
}

#[cw_serde]
pub struct LockedBalanceResponse {
    pub l1_token: Addr,
    pub amount: Uint128,
}

#[cw_serde]
pub struct NonceResponse {
    pub nonce: u64,
}
