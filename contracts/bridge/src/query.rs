//! Query handlers for the Fuel bridge gateway.

use common::{MerkleProof, Message};
use cosmwasm_std::{Binary, Deps, Env, Order, StdError, StdResult};
use cw_storage_plus::Bound;

use crate::assets;
use crate::commitments;
use crate::execute::parse_bytes32;
use crate::governance;
use crate::msg::{
    AssetBindingResponse, AssetBindingsResponse, CommitmentResponse, ConfigResponse, Flow,
    HasRoleResponse, IsFinalizedResponse, LockedBalanceResponse, MessageLeafResponse,
    NonceConsumedResponse, NonceResponse, RateLimitResponse, Role, RoleMembersResponse,
    StatusResponse, VerifyInclusionResponse,
};
use crate::rate_limit;
use crate::state::{
    AssetBinding, BlockCommitment, BINDINGS, COMMITMENTS, CONFIG, CONSUMED_NONCES,
    DEFAULT_PAGE_LIMIT, GOVERNANCE, LAST_HEIGHT, LOCKED_BALANCES, MAX_PAGE_LIMIT, OUTGOING_NONCE,
};

fn page_limit(limit: Option<u32>) -> usize {
    limit.unwrap_or(DEFAULT_PAGE_LIMIT).min(MAX_PAGE_LIMIT) as usize
}

// ============================================================================
// Core Queries
// ============================================================================

pub fn query_config(deps: Deps) -> StdResult<ConfigResponse> {
    let config = CONFIG.load(deps.storage)?;
    Ok(ConfigResponse {
        l2_chain_id: config.l2_chain_id,
        l1_chain_id: config.l1_chain_id,
        finality_delay: config.finality_delay,
        proof_scheme: config.proof_scheme,
        start_height: config.start_height,
    })
}

pub fn query_status(deps: Deps) -> StdResult<StatusResponse> {
    let governance = GOVERNANCE.load(deps.storage)?;
    Ok(StatusResponse {
        deposits_paused: governance.deposits_paused,
        withdrawals_paused: governance.withdrawals_paused,
        last_height: LAST_HEIGHT.may_load(deps.storage)?,
        next_nonce: OUTGOING_NONCE.load(deps.storage)?,
    })
}

pub fn query_current_nonce(deps: Deps) -> StdResult<NonceResponse> {
    Ok(NonceResponse {
        nonce: OUTGOING_NONCE.load(deps.storage)?,
    })
}

// ============================================================================
// Commitment Queries
// ============================================================================

fn commitment_response(
    deps: Deps,
    env: &Env,
    commitment: BlockCommitment,
) -> StdResult<CommitmentResponse> {
    let finalized =
        commitments::is_finalized(deps.storage, env.block.time, commitment.block_height)?;
    Ok(CommitmentResponse {
        block_height: commitment.block_height,
        state_root: Binary::from(commitment.state_root.to_vec()),
        timestamp: commitment.timestamp,
        finalized,
    })
}

pub fn query_commitment(deps: Deps, env: Env, height: u64) -> StdResult<CommitmentResponse> {
    let commitment = COMMITMENTS.load(deps.storage, height)?;
    commitment_response(deps, &env, commitment)
}

pub fn query_latest_commitment(deps: Deps, env: Env) -> StdResult<Option<CommitmentResponse>> {
    let Some(height) = LAST_HEIGHT.may_load(deps.storage)? else {
        return Ok(None);
    };
    let commitment = COMMITMENTS.load(deps.storage, height)?;
    commitment_response(deps, &env, commitment).map(Some)
}

pub fn query_is_finalized(deps: Deps, env: Env, height: u64) -> StdResult<IsFinalizedResponse> {
    Ok(IsFinalizedResponse {
        finalized: commitments::is_finalized(deps.storage, env.block.time, height)?,
    })
}

pub fn query_verify_inclusion(
    deps: Deps,
    height: u64,
    leaf: Binary,
    proof: MerkleProof,
) -> StdResult<VerifyInclusionResponse> {
    let leaf = parse_bytes32(&leaf).map_err(|e| StdError::generic_err(e.to_string()))?;
    Ok(VerifyInclusionResponse {
        valid: commitments::verify_inclusion(deps.storage, height, &leaf, &proof)?,
    })
}

pub fn query_message_leaf(message: Message) -> StdResult<MessageLeafResponse> {
    Ok(MessageLeafResponse {
        leaf: Binary::from(message.leaf().to_vec()),
    })
}

// ============================================================================
// Asset Queries
// ============================================================================

fn binding_response(binding: AssetBinding) -> AssetBindingResponse {
    AssetBindingResponse {
        l1_token: binding.l1_token,
        l2_asset_id: Binary::from(binding.l2_asset_id.to_vec()),
        l1_decimals: binding.l1_decimals,
        l2_decimals: binding.l2_decimals,
    }
}

pub fn query_asset_binding(deps: Deps, l1_token: String) -> StdResult<AssetBindingResponse> {
    let token = deps.api.addr_validate(&l1_token)?;
    let binding = assets::try_resolve(deps.storage, &token)?
        .ok_or_else(|| StdError::not_found(format!("binding for {l1_token}")))?;
    Ok(binding_response(binding))
}

pub fn query_asset_by_l2_id(deps: Deps, l2_asset_id: Binary) -> StdResult<AssetBindingResponse> {
    let asset_id =
        parse_bytes32(&l2_asset_id).map_err(|e| StdError::generic_err(e.to_string()))?;
    let binding = assets::resolve_l2(deps.storage, &asset_id)
        .map_err(|e| StdError::not_found(e.to_string()))?;
    Ok(binding_response(binding))
}

pub fn query_asset_bindings(
    deps: Deps,
    start_after: Option<String>,
    limit: Option<u32>,
) -> StdResult<AssetBindingsResponse> {
    let limit = page_limit(limit);
    let start_addr = start_after
        .map(|addr| deps.api.addr_validate(&addr))
        .transpose()?;
    let start = start_addr.as_ref().map(Bound::exclusive);

    let bindings = BINDINGS
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .map(|item| item.map(|(_, binding)| binding_response(binding)))
        .collect::<StdResult<Vec<_>>>()?;

    Ok(AssetBindingsResponse { bindings })
}

pub fn query_locked_balance(deps: Deps, l1_token: String) -> StdResult<LockedBalanceResponse> {
    let token = deps.api.addr_validate(&l1_token)?;
    let amount = LOCKED_BALANCES
        .may_load(deps.storage, &token)?
        .unwrap_or_default();
    Ok(LockedBalanceResponse {
        l1_token: token,
        amount,
    })
}

// ============================================================================
// Rate Limit Queries
// ============================================================================

/// Rate limit state rolled forward to the current block time.
pub fn query_rate_limit(
    deps: Deps,
    env: Env,
    l1_token: String,
    flow: Flow,
) -> StdResult<Option<RateLimitResponse>> {
    let token = deps.api.addr_validate(&l1_token)?;
    let Some(state) = rate_limit::load(deps.storage, flow, &token)? else {
        return Ok(None);
    };
    let state = state.rolled(env.block.time);
    Ok(Some(RateLimitResponse {
        epoch: state.epoch,
        epoch_start: state.epoch_start,
        epoch_duration: state.epoch_duration,
        limit: state.limit,
        consumed: state.consumed,
        remaining: state.remaining(),
        pending_limit: state.pending.as_ref().map(|p| p.limit),
        pending_epoch_duration: state.pending.as_ref().map(|p| p.epoch_duration),
    }))
}

// ============================================================================
// Gateway & Governance Queries
// ============================================================================

pub fn query_nonce_consumed(
    deps: Deps,
    source_chain: u64,
    nonce: u64,
) -> StdResult<NonceConsumedResponse> {
    Ok(NonceConsumedResponse {
        consumed: CONSUMED_NONCES.has(deps.storage, (source_chain, nonce)),
    })
}

pub fn query_has_role(deps: Deps, role: Role, address: String) -> StdResult<HasRoleResponse> {
    let addr = deps.api.addr_validate(&address)?;
    Ok(HasRoleResponse {
        has_role: governance::has_role(deps.storage, role, &addr)?,
    })
}

pub fn query_role_members(
    deps: Deps,
    role: Role,
    start_after: Option<String>,
    limit: Option<u32>,
) -> StdResult<RoleMembersResponse> {
    let start = start_after
        .map(|addr| deps.api.addr_validate(&addr))
        .transpose()?;
    let members = governance::role_members(deps.storage, role, start.as_ref(), page_limit(limit))?;
    Ok(RoleMembersResponse { members })
}
