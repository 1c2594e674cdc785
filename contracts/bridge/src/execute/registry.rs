//! Registry handlers.
//!
//! This module handles:
//! - L2 block commitments (committer)
//! - Asset binding (admin)
//! - Rate limit configuration (admin)
//! - Finality delay and proof scheme (admin)

use common::bytes32_to_hex;
use cosmwasm_std::{Binary, DepsMut, Env, Event, MessageInfo, Response, Timestamp, Uint128};

use super::parse_bytes32;
use crate::assets;
use crate::commitments;
use crate::error::ContractError;
use crate::governance::require_role;
use crate::msg::{Flow, Role};
use crate::proof::ProofScheme;
use crate::rate_limit::{self, LimitChange};
use crate::state::{AssetBinding, CONFIG, MAX_FINALITY_DELAY};

// ============================================================================
// Commitments
// ============================================================================

/// Accept the state root of the next L2 block.
pub fn execute_commit(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    height: u64,
    state_root: Binary,
    timestamp: u64,
) -> Result<Response, ContractError> {
    require_role(deps.storage, Role::Committer, &info.sender)?;

    let root = parse_bytes32(&state_root)?;
    if timestamp > env.block.time.seconds() {
        return Err(ContractError::InvalidTimestamp {
            reason: format!(
                "{} is ahead of block time {}",
                timestamp,
                env.block.time.seconds()
            ),
        });
    }
    let commitment = commitments::commit(
        deps.storage,
        env.block.time,
        height,
        root,
        Timestamp::from_seconds(timestamp),
    )?;

    Ok(Response::new()
        .add_event(
            Event::new("commitment")
                .add_attribute("height", height.to_string())
                .add_attribute("state_root", bytes32_to_hex(&commitment.state_root))
                .add_attribute("timestamp", timestamp.to_string()),
        )
        .add_attribute("action", "commit")
        .add_attribute("committer", info.sender))
}

// ============================================================================
// Asset Binding
// ============================================================================

/// Bind an L1 token to an L2 asset, replacing any previous binding.
pub fn execute_bind_asset(
    deps: DepsMut,
    info: MessageInfo,
    l1_token: String,
    l2_asset_id: Binary,
    l1_decimals: u8,
    l2_decimals: u8,
) -> Result<Response, ContractError> {
    require_role(deps.storage, Role::Admin, &info.sender)?;

    let token = deps.api.addr_validate(&l1_token)?;
    let asset_id = parse_bytes32(&l2_asset_id)?;
    let previous = assets::bind(
        deps.storage,
        AssetBinding {
            l1_token: token.clone(),
            l2_asset_id: asset_id,
            l1_decimals,
            l2_decimals,
        },
    )?;

    let mut event = Event::new("asset_bound")
        .add_attribute("l1_token", token.to_string())
        .add_attribute("l2_asset_id", bytes32_to_hex(&asset_id))
        .add_attribute("l1_decimals", l1_decimals.to_string())
        .add_attribute("l2_decimals", l2_decimals.to_string());
    if let Some(old) = previous {
        event = event.add_attribute("replaced_l2_asset_id", bytes32_to_hex(&old.l2_asset_id));
    }

    Ok(Response::new()
        .add_event(event)
        .add_attribute("action", "bind_asset")
        .add_attribute("l1_token", token))
}

// ============================================================================
// Rate Limits
// ============================================================================

/// Set the epoch cap of a token for one flow.
pub fn execute_set_rate_limit(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    l1_token: String,
    flow: Flow,
    limit: Uint128,
    epoch_duration: u64,
) -> Result<Response, ContractError> {
    require_role(deps.storage, Role::Admin, &info.sender)?;

    let token = deps.api.addr_validate(&l1_token)?;
    let change = rate_limit::set_limit(
        deps.storage,
        flow,
        &token,
        limit,
        epoch_duration,
        env.block.time,
    )?;

    let effective = match change {
        LimitChange::Immediate => "immediate".to_string(),
        LimitChange::Scheduled { epoch } => format!("after_epoch_{epoch}"),
    };

    Ok(Response::new()
        .add_event(
            Event::new("limit_changed")
                .add_attribute("l1_token", token.to_string())
                .add_attribute("flow", flow.as_str())
                .add_attribute("limit", limit.to_string())
                .add_attribute("epoch_duration", epoch_duration.to_string())
                .add_attribute("effective", effective),
        )
        .add_attribute("action", "set_rate_limit")
        .add_attribute("l1_token", token))
}

// ============================================================================
// Finality & Proof Scheme
// ============================================================================

pub fn execute_set_finality_delay(
    deps: DepsMut,
    info: MessageInfo,
    seconds: u64,
) -> Result<Response, ContractError> {
    require_role(deps.storage, Role::Admin, &info.sender)?;

    if seconds > MAX_FINALITY_DELAY {
        return Err(ContractError::InvalidFinalityDelay {
            max: MAX_FINALITY_DELAY,
        });
    }
    CONFIG.update(deps.storage, |mut config| -> Result<_, ContractError> {
        config.finality_delay = seconds;
        Ok(config)
    })?;

    Ok(Response::new()
        .add_attribute("action", "set_finality_delay")
        .add_attribute("finality_delay", seconds.to_string()))
}

/// Swap the active proof verifier. Stored commitments are kept as they are.
pub fn execute_set_proof_scheme(
    deps: DepsMut,
    info: MessageInfo,
    scheme: ProofScheme,
) -> Result<Response, ContractError> {
    require_role(deps.storage, Role::Admin, &info.sender)?;

    let mut config = CONFIG.load(deps.storage)?;
    let previous = config.proof_scheme;
    config.proof_scheme = scheme;
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_event(
            Event::new("proof_scheme_changed")
                .add_attribute("previous", previous.as_str())
                .add_attribute("scheme", scheme.as_str())
                .add_attribute("version", scheme.version().to_string()),
        )
        .add_attribute("action", "set_proof_scheme"))
}
