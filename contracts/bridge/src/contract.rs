//! Fuel Bridge Gateway - Entry Points
//!
//! The implementation is modularized into:
//! - `execute/` - Execute message handlers
//! - `query` - Query message handlers

use cosmwasm_std::{
    entry_point, to_json_binary, Binary, Deps, DepsMut, Env, MessageInfo, Response, StdResult,
};
use cw2::{get_contract_version, set_contract_version};

use crate::error::ContractError;
use crate::execute::{
    execute_bind_asset, execute_commit, execute_deposit, execute_grant_role, execute_pause,
    execute_receive, execute_revoke_role, execute_set_finality_delay, execute_set_proof_scheme,
    execute_set_rate_limit, execute_unpause, execute_withdraw,
};
use crate::governance;
use crate::msg::{ExecuteMsg, InstantiateMsg, MigrateMsg, QueryMsg, Role};
use crate::proof::ProofScheme;
use crate::query::{
    query_asset_binding, query_asset_bindings, query_asset_by_l2_id, query_commitment,
    query_config, query_current_nonce, query_has_role, query_is_finalized,
    query_latest_commitment, query_locked_balance, query_message_leaf, query_nonce_consumed,
    query_rate_limit, query_role_members, query_status, query_verify_inclusion,
};
use crate::state::{
    Config, GovernanceState, ADMIN_COUNT, CONFIG, CONTRACT_NAME, CONTRACT_VERSION, GOVERNANCE,
    MAX_FINALITY_DELAY, OUTGOING_NONCE,
};

// ============================================================================
// Instantiate
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    _info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    if msg.admins.is_empty() {
        return Err(ContractError::InvalidAddress {
            reason: "At least one admin required".to_string(),
        });
    }

    if msg.finality_delay > MAX_FINALITY_DELAY {
        return Err(ContractError::InvalidFinalityDelay {
            max: MAX_FINALITY_DELAY,
        });
    }

    let config = Config {
        l2_chain_id: msg.l2_chain_id,
        l1_chain_id: msg.l1_chain_id,
        finality_delay: msg.finality_delay,
        proof_scheme: msg.proof_scheme.unwrap_or(ProofScheme::IndexedKeccakV2),
        start_height: msg.start_height,
    };
    CONFIG.save(deps.storage, &config)?;
    GOVERNANCE.save(deps.storage, &GovernanceState::default())?;
    ADMIN_COUNT.save(deps.storage, &0)?;
    OUTGOING_NONCE.save(deps.storage, &0)?;

    let grants = [
        (Role::Admin, &msg.admins),
        (Role::Committer, &msg.committers),
        (Role::Pauser, &msg.pausers),
    ];
    for (role, members) in grants {
        for member in members {
            let addr = deps.api.addr_validate(member)?;
            governance::grant(deps.storage, role, &addr)?;
        }
    }

    Ok(Response::new()
        .add_attribute("action", "instantiate")
        .add_attribute("l2_chain_id", config.l2_chain_id.to_string())
        .add_attribute("l1_chain_id", config.l1_chain_id.to_string())
        .add_attribute("start_height", config.start_height.to_string())
        .add_attribute("finality_delay", config.finality_delay.to_string())
        .add_attribute("proof_scheme", config.proof_scheme.as_str())
        .add_attribute("admin_count", msg.admins.len().to_string()))
}

// ============================================================================
// Execute
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        // Gateway
        ExecuteMsg::Deposit {
            l1_token,
            amount,
            l2_recipient,
        } => execute_deposit(deps, env, info, l1_token, amount, l2_recipient),
        ExecuteMsg::Receive(cw20_msg) => execute_receive(deps, env, info, cw20_msg),
        ExecuteMsg::Withdraw {
            message,
            proof,
            height,
        } => execute_withdraw(deps, env, info, message, proof, height),

        // Chain state
        ExecuteMsg::Commit {
            height,
            state_root,
            timestamp,
        } => execute_commit(deps, env, info, height, state_root, timestamp),

        // Access control
        ExecuteMsg::GrantRole { role, address } => execute_grant_role(deps, info, role, address),
        ExecuteMsg::RevokeRole { role, address } => {
            execute_revoke_role(deps, info, role, address)
        }
        ExecuteMsg::Pause { subsystem } => execute_pause(deps, info, subsystem),
        ExecuteMsg::Unpause { subsystem } => execute_unpause(deps, info, subsystem),

        // Registry configuration
        ExecuteMsg::BindAsset {
            l1_token,
            l2_asset_id,
            l1_decimals,
            l2_decimals,
        } => execute_bind_asset(deps, info, l1_token, l2_asset_id, l1_decimals, l2_decimals),
        ExecuteMsg::SetRateLimit {
            l1_token,
            flow,
            limit,
            epoch_duration,
        } => execute_set_rate_limit(deps, env, info, l1_token, flow, limit, epoch_duration),
        ExecuteMsg::SetFinalityDelay { seconds } => execute_set_finality_delay(deps, info, seconds),
        ExecuteMsg::SetProofScheme { scheme } => execute_set_proof_scheme(deps, info, scheme),
    }
}

// ============================================================================
// Query
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Config {} => to_json_binary(&query_config(deps)?),
        QueryMsg::Status {} => to_json_binary(&query_status(deps)?),
        QueryMsg::Commitment { height } => to_json_binary(&query_commitment(deps, env, height)?),
        QueryMsg::LatestCommitment {} => to_json_binary(&query_latest_commitment(deps, env)?),
        QueryMsg::IsFinalized { height } => {
            to_json_binary(&query_is_finalized(deps, env, height)?)
        }
        QueryMsg::VerifyInclusion {
            height,
            leaf,
            proof,
        } => to_json_binary(&query_verify_inclusion(deps, height, leaf, proof)?),
        QueryMsg::MessageLeaf { message } => to_json_binary(&query_message_leaf(message)?),
        QueryMsg::AssetBinding { l1_token } => {
            to_json_binary(&query_asset_binding(deps, l1_token)?)
        }
        QueryMsg::AssetByL2Id { l2_asset_id } => {
            to_json_binary(&query_asset_by_l2_id(deps, l2_asset_id)?)
        }
        QueryMsg::AssetBindings { start_after, limit } => {
            to_json_binary(&query_asset_bindings(deps, start_after, limit)?)
        }
        QueryMsg::RateLimit { l1_token, flow } => {
            to_json_binary(&query_rate_limit(deps, env, l1_token, flow)?)
        }
        QueryMsg::NonceConsumed {
            source_chain,
            nonce,
        } => to_json_binary(&query_nonce_consumed(deps, source_chain, nonce)?),
        QueryMsg::HasRole { role, address } => {
            to_json_binary(&query_has_role(deps, role, address)?)
        }
        QueryMsg::RoleMembers {
            role,
            start_after,
            limit,
        } => to_json_binary(&query_role_members(deps, role, start_after, limit)?),
        QueryMsg::LockedBalance { l1_token } => {
            to_json_binary(&query_locked_balance(deps, l1_token)?)
        }
        QueryMsg::CurrentNonce {} => to_json_binary(&query_current_nonce(deps)?),
    }
}

// ============================================================================
// Migrate
// ============================================================================

/// Upgrade path for the contract code.
///
/// Proof scheme swaps go through `SetProofScheme`; migration only refuses
/// foreign contracts and downgrades.
#[cfg_attr(not(feature = "library"), entry_point)]
pub fn migrate(deps: DepsMut, _env: Env, _msg: MigrateMsg) -> Result<Response, ContractError> {
    let stored = get_contract_version(deps.storage)?;
    if stored.contract != CONTRACT_NAME {
        return Err(ContractError::InvalidMigration {
            reason: format!("cannot migrate from {}", stored.contract),
        });
    }
    if parse_version(&stored.version)? > parse_version(CONTRACT_VERSION)? {
        return Err(ContractError::InvalidMigration {
            reason: format!(
                "stored version {} is newer than {}",
                stored.version, CONTRACT_VERSION
            ),
        });
    }

    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    Ok(Response::new()
        .add_attribute("action", "migrate")
        .add_attribute("from_version", stored.version)
        .add_attribute("version", CONTRACT_VERSION))
}

/// `major.minor.patch` of a cw2 version. Pre-release and build suffixes are
/// dropped, so `0.2.0-rc.1` compares equal to `0.2.0`.
fn parse_version(version: &str) -> Result<(u64, u64, u64), ContractError> {
    let invalid = || ContractError::InvalidMigration {
        reason: format!("invalid version {version}"),
    };
    let core = version.split(['-', '+']).next().unwrap_or_default();
    let mut parts = core.split('.').map(|p| p.parse::<u64>().map_err(|_| invalid()));
    let major = parts.next().ok_or_else(invalid)??;
    let minor = parts.next().ok_or_else(invalid)??;
    let patch = parts.next().ok_or_else(invalid)??;
    if parts.next().is_some() {
        return Err(invalid());
    }
    Ok((major, minor, patch))
}
