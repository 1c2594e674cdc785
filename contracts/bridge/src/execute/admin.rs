//! Governance handlers.
//!
//! This module handles:
//! - Role grant/revoke (admin, self-administering)
//! - Pause (pauser or admin) and unpause (admin)

use cosmwasm_std::{DepsMut, Event, MessageInfo, Response};

use crate::error::ContractError;
use crate::governance::{self, require_any_role, require_role};
use crate::msg::{Role, Subsystem};

// ============================================================================
// Roles
// ============================================================================

pub fn execute_grant_role(
    deps: DepsMut,
    info: MessageInfo,
    role: Role,
    address: String,
) -> Result<Response, ContractError> {
    require_role(deps.storage, Role::Admin, &info.sender)?;

    let addr = deps.api.addr_validate(&address)?;
    let changed = governance::grant(deps.storage, role, &addr)?;

    Ok(Response::new()
        .add_event(role_event(role, &address, true, changed))
        .add_attribute("action", "grant_role")
        .add_attribute("role", role.as_str())
        .add_attribute("address", address))
}

pub fn execute_revoke_role(
    deps: DepsMut,
    info: MessageInfo,
    role: Role,
    address: String,
) -> Result<Response, ContractError> {
    require_role(deps.storage, Role::Admin, &info.sender)?;

    let addr = deps.api.addr_validate(&address)?;
    let changed = governance::revoke(deps.storage, role, &addr)?;

    Ok(Response::new()
        .add_event(role_event(role, &address, false, changed))
        .add_attribute("action", "revoke_role")
        .add_attribute("role", role.as_str())
        .add_attribute("address", address))
}

fn role_event(role: Role, address: &str, granted: bool, changed: bool) -> Event {
    Event::new("role_changed")
        .add_attribute("role", role.as_str())
        .add_attribute("address", address)
        .add_attribute("granted", granted.to_string())
        .add_attribute("changed", changed.to_string())
}

// ============================================================================
// Pause/Unpause
// ============================================================================

/// Pause a subsystem.
pub fn execute_pause(
    deps: DepsMut,
    info: MessageInfo,
    subsystem: Subsystem,
) -> Result<Response, ContractError> {
    require_any_role(deps.storage, &[Role::Pauser, Role::Admin], &info.sender)?;

    let changed = governance::set_paused(deps.storage, subsystem, true)?;

    Ok(Response::new()
        .add_event(pause_event(subsystem, true, changed))
        .add_attribute("action", "pause")
        .add_attribute("subsystem", subsystem.as_str()))
}

/// Unpause a subsystem. Pausers can't undo a pause.
pub fn execute_unpause(
    deps: DepsMut,
    info: MessageInfo,
    subsystem: Subsystem,
) -> Result<Response, ContractError> {
    require_role(deps.storage, Role::Admin, &info.sender)?;

    let changed = governance::set_paused(deps.storage, subsystem, false)?;

    Ok(Response::new()
        .add_event(pause_event(subsystem, false, changed))
        .add_attribute("action", "unpause")
        .add_attribute("subsystem", subsystem.as_str()))
}

fn pause_event(subsystem: Subsystem, paused: bool, changed: bool) -> Event {
    Event::new("pause_changed")
        .add_attribute("subsystem", subsystem.as_str())
        .add_attribute("paused", paused.to_string())
        .add_attribute("changed", changed.to_string())
}
