//! Access control and pause state.
//!
//! Roles live in `ROLES`, pause flags in `GOVERNANCE`. Both are read fresh
//! from storage by every guard; nothing is cached across calls.

use cosmwasm_std::{Addr, Order, StdResult, Storage};
use cw_storage_plus::Bound;

use crate::error::ContractError;
use crate::msg::{Role, Subsystem};
use crate::state::{GovernanceState, ADMIN_COUNT, GOVERNANCE, ROLES};

// ============================================================================
// Roles
// ============================================================================

pub fn has_role(storage: &dyn Storage, role: Role, addr: &Addr) -> StdResult<bool> {
    Ok(ROLES
        .may_load(storage, (role.as_str(), addr))?
        .unwrap_or(false))
}

/// Guard run first by every privileged entry point.
pub fn require_role(storage: &dyn Storage, role: Role, addr: &Addr) -> Result<(), ContractError> {
    if !has_role(storage, role, addr)? {
        return Err(ContractError::Unauthorized { role });
    }
    Ok(())
}

/// Like [`require_role`], satisfied by any of `roles`. Reports the first.
pub fn require_any_role(
    storage: &dyn Storage,
    roles: &[Role],
    addr: &Addr,
) -> Result<(), ContractError> {
    for role in roles {
        if has_role(storage, *role, addr)? {
            return Ok(());
        }
    }
    Err(ContractError::Unauthorized { role: roles[0] })
}

/// Add `addr` to `role`. Returns false if it already held it.
pub fn grant(storage: &mut dyn Storage, role: Role, addr: &Addr) -> StdResult<bool> {
    if has_role(storage, role, addr)? {
        return Ok(false);
    }
    ROLES.save(storage, (role.as_str(), addr), &true)?;
    if role == Role::Admin {
        ADMIN_COUNT.update(storage, |count| -> StdResult<_> { Ok(count + 1) })?;
    }
    Ok(true)
}

/// Remove `addr` from `role`. Returns false if it did not hold it.
pub fn revoke(storage: &mut dyn Storage, role: Role, addr: &Addr) -> Result<bool, ContractError> {
    if !has_role(storage, role, addr)? {
        return Ok(false);
    }
    if role == Role::Admin {
        let count = ADMIN_COUNT.load(storage)?;
        if count <= 1 {
            return Err(ContractError::CannotRevokeLastAdmin);
        }
        ADMIN_COUNT.save(storage, &(count - 1))?;
    }
    ROLES.remove(storage, (role.as_str(), addr));
    Ok(true)
}

pub fn role_members(
    storage: &dyn Storage,
    role: Role,
    start_after: Option<&Addr>,
    limit: usize,
) -> StdResult<Vec<Addr>> {
    ROLES
        .prefix(role.as_str())
        .keys(storage, start_after.map(Bound::exclusive), None, Order::Ascending)
        .take(limit)
        .collect()
}

// ============================================================================
// Pause State
// ============================================================================

impl GovernanceState {
    pub fn is_paused(&self, subsystem: Subsystem) -> bool {
        match subsystem {
            Subsystem::Deposits => self.deposits_paused,
            Subsystem::Withdrawals => self.withdrawals_paused,
        }
    }

    pub fn set_paused(&mut self, subsystem: Subsystem, paused: bool) {
        match subsystem {
            Subsystem::Deposits => self.deposits_paused = paused,
            Subsystem::Withdrawals => self.withdrawals_paused = paused,
        }
    }
}

/// Fails with `SubsystemPaused` if `subsystem` is paused.
pub fn ensure_active(storage: &dyn Storage, subsystem: Subsystem) -> Result<(), ContractError> {
    if GOVERNANCE.load(storage)?.is_paused(subsystem) {
        return Err(ContractError::SubsystemPaused { subsystem });
    }
    Ok(())
}

/// Flip the pause flag. Returns false when it already had that value.
pub fn set_paused(storage: &mut dyn Storage, subsystem: Subsystem, paused: bool) -> StdResult<bool> {
    let mut state = GOVERNANCE.load(storage)?;
    if state.is_paused(subsystem) == paused {
        return Ok(false);
    }
    state.set_paused(subsystem, paused);
    GOVERNANCE.save(storage, &state)?;
    Ok(true)
}
