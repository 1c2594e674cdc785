//! Per-asset epoch rate limiter.
//!
//! Epochs sit on a fixed grid: when an epoch ends, the next one starts at the
//! old start plus whole multiples of the duration, never at the time of the
//! call that noticed the rollover. Limit changes wait for the next boundary so
//! the quota already consumed in the open epoch stays valid.
//!
//! All amounts are in the L1 token's decimals.

use cosmwasm_std::{Addr, StdResult, Storage, Timestamp, Uint128};

use crate::error::ContractError;
use crate::msg::Flow;
use crate::state::{PendingLimit, RateLimitState, MAX_EPOCH_DURATION, RATE_LIMITS};

impl RateLimitState {
    fn opened(limit: Uint128, epoch_duration: u64, now: Timestamp) -> Self {
        RateLimitState {
            epoch: 0,
            epoch_start: now,
            epoch_duration,
            limit,
            consumed: Uint128::zero(),
            pending: None,
        }
    }

    /// This state as seen at `now`: rolled forward to the epoch containing
    /// `now`, with any pending limit applied at the first boundary crossed.
    /// Times before the current epoch never move it backward.
    pub fn rolled(&self, now: Timestamp) -> RateLimitState {
        let mut state = self.clone();
        let boundary = match state.epoch_start.seconds().checked_add(state.epoch_duration) {
            Some(boundary) if now.seconds() >= boundary => boundary,
            _ => return state,
        };

        state.epoch += 1;
        state.epoch_start = Timestamp::from_seconds(boundary);
        state.consumed = Uint128::zero();
        if let Some(pending) = state.pending.take() {
            state.limit = pending.limit;
            state.epoch_duration = pending.epoch_duration;
        }

        // boundary + skipped * epoch_duration <= now
        let skipped = (now.seconds() - boundary) / state.epoch_duration;
        state.epoch += skipped;
        state.epoch_start = Timestamp::from_seconds(boundary + skipped * state.epoch_duration);
        state
    }

    pub fn remaining(&self) -> Uint128 {
        self.limit.saturating_sub(self.consumed)
    }
}

/// A checked reservation, not yet written to storage.
#[derive(Debug)]
pub struct Reservation {
    flow: Flow,
    l1_token: Addr,
    state: RateLimitState,
}

impl Reservation {
    pub fn state(&self) -> &RateLimitState {
        &self.state
    }

    pub fn commit(self, storage: &mut dyn Storage) -> StdResult<()> {
        RATE_LIMITS.save(storage, (self.flow.key(), &self.l1_token), &self.state)
    }
}

pub fn load(storage: &dyn Storage, flow: Flow, l1_token: &Addr) -> StdResult<Option<RateLimitState>> {
    RATE_LIMITS.may_load(storage, (flow.key(), l1_token))
}

/// Epoch index containing `now`, `None` when the flow is uncapped.
pub fn epoch_for(
    storage: &dyn Storage,
    flow: Flow,
    l1_token: &Addr,
    now: Timestamp,
) -> StdResult<Option<u64>> {
    Ok(load(storage, flow, l1_token)?.map(|state| state.rolled(now).epoch))
}

/// Check that `amount` fits in the open epoch and compute the post-reservation
/// state. Nothing is stored until [`Reservation::commit`]. Returns `None` when
/// no limit is configured for the flow.
pub fn try_reserve(
    storage: &dyn Storage,
    flow: Flow,
    l1_token: &Addr,
    amount: Uint128,
    now: Timestamp,
) -> Result<Option<Reservation>, ContractError> {
    let Some(state) = load(storage, flow, l1_token)? else {
        return Ok(None);
    };
    let mut state = state.rolled(now);

    let consumed = state
        .consumed
        .checked_add(amount)
        .ok()
        .filter(|total| *total <= state.limit)
        .ok_or(ContractError::RateLimitExceeded {
            limit: state.limit,
            consumed: state.consumed,
            requested: amount,
        })?;
    state.consumed = consumed;

    Ok(Some(Reservation {
        flow,
        l1_token: l1_token.clone(),
        state,
    }))
}

/// Check and consume quota in one step.
pub fn reserve(
    storage: &mut dyn Storage,
    flow: Flow,
    l1_token: &Addr,
    amount: Uint128,
    now: Timestamp,
) -> Result<Option<RateLimitState>, ContractError> {
    let Some(reservation) = try_reserve(storage, flow, l1_token, amount, now)? else {
        return Ok(None);
    };
    let state = reservation.state().clone();
    reservation.commit(storage)?;
    Ok(Some(state))
}

/// Outcome of [`set_limit`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitChange {
    /// No epoch was open; the limit applies from now
    Immediate,
    /// Applies when the epoch after `epoch` opens
    Scheduled { epoch: u64 },
}

pub fn set_limit(
    storage: &mut dyn Storage,
    flow: Flow,
    l1_token: &Addr,
    limit: Uint128,
    epoch_duration: u64,
    now: Timestamp,
) -> Result<LimitChange, ContractError> {
    if epoch_duration == 0 || epoch_duration > MAX_EPOCH_DURATION {
        return Err(ContractError::InvalidEpochDuration {
            max: MAX_EPOCH_DURATION,
        });
    }

    let (state, change) = match load(storage, flow, l1_token)? {
        None => (
            RateLimitState::opened(limit, epoch_duration, now),
            LimitChange::Immediate,
        ),
        Some(existing) => {
            let mut state = existing.rolled(now);
            state.pending = Some(PendingLimit {
                limit,
                epoch_duration,
            });
            let epoch = state.epoch;
            (state, LimitChange::Scheduled { epoch })
        }
    };
    RATE_LIMITS.save(storage, (flow.key(), l1_token), &state)?;
    Ok(change)
}
