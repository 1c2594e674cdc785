//! Execute handlers for the Fuel bridge gateway.
//!
//! This module contains all execute message handlers, organized by category:
//! - `gateway` - Deposit, CW20 Receive and Withdraw
//! - `registry` - Commitments, asset bindings, rate limits, finality and proof scheme
//! - `admin` - Role grants/revocations and pause/unpause

mod admin;
mod gateway;
mod registry;

pub use admin::*;
pub use gateway::*;
pub use registry::*;

use cosmwasm_std::Binary;

use crate::error::ContractError;

/// Parse a 32-byte value from Binary input.
pub(crate) fn parse_bytes32(input: &Binary) -> Result<[u8; 32], ContractError> {
    input
        .to_vec()
        .try_into()
        .map_err(|_| ContractError::InvalidHashLength { got: input.len() })
}
