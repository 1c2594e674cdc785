//! Chain state registry: gapless L2 state root history.
//!
//! A commitment at height `h` is only accepted when `h` directly follows the
//! latest accepted height (or equals `start_height` for the first one), so
//! exactly one root ever exists per height.

use common::{Bytes32, MerkleProof};
use cosmwasm_std::{StdResult, Storage, Timestamp};

use crate::error::ContractError;
use crate::state::{BlockCommitment, Config, COMMITMENTS, CONFIG, LAST_HEIGHT};

/// Height the next commitment must carry.
pub fn expected_height(storage: &dyn Storage, config: &Config) -> StdResult<u64> {
    Ok(match LAST_HEIGHT.may_load(storage)? {
        Some(last) => last + 1,
        None => config.start_height,
    })
}

/// Accept the next commitment. Caller must already hold `Committer`.
pub fn commit(
    storage: &mut dyn Storage,
    now: Timestamp,
    height: u64,
    state_root: Bytes32,
    timestamp: Timestamp,
) -> Result<BlockCommitment, ContractError> {
    let config = CONFIG.load(storage)?;
    let expected = expected_height(storage, &config)?;
    if height != expected {
        return Err(ContractError::OutOfOrderCommitment {
            expected,
            got: height,
        });
    }

    if timestamp > now {
        return Err(ContractError::InvalidTimestamp {
            reason: format!(
                "{} is ahead of block time {}",
                timestamp.seconds(),
                now.seconds()
            ),
        });
    }
    if let Some(last) = LAST_HEIGHT.may_load(storage)? {
        let previous = COMMITMENTS.load(storage, last)?;
        if timestamp < previous.timestamp {
            return Err(ContractError::InvalidTimestamp {
                reason: format!(
                    "{} precedes height {} at {}",
                    timestamp.seconds(),
                    last,
                    previous.timestamp.seconds()
                ),
            });
        }
    }

    let commitment = BlockCommitment {
        block_height: height,
        state_root,
        timestamp,
    };
    COMMITMENTS.save(storage, height, &commitment)?;
    LAST_HEIGHT.save(storage, &height)?;
    Ok(commitment)
}

/// True once `height` is committed and its finality delay has elapsed.
pub fn is_finalized(storage: &dyn Storage, now: Timestamp, height: u64) -> StdResult<bool> {
    let Some(commitment) = COMMITMENTS.may_load(storage, height)? else {
        return Ok(false);
    };
    let config = CONFIG.load(storage)?;
    Ok(now.seconds().saturating_sub(commitment.timestamp.seconds()) >= config.finality_delay)
}

/// Check `proof` for `leaf` against the root stored at `height` using the
/// active proof scheme. Unknown heights never verify.
pub fn verify_inclusion(
    storage: &dyn Storage,
    height: u64,
    leaf: &Bytes32,
    proof: &MerkleProof,
) -> StdResult<bool> {
    let Some(commitment) = COMMITMENTS.may_load(storage, height)? else {
        return Ok(false);
    };
    let config = CONFIG.load(storage)?;
    Ok(config
        .proof_scheme
        .verifier()
        .verify(&commitment.state_root, leaf, proof))
}

/// Like [`verify_inclusion`], failing with `InvalidProof`.
pub fn require_inclusion(
    storage: &dyn Storage,
    height: u64,
    leaf: &Bytes32,
    proof: &MerkleProof,
) -> Result<(), ContractError> {
    if !verify_inclusion(storage, height, leaf, proof)? {
        return Err(ContractError::InvalidProof { height });
    }
    Ok(())
}
