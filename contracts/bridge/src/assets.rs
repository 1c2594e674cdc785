//! Asset registry: one binding per L1 token, plus decimal scaling.
//!
//! Rate limits are keyed by L1 token, not by binding, so rebinding a token
//! leaves its open epochs and consumed quota untouched.

use common::Bytes32;
use cosmwasm_std::{Addr, StdResult, Storage, Uint128};

use crate::error::ContractError;
use crate::state::{AssetBinding, BINDINGS, L2_ASSET_INDEX};

/// Largest decimal difference `10^n` can represent in a u128.
const MAX_DECIMAL_GAP: u32 = 38;

/// Store `binding`, replacing any previous binding of the same L1 token.
///
/// Returns the binding it replaced. Fails with `AssetIdInUse` if the L2 asset
/// id already belongs to a different L1 token.
pub fn bind(
    storage: &mut dyn Storage,
    binding: AssetBinding,
) -> Result<Option<AssetBinding>, ContractError> {
    if let Some(owner) = L2_ASSET_INDEX.may_load(storage, &binding.l2_asset_id)? {
        if owner != binding.l1_token {
            return Err(ContractError::AssetIdInUse {
                l2_asset_id: common::bytes32_to_hex(&binding.l2_asset_id),
                l1_token: owner.to_string(),
            });
        }
    }

    let previous = BINDINGS.may_load(storage, &binding.l1_token)?;
    if let Some(old) = &previous {
        L2_ASSET_INDEX.remove(storage, &old.l2_asset_id);
    }
    L2_ASSET_INDEX.save(storage, &binding.l2_asset_id, &binding.l1_token)?;
    BINDINGS.save(storage, &binding.l1_token, &binding)?;
    Ok(previous)
}

/// Binding of an L1 token, failing with `UnboundAsset`.
pub fn resolve(storage: &dyn Storage, l1_token: &Addr) -> Result<AssetBinding, ContractError> {
    BINDINGS
        .may_load(storage, l1_token)?
        .ok_or_else(|| ContractError::UnboundAsset {
            asset: l1_token.to_string(),
        })
}

/// Binding whose L2 side is `l2_asset_id`, failing with `UnboundAsset`.
pub fn resolve_l2(
    storage: &dyn Storage,
    l2_asset_id: &Bytes32,
) -> Result<AssetBinding, ContractError> {
    let unbound = || ContractError::UnboundAsset {
        asset: common::bytes32_to_hex(l2_asset_id),
    };
    let l1_token = L2_ASSET_INDEX
        .may_load(storage, l2_asset_id)?
        .ok_or_else(unbound)?;
    BINDINGS.may_load(storage, &l1_token)?.ok_or_else(unbound)
}

pub fn try_resolve(storage: &dyn Storage, l1_token: &Addr) -> StdResult<Option<AssetBinding>> {
    BINDINGS.may_load(storage, l1_token)
}

/// Scale `amount` from `from` decimals to `to` decimals.
///
/// Scaling down must be exact: an amount with non-zero digits below the
/// target precision fails instead of silently dropping dust. Scaling up fails
/// on overflow.
pub fn scale_amount(amount: Uint128, from: u8, to: u8) -> Result<Uint128, ContractError> {
    if from == to {
        return Ok(amount);
    }
    let gap = from.abs_diff(to) as u32;
    if gap > MAX_DECIMAL_GAP {
        return Err(ContractError::InvalidAmount {
            reason: format!("decimal gap {gap} too large"),
        });
    }
    let factor = Uint128::new(10u128.pow(gap));

    if from > to {
        if !(amount % factor).is_zero() {
            return Err(ContractError::InvalidAmount {
                reason: format!("{amount} has precision below {to} decimals"),
            });
        }
        Ok(amount / factor)
    } else {
        amount
            .checked_mul(factor)
            .map_err(|_| ContractError::InvalidAmount {
                reason: format!("{amount} overflows when scaled to {to} decimals"),
            })
    }
}

impl AssetBinding {
    /// L1 amount to the L2 basis of this binding
    pub fn to_l2(&self, amount: Uint128) -> Result<Uint128, ContractError> {
        scale_amount(amount, self.l1_decimals, self.l2_decimals)
    }

    /// L2 amount to the L1 basis of this binding
    pub fn to_l1(&self, amount: Uint128) -> Result<Uint128, ContractError> {
        scale_amount(amount, self.l2_decimals, self.l1_decimals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmwasm_std::testing::mock_dependencies;

    fn binding(token: &str, asset: u8, l1: u8, l2: u8) -> AssetBinding {
        AssetBinding {
            l1_token: Addr::unchecked(token),
            l2_asset_id: [asset; 32],
            l1_decimals: l1,
            l2_decimals: l2,
        }
    }

    #[test]
    fn test_scale_equal_decimals_is_identity() {
        let amount = Uint128::new(123_456_789);
        assert_eq!(scale_amount(amount, 9, 9).unwrap(), amount);
    }

    #[test]
    fn test_scale_down_and_back() {
        let b = binding("token", 1, 18, 9);
        let l2 = b.to_l2(Uint128::new(5_000_000_000_000_000_000)).unwrap();
        assert_eq!(l2, Uint128::new(5_000_000_000));
        assert_eq!(b.to_l1(l2).unwrap(), Uint128::new(5_000_000_000_000_000_000));
    }

    #[test]
    fn test_scale_down_rejects_dust() {
        let err = scale_amount(Uint128::new(1_000_000_001), 18, 9).unwrap_err();
        assert!(matches!(err, ContractError::InvalidAmount { .. }));
    }

    #[test]
    fn test_scale_up_overflow() {
        let err = scale_amount(Uint128::MAX, 6, 18).unwrap_err();
        assert!(matches!(err, ContractError::InvalidAmount { .. }));
        assert_eq!(
            scale_amount(Uint128::new(1), 6, 18).unwrap(),
            Uint128::new(1_000_000_000_000)
        );
    }

    #[test]
    fn test_rebind_replaces_and_reindexes() {
        let mut deps = mock_dependencies();
        let token = Addr::unchecked("token");

        assert!(bind(&mut deps.storage, binding("token", 1, 18, 9))
            .unwrap()
            .is_none());
        let previous = bind(&mut deps.storage, binding("token", 2, 18, 18)).unwrap();
        assert_eq!(previous.unwrap().l2_asset_id, [1; 32]);

        let resolved = resolve(&deps.storage, &token).unwrap();
        assert_eq!(resolved.l2_asset_id, [2; 32]);
        assert_eq!(resolved.l2_decimals, 18);

        assert_eq!(resolve_l2(&deps.storage, &[2; 32]).unwrap().l1_token, token);
        assert!(matches!(
            resolve_l2(&deps.storage, &[1; 32]),
            Err(ContractError::UnboundAsset { .. })
        ));
    }

    #[test]
    fn test_l2_asset_id_cannot_be_shared() {
        let mut deps = mock_dependencies();
        bind(&mut deps.storage, binding("token_a", 1, 6, 6)).unwrap();
        let err = bind(&mut deps.storage, binding("token_b", 1, 6, 6)).unwrap_err();
        assert!(matches!(err, ContractError::AssetIdInUse { .. }));
    }

    #[test]
    fn test_resolve_unbound() {
        let deps = mock_dependencies();
        assert_eq!(
            resolve(&deps.storage, &Addr::unchecked("nope")),
            Err(ContractError::UnboundAsset {
                asset: "nope".to_string()
            })
        );
    }
}
