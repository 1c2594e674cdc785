//! Deposit Flow Integration Tests.
//!
//! Tests the L1 -> L2 deposit paths:
//! - Allowance + `Deposit` (TransferFrom) and CW20 `Send` hook
//! - Emitted message, nonce sequencing and locked balances
//! - Rejections: unbound assets, missing allowance, dust, bad recipients
//! - Deposit rate limits with pending limit changes

use common::{bytes32_to_hex, Message};
use cosmwasm_std::{to_json_binary, Addr, Binary, Uint128};
use cw20::{BalanceResponse, Cw20Coin, Cw20ExecuteMsg, Cw20QueryMsg, Expiration};
use cw_multi_test::{App, AppResponse, ContractWrapper, Executor};

use fuel_bridge::msg::{
    ExecuteMsg, Flow, InstantiateMsg, LockedBalanceResponse, MessageLeafResponse, NonceResponse,
    QueryMsg, RateLimitResponse, ReceiveMsg, StatusResponse, Subsystem,
};
use fuel_bridge::state::MAX_EPOCH_DURATION;
use fuel_bridge::ContractError;

const L1_CHAIN_ID: u64 = 1;
const L2_CHAIN_ID: u64 = 9889;
const ASSET_ID: [u8; 32] = [0x11; 32];
const DAY: u64 = 86_400;

// ============================================================================
// Test Setup
// ============================================================================

fn contract_bridge() -> Box<dyn cw_multi_test::Contract<cosmwasm_std::Empty>> {
    let contract = ContractWrapper::new(
        fuel_bridge::contract::execute,
        fuel_bridge::contract::instantiate,
        fuel_bridge::contract::query,
    );
    Box::new(contract)
}

fn contract_cw20() -> Box<dyn cw_multi_test::Contract<cosmwasm_std::Empty>> {
    let contract = ContractWrapper::new(
        cw20_base::contract::execute,
        cw20_base::contract::instantiate,
        cw20_base::contract::query,
    );
    Box::new(contract)
}

struct TestEnv {
    app: App,
    bridge: Addr,
    token: Addr,
    cw20_code: u64,
    admin: Addr,
    pauser: Addr,
    user: Addr,
}

fn l2_recipient() -> String {
    format!("0x{}", "ab".repeat(32))
}

fn setup() -> TestEnv {
    let mut app = App::default();
    let admin = Addr::unchecked("admin");
    let pauser = Addr::unchecked("pauser");
    let user = Addr::unchecked("user");

    let bridge_code = app.store_code(contract_bridge());
    let bridge = app
        .instantiate_contract(
            bridge_code,
            admin.clone(),
            &InstantiateMsg {
                admins: vec![admin.to_string()],
                committers: vec![],
                pausers: vec![pauser.to_string()],
                l2_chain_id: L2_CHAIN_ID,
                l1_chain_id: L1_CHAIN_ID,
                start_height: 1,
                finality_delay: 600,
                proof_scheme: None,
            },
            &[],
            "fuel-bridge",
            None,
        )
        .unwrap();

    let cw20_code = app.store_code(contract_cw20());
    let token = instantiate_token(&mut app, cw20_code, &admin, &user, "TST");
    let mut env = TestEnv {
        app,
        bridge,
        token: token.clone(),
        cw20_code,
        admin,
        pauser,
        user,
    };
    env.bind(&token, ASSET_ID, 6, 9);
    env
}

fn instantiate_token(app: &mut App, code_id: u64, admin: &Addr, holder: &Addr, symbol: &str) -> Addr {
    app.instantiate_contract(
        code_id,
        admin.clone(),
        &cw20_base::msg::InstantiateMsg {
            name: format!("{symbol} Token"),
            symbol: symbol.to_string(),
            decimals: 6,
            initial_balances: vec![Cw20Coin {
                address: holder.to_string(),
                amount: Uint128::new(10_000_000_000),
            }],
            mint: None,
            marketing: None,
        },
        &[],
        "cw20-test",
        None,
    )
    .unwrap()
}

impl TestEnv {
    fn create_token(&mut self, symbol: &str) -> Addr {
        instantiate_token(&mut self.app, self.cw20_code, &self.admin, &self.user, symbol)
    }

    fn bind(&mut self, token: &Addr, asset_id: [u8; 32], l1_decimals: u8, l2_decimals: u8) {
        self.admin_execute(&ExecuteMsg::BindAsset {
            l1_token: token.to_string(),
            l2_asset_id: Binary::from(asset_id.to_vec()),
            l1_decimals,
            l2_decimals,
        });
    }

    fn admin_execute(&mut self, msg: &ExecuteMsg) -> AppResponse {
        self.app
            .execute_contract(self.admin.clone(), self.bridge.clone(), msg, &[])
            .unwrap()
    }

    fn approve(&mut self, amount: u128, expires: Option<Expiration>) {
        self.app
            .execute_contract(
                self.user.clone(),
                self.token.clone(),
                &Cw20ExecuteMsg::IncreaseAllowance {
                    spender: self.bridge.to_string(),
                    amount: Uint128::new(amount),
                    expires,
                },
                &[],
            )
            .unwrap();
    }

    fn deposit_msg(&self, amount: u128) -> ExecuteMsg {
        ExecuteMsg::Deposit {
            l1_token: self.token.to_string(),
            amount: Uint128::new(amount),
            l2_recipient: l2_recipient(),
        }
    }

    fn deposit(&mut self, amount: u128) -> AppResponse {
        let msg = self.deposit_msg(amount);
        self.app
            .execute_contract(self.user.clone(), self.bridge.clone(), &msg, &[])
            .unwrap()
    }

    fn deposit_err(&mut self, amount: u128) -> ContractError {
        let msg = self.deposit_msg(amount);
        self.app
            .execute_contract(self.user.clone(), self.bridge.clone(), &msg, &[])
            .unwrap_err()
            .downcast()
            .unwrap()
    }

    fn send(&mut self, token: &Addr, amount: u128, l2_recipient: String) -> SendResult {
        self.app
            .execute_contract(
                self.user.clone(),
                token.clone(),
                &Cw20ExecuteMsg::Send {
                    contract: self.bridge.to_string(),
                    amount: Uint128::new(amount),
                    msg: to_json_binary(&ReceiveMsg::Deposit { l2_recipient }).unwrap(),
                },
                &[],
            )
            .map_err(|err| err.downcast().unwrap())
    }

    fn advance(&mut self, seconds: u64) {
        self.app.update_block(|block| {
            block.time = block.time.plus_seconds(seconds);
            block.height += seconds / 5 + 1;
        });
    }

    fn balance(&self, addr: &Addr) -> Uint128 {
        let res: BalanceResponse = self
            .app
            .wrap()
            .query_wasm_smart(
                &self.token,
                &Cw20QueryMsg::Balance {
                    address: addr.to_string(),
                },
            )
            .unwrap();
        res.balance
    }

    fn locked(&self, token: &Addr) -> Uint128 {
        let res: LockedBalanceResponse = self
            .app
            .wrap()
            .query_wasm_smart(
                &self.bridge,
                &QueryMsg::LockedBalance {
                    l1_token: token.to_string(),
                },
            )
            .unwrap();
        res.amount
    }

    fn next_nonce(&self) -> u64 {
        let res: NonceResponse = self
            .app
            .wrap()
            .query_wasm_smart(&self.bridge, &QueryMsg::CurrentNonce {})
            .unwrap();
        res.nonce
    }

    fn rate_limit(&self, flow: Flow) -> Option<RateLimitResponse> {
        self.app
            .wrap()
            .query_wasm_smart(
                &self.bridge,
                &QueryMsg::RateLimit {
                    l1_token: self.token.to_string(),
                    flow,
                },
            )
            .unwrap()
    }
}

/// Result of a CW20 `Send` into the bridge, with the bridge error unwrapped
type SendResult = Result<AppResponse, ContractError>;

fn event_attr(res: &AppResponse, ty: &str, key: &str) -> Option<String> {
    res.events
        .iter()
        .filter(|e| e.ty == ty)
        .flat_map(|e| e.attributes.iter())
        .find(|a| a.key == key)
        .map(|a| a.value.clone())
}

// ============================================================================
// Allowance Deposits
// ============================================================================

#[test]
fn test_deposit_locks_tokens_and_emits_message() {
    let mut env = setup();
    env.approve(1_000_000, None);

    let res = env.deposit(1_000_000);

    assert_eq!(env.balance(&env.user), Uint128::new(9_999_000_000));
    assert_eq!(env.balance(&env.bridge), Uint128::new(1_000_000));
    assert_eq!(env.locked(&env.token), Uint128::new(1_000_000));
    assert_eq!(env.next_nonce(), 1);

    let ty = "wasm-bridge_message";
    assert_eq!(event_attr(&res, ty, "nonce").as_deref(), Some("0"));
    // 6 -> 9 decimals
    assert_eq!(event_attr(&res, ty, "amount").as_deref(), Some("1000000000"));
    assert_eq!(event_attr(&res, ty, "recipient"), Some(l2_recipient()));
    assert_eq!(event_attr(&res, ty, "sender"), Some(env.user.to_string()));
    assert_eq!(
        event_attr(&res, ty, "source_chain"),
        Some(L1_CHAIN_ID.to_string())
    );
    assert_eq!(
        event_attr(&res, ty, "data"),
        Some(bytes32_to_hex(&ASSET_ID))
    );

    // Emitted leaf matches the canonical encoding of the message
    let message = Message {
        sender: env.user.to_string(),
        recipient: l2_recipient(),
        amount: Uint128::new(1_000_000_000),
        nonce: 0,
        data: Binary::from(ASSET_ID.to_vec()),
        source_chain: L1_CHAIN_ID,
    };
    let leaf: MessageLeafResponse = env
        .app
        .wrap()
        .query_wasm_smart(&env.bridge, &QueryMsg::MessageLeaf { message })
        .unwrap();
    assert_eq!(
        event_attr(&res, ty, "leaf"),
        Some(format!("0x{}", hex::encode(leaf.leaf.as_slice())))
    );
}

#[test]
fn test_deposit_nonces_are_sequential() {
    let mut env = setup();
    env.approve(3_000_000, None);

    for expected in 0..3u64 {
        let res = env.deposit(1_000_000);
        assert_eq!(
            event_attr(&res, "wasm-bridge_message", "nonce"),
            Some(expected.to_string())
        );
    }
    assert_eq!(env.next_nonce(), 3);
    assert_eq!(env.locked(&env.token), Uint128::new(3_000_000));
}

#[test]
fn test_deposit_normalizes_recipient_hex() {
    let mut env = setup();
    env.approve(1_000_000, None);

    let msg = ExecuteMsg::Deposit {
        l1_token: env.token.to_string(),
        amount: Uint128::new(1_000_000),
        l2_recipient: "AB".repeat(32),
    };
    let res = env
        .app
        .execute_contract(env.user.clone(), env.bridge.clone(), &msg, &[])
        .unwrap();
    assert_eq!(
        event_attr(&res, "wasm-bridge_message", "recipient"),
        Some(l2_recipient())
    );
}

#[test]
fn test_deposit_without_allowance_fails() {
    let mut env = setup();

    let err = env.deposit_err(1_000_000);
    assert!(matches!(err, ContractError::TransferFailed { .. }));
    assert_eq!(env.next_nonce(), 0);
    assert_eq!(env.locked(&env.token), Uint128::zero());
}

#[test]
fn test_deposit_with_expired_allowance_fails() {
    let mut env = setup();
    let expires_at = env.app.block_info().height + 1;
    env.approve(1_000_000, Some(Expiration::AtHeight(expires_at)));
    env.advance(10);

    let err = env.deposit_err(1_000_000);
    assert!(matches!(err, ContractError::TransferFailed { .. }));
}

#[test]
fn test_deposit_above_balance_fails() {
    let mut env = setup();
    env.approve(20_000_000_000, None);

    let err = env.deposit_err(20_000_000_000);
    assert!(matches!(err, ContractError::TransferFailed { .. }));
}

#[test]
fn test_deposit_zero_amount_fails() {
    let mut env = setup();
    let err = env.deposit_err(0);
    assert!(matches!(err, ContractError::InvalidAmount { .. }));
}

#[test]
fn test_deposit_bad_l2_recipient_fails() {
    let mut env = setup();
    env.approve(1_000_000, None);

    let non_hex = "zz".repeat(32);
    for recipient in ["0x1234", "not-hex", non_hex.as_str()] {
        let msg = ExecuteMsg::Deposit {
            l1_token: env.token.to_string(),
            amount: Uint128::new(1_000_000),
            l2_recipient: recipient.to_string(),
        };
        let err: ContractError = env
            .app
            .execute_contract(env.user.clone(), env.bridge.clone(), &msg, &[])
            .unwrap_err()
            .downcast()
            .unwrap();
        assert!(matches!(err, ContractError::InvalidAddress { .. }));
    }
}

#[test]
fn test_deposit_unbound_token_fails() {
    let mut env = setup();
    let unbound = env.create_token("UNB");

    let err = env.send(&unbound, 1_000_000, l2_recipient()).unwrap_err();
    assert_eq!(
        err,
        ContractError::UnboundAsset {
            asset: unbound.to_string()
        }
    );
}

#[test]
fn test_deposit_dust_on_scale_down_fails() {
    let mut env = setup();
    let token = env.create_token("HIGH");
    // 9 decimals on L1, 6 on L2
    env.bind(&token, [0x22; 32], 9, 6);

    let err = env.send(&token, 1_500, l2_recipient()).unwrap_err();
    assert!(matches!(err, ContractError::InvalidAmount { .. }));

    let res = env.send(&token, 2_000, l2_recipient()).unwrap();
    assert_eq!(
        event_attr(&res, "wasm-bridge_message", "amount").as_deref(),
        Some("2")
    );
}

// ============================================================================
// CW20 Send Deposits
// ============================================================================

#[test]
fn test_deposit_via_send() {
    let mut env = setup();
    let token = env.token.clone();

    let res = env.send(&token, 2_500_000, l2_recipient()).unwrap();
    assert_eq!(
        event_attr(&res, "wasm-bridge_message", "amount").as_deref(),
        Some("2500000000")
    );
    assert_eq!(
        event_attr(&res, "wasm-bridge_message", "sender"),
        Some(env.user.to_string())
    );
    assert_eq!(env.balance(&env.bridge), Uint128::new(2_500_000));
    assert_eq!(env.locked(&token), Uint128::new(2_500_000));
}

#[test]
fn test_deposit_paused() {
    let mut env = setup();
    let token = env.token.clone();
    let unbound = env.create_token("UNB");
    env.admin_execute(&ExecuteMsg::SetRateLimit {
        l1_token: token.to_string(),
        flow: Flow::Deposit,
        limit: Uint128::new(1_000_000),
        epoch_duration: DAY,
    });
    env.send(&token, 1_000_000, l2_recipient()).unwrap();
    env.approve(5_000_000, None);
    env.app
        .execute_contract(
            env.pauser.clone(),
            env.bridge.clone(),
            &ExecuteMsg::Pause {
                subsystem: Subsystem::Deposits,
            },
            &[],
        )
        .unwrap();

    let paused = ContractError::SubsystemPaused {
        subsystem: Subsystem::Deposits,
    };
    // Both entry points, whatever the amount, binding or remaining quota
    assert_eq!(env.deposit_err(1_000), paused);
    assert_eq!(env.deposit_err(0), paused);
    assert_eq!(env.send(&unbound, 1_000, l2_recipient()).unwrap_err(), paused);
    assert_eq!(env.send(&token, 1, l2_recipient()).unwrap_err(), paused);
    assert_eq!(env.balance(&env.user), Uint128::new(9_999_000_000));
    assert_eq!(env.locked(&token), Uint128::new(1_000_000));

    let status: StatusResponse = env
        .app
        .wrap()
        .query_wasm_smart(&env.bridge, &QueryMsg::Status {})
        .unwrap();
    assert!(status.deposits_paused);
    assert!(!status.withdrawals_paused);
    assert_eq!(status.next_nonce, 1);

    env.admin_execute(&ExecuteMsg::Unpause {
        subsystem: Subsystem::Deposits,
    });

    // The exhausted epoch still binds
    let err = env.send(&token, 1, l2_recipient()).unwrap_err();
    assert!(matches!(err, ContractError::RateLimitExceeded { .. }));
    assert!(matches!(env.deposit_err(0), ContractError::InvalidAmount { .. }));

    env.advance(DAY);
    let res = env.deposit(1_000_000);
    assert_eq!(
        event_attr(&res, "wasm-bridge_message", "nonce").as_deref(),
        Some("1")
    );
    assert_eq!(env.locked(&token), Uint128::new(2_000_000));
    assert_eq!(env.next_nonce(), 2);
}

// ============================================================================
// Rate Limits
// ============================================================================

#[test]
fn test_deposit_rate_limit_per_epoch() {
    let mut env = setup();
    let token = env.token.clone();
    env.admin_execute(&ExecuteMsg::SetRateLimit {
        l1_token: token.to_string(),
        flow: Flow::Deposit,
        limit: Uint128::new(100),
        epoch_duration: DAY,
    });

    env.send(&token, 60, l2_recipient()).unwrap();
    let err = env.send(&token, 50, l2_recipient()).unwrap_err();
    assert_eq!(
        err,
        ContractError::RateLimitExceeded {
            limit: Uint128::new(100),
            consumed: Uint128::new(60),
            requested: Uint128::new(50),
        }
    );
    // Rejected deposit moved nothing
    assert_eq!(env.locked(&token), Uint128::new(60));
    assert_eq!(env.next_nonce(), 1);

    env.advance(DAY);
    env.send(&token, 50, l2_recipient()).unwrap();

    let state = env.rate_limit(Flow::Deposit).unwrap();
    assert_eq!(state.epoch, 1);
    assert_eq!(state.consumed, Uint128::new(50));
    assert_eq!(state.remaining, Uint128::new(50));
}

#[test]
fn test_deposit_limit_change_waits_for_next_epoch() {
    let mut env = setup();
    let token = env.token.clone();
    env.admin_execute(&ExecuteMsg::SetRateLimit {
        l1_token: token.to_string(),
        flow: Flow::Deposit,
        limit: Uint128::new(100),
        epoch_duration: DAY,
    });
    env.send(&token, 80, l2_recipient()).unwrap();

    let res = env.admin_execute(&ExecuteMsg::SetRateLimit {
        l1_token: token.to_string(),
        flow: Flow::Deposit,
        limit: Uint128::new(500),
        epoch_duration: DAY,
    });
    assert_eq!(
        event_attr(&res, "wasm-limit_changed", "effective").as_deref(),
        Some("after_epoch_0")
    );

    // Old limit still binds the open epoch
    let err = env.send(&token, 30, l2_recipient()).unwrap_err();
    assert!(matches!(err, ContractError::RateLimitExceeded { .. }));

    let state = env.rate_limit(Flow::Deposit).unwrap();
    assert_eq!(state.limit, Uint128::new(100));
    assert_eq!(state.pending_limit, Some(Uint128::new(500)));

    env.advance(DAY);
    let state = env.rate_limit(Flow::Deposit).unwrap();
    assert_eq!(state.limit, Uint128::new(500));
    assert_eq!(state.consumed, Uint128::zero());
    assert_eq!(state.pending_limit, None);

    env.send(&token, 400, l2_recipient()).unwrap();
}

#[test]
fn test_zero_limit_blocks_flow() {
    let mut env = setup();
    let token = env.token.clone();
    env.admin_execute(&ExecuteMsg::SetRateLimit {
        l1_token: token.to_string(),
        flow: Flow::Deposit,
        limit: Uint128::zero(),
        epoch_duration: DAY,
    });

    let err = env.send(&token, 1, l2_recipient()).unwrap_err();
    assert!(matches!(err, ContractError::RateLimitExceeded { .. }));
}

#[test]
fn test_unconfigured_flow_is_uncapped() {
    let mut env = setup();
    let token = env.token.clone();

    assert!(env.rate_limit(Flow::Deposit).is_none());
    env.send(&token, 9_000_000_000, l2_recipient()).unwrap();
    assert_eq!(env.locked(&token), Uint128::new(9_000_000_000));
}

#[test]
fn test_epoch_duration_bounds() {
    let mut env = setup();
    let token = env.token.clone();

    for epoch_duration in [0, MAX_EPOCH_DURATION + 1, u64::MAX] {
        let msg = ExecuteMsg::SetRateLimit {
            l1_token: token.to_string(),
            flow: Flow::Deposit,
            limit: Uint128::new(100),
            epoch_duration,
        };
        let err: ContractError = env
            .app
            .execute_contract(env.admin.clone(), env.bridge.clone(), &msg, &[])
            .unwrap_err()
            .downcast()
            .unwrap();
        assert_eq!(
            err,
            ContractError::InvalidEpochDuration {
                max: MAX_EPOCH_DURATION
            }
        );
    }
    assert!(env.rate_limit(Flow::Deposit).is_none());

    // Deposits and later limit changes keep working
    env.send(&token, 1_000, l2_recipient()).unwrap();
    let msg = ExecuteMsg::SetRateLimit {
        l1_token: token.to_string(),
        flow: Flow::Deposit,
        limit: Uint128::new(100),
        epoch_duration: MAX_EPOCH_DURATION,
    };
    env.app
        .execute_contract(env.admin.clone(), env.bridge.clone(), &msg, &[])
        .unwrap();
    env.send(&token, 100, l2_recipient()).unwrap();
    let err = env.send(&token, 1, l2_recipient()).unwrap_err();
    assert!(matches!(err, ContractError::RateLimitExceeded { .. }));
}
