//! Gateway handlers: deposits towards L2 and proven withdrawals from L2.
//!
//! Every handler runs all of its checks before its first storage write, so a
//! rejected call leaves no quota, nonce or balance change behind.

use common::{bytes32_to_hex, parse_bytes32_hex, MerkleProof, Message};
use cosmwasm_std::{
    from_json, to_json_binary, Addr, Binary, CosmosMsg, Deps, DepsMut, Env, Event, MessageInfo, Response,
    Uint128, WasmMsg,
};
use cw20::{AllowanceResponse, BalanceResponse, Cw20ExecuteMsg, Cw20QueryMsg, Cw20ReceiveMsg};

use crate::assets;
use crate::commitments;
use crate::error::ContractError;
use crate::governance::ensure_active;
use crate::msg::{Flow, ReceiveMsg, Subsystem};
use crate::rate_limit::{self, Reservation};
use crate::state::{AssetBinding, CONFIG, CONSUMED_NONCES, LOCKED_BALANCES, OUTGOING_NONCE};

// ============================================================================
// Deposit
// ============================================================================

/// Deposit that passed every check and is ready to be written.
struct CheckedDeposit {
    binding: AssetBinding,
    amount: Uint128,
    l2_amount: Uint128,
    l2_recipient: String,
    reservation: Option<Reservation>,
}

/// Lock CW20 tokens pulled through an allowance and emit a message to L2.
pub fn execute_deposit(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    l1_token: String,
    amount: Uint128,
    l2_recipient: String,
) -> Result<Response, ContractError> {
    ensure_active(deps.storage, Subsystem::Deposits)?;

    let token = deps.api.addr_validate(&l1_token)?;
    let checked = check_deposit(deps.as_ref(), &env, &token, amount, &l2_recipient)?;
    check_can_transfer(deps.as_ref(), &env, &token, &info.sender, amount)?;

    let pull = CosmosMsg::Wasm(WasmMsg::Execute {
        contract_addr: token.to_string(),
        msg: to_json_binary(&Cw20ExecuteMsg::TransferFrom {
            owner: info.sender.to_string(),
            recipient: env.contract.address.to_string(),
            amount,
        })?,
        funds: vec![],
    });

    let response = record_deposit(deps, checked, &info.sender)?;
    Ok(response.add_message(pull))
}

/// CW20 `Send` hook: the token contract already moved the funds here.
pub fn execute_receive(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    cw20_msg: Cw20ReceiveMsg,
) -> Result<Response, ContractError> {
    ensure_active(deps.storage, Subsystem::Deposits)?;

    let token = info.sender;
    let sender = deps.api.addr_validate(&cw20_msg.sender)?;

    let receive_msg: ReceiveMsg = from_json(&cw20_msg.msg)?;
    match receive_msg {
        ReceiveMsg::Deposit { l2_recipient } => {
            let checked =
                check_deposit(deps.as_ref(), &env, &token, cw20_msg.amount, &l2_recipient)?;
            record_deposit(deps, checked, &sender)
        }
    }
}

fn check_deposit(
    deps: Deps,
    env: &Env,
    token: &Addr,
    amount: Uint128,
    l2_recipient: &str,
) -> Result<CheckedDeposit, ContractError> {
    if amount.is_zero() {
        return Err(ContractError::InvalidAmount {
            reason: "Amount must be greater than zero".to_string(),
        });
    }
    let recipient = parse_bytes32_hex(l2_recipient).ok_or_else(|| ContractError::InvalidAddress {
        reason: format!("{l2_recipient} is not a 32-byte hex address"),
    })?;

    let binding = assets::resolve(deps.storage, token)?;
    let l2_amount = binding.to_l2(amount)?;
    let reservation =
        rate_limit::try_reserve(deps.storage, Flow::Deposit, token, amount, env.block.time)?;

    Ok(CheckedDeposit {
        binding,
        amount,
        l2_amount,
        l2_recipient: bytes32_to_hex(&recipient),
        reservation,
    })
}

/// The depositor must hold `amount` and have an unexpired allowance for it.
fn check_can_transfer(
    deps: Deps,
    env: &Env,
    token: &Addr,
    owner: &Addr,
    amount: Uint128,
) -> Result<(), ContractError> {
    let query_failed = |e: cosmwasm_std::StdError| ContractError::TransferFailed {
        reason: format!("token query failed: {e}"),
    };

    let balance: BalanceResponse = deps
        .querier
        .query_wasm_smart(
            token.to_string(),
            &Cw20QueryMsg::Balance {
                address: owner.to_string(),
            },
        )
        .map_err(query_failed)?;
    if balance.balance < amount {
        return Err(ContractError::TransferFailed {
            reason: format!("balance {} below {}", balance.balance, amount),
        });
    }

    let allowance: AllowanceResponse = deps
        .querier
        .query_wasm_smart(
            token.to_string(),
            &Cw20QueryMsg::Allowance {
                owner: owner.to_string(),
                spender: env.contract.address.to_string(),
            },
        )
        .map_err(query_failed)?;
    let usable = if allowance.expires.is_expired(&env.block) {
        Uint128::zero()
    } else {
        allowance.allowance
    };
    if usable < amount {
        return Err(ContractError::TransferFailed {
            reason: format!("allowance {usable} below {amount}"),
        });
    }
    Ok(())
}

fn record_deposit(
    deps: DepsMut,
    checked: CheckedDeposit,
    sender: &Addr,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;

    if let Some(reservation) = checked.reservation {
        reservation.commit(deps.storage)?;
    }

    let token = &checked.binding.l1_token;
    let locked = LOCKED_BALANCES
        .may_load(deps.storage, token)?
        .unwrap_or_default();
    LOCKED_BALANCES.save(deps.storage, token, &(locked + checked.amount))?;

    let nonce = OUTGOING_NONCE.load(deps.storage)?;
    OUTGOING_NONCE.save(deps.storage, &(nonce + 1))?;

    let message = Message {
        sender: sender.to_string(),
        recipient: checked.l2_recipient,
        amount: checked.l2_amount,
        nonce,
        data: Binary::from(checked.binding.l2_asset_id.to_vec()),
        source_chain: config.l1_chain_id,
    };

    let event = Event::new("bridge_message")
        .add_attribute("sender", &message.sender)
        .add_attribute("recipient", &message.recipient)
        .add_attribute("amount", message.amount.to_string())
        .add_attribute("nonce", nonce.to_string())
        .add_attribute("data", bytes32_to_hex(&checked.binding.l2_asset_id))
        .add_attribute("source_chain", message.source_chain.to_string())
        .add_attribute("leaf", bytes32_to_hex(&message.leaf()));

    Ok(Response::new()
        .add_event(event)
        .add_attribute("action", "deposit")
        .add_attribute("l1_token", token.to_string())
        .add_attribute("amount", checked.amount.to_string())
        .add_attribute("l2_amount", checked.l2_amount.to_string())
        .add_attribute("nonce", nonce.to_string()))
}

// ============================================================================
// Withdraw
// ============================================================================

/// Release L1 funds for an L2 message included under a finalized root.
///
/// Checks run in a fixed order so the caller always learns the first reason
/// a withdrawal can't proceed: pause, finality, proof, source chain, replay,
/// binding, rate limit, liquidity.
pub fn execute_withdraw(
    deps: DepsMut,
    env: Env,
    _info: MessageInfo,
    message: Message,
    proof: MerkleProof,
    height: u64,
) -> Result<Response, ContractError> {
    ensure_active(deps.storage, Subsystem::Withdrawals)?;

    if !commitments::is_finalized(deps.storage, env.block.time, height)? {
        return Err(ContractError::NotYetFinalized { height });
    }
    let leaf = message.leaf();
    commitments::require_inclusion(deps.storage, height, &leaf, &proof)?;

    let config = CONFIG.load(deps.storage)?;
    if message.source_chain != config.l2_chain_id {
        return Err(ContractError::UnexpectedSourceChain {
            expected: config.l2_chain_id,
            got: message.source_chain,
        });
    }

    let nonce_key = (message.source_chain, message.nonce);
    if CONSUMED_NONCES.has(deps.storage, nonce_key) {
        return Err(ContractError::ReplayedMessage {
            source_chain: message.source_chain,
            nonce: message.nonce,
        });
    }

    let asset_id = message
        .asset_id()
        .ok_or_else(|| ContractError::UnboundAsset {
            asset: format!("0x{}", hex::encode(message.data.as_slice())),
        })?;
    let binding = assets::resolve_l2(deps.storage, &asset_id)?;
    let recipient = deps
        .api
        .addr_validate(&message.recipient)
        .map_err(|e| ContractError::InvalidAddress {
            reason: e.to_string(),
        })?;

    let amount = binding.to_l1(message.amount)?;
    if amount.is_zero() {
        return Err(ContractError::InvalidAmount {
            reason: "Amount must be greater than zero".to_string(),
        });
    }

    let token = &binding.l1_token;
    let reservation =
        rate_limit::try_reserve(deps.storage, Flow::Withdrawal, token, amount, env.block.time)?;

    let locked = LOCKED_BALANCES
        .may_load(deps.storage, token)?
        .unwrap_or_default();
    if locked < amount {
        return Err(ContractError::TransferFailed {
            reason: format!("locked balance {locked} below {amount}"),
        });
    }

    // All checks passed
    CONSUMED_NONCES.save(deps.storage, nonce_key, &true)?;
    if let Some(reservation) = reservation {
        reservation.commit(deps.storage)?;
    }
    LOCKED_BALANCES.save(deps.storage, token, &(locked - amount))?;

    let release = CosmosMsg::Wasm(WasmMsg::Execute {
        contract_addr: token.to_string(),
        msg: to_json_binary(&Cw20ExecuteMsg::Transfer {
            recipient: recipient.to_string(),
            amount,
        })?,
        funds: vec![],
    });

    Ok(Response::new()
        .add_message(release)
        .add_attribute("action", "withdraw")
        .add_attribute("leaf", bytes32_to_hex(&leaf))
        .add_attribute("height", height.to_string())
        .add_attribute("source_chain", message.source_chain.to_string())
        .add_attribute("nonce", message.nonce.to_string())
        .add_attribute("recipient", recipient.to_string())
        .add_attribute("l1_token", token.to_string())
        .add_attribute("amount", amount.to_string()))
}
