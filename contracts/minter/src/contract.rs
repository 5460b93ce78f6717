#[cfg(not(feature = "library"))]
use cosmwasm_std::entry_point;
use cosmwasm_std::{
    to_binary, Addr, BankMsg, Deps, DepsMut, Empty, Env, Event, HexBinary, MessageInfo, Reply,
    Response, StdResult, SubMsg, WasmMsg,
};
use cw2::set_contract_version;
use cw721_base::{
    ExecuteMsg as Cw721ExecuteMsg, Extension, InstantiateMsg as Cw721InstantiateMsg, MintMsg,
};
use cw_utils::{may_pay, maybe_addr, parse_reply_instantiate_data};
use tessera_mint::{CollateralCollection, Partition, Phase, ReservedGating};

use crate::error::ContractError;
use crate::msg::{AllowlistProof, ExecuteMsg, InstantiateMsg};
use crate::state::{
    mint_phase, partition_for, BaseUris, Config, SaleState, WalletQuota, ADMIN, BASE_URIS,
    COLLECTION, CONFIG, CONTRACT_URI, PROXY_APPROVALS, SALE_STATE, TOTAL_MINTED, WALLET_QUOTAS,
};

// version info for migration info
pub const CONTRACT_NAME: &str = "crates.io:tessera-minter";
pub const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

const INIT_COLLECTION_REPLY_ID: u64 = 1;

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    mut deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    if msg.max_supply == 0 {
        return Err(ContractError::ZeroConfigValue("max_supply"));
    }
    if msg.per_tx_cap_public == 0 {
        return Err(ContractError::ZeroConfigValue("per_tx_cap_public"));
    }
    if msg.per_wallet_cap_public == 0 {
        return Err(ContractError::ZeroConfigValue("per_wallet_cap_public"));
    }
    if msg.reserved_count > msg.max_supply {
        return Err(ContractError::ReservedExceedsSupply {
            reserved: msg.reserved_count,
            max_supply: msg.max_supply,
        });
    }

    let collateral_collection = msg
        .collateral_collection
        .map(|addr| deps.api.addr_validate(&addr))
        .transpose()?
        .map(CollateralCollection);
    if msg.reserved_gating == ReservedGating::Collateral && collateral_collection.is_none() {
        return Err(ContractError::CollateralCollectionRequired {});
    }

    let admin = msg
        .admin
        .map(|a| deps.api.addr_validate(&a))
        .transpose()?
        .unwrap_or_else(|| info.sender.clone());
    ADMIN.set(deps.branch(), Some(admin.clone()))?;

    let config = Config {
        max_supply: msg.max_supply,
        reserved_count: msg.reserved_count,
        per_wallet_cap_public: msg.per_wallet_cap_public,
        per_tx_cap_public: msg.per_tx_cap_public,
        sale_activation_delay: msg.sale_activation_delay,
        unit_price: msg.unit_price,
        reserved_gating: msg.reserved_gating,
        collateral_collection,
    };
    CONFIG.save(deps.storage, &config)?;
    SALE_STATE.save(deps.storage, &SaleState::sealed())?;
    TOTAL_MINTED.save(deps.storage, &0u64)?;
    BASE_URIS.save(deps.storage, &BaseUris::default())?;

    let wasm_msg = WasmMsg::Instantiate {
        code_id: msg.collection_code_id,
        msg: to_binary(&Cw721InstantiateMsg {
            name: msg.name,
            symbol: msg.symbol,
            minter: env.contract.address.to_string(),
        })?,
        funds: info.funds,
        admin: None,
        label: "Tessera Collection".to_string(),
    };
    let submsg = SubMsg::reply_on_success(wasm_msg, INIT_COLLECTION_REPLY_ID);

    Ok(Response::new()
        .add_attribute("action", "instantiate")
        .add_attribute("admin", admin)
        .add_submessage(submsg))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn reply(deps: DepsMut, _env: Env, msg: Reply) -> Result<Response, ContractError> {
    if msg.id != INIT_COLLECTION_REPLY_ID {
        return Err(ContractError::InvalidReplyID {});
    }

    match parse_reply_instantiate_data(msg) {
        Ok(res) => {
            let collection_address = res.contract_address;
            COLLECTION.save(deps.storage, &Addr::unchecked(collection_address))?;
            Ok(Response::default().add_attribute("action", "init_collection_reply"))
        }
        Err(_) => Err(ContractError::ReplyOnSuccess {}),
    }
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    let api = deps.api;

    match msg {
        ExecuteMsg::Mint { amount, proof } => execute_mint(deps, env, info, amount, proof),
        ExecuteMsg::ReserveTokens {} => execute_reserve_tokens(deps, info),
        ExecuteMsg::ToggleMinting {} => execute_toggle_minting(deps, env, info),
        ExecuteMsg::ToggleEarlyAccess {} => execute_toggle_early_access(deps, info),
        ExecuteMsg::SetMerkleRoot { root } => execute_set_merkle_root(deps, info, root),
        ExecuteMsg::SetBaseUri { partition, uri } => {
            execute_set_base_uri(deps, info, partition, uri)
        }
        ExecuteMsg::SetContractUri { uri } => execute_set_contract_uri(deps, info, uri),
        ExecuteMsg::ToggleProxyState { address } => {
            execute_toggle_proxy_state(deps, info, api.addr_validate(&address)?)
        }
        ExecuteMsg::Withdraw {} => execute_withdraw(deps, env, info),
        ExecuteMsg::UpdateAdmin { admin } => execute_update_admin(deps, info, admin),
    }
}

/// Admission pipeline: resolve phase, check quotas, then commit counters and
/// issue the id range in one transaction. Every rejection happens before the
/// first write.
pub fn execute_mint(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    amount: u32,
    proof: Option<AllowlistProof>,
) -> Result<Response, ContractError> {
    if amount == 0 {
        return Err(ContractError::ZeroMintAmount {});
    }

    let config = CONFIG.load(deps.storage)?;
    let mut state = SALE_STATE.load(deps.storage)?;

    // malformed funds are rejected before any quota work
    let payment = may_pay(&info, &config.unit_price.denom)?;

    let phase = mint_phase(&config, &state, env.block.time);

    if phase == Phase::Inactive {
        return Err(ContractError::MintingNotActive {});
    }

    let total_minted = TOTAL_MINTED.load(deps.storage)?;
    let remaining = config.max_supply - total_minted;
    if u64::from(amount) > remaining {
        return Err(ContractError::SupplyExceeded {
            requested: u64::from(amount),
            remaining,
        });
    }

    let mut quota = WALLET_QUOTAS
        .may_load(deps.storage, &info.sender)?
        .unwrap_or_default();

    match phase {
        Phase::Inactive => return Err(ContractError::MintingNotActive {}),
        Phase::EarlyAccess => {
            check_allowlist(&state, &info.sender, &quota, amount, proof.as_ref())?;
            quota.early_access_minted += amount;
        }
        Phase::Reserved => match config.reserved_gating {
            ReservedGating::Collateral => {
                let unclaimed =
                    unclaimed_collateral(deps.as_ref(), &config, &info.sender, &quota)?;
                if unclaimed < amount {
                    return Err(ContractError::InsufficientCollateral { unclaimed });
                }
                quota.reserved_claimed += amount;
            }
            ReservedGating::Allowlist => {
                check_allowlist(&state, &info.sender, &quota, amount, proof.as_ref())?;
                quota.early_access_minted += amount;
            }
        },
        Phase::Public => {
            if amount > config.per_tx_cap_public {
                return Err(ContractError::TxCapExceeded {
                    cap: config.per_tx_cap_public,
                });
            }
            if u64::from(quota.public_minted) + u64::from(amount)
                > u64::from(config.per_wallet_cap_public)
            {
                return Err(ContractError::WalletCapExceeded {
                    cap: config.per_wallet_cap_public,
                });
            }
            quota.public_minted += amount;
        }
    }

    let new_total = total_minted + u64::from(amount);
    TOTAL_MINTED.save(deps.storage, &new_total)?;
    WALLET_QUOTAS.save(deps.storage, &info.sender, &quota)?;

    let partition = partition_for(payment, &config.unit_price, amount);
    let base_uris = BASE_URIS.load(deps.storage)?;
    let collection = COLLECTION.load(deps.storage)?;

    let first_id = total_minted + 1;
    let mint_msgs = mint_batch_msgs(
        &collection,
        &info.sender,
        first_id,
        u64::from(amount),
        base_uris.for_partition(&partition),
    )?;

    let mut res = Response::new().add_messages(mint_msgs);

    // supply exhaustion halts the sale in the same transaction
    if new_total == config.max_supply {
        state.minting_active = false;
        SALE_STATE.save(deps.storage, &state)?;
        res = res.add_event(
            Event::new("sold-out").add_attribute("total_minted", new_total.to_string()),
        );
    }

    let event = Event::new("mint")
        .add_attribute("wallet", info.sender)
        .add_attribute("amount", amount.to_string())
        .add_attribute("first_token_id", first_id.to_string())
        .add_attribute("last_token_id", new_total.to_string())
        .add_attribute("phase", phase.to_string())
        .add_attribute("partition", partition.to_string())
        .add_attribute("payment", payment);
    Ok(res.add_event(event))
}

/// One-time bulk issuance to the admin, latched by `reserved_issued`.
pub fn execute_reserve_tokens(deps: DepsMut, info: MessageInfo) -> Result<Response, ContractError> {
    ADMIN.assert_admin(deps.as_ref(), &info.sender)?;

    let config = CONFIG.load(deps.storage)?;
    let mut state = SALE_STATE.load(deps.storage)?;
    if state.reserved_issued {
        return Err(ContractError::AlreadyReserved {});
    }

    let total_minted = TOTAL_MINTED.load(deps.storage)?;
    let remaining = config.max_supply - total_minted;
    if config.reserved_count > remaining {
        return Err(ContractError::SupplyExceeded {
            requested: config.reserved_count,
            remaining,
        });
    }

    let new_total = total_minted + config.reserved_count;
    TOTAL_MINTED.save(deps.storage, &new_total)?;
    state.reserved_issued = true;
    if new_total == config.max_supply {
        state.minting_active = false;
    }
    SALE_STATE.save(deps.storage, &state)?;

    let base_uris = BASE_URIS.load(deps.storage)?;
    let collection = COLLECTION.load(deps.storage)?;
    let mint_msgs = mint_batch_msgs(
        &collection,
        &info.sender,
        total_minted + 1,
        config.reserved_count,
        base_uris.for_partition(&Partition::Regular),
    )?;

    let event = Event::new("reserve-tokens")
        .add_attribute("recipient", info.sender)
        .add_attribute("count", config.reserved_count.to_string());
    Ok(Response::new().add_messages(mint_msgs).add_event(event))
}

pub fn execute_toggle_minting(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
) -> Result<Response, ContractError> {
    ADMIN.assert_admin(deps.as_ref(), &info.sender)?;

    let mut state = SALE_STATE.load(deps.storage)?;
    state.minting_active = !state.minting_active;
    if state.minting_active {
        // each activation re-arms the reserved window
        state.activated_at = Some(env.block.time);
    }
    SALE_STATE.save(deps.storage, &state)?;

    let event = Event::new("toggle-minting")
        .add_attribute("minting_active", state.minting_active.to_string());
    Ok(Response::new().add_event(event))
}

pub fn execute_toggle_early_access(
    deps: DepsMut,
    info: MessageInfo,
) -> Result<Response, ContractError> {
    ADMIN.assert_admin(deps.as_ref(), &info.sender)?;

    let mut state = SALE_STATE.load(deps.storage)?;
    state.early_access_mode = !state.early_access_mode;
    SALE_STATE.save(deps.storage, &state)?;

    let event = Event::new("toggle-early-access")
        .add_attribute("early_access_mode", state.early_access_mode.to_string());
    Ok(Response::new().add_event(event))
}

pub fn execute_set_merkle_root(
    deps: DepsMut,
    info: MessageInfo,
    root: HexBinary,
) -> Result<Response, ContractError> {
    ADMIN.assert_admin(deps.as_ref(), &info.sender)?;

    if root.as_slice().len() != 32 {
        return Err(ContractError::InvalidMerkleRoot {});
    }

    let mut state = SALE_STATE.load(deps.storage)?;
    if state.merkle_root.is_some() {
        return Err(ContractError::AlreadyConfigured {});
    }
    state.merkle_root = Some(root.clone());
    SALE_STATE.save(deps.storage, &state)?;

    let event = Event::new("set-merkle-root").add_attribute("root", root.to_hex());
    Ok(Response::new().add_event(event))
}

pub fn execute_set_base_uri(
    deps: DepsMut,
    info: MessageInfo,
    partition: Partition,
    uri: String,
) -> Result<Response, ContractError> {
    ADMIN.assert_admin(deps.as_ref(), &info.sender)?;

    let mut base_uris = BASE_URIS.load(deps.storage)?;
    match partition {
        Partition::Paid => base_uris.paid = Some(uri.clone()),
        Partition::Regular => base_uris.regular = Some(uri.clone()),
    }
    BASE_URIS.save(deps.storage, &base_uris)?;

    let event = Event::new("set-base-uri")
        .add_attribute("partition", partition.to_string())
        .add_attribute("uri", uri);
    Ok(Response::new().add_event(event))
}

pub fn execute_set_contract_uri(
    deps: DepsMut,
    info: MessageInfo,
    uri: String,
) -> Result<Response, ContractError> {
    ADMIN.assert_admin(deps.as_ref(), &info.sender)?;

    CONTRACT_URI.save(deps.storage, &uri)?;

    let event = Event::new("set-contract-uri").add_attribute("uri", uri);
    Ok(Response::new().add_event(event))
}

pub fn execute_toggle_proxy_state(
    deps: DepsMut,
    info: MessageInfo,
    proxy: Addr,
) -> Result<Response, ContractError> {
    ADMIN.assert_admin(deps.as_ref(), &info.sender)?;

    let approved = PROXY_APPROVALS
        .may_load(deps.storage, &proxy)?
        .unwrap_or(false);
    PROXY_APPROVALS.save(deps.storage, &proxy, &!approved)?;

    let event = Event::new("toggle-proxy-state")
        .add_attribute("proxy", proxy)
        .add_attribute("approved", (!approved).to_string());
    Ok(Response::new().add_event(event))
}

pub fn execute_withdraw(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
) -> Result<Response, ContractError> {
    ADMIN.assert_admin(deps.as_ref(), &info.sender)?;

    let balance = deps.querier.query_all_balances(env.contract.address.as_str())?;
    let mut res = Response::new();
    if !balance.is_empty() {
        res = res.add_message(BankMsg::Send {
            to_address: info.sender.to_string(),
            amount: balance,
        });
    }

    let event = Event::new("withdraw").add_attribute("recipient", info.sender);
    Ok(res.add_event(event))
}

pub fn execute_update_admin(
    deps: DepsMut,
    info: MessageInfo,
    admin: Option<String>,
) -> Result<Response, ContractError> {
    let new_admin = maybe_addr(deps.api, admin)?;
    Ok(ADMIN.execute_update_admin(deps, info, new_admin)?)
}

/// Allowlist membership check for proof-gated phases. Fails closed: a missing
/// root, missing proof, malformed hashes or a non-verifying claim are all the
/// same `InvalidProof` rejection.
fn check_allowlist(
    state: &SaleState,
    wallet: &Addr,
    quota: &WalletQuota,
    amount: u32,
    proof: Option<&AllowlistProof>,
) -> Result<(), ContractError> {
    let root = state
        .merkle_root
        .as_ref()
        .ok_or(ContractError::InvalidProof {})?;
    let proof = proof.ok_or(ContractError::InvalidProof {})?;

    let root: [u8; 32] = root.to_array().map_err(|_| ContractError::InvalidProof {})?;
    let hashes = proof
        .hashes
        .iter()
        .map(|h| h.to_array())
        .collect::<StdResult<Vec<[u8; 32]>>>()
        .map_err(|_| ContractError::InvalidProof {})?;

    if !tessera_allowlist::verify(&root, proof.index, wallet.as_str(), proof.allowance, &hashes) {
        return Err(ContractError::InvalidProof {});
    }

    if u64::from(quota.early_access_minted) + u64::from(amount) > u64::from(proof.allowance) {
        return Err(ContractError::AllowlistExceeded {
            allowance: proof.allowance,
            minted: quota.early_access_minted,
        });
    }
    Ok(())
}

fn unclaimed_collateral(
    deps: Deps,
    config: &Config,
    wallet: &Addr,
    quota: &WalletQuota,
) -> Result<u32, ContractError> {
    let collateral = config
        .collateral_collection
        .as_ref()
        .ok_or(ContractError::CollateralCollectionRequired {})?;
    let balance = collateral.balance(&deps.querier, wallet.to_string())?;
    Ok(balance.saturating_sub(quota.reserved_claimed))
}

fn mint_batch_msgs(
    collection: &Addr,
    recipient: &Addr,
    first_id: u64,
    amount: u64,
    base_uri: Option<&String>,
) -> StdResult<Vec<WasmMsg>> {
    (first_id..first_id + amount)
        .map(|id| {
            let mint_msg = Cw721ExecuteMsg::<Extension, Empty>::Mint(MintMsg {
                token_id: id.to_string(),
                owner: recipient.to_string(),
                token_uri: base_uri.map(|base| format!("{base}/{id}")),
                extension: None,
            });
            Ok(WasmMsg::Execute {
                contract_addr: collection.to_string(),
                msg: to_binary(&mint_msg)?,
                funds: vec![],
            })
        })
        .collect()
}
