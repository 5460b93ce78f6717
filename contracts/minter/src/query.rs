#[cfg(not(feature = "library"))]
use cosmwasm_std::entry_point;
use cosmwasm_std::{to_binary, Binary, Deps, Env, StdResult};
use tessera_mint::{Phase, ReservedGating};

use crate::msg::{CollectionResponse, ConfigResponse, QueryMsg, SaleStatusResponse};
use crate::state::{
    mint_phase, WalletQuota, ADMIN, COLLECTION, CONFIG, CONTRACT_URI, PROXY_APPROVALS, SALE_STATE,
    TOTAL_MINTED, WALLET_QUOTAS,
};

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Config {} => to_binary(&query_config(deps)?),
        QueryMsg::SaleStatus {} => to_binary(&query_sale_status(deps)?),
        QueryMsg::MintPhase {} => to_binary(&query_mint_phase(deps, env)?),
        QueryMsg::TotalMinted {} => to_binary(&TOTAL_MINTED.load(deps.storage)?),
        QueryMsg::WalletQuota { address } => to_binary(&query_wallet_quota(deps, address)?),
        QueryMsg::RemainingPublicAllowance { address } => {
            to_binary(&query_remaining_public_allowance(deps, address)?)
        }
        QueryMsg::MintableAmount { address } => to_binary(&query_mintable_amount(deps, address)?),
        QueryMsg::IsProxyApproved { address } => to_binary(&query_proxy_approved(deps, address)?),
        QueryMsg::ContractUri {} => to_binary(&CONTRACT_URI.may_load(deps.storage)?),
        QueryMsg::Admin {} => to_binary(&ADMIN.query_admin(deps)?),
        QueryMsg::Collection {} => to_binary(&query_collection(deps)?),
    }
}

fn query_config(deps: Deps) -> StdResult<ConfigResponse> {
    let config = CONFIG.load(deps.storage)?;
    Ok(ConfigResponse { config })
}

fn query_sale_status(deps: Deps) -> StdResult<SaleStatusResponse> {
    let state = SALE_STATE.load(deps.storage)?;
    Ok(SaleStatusResponse {
        minting_active: state.minting_active,
        early_access_mode: state.early_access_mode,
        activated_at: state.activated_at,
        reserved_issued: state.reserved_issued,
        merkle_root: state.merkle_root,
    })
}

fn query_mint_phase(deps: Deps, env: Env) -> StdResult<Phase> {
    let config = CONFIG.load(deps.storage)?;
    let state = SALE_STATE.load(deps.storage)?;
    Ok(mint_phase(&config, &state, env.block.time))
}

fn query_wallet_quota(deps: Deps, address: String) -> StdResult<WalletQuota> {
    let addr = deps.api.addr_validate(&address)?;
    Ok(WALLET_QUOTAS
        .may_load(deps.storage, &addr)?
        .unwrap_or_default())
}

fn query_remaining_public_allowance(deps: Deps, address: String) -> StdResult<u32> {
    let addr = deps.api.addr_validate(&address)?;
    let config = CONFIG.load(deps.storage)?;
    let quota = WALLET_QUOTAS
        .may_load(deps.storage, &addr)?
        .unwrap_or_default();
    Ok(config
        .per_wallet_cap_public
        .saturating_sub(quota.public_minted))
}

/// Unclaimed collateral usable in the reserved window; zero when the sale is
/// not collateral-gated.
fn query_mintable_amount(deps: Deps, address: String) -> StdResult<u32> {
    let addr = deps.api.addr_validate(&address)?;
    let config = CONFIG.load(deps.storage)?;
    let collateral = match (&config.reserved_gating, &config.collateral_collection) {
        (ReservedGating::Collateral, Some(collateral)) => collateral.clone(),
        _ => return Ok(0),
    };
    let quota = WALLET_QUOTAS
        .may_load(deps.storage, &addr)?
        .unwrap_or_default();
    let balance = collateral.balance(&deps.querier, addr.to_string())?;
    Ok(balance.saturating_sub(quota.reserved_claimed))
}

fn query_proxy_approved(deps: Deps, address: String) -> StdResult<bool> {
    let addr = deps.api.addr_validate(&address)?;
    Ok(PROXY_APPROVALS
        .may_load(deps.storage, &addr)?
        .unwrap_or(false))
}

fn query_collection(deps: Deps) -> StdResult<CollectionResponse> {
    let collection = COLLECTION.load(deps.storage)?;
    Ok(CollectionResponse {
        collection: collection.to_string(),
    })
}
