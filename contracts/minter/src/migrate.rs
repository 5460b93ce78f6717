use cosmwasm_schema::cw_serde;
use cosmwasm_std::{ensure, DepsMut, Env, Event, Response, StdError};
use semver::Version;

use crate::contract::{CONTRACT_NAME, CONTRACT_VERSION};
use crate::error::ContractError;

#[cfg(not(feature = "library"))]
use cosmwasm_std::entry_point;

#[cw_serde]
pub struct MigrateMsg {}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn migrate(deps: DepsMut, _env: Env, _msg: MigrateMsg) -> Result<Response, ContractError> {
    let prev_contract_version = cw2::get_contract_version(deps.storage)?;

    ensure!(
        prev_contract_version.contract == CONTRACT_NAME,
        StdError::generic_err("Invalid contract name for migration")
    );

    let prev_version: Version = prev_contract_version
        .version
        .parse()
        .map_err(|_| StdError::generic_err("Invalid contract version"))?;
    let new_version: Version = CONTRACT_VERSION
        .parse()
        .map_err(|_| StdError::generic_err("Invalid contract version"))?;
    ensure!(
        prev_version < new_version,
        StdError::generic_err("Must upgrade contract version")
    );

    cw2::set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    let response = Response::new().add_event(
        Event::new("migrate")
            .add_attribute("from_version", prev_contract_version.version)
            .add_attribute("to_version", CONTRACT_VERSION),
    );

    Ok(response)
}
