use cosmwasm_schema::cw_serde;
use cosmwasm_std::{
    to_binary, Addr, CosmosMsg, QuerierWrapper, QueryRequest, StdResult, WasmMsg, WasmQuery,
};
use tessera_mint::Phase;

use crate::msg::{ExecuteMsg, QueryMsg};

/// MinterContract is a wrapper around Addr that provides a lot of helpers
#[cw_serde]
pub struct MinterContract(pub Addr);

impl MinterContract {
    pub fn addr(&self) -> Addr {
        self.0.clone()
    }

    pub fn call<T: Into<ExecuteMsg>>(&self, msg: T) -> StdResult<CosmosMsg> {
        let msg = to_binary(&msg.into())?;
        Ok(WasmMsg::Execute {
            contract_addr: self.addr().into(),
            msg,
            funds: vec![],
        }
        .into())
    }

    pub fn mint_phase(&self, querier: &QuerierWrapper) -> StdResult<Phase> {
        self.query(querier, QueryMsg::MintPhase {})
    }

    pub fn total_minted(&self, querier: &QuerierWrapper) -> StdResult<u64> {
        self.query(querier, QueryMsg::TotalMinted {})
    }

    pub fn remaining_public_allowance(
        &self,
        querier: &QuerierWrapper,
        address: impl Into<String>,
    ) -> StdResult<u32> {
        self.query(
            querier,
            QueryMsg::RemainingPublicAllowance {
                address: address.into(),
            },
        )
    }

    fn query<T: serde::de::DeserializeOwned>(
        &self,
        querier: &QuerierWrapper,
        msg: QueryMsg,
    ) -> StdResult<T> {
        querier.query(&QueryRequest::Wasm(WasmQuery::Smart {
            contract_addr: self.addr().into(),
            msg: to_binary(&msg)?,
        }))
    }
}
