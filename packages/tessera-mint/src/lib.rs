use std::fmt;

use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{to_binary, Addr, QuerierWrapper, QueryRequest, StdResult, WasmQuery};

/// Admission regime governing which rules apply to a mint request.
///
/// Derived from the sale flags and the clock on every request; never stored
/// as its own field.
#[cw_serde]
pub enum Phase {
    /// Minting is switched off entirely
    Inactive,
    /// Grace window after activation, gated per the configured policy
    Reserved,
    /// Allowlist-only mode, proven by Merkle inclusion
    EarlyAccess,
    /// Open sale under per-tx and per-wallet caps
    Public,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Inactive => "inactive",
            Phase::Reserved => "reserved",
            Phase::EarlyAccess => "early_access",
            Phase::Public => "public",
        };
        write!(f, "{s}")
    }
}

/// Metadata tier assigned to a minted batch based on the attached payment.
/// Priced at call granularity: one payment covers the whole batch.
#[cw_serde]
pub enum Partition {
    Paid,
    Regular,
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Partition::Paid => "paid",
            Partition::Regular => "regular",
        };
        write!(f, "{s}")
    }
}

/// Policy for the reserved window between activation and the public sale.
#[cw_serde]
pub enum ReservedGating {
    /// Holders of the collateral collection mint against their unclaimed balance
    Collateral,
    /// The window runs through the same Merkle allowlist as early access
    Allowlist,
}

/// Query interface a collateral collection must expose to gate the
/// reserved window on holdings.
#[cw_serde]
#[derive(QueryResponses)]
pub enum CollateralQueryMsg {
    /// Number of units `owner` currently holds
    #[returns(CollateralBalanceResponse)]
    Balance { owner: String },
}

#[cw_serde]
pub struct CollateralBalanceResponse {
    pub balance: u32,
}

/// CollateralCollection is a wrapper around Addr that provides query helpers
#[cw_serde]
pub struct CollateralCollection(pub Addr);

impl CollateralCollection {
    pub fn addr(&self) -> Addr {
        self.0.clone()
    }

    pub fn balance(&self, querier: &QuerierWrapper, owner: impl Into<String>) -> StdResult<u32> {
        let res: CollateralBalanceResponse =
            querier.query(&QueryRequest::Wasm(WasmQuery::Smart {
                contract_addr: self.addr().into(),
                msg: to_binary(&CollateralQueryMsg::Balance {
                    owner: owner.into(),
                })?,
            }))?;
        Ok(res.balance)
    }
}
