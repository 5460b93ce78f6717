use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Coin, HexBinary, Timestamp};
use cw_controllers::AdminResponse;
use tessera_mint::{Partition, Phase, ReservedGating};

use crate::state::{Config, WalletQuota};

#[cw_serde]
pub struct InstantiateMsg {
    /// Defaults to the sender
    pub admin: Option<String>,
    /// Code id of the cw721 collection this minter instantiates and controls
    pub collection_code_id: u64,
    pub name: String,
    pub symbol: String,
    pub max_supply: u64,
    pub reserved_count: u64,
    pub per_wallet_cap_public: u32,
    pub per_tx_cap_public: u32,
    /// Seconds the reserved window lasts after each activation
    pub sale_activation_delay: u64,
    /// Per-unit price selecting the paid metadata partition
    pub unit_price: Coin,
    pub reserved_gating: ReservedGating,
    /// Collateral collection address, required for `ReservedGating::Collateral`
    pub collateral_collection: Option<String>,
}

/// Membership claim for allowlist-gated phases, checked against the
/// published merkle root. Never persisted.
#[cw_serde]
pub struct AllowlistProof {
    pub index: u64,
    pub allowance: u32,
    pub hashes: Vec<HexBinary>,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Mint `amount` units to the sender. Attached funds select the metadata
    /// partition for the whole batch; they never gate admission.
    Mint {
        amount: u32,
        proof: Option<AllowlistProof>,
    },
    /// One-time bulk issuance of `reserved_count` units to the admin
    ReserveTokens {},
    ToggleMinting {},
    ToggleEarlyAccess {},
    /// Publish the allowlist commitment; locked once set
    SetMerkleRoot { root: HexBinary },
    SetBaseUri { partition: Partition, uri: String },
    SetContractUri { uri: String },
    /// Flip the approval bit for a marketplace proxy
    ToggleProxyState { address: String },
    /// Send the accumulated mint proceeds to the admin
    Withdraw {},
    UpdateAdmin { admin: Option<String> },
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(ConfigResponse)]
    Config {},
    #[returns(SaleStatusResponse)]
    SaleStatus {},
    /// Phase resolved against the current block time
    #[returns(Phase)]
    MintPhase {},
    #[returns(u64)]
    TotalMinted {},
    #[returns(WalletQuota)]
    WalletQuota { address: String },
    /// Public-phase allowance the wallet has left
    #[returns(u32)]
    RemainingPublicAllowance { address: String },
    /// Unclaimed collateral balance usable in the reserved window
    #[returns(u32)]
    MintableAmount { address: String },
    #[returns(bool)]
    IsProxyApproved { address: String },
    #[returns(Option<String>)]
    ContractUri {},
    #[returns(AdminResponse)]
    Admin {},
    #[returns(CollectionResponse)]
    Collection {},
}

#[cw_serde]
pub struct ConfigResponse {
    pub config: Config,
}

#[cw_serde]
pub struct SaleStatusResponse {
    pub minting_active: bool,
    pub early_access_mode: bool,
    pub activated_at: Option<Timestamp>,
    pub reserved_issued: bool,
    pub merkle_root: Option<HexBinary>,
}

#[cw_serde]
pub struct CollectionResponse {
    pub collection: String,
}
