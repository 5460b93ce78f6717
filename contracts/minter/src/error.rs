use cosmwasm_std::StdError;
use cw_controllers::AdminError;
use cw_utils::PaymentError;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("{0}")]
    Admin(#[from] AdminError),

    #[error("{0}")]
    Payment(#[from] PaymentError),

    #[error("MintingNotActive")]
    MintingNotActive {},

    #[error("SupplyExceeded: requested {requested} with {remaining} remaining")]
    SupplyExceeded { requested: u64, remaining: u64 },

    #[error("AllowlistExceeded: allowance {allowance}, already minted {minted}")]
    AllowlistExceeded { allowance: u32, minted: u32 },

    #[error("InsufficientCollateral: unclaimed balance is {unclaimed}")]
    InsufficientCollateral { unclaimed: u32 },

    #[error("TxCapExceeded: at most {cap} per transaction")]
    TxCapExceeded { cap: u32 },

    #[error("WalletCapExceeded: at most {cap} per wallet")]
    WalletCapExceeded { cap: u32 },

    #[error("InvalidProof")]
    InvalidProof {},

    #[error("AlreadyReserved")]
    AlreadyReserved {},

    #[error("AlreadyConfigured: merkle root is locked once set")]
    AlreadyConfigured {},

    #[error("ZeroMintAmount")]
    ZeroMintAmount {},

    #[error("InvalidMerkleRoot: expected 32 bytes")]
    InvalidMerkleRoot {},

    #[error("InvalidConfig: reserved count {reserved} exceeds max supply {max_supply}")]
    ReservedExceedsSupply { reserved: u64, max_supply: u64 },

    #[error("InvalidConfig: {0} must be nonzero")]
    ZeroConfigValue(&'static str),

    #[error("InvalidConfig: collateral collection required for collateral gating")]
    CollateralCollectionRequired {},

    #[error("Invalid reply ID")]
    InvalidReplyID {},

    #[error("Reply error")]
    ReplyOnSuccess {},
}
