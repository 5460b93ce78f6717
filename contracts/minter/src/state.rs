use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Coin, HexBinary, Timestamp, Uint128};
use cw_controllers::Admin;
use cw_storage_plus::{Item, Map};
use tessera_mint::{CollateralCollection, Partition, Phase, ReservedGating};

/// Immutable after instantiate
#[cw_serde]
pub struct Config {
    pub max_supply: u64,
    /// One-time bulk issuance to the admin, counted against `max_supply`
    pub reserved_count: u64,
    pub per_wallet_cap_public: u32,
    pub per_tx_cap_public: u32,
    /// Seconds after activation during which the sale stays in the reserved window
    pub sale_activation_delay: u64,
    /// Per-unit price selecting the paid metadata partition; never a gate
    pub unit_price: Coin,
    pub reserved_gating: ReservedGating,
    /// Required iff `reserved_gating` is `Collateral`
    pub collateral_collection: Option<CollateralCollection>,
}

#[cw_serde]
pub struct SaleState {
    pub minting_active: bool,
    pub early_access_mode: bool,
    /// Refreshed on every false -> true minting toggle
    pub activated_at: Option<Timestamp>,
    pub reserved_issued: bool,
    /// Locked once set
    pub merkle_root: Option<HexBinary>,
}

impl SaleState {
    pub fn sealed() -> Self {
        SaleState {
            minting_active: false,
            early_access_mode: false,
            activated_at: None,
            reserved_issued: false,
            merkle_root: None,
        }
    }
}

/// Monotonic per-wallet counters, created lazily and never deleted
#[cw_serde]
#[derive(Default)]
pub struct WalletQuota {
    pub early_access_minted: u32,
    pub reserved_claimed: u32,
    pub public_minted: u32,
}

/// Base URI per metadata partition; tokens minted before a variant is set
/// get no token_uri
#[cw_serde]
#[derive(Default)]
pub struct BaseUris {
    pub regular: Option<String>,
    pub paid: Option<String>,
}

impl BaseUris {
    pub fn for_partition(&self, partition: &Partition) -> Option<&String> {
        match partition {
            Partition::Paid => self.paid.as_ref(),
            Partition::Regular => self.regular.as_ref(),
        }
    }
}

pub const CONFIG: Item<Config> = Item::new("config");

pub const SALE_STATE: Item<SaleState> = Item::new("sale-state");

pub const TOTAL_MINTED: Item<u64> = Item::new("total-minted");

pub const WALLET_QUOTAS: Map<&Addr, WalletQuota> = Map::new("wallet-quotas");

pub const COLLECTION: Item<Addr> = Item::new("collection");

pub const BASE_URIS: Item<BaseUris> = Item::new("base-uris");

pub const CONTRACT_URI: Item<String> = Item::new("contract-uri");

/// Marketplace proxies toggled on or off by the admin; membership only
pub const PROXY_APPROVALS: Map<&Addr, bool> = Map::new("proxy-approvals");

pub const ADMIN: Admin = Admin::new("admin");

/// Phase is a pure function of the sale flags and the clock.
pub fn mint_phase(config: &Config, state: &SaleState, now: Timestamp) -> Phase {
    if !state.minting_active {
        return Phase::Inactive;
    }
    if state.early_access_mode {
        return Phase::EarlyAccess;
    }
    match state.activated_at {
        Some(activated_at) if now < activated_at.plus_seconds(config.sale_activation_delay) => {
            Phase::Reserved
        }
        _ => Phase::Public,
    }
}

/// The whole batch is `Paid` iff the payment covers `amount` units at the
/// configured per-unit price. Underpayment selects `Regular`, it never rejects.
pub fn partition_for(payment: Uint128, unit_price: &Coin, amount: u32) -> Partition {
    unit_price
        .amount
        .checked_mul(Uint128::from(amount))
        .map_or(Partition::Regular, |due| {
            if payment >= due {
                Partition::Paid
            } else {
                Partition::Regular
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmwasm_std::coin;

    fn test_config(delay: u64) -> Config {
        Config {
            max_supply: 100,
            reserved_count: 10,
            per_wallet_cap_public: 3,
            per_tx_cap_public: 3,
            sale_activation_delay: delay,
            unit_price: coin(100, "ujuno"),
            reserved_gating: ReservedGating::Collateral,
            collateral_collection: Some(CollateralCollection(Addr::unchecked("relics"))),
        }
    }

    #[test]
    fn phase_inactive_wins_over_everything() {
        let config = test_config(86400);
        let state = SaleState {
            early_access_mode: true,
            activated_at: Some(Timestamp::from_seconds(100)),
            ..SaleState::sealed()
        };
        assert_eq!(
            mint_phase(&config, &state, Timestamp::from_seconds(100)),
            Phase::Inactive
        );
    }

    #[test]
    fn phase_early_access_overrides_clock() {
        let config = test_config(86400);
        let state = SaleState {
            minting_active: true,
            early_access_mode: true,
            activated_at: Some(Timestamp::from_seconds(0)),
            ..SaleState::sealed()
        };
        // well past the delay, mode flag still wins
        assert_eq!(
            mint_phase(&config, &state, Timestamp::from_seconds(1_000_000)),
            Phase::EarlyAccess
        );
    }

    #[test]
    fn phase_reserved_until_delay_elapses() {
        let config = test_config(86400);
        let state = SaleState {
            minting_active: true,
            activated_at: Some(Timestamp::from_seconds(1_000)),
            ..SaleState::sealed()
        };
        assert_eq!(
            mint_phase(&config, &state, Timestamp::from_seconds(1_000)),
            Phase::Reserved
        );
        assert_eq!(
            mint_phase(&config, &state, Timestamp::from_seconds(1_000 + 86399)),
            Phase::Reserved
        );
        // boundary is exclusive: at exactly activated_at + delay the sale is public
        assert_eq!(
            mint_phase(&config, &state, Timestamp::from_seconds(1_000 + 86400)),
            Phase::Public
        );
    }

    #[test]
    fn phase_zero_delay_opens_immediately() {
        let config = test_config(0);
        let state = SaleState {
            minting_active: true,
            activated_at: Some(Timestamp::from_seconds(1_000)),
            ..SaleState::sealed()
        };
        assert_eq!(
            mint_phase(&config, &state, Timestamp::from_seconds(1_000)),
            Phase::Public
        );
    }

    #[test]
    fn partition_thresholds() {
        let price = coin(100, "ujuno");
        assert_eq!(
            partition_for(Uint128::new(200), &price, 2),
            Partition::Paid
        );
        assert_eq!(
            partition_for(Uint128::new(199), &price, 2),
            Partition::Regular
        );
        // zero payment is admissible, it just lands in the regular tier
        assert_eq!(
            partition_for(Uint128::zero(), &price, 1),
            Partition::Regular
        );
        // overpayment stays paid
        assert_eq!(
            partition_for(Uint128::new(1_000), &price, 3),
            Partition::Paid
        );
    }
}
