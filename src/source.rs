//! Boundaries to the authoritative on-chain state the ledger derives from.
//!
//! Each query either yields a value or a [`QueryError`]; none of them panic.
//! The market list is never cached, so new reserves are picked up on the
//! next call.

use num_bigint::BigInt;

use crate::error::QueryError;

/// Live state of one reserve.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReserveData {
    pub total_supply: BigInt,
    pub total_stable_debt: BigInt,
    pub total_variable_debt: BigInt,
    pub liquidity_rate: BigInt,
    pub variable_borrow_rate: BigInt,
    pub stable_borrow_rate: BigInt,
}

/// Risk parameters of one reserve, all in basis points.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReserveConfiguration {
    pub ltv: i64,
    pub liquidation_threshold: i64,
    pub liquidation_bonus: i64,
    pub reserve_factor: i64,
    pub is_active: bool,
    pub is_frozen: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReserveTokens {
    pub a_token: String,
}

/// One user's balances in one reserve.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserReserveData {
    pub current_a_token_balance: BigInt,
    pub current_stable_debt: BigInt,
    pub current_variable_debt: BigInt,
    pub usage_as_collateral_enabled: bool,
}

pub trait MarketDiscovery {
    fn list_markets(&self) -> Result<Vec<String>, QueryError>;
}

pub trait PriceOracle {
    /// Price in oracle base currency units.
    fn asset_price(&self, asset: &str) -> Result<BigInt, QueryError>;
    fn base_currency_unit(&self) -> Result<BigInt, QueryError>;
}

pub trait TokenMetadata {
    fn symbol(&self, token: &str) -> Result<String, QueryError>;
    fn name(&self, token: &str) -> Result<String, QueryError>;
    fn decimals(&self, token: &str) -> Result<u64, QueryError>;
    fn total_supply(&self, token: &str) -> Result<BigInt, QueryError>;
}

pub trait ReserveSource {
    fn reserve_data(&self, asset: &str) -> Result<ReserveData, QueryError>;
    fn reserve_configuration(&self, asset: &str) -> Result<ReserveConfiguration, QueryError>;
    fn reserve_tokens(&self, asset: &str) -> Result<ReserveTokens, QueryError>;
    fn user_reserve_data(&self, asset: &str, user: &str) -> Result<UserReserveData, QueryError>;
}

/// Everything the ledger reads from the chain.
pub trait Chain: MarketDiscovery + PriceOracle + TokenMetadata + ReserveSource {}

impl<T: MarketDiscovery + PriceOracle + TokenMetadata + ReserveSource> Chain for T {}
