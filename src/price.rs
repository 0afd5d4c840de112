use bigdecimal::{BigDecimal, Zero};
use num_bigint::BigInt;
use std::ops::Mul;
use substreams::log;
use substreams::store::{StoreGet, StoreSet};

use crate::config::LedgerConfig;
use crate::keyer;
use crate::math;
use crate::pb::lending as pb;
use crate::source::PriceOracle;

/// USD prices from the single configured oracle.
///
/// Oracle answers are integers in base currency units; the unit is resolved
/// once from the oracle and falls back to `10^oracle_base_currency_decimals`.
#[derive(Clone, Debug, PartialEq)]
pub struct PriceOracleAdapter {
    base_currency_unit: BigDecimal,
}

impl PriceOracleAdapter {
    pub fn new(base_currency_unit: BigDecimal) -> Self {
        PriceOracleAdapter { base_currency_unit }
    }

    pub fn resolve<O: PriceOracle>(oracle: &O, config: &LedgerConfig) -> Self {
        let fallback = math::exponent_to_big_decimal(config.oracle_base_currency_decimals);
        let base_currency_unit = match oracle.base_currency_unit() {
            Ok(unit) if unit > BigInt::zero() => BigDecimal::new(unit, 0),
            Ok(_) => {
                log::info!("WARN oracle {} reported a zero base currency unit, using {}", config.oracle, fallback);
                fallback
            }
            Err(e) => {
                log::info!("WARN unable to resolve base currency unit of oracle {}: {}, using {}", config.oracle, e, fallback);
                fallback
            }
        };

        PriceOracleAdapter::new(base_currency_unit)
    }

    pub fn base_currency_unit(&self) -> &BigDecimal {
        &self.base_currency_unit
    }

    /// `None` when the oracle has no usable price for `asset`.
    pub fn fetch_usd_price<O: PriceOracle>(&self, oracle: &O, asset: &str) -> Option<BigDecimal> {
        match oracle.asset_price(asset) {
            Ok(price) if price > BigInt::zero() => {
                Some(math::safe_div(&BigDecimal::new(price, 0), &self.base_currency_unit))
            }
            Ok(_) => {
                log::debug!("oracle returned a zero price for {}", asset);
                None
            }
            Err(e) => {
                log::debug!("unable to fetch price for {}: {}", asset, e);
                None
            }
        }
    }

    pub fn token_price<O: PriceOracle>(&self, oracle: &O, asset: &str, timestamp: i64) -> Option<pb::TokenPrice> {
        self.fetch_usd_price(oracle, asset).map(|price| pb::TokenPrice {
            asset: asset.to_string(),
            price_usd: price.to_string(),
            timestamp,
        })
    }
}

/// Values a raw token amount at `price_usd`.
pub fn value_usd(amount: &BigInt, price_usd: &BigDecimal, decimals: u64) -> BigDecimal {
    math::to_decimal(amount, decimals).mul(price_usd)
}

/// Values `amount` of `asset` with the last stored price, zero when the
/// market or its price is unknown.
pub fn usd_value<I, P>(infos: &I, prices: &P, asset: &str, amount: &BigInt) -> BigDecimal
where
    I: StoreGet<pb::MarketInfo>,
    P: StoreGet<pb::TokenPrice>,
{
    let info = match infos.get_last(keyer::market_key(asset)) {
        Some(info) => info,
        None => {
            log::debug!("missing market {} to value {}", asset, amount);
            return BigDecimal::zero();
        }
    };

    match prices.get_last(keyer::token_key(asset)) {
        Some(price) => value_usd(amount, &math::parse_bigdecimal(&price.price_usd), info.decimals),
        None => BigDecimal::zero(),
    }
}

/// Keeps the last known price of every token. A failed read writes nothing
/// so the previous price stays.
pub fn store_prices<S: StoreSet<pb::TokenPrice>>(states: &pb::MarketStates, store: &S) {
    for state in states.states.iter() {
        if let Some(price) = &state.price {
            store.set(state.ordinal, keyer::token_key(&price.asset), price);
        }
    }
    for price in states.prices.iter() {
        store.set(states.ordinal, keyer::token_key(&price.asset), price);
    }
}
