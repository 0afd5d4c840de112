use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use std::collections::HashMap;
use std::ops::Sub;
use substreams::log;
use substreams::store::{StoreGet, StoreMax, StoreSet, StoreSetIfNotExists};

use crate::config::LedgerConfig;
use crate::event::{LendingEvent, RateUpdateEvent};
use crate::keyer;
use crate::math;
use crate::pb::lending as pb;
use crate::price::{self, PriceOracleAdapter};
use crate::source::{Chain, ReserveData, ReserveSource};
use crate::token;

/// Reads every market the block touched.
///
/// Markets referenced by an event get one state at their first event's
/// ordinal. On a tick every discovered market gets one, untouched ones at the
/// ordinal following the block's events. Discovered markets left without a
/// state still get their price refreshed.
pub fn market_states<C: Chain>(
    chain: &C,
    config: &LedgerConfig,
    events: &[LendingEvent],
    tick: bool,
    timestamp: i64,
    block_number: u64,
) -> pb::MarketStates {
    let ordinal = events.iter().map(|e| e.log_ordinal()).max().map_or(0, |o| o + 1);
    let mut states = pb::MarketStates {
        tick,
        ordinal,
        timestamp,
        block_number,
        ..Default::default()
    };
    if events.is_empty() && !tick {
        return states;
    }

    match chain.list_markets() {
        Ok(markets) => {
            states.markets = markets;
            states.markets_discovered = true;
        }
        Err(e) => log::debug!("unable to list markets at block {}: {}", block_number, e),
    }

    let mut touched: Vec<(&str, u64)> = vec![];
    let mut rate_updates: HashMap<&str, &RateUpdateEvent> = HashMap::new();
    for event in events.iter() {
        if !touched.iter().any(|(asset, _)| *asset == event.asset()) {
            touched.push((event.asset(), event.log_ordinal()));
        }
        if let LendingEvent::RateUpdate(update) = event {
            rate_updates.insert(update.asset.as_str(), update);
        }
    }

    let oracle = PriceOracleAdapter::resolve(chain, config);
    for (asset, first_ordinal) in touched.iter() {
        let state = read_state(
            chain,
            config,
            &oracle,
            asset,
            rate_updates.get(asset).copied(),
            *first_ordinal,
            timestamp,
            block_number,
        );
        states.states.push(state);
    }

    let listed = states.markets.clone();
    let untouched = listed
        .iter()
        .filter(|asset| !touched.iter().any(|(t, _)| *t == asset.as_str()))
        .collect::<Vec<&String>>();
    if tick {
        log::info!("tick at {} over {} markets", timestamp, listed.len());
        for asset in untouched {
            let state = read_state(chain, config, &oracle, asset, None, ordinal, timestamp, block_number);
            states.states.push(state);
        }
    } else {
        for asset in untouched {
            if let Some(price) = oracle.token_price(chain, asset, timestamp) {
                states.prices.push(price);
            }
        }
    }

    states
}

#[allow(clippy::too_many_arguments)]
fn read_state<C: Chain>(
    chain: &C,
    config: &LedgerConfig,
    oracle: &PriceOracleAdapter,
    asset: &str,
    rate_update: Option<&RateUpdateEvent>,
    ordinal: u64,
    timestamp: i64,
    block_number: u64,
) -> pb::MarketState {
    let reserve = read_reserve(chain, asset);
    // the event carries the new rates, totals still come from the read
    let rates = match rate_update {
        Some(update) => Some(pb::ReserveRates {
            liquidity_rate: update.liquidity_rate.to_string(),
            variable_borrow_rate: update.variable_borrow_rate.to_string(),
            stable_borrow_rate: update.stable_borrow_rate.to_string(),
        }),
        None => reserve.as_ref().map(|r| pb::ReserveRates {
            liquidity_rate: r.liquidity_rate.to_string(),
            variable_borrow_rate: r.variable_borrow_rate.to_string(),
            stable_borrow_rate: r.stable_borrow_rate.to_string(),
        }),
    };

    pb::MarketState {
        asset: asset.to_string(),
        timestamp,
        block_number,
        ordinal,
        info: Some(read_info(chain, config, asset, timestamp, block_number)),
        totals: reserve.map(|r| pb::ReserveTotals {
            total_supply: r.total_supply.to_string(),
            total_stable_debt: r.total_stable_debt.to_string(),
            total_variable_debt: r.total_variable_debt.to_string(),
        }),
        rates,
        config: read_configuration(chain, asset),
        price: oracle.token_price(chain, asset, timestamp),
        token_total_supply: token::read_total_supply(chain, asset)
            .map(|supply| supply.to_string())
            .unwrap_or_default(),
    }
}

/// Static description of the market, only kept on first sight.
pub fn read_info<C: Chain>(
    chain: &C,
    config: &LedgerConfig,
    asset: &str,
    timestamp: i64,
    block_number: u64,
) -> pb::MarketInfo {
    let metadata = token::read_metadata(chain, config, asset);
    let output_token = match chain.reserve_tokens(asset) {
        Ok(tokens) => tokens.a_token,
        Err(e) => {
            log::debug!("unable to resolve aToken of {}: {}", asset, e);
            String::new()
        }
    };

    pb::MarketInfo {
        asset: asset.to_string(),
        output_token,
        symbol: metadata.symbol,
        name: metadata.name,
        decimals: metadata.decimals,
        created_timestamp: timestamp,
        created_block_number: block_number,
    }
}

fn read_reserve<C: ReserveSource>(chain: &C, asset: &str) -> Option<ReserveData> {
    match chain.reserve_data(asset) {
        Ok(reserve) => Some(reserve),
        Err(e) => {
            log::debug!("unable to read reserve of market {}: {}", asset, e);
            None
        }
    }
}

pub fn read_configuration<C: ReserveSource>(chain: &C, asset: &str) -> Option<pb::ReserveConfig> {
    match chain.reserve_configuration(asset) {
        Ok(configuration) => Some(pb::ReserveConfig {
            ltv: configuration.ltv,
            liquidation_threshold: configuration.liquidation_threshold,
            // bonus is expressed on top of 100%, ex: 10500 is a 5% penalty
            liquidation_penalty: if configuration.liquidation_bonus > 10_000 {
                configuration.liquidation_bonus - 10_000
            } else {
                0
            },
            reserve_factor: configuration.reserve_factor,
            is_active: configuration.is_active,
            is_frozen: configuration.is_frozen,
        }),
        Err(e) => {
            log::debug!("unable to read configuration of market {}: {}", asset, e);
            None
        }
    }
}

// ------------------------------------------------
//      stored market view
// ------------------------------------------------

/// What the stores know about one market. Parts never read successfully are absent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MarketView {
    pub info: Option<pb::MarketInfo>,
    pub totals: Option<pb::ReserveTotals>,
    pub rates: Option<pb::ReserveRates>,
    pub config: Option<pb::ReserveConfig>,
    pub price: Option<pb::TokenPrice>,
}

impl MarketView {
    /// Zero until the configuration was read once.
    pub fn reserve_factor(&self) -> i64 {
        self.config.as_ref().map_or(0, |c| c.reserve_factor)
    }

    pub fn price_usd(&self) -> Option<BigDecimal> {
        self.price.as_ref().map(|p| math::parse_bigdecimal(&p.price_usd))
    }

    /// `None` without metadata or price.
    pub fn value_usd(&self, amount: &BigInt) -> Option<BigDecimal> {
        let info = self.info.as_ref()?;
        let price_usd = self.price_usd()?;
        Some(price::value_usd(amount, &price_usd, info.decimals))
    }
}

pub trait MarketReader {
    /// The market as it was at the start of the block.
    fn first(&self, asset: &str) -> MarketView;
    /// The market after the block's reads.
    fn last(&self, asset: &str) -> MarketView;
}

pub struct MarketStores<'a, I, T, R, F, P> {
    pub infos: &'a I,
    pub totals: &'a T,
    pub rates: &'a R,
    pub configs: &'a F,
    pub prices: &'a P,
}

impl<'a, I, T, R, F, P> MarketReader for MarketStores<'a, I, T, R, F, P>
where
    I: StoreGet<pb::MarketInfo>,
    T: StoreGet<pb::ReserveTotals>,
    R: StoreGet<pb::ReserveRates>,
    F: StoreGet<pb::ReserveConfig>,
    P: StoreGet<pb::TokenPrice>,
{
    fn first(&self, asset: &str) -> MarketView {
        let key = keyer::market_key(asset);
        MarketView {
            info: self.infos.get_first(&key),
            totals: self.totals.get_first(&key),
            rates: self.rates.get_first(&key),
            config: self.configs.get_first(&key),
            price: self.prices.get_first(keyer::token_key(asset)),
        }
    }

    fn last(&self, asset: &str) -> MarketView {
        let key = keyer::market_key(asset);
        MarketView {
            info: self.infos.get_last(&key),
            totals: self.totals.get_last(&key),
            rates: self.rates.get_last(&key),
            config: self.configs.get_last(&key),
            price: self.prices.get_last(keyer::token_key(asset)),
        }
    }
}

// ------------------------------------------------
//      derived fields
// ------------------------------------------------
pub fn total_borrow(totals: &pb::ReserveTotals) -> BigInt {
    math::parse_bigint(&totals.total_stable_debt) + math::parse_bigint(&totals.total_variable_debt)
}

pub fn available_liquidity(totals: &pb::ReserveTotals) -> BigInt {
    math::parse_bigint(&totals.total_supply).sub(total_borrow(totals))
}

pub fn utilization_rate(totals: &pb::ReserveTotals) -> BigDecimal {
    math::percentage(&total_borrow(totals), &math::parse_bigint(&totals.total_supply))
}

/// `(supply_apy, borrow_apy)` as percentages.
pub fn apys(config: &LedgerConfig, rates: &pb::ReserveRates) -> (BigDecimal, BigDecimal) {
    (
        math::ray_to_percentage(&math::parse_bigint(&rates.liquidity_rate), config.ray_decimals),
        math::ray_to_percentage(&math::parse_bigint(&rates.variable_borrow_rate), config.ray_decimals),
    )
}

// ------------------------------------------------
//      stores
// ------------------------------------------------
pub fn store_infos<S: StoreSetIfNotExists<pb::MarketInfo>>(states: &pb::MarketStates, store: &S) {
    for state in states.states.iter() {
        if let Some(info) = &state.info {
            store.set_if_not_exists(state.ordinal, keyer::market_key(&state.asset), info);
        }
    }
}

pub fn store_totals<S: StoreSet<pb::ReserveTotals>>(states: &pb::MarketStates, store: &S) {
    for state in states.states.iter() {
        if let Some(totals) = &state.totals {
            store.set(state.ordinal, keyer::market_key(&state.asset), totals);
        }
    }
}

pub fn store_rates<S: StoreSet<pb::ReserveRates>>(states: &pb::MarketStates, store: &S) {
    for state in states.states.iter() {
        if let Some(rates) = &state.rates {
            store.set(state.ordinal, keyer::market_key(&state.asset), rates);
        }
    }
}

pub fn store_configs<S: StoreSet<pb::ReserveConfig>>(states: &pb::MarketStates, store: &S) {
    for state in states.states.iter() {
        if let Some(config) = &state.config {
            store.set(state.ordinal, keyer::market_key(&state.asset), config);
        }
    }
}

/// Revenue accrual checkpoint of every market, it never moves backwards.
pub fn store_checkpoints<S: StoreMax<i64>>(states: &pb::MarketStates, store: &S) {
    for state in states.states.iter() {
        store.max(state.ordinal, keyer::market_key(&state.asset), state.timestamp);
    }
}
