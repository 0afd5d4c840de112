use bigdecimal::{BigDecimal, Zero};
use num_bigint::BigInt;
use std::ops::{Add, Div, Mul, Sub};
use substreams::log;
use substreams::scalar;
use substreams::store::{StoreAdd, StoreGet};

use crate::config::LedgerConfig;
use crate::keyer;
use crate::market::{self, MarketReader, MarketView};
use crate::math;
use crate::pb::lending as pb;

/// Revenue amount in USD together with its reserve factor split.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RevenueSplit {
    pub total: BigDecimal,
    pub protocol_side: BigDecimal,
    pub supply_side: BigDecimal,
}

impl RevenueSplit {
    pub fn new(total: BigDecimal, reserve_factor: i64, config: &LedgerConfig) -> Self {
        let (protocol_side, supply_side) = math::split_by_reserve_factor(&total, reserve_factor, config.basis_points);
        RevenueSplit {
            total,
            protocol_side,
            supply_side,
        }
    }

    fn add(self, other: RevenueSplit) -> RevenueSplit {
        RevenueSplit {
            total: self.total.add(other.total),
            protocol_side: self.protocol_side.add(other.protocol_side),
            supply_side: self.supply_side.add(other.supply_side),
        }
    }
}

/// Annualized borrow/supply rate spread, `None` when the market has no
/// outstanding borrowing or a non-positive spread.
fn rate_spread(config: &LedgerConfig, rates: &pb::ReserveRates, total_borrow: &BigInt) -> Option<BigDecimal> {
    let variable_borrow_rate = math::parse_bigint(&rates.variable_borrow_rate);
    if *total_borrow <= BigInt::zero() || variable_borrow_rate <= BigInt::zero() {
        return None;
    }

    let borrow_rate = math::ray_to_decimal(&variable_borrow_rate, config.ray_decimals);
    let supply_rate = math::ray_to_decimal(&math::parse_bigint(&rates.liquidity_rate), config.ray_decimals);
    let spread = borrow_rate.sub(supply_rate);
    if spread > BigDecimal::zero() {
        Some(spread)
    } else {
        None
    }
}

/// Spread revenue per year at the market's rates and total borrow valued in USD.
fn annual_revenue(config: &LedgerConfig, market: &MarketView) -> Option<BigDecimal> {
    let rates = market.rates.as_ref()?;
    let total_borrow = market::total_borrow(market.totals.as_ref()?);
    let spread = rate_spread(config, rates, &total_borrow)?;
    let borrow_usd = market.value_usd(&total_borrow)?;
    Some(spread.mul(borrow_usd))
}

/// Revenue earned over `elapsed` seconds with the market held in `market`.
pub fn accrue(config: &LedgerConfig, market: &MarketView, elapsed: i64) -> RevenueSplit {
    if elapsed <= 0 {
        return RevenueSplit::default();
    }

    annual_revenue(config, market)
        .map(|annual| {
            let period_revenue = annual
                .mul(BigDecimal::from(elapsed))
                .div(BigDecimal::from(config.seconds_per_year));
            RevenueSplit::new(period_revenue, market.reserve_factor(), config)
        })
        .unwrap_or_default()
}

/// Revenue the market would earn in one day if current rates and balances held.
///
/// This is a projection, it never feeds the protocol's cumulative counters.
pub fn projected_daily_revenue(config: &LedgerConfig, market: &MarketView) -> RevenueSplit {
    let projected = annual_revenue(config, market)
        .map(|annual| annual.div(BigDecimal::from(config.days_per_year)))
        .unwrap_or_else(BigDecimal::zero);

    RevenueSplit::new(projected, market.reserve_factor(), config)
}

/// Sums the projected daily revenue of `markets`, skipping unknown ones.
pub fn summarize<M: MarketReader>(config: &LedgerConfig, markets: &[String], reader: &M) -> RevenueSplit {
    markets
        .iter()
        .map(|asset| reader.last(asset))
        .filter(|market| market.info.is_some())
        .map(|market| projected_daily_revenue(config, &market))
        .fold(RevenueSplit::default(), RevenueSplit::add)
}

/// Recognizes the spread revenue each market earned since its last checkpoint.
///
/// The interval is valued with the market as it stood at the start of the
/// block, before this block's reads replaced its rates and balances. A market
/// seen for the first time has no checkpoint yet and earns nothing.
pub fn store_accruals<C, M, S>(config: &LedgerConfig, states: &pb::MarketStates, checkpoints: &C, reader: &M, store: &S)
where
    C: StoreGet<i64>,
    M: MarketReader,
    S: StoreAdd<scalar::BigDecimal>,
{
    for state in states.states.iter() {
        let checkpoint = match checkpoints.get_first(keyer::market_key(&state.asset)) {
            Some(checkpoint) => checkpoint,
            None => continue,
        };
        let elapsed = state.timestamp - checkpoint;
        let revenue = accrue(config, &reader.first(&state.asset), elapsed);
        if revenue.total.is_zero() {
            continue;
        }

        log::info!(
            "accrued {} USD on market {} over {}s (protocol side {}, supply side {})",
            revenue.total,
            state.asset,
            elapsed,
            revenue.protocol_side,
            revenue.supply_side
        );
        store.add(
            state.ordinal,
            keyer::protocol_key(keyer::TOTAL_REVENUE_USD),
            math::to_scalar_decimal(&revenue.total),
        );
        store.add(
            state.ordinal,
            keyer::protocol_key(keyer::PROTOCOL_SIDE_REVENUE_USD),
            math::to_scalar_decimal(&revenue.protocol_side),
        );
        store.add(
            state.ordinal,
            keyer::protocol_key(keyer::SUPPLY_SIDE_REVENUE_USD),
            math::to_scalar_decimal(&revenue.supply_side),
        );
    }
}
