use bigdecimal::{BigDecimal, Zero};
use num_bigint::BigInt;
use std::ops::Add;
use substreams::pb::substreams::store_delta::Operation;
use substreams::store::{DeltaExt, DeltaProto, Deltas, StoreAdd, StoreGet, StoreSetIfNotExists};

use crate::config::LedgerConfig;
use crate::event;
use crate::keyer;
use crate::market::MarketReader;
use crate::math;
use crate::pb::lending as pb;
use crate::position;

/// Remembers the transaction which first referenced each user, position and
/// daily active user.
pub fn store_first_seen<S: StoreSetIfNotExists<pb::LendingEvent>>(
    config: &LedgerConfig,
    transactions: &Deltas<DeltaProto<pb::LendingEvent>>,
    store: &S,
) {
    for delta in transactions.iter().operation_eq(Operation::Create) {
        let transaction = &delta.new_value;
        let day_id = keyer::bucket_id(transaction.timestamp as i64, config.seconds_per_day);
        store.set_if_not_exists_many(
            transaction.log_ordinal,
            &vec![
                keyer::user_key(&transaction.user),
                keyer::position_key(&keyer::position_id(&transaction.user, &transaction.asset)),
                keyer::active_user_key(day_id, &transaction.user),
            ],
            transaction,
        );
    }
}

/// Protocol and user counters.
///
/// Any market read adds zero to the protocol's transaction count so the
/// counter, and with it the protocol, exists from the first market on.
pub fn store_counts<S: StoreAdd<i64>>(
    states: &pb::MarketStates,
    transactions: &Deltas<DeltaProto<pb::LendingEvent>>,
    first_seen: &Deltas<DeltaProto<pb::LendingEvent>>,
    market_infos: &Deltas<DeltaProto<pb::MarketInfo>>,
    store: &S,
) {
    if let Some(state) = states.states.first() {
        store.add(state.ordinal, keyer::protocol_key(keyer::TRANSACTION_COUNT), 0);
    }

    for (_, flow) in event::applied_flows(transactions) {
        store.add_many(
            flow.log_ordinal,
            &vec![
                keyer::protocol_key(keyer::TRANSACTION_COUNT),
                keyer::user_field_key(&flow.user, keyer::TRANSACTION_COUNT),
            ],
            1,
        );
    }

    for delta in first_seen
        .iter()
        .operation_eq(Operation::Create)
        .key_first_segment_eq(keyer::USER)
    {
        store.add(delta.ordinal, keyer::protocol_key(keyer::USER_COUNT), 1);
    }

    for delta in market_infos.iter().operation_eq(Operation::Create) {
        store.add(delta.ordinal, keyer::protocol_key(keyer::MARKET_COUNT), 1);
    }
}

/// `(total_supply_usd, total_borrow_usd)` of the user's positions across
/// `markets`, a full recompute from the stored balances and prices.
pub fn user_totals<M, B>(user: &str, markets: &[String], reader: &M, balances: &B) -> (BigDecimal, BigDecimal)
where
    M: MarketReader,
    B: StoreGet<pb::PositionBalance>,
{
    let mut total_supply_usd = BigDecimal::zero();
    let mut total_borrow_usd = BigDecimal::zero();
    for asset in markets.iter() {
        let balance = match balances.get_last(keyer::position_key(&keyer::position_id(user, asset))) {
            Some(balance) => balance,
            None => continue,
        };
        let market = reader.last(asset);

        let supplied = math::parse_bigint(&balance.supplied);
        if supplied > BigInt::zero() {
            if let Some(usd) = market.value_usd(&supplied) {
                total_supply_usd = total_supply_usd.add(usd);
            }
        }
        let debt = position::total_debt(&balance);
        if debt > BigInt::zero() {
            if let Some(usd) = market.value_usd(&debt) {
                total_borrow_usd = total_borrow_usd.add(usd);
            }
        }
    }

    (total_supply_usd, total_borrow_usd)
}

/// `(total_supply_usd, total_borrow_usd)` over every market's reserve totals.
pub fn protocol_totals<M: MarketReader>(markets: &[String], reader: &M) -> (BigDecimal, BigDecimal) {
    let mut total_supply_usd = BigDecimal::zero();
    let mut total_borrow_usd = BigDecimal::zero();
    for asset in markets.iter() {
        let market = reader.last(asset);
        let totals = match &market.totals {
            Some(totals) => totals,
            None => continue,
        };

        if let Some(usd) = market.value_usd(&math::parse_bigint(&totals.total_supply)) {
            total_supply_usd = total_supply_usd.add(usd);
        }
        if let Some(usd) = market.value_usd(&crate::market::total_borrow(totals)) {
            total_borrow_usd = total_borrow_usd.add(usd);
        }
    }

    (total_supply_usd, total_borrow_usd)
}
