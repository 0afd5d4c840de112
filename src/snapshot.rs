use substreams::key;
use substreams::pb::substreams::store_delta::Operation;
use substreams::scalar;
use substreams::store::{DeltaExt, DeltaProto, Deltas, StoreAdd, StoreGet};

use crate::config::LedgerConfig;
use crate::event::{self, FlowEvent, TransactionType};
use crate::keyer;
use crate::math;
use crate::pb::lending as pb;
use crate::price;

/// Hour bucket of `asset` at `timestamp`, `(snapshot_id, hour_id)`.
pub fn hourly_id(config: &LedgerConfig, asset: &str, timestamp: i64) -> (String, i64) {
    let hour_id = keyer::bucket_id(timestamp, config.seconds_per_hour);
    (keyer::snapshot_id(asset, hour_id), hour_id)
}

/// Day bucket of `asset` at `timestamp`, `(snapshot_id, day_id)`.
pub fn daily_id(config: &LedgerConfig, asset: &str, timestamp: i64) -> (String, i64) {
    let day_id = keyer::bucket_id(timestamp, config.seconds_per_day);
    (keyer::snapshot_id(asset, day_id), day_id)
}

/// Transaction and active user counters of every bucket.
///
/// A market read opens its current buckets with a zero transaction count so
/// their state copy gets refreshed even in a block without flows.
pub fn store_snapshot_counts<S: StoreAdd<i64>>(
    config: &LedgerConfig,
    states: &pb::MarketStates,
    transactions: &Deltas<DeltaProto<pb::LendingEvent>>,
    first_seen: &Deltas<DeltaProto<pb::LendingEvent>>,
    store: &S,
) {
    for state in states.states.iter() {
        let (hourly, _) = hourly_id(config, &state.asset, state.timestamp);
        let (daily, _) = daily_id(config, &state.asset, state.timestamp);
        store.add_many(
            state.ordinal,
            &vec![
                keyer::hourly_key(&hourly, keyer::TRANSACTION_COUNT),
                keyer::daily_key(&daily, keyer::TRANSACTION_COUNT),
            ],
            0,
        );
    }

    for (_, flow) in event::applied_flows(transactions) {
        let (hourly, _) = hourly_id(config, &flow.asset, flow.timestamp);
        let (daily, _) = daily_id(config, &flow.asset, flow.timestamp);
        store.add_many(
            flow.log_ordinal,
            &vec![
                keyer::hourly_key(&hourly, keyer::TRANSACTION_COUNT),
                keyer::daily_key(&daily, keyer::TRANSACTION_COUNT),
            ],
            1,
        );
    }

    for delta in first_seen
        .iter()
        .operation_eq(Operation::Create)
        .key_first_segment_eq(keyer::ACTIVE)
    {
        let (daily, _) = daily_id(config, &delta.new_value.asset, delta.new_value.timestamp as i64);
        store.add(delta.ordinal, keyer::daily_key(&daily, keyer::ACTIVE_USERS), 1);
    }
}

/// Raw volumes per transaction type, hourly and daily.
pub fn store_volumes<S: StoreAdd<scalar::BigInt>>(
    config: &LedgerConfig,
    flows: &[(TransactionType, FlowEvent)],
    store: &S,
) {
    for (transaction_type, flow) in flows.iter() {
        let (hourly, _) = hourly_id(config, &flow.asset, flow.timestamp);
        let (daily, _) = daily_id(config, &flow.asset, flow.timestamp);
        store.add_many(
            flow.log_ordinal,
            &vec![
                keyer::hourly_key(&hourly, transaction_type.volume_field()),
                keyer::daily_key(&daily, transaction_type.volume_field()),
            ],
            math::to_scalar_bigint(&flow.amount),
        );
    }
}

/// Daily USD volumes, each flow valued with the price known after the block's reads.
pub fn store_volumes_usd<I, P, S>(
    config: &LedgerConfig,
    flows: &[(TransactionType, FlowEvent)],
    infos: &I,
    prices: &P,
    store: &S,
) where
    I: StoreGet<pb::MarketInfo>,
    P: StoreGet<pb::TokenPrice>,
    S: StoreAdd<scalar::BigDecimal>,
{
    for (transaction_type, flow) in flows.iter() {
        let (daily, _) = daily_id(config, &flow.asset, flow.timestamp);
        let amount_usd = price::usd_value(infos, prices, &flow.asset, &flow.amount);
        store.add(
            flow.log_ordinal,
            keyer::daily_key(&daily, transaction_type.volume_usd_field()),
            math::to_scalar_decimal(&amount_usd),
        );
    }
}

/// `(market, bucket_id)` of a snapshot counter key such as `daily:{market}-{day}:activeUsers`.
pub fn parse_counter_key(counter_key: &String) -> Option<(String, i64)> {
    let snapshot_id = key::try_segment_at(counter_key, 1)?;
    keyer::parse_snapshot_id(snapshot_id).map(|(market, bucket_id)| (market.to_string(), bucket_id))
}
