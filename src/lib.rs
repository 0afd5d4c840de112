pub mod aggregate;
pub mod config;
pub mod db;
pub mod error;
pub mod eth;
pub mod event;
pub mod keyer;
pub mod market;
pub mod math;
pub mod pb;
pub mod position;
pub mod price;
pub mod revenue;
pub mod rpc;
pub mod snapshot;
pub mod source;
#[cfg(test)]
mod testing;
pub mod token;
pub mod utils;

use crate::config::LedgerConfig;
use crate::market::MarketStores;
use crate::pb::lending::{
    self, Events, MarketInfo, MarketStates, PositionBalance, PositionBalances, ReserveConfig, ReserveRates,
    ReserveTotals, TokenPrice,
};
use crate::rpc::RpcChain;
use substreams::errors::Error;
use substreams::pb::substreams::Clock;
use substreams::store::{
    DeltaBigDecimal, DeltaBigInt, DeltaInt64, DeltaProto, Deltas, StoreAddBigDecimal, StoreAddBigInt, StoreAddInt64,
    StoreGetBigInt, StoreGetInt64, StoreGetProto, StoreMaxInt64, StoreMinBigInt, StoreSetBigInt, StoreSetIfNotExistsProto,
    StoreSetProto, StoreGet, StoreNew,
};
use substreams::{log, Hex};
use substreams_entity_change::pb::entity::EntityChanges;
use substreams_entity_change::tables::Tables;
use substreams_ethereum::pb::eth::v2::Block;

#[substreams::handlers::map]
pub fn map_lending_events(params: String, block: Block) -> Result<Events, Error> {
    let config = LedgerConfig::from_params(&params);
    let pool = match eth::parse_address(&config.pool) {
        Some(pool) => pool,
        None => {
            log::info!("WARN invalid pool address {}, no events extracted", config.pool);
            return Ok(Events::default());
        }
    };
    let timestamp = block.timestamp_seconds() as i64;

    let events = block
        .logs()
        .filter(|log| log.address() == pool.as_bytes())
        .filter_map(|log| {
            let transaction_hash = format!("0x{}", Hex(&log.receipt.transaction.hash));
            event::decode_log(log.log, &transaction_hash, timestamp, block.number)
        })
        .map(|event| lending::LendingEvent::from(&event))
        .collect::<Vec<lending::LendingEvent>>();

    if !events.is_empty() {
        log::info!("block {}: {} lending events", block.number, events.len());
    }
    Ok(Events { events })
}

/// Chain reads of every market the block touched, or of all of them on a tick.
#[substreams::handlers::map]
pub fn map_market_states(params: String, clock: Clock, events: Events) -> Result<MarketStates, Error> {
    let config = LedgerConfig::from_params(&params);
    let chain = RpcChain::new(&config);
    let timestamp = clock.timestamp.as_ref().map(|t| t.seconds).unwrap_or_default();
    let events = event::decode_events(&events.events);

    Ok(market::market_states(
        &chain,
        &config,
        &events,
        config.should_tick(clock.number),
        timestamp,
        clock.number,
    ))
}

#[substreams::handlers::map]
pub fn map_position_balances(params: String, events: Events) -> Result<PositionBalances, Error> {
    let config = LedgerConfig::from_params(&params);
    let chain = RpcChain::new(&config);
    let events = event::decode_events(&events.events);

    Ok(position::position_balances(&chain, &events))
}

#[substreams::handlers::store]
pub fn store_transactions(events: Events, store: StoreSetIfNotExistsProto<lending::LendingEvent>) {
    event::store_transactions(&events, &store);
}

#[substreams::handlers::store]
pub fn store_first_seen(
    params: String,
    transactions_deltas: Deltas<DeltaProto<lending::LendingEvent>>, /* store_transactions */
    store: StoreSetIfNotExistsProto<lending::LendingEvent>,
) {
    let config = LedgerConfig::from_params(&params);
    aggregate::store_first_seen(&config, &transactions_deltas, &store);
}

#[substreams::handlers::store]
pub fn store_market_infos(states: MarketStates, store: StoreSetIfNotExistsProto<MarketInfo>) {
    market::store_infos(&states, &store);
}

#[substreams::handlers::store]
pub fn store_reserve_totals(states: MarketStates, store: StoreSetProto<ReserveTotals>) {
    market::store_totals(&states, &store);
}

#[substreams::handlers::store]
pub fn store_reserve_rates(states: MarketStates, store: StoreSetProto<ReserveRates>) {
    market::store_rates(&states, &store);
}

#[substreams::handlers::store]
pub fn store_reserve_configs(states: MarketStates, store: StoreSetProto<ReserveConfig>) {
    market::store_configs(&states, &store);
}

#[substreams::handlers::store]
pub fn store_prices(states: MarketStates, store: StoreSetProto<TokenPrice>) {
    price::store_prices(&states, &store);
}

#[substreams::handlers::store]
pub fn store_token_supplies(states: MarketStates, store: StoreSetBigInt) {
    token::store_total_supplies(&states, &store);
}

#[substreams::handlers::store]
pub fn store_accrual_checkpoints(states: MarketStates, store: StoreMaxInt64) {
    market::store_checkpoints(&states, &store);
}

#[substreams::handlers::store]
pub fn store_revenue(
    params: String,
    states: MarketStates,                         /* map_market_states */
    checkpoints_store: StoreGetInt64,             /* store_accrual_checkpoints */
    infos_store: StoreGetProto<MarketInfo>,       /* store_market_infos */
    totals_store: StoreGetProto<ReserveTotals>,   /* store_reserve_totals */
    rates_store: StoreGetProto<ReserveRates>,     /* store_reserve_rates */
    configs_store: StoreGetProto<ReserveConfig>,  /* store_reserve_configs */
    prices_store: StoreGetProto<TokenPrice>,      /* store_prices */
    store: StoreAddBigDecimal,
) {
    let config = LedgerConfig::from_params(&params);
    let reader = MarketStores {
        infos: &infos_store,
        totals: &totals_store,
        rates: &rates_store,
        configs: &configs_store,
        prices: &prices_store,
    };
    revenue::store_accruals(&config, &states, &checkpoints_store, &reader, &store);
}

#[substreams::handlers::store]
pub fn store_counts(
    states: MarketStates,                                           /* map_market_states */
    transactions_deltas: Deltas<DeltaProto<lending::LendingEvent>>, /* store_transactions */
    first_seen_deltas: Deltas<DeltaProto<lending::LendingEvent>>,   /* store_first_seen */
    market_infos_deltas: Deltas<DeltaProto<MarketInfo>>,            /* store_market_infos */
    store: StoreAddInt64,
) {
    aggregate::store_counts(
        &states,
        &transactions_deltas,
        &first_seen_deltas,
        &market_infos_deltas,
        &store,
    );
}

#[substreams::handlers::store]
pub fn store_snapshot_counts(
    params: String,
    states: MarketStates,                                           /* map_market_states */
    transactions_deltas: Deltas<DeltaProto<lending::LendingEvent>>, /* store_transactions */
    first_seen_deltas: Deltas<DeltaProto<lending::LendingEvent>>,   /* store_first_seen */
    store: StoreAddInt64,
) {
    let config = LedgerConfig::from_params(&params);
    snapshot::store_snapshot_counts(&config, &states, &transactions_deltas, &first_seen_deltas, &store);
}

#[substreams::handlers::store]
pub fn store_volumes(
    params: String,
    transactions_deltas: Deltas<DeltaProto<lending::LendingEvent>>, /* store_transactions */
    store: StoreAddBigInt,
) {
    let config = LedgerConfig::from_params(&params);
    snapshot::store_volumes(&config, &event::applied_flows(&transactions_deltas), &store);
}

#[substreams::handlers::store]
pub fn store_volumes_usd(
    params: String,
    transactions_deltas: Deltas<DeltaProto<lending::LendingEvent>>, /* store_transactions */
    infos_store: StoreGetProto<MarketInfo>,                         /* store_market_infos */
    prices_store: StoreGetProto<TokenPrice>,                        /* store_prices */
    store: StoreAddBigDecimal,
) {
    let config = LedgerConfig::from_params(&params);
    let flows = event::applied_flows(&transactions_deltas);
    snapshot::store_volumes_usd(&config, &flows, &infos_store, &prices_store, &store);
}

#[substreams::handlers::store]
pub fn store_position_flows(
    transactions_deltas: Deltas<DeltaProto<lending::LendingEvent>>, /* store_transactions */
    store: StoreAddBigInt,
) {
    position::store_flows(&event::applied_flows(&transactions_deltas), &store);
}

#[substreams::handlers::store]
pub fn store_principal_floors(position_flows_deltas: Deltas<DeltaBigInt>, store: StoreMinBigInt) {
    position::store_floors(&position_flows_deltas, &store);
}

#[substreams::handlers::store]
pub fn store_position_balances(balances: PositionBalances, store: StoreSetProto<PositionBalance>) {
    position::store_balances(&balances, &store);
}

#[substreams::handlers::map]
pub fn graph_out(
    params: String,
    states: MarketStates,                                           /* map_market_states */
    balances: PositionBalances,                                     /* map_position_balances */
    transactions_deltas: Deltas<DeltaProto<lending::LendingEvent>>, /* store_transactions */
    first_seen_deltas: Deltas<DeltaProto<lending::LendingEvent>>,   /* store_first_seen */
    counts_deltas: Deltas<DeltaInt64>,                              /* store_counts */
    snapshot_counts_deltas: Deltas<DeltaInt64>,                     /* store_snapshot_counts */
    volumes_deltas: Deltas<DeltaBigInt>,                            /* store_volumes */
    volumes_usd_deltas: Deltas<DeltaBigDecimal>,                    /* store_volumes_usd */
    position_flows_deltas: Deltas<DeltaBigInt>,                     /* store_position_flows */
    market_infos_deltas: Deltas<DeltaProto<MarketInfo>>,            /* store_market_infos */
    checkpoints_deltas: Deltas<DeltaInt64>,                         /* store_accrual_checkpoints */
    revenue_deltas: Deltas<DeltaBigDecimal>,                        /* store_revenue */
    token_supplies_deltas: Deltas<DeltaBigInt>,                     /* store_token_supplies */
    infos_store: StoreGetProto<MarketInfo>,                         /* store_market_infos */
    totals_store: StoreGetProto<ReserveTotals>,                     /* store_reserve_totals */
    rates_store: StoreGetProto<ReserveRates>,                       /* store_reserve_rates */
    configs_store: StoreGetProto<ReserveConfig>,                    /* store_reserve_configs */
    prices_store: StoreGetProto<TokenPrice>,                        /* store_prices */
    principal_floors_store: StoreGetBigInt,                         /* store_principal_floors */
    position_balances_store: StoreGetProto<PositionBalance>,        /* store_position_balances */
) -> Result<EntityChanges, Error> {
    let config = LedgerConfig::from_params(&params);
    let reader = MarketStores {
        infos: &infos_store,
        totals: &totals_store,
        rates: &rates_store,
        configs: &configs_store,
        prices: &prices_store,
    };
    let deltas = db::LedgerDeltas {
        transactions: transactions_deltas,
        first_seen: first_seen_deltas,
        counts: counts_deltas,
        snapshot_counts: snapshot_counts_deltas,
        volumes: volumes_deltas,
        volumes_usd: volumes_usd_deltas,
        position_flows: position_flows_deltas,
        market_infos: market_infos_deltas,
        checkpoints: checkpoints_deltas,
        revenue: revenue_deltas,
        token_supplies: token_supplies_deltas,
    };

    let mut tables = Tables::new();
    db::ledger_entity_changes(
        &mut tables,
        &config,
        &states,
        &balances,
        &deltas,
        &reader,
        &principal_floors_store,
        &position_balances_store,
    );

    Ok(tables.to_entity_changes())
}

#[cfg(test)]
mod tests {
    use crate::db;
    use crate::event::{FlowEvent, LendingEvent, RateUpdateEvent};
    use crate::keyer;
    use crate::math;
    use crate::snapshot;
    use crate::testing::{field, has_entity, ray, MockChain, Pipeline, ALICE, BOB, USDC};
    use bigdecimal::BigDecimal;
    use num_bigint::BigInt;

    const T0: i64 = 1_700_006_400;
    const YEAR: i64 = 31_536_000;
    const PROTOCOL_ID: &str = crate::utils::PROTOCOL_ID;

    fn flow(hash: &str, user: &str, amount: i64, timestamp: i64, block_number: u64) -> FlowEvent {
        FlowEvent {
            transaction_hash: hash.to_string(),
            log_index: 0,
            timestamp,
            block_number,
            asset: USDC.to_string(),
            user: user.to_string(),
            caller: user.to_string(),
            amount: BigInt::from(amount),
            log_ordinal: 1,
        }
    }

    fn decimal(value: Option<String>) -> Option<BigDecimal> {
        value.map(|v| math::parse_bigdecimal(&v))
    }

    #[test]
    fn test_revenue_accrues_across_blocks() {
        let mut chain = MockChain::default();
        chain.set_reserve(USDC, 2_000_000_000_000, 1_000_000_000_000, "3", "5");
        chain.set_user_reserve(USDC, BOB, 0, 1_000_000_000);
        let mut pipeline = Pipeline::new(chain);

        let borrow = LendingEvent::Borrow(flow("0x01", BOB, 1_000_000_000, T0, 18_000_001));
        let changes = pipeline.run_block(18_000_001, T0, &[borrow]);
        assert!(has_entity(&changes, db::PROTOCOL, PROTOCOL_ID));
        // first sight of the market, nothing earned yet
        assert_eq!(
            Some(BigDecimal::from(0)),
            decimal(field(&changes, db::PROTOCOL, PROTOCOL_ID, "totalRevenueUSD"))
        );

        // rates jump, the year already elapsed was earned at 5% / 3%
        pipeline.chain.set_reserve(USDC, 2_000_000_000_000, 1_000_000_000_000, "3", "10");
        let changes = pipeline.run_block(18_000_300, T0 + YEAR, &[]);

        assert_eq!(
            Some(BigDecimal::from(20_000)),
            decimal(field(&changes, db::PROTOCOL, PROTOCOL_ID, "totalRevenueUSD"))
        );
        assert_eq!(
            Some(BigDecimal::from(2_000)),
            decimal(field(&changes, db::PROTOCOL, PROTOCOL_ID, "cumulativeProtocolSideRevenueUSD"))
        );
        assert_eq!(
            Some(BigDecimal::from(18_000)),
            decimal(field(&changes, db::PROTOCOL, PROTOCOL_ID, "cumulativeSupplySideRevenueUSD"))
        );
        assert_eq!(
            Some((T0 + YEAR).to_string()),
            field(&changes, db::MARKET, USDC, "lastRevenueCalculationTimestamp")
        );
        assert_eq!(
            Some(ray("10").to_string()),
            field(&changes, db::MARKET, USDC, "variableBorrowRate")
        );
    }

    #[test]
    fn test_daily_activity_spans_blocks() {
        let mut chain = MockChain::default();
        chain.set_reserve(USDC, 150_000_000, 0, "0", "0");
        chain.set_user_reserve(USDC, ALICE, 150_000_000, 0);
        let pipeline = Pipeline::new(chain);
        let (daily, day_id) = snapshot::daily_id(&pipeline.config, USDC, T0);
        let active_user = keyer::daily_active_user_id(day_id, ALICE);

        let first = LendingEvent::Supply(flow("0x01", ALICE, 100_000_000, T0 + 60, 18_000_001));
        let changes = pipeline.run_block(18_000_001, T0 + 60, &[first]);
        assert!(has_entity(&changes, db::DAILY_ACTIVE_USER, &active_user));
        assert_eq!(Some("1".to_string()), field(&changes, db::DAILY_SNAPSHOT, &daily, "activeUsers"));
        assert_eq!(Some("1".to_string()), field(&changes, db::DAILY_SNAPSHOT, &daily, "transactionCount"));

        let second = LendingEvent::Supply(flow("0x02", ALICE, 50_000_000, T0 + 120, 18_000_002));
        let changes = pipeline.run_block(18_000_002, T0 + 120, &[second]);
        assert!(!has_entity(&changes, db::DAILY_ACTIVE_USER, &active_user));
        assert_eq!(None, field(&changes, db::DAILY_SNAPSHOT, &daily, "activeUsers"));
        assert_eq!(Some("2".to_string()), field(&changes, db::DAILY_SNAPSHOT, &daily, "transactionCount"));
        assert_eq!(Some("150000000".to_string()), field(&changes, db::DAILY_SNAPSHOT, &daily, "supplyVolume"));
        assert_eq!(
            Some(BigDecimal::from(150)),
            decimal(field(&changes, db::DAILY_SNAPSHOT, &daily, "supplyVolumeUSD"))
        );
        assert_eq!(Some("2".to_string()), field(&changes, db::USER, ALICE, "transactionCount"));
        assert_eq!(
            Some("150000000".to_string()),
            field(&changes, db::USER_POSITION, &keyer::position_id(ALICE, USDC), "totalDeposited")
        );
    }

    #[test]
    fn test_rate_update_refreshes_protocol_totals() {
        let mut chain = MockChain::default();
        chain.set_reserve(USDC, 100_000_000, 0, "1", "2");
        chain.set_user_reserve(USDC, ALICE, 100_000_000, 0);
        let mut pipeline = Pipeline::new(chain);

        let supply = LendingEvent::Supply(flow("0x01", ALICE, 100_000_000, T0, 18_000_001));
        let changes = pipeline.run_block(18_000_001, T0, &[supply]);
        assert_eq!(
            Some(BigDecimal::from(100)),
            decimal(field(&changes, db::PROTOCOL, PROTOCOL_ID, "totalSupplyUSD"))
        );

        pipeline.chain.set_reserve(USDC, 250_000_000, 0, "1", "2");
        let update = LendingEvent::RateUpdate(RateUpdateEvent {
            transaction_hash: "0x02".to_string(),
            log_index: 0,
            timestamp: T0 + 60,
            block_number: 18_000_002,
            asset: USDC.to_string(),
            liquidity_rate: ray("2"),
            stable_borrow_rate: BigInt::from(0),
            variable_borrow_rate: ray("4"),
            liquidity_index: ray("100"),
            variable_borrow_index: ray("100"),
            log_ordinal: 1,
        });
        let changes = pipeline.run_block(18_000_002, T0 + 60, &[update]);

        assert_eq!(
            Some(BigDecimal::from(250)),
            decimal(field(&changes, db::PROTOCOL, PROTOCOL_ID, "totalSupplyUSD"))
        );
        assert_eq!(Some(ray("2").to_string()), field(&changes, db::MARKET, USDC, "liquidityRate"));
        assert_eq!(Some("250000000".to_string()), field(&changes, db::MARKET, USDC, "totalSupply"));
    }

    #[test]
    fn test_replayed_event_is_recorded_once() {
        let mut chain = MockChain::default();
        chain.set_reserve(USDC, 100_000_000, 0, "1", "2");
        chain.set_user_reserve(USDC, ALICE, 100_000_000, 0);
        let pipeline = Pipeline::new(chain);
        let supply = LendingEvent::Supply(flow("0x01", ALICE, 100_000_000, T0, 18_000_001));
        let transaction_id = keyer::transaction_id("0x01", 0);

        let changes = pipeline.run_block(18_000_001, T0, &[supply.clone()]);
        assert!(has_entity(&changes, db::TRANSACTION, &transaction_id));

        let changes = pipeline.run_block(18_000_002, T0 + 12, &[supply]);
        assert!(!has_entity(&changes, db::TRANSACTION, &transaction_id));
        assert_eq!(Some("1".to_string()), field(&changes, db::PROTOCOL, PROTOCOL_ID, "transactionCount"));
        assert_eq!(
            None,
            field(&changes, db::USER_POSITION, &keyer::position_id(ALICE, USDC), "totalDeposited")
        );
    }
}
