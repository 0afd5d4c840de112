use bigdecimal::{BigDecimal, Zero};
use num_bigint::BigInt;
use substreams::key;
use substreams::log;
use substreams::pb::substreams::store_delta::Operation;
use substreams::scalar;
use substreams::store::{DeltaBigDecimal, DeltaBigInt, DeltaExt, DeltaInt64, DeltaProto, Deltas, StoreGet};
use substreams_entity_change::tables::{Row, Tables};

use crate::aggregate;
use crate::config::LedgerConfig;
use crate::event::{self, FlowEvent, TransactionType};
use crate::keyer;
use crate::market::{self, MarketReader, MarketView};
use crate::math;
use crate::pb::lending as pb;
use crate::position;
use crate::revenue;
use crate::snapshot;

pub const PROTOCOL: &str = "Protocol";
pub const MARKET: &str = "Market";
pub const TOKEN: &str = "Token";
pub const USER: &str = "User";
pub const USER_POSITION: &str = "UserPosition";
pub const TRANSACTION: &str = "Transaction";
pub const HOURLY_SNAPSHOT: &str = "MarketHourlySnapshot";
pub const DAILY_SNAPSHOT: &str = "MarketDailySnapshot";
pub const DAILY_ACTIVE_USER: &str = "DailyActiveUser";

/// Store deltas of the block, as `graph_out` receives them.
pub struct LedgerDeltas {
    pub transactions: Deltas<DeltaProto<pb::LendingEvent>>,
    pub first_seen: Deltas<DeltaProto<pb::LendingEvent>>,
    pub counts: Deltas<DeltaInt64>,
    pub snapshot_counts: Deltas<DeltaInt64>,
    pub volumes: Deltas<DeltaBigInt>,
    pub volumes_usd: Deltas<DeltaBigDecimal>,
    pub position_flows: Deltas<DeltaBigInt>,
    pub market_infos: Deltas<DeltaProto<pb::MarketInfo>>,
    pub checkpoints: Deltas<DeltaInt64>,
    pub revenue: Deltas<DeltaBigDecimal>,
    pub token_supplies: Deltas<DeltaBigInt>,
}

/// Every entity change of one block.
#[allow(clippy::too_many_arguments)]
pub fn ledger_entity_changes<M, F, B>(
    tables: &mut Tables,
    config: &LedgerConfig,
    states: &pb::MarketStates,
    balances: &pb::PositionBalances,
    deltas: &LedgerDeltas,
    reader: &M,
    principal_floors: &F,
    position_balances: &B,
) where
    M: MarketReader,
    F: StoreGet<scalar::BigInt>,
    B: StoreGet<pb::PositionBalance>,
{
    let flows = event::applied_flows(&deltas.transactions);

    // rows are created before any update touches them
    protocol_created_entity_change(tables, config, &deltas.counts);
    markets_created_entity_change(tables, &deltas.market_infos);
    users_created_entity_change(tables, &deltas.first_seen);
    transactions_created_entity_change(tables, &flows, reader);
    snapshots_created_entity_change(tables, config, &deltas.snapshot_counts);

    // Protocol:
    counts_entity_change(tables, config, &deltas.counts);
    revenue_protocol_entity_change(tables, config, &deltas.revenue);
    protocol_state_entity_change(tables, config, states, reader);

    // Market & Token:
    market_state_entity_change(tables, config, states, reader);
    checkpoints_market_entity_change(tables, &deltas.checkpoints);
    prices_token_entity_change(tables, states, reader);
    total_supply_token_entity_change(tables, &deltas.token_supplies);

    // User & UserPosition:
    users_entity_change(tables, &flows, states, reader, position_balances);
    position_flows_entity_change(
        tables,
        &deltas.position_flows,
        states.timestamp,
        reader,
        principal_floors,
        position_balances,
    );
    position_balances_entity_change(tables, balances);

    // Snapshots:
    snapshot_counts_entity_change(tables, &deltas.snapshot_counts);
    volumes_snapshot_entity_change(tables, &deltas.volumes);
    volumes_usd_snapshot_entity_change(tables, &deltas.volumes_usd);
    snapshot_state_entity_change(tables, config, states, reader);
}

fn bigint(value: &BigInt) -> scalar::BigInt {
    math::to_scalar_bigint(value)
}

fn bigdecimal(value: &BigDecimal) -> scalar::BigDecimal {
    math::to_scalar_decimal(value)
}

// -------------------
//  Protocol
// -------------------
pub fn protocol_created_entity_change(tables: &mut Tables, config: &LedgerConfig, counts_deltas: &Deltas<DeltaInt64>) {
    let transaction_count = keyer::protocol_key(keyer::TRANSACTION_COUNT);
    for _ in counts_deltas
        .iter()
        .operation_eq(Operation::Create)
        .filter(|delta| delta.key == transaction_count)
    {
        let bigdecimal0 = scalar::BigDecimal::zero();
        tables
            .create_row(PROTOCOL, &config.protocol_id)
            .set("totalSupplyUSD", &bigdecimal0)
            .set("totalBorrowUSD", &bigdecimal0)
            .set("totalRevenueUSD", &bigdecimal0)
            .set("cumulativeSupplySideRevenueUSD", &bigdecimal0)
            .set("cumulativeProtocolSideRevenueUSD", &bigdecimal0)
            .set("projectedDailyRevenueUSD", &bigdecimal0)
            .set("marketCount", 0i32)
            .set("userCount", 0i64)
            .set("transactionCount", 0i64)
            .set("lastUpdateTimestamp", 0i64);
    }
}

pub fn counts_entity_change(tables: &mut Tables, config: &LedgerConfig, counts_deltas: &Deltas<DeltaInt64>) {
    for delta in counts_deltas.iter() {
        match key::first_segment(&delta.key) {
            keyer::PROTOCOL => {
                let field = key::last_segment(&delta.key);
                let row = tables.update_row(PROTOCOL, &config.protocol_id);
                if field == keyer::MARKET_COUNT {
                    row.set(field, delta.new_value as i32);
                } else {
                    row.set(field, delta.new_value);
                }
            }
            keyer::USER => {
                tables
                    .update_row(USER, key::segment_at(&delta.key, 1))
                    .set("transactionCount", delta.new_value);
            }
            _ => {}
        }
    }
}

pub fn revenue_protocol_entity_change(tables: &mut Tables, config: &LedgerConfig, revenue_deltas: &Deltas<DeltaBigDecimal>) {
    for delta in revenue_deltas.iter().key_first_segment_eq(keyer::PROTOCOL) {
        tables
            .update_row(PROTOCOL, &config.protocol_id)
            .set(key::last_segment(&delta.key), &delta.new_value);
    }
}

/// USD totals follow every market read, the projection only a tick.
pub fn protocol_state_entity_change<M: MarketReader>(
    tables: &mut Tables,
    config: &LedgerConfig,
    states: &pb::MarketStates,
    reader: &M,
) {
    if states.states.is_empty() {
        return;
    }
    tables
        .update_row(PROTOCOL, &config.protocol_id)
        .set("lastUpdateTimestamp", states.timestamp);
    if !states.markets_discovered {
        log::debug!("markets unknown at block {}, protocol totals left as is", states.block_number);
        return;
    }

    let (total_supply_usd, total_borrow_usd) = aggregate::protocol_totals(&states.markets, reader);
    tables
        .update_row(PROTOCOL, &config.protocol_id)
        .set("totalSupplyUSD", bigdecimal(&total_supply_usd))
        .set("totalBorrowUSD", bigdecimal(&total_borrow_usd));

    if states.tick {
        let projected = revenue::summarize(config, &states.markets, reader);
        tables
            .update_row(PROTOCOL, &config.protocol_id)
            .set("projectedDailyRevenueUSD", bigdecimal(&projected.total));
    }
}

// -------------------
//  Market & Token
// -------------------
pub fn markets_created_entity_change(tables: &mut Tables, market_infos_deltas: &Deltas<DeltaProto<pb::MarketInfo>>) {
    for delta in market_infos_deltas.iter().operation_eq(Operation::Create) {
        let info = &delta.new_value;
        log::info!("market {} ({}) discovered", info.asset, info.symbol);

        let bigint0 = scalar::BigInt::zero();
        let bigdecimal0 = scalar::BigDecimal::zero();
        tables
            .create_row(MARKET, &info.asset)
            .set("name", &info.symbol)
            .set("inputToken", &info.asset)
            .set("outputToken", &info.output_token)
            .set("totalSupply", &bigint0)
            .set("totalBorrow", &bigint0)
            .set("totalStableDebt", &bigint0)
            .set("totalVariableDebt", &bigint0)
            .set("availableLiquidity", &bigint0)
            .set("liquidityRate", &bigint0)
            .set("variableBorrowRate", &bigint0)
            .set("stableBorrowRate", &bigint0)
            .set("supplyAPY", &bigdecimal0)
            .set("borrowAPY", &bigdecimal0)
            .set("utilizationRate", &bigdecimal0)
            .set("ltv", 0i64)
            .set("liquidationThreshold", 0i64)
            .set("liquidationPenalty", 0i64)
            .set("reserveFactor", 0i64)
            .set("isActive", false)
            .set("isFrozen", false)
            .set("createdTimestamp", info.created_timestamp)
            .set("createdBlockNumber", info.created_block_number)
            .set("lastUpdateTimestamp", info.created_timestamp)
            .set("lastUpdateBlockNumber", info.created_block_number)
            .set("lastRevenueCalculationTimestamp", 0i64);

        tables
            .create_row(TOKEN, &info.asset)
            .set("symbol", &info.symbol)
            .set("name", &info.name)
            .set("decimals", info.decimals)
            .set("totalSupply", &bigint0)
            .set("lastPriceUSD", &bigdecimal0)
            .set("lastPriceTimestamp", 0i64);
    }
}

/// State columns shared by the market and its snapshots, parts never read are left alone.
fn set_state_columns(row: &mut Row, config: &LedgerConfig, view: &MarketView) {
    if let Some(totals) = &view.totals {
        row.set("totalSupply", bigint(&math::parse_bigint(&totals.total_supply)))
            .set("totalBorrow", bigint(&market::total_borrow(totals)))
            .set("utilizationRate", bigdecimal(&market::utilization_rate(totals)));
    }
    if let Some(rates) = &view.rates {
        let (supply_apy, borrow_apy) = market::apys(config, rates);
        row.set("liquidityRate", bigint(&math::parse_bigint(&rates.liquidity_rate)))
            .set("variableBorrowRate", bigint(&math::parse_bigint(&rates.variable_borrow_rate)))
            .set("stableBorrowRate", bigint(&math::parse_bigint(&rates.stable_borrow_rate)))
            .set("supplyAPY", bigdecimal(&supply_apy))
            .set("borrowAPY", bigdecimal(&borrow_apy));
    }
}

pub fn market_state_entity_change<M: MarketReader>(
    tables: &mut Tables,
    config: &LedgerConfig,
    states: &pb::MarketStates,
    reader: &M,
) {
    for state in states.states.iter() {
        let view = reader.last(&state.asset);
        if view.info.is_none() {
            continue;
        }

        let row = tables.update_row(MARKET, &state.asset);
        set_state_columns(row, config, &view);
        if let Some(totals) = &view.totals {
            row.set("totalStableDebt", bigint(&math::parse_bigint(&totals.total_stable_debt)))
                .set("totalVariableDebt", bigint(&math::parse_bigint(&totals.total_variable_debt)))
                .set("availableLiquidity", bigint(&market::available_liquidity(totals)));
        }
        if let Some(reserve_config) = &view.config {
            row.set("ltv", reserve_config.ltv)
                .set("liquidationThreshold", reserve_config.liquidation_threshold)
                .set("liquidationPenalty", reserve_config.liquidation_penalty)
                .set("reserveFactor", reserve_config.reserve_factor)
                .set("isActive", reserve_config.is_active)
                .set("isFrozen", reserve_config.is_frozen);
        }
        row.set("lastUpdateTimestamp", state.timestamp)
            .set("lastUpdateBlockNumber", state.block_number);
    }
}

pub fn checkpoints_market_entity_change(tables: &mut Tables, checkpoints_deltas: &Deltas<DeltaInt64>) {
    for delta in checkpoints_deltas.iter() {
        tables
            .update_row(MARKET, key::last_segment(&delta.key))
            .set("lastRevenueCalculationTimestamp", delta.new_value);
    }
}

/// Prices of known tokens. A market never read has no token yet.
pub fn prices_token_entity_change<M: MarketReader>(tables: &mut Tables, states: &pb::MarketStates, reader: &M) {
    let state_prices = states.states.iter().filter_map(|state| state.price.as_ref());
    for price in state_prices.chain(states.prices.iter()) {
        if reader.last(&price.asset).info.is_none() {
            continue;
        }
        tables
            .update_row(TOKEN, &price.asset)
            .set("lastPriceUSD", bigdecimal(&math::parse_bigdecimal(&price.price_usd)))
            .set("lastPriceTimestamp", price.timestamp);
    }
}

pub fn total_supply_token_entity_change(tables: &mut Tables, token_supplies_deltas: &Deltas<DeltaBigInt>) {
    for delta in token_supplies_deltas.iter() {
        tables
            .update_row(TOKEN, key::last_segment(&delta.key))
            .set("totalSupply", &delta.new_value);
    }
}

// -------------------
//  User, UserPosition & Transaction
// -------------------
pub fn users_created_entity_change(tables: &mut Tables, first_seen_deltas: &Deltas<DeltaProto<pb::LendingEvent>>) {
    let bigint0 = scalar::BigInt::zero();
    let bigdecimal0 = scalar::BigDecimal::zero();
    for delta in first_seen_deltas.iter().operation_eq(Operation::Create) {
        let transaction = &delta.new_value;
        let timestamp = transaction.timestamp as i64;
        match key::first_segment(&delta.key) {
            keyer::USER => {
                tables
                    .create_row(USER, &transaction.user)
                    .set("totalSupplyUSD", &bigdecimal0)
                    .set("totalBorrowUSD", &bigdecimal0)
                    .set("transactionCount", 0i64)
                    .set("firstSeenTimestamp", timestamp)
                    .set("lastActiveTimestamp", timestamp);
            }
            keyer::POSITION => {
                tables
                    .create_row(USER_POSITION, key::segment_at(&delta.key, 1))
                    .set("user", &transaction.user)
                    .set("market", &transaction.asset)
                    .set("supplied", &bigint0)
                    .set("variableDebt", &bigint0)
                    .set("stableDebt", &bigint0)
                    .set("isCollateral", false)
                    .set("principal", &bigint0)
                    .set("totalDeposited", &bigint0)
                    .set("totalWithdrawn", &bigint0)
                    .set("totalBorrowed", &bigint0)
                    .set("totalRepaid", &bigint0)
                    .set("realizedPnL", &bigdecimal0)
                    .set("unrealizedPnL", &bigdecimal0)
                    .set("lastUpdateTimestamp", timestamp);
            }
            keyer::ACTIVE => {
                let day_id = match key::segment_at(&delta.key, 1).parse::<i64>() {
                    Ok(day_id) => day_id,
                    Err(e) => {
                        log::info!("WARN invalid active user key {}: {}", delta.key, e);
                        continue;
                    }
                };
                tables
                    .create_row(DAILY_ACTIVE_USER, keyer::daily_active_user_id(day_id, &transaction.user))
                    .set("user", &transaction.user)
                    .set("market", &transaction.asset)
                    .set("dayId", day_id)
                    .set("timestamp", timestamp);
            }
            _ => {}
        }
    }
}

pub fn transactions_created_entity_change<M: MarketReader>(
    tables: &mut Tables,
    flows: &[(TransactionType, FlowEvent)],
    reader: &M,
) {
    for (transaction_type, flow) in flows.iter() {
        let id = keyer::transaction_id(&flow.transaction_hash, flow.log_index);
        let amount_usd = reader
            .last(&flow.asset)
            .value_usd(&flow.amount)
            .unwrap_or_else(BigDecimal::zero);
        log::info!(
            "{} of {} on {} by {} in trx {}",
            transaction_type,
            flow.amount,
            flow.asset,
            flow.user,
            id
        );

        tables
            .create_row(TRANSACTION, &id)
            .set("hash", &flow.transaction_hash)
            .set("logIndex", flow.log_index)
            .set("type", transaction_type.as_str())
            .set("market", &flow.asset)
            .set("user", &flow.user)
            .set("caller", &flow.caller)
            .set("amount", bigint(&flow.amount))
            .set("amountUSD", bigdecimal(&amount_usd))
            .set("timestamp", flow.timestamp)
            .set("blockNumber", flow.block_number);
    }
}

/// Activity of every user behind a flow, with their USD totals recomputed
/// over all markets once the markets are known.
pub fn users_entity_change<M, B>(
    tables: &mut Tables,
    flows: &[(TransactionType, FlowEvent)],
    states: &pb::MarketStates,
    reader: &M,
    position_balances: &B,
) where
    M: MarketReader,
    B: StoreGet<pb::PositionBalance>,
{
    let mut users: Vec<(&str, i64)> = vec![];
    for (_, flow) in flows.iter() {
        match users.iter_mut().find(|(user, _)| *user == flow.user.as_str()) {
            Some(user) => user.1 = flow.timestamp,
            None => users.push((flow.user.as_str(), flow.timestamp)),
        }
    }

    for (user, timestamp) in users {
        tables.update_row(USER, user).set("lastActiveTimestamp", timestamp);
        if !states.markets_discovered {
            continue;
        }
        let (total_supply_usd, total_borrow_usd) =
            aggregate::user_totals(user, &states.markets, reader, position_balances);
        tables
            .update_row(USER, user)
            .set("totalSupplyUSD", bigdecimal(&total_supply_usd))
            .set("totalBorrowUSD", bigdecimal(&total_borrow_usd));
    }
}

/// Cash flow counters of each position. A move of the net deposit also
/// settles the principal and both PnL figures.
pub fn position_flows_entity_change<M, F, B>(
    tables: &mut Tables,
    position_flows_deltas: &Deltas<DeltaBigInt>,
    timestamp: i64,
    reader: &M,
    principal_floors: &F,
    position_balances: &B,
) where
    M: MarketReader,
    F: StoreGet<scalar::BigInt>,
    B: StoreGet<pb::PositionBalance>,
{
    for delta in position_flows_deltas.iter().key_first_segment_eq(keyer::POSITION) {
        let position_id = key::segment_at(&delta.key, 1);
        let field = key::last_segment(&delta.key);
        if field != keyer::NET_FLOW {
            tables
                .update_row(USER_POSITION, position_id)
                .set(field, &delta.new_value)
                .set("lastUpdateTimestamp", timestamp);
            continue;
        }

        let net: BigInt = delta.new_value.clone().into();
        let floor: BigInt = principal_floors
            .get_last(keyer::position_key(position_id))
            .map(Into::into)
            .unwrap_or_else(BigInt::zero);
        let principal = position::principal(&net, &floor);
        let row = tables.update_row(USER_POSITION, position_id);
        row.set("principal", bigint(&principal));

        let decimals = keyer::parse_position_id(position_id)
            .and_then(|(_, market)| reader.last(market).info)
            .map(|info| info.decimals);
        let decimals = match decimals {
            Some(decimals) => decimals,
            None => {
                log::debug!("unknown market of position {}, PnL left as is", position_id);
                continue;
            }
        };
        row.set("realizedPnL", bigdecimal(&position::realized_pnl(&floor, decimals)));
        if let Some(balance) = position_balances.get_last(keyer::position_key(position_id)) {
            let supplied = math::parse_bigint(&balance.supplied);
            row.set(
                "unrealizedPnL",
                bigdecimal(&position::unrealized_pnl(&supplied, &principal, decimals)),
            );
        }
    }
}

/// Authoritative balances, overwritten on every successful read.
pub fn position_balances_entity_change(tables: &mut Tables, balances: &pb::PositionBalances) {
    for balance in balances.balances.iter() {
        tables
            .update_row(USER_POSITION, keyer::position_id(&balance.user, &balance.market))
            .set("supplied", bigint(&math::parse_bigint(&balance.supplied)))
            .set("variableDebt", bigint(&math::parse_bigint(&balance.variable_debt)))
            .set("stableDebt", bigint(&math::parse_bigint(&balance.stable_debt)))
            .set("isCollateral", balance.is_collateral)
            .set("lastUpdateTimestamp", balance.timestamp);
    }
}

// -------------------
//  Snapshots
// -------------------
fn snapshot_table(prefix: &str) -> Option<&'static str> {
    match prefix {
        keyer::HOURLY => Some(HOURLY_SNAPSHOT),
        keyer::DAILY => Some(DAILY_SNAPSHOT),
        _ => None,
    }
}

fn set_zero_volumes(row: &mut Row) {
    let bigint0 = scalar::BigInt::zero();
    for transaction_type in [
        TransactionType::Supply,
        TransactionType::Withdraw,
        TransactionType::Borrow,
        TransactionType::Repay,
    ] {
        row.set(transaction_type.volume_field(), &bigint0);
    }
}

fn set_zero_state(row: &mut Row) {
    let bigint0 = scalar::BigInt::zero();
    let bigdecimal0 = scalar::BigDecimal::zero();
    row.set("totalSupply", &bigint0)
        .set("totalBorrow", &bigint0)
        .set("liquidityRate", &bigint0)
        .set("variableBorrowRate", &bigint0)
        .set("stableBorrowRate", &bigint0)
        .set("supplyAPY", &bigdecimal0)
        .set("borrowAPY", &bigdecimal0)
        .set("utilizationRate", &bigdecimal0);
}

/// Opens a bucket on the first write to its transaction counter.
pub fn snapshots_created_entity_change(tables: &mut Tables, config: &LedgerConfig, snapshot_counts_deltas: &Deltas<DeltaInt64>) {
    for delta in snapshot_counts_deltas
        .iter()
        .operation_eq(Operation::Create)
        .key_last_segment_eq(keyer::TRANSACTION_COUNT)
    {
        let (market, bucket_id) = match snapshot::parse_counter_key(&delta.key) {
            Some(parsed) => parsed,
            None => {
                log::info!("WARN invalid snapshot counter {}", delta.key);
                continue;
            }
        };
        let snapshot_id = key::segment_at(&delta.key, 1);

        match key::first_segment(&delta.key) {
            keyer::HOURLY => {
                log::debug!("opening hourly snapshot {}", snapshot_id);
                let row = tables
                    .create_row(HOURLY_SNAPSHOT, snapshot_id)
                    .set("market", &market)
                    .set("hourId", bucket_id)
                    .set("periodStartUnix", bucket_id * config.seconds_per_hour)
                    .set("transactionCount", 0i64)
                    .set("lastUpdateTimestamp", 0i64);
                set_zero_volumes(row);
                set_zero_state(row);
            }
            keyer::DAILY => {
                log::debug!("opening daily snapshot {}", snapshot_id);
                let bigdecimal0 = scalar::BigDecimal::zero();
                let row = tables
                    .create_row(DAILY_SNAPSHOT, snapshot_id)
                    .set("market", &market)
                    .set("dayId", bucket_id)
                    .set("date", bucket_id * config.seconds_per_day)
                    .set("transactionCount", 0i64)
                    .set("activeUsers", 0i32)
                    .set("supplyVolumeUSD", &bigdecimal0)
                    .set("withdrawVolumeUSD", &bigdecimal0)
                    .set("borrowVolumeUSD", &bigdecimal0)
                    .set("repayVolumeUSD", &bigdecimal0)
                    .set("projectedDailyRevenueUSD", &bigdecimal0)
                    .set("projectedProtocolSideRevenueUSD", &bigdecimal0)
                    .set("projectedSupplySideRevenueUSD", &bigdecimal0)
                    .set("lastUpdateTimestamp", 0i64);
                set_zero_volumes(row);
                set_zero_state(row);
            }
            _ => {}
        }
    }
}

pub fn snapshot_counts_entity_change(tables: &mut Tables, snapshot_counts_deltas: &Deltas<DeltaInt64>) {
    for delta in snapshot_counts_deltas.iter() {
        let table = match snapshot_table(key::first_segment(&delta.key)) {
            Some(table) => table,
            None => continue,
        };
        let field = key::last_segment(&delta.key);
        let row = tables.update_row(table, key::segment_at(&delta.key, 1));
        if field == keyer::ACTIVE_USERS {
            row.set(field, delta.new_value as i32);
        } else {
            row.set(field, delta.new_value);
        }
    }
}

pub fn volumes_snapshot_entity_change(tables: &mut Tables, volumes_deltas: &Deltas<DeltaBigInt>) {
    for delta in volumes_deltas.iter() {
        if let Some(table) = snapshot_table(key::first_segment(&delta.key)) {
            tables
                .update_row(table, key::segment_at(&delta.key, 1))
                .set(key::last_segment(&delta.key), &delta.new_value);
        }
    }
}

pub fn volumes_usd_snapshot_entity_change(tables: &mut Tables, volumes_usd_deltas: &Deltas<DeltaBigDecimal>) {
    for delta in volumes_usd_deltas.iter().key_first_segment_eq(keyer::DAILY) {
        tables
            .update_row(DAILY_SNAPSHOT, key::segment_at(&delta.key, 1))
            .set(key::last_segment(&delta.key), &delta.new_value);
    }
}

/// Copies each read market into its current buckets; the daily one also
/// carries the one day revenue projection.
pub fn snapshot_state_entity_change<M: MarketReader>(
    tables: &mut Tables,
    config: &LedgerConfig,
    states: &pb::MarketStates,
    reader: &M,
) {
    for state in states.states.iter() {
        let view = reader.last(&state.asset);
        let (hourly, _) = snapshot::hourly_id(config, &state.asset, state.timestamp);
        let (daily, _) = snapshot::daily_id(config, &state.asset, state.timestamp);

        let row = tables.update_row(HOURLY_SNAPSHOT, &hourly);
        set_state_columns(row, config, &view);
        row.set("lastUpdateTimestamp", state.timestamp);

        let projected = revenue::projected_daily_revenue(config, &view);
        let row = tables.update_row(DAILY_SNAPSHOT, &daily);
        set_state_columns(row, config, &view);
        row.set("projectedDailyRevenueUSD", bigdecimal(&projected.total))
            .set("projectedProtocolSideRevenueUSD", bigdecimal(&projected.protocol_side))
            .set("projectedSupplySideRevenueUSD", bigdecimal(&projected.supply_side))
            .set("lastUpdateTimestamp", state.timestamp);
    }
}
