use ethabi::ParamType;
use num_bigint::BigInt;
use std::fmt;
use std::str::FromStr;
use substreams::log;
use substreams::pb::substreams::store_delta::Operation;
use substreams::store::{DeltaExt, DeltaProto, Deltas, StoreSetIfNotExists};
use substreams_ethereum::pb::eth::v2::Log;

use crate::error::QueryError;
use crate::eth;
use crate::keyer;
use crate::pb::lending as pb;
use crate::utils;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransactionType {
    Supply,
    Withdraw,
    Borrow,
    Repay,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Supply => "SUPPLY",
            TransactionType::Withdraw => "WITHDRAW",
            TransactionType::Borrow => "BORROW",
            TransactionType::Repay => "REPAY",
        }
    }

    /// Snapshot column holding the raw volume of this type.
    pub fn volume_field(&self) -> &'static str {
        match self {
            TransactionType::Supply => "supplyVolume",
            TransactionType::Withdraw => "withdrawVolume",
            TransactionType::Borrow => "borrowVolume",
            TransactionType::Repay => "repayVolume",
        }
    }

    pub fn volume_usd_field(&self) -> &'static str {
        match self {
            TransactionType::Supply => "supplyVolumeUSD",
            TransactionType::Withdraw => "withdrawVolumeUSD",
            TransactionType::Borrow => "borrowVolumeUSD",
            TransactionType::Repay => "repayVolumeUSD",
        }
    }

    /// Position column accumulating the amounts of this type.
    pub fn position_field(&self) -> &'static str {
        match self {
            TransactionType::Supply => "totalDeposited",
            TransactionType::Withdraw => "totalWithdrawn",
            TransactionType::Borrow => "totalBorrowed",
            TransactionType::Repay => "totalRepaid",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supply, withdraw, borrow or repay of `amount` of `asset` on behalf of `user`.
#[derive(Clone, Debug, PartialEq)]
pub struct FlowEvent {
    pub transaction_hash: String,
    pub log_index: u64,
    pub timestamp: i64,
    pub block_number: u64,
    pub asset: String,
    /// Owner of the position.
    pub user: String,
    /// Account which sent the transaction, may differ from `user`.
    pub caller: String,
    pub amount: BigInt,
    pub log_ordinal: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RateUpdateEvent {
    pub transaction_hash: String,
    pub log_index: u64,
    pub timestamp: i64,
    pub block_number: u64,
    pub asset: String,
    pub liquidity_rate: BigInt,
    pub stable_borrow_rate: BigInt,
    pub variable_borrow_rate: BigInt,
    pub liquidity_index: BigInt,
    pub variable_borrow_index: BigInt,
    pub log_ordinal: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum LendingEvent {
    Supply(FlowEvent),
    Withdraw(FlowEvent),
    Borrow(FlowEvent),
    Repay(FlowEvent),
    RateUpdate(RateUpdateEvent),
}

impl LendingEvent {
    pub fn asset(&self) -> &str {
        match self {
            LendingEvent::Supply(e) | LendingEvent::Withdraw(e) | LendingEvent::Borrow(e) | LendingEvent::Repay(e) => {
                &e.asset
            }
            LendingEvent::RateUpdate(e) => &e.asset,
        }
    }

    pub fn transaction_type(&self) -> Option<TransactionType> {
        match self {
            LendingEvent::Supply(_) => Some(TransactionType::Supply),
            LendingEvent::Withdraw(_) => Some(TransactionType::Withdraw),
            LendingEvent::Borrow(_) => Some(TransactionType::Borrow),
            LendingEvent::Repay(_) => Some(TransactionType::Repay),
            LendingEvent::RateUpdate(_) => None,
        }
    }

    pub fn log_ordinal(&self) -> u64 {
        match self {
            LendingEvent::Supply(e) | LendingEvent::Withdraw(e) | LendingEvent::Borrow(e) | LendingEvent::Repay(e) => {
                e.log_ordinal
            }
            LendingEvent::RateUpdate(e) => e.log_ordinal,
        }
    }

    pub fn flow(&self) -> Option<&FlowEvent> {
        match self {
            LendingEvent::Supply(e) | LendingEvent::Withdraw(e) | LendingEvent::Borrow(e) | LendingEvent::Repay(e) => {
                Some(e)
            }
            LendingEvent::RateUpdate(_) => None,
        }
    }
}

/// Decodes the block's events, reporting and skipping the ones which do not convert.
pub fn decode_events(events: &[pb::LendingEvent]) -> Vec<LendingEvent> {
    events
        .iter()
        .filter_map(|event| match LendingEvent::try_from(event) {
            Ok(event) => Some(event),
            Err(e) => {
                log::info!("WARN skipping event {}-{}: {}", event.transaction_hash, event.log_index, e);
                None
            }
        })
        .collect()
}

/// Flow events applied for the first time in this block, in ordinal order.
///
/// A transaction id only ever produces one `Create` delta, so replays of an
/// already applied log are dropped here.
pub fn applied_flows(transactions: &Deltas<DeltaProto<pb::LendingEvent>>) -> Vec<(TransactionType, FlowEvent)> {
    transactions
        .iter()
        .operation_eq(Operation::Create)
        .filter_map(|delta| match LendingEvent::try_from(&delta.new_value) {
            Ok(event) => {
                let transaction_type = event.transaction_type()?;
                event.flow().map(|flow| (transaction_type, flow.clone()))
            }
            Err(e) => {
                log::info!("WARN skipping transaction {}: {}", delta.key, e);
                None
            }
        })
        .collect()
}

/// Keeps every flow event under its transaction id, the first write wins.
pub fn store_transactions<S: StoreSetIfNotExists<pb::LendingEvent>>(events: &pb::Events, store: &S) {
    for event in events.events.iter() {
        if !is_flow(event) {
            continue;
        }
        let transaction_id = keyer::transaction_id(&event.transaction_hash, event.log_index);
        store.set_if_not_exists(event.log_ordinal, keyer::transaction_key(&transaction_id), event);
    }
}

fn is_flow(event: &pb::LendingEvent) -> bool {
    matches!(
        pb::EventType::from_i32(event.event_type),
        Some(pb::EventType::Supply | pb::EventType::Withdraw | pb::EventType::Borrow | pb::EventType::Repay)
    )
}

// ------------------------------------------------
//      log decoding
// ------------------------------------------------

struct LogContext<'a> {
    transaction_hash: &'a str,
    log_index: u64,
    log_ordinal: u64,
    timestamp: i64,
    block_number: u64,
}

impl LogContext<'_> {
    fn flow(&self, asset: String, user: String, caller: String, amount: BigInt) -> FlowEvent {
        FlowEvent {
            transaction_hash: self.transaction_hash.to_string(),
            log_index: self.log_index,
            timestamp: self.timestamp,
            block_number: self.block_number,
            asset,
            user,
            caller,
            amount,
            log_ordinal: self.log_ordinal,
        }
    }
}

fn topic_address(log: &Log, index: usize, what: &'static str) -> Result<String, QueryError> {
    log.topics
        .get(index)
        .and_then(|topic| eth::address_from_topic(topic))
        .ok_or_else(|| QueryError::decode(what, "missing indexed address"))
}

fn decode_data(log: &Log, types: &[ParamType], what: &'static str) -> Result<Vec<ethabi::Token>, QueryError> {
    ethabi::decode(types, &log.data).map_err(|e| QueryError::decode(what, e))
}

/// Decodes a pool log into a [`LendingEvent`].
///
/// Returns `None` for logs which are not lending events. Malformed lending
/// logs are reported and skipped.
pub fn decode_log(log: &Log, transaction_hash: &str, timestamp: i64, block_number: u64) -> Option<LendingEvent> {
    let signature = log.topics.first()?;
    let context = LogContext {
        transaction_hash,
        log_index: log.block_index as u64,
        log_ordinal: log.ordinal,
        timestamp,
        block_number,
    };

    let decoded = if signature.as_slice() == utils::SUPPLY_TOPIC {
        decode_supply(log, &context)
    } else if signature.as_slice() == utils::WITHDRAW_TOPIC {
        decode_withdraw(log, &context)
    } else if signature.as_slice() == utils::BORROW_TOPIC {
        decode_borrow(log, &context)
    } else if signature.as_slice() == utils::REPAY_TOPIC {
        decode_repay(log, &context)
    } else if signature.as_slice() == utils::RESERVE_DATA_UPDATED_TOPIC {
        decode_reserve_data_updated(log, &context)
    } else {
        return None;
    };

    match decoded {
        Ok(event) => Some(event),
        Err(e) => {
            log::debug!("skipping malformed log {} of trx {}: {}", context.log_index, transaction_hash, e);
            None
        }
    }
}

// Supply(address indexed reserve, address user, address indexed onBehalfOf, uint256 amount, uint16 indexed referralCode)
fn decode_supply(log: &Log, context: &LogContext) -> Result<LendingEvent, QueryError> {
    let asset = topic_address(log, 1, "Supply.reserve")?;
    let on_behalf_of = topic_address(log, 2, "Supply.onBehalfOf")?;
    let mut data = decode_data(log, &[ParamType::Address, ParamType::Uint(256)], "Supply")?.into_iter();
    let caller = eth::token_to_address(next(&mut data, "Supply.user")?, "Supply.user")?;
    let amount = eth::token_to_bigint(next(&mut data, "Supply.amount")?, "Supply.amount")?;

    Ok(LendingEvent::Supply(context.flow(asset, on_behalf_of, caller, amount)))
}

// Withdraw(address indexed reserve, address indexed user, address indexed to, uint256 amount)
fn decode_withdraw(log: &Log, context: &LogContext) -> Result<LendingEvent, QueryError> {
    let asset = topic_address(log, 1, "Withdraw.reserve")?;
    let user = topic_address(log, 2, "Withdraw.user")?;
    let mut data = decode_data(log, &[ParamType::Uint(256)], "Withdraw")?.into_iter();
    let amount = eth::token_to_bigint(next(&mut data, "Withdraw.amount")?, "Withdraw.amount")?;

    Ok(LendingEvent::Withdraw(context.flow(asset, user.clone(), user, amount)))
}

// Borrow(address indexed reserve, address user, address indexed onBehalfOf, uint256 amount,
//        uint8 interestRateMode, uint256 borrowRate, uint16 indexed referralCode)
fn decode_borrow(log: &Log, context: &LogContext) -> Result<LendingEvent, QueryError> {
    let asset = topic_address(log, 1, "Borrow.reserve")?;
    let on_behalf_of = topic_address(log, 2, "Borrow.onBehalfOf")?;
    let types = [
        ParamType::Address,
        ParamType::Uint(256),
        ParamType::Uint(8),
        ParamType::Uint(256),
    ];
    let mut data = decode_data(log, &types, "Borrow")?.into_iter();
    let caller = eth::token_to_address(next(&mut data, "Borrow.user")?, "Borrow.user")?;
    let amount = eth::token_to_bigint(next(&mut data, "Borrow.amount")?, "Borrow.amount")?;

    Ok(LendingEvent::Borrow(context.flow(asset, on_behalf_of, caller, amount)))
}

// Repay(address indexed reserve, address indexed user, address indexed repayer, uint256 amount, bool useATokens)
fn decode_repay(log: &Log, context: &LogContext) -> Result<LendingEvent, QueryError> {
    let asset = topic_address(log, 1, "Repay.reserve")?;
    let user = topic_address(log, 2, "Repay.user")?;
    let repayer = topic_address(log, 3, "Repay.repayer")?;
    let mut data = decode_data(log, &[ParamType::Uint(256), ParamType::Bool], "Repay")?.into_iter();
    let amount = eth::token_to_bigint(next(&mut data, "Repay.amount")?, "Repay.amount")?;

    Ok(LendingEvent::Repay(context.flow(asset, user, repayer, amount)))
}

// ReserveDataUpdated(address indexed reserve, uint256 liquidityRate, uint256 stableBorrowRate,
//                    uint256 variableBorrowRate, uint256 liquidityIndex, uint256 variableBorrowIndex)
fn decode_reserve_data_updated(log: &Log, context: &LogContext) -> Result<LendingEvent, QueryError> {
    let asset = topic_address(log, 1, "ReserveDataUpdated.reserve")?;
    let values = decode_data(log, &vec![ParamType::Uint(256); 5], "ReserveDataUpdated")?
        .into_iter()
        .map(|token| eth::token_to_bigint(token, "ReserveDataUpdated"))
        .collect::<Result<Vec<BigInt>, QueryError>>()?;
    let [liquidity_rate, stable_borrow_rate, variable_borrow_rate, liquidity_index, variable_borrow_index]: [BigInt; 5] =
        values
            .try_into()
            .map_err(|_| QueryError::decode("ReserveDataUpdated", "expected 5 values"))?;

    Ok(LendingEvent::RateUpdate(RateUpdateEvent {
        transaction_hash: context.transaction_hash.to_string(),
        log_index: context.log_index,
        timestamp: context.timestamp,
        block_number: context.block_number,
        asset,
        liquidity_rate,
        stable_borrow_rate,
        variable_borrow_rate,
        liquidity_index,
        variable_borrow_index,
        log_ordinal: context.log_ordinal,
    }))
}

fn next<I: Iterator<Item = ethabi::Token>>(data: &mut I, what: &'static str) -> Result<ethabi::Token, QueryError> {
    data.next().ok_or_else(|| QueryError::decode(what, "missing value"))
}

// ------------------------------------------------
//      protobuf conversion
// ------------------------------------------------

impl From<&LendingEvent> for pb::LendingEvent {
    fn from(event: &LendingEvent) -> Self {
        let event_type = match event {
            LendingEvent::Supply(_) => pb::EventType::Supply,
            LendingEvent::Withdraw(_) => pb::EventType::Withdraw,
            LendingEvent::Borrow(_) => pb::EventType::Borrow,
            LendingEvent::Repay(_) => pb::EventType::Repay,
            LendingEvent::RateUpdate(_) => pb::EventType::ReserveDataUpdated,
        };

        match event {
            LendingEvent::Supply(e) | LendingEvent::Withdraw(e) | LendingEvent::Borrow(e) | LendingEvent::Repay(e) => {
                pb::LendingEvent {
                    event_type: event_type as i32,
                    transaction_hash: e.transaction_hash.clone(),
                    log_index: e.log_index,
                    timestamp: e.timestamp as u64,
                    block_number: e.block_number,
                    asset: e.asset.clone(),
                    user: e.user.clone(),
                    caller: e.caller.clone(),
                    amount: e.amount.to_string(),
                    log_ordinal: e.log_ordinal,
                    ..Default::default()
                }
            }
            LendingEvent::RateUpdate(e) => pb::LendingEvent {
                event_type: event_type as i32,
                transaction_hash: e.transaction_hash.clone(),
                log_index: e.log_index,
                timestamp: e.timestamp as u64,
                block_number: e.block_number,
                asset: e.asset.clone(),
                liquidity_rate: e.liquidity_rate.to_string(),
                stable_borrow_rate: e.stable_borrow_rate.to_string(),
                variable_borrow_rate: e.variable_borrow_rate.to_string(),
                liquidity_index: e.liquidity_index.to_string(),
                variable_borrow_index: e.variable_borrow_index.to_string(),
                log_ordinal: e.log_ordinal,
                ..Default::default()
            },
        }
    }
}

fn parse_integer(value: &str, field: &'static str) -> Result<BigInt, QueryError> {
    BigInt::from_str(value).map_err(|e| QueryError::decode(field, e))
}

impl TryFrom<&pb::LendingEvent> for LendingEvent {
    type Error = QueryError;

    fn try_from(event: &pb::LendingEvent) -> Result<Self, Self::Error> {
        let event_type = pb::EventType::from_i32(event.event_type)
            .ok_or_else(|| QueryError::decode("event_type", format!("unknown value {}", event.event_type)))?;

        if event_type == pb::EventType::ReserveDataUpdated {
            return Ok(LendingEvent::RateUpdate(RateUpdateEvent {
                transaction_hash: event.transaction_hash.clone(),
                log_index: event.log_index,
                timestamp: event.timestamp as i64,
                block_number: event.block_number,
                asset: event.asset.clone(),
                liquidity_rate: parse_integer(&event.liquidity_rate, "liquidity_rate")?,
                stable_borrow_rate: parse_integer(&event.stable_borrow_rate, "stable_borrow_rate")?,
                variable_borrow_rate: parse_integer(&event.variable_borrow_rate, "variable_borrow_rate")?,
                liquidity_index: parse_integer(&event.liquidity_index, "liquidity_index")?,
                variable_borrow_index: parse_integer(&event.variable_borrow_index, "variable_borrow_index")?,
                log_ordinal: event.log_ordinal,
            }));
        }

        let flow = FlowEvent {
            transaction_hash: event.transaction_hash.clone(),
            log_index: event.log_index,
            timestamp: event.timestamp as i64,
            block_number: event.block_number,
            asset: event.asset.clone(),
            user: event.user.clone(),
            caller: event.caller.clone(),
            amount: parse_integer(&event.amount, "amount")?,
            log_ordinal: event.log_ordinal,
        };
        match event_type {
            pb::EventType::Supply => Ok(LendingEvent::Supply(flow)),
            pb::EventType::Withdraw => Ok(LendingEvent::Withdraw(flow)),
            pb::EventType::Borrow => Ok(LendingEvent::Borrow(flow)),
            pb::EventType::Repay => Ok(LendingEvent::Repay(flow)),
            other => Err(QueryError::decode("event_type", other.as_str_name())),
        }
    }
}
