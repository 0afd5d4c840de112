use bigdecimal::{BigDecimal, Zero};
use num_bigint::BigInt;
use std::ops::{Neg, Sub};
use substreams::key;
use substreams::log;
use substreams::scalar;
use substreams::store::{DeltaBigInt, DeltaExt, Deltas, StoreAdd, StoreMin, StoreSet};

use crate::event::{FlowEvent, LendingEvent, TransactionType};
use crate::keyer;
use crate::math;
use crate::pb::lending as pb;
use crate::source::ReserveSource;

// ------------------------------------------------
//      authoritative balances
// ------------------------------------------------

/// Reads the balances behind every flow of the block. A failed read emits
/// nothing so the position keeps its previous balances.
pub fn position_balances<C: ReserveSource>(chain: &C, events: &[LendingEvent]) -> pb::PositionBalances {
    let balances = events
        .iter()
        .filter_map(|event| event.flow())
        .filter_map(|flow| read_balance(chain, flow))
        .collect();

    pb::PositionBalances { balances }
}

fn read_balance<C: ReserveSource>(chain: &C, flow: &FlowEvent) -> Option<pb::PositionBalance> {
    match chain.user_reserve_data(&flow.asset, &flow.user) {
        Ok(reserve) => Some(pb::PositionBalance {
            user: flow.user.clone(),
            market: flow.asset.clone(),
            supplied: reserve.current_a_token_balance.to_string(),
            variable_debt: reserve.current_variable_debt.to_string(),
            stable_debt: reserve.current_stable_debt.to_string(),
            is_collateral: reserve.usage_as_collateral_enabled,
            timestamp: flow.timestamp,
            ordinal: flow.log_ordinal,
        }),
        Err(e) => {
            log::debug!("unable to read position of {} in {}: {}", flow.user, flow.asset, e);
            None
        }
    }
}

pub fn total_debt(balance: &pb::PositionBalance) -> BigInt {
    math::parse_bigint(&balance.variable_debt) + math::parse_bigint(&balance.stable_debt)
}

pub fn store_balances<S: StoreSet<pb::PositionBalance>>(balances: &pb::PositionBalances, store: &S) {
    for balance in balances.balances.iter() {
        let position_id = keyer::position_id(&balance.user, &balance.market);
        store.set(balance.ordinal, keyer::position_key(&position_id), balance);
    }
}

// ------------------------------------------------
//      local cash flow accumulation
// ------------------------------------------------

/// Accumulates each flow into its position counter. Supplies and
/// withdrawals also move the position's net deposit.
pub fn store_flows<S: StoreAdd<scalar::BigInt>>(flows: &[(TransactionType, FlowEvent)], store: &S) {
    for (transaction_type, flow) in flows.iter() {
        let position_id = keyer::position_id(&flow.user, &flow.asset);
        store.add(
            flow.log_ordinal,
            keyer::position_field_key(&position_id, transaction_type.position_field()),
            math::to_scalar_bigint(&flow.amount),
        );

        let net = match transaction_type {
            TransactionType::Supply => flow.amount.clone(),
            TransactionType::Withdraw => (&flow.amount).neg(),
            _ => continue,
        };
        store.add(
            flow.log_ordinal,
            keyer::position_field_key(&position_id, keyer::NET_FLOW),
            math::to_scalar_bigint(&net),
        );
    }
}

/// Keeps the lowest net deposit each position ever reached.
pub fn store_floors<S: StoreMin<scalar::BigInt>>(flows: &Deltas<DeltaBigInt>, store: &S) {
    for delta in flows.iter().key_last_segment_eq(keyer::NET_FLOW) {
        let position_id = key::segment_at(&delta.key, 1);
        store.min(delta.ordinal, keyer::position_key(position_id), delta.new_value.clone());
    }
}

/// Capital still in the position: the net deposit with every withdrawal
/// beyond the principal absorbed, so it never drops below zero.
pub fn principal(net: &BigInt, floor: &BigInt) -> BigInt {
    if *floor < BigInt::zero() {
        net.sub(floor)
    } else {
        net.clone()
    }
}

/// Everything withdrawn beyond the principal so far, the mirror of the floor.
pub fn realized_pnl(floor: &BigInt, decimals: u64) -> BigDecimal {
    if *floor < BigInt::zero() {
        math::to_decimal(&floor.neg(), decimals)
    } else {
        BigDecimal::zero()
    }
}

/// Interest earned on the capital still in the position.
pub fn unrealized_pnl(supplied: &BigInt, principal: &BigInt, decimals: u64) -> BigDecimal {
    math::to_decimal(&supplied.sub(principal), decimals)
}
