use num_bigint::BigInt;
use substreams::log;
use substreams::scalar;
use substreams::store::StoreSet;

use crate::config::LedgerConfig;
use crate::keyer;
use crate::math;
use crate::pb::lending as pb;
use crate::source::TokenMetadata;

pub const UNKNOWN: &str = "unknown";

#[derive(Clone, Debug, PartialEq)]
pub struct Metadata {
    pub symbol: String,
    pub name: String,
    pub decimals: u64,
}

/// Reads the token's metadata.
///
/// Calls fail independently; each failure substitutes its default (`"unknown"`
/// symbol and name, default decimals) so a token always has metadata.
pub fn read_metadata<C: TokenMetadata>(chain: &C, config: &LedgerConfig, address: &str) -> Metadata {
    let symbol = chain.symbol(address).unwrap_or_else(|e| {
        log::debug!("{} symbol `eth_call` failed: {}", address, e);
        UNKNOWN.to_string()
    });
    let name = chain.name(address).unwrap_or_else(|e| {
        log::debug!("{} name `eth_call` failed: {}", address, e);
        UNKNOWN.to_string()
    });
    let decimals = chain.decimals(address).unwrap_or_else(|e| {
        log::debug!("{} decimals `eth_call` failed: {}", address, e);
        config.default_token_decimals
    });

    Metadata { symbol, name, decimals }
}

pub fn read_total_supply<C: TokenMetadata>(chain: &C, address: &str) -> Option<BigInt> {
    match chain.total_supply(address) {
        Ok(total_supply) => Some(total_supply),
        Err(e) => {
            log::debug!("{} totalSupply `eth_call` failed: {}", address, e);
            None
        }
    }
}

/// Keeps the last total supply read of every input token. A failed read
/// writes nothing, the previous value stays.
pub fn store_total_supplies<S: StoreSet<scalar::BigInt>>(states: &pb::MarketStates, store: &S) {
    for state in states.states.iter().filter(|s| !s.token_total_supply.is_empty()) {
        store.set(
            state.ordinal,
            keyer::token_key(&state.asset),
            &math::to_scalar_bigint(&math::parse_bigint(&state.token_total_supply)),
        );
    }
}
