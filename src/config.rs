use substreams::{log, Hex};

use crate::{eth, utils};

/// Immutable settings shared by every ledger component.
///
/// Built once per module invocation from the Substreams params string and
/// passed by reference, never read from ambient state.
#[derive(Clone, Debug, PartialEq)]
pub struct LedgerConfig {
    pub protocol_id: String,
    pub pool: String,
    pub data_provider: String,
    pub oracle: String,
    pub ray_decimals: u64,
    pub oracle_base_currency_decimals: u64,
    pub default_token_decimals: u64,
    pub basis_points: i64,
    pub seconds_per_hour: i64,
    pub seconds_per_day: i64,
    pub seconds_per_year: i64,
    pub days_per_year: i64,
    /// Run the periodic market pass every `tick_interval_blocks` blocks, 0 disables it.
    pub tick_interval_blocks: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        LedgerConfig {
            protocol_id: utils::PROTOCOL_ID.to_string(),
            pool: format!("0x{}", Hex(&utils::AAVE_V3_POOL)),
            data_provider: format!("0x{}", Hex(&utils::AAVE_V3_DATA_PROVIDER)),
            oracle: format!("0x{}", Hex(&utils::AAVE_V3_ORACLE)),
            ray_decimals: 27,
            oracle_base_currency_decimals: 8,
            default_token_decimals: 18,
            basis_points: 10_000,
            seconds_per_hour: 3_600,
            seconds_per_day: 86_400,
            seconds_per_year: 31_536_000,
            days_per_year: 365,
            tick_interval_blocks: 300,
        }
    }
}

impl LedgerConfig {
    /// Parses `key=value&key=value` module params on top of the defaults.
    ///
    /// Recognized keys: `pool`, `data_provider`, `oracle`, `protocol_id`,
    /// `base_currency_decimals`, `tick_interval_blocks`. Anything unknown or
    /// malformed is reported and skipped so a bad param never halts the module.
    pub fn from_params(params: &str) -> Self {
        let mut config = LedgerConfig::default();

        for pair in params.split('&').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = match pair.split_once('=') {
                Some((k, v)) => (k.trim(), v.trim()),
                None => {
                    log::info!("WARN ignoring malformed param '{}'", pair);
                    continue;
                }
            };

            match key {
                "pool" | "data_provider" | "oracle" => match normalize_address(value) {
                    Some(address) => match key {
                        "pool" => config.pool = address,
                        "data_provider" => config.data_provider = address,
                        _ => config.oracle = address,
                    },
                    None => log::info!("WARN param '{}' is not a valid address: {}", key, value),
                },
                "protocol_id" => config.protocol_id = value.to_string(),
                "base_currency_decimals" => match value.parse::<u64>() {
                    Ok(decimals) => config.oracle_base_currency_decimals = decimals,
                    Err(e) => log::info!("WARN param 'base_currency_decimals' invalid ({}): {}", e, value),
                },
                "tick_interval_blocks" => match value.parse::<u64>() {
                    Ok(interval) => config.tick_interval_blocks = interval,
                    Err(e) => log::info!("WARN param 'tick_interval_blocks' invalid ({}): {}", e, value),
                },
                _ => log::info!("WARN unknown param '{}'", key),
            }
        }

        config
    }

    pub fn should_tick(&self, block_number: u64) -> bool {
        self.tick_interval_blocks > 0 && block_number % self.tick_interval_blocks == 0
    }
}

/// Lowercase `0x`-prefixed form of a 20 bytes hex address.
pub fn normalize_address(input: &str) -> Option<String> {
    eth::parse_address(input).map(|address| eth::format_address(address.as_bytes()))
}
