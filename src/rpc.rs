use ethabi::{ParamType, Token};
use num_bigint::BigInt;
use substreams::{log, Hex};
use substreams_ethereum::pb::eth as ethpb;

use crate::config::LedgerConfig;
use crate::error::QueryError;
use crate::source::{
    MarketDiscovery, PriceOracle, ReserveConfiguration, ReserveData, ReserveSource, ReserveTokens, TokenMetadata,
    UserReserveData,
};
use crate::{eth, utils};

/// [`crate::source::Chain`] backed by `eth_call`s against the pool, the pool
/// data provider and the price oracle.
pub struct RpcChain {
    pool: String,
    data_provider: String,
    oracle: String,
}

impl RpcChain {
    pub fn new(config: &LedgerConfig) -> Self {
        RpcChain {
            pool: config.pool.clone(),
            data_provider: config.data_provider.clone(),
            oracle: config.oracle.clone(),
        }
    }

    fn call(&self, contract: &str, selector: [u8; 4], args: &[Token]) -> Result<Vec<u8>, QueryError> {
        let to_addr = eth::parse_address(contract).ok_or_else(|| QueryError::CallFailed {
            contract: contract.to_string(),
            reason: "invalid contract address".to_string(),
        })?;

        let mut data = selector.to_vec();
        data.extend(ethabi::encode(args));

        let rpc_calls = ethpb::rpc::RpcCalls {
            calls: vec![ethpb::rpc::RpcCall {
                to_addr: to_addr.as_bytes().to_vec(),
                data,
            }],
        };

        let mut responses = substreams_ethereum::rpc::eth_call(&rpc_calls).responses;
        let response = match responses.pop() {
            Some(response) => response,
            None => {
                return Err(QueryError::CallFailed {
                    contract: contract.to_string(),
                    reason: "no response".to_string(),
                })
            }
        };

        if response.failed {
            log::debug!("eth_call to {} with selector 0x{} failed", contract, Hex(&selector));
            return Err(QueryError::CallFailed {
                contract: contract.to_string(),
                reason: String::from_utf8_lossy(response.raw.as_ref()).to_string(),
            });
        }

        Ok(response.raw)
    }

    fn call_with_asset(&self, contract: &str, selector: [u8; 4], asset: &str) -> Result<Vec<u8>, QueryError> {
        let asset_address = eth::parse_address(asset).ok_or_else(|| QueryError::decode("asset", asset))?;
        self.call(contract, selector, &[Token::Address(asset_address)])
    }
}

impl MarketDiscovery for RpcChain {
    fn list_markets(&self) -> Result<Vec<String>, QueryError> {
        let raw = self.call(&self.pool, utils::GET_RESERVES_LIST_SELECTOR, &[])?;
        let mut values = ethabi::decode(&[ParamType::Array(Box::new(ParamType::Address))], &raw)
            .map_err(|e| QueryError::decode("getReservesList", e))?;

        let reserves = values
            .pop()
            .and_then(Token::into_array)
            .ok_or_else(|| QueryError::decode("getReservesList", "expected address[]"))?;

        reserves
            .into_iter()
            .map(|token| eth::token_to_address(token, "getReservesList"))
            .collect()
    }
}

impl PriceOracle for RpcChain {
    fn asset_price(&self, asset: &str) -> Result<BigInt, QueryError> {
        let raw = self.call_with_asset(&self.oracle, utils::GET_ASSET_PRICE_SELECTOR, asset)?;
        eth::read_uint(&raw, "getAssetPrice")
    }

    fn base_currency_unit(&self) -> Result<BigInt, QueryError> {
        let raw = self.call(&self.oracle, utils::BASE_CURRENCY_UNIT_SELECTOR, &[])?;
        eth::read_uint(&raw, "BASE_CURRENCY_UNIT")
    }
}

impl TokenMetadata for RpcChain {
    fn symbol(&self, token: &str) -> Result<String, QueryError> {
        let raw = self.call(token, utils::SYMBOL_SELECTOR, &[])?;
        eth::read_string(&raw, "symbol")
    }

    fn name(&self, token: &str) -> Result<String, QueryError> {
        let raw = self.call(token, utils::NAME_SELECTOR, &[])?;
        eth::read_string(&raw, "name")
    }

    fn decimals(&self, token: &str) -> Result<u64, QueryError> {
        let raw = self.call(token, utils::DECIMALS_SELECTOR, &[])?;
        let decimals = eth::read_uint(&raw, "decimals")?;
        u64::try_from(decimals).map_err(|e| QueryError::decode("decimals", e))
    }

    fn total_supply(&self, token: &str) -> Result<BigInt, QueryError> {
        let raw = self.call(token, utils::TOTAL_SUPPLY_SELECTOR, &[])?;
        eth::read_uint(&raw, "totalSupply")
    }
}

impl ReserveSource for RpcChain {
    fn reserve_data(&self, asset: &str) -> Result<ReserveData, QueryError> {
        let raw = self.call_with_asset(&self.data_provider, utils::GET_RESERVE_DATA_SELECTOR, asset)?;
        // unbacked, accruedToTreasuryScaled, totalAToken, totalStableDebt, totalVariableDebt,
        // liquidityRate, variableBorrowRate, stableBorrowRate, averageStableBorrowRate,
        // liquidityIndex, variableBorrowIndex, lastUpdateTimestamp
        let mut values = ethabi::decode(
            &[
                ParamType::Uint(256),
                ParamType::Uint(256),
                ParamType::Uint(256),
                ParamType::Uint(256),
                ParamType::Uint(256),
                ParamType::Uint(256),
                ParamType::Uint(256),
                ParamType::Uint(256),
                ParamType::Uint(256),
                ParamType::Uint(256),
                ParamType::Uint(256),
                ParamType::Uint(40),
            ],
            &raw,
        )
        .map_err(|e| QueryError::decode("getReserveData", e))?;
        values.truncate(8);
        let stable_borrow_rate = next_uint(&mut values, "stableBorrowRate")?;
        let variable_borrow_rate = next_uint(&mut values, "variableBorrowRate")?;
        let liquidity_rate = next_uint(&mut values, "liquidityRate")?;
        let total_variable_debt = next_uint(&mut values, "totalVariableDebt")?;
        let total_stable_debt = next_uint(&mut values, "totalStableDebt")?;
        let total_supply = next_uint(&mut values, "totalAToken")?;

        Ok(ReserveData {
            total_supply,
            total_stable_debt,
            total_variable_debt,
            liquidity_rate,
            variable_borrow_rate,
            stable_borrow_rate,
        })
    }

    fn reserve_configuration(&self, asset: &str) -> Result<ReserveConfiguration, QueryError> {
        let raw = self.call_with_asset(&self.data_provider, utils::GET_RESERVE_CONFIGURATION_DATA_SELECTOR, asset)?;
        let mut values = ethabi::decode(
            &[
                ParamType::Uint(256),
                ParamType::Uint(256),
                ParamType::Uint(256),
                ParamType::Uint(256),
                ParamType::Uint(256),
                ParamType::Bool,
                ParamType::Bool,
                ParamType::Bool,
                ParamType::Bool,
                ParamType::Bool,
            ],
            &raw,
        )
        .map_err(|e| QueryError::decode("getReserveConfigurationData", e))?;
        values.reverse();

        let _decimals = next_uint(&mut values, "decimals")?;
        let ltv = next_uint(&mut values, "ltv")?;
        let liquidation_threshold = next_uint(&mut values, "liquidationThreshold")?;
        let liquidation_bonus = next_uint(&mut values, "liquidationBonus")?;
        let reserve_factor = next_uint(&mut values, "reserveFactor")?;
        let _usage_as_collateral_enabled = next_bool(&mut values, "usageAsCollateralEnabled")?;
        let _borrowing_enabled = next_bool(&mut values, "borrowingEnabled")?;
        let _stable_borrow_rate_enabled = next_bool(&mut values, "stableBorrowRateEnabled")?;
        let is_active = next_bool(&mut values, "isActive")?;
        let is_frozen = next_bool(&mut values, "isFrozen")?;

        Ok(ReserveConfiguration {
            ltv: bigint_to_i64(ltv, "ltv")?,
            liquidation_threshold: bigint_to_i64(liquidation_threshold, "liquidationThreshold")?,
            liquidation_bonus: bigint_to_i64(liquidation_bonus, "liquidationBonus")?,
            reserve_factor: bigint_to_i64(reserve_factor, "reserveFactor")?,
            is_active,
            is_frozen,
        })
    }

    fn reserve_tokens(&self, asset: &str) -> Result<ReserveTokens, QueryError> {
        let raw = self.call_with_asset(&self.data_provider, utils::GET_RESERVE_TOKENS_ADDRESSES_SELECTOR, asset)?;
        // aTokenAddress, stableDebtTokenAddress, variableDebtTokenAddress
        let mut values = ethabi::decode(&[ParamType::Address, ParamType::Address, ParamType::Address], &raw)
            .map_err(|e| QueryError::decode("getReserveTokensAddresses", e))?;
        values.truncate(1);

        match values.pop() {
            Some(token) => Ok(ReserveTokens {
                a_token: eth::token_to_address(token, "aTokenAddress")?,
            }),
            None => Err(QueryError::decode("aTokenAddress", "missing value")),
        }
    }

    fn user_reserve_data(&self, asset: &str, user: &str) -> Result<UserReserveData, QueryError> {
        let asset_address = eth::parse_address(asset).ok_or_else(|| QueryError::decode("asset", asset))?;
        let user_address = eth::parse_address(user).ok_or_else(|| QueryError::decode("user", user))?;
        let raw = self.call(
            &self.data_provider,
            utils::GET_USER_RESERVE_DATA_SELECTOR,
            &[Token::Address(asset_address), Token::Address(user_address)],
        )?;

        // currentATokenBalance, currentStableDebt, currentVariableDebt, principalStableDebt,
        // scaledVariableDebt, stableBorrowRate, liquidityRate, stableRateLastUpdated,
        // usageAsCollateralEnabled
        let mut values = ethabi::decode(
            &[
                ParamType::Uint(256),
                ParamType::Uint(256),
                ParamType::Uint(256),
                ParamType::Uint(256),
                ParamType::Uint(256),
                ParamType::Uint(256),
                ParamType::Uint(256),
                ParamType::Uint(40),
                ParamType::Bool,
            ],
            &raw,
        )
        .map_err(|e| QueryError::decode("getUserReserveData", e))?;

        let usage_as_collateral_enabled = next_bool(&mut values, "usageAsCollateralEnabled")?;
        values.truncate(3);
        let current_variable_debt = next_uint(&mut values, "currentVariableDebt")?;
        let current_stable_debt = next_uint(&mut values, "currentStableDebt")?;
        let current_a_token_balance = next_uint(&mut values, "currentATokenBalance")?;

        Ok(UserReserveData {
            current_a_token_balance,
            current_stable_debt,
            current_variable_debt,
            usage_as_collateral_enabled,
        })
    }
}

fn next_uint(values: &mut Vec<Token>, what: &'static str) -> Result<BigInt, QueryError> {
    match values.pop() {
        Some(token) => eth::token_to_bigint(token, what),
        None => Err(QueryError::decode(what, "missing value")),
    }
}

fn next_bool(values: &mut Vec<Token>, what: &'static str) -> Result<bool, QueryError> {
    match values.pop() {
        Some(token) => eth::token_to_bool(token, what),
        None => Err(QueryError::decode(what, "missing value")),
    }
}

fn bigint_to_i64(value: BigInt, what: &'static str) -> Result<i64, QueryError> {
    i64::try_from(value).map_err(|e| QueryError::decode(what, e))
}
