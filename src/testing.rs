use num_bigint::BigInt;
use prost::Message;
use std::cell::RefCell;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::str::FromStr;
use substreams::pb::substreams::store_delta::Operation;
use substreams::pb::substreams::StoreDelta;
use substreams::scalar;
use substreams::store::{
    Delta, Deltas, StoreAdd, StoreDelete, StoreGet, StoreMax, StoreMin, StoreNew, StoreSet, StoreSetIfNotExists,
};

use substreams_entity_change::pb::entity::{value::Typed, EntityChanges};
use substreams_entity_change::tables::Tables;

use crate::config::LedgerConfig;
use crate::error::QueryError;
use crate::event::{self, LendingEvent};
use crate::market::{self, MarketStores, MarketView};
use crate::pb::lending as pb;
use crate::{aggregate, db, keyer, position, price, revenue, snapshot, token};
use crate::source::{
    MarketDiscovery, PriceOracle, ReserveConfiguration, ReserveData, ReserveSource, ReserveTokens, TokenMetadata,
    UserReserveData,
};

pub const USDC: &str = "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48";
pub const WETH: &str = "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2";
pub const A_USDC: &str = "0x98c23e9d8f34fefb1b7bd6a91b7ff122f4e16f5c";
pub const A_WETH: &str = "0x4d5f47fa6a74757f35c14fd3a6ef8e3c9bc514e8";
pub const ALICE: &str = "0x00000000000000000000000000000000000a11ce";
pub const BOB: &str = "0x0000000000000000000000000000000000000b0b";

pub fn ray(value: &str) -> BigInt {
    BigInt::from_str(value).unwrap() * BigInt::from(10u64).pow(27) / BigInt::from(100)
}

#[derive(Clone, Debug)]
pub struct MockToken {
    pub symbol: String,
    pub name: String,
    pub decimals: u64,
    pub total_supply: BigInt,
}

/// In-memory chain; any missing entry answers with [`QueryError::Unavailable`].
#[derive(Clone, Debug)]
pub struct MockChain {
    pub markets: Option<Vec<String>>,
    pub base_currency_unit: Option<BigInt>,
    pub prices: HashMap<String, BigInt>,
    pub tokens: HashMap<String, MockToken>,
    pub reserves: HashMap<String, ReserveData>,
    pub configurations: HashMap<String, ReserveConfiguration>,
    pub reserve_tokens: HashMap<String, ReserveTokens>,
    pub user_reserves: HashMap<(String, String), UserReserveData>,
}

impl Default for MockChain {
    /// USDC (6 decimals, $1, 10% reserve factor) and WETH (18 decimals, $2000, 15% reserve factor).
    fn default() -> Self {
        let mut chain = MockChain {
            markets: Some(vec![USDC.to_string(), WETH.to_string()]),
            base_currency_unit: Some(BigInt::from(100_000_000)),
            prices: HashMap::new(),
            tokens: HashMap::new(),
            reserves: HashMap::new(),
            configurations: HashMap::new(),
            reserve_tokens: HashMap::new(),
            user_reserves: HashMap::new(),
        };
        chain.add_reserve(USDC, A_USDC, "USDC", "USD Coin", 6, 100_000_000, 1_000);
        chain.add_reserve(WETH, A_WETH, "WETH", "Wrapped Ether", 18, 200_000_000_000, 1_500);
        chain
    }
}

impl MockChain {
    pub fn add_reserve(
        &mut self,
        asset: &str,
        a_token: &str,
        symbol: &str,
        name: &str,
        decimals: u64,
        price: i64,
        reserve_factor: i64,
    ) {
        self.prices.insert(asset.to_string(), BigInt::from(price));
        self.tokens.insert(
            asset.to_string(),
            MockToken {
                symbol: symbol.to_string(),
                name: name.to_string(),
                decimals,
                total_supply: BigInt::from(10u64).pow(decimals as u32 + 9),
            },
        );
        self.reserves.insert(asset.to_string(), ReserveData::default());
        self.configurations.insert(
            asset.to_string(),
            ReserveConfiguration {
                ltv: 7_500,
                liquidation_threshold: 8_000,
                liquidation_bonus: 10_500,
                reserve_factor,
                is_active: true,
                is_frozen: false,
            },
        );
        self.reserve_tokens.insert(
            asset.to_string(),
            ReserveTokens {
                a_token: a_token.to_string(),
            },
        );
    }

    pub fn set_reserve(&mut self, asset: &str, total_supply: i64, total_variable_debt: i64, liquidity: &str, variable: &str) {
        self.reserves.insert(
            asset.to_string(),
            ReserveData {
                total_supply: BigInt::from(total_supply),
                total_stable_debt: BigInt::from(0),
                total_variable_debt: BigInt::from(total_variable_debt),
                liquidity_rate: ray(liquidity),
                variable_borrow_rate: ray(variable),
                stable_borrow_rate: BigInt::from(0),
            },
        );
    }

    pub fn set_user_reserve(&mut self, asset: &str, user: &str, supplied: i64, variable_debt: i64) {
        self.user_reserves.insert(
            (asset.to_string(), user.to_string()),
            UserReserveData {
                current_a_token_balance: BigInt::from(supplied),
                current_stable_debt: BigInt::from(0),
                current_variable_debt: BigInt::from(variable_debt),
                usage_as_collateral_enabled: true,
            },
        );
    }
}

fn unavailable<T>(what: String) -> Result<T, QueryError> {
    Err(QueryError::Unavailable(what))
}

impl MarketDiscovery for MockChain {
    fn list_markets(&self) -> Result<Vec<String>, QueryError> {
        match &self.markets {
            Some(markets) => Ok(markets.clone()),
            None => unavailable("reserves list".to_string()),
        }
    }
}

impl PriceOracle for MockChain {
    fn asset_price(&self, asset: &str) -> Result<BigInt, QueryError> {
        match self.prices.get(asset) {
            Some(price) => Ok(price.clone()),
            None => unavailable(format!("price of {}", asset)),
        }
    }

    fn base_currency_unit(&self) -> Result<BigInt, QueryError> {
        match &self.base_currency_unit {
            Some(unit) => Ok(unit.clone()),
            None => unavailable("base currency unit".to_string()),
        }
    }
}

impl TokenMetadata for MockChain {
    fn symbol(&self, token: &str) -> Result<String, QueryError> {
        match self.tokens.get(token) {
            Some(t) => Ok(t.symbol.clone()),
            None => unavailable(format!("symbol of {}", token)),
        }
    }

    fn name(&self, token: &str) -> Result<String, QueryError> {
        match self.tokens.get(token) {
            Some(t) => Ok(t.name.clone()),
            None => unavailable(format!("name of {}", token)),
        }
    }

    fn decimals(&self, token: &str) -> Result<u64, QueryError> {
        match self.tokens.get(token) {
            Some(t) => Ok(t.decimals),
            None => unavailable(format!("decimals of {}", token)),
        }
    }

    fn total_supply(&self, token: &str) -> Result<BigInt, QueryError> {
        match self.tokens.get(token) {
            Some(t) => Ok(t.total_supply.clone()),
            None => unavailable(format!("total supply of {}", token)),
        }
    }
}

impl ReserveSource for MockChain {
    fn reserve_data(&self, asset: &str) -> Result<ReserveData, QueryError> {
        match self.reserves.get(asset) {
            Some(data) => Ok(data.clone()),
            None => unavailable(format!("reserve data of {}", asset)),
        }
    }

    fn reserve_configuration(&self, asset: &str) -> Result<ReserveConfiguration, QueryError> {
        match self.configurations.get(asset) {
            Some(configuration) => Ok(configuration.clone()),
            None => unavailable(format!("reserve configuration of {}", asset)),
        }
    }

    fn reserve_tokens(&self, asset: &str) -> Result<ReserveTokens, QueryError> {
        match self.reserve_tokens.get(asset) {
            Some(tokens) => Ok(tokens.clone()),
            None => unavailable(format!("reserve tokens of {}", asset)),
        }
    }

    fn user_reserve_data(&self, asset: &str, user: &str) -> Result<UserReserveData, QueryError> {
        match self.user_reserves.get(&(asset.to_string(), user.to_string())) {
            Some(data) => Ok(data.clone()),
            None => unavailable(format!("reserve data of {} for {}", asset, user)),
        }
    }
}

// ------------------------------------------------
//      in-memory substreams stores
// ------------------------------------------------

/// Byte encoding of a store value, matching what the Substreams runtime keeps.
pub trait StoreValue: Sized {
    fn encode_value(&self) -> Vec<u8>;
    fn decode_value(bytes: &[u8]) -> Self;
}

impl StoreValue for i64 {
    fn encode_value(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }

    fn decode_value(bytes: &[u8]) -> Self {
        std::str::from_utf8(bytes).ok().and_then(|v| v.parse().ok()).unwrap_or_default()
    }
}

impl StoreValue for scalar::BigInt {
    fn encode_value(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }

    fn decode_value(bytes: &[u8]) -> Self {
        scalar::BigInt::from_store_bytes(bytes)
    }
}

impl StoreValue for scalar::BigDecimal {
    fn encode_value(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }

    fn decode_value(bytes: &[u8]) -> Self {
        scalar::BigDecimal::from_store_bytes(bytes)
    }
}

macro_rules! proto_store_value {
    ($($name:ty),*) => {
        $(
            impl StoreValue for $name {
                fn encode_value(&self) -> Vec<u8> {
                    self.encode_to_vec()
                }

                fn decode_value(bytes: &[u8]) -> Self {
                    <$name>::decode(bytes).unwrap()
                }
            }
        )*
    };
}

proto_store_value!(
    pb::LendingEvent,
    pb::MarketInfo,
    pb::ReserveTotals,
    pb::ReserveRates,
    pb::ReserveConfig,
    pb::TokenPrice,
    pb::PositionBalance
);

/// A store module's state across blocks.
///
/// Writes land in the live state and are recorded as deltas; `get_first`
/// reads the state as of the start of the block. [`MemoryStore::commit`]
/// closes the block.
pub struct MemoryStore<V> {
    first: RefCell<HashMap<String, Vec<u8>>>,
    last: RefCell<HashMap<String, Vec<u8>>>,
    pending: RefCell<Vec<StoreDelta>>,
    value: PhantomData<V>,
}

impl<V> Default for MemoryStore<V> {
    fn default() -> Self {
        MemoryStore {
            first: RefCell::new(HashMap::new()),
            last: RefCell::new(HashMap::new()),
            pending: RefCell::new(vec![]),
            value: PhantomData,
        }
    }
}

impl<V: StoreValue> MemoryStore<V> {
    fn current(&self, key: &str) -> Option<V> {
        self.last.borrow().get(key).map(|bytes| V::decode_value(bytes))
    }

    fn write(&self, ordinal: u64, key: &str, value: &V) {
        let new_value = value.encode_value();
        let old_value = self.last.borrow_mut().insert(key.to_string(), new_value.clone());
        let operation = match old_value {
            Some(_) => Operation::Update,
            None => Operation::Create,
        };
        self.pending.borrow_mut().push(StoreDelta {
            operation: operation as i32,
            ordinal,
            key: key.to_string(),
            old_value: old_value.unwrap_or_default(),
            new_value,
        });
    }

    /// Deltas written since the last commit, as the next modules receive them.
    pub fn deltas<D: Delta + From<StoreDelta>>(&self) -> Deltas<D> {
        Deltas::new(self.pending.borrow().clone())
    }

    pub fn commit(&self) {
        self.pending.borrow_mut().clear();
        *self.first.borrow_mut() = self.last.borrow().clone();
    }
}

impl<V> StoreNew for MemoryStore<V> {
    fn new() -> Self {
        Self::default()
    }
}

impl<V> StoreDelete for MemoryStore<V> {}

impl<V: StoreValue> StoreSet<V> for MemoryStore<V> {
    fn set<K: AsRef<str>>(&self, ord: u64, key: K, value: &V) {
        self.write(ord, key.as_ref(), value);
    }

    fn set_many<K: AsRef<str>>(&self, ord: u64, keys: &Vec<K>, value: &V) {
        for key in keys {
            self.write(ord, key.as_ref(), value);
        }
    }
}

impl<V: StoreValue> StoreSetIfNotExists<V> for MemoryStore<V> {
    fn set_if_not_exists<K: AsRef<str>>(&self, ord: u64, key: K, value: &V) {
        if self.current(key.as_ref()).is_none() {
            self.write(ord, key.as_ref(), value);
        }
    }

    fn set_if_not_exists_many<K: AsRef<str>>(&self, ord: u64, keys: &Vec<K>, value: &V) {
        for key in keys {
            self.set_if_not_exists(ord, key, value);
        }
    }
}

impl StoreAdd<i64> for MemoryStore<i64> {
    fn add<K: AsRef<str>>(&self, ord: u64, key: K, value: i64) {
        let sum = self.current(key.as_ref()).unwrap_or_default() + value;
        self.write(ord, key.as_ref(), &sum);
    }

    fn add_many<K: AsRef<str>>(&self, ord: u64, keys: &Vec<K>, value: i64) {
        for key in keys {
            self.add(ord, key, value);
        }
    }
}

impl StoreAdd<scalar::BigInt> for MemoryStore<scalar::BigInt> {
    fn add<K: AsRef<str>>(&self, ord: u64, key: K, value: scalar::BigInt) {
        let current: BigInt = self.current(key.as_ref()).unwrap_or_default().into();
        let value: BigInt = value.into();
        self.write(ord, key.as_ref(), &scalar::BigInt::from(current + value));
    }

    fn add_many<K: AsRef<str>>(&self, ord: u64, keys: &Vec<K>, value: scalar::BigInt) {
        for key in keys {
            self.add(ord, key, value.clone());
        }
    }
}

impl StoreAdd<scalar::BigDecimal> for MemoryStore<scalar::BigDecimal> {
    fn add<K: AsRef<str>>(&self, ord: u64, key: K, value: scalar::BigDecimal) {
        let current: bigdecimal::BigDecimal = self.current(key.as_ref()).unwrap_or_default().into();
        let value: bigdecimal::BigDecimal = value.into();
        self.write(ord, key.as_ref(), &scalar::BigDecimal::from(current + value));
    }

    fn add_many<K: AsRef<str>>(&self, ord: u64, keys: &Vec<K>, value: scalar::BigDecimal) {
        for key in keys {
            self.add(ord, key, value.clone());
        }
    }
}

impl StoreMin<scalar::BigInt> for MemoryStore<scalar::BigInt> {
    fn min<K: AsRef<str>>(&self, ord: u64, key: K, value: scalar::BigInt) {
        let current = self.current(key.as_ref()).unwrap_or_default();
        if value < current {
            self.write(ord, key.as_ref(), &value);
        }
    }
}

impl StoreMax<i64> for MemoryStore<i64> {
    fn max<K: AsRef<str>>(&self, ord: u64, key: K, value: i64) {
        let current = self.current(key.as_ref()).unwrap_or_default();
        if value > current {
            self.write(ord, key.as_ref(), &value);
        }
    }
}

impl<V: StoreValue> StoreGet<V> for MemoryStore<V> {
    fn new(_idx: u32) -> Self {
        Self::default()
    }

    fn get_at<K: AsRef<str>>(&self, _ord: u64, key: K) -> Option<V> {
        self.current(key.as_ref())
    }

    fn get_last<K: AsRef<str>>(&self, key: K) -> Option<V> {
        self.current(key.as_ref())
    }

    fn get_first<K: AsRef<str>>(&self, key: K) -> Option<V> {
        self.first.borrow().get(key.as_ref()).map(|bytes| V::decode_value(bytes))
    }

    fn has_at<K: AsRef<str>>(&self, ord: u64, key: K) -> bool {
        self.get_at(ord, key).is_some()
    }

    fn has_last<K: AsRef<str>>(&self, key: K) -> bool {
        self.get_last(key).is_some()
    }

    fn has_first<K: AsRef<str>>(&self, key: K) -> bool {
        self.get_first(key).is_some()
    }
}

/// The market stores of one pipeline.
#[derive(Default)]
pub struct MarketFixture {
    pub infos: MemoryStore<pb::MarketInfo>,
    pub totals: MemoryStore<pb::ReserveTotals>,
    pub rates: MemoryStore<pb::ReserveRates>,
    pub configs: MemoryStore<pb::ReserveConfig>,
    pub prices: MemoryStore<pb::TokenPrice>,
}

type MemoryMarketStores<'a> = MarketStores<
    'a,
    MemoryStore<pb::MarketInfo>,
    MemoryStore<pb::ReserveTotals>,
    MemoryStore<pb::ReserveRates>,
    MemoryStore<pb::ReserveConfig>,
    MemoryStore<pb::TokenPrice>,
>;

impl MarketFixture {
    /// A fully read market, rates given as percentages.
    #[allow(clippy::too_many_arguments)]
    pub fn view(
        asset: &str,
        decimals: u64,
        price_usd: &str,
        total_supply: &str,
        total_variable_debt: &str,
        liquidity_rate: &str,
        variable_borrow_rate: &str,
        reserve_factor: i64,
    ) -> MarketView {
        MarketView {
            info: Some(pb::MarketInfo {
                asset: asset.to_string(),
                decimals,
                ..Default::default()
            }),
            totals: Some(pb::ReserveTotals {
                total_supply: total_supply.to_string(),
                total_stable_debt: "0".to_string(),
                total_variable_debt: total_variable_debt.to_string(),
            }),
            rates: Some(pb::ReserveRates {
                liquidity_rate: ray(liquidity_rate).to_string(),
                variable_borrow_rate: ray(variable_borrow_rate).to_string(),
                stable_borrow_rate: "0".to_string(),
            }),
            config: Some(pb::ReserveConfig {
                ltv: 7_500,
                liquidation_threshold: 8_000,
                liquidation_penalty: 500,
                reserve_factor,
                is_active: true,
                is_frozen: false,
            }),
            price: Some(pb::TokenPrice {
                asset: asset.to_string(),
                price_usd: price_usd.to_string(),
                timestamp: 0,
            }),
        }
    }

    /// Writes the present parts of `view`.
    pub fn seed(&self, view: &MarketView) {
        let asset = view.info.as_ref().map(|i| i.asset.clone()).unwrap_or_default();
        let key = keyer::market_key(&asset);
        if let Some(info) = &view.info {
            self.infos.set_if_not_exists(0, &key, info);
        }
        if let Some(totals) = &view.totals {
            self.totals.set(0, &key, totals);
        }
        if let Some(rates) = &view.rates {
            self.rates.set(0, &key, rates);
        }
        if let Some(config) = &view.config {
            self.configs.set(0, &key, config);
        }
        if let Some(price) = &view.price {
            self.prices.set(0, keyer::token_key(&asset), price);
        }
    }

    pub fn commit(&self) {
        self.infos.commit();
        self.totals.commit();
        self.rates.commit();
        self.configs.commit();
        self.prices.commit();
    }

    pub fn reader(&self) -> MemoryMarketStores<'_> {
        MarketStores {
            infos: &self.infos,
            totals: &self.totals,
            rates: &self.rates,
            configs: &self.configs,
            prices: &self.prices,
        }
    }
}

// ------------------------------------------------
//      block pipeline
// ------------------------------------------------

/// Every store of the module graph, fed block after block the way the
/// handlers in `lib.rs` feed them.
pub struct Pipeline {
    pub config: LedgerConfig,
    pub chain: MockChain,
    pub transactions: MemoryStore<pb::LendingEvent>,
    pub first_seen: MemoryStore<pb::LendingEvent>,
    pub markets: MarketFixture,
    pub token_supplies: MemoryStore<scalar::BigInt>,
    pub checkpoints: MemoryStore<i64>,
    pub revenue: MemoryStore<scalar::BigDecimal>,
    pub counts: MemoryStore<i64>,
    pub snapshot_counts: MemoryStore<i64>,
    pub volumes: MemoryStore<scalar::BigInt>,
    pub volumes_usd: MemoryStore<scalar::BigDecimal>,
    pub position_flows: MemoryStore<scalar::BigInt>,
    pub principal_floors: MemoryStore<scalar::BigInt>,
    pub position_balances: MemoryStore<pb::PositionBalance>,
}

impl Pipeline {
    pub fn new(chain: MockChain) -> Self {
        Pipeline {
            config: LedgerConfig::default(),
            chain,
            transactions: MemoryStore::default(),
            first_seen: MemoryStore::default(),
            markets: MarketFixture::default(),
            token_supplies: MemoryStore::default(),
            checkpoints: MemoryStore::default(),
            revenue: MemoryStore::default(),
            counts: MemoryStore::default(),
            snapshot_counts: MemoryStore::default(),
            volumes: MemoryStore::default(),
            volumes_usd: MemoryStore::default(),
            position_flows: MemoryStore::default(),
            principal_floors: MemoryStore::default(),
            position_balances: MemoryStore::default(),
        }
    }

    /// Runs one block through every module and closes it.
    pub fn run_block(&self, block_number: u64, timestamp: i64, events: &[LendingEvent]) -> EntityChanges {
        let config = &self.config;
        let events = pb::Events {
            events: events.iter().map(pb::LendingEvent::from).collect(),
        };
        let decoded = event::decode_events(&events.events);
        let tick = config.should_tick(block_number);
        let states = market::market_states(&self.chain, config, &decoded, tick, timestamp, block_number);
        let balances = position::position_balances(&self.chain, &decoded);

        event::store_transactions(&events, &self.transactions);
        aggregate::store_first_seen(config, &self.transactions.deltas(), &self.first_seen);
        market::store_infos(&states, &self.markets.infos);
        market::store_totals(&states, &self.markets.totals);
        market::store_rates(&states, &self.markets.rates);
        market::store_configs(&states, &self.markets.configs);
        price::store_prices(&states, &self.markets.prices);
        token::store_total_supplies(&states, &self.token_supplies);
        market::store_checkpoints(&states, &self.checkpoints);
        revenue::store_accruals(config, &states, &self.checkpoints, &self.markets.reader(), &self.revenue);
        aggregate::store_counts(
            &states,
            &self.transactions.deltas(),
            &self.first_seen.deltas(),
            &self.markets.infos.deltas(),
            &self.counts,
        );
        snapshot::store_snapshot_counts(
            config,
            &states,
            &self.transactions.deltas(),
            &self.first_seen.deltas(),
            &self.snapshot_counts,
        );
        let flows = event::applied_flows(&self.transactions.deltas());
        snapshot::store_volumes(config, &flows, &self.volumes);
        snapshot::store_volumes_usd(config, &flows, &self.markets.infos, &self.markets.prices, &self.volumes_usd);
        position::store_flows(&flows, &self.position_flows);
        position::store_floors(&self.position_flows.deltas(), &self.principal_floors);
        position::store_balances(&balances, &self.position_balances);

        let deltas = db::LedgerDeltas {
            transactions: self.transactions.deltas(),
            first_seen: self.first_seen.deltas(),
            counts: self.counts.deltas(),
            snapshot_counts: self.snapshot_counts.deltas(),
            volumes: self.volumes.deltas(),
            volumes_usd: self.volumes_usd.deltas(),
            position_flows: self.position_flows.deltas(),
            market_infos: self.markets.infos.deltas(),
            checkpoints: self.checkpoints.deltas(),
            revenue: self.revenue.deltas(),
            token_supplies: self.token_supplies.deltas(),
        };
        let mut tables = Tables::new();
        db::ledger_entity_changes(
            &mut tables,
            config,
            &states,
            &balances,
            &deltas,
            &self.markets.reader(),
            &self.principal_floors,
            &self.position_balances,
        );

        self.commit();
        tables.to_entity_changes()
    }

    fn commit(&self) {
        self.transactions.commit();
        self.first_seen.commit();
        self.markets.commit();
        self.token_supplies.commit();
        self.checkpoints.commit();
        self.revenue.commit();
        self.counts.commit();
        self.snapshot_counts.commit();
        self.volumes.commit();
        self.volumes_usd.commit();
        self.position_flows.commit();
        self.principal_floors.commit();
        self.position_balances.commit();
    }
}

/// New value of `name` on entity `(table, id)`, rendered as a string.
pub fn field(changes: &EntityChanges, table: &str, id: &str, name: &str) -> Option<String> {
    let change = changes
        .entity_changes
        .iter()
        .find(|change| change.entity == table && change.id == id)?;
    let value = change.fields.iter().find(|f| f.name == name)?.new_value.as_ref()?;
    match value.typed.as_ref()? {
        Typed::Int32(v) => Some(v.to_string()),
        Typed::Bigdecimal(v) | Typed::Bigint(v) | Typed::String(v) | Typed::Bytes(v) => Some(v.clone()),
        Typed::Bool(v) => Some(v.to_string()),
        Typed::Array(_) => None,
    }
}

pub fn has_entity(changes: &EntityChanges, table: &str, id: &str) -> bool {
    changes
        .entity_changes
        .iter()
        .any(|change| change.entity == table && change.id == id)
}
