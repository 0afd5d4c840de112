// @generated
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Events {
    #[prost(message, repeated, tag="1")]
    pub events: ::prost::alloc::vec::Vec<LendingEvent>,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct LendingEvent {
    #[prost(enumeration="EventType", tag="1")]
    pub event_type: i32,
    #[prost(string, tag="2")]
    pub transaction_hash: ::prost::alloc::string::String,
    #[prost(uint64, tag="3")]
    pub log_index: u64,
    #[prost(uint64, tag="4")]
    pub timestamp: u64,
    #[prost(uint64, tag="5")]
    pub block_number: u64,
    #[prost(string, tag="6")]
    pub asset: ::prost::alloc::string::String,
    /// flow events
    #[prost(string, tag="7")]
    pub user: ::prost::alloc::string::String,
    #[prost(string, tag="8")]
    pub caller: ::prost::alloc::string::String,
    /// Integer
    #[prost(string, tag="9")]
    pub amount: ::prost::alloc::string::String,
    /// reserve data updates, ray encoded
    ///
    /// Integer
    #[prost(string, tag="10")]
    pub liquidity_rate: ::prost::alloc::string::String,
    /// Integer
    #[prost(string, tag="11")]
    pub stable_borrow_rate: ::prost::alloc::string::String,
    /// Integer
    #[prost(string, tag="12")]
    pub variable_borrow_rate: ::prost::alloc::string::String,
    /// Integer
    #[prost(string, tag="13")]
    pub liquidity_index: ::prost::alloc::string::String,
    /// Integer
    #[prost(string, tag="14")]
    pub variable_borrow_index: ::prost::alloc::string::String,
    #[prost(uint64, tag="15")]
    pub log_ordinal: u64,
}
/// Chain reads for every market a block touched.
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MarketStates {
    #[prost(message, repeated, tag="1")]
    pub states: ::prost::alloc::vec::Vec<MarketState>,
    /// refreshed prices of the discovered markets without a state
    #[prost(message, repeated, tag="2")]
    pub prices: ::prost::alloc::vec::Vec<TokenPrice>,
    #[prost(string, repeated, tag="3")]
    pub markets: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    /// false when the reserves list could not be read
    #[prost(bool, tag="4")]
    pub markets_discovered: bool,
    #[prost(bool, tag="5")]
    pub tick: bool,
    /// ordinal following every event of the block
    #[prost(uint64, tag="6")]
    pub ordinal: u64,
    #[prost(int64, tag="7")]
    pub timestamp: i64,
    #[prost(uint64, tag="8")]
    pub block_number: u64,
}
/// Each optional part is absent when its read failed.
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MarketState {
    #[prost(string, tag="1")]
    pub asset: ::prost::alloc::string::String,
    #[prost(int64, tag="2")]
    pub timestamp: i64,
    #[prost(uint64, tag="3")]
    pub block_number: u64,
    #[prost(uint64, tag="4")]
    pub ordinal: u64,
    #[prost(message, optional, tag="5")]
    pub info: ::core::option::Option<MarketInfo>,
    #[prost(message, optional, tag="6")]
    pub totals: ::core::option::Option<ReserveTotals>,
    /// rates of the block's last reserve update when there is one
    #[prost(message, optional, tag="7")]
    pub rates: ::core::option::Option<ReserveRates>,
    #[prost(message, optional, tag="8")]
    pub config: ::core::option::Option<ReserveConfig>,
    #[prost(message, optional, tag="9")]
    pub price: ::core::option::Option<TokenPrice>,
    /// Integer, empty when unavailable
    #[prost(string, tag="10")]
    pub token_total_supply: ::prost::alloc::string::String,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MarketInfo {
    #[prost(string, tag="1")]
    pub asset: ::prost::alloc::string::String,
    #[prost(string, tag="2")]
    pub output_token: ::prost::alloc::string::String,
    #[prost(string, tag="3")]
    pub symbol: ::prost::alloc::string::String,
    #[prost(string, tag="4")]
    pub name: ::prost::alloc::string::String,
    #[prost(uint64, tag="5")]
    pub decimals: u64,
    #[prost(int64, tag="6")]
    pub created_timestamp: i64,
    #[prost(uint64, tag="7")]
    pub created_block_number: u64,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReserveTotals {
    /// Integer
    #[prost(string, tag="1")]
    pub total_supply: ::prost::alloc::string::String,
    /// Integer
    #[prost(string, tag="2")]
    pub total_stable_debt: ::prost::alloc::string::String,
    /// Integer
    #[prost(string, tag="3")]
    pub total_variable_debt: ::prost::alloc::string::String,
}
/// ray encoded
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReserveRates {
    /// Integer
    #[prost(string, tag="1")]
    pub liquidity_rate: ::prost::alloc::string::String,
    /// Integer
    #[prost(string, tag="2")]
    pub variable_borrow_rate: ::prost::alloc::string::String,
    /// Integer
    #[prost(string, tag="3")]
    pub stable_borrow_rate: ::prost::alloc::string::String,
}
/// basis points
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReserveConfig {
    #[prost(int64, tag="1")]
    pub ltv: i64,
    #[prost(int64, tag="2")]
    pub liquidation_threshold: i64,
    #[prost(int64, tag="3")]
    pub liquidation_penalty: i64,
    #[prost(int64, tag="4")]
    pub reserve_factor: i64,
    #[prost(bool, tag="5")]
    pub is_active: bool,
    #[prost(bool, tag="6")]
    pub is_frozen: bool,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TokenPrice {
    #[prost(string, tag="1")]
    pub asset: ::prost::alloc::string::String,
    /// Decimal
    #[prost(string, tag="2")]
    pub price_usd: ::prost::alloc::string::String,
    #[prost(int64, tag="3")]
    pub timestamp: i64,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PositionBalances {
    #[prost(message, repeated, tag="1")]
    pub balances: ::prost::alloc::vec::Vec<PositionBalance>,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PositionBalance {
    #[prost(string, tag="1")]
    pub user: ::prost::alloc::string::String,
    #[prost(string, tag="2")]
    pub market: ::prost::alloc::string::String,
    /// Integer
    #[prost(string, tag="3")]
    pub supplied: ::prost::alloc::string::String,
    /// Integer
    #[prost(string, tag="4")]
    pub variable_debt: ::prost::alloc::string::String,
    /// Integer
    #[prost(string, tag="5")]
    pub stable_debt: ::prost::alloc::string::String,
    #[prost(bool, tag="6")]
    pub is_collateral: bool,
    #[prost(int64, tag="7")]
    pub timestamp: i64,
    #[prost(uint64, tag="8")]
    pub ordinal: u64,
}
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum EventType {
    Unspecified = 0,
    Supply = 1,
    Withdraw = 2,
    Borrow = 3,
    Repay = 4,
    ReserveDataUpdated = 5,
}
impl EventType {
    /// String value of the enum field names used in the ProtoBuf definition.
    ///
    /// The values are not transformed in any way and thus are considered stable
    /// (if the ProtoBuf definition does not change) and safe for programmatic use.
    pub fn as_str_name(&self) -> &'static str {
        match self {
            EventType::Unspecified => "EVENT_TYPE_UNSPECIFIED",
            EventType::Supply => "SUPPLY",
            EventType::Withdraw => "WITHDRAW",
            EventType::Borrow => "BORROW",
            EventType::Repay => "REPAY",
            EventType::ReserveDataUpdated => "RESERVE_DATA_UPDATED",
        }
    }
    /// Creates an enum from field names used in the ProtoBuf definition.
    pub fn from_str_name(value: &str) -> ::core::option::Option<Self> {
        match value {
            "EVENT_TYPE_UNSPECIFIED" => Some(Self::Unspecified),
            "SUPPLY" => Some(Self::Supply),
            "WITHDRAW" => Some(Self::Withdraw),
            "BORROW" => Some(Self::Borrow),
            "REPAY" => Some(Self::Repay),
            "RESERVE_DATA_UPDATED" => Some(Self::ReserveDataUpdated),
            _ => None,
        }
    }
}
