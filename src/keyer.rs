// ------------------------------------------------
//      entity ids
// ------------------------------------------------
pub fn transaction_id(transaction_hash: &str, log_index: u64) -> String {
    format!("{}-{}", transaction_hash, log_index)
}

pub fn position_id(user: &str, market: &str) -> String {
    format!("{}-{}", user, market)
}

/// Splits a position id back into `(user, market)`.
pub fn parse_position_id(position_id: &str) -> Option<(&str, &str)> {
    position_id.split_once('-')
}

// ------------------------------------------------
//      snapshots
// ------------------------------------------------
pub fn bucket_id(timestamp: i64, bucket_length: i64) -> i64 {
    timestamp.div_euclid(bucket_length)
}

pub fn snapshot_id(market: &str, bucket_id: i64) -> String {
    format!("{}-{}", market, bucket_id)
}

/// Splits a snapshot id back into `(market, bucket_id)`.
pub fn parse_snapshot_id(snapshot_id: &str) -> Option<(&str, i64)> {
    let (market, bucket_id) = snapshot_id.rsplit_once('-')?;
    bucket_id.parse().ok().map(|bucket_id| (market, bucket_id))
}

pub fn daily_active_user_id(day_id: i64, user: &str) -> String {
    format!("{}-{}", day_id, user)
}

// ------------------------------------------------
//      store keys
// ------------------------------------------------
pub const TRANSACTION_COUNT: &str = "transactionCount";
pub const USER_COUNT: &str = "userCount";
pub const MARKET_COUNT: &str = "marketCount";
pub const ACTIVE_USERS: &str = "activeUsers";
pub const TOTAL_REVENUE_USD: &str = "totalRevenueUSD";
pub const PROTOCOL_SIDE_REVENUE_USD: &str = "cumulativeProtocolSideRevenueUSD";
pub const SUPPLY_SIDE_REVENUE_USD: &str = "cumulativeSupplySideRevenueUSD";
pub const NET_FLOW: &str = "net";

pub const PROTOCOL: &str = "protocol";
pub const USER: &str = "user";
pub const POSITION: &str = "position";
pub const ACTIVE: &str = "active";
pub const HOURLY: &str = "hourly";
pub const DAILY: &str = "daily";

pub fn market_key(asset: &str) -> String {
    format!("market:{}", asset)
}

pub fn token_key(asset: &str) -> String {
    format!("token:{}", asset)
}

pub fn transaction_key(transaction_id: &str) -> String {
    format!("transaction:{}", transaction_id)
}

pub fn user_key(user: &str) -> String {
    format!("{}:{}", USER, user)
}

pub fn user_field_key(user: &str, field: &str) -> String {
    format!("{}:{}:{}", USER, user, field)
}

pub fn position_key(position_id: &str) -> String {
    format!("{}:{}", POSITION, position_id)
}

pub fn position_field_key(position_id: &str, field: &str) -> String {
    format!("{}:{}:{}", POSITION, position_id, field)
}

pub fn active_user_key(day_id: i64, user: &str) -> String {
    format!("{}:{}:{}", ACTIVE, day_id, user)
}

pub fn protocol_key(field: &str) -> String {
    format!("{}:{}", PROTOCOL, field)
}

pub fn hourly_key(snapshot_id: &str, field: &str) -> String {
    format!("{}:{}:{}", HOURLY, snapshot_id, field)
}

pub fn daily_key(snapshot_id: &str, field: &str) -> String {
    format!("{}:{}:{}", DAILY, snapshot_id, field)
}
