use bigdecimal::{BigDecimal, One, Zero};
use num_bigint::BigInt;
use std::ops::{Div, Mul, Sub};
use std::str::FromStr;
use substreams::{log, scalar};

pub fn safe_div(amount0: &BigDecimal, amount1: &BigDecimal) -> BigDecimal {
    if amount1.is_zero() {
        BigDecimal::zero()
    } else {
        amount0.div(amount1)
    }
}

/// `10^decimals` as a decimal.
pub fn exponent_to_big_decimal(decimals: u64) -> BigDecimal {
    BigDecimal::new(BigInt::one(), -(decimals as i64))
}

/// Scales a raw integer amount down by `decimals`, ex: `1_500_000` with 6 decimals is `1.5`.
pub fn to_decimal(amount: &BigInt, decimals: u64) -> BigDecimal {
    BigDecimal::new(amount.clone(), decimals as i64)
}

/// Converts a ray (27 decimals fixed point) rate to a plain decimal.
pub fn ray_to_decimal(rate: &BigInt, ray_decimals: u64) -> BigDecimal {
    to_decimal(rate, ray_decimals)
}

/// Annualized rate as a percentage, ex: a ray-encoded 5% yields `5`.
pub fn ray_to_percentage(rate: &BigInt, ray_decimals: u64) -> BigDecimal {
    ray_to_decimal(rate, ray_decimals).mul(BigDecimal::from(100))
}

/// `numerator / denominator * 100`, zero when the denominator is zero.
pub fn percentage(numerator: &BigInt, denominator: &BigInt) -> BigDecimal {
    if denominator.is_zero() {
        return BigDecimal::zero();
    }
    let ratio = safe_div(
        &BigDecimal::new(numerator.clone(), 0),
        &BigDecimal::new(denominator.clone(), 0),
    );
    ratio.mul(BigDecimal::from(100))
}

/// Splits `amount` into `(protocol_side, supply_side)` using a reserve factor in basis points.
pub fn split_by_reserve_factor(amount: &BigDecimal, reserve_factor_bps: i64, basis_points: i64) -> (BigDecimal, BigDecimal) {
    let protocol_side = safe_div(
        &amount.mul(BigDecimal::from(reserve_factor_bps)),
        &BigDecimal::from(basis_points),
    );
    let supply_side = amount.sub(&protocol_side);
    (protocol_side, supply_side)
}

/// Parses an integer carried as a string, empty or malformed values read as zero.
pub fn parse_bigint(value: &str) -> BigInt {
    if value.is_empty() {
        return BigInt::zero();
    }
    BigInt::from_str(value).unwrap_or_else(|e| {
        log::debug!("invalid integer '{}': {}", value, e);
        BigInt::zero()
    })
}

pub fn parse_bigdecimal(value: &str) -> BigDecimal {
    if value.is_empty() {
        return BigDecimal::zero();
    }
    BigDecimal::from_str(value).unwrap_or_else(|e| {
        log::debug!("invalid decimal '{}': {}", value, e);
        BigDecimal::zero()
    })
}

pub fn to_scalar_bigint(value: &BigInt) -> scalar::BigInt {
    scalar::BigInt::from(value.clone())
}

pub fn to_scalar_decimal(value: &BigDecimal) -> scalar::BigDecimal {
    scalar::BigDecimal::from(value.clone())
}
