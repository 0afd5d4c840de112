use ethabi::{ParamType, Token};
use num_bigint::{BigInt, Sign};
use substreams::Hex;

use crate::error::QueryError;

pub fn format_address(bytes: &[u8]) -> String {
    format!("0x{}", Hex(bytes))
}

/// Indexed address parameters are left padded to 32 bytes in the topic.
pub fn address_from_topic(topic: &[u8]) -> Option<String> {
    if topic.len() != 32 {
        return None;
    }
    Some(format_address(&topic[12..32]))
}

pub fn parse_address(address: &str) -> Option<ethabi::Address> {
    let stripped = address.strip_prefix("0x").unwrap_or(address);
    match hex::decode(stripped) {
        Ok(bytes) if bytes.len() == 20 => Some(ethabi::Address::from_slice(&bytes)),
        _ => None,
    }
}

pub fn uint_to_bigint(value: &ethabi::Uint) -> BigInt {
    let mut bytes = [0u8; 32];
    value.to_big_endian(&mut bytes);
    BigInt::from_bytes_be(Sign::Plus, &bytes)
}

pub fn token_to_bigint(token: Token, what: &'static str) -> Result<BigInt, QueryError> {
    token
        .into_uint()
        .map(|value| uint_to_bigint(&value))
        .ok_or_else(|| QueryError::decode(what, "expected uint"))
}

pub fn token_to_bool(token: Token, what: &'static str) -> Result<bool, QueryError> {
    token
        .into_bool()
        .ok_or_else(|| QueryError::decode(what, "expected bool"))
}

pub fn token_to_address(token: Token, what: &'static str) -> Result<String, QueryError> {
    token
        .into_address()
        .map(|address| format_address(address.as_bytes()))
        .ok_or_else(|| QueryError::decode(what, "expected address"))
}

pub fn read_uint(input: &[u8], what: &'static str) -> Result<BigInt, QueryError> {
    let mut values = ethabi::decode(&[ParamType::Uint(256)], input).map_err(|e| QueryError::decode(what, e))?;
    match values.pop() {
        Some(token) => token_to_bigint(token, what),
        None => Err(QueryError::decode(what, "empty response")),
    }
}

/// Reads an ABI encoded `string`, falling back to the `bytes32` layout some
/// older tokens (MKR, SAI) return for `name()` and `symbol()`.
pub fn read_string(input: &[u8], what: &'static str) -> Result<String, QueryError> {
    if let Ok(mut values) = ethabi::decode(&[ParamType::String], input) {
        if let Some(Token::String(value)) = values.pop() {
            return Ok(value);
        }
    }

    if input.len() == 32 {
        return Ok(read_string_from_bytes(input));
    }

    Err(QueryError::decode(what, "neither string nor bytes32"))
}

pub fn read_string_from_bytes(input: &[u8]) -> String {
    // trailing zero bytes are padding
    if let Some(last) = input.iter().rev().position(|&pos| pos != 0) {
        return String::from_utf8_lossy(&input[0..input.len() - last]).to_string();
    }

    // use case when all the bytes are set to 0
    "".to_string()
}
