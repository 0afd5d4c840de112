use substreams::hex;

// Aave V3 Ethereum deployment
pub const AAVE_V3_POOL: [u8; 20] = hex!("87870bca3f3fd6335c3f4ce8392d69350b4fa4e2");
pub const AAVE_V3_DATA_PROVIDER: [u8; 20] = hex!("7b4eb56e7cd4b454ba8ff71e4518426369a138a3");
pub const AAVE_V3_ORACLE: [u8; 20] = hex!("54586be62e3c3580375ae3723c145253060ca0c2");

pub const PROTOCOL_ID: &str = "aave-v3";

// ------------------------------------------------
//      Pool event topics
// ------------------------------------------------
// Supply(address,address,address,uint256,uint16)
pub const SUPPLY_TOPIC: [u8; 32] = hex!("2b627736bca15cd5381dcf80b0bf11fd197d01a037c52b927a881a10fb73ba61");
// Withdraw(address,address,address,uint256)
pub const WITHDRAW_TOPIC: [u8; 32] = hex!("3115d1449a7b732c986cba18244e897a450f61e1bb8d589cd2e69e6c8924f9f7");
// Borrow(address,address,address,uint256,uint8,uint256,uint16)
pub const BORROW_TOPIC: [u8; 32] = hex!("b3d084820fb1a9decffb176436bd02558d15fac9b0ddfed8c465bc7359d7dce0");
// Repay(address,address,address,uint256,bool)
pub const REPAY_TOPIC: [u8; 32] = hex!("a534c8dbe71f871f9f3530e97a74601fea17b426cae02e1c5aee42c96c784051");
// ReserveDataUpdated(address,uint256,uint256,uint256,uint256,uint256)
pub const RESERVE_DATA_UPDATED_TOPIC: [u8; 32] =
    hex!("804c9b842b2748a22bb64b345453a3de7ca54a6ca45ce00d415894979e22897a");

// ------------------------------------------------
//      eth_call selectors
// ------------------------------------------------
pub const DECIMALS_SELECTOR: [u8; 4] = hex!("313ce567");
pub const NAME_SELECTOR: [u8; 4] = hex!("06fdde03");
pub const SYMBOL_SELECTOR: [u8; 4] = hex!("95d89b41");
pub const TOTAL_SUPPLY_SELECTOR: [u8; 4] = hex!("18160ddd");

pub const GET_RESERVES_LIST_SELECTOR: [u8; 4] = hex!("d1946dbc");
pub const GET_RESERVE_DATA_SELECTOR: [u8; 4] = hex!("35ea6a75");
pub const GET_RESERVE_CONFIGURATION_DATA_SELECTOR: [u8; 4] = hex!("3e150141");
pub const GET_RESERVE_TOKENS_ADDRESSES_SELECTOR: [u8; 4] = hex!("d2493b6c");
pub const GET_USER_RESERVE_DATA_SELECTOR: [u8; 4] = hex!("28dd2d01");

pub const GET_ASSET_PRICE_SELECTOR: [u8; 4] = hex!("b3596f07");
pub const BASE_CURRENCY_UNIT_SELECTOR: [u8; 4] = hex!("8c89b64f");
