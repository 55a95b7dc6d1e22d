use alloy::primitives::{address, Address};

pub const CLAIM_CONTRACT_ADDRESS: Address = address!("F0a66d18b46D4D5dd9947914ab3B2DDbdC19C2C0");

pub const API_V1_URL: &str = "https://be.rivalz.ai/api-v1";
pub const FRAGMENT_API_URL: &str = "https://api.rivalz.ai/fragment";

pub const DEFAULT_GAS_LIMIT: u64 = 300_000;

// FILES
pub const CONFIG_FILE_PATH: &str = "data/config.toml";
pub const PRIVATE_KEYS_FILE_PATH: &str = "data/private_keys.json";
pub const BEARER_TOKEN_FILE_PATH: &str = "data/bearer.txt";
pub const LOG_FILE_NAME: &str = "log.txt";
