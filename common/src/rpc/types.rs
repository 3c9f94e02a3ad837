use super::error::{RpcError, INTERNAL_ERROR};
use primitive_types::{H160, H256, U256};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSON_RPC_VERSION: &str = "2.0";

// Block tag used for every read against the current head
pub const LATEST_BLOCK: &str = "latest";

/// Control and read methods understood by development nodes
pub mod methods {
    pub const MINE: &str = "evm_mine";
    pub const INCREASE_TIME: &str = "evm_increaseTime";
    pub const SET_NEXT_BLOCK_TIMESTAMP: &str = "evm_setNextBlockTimestamp";
    pub const SNAPSHOT: &str = "evm_snapshot";
    pub const REVERT: &str = "evm_revert";
    pub const GET_BLOCK_BY_NUMBER: &str = "eth_getBlockByNumber";
    pub const BLOCK_NUMBER: &str = "eth_blockNumber";
    pub const GET_BALANCE: &str = "eth_getBalance";
    pub const SEND_TRANSACTION: &str = "eth_sendTransaction";
    pub const ESTIMATE_GAS: &str = "eth_estimateGas";
    pub const ACCOUNTS: &str = "eth_accounts";
    pub const CHAIN_ID: &str = "eth_chainId";
}

/// `0x` prefixed, minimal hex encoding of unsigned integers
pub mod quantity {
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    pub fn encode(value: u64) -> String {
        format!("0x{:x}", value)
    }

    pub fn decode(text: &str) -> Option<u64> {
        let digits = text.strip_prefix("0x")?;
        if digits.is_empty() {
            return None;
        }
        u64::from_str_radix(digits, 16).ok()
    }

    /// Accepts both a JSON number and a hex quantity string
    pub fn from_value(value: &Value) -> Option<u64> {
        match value {
            Value::Number(number) => number.as_u64(),
            Value::String(text) => decode(text),
            _ => None,
        }
    }

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&encode(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let text = String::deserialize(deserializer)?;
        decode(&text).ok_or_else(|| D::Error::custom(format!("invalid quantity '{}'", text)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

impl RpcRequest {
    pub fn new(id: u64, method: &str, params: Value) -> Self {
        Self {
            jsonrpc: JSON_RPC_VERSION.to_string(),
            id: Value::from(id),
            method: method.to_string(),
            params,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl From<&RpcError> for RpcErrorObject {
    fn from(err: &RpcError) -> Self {
        let (code, message) = match err {
            RpcError::Server { code, message } => (*code, message.clone()),
            other => (INTERNAL_ERROR, other.to_string()),
        };
        Self {
            code,
            message,
            data: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcErrorObject>,
}

impl RpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSON_RPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Value, error: RpcErrorObject) -> Self {
        Self {
            jsonrpc: JSON_RPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }

    // A `null` result deserializes as `None`, which is still a success
    pub fn into_result(self) -> Result<Value, RpcError> {
        match self.error {
            Some(error) => Err(RpcError::server(error.code, error.message)),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }
}

/// Header fields of a block as returned by `eth_getBlockByNumber`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockRecord {
    #[serde(with = "quantity")]
    pub number: u64,
    pub hash: H256,
    pub parent_hash: H256,
    #[serde(with = "quantity")]
    pub timestamp: u64,
}

/// Call or transaction parameters for `eth_sendTransaction` and `eth_estimateGas`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub from: H160,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<H160>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl TransactionRequest {
    pub fn new(from: H160) -> Self {
        Self {
            from,
            ..Default::default()
        }
    }

    pub fn to(mut self, to: H160) -> Self {
        self.to = Some(to);
        self
    }

    pub fn value(mut self, value: U256) -> Self {
        self.value = Some(value);
        self
    }

    pub fn gas(mut self, gas: U256) -> Self {
        self.gas = Some(gas);
        self
    }

    pub fn data(mut self, data: &[u8]) -> Self {
        self.data = Some(format!("0x{}", hex::encode(data)));
        self
    }

    /// Decoded calldata, empty when absent
    pub fn data_bytes(&self) -> Result<Vec<u8>, hex::FromHexError> {
        match &self.data {
            Some(data) => hex::decode(data.strip_prefix("0x").unwrap_or(data)),
            None => Ok(Vec::new()),
        }
    }
}
