//! JSON-RPC client for EVM nodes over HTTP.

use alloy_primitives::{hex, Address, B256};
use async_trait::async_trait;
use serde_json::{json, Value};

use super::{ChainClient, ChainError};
use crate::domain::events::RawLog;

pub struct HttpChainClient {
    client: reqwest::Client,
    url: String,
}

impl HttpChainClient {
    pub fn new(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }

    async fn rpc(&self, method: &str, params: Value) -> Result<Value, ChainError> {
        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response: Value = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await?
            .json()
            .await?;

        if let Some(error) = response.get("error") {
            return Err(ChainError::Rpc(error.to_string()));
        }

        response
            .get("result")
            .cloned()
            .ok_or_else(|| ChainError::Malformed("response missing 'result'".into()))
    }
}

#[async_trait]
impl ChainClient for HttpChainClient {
    async fn block_number(&self) -> Result<u64, ChainError> {
        let result = self.rpc("eth_blockNumber", json!([])).await?;
        parse_quantity(&result)
    }

    async fn filter_logs(
        &self,
        from: u64,
        to: u64,
        addresses: &[Address],
    ) -> Result<Vec<RawLog>, ChainError> {
        let addresses: Vec<String> = addresses.iter().map(|a| format!("{a:#x}")).collect();
        let result = self
            .rpc(
                "eth_getLogs",
                json!([{
                    "fromBlock": format!("0x{from:x}"),
                    "toBlock": format!("0x{to:x}"),
                    "address": addresses,
                }]),
            )
            .await?;

        let entries = result
            .as_array()
            .ok_or_else(|| ChainError::Malformed("eth_getLogs result is not an array".into()))?;

        entries.iter().map(parse_log).collect()
    }

    async fn block_timestamp(&self, number: u64) -> Result<u64, ChainError> {
        let result = self
            .rpc(
                "eth_getBlockByNumber",
                json!([format!("0x{number:x}"), false]),
            )
            .await?;
        let timestamp = result
            .get("timestamp")
            .ok_or_else(|| ChainError::Malformed(format!("block {number} has no timestamp")))?;
        parse_quantity(timestamp)
    }

    async fn call(&self, to: Address, data: Vec<u8>) -> Result<Vec<u8>, ChainError> {
        let result = self
            .rpc(
                "eth_call",
                json!([{
                    "to": format!("{to:#x}"),
                    "data": format!("0x{}", hex::encode(data)),
                }, "latest"]),
            )
            .await?;
        let raw = result
            .as_str()
            .ok_or_else(|| ChainError::Malformed("eth_call result is not a string".into()))?;
        hex::decode(raw).map_err(|e| ChainError::Malformed(format!("bad call result hex: {e}")))
    }
}

fn parse_quantity(value: &Value) -> Result<u64, ChainError> {
    let raw = value
        .as_str()
        .ok_or_else(|| ChainError::Malformed("quantity is not a string".into()))?;
    u64::from_str_radix(raw.trim_start_matches("0x"), 16)
        .map_err(|e| ChainError::Malformed(format!("bad quantity {raw}: {e}")))
}

fn parse_log(entry: &Value) -> Result<RawLog, ChainError> {
    let address = entry
        .get("address")
        .and_then(Value::as_str)
        .ok_or_else(|| ChainError::Malformed("log missing address".into()))?
        .parse::<Address>()
        .map_err(|e| ChainError::Malformed(format!("bad log address: {e}")))?;

    let topics = entry
        .get("topics")
        .and_then(Value::as_array)
        .ok_or_else(|| ChainError::Malformed("log missing topics".into()))?
        .iter()
        .map(|t| {
            t.as_str()
                .ok_or_else(|| ChainError::Malformed("topic is not a string".into()))?
                .parse::<B256>()
                .map_err(|e| ChainError::Malformed(format!("bad topic: {e}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let data = entry
        .get("data")
        .and_then(Value::as_str)
        .map(hex::decode)
        .transpose()
        .map_err(|e| ChainError::Malformed(format!("bad log data: {e}")))?
        .unwrap_or_default();

    let block_number = entry
        .get("blockNumber")
        .map(parse_quantity)
        .transpose()?
        .ok_or_else(|| ChainError::Malformed("log missing blockNumber".into()))?;

    let tx_hash = entry
        .get("transactionHash")
        .and_then(Value::as_str)
        .ok_or_else(|| ChainError::Malformed("log missing transactionHash".into()))?
        .parse::<B256>()
        .map_err(|e| ChainError::Malformed(format!("bad tx hash: {e}")))?;

    let log_index = entry.get("logIndex").map(parse_quantity).transpose()?.unwrap_or(0);

    Ok(RawLog {
        address,
        topics,
        data,
        block_number,
        tx_hash,
        log_index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_quantities() {
        assert_eq!(parse_quantity(&json!("0x0")).unwrap(), 0);
        assert_eq!(parse_quantity(&json!("0x6a5e0e4")).unwrap(), 111_534_308);
        assert!(parse_quantity(&json!(12)).is_err());
        assert!(parse_quantity(&json!("0xzz")).is_err());
    }

    #[test]
    fn parses_log_entry() {
        let entry = json!({
            "address": "0x7d29d1860bd4d3a74bbd9a03c9b043d375311dcb",
            "topics": [
                "0x0ac8bb53fac566d7afc05d8b4df11d7690a7b27bdc40b54e4060f9b21fb849bd",
                "0xc773ae81bc9a186dc6c5d70a486730a6f734578ae1a0116acd0aaaf69250d265"
            ],
            "data": "0x",
            "blockNumber": "0x6a5e0e4",
            "transactionHash": "0x3cbdbd2246a3cccb4eeb1d456ad9e0ed3b394a52c27f2a5e75c2a99cb5d44f7a",
            "logIndex": "0x2"
        });

        let log = parse_log(&entry).unwrap();
        assert_eq!(log.block_number, 111_534_308);
        assert_eq!(log.log_index, 2);
        assert_eq!(log.topics.len(), 2);
        assert!(log.data.is_empty());
    }

    #[test]
    fn missing_fields_are_malformed() {
        assert!(parse_log(&json!({"address": "0x0"})).is_err());
    }
}
