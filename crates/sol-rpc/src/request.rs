//! JSON-RPC 2.0 envelopes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RpcError;

pub const JSONRPC_VERSION: &str = "2.0";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpcRequest {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: String,
    pub params: Value,
}

impl RpcRequest {
    pub fn new(id: u64, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            method: method.into(),
            params,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponseEnvelope {
    /// `null` when the node could not parse the request.
    #[serde(default)]
    pub id: Option<u64>,
    /// Absent and `null` both land here as `Value::Null`.
    #[serde(default)]
    pub result: Value,
    #[serde(default)]
    pub error: Option<RpcErrorObject>,
}

impl RpcResponseEnvelope {
    pub fn into_result(self) -> Result<Value, RpcError> {
        match self.error {
            Some(err) => Err(RpcError::Rpc {
                code: err.code,
                message: err.message,
                data: err.data,
            }),
            None => Ok(self.result),
        }
    }
}

/// Context attached to every `{context, value}` shaped result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcResponseContext {
    pub slot: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcResponse<T> {
    pub context: RpcResponseContext,
    pub value: T,
}

/// Parse a single-request reply, checking that it answers request `id`.
pub fn parse_response(body: &str, id: u64) -> Result<Value, RpcError> {
    let envelope: RpcResponseEnvelope = serde_json::from_str(body)?;
    if let Some(got) = envelope.id {
        if got != id && envelope.error.is_none() {
            return Err(RpcError::InvalidResponse(format!(
                "response id {got} does not match request id {id}"
            )));
        }
    }
    envelope.into_result()
}

/// Parse a batch reply and return one result per id in `ids`, in that order.
///
/// Nodes may answer batch entries in any order; entries are matched back by
/// id. A non-array reply means the whole batch was rejected.
pub fn parse_batch_response(body: &str, ids: &[u64]) -> Result<Vec<Result<Value, RpcError>>, RpcError> {
    let value: Value = serde_json::from_str(body)?;
    let entries: Vec<RpcResponseEnvelope> = match value {
        Value::Array(_) => serde_json::from_value(value)?,
        other => {
            let envelope: RpcResponseEnvelope = serde_json::from_value(other)?;
            envelope.into_result()?;
            return Err(RpcError::InvalidResponse("expected a batch reply".into()));
        }
    };

    let mut slots: Vec<Option<RpcResponseEnvelope>> = ids.iter().map(|_| None).collect();
    for entry in entries {
        let Some(id) = entry.id else { continue };
        if let Some(pos) = ids.iter().position(|&want| want == id) {
            slots[pos] = Some(entry);
        }
    }

    Ok(slots
        .into_iter()
        .zip(ids)
        .map(|(slot, id)| match slot {
            Some(entry) => entry.into_result(),
            None => Err(RpcError::InvalidResponse(format!("no reply for batch id {id}"))),
        })
        .collect())
}
