use crate::error::DecodeError;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{value::RawValue, Value};
use thiserror::Error;

pub const JSONRPC_VERSION: &str = "2.0";

/// An outgoing call. `params` defaults to an arbitrary JSON value, but any
/// serializable type can be sent as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request<P = Value> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jsonrpc: Option<String>,
    pub method: String,
    pub params: P,
    pub id: i64,
}

impl<P> Request<P> {
    pub fn new(method: &str, params: P, id: i64) -> Self {
        Self {
            jsonrpc: None,
            method: method.to_string(),
            params,
            id,
        }
    }

    pub fn v2(method: &str, params: P, id: i64) -> Self {
        Self::new(method, params, id).with_version(JSONRPC_VERSION)
    }

    pub fn with_version(mut self, version: &str) -> Self {
        self.jsonrpc = Some(version.to_string());
        self
    }
}

/// A decoded reply envelope.
///
/// `T` is the shape the caller expects the `result` payload to have. Leaving it
/// at the default `Value` decodes whatever the server sent into generic JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response<T = Value> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl<T> Default for Response<T> {
    fn default() -> Self {
        Self {
            result: None,
            error: None,
        }
    }
}

/// The envelope as it comes off the wire. `result` stays unparsed until we
/// know which type to decode it into.
#[derive(Deserialize)]
struct RawResponse {
    #[serde(default)]
    result: Option<Box<RawValue>>,
    #[serde(default)]
    error: Option<RpcError>,
}

impl<T: DeserializeOwned> Response<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut response = Self::new();
        response.decode_into(bytes)?;
        Ok(response)
    }

    /// Populates `self` from a raw reply body. A missing or `null` result
    /// leaves `self.result` empty whatever `T` is.
    pub fn decode_into(&mut self, bytes: &[u8]) -> Result<(), DecodeError> {
        let raw: RawResponse = serde_json::from_slice(bytes).map_err(DecodeError::Envelope)?;

        self.error = raw.error;
        self.result = match raw.result {
            Some(payload) => {
                Some(serde_json::from_str(payload.get()).map_err(DecodeError::Result)?)
            }
            None => None,
        };

        Ok(())
    }
}

impl<T> Response<T> {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Splits the envelope into the result or the remote error. The remote
    /// error wins if a server sends both.
    pub fn into_result(self) -> Result<Option<T>, RpcError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.result),
        }
    }
}

/// A failure reported by the remote side inside a well-formed reply.
/// Members the server leaves out decode as zero / empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("error {code}: {message}")]
pub struct RpcError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    #[serde(transparent)]
    struct Height {
        height: u64,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct BlockInfo {
        hash: String,
        confirmations: u32,
    }

    #[test]
    fn request_omits_missing_version() {
        let request = Request::new("getinfo", Value::Null, 3);
        let encoded = serde_json::to_value(&request).unwrap();

        assert_eq!(encoded, json!({"method": "getinfo", "params": null, "id": 3}));
    }

    #[test]
    fn request_carries_version_tag() {
        let request = Request::v2("getblock", json!(["00ab", 1]), 9);
        let encoded = serde_json::to_value(&request).unwrap();

        assert_eq!(encoded["jsonrpc"], "2.0");
        assert_eq!(encoded["params"], json!(["00ab", 1]));
    }

    #[test]
    fn decodes_generic_result_without_hint() {
        let response: Response = Response::decode(br#"{"result": 42}"#).unwrap();

        assert_eq!(response.result, Some(json!(42)));
        assert!(response.error.is_none());
    }

    #[test]
    fn decodes_result_into_hinted_shape() {
        let response: Response<Height> = Response::decode(br#"{"result": 42}"#).unwrap();

        assert_eq!(response.result.unwrap().height, 42);
    }

    #[test]
    fn decodes_nested_result_into_struct() {
        let body = br#"{"result": {"hash": "00ff", "confirmations": 6}, "id": 1}"#;
        let response: Response<BlockInfo> = Response::decode(body).unwrap();

        assert_eq!(
            response.result,
            Some(BlockInfo {
                hash: "00ff".to_string(),
                confirmations: 6,
            })
        );
    }

    #[test]
    fn error_envelope_ignores_hint() {
        let body = br#"{"error": {"code": 7, "message": "boom"}}"#;

        let generic: Response = Response::decode(body).unwrap();
        let hinted: Response<Height> = Response::decode(body).unwrap();

        for error in [generic.error.clone(), hinted.error.clone()] {
            let error = error.unwrap();
            assert_eq!(error.code, 7);
            assert_eq!(error.message, "boom");
        }
        assert!(generic.result.is_none());
        assert!(hinted.result.is_none());
    }

    #[test]
    fn null_result_stays_unset() {
        let body = br#"{"result": null, "error": {"code": -1, "message": "no"}}"#;
        let response: Response<BlockInfo> = Response::decode(body).unwrap();

        assert!(response.result.is_none());
        assert_eq!(response.into_result().unwrap_err().code, -1);
    }

    #[test]
    fn partial_error_object_is_still_a_remote_error() {
        let response: Response = Response::decode(br#"{"error": {"code": -32601}}"#).unwrap();
        let error = response.error.unwrap();
        assert_eq!(error.code, -32601);
        assert_eq!(error.message, "");

        let response: Response = Response::decode(br#"{"error": {"message": "busy"}}"#).unwrap();
        let error = response.error.unwrap();
        assert_eq!(error.code, 0);
        assert_eq!(error.message, "busy");
    }

    #[test]
    fn negative_request_id() {
        let request = Request::new("getinfo", Value::Null, -4);
        let encoded = serde_json::to_value(&request).unwrap();

        assert_eq!(encoded["id"], -4);
    }

    #[test]
    fn rejects_malformed_body() {
        let err = Response::<Value>::decode(b"not json").unwrap_err();
        assert!(matches!(err, DecodeError::Envelope(_)));
    }

    #[test]
    fn rejects_result_shape_mismatch() {
        let err = Response::<BlockInfo>::decode(br#"{"result": "oops"}"#).unwrap_err();
        assert!(matches!(err, DecodeError::Result(_)));
    }

    #[test]
    fn decode_into_overwrites_previous_contents() {
        let mut response: Response = Response::decode(br#"{"result": [1, 2]}"#).unwrap();
        response
            .decode_into(br#"{"error": {"code": 1, "message": "gone"}}"#)
            .unwrap();

        assert!(response.result.is_none());
        assert!(response.is_error());
    }

    #[test]
    fn rpc_error_display() {
        let error = RpcError {
            code: -32601,
            message: "Method not found".to_string(),
        };
        assert_eq!(error.to_string(), "error -32601: Method not found");
    }
}
