//! Normalized collaborator responses.

use serde::de::DeserializeOwned;

use crate::SiftError;

/// Status carried by a response that never arrived.
pub const NETWORK_ERROR_STATUS: u16 = 0;

/// A collaborator response.
///
/// Transport failures are folded into this type with
/// [`NETWORK_ERROR_STATUS`], so callers always branch on `status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// The HTTP status code, or `0` when nothing was received.
    pub status: u16,
    /// Reason phrase, or a failure code such as `TIMEOUT`.
    pub status_text: String,
    /// The response body.
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// Create a new response.
    pub fn new(status: u16, status_text: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            body,
        }
    }

    /// Synthesize the response for a request that got no answer.
    pub fn network_failure(code: impl Into<String>) -> Self {
        Self::new(NETWORK_ERROR_STATUS, code, Vec::new())
    }

    /// Build a response with a JSON body.
    pub fn from_json(status: u16, value: &serde_json::Value) -> Self {
        Self::new(status, "", value.to_string().into_bytes())
    }

    /// Check if the response was successful (2xx status).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Check if no response was received.
    pub fn is_network_error(&self) -> bool {
        self.status == NETWORK_ERROR_STATUS
    }

    /// Check if the session was rejected.
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    /// Check if the response was a server error (5xx status).
    pub fn is_server_error(&self) -> bool {
        self.status >= 500
    }

    /// Get the response body as text.
    pub fn text(&self) -> Result<String, SiftError> {
        String::from_utf8(self.body.clone())
            .map_err(|e| SiftError::Decode(format!("Invalid UTF-8: {}", e)))
    }

    /// Parse the response body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, SiftError> {
        serde_json::from_slice(&self.body).map_err(|e| SiftError::Decode(e.to_string()))
    }

    /// Map the status onto the error taxonomy, keeping successes.
    pub fn into_result(self) -> Result<Self, SiftError> {
        if self.is_success() {
            Ok(self)
        } else if self.is_network_error() {
            Err(SiftError::Network(self.status_text))
        } else if self.is_unauthorized() {
            Err(SiftError::Unauthorized)
        } else if self.is_server_error() {
            Err(SiftError::Server {
                status: self.status,
            })
        } else {
            Err(SiftError::UnexpectedStatus {
                status: self.status,
                text: self.status_text,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn make_response(status: u16) -> ApiResponse {
        ApiResponse::new(status, "", Vec::new())
    }

    #[test]
    fn test_success_range() {
        assert!(make_response(200).is_success());
        assert!(make_response(204).is_success());
        assert!(!make_response(301).is_success());
        assert!(!make_response(0).is_success());
    }

    #[test]
    fn test_network_failure_maps_to_network_error() {
        let err = ApiResponse::network_failure("TIMEOUT").into_result().unwrap_err();
        assert!(err.is_network());
        assert_eq!(err.to_string(), "Network error: TIMEOUT");
    }

    #[test]
    fn test_unauthorized_maps_to_auth_failure() {
        let err = make_response(401).into_result().unwrap_err();
        assert!(err.is_auth_failure());
    }

    #[test]
    fn test_server_error_mapping() {
        let err = make_response(503).into_result().unwrap_err();
        assert!(matches!(err, SiftError::Server { status: 503 }));
    }

    #[test]
    fn test_other_status_mapping() {
        let err = ApiResponse::new(404, "Not Found", Vec::new())
            .into_result()
            .unwrap_err();
        assert!(matches!(
            err,
            SiftError::UnexpectedStatus { status: 404, ref text } if text == "Not Found"
        ));
    }

    #[test]
    fn test_json_body() {
        let resp = ApiResponse::from_json(200, &json!({"token": "abc"}));
        let value: serde_json::Value = resp.json().unwrap();
        assert_eq!(value["token"], "abc");
    }

    #[test]
    fn test_json_invalid() {
        let resp = ApiResponse::new(200, "OK", b"not json".to_vec());
        let result: Result<serde_json::Value, _> = resp.json();
        assert!(matches!(result, Err(SiftError::Decode(_))));
    }
}
