//! JSON response envelope shared by every cached endpoint.
//!
//! The cache stores exactly what the HTTP client receives:
//!
//! ```json
//! {"status": 200, "message": "ok", "data": {...}}
//! ```

use http::StatusCode;
use serde::{Deserialize, Serialize};

/// Status/message envelope with optional payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// HTTP status code mirrored in the body.
    pub status: u16,
    /// Human-readable message.
    pub message: String,
    /// Response payload, omitted when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Creates an envelope.
    pub fn new(status: StatusCode, message: impl Into<String>, data: Option<T>) -> Self {
        ApiResponse {
            status: status.as_u16(),
            message: message.into(),
            data,
        }
    }

    /// `200 ok` with payload.
    pub fn ok(data: T) -> Self {
        Self::new(StatusCode::OK, "ok", Some(data))
    }

    /// Envelope without payload, used for errors and acknowledgements.
    pub fn message(status: StatusCode, message: impl Into<String>) -> Self {
        Self::new(status, message, None)
    }

    /// Status as [`StatusCode`], `500` if the stored number is not a valid code.
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde::de::DeserializeOwned;
    use serde_json::json;

    /// Payload type without a `Default` impl, like most handler bodies.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Alias {
        music_id: u32,
        alias: String,
    }

    fn decode<T: DeserializeOwned>(text: &str) -> T {
        serde_json::from_str(text).unwrap()
    }

    #[test]
    fn data_is_omitted_when_absent() {
        let response = ApiResponse::<()>::message(StatusCode::NOT_FOUND, "Alias not found");
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"status": 404, "message": "Alias not found"})
        );
    }

    #[test]
    fn json_round_trip_keeps_envelope() {
        let response = ApiResponse::ok(vec![101u32, 202]);
        let text = serde_json::to_string(&response).unwrap();
        let back: ApiResponse<Vec<u32>> = serde_json::from_str(&text).unwrap();
        assert_eq!(back, response);
        assert_eq!(back.status_code(), StatusCode::OK);
    }

    #[test]
    fn struct_payload_without_default_round_trips() {
        let response = ApiResponse::ok(Alias {
            music_id: 101,
            alias: "abc".to_owned(),
        });
        let text = serde_json::to_string(&response).unwrap();
        let back: ApiResponse<Alias> = decode(&text);
        assert_eq!(back, response);
    }

    #[test]
    fn missing_data_reads_as_none() {
        let back: ApiResponse<Alias> = decode(r#"{"status": 404, "message": "Alias not found"}"#);
        assert_eq!(back.data, None);
        assert_eq!(back.status_code(), StatusCode::NOT_FOUND);
    }
}
