//! Backend REST API Client
//!
//! Thin `reqwest` wrapper with one hard contract: [`ApiClient::request`]
//! never fails. Transport errors, non-2xx statuses and unparseable
//! bodies all come back inside [`ApiResponse`], so callers branch on a
//! success flag instead of catching errors. A single attempt is made per
//! call: no retries, no backoff, no client-side timeout.

use reqwest::{multipart, Method};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::store::Store;

/// HTTP client for the glycemia backend.
///
/// Cheap to clone; the underlying connection pool and store handle are
/// shared.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    store: Arc<RwLock<Store>>,
}

/// Outcome of one API call. Always returned, never thrown.
#[derive(Debug)]
pub struct ApiResponse {
    /// True only for reachable 2xx responses.
    pub success: bool,
    /// HTTP status code; 0 when the backend was unreachable.
    pub status: u16,
    /// Response body: JSON when it parses, raw text otherwise.
    pub data: Payload,
    /// Transport error description, when `status == 0`.
    pub error: Option<String>,
}

/// Response body, parsed opportunistically.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(serde_json::Value),
    Text(String),
    Empty,
}

/// Request body shapes the client can carry. `None` and `Json` both
/// declare `Content-Type: application/json`.
pub enum RequestBody {
    None,
    /// Serialized as JSON text.
    Json(serde_json::Value),
    /// Passed through untouched; no content-type header is set so the
    /// transport can pick the multipart boundary.
    Multipart(multipart::Form),
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, store: Arc<RwLock<Store>>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            store,
        }
    }

    /// Shared handle to the persistent store.
    pub fn store(&self) -> Arc<RwLock<Store>> {
        Arc::clone(&self.store)
    }

    /// `GET` convenience wrapper.
    pub async fn get(&self, endpoint: &str) -> ApiResponse {
        self.request(endpoint, Method::GET, RequestBody::None).await
    }

    /// `POST` with a JSON body.
    pub async fn post_json(&self, endpoint: &str, body: impl serde::Serialize) -> ApiResponse {
        let body = match serde_json::to_value(body) {
            Ok(value) => RequestBody::Json(value),
            Err(e) => {
                // Serialization of our own request types cannot fail in
                // practice; report it like a transport failure if it does.
                return ApiResponse {
                    success: false,
                    status: 0,
                    data: Payload::Empty,
                    error: Some(format!("request serialization failed: {e}")),
                };
            }
        };
        self.request(endpoint, Method::POST, body).await
    }

    /// Issue one request against the backend.
    ///
    /// Attaches `Authorization: Bearer <token>` whenever the store holds
    /// a token. The response body is read as text first and parsed as
    /// JSON opportunistically; callers must treat [`ApiResponse::data`]
    /// as possibly-non-JSON.
    pub async fn request(&self, endpoint: &str, method: Method, body: RequestBody) -> ApiResponse {
        let request_id = uuid::Uuid::new_v4();
        let url = format!("{}{}", self.base_url, endpoint);

        let mut builder = self.http.request(method.clone(), &url);

        if let Some(token) = self.store.read().await.token() {
            builder = builder.bearer_auth(token);
        }

        // Every request declares JSON except multipart, where the
        // transport must pick the boundary itself.
        builder = match body {
            RequestBody::None => builder.header(reqwest::header::CONTENT_TYPE, "application/json"),
            RequestBody::Json(value) => builder
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(value.to_string()),
            RequestBody::Multipart(form) => builder.multipart(form),
        };

        tracing::debug!(%request_id, %method, %url, "api request");

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(%request_id, %url, error = %e, "api request failed");
                return ApiResponse {
                    success: false,
                    status: 0,
                    data: Payload::Empty,
                    error: Some(e.to_string()),
                };
            }
        };

        let status = response.status().as_u16();
        let success = response.status().is_success();

        // Body read failure is tolerated the same way a missing body is.
        let text = response.text().await.unwrap_or_default();

        tracing::debug!(%request_id, status, success, "api response");

        ApiResponse {
            success,
            status,
            data: parse_payload(&text),
            error: None,
        }
    }
}

fn parse_payload(text: &str) -> Payload {
    if text.is_empty() {
        return Payload::Empty;
    }
    match serde_json::from_str(text) {
        Ok(value) => Payload::Json(value),
        Err(_) => Payload::Text(text.to_string()),
    }
}

impl ApiResponse {
    /// Decode the JSON payload into a typed value, if it is JSON and
    /// matches the expected shape.
    pub fn decode<T: serde::de::DeserializeOwned>(&self) -> Option<T> {
        match &self.data {
            Payload::Json(value) => serde_json::from_value(value.clone()).ok(),
            _ => None,
        }
    }

    /// Backend error message (`{"message": ...}`), when present.
    pub fn message(&self) -> Option<&str> {
        match &self.data {
            Payload::Json(value) => value.get("message").and_then(|m| m.as_str()),
            _ => None,
        }
    }

    /// Human-readable failure description for status lines and alerts.
    pub fn describe_failure(&self) -> String {
        if let Some(message) = self.message() {
            return message.to_string();
        }
        if let Some(error) = &self.error {
            return format!("network error: {error}");
        }
        format!("request failed (status {})", self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use tempfile::tempdir;

    use crate::store::Store;

    fn test_store() -> Arc<RwLock<Store>> {
        let path = tempdir().unwrap().into_path().join("store.toml");
        Arc::new(RwLock::new(Store::open(path).unwrap()))
    }

    /// Answer exactly one connection with a canned HTTP response and
    /// hand back the raw request bytes.
    fn serve_once(
        listener: std::net::TcpListener,
        status_line: &'static str,
        body: &'static str,
    ) -> std::thread::JoinHandle<String> {
        std::thread::spawn(move || {
            let (mut socket, _) = listener.accept().unwrap();
            let mut buf = [0u8; 2048];
            let n = socket.read(&mut buf).unwrap();
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).unwrap();
            String::from_utf8_lossy(&buf[..n]).into_owned()
        })
    }

    #[tokio::test]
    async fn transport_failure_reports_status_zero() {
        // Bind-then-drop yields a local port with nothing listening.
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();

        let api = ApiClient::new(format!("http://127.0.0.1:{port}"), test_store());
        let response = api.get("/api/records").await;

        assert!(!response.success);
        assert_eq!(response.status, 0);
        assert!(response.error.is_some());
        assert_eq!(response.data, Payload::Empty);
    }

    #[tokio::test]
    async fn success_mirrors_the_2xx_class() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = serve_once(listener, "200 OK", r#"{"message":"ok"}"#);

        let api = ApiClient::new(format!("http://127.0.0.1:{port}"), test_store());
        let response = api.get("/api/analyze").await;
        let request = server.join().unwrap();

        assert!(response.success);
        assert_eq!(response.status, 200);
        assert_eq!(response.message(), Some("ok"));
        // Bodiless requests still declare JSON.
        assert!(request
            .to_lowercase()
            .contains("content-type: application/json"));
    }

    #[tokio::test]
    async fn reachable_error_status_is_not_success() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = serve_once(listener, "404 Not Found", r#"{"message":"no such record"}"#);

        let api = ApiClient::new(format!("http://127.0.0.1:{port}"), test_store());
        let response = api.get("/api/records").await;
        server.join().unwrap();

        assert!(!response.success);
        assert_eq!(response.status, 404);
        // Reachable failures carry the HTTP status, not a transport error.
        assert!(response.error.is_none());
        assert_eq!(response.describe_failure(), "no such record");
    }

    #[test]
    fn payload_parses_json_opportunistically() {
        assert_eq!(
            parse_payload(r#"{"token": "abc"}"#),
            Payload::Json(serde_json::json!({"token": "abc"}))
        );
        assert_eq!(
            parse_payload("<html>502 Bad Gateway</html>"),
            Payload::Text("<html>502 Bad Gateway</html>".to_string())
        );
        assert_eq!(parse_payload(""), Payload::Empty);
    }

    #[test]
    fn failure_description_prefers_backend_message() {
        let resp = ApiResponse {
            success: false,
            status: 401,
            data: Payload::Json(serde_json::json!({"message": "Invalid credentials"})),
            error: None,
        };
        assert_eq!(resp.describe_failure(), "Invalid credentials");

        let transport = ApiResponse {
            success: false,
            status: 0,
            data: Payload::Empty,
            error: Some("connection refused".to_string()),
        };
        assert_eq!(
            transport.describe_failure(),
            "network error: connection refused"
        );

        let bare = ApiResponse {
            success: false,
            status: 500,
            data: Payload::Text("oops".to_string()),
            error: None,
        };
        assert_eq!(bare.describe_failure(), "request failed (status 500)");
    }

    #[test]
    fn decode_requires_matching_json() {
        let resp = ApiResponse {
            success: true,
            status: 200,
            data: Payload::Json(serde_json::json!([{
                "value": 100.0,
                "timestamp": "2024-01-01T10:00"
            }])),
            error: None,
        };
        let records: Option<Vec<crate::api::MeasurementRecord>> = resp.decode();
        assert_eq!(records.unwrap().len(), 1);

        let text = ApiResponse {
            success: true,
            status: 200,
            data: Payload::Text("not json".to_string()),
            error: None,
        };
        let none: Option<Vec<crate::api::MeasurementRecord>> = text.decode();
        assert!(none.is_none());
    }
}
