use async_trait::async_trait;
use serde_json::Value;
use sl_types::SourceError;

/// Fetches a JSON document for an endpoint path.
///
/// Implementations report every failure as a [`SourceError`]; callers decide
/// what (if anything) to do about it.
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    async fn get_json(&self, path: &str) -> Result<Value, SourceError>;

    /// Get transport name
    fn name(&self) -> &str;
}

/// HTTP GET over `reqwest`.
///
/// One attempt per call: no retry, no backoff, and no timeout beyond what the
/// underlying client does by default.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    pub name: String,
    pub base_url: String,
    pub client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Self {
        Self {
            name: "HTTP".to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_json(&self, path: &str) -> Result<Value, SourceError> {
        let url = self.url_for(path);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SourceError::Transport {
                endpoint: path.to_string(),
                message: format!("HTTP request failed: {}", e),
            })?;

        if !response.status().is_success() {
            return Err(SourceError::Status {
                endpoint: path.to_string(),
                status: response.status().as_u16(),
            });
        }

        response.json::<Value>().await.map_err(|e| {
            if e.is_decode() {
                SourceError::Decode {
                    endpoint: path.to_string(),
                    message: e.to_string(),
                }
            } else {
                SourceError::Transport {
                    endpoint: path.to_string(),
                    message: format!("Failed to read response body: {}", e),
                }
            }
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sl_types::FailureClass;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve a single canned HTTP response on a random local port.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buffer = [0u8; 1024];
            let _ = socket.read(&mut buffer).await;

            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        });

        format!("http://{addr}")
    }

    #[test]
    fn test_url_joining() {
        let transport = HttpTransport::new("http://localhost:8000/");
        assert_eq!(transport.url_for("/risks"), "http://localhost:8000/risks");
        assert_eq!(transport.url_for("api/monitoring"), "http://localhost:8000/api/monitoring");
        assert_eq!(transport.name(), "HTTP");
    }

    #[tokio::test]
    async fn test_success_returns_json() {
        let base = serve_once("200 OK", r#"{"summary":{"revenue":"9000"}}"#).await;
        let value = HttpTransport::new(&base).get_json("/monitoring/overview").await.unwrap();
        assert_eq!(value["summary"]["revenue"], "9000");
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let base = serve_once("503 Service Unavailable", r#"{"detail":"down"}"#).await;
        let err = HttpTransport::new(&base).get_json("/risks").await.unwrap_err();

        assert!(matches!(err, SourceError::Status { status: 503, .. }));
        assert_eq!(err.class(), FailureClass::Transport);
    }

    #[tokio::test]
    async fn test_invalid_json_is_decode_failure() {
        let base = serve_once("200 OK", "<html>oops</html>").await;
        let err = HttpTransport::new(&base).get_json("/api/monitoring").await.unwrap_err();
        assert_eq!(err.class(), FailureClass::Decode);
        assert_eq!(err.endpoint(), "/api/monitoring");
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_failure() {
        // Bind then drop to get a port nothing listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = HttpTransport::new(&format!("http://{addr}"))
            .get_json("/risks")
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Transport { .. }));
    }
}
