use anyhow::{Context, Result};
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::config::Config;
use crate::error::TransportError;

const MAX_ATTEMPTS: u32 = 3;

/// Retrieves page markup over HTTP
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Fetches `url`, retrying timeouts, connection failures and 5xx responses
    pub async fn fetch(&self, url: &Url) -> Result<String, TransportError> {
        let mut attempt = 0;
        loop {
            match self.try_fetch(url).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_transient() && attempt + 1 < MAX_ATTEMPTS => {
                    let backoff = Duration::from_millis(500 * 2_u64.pow(attempt));
                    warn!(%url, attempt = attempt + 1, error = %e, "fetch failed, retrying");
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn try_fetch(&self, url: &Url) -> Result<String, TransportError> {
        let response = self
            .client
            .get(url.as_str())
            .header(ACCEPT, "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.5")
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| TransportError::from_reqwest(url.as_str(), e))?;
        debug!(%url, bytes = body.len(), "fetched page");

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves the given raw HTTP responses, one per connection, in order
    async fn serve(responses: Vec<String>) -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            for response in responses {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                socket.write_all(response.as_bytes()).await.unwrap();
                let _ = socket.shutdown().await;
            }
        });
        Url::parse(&format!("http://{}/release-notes", addr)).unwrap()
    }

    fn response(status: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        )
    }

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let url = serve(vec![response("200 OK", "<h2>2025-06-01</h2>")]).await;
        let fetcher = PageFetcher::new(&Config::default()).unwrap();
        assert_eq!(fetcher.fetch(&url).await.unwrap(), "<h2>2025-06-01</h2>");
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let url = serve(vec![response("404 Not Found", "")]).await;
        let fetcher = PageFetcher::new(&Config::default()).unwrap();
        let err = fetcher.fetch(&url).await.unwrap_err();
        assert!(matches!(err, TransportError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_server_error_is_retried() {
        let url = serve(vec![
            response("503 Service Unavailable", ""),
            response("200 OK", "recovered"),
        ])
        .await;
        let fetcher = PageFetcher::new(&Config::default()).unwrap();
        assert_eq!(fetcher.fetch(&url).await.unwrap(), "recovered");
    }
}
