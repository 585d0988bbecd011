use crate::config::ScraperConfig;
use crate::error::{Result, ScrapeError};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};
use url::Url;

/// Anything that can turn a URL into a page body.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn get_text(&self, url: &Url) -> Result<String>;
}

pub struct HttpClient {
    inner: reqwest::Client,
    request_delay: Duration,
}

impl HttpClient {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            // HL sets a session cookie on the landing page
            .cookie_store(true)
            .build()?;

        Ok(Self {
            inner,
            request_delay: Duration::from_millis(config.request_delay_ms),
        })
    }
}

#[async_trait]
impl PageFetcher for HttpClient {
    /// One GET, no retry. Non-2xx statuses are errors.
    async fn get_text(&self, url: &Url) -> Result<String> {
        if !self.request_delay.is_zero() {
            sleep(self.request_delay).await;
        }

        debug!("GET {}", url);
        let resp = self.inner.get(url.as_str()).send().await?;

        let status = resp.status();
        if !status.is_success() {
            warn!("HTTP {} for {}", status, url);
            return Err(ScrapeError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = resp.text().await?;
        debug!("{} bytes from {}", body.len(), url);
        Ok(body)
    }
}

/// Single-shot HTTP/1.1 responder on 127.0.0.1 for client tests.
#[cfg(test)]
pub(crate) mod test_server {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Answers one request with `status` (e.g. "404 Not Found") and `body`.
    /// Returns the server's base URL, `http://127.0.0.1:<port>`.
    pub async fn serve_once(status: &'static str, body: impl Into<String>) -> String {
        let body = body.into();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..n]);
            }
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        format!("http://{addr}")
    }
}

#[cfg(test)]
mod tests {
    use super::test_server::serve_once;
    use super::*;

    fn client() -> HttpClient {
        HttpClient::new(&ScraperConfig {
            request_delay_ms: 0,
            timeout_secs: 5,
            ..ScraperConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_get_text_returns_body() {
        let base = serve_once("200 OK", "<html><body>sectors</body></html>").await;
        let url = Url::parse(&format!("{base}/list")).unwrap();

        let body = tokio_test::assert_ok!(client().get_text(&url).await);
        assert_eq!(body, "<html><body>sectors</body></html>");
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let base = serve_once("404 Not Found", "").await;
        let url = Url::parse(&format!("{base}/missing")).unwrap();

        let err = client().get_text(&url).await.unwrap_err();
        match err {
            ScrapeError::Status { status, url: failed } => {
                assert_eq!(status, 404);
                assert_eq!(failed, url.to_string());
            }
            other => panic!("expected Status, got {other:?}"),
        }
    }
}
