use crate::config::PipelineConfig;
use crate::crawlers::crawler::PageFetcher;
use crate::error::FetchError;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use std::time::Duration;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Static fetcher: one bounded HTTP GET per call
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(config: &PipelineConfig) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        match HeaderValue::from_str(&config.accept_language) {
            Ok(value) => {
                headers.insert(ACCEPT_LANGUAGE, value);
            }
            Err(_) => ::log::warn!(
                "Ignoring invalid Accept-Language value: {}",
                config.accept_language
            ),
        }

        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .timeout(config.fetch_timeout())
            .build()?;

        Ok(Self {
            client,
            timeout: config.fetch_timeout(),
        })
    }

    fn classify(&self, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else if let Some(status) = error.status() {
            FetchError::HttpStatus(status.as_u16())
        } else {
            FetchError::Transport(error.to_string())
        }
    }
}

impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        ::log::info!("Fetching: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let body = response.text().await.map_err(|e| self.classify(e))?;
        ::log::info!(
            "Fetched {} characters from {} (status {})",
            body.chars().count(),
            url,
            status.as_u16()
        );
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    fn test_config() -> PipelineConfig {
        PipelineConfig {
            fetch_timeout_secs: 5,
            ..PipelineConfig::default()
        }
    }

    #[tokio::test]
    async fn test_fetch_success_sends_identity_headers() {
        let config = test_config();
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/about")
            .match_header("user-agent", config.user_agent.as_str())
            .match_header("accept-language", config.accept_language.as_str())
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<html><body>About us</body></html>")
            .expect(1)
            .create_async()
            .await;

        let fetcher = HttpFetcher::new(&config).unwrap();
        let html = fetcher
            .fetch(&format!("{}/about", server.url()))
            .await
            .unwrap();
        assert_eq!(html, "<html><body>About us</body></html>");

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_client_error_is_failure() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/missing")
            .with_status(404)
            .with_body("Not Found")
            .expect(1)
            .create_async()
            .await;

        let fetcher = HttpFetcher::new(&test_config()).unwrap();
        let result = fetcher.fetch(&format!("{}/missing", server.url())).await;
        assert_eq!(result, Err(FetchError::HttpStatus(404)));

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_server_error_is_not_retried() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .with_status(503)
            .expect(1)
            .create_async()
            .await;

        let fetcher = HttpFetcher::new(&test_config()).unwrap();
        let result = fetcher.fetch(&format!("{}/", server.url())).await;
        assert_eq!(result, Err(FetchError::HttpStatus(503)));

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_connection_refused_is_transport_error() {
        let fetcher = HttpFetcher::new(&test_config()).unwrap();
        let result = fetcher.fetch("http://127.0.0.1:1/").await;
        assert!(matches!(result, Err(FetchError::Transport(_))));
    }

    #[tokio::test]
    async fn test_fetch_timeout_is_failure() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let config = PipelineConfig {
            fetch_timeout_secs: 1,
            ..PipelineConfig::default()
        };
        let fetcher = HttpFetcher::new(&config).unwrap();
        let result = fetcher.fetch(&format!("http://{}/", addr)).await;
        assert_eq!(result, Err(FetchError::Timeout(Duration::from_secs(1))));
    }
}
