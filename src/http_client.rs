use rand::Rng;
use reqwest::{Client, ClientBuilder, Response};
use std::time::Duration;
use tokio::time::sleep;

/// User agents to rotate through to avoid bot detection
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
];

/// Configuration for the scraping HTTP client
#[derive(Clone)]
pub struct HttpClientConfig {
    pub timeout: Duration,
    pub max_retries: usize,
    pub initial_retry_delay_ms: u64,
    pub max_retry_delay_ms: u64,
    /// Delay inserted after every request; 333ms approximates the site's
    /// tolerated 3 requests per second
    pub rate_limit_delay_ms: u64,
    pub enable_cookies: bool,
    pub enable_gzip: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            max_retries: 4,
            initial_retry_delay_ms: 500,
            max_retry_delay_ms: 8000,
            rate_limit_delay_ms: 333,
            enable_cookies: true,
            enable_gzip: true,
        }
    }
}

/// HTTP client with browser-like headers, retry logic and rate limiting
pub struct EnhancedHttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl EnhancedHttpClient {
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_config(HttpClientConfig::default())
    }

    pub fn with_config(config: HttpClientConfig) -> Result<Self, reqwest::Error> {
        let mut builder = ClientBuilder::new()
            .timeout(config.timeout)
            .user_agent(Self::random_user_agent())
            .cookie_store(config.enable_cookies)
            .gzip(config.enable_gzip)
            .brotli(true)
            .tcp_keepalive(Some(Duration::from_secs(60)))
            .pool_idle_timeout(Some(Duration::from_secs(90)));

        // Default headers that mimic a real browser
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8".parse().unwrap());
        headers.insert("Accept-Language", "es-ES,es;q=0.9,en;q=0.8".parse().unwrap());
        headers.insert("DNT", "1".parse().unwrap());
        headers.insert("Connection", "keep-alive".parse().unwrap());
        headers.insert("Upgrade-Insecure-Requests", "1".parse().unwrap());
        headers.insert("Sec-Fetch-Dest", "document".parse().unwrap());
        headers.insert("Sec-Fetch-Mode", "navigate".parse().unwrap());
        headers.insert("Sec-Fetch-Site", "none".parse().unwrap());
        headers.insert("Cache-Control", "max-age=0".parse().unwrap());
        builder = builder.default_headers(headers);

        let client = builder.build()?;

        Ok(Self { client, config })
    }

    fn random_user_agent() -> &'static str {
        let mut rng = rand::thread_rng();
        let index = rng.gen_range(0..USER_AGENTS.len());
        USER_AGENTS[index]
    }

    /// Retry delay with exponential backoff and jitter
    fn calculate_retry_delay(&self, attempt: usize) -> Duration {
        let base_delay = self.config.initial_retry_delay_ms;
        let max_delay = self.config.max_retry_delay_ms;

        let delay_ms = (base_delay * 2u64.pow(attempt as u32)).min(max_delay);

        let mut rng = rand::thread_rng();
        let jitter = rng.gen_range(0.75..=1.25);
        let final_delay_ms = (delay_ms as f64 * jitter) as u64;

        Duration::from_millis(final_delay_ms)
    }

    fn is_retryable_status(status: reqwest::StatusCode) -> bool {
        matches!(
            status.as_u16(),
            // Rate limiting
            429 |
            // Server errors
            500 | 502 | 503 | 504 |
            // Cloudflare errors
            520 | 521 | 522 | 523 | 524 | 525 | 526 | 527
        )
    }

    /// Fetch a URL with retry logic, rotating the user agent per attempt
    pub async fn get_with_retry(&self, url: &str) -> Result<Response, reqwest::Error> {
        self.get_with_retry_and_headers(url, None).await
    }

    /// Fetch a URL with custom headers and retry logic
    pub async fn get_with_retry_and_headers(
        &self,
        url: &str,
        extra_headers: Option<reqwest::header::HeaderMap>,
    ) -> Result<Response, reqwest::Error> {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            let mut request = self
                .client
                .get(url)
                .header("User-Agent", Self::random_user_agent());

            if let Some(ref headers) = extra_headers {
                request = request.headers(headers.clone());
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status();

                    if Self::is_retryable_status(status) && attempt < self.config.max_retries {
                        log::warn!(
                            "Received retryable status {} for {}, attempt {}/{}",
                            status,
                            url,
                            attempt + 1,
                            self.config.max_retries + 1
                        );

                        let delay = self.calculate_retry_delay(attempt);
                        sleep(delay).await;
                        continue;
                    }

                    // Return the response even when it carries a non-retryable
                    // error status; callers treat missing markup as empty data
                    return Ok(response);
                }
                Err(e) => {
                    let should_retry = e.is_timeout()
                        || e.is_connect()
                        || e.is_request()
                        || e.status().map(Self::is_retryable_status).unwrap_or(false);

                    if should_retry && attempt < self.config.max_retries {
                        log::warn!(
                            "Request failed for {}, attempt {}/{}: {}",
                            url,
                            attempt + 1,
                            self.config.max_retries + 1,
                            e
                        );

                        let delay = self.calculate_retry_delay(attempt);
                        sleep(delay).await;
                        last_error = Some(e);
                        continue;
                    }

                    return Err(e);
                }
            }
        }

        Err(last_error.unwrap())
    }

    /// Fetch a URL and return the response text
    pub async fn get_text(&self, url: &str) -> Result<String, reqwest::Error> {
        let response = self.get_with_retry(url).await?;
        let text = response.text().await?;
        self.rate_limit_delay().await;
        Ok(text)
    }

    /// Fetch a URL with custom headers and return the response text
    pub async fn get_text_with_headers(
        &self,
        url: &str,
        headers: reqwest::header::HeaderMap,
    ) -> Result<String, reqwest::Error> {
        let response = self.get_with_retry_and_headers(url, Some(headers)).await?;
        let text = response.text().await?;
        self.rate_limit_delay().await;
        Ok(text)
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Pause between requests to stay under the site's request budget
    pub async fn rate_limit_delay(&self) {
        sleep(Duration::from_millis(self.config.rate_limit_delay_ms)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_client_creation() {
        let client = EnhancedHttpClient::new();
        assert!(client.is_ok());
    }

    #[test]
    fn test_random_user_agent() {
        let ua1 = EnhancedHttpClient::random_user_agent();
        let ua2 = EnhancedHttpClient::random_user_agent();
        assert!(USER_AGENTS.contains(&ua1));
        assert!(USER_AGENTS.contains(&ua2));
    }

    #[tokio::test]
    async fn test_retry_delay_calculation() {
        let config = HttpClientConfig::default();
        let client = EnhancedHttpClient::with_config(config).unwrap();

        let delay0 = client.calculate_retry_delay(0);
        let delay1 = client.calculate_retry_delay(1);
        let delay2 = client.calculate_retry_delay(2);

        // Each delay should be roughly double the previous (with jitter)
        assert!(delay0.as_millis() > 0);
        assert!(delay1.as_millis() >= delay0.as_millis());
        assert!(delay2.as_millis() >= delay1.as_millis());
    }

    #[test]
    fn test_retryable_status() {
        assert!(EnhancedHttpClient::is_retryable_status(
            reqwest::StatusCode::TOO_MANY_REQUESTS
        ));
        assert!(EnhancedHttpClient::is_retryable_status(
            reqwest::StatusCode::INTERNAL_SERVER_ERROR
        ));
        assert!(EnhancedHttpClient::is_retryable_status(
            reqwest::StatusCode::BAD_GATEWAY
        ));
        assert!(!EnhancedHttpClient::is_retryable_status(
            reqwest::StatusCode::NOT_FOUND
        ));
        assert!(!EnhancedHttpClient::is_retryable_status(
            reqwest::StatusCode::FORBIDDEN
        ));
    }
}
