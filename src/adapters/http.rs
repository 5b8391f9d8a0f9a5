use crate::domain::ports::{ConfigProvider, PageFetcher};
use crate::utils::error::Result;
use reqwest::Client;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::new(config.request_timeout(), config.user_agent())
    }
}

impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        tracing::debug!("Requesting menu page: {}", url);
        let response = self.client.get(url).send().await?.error_for_status()?;
        tracing::debug!("Menu page response status: {}", response.status());

        // The page is UTF-8 whatever its headers claim.
        let body = response.bytes().await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(Duration::from_secs(5), "halla-bob-test").unwrap()
    }

    #[tokio::test]
    async fn test_fetch_returns_body_text() {
        let server = MockServer::start();
        let page_mock = server.mock(|when, then| {
            when.method(GET).path("/kr/211/subview.do");
            then.status(200)
                .header("Content-Type", "text/html; charset=euc-kr")
                .body("<div id=\"dietInfoArea\">학식</div>");
        });

        let body = fetcher()
            .fetch(&server.url("/kr/211/subview.do"))
            .await
            .unwrap();

        page_mock.assert();
        assert!(body.contains("학식"));
    }

    #[tokio::test]
    async fn test_fetch_fails_on_error_status() {
        let server = MockServer::start();
        let page_mock = server.mock(|when, then| {
            when.method(GET).path("/");
            then.status(503);
        });

        let result = fetcher().fetch(&server.url("/")).await;

        page_mock.assert();
        tokio_test::assert_err!(result);
    }
}
