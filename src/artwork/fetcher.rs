//! Cover art download

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::error::ArtworkError;

/// Downloads raw image bytes
#[async_trait]
pub trait ArtworkFetcher: Send + Sync {
    async fn fetch_image(&self, url: &str) -> Result<Bytes, ArtworkError>;
}

/// Fetches artwork over HTTP
#[derive(Clone)]
pub struct HttpArtworkFetcher {
    http_client: Client,
}

impl HttpArtworkFetcher {
    pub fn new() -> Result<Self, ArtworkError> {
        let http_client = Client::builder()
            .user_agent(concat!("tunegrab/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http_client })
    }
}

#[async_trait]
impl ArtworkFetcher for HttpArtworkFetcher {
    async fn fetch_image(&self, url: &str) -> Result<Bytes, ArtworkError> {
        let parsed = Url::parse(url).map_err(|source| ArtworkError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;
        debug!("Fetching artwork: {}", parsed);

        let response = self.http_client.get(parsed).send().await?;

        if !response.status().is_success() {
            return Err(ArtworkError::Status(response.status().as_u16()));
        }

        Ok(response.bytes().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_url_rejected_before_request() {
        let fetcher = HttpArtworkFetcher::new().unwrap();
        let err = fetcher.fetch_image("not a url").await.unwrap_err();
        assert!(matches!(err, ArtworkError::InvalidUrl { .. }));
    }
}
