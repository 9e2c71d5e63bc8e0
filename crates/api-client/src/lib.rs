use crate::error::ApiError;
use async_trait::async_trait;
use configuration::ApiConfig;
use core_types::CoinRecord;

pub mod error;
pub mod responses;

// --- Public API ---
pub use responses::CoinMarket;

/// The longest slice of an error body that is kept in an `ApiError::Status`.
const MAX_ERROR_BODY: usize = 512;

/// The abstract interface for a market-data source.
/// The fetcher only depends on this trait, so tests can swap in a stub.
#[async_trait]
pub trait MarketDataClient: Send + Sync {
    /// Fetches the first page of coins ordered by descending market cap,
    /// with prices quoted in `vs_currency`.
    async fn fetch_top_coins(
        &self,
        page_size: u32,
        vs_currency: &str,
    ) -> Result<Vec<CoinRecord>, ApiError>;
}

/// A concrete implementation of the `MarketDataClient` for the CoinGecko API.
#[derive(Clone)]
pub struct CoinGeckoClient {
    client: reqwest::Client,
    base_url: String,
}

impl CoinGeckoClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("cryptopulse/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ApiError::ClientBuild)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl MarketDataClient for CoinGeckoClient {
    async fn fetch_top_coins(
        &self,
        page_size: u32,
        vs_currency: &str,
    ) -> Result<Vec<CoinRecord>, ApiError> {
        let url = format!("{}/coins/markets", self.base_url);
        let per_page = page_size.to_string();

        tracing::debug!(%url, page_size, vs_currency, "Requesting market listing.");
        let response = self
            .client
            .get(&url)
            .query(&[
                ("vs_currency", vs_currency),
                ("order", "market_cap_desc"),
                ("per_page", per_page.as_str()),
                ("page", "1"),
                ("sparkline", "false"),
            ])
            .send()
            .await
            .map_err(ApiError::Network)?;

        let status = response.status();
        let text = response.text().await.map_err(ApiError::Network)?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: truncate(text, MAX_ERROR_BODY),
            });
        }

        let markets: Vec<CoinMarket> =
            serde_json::from_str(&text).map_err(|e| ApiError::DataShape(e.to_string()))?;

        Ok(markets.into_iter().map(CoinRecord::from).collect())
    }
}

fn truncate(mut text: String, max: usize) -> String {
    if text.len() > max {
        let mut end = max;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        text.truncate(end);
        text.push_str("...");
    }
    text
}
