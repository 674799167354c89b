use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::external::price_provider::{
    ExternalPricePoint, ExternalTickerMatch, PriceProvider, PriceProviderError,
};

/// EODHD-backed EOD price and ticker-search client. The upstream SDK is an
/// external collaborator named only at its interface; this is the concrete
/// client that fulfils `PriceProvider` against the real EODHD REST API.
pub struct EodhdProvider {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
}

impl EodhdProvider {
    pub fn new(api_key: String, api_base: String) -> Self {
        Self { client: reqwest::Client::new(), api_key, api_base }
    }
}

#[derive(Debug, Deserialize)]
struct EodhdBar {
    date: String,
    close: f64,
}

#[derive(Debug, Deserialize)]
struct EodhdSearchResult {
    #[serde(rename = "Code")]
    code: String,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Type")]
    _type: String,
    #[serde(rename = "Country")]
    region: String,
    #[serde(rename = "Currency")]
    currency: String,
}

#[async_trait]
impl PriceProvider for EodhdProvider {
    async fn fetch_daily_history(
        &self,
        ticker: &str,
        days: u32,
    ) -> Result<Vec<ExternalPricePoint>, PriceProviderError> {
        let url = format!("{}/eod/{}", self.api_base, ticker);
        let resp = self
            .client
            .get(&url)
            .query(&[("api_token", self.api_key.as_str()), ("fmt", "json"), ("period", "d")])
            .send()
            .await
            .map_err(|e| PriceProviderError::Network(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(PriceProviderError::RateLimited);
        }
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(PriceProviderError::NotFound);
        }
        if !resp.status().is_success() {
            return Err(PriceProviderError::BadResponse(format!(
                "eodhd returned status {}",
                resp.status()
            )));
        }

        let bars: Vec<EodhdBar> = resp
            .json()
            .await
            .map_err(|e| PriceProviderError::Parse(e.to_string()))?;

        let mut out: Vec<ExternalPricePoint> = bars
            .into_iter()
            .map(|bar| -> Result<ExternalPricePoint, PriceProviderError> {
                let date = NaiveDate::parse_from_str(&bar.date, "%Y-%m-%d")
                    .map_err(|e| PriceProviderError::Parse(e.to_string()))?;
                let close = BigDecimal::try_from(bar.close)
                    .map_err(|e| PriceProviderError::Parse(e.to_string()))?;
                Ok(ExternalPricePoint { date, close })
            })
            .collect::<Result<Vec<_>, _>>()?;

        out.sort_by_key(|p| p.date);
        if days > 0 && out.len() > days as usize {
            out.drain(..out.len() - days as usize);
        }
        Ok(out)
    }

    async fn search_ticker_by_keyword(
        &self,
        keyword: &str,
    ) -> Result<Vec<ExternalTickerMatch>, PriceProviderError> {
        let url = format!("{}/search/{}", self.api_base, keyword);
        let resp = self
            .client
            .get(&url)
            .query(&[("api_token", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| PriceProviderError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(PriceProviderError::BadResponse(format!(
                "eodhd search returned status {}",
                resp.status()
            )));
        }

        let results: Vec<EodhdSearchResult> = resp
            .json()
            .await
            .map_err(|e| PriceProviderError::Parse(e.to_string()))?;

        Ok(results
            .into_iter()
            .map(|r| ExternalTickerMatch {
                symbol: r.code,
                name: r.name,
                _type: r._type,
                region: r.region,
                currency: r.currency,
                matchScore: 1.0,
            })
            .collect())
    }
}
