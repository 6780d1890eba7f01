use crate::error::ApiError;
use async_trait::async_trait;
use configuration::settings::ApiConfig;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;
use tracing::debug;

pub mod auth;
pub mod error;
pub mod responses;
pub mod statements;
// --- Public API ---
pub use responses::{CompanyProfile, StatementRow};
pub use statements::{assemble_statements, fetch_financial_statements};

/// The two statement feeds a ticker's financials are assembled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    Income,
    BalanceSheet,
}

impl StatementKind {
    /// The path segment and response key the API uses for this statement.
    pub fn as_str(&self) -> &'static str {
        match self {
            StatementKind::Income => "income_statement",
            StatementKind::BalanceSheet => "balance_sheet_statement",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The abstract interface to the financial data API.
/// The pipeline only talks to this trait, so a canned in-memory source can stand in
/// for the live service in tests.
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// Checks that the service is up. Returns the raw health message.
    async fn health_check(&self) -> Result<String, ApiError>;

    /// Fetches every symbol the service knows about.
    async fn fetch_symbols(&self) -> Result<Vec<String>, ApiError>;

    /// Fetches the company profile for a symbol, `None` if the service has none.
    async fn fetch_profile(&self, symbol: &str) -> Result<Option<CompanyProfile>, ApiError>;

    /// Fetches the most recent end-of-day close for a symbol.
    async fn fetch_eod_price(&self, symbol: &str) -> Result<Option<Decimal>, ApiError>;

    /// Fetches the raw rows of one financial statement for a symbol.
    async fn fetch_statement_rows(
        &self,
        symbol: &str,
        kind: StatementKind,
    ) -> Result<Vec<StatementRow>, ApiError>;
}

/// A concrete implementation of the `ApiClient` for the Fiindo API.
#[derive(Clone)]
pub struct FiindoClient {
    client: reqwest::Client,
    base_url: String,
}

impl FiindoClient {
    pub fn new(api_config: &ApiConfig) -> Result<Self, ApiError> {
        let headers = auth::default_headers(&api_config.first_name, &api_config.last_name)?;
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(api_config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: api_config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_text(&self, path: &str) -> Result<String, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "GET");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            Ok(text)
        } else {
            Err(ApiError::Status {
                url,
                status: status.as_u16(),
                body: text,
            })
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let text = self.get_text(path).await?;
        serde_json::from_str::<T>(&text).map_err(|e| ApiError::Deserialization {
            url: format!("{}{}", self.base_url, path),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl ApiClient for FiindoClient {
    async fn health_check(&self) -> Result<String, ApiError> {
        let body = self.get_text("/health").await?;
        // The service answers with a JSON string such as `"Ok, everything is fine"`.
        if body.trim_start().starts_with("\"Ok") {
            Ok(body.trim().trim_matches('"').to_string())
        } else {
            Err(ApiError::Unhealthy(body))
        }
    }

    async fn fetch_symbols(&self) -> Result<Vec<String>, ApiError> {
        let response: responses::SymbolsResponse = self.get_json("/api/v1/symbols").await?;
        Ok(response.symbols)
    }

    async fn fetch_profile(&self, symbol: &str) -> Result<Option<CompanyProfile>, ApiError> {
        let response: responses::GeneralResponse =
            self.get_json(&format!("/api/v1/general/{symbol}")).await?;
        Ok(response
            .fundamentals
            .and_then(|f| f.profile)
            .and_then(|p| p.data.into_iter().next()))
    }

    async fn fetch_eod_price(&self, symbol: &str) -> Result<Option<Decimal>, ApiError> {
        let response: responses::EodResponse =
            self.get_json(&format!("/api/v1/eod/{symbol}")).await?;
        let rows = response.stockprice.map(|s| s.data).unwrap_or_default();

        // ISO dates order lexically; the feed is not guaranteed to be sorted.
        Ok(rows
            .into_iter()
            .filter_map(|row| Some((row.date?, row.close?)))
            .max_by(|a, b| a.0.cmp(&b.0))
            .map(|(_, close)| close))
    }

    async fn fetch_statement_rows(
        &self,
        symbol: &str,
        kind: StatementKind,
    ) -> Result<Vec<StatementRow>, ApiError> {
        let response: responses::FinancialsResponse = self
            .get_json(&format!("/api/v1/financials/{symbol}/{kind}"))
            .await?;
        Ok(response
            .fundamentals
            .and_then(|f| f.financials)
            .and_then(|mut statements| statements.remove(kind.as_str()))
            .map(|list| list.data)
            .unwrap_or_default())
    }
}
