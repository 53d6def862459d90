//! HTTP client for the remote fare-information service.
//!
//! The service takes a route, class and date and answers with a short
//! prose fare summary. Authentication is an API-key header; the body is
//! JSON both ways.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

use super::error::FareError;
use super::{FareQuery, FareTextProvider};

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the fare client.
#[derive(Debug, Clone)]
pub struct FareClientConfig {
    /// Base URL of the fare service.
    pub base_url: String,
    /// API key for authentication.
    pub api_key: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl FareClientConfig {
    /// Create a new config for the given endpoint and key.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Wire format of an enquiry. Dates travel as `YYYY-MM-DD`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FareRequest<'a> {
    departure_station: &'a str,
    arrival_station: &'a str,
    train_class: &'a str,
    date: String,
}

/// Wire format of the service's answer.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FareAnswer {
    fare_information: String,
}

/// Fare-information HTTP client.
#[derive(Debug, Clone)]
pub struct FareClient {
    http: reqwest::Client,
    base_url: String,
}

impl FareClient {
    /// Create a new client with the given configuration.
    pub fn new(config: FareClientConfig) -> Result<Self, FareError> {
        let mut headers = HeaderMap::new();

        let api_key = HeaderValue::from_str(&config.api_key).map_err(|_| FareError::Api {
            status: 0,
            message: "invalid API key format".to_string(),
        })?;
        headers.insert("x-api-key", api_key);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }
}

#[async_trait]
impl FareTextProvider for FareClient {
    async fn fare_text(&self, query: &FareQuery) -> Result<String, FareError> {
        let url = format!("{}/v1/fare-information", self.base_url);

        let request = FareRequest {
            departure_station: query.route.origin().as_str(),
            arrival_station: query.route.destination().as_str(),
            train_class: query.class.as_str(),
            date: query.date.format("%Y-%m-%d").to_string(),
        };

        let response = self.http.post(&url).json(&request).send().await?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(FareError::Unauthorized);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(FareError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FareError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        let answer: FareAnswer = serde_json::from_str(&body).map_err(|e| FareError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })?;

        Ok(answer.fare_information)
    }
}
