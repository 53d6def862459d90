//! Fare service error types.

use std::fmt;

use crate::catalog::CatalogError;

/// Errors from the fare-information providers.
#[derive(Debug)]
pub enum FareError {
    /// The HTTP request itself failed: connection refused, timeout, DNS.
    Http(reqwest::Error),

    /// JSON deserialization failed
    Json {
        message: String,
        body: Option<String>,
    },

    /// Remote service returned an error status code
    Api { status: u16, message: String },

    /// Rate limited by the remote service
    RateLimited,

    /// Invalid API key or unauthorized
    Unauthorized,

    /// The offline provider could not read the catalogue
    Catalog(CatalogError),
}

impl fmt::Display for FareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FareError::Http(e) => write!(f, "HTTP error: {e}"),
            FareError::Json { message, body } => {
                write!(f, "JSON parse error: {message}")?;
                if let Some(body) = body {
                    write!(f, " (body: {body})")?;
                }
                Ok(())
            }
            FareError::Api { status, message } => {
                write!(f, "fare service error {status}: {message}")
            }
            FareError::RateLimited => write!(f, "rate limited by fare service"),
            FareError::Unauthorized => write!(f, "unauthorized (invalid API key)"),
            FareError::Catalog(e) => write!(f, "catalogue error: {e}"),
        }
    }
}

impl std::error::Error for FareError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FareError::Http(e) => Some(e),
            FareError::Catalog(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for FareError {
    fn from(err: reqwest::Error) -> Self {
        FareError::Http(err)
    }
}

impl From<CatalogError> for FareError {
    fn from(err: CatalogError) -> Self {
        FareError::Catalog(err)
    }
}
