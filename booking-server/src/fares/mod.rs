//! Fare-information text for the enquiry page.
//!
//! The prose itself comes from an opaque remote text service; this module
//! owns the port the rest of the crate talks to and three implementations:
//!
//! - [`FareClient`]: HTTP client for the remote service
//! - [`CannedFareProvider`]: deterministic offline stand-in that derives
//!   the text from the catalogue's actual prices
//! - [`CachedFareText`]: TTL cache in front of either of the above
//!
//! Fare estimates change slowly, so the expensive remote call is the thing
//! worth caching, not the catalogue lookup.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{Route, TravelClass};

mod cache;
mod canned;
mod client;
mod error;

pub use cache::{CachedFareText, FareCacheConfig};
pub use canned::CannedFareProvider;
pub use client::{FareClient, FareClientConfig};
pub use error::FareError;

/// One fare enquiry: route, class and travel date.
///
/// Doubles as the cache key, so equal enquiries share a cached answer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FareQuery {
    /// Where from and where to.
    pub route: Route,
    /// Travel class the passenger asked about.
    pub class: TravelClass,
    /// Intended travel date.
    pub date: NaiveDate,
}

/// Source of human-readable fare information.
#[async_trait]
pub trait FareTextProvider: Send + Sync {
    /// A short prose answer to the enquiry, suitable for showing verbatim.
    async fn fare_text(&self, query: &FareQuery) -> Result<String, FareError>;
}
