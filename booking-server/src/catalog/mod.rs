//! Train catalogue access.
//!
//! The catalogue owns the timetable and the live seat inventory. Everything
//! behind the [`TrainCatalog`] trait so the booking flows can run against
//! the in-memory store in development and tests, and against a real
//! inventory backend in production.

mod memory;
mod seed;

pub use memory::{InMemoryCatalog, InvalidCatalog, TimetableBuilder, demo_catalog};
pub use seed::{Seed, SeedError, load_seed};

use crate::domain::{Money, Route, Station, Train, TrainId, TravelClass};
use async_trait::async_trait;
use chrono::NaiveDate;

/// Errors surfaced by catalogue operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// No train with the given identifier exists.
    #[error("train not found: {0}")]
    TrainNotFound(TrainId),

    /// The train exists but does not sell the requested class.
    #[error("train {train} does not sell {class} class")]
    ClassNotSold { train: TrainId, class: TravelClass },

    /// The class exists but has too few seats left for the request.
    #[error(
        "not enough seats on {train} in {class}: requested {requested}, available {available}"
    )]
    InsufficientSeats {
        train: TrainId,
        class: TravelClass,
        requested: u32,
        available: u32,
    },

    /// The catalogue backend could not be reached or answered garbage.
    /// The in-memory store never returns this; remote backends and test
    /// doubles do.
    #[error("catalogue unavailable: {0}")]
    Unavailable(String),
}

/// Read and reserve access to the timetable and seat inventory.
///
/// Reads return snapshots: owned values that do not change after they are
/// handed out. A snapshot can therefore go stale; [`reserve_seats`] is the
/// only operation whose answer is authoritative, because the availability
/// check and the decrement happen as one atomic update.
///
/// [`reserve_seats`]: TrainCatalog::reserve_seats
#[async_trait]
pub trait TrainCatalog: Send + Sync {
    /// The station directory, in catalogue order.
    async fn stations(&self) -> Result<Vec<Station>, CatalogError>;

    /// Every train in the timetable, in catalogue order.
    async fn all_trains(&self) -> Result<Vec<Train>, CatalogError>;

    /// One consistent snapshot of the trains serving a route.
    ///
    /// The in-memory store runs the same timetable every day and ignores
    /// `date`; date-aware backends may not.
    async fn trains_serving(
        &self,
        route: &Route,
        date: NaiveDate,
    ) -> Result<Vec<Train>, CatalogError>;

    /// Snapshot of a single train.
    async fn train(&self, id: &TrainId) -> Result<Train, CatalogError>;

    /// Take `seats` seats in `class` on a train, returning the per-seat
    /// fare in force at the moment of the decrement.
    ///
    /// Check and decrement are a single atomic update: success means the
    /// seats were taken, and concurrent callers can never take the same
    /// seat twice.
    async fn reserve_seats(
        &self,
        id: &TrainId,
        class: TravelClass,
        seats: u32,
    ) -> Result<Money, CatalogError>;

    /// Return seats taken by an earlier [`reserve_seats`] call that could
    /// not be used, e.g. because payment was declined.
    ///
    /// [`reserve_seats`]: TrainCatalog::reserve_seats
    async fn release_seats(
        &self,
        id: &TrainId,
        class: TravelClass,
        seats: u32,
    ) -> Result<(), CatalogError>;
}
