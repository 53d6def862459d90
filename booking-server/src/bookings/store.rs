//! Booking persistence.
//!
//! The store is where the exactly-once guarantee for missed-train handling
//! lives: both resolution writes check the booking is still `Upcoming` and
//! flip it inside one critical section, so of any number of concurrent
//! resolution attempts exactly one wins.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{Booking, BookingId, BookingStatus, CustomerId};

/// Errors surfaced by booking stores.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No booking with the given identifier exists.
    #[error("booking not found: {0}")]
    NotFound(BookingId),

    /// The booking had already left `Upcoming` when a resolution write
    /// arrived. Carries the status it holds.
    #[error("booking {id} was already resolved as {status}")]
    AlreadyResolved { id: BookingId, status: BookingStatus },

    /// A booking with this identifier is already stored.
    #[error("booking id already exists: {0}")]
    DuplicateId(BookingId),

    /// The store backend could not be reached. The in-memory store never
    /// returns this; remote backends and test doubles do.
    #[error("booking store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence for bookings, including the exactly-once resolution writes.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Store a new booking.
    async fn add(&self, booking: Booking) -> Result<(), StoreError>;

    /// Fetch one booking by id.
    async fn get(&self, id: BookingId) -> Result<Booking, StoreError>;

    /// All bookings belonging to a customer, oldest first.
    async fn bookings_for(&self, customer: &CustomerId) -> Result<Vec<Booking>, StoreError>;

    /// Resolve a missed booking as rescheduled: atomically mark the old
    /// booking `MissedRescheduled` and store the replacement.
    ///
    /// Fails with [`StoreError::AlreadyResolved`] without storing anything
    /// if the old booking has already left `Upcoming`.
    async fn resolve_rescheduled(
        &self,
        old: BookingId,
        replacement: Booking,
    ) -> Result<(), StoreError>;

    /// Resolve a missed booking as failed: mark it `MissedFailed`.
    ///
    /// Fails with [`StoreError::AlreadyResolved`] if the booking has
    /// already left `Upcoming`.
    async fn resolve_failed(&self, old: BookingId) -> Result<(), StoreError>;
}

#[derive(Default)]
struct StoreState {
    bookings: Vec<Booking>,
    index: HashMap<BookingId, usize>,
}

/// Injectable in-memory booking store.
///
/// Bookings are held in insertion order, which is also the order
/// [`bookings_for`] returns them in. Cheap to clone; clones share state.
///
/// [`bookings_for`]: BookingStore::bookings_for
#[derive(Clone, Default)]
pub struct InMemoryBookings {
    state: Arc<RwLock<StoreState>>,
}

impl InMemoryBookings {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookingStore for InMemoryBookings {
    async fn add(&self, booking: Booking) -> Result<(), StoreError> {
        let mut state = self.state.write().await;

        if state.index.contains_key(&booking.id()) {
            return Err(StoreError::DuplicateId(booking.id()));
        }

        let position = state.bookings.len();
        state.index.insert(booking.id(), position);
        state.bookings.push(booking);
        Ok(())
    }

    async fn get(&self, id: BookingId) -> Result<Booking, StoreError> {
        let state = self.state.read().await;
        state
            .index
            .get(&id)
            .map(|&position| state.bookings[position].clone())
            .ok_or(StoreError::NotFound(id))
    }

    async fn bookings_for(&self, customer: &CustomerId) -> Result<Vec<Booking>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .bookings
            .iter()
            .filter(|booking| booking.customer() == customer)
            .cloned()
            .collect())
    }

    async fn resolve_rescheduled(
        &self,
        old: BookingId,
        replacement: Booking,
    ) -> Result<(), StoreError> {
        let mut state = self.state.write().await;

        let position = *state.index.get(&old).ok_or(StoreError::NotFound(old))?;

        if state.index.contains_key(&replacement.id()) {
            return Err(StoreError::DuplicateId(replacement.id()));
        }

        state.bookings[position]
            .mark_rescheduled()
            .map_err(|err| StoreError::AlreadyResolved {
                id: old,
                status: err.status,
            })?;

        let append_at = state.bookings.len();
        state.index.insert(replacement.id(), append_at);
        state.bookings.push(replacement);
        Ok(())
    }

    async fn resolve_failed(&self, old: BookingId) -> Result<(), StoreError> {
        let mut state = self.state.write().await;

        let position = *state.index.get(&old).ok_or(StoreError::NotFound(old))?;

        state.bookings[position]
            .mark_failed()
            .map_err(|err| StoreError::AlreadyResolved {
                id: old,
                status: err.status,
            })
    }
}
