//! Booking orchestration: search, purchase and the missed-train flow.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, error, info, warn};

use crate::catalog::{CatalogError, TrainCatalog};
use crate::domain::{
    Booking, BookingId, BookingStatus, CustomerId, InvalidBooking, NewBooking, Route, Station,
    Train, TrainId, TravelClass,
};
use crate::payment::{CardDetails, PaymentError, PaymentGateway};
use crate::rebook::{RebookDecline, find_replacement};

use super::store::{BookingStore, StoreError};

/// How many times the reschedule flow re-fetches and re-matches after a
/// reservation loses a race to a concurrent buyer.
const RESCHEDULE_ATTEMPTS: u32 = 3;

/// Errors surfaced by booking operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookingError {
    /// No booking with the given identifier exists.
    #[error("booking not found: {0}")]
    NotFound(BookingId),

    /// No train with the given identifier exists.
    #[error("train not found: {0}")]
    TrainNotFound(TrainId),

    /// The train exists but does not sell the requested class.
    #[error("train {train} does not sell {class} class")]
    ClassNotSold { train: TrainId, class: TravelClass },

    /// Too few seats were left when the reservation was attempted.
    #[error(
        "not enough seats on {train} in {class}: requested {requested}, available {available}"
    )]
    NoSeats {
        train: TrainId,
        class: TravelClass,
        requested: u32,
        available: u32,
    },

    /// The payment processor refused the charge; the reserved seats were
    /// released.
    #[error("payment declined: {reason}")]
    PaymentDeclined { reason: String },

    /// The request was malformed at the business level.
    #[error("invalid request: {0}")]
    Invalid(String),

    /// The booking was already resolved, by this flow or a concurrent one.
    #[error("booking {id} was already resolved as {status}")]
    AlreadyResolved { id: BookingId, status: BookingStatus },

    /// Reschedule was requested for a train that has not left yet.
    #[error("booking {0} has not departed yet")]
    NotYetDeparted(BookingId),

    /// Every reschedule attempt lost its reservation race. The booking is
    /// untouched and the call can simply be retried.
    #[error("seat availability kept changing while rescheduling; try again")]
    Contended,

    /// Catalogue fault that is not one of the cases above.
    #[error(transparent)]
    Catalog(CatalogError),

    /// Store fault that is not one of the cases above.
    #[error(transparent)]
    Store(StoreError),

    /// Payment gateway fault other than a decline.
    #[error(transparent)]
    Payment(PaymentError),
}

impl From<CatalogError> for BookingError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::TrainNotFound(id) => BookingError::TrainNotFound(id),
            CatalogError::ClassNotSold { train, class } => {
                BookingError::ClassNotSold { train, class }
            }
            CatalogError::InsufficientSeats {
                train,
                class,
                requested,
                available,
            } => BookingError::NoSeats {
                train,
                class,
                requested,
                available,
            },
            other => BookingError::Catalog(other),
        }
    }
}

impl From<StoreError> for BookingError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => BookingError::NotFound(id),
            StoreError::AlreadyResolved { id, status } => {
                BookingError::AlreadyResolved { id, status }
            }
            other => BookingError::Store(other),
        }
    }
}

impl From<PaymentError> for BookingError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::Declined { reason } => BookingError::PaymentDeclined { reason },
            other => BookingError::Payment(other),
        }
    }
}

impl From<InvalidBooking> for BookingError {
    fn from(err: InvalidBooking) -> Self {
        BookingError::Invalid(err.to_string())
    }
}

/// Everything needed to buy tickets.
#[derive(Debug, Clone)]
pub struct BookRequest {
    /// The purchasing customer.
    pub customer: CustomerId,
    /// Which train to book.
    pub train_id: TrainId,
    /// Travel date; today or later.
    pub date: NaiveDate,
    /// Travel class to book.
    pub class: TravelClass,
    /// Party size, 1 to 100.
    pub passengers: u32,
    /// Card to charge.
    pub card: CardDetails,
}

/// Result of handling a missed booking.
///
/// Both cases are successful executions of the flow; the decline is an
/// answer, not a fault. Callers get the updated original booking either
/// way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RescheduleOutcome {
    /// A replacement was found, seats were reserved and both records were
    /// written.
    Rescheduled {
        /// The old booking, now `MissedRescheduled`.
        original: Booking,
        /// The new `Upcoming` booking on the later train.
        replacement: Booking,
    },

    /// No acceptable replacement existed; the booking is `MissedFailed`.
    Declined {
        /// The old booking, now `MissedFailed`.
        original: Booking,
        /// Why no train matched, suitable for showing to the passenger.
        reason: RebookDecline,
    },
}

/// The booking application service.
///
/// Owns no state of its own; everything is injected, so tests wire it to
/// in-memory collaborators and production wires it to real ones.
#[derive(Clone)]
pub struct BookingService {
    catalog: Arc<dyn TrainCatalog>,
    store: Arc<dyn BookingStore>,
    payments: Arc<dyn PaymentGateway>,
}

impl BookingService {
    /// Wire up a service from its collaborators.
    pub fn new(
        catalog: Arc<dyn TrainCatalog>,
        store: Arc<dyn BookingStore>,
        payments: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            catalog,
            store,
            payments,
        }
    }

    /// Trains running from `origin` to `destination`, in catalogue order.
    pub async fn search(
        &self,
        origin: Station,
        destination: Station,
        date: NaiveDate,
    ) -> Result<Vec<Train>, BookingError> {
        let route =
            Route::new(origin, destination).map_err(|err| BookingError::Invalid(err.to_string()))?;
        Ok(self.catalog.trains_serving(&route, date).await?)
    }

    /// Buy tickets: reserve seats, charge the card, record the booking.
    ///
    /// Seats are reserved before the charge; if the charge is declined the
    /// seats are released again and the decline is reported.
    pub async fn book(
        &self,
        request: BookRequest,
        now: NaiveDateTime,
    ) -> Result<Booking, BookingError> {
        if request.passengers == 0 || request.passengers > 100 {
            return Err(BookingError::Invalid(
                "party size must be between 1 and 100".to_owned(),
            ));
        }

        if request.date < now.date() {
            return Err(BookingError::Invalid(
                "travel date is in the past".to_owned(),
            ));
        }

        let train = self.catalog.train(&request.train_id).await?;
        if train.class(request.class).is_none() {
            return Err(BookingError::ClassNotSold {
                train: request.train_id,
                class: request.class,
            });
        }

        let unit_fare = self
            .catalog
            .reserve_seats(&request.train_id, request.class, request.passengers)
            .await?;
        let total = unit_fare.times(request.passengers);

        if let Err(err) = self.payments.charge(&request.card, total).await {
            debug!(train = %request.train_id, error = %err, "charge failed, releasing seats");
            self.release_quietly(&request.train_id, request.class, request.passengers)
                .await;
            return Err(err.into());
        }

        let booking = Booking::create(NewBooking {
            customer: request.customer,
            train: &train,
            date: request.date,
            class: request.class,
            passengers: request.passengers,
            total_price: total,
        })?;

        if let Err(err) = self.store.add(booking.clone()).await {
            // The charge has gone through at this point; this needs a human.
            error!(
                booking = %booking.id(),
                error = %err,
                "booking not stored after successful charge, reconciliation needed"
            );
            self.release_quietly(&request.train_id, request.class, request.passengers)
                .await;
            return Err(err.into());
        }

        info!(
            booking = %booking.id(),
            train = %booking.train_id(),
            class = %booking.class(),
            passengers = booking.passengers(),
            total = %booking.total_price(),
            "booked"
        );
        Ok(booking)
    }

    /// One booking by id.
    pub async fn booking(&self, id: BookingId) -> Result<Booking, BookingError> {
        Ok(self.store.get(id).await?)
    }

    /// A customer's bookings, oldest first.
    pub async fn history(&self, customer: &CustomerId) -> Result<Vec<Booking>, BookingError> {
        Ok(self.store.bookings_for(customer).await?)
    }

    /// A customer's missed bookings: departed while still `Upcoming`.
    pub async fn missed_bookings(
        &self,
        customer: &CustomerId,
        now: NaiveDateTime,
    ) -> Result<Vec<Booking>, BookingError> {
        let bookings = self.store.bookings_for(customer).await?;
        Ok(bookings
            .into_iter()
            .filter(|booking| booking.is_missed(now))
            .collect())
    }

    /// Handle a missed booking end to end.
    ///
    /// Finds the replacement with [`find_replacement`], reserves its seats,
    /// and records the outcome exactly once: the original booking becomes
    /// `MissedRescheduled` with a new `Upcoming` booking appended, or
    /// `MissedFailed` when no train matches. No new charge is made; the
    /// passenger travels on the fare already paid.
    ///
    /// A candidate snapshot can go stale between matching and reserving.
    /// When the reservation reports the seats are gone, the flow re-fetches
    /// and re-matches, a bounded number of times. A catalogue fetch failure
    /// aborts the flow with an error and leaves the booking `Upcoming`;
    /// "could not check" is never recorded as "no alternatives existed".
    pub async fn reschedule(
        &self,
        id: BookingId,
        now: NaiveDateTime,
    ) -> Result<RescheduleOutcome, BookingError> {
        let booking = self.store.get(id).await?;

        if booking.status().is_resolved() {
            return Err(BookingError::AlreadyResolved {
                id,
                status: booking.status(),
            });
        }

        if !booking.has_departed(now) {
            return Err(BookingError::NotYetDeparted(id));
        }

        for attempt in 1..=RESCHEDULE_ATTEMPTS {
            let candidates = self
                .catalog
                .trains_serving(booking.route(), booking.date())
                .await?;

            let rebooking = match find_replacement(&booking, &candidates) {
                Ok(rebooking) => rebooking,
                Err(reason) => {
                    self.store.resolve_failed(id).await?;
                    let original = self.store.get(id).await?;
                    info!(booking = %id, reason = %reason, "no replacement available");
                    return Ok(RescheduleOutcome::Declined { original, reason });
                }
            };

            let unit_fare = match self
                .catalog
                .reserve_seats(rebooking.train.id(), rebooking.class, booking.passengers())
                .await
            {
                Ok(unit_fare) => unit_fare,
                Err(CatalogError::Unavailable(message)) => {
                    return Err(BookingError::Catalog(CatalogError::Unavailable(message)));
                }
                Err(err) => {
                    // The snapshot lost a race (seats sold, timetable
                    // edited). Take a fresh snapshot and re-match.
                    debug!(
                        booking = %id,
                        train = %rebooking.train.id(),
                        attempt,
                        error = %err,
                        "replacement reservation failed, retrying with a fresh snapshot"
                    );
                    continue;
                }
            };

            let created = Booking::create(NewBooking {
                customer: booking.customer().clone(),
                train: &rebooking.train,
                date: booking.date(),
                class: rebooking.class,
                passengers: booking.passengers(),
                total_price: unit_fare.times(booking.passengers()),
            });
            let replacement = match created {
                Ok(replacement) => replacement,
                Err(err) => {
                    self.release_quietly(
                        rebooking.train.id(),
                        rebooking.class,
                        booking.passengers(),
                    )
                    .await;
                    return Err(err.into());
                }
            };

            if let Err(err) = self
                .store
                .resolve_rescheduled(id, replacement.clone())
                .await
            {
                // Someone else resolved it first; give the seats back.
                self.release_quietly(
                    rebooking.train.id(),
                    rebooking.class,
                    booking.passengers(),
                )
                .await;
                return Err(err.into());
            }

            let original = self.store.get(id).await?;
            info!(
                booking = %id,
                replacement = %replacement.id(),
                train = %replacement.train_id(),
                class = %replacement.class(),
                departs = %replacement.departs(),
                "rescheduled"
            );
            return Ok(RescheduleOutcome::Rescheduled {
                original,
                replacement,
            });
        }

        warn!(booking = %id, attempts = RESCHEDULE_ATTEMPTS, "reschedule attempts exhausted");
        Err(BookingError::Contended)
    }

    /// Release seats on a compensation path, logging rather than failing if
    /// the release itself goes wrong.
    async fn release_quietly(&self, train: &TrainId, class: TravelClass, seats: u32) {
        if let Err(err) = self.catalog.release_seats(train, class, seats).await {
            warn!(train = %train, class = %class, seats, error = %err, "seat release failed");
        }
    }
}
