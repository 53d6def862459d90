//! Booking records and their lifecycle.
//!
//! A booking snapshots the train details at purchase time (name, number,
//! route, departure) so it stays meaningful even if the timetable is later
//! edited. Its status only ever moves forward: `Upcoming` resolves to
//! exactly one of `MissedRescheduled` or `MissedFailed` and never reverts.

use super::{Money, Route, TimeOfDay, Train, TrainId, TrainNumber, TravelClass};
use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;
use uuid::Uuid;

/// Error returned when parsing an invalid booking identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid booking id: not a UUID")]
pub struct InvalidBookingId;

/// Unique identifier for a booking, generated at creation time.
///
/// # Examples
///
/// ```
/// use booking_server::domain::BookingId;
///
/// let id = BookingId::generate();
/// let parsed = BookingId::parse(&id.to_string()).unwrap();
/// assert_eq!(id, parsed);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BookingId(Uuid);

impl BookingId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        BookingId(Uuid::new_v4())
    }

    /// Parse an identifier from its canonical string form.
    pub fn parse(s: &str) -> Result<Self, InvalidBookingId> {
        Uuid::parse_str(s.trim())
            .map(BookingId)
            .map_err(|_| InvalidBookingId)
    }
}

impl fmt::Debug for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BookingId({})", self.0)
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when parsing an invalid customer identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid customer id: {reason}")]
pub struct InvalidCustomerId {
    reason: &'static str,
}

/// Identifier of the customer who owns a booking.
///
/// Customers are managed elsewhere; here they are opaque non-empty strings
/// (account ids, email addresses and the like).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CustomerId(String);

impl CustomerId {
    /// Parse a customer identifier: non-empty, printable, at most 120 chars.
    pub fn parse(s: &str) -> Result<Self, InvalidCustomerId> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(InvalidCustomerId {
                reason: "must not be empty",
            });
        }

        if trimmed.chars().count() > 120 {
            return Err(InvalidCustomerId {
                reason: "must be at most 120 characters",
            });
        }

        if trimmed.chars().any(char::is_control) {
            return Err(InvalidCustomerId {
                reason: "must not contain control characters",
            });
        }

        Ok(CustomerId(trimmed.to_owned()))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CustomerId({})", self.0)
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Error returned when parsing an unknown booking status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown booking status: {value}")]
pub struct InvalidStatus {
    value: String,
}

/// Lifecycle state of a booking.
///
/// `Upcoming` is the only live state. Once a missed booking has been
/// handled it lands in exactly one terminal state and stays there.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum BookingStatus {
    /// Not yet resolved; the passenger may still travel or may have missed
    /// the train.
    Upcoming,
    /// The passenger missed the train and was moved to a later service.
    MissedRescheduled,
    /// The passenger missed the train and no acceptable alternative existed.
    MissedFailed,
}

impl BookingStatus {
    /// Canonical wire string for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Upcoming => "upcoming",
            BookingStatus::MissedRescheduled => "missed-rescheduled",
            BookingStatus::MissedFailed => "missed-failed",
        }
    }

    /// Parse a status from its wire string.
    pub fn parse(s: &str) -> Result<Self, InvalidStatus> {
        match s.trim() {
            "upcoming" => Ok(BookingStatus::Upcoming),
            "missed-rescheduled" => Ok(BookingStatus::MissedRescheduled),
            "missed-failed" => Ok(BookingStatus::MissedFailed),
            other => Err(InvalidStatus {
                value: other.to_owned(),
            }),
        }
    }

    /// Whether this is a terminal state.
    pub fn is_resolved(&self) -> bool {
        !matches!(self, BookingStatus::Upcoming)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a booking has already left the `Upcoming` state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("booking was already resolved as {status}")]
pub struct AlreadyResolved {
    /// The terminal status the booking already holds.
    pub status: BookingStatus,
}

/// Error returned when constructing an invalid booking.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid booking: {reason}")]
pub struct InvalidBooking {
    reason: &'static str,
}

/// Largest party size a single booking may cover.
const MAX_PASSENGERS: u32 = 100;

/// Details needed to create a booking against a train.
pub struct NewBooking<'a> {
    /// Owning customer.
    pub customer: CustomerId,
    /// The train being booked; name, number, route and departure are
    /// snapshotted from it.
    pub train: &'a Train,
    /// Travel date.
    pub date: NaiveDate,
    /// Booked travel class.
    pub class: TravelClass,
    /// Party size.
    pub passengers: u32,
    /// Total charged for the whole party.
    pub total_price: Money,
}

/// A ticket purchase for one party on one train on one date.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Booking {
    id: BookingId,
    customer: CustomerId,
    train_id: TrainId,
    train_name: String,
    train_number: TrainNumber,
    route: Route,
    date: NaiveDate,
    departs: TimeOfDay,
    class: TravelClass,
    passengers: u32,
    total_price: Money,
    status: BookingStatus,
}

impl Booking {
    /// Create an `Upcoming` booking with a fresh identifier.
    ///
    /// The party size must be between 1 and 100, and the train must sell
    /// the requested class.
    pub fn create(details: NewBooking<'_>) -> Result<Self, InvalidBooking> {
        if details.passengers == 0 {
            return Err(InvalidBooking {
                reason: "must cover at least one passenger",
            });
        }

        if details.passengers > MAX_PASSENGERS {
            return Err(InvalidBooking {
                reason: "must cover at most 100 passengers",
            });
        }

        if details.train.class(details.class).is_none() {
            return Err(InvalidBooking {
                reason: "train does not sell the requested class",
            });
        }

        Ok(Booking {
            id: BookingId::generate(),
            customer: details.customer,
            train_id: details.train.id().clone(),
            train_name: details.train.name().to_owned(),
            train_number: details.train.number().clone(),
            route: details.train.route().clone(),
            date: details.date,
            departs: details.train.departs(),
            class: details.class,
            passengers: details.passengers,
            total_price: details.total_price,
            status: BookingStatus::Upcoming,
        })
    }

    /// Returns the booking identifier.
    pub fn id(&self) -> BookingId {
        self.id
    }

    /// Returns the owning customer.
    pub fn customer(&self) -> &CustomerId {
        &self.customer
    }

    /// Returns the booked train's catalogue identifier.
    pub fn train_id(&self) -> &TrainId {
        &self.train_id
    }

    /// Returns the booked train's display name, as it was at purchase time.
    pub fn train_name(&self) -> &str {
        &self.train_name
    }

    /// Returns the booked train's running number.
    pub fn train_number(&self) -> &TrainNumber {
        &self.train_number
    }

    /// Returns the booked route.
    pub fn route(&self) -> &Route {
        &self.route
    }

    /// Returns the travel date.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Returns the scheduled departure time.
    pub fn departs(&self) -> TimeOfDay {
        self.departs
    }

    /// Returns the booked travel class.
    pub fn class(&self) -> TravelClass {
        self.class
    }

    /// Returns the party size.
    pub fn passengers(&self) -> u32 {
        self.passengers
    }

    /// Returns the total charged for the whole party.
    pub fn total_price(&self) -> Money {
        self.total_price
    }

    /// Returns the lifecycle state.
    pub fn status(&self) -> BookingStatus {
        self.status
    }

    /// The departure instant: travel date plus scheduled departure time.
    pub fn departure_instant(&self) -> NaiveDateTime {
        self.departs.on(self.date)
    }

    /// Whether the departure instant lies strictly in the past.
    pub fn has_departed(&self, now: NaiveDateTime) -> bool {
        self.departure_instant() < now
    }

    /// A booking is missed when its train has departed but nothing has been
    /// done about it yet.
    pub fn is_missed(&self, now: NaiveDateTime) -> bool {
        self.status == BookingStatus::Upcoming && self.has_departed(now)
    }

    /// Resolve this booking as rescheduled onto a later train.
    pub(crate) fn mark_rescheduled(&mut self) -> Result<(), AlreadyResolved> {
        self.transition(BookingStatus::MissedRescheduled)
    }

    /// Resolve this booking as missed with no acceptable alternative.
    pub(crate) fn mark_failed(&mut self) -> Result<(), AlreadyResolved> {
        self.transition(BookingStatus::MissedFailed)
    }

    fn transition(&mut self, to: BookingStatus) -> Result<(), AlreadyResolved> {
        if self.status.is_resolved() {
            return Err(AlreadyResolved {
                status: self.status,
            });
        }

        self.status = to;
        Ok(())
    }
}

impl fmt::Display for Booking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} x{} {} on {} ({} {}, {})",
            self.train_name,
            self.passengers,
            self.class,
            self.date,
            self.route,
            self.departs,
            self.status
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SeatClass, Station};

    fn train() -> Train {
        Train::new(
            TrainId::parse("raj-12951").unwrap(),
            "Rajdhani Express",
            TrainNumber::parse("12951").unwrap(),
            Route::new(
                Station::parse("New Delhi").unwrap(),
                Station::parse("Mumbai Central").unwrap(),
            )
            .unwrap(),
            TimeOfDay::parse_hhmm("16:25").unwrap(),
            TimeOfDay::parse_hhmm("08:35").unwrap(),
            vec![
                SeatClass::new(TravelClass::Economy, 100, Money::from_cents(3000)),
                SeatClass::new(TravelClass::Business, 30, Money::from_cents(7000)),
            ],
        )
        .unwrap()
    }

    fn booking(passengers: u32) -> Booking {
        let train = train();
        Booking::create(NewBooking {
            customer: CustomerId::parse("alice@example.com").unwrap(),
            train: &train,
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            class: TravelClass::Economy,
            passengers,
            total_price: Money::from_cents(3000).times(passengers),
        })
        .unwrap()
    }

    #[test]
    fn create_snapshots_train_details() {
        let booking = booking(2);

        assert_eq!(booking.train_name(), "Rajdhani Express");
        assert_eq!(booking.train_number().as_str(), "12951");
        assert_eq!(booking.route().origin().as_str(), "New Delhi");
        assert_eq!(booking.departs().to_string(), "16:25");
        assert_eq!(booking.status(), BookingStatus::Upcoming);
        assert_eq!(booking.total_price(), Money::from_cents(6000));
    }

    #[test]
    fn create_rejects_bad_party_sizes() {
        let train = train();
        let base = |passengers| {
            Booking::create(NewBooking {
                customer: CustomerId::parse("alice@example.com").unwrap(),
                train: &train,
                date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                class: TravelClass::Economy,
                passengers,
                total_price: Money::ZERO,
            })
        };

        assert!(base(0).is_err());
        assert!(base(101).is_err());
        assert!(base(1).is_ok());
        assert!(base(100).is_ok());
    }

    #[test]
    fn create_rejects_class_the_train_does_not_sell() {
        let train = train();
        let result = Booking::create(NewBooking {
            customer: CustomerId::parse("alice@example.com").unwrap(),
            train: &train,
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            class: TravelClass::First,
            passengers: 1,
            total_price: Money::ZERO,
        });

        assert!(result.is_err());
    }

    #[test]
    fn fresh_ids_are_unique() {
        assert_ne!(booking(1).id(), booking(1).id());
    }

    #[test]
    fn departure_is_strictly_in_the_past() {
        let booking = booking(1);
        let departure = booking.departure_instant();

        assert!(!booking.has_departed(departure - chrono::Duration::minutes(1)));
        assert!(!booking.has_departed(departure));
        assert!(booking.has_departed(departure + chrono::Duration::minutes(1)));
    }

    #[test]
    fn missed_requires_departed_and_upcoming() {
        let mut booking = booking(1);
        let before = booking.departure_instant() - chrono::Duration::hours(1);
        let after = booking.departure_instant() + chrono::Duration::hours(1);

        assert!(!booking.is_missed(before));
        assert!(booking.is_missed(after));

        booking.mark_failed().unwrap();
        assert!(!booking.is_missed(after));
    }

    #[test]
    fn resolution_is_exactly_once() {
        let mut booking = booking(1);
        booking.mark_rescheduled().unwrap();
        assert_eq!(booking.status(), BookingStatus::MissedRescheduled);

        let err = booking.mark_failed().unwrap_err();
        assert_eq!(err.status, BookingStatus::MissedRescheduled);
        assert_eq!(booking.status(), BookingStatus::MissedRescheduled);

        let err = booking.mark_rescheduled().unwrap_err();
        assert_eq!(err.status, BookingStatus::MissedRescheduled);
    }

    #[test]
    fn status_wire_strings() {
        assert_eq!(BookingStatus::Upcoming.as_str(), "upcoming");
        assert_eq!(
            BookingStatus::MissedRescheduled.as_str(),
            "missed-rescheduled"
        );
        assert_eq!(BookingStatus::MissedFailed.as_str(), "missed-failed");

        for status in [
            BookingStatus::Upcoming,
            BookingStatus::MissedRescheduled,
            BookingStatus::MissedFailed,
        ] {
            assert_eq!(BookingStatus::parse(status.as_str()).unwrap(), status);
        }
        assert!(BookingStatus::parse("cancelled").is_err());
    }

    #[test]
    fn customer_id_validation() {
        assert!(CustomerId::parse("alice@example.com").is_ok());
        assert_eq!(CustomerId::parse(" bob ").unwrap().as_str(), "bob");
        assert!(CustomerId::parse("").is_err());
        assert!(CustomerId::parse("  ").is_err());
        assert!(CustomerId::parse("a\nb").is_err());
        assert!(CustomerId::parse(&"x".repeat(121)).is_err());
    }

    #[test]
    fn booking_id_roundtrip() {
        let id = BookingId::generate();
        assert_eq!(BookingId::parse(&id.to_string()).unwrap(), id);
        assert!(BookingId::parse("not-a-uuid").is_err());
        assert!(BookingId::parse("").is_err());
    }
}
