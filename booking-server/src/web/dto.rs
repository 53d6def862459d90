//! Request and response bodies for the JSON API.

use serde::{Deserialize, Serialize};

use crate::bookings::RescheduleOutcome;
use crate::domain::{Booking, SeatClass, Train};

/// Query parameters for the train search.
#[derive(Debug, Deserialize)]
pub struct TrainSearchRequest {
    /// Origin station name (requires `to` as well)
    pub from: Option<String>,

    /// Destination station name (requires `from` as well)
    pub to: Option<String>,

    /// Travel date, YYYY-MM-DD (defaults to today)
    pub date: Option<String>,
}

/// Query parameters for booking listings.
#[derive(Debug, Deserialize)]
pub struct CustomerRequest {
    /// Customer identifier
    pub customer: String,
}

/// Request body for a seat purchase.
#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    /// Purchasing customer identifier
    pub customer: String,

    /// Catalogue identifier of the train to book
    pub train_id: String,

    /// Travel date, YYYY-MM-DD
    pub date: String,

    /// Travel class name, e.g. "Economy"
    pub class: String,

    /// Party size
    pub passengers: u32,

    /// Card number to charge
    pub card_number: String,

    /// Name on the card
    pub card_holder: String,
}

/// Query parameters for a fare enquiry.
#[derive(Debug, Deserialize)]
pub struct FareEnquiryRequest {
    /// Origin station name
    pub from: String,

    /// Destination station name
    pub to: String,

    /// Travel class name
    pub class: String,

    /// Travel date, YYYY-MM-DD
    pub date: String,
}

/// Station directory response.
#[derive(Debug, Serialize)]
pub struct StationsResponse {
    /// Station names in catalogue order
    pub stations: Vec<String>,
}

/// A seat class on a train.
#[derive(Debug, Serialize)]
pub struct SeatClassResult {
    /// Class name, e.g. "Economy"
    pub class: String,

    /// Seats still available
    pub available: u32,

    /// Per-seat price in minor units
    pub price_cents: u64,

    /// Per-seat price for display, e.g. "$45.00"
    pub price_display: String,
}

/// A train in search results or detail views.
#[derive(Debug, Serialize)]
pub struct TrainResult {
    /// Catalogue identifier
    pub id: String,

    /// Display name, e.g. "Mumbai Rajdhani Express"
    pub name: String,

    /// Public running number
    pub number: String,

    /// Origin station name
    pub from: String,

    /// Destination station name
    pub to: String,

    /// Scheduled departure time, HH:MM
    pub departs: String,

    /// Scheduled arrival time, HH:MM
    pub arrives: String,

    /// Journey duration for display, e.g. "15h 32m"
    pub duration: String,

    /// Seat classes on sale, worst class first
    pub classes: Vec<SeatClassResult>,
}

/// Response for the train search.
#[derive(Debug, Serialize)]
pub struct TrainSearchResponse {
    /// Matching trains
    pub trains: Vec<TrainResult>,
}

/// A booking in API responses.
#[derive(Debug, Serialize)]
pub struct BookingResult {
    /// Booking identifier
    pub id: String,

    /// Owning customer
    pub customer: String,

    /// Booked train's catalogue identifier
    pub train_id: String,

    /// Booked train's display name at purchase time
    pub train_name: String,

    /// Booked train's running number
    pub train_number: String,

    /// Origin station name
    pub from: String,

    /// Destination station name
    pub to: String,

    /// Travel date, YYYY-MM-DD
    pub date: String,

    /// Scheduled departure time, HH:MM
    pub departs: String,

    /// Booked travel class
    pub class: String,

    /// Party size
    pub passengers: u32,

    /// Total charged, minor units
    pub total_cents: u64,

    /// Total charged for display
    pub total_display: String,

    /// Lifecycle status: "upcoming", "missed-rescheduled" or "missed-failed"
    pub status: String,
}

/// Response for booking listings.
#[derive(Debug, Serialize)]
pub struct BookingListResponse {
    /// Bookings, oldest first
    pub bookings: Vec<BookingResult>,
}

/// Response for the reschedule flow.
///
/// Both outcomes are 200s: a decline is an answer, not an error.
#[derive(Debug, Serialize)]
pub struct RescheduleResponse {
    /// Whether a replacement was booked
    pub rescheduled: bool,

    /// Human-readable summary of the outcome
    pub message: String,

    /// The original booking with its final status
    pub original: BookingResult,

    /// The replacement booking, when one was made
    pub replacement: Option<BookingResult>,
}

/// Response for a fare enquiry.
#[derive(Debug, Serialize)]
pub struct FareTextResponse {
    /// Prose fare information
    pub fare_information: String,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

// Conversion implementations

impl SeatClassResult {
    /// Create from a domain SeatClass.
    pub fn from_seat_class(entry: &SeatClass) -> Self {
        Self {
            class: entry.class.to_string(),
            available: entry.available,
            price_cents: entry.price.cents(),
            price_display: entry.price.to_string(),
        }
    }
}

impl TrainResult {
    /// Create from a domain Train.
    pub fn from_train(train: &Train) -> Self {
        Self {
            id: train.id().as_str().to_string(),
            name: train.name().to_string(),
            number: train.number().as_str().to_string(),
            from: train.route().origin().as_str().to_string(),
            to: train.route().destination().as_str().to_string(),
            departs: train.departs().to_string(),
            arrives: train.arrives().to_string(),
            duration: train.duration_display(),
            classes: train
                .classes()
                .iter()
                .map(SeatClassResult::from_seat_class)
                .collect(),
        }
    }
}

impl BookingResult {
    /// Create from a domain Booking.
    pub fn from_booking(booking: &Booking) -> Self {
        Self {
            id: booking.id().to_string(),
            customer: booking.customer().to_string(),
            train_id: booking.train_id().as_str().to_string(),
            train_name: booking.train_name().to_string(),
            train_number: booking.train_number().as_str().to_string(),
            from: booking.route().origin().as_str().to_string(),
            to: booking.route().destination().as_str().to_string(),
            date: booking.date().format("%Y-%m-%d").to_string(),
            departs: booking.departs().to_string(),
            class: booking.class().to_string(),
            passengers: booking.passengers(),
            total_cents: booking.total_price().cents(),
            total_display: booking.total_price().to_string(),
            status: booking.status().to_string(),
        }
    }
}

impl RescheduleResponse {
    /// Create from a reschedule outcome.
    pub fn from_outcome(outcome: &RescheduleOutcome) -> Self {
        match outcome {
            RescheduleOutcome::Rescheduled {
                original,
                replacement,
            } => Self {
                rescheduled: true,
                message: format!(
                    "Rebooked onto {} ({}) departing at {}.",
                    replacement.train_name(),
                    replacement.train_number().as_str(),
                    replacement.departs()
                ),
                original: BookingResult::from_booking(original),
                replacement: Some(BookingResult::from_booking(replacement)),
            },
            RescheduleOutcome::Declined { original, reason } => Self {
                rescheduled: false,
                message: format!("Could not rebook: {reason}."),
                original: BookingResult::from_booking(original),
                replacement: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        CustomerId, Money, NewBooking, Route, Station, TimeOfDay, TrainId, TrainNumber,
        TravelClass,
    };
    use chrono::NaiveDate;

    fn make_test_train() -> Train {
        Train::new(
            TrainId::parse("raj-12951").unwrap(),
            "Mumbai Rajdhani Express",
            TrainNumber::parse("12951").unwrap(),
            Route::new(
                Station::parse("Mumbai Central").unwrap(),
                Station::parse("New Delhi").unwrap(),
            )
            .unwrap(),
            TimeOfDay::parse_hhmm("17:00").unwrap(),
            TimeOfDay::parse_hhmm("08:32").unwrap(),
            vec![
                SeatClass::new(TravelClass::First, 12, Money::from_cents(17500)),
                SeatClass::new(TravelClass::Economy, 120, Money::from_cents(4500)),
            ],
        )
        .unwrap()
    }

    fn make_test_booking() -> Booking {
        Booking::create(NewBooking {
            customer: CustomerId::parse("alice@example.com").unwrap(),
            train: &make_test_train(),
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            class: TravelClass::Economy,
            passengers: 2,
            total_price: Money::from_cents(9000),
        })
        .unwrap()
    }

    #[test]
    fn train_result_from_train() {
        let result = TrainResult::from_train(&make_test_train());

        assert_eq!(result.id, "raj-12951");
        assert_eq!(result.name, "Mumbai Rajdhani Express");
        assert_eq!(result.number, "12951");
        assert_eq!(result.from, "Mumbai Central");
        assert_eq!(result.to, "New Delhi");
        assert_eq!(result.departs, "17:00");
        assert_eq!(result.arrives, "08:32");
        assert_eq!(result.duration, "15h 32m");

        // Classes come out worst-first regardless of construction order.
        assert_eq!(result.classes.len(), 2);
        assert_eq!(result.classes[0].class, "Economy");
        assert_eq!(result.classes[0].price_cents, 4500);
        assert_eq!(result.classes[0].price_display, "$45.00");
        assert_eq!(result.classes[1].class, "First");
    }

    #[test]
    fn booking_result_from_booking() {
        let booking = make_test_booking();
        let result = BookingResult::from_booking(&booking);

        assert_eq!(result.id, booking.id().to_string());
        assert_eq!(result.customer, "alice@example.com");
        assert_eq!(result.train_id, "raj-12951");
        assert_eq!(result.train_name, "Mumbai Rajdhani Express");
        assert_eq!(result.date, "2024-06-01");
        assert_eq!(result.departs, "17:00");
        assert_eq!(result.class, "Economy");
        assert_eq!(result.passengers, 2);
        assert_eq!(result.total_cents, 9000);
        assert_eq!(result.total_display, "$90.00");
        assert_eq!(result.status, "upcoming");
    }

    #[test]
    fn reschedule_response_for_a_decline() {
        let booking = make_test_booking();
        let outcome = RescheduleOutcome::Declined {
            original: booking,
            reason: crate::rebook::RebookDecline::NoLaterDeparture,
        };

        let response = RescheduleResponse::from_outcome(&outcome);
        assert!(!response.rescheduled);
        assert!(response.replacement.is_none());
        assert!(response.message.contains("no later departures"));
    }

    #[test]
    fn error_response_serializes_as_expected() {
        let response = ErrorResponse {
            error: "something broke".to_string(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["error"], "something broke");
    }
}
