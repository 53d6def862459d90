//! Core domain types for the booking service.
//!
//! Everything here is valid by construction: parsing and constructors
//! validate, and the rest of the crate can then trust the values it holds.
//! These types are independent of storage, HTTP and the fare lookup
//! backend.

mod booking;
mod money;
mod seat_class;
mod station;
mod time;
mod train;

pub use booking::{
    AlreadyResolved, Booking, BookingId, BookingStatus, CustomerId, InvalidBooking,
    InvalidBookingId, InvalidCustomerId, InvalidStatus, NewBooking,
};
pub use money::Money;
pub use seat_class::{InvalidTravelClass, SeatClass, TravelClass};
pub use station::{InvalidRoute, InvalidStation, Route, Station};
pub use time::{TimeError, TimeOfDay, format_duration};
pub use train::{
    InvalidTrain, InvalidTrainId, InvalidTrainNumber, ReservationError, Train, TrainId,
    TrainNumber,
};
