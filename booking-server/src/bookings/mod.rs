//! Booking records and the flows that create and resolve them.
//!
//! [`store`] keeps the records and owns the exactly-once resolution of
//! missed bookings; [`service`] orchestrates purchases and the missed-train
//! flow across the catalogue, the store and the payment gateway.

mod service;
mod store;

pub use service::{BookRequest, BookingError, BookingService, RescheduleOutcome};
pub use store::{BookingStore, InMemoryBookings, StoreError};
