//! Train ticket booking server.
//!
//! A booking system for a fixed timetable of trains: route search, seat
//! purchase with a mock payment gateway, booking history, and automatic
//! rebooking of missed trains onto the next acceptable departure.

pub mod bookings;
pub mod catalog;
pub mod domain;
pub mod fares;
pub mod payment;
pub mod rebook;
pub mod web;
