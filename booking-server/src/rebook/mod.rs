//! Rebooking policy for missed trains.
//!
//! The matcher is a pure function over a booking and a snapshot of
//! candidate trains: no clocks, no IO, no randomness. Policy in one
//! sentence: move the party to the earliest train on the same route that
//! departs after the one they missed and can seat everyone together in
//! their class or better.
//!
//! Side effects (reserving the seats, recording the outcome) live in
//! [`crate::bookings`], which calls in here.

mod matcher;

pub use matcher::{RebookDecline, Rebooking, find_replacement};
