//! Station name types.

use std::fmt;

/// Error returned when parsing an invalid station name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid station name: {reason}")]
pub struct InvalidStation {
    reason: &'static str,
}

/// A validated station name, e.g. "Mumbai Central".
///
/// Station names are free text rather than codes, so validation is about
/// hygiene: the name must be non-empty after trimming, printable, and of
/// sensible length. Comparison is exact (case-sensitive), matching how the
/// catalogue stores its stations.
///
/// # Examples
///
/// ```
/// use booking_server::domain::Station;
///
/// let station = Station::parse("New Delhi").unwrap();
/// assert_eq!(station.as_str(), "New Delhi");
///
/// // Surrounding whitespace is trimmed
/// assert_eq!(Station::parse("  Howrah ").unwrap().as_str(), "Howrah");
///
/// // Empty names are rejected
/// assert!(Station::parse("").is_err());
/// assert!(Station::parse("   ").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Station(String);

/// Longest station name we accept.
const MAX_STATION_LEN: usize = 80;

impl Station {
    /// Parse a station name from a string.
    ///
    /// Trims surrounding whitespace, then requires a non-empty name of at
    /// most 80 characters with no control characters.
    pub fn parse(s: &str) -> Result<Self, InvalidStation> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(InvalidStation {
                reason: "must not be empty",
            });
        }

        if trimmed.chars().count() > MAX_STATION_LEN {
            return Err(InvalidStation {
                reason: "must be at most 80 characters",
            });
        }

        if trimmed.chars().any(char::is_control) {
            return Err(InvalidStation {
                reason: "must not contain control characters",
            });
        }

        Ok(Station(trimmed.to_owned()))
    }

    /// Returns the station name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Station({})", self.0)
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Error returned when constructing an invalid route.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid route: {reason}")]
pub struct InvalidRoute {
    reason: &'static str,
}

/// An ordered (origin, destination) pair of stations.
///
/// Direction matters: "New Delhi to Mumbai Central" and "Mumbai Central to
/// New Delhi" are different routes. The two endpoints must differ.
///
/// # Examples
///
/// ```
/// use booking_server::domain::{Route, Station};
///
/// let from = Station::parse("New Delhi").unwrap();
/// let to = Station::parse("Mumbai Central").unwrap();
/// let route = Route::new(from.clone(), to).unwrap();
/// assert_eq!(route.origin(), &from);
///
/// // A route must go somewhere
/// assert!(Route::new(from.clone(), from).is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Route {
    origin: Station,
    destination: Station,
}

impl Route {
    /// Create a route between two distinct stations.
    pub fn new(origin: Station, destination: Station) -> Result<Self, InvalidRoute> {
        if origin == destination {
            return Err(InvalidRoute {
                reason: "origin and destination must differ",
            });
        }

        Ok(Route {
            origin,
            destination,
        })
    }

    /// Returns the origin station.
    pub fn origin(&self) -> &Station {
        &self.origin
    }

    /// Returns the destination station.
    pub fn destination(&self) -> &Station {
        &self.destination
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Route({} -> {})", self.origin, self.destination)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.origin, self.destination)
    }
}
