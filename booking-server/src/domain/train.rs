//! Train identity and timetable entry types.

use super::{Money, Route, SeatClass, TimeOfDay, TravelClass, format_duration};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::fmt;

/// Error returned when parsing an invalid train identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid train id: {reason}")]
pub struct InvalidTrainId {
    reason: &'static str,
}

/// An opaque unique identifier for a train service.
///
/// The catalogue assigns these; we only require them to be non-empty and
/// printable ASCII so they can travel in URLs and logs unmangled.
///
/// # Examples
///
/// ```
/// use booking_server::domain::TrainId;
///
/// let id = TrainId::parse("raj-12951").unwrap();
/// assert_eq!(id.as_str(), "raj-12951");
/// assert!(TrainId::parse("").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TrainId(String);

impl TrainId {
    /// Parse a train identifier from a string.
    pub fn parse(s: &str) -> Result<Self, InvalidTrainId> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(InvalidTrainId {
                reason: "must not be empty",
            });
        }

        if trimmed.len() > 64 {
            return Err(InvalidTrainId {
                reason: "must be at most 64 characters",
            });
        }

        if !trimmed.bytes().all(|b| b.is_ascii_graphic()) {
            return Err(InvalidTrainId {
                reason: "must be printable ASCII without spaces",
            });
        }

        Ok(TrainId(trimmed.to_owned()))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for TrainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TrainId({})", self.0)
    }
}

impl fmt::Display for TrainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Error returned when parsing an invalid train number.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid train number: {reason}")]
pub struct InvalidTrainNumber {
    reason: &'static str,
}

/// A public-facing train running number, e.g. "12951".
///
/// Running numbers are 4 or 5 ASCII digits. They identify the service to
/// passengers but are not guaranteed unique in the catalogue; use
/// [`TrainId`] for identity.
///
/// # Examples
///
/// ```
/// use booking_server::domain::TrainNumber;
///
/// let number = TrainNumber::parse("12951").unwrap();
/// assert_eq!(number.as_str(), "12951");
///
/// assert!(TrainNumber::parse("129").is_err());
/// assert!(TrainNumber::parse("12A51").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TrainNumber(String);

impl TrainNumber {
    /// Parse a running number: exactly 4 or 5 ASCII digits.
    pub fn parse(s: &str) -> Result<Self, InvalidTrainNumber> {
        let bytes = s.as_bytes();

        if bytes.len() < 4 || bytes.len() > 5 {
            return Err(InvalidTrainNumber {
                reason: "must be 4 or 5 digits",
            });
        }

        if !bytes.iter().all(u8::is_ascii_digit) {
            return Err(InvalidTrainNumber {
                reason: "must contain only digits 0-9",
            });
        }

        Ok(TrainNumber(s.to_owned()))
    }

    /// Returns the running number as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for TrainNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TrainNumber({})", self.0)
    }
}

impl fmt::Display for TrainNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Error returned when constructing an invalid train.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid train: {reason}")]
pub struct InvalidTrain {
    reason: &'static str,
}

/// Error returned when a seat reservation cannot be satisfied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReservationError {
    /// The train does not sell the requested class at all.
    #[error("class {0} is not sold on this train")]
    ClassNotSold(TravelClass),

    /// The class exists but has too few seats left.
    #[error("not enough seats: requested {requested}, available {available}")]
    InsufficientSeats { requested: u32, available: u32 },
}

/// A scheduled train service with per-class seat inventory.
///
/// A train runs a fixed daily timetable slot over one [`Route`]. Its class
/// list is non-empty, holds at most one entry per [`TravelClass`], and is
/// kept sorted worst-to-best; these invariants are established by
/// [`Train::new`] and preserved by the mutation methods.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Train {
    id: TrainId,
    name: String,
    number: TrainNumber,
    route: Route,
    departs: TimeOfDay,
    arrives: TimeOfDay,
    classes: Vec<SeatClass>,
}

impl Train {
    /// Create a train, validating and normalising the class list.
    ///
    /// The display name must be non-empty. The class list must be non-empty
    /// and contain at most one entry per class; it is sorted worst-to-best.
    pub fn new(
        id: TrainId,
        name: &str,
        number: TrainNumber,
        route: Route,
        departs: TimeOfDay,
        arrives: TimeOfDay,
        classes: Vec<SeatClass>,
    ) -> Result<Self, InvalidTrain> {
        let name = name.trim();
        if name.is_empty() {
            return Err(InvalidTrain {
                reason: "name must not be empty",
            });
        }

        if classes.is_empty() {
            return Err(InvalidTrain {
                reason: "must sell at least one class",
            });
        }

        let mut classes = classes;
        classes.sort_by_key(|entry| entry.class.rank());
        if classes.windows(2).any(|pair| pair[0].class == pair[1].class) {
            return Err(InvalidTrain {
                reason: "must not list a class twice",
            });
        }

        Ok(Train {
            id,
            name: name.to_owned(),
            number,
            route,
            departs,
            arrives,
            classes,
        })
    }

    /// Returns the catalogue identifier.
    pub fn id(&self) -> &TrainId {
        &self.id
    }

    /// Returns the display name, e.g. "Rajdhani Express".
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the public running number.
    pub fn number(&self) -> &TrainNumber {
        &self.number
    }

    /// Returns the route this train serves.
    pub fn route(&self) -> &Route {
        &self.route
    }

    /// Returns the scheduled departure time.
    pub fn departs(&self) -> TimeOfDay {
        self.departs
    }

    /// Returns the scheduled arrival time.
    pub fn arrives(&self) -> TimeOfDay {
        self.arrives
    }

    /// Departure instant on a given travel date.
    pub fn departure_on(&self, date: NaiveDate) -> NaiveDateTime {
        self.departs.on(date)
    }

    /// Scheduled journey duration.
    ///
    /// An arrival reading earlier than the departure means the service runs
    /// over midnight.
    pub fn duration(&self) -> Duration {
        self.departs.until(self.arrives)
    }

    /// Journey duration as a compact display string, e.g. "16h 10m".
    pub fn duration_display(&self) -> String {
        format_duration(self.duration())
    }

    /// Seat inventory, sorted worst class to best.
    pub fn classes(&self) -> &[SeatClass] {
        &self.classes
    }

    /// Seat inventory for one class, if the train sells it.
    pub fn class(&self, class: TravelClass) -> Option<&SeatClass> {
        self.classes.iter().find(|entry| entry.class == class)
    }

    /// Take `seats` seats in `class`, returning the per-seat fare.
    ///
    /// The availability check and the decrement happen together, so a
    /// successful return means the seats were actually taken. Callers that
    /// share a train across tasks must serialise access themselves.
    pub fn try_reserve(
        &mut self,
        class: TravelClass,
        seats: u32,
    ) -> Result<Money, ReservationError> {
        let entry = self
            .classes
            .iter_mut()
            .find(|entry| entry.class == class)
            .ok_or(ReservationError::ClassNotSold(class))?;

        if entry.available < seats {
            return Err(ReservationError::InsufficientSeats {
                requested: seats,
                available: entry.available,
            });
        }

        entry.available -= seats;
        Ok(entry.price)
    }

    /// Return `seats` seats to `class`, undoing a reservation.
    pub fn release(&mut self, class: TravelClass, seats: u32) -> Result<(), ReservationError> {
        let entry = self
            .classes
            .iter_mut()
            .find(|entry| entry.class == class)
            .ok_or(ReservationError::ClassNotSold(class))?;

        entry.available = entry.available.saturating_add(seats);
        Ok(())
    }
}

impl fmt::Display for Train {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) {} {} - {}",
            self.name, self.number, self.route, self.departs, self.arrives
        )
    }
}
