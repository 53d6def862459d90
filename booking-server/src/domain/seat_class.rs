//! Travel class ranking and per-class seat inventory.

use super::Money;
use std::fmt;

/// Error returned when parsing an unknown travel class.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown travel class: {value} (expected Economy, Business or First)")]
pub struct InvalidTravelClass {
    value: String,
}

/// A travel class, ranked by comfort.
///
/// The derived ordering follows declaration order, so `Economy` is the
/// lowest class and `First` the highest. Rebooking treats a higher class as
/// an acceptable upgrade but never downgrades.
///
/// # Examples
///
/// ```
/// use booking_server::domain::TravelClass;
///
/// assert!(TravelClass::Economy < TravelClass::Business);
/// assert!(TravelClass::Business < TravelClass::First);
///
/// // Classes acceptable to a Business passenger, best last
/// let acceptable: Vec<_> = TravelClass::Business.or_better().collect();
/// assert_eq!(acceptable, vec![TravelClass::Business, TravelClass::First]);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum TravelClass {
    Economy,
    Business,
    First,
}

impl TravelClass {
    /// All classes, worst to best.
    pub const ALL: [TravelClass; 3] = [
        TravelClass::Economy,
        TravelClass::Business,
        TravelClass::First,
    ];

    /// Rank within the comfort ordering, 0 for the lowest class.
    pub fn rank(&self) -> usize {
        *self as usize
    }

    /// Iterate this class and every better one, in ascending comfort order.
    ///
    /// This is the acceptance ladder for rebooking: a passenger keeps their
    /// class or moves up, never down.
    pub fn or_better(self) -> impl Iterator<Item = TravelClass> {
        Self::ALL[self.rank()..].iter().copied()
    }

    /// Parse a class name, ignoring case and surrounding whitespace.
    ///
    /// # Examples
    ///
    /// ```
    /// use booking_server::domain::TravelClass;
    ///
    /// assert_eq!(TravelClass::parse("Economy").unwrap(), TravelClass::Economy);
    /// assert_eq!(TravelClass::parse("first").unwrap(), TravelClass::First);
    /// assert!(TravelClass::parse("Sleeper").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, InvalidTravelClass> {
        match s.trim().to_ascii_lowercase().as_str() {
            "economy" => Ok(TravelClass::Economy),
            "business" => Ok(TravelClass::Business),
            "first" => Ok(TravelClass::First),
            _ => Err(InvalidTravelClass {
                value: s.to_owned(),
            }),
        }
    }

    /// Canonical class name.
    pub fn as_str(&self) -> &'static str {
        match self {
            TravelClass::Economy => "Economy",
            TravelClass::Business => "Business",
            TravelClass::First => "First",
        }
    }
}

impl fmt::Display for TravelClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TravelClass {
    type Err = InvalidTravelClass;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Seat inventory for one class on one train: availability plus the
/// per-seat fare.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct SeatClass {
    /// Which class this entry describes.
    pub class: TravelClass,
    /// Seats currently available for sale.
    pub available: u32,
    /// Fare per seat.
    pub price: Money,
}

impl SeatClass {
    /// Create a seat inventory entry.
    pub fn new(class: TravelClass, available: u32, price: Money) -> Self {
        Self {
            class,
            available,
            price,
        }
    }

    /// Whether this class can seat `passengers` together.
    pub fn can_seat(&self, passengers: u32) -> bool {
        self.available >= passengers
    }
}

impl fmt::Display for SeatClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} seats at {})", self.class, self.available, self.price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comfort_ordering() {
        assert!(TravelClass::Economy < TravelClass::Business);
        assert!(TravelClass::Business < TravelClass::First);
        assert_eq!(TravelClass::Economy.rank(), 0);
        assert_eq!(TravelClass::First.rank(), 2);
    }

    #[test]
    fn or_better_from_each_class() {
        let from_economy: Vec<_> = TravelClass::Economy.or_better().collect();
        assert_eq!(from_economy, TravelClass::ALL.to_vec());

        let from_business: Vec<_> = TravelClass::Business.or_better().collect();
        assert_eq!(from_business, vec![TravelClass::Business, TravelClass::First]);

        let from_first: Vec<_> = TravelClass::First.or_better().collect();
        assert_eq!(from_first, vec![TravelClass::First]);
    }

    #[test]
    fn parse_accepts_any_case() {
        assert_eq!(TravelClass::parse("Economy").unwrap(), TravelClass::Economy);
        assert_eq!(TravelClass::parse("ECONOMY").unwrap(), TravelClass::Economy);
        assert_eq!(TravelClass::parse("business").unwrap(), TravelClass::Business);
        assert_eq!(TravelClass::parse(" First ").unwrap(), TravelClass::First);
    }

    #[test]
    fn parse_rejects_unknown() {
        assert!(TravelClass::parse("").is_err());
        assert!(TravelClass::parse("Sleeper").is_err());
        assert!(TravelClass::parse("2A").is_err());

        let err = TravelClass::parse("Standard").unwrap_err();
        assert!(err.to_string().contains("Standard"));
    }

    #[test]
    fn display_roundtrips_through_parse() {
        for class in TravelClass::ALL {
            assert_eq!(TravelClass::parse(class.as_str()).unwrap(), class);
        }
    }

    #[test]
    fn can_seat_compares_availability() {
        let entry = SeatClass::new(TravelClass::Economy, 4, Money::from_cents(2000));
        assert!(entry.can_seat(1));
        assert!(entry.can_seat(4));
        assert!(!entry.can_seat(5));

        let empty = SeatClass::new(TravelClass::First, 0, Money::from_cents(9000));
        assert!(!empty.can_seat(1));
        assert!(empty.can_seat(0));
    }
}
