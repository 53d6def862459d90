//! In-memory train catalogue.
//!
//! Owns the timetable and seat inventory behind a single `RwLock`, which is
//! what makes seat reservation a genuinely atomic check-and-decrement:
//! every reservation takes the write lock, so no interleaving can sell the
//! same seat twice.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;

use crate::domain::{
    Money, ReservationError, Route, SeatClass, Station, TimeOfDay, Train, TrainId, TrainNumber,
    TravelClass,
};

use super::{CatalogError, Seed, TrainCatalog};

/// Error returned when assembling an inconsistent catalogue.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid catalogue: {reason}")]
pub struct InvalidCatalog {
    reason: String,
}

impl InvalidCatalog {
    fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

struct CatalogState {
    stations: Vec<Station>,
    trains: Vec<Train>,
    index: HashMap<TrainId, usize>,
}

/// Injectable in-memory catalogue seeded at startup.
///
/// Cheap to clone; clones share the same underlying state.
#[derive(Clone)]
pub struct InMemoryCatalog {
    state: Arc<RwLock<CatalogState>>,
}

impl InMemoryCatalog {
    /// Build a catalogue from an explicit station directory and timetable.
    ///
    /// Strict: station names must be unique, train ids must be unique, and
    /// every route endpoint must appear in the station directory. Seed
    /// files go through this path so inconsistent data is rejected loudly
    /// at startup rather than surfacing as empty search results later.
    pub fn new(stations: Vec<Station>, trains: Vec<Train>) -> Result<Self, InvalidCatalog> {
        let mut seen_stations = std::collections::HashSet::new();
        for station in &stations {
            if !seen_stations.insert(station.clone()) {
                return Err(InvalidCatalog::new(format!(
                    "station listed twice: {station}"
                )));
            }
        }

        let mut index = HashMap::new();
        for (position, train) in trains.iter().enumerate() {
            if index.insert(train.id().clone(), position).is_some() {
                return Err(InvalidCatalog::new(format!(
                    "train id listed twice: {}",
                    train.id()
                )));
            }

            for endpoint in [train.route().origin(), train.route().destination()] {
                if !seen_stations.contains(endpoint) {
                    return Err(InvalidCatalog::new(format!(
                        "train {} calls at unknown station: {endpoint}",
                        train.id()
                    )));
                }
            }
        }

        Ok(Self {
            state: Arc::new(RwLock::new(CatalogState {
                stations,
                trains,
                index,
            })),
        })
    }

    /// Build a catalogue from a parsed seed file.
    pub fn from_seed(seed: Seed) -> Result<Self, InvalidCatalog> {
        Self::new(seed.stations, seed.trains)
    }
}

#[async_trait]
impl TrainCatalog for InMemoryCatalog {
    async fn stations(&self) -> Result<Vec<Station>, CatalogError> {
        let state = self.state.read().await;
        Ok(state.stations.clone())
    }

    async fn all_trains(&self) -> Result<Vec<Train>, CatalogError> {
        let state = self.state.read().await;
        Ok(state.trains.clone())
    }

    async fn trains_serving(
        &self,
        route: &Route,
        _date: NaiveDate,
    ) -> Result<Vec<Train>, CatalogError> {
        let state = self.state.read().await;
        Ok(state
            .trains
            .iter()
            .filter(|train| train.route() == route)
            .cloned()
            .collect())
    }

    async fn train(&self, id: &TrainId) -> Result<Train, CatalogError> {
        let state = self.state.read().await;
        state
            .index
            .get(id)
            .map(|&position| state.trains[position].clone())
            .ok_or_else(|| CatalogError::TrainNotFound(id.clone()))
    }

    async fn reserve_seats(
        &self,
        id: &TrainId,
        class: TravelClass,
        seats: u32,
    ) -> Result<Money, CatalogError> {
        let mut state = self.state.write().await;
        let position = *state
            .index
            .get(id)
            .ok_or_else(|| CatalogError::TrainNotFound(id.clone()))?;

        state.trains[position]
            .try_reserve(class, seats)
            .map_err(|err| reservation_error(id, class, err))
    }

    async fn release_seats(
        &self,
        id: &TrainId,
        class: TravelClass,
        seats: u32,
    ) -> Result<(), CatalogError> {
        let mut state = self.state.write().await;
        let position = *state
            .index
            .get(id)
            .ok_or_else(|| CatalogError::TrainNotFound(id.clone()))?;

        state.trains[position]
            .release(class, seats)
            .map_err(|err| reservation_error(id, class, err))
    }
}

fn reservation_error(id: &TrainId, class: TravelClass, err: ReservationError) -> CatalogError {
    match err {
        ReservationError::ClassNotSold(class) => CatalogError::ClassNotSold {
            train: id.clone(),
            class,
        },
        ReservationError::InsufficientSeats {
            requested,
            available,
        } => CatalogError::InsufficientSeats {
            train: id.clone(),
            class,
            requested,
            available,
        },
    }
}

/// Forgiving builder for hand-written timetables.
///
/// Entries that fail to parse are silently dropped and duplicate train ids
/// keep the first entry, so a literal dataset can be written as plain
/// strings. The station directory is derived from the routes in order of
/// first appearance. Seed files should use [`InMemoryCatalog::from_seed`]
/// instead, which rejects bad data.
#[derive(Default)]
pub struct TimetableBuilder {
    stations: Vec<Station>,
    trains: Vec<Train>,
}

impl TimetableBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a train from string literals.
    ///
    /// `classes` pairs each travel class with `(available, price_cents)`.
    #[allow(clippy::too_many_arguments)]
    pub fn train(
        mut self,
        id: &str,
        name: &str,
        number: &str,
        from: &str,
        to: &str,
        departs: &str,
        arrives: &str,
        classes: &[(TravelClass, u32, u64)],
    ) -> Self {
        let parsed = (
            TrainId::parse(id).ok(),
            TrainNumber::parse(number).ok(),
            Station::parse(from).ok(),
            Station::parse(to).ok(),
            TimeOfDay::parse_hhmm(departs).ok(),
            TimeOfDay::parse_hhmm(arrives).ok(),
        );

        let (Some(id), Some(number), Some(from), Some(to), Some(departs), Some(arrives)) = parsed
        else {
            return self;
        };

        let Ok(route) = Route::new(from, to) else {
            return self;
        };

        let seat_classes: Vec<SeatClass> = classes
            .iter()
            .map(|&(class, available, price_cents)| {
                SeatClass::new(class, available, Money::from_cents(price_cents))
            })
            .collect();

        let Ok(train) = Train::new(id, name, number, route, departs, arrives, seat_classes) else {
            return self;
        };

        if self.trains.iter().any(|t| t.id() == train.id()) {
            return self;
        }

        for endpoint in [train.route().origin(), train.route().destination()] {
            if !self.stations.contains(endpoint) {
                self.stations.push(endpoint.clone());
            }
        }
        self.trains.push(train);
        self
    }

    /// Build the catalogue.
    pub fn build(self) -> InMemoryCatalog {
        InMemoryCatalog {
            state: Arc::new(RwLock::new(CatalogState {
                index: self
                    .trains
                    .iter()
                    .enumerate()
                    .map(|(position, train)| (train.id().clone(), position))
                    .collect(),
                stations: self.stations,
                trains: self.trains,
            })),
        }
    }
}

/// The built-in demonstration timetable.
///
/// A handful of long-distance services between major Indian stations,
/// enough to exercise search, booking and rebooking without a seed file.
/// Several routes run multiple trains a day so a missed morning train has
/// afternoon and evening alternatives.
pub fn demo_catalog() -> InMemoryCatalog {
    use TravelClass::{Business, Economy, First};

    TimetableBuilder::new()
        .train(
            "raj-12951",
            "Mumbai Rajdhani Express",
            "12951",
            "Mumbai Central",
            "New Delhi",
            "17:00",
            "08:32",
            &[(Economy, 120, 4500), (Business, 48, 9800), (First, 12, 17500)],
        )
        .train(
            "aug-12953",
            "August Kranti Rajdhani",
            "12953",
            "Mumbai Central",
            "New Delhi",
            "17:40",
            "10:55",
            &[(Economy, 96, 4300), (Business, 40, 9200)],
        )
        .train(
            "dur-12263",
            "Duronto Express",
            "12263",
            "Mumbai Central",
            "New Delhi",
            "23:00",
            "16:40",
            &[(Economy, 140, 3900), (Business, 32, 8600), (First, 8, 15800)],
        )
        .train(
            "raj-12952",
            "Mumbai Rajdhani Express",
            "12952",
            "New Delhi",
            "Mumbai Central",
            "16:25",
            "08:15",
            &[(Economy, 120, 4500), (Business, 48, 9800), (First, 12, 17500)],
        )
        .train(
            "aug-12954",
            "August Kranti Rajdhani",
            "12954",
            "New Delhi",
            "Mumbai Central",
            "19:05",
            "12:40",
            &[(Economy, 96, 4300), (Business, 40, 9200)],
        )
        .train(
            "hwh-12301",
            "Howrah Rajdhani Express",
            "12301",
            "New Delhi",
            "Howrah Junction",
            "16:10",
            "09:55",
            &[(Economy, 110, 4100), (Business, 44, 8900), (First, 10, 16200)],
        )
        .train(
            "hwh-12303",
            "Poorva Express",
            "12303",
            "New Delhi",
            "Howrah Junction",
            "20:40",
            "17:35",
            &[(Economy, 160, 2800), (Business, 36, 6400)],
        )
        .train(
            "sht-12007",
            "Mysuru Shatabdi Express",
            "12007",
            "Chennai Central",
            "Bengaluru City",
            "06:00",
            "10:55",
            &[(Economy, 200, 1500), (Business, 60, 3100)],
        )
        .train(
            "sht-12027",
            "Bengaluru Shatabdi",
            "12027",
            "Chennai Central",
            "Bengaluru City",
            "17:30",
            "22:25",
            &[(Economy, 180, 1600), (Business, 52, 3300)],
        )
        .train(
            "jp-12015",
            "Ajmer Shatabdi Express",
            "12015",
            "New Delhi",
            "Jaipur",
            "06:05",
            "10:30",
            &[(Economy, 150, 1200), (Business, 48, 2500)],
        )
        .build()
}
