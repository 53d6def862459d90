//! Seed-file loading for the in-memory catalogue.
//!
//! A seed file is a single JSON document with a station directory and a
//! timetable. The raw shapes below mirror the file exactly; conversion
//! into domain types is where all validation happens, and errors carry the
//! entry index so a bad line in a long file is findable.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::domain::{
    Money, Route, SeatClass, Station, TimeOfDay, Train, TrainId, TrainNumber, TravelClass,
};

/// Errors raised while loading a seed file.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    /// The file could not be read.
    #[error("failed to read seed file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid JSON of the expected shape.
    #[error("failed to parse seed file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A station entry failed validation.
    #[error("seed station {index}: {message}")]
    BadStation { index: usize, message: String },

    /// A train entry failed validation.
    #[error("seed train {index} ({id}): {message}")]
    BadTrain {
        index: usize,
        id: String,
        message: String,
    },
}

/// A validated seed: the station directory plus the timetable.
#[derive(Debug)]
pub struct Seed {
    /// Station directory in file order.
    pub stations: Vec<Station>,
    /// Timetable in file order.
    pub trains: Vec<Train>,
}

#[derive(Debug, Deserialize)]
struct RawSeed {
    stations: Vec<String>,
    trains: Vec<RawTrain>,
}

#[derive(Debug, Deserialize)]
struct RawTrain {
    id: String,
    name: String,
    number: String,
    from: String,
    to: String,
    departs: String,
    arrives: String,
    classes: Vec<RawSeatClass>,
}

#[derive(Debug, Deserialize)]
struct RawSeatClass {
    class: String,
    available: u32,
    price_cents: u64,
}

/// Load and validate a seed file.
pub fn load_seed(path: impl AsRef<Path>) -> Result<Seed, SeedError> {
    let path = path.as_ref();

    let json = std::fs::read_to_string(path).map_err(|source| SeedError::Io {
        path: path.to_owned(),
        source,
    })?;

    let raw: RawSeed = serde_json::from_str(&json).map_err(|source| SeedError::Json {
        path: path.to_owned(),
        source,
    })?;

    convert(raw)
}

fn convert(raw: RawSeed) -> Result<Seed, SeedError> {
    let mut stations = Vec::with_capacity(raw.stations.len());
    for (index, name) in raw.stations.iter().enumerate() {
        let station = Station::parse(name).map_err(|err| SeedError::BadStation {
            index,
            message: err.to_string(),
        })?;
        stations.push(station);
    }

    let mut trains = Vec::with_capacity(raw.trains.len());
    for (index, entry) in raw.trains.into_iter().enumerate() {
        trains.push(convert_train(index, entry)?);
    }

    Ok(Seed { stations, trains })
}

fn convert_train(index: usize, raw: RawTrain) -> Result<Train, SeedError> {
    let bad = |message: String| SeedError::BadTrain {
        index,
        id: raw.id.clone(),
        message,
    };

    let id = TrainId::parse(&raw.id).map_err(|e| bad(e.to_string()))?;
    let number = TrainNumber::parse(&raw.number).map_err(|e| bad(e.to_string()))?;
    let from = Station::parse(&raw.from).map_err(|e| bad(e.to_string()))?;
    let to = Station::parse(&raw.to).map_err(|e| bad(e.to_string()))?;
    let route = Route::new(from, to).map_err(|e| bad(e.to_string()))?;
    let departs = TimeOfDay::parse_hhmm(&raw.departs).map_err(|e| bad(e.to_string()))?;
    let arrives = TimeOfDay::parse_hhmm(&raw.arrives).map_err(|e| bad(e.to_string()))?;

    let mut classes = Vec::with_capacity(raw.classes.len());
    for entry in &raw.classes {
        let class = TravelClass::parse(&entry.class).map_err(|e| bad(e.to_string()))?;
        classes.push(SeatClass::new(
            class,
            entry.available,
            Money::from_cents(entry.price_cents),
        ));
    }

    Train::new(id, &raw.name, number, route, departs, arrives, classes)
        .map_err(|e| bad(e.to_string()))
}
