//! Application state for the web layer.

use std::sync::Arc;

use crate::bookings::BookingService;
use crate::catalog::TrainCatalog;
use crate::fares::FareTextProvider;

/// Shared application state.
///
/// Everything a request handler needs, cheap to clone per request.
#[derive(Clone)]
pub struct AppState {
    /// Train catalogue: timetable and seat inventory
    pub catalog: Arc<dyn TrainCatalog>,

    /// Booking flows: purchase, history, reschedule
    pub bookings: BookingService,

    /// Fare-information text
    pub fares: Arc<dyn FareTextProvider>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(
        catalog: Arc<dyn TrainCatalog>,
        bookings: BookingService,
        fares: Arc<dyn FareTextProvider>,
    ) -> Self {
        Self {
            catalog,
            bookings,
            fares,
        }
    }
}
