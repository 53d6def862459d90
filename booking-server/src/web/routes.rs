//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{Method, StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{Local, NaiveDate};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::bookings::{BookRequest, BookingError};
use crate::catalog::CatalogError;
use crate::domain::{BookingId, CustomerId, Route, Station, TrainId, TravelClass};
use crate::fares::{FareError, FareQuery};
use crate::payment::CardDetails;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    // The UI is served elsewhere, so CORS is open.
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health))
        .route("/api/stations", get(list_stations))
        .route("/api/trains", get(search_trains))
        .route("/api/trains/:id", get(train_detail))
        .route("/api/bookings", post(create_booking).get(booking_history))
        .route("/api/bookings/missed", get(missed_bookings))
        .route("/api/bookings/:id", get(booking_detail))
        .route("/api/bookings/:id/reschedule", post(reschedule_booking))
        .route("/api/fares", get(fare_information))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Parse a YYYY-MM-DD date parameter.
fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| AppError::BadRequest {
        message: format!("Invalid date (expected YYYY-MM-DD): {value}"),
    })
}

/// The station directory.
async fn list_stations(State(state): State<AppState>) -> Result<Json<StationsResponse>, AppError> {
    let stations = state.catalog.stations().await?;

    Ok(Json(StationsResponse {
        stations: stations
            .iter()
            .map(|station| station.as_str().to_string())
            .collect(),
    }))
}

/// Search trains, by route when `from`/`to` are given.
async fn search_trains(
    State(state): State<AppState>,
    Query(req): Query<TrainSearchRequest>,
) -> Result<Json<TrainSearchResponse>, AppError> {
    let date = match &req.date {
        Some(raw) => parse_date(raw)?,
        None => Local::now().date_naive(),
    };

    let trains = match (&req.from, &req.to) {
        (Some(from), Some(to)) => {
            let origin = Station::parse(from).map_err(|e| AppError::BadRequest {
                message: format!("Invalid origin station: {e}"),
            })?;
            let destination = Station::parse(to).map_err(|e| AppError::BadRequest {
                message: format!("Invalid destination station: {e}"),
            })?;
            let route = Route::new(origin, destination).map_err(|e| AppError::BadRequest {
                message: e.to_string(),
            })?;
            state.catalog.trains_serving(&route, date).await?
        }
        (None, None) => state.catalog.all_trains().await?,
        _ => {
            return Err(AppError::BadRequest {
                message: "Route search needs both from and to".to_string(),
            });
        }
    };

    Ok(Json(TrainSearchResponse {
        trains: trains.iter().map(TrainResult::from_train).collect(),
    }))
}

/// Detail for one train, for the booking page.
async fn train_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TrainResult>, AppError> {
    let train_id = TrainId::parse(&id).map_err(|_| AppError::BadRequest {
        message: format!("Invalid train id: {id}"),
    })?;

    let train = state.catalog.train(&train_id).await?;
    Ok(Json(TrainResult::from_train(&train)))
}

/// Buy tickets.
async fn create_booking(
    State(state): State<AppState>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<Json<BookingResult>, AppError> {
    let customer = CustomerId::parse(&req.customer).map_err(|e| AppError::BadRequest {
        message: format!("Invalid customer: {e}"),
    })?;
    let train_id = TrainId::parse(&req.train_id).map_err(|_| AppError::BadRequest {
        message: format!("Invalid train id: {}", req.train_id),
    })?;
    let date = parse_date(&req.date)?;
    let class = TravelClass::parse(&req.class).map_err(|e| AppError::BadRequest {
        message: e.to_string(),
    })?;
    let card =
        CardDetails::parse(&req.card_number, &req.card_holder).map_err(|e| AppError::BadRequest {
            message: e.to_string(),
        })?;

    let booking = state
        .bookings
        .book(
            BookRequest {
                customer,
                train_id,
                date,
                class,
                passengers: req.passengers,
                card,
            },
            Local::now().naive_local(),
        )
        .await?;

    Ok(Json(BookingResult::from_booking(&booking)))
}

/// A customer's booking history.
async fn booking_history(
    State(state): State<AppState>,
    Query(req): Query<CustomerRequest>,
) -> Result<Json<BookingListResponse>, AppError> {
    let customer = CustomerId::parse(&req.customer).map_err(|e| AppError::BadRequest {
        message: format!("Invalid customer: {e}"),
    })?;

    let bookings = state.bookings.history(&customer).await?;

    Ok(Json(BookingListResponse {
        bookings: bookings.iter().map(BookingResult::from_booking).collect(),
    }))
}

/// A customer's missed, still-unresolved bookings.
async fn missed_bookings(
    State(state): State<AppState>,
    Query(req): Query<CustomerRequest>,
) -> Result<Json<BookingListResponse>, AppError> {
    let customer = CustomerId::parse(&req.customer).map_err(|e| AppError::BadRequest {
        message: format!("Invalid customer: {e}"),
    })?;

    let bookings = state
        .bookings
        .missed_bookings(&customer, Local::now().naive_local())
        .await?;

    Ok(Json(BookingListResponse {
        bookings: bookings.iter().map(BookingResult::from_booking).collect(),
    }))
}

/// One booking by id.
async fn booking_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BookingResult>, AppError> {
    let booking_id = BookingId::parse(&id).map_err(|_| AppError::BadRequest {
        message: format!("Invalid booking id: {id}"),
    })?;

    let booking = state.bookings.booking(booking_id).await?;
    Ok(Json(BookingResult::from_booking(&booking)))
}

/// Rebook a missed booking onto the next acceptable train.
///
/// Succeeding with a decline is still a 200; the response says which way
/// it went. Errors (unknown booking, not yet departed, already resolved,
/// catalogue outage) map to HTTP statuses.
async fn reschedule_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RescheduleResponse>, AppError> {
    let booking_id = BookingId::parse(&id).map_err(|_| AppError::BadRequest {
        message: format!("Invalid booking id: {id}"),
    })?;

    let outcome = state
        .bookings
        .reschedule(booking_id, Local::now().naive_local())
        .await?;

    Ok(Json(RescheduleResponse::from_outcome(&outcome)))
}

/// Fare-information text for a route, class and date.
async fn fare_information(
    State(state): State<AppState>,
    Query(req): Query<FareEnquiryRequest>,
) -> Result<Json<FareTextResponse>, AppError> {
    let origin = Station::parse(&req.from).map_err(|e| AppError::BadRequest {
        message: format!("Invalid origin station: {e}"),
    })?;
    let destination = Station::parse(&req.to).map_err(|e| AppError::BadRequest {
        message: format!("Invalid destination station: {e}"),
    })?;
    let route = Route::new(origin, destination).map_err(|e| AppError::BadRequest {
        message: e.to_string(),
    })?;
    let class = TravelClass::parse(&req.class).map_err(|e| AppError::BadRequest {
        message: e.to_string(),
    })?;
    let date = parse_date(&req.date)?;

    let query = FareQuery { route, class, date };
    let fare_information = state.fares.fare_text(&query).await?;

    Ok(Json(FareTextResponse { fare_information }))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Conflict { message: String },
    BadGateway { message: String },
    Internal { message: String },
}

impl From<CatalogError> for AppError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::TrainNotFound(_) => AppError::NotFound {
                message: e.to_string(),
            },
            CatalogError::ClassNotSold { .. } => AppError::BadRequest {
                message: e.to_string(),
            },
            CatalogError::InsufficientSeats { .. } => AppError::Conflict {
                message: e.to_string(),
            },
            CatalogError::Unavailable(_) => AppError::BadGateway {
                message: e.to_string(),
            },
        }
    }
}

impl From<BookingError> for AppError {
    fn from(e: BookingError) -> Self {
        let message = e.to_string();
        match e {
            BookingError::NotFound(_) | BookingError::TrainNotFound(_) => {
                AppError::NotFound { message }
            }
            BookingError::ClassNotSold { .. }
            | BookingError::PaymentDeclined { .. }
            | BookingError::Invalid(_) => AppError::BadRequest { message },
            BookingError::NoSeats { .. }
            | BookingError::AlreadyResolved { .. }
            | BookingError::NotYetDeparted(_)
            | BookingError::Contended => AppError::Conflict { message },
            BookingError::Catalog(CatalogError::Unavailable(_)) => {
                AppError::BadGateway { message }
            }
            BookingError::Catalog(_) | BookingError::Store(_) | BookingError::Payment(_) => {
                AppError::Internal { message }
            }
        }
    }
}

impl From<FareError> for AppError {
    fn from(e: FareError) -> Self {
        AppError::BadGateway {
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Conflict { message } => (StatusCode::CONFLICT, message),
            AppError::BadGateway { message } => (StatusCode::BAD_GATEWAY, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            tracing::error!(status = %status, message, "request failed");
        } else {
            tracing::debug!(status = %status, message, "request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booking_errors_map_to_statuses() {
        let err = AppError::from(BookingError::Contended);
        assert!(matches!(err, AppError::Conflict { .. }));

        let err = AppError::from(BookingError::NotFound(BookingId::generate()));
        assert!(matches!(err, AppError::NotFound { .. }));

        let err = AppError::from(BookingError::PaymentDeclined {
            reason: "card declined by issuer".to_string(),
        });
        assert!(matches!(err, AppError::BadRequest { .. }));

        let err = AppError::from(BookingError::Catalog(CatalogError::Unavailable(
            "backend down".to_string(),
        )));
        assert!(matches!(err, AppError::BadGateway { .. }));
    }

    #[test]
    fn catalog_errors_map_to_statuses() {
        let train = TrainId::parse("t1").unwrap();

        let err = AppError::from(CatalogError::TrainNotFound(train.clone()));
        assert!(matches!(err, AppError::NotFound { .. }));

        let err = AppError::from(CatalogError::InsufficientSeats {
            train,
            class: TravelClass::Economy,
            requested: 4,
            available: 1,
        });
        assert!(matches!(err, AppError::Conflict { .. }));
    }

    #[test]
    fn date_parser_accepts_iso_only() {
        assert!(parse_date("2024-06-01").is_ok());
        assert!(parse_date("01/06/2024").is_err());
        assert!(parse_date("yesterday").is_err());
    }
}
