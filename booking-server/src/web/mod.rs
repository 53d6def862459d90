//! Web layer for the booking service.
//!
//! A JSON API over the catalogue, booking and fare services. The UI that
//! consumes it is served elsewhere; CORS is open and there is no HTML.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
