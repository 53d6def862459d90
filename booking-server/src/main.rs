use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use booking_server::bookings::{BookingService, InMemoryBookings};
use booking_server::catalog::{InMemoryCatalog, TrainCatalog, demo_catalog, load_seed};
use booking_server::fares::{
    CachedFareText, CannedFareProvider, FareCacheConfig, FareClient, FareClientConfig,
    FareTextProvider,
};
use booking_server::payment::MockGateway;
use booking_server::web::{AppState, create_router};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "booking_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Timetable: a seed file when given, the built-in demo set otherwise.
    let catalog: Arc<dyn TrainCatalog> = match std::env::var("SEED_FILE") {
        Ok(path) => {
            let seed = load_seed(&path).expect("Failed to load seed file");
            let catalog = InMemoryCatalog::from_seed(seed).expect("Invalid seed data");
            tracing::info!(path, "loaded timetable from seed file");
            Arc::new(catalog)
        }
        Err(_) => {
            tracing::info!("SEED_FILE not set, using the built-in demo timetable");
            Arc::new(demo_catalog())
        }
    };

    // Fare text: the remote service when configured, catalogue-derived
    // prose otherwise. Either way answers are cached.
    let fares: Arc<dyn FareTextProvider> =
        match (std::env::var("FARE_API_URL"), std::env::var("FARE_API_KEY")) {
            (Ok(url), Ok(key)) => {
                let client = FareClient::new(FareClientConfig::new(url, key))
                    .expect("Failed to create fare client");
                tracing::info!("fare information served by the remote fare service");
                Arc::new(client)
            }
            _ => {
                tracing::info!(
                    "FARE_API_URL/FARE_API_KEY not set, deriving fare information from the catalogue"
                );
                Arc::new(CannedFareProvider::new(catalog.clone()))
            }
        };
    let fares: Arc<dyn FareTextProvider> =
        Arc::new(CachedFareText::new(fares, &FareCacheConfig::default()));

    let bookings = BookingService::new(
        catalog.clone(),
        Arc::new(InMemoryBookings::new()),
        Arc::new(MockGateway::new()),
    );

    let state = AppState::new(catalog, bookings, fares);
    let app = create_router(state);

    let addr: SocketAddr = std::env::var("BIND_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
        .parse()
        .expect("Invalid BIND_ADDR");

    println!("Train booking server listening on http://{addr}");
    println!();
    println!("API Endpoints:");
    println!("  GET  /health                           - Health check");
    println!("  GET  /api/stations                     - Station directory");
    println!("  GET  /api/trains?from=&to=&date=       - Route search");
    println!("  GET  /api/trains/:id                   - Train detail");
    println!("  POST /api/bookings                     - Buy tickets");
    println!("  GET  /api/bookings?customer=           - Booking history");
    println!("  GET  /api/bookings/missed?customer=    - Missed bookings");
    println!("  POST /api/bookings/:id/reschedule      - Rebook a missed train");
    println!("  GET  /api/fares?from=&to=&class=&date= - Fare information");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
