//! Offline fare-information provider.
//!
//! Development and test stand-in for the remote text service. The prose
//! is derived from the catalogue's actual prices for the queried route,
//! so it is deterministic and always consistent with what the booking
//! flow will charge.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Datelike;

use crate::catalog::TrainCatalog;
use crate::domain::Money;

use super::error::FareError;
use super::{FareQuery, FareTextProvider};

/// Fare text derived from the live catalogue instead of a remote service.
#[derive(Clone)]
pub struct CannedFareProvider {
    catalog: Arc<dyn TrainCatalog>,
}

impl CannedFareProvider {
    /// Create a provider backed by the given catalogue.
    pub fn new(catalog: Arc<dyn TrainCatalog>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl FareTextProvider for CannedFareProvider {
    async fn fare_text(&self, query: &FareQuery) -> Result<String, FareError> {
        let trains = self
            .catalog
            .trains_serving(&query.route, query.date)
            .await?;

        let date = query.date.format("%A %-d %B %Y");

        if trains.is_empty() {
            return Ok(format!(
                "No services are scheduled from {} to {} on {}.",
                query.route.origin(),
                query.route.destination(),
                date
            ));
        }

        let fares: Vec<Money> = trains
            .iter()
            .filter_map(|train| train.class(query.class))
            .map(|entry| entry.price)
            .collect();

        let Some(&cheapest) = fares.iter().min() else {
            return Ok(format!(
                "None of the {} services from {} to {} sell {} class tickets; \
                 consider a different class for this route.",
                trains.len(),
                query.route.origin(),
                query.route.destination(),
                query.class
            ));
        };
        // min existed, so max does too
        let dearest = fares.iter().max().copied().unwrap_or(cheapest);

        let mut text = if cheapest == dearest {
            format!(
                "{} class from {} to {} on {} is {} per seat across all {} services.",
                query.class,
                query.route.origin(),
                query.route.destination(),
                date,
                cheapest,
                fares.len()
            )
        } else {
            format!(
                "{} class fares from {} to {} on {} range from {} to {} per seat \
                 across {} services, depending on the departure.",
                query.class,
                query.route.origin(),
                query.route.destination(),
                date,
                cheapest,
                dearest,
                fares.len()
            )
        };

        if is_weekend(query.date) {
            text.push_str(" Weekend demand tends to be higher, so booking early is advised.");
        } else {
            text.push_str(" Early-morning and late-evening departures are often the cheapest.");
        }
        text.push_str(" Prices are estimates; the fare shown at booking applies.");

        Ok(text)
    }
}

fn is_weekend(date: chrono::NaiveDate) -> bool {
    matches!(date.weekday(), chrono::Weekday::Sat | chrono::Weekday::Sun)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;
    use crate::domain::{
        Route, SeatClass, Station, TimeOfDay, Train, TrainId, TrainNumber, TravelClass,
    };
    use chrono::NaiveDate;

    fn station(name: &str) -> Station {
        Station::parse(name).unwrap()
    }

    fn train(id: &str, classes: Vec<SeatClass>) -> Train {
        Train::new(
            TrainId::parse(id).unwrap(),
            "Test Express",
            TrainNumber::parse("12345").unwrap(),
            Route::new(station("A Town"), station("B City")).unwrap(),
            TimeOfDay::parse_hhmm("08:00").unwrap(),
            TimeOfDay::parse_hhmm("12:00").unwrap(),
            classes,
        )
        .unwrap()
    }

    fn provider(trains: Vec<Train>) -> CannedFareProvider {
        let catalog =
            InMemoryCatalog::new(vec![station("A Town"), station("B City")], trains).unwrap();
        CannedFareProvider::new(Arc::new(catalog))
    }

    fn query(class: TravelClass, date: NaiveDate) -> FareQuery {
        FareQuery {
            route: Route::new(station("A Town"), station("B City")).unwrap(),
            class,
            date,
        }
    }

    fn seats(class: TravelClass, price_cents: u64) -> SeatClass {
        SeatClass::new(class, 50, Money::from_cents(price_cents))
    }

    // 2024-06-03 is a Monday, 2024-06-01 a Saturday.
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    fn saturday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[tokio::test]
    async fn quotes_the_price_range() {
        let provider = provider(vec![
            train("t1", vec![seats(TravelClass::Economy, 4500)]),
            train("t2", vec![seats(TravelClass::Economy, 3200)]),
            train("t3", vec![seats(TravelClass::Economy, 5100)]),
        ]);

        let text = provider
            .fare_text(&query(TravelClass::Economy, monday()))
            .await
            .unwrap();

        assert!(text.contains("$32.00"), "cheapest fare missing: {text}");
        assert!(text.contains("$51.00"), "dearest fare missing: {text}");
        assert!(text.contains("Economy"), "class missing: {text}");
        assert!(text.contains("A Town"), "origin missing: {text}");
        assert!(text.contains("Prices are estimates"), "caveat missing: {text}");
    }

    #[tokio::test]
    async fn quotes_a_flat_fare_when_all_services_agree() {
        let provider = provider(vec![
            train("t1", vec![seats(TravelClass::First, 17500)]),
            train("t2", vec![seats(TravelClass::First, 17500)]),
        ]);

        let text = provider
            .fare_text(&query(TravelClass::First, monday()))
            .await
            .unwrap();

        assert!(text.contains("$175.00"), "flat fare missing: {text}");
        assert!(!text.contains("range from"), "flat fare phrased as a range: {text}");
    }

    #[tokio::test]
    async fn reports_routes_with_no_service() {
        let provider = provider(vec![]);

        let text = provider
            .fare_text(&query(TravelClass::Economy, monday()))
            .await
            .unwrap();

        assert!(text.contains("No services are scheduled"), "{text}");
    }

    #[tokio::test]
    async fn reports_classes_not_sold_on_the_route() {
        let provider = provider(vec![train("t1", vec![seats(TravelClass::Economy, 4500)])]);

        let text = provider
            .fare_text(&query(TravelClass::First, monday()))
            .await
            .unwrap();

        assert!(text.contains("sell First class"), "{text}");
    }

    #[tokio::test]
    async fn mentions_weekend_demand_on_weekends_only() {
        let provider = provider(vec![train("t1", vec![seats(TravelClass::Economy, 4500)])]);

        let weekend = provider
            .fare_text(&query(TravelClass::Economy, saturday()))
            .await
            .unwrap();
        assert!(weekend.contains("Weekend demand"), "{weekend}");

        let weekday = provider
            .fare_text(&query(TravelClass::Economy, monday()))
            .await
            .unwrap();
        assert!(!weekday.contains("Weekend demand"), "{weekday}");
    }

    #[tokio::test]
    async fn answers_are_deterministic() {
        let provider = provider(vec![
            train("t1", vec![seats(TravelClass::Economy, 4500)]),
            train("t2", vec![seats(TravelClass::Economy, 3200)]),
        ]);

        let first = provider
            .fare_text(&query(TravelClass::Economy, monday()))
            .await
            .unwrap();
        let second = provider
            .fare_text(&query(TravelClass::Economy, monday()))
            .await
            .unwrap();

        assert_eq!(first, second);
    }
}
