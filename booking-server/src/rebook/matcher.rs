//! Replacement matching for missed trains.

use crate::domain::{Booking, Money, Train, TravelClass};
use std::fmt;

/// Why no replacement could be offered.
///
/// Both cases are ordinary outcomes of the matching policy, not faults;
/// the display strings are shown to passengers as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RebookDecline {
    /// No train on the booked route departs later the same day.
    #[error("no later departures on this route for the travel date")]
    NoLaterDeparture,

    /// Later trains exist but none can seat the whole party in the booked
    /// class or better.
    #[error("later departures exist but none can seat {passengers} in {class} class or better")]
    InsufficientSeats {
        /// The party size that could not be seated.
        passengers: u32,
        /// The minimum acceptable class.
        class: TravelClass,
    },
}

/// A concrete replacement offer for a missed booking.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Rebooking {
    /// The replacement train, exactly as it appeared in the candidate
    /// snapshot.
    pub train: Train,
    /// Matched class: the booked class or a better one.
    pub class: TravelClass,
    /// Per-seat fare of the matched class.
    pub seat_price: Money,
    /// Fare for the whole party at the matched class.
    pub total_price: Money,
}

impl fmt::Display for Rebooking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} departing {} in {} for {}",
            self.train.name(),
            self.train.departs(),
            self.class,
            self.total_price
        )
    }
}

/// Find the replacement train for a missed booking.
///
/// Scans `candidates` for trains on the booked route that depart strictly
/// after the missed departure instant, earliest first. The first train able
/// to seat the whole party wins; within a train the booked class is tried
/// first, then each better class in ascending comfort order. Passengers
/// are never split across classes and never downgraded.
///
/// Trains sharing a departure time are considered in the order they appear
/// in `candidates`, so the catalogue's ordering is the tie-break.
///
/// This function only inspects its arguments. Reserving the matched seats
/// is the caller's job, and availability may have moved on by then.
pub fn find_replacement(
    booking: &Booking,
    candidates: &[Train],
) -> Result<Rebooking, RebookDecline> {
    let missed_departure = booking.departure_instant();

    let mut later: Vec<&Train> = candidates
        .iter()
        .filter(|train| train.route() == booking.route())
        .filter(|train| train.departure_on(booking.date()) > missed_departure)
        .collect();

    if later.is_empty() {
        return Err(RebookDecline::NoLaterDeparture);
    }

    // Stable sort: equal departures keep their candidate order.
    later.sort_by_key(|train| train.departure_on(booking.date()));

    for train in later {
        for class in booking.class().or_better() {
            let Some(entry) = train.class(class) else {
                continue;
            };

            if entry.can_seat(booking.passengers()) {
                return Ok(Rebooking {
                    train: train.clone(),
                    class,
                    seat_price: entry.price,
                    total_price: entry.price.times(booking.passengers()),
                });
            }
        }
    }

    Err(RebookDecline::InsufficientSeats {
        passengers: booking.passengers(),
        class: booking.class(),
    })
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::domain::{
        CustomerId, NewBooking, Route, SeatClass, Station, TimeOfDay, TrainId, TrainNumber,
    };
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn route() -> Route {
        Route::new(
            Station::parse("A Town").unwrap(),
            Station::parse("B City").unwrap(),
        )
        .unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    prop_compose! {
        fn arb_seat_class(class: TravelClass)(
            available in 0u32..8,
            price in 100u64..20_000,
        ) -> SeatClass {
            SeatClass::new(class, available, Money::from_cents(price))
        }
    }

    prop_compose! {
        fn arb_train()(
            tag in 0u32..1_000_000,
            hour in 0u32..24,
            minute in 0u32..60,
            economy in arb_seat_class(TravelClass::Economy),
            business in arb_seat_class(TravelClass::Business),
            first in arb_seat_class(TravelClass::First),
            sell_business in any::<bool>(),
            sell_first in any::<bool>(),
        ) -> Train {
            let mut classes = vec![economy];
            if sell_business {
                classes.push(business);
            }
            if sell_first {
                classes.push(first);
            }
            Train::new(
                TrainId::parse(&format!("t{tag}")).unwrap(),
                "Prop Express",
                TrainNumber::parse("10000").unwrap(),
                route(),
                TimeOfDay::new(hour, minute).unwrap(),
                TimeOfDay::new(23, 59).unwrap(),
                classes,
            )
            .unwrap()
        }
    }

    fn arb_candidates() -> impl Strategy<Value = Vec<Train>> {
        prop::collection::vec(arb_train(), 0..8)
    }

    prop_compose! {
        fn arb_booking()(
            hour in 0u32..24,
            minute in 0u32..60,
            class_index in 0usize..3,
            passengers in 1u32..6,
        ) -> Booking {
            let class = TravelClass::ALL[class_index];
            let missed = Train::new(
                TrainId::parse("missed").unwrap(),
                "Missed Express",
                TrainNumber::parse("99999").unwrap(),
                route(),
                TimeOfDay::new(hour, minute).unwrap(),
                TimeOfDay::new(23, 59).unwrap(),
                vec![
                    SeatClass::new(TravelClass::Economy, 10, Money::from_cents(1000)),
                    SeatClass::new(TravelClass::Business, 10, Money::from_cents(2000)),
                    SeatClass::new(TravelClass::First, 10, Money::from_cents(3000)),
                ],
            )
            .unwrap();
            Booking::create(NewBooking {
                customer: CustomerId::parse("prop@example.com").unwrap(),
                train: &missed,
                date: date(),
                class,
                passengers,
                total_price: Money::ZERO,
            })
            .unwrap()
        }
    }

    proptest! {
        #[test]
        fn matches_satisfy_the_offer_contract(
            booking in arb_booking(),
            candidates in arb_candidates(),
        ) {
            if let Ok(rebooking) = find_replacement(&booking, &candidates) {
                // Strictly later on the same route
                prop_assert_eq!(rebooking.train.route(), booking.route());
                prop_assert!(
                    rebooking.train.departure_on(booking.date()) > booking.departure_instant()
                );

                // Same class or better, never a downgrade
                prop_assert!(rebooking.class >= booking.class());

                // The matched entry really can seat the party, at its fare
                let entry = rebooking.train.class(rebooking.class).unwrap();
                prop_assert!(entry.can_seat(booking.passengers()));
                prop_assert_eq!(rebooking.seat_price, entry.price);
                prop_assert_eq!(
                    rebooking.total_price,
                    entry.price.times(booking.passengers())
                );
            }
        }

        #[test]
        fn no_earlier_viable_train_is_skipped(
            booking in arb_booking(),
            candidates in arb_candidates(),
        ) {
            if let Ok(rebooking) = find_replacement(&booking, &candidates) {
                let matched_departure = rebooking.train.departure_on(booking.date());
                for train in &candidates {
                    let departure = train.departure_on(booking.date());
                    if departure <= booking.departure_instant() || departure >= matched_departure {
                        continue;
                    }
                    // Anything between the missed train and the match must
                    // have been unable to seat the party.
                    let seatable = booking.class().or_better().any(|class| {
                        train
                            .class(class)
                            .is_some_and(|entry| entry.can_seat(booking.passengers()))
                    });
                    prop_assert!(!seatable);
                }
            }
        }

        #[test]
        fn declines_are_classified_correctly(
            booking in arb_booking(),
            candidates in arb_candidates(),
        ) {
            match find_replacement(&booking, &candidates) {
                Ok(_) => {}
                Err(RebookDecline::NoLaterDeparture) => {
                    for train in &candidates {
                        prop_assert!(
                            train.departure_on(booking.date()) <= booking.departure_instant()
                        );
                    }
                }
                Err(RebookDecline::InsufficientSeats { .. }) => {
                    let any_later = candidates.iter().any(|train| {
                        train.departure_on(booking.date()) > booking.departure_instant()
                    });
                    prop_assert!(any_later);
                }
            }
        }

        #[test]
        fn matching_is_deterministic(
            booking in arb_booking(),
            candidates in arb_candidates(),
        ) {
            let first = find_replacement(&booking, &candidates);
            let second = find_replacement(&booking, &candidates);
            prop_assert_eq!(first, second);
        }
    }
}
