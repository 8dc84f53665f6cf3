use cinema_booking::*;
use chrono::{NaiveDate, NaiveTime};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct RecordingObserver {
    changes: AtomicUsize,
    messages: Mutex<Vec<String>>,
}

impl RecordingObserver {
    fn changes(&self) -> usize {
        self.changes.load(Ordering::SeqCst)
    }

    fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl CatalogObserver for RecordingObserver {
    fn on_catalog_changed(&self) {
        self.changes.fetch_add(1, Ordering::SeqCst);
    }

    fn notify(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
}

fn evening() -> NaiveTime {
    NaiveTime::from_hms_opt(19, 30, 0).unwrap()
}

/// Catalog with one movie in one Paris hall and a single show of `seats`.
fn catalog_with_show(seats: u32) -> (Catalog, ShowId) {
    let mut catalog = Catalog::new();
    let movie_id = catalog.add_movie("Metropolis").unwrap().id;
    let hall_id = catalog.add_cinema_hall("Le Grand Rex", "Paris").unwrap().id;
    let show_id = catalog
        .add_show(
            hall_id,
            NewShow {
                movie_id,
                date: date(1),
                time: evening(),
                total_seats: Some(seats),
            },
        )
        .unwrap()
        .id;
    (catalog, show_id)
}

#[test]
fn test_show_seat_accounting() {
    let mut show = Show::new(1, 1, date(1), evening(), 10);
    assert_eq!(show.available_seats(), 10);

    show.book_tickets(4).unwrap();
    assert_eq!(show.booked_seats(), 4);
    assert_eq!(show.available_seats(), 6);

    show.cancel_tickets(4).unwrap();
    assert_eq!(show.booked_seats(), 0);
    assert_eq!(show.available_seats(), show.total_seats());

    show.book_tickets(10).unwrap();
    assert_eq!(show.available_seats(), 0);
}

#[test]
fn test_show_rejects_overbooking_without_partial_reservation() {
    let mut show = Show::new(1, 1, date(1), evening(), 10);
    show.book_tickets(8).unwrap();

    let err = show.book_tickets(3).unwrap_err();
    assert!(matches!(err, BookingError::Capacity { requested: 3, available: 2 }));
    assert_eq!(show.booked_seats(), 8);
}

#[test]
fn test_show_rejects_cancelling_more_than_booked() {
    let mut show = Show::new(1, 1, date(1), evening(), 10);
    show.book_tickets(2).unwrap();

    let err = show.cancel_tickets(3).unwrap_err();
    assert!(matches!(err, BookingError::InvalidCancellation { requested: 3, booked: 2 }));
    assert_eq!(show.booked_seats(), 2);
}

#[test]
fn test_show_invariant_holds_over_mixed_operations() {
    let mut show = Show::new(1, 1, date(1), evening(), 7);
    let ops: [(bool, u32); 10] = [
        (true, 3),
        (true, 5),
        (false, 1),
        (true, 4),
        (false, 9),
        (true, 1),
        (false, 7),
        (false, 2),
        (true, 7),
        (true, 0),
    ];

    for (book, count) in ops {
        let _ = if book {
            show.book_tickets(count)
        } else {
            show.cancel_tickets(count)
        };
        assert!(show.booked_seats() <= show.total_seats());
        assert_eq!(show.available_seats(), show.total_seats() - show.booked_seats());
    }
}

#[test]
fn test_show_date_filter() {
    let show = Show::new(1, 1, date(1), evening(), 10);

    assert!(show.matches_date(None));
    assert!(show.matches_date(Some(date(1))));
    assert!(!show.matches_date(Some(date(2))));
}

#[test]
fn test_show_serialization_checks_seat_counts() {
    let mut show = Show::new(1, 1, date(1), evening(), 5);
    show.book_tickets(3).unwrap();

    let json = serde_json::to_string(&show).unwrap();
    let restored: Show = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, show);
    assert_eq!(restored.available_seats(), 2);

    let overbooked = r#"{"id":1,"movie_id":1,"date":"2024-06-01","time":"19:30:00","total_seats":5,"booked_seats":9}"#;
    assert!(serde_json::from_str::<Show>(overbooked).is_err());

    let empty = r#"{"id":1,"movie_id":1,"date":"2024-06-01","time":"19:30:00","total_seats":0,"booked_seats":0}"#;
    assert!(serde_json::from_str::<Show>(empty).is_err());
}

#[test]
fn test_booking_confirm_and_cancel() {
    let mut show = Show::new(1, 1, date(1), evening(), 10);
    let mut booking = Booking::new(1, show.id, 4);
    assert_eq!(booking.state(), BookingState::Unconfirmed);

    booking.confirm(&mut show).unwrap();
    assert!(booking.is_confirmed());
    assert_eq!(show.booked_seats(), 4);

    booking.cancel(&mut show).unwrap();
    assert_eq!(booking.state(), BookingState::Unconfirmed);
    assert_eq!(show.booked_seats(), 0);

    // A cancelled booking can be confirmed again.
    booking.confirm(&mut show).unwrap();
    assert!(booking.is_confirmed());
    assert_eq!(show.booked_seats(), 4);
}

#[test]
fn test_booking_cancel_requires_confirmation() {
    let mut show = Show::new(1, 1, date(1), evening(), 10);
    let mut booking = Booking::new(1, show.id, 4);

    let err = booking.cancel(&mut show).unwrap_err();
    assert!(matches!(err, BookingError::InvalidState(_)));
    assert_eq!(show.booked_seats(), 0);
}

#[test]
fn test_booking_rejects_foreign_show() {
    let mut other = Show::new(2, 1, date(1), evening(), 10);
    let mut booking = Booking::new(1, 1, 4);

    assert!(matches!(
        booking.confirm(&mut other),
        Err(BookingError::InvalidArgument(_))
    ));
    assert_eq!(other.booked_seats(), 0);
}

#[test]
fn test_catalog_assigns_sequential_ids() {
    let mut catalog = Catalog::new();

    assert_eq!(catalog.add_movie("Alien").unwrap().id, 1);
    assert_eq!(catalog.add_movie("Aliens").unwrap().id, 2);
    assert_eq!(catalog.add_cinema_hall("Odeon", "London").unwrap().id, 1);

    let show = catalog
        .add_show(
            1,
            NewShow {
                movie_id: 2,
                date: date(3),
                time: evening(),
                total_seats: None,
            },
        )
        .unwrap();
    assert_eq!(show.id, 1);
    assert_eq!(show.total_seats(), DEFAULT_TOTAL_SEATS);

    assert_eq!(catalog.cinema_hall(1).unwrap().shows, vec![1]);
    assert_eq!(catalog.movies().map(|m| m.title.as_str()).collect::<Vec<_>>(), ["Alien", "Aliens"]);
}

#[test]
fn test_catalog_default_seats_is_configurable() {
    let mut catalog = Catalog::new().with_default_total_seats(120);
    let movie_id = catalog.add_movie("Heat").unwrap().id;
    let hall_id = catalog.add_cinema_hall("Odeon", "London").unwrap().id;

    let show = catalog
        .add_show(
            hall_id,
            NewShow {
                movie_id,
                date: date(3),
                time: evening(),
                total_seats: None,
            },
        )
        .unwrap();
    assert_eq!(show.total_seats(), 120);
}

#[test]
fn test_catalog_rejects_blank_names_and_zero_seats() {
    let mut catalog = Catalog::new();

    assert!(matches!(catalog.add_movie("   "), Err(BookingError::InvalidArgument(_))));
    assert!(matches!(
        catalog.add_cinema_hall("Odeon", ""),
        Err(BookingError::InvalidArgument(_))
    ));

    let movie_id = catalog.add_movie("  Heat ").unwrap().id;
    assert_eq!(catalog.movie(movie_id).unwrap().title, "Heat");
    let hall_id = catalog.add_cinema_hall("Odeon", "London").unwrap().id;

    let err = catalog
        .add_show(
            hall_id,
            NewShow {
                movie_id,
                date: date(3),
                time: evening(),
                total_seats: Some(0),
            },
        )
        .unwrap_err();
    assert!(matches!(err, BookingError::InvalidArgument(_)));
    assert!(catalog.all_shows(None).is_empty());
}

#[test]
fn test_add_show_requires_existing_hall_and_movie() {
    let mut catalog = Catalog::new();
    let movie_id = catalog.add_movie("Heat").unwrap().id;
    let hall_id = catalog.add_cinema_hall("Odeon", "London").unwrap().id;

    let new_show = |movie_id| NewShow {
        movie_id,
        date: date(3),
        time: evening(),
        total_seats: None,
    };

    let err = catalog.add_show(99, new_show(movie_id)).unwrap_err();
    assert!(matches!(err, BookingError::CinemaHallNotFound(99)));
    assert!(err.is_not_found());

    let err = catalog.add_show(hall_id, new_show(42)).unwrap_err();
    assert!(matches!(err, BookingError::MovieNotFound(42)));

    assert!(catalog.all_shows(None).is_empty());
    assert!(catalog.cinema_hall(hall_id).unwrap().shows.is_empty());
}

#[test]
fn test_create_booking_does_not_reserve_seats() {
    let (mut catalog, show_id) = catalog_with_show(50);

    let index = catalog.create_booking(show_id, 10).unwrap();
    assert_eq!(index, 0);

    let booking = catalog.booking(index).unwrap();
    assert_eq!(booking.id, 1);
    assert_eq!(booking.seat_count, 10);
    assert!(!booking.is_confirmed());
    assert_eq!(catalog.show(show_id).unwrap().available_seats(), 50);
}

#[test]
fn test_create_booking_validation() {
    let (mut catalog, show_id) = catalog_with_show(50);

    let err = catalog.create_booking(999, 1).unwrap_err();
    assert!(matches!(err, BookingError::ShowNotFound(999)));

    let err = catalog.create_booking(show_id, 0).unwrap_err();
    assert!(matches!(err, BookingError::InvalidArgument(_)));

    assert!(catalog.bookings().is_empty());
}

#[test]
fn test_confirm_then_cancel_restores_seats() {
    let (mut catalog, show_id) = catalog_with_show(50);
    let index = catalog.create_booking(show_id, 10).unwrap();

    assert!(catalog.confirm_booking(index).unwrap());
    assert_eq!(catalog.show(show_id).unwrap().available_seats(), 40);

    catalog.cancel_booking(index).unwrap();
    assert_eq!(catalog.show(show_id).unwrap().available_seats(), 50);
    assert!(!catalog.booking(index).unwrap().is_confirmed());
}

#[test]
fn test_confirm_twice_is_idempotent() {
    let (mut catalog, show_id) = catalog_with_show(50);
    let index = catalog.create_booking(show_id, 10).unwrap();

    assert!(catalog.confirm_booking(index).unwrap());
    assert!(!catalog.confirm_booking(index).unwrap());
    assert_eq!(catalog.show(show_id).unwrap().available_seats(), 40);
}

#[test]
fn test_confirm_unknown_index_is_noop() {
    let (mut catalog, show_id) = catalog_with_show(50);

    assert!(!catalog.confirm_booking(3).unwrap());
    assert_eq!(catalog.show(show_id).unwrap().available_seats(), 50);
}

#[test]
fn test_confirm_over_capacity_fails() {
    let (mut catalog, show_id) = catalog_with_show(5);
    let index = catalog.create_booking(show_id, 6).unwrap();

    let err = catalog.confirm_booking(index).unwrap_err();
    assert!(matches!(err, BookingError::Capacity { requested: 6, available: 5 }));
    assert!(!catalog.booking(index).unwrap().is_confirmed());
    assert_eq!(catalog.show(show_id).unwrap().available_seats(), 5);
}

#[test]
fn test_second_booking_over_capacity_leaves_first_untouched() {
    let (mut catalog, show_id) = catalog_with_show(50);
    let first = catalog.create_booking(show_id, 30).unwrap();
    let second = catalog.create_booking(show_id, 30).unwrap();

    catalog.confirm_booking(first).unwrap();
    assert_eq!(catalog.show(show_id).unwrap().available_seats(), 20);

    let err = catalog.confirm_booking(second).unwrap_err();
    assert!(matches!(err, BookingError::Capacity { requested: 30, available: 20 }));

    assert!(catalog.booking(first).unwrap().is_confirmed());
    assert!(!catalog.booking(second).unwrap().is_confirmed());
    assert_eq!(catalog.show(show_id).unwrap().available_seats(), 20);
}

#[test]
fn test_cancel_unconfirmed_or_unknown_booking_fails() {
    let (mut catalog, show_id) = catalog_with_show(50);
    let index = catalog.create_booking(show_id, 10).unwrap();

    let err = catalog.cancel_booking(index).unwrap_err();
    assert!(matches!(err, BookingError::InvalidState(_)));

    let err = catalog.cancel_booking(7).unwrap_err();
    assert!(matches!(err, BookingError::InvalidState(_)));

    assert_eq!(catalog.show(show_id).unwrap().available_seats(), 50);
}

#[test]
fn test_cancelled_booking_can_be_confirmed_again() {
    let (mut catalog, show_id) = catalog_with_show(50);
    let index = catalog.create_booking(show_id, 10).unwrap();

    catalog.confirm_booking(index).unwrap();
    catalog.cancel_booking(index).unwrap();
    assert!(catalog.confirm_booking(index).unwrap());
    assert_eq!(catalog.show(show_id).unwrap().available_seats(), 40);
}

#[test]
fn test_cinemas_showing_movie_in_city() {
    let mut catalog = Catalog::new();
    let movie_x = catalog.add_movie("Movie X").unwrap().id;
    let movie_y = catalog.add_movie("Movie Y").unwrap().id;

    let rex = catalog.add_cinema_hall("Le Grand Rex", "Paris").unwrap().id;
    let mk2 = catalog.add_cinema_hall("MK2 Bibliotheque", "PARIS").unwrap().id;
    let odeon = catalog.add_cinema_hall("Odeon", "London").unwrap().id;
    let empty = catalog.add_cinema_hall("Studio 28", "paris").unwrap().id;

    let show = |movie_id| NewShow {
        movie_id,
        date: date(1),
        time: evening(),
        total_seats: None,
    };
    catalog.add_show(rex, show(movie_x)).unwrap();
    catalog.add_show(mk2, show(movie_y)).unwrap();
    catalog.add_show(mk2, show(movie_x)).unwrap();
    catalog.add_show(odeon, show(movie_x)).unwrap();

    let ids: Vec<_> = catalog
        .cinemas_showing_movie_in_city("paris", movie_x)
        .iter()
        .map(|hall| hall.id)
        .collect();
    assert_eq!(ids, vec![rex, mk2]);
    assert!(!ids.contains(&empty));

    let ids: Vec<_> = catalog
        .cinemas_showing_movie_in_city("Paris", movie_y)
        .iter()
        .map(|hall| hall.id)
        .collect();
    assert_eq!(ids, vec![mk2]);

    assert!(catalog.cinemas_showing_movie_in_city("Lyon", movie_x).is_empty());
}

#[test]
fn test_shows_of_movie_in_cinema_with_date_filter() {
    let mut catalog = Catalog::new();
    let heat = catalog.add_movie("Heat").unwrap().id;
    let ronin = catalog.add_movie("Ronin").unwrap().id;
    let hall = catalog.add_cinema_hall("Odeon", "London").unwrap().id;
    let other_hall = catalog.add_cinema_hall("Curzon", "London").unwrap().id;

    let show = |movie_id, day| NewShow {
        movie_id,
        date: date(day),
        time: evening(),
        total_seats: None,
    };
    let first = catalog.add_show(hall, show(heat, 1)).unwrap().id;
    let second = catalog.add_show(hall, show(heat, 2)).unwrap().id;
    catalog.add_show(hall, show(ronin, 1)).unwrap();
    catalog.add_show(other_hall, show(heat, 1)).unwrap();

    let all: Vec<_> = catalog
        .shows_of_movie_in_cinema(hall, heat, None)
        .unwrap()
        .iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(all, vec![first, second]);

    let on_second: Vec<_> = catalog
        .shows_of_movie_in_cinema(hall, heat, Some(date(2)))
        .unwrap()
        .iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(on_second, vec![second]);

    assert!(catalog
        .shows_of_movie_in_cinema(99, heat, None)
        .unwrap_err()
        .is_not_found());
}

#[test]
fn test_all_shows_with_date_filter() {
    let mut catalog = Catalog::new();
    let heat = catalog.add_movie("Heat").unwrap().id;
    let odeon = catalog.add_cinema_hall("Odeon", "London").unwrap().id;
    let curzon = catalog.add_cinema_hall("Curzon", "London").unwrap().id;

    let show = |day| NewShow {
        movie_id: heat,
        date: date(day),
        time: evening(),
        total_seats: None,
    };
    catalog.add_show(odeon, show(1)).unwrap();
    catalog.add_show(curzon, show(2)).unwrap();
    catalog.add_show(odeon, show(2)).unwrap();

    let all: Vec<_> = catalog.all_shows(None).iter().map(|s| s.id).collect();
    assert_eq!(all, vec![1, 2, 3]);

    let filtered: Vec<_> = catalog.all_shows(Some(date(2))).iter().map(|s| s.id).collect();
    assert_eq!(filtered, vec![2, 3]);

    assert!(catalog.all_shows(Some(date(9))).is_empty());
}

#[test]
fn test_observer_hooks() {
    let observer = Arc::new(RecordingObserver::default());
    let mut catalog = Catalog::with_observer(observer.clone());

    let movie_id = catalog.add_movie("Heat").unwrap().id;
    let hall_id = catalog.add_cinema_hall("Odeon", "London").unwrap().id;
    let show_id = catalog
        .add_show(
            hall_id,
            NewShow {
                movie_id,
                date: date(1),
                time: evening(),
                total_seats: Some(5),
            },
        )
        .unwrap()
        .id;
    assert_eq!(observer.changes(), 3);

    let ok = catalog.create_booking(show_id, 2).unwrap();
    let too_big = catalog.create_booking(show_id, 6).unwrap();
    assert_eq!(observer.changes(), 5);

    catalog.confirm_booking(ok).unwrap();
    catalog.confirm_booking(ok).unwrap();
    assert!(catalog.confirm_booking(too_big).is_err());
    assert!(catalog.cancel_booking(too_big).is_err());
    catalog.cancel_booking(ok).unwrap();
    assert_eq!(observer.changes(), 7);

    assert_eq!(
        observer.messages(),
        vec![
            "Added movie: Heat",
            "Added cinema: Odeon",
            "Added show: Heat at 19:30 on 2024-06-01",
            "Booked 2 tickets",
            "Booking canceled",
        ]
    );
}
