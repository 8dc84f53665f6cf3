use crate::{
    Booking, BookingError, CatalogObserver, CinemaHall, CinemaHallId, Movie, MovieId, Result,
    Show, ShowId, TracingObserver, DEFAULT_TOTAL_SEATS,
};
use chrono::{NaiveDate, NaiveTime};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Fields of a show to schedule. `total_seats` falls back to the catalog's
/// default seat count.
#[derive(Debug, Clone)]
pub struct NewShow {
    pub movie_id: MovieId,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub total_seats: Option<u32>,
}

/// In-memory registry of movies, cinema halls, shows and bookings for one
/// session.
///
/// The catalog assigns every id from its own counters, starting at 1 and
/// never reused. Bookings are kept in creation order and addressed by their
/// index in that order.
pub struct Catalog {
    movies: BTreeMap<MovieId, Movie>,
    cinema_halls: BTreeMap<CinemaHallId, CinemaHall>,
    shows: BTreeMap<ShowId, Show>,
    bookings: Vec<Booking>,

    next_movie_id: MovieId,
    next_cinema_id: CinemaHallId,
    next_show_id: ShowId,
    next_booking_id: u32,

    default_total_seats: u32,
    observer: Arc<dyn CatalogObserver + Send + Sync>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    pub fn new() -> Self {
        Self::with_observer(Arc::new(TracingObserver))
    }

    pub fn with_observer(observer: Arc<dyn CatalogObserver + Send + Sync>) -> Self {
        Self {
            movies: BTreeMap::new(),
            cinema_halls: BTreeMap::new(),
            shows: BTreeMap::new(),
            bookings: Vec::new(),
            next_movie_id: 1,
            next_cinema_id: 1,
            next_show_id: 1,
            next_booking_id: 1,
            default_total_seats: DEFAULT_TOTAL_SEATS,
            observer,
        }
    }

    pub fn with_default_total_seats(mut self, seats: u32) -> Self {
        self.default_total_seats = seats;
        self
    }

    pub fn observer(&self) -> Arc<dyn CatalogObserver + Send + Sync> {
        Arc::clone(&self.observer)
    }

    pub fn add_movie(&mut self, title: &str) -> Result<&Movie> {
        let title = required("movie title", title)?;

        let id = self.next_movie_id;
        self.next_movie_id += 1;
        info!("Adding movie {}: {}", id, title);

        self.movies.insert(id, Movie::new(id, title));
        self.observer.notify(&format!("Added movie: {}", title));
        self.observer.on_catalog_changed();

        self.movie(id)
    }

    pub fn add_cinema_hall(&mut self, name: &str, city: &str) -> Result<&CinemaHall> {
        let name = required("cinema name", name)?;
        let city = required("cinema city", city)?;

        let id = self.next_cinema_id;
        self.next_cinema_id += 1;
        info!("Adding cinema hall {}: {} ({})", id, name, city);

        self.cinema_halls.insert(id, CinemaHall::new(id, name, city));
        self.observer.notify(&format!("Added cinema: {}", name));
        self.observer.on_catalog_changed();

        self.cinema_hall(id)
    }

    /// Schedule a show in a cinema hall. The hall and the movie must exist.
    pub fn add_show(&mut self, cinema_hall_id: CinemaHallId, new_show: NewShow) -> Result<&Show> {
        let movie_title = self.movie(new_show.movie_id)?.title.clone();
        let total_seats = new_show.total_seats.unwrap_or(self.default_total_seats);
        if total_seats == 0 {
            return Err(BookingError::InvalidArgument(
                "a show needs at least one seat".to_string(),
            ));
        }

        let hall = self
            .cinema_halls
            .get_mut(&cinema_hall_id)
            .ok_or(BookingError::CinemaHallNotFound(cinema_hall_id))?;

        let id = self.next_show_id;
        self.next_show_id += 1;
        info!(
            "Adding show {} of movie {} to cinema hall {} ({} seats)",
            id, new_show.movie_id, cinema_hall_id, total_seats
        );

        let show = Show::new(id, new_show.movie_id, new_show.date, new_show.time, total_seats);
        hall.shows.push(id);
        self.shows.insert(id, show);

        self.observer.notify(&format!(
            "Added show: {} at {} on {}",
            movie_title,
            new_show.time.format("%H:%M"),
            new_show.date
        ));
        self.observer.on_catalog_changed();

        self.show(id)
    }

    /// Create an unconfirmed booking. No seats are reserved until
    /// [`Catalog::confirm_booking`]. Returns the booking's index.
    pub fn create_booking(&mut self, show_id: ShowId, seat_count: u32) -> Result<usize> {
        if seat_count == 0 {
            return Err(BookingError::InvalidArgument(
                "seat count must be positive".to_string(),
            ));
        }
        if !self.shows.contains_key(&show_id) {
            warn!("Rejected booking for unknown show {}", show_id);
            return Err(BookingError::ShowNotFound(show_id));
        }

        let id = self.next_booking_id;
        self.next_booking_id += 1;
        self.bookings.push(Booking::new(id, show_id, seat_count));
        info!("Created booking {} for show {} ({} seats)", id, show_id, seat_count);

        self.observer.on_catalog_changed();
        Ok(self.bookings.len() - 1)
    }

    /// Confirm the booking at `index`, reserving its seats.
    ///
    /// An unknown index or an already confirmed booking is a no-op and
    /// returns `Ok(false)`. Capacity errors propagate and leave the booking
    /// unconfirmed.
    pub fn confirm_booking(&mut self, index: usize) -> Result<bool> {
        let Some(booking) = self.bookings.get_mut(index) else {
            return Ok(false);
        };
        if booking.is_confirmed() {
            return Ok(false);
        }

        let show = self
            .shows
            .get_mut(&booking.show_id)
            .ok_or(BookingError::ShowNotFound(booking.show_id))?;

        if let Err(e) = booking.confirm(show) {
            warn!("Failed to confirm booking {}: {}", booking.id, e);
            return Err(e);
        }

        info!(
            "Confirmed booking {} ({} seats, {} left on show {})",
            booking.id,
            booking.seat_count,
            show.available_seats(),
            show.id
        );
        let seat_count = booking.seat_count;
        self.observer.notify(&format!("Booked {} tickets", seat_count));
        self.observer.on_catalog_changed();
        Ok(true)
    }

    /// Cancel the confirmed booking at `index`, releasing its seats. The
    /// booking returns to unconfirmed and may be confirmed again.
    pub fn cancel_booking(&mut self, index: usize) -> Result<()> {
        let booking = self
            .bookings
            .get_mut(index)
            .filter(|booking| booking.is_confirmed())
            .ok_or_else(|| {
                BookingError::InvalidState(format!("no confirmed booking at index {}", index))
            })?;

        let show = self
            .shows
            .get_mut(&booking.show_id)
            .ok_or(BookingError::ShowNotFound(booking.show_id))?;
        booking.cancel(show)?;
        info!("Cancelled booking {} on show {}", booking.id, show.id);

        self.observer.notify("Booking canceled");
        self.observer.on_catalog_changed();
        Ok(())
    }

    pub fn movie(&self, id: MovieId) -> Result<&Movie> {
        self.movies.get(&id).ok_or(BookingError::MovieNotFound(id))
    }

    pub fn cinema_hall(&self, id: CinemaHallId) -> Result<&CinemaHall> {
        self.cinema_halls
            .get(&id)
            .ok_or(BookingError::CinemaHallNotFound(id))
    }

    pub fn show(&self, id: ShowId) -> Result<&Show> {
        self.shows.get(&id).ok_or(BookingError::ShowNotFound(id))
    }

    pub fn booking(&self, index: usize) -> Option<&Booking> {
        self.bookings.get(index)
    }

    pub fn movies(&self) -> impl Iterator<Item = &Movie> {
        self.movies.values()
    }

    pub fn cinema_halls(&self) -> impl Iterator<Item = &CinemaHall> {
        self.cinema_halls.values()
    }

    pub fn bookings(&self) -> &[Booking] {
        &self.bookings
    }

    /// Halls in `city` (case-insensitive) with at least one show of the movie.
    pub fn cinemas_showing_movie_in_city(&self, city: &str, movie_id: MovieId) -> Vec<&CinemaHall> {
        self.cinema_halls
            .values()
            .filter(|hall| hall.is_in_city(city))
            .filter(|hall| {
                hall.shows
                    .iter()
                    .filter_map(|show_id| self.shows.get(show_id))
                    .any(|show| show.movie_id == movie_id)
            })
            .collect()
    }

    pub fn shows_of_movie_in_cinema(
        &self,
        cinema_hall_id: CinemaHallId,
        movie_id: MovieId,
        filter_date: Option<NaiveDate>,
    ) -> Result<Vec<&Show>> {
        let hall = self.cinema_hall(cinema_hall_id)?;

        Ok(hall
            .shows
            .iter()
            .filter_map(|show_id| self.shows.get(show_id))
            .filter(|show| show.movie_id == movie_id && show.matches_date(filter_date))
            .collect())
    }

    pub fn all_shows(&self, filter_date: Option<NaiveDate>) -> Vec<&Show> {
        self.shows
            .values()
            .filter(|show| show.matches_date(filter_date))
            .collect()
    }
}

fn required<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(BookingError::InvalidArgument(format!("{} must not be empty", field)));
    }
    Ok(value)
}
