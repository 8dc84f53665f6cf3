use cinema_booking::{
    Booking, BookingError, Catalog, CinemaHall, CinemaHallId, Metrics, Movie, MovieId, NewShow,
    PaymentOutcome, PaymentSimulator, Result, ServiceConfig, Show, ShowId,
};
use crate::{CreateBookingRequest, CreateCinemaRequest, CreateMovieRequest, CreateShowRequest};
use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

#[derive(Debug, Serialize)]
pub struct ShowView {
    pub id: ShowId,
    pub movie_id: MovieId,
    pub movie_title: String,
    pub date: NaiveDate,
    pub time: String,
    pub total_seats: u32,
    pub available_seats: u32,
}

#[derive(Debug, Serialize)]
pub struct BookingView {
    pub index: usize,
    pub id: u32,
    pub show_id: ShowId,
    pub movie_title: String,
    pub date: NaiveDate,
    pub time: String,
    pub seat_count: u32,
    pub confirmed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct PaymentStarted {
    pub booking_index: usize,
    pub booking_id: u32,
    pub confirm_after_ms: u64,
}

/// Result of a manual confirmation. An unknown index or an already confirmed
/// booking is a no-op: `confirmed_now` is false and `booking` is whatever
/// sits at the index, if anything.
#[derive(Debug, Serialize)]
pub struct ConfirmOutcome {
    pub confirmed_now: bool,
    pub booking: Option<BookingView>,
}

#[derive(Clone)]
pub struct BookingService {
    catalog: Arc<Mutex<Catalog>>,
    payments: PaymentSimulator,
    metrics: Arc<Metrics>,
}

impl BookingService {
    pub fn new(config: &ServiceConfig, metrics: Arc<Metrics>) -> Self {
        let catalog = Catalog::new().with_default_total_seats(config.default_total_seats);

        Self {
            catalog: Arc::new(Mutex::new(catalog)),
            payments: PaymentSimulator::new(config.payment_delay()),
            metrics,
        }
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub async fn add_movie(&self, request: CreateMovieRequest) -> Result<Movie> {
        let mut catalog = self.catalog.lock().await;
        let movie = catalog.add_movie(&request.title)?.clone();
        self.metrics.movies_added.inc();
        Ok(movie)
    }

    pub async fn movies(&self) -> Vec<Movie> {
        self.catalog.lock().await.movies().cloned().collect()
    }

    pub async fn add_cinema_hall(&self, request: CreateCinemaRequest) -> Result<CinemaHall> {
        let mut catalog = self.catalog.lock().await;
        let hall = catalog.add_cinema_hall(&request.name, &request.city)?.clone();
        self.metrics.cinema_halls_added.inc();
        Ok(hall)
    }

    pub async fn cinema_halls(&self) -> Vec<CinemaHall> {
        self.catalog.lock().await.cinema_halls().cloned().collect()
    }

    pub async fn add_show(&self, cinema_hall_id: CinemaHallId, request: CreateShowRequest) -> Result<ShowView> {
        let new_show = NewShow {
            movie_id: request.movie_id,
            date: request.date,
            time: parse_time(&request.time)?,
            total_seats: request.total_seats,
        };

        let mut catalog = self.catalog.lock().await;
        let show = catalog.add_show(cinema_hall_id, new_show)?.clone();
        self.metrics.shows_added.inc();
        show_view(&catalog, &show)
    }

    pub async fn all_shows(&self, date: Option<String>) -> Result<Vec<ShowView>> {
        let filter_date = parse_date_filter(date)?;
        let catalog = self.catalog.lock().await;

        catalog
            .all_shows(filter_date)
            .into_iter()
            .map(|show| show_view(&catalog, show))
            .collect()
    }

    pub async fn shows_of_movie_in_cinema(
        &self,
        cinema_hall_id: CinemaHallId,
        movie_id: MovieId,
        date: Option<String>,
    ) -> Result<Vec<ShowView>> {
        let filter_date = parse_date_filter(date)?;
        let catalog = self.catalog.lock().await;

        catalog
            .shows_of_movie_in_cinema(cinema_hall_id, movie_id, filter_date)?
            .into_iter()
            .map(|show| show_view(&catalog, show))
            .collect()
    }

    pub async fn search_cinemas(&self, city: &str, movie_id: MovieId) -> Result<Vec<CinemaHall>> {
        let catalog = self.catalog.lock().await;
        catalog.movie(movie_id)?;

        Ok(catalog
            .cinemas_showing_movie_in_city(city.trim(), movie_id)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Create a booking and confirm it once the simulated payment completes.
    pub async fn create_booking(&self, request: CreateBookingRequest) -> Result<PaymentStarted> {
        let pending = self
            .payments
            .simulate_payment(Arc::clone(&self.catalog), request.show_id, request.seat_count)
            .await?;
        self.metrics.bookings_created.inc();

        let started = PaymentStarted {
            booking_index: pending.booking_index,
            booking_id: pending.booking_id,
            confirm_after_ms: self.payments.delay().as_millis() as u64,
        };

        let metrics = Arc::clone(&self.metrics);
        let seat_count = request.seat_count;
        tokio::spawn(async move {
            match pending.wait().await {
                Ok(PaymentOutcome::Paid(receipt)) => {
                    info!(
                        "Payment {} confirmed booking {}",
                        receipt.transaction_id, receipt.booking_id
                    );
                    metrics.record_confirmation(true, seat_count);
                }
                Ok(PaymentOutcome::AlreadyConfirmed { booking_id, .. }) => {
                    info!("Payment for booking {} found it already confirmed", booking_id);
                }
                Err(e) => {
                    warn!("Payment did not confirm booking: {}", e);
                    metrics.record_confirmation(false, seat_count);
                }
            }
        });

        Ok(started)
    }

    pub async fn confirm_booking(&self, index: usize) -> Result<ConfirmOutcome> {
        let mut catalog = self.catalog.lock().await;
        let result = catalog.confirm_booking(index);
        let seat_count = catalog.booking(index).map_or(0, |booking| booking.seat_count);

        let confirmed_now = match result {
            Ok(confirmed) => confirmed,
            Err(e) => {
                self.metrics.record_confirmation(false, seat_count);
                return Err(e);
            }
        };
        if confirmed_now {
            self.metrics.record_confirmation(true, seat_count);
        }

        let booking = catalog
            .booking(index)
            .map(|booking| booking_view(&catalog, index, booking))
            .transpose()?;

        Ok(ConfirmOutcome { confirmed_now, booking })
    }

    pub async fn cancel_booking(&self, index: usize) -> Result<BookingView> {
        let mut catalog = self.catalog.lock().await;
        catalog.cancel_booking(index)?;
        self.metrics.bookings_cancelled.inc();
        booking_at(&catalog, index)
    }

    pub async fn bookings(&self) -> Result<Vec<BookingView>> {
        let catalog = self.catalog.lock().await;

        catalog
            .bookings()
            .iter()
            .enumerate()
            .map(|(index, booking)| booking_view(&catalog, index, booking))
            .collect()
    }
}

fn show_view(catalog: &Catalog, show: &Show) -> Result<ShowView> {
    let movie = catalog.movie(show.movie_id)?;

    Ok(ShowView {
        id: show.id,
        movie_id: movie.id,
        movie_title: movie.title.clone(),
        date: show.date,
        time: format_time(show.time),
        total_seats: show.total_seats(),
        available_seats: show.available_seats(),
    })
}

fn booking_at(catalog: &Catalog, index: usize) -> Result<BookingView> {
    let booking = catalog
        .booking(index)
        .ok_or_else(|| BookingError::InvalidState(format!("no booking at index {}", index)))?;
    booking_view(catalog, index, booking)
}

fn booking_view(catalog: &Catalog, index: usize, booking: &Booking) -> Result<BookingView> {
    let show = catalog.show(booking.show_id)?;
    let movie = catalog.movie(show.movie_id)?;

    Ok(BookingView {
        index,
        id: booking.id,
        show_id: show.id,
        movie_title: movie.title.clone(),
        date: show.date,
        time: format_time(show.time),
        seat_count: booking.seat_count,
        confirmed: booking.is_confirmed(),
        created_at: booking.created_at,
    })
}

/// `HH:MM`, or `HH:MM:SS` when the show does not start on a whole minute.
fn format_time(time: NaiveTime) -> String {
    if time.second() == 0 {
        time.format("%H:%M").to_string()
    } else {
        time.format("%H:%M:%S").to_string()
    }
}

/// Accepts `HH:MM` as sent by a time input, or `HH:MM:SS`.
fn parse_time(time_str: &str) -> Result<NaiveTime> {
    let time_str = time_str.trim();
    NaiveTime::parse_from_str(time_str, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(time_str, "%H:%M:%S"))
        .map_err(|_| BookingError::InvalidArgument(format!("Invalid time format: {}", time_str)))
}

/// An absent or empty date means no filter.
fn parse_date_filter(date: Option<String>) -> Result<Option<NaiveDate>> {
    match date.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(date_str) => NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| BookingError::InvalidArgument(format!("Invalid date format: {}", date_str))),
    }
}
