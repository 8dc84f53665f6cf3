use prometheus::{
    Counter, Histogram, Registry, Opts, HistogramOpts,
    register_counter_with_registry, register_histogram_with_registry,
    Encoder, TextEncoder,
};
use std::sync::Arc;
use crate::{BookingError, Result};

/// Metrics collector for the booking service
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,

    // Catalog metrics
    pub movies_added: Counter,
    pub cinema_halls_added: Counter,
    pub shows_added: Counter,

    // Booking metrics
    pub bookings_created: Counter,
    pub bookings_confirmed: Counter,
    pub bookings_failed: Counter,
    pub bookings_cancelled: Counter,
    pub seats_booked: Counter,

    // Service metrics
    pub request_duration: Histogram,
}

impl Metrics {
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());

        let movies_added = register_counter_with_registry!(
            Opts::new("movies_added_total", "Total number of movies added"),
            registry
        )?;

        let cinema_halls_added = register_counter_with_registry!(
            Opts::new("cinema_halls_added_total", "Total number of cinema halls added"),
            registry
        )?;

        let shows_added = register_counter_with_registry!(
            Opts::new("shows_added_total", "Total number of shows scheduled"),
            registry
        )?;

        let bookings_created = register_counter_with_registry!(
            Opts::new("bookings_created_total", "Total number of bookings created"),
            registry
        )?;

        let bookings_confirmed = register_counter_with_registry!(
            Opts::new("bookings_confirmed_total", "Total number of bookings confirmed"),
            registry
        )?;

        let bookings_failed = register_counter_with_registry!(
            Opts::new("bookings_failed_total", "Total number of booking confirmations that failed"),
            registry
        )?;

        let bookings_cancelled = register_counter_with_registry!(
            Opts::new("bookings_cancelled_total", "Total number of bookings cancelled"),
            registry
        )?;

        let seats_booked = register_counter_with_registry!(
            Opts::new("seats_booked_total", "Total number of seats reserved by confirmed bookings"),
            registry
        )?;

        let request_duration = register_histogram_with_registry!(
            HistogramOpts::new("request_duration_seconds", "Time spent processing requests")
                .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
            registry
        )?;

        Ok(Self {
            registry,
            movies_added,
            cinema_halls_added,
            shows_added,
            bookings_created,
            bookings_confirmed,
            bookings_failed,
            bookings_cancelled,
            seats_booked,
            request_duration,
        })
    }

    /// Export metrics in Prometheus format
    pub fn export(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|e| BookingError::InvalidArgument(format!("Metrics are not UTF-8: {}", e)))
    }

    pub fn record_confirmation(&self, success: bool, seat_count: u32) {
        if success {
            self.bookings_confirmed.inc();
            self.seats_booked.inc_by(f64::from(seat_count));
        } else {
            self.bookings_failed.inc();
        }
    }

    pub fn record_request(&self, duration: std::time::Duration) {
        self.request_duration.observe(duration.as_secs_f64());
    }
}
