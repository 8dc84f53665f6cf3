use crate::{CinemaHallId, MovieId, ShowId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Not enough seats available: requested {requested}, available {available}")]
    Capacity { requested: u32, available: u32 },

    #[error("Invalid number of tickets to cancel: requested {requested}, booked {booked}")]
    InvalidCancellation { requested: u32, booked: u32 },

    #[error("Movie not found: {0}")]
    MovieNotFound(MovieId),

    #[error("Cinema not found: {0}")]
    CinemaHallNotFound(CinemaHallId),

    #[error("Show not found: {0}")]
    ShowNotFound(ShowId),

    #[error("Invalid booking: {0}")]
    InvalidState(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Payment task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl BookingError {
    /// True for errors raised by a lookup of a movie, cinema hall or show id.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::MovieNotFound(_) | Self::CinemaHallNotFound(_) | Self::ShowNotFound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, BookingError>;
