use crate::{BookingError, MovieId, Result, ShowId};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TOTAL_SEATS: u32 = 50;

/// One scheduled screening of a movie.
///
/// `booked_seats` only changes through [`Show::book_tickets`] and
/// [`Show::cancel_tickets`], which keep `booked_seats <= total_seats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ShowRecord")]
pub struct Show {
    pub id: ShowId,
    pub movie_id: MovieId,
    pub date: NaiveDate,
    pub time: NaiveTime,
    total_seats: u32,
    booked_seats: u32,
}

/// Unchecked wire form of a [`Show`].
#[derive(Deserialize)]
struct ShowRecord {
    id: ShowId,
    movie_id: MovieId,
    date: NaiveDate,
    time: NaiveTime,
    total_seats: u32,
    booked_seats: u32,
}

impl TryFrom<ShowRecord> for Show {
    type Error = BookingError;

    fn try_from(record: ShowRecord) -> Result<Self> {
        if record.total_seats == 0 {
            return Err(BookingError::InvalidArgument(format!(
                "show {} has no seats",
                record.id
            )));
        }
        if record.booked_seats > record.total_seats {
            return Err(BookingError::InvalidArgument(format!(
                "show {} has {} booked seats but only {} in total",
                record.id, record.booked_seats, record.total_seats
            )));
        }

        Ok(Self {
            id: record.id,
            movie_id: record.movie_id,
            date: record.date,
            time: record.time,
            total_seats: record.total_seats,
            booked_seats: record.booked_seats,
        })
    }
}

impl Show {
    pub fn new(id: ShowId, movie_id: MovieId, date: NaiveDate, time: NaiveTime, total_seats: u32) -> Self {
        Self {
            id,
            movie_id,
            date,
            time,
            total_seats,
            booked_seats: 0,
        }
    }

    pub fn total_seats(&self) -> u32 {
        self.total_seats
    }

    pub fn booked_seats(&self) -> u32 {
        self.booked_seats
    }

    pub fn available_seats(&self) -> u32 {
        self.total_seats - self.booked_seats
    }

    /// Reserve `count` seats. All or nothing.
    pub fn book_tickets(&mut self, count: u32) -> Result<()> {
        let available = self.available_seats();
        if count > available {
            return Err(BookingError::Capacity {
                requested: count,
                available,
            });
        }

        self.booked_seats += count;
        Ok(())
    }

    pub fn cancel_tickets(&mut self, count: u32) -> Result<()> {
        if count > self.booked_seats {
            return Err(BookingError::InvalidCancellation {
                requested: count,
                booked: self.booked_seats,
            });
        }

        self.booked_seats -= count;
        Ok(())
    }

    /// No filter matches every show.
    pub fn matches_date(&self, filter_date: Option<NaiveDate>) -> bool {
        filter_date.map_or(true, |date| self.date == date)
    }
}
