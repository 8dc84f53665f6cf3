use super::show::Show;
use crate::{BookingError, BookingId, Result, ShowId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum BookingState {
    #[default]
    Unconfirmed,
    Confirmed,
}

/// A request for `seat_count` seats of one show.
///
/// While the booking is `Confirmed` its seats are counted in the show's
/// `booked_seats`; while `Unconfirmed` they are not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub show_id: ShowId,
    pub seat_count: u32,
    pub created_at: DateTime<Utc>,
    state: BookingState,
}

impl Booking {
    pub fn new(id: BookingId, show_id: ShowId, seat_count: u32) -> Self {
        Self {
            id,
            show_id,
            seat_count,
            created_at: Utc::now(),
            state: BookingState::Unconfirmed,
        }
    }

    pub fn state(&self) -> BookingState {
        self.state
    }

    pub fn is_confirmed(&self) -> bool {
        self.state == BookingState::Confirmed
    }

    /// Reserve this booking's seats on `show`. A capacity failure leaves the
    /// booking unconfirmed. Confirming twice does not reserve twice.
    pub fn confirm(&mut self, show: &mut Show) -> Result<()> {
        self.check_show(show)?;
        if self.is_confirmed() {
            return Ok(());
        }

        show.book_tickets(self.seat_count)?;
        self.state = BookingState::Confirmed;
        Ok(())
    }

    pub fn cancel(&mut self, show: &mut Show) -> Result<()> {
        self.check_show(show)?;
        if !self.is_confirmed() {
            return Err(BookingError::InvalidState(format!(
                "booking {} is not confirmed",
                self.id
            )));
        }

        show.cancel_tickets(self.seat_count)?;
        self.state = BookingState::Unconfirmed;
        Ok(())
    }

    fn check_show(&self, show: &Show) -> Result<()> {
        if show.id != self.show_id {
            return Err(BookingError::InvalidArgument(format!(
                "booking {} belongs to show {}, not show {}",
                self.id, self.show_id, show.id
            )));
        }
        Ok(())
    }
}
