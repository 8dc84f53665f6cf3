use crate::{BookingError, BookingId, Catalog, Result, ShowId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{error, info};
use uuid::Uuid;

pub const DEFAULT_PAYMENT_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub transaction_id: Uuid,
    pub booking_index: usize,
    pub booking_id: BookingId,
    pub show_id: ShowId,
    pub seat_count: u32,
    pub paid_at: DateTime<Utc>,
}

/// How a finished payment left its booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PaymentOutcome {
    /// The payment reserved the booking's seats.
    Paid(PaymentReceipt),
    /// The booking was confirmed by someone else before the payment ran.
    /// No seats were reserved by this payment.
    AlreadyConfirmed { booking_index: usize, booking_id: BookingId },
}

impl PaymentOutcome {
    pub fn receipt(&self) -> Option<&PaymentReceipt> {
        match self {
            Self::Paid(receipt) => Some(receipt),
            Self::AlreadyConfirmed { .. } => None,
        }
    }
}

/// A booking whose confirmation is still running in the background.
pub struct PendingPayment {
    pub booking_index: usize,
    pub booking_id: BookingId,
    handle: JoinHandle<Result<PaymentOutcome>>,
}

impl PendingPayment {
    /// Wait for the confirmation task to finish.
    pub async fn wait(self) -> Result<PaymentOutcome> {
        self.handle.await?
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Mock payment step: books now, confirms after a fixed delay.
#[derive(Debug, Clone)]
pub struct PaymentSimulator {
    delay: Duration,
}

impl Default for PaymentSimulator {
    fn default() -> Self {
        Self::new(DEFAULT_PAYMENT_DELAY)
    }
}

impl PaymentSimulator {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Create a booking and schedule its confirmation.
    ///
    /// Creation errors return immediately. Confirmation errors are sent to
    /// the catalog observer's `notify` and returned from
    /// [`PendingPayment::wait`]. Only a payment that reserves seats yields a
    /// receipt.
    pub async fn simulate_payment(
        &self,
        catalog: Arc<Mutex<Catalog>>,
        show_id: ShowId,
        seat_count: u32,
    ) -> Result<PendingPayment> {
        let (booking_index, booking_id) = {
            let mut catalog = catalog.lock().await;
            let index = catalog.create_booking(show_id, seat_count)?;
            let id = catalog
                .booking(index)
                .map(|booking| booking.id)
                .ok_or_else(|| BookingError::InvalidState(format!("missing booking at index {}", index)))?;
            (index, id)
        };

        info!(
            "Payment started for booking {} ({} seats), confirming in {:?}",
            booking_id, seat_count, self.delay
        );

        let delay = self.delay;
        let handle = tokio::spawn(async move {
            sleep(delay).await;

            let mut catalog = catalog.lock().await;
            match catalog.confirm_booking(booking_index) {
                Ok(true) => Ok(PaymentOutcome::Paid(PaymentReceipt {
                    transaction_id: Uuid::new_v4(),
                    booking_index,
                    booking_id,
                    show_id,
                    seat_count,
                    paid_at: Utc::now(),
                })),
                Ok(false) => {
                    info!("Booking {} was confirmed before its payment completed", booking_id);
                    Ok(PaymentOutcome::AlreadyConfirmed {
                        booking_index,
                        booking_id,
                    })
                }
                Err(e) => {
                    error!("Payment for booking {} failed: {}", booking_id, e);
                    catalog.observer().notify(&e.to_string());
                    Err(e)
                }
            }
        });

        Ok(PendingPayment {
            booking_index,
            booking_id,
            handle,
        })
    }
}
