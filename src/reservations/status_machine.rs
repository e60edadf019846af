use crate::reservations::ReservationStatus;

/// Service for validating reservation status transitions
pub struct StatusMachine;

impl StatusMachine {
    /// Check if a status transition is valid
    ///
    /// # Valid Transitions
    /// - Pending → Confirmed, Cancelled
    /// - Confirmed → CheckedIn, Cancelled, NoShow
    /// - CheckedIn → CheckedOut
    /// - CheckedOut, Cancelled, NoShow are terminal
    /// - Any status → Same status (idempotent)
    pub fn is_valid_transition(from: ReservationStatus, to: ReservationStatus) -> bool {
        use ReservationStatus::*;

        if from == to {
            return true;
        }

        matches!(
            (from, to),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, CheckedIn)
                | (Confirmed, Cancelled)
                | (Confirmed, NoShow)
                | (CheckedIn, CheckedOut)
        )
    }

    /// Attempt to transition from one status to another
    ///
    /// # Returns
    /// `Ok(to)` if the transition is valid, `Err(message)` otherwise
    pub fn transition(
        from: ReservationStatus,
        to: ReservationStatus,
    ) -> Result<ReservationStatus, String> {
        if Self::is_valid_transition(from, to) {
            Ok(to)
        } else {
            Err(format!(
                "Invalid reservation status transition from {} to {}",
                from, to
            ))
        }
    }
}
