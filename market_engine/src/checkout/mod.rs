//! Client-side checkout flow pieces: the payment confirmation state machine.

mod confirmation;

pub use confirmation::{ConfirmationError, ConfirmationOutcome, ConfirmationState, PaymentConfirmation};
