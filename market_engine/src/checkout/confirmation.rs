//! The payment confirmation state machine.
//!
//! A confirmation drives the processor's client-side payment sheet to a terminal outcome:
//!
//! ```text
//! NotStarted → SheetPresented → { Completed, Failed(reason), Canceled }
//! ```
//!
//! Terminal states are one-shot. Once a confirmation has resolved, it cannot be re-entered for the same intent; a
//! retry after `Failed` or `Canceled` requires a brand-new intent. Only `Completed` may trigger order registration.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfirmationError {
    #[error("The payment sheet has already been presented for this intent")]
    AlreadyPresented,
    #[error("The payment sheet has not been presented yet")]
    NotPresented,
    #[error("The confirmation has already reached a terminal state ({0})")]
    AlreadyTerminal(ConfirmationState),
}

/// The outcome reported by the processor's payment sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome", content = "reason")]
pub enum ConfirmationOutcome {
    Completed,
    Failed(String),
    Canceled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfirmationState {
    NotStarted,
    SheetPresented,
    Completed,
    Failed(String),
    Canceled,
}

impl ConfirmationState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ConfirmationState::Completed | ConfirmationState::Failed(_) | ConfirmationState::Canceled)
    }
}

impl Display for ConfirmationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfirmationState::NotStarted => write!(f, "NotStarted"),
            ConfirmationState::SheetPresented => write!(f, "SheetPresented"),
            ConfirmationState::Completed => write!(f, "Completed"),
            ConfirmationState::Failed(reason) => write!(f, "Failed: {reason}"),
            ConfirmationState::Canceled => write!(f, "Canceled"),
        }
    }
}

/// Tracks a single intent's confirmation from sheet presentation to its terminal outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentConfirmation {
    intent_id: i64,
    state: ConfirmationState,
}

impl PaymentConfirmation {
    pub fn new(intent_id: i64) -> Self {
        Self { intent_id, state: ConfirmationState::NotStarted }
    }

    pub fn intent_id(&self) -> i64 {
        self.intent_id
    }

    pub fn state(&self) -> &ConfirmationState {
        &self.state
    }

    /// Mark the payment sheet as presented to the buyer.
    pub fn present_sheet(&mut self) -> Result<(), ConfirmationError> {
        match &self.state {
            ConfirmationState::NotStarted => {
                self.state = ConfirmationState::SheetPresented;
                Ok(())
            },
            ConfirmationState::SheetPresented => Err(ConfirmationError::AlreadyPresented),
            s => Err(ConfirmationError::AlreadyTerminal(s.clone())),
        }
    }

    /// Resolve the presented sheet with the processor's outcome, moving the confirmation into its terminal state.
    pub fn resolve(&mut self, outcome: ConfirmationOutcome) -> Result<&ConfirmationState, ConfirmationError> {
        match &self.state {
            ConfirmationState::SheetPresented => {
                self.state = match outcome {
                    ConfirmationOutcome::Completed => ConfirmationState::Completed,
                    ConfirmationOutcome::Failed(reason) => ConfirmationState::Failed(reason),
                    ConfirmationOutcome::Canceled => ConfirmationState::Canceled,
                };
                Ok(&self.state)
            },
            ConfirmationState::NotStarted => Err(ConfirmationError::NotPresented),
            s => Err(ConfirmationError::AlreadyTerminal(s.clone())),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn happy_path_reaches_completed() {
        let mut confirmation = PaymentConfirmation::new(1);
        assert_eq!(*confirmation.state(), ConfirmationState::NotStarted);
        confirmation.present_sheet().unwrap();
        assert_eq!(*confirmation.state(), ConfirmationState::SheetPresented);
        let state = confirmation.resolve(ConfirmationOutcome::Completed).unwrap();
        assert_eq!(*state, ConfirmationState::Completed);
        assert!(confirmation.state().is_terminal());
    }

    #[test]
    fn resolving_before_presenting_is_an_error() {
        let mut confirmation = PaymentConfirmation::new(1);
        let err = confirmation.resolve(ConfirmationOutcome::Canceled).unwrap_err();
        assert_eq!(err, ConfirmationError::NotPresented);
        assert_eq!(*confirmation.state(), ConfirmationState::NotStarted);
    }

    #[test]
    fn terminal_states_are_one_shot() {
        let mut confirmation = PaymentConfirmation::new(7);
        confirmation.present_sheet().unwrap();
        confirmation.resolve(ConfirmationOutcome::Failed("card declined".to_string())).unwrap();
        let err = confirmation.resolve(ConfirmationOutcome::Completed).unwrap_err();
        assert_eq!(err, ConfirmationError::AlreadyTerminal(ConfirmationState::Failed("card declined".to_string())));
        let err = confirmation.present_sheet().unwrap_err();
        assert!(matches!(err, ConfirmationError::AlreadyTerminal(_)));
    }

    #[test]
    fn presenting_twice_is_an_error() {
        let mut confirmation = PaymentConfirmation::new(3);
        confirmation.present_sheet().unwrap();
        assert_eq!(confirmation.present_sheet().unwrap_err(), ConfirmationError::AlreadyPresented);
    }
}
