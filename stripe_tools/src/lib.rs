//! Client for the first-party callable endpoints that front the payment processor.
//!
//! The marketplace never talks to the processor directly; a small set of deployed callable functions holds the
//! processor credentials and applies the platform fee. This crate wraps those functions:
//!
//! * `createPaymentIntent` — create an authorized-but-unconfirmed charge destined for a seller sub-account,
//!   returning the client secret used to confirm it.
//! * `createStripeAccount` — create a processor sub-account for a seller during onboarding.
//! * `createAccountLink` — produce a hosted onboarding URL for a sub-account.
//!
//! Each call crosses two independent failure points (the function endpoint, then the processor behind it), and the
//! error type keeps them apart: [`StripeApiError::Network`] is transient, [`StripeApiError::Rejected`] is a
//! processor-side refusal, and [`StripeApiError::MalformedResponse`] means the endpoint contract is broken.

mod api;
mod config;
mod data_objects;
mod error;
mod helpers;

pub use api::StripeFunctionsApi;
pub use config::StripeConfig;
pub use data_objects::{AccountLink, PaymentIntentParams, SubAccount};
pub use error::StripeApiError;
pub use helpers::platform_fee;
