//! Marketplace Order & Settlement Engine
//!
//! This library contains the core logic for the marketplace's order lifecycle and payment settlement pipeline:
//! the shopping cart, payment intent bookkeeping, the payment confirmation flow, durable order registration and
//! the seller earnings credit. It is provider-agnostic.
//!
//! The library is divided into three main sections:
//! 1. Database management and control ([`mod@sqlite`]). SQLite is the supported backend. You should never need to
//!    access the database directly; use the public API instead. The exception is the data types, which are defined
//!    in the [`db_types`] module and are public.
//! 2. The public API ([`mod@api`]): [`CheckoutApi`] for the payment and registration flow, [`CatalogApi`] for the
//!    storefront feed and order queries, [`ProfileApi`] for self-service profiles and onboarding, and
//!    [`ShippingApi`] for shipment tracking. Backends implement the traits in [`mod@traits`] to sit behind these
//!    APIs.
//! 3. Client-side checkout pieces ([`mod@cart`], [`mod@checkout`]): the buyer-local cart and the one-shot payment
//!    confirmation state machine.
//!
//! The engine also emits events when orders are placed or shipped. Subscribe via [`events::EventHooks`] to run
//! custom async handlers without blocking the flows that produce the events.
mod api;

pub mod cart;
pub mod checkout;
pub mod db_types;
pub mod events;
mod sqlite;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use api::{CatalogApi, CheckoutApi, CheckoutError, PreparedPayment, ProfileApi, ShippingApi};
pub use sqlite::SqliteDatabase;
