//! Interface contracts of the engine's collaborators.
//!
//! * [`MarketplaceDatabase`] defines the write-side behaviour a storage backend must expose: order registration,
//!   the earnings credit transaction, payment intent bookkeeping, tracking updates and profile saves.
//! * [`CatalogManagement`] provides the read-side queries for sellers, products, orders and profiles.
//! * [`PaymentProcessor`] is the boundary to the payment processor's create-intent endpoint.
//! * [`MediaFetcher`] is the best-effort image loader; failures degrade to a placeholder and never propagate.

mod catalog_management;
mod marketplace_database;
mod media_fetcher;
mod payment_processor;

pub use catalog_management::CatalogManagement;
pub use marketplace_database::{MarketDbError, MarketplaceDatabase};
pub use media_fetcher::{MediaFetcher, NoMedia};
pub use payment_processor::{ClientSecret, PaymentIntentRequest, PaymentProcessor, ProcessorError};
