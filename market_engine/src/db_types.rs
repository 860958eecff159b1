//! Data types shared between the database layer and the public API.

use std::{
    fmt::Display,
    hash::{Hash, Hasher},
    str::FromStr,
};

use chrono::{DateTime, Utc};
use log::error;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

pub use mpg_common::Money;

//--------------------------------------      OrderId        ---------------------------------------------------------
/// Store-assigned order identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct OrderId(pub i64);

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<i64> for OrderId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl FromStr for OrderId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim_start_matches('#').parse::<i64>().map(Self)
    }
}

//--------------------------------------      Product        ---------------------------------------------------------
/// A catalog product. Equality and hashing are by `id` alone, so two `Product` values with the same id are
/// interchangeable as cart keys even if other fields differ.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: Money,
    pub image_url: String,
    /// Only meaningful inside an order line item.
    #[sqlx(default)]
    pub quantity: Option<i64>,
    /// Cached image bytes, populated by a best-effort media fetch. Never persisted.
    #[sqlx(skip)]
    #[serde(skip)]
    pub image: Option<Vec<u8>>,
}

impl Product {
    pub fn new<S: Into<String>>(id: S, name: S, price: Money) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            price,
            image_url: String::new(),
            quantity: None,
            image: None,
        }
    }
}

impl PartialEq for Product {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Product {}

impl Hash for Product {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

//--------------------------------------     OrderItem       ---------------------------------------------------------
/// A purchased product line inside an order, carrying the quantity bought and the unit price at purchase time.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: String,
    pub name: String,
    pub price: Money,
    pub quantity: i64,
    pub image_url: String,
}

impl OrderItem {
    pub fn line_total(&self) -> Money {
        self.price * self.quantity
    }
}

//--------------------------------------      NewOrder       ---------------------------------------------------------
/// An order as submitted for registration. The store assigns the id and creation timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub buyer_id: String,
    pub seller_id: String,
    pub seller_name: String,
    pub items: Vec<OrderItem>,
    pub total_amount: Money,
    pub shipping_address: String,
}

impl NewOrder {
    pub fn new<S: Into<String>>(
        buyer_id: S,
        seller_id: S,
        seller_name: S,
        items: Vec<OrderItem>,
        shipping_address: S,
    ) -> Self {
        let total_amount = items.iter().map(OrderItem::line_total).sum();
        Self {
            buyer_id: buyer_id.into(),
            seller_id: seller_id.into(),
            seller_name: seller_name.into(),
            items,
            total_amount,
            shipping_address: shipping_address.into(),
        }
    }
}

//--------------------------------------       Order         ---------------------------------------------------------
/// A durably recorded purchase. Immutable except for the tracking fields, which the seller may overwrite.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub buyer_id: String,
    pub seller_id: String,
    pub seller_name: String,
    pub total_amount: Money,
    pub shipping_address: String,
    pub tracking_number: Option<String>,
    pub carrier_code: Option<String>,
    pub created_at: DateTime<Utc>,
    #[sqlx(skip)]
    pub items: Vec<OrderItem>,
}

impl Order {
    /// The recorded shipment tracking details, if the seller has attached any.
    pub fn tracking(&self) -> Option<TrackingInfo> {
        match (&self.tracking_number, &self.carrier_code) {
            (Some(number), Some(code)) => {
                Some(TrackingInfo { tracking_number: number.clone(), carrier: Carrier::from(code.as_str()) })
            },
            _ => None,
        }
    }
}

//--------------------------------------      Carrier        ---------------------------------------------------------
/// Shipping carrier. The known set is small, but unknown codes are carried through verbatim rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Carrier {
    Ups,
    Usps,
    FedEx,
    Dhl,
    Other(String),
}

impl Carrier {
    pub fn code(&self) -> &str {
        match self {
            Carrier::Ups => "UPS",
            Carrier::Usps => "USPS",
            Carrier::FedEx => "FedEx",
            Carrier::Dhl => "DHL",
            Carrier::Other(code) => code.as_str(),
        }
    }
}

impl Display for Carrier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl From<&str> for Carrier {
    fn from(value: &str) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "UPS" => Carrier::Ups,
            "USPS" => Carrier::Usps,
            "FEDEX" => Carrier::FedEx,
            "DHL" => Carrier::Dhl,
            _ => Carrier::Other(value.to_string()),
        }
    }
}

impl From<String> for Carrier {
    fn from(value: String) -> Self {
        Carrier::from(value.as_str())
    }
}

impl From<Carrier> for String {
    fn from(value: Carrier) -> Self {
        value.code().to_string()
    }
}

//--------------------------------------    TrackingInfo     ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingInfo {
    pub tracking_number: String,
    pub carrier: Carrier,
}

//--------------------------------------       Seller        ---------------------------------------------------------
/// A seller catalog record. `earnings` is cumulative and monotonically non-decreasing; it is only ever written by the
/// earnings credit transaction.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Seller {
    pub id: String,
    pub name: String,
    pub description: String,
    pub location: String,
    pub image_url: String,
    pub email: String,
    pub rating: Option<f64>,
    pub stripe_account_id: Option<String>,
    pub earnings: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[sqlx(skip)]
    pub products: Vec<Product>,
    #[sqlx(skip)]
    #[serde(skip)]
    pub image: Option<Vec<u8>>,
}

//--------------------------------------    SellerProfile    ---------------------------------------------------------
/// Self-service seller metadata. The `earnings` field is a read-only mirror of the catalog record; profile saves
/// never write it.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct SellerProfile {
    pub name: String,
    pub description: String,
    pub location: String,
    pub image_url: String,
    pub email: String,
    #[sqlx(default)]
    #[serde(default)]
    pub earnings: Money,
}

//--------------------------------------    BuyerProfile     ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct BuyerProfile {
    pub name: String,
    pub email: String,
}

//-------------------------------------- PaymentIntentStatus ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum PaymentIntentStatus {
    /// The intent has been issued but the client has not confirmed it.
    Created,
    /// The client confirmed the payment and the order was registered.
    Confirmed,
    /// The intent was never confirmed and has been swept by the expiry worker.
    Expired,
}

impl Display for PaymentIntentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentIntentStatus::Created => write!(f, "Created"),
            PaymentIntentStatus::Confirmed => write!(f, "Confirmed"),
            PaymentIntentStatus::Expired => write!(f, "Expired"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid payment intent status: {0}")]
pub struct IntentStatusConversionError(String);

impl FromStr for PaymentIntentStatus {
    type Err = IntentStatusConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Created" => Ok(Self::Created),
            "Confirmed" => Ok(Self::Confirmed),
            "Expired" => Ok(Self::Expired),
            s => Err(IntentStatusConversionError(s.to_string())),
        }
    }
}

impl From<String> for PaymentIntentStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid payment intent status: {value}. But this conversion cannot fail. Defaulting to Created");
            PaymentIntentStatus::Created
        })
    }
}

//--------------------------------------   PaymentIntent     ---------------------------------------------------------
/// The store-side record of a processor payment intent, kept so that abandoned intents can be swept.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: i64,
    pub seller_id: String,
    pub amount: Money,
    pub status: PaymentIntentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
