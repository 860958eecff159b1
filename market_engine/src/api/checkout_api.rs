use std::fmt::Debug;

use log::*;
use mpg_common::CURRENCY_CODE_LOWER;
use thiserror::Error;

use crate::{
    cart::Cart,
    checkout::{ConfirmationState, PaymentConfirmation},
    db_types::{Money, NewOrder, Order, OrderId},
    events::{EventProducers, OrderPlacedEvent},
    traits::{ClientSecret, MarketDbError, MarketplaceDatabase, PaymentIntentRequest, PaymentProcessor, ProcessorError},
};

#[derive(Debug, Clone, Error)]
pub enum CheckoutError {
    #[error("The cart is empty")]
    EmptyCart,
    #[error("Invalid payment amount: {0}")]
    InvalidAmount(Money),
    #[error("{0}")]
    Processor(#[from] ProcessorError),
    #[error("{0}")]
    Database(#[from] MarketDbError),
    #[error("Payment failed: {0}")]
    PaymentFailed(String),
    #[error("Payment confirmation has not reached a terminal state")]
    ConfirmationPending,
    /// The order exists but the seller's earnings were not credited. The caller must not retry the registration
    /// (that would duplicate the order); retry only the credit, or flag for reconciliation.
    #[error("Order {order_id} was created but the seller earnings update failed: {reason}")]
    EarningsUpdateFailed { order_id: OrderId, reason: String },
}

/// Everything the client needs to drive the processor's payment sheet for a freshly created intent.
#[derive(Debug, Clone)]
pub struct PreparedPayment {
    pub intent_id: i64,
    pub client_secret: ClientSecret,
    /// A confirmation tracker in the `NotStarted` state, ready to present.
    pub confirmation: PaymentConfirmation,
}

/// `CheckoutApi` drives a cart through payment intent creation, confirmation, order registration and the seller
/// earnings credit.
pub struct CheckoutApi<B, P> {
    db: B,
    processor: P,
    producers: EventProducers,
}

impl<B, P> Debug for CheckoutApi<B, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CheckoutApi")
    }
}

impl<B, P> CheckoutApi<B, P> {
    pub fn new(db: B, processor: P, producers: EventProducers) -> Self {
        Self { db, processor, producers }
    }
}

impl<B, P> CheckoutApi<B, P>
where
    B: MarketplaceDatabase,
    P: PaymentProcessor,
{
    /// Create a payment intent for `amount` destined for the given seller's sub-account.
    ///
    /// The seller must exist and must have completed payment onboarding. On success the intent is recorded in the
    /// store (for the expiry sweep) and the processor's client secret is returned alongside a fresh confirmation
    /// tracker.
    pub async fn create_payment_intent(
        &self,
        amount: Money,
        seller_id: &str,
        shipping_address: &str,
    ) -> Result<PreparedPayment, CheckoutError> {
        if amount.value() <= 0 {
            return Err(CheckoutError::InvalidAmount(amount));
        }
        let seller = self
            .db
            .fetch_seller(seller_id)
            .await?
            .ok_or_else(|| MarketDbError::SellerNotFound(seller_id.to_string()))?;
        let account = seller
            .stripe_account_id
            .ok_or_else(|| MarketDbError::SellerNotOnboarded(seller_id.to_string()))?;
        let intent_id = self.db.insert_payment_intent(seller_id, amount).await?;
        let request = PaymentIntentRequest {
            amount,
            currency: CURRENCY_CODE_LOWER.to_string(),
            on_behalf_of: account,
            shipping_address: shipping_address.to_string(),
        };
        let client_secret = self.processor.create_payment_intent(request).await?;
        debug!("💳️ Payment intent {intent_id} for {amount} created on behalf of seller {seller_id}");
        Ok(PreparedPayment { intent_id, client_secret, confirmation: PaymentConfirmation::new(intent_id) })
    }

    /// Settle a checkout whose confirmation has reached a terminal state.
    ///
    /// * `Completed` registers the order, credits the seller and clears the cart.
    /// * `Canceled` is a silent no-op; the cart is returned untouched and `None` is the result.
    /// * `Failed` surfaces the reason; the cart is untouched so the buyer can retry with a new intent.
    ///
    /// Calling this before the confirmation is terminal is an error, so registration can never fire speculatively.
    pub async fn settle(
        &self,
        confirmation: &PaymentConfirmation,
        cart: &mut Cart,
        buyer_id: &str,
        seller_id: &str,
        seller_name: &str,
        shipping_address: &str,
    ) -> Result<Option<Order>, CheckoutError> {
        match confirmation.state() {
            ConfirmationState::Completed => {
                if cart.is_empty() {
                    return Err(CheckoutError::EmptyCart);
                }
                let new_order = NewOrder::from_cart(buyer_id, seller_id, seller_name, cart, shipping_address);
                let order = self.register_paid_order(Some(confirmation.intent_id()), new_order).await?;
                cart.clear();
                Ok(Some(order))
            },
            ConfirmationState::Canceled => {
                debug!("💳️ Payment for intent {} canceled by the buyer. Cart untouched", confirmation.intent_id());
                Ok(None)
            },
            ConfirmationState::Failed(reason) => Err(CheckoutError::PaymentFailed(reason.clone())),
            _ => Err(CheckoutError::ConfirmationPending),
        }
    }

    /// Durably record a paid order and credit the seller, as a single logical unit.
    ///
    /// The order-create write happens before the earnings credit is attempted, so a half-failure always means
    /// "order exists, earnings lag", never the reverse. That half-failure is reported as
    /// [`CheckoutError::EarningsUpdateFailed`] and is distinguishable from "order never created".
    pub async fn register_paid_order(
        &self,
        intent_id: Option<i64>,
        new_order: NewOrder,
    ) -> Result<Order, CheckoutError> {
        if let Some(id) = intent_id {
            self.db.confirm_payment_intent(id).await?;
        }
        let seller_id = new_order.seller_id.clone();
        let amount = new_order.total_amount;
        let order = self.db.register_order(new_order).await?;
        let earnings = match self.db.credit_seller_earnings(&seller_id, amount).await {
            Ok(earnings) => earnings,
            Err(e) => {
                error!("🧾️ Order {} exists but the earnings credit for seller {seller_id} failed: {e}", order.id);
                return Err(CheckoutError::EarningsUpdateFailed { order_id: order.id, reason: e.to_string() });
            },
        };
        debug!("🧾️ Order {} registered. Seller {seller_id} credited {amount}; earnings now {earnings}", order.id);
        self.call_order_placed_hook(&order, earnings).await;
        Ok(order)
    }

    async fn call_order_placed_hook(&self, order: &Order, earnings: Money) {
        for emitter in &self.producers.order_placed_producer {
            trace!("🔄️📦️ Notifying order placed hook subscribers");
            let event = OrderPlacedEvent::new(order.clone(), earnings);
            emitter.publish_event(event).await;
        }
    }
}
