//! Request handler definitions.
//!
//! Define each route and its handler here. Handlers that are more than a line or two go into the API layer in
//! `market_engine`; these functions only translate between HTTP and the engine.
//!
//! Callers are assumed to present verified identities; buyer and seller ids arrive as opaque strings in paths,
//! queries and bodies. Authentication policy lives outside this service.

use actix_web::{get, post, put, web, HttpResponse, Responder};
use log::*;
use market_engine::{
    checkout::ConfirmationOutcome,
    db_types::{BuyerProfile, Carrier, Money, OrderId, Product, SellerProfile, TrackingInfo},
    CatalogApi,
    CheckoutApi,
    ProfileApi,
    ShippingApi,
    SqliteDatabase,
};
use stripe_tools::StripeFunctionsApi;

use crate::{
    data_objects::{
        AccountLinkParams,
        CreateIntentParams,
        NewAccountParams,
        OrdersQuery,
        RegisterOrderParams,
        TrackingParams,
    },
    errors::ServerError,
    integrations::stripe::StripeProcessor,
    media::HttpMediaFetcher,
};

pub type Checkout = CheckoutApi<SqliteDatabase, StripeProcessor>;
pub type Catalog = CatalogApi<SqliteDatabase>;
pub type Profiles = ProfileApi<SqliteDatabase>;
pub type Shipping = ShippingApi<SqliteDatabase>;

/// The `/api` scope with every marketplace route registered. Shared between the server and the endpoint tests.
pub fn api_scope() -> actix_web::Scope {
    web::scope("/api")
        .service(create_intent)
        .service(register_order)
        .service(orders)
        .service(order_by_id)
        .service(set_tracking)
        .service(get_tracking)
        .service(seller_feed)
        .service(seller_products)
        .service(add_product)
        .service(seller_profile)
        .service(save_seller_profile)
        .service(buyer_profile)
        .service(save_buyer_profile)
        .service(create_payment_account)
        .service(create_account_link)
}

#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().body("👍️\n")
}

/// Create a payment intent for the cart total, destined for the seller's sub-account.
#[post("/checkout/intent")]
pub async fn create_intent(
    api: web::Data<Checkout>,
    body: web::Json<CreateIntentParams>,
) -> Result<HttpResponse, ServerError> {
    let params = body.into_inner();
    let prepared = api
        .create_payment_intent(Money::from_cents(params.amount), &params.seller_id, &params.shipping_address)
        .await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "intent_id": prepared.intent_id,
        "client_secret": prepared.client_secret.as_str(),
    })))
}

/// Register the outcome of a payment confirmation. Only `completed` creates anything; `canceled` is a silent
/// no-op and `failed` echoes the reason back with a payment-required status.
#[post("/orders")]
pub async fn register_order(
    api: web::Data<Checkout>,
    body: web::Json<RegisterOrderParams>,
) -> Result<HttpResponse, ServerError> {
    let params = body.into_inner();
    match params.outcome {
        ConfirmationOutcome::Completed => {
            let order = api.register_paid_order(params.intent_id, params.order).await?;
            Ok(HttpResponse::Created().json(order))
        },
        ConfirmationOutcome::Canceled => {
            debug!("🛒️ Checkout canceled by the buyer. Nothing registered");
            Ok(HttpResponse::NoContent().finish())
        },
        ConfirmationOutcome::Failed(reason) => Err(ServerError::PaymentFailed(reason)),
    }
}

#[get("/orders")]
pub async fn orders(api: web::Data<Catalog>, query: web::Query<OrdersQuery>) -> Result<HttpResponse, ServerError> {
    let query = query.into_inner();
    let orders = match (query.buyer_id, query.seller_id) {
        (Some(buyer_id), None) => api.orders_for_buyer(&buyer_id).await?,
        (None, Some(seller_id)) => api.orders_for_seller(&seller_id).await?,
        _ => {
            return Err(ServerError::InvalidRequestBody(
                "Provide exactly one of buyer_id or seller_id".to_string(),
            ))
        },
    };
    Ok(HttpResponse::Ok().json(orders))
}

#[get("/orders/{id}")]
pub async fn order_by_id(api: web::Data<Catalog>, path: web::Path<i64>) -> Result<HttpResponse, ServerError> {
    let order_id = OrderId(path.into_inner());
    let order = api
        .order(order_id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("Order {order_id} does not exist")))?;
    Ok(HttpResponse::Ok().json(order))
}

/// Attach carrier and tracking number to an order. Last write wins.
#[put("/orders/{id}/tracking")]
pub async fn set_tracking(
    api: web::Data<Shipping>,
    path: web::Path<i64>,
    body: web::Json<TrackingParams>,
) -> Result<HttpResponse, ServerError> {
    let params = body.into_inner();
    let tracking = TrackingInfo {
        tracking_number: params.tracking_number,
        carrier: Carrier::from(params.carrier_code.as_str()),
    };
    let order = api.set_tracking(OrderId(path.into_inner()), tracking).await?;
    Ok(HttpResponse::Ok().json(order))
}

/// The recorded tracking details. A `null` tracking field means the order is still waiting to be shipped.
#[get("/orders/{id}/tracking")]
pub async fn get_tracking(api: web::Data<Shipping>, path: web::Path<i64>) -> Result<HttpResponse, ServerError> {
    let tracking = api.tracking_for_order(OrderId(path.into_inner())).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "tracking": tracking })))
}

/// The storefront feed: every seller with its top products and best-effort images.
#[get("/sellers")]
pub async fn seller_feed(
    api: web::Data<Catalog>,
    media: web::Data<HttpMediaFetcher>,
) -> Result<HttpResponse, ServerError> {
    let sellers = api.seller_feed(media.get_ref()).await?;
    Ok(HttpResponse::Ok().json(sellers))
}

#[get("/sellers/{id}/products")]
pub async fn seller_products(api: web::Data<Catalog>, path: web::Path<String>) -> Result<HttpResponse, ServerError> {
    let products = api.products_for_seller(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(products))
}

#[post("/sellers/{id}/products")]
pub async fn add_product(
    api: web::Data<Profiles>,
    path: web::Path<String>,
    body: web::Json<Product>,
) -> Result<HttpResponse, ServerError> {
    let product = body.into_inner();
    api.add_product(&path.into_inner(), &product).await?;
    Ok(HttpResponse::Created().json(product))
}

#[get("/sellers/{id}/profile")]
pub async fn seller_profile(api: web::Data<Profiles>, path: web::Path<String>) -> Result<HttpResponse, ServerError> {
    let seller_id = path.into_inner();
    let profile = api
        .seller_profile(&seller_id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("Seller {seller_id} does not exist")))?;
    Ok(HttpResponse::Ok().json(profile))
}

#[put("/sellers/{id}/profile")]
pub async fn save_seller_profile(
    api: web::Data<Profiles>,
    path: web::Path<String>,
    body: web::Json<SellerProfile>,
) -> Result<HttpResponse, ServerError> {
    api.save_seller_profile(&path.into_inner(), &body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(crate::data_objects::JsonResponse::success("Profile saved")))
}

#[get("/buyers/{id}/profile")]
pub async fn buyer_profile(api: web::Data<Profiles>, path: web::Path<String>) -> Result<HttpResponse, ServerError> {
    let buyer_id = path.into_inner();
    let profile = api
        .buyer_profile(&buyer_id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("Buyer {buyer_id} does not exist")))?;
    Ok(HttpResponse::Ok().json(profile))
}

#[put("/buyers/{id}/profile")]
pub async fn save_buyer_profile(
    api: web::Data<Profiles>,
    path: web::Path<String>,
    body: web::Json<BuyerProfile>,
) -> Result<HttpResponse, ServerError> {
    api.save_buyer_profile(&path.into_inner(), &body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(crate::data_objects::JsonResponse::success("Profile saved")))
}

/// Create a processor sub-account for the seller and link it to the catalog record.
#[post("/onboarding/account")]
pub async fn create_payment_account(
    stripe: web::Data<StripeFunctionsApi>,
    profiles: web::Data<Profiles>,
    body: web::Json<NewAccountParams>,
) -> Result<HttpResponse, ServerError> {
    let params = body.into_inner();
    let account = stripe.create_stripe_account(&params.email).await?;
    profiles.link_payment_account(&params.seller_id, &account.account_id).await?;
    Ok(HttpResponse::Ok().json(account))
}

/// Produce a hosted onboarding URL for a sub-account, to open in an embedded browser.
#[post("/onboarding/link")]
pub async fn create_account_link(
    stripe: web::Data<StripeFunctionsApi>,
    body: web::Json<AccountLinkParams>,
) -> Result<HttpResponse, ServerError> {
    let link = stripe.create_account_link(&body.into_inner().account_id).await?;
    Ok(HttpResponse::Ok().json(link))
}
