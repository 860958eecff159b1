use actix_web::{dev::Server, middleware::Logger, web, App, HttpServer};
use log::*;
use market_engine::{
    events::{EventHandlers, EventHooks, EventProducers},
    CatalogApi,
    CheckoutApi,
    ProfileApi,
    ShippingApi,
    SqliteDatabase,
};
use stripe_tools::StripeFunctionsApi;

use crate::{
    config::ServerConfig,
    errors::ServerError,
    expiry_worker::start_expiry_worker,
    integrations::stripe::StripeProcessor,
    media::HttpMediaFetcher,
    routes::{api_scope, health},
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.migrate().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;

    let mut hooks = EventHooks::default();
    hooks.on_order_placed(|ev| {
        Box::pin(async move {
            info!(
                "🛒️ Order {} placed with {} for {}. Seller earnings now {}",
                ev.order.id, ev.order.seller_name, ev.order.total_amount, ev.seller_earnings
            );
        })
    });
    hooks.on_order_shipped(|ev| {
        Box::pin(async move {
            info!("📦️ Order {} shipped via {} ({})", ev.order.id, ev.tracking.carrier, ev.tracking.tracking_number);
        })
    });
    let handlers = EventHandlers::new(100, hooks);
    let producers = handlers.producers();
    handlers.start_handlers().await;

    start_expiry_worker(db.clone(), config.intent_timeout);
    let srv = create_server_instance(config, db, producers)?;
    srv.await.map_err(|e| ServerError::BackendError(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let host = config.host.clone();
    let port = config.port;
    let stripe_api =
        StripeFunctionsApi::new(config.stripe_config.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let srv = HttpServer::new(move || {
        let checkout = CheckoutApi::new(db.clone(), StripeProcessor::new(stripe_api.clone()), producers.clone());
        let catalog = CatalogApi::new(db.clone());
        let profiles = ProfileApi::new(db.clone());
        let shipping = ShippingApi::new(db.clone(), producers.clone());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("mps::access_log"))
            .app_data(web::Data::new(checkout))
            .app_data(web::Data::new(catalog))
            .app_data(web::Data::new(profiles))
            .app_data(web::Data::new(shipping))
            .app_data(web::Data::new(stripe_api.clone()))
            .app_data(web::Data::new(HttpMediaFetcher::new()))
            .service(health)
            .service(api_scope())
    })
    .bind((host.as_str(), port))?
    .run();
    info!("🚀️ Server started on {host}:{port}");
    Ok(srv)
}
