// ============================================================================
// HTTP API - actix-web surface over the order lifecycle manager
// ============================================================================
//
// Routes:
// - POST  /sales                 create an order (201)
// - GET   /sales/{id}            read an order
// - PATCH /sales/{id}            sparse update
// - POST  /sales/{id}/cancel     idempotent cancel (204)
// - POST  /delivery/calculate    delivery fee quote
// - GET   /health, /metrics
//
// Every error body is `{"detail": "..."}`.
//
// ============================================================================

mod error;
mod handlers;

use std::sync::Arc;

use actix_web::{web, App, HttpServer};

use crate::domain::delivery::DeliveryFeeSchedule;
use crate::domain::order::OrderCommandHandler;
use crate::metrics::{self, Metrics};

pub use error::ErrorBody;

pub struct AppState {
    pub orders: Arc<OrderCommandHandler>,
    pub delivery: DeliveryFeeSchedule,
}

/// Register every route. Expects `web::Data<AppState>` and
/// `web::Data<Arc<Metrics>>` in the app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
        .app_data(web::PathConfig::default().error_handler(error::path_error_handler))
        .route("/sales", web::post().to(handlers::create_sale))
        .route("/sales/{id}", web::get().to(handlers::get_sale))
        .route("/sales/{id}", web::patch().to(handlers::update_sale))
        .route("/sales/{id}/cancel", web::post().to(handlers::cancel_sale))
        .route("/delivery/calculate", web::post().to(handlers::calculate_delivery));
    metrics::configure(cfg);
}

/// Start the HTTP server and run until shutdown
pub async fn serve(state: AppState, metrics: Arc<Metrics>, bind: (String, u16)) -> std::io::Result<()> {
    tracing::info!("Starting HTTP server on http://{}:{}", bind.0, bind.1);

    let state = web::Data::new(state);
    let metrics = web::Data::new(metrics);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(metrics.clone())
            .configure(configure)
    })
    .bind(bind)?
    .run()
    .await
}
