use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AppState;
use crate::domain::order::{CreateOrder, OrderError, UpdateOrder};

pub async fn create_sale(
    state: web::Data<AppState>,
    body: web::Json<CreateOrder>,
) -> Result<HttpResponse, OrderError> {
    let order = state.orders.create(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(order))
}

pub async fn get_sale(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, OrderError> {
    let order = state.orders.get(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(order))
}

pub async fn update_sale(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    body: web::Json<UpdateOrder>,
) -> Result<HttpResponse, OrderError> {
    let order = state.orders.update(id.into_inner(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(order))
}

pub async fn cancel_sale(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, OrderError> {
    state.orders.cancel(id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Item shape is not inspected; only the number of lines matters
#[derive(Debug, Deserialize)]
pub struct DeliveryQuoteRequest {
    #[serde(default)]
    pub postcode: Option<String>,
    pub items: Vec<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct DeliveryQuote {
    pub fee: rust_decimal::Decimal,
}

pub async fn calculate_delivery(
    state: web::Data<AppState>,
    body: web::Json<DeliveryQuoteRequest>,
) -> HttpResponse {
    let fee = state.delivery.quote(body.items.len());
    tracing::debug!(
        postcode = body.postcode.as_deref().unwrap_or(""),
        item_count = body.items.len(),
        fee = %fee,
        "Quoted delivery fee"
    );
    HttpResponse::Ok().json(DeliveryQuote { fee })
}
