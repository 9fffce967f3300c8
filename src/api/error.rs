use actix_web::http::StatusCode;
use actix_web::{error, HttpRequest, HttpResponse, ResponseError};
use serde::Serialize;

use crate::domain::order::OrderError;
use crate::store::StoreError;

/// Error body shared by every endpoint
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl ErrorBody {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

impl ResponseError for OrderError {
    fn status_code(&self) -> StatusCode {
        match self {
            OrderError::NotFound(_) => StatusCode::NOT_FOUND,
            OrderError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            OrderError::InvalidStatusTransition { .. } | OrderError::Conflict => StatusCode::CONFLICT,
            OrderError::Store(StoreError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            OrderError::Store(StoreError::Corrupt { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Store details stay in the logs
        let detail = match self {
            OrderError::NotFound(_) => "Order not found".to_string(),
            OrderError::Store(StoreError::Unavailable(_)) => "Order store unavailable".to_string(),
            OrderError::Store(StoreError::Corrupt { .. }) => "Internal server error".to_string(),
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(ErrorBody::new(detail))
    }
}

/// Malformed or mistyped JSON bodies are validation failures, not 400s
pub fn json_error_handler(err: error::JsonPayloadError, _req: &HttpRequest) -> error::Error {
    let response = HttpResponse::UnprocessableEntity().json(ErrorBody::new(err.to_string()));
    error::InternalError::from_response(err, response).into()
}

/// An id that is not a UUID cannot name an order
pub fn path_error_handler(err: error::PathError, _req: &HttpRequest) -> error::Error {
    let response = HttpResponse::NotFound().json(ErrorBody::new("Order not found"));
    error::InternalError::from_response(err, response).into()
}
