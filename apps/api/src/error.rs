//! # API Errors
//!
//! Every failure leaves the server as the same JSON envelope:
//!
//! ```json
//! { "code": "STOCK_UNAVAILABLE", "message": "...", "details": [ ... ] }
//! ```
//!
//! ## Status Mapping
//! ```text
//! SaleError::ValidationFailed            → 422
//! SaleError::StoreNotFound               → 404
//! SaleError::ProductNotFoundInStore      → 404
//! SaleError::StockUnavailable            → 422 (details: one entry per short line)
//! SaleError::InvoiceAllocationExhausted  → 500
//! SaleError::Unexpected                  → 500 (generic message)
//! Malformed JSON body                    → 422
//! Missing / invalid bearer token         → 401
//! ```

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::error;

use bazaar_db::DbError;
use bazaar_sales::SaleError;

const GENERIC_MESSAGE: &str = "An internal error occurred";

/// Error response for HTTP handlers.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    details: Option<Value>,
}

#[derive(Serialize)]
struct Envelope<'a> {
    code: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        ApiError {
            status,
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    pub fn not_found(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, code, message)
    }

    /// 500 with a generic message. `detail` is logged, never sent.
    pub fn internal(detail: impl Into<String>) -> Self {
        error!(detail = %detail.into(), "Internal error");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", GENERIC_MESSAGE)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &'static str {
        self.code
    }
}

impl From<SaleError> for ApiError {
    fn from(err: SaleError) -> Self {
        let code = err.kind();
        match err {
            SaleError::ValidationFailed(e) => {
                Self::new(StatusCode::UNPROCESSABLE_ENTITY, code, e.to_string())
            }
            SaleError::StoreNotFound { .. } | SaleError::ProductNotFoundInStore { .. } => {
                Self::new(StatusCode::NOT_FOUND, code, err.to_string())
            }
            SaleError::StockUnavailable(ref shortages) => {
                let details: Vec<Value> = shortages
                    .iter()
                    .map(|s| {
                        json!({
                            "unit_id": s.unit_id,
                            "name": s.name,
                            "requested": s.requested,
                            "available": s.available,
                        })
                    })
                    .collect();
                Self::new(StatusCode::UNPROCESSABLE_ENTITY, code, err.to_string())
                    .with_details(Value::Array(details))
            }
            SaleError::InvoiceAllocationExhausted { .. } => {
                error!(error = %err, "Invoice allocation exhausted");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, code, err.to_string())
            }
            SaleError::Unexpected(_) => {
                // Already logged by the engine
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, code, GENERIC_MESSAGE)
            }
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        Self::internal(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "VALIDATION_FAILED",
            rejection.body_text(),
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Envelope {
            code: self.code,
            message: &self.message,
            details: self.details.as_ref(),
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bazaar_core::{StockShortage, ValidationError};

    #[test]
    fn test_sale_error_status_mapping() {
        let cases = [
            (
                SaleError::ValidationFailed(ValidationError::required("items")),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                SaleError::StoreNotFound {
                    store_id: "s".into(),
                },
                StatusCode::NOT_FOUND,
            ),
            (
                SaleError::ProductNotFoundInStore {
                    unit_id: "u".into(),
                    store_id: "s".into(),
                },
                StatusCode::NOT_FOUND,
            ),
            (
                SaleError::InvoiceAllocationExhausted { attempts: 5 },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                SaleError::Unexpected("disk full".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            let code = err.kind();
            let api: ApiError = err.into();
            assert_eq!(api.status(), status);
            assert_eq!(api.code(), code);
        }
    }

    #[test]
    fn test_unexpected_hides_internals() {
        let api: ApiError = SaleError::Unexpected("database is locked".into()).into();
        assert_eq!(api.message, GENERIC_MESSAGE);
        assert!(api.details.is_none());
    }

    #[test]
    fn test_stock_details() {
        let api: ApiError = SaleError::StockUnavailable(vec![StockShortage {
            unit_id: "u-b".into(),
            name: "Product B".into(),
            requested: 1,
            available: 0,
        }])
        .into();

        assert_eq!(api.code(), "STOCK_UNAVAILABLE");
        assert_eq!(
            api.message,
            "Insufficient stock for Product B: available 0, requested 1"
        );
        let details = api.details.unwrap();
        assert_eq!(details[0]["unit_id"], "u-b");
        assert_eq!(details[0]["available"], 0);
    }
}
