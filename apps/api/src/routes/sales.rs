//! `/api/v1/sales`

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::debug;

use bazaar_core::{CartRequest, SaleReceipt};

use crate::auth::Authenticated;
use crate::error::ApiError;
use crate::state::AppState;

/// `POST /api/v1/sales`
pub async fn create_sale(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    payload: Result<Json<CartRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SaleReceipt>), ApiError> {
    let Json(cart) = payload?;
    let receipt = state.engine.create_sale(&cart, &user).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

/// `GET /api/v1/sales/{id}`
///
/// Sales of other stores look missing unless the caller is an admin.
pub async fn get_sale(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Path(id): Path<String>,
) -> Result<Json<SaleReceipt>, ApiError> {
    let receipt = state
        .db
        .sales()
        .get_receipt(&id)
        .await?
        .filter(|r| {
            user.role.can_override_store()
                || user.store_id.as_deref() == Some(r.sale.store_id.as_str())
        });

    match receipt {
        Some(receipt) => Ok(Json(receipt)),
        None => {
            debug!(sale_id = %id, user_id = %user.user_id, "Sale not visible to caller");
            Err(ApiError::not_found(
                "SALE_NOT_FOUND",
                format!("Sale not found: {id}"),
            ))
        }
    }
}
