use axum::{
    Extension, Json,
    extract::State,
};
use http::StatusCode;

use crate::{
    AppState,
    error::{AppError, Result},
    models::{CreateOwnershipRequest, OwnershipResponse, ProductOwnership},
    queries::{ownership_queries, product_queries, user_queries},
    utils::extractors::extract_user_id,
    utils::jwt::Claims,
};

pub async fn my_ownerships(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<OwnershipResponse>>> {
    let customer_id = extract_user_id(&claims)?;
    let listings = ownership_queries::ownerships_for_customer(&state.db, customer_id).await?;

    let today = chrono::Utc::now().date_naive();
    let ownerships = listings
        .into_iter()
        .map(|listing| OwnershipResponse::from_listing(listing, today))
        .collect();

    Ok(Json(ownerships))
}

/// Direct admin assignment of a serialized unit, bypassing the delivery
/// pipeline.
pub async fn create_ownership(
    State(state): State<AppState>,
    Json(payload): Json<CreateOwnershipRequest>,
) -> Result<(StatusCode, Json<ProductOwnership>)> {
    if user_queries::find_customer_summary(&state.db, payload.customer_id)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound("Müşteri bulunamadı".to_string()));
    }

    if product_queries::find_by_id(&state.db, payload.product_id)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound("Ürün bulunamadı".to_string()));
    }

    if let Some(ref serial) = payload.serial_number {
        if ownership_queries::serial_exists(&state.db, serial).await? {
            return Err(AppError::Conflict(
                "Bu seri numarası zaten kayıtlı".to_string(),
            ));
        }
    }

    let ownership = ownership_queries::create_ownership(&state.db, &payload).await?;

    Ok((StatusCode::CREATED, Json(ownership)))
}
