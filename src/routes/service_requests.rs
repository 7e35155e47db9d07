use axum::{
    Extension, Json,
    extract::{Path, State},
};
use http::StatusCode;

use crate::{
    AppState,
    error::{AppError, Result},
    models::{
        CreateServiceRequestRequest, ServiceRequest, ServiceRequestListing,
        UpdateServiceRequestRequest, UserRole,
    },
    queries::service_queries,
    utils::extractors::extract_user_id,
    utils::jwt::Claims,
};

pub async fn list_service_requests(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<ServiceRequestListing>>> {
    let customer_id = if claims.role == UserRole::Customer {
        Some(extract_user_id(&claims)?)
    } else {
        None
    };

    let requests = service_queries::list_requests(&state.db, customer_id).await?;

    Ok(Json(requests))
}

pub async fn create_service_request(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateServiceRequestRequest>,
) -> Result<(StatusCode, Json<ServiceRequest>)> {
    if payload.description.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Sorun açıklaması boş olamaz".to_string(),
        ));
    }

    let customer_id = extract_user_id(&claims)?;
    let request = service_queries::create_with_queue(&state.db, customer_id, &payload).await?;

    tracing::info!(
        "Service request {} filed for ownership {}",
        request.id,
        request.ownership_id
    );

    Ok((StatusCode::CREATED, Json(request)))
}

pub async fn update_service_request(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateServiceRequestRequest>,
) -> Result<Json<ServiceRequest>> {
    let request = service_queries::update_request(&state.db, id, &payload).await?;

    Ok(Json(request))
}
