use axum::{
    Json,
    extract::{Path, Query, State},
};
use http::StatusCode;

use crate::{
    AppState,
    error::{AppError, Result},
    models::{
        CreateDeliveryRequest, Delivery, DeliveryListing, DeliveryQuery, DeliveryStats,
        DeliveryStatsQuery, UpdateDeliveryRequest,
    },
    queries::delivery_queries,
};

pub async fn list_deliveries(
    State(state): State<AppState>,
    Query(params): Query<DeliveryQuery>,
) -> Result<Json<Vec<DeliveryListing>>> {
    let deliveries =
        delivery_queries::list_deliveries(&state.db, params.date, params.status).await?;

    Ok(Json(deliveries))
}

pub async fn get_delivery(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Delivery>> {
    let delivery = delivery_queries::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Teslimat bulunamadı".to_string()))?;

    Ok(Json(delivery))
}

pub async fn create_delivery(
    State(state): State<AppState>,
    Json(payload): Json<CreateDeliveryRequest>,
) -> Result<(StatusCode, Json<Delivery>)> {
    let delivery = delivery_queries::create_for_assignment(&state.db, &payload).await?;

    tracing::info!(
        "Delivery {} scheduled for assignment {} on {}",
        delivery.id,
        delivery.assignment_id,
        delivery.scheduled_date
    );

    Ok((StatusCode::CREATED, Json(delivery)))
}

pub async fn update_delivery(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateDeliveryRequest>,
) -> Result<Json<Delivery>> {
    let delivery = delivery_queries::update_delivery(&state.db, id, &payload).await?;

    Ok(Json(delivery))
}

pub async fn delete_delivery(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    delivery_queries::delete_delivery(&state.db, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn delivery_stats(
    State(state): State<AppState>,
    Query(params): Query<DeliveryStatsQuery>,
) -> Result<Json<DeliveryStats>> {
    let stats = delivery_queries::stats(&state.db, params.date, params.depot_id).await?;

    Ok(Json(stats))
}
