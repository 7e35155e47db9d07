use axum::{Json, extract::State};

use crate::{
    AppState,
    error::{AppError, Result},
    models::{DepotSummary, OptimizeRouteRequest, OptimizeRouteResponse},
    queries::{delivery_queries, depot_queries},
    services::route_optimizer::{RouteOptimizer, Stop},
};

pub async fn optimize_route(
    State(state): State<AppState>,
    Json(payload): Json<OptimizeRouteRequest>,
) -> Result<Json<OptimizeRouteResponse>> {
    let depot = match payload.depot_id {
        Some(depot_id) => depot_queries::find_by_id(&state.db, depot_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Depo bulunamadı".to_string()))?,
        None => depot_queries::find_default(&state.db).await?.ok_or_else(|| {
            AppError::BadRequest("Varsayılan depo bulunamadı. Lütfen depo seçin.".to_string())
        })?,
    };

    let deliveries =
        delivery_queries::waiting_for_route(&state.db, payload.date, &payload.delivery_ids)
            .await?;

    if deliveries.is_empty() {
        return Err(AppError::BadRequest(
            "Optimize edilecek teslimat yok".to_string(),
        ));
    }

    let missing: Vec<String> = deliveries
        .iter()
        .filter(|d| d.lat.is_none() || d.lng.is_none())
        .map(|d| d.id.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(AppError::BadRequest(format!(
            "Bazı teslimatların koordinatı eksik: {}",
            missing.join(", ")
        )));
    }

    let stops: Vec<Stop> = deliveries
        .into_iter()
        .map(|d| Stop {
            id: d.id,
            lat: d.lat.unwrap_or_default(),
            lng: d.lng.unwrap_or_default(),
            customer_name: d.customer_name,
            product_name: d.product_name,
        })
        .collect();

    let optimizer = RouteOptimizer::new(depot.latitude, depot.longitude);
    let algorithm = payload.algorithm.as_deref().unwrap_or("nearest_neighbor");
    let route = optimizer.optimize(stops, algorithm)?;

    delivery_queries::apply_route(&state.db, &route.stops, &route.batch_id, depot.id).await?;

    tracing::info!(
        "Route {} optimized: {} stops, {:.2} km from depot {}",
        route.batch_id,
        route.stops.len(),
        route.total_km,
        depot.name
    );

    let delivery_count = route.stops.len();
    Ok(Json(OptimizeRouteResponse {
        success: true,
        batch_id: route.batch_id,
        total_km: route.total_km,
        algorithm: route.algorithm,
        depot: DepotSummary {
            id: depot.id,
            name: depot.name,
            lat: depot.latitude,
            lng: depot.longitude,
        },
        optimized_deliveries: route.stops,
        delivery_count,
    }))
}
