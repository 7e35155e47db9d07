use axum::{
    Extension, Json,
    extract::{Path, State},
};
use http::StatusCode;

use crate::{
    AppState,
    error::{AppError, Result},
    models::{CreateDepotRequest, DepotLocation, UpdateDepotRequest},
    queries::depot_queries,
    utils::extractors::extract_user_id,
    utils::jwt::Claims,
};

fn validate_coordinates(latitude: f64, longitude: f64) -> Result<()> {
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return Err(AppError::BadRequest("Geçersiz koordinatlar".to_string()));
    }
    Ok(())
}

pub async fn list_depots(State(state): State<AppState>) -> Result<Json<Vec<DepotLocation>>> {
    let depots = depot_queries::list_depots(&state.db).await?;

    Ok(Json(depots))
}

pub async fn get_depot(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<DepotLocation>> {
    let depot = depot_queries::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Depo bulunamadı".to_string()))?;

    Ok(Json(depot))
}

pub async fn create_depot(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateDepotRequest>,
) -> Result<(StatusCode, Json<DepotLocation>)> {
    validate_coordinates(payload.latitude, payload.longitude)?;

    if depot_queries::find_by_name(&state.db, &payload.name)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(
            "Bu isimde bir depo zaten mevcut".to_string(),
        ));
    }

    let depot =
        depot_queries::create_depot(&state.db, &payload, extract_user_id(&claims)?).await?;

    Ok((StatusCode::CREATED, Json(depot)))
}

pub async fn update_depot(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateDepotRequest>,
) -> Result<Json<DepotLocation>> {
    if let (Some(lat), Some(lng)) = (payload.latitude, payload.longitude) {
        validate_coordinates(lat, lng)?;
    }

    if let Some(ref name) = payload.name {
        if let Some(existing) = depot_queries::find_by_name(&state.db, name).await? {
            if existing.id != id {
                return Err(AppError::Conflict(
                    "Bu isimde bir depo zaten mevcut".to_string(),
                ));
            }
        }
    }

    let depot = depot_queries::update_depot(&state.db, id, &payload)
        .await?
        .ok_or_else(|| AppError::NotFound("Depo bulunamadı".to_string()))?;

    Ok(Json(depot))
}

pub async fn delete_depot(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    if !depot_queries::delete_depot(&state.db, id).await? {
        return Err(AppError::NotFound("Depo bulunamadı".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_default_depot(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<DepotLocation>> {
    let depot = depot_queries::set_default(&state.db, id).await?;

    Ok(Json(depot))
}

pub async fn get_default_depot(State(state): State<AppState>) -> Result<Json<DepotLocation>> {
    let depot = depot_queries::find_default(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Varsayılan depo bulunamadı".to_string()))?;

    Ok(Json(depot))
}
