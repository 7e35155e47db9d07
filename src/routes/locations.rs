use axum::{
    Json,
    extract::{Query, State},
};

use crate::{
    AppState,
    error::Result,
    models::{Area, AreaQuery, District},
    queries::location_queries,
};

pub async fn list_districts(State(state): State<AppState>) -> Result<Json<Vec<District>>> {
    let districts = location_queries::list_districts(&state.db).await?;

    Ok(Json(districts))
}

pub async fn list_areas(
    State(state): State<AppState>,
    Query(params): Query<AreaQuery>,
) -> Result<Json<Vec<Area>>> {
    let areas = location_queries::list_areas(&state.db, params.district_id).await?;

    Ok(Json(areas))
}
