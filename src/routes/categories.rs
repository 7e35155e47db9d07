use axum::{
    Json,
    extract::{Path, State},
};
use http::StatusCode;

use crate::{
    AppState,
    error::{AppError, Result},
    models::{Category, CategoryWithCount, CreateCategoryRequest},
    queries::category_queries,
};

pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryWithCount>>> {
    let categories = category_queries::list_with_counts(&state.db).await?;

    Ok(Json(categories))
}

pub async fn create_category(
    State(state): State<AppState>,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<Json<Category>> {
    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("Kategori adı boş olamaz".to_string()));
    }

    if category_queries::find_by_name(&state.db, &payload.name)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(
            "Bu isimde bir kategori zaten mevcut".to_string(),
        ));
    }

    let category = category_queries::create_category(&state.db, &payload.name).await?;

    Ok(Json(category))
}

pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    if !category_queries::delete_category(&state.db, id).await? {
        return Err(AppError::NotFound("Kategori bulunamadı".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
