use axum::{
    Json,
    extract::{Path, Query, State},
};
use http::StatusCode;

use crate::{
    AppState,
    error::{AppError, Result},
    models::{CreateProductRequest, ProductListing, ProductQuery, UpdateProductRequest},
    queries::product_queries,
};

pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ProductQuery>,
) -> Result<Json<Vec<ProductListing>>> {
    let products = product_queries::list_products(&state.db, &params).await?;

    Ok(Json(products))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ProductListing>> {
    let product = product_queries::find_listing_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Ürün bulunamadı".to_string()))?;

    Ok(Json(product))
}

pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<Json<ProductListing>> {
    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("Ürün adı boş olamaz".to_string()));
    }

    if payload.price.is_sign_negative() {
        return Err(AppError::BadRequest("Fiyat negatif olamaz".to_string()));
    }

    let product = product_queries::create_product(&state.db, &payload).await?;
    let listing = product_queries::find_listing_by_id(&state.db, product.id)
        .await?
        .ok_or_else(|| AppError::InternalError("Ürün oluşturulamadı".to_string()))?;

    Ok(Json(listing))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<Json<ProductListing>> {
    product_queries::update_product(&state.db, id, &payload)
        .await?
        .ok_or_else(|| AppError::NotFound("Ürün bulunamadı".to_string()))?;

    let listing = product_queries::find_listing_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Ürün bulunamadı".to_string()))?;

    Ok(Json(listing))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    if !product_queries::delete_product(&state.db, id).await? {
        return Err(AppError::NotFound("Ürün bulunamadı".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
