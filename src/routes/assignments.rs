use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use http::StatusCode;

use crate::{
    AppState,
    error::{AppError, Result},
    models::{
        effective_status, AssignmentQuery, AssignmentResponse, AssignmentStats,
        CreateAssignmentRequest, ProductAssignment, UpdateAssignmentRequest, UserRole,
    },
    queries::{assignment_queries, product_queries, user_queries},
    utils::extractors::extract_user_id,
    utils::jwt::Claims,
};

/// Joins assignments with their customer, product, and delivery info in
/// three batched lookups.
async fn build_responses(
    state: &AppState,
    assignments: Vec<ProductAssignment>,
) -> Result<Vec<AssignmentResponse>> {
    let assignment_ids: Vec<i32> = assignments.iter().map(|a| a.id).collect();
    let customer_ids: Vec<i32> = assignments.iter().map(|a| a.customer_id).collect();
    let product_ids: Vec<i32> = assignments.iter().map(|a| a.product_id).collect();

    let customers = user_queries::customer_summaries_by_ids(&state.db, &customer_ids).await?;
    let products = product_queries::listings_by_ids(&state.db, &product_ids).await?;
    let mut deliveries = assignment_queries::delivery_infos_for(&state.db, &assignment_ids).await?;

    assignments
        .into_iter()
        .map(|assignment| {
            // Customers and products may repeat across assignments
            let customer = customers
                .get(&assignment.customer_id)
                .cloned()
                .ok_or_else(|| AppError::NotFound("Müşteri bulunamadı".to_string()))?;
            let product = products
                .get(&assignment.product_id)
                .cloned()
                .ok_or_else(|| AppError::NotFound("Ürün bulunamadı".to_string()))?;
            let delivery_info = deliveries.remove(&assignment.id);

            let effective = effective_status(assignment.status, delivery_info.is_some());

            Ok(AssignmentResponse {
                id: assignment.id,
                customer: customer.into(),
                product,
                quantity: assignment.quantity,
                status: assignment.status,
                effective_status: effective,
                status_display: effective.display_tr(),
                notes: assignment.notes,
                assigned_by: assignment.assigned_by,
                assigned_at: assignment.assigned_at,
                delivery_info,
            })
        })
        .collect()
}

fn customer_scope(claims: &Claims) -> Result<Option<i32>> {
    if claims.role == UserRole::Customer {
        Ok(Some(extract_user_id(claims)?))
    } else {
        Ok(None)
    }
}

pub async fn list_assignments(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<AssignmentQuery>,
) -> Result<Json<Vec<AssignmentResponse>>> {
    let assignments = assignment_queries::list_assignments(
        &state.db,
        customer_scope(&claims)?,
        params.search.as_deref(),
        params.status,
    )
    .await?;

    Ok(Json(build_responses(&state, assignments).await?))
}

pub async fn get_assignment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i32>,
) -> Result<Json<AssignmentResponse>> {
    let assignment = assignment_queries::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Satış kaydı bulunamadı".to_string()))?;

    if let Some(customer_id) = customer_scope(&claims)? {
        if assignment.customer_id != customer_id {
            return Err(AppError::Forbidden(
                "Bu kayda erişim yetkiniz yok".to_string(),
            ));
        }
    }

    let mut responses = build_responses(&state, vec![assignment]).await?;
    Ok(Json(responses.remove(0)))
}

pub async fn create_assignment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateAssignmentRequest>,
) -> Result<Json<AssignmentResponse>> {
    if payload.quantity <= 0 {
        return Err(AppError::BadRequest("Geçersiz adet".to_string()));
    }

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

    let assignment = assignment_queries::create_assignment(
        &state.db,
        payload.customer_id,
        payload.product_id,
        payload.quantity,
        payload.notes.as_deref(),
        extract_user_id(&claims)?,
    )
    .await?;

    let mut responses = build_responses(&state, vec![assignment]).await?;
    Ok(Json(responses.remove(0)))
}

pub async fn update_assignment(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateAssignmentRequest>,
) -> Result<Json<AssignmentResponse>> {
    if let Some(quantity) = payload.quantity {
        if quantity <= 0 {
            return Err(AppError::BadRequest("Geçersiz adet".to_string()));
        }
    }

    let assignment = if let Some(status) = payload.status {
        assignment_queries::update_status(&state.db, id, status).await?
    } else {
        assignment_queries::find_by_id(&state.db, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Satış kaydı bulunamadı".to_string()))?
    };

    let assignment = if payload.quantity.is_some() || payload.notes.is_some() {
        assignment_queries::update_fields(&state.db, id, payload.quantity, payload.notes.as_deref())
            .await?
            .ok_or_else(|| AppError::NotFound("Satış kaydı bulunamadı".to_string()))?
    } else {
        assignment
    };

    let mut responses = build_responses(&state, vec![assignment]).await?;
    Ok(Json(responses.remove(0)))
}

pub async fn cancel_assignment(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    assignment_queries::cancel_assignment(&state.db, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn assignment_stats(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<AssignmentStats>> {
    let stats = assignment_queries::stats(&state.db, customer_scope(&claims)?).await?;

    Ok(Json(stats))
}
