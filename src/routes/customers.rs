use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::{
    AppState,
    error::{AppError, Result},
    models::{CustomerQuery, CustomerResponse, CustomerUpdateRequest, User},
    queries::user_queries,
};

pub async fn list_customers(
    State(state): State<AppState>,
    Query(params): Query<CustomerQuery>,
) -> Result<Json<Vec<CustomerResponse>>> {
    let customers = user_queries::list_customers(&state.db, params.search.as_deref()).await?;

    Ok(Json(customers.into_iter().map(Into::into).collect()))
}

pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<CustomerResponse>> {
    let customer = user_queries::find_customer_summary(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Müşteri bulunamadı".to_string()))?;

    Ok(Json(customer.into()))
}

pub async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<CustomerUpdateRequest>,
) -> Result<Json<User>> {
    // When the area changes, it must belong to the district it is paired with
    if let Some(area_id) = payload.area_id {
        let district_id = match payload.district_id {
            Some(district_id) => district_id,
            None => user_queries::find_by_id(&state.db, id)
                .await?
                .and_then(|u| u.district_id)
                .ok_or_else(|| {
                    AppError::BadRequest(
                        "Mahalle seçmek için önce ilçe seçmelisiniz".to_string(),
                    )
                })?,
        };

        if !user_queries::area_belongs_to_district(&state.db, area_id, district_id).await? {
            return Err(AppError::BadRequest(
                "Seçilen mahalle, seçilen ilçeye ait değil".to_string(),
            ));
        }
    }

    let user = user_queries::update_customer(&state.db, id, &payload).await?;

    Ok(Json(user))
}
