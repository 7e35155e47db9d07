use sqlx::PgPool;

use crate::{
    error::{AppError, Result},
    models::{CreateDepotRequest, DepotLocation, UpdateDepotRequest},
};

pub async fn list_depots(pool: &PgPool) -> Result<Vec<DepotLocation>> {
    let depots =
        sqlx::query_as::<_, DepotLocation>("SELECT * FROM depot_locations ORDER BY name")
            .fetch_all(pool)
            .await?;

    Ok(depots)
}

pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<DepotLocation>> {
    let depot = sqlx::query_as::<_, DepotLocation>("SELECT * FROM depot_locations WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(depot)
}

pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<DepotLocation>> {
    let depot =
        sqlx::query_as::<_, DepotLocation>("SELECT * FROM depot_locations WHERE name = $1")
            .bind(name)
            .fetch_optional(pool)
            .await?;

    Ok(depot)
}

pub async fn find_default(pool: &PgPool) -> Result<Option<DepotLocation>> {
    let depot =
        sqlx::query_as::<_, DepotLocation>("SELECT * FROM depot_locations WHERE is_default")
            .fetch_optional(pool)
            .await?;

    Ok(depot)
}

pub async fn create_depot(
    pool: &PgPool,
    req: &CreateDepotRequest,
    created_by: i32,
) -> Result<DepotLocation> {
    let mut tx = pool.begin().await?;

    if req.is_default {
        sqlx::query("UPDATE depot_locations SET is_default = FALSE WHERE is_default")
            .execute(&mut *tx)
            .await?;
    }

    let depot = sqlx::query_as::<_, DepotLocation>(
        "INSERT INTO depot_locations (name, latitude, longitude, is_default, created_by)
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(&req.name)
    .bind(req.latitude)
    .bind(req.longitude)
    .bind(req.is_default)
    .bind(created_by)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(depot)
}

pub async fn update_depot(
    pool: &PgPool,
    id: i32,
    req: &UpdateDepotRequest,
) -> Result<Option<DepotLocation>> {
    let depot = sqlx::query_as::<_, DepotLocation>(
        "UPDATE depot_locations SET
             name = COALESCE($1, name),
             latitude = COALESCE($2, latitude),
             longitude = COALESCE($3, longitude),
             updated_at = NOW()
         WHERE id = $4 RETURNING *",
    )
    .bind(&req.name)
    .bind(req.latitude)
    .bind(req.longitude)
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(depot)
}

pub async fn delete_depot(pool: &PgPool, id: i32) -> Result<bool> {
    let result = sqlx::query("DELETE FROM depot_locations WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Makes a depot the default. Unsetting the previous default and setting
/// the new one happen in one transaction, so at most one default is ever
/// observable; calling it on the current default is a no-op.
pub async fn set_default(pool: &PgPool, id: i32) -> Result<DepotLocation> {
    let mut tx = pool.begin().await?;

    sqlx::query("UPDATE depot_locations SET is_default = FALSE WHERE is_default AND id <> $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let depot = sqlx::query_as::<_, DepotLocation>(
        "UPDATE depot_locations SET is_default = TRUE, updated_at = NOW()
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::NotFound("Depo bulunamadı".to_string()))?;

    tx.commit().await?;
    Ok(depot)
}
