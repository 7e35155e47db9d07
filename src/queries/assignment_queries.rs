use std::collections::HashMap;

use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::{
    error::{AppError, Result},
    models::{
        effective_status, AssignmentStats, AssignmentStatus, DeliveryInfo, DeliveryStatus,
        ProductAssignment,
    },
};

pub async fn list_assignments(
    pool: &PgPool,
    customer_id: Option<i32>,
    search: Option<&str>,
    status: Option<AssignmentStatus>,
) -> Result<Vec<ProductAssignment>> {
    let mut query: QueryBuilder<Postgres> =
        QueryBuilder::new("SELECT a.* FROM product_assignments a WHERE 1=1");

    if let Some(customer_id) = customer_id {
        query.push(" AND a.customer_id = ");
        query.push_bind(customer_id);
    }

    if let Some(search) = search {
        let pattern = format!("%{}%", search);
        query.push(
            " AND (EXISTS (SELECT 1 FROM users u WHERE u.id = a.customer_id AND (u.username ILIKE ",
        );
        query.push_bind(pattern.clone());
        query.push(" OR u.first_name ILIKE ");
        query.push_bind(pattern.clone());
        query.push(" OR u.last_name ILIKE ");
        query.push_bind(pattern.clone());
        query.push("))");
        query.push(" OR EXISTS (SELECT 1 FROM products p WHERE p.id = a.product_id AND p.name ILIKE ");
        query.push_bind(pattern);
        query.push("))");
    }

    if let Some(status) = status {
        query.push(" AND a.status = ");
        query.push_bind(status);
    }

    query.push(" ORDER BY a.assigned_at DESC");

    let assignments = query
        .build_query_as::<ProductAssignment>()
        .fetch_all(pool)
        .await?;
    Ok(assignments)
}

pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<ProductAssignment>> {
    let assignment =
        sqlx::query_as::<_, ProductAssignment>("SELECT * FROM product_assignments WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

    Ok(assignment)
}

pub async fn create_assignment(
    pool: &PgPool,
    customer_id: i32,
    product_id: i32,
    quantity: i32,
    notes: Option<&str>,
    assigned_by: i32,
) -> Result<ProductAssignment> {
    let assignment = sqlx::query_as::<_, ProductAssignment>(
        "INSERT INTO product_assignments (customer_id, product_id, quantity, notes, assigned_by)
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(customer_id)
    .bind(product_id)
    .bind(quantity)
    .bind(notes)
    .bind(assigned_by)
    .fetch_one(pool)
    .await?;

    Ok(assignment)
}

pub async fn update_fields(
    pool: &PgPool,
    id: i32,
    quantity: Option<i32>,
    notes: Option<&str>,
) -> Result<Option<ProductAssignment>> {
    let assignment = sqlx::query_as::<_, ProductAssignment>(
        "UPDATE product_assignments SET
             quantity = COALESCE($1, quantity),
             notes = COALESCE($2, notes)
         WHERE id = $3 RETURNING *",
    )
    .bind(quantity)
    .bind(notes)
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(assignment)
}

/// Status change with transition validation. The effective status (PLANNED
/// with a delivery counts as SCHEDULED) is what the transition is checked
/// against.
pub async fn update_status(
    pool: &PgPool,
    id: i32,
    next: AssignmentStatus,
) -> Result<ProductAssignment> {
    let mut tx = pool.begin().await?;

    let assignment = sqlx::query_as::<_, ProductAssignment>(
        "SELECT * FROM product_assignments WHERE id = $1 FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::NotFound("Satış kaydı bulunamadı".to_string()))?;

    let has_delivery: Option<i32> =
        sqlx::query_scalar("SELECT 1 FROM deliveries WHERE assignment_id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

    let current = effective_status(assignment.status, has_delivery.is_some());
    if !current.can_transition_to(next) {
        return Err(AppError::BadRequest(format!(
            "Geçersiz durum geçişi: {} -> {}",
            current.display_tr(),
            next.display_tr()
        )));
    }

    let assignment = sqlx::query_as::<_, ProductAssignment>(
        "UPDATE product_assignments SET status = $1 WHERE id = $2 RETURNING *",
    )
    .bind(next)
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(assignment)
}

/// Cancels an assignment. A still-waiting delivery plan is removed with it;
/// terminal assignments cannot be cancelled.
pub async fn cancel_assignment(pool: &PgPool, id: i32) -> Result<ProductAssignment> {
    let mut tx = pool.begin().await?;

    let assignment = sqlx::query_as::<_, ProductAssignment>(
        "SELECT * FROM product_assignments WHERE id = $1 FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::NotFound("Satış kaydı bulunamadı".to_string()))?;

    if assignment.status.is_terminal() {
        return Err(AppError::BadRequest(
            "Tamamlanmış veya iptal edilmiş satış iptal edilemez".to_string(),
        ));
    }

    sqlx::query("DELETE FROM deliveries WHERE assignment_id = $1 AND status = $2")
        .bind(id)
        .bind(DeliveryStatus::Waiting)
        .execute(&mut *tx)
        .await?;

    let assignment = sqlx::query_as::<_, ProductAssignment>(
        "UPDATE product_assignments SET status = $1 WHERE id = $2 RETURNING *",
    )
    .bind(AssignmentStatus::Cancelled)
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(assignment)
}

pub async fn stats(pool: &PgPool, customer_id: Option<i32>) -> Result<AssignmentStats> {
    let stats = sqlx::query_as::<_, AssignmentStats>(
        "SELECT
             COUNT(*) FILTER (WHERE status = 'PLANNED') AS planned,
             COUNT(*) FILTER (WHERE status = 'SCHEDULED') AS scheduled,
             COUNT(*) FILTER (WHERE status = 'OUT_FOR_DELIVERY') AS out_for_delivery,
             COUNT(*) FILTER (WHERE status = 'DELIVERED') AS delivered
         FROM product_assignments
         WHERE $1::int IS NULL OR customer_id = $1",
    )
    .bind(customer_id)
    .fetch_one(pool)
    .await?;

    Ok(stats)
}

#[derive(sqlx::FromRow)]
struct DeliveryInfoRow {
    assignment_id: i32,
    #[sqlx(flatten)]
    info: DeliveryInfo,
}

pub async fn delivery_infos_for(
    pool: &PgPool,
    assignment_ids: &[i32],
) -> Result<HashMap<i32, DeliveryInfo>> {
    let rows = sqlx::query_as::<_, DeliveryInfoRow>(
        "SELECT assignment_id, id, status, scheduled_date, address
         FROM deliveries WHERE assignment_id = ANY($1)",
    )
    .bind(assignment_ids)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| (row.assignment_id, row.info))
        .collect())
}
