use sqlx::PgPool;

use crate::{
    error::{AppError, Result},
    models::{
        CreateServiceRequestRequest, ServiceRequest, ServiceRequestListing, ServiceRequestStatus,
        UpdateServiceRequestRequest,
    },
};

// Flat estimate per request ahead in the queue
const WAIT_MINUTES_PER_REQUEST: i32 = 30;

const LISTING_SELECT: &str = "SELECT s.id, s.customer_id, u.username AS customer_name, s.ownership_id,
            p.name AS product_name, s.request_type, s.status, s.description,
            s.assigned_to, s.resolution_notes, s.resolved_at, s.created_at,
            q.queue_number, q.priority, q.estimated_wait_time
     FROM service_requests s
     JOIN users u ON u.id = s.customer_id
     JOIN product_ownerships o ON o.id = s.ownership_id
     JOIN products p ON p.id = o.product_id
     LEFT JOIN service_queue q ON q.request_id = s.id";

pub async fn list_requests(
    pool: &PgPool,
    customer_id: Option<i32>,
) -> Result<Vec<ServiceRequestListing>> {
    let requests = sqlx::query_as::<_, ServiceRequestListing>(&format!(
        "{} WHERE $1::int IS NULL OR s.customer_id = $1 ORDER BY s.created_at DESC",
        LISTING_SELECT
    ))
    .bind(customer_id)
    .fetch_all(pool)
    .await?;

    Ok(requests)
}

/// Files a service request and its queue entry atomically. The request
/// enters the queue immediately with the next queue number; the wait
/// estimate is a flat per-request figure times the open queue length.
pub async fn create_with_queue(
    pool: &PgPool,
    customer_id: i32,
    req: &CreateServiceRequestRequest,
) -> Result<ServiceRequest> {
    let mut tx = pool.begin().await?;

    let owns: Option<i32> =
        sqlx::query_scalar("SELECT 1 FROM product_ownerships WHERE id = $1 AND customer_id = $2")
            .bind(req.ownership_id)
            .bind(customer_id)
            .fetch_optional(&mut *tx)
            .await?;

    if owns.is_none() {
        return Err(AppError::NotFound(
            "Ürün sahipliği kaydı bulunamadı".to_string(),
        ));
    }

    // Born pending, queued before the transaction commits
    let request = sqlx::query_as::<_, ServiceRequest>(
        "INSERT INTO service_requests (customer_id, ownership_id, request_type, description)
         VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(customer_id)
    .bind(req.ownership_id)
    .bind(req.request_type)
    .bind(&req.description)
    .fetch_one(&mut *tx)
    .await?;

    let ahead: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM service_queue")
        .fetch_one(&mut *tx)
        .await?;

    sqlx::query(
        "INSERT INTO service_queue (request_id, queue_number, estimated_wait_time)
         VALUES ($1, COALESCE((SELECT MAX(queue_number) FROM service_queue), 0) + 1, $2)",
    )
    .bind(request.id)
    .bind(ahead as i32 * WAIT_MINUTES_PER_REQUEST)
    .execute(&mut *tx)
    .await?;

    let next = ServiceRequestStatus::InQueue;
    if !request.status.can_transition_to(next) {
        return Err(AppError::InternalError(
            "Yeni servis talebi kuyruğa alınamadı".to_string(),
        ));
    }

    let request = sqlx::query_as::<_, ServiceRequest>(
        "UPDATE service_requests SET status = $1, updated_at = NOW() WHERE id = $2 RETURNING *",
    )
    .bind(next)
    .bind(request.id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(request)
}

/// Status change with transition validation. Terminal outcomes stamp
/// `resolved_at` and leave the queue.
pub async fn update_request(
    pool: &PgPool,
    id: i32,
    req: &UpdateServiceRequestRequest,
) -> Result<ServiceRequest> {
    let mut tx = pool.begin().await?;

    let request = sqlx::query_as::<_, ServiceRequest>(
        "SELECT * FROM service_requests WHERE id = $1 FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::NotFound("Servis talebi bulunamadı".to_string()))?;

    if let Some(next) = req.status {
        if !request.status.can_transition_to(next) {
            return Err(AppError::BadRequest(
                "Geçersiz servis talebi durumu geçişi".to_string(),
            ));
        }
    }

    let request = sqlx::query_as::<_, ServiceRequest>(
        "UPDATE service_requests SET
             status = COALESCE($1, status),
             assigned_to = COALESCE($2, assigned_to),
             resolution_notes = COALESCE($3, resolution_notes),
             resolved_at = CASE WHEN $1 = 'completed'::service_request_status THEN NOW() ELSE resolved_at END,
             updated_at = NOW()
         WHERE id = $4 RETURNING *",
    )
    .bind(req.status)
    .bind(req.assigned_to)
    .bind(&req.resolution_notes)
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    if matches!(
        req.status,
        Some(ServiceRequestStatus::Completed | ServiceRequestStatus::Cancelled)
    ) {
        sqlx::query("DELETE FROM service_queue WHERE request_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(request)
}
