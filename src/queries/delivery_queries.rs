use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::{
    error::{AppError, Result},
    models::{
        AssignmentStatus, CreateDeliveryRequest, Delivery, DeliveryListing, DeliveryStats,
        DeliveryStatus, UpdateDeliveryRequest,
    },
    services::route_optimizer::OptimizedStop,
};

const LISTING_SELECT: &str = "SELECT d.id, d.assignment_id,
            TRIM(u.first_name || ' ' || u.last_name) AS customer_name,
            p.name AS product_name,
            d.scheduled_date, d.status, d.address, d.address_lat, d.address_lng,
            d.delivery_order, d.distance_km, d.eta_minutes, d.route_batch_id,
            d.depot_id, d.customer_phone_snapshot, d.delivered_at
     FROM deliveries d
     JOIN product_assignments a ON a.id = d.assignment_id
     JOIN users u ON u.id = a.customer_id
     JOIN products p ON p.id = a.product_id";

pub async fn list_deliveries(
    pool: &PgPool,
    date: Option<NaiveDate>,
    status: Option<DeliveryStatus>,
) -> Result<Vec<DeliveryListing>> {
    let mut query: QueryBuilder<Postgres> = QueryBuilder::new(LISTING_SELECT);
    query.push(" WHERE 1=1");

    if let Some(date) = date {
        query.push(" AND d.scheduled_date = ");
        query.push_bind(date);
    }

    if let Some(status) = status {
        query.push(" AND d.status = ");
        query.push_bind(status);
    }

    query.push(" ORDER BY d.scheduled_date, d.delivery_order NULLS LAST, d.id");

    let deliveries = query
        .build_query_as::<DeliveryListing>()
        .fetch_all(pool)
        .await?;
    Ok(deliveries)
}

pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Delivery>> {
    let delivery = sqlx::query_as::<_, Delivery>("SELECT * FROM deliveries WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(delivery)
}

#[derive(sqlx::FromRow)]
struct AssignmentCustomerRow {
    status: AssignmentStatus,
    open_address: Option<String>,
    area_name: Option<String>,
    district_name: Option<String>,
    address_lat: Option<f64>,
    address_lng: Option<f64>,
    phone_number: Option<String>,
}

/// Schedules an assignment: creates its WAITING delivery and moves the
/// assignment to SCHEDULED in one transaction. Rejected when a delivery
/// already exists or the assignment is terminal.
pub async fn create_for_assignment(pool: &PgPool, req: &CreateDeliveryRequest) -> Result<Delivery> {
    let mut tx = pool.begin().await?;

    let row = sqlx::query_as::<_, AssignmentCustomerRow>(
        "SELECT a.status, u.open_address, ar.name AS area_name, di.name AS district_name,
                u.address_lat, u.address_lng, u.phone_number
         FROM product_assignments a
         JOIN users u ON u.id = a.customer_id
         LEFT JOIN areas ar ON ar.id = u.area_id
         LEFT JOIN districts di ON di.id = u.district_id
         WHERE a.id = $1 FOR UPDATE OF a",
    )
    .bind(req.assignment_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::NotFound("Satış kaydı bulunamadı".to_string()))?;

    if row.status.is_terminal() {
        return Err(AppError::BadRequest(
            "Tamamlanmış veya iptal edilmiş satış için teslimat planlanamaz".to_string(),
        ));
    }

    let existing: Option<i32> =
        sqlx::query_scalar("SELECT 1 FROM deliveries WHERE assignment_id = $1")
            .bind(req.assignment_id)
            .fetch_optional(&mut *tx)
            .await?;

    if existing.is_some() {
        return Err(AppError::Conflict(
            "Bu satış için zaten bir teslimat planı mevcut".to_string(),
        ));
    }

    let address = match &req.address {
        Some(address) if !address.is_empty() => address.clone(),
        _ => {
            let parts: Vec<&str> = [
                row.open_address.as_deref(),
                row.area_name.as_deref(),
                row.district_name.as_deref(),
            ]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect();
            parts.join(", ")
        }
    };

    sqlx::query("UPDATE product_assignments SET status = $1 WHERE id = $2")
        .bind(AssignmentStatus::Scheduled)
        .bind(req.assignment_id)
        .execute(&mut *tx)
        .await?;

    let delivery = sqlx::query_as::<_, Delivery>(
        "INSERT INTO deliveries
             (assignment_id, scheduled_date, address, address_lat, address_lng, customer_phone_snapshot)
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
    )
    .bind(req.assignment_id)
    .bind(req.scheduled_date)
    .bind(&address)
    .bind(req.address_lat.or(row.address_lat))
    .bind(req.address_lng.or(row.address_lng))
    .bind(row.phone_number.unwrap_or_default())
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(delivery)
}

/// Delivery update with transition validation. Reaching DELIVERED stamps
/// `delivered_at`, completes the assignment, and records the ownership row
/// the warranty runs against, all in the same transaction.
pub async fn update_delivery(
    pool: &PgPool,
    id: i32,
    req: &UpdateDeliveryRequest,
) -> Result<Delivery> {
    let mut tx = pool.begin().await?;

    let delivery =
        sqlx::query_as::<_, Delivery>("SELECT * FROM deliveries WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Teslimat bulunamadı".to_string()))?;

    // Delivered and failed records are immutable
    if delivery.status.is_terminal() {
        return Err(AppError::BadRequest(
            "Tamamlanmış veya başarısız teslimat düzenlenemez".to_string(),
        ));
    }

    if let Some(next) = req.status {
        if !delivery.status.can_transition_to(next) {
            return Err(AppError::BadRequest(format!(
                "Geçersiz teslimat durumu geçişi: {} -> {}",
                delivery.status.display_tr(),
                next.display_tr()
            )));
        }
    }

    let delivery = sqlx::query_as::<_, Delivery>(
        "UPDATE deliveries SET
             status = COALESCE($1, status),
             scheduled_date = COALESCE($2, scheduled_date),
             address = COALESCE($3, address),
             address_lat = COALESCE($4, address_lat),
             address_lng = COALESCE($5, address_lng),
             delivered_at = CASE WHEN $1 = 'DELIVERED'::delivery_status THEN NOW() ELSE delivered_at END
         WHERE id = $6 RETURNING *",
    )
    .bind(req.status)
    .bind(req.scheduled_date)
    .bind(&req.address)
    .bind(req.address_lat)
    .bind(req.address_lng)
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    match req.status {
        Some(DeliveryStatus::OutForDelivery) => {
            sqlx::query(
                "UPDATE product_assignments SET status = 'OUT_FOR_DELIVERY'
                 WHERE id = $1 AND status IN ('PLANNED', 'SCHEDULED')",
            )
            .bind(delivery.assignment_id)
            .execute(&mut *tx)
            .await?;
        }
        Some(DeliveryStatus::Delivered) => {
            sqlx::query(
                "UPDATE product_assignments SET status = 'DELIVERED'
                 WHERE id = $1 AND status NOT IN ('DELIVERED', 'CANCELLED')",
            )
            .bind(delivery.assignment_id)
            .execute(&mut *tx)
            .await?;

            // Ownership ledger entry; the purchase date is the delivery date
            sqlx::query(
                "INSERT INTO product_ownerships (customer_id, product_id, purchase_date)
                 SELECT a.customer_id, a.product_id, $2
                 FROM product_assignments a WHERE a.id = $1",
            )
            .bind(delivery.assignment_id)
            .bind(delivery.scheduled_date)
            .execute(&mut *tx)
            .await?;
        }
        _ => {}
    }

    tx.commit().await?;
    Ok(delivery)
}

/// Removing a delivery plan reverts its assignment to PLANNED, unless the
/// assignment already reached a terminal state.
pub async fn delete_delivery(pool: &PgPool, id: i32) -> Result<()> {
    let mut tx = pool.begin().await?;

    let delivery =
        sqlx::query_as::<_, Delivery>("SELECT * FROM deliveries WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Teslimat bulunamadı".to_string()))?;

    sqlx::query(
        "UPDATE product_assignments SET status = 'PLANNED'
         WHERE id = $1 AND status NOT IN ('DELIVERED', 'CANCELLED')",
    )
    .bind(delivery.assignment_id)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM deliveries WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

pub async fn stats(
    pool: &PgPool,
    date: Option<NaiveDate>,
    depot_id: Option<i32>,
) -> Result<DeliveryStats> {
    #[derive(sqlx::FromRow)]
    struct Row {
        waiting_count: i64,
        delivered_last_10_days_count: i64,
        scheduled_for_selected_date_count: i64,
    }

    let row = sqlx::query_as::<_, Row>(
        "SELECT
             COUNT(*) FILTER (WHERE status IN ('WAITING', 'OUT_FOR_DELIVERY')) AS waiting_count,
             COUNT(*) FILTER (WHERE status = 'DELIVERED' AND delivered_at >= NOW() - INTERVAL '10 days')
                 AS delivered_last_10_days_count,
             COUNT(*) FILTER (WHERE $1::date IS NOT NULL AND scheduled_date = $1)
                 AS scheduled_for_selected_date_count
         FROM deliveries
         WHERE $2::int IS NULL OR depot_id = $2",
    )
    .bind(date)
    .bind(depot_id)
    .fetch_one(pool)
    .await?;

    Ok(DeliveryStats {
        waiting_count: row.waiting_count,
        delivered_last_10_days_count: row.delivered_last_10_days_count,
        scheduled_for_selected_date_count: row.scheduled_for_selected_date_count,
    })
}

/// A WAITING delivery eligible for routing. Coordinates prefer the customer
/// profile and fall back to the delivery address.
#[derive(Debug, sqlx::FromRow)]
pub struct RoutableDelivery {
    pub id: i32,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub customer_name: String,
    pub product_name: String,
}

pub async fn waiting_for_route(
    pool: &PgPool,
    date: NaiveDate,
    delivery_ids: &[i32],
) -> Result<Vec<RoutableDelivery>> {
    let mut query: QueryBuilder<Postgres> = QueryBuilder::new(
        "SELECT d.id,
                COALESCE(u.address_lat, d.address_lat) AS lat,
                COALESCE(u.address_lng, d.address_lng) AS lng,
                TRIM(u.first_name || ' ' || u.last_name) AS customer_name,
                p.name AS product_name
         FROM deliveries d
         JOIN product_assignments a ON a.id = d.assignment_id
         JOIN users u ON u.id = a.customer_id
         JOIN products p ON p.id = a.product_id
         WHERE d.status = 'WAITING' AND d.scheduled_date = ",
    );
    query.push_bind(date);

    if !delivery_ids.is_empty() {
        query.push(" AND d.id = ANY(");
        query.push_bind(delivery_ids);
        query.push(")");
    }

    query.push(" ORDER BY d.id");

    let deliveries = query
        .build_query_as::<RoutableDelivery>()
        .fetch_all(pool)
        .await?;
    Ok(deliveries)
}

/// Writes an optimizer result back onto the batch: stop order, leg
/// distance, cumulative ETA, shared batch id, and the OUT_FOR_DELIVERY
/// flip on both deliveries and their assignments.
pub async fn apply_route(
    pool: &PgPool,
    stops: &[OptimizedStop],
    batch_id: &str,
    depot_id: i32,
) -> Result<()> {
    let mut tx = pool.begin().await?;

    for stop in stops {
        sqlx::query(
            "UPDATE deliveries SET
                 delivery_order = $1,
                 distance_km = $2,
                 eta_minutes = $3,
                 route_batch_id = $4,
                 depot_id = $5,
                 status = 'OUT_FOR_DELIVERY'
             WHERE id = $6 AND status = 'WAITING'",
        )
        .bind(stop.order)
        .bind(stop.distance_from_previous_km)
        .bind(stop.eta_minutes)
        .bind(batch_id)
        .bind(depot_id)
        .bind(stop.id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE product_assignments SET status = 'OUT_FOR_DELIVERY'
             WHERE id = (SELECT assignment_id FROM deliveries WHERE id = $1)
               AND status IN ('PLANNED', 'SCHEDULED')",
        )
        .bind(stop.id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}
