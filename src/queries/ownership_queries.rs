use sqlx::PgPool;

use crate::{
    error::Result,
    models::{CreateOwnershipRequest, OwnershipListing, ProductOwnership},
};

pub async fn ownerships_for_customer(
    pool: &PgPool,
    customer_id: i32,
) -> Result<Vec<OwnershipListing>> {
    let ownerships = sqlx::query_as::<_, OwnershipListing>(
        "SELECT o.id AS ownership_id, o.customer_id, o.purchase_date, o.serial_number,
                (SELECT COUNT(*) FROM service_requests s
                 WHERE s.ownership_id = o.id
                   AND s.status NOT IN ('completed', 'cancelled')) AS active_service_requests,
                p.id, p.name, p.brand, p.category_id, c.name AS category_name,
                p.description, p.price, p.stock, p.image, p.warranty_duration_months
         FROM product_ownerships o
         JOIN products p ON p.id = o.product_id
         LEFT JOIN categories c ON c.id = p.category_id
         WHERE o.customer_id = $1
         ORDER BY o.purchase_date DESC",
    )
    .bind(customer_id)
    .fetch_all(pool)
    .await?;

    Ok(ownerships)
}

pub async fn create_ownership(
    pool: &PgPool,
    req: &CreateOwnershipRequest,
) -> Result<ProductOwnership> {
    let ownership = sqlx::query_as::<_, ProductOwnership>(
        "INSERT INTO product_ownerships (customer_id, product_id, purchase_date, serial_number)
         VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(req.customer_id)
    .bind(req.product_id)
    .bind(req.purchase_date)
    .bind(&req.serial_number)
    .fetch_one(pool)
    .await?;

    Ok(ownership)
}

pub async fn serial_exists(pool: &PgPool, serial_number: &str) -> Result<bool> {
    let found: Option<i32> =
        sqlx::query_scalar("SELECT 1 FROM product_ownerships WHERE serial_number = $1")
            .bind(serial_number)
            .fetch_optional(pool)
            .await?;

    Ok(found.is_some())
}
