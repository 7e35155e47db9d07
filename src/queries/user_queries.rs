use std::collections::HashMap;

use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::{
    error::{AppError, Result},
    models::{CustomerSummary, CustomerUpdateRequest, User, UserRole},
};

const CUSTOMER_SUMMARY_SELECT: &str = "SELECT u.id, u.username, u.first_name, u.last_name, u.email, u.phone_number,
            d.name AS district_name, a.name AS area_name, u.open_address
     FROM users u
     LEFT JOIN districts d ON d.id = u.district_id
     LEFT JOIN areas a ON a.id = u.area_id";

pub async fn create_user(
    pool: &PgPool,
    username: &str,
    email: &str,
    password_hash: &str,
    first_name: &str,
    last_name: &str,
    role: UserRole,
    phone_number: Option<&str>,
) -> Result<User> {
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (username, email, password, first_name, last_name, role, phone_number)
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
    )
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(first_name)
    .bind(last_name)
    .bind(role)
    .bind(phone_number)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

pub async fn find_by_username(pool: &PgPool, username: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

pub async fn list_customers(pool: &PgPool, search: Option<&str>) -> Result<Vec<CustomerSummary>> {
    let mut query: QueryBuilder<Postgres> = QueryBuilder::new(CUSTOMER_SUMMARY_SELECT);
    query.push(" WHERE u.role = 'customer'");

    if let Some(search) = search {
        let pattern = format!("%{}%", search);
        query.push(" AND (u.username ILIKE ");
        query.push_bind(pattern.clone());
        query.push(" OR u.first_name ILIKE ");
        query.push_bind(pattern.clone());
        query.push(" OR u.last_name ILIKE ");
        query.push_bind(pattern.clone());
        query.push(" OR u.email ILIKE ");
        query.push_bind(pattern);
        query.push(")");
    }

    query.push(" ORDER BY u.first_name, u.last_name");

    let customers = query.build_query_as::<CustomerSummary>().fetch_all(pool).await?;
    Ok(customers)
}

pub async fn find_customer_summary(pool: &PgPool, id: i32) -> Result<Option<CustomerSummary>> {
    let customer = sqlx::query_as::<_, CustomerSummary>(&format!(
        "{} WHERE u.id = $1 AND u.role = 'customer'",
        CUSTOMER_SUMMARY_SELECT
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(customer)
}

pub async fn customer_summaries_by_ids(
    pool: &PgPool,
    ids: &[i32],
) -> Result<HashMap<i32, CustomerSummary>> {
    let customers = sqlx::query_as::<_, CustomerSummary>(&format!(
        "{} WHERE u.id = ANY($1)",
        CUSTOMER_SUMMARY_SELECT
    ))
    .bind(ids)
    .fetch_all(pool)
    .await?;

    Ok(customers.into_iter().map(|c| (c.id, c)).collect())
}

pub async fn area_belongs_to_district(pool: &PgPool, area_id: i32, district_id: i32) -> Result<bool> {
    let found: Option<i32> =
        sqlx::query_scalar("SELECT 1 FROM areas WHERE id = $1 AND district_id = $2")
            .bind(area_id)
            .bind(district_id)
            .fetch_optional(pool)
            .await?;

    Ok(found.is_some())
}

pub async fn update_customer(
    pool: &PgPool,
    id: i32,
    req: &CustomerUpdateRequest,
) -> Result<User> {
    let user = sqlx::query_as::<_, User>(
        "UPDATE users SET
             first_name = COALESCE($1, first_name),
             last_name = COALESCE($2, last_name),
             email = COALESCE($3, email),
             phone_number = COALESCE($4, phone_number),
             district_id = COALESCE($5, district_id),
             area_id = COALESCE($6, area_id),
             open_address = COALESCE($7, open_address),
             address_lat = COALESCE($8, address_lat),
             address_lng = COALESCE($9, address_lng),
             notify_service_updates = COALESCE($10, notify_service_updates),
             notify_price_drops = COALESCE($11, notify_price_drops),
             notify_restock = COALESCE($12, notify_restock),
             notify_recommendations = COALESCE($13, notify_recommendations),
             notify_warranty_expiry = COALESCE($14, notify_warranty_expiry),
             notify_general = COALESCE($15, notify_general),
             updated_at = NOW()
         WHERE id = $16 AND role = 'customer' RETURNING *",
    )
    .bind(&req.first_name)
    .bind(&req.last_name)
    .bind(&req.email)
    .bind(&req.phone_number)
    .bind(req.district_id)
    .bind(req.area_id)
    .bind(&req.open_address)
    .bind(req.address_lat)
    .bind(req.address_lng)
    .bind(req.notify_service_updates)
    .bind(req.notify_price_drops)
    .bind(req.notify_restock)
    .bind(req.notify_recommendations)
    .bind(req.notify_warranty_expiry)
    .bind(req.notify_general)
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Müşteri bulunamadı".to_string()))?;

    Ok(user)
}
