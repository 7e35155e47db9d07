use std::collections::HashMap;

use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::{
    error::Result,
    models::{CreateProductRequest, Product, ProductListing, ProductQuery, UpdateProductRequest},
};

const LISTING_SELECT: &str = "SELECT p.id, p.name, p.brand, p.category_id, c.name AS category_name,
            p.description, p.price, p.stock, p.image, p.warranty_duration_months
     FROM products p
     LEFT JOIN categories c ON c.id = p.category_id";

pub async fn list_products(pool: &PgPool, params: &ProductQuery) -> Result<Vec<ProductListing>> {
    let mut query: QueryBuilder<Postgres> = QueryBuilder::new(LISTING_SELECT);
    query.push(" WHERE 1=1");

    if let Some(ref search) = params.search {
        let pattern = format!("%{}%", search);
        query.push(" AND (p.name ILIKE ");
        query.push_bind(pattern.clone());
        query.push(" OR p.brand ILIKE ");
        query.push_bind(pattern);
        query.push(")");
    }

    if let Some(ref brand) = params.brand {
        query.push(" AND p.brand = ");
        query.push_bind(brand);
    }

    if let Some(category_id) = params.category_id {
        query.push(" AND p.category_id = ");
        query.push_bind(category_id);
    }

    query.push(" ORDER BY p.name");

    let products = query.build_query_as::<ProductListing>().fetch_all(pool).await?;
    Ok(products)
}

pub async fn find_listing_by_id(pool: &PgPool, id: i32) -> Result<Option<ProductListing>> {
    let product =
        sqlx::query_as::<_, ProductListing>(&format!("{} WHERE p.id = $1", LISTING_SELECT))
            .bind(id)
            .fetch_optional(pool)
            .await?;

    Ok(product)
}

pub async fn listings_by_ids(pool: &PgPool, ids: &[i32]) -> Result<HashMap<i32, ProductListing>> {
    let products =
        sqlx::query_as::<_, ProductListing>(&format!("{} WHERE p.id = ANY($1)", LISTING_SELECT))
            .bind(ids)
            .fetch_all(pool)
            .await?;

    Ok(products.into_iter().map(|p| (p.id, p)).collect())
}

pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Product>> {
    let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(product)
}

pub async fn create_product(pool: &PgPool, req: &CreateProductRequest) -> Result<Product> {
    let product = sqlx::query_as::<_, Product>(
        "INSERT INTO products (name, brand, category_id, description, price, stock, image, warranty_duration_months)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
    )
    .bind(&req.name)
    .bind(&req.brand)
    .bind(req.category_id)
    .bind(&req.description)
    .bind(req.price)
    .bind(req.stock)
    .bind(&req.image)
    .bind(req.warranty_duration_months.unwrap_or(24))
    .fetch_one(pool)
    .await?;

    Ok(product)
}

pub async fn update_product(
    pool: &PgPool,
    id: i32,
    req: &UpdateProductRequest,
) -> Result<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(
        "UPDATE products SET
             name = COALESCE($1, name),
             brand = COALESCE($2, brand),
             category_id = COALESCE($3, category_id),
             description = COALESCE($4, description),
             price = COALESCE($5, price),
             stock = COALESCE($6, stock),
             image = COALESCE($7, image),
             warranty_duration_months = COALESCE($8, warranty_duration_months),
             updated_at = NOW()
         WHERE id = $9 RETURNING *",
    )
    .bind(&req.name)
    .bind(&req.brand)
    .bind(req.category_id)
    .bind(&req.description)
    .bind(req.price)
    .bind(req.stock)
    .bind(&req.image)
    .bind(req.warranty_duration_months)
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(product)
}

pub async fn delete_product(pool: &PgPool, id: i32) -> Result<bool> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
