use sqlx::PgPool;

use crate::{
    error::Result,
    models::{Category, CategoryWithCount},
};

pub async fn list_with_counts(pool: &PgPool) -> Result<Vec<CategoryWithCount>> {
    let categories = sqlx::query_as::<_, CategoryWithCount>(
        "SELECT c.id, c.name, COUNT(p.id) AS product_count
         FROM categories c
         LEFT JOIN products p ON p.category_id = c.id
         GROUP BY c.id, c.name
         ORDER BY c.name",
    )
    .fetch_all(pool)
    .await?;

    Ok(categories)
}

pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Category>> {
    let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await?;

    Ok(category)
}

pub async fn create_category(pool: &PgPool, name: &str) -> Result<Category> {
    let category =
        sqlx::query_as::<_, Category>("INSERT INTO categories (name) VALUES ($1) RETURNING *")
            .bind(name)
            .fetch_one(pool)
            .await?;

    Ok(category)
}

pub async fn delete_category(pool: &PgPool, id: i32) -> Result<bool> {
    let result = sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
