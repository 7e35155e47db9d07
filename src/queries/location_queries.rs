use sqlx::PgPool;

use crate::{
    error::Result,
    models::{Area, District},
};

pub async fn list_districts(pool: &PgPool) -> Result<Vec<District>> {
    let districts = sqlx::query_as::<_, District>("SELECT * FROM districts ORDER BY name")
        .fetch_all(pool)
        .await?;

    Ok(districts)
}

pub async fn list_areas(pool: &PgPool, district_id: Option<i32>) -> Result<Vec<Area>> {
    let areas = sqlx::query_as::<_, Area>(
        "SELECT a.id, a.district_id, a.name, d.name AS district_name
         FROM areas a
         JOIN districts d ON d.id = a.district_id
         WHERE $1::int IS NULL OR a.district_id = $1
         ORDER BY d.name, a.name",
    )
    .bind(district_id)
    .fetch_all(pool)
    .await?;

    Ok(areas)
}
