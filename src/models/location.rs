use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct District {
    pub id: i32,
    pub name: String,
    pub center_lat: Option<f64>,
    pub center_lng: Option<f64>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Area {
    pub id: i32,
    pub district_id: i32,
    pub name: String,
    pub district_name: String,
}

#[derive(Debug, Deserialize)]
pub struct AreaQuery {
    pub district_id: Option<i32>,
}
