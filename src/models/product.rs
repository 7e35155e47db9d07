use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub brand: String,
    pub category_id: Option<i32>,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: i32,
    pub image: Option<String>,
    pub warranty_duration_months: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Product row joined with its category name, the shape list endpoints return.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProductListing {
    pub id: i32,
    pub name: String,
    pub brand: String,
    pub category_id: Option<i32>,
    pub category_name: Option<String>,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: i32,
    pub image: Option<String>,
    pub warranty_duration_months: i32,
}

#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    pub search: Option<String>,
    pub brand: Option<String>,
    pub category_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub brand: String,
    pub category_id: Option<i32>,
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub stock: i32,
    pub image: Option<String>,
    pub warranty_duration_months: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub category_id: Option<i32>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
    pub image: Option<String>,
    pub warranty_duration_months: Option<i32>,
}
