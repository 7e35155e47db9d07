use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Seller,
    Customer,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub phone_number: Option<String>,
    pub district_id: Option<i32>,
    pub area_id: Option<i32>,
    pub open_address: Option<String>,
    pub address_lat: Option<f64>,
    pub address_lng: Option<f64>,
    pub notify_service_updates: bool,
    pub notify_price_drops: bool,
    pub notify_restock: bool,
    pub notify_recommendations: bool,
    pub notify_warranty_expiry: bool,
    pub notify_general: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

// Request types

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub phone_number: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Debug, Deserialize)]
pub struct CustomerQuery {
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CustomerUpdateRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub district_id: Option<i32>,
    pub area_id: Option<i32>,
    pub open_address: Option<String>,
    pub address_lat: Option<f64>,
    pub address_lng: Option<f64>,
    pub notify_service_updates: Option<bool>,
    pub notify_price_drops: Option<bool>,
    pub notify_restock: Option<bool>,
    pub notify_recommendations: Option<bool>,
    pub notify_warranty_expiry: Option<bool>,
    pub notify_general: Option<bool>,
}

// Response types

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CustomerSummary {
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub district_name: Option<String>,
    pub area_name: Option<String>,
    pub open_address: Option<String>,
}

impl CustomerSummary {
    pub fn full_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }

    /// Open address + area + district, the format delivery addresses are
    /// snapshotted in.
    pub fn formatted_address(&self) -> String {
        let parts: Vec<&str> = [
            self.open_address.as_deref(),
            self.area_name.as_deref(),
            self.district_name.as_deref(),
        ]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect();

        parts.join(", ")
    }
}

#[derive(Debug, Serialize)]
pub struct CustomerResponse {
    #[serde(flatten)]
    pub customer: CustomerSummary,
    pub full_name: String,
    pub formatted_address: String,
}

impl From<CustomerSummary> for CustomerResponse {
    fn from(customer: CustomerSummary) -> Self {
        let full_name = customer.full_name();
        let formatted_address = customer.formatted_address();
        Self {
            customer,
            full_name,
            formatted_address,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer(first: &str, last: &str, area: Option<&str>) -> CustomerSummary {
        CustomerSummary {
            id: 1,
            username: "ayse".to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: "ayse@example.com".to_string(),
            phone_number: None,
            district_name: Some("Lefkoşa".to_string()),
            area_name: area.map(String::from),
            open_address: Some("Şht. Mustafa Ruso Cad. 12".to_string()),
        }
    }

    #[test]
    fn register_payload_cannot_smuggle_a_role() {
        // A role field in the registration body is ignored, not honored
        let payload: RegisterRequest = serde_json::from_str(
            r#"{"username": "mallory", "email": "m@example.com",
                "password": "sekiz-karakter", "role": "admin"}"#,
        )
        .unwrap();

        assert_eq!(payload.username, "mallory");
        assert_eq!(payload.email, "m@example.com");
    }

    #[test]
    fn full_name_falls_back_to_username() {
        assert_eq!(customer("", "", None).full_name(), "ayse");
        assert_eq!(customer("Ayşe", "Kaya", None).full_name(), "Ayşe Kaya");
    }

    #[test]
    fn formatted_address_joins_present_parts() {
        assert_eq!(
            customer("Ayşe", "Kaya", Some("Ortaköy")).formatted_address(),
            "Şht. Mustafa Ruso Cad. 12, Ortaköy, Lefkoşa"
        );
        assert_eq!(
            customer("Ayşe", "Kaya", None).formatted_address(),
            "Şht. Mustafa Ruso Cad. 12, Lefkoşa"
        );
    }
}
