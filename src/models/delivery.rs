use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "delivery_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryStatus {
    Waiting,
    OutForDelivery,
    Delivered,
    Failed,
}

impl DeliveryStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Failed)
    }

    pub fn can_transition_to(self, next: Self) -> bool {
        if self == next {
            return false;
        }
        match (self, next) {
            (Self::Waiting, Self::OutForDelivery) => true,
            // Manual completion straight from WAITING is allowed for
            // deliveries that never went through an optimizer run.
            (Self::Waiting, Self::Delivered | Self::Failed) => true,
            (Self::OutForDelivery, Self::Delivered | Self::Failed) => true,
            _ => false,
        }
    }

    pub fn display_tr(self) -> &'static str {
        match self {
            Self::Waiting => "Bekliyor",
            Self::OutForDelivery => "Dağıtımda",
            Self::Delivered => "Teslim Edildi",
            Self::Failed => "Başarısız",
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Delivery {
    pub id: i32,
    pub assignment_id: i32,
    pub scheduled_date: NaiveDate,
    pub status: DeliveryStatus,
    pub address: String,
    pub address_lat: Option<f64>,
    pub address_lng: Option<f64>,
    pub delivery_order: Option<i32>,
    pub distance_km: Option<f64>,
    pub eta_minutes: Option<i32>,
    pub route_batch_id: Option<String>,
    pub depot_id: Option<i32>,
    pub customer_phone_snapshot: String,
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Delivery joined with customer/product names, the shape list endpoints
/// return. Names are resolved at read time, not snapshotted.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DeliveryListing {
    pub id: i32,
    pub assignment_id: i32,
    pub customer_name: String,
    pub product_name: String,
    pub scheduled_date: NaiveDate,
    pub status: DeliveryStatus,
    pub address: String,
    pub address_lat: Option<f64>,
    pub address_lng: Option<f64>,
    pub delivery_order: Option<i32>,
    pub distance_km: Option<f64>,
    pub eta_minutes: Option<i32>,
    pub route_batch_id: Option<String>,
    pub depot_id: Option<i32>,
    pub customer_phone_snapshot: String,
    pub delivered_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct CreateDeliveryRequest {
    pub assignment_id: i32,
    pub scheduled_date: NaiveDate,
    pub address: Option<String>,
    pub address_lat: Option<f64>,
    pub address_lng: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateDeliveryRequest {
    pub status: Option<DeliveryStatus>,
    pub scheduled_date: Option<NaiveDate>,
    pub address: Option<String>,
    pub address_lat: Option<f64>,
    pub address_lng: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct DeliveryQuery {
    pub date: Option<NaiveDate>,
    pub status: Option<DeliveryStatus>,
}

#[derive(Debug, Deserialize)]
pub struct DeliveryStatsQuery {
    pub date: Option<NaiveDate>,
    pub depot_id: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct DeliveryStats {
    pub waiting_count: i64,
    pub delivered_last_10_days_count: i64,
    pub scheduled_for_selected_date_count: i64,
}

// Route optimization request/response

#[derive(Debug, Deserialize)]
pub struct OptimizeRouteRequest {
    pub date: NaiveDate,
    #[serde(default)]
    pub delivery_ids: Vec<i32>,
    pub depot_id: Option<i32>,
    pub algorithm: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DepotSummary {
    pub id: i32,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Serialize)]
pub struct OptimizeRouteResponse {
    pub success: bool,
    pub batch_id: String,
    pub total_km: f64,
    pub algorithm: String,
    pub depot: DepotSummary,
    pub optimized_deliveries: Vec<crate::services::route_optimizer::OptimizedStop>,
    pub delivery_count: usize,
}

#[cfg(test)]
mod tests {
    use super::DeliveryStatus::*;

    #[test]
    fn sub_machine_edges() {
        assert!(Waiting.can_transition_to(OutForDelivery));
        assert!(Waiting.can_transition_to(Delivered));
        assert!(Waiting.can_transition_to(Failed));
        assert!(OutForDelivery.can_transition_to(Delivered));
        assert!(OutForDelivery.can_transition_to(Failed));
        assert!(!OutForDelivery.can_transition_to(Waiting));
    }

    #[test]
    fn delivered_and_failed_are_terminal() {
        assert!(Delivered.is_terminal());
        assert!(Failed.is_terminal());
        assert!(!Waiting.is_terminal());
        assert!(!OutForDelivery.is_terminal());

        for next in [Waiting, OutForDelivery, Delivered, Failed] {
            assert!(!Delivered.can_transition_to(next));
            assert!(!Failed.can_transition_to(next));
        }
    }
}
