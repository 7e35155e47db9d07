use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "service_request_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ServiceRequestType {
    Repair,
    Maintenance,
    Warranty,
    Complaint,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "service_request_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ServiceRequestStatus {
    Pending,
    InQueue,
    InProgress,
    Completed,
    Cancelled,
}

impl ServiceRequestStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    pub fn can_transition_to(self, next: Self) -> bool {
        if self == next {
            return false;
        }
        match (self, next) {
            (Self::Pending, Self::InQueue) => true,
            (Self::InQueue, Self::InProgress) => true,
            (Self::InProgress, Self::Completed) => true,
            (from, Self::Cancelled) => !from.is_terminal(),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ServiceRequest {
    pub id: i32,
    pub customer_id: i32,
    pub ownership_id: i32,
    pub request_type: ServiceRequestType,
    pub status: ServiceRequestStatus,
    pub description: String,
    pub assigned_to: Option<i32>,
    pub resolution_notes: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request row joined with customer/product names and, while the request
/// is queued, its queue position and wait estimate.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ServiceRequestListing {
    pub id: i32,
    pub customer_id: i32,
    pub customer_name: String,
    pub ownership_id: i32,
    pub product_name: String,
    pub request_type: ServiceRequestType,
    pub status: ServiceRequestStatus,
    pub description: String,
    pub assigned_to: Option<i32>,
    pub resolution_notes: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub queue_number: Option<i32>,
    pub priority: Option<i32>,
    pub estimated_wait_time: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct CreateServiceRequestRequest {
    pub ownership_id: i32,
    #[serde(default = "default_request_type")]
    pub request_type: ServiceRequestType,
    pub description: String,
}

fn default_request_type() -> ServiceRequestType {
    ServiceRequestType::Repair
}

#[derive(Debug, Deserialize)]
pub struct UpdateServiceRequestRequest {
    pub status: Option<ServiceRequestStatus>,
    pub assigned_to: Option<i32>,
    pub resolution_notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::ServiceRequestStatus::*;
    use super::*;

    #[test]
    fn listing_carries_the_queue_fields() {
        let listing = ServiceRequestListing {
            id: 1,
            customer_id: 7,
            customer_name: "ayse".to_string(),
            ownership_id: 3,
            product_name: "Buzdolabı".to_string(),
            request_type: ServiceRequestType::Repair,
            status: InQueue,
            description: "Kapı contası yıpranmış".to_string(),
            assigned_to: None,
            resolution_notes: None,
            resolved_at: None,
            created_at: Utc::now(),
            queue_number: Some(4),
            priority: Some(5),
            estimated_wait_time: Some(90),
        };

        let json = serde_json::to_value(&listing).unwrap();
        assert_eq!(json["queue_number"], 4);
        assert_eq!(json["priority"], 5);
        assert_eq!(json["estimated_wait_time"], 90);
        assert_eq!(json["status"], "in_queue");
    }

    #[test]
    fn queue_flow_is_linear() {
        assert!(Pending.can_transition_to(InQueue));
        assert!(InQueue.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Completed));
        assert!(!Pending.can_transition_to(InProgress));
        assert!(!InQueue.can_transition_to(Completed));
    }

    #[test]
    fn completed_and_cancelled_are_final() {
        for next in [Pending, InQueue, InProgress, Completed, Cancelled] {
            assert!(!Completed.can_transition_to(next));
            assert!(!Cancelled.can_transition_to(next));
        }
        assert!(InProgress.can_transition_to(Cancelled));
    }
}
