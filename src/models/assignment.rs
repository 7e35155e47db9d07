use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{CustomerResponse, DeliveryStatus, ProductListing};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "assignment_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentStatus {
    Planned,
    Scheduled,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl AssignmentStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Allowed edges of the assignment lifecycle. Terminal states have no
    /// outgoing edges; any non-terminal state may be cancelled.
    pub fn can_transition_to(self, next: Self) -> bool {
        if self == next {
            return false;
        }
        match (self, next) {
            (Self::Planned, Self::Scheduled) => true,
            (Self::Scheduled, Self::OutForDelivery) => true,
            (Self::OutForDelivery, Self::Delivered) => true,
            (from, Self::Cancelled) => !from.is_terminal(),
            _ => false,
        }
    }

    pub fn display_tr(self) -> &'static str {
        match self {
            Self::Planned => "Planlandı",
            Self::Scheduled => "Tarihlendi",
            Self::OutForDelivery => "Dağıtımda",
            Self::Delivered => "Teslim Edildi",
            Self::Cancelled => "İptal Edildi",
        }
    }
}

/// Reconciles the known data gap where an assignment still reads `PLANNED`
/// although a delivery record already exists for it. Readers treat such an
/// assignment as `SCHEDULED`.
pub fn effective_status(status: AssignmentStatus, has_delivery: bool) -> AssignmentStatus {
    if status == AssignmentStatus::Planned && has_delivery {
        AssignmentStatus::Scheduled
    } else {
        status
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProductAssignment {
    pub id: i32,
    pub customer_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub status: AssignmentStatus,
    pub notes: Option<String>,
    pub assigned_by: Option<i32>,
    pub assigned_at: DateTime<Utc>,
}

/// Delivery fields embedded in assignment responses.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DeliveryInfo {
    pub id: i32,
    pub status: DeliveryStatus,
    pub scheduled_date: NaiveDate,
    pub address: String,
}

#[derive(Debug, Serialize)]
pub struct AssignmentResponse {
    pub id: i32,
    pub customer: CustomerResponse,
    pub product: ProductListing,
    pub quantity: i32,
    pub status: AssignmentStatus,
    pub effective_status: AssignmentStatus,
    pub status_display: &'static str,
    pub notes: Option<String>,
    pub assigned_by: Option<i32>,
    pub assigned_at: DateTime<Utc>,
    pub delivery_info: Option<DeliveryInfo>,
}

#[derive(Debug, Deserialize)]
pub struct CreateAssignmentRequest {
    pub customer_id: i32,
    pub product_id: i32,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
    pub notes: Option<String>,
}

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct UpdateAssignmentRequest {
    pub status: Option<AssignmentStatus>,
    pub quantity: Option<i32>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AssignmentQuery {
    pub search: Option<String>,
    pub status: Option<AssignmentStatus>,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct AssignmentStats {
    pub planned: i64,
    pub scheduled: i64,
    pub out_for_delivery: i64,
    pub delivered: i64,
}

#[cfg(test)]
mod tests {
    use super::AssignmentStatus::*;
    use super::*;

    #[test]
    fn lifecycle_follows_the_directed_graph() {
        assert!(Planned.can_transition_to(Scheduled));
        assert!(Scheduled.can_transition_to(OutForDelivery));
        assert!(OutForDelivery.can_transition_to(Delivered));

        assert!(!Planned.can_transition_to(OutForDelivery));
        assert!(!Planned.can_transition_to(Delivered));
        assert!(!Scheduled.can_transition_to(Delivered));
        assert!(!Scheduled.can_transition_to(Planned));
    }

    #[test]
    fn any_non_terminal_state_can_be_cancelled() {
        assert!(Planned.can_transition_to(Cancelled));
        assert!(Scheduled.can_transition_to(Cancelled));
        assert!(OutForDelivery.can_transition_to(Cancelled));
    }

    #[test]
    fn no_transition_leaves_a_terminal_state() {
        for next in [Planned, Scheduled, OutForDelivery, Delivered, Cancelled] {
            assert!(!Delivered.can_transition_to(next));
            assert!(!Cancelled.can_transition_to(next));
        }
    }

    #[test]
    fn planned_with_delivery_reads_as_scheduled() {
        assert_eq!(effective_status(Planned, true), Scheduled);
        assert_eq!(effective_status(Planned, false), Planned);
        assert_eq!(effective_status(Delivered, true), Delivered);
        assert_eq!(effective_status(Cancelled, false), Cancelled);
    }
}
