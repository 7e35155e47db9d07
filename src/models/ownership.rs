use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::ProductListing;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProductOwnership {
    pub id: i32,
    pub customer_id: i32,
    pub product_id: i32,
    pub purchase_date: NaiveDate,
    pub serial_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Warranty state derived from the purchase date and the product's warranty
/// duration. Computed at read time, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WarrantyState {
    pub warranty_end_date: Option<NaiveDate>,
    pub is_warranty_active: bool,
    pub days_until_warranty_expires: Option<i64>,
}

pub fn derive_warranty(
    purchase_date: NaiveDate,
    warranty_duration_months: i32,
    today: NaiveDate,
) -> WarrantyState {
    let end_date = u32::try_from(warranty_duration_months)
        .ok()
        .and_then(|months| purchase_date.checked_add_months(Months::new(months)));

    match end_date {
        Some(end) => {
            let active = today <= end;
            WarrantyState {
                warranty_end_date: Some(end),
                is_warranty_active: active,
                days_until_warranty_expires: active.then(|| (end - today).num_days()),
            }
        }
        None => WarrantyState {
            warranty_end_date: None,
            is_warranty_active: false,
            days_until_warranty_expires: None,
        },
    }
}

/// Ownership row joined with its product and open service-request count.
/// The row id is aliased so the flattened product can keep its own `id`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OwnershipListing {
    #[sqlx(rename = "ownership_id")]
    pub id: i32,
    pub customer_id: i32,
    pub purchase_date: NaiveDate,
    pub serial_number: Option<String>,
    pub active_service_requests: i64,
    #[sqlx(flatten)]
    pub product: ProductListing,
}

#[derive(Debug, Serialize)]
pub struct OwnershipResponse {
    pub id: i32,
    pub product: ProductListing,
    pub purchase_date: NaiveDate,
    pub serial_number: Option<String>,
    pub warranty_end_date: Option<NaiveDate>,
    pub is_warranty_active: bool,
    pub days_until_warranty_expires: Option<i64>,
    pub active_service_requests: i64,
}

impl OwnershipResponse {
    pub fn from_listing(listing: OwnershipListing, today: NaiveDate) -> Self {
        let warranty = derive_warranty(
            listing.purchase_date,
            listing.product.warranty_duration_months,
            today,
        );
        Self {
            id: listing.id,
            purchase_date: listing.purchase_date,
            serial_number: listing.serial_number,
            warranty_end_date: warranty.warranty_end_date,
            is_warranty_active: warranty.is_warranty_active,
            days_until_warranty_expires: warranty.days_until_warranty_expires,
            active_service_requests: listing.active_service_requests,
            product: listing.product,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateOwnershipRequest {
    pub customer_id: i32,
    pub product_id: i32,
    pub purchase_date: NaiveDate,
    pub serial_number: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn warranty_end_is_purchase_plus_duration() {
        let state = derive_warranty(date(2025, 6, 1), 24, date(2025, 6, 1));
        assert_eq!(state.warranty_end_date, Some(date(2027, 6, 1)));
        assert!(state.is_warranty_active);
        assert_eq!(state.days_until_warranty_expires, Some(730));
    }

    #[test]
    fn expired_warranty_has_no_days_remaining() {
        let state = derive_warranty(date(2020, 1, 15), 12, date(2025, 6, 1));
        assert_eq!(state.warranty_end_date, Some(date(2021, 1, 15)));
        assert!(!state.is_warranty_active);
        assert_eq!(state.days_until_warranty_expires, None);
    }

    #[test]
    fn warranty_active_on_its_last_day() {
        let end = date(2026, 3, 10);
        let state = derive_warranty(date(2024, 3, 10), 24, end);
        assert!(state.is_warranty_active);
        assert_eq!(state.days_until_warranty_expires, Some(0));
    }

    #[test]
    fn month_arithmetic_clamps_to_month_end() {
        // Jan 31 + 1 month lands on Feb 28/29, not an invalid date
        let state = derive_warranty(date(2025, 1, 31), 1, date(2025, 2, 1));
        assert_eq!(state.warranty_end_date, Some(date(2025, 2, 28)));
    }
}
