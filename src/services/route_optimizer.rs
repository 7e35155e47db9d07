//! Nearest-neighbor route planning for delivery batches.
//!
//! Distances are great-circle (haversine) kilometers. ETAs assume a fixed
//! average speed and a fixed service time per stop, accumulated along the
//! route from the depot.

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{AppError, Result};

const EARTH_RADIUS_KM: f64 = 6371.0;
const AVG_SPEED_KMH: f64 = 40.0;
const SERVICE_TIME_MINUTES: f64 = 10.0;

/// Great-circle distance between two points, rounded to 0.01 km.
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlng = (lng2 - lng1).to_radians();

    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    round_km(EARTH_RADIUS_KM * c)
}

fn round_km(km: f64) -> f64 {
    (km * 100.0).round() / 100.0
}

/// A delivery awaiting routing.
#[derive(Debug, Clone)]
pub struct Stop {
    pub id: i32,
    pub lat: f64,
    pub lng: f64,
    pub customer_name: String,
    pub product_name: String,
}

/// A routed delivery: position in the visiting sequence, leg distance from
/// the previous stop, and cumulative ETA from the depot.
#[derive(Debug, Clone, Serialize)]
pub struct OptimizedStop {
    pub id: i32,
    pub lat: f64,
    pub lng: f64,
    pub customer_name: String,
    pub product_name: String,
    pub order: i32,
    pub distance_from_previous_km: f64,
    pub eta_minutes: i32,
}

#[derive(Debug)]
pub struct OptimizedRoute {
    pub stops: Vec<OptimizedStop>,
    pub total_km: f64,
    pub batch_id: String,
    pub algorithm: String,
}

pub struct RouteOptimizer {
    depot_lat: f64,
    depot_lng: f64,
}

impl RouteOptimizer {
    pub fn new(depot_lat: f64, depot_lng: f64) -> Self {
        Self {
            depot_lat,
            depot_lng,
        }
    }

    pub fn optimize(&self, stops: Vec<Stop>, algorithm: &str) -> Result<OptimizedRoute> {
        let (stops, total_km) = match algorithm {
            "nearest_neighbor" => self.nearest_neighbor(stops),
            other => {
                return Err(AppError::BadRequest(format!(
                    "Bilinmeyen algoritma: {}",
                    other
                )));
            }
        };

        Ok(OptimizedRoute {
            stops,
            total_km,
            batch_id: new_batch_id(),
            algorithm: "nearest_neighbor".to_string(),
        })
    }

    /// Greedy nearest-neighbor tour starting at the depot. Each iteration
    /// visits the closest unvisited stop.
    fn nearest_neighbor(&self, mut unvisited: Vec<Stop>) -> (Vec<OptimizedStop>, f64) {
        let mut route = Vec::with_capacity(unvisited.len());
        let mut current = (self.depot_lat, self.depot_lng);
        let mut total_km = 0.0;
        let mut elapsed_minutes = 0.0;

        while !unvisited.is_empty() {
            let Some((idx, leg_km)) = unvisited
                .iter()
                .enumerate()
                .map(|(i, stop)| (i, haversine_km(current.0, current.1, stop.lat, stop.lng)))
                .min_by(|a, b| a.1.total_cmp(&b.1))
            else {
                break;
            };

            let stop = unvisited.swap_remove(idx);
            total_km += leg_km;
            elapsed_minutes += leg_km / AVG_SPEED_KMH * 60.0 + SERVICE_TIME_MINUTES;
            current = (stop.lat, stop.lng);

            route.push(OptimizedStop {
                order: route.len() as i32 + 1,
                distance_from_previous_km: leg_km,
                eta_minutes: elapsed_minutes.round() as i32,
                id: stop.id,
                lat: stop.lat,
                lng: stop.lng,
                customer_name: stop.customer_name,
                product_name: stop.product_name,
            });
        }

        (route, round_km(total_km))
    }
}

fn new_batch_id() -> String {
    format!(
        "ROUTE-{}-{}",
        Utc::now().format("%Y%m%d-%H%M%S"),
        &Uuid::new_v4().simple().to_string()[..6]
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(id: i32, lat: f64, lng: f64) -> Stop {
        Stop {
            id,
            lat,
            lng,
            customer_name: format!("customer-{}", id),
            product_name: "Buzdolabı".to_string(),
        }
    }

    // Lefkoşa depot, per the seeded district centers
    const DEPOT: (f64, f64) = (35.1856, 33.3823);

    #[test]
    fn haversine_known_distance() {
        // Lefkoşa to Girne is roughly 17 km as the crow flies
        let km = haversine_km(35.1856, 33.3823, 35.3364, 33.3182);
        assert!((km - 17.8).abs() < 0.5, "got {}", km);
    }

    #[test]
    fn haversine_zero_for_same_point() {
        assert_eq!(haversine_km(35.0, 33.0, 35.0, 33.0), 0.0);
    }

    #[test]
    fn empty_input_yields_empty_route() {
        let optimizer = RouteOptimizer::new(DEPOT.0, DEPOT.1);
        let route = optimizer.optimize(vec![], "nearest_neighbor").unwrap();
        assert!(route.stops.is_empty());
        assert_eq!(route.total_km, 0.0);
    }

    #[test]
    fn unknown_algorithm_is_rejected() {
        let optimizer = RouteOptimizer::new(DEPOT.0, DEPOT.1);
        assert!(optimizer.optimize(vec![], "simulated_annealing").is_err());
    }

    #[test]
    fn orders_are_a_permutation_and_total_matches_legs() {
        let optimizer = RouteOptimizer::new(DEPOT.0, DEPOT.1);
        let stops = vec![
            stop(1, 35.3364, 33.3182),
            stop(2, 35.1264, 33.9391),
            stop(3, 35.1986, 32.9931),
        ];
        let route = optimizer.optimize(stops, "nearest_neighbor").unwrap();

        assert_eq!(route.stops.len(), 3);
        let mut orders: Vec<i32> = route.stops.iter().map(|s| s.order).collect();
        orders.sort_unstable();
        assert_eq!(orders, vec![1, 2, 3]);

        let leg_sum: f64 = route
            .stops
            .iter()
            .map(|s| s.distance_from_previous_km)
            .sum();
        assert!((route.total_km - leg_sum).abs() <= 0.01);
    }

    #[test]
    fn visits_nearest_stop_first() {
        let optimizer = RouteOptimizer::new(DEPOT.0, DEPOT.1);
        // Stop 2 sits right next to the depot, stop 1 far east
        let stops = vec![stop(1, 35.13, 33.94), stop(2, 35.19, 33.39)];
        let route = optimizer.optimize(stops, "nearest_neighbor").unwrap();
        assert_eq!(route.stops[0].id, 2);
        assert_eq!(route.stops[1].id, 1);
    }

    #[test]
    fn eta_is_cumulative_and_non_negative() {
        let optimizer = RouteOptimizer::new(DEPOT.0, DEPOT.1);
        let stops = vec![
            stop(1, 35.3364, 33.3182),
            stop(2, 35.1264, 33.9391),
            stop(3, 35.1986, 32.9931),
        ];
        let route = optimizer.optimize(stops, "nearest_neighbor").unwrap();

        let mut prev = 0;
        for s in &route.stops {
            // Each leg adds at least the 10 minute service time
            assert!(s.eta_minutes >= prev + 10);
            prev = s.eta_minutes;
        }
    }

    #[test]
    fn batch_ids_carry_the_route_prefix() {
        let id = new_batch_id();
        assert!(id.starts_with("ROUTE-"));
        assert_eq!(id.len(), "ROUTE-20250101-000000-abcdef".len());
    }
}
