pub mod assignment_queries;
pub mod category_queries;
pub mod delivery_queries;
pub mod depot_queries;
pub mod location_queries;
pub mod ownership_queries;
pub mod product_queries;
pub mod service_queries;
pub mod user_queries;
