mod assignments;
mod auth;
mod categories;
mod customers;
mod deliveries;
mod delivery_routes;
mod depots;
mod health;
mod locations;
mod ownerships;
mod products;
mod service_requests;

use axum::{
    Router, middleware,
    routing::{delete, get, patch, post},
};

use crate::{
    AppState,
    middleware::{admin_middleware, auth_middleware, staff_middleware},
};

pub fn create_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/register", post(auth::register_user))
        .route("/login", post(auth::login_user))
        .route("/token/refresh", post(auth::refresh_token))
        .route("/products", get(products::list_products))
        .route("/products/:id", get(products::get_product))
        .route("/categories", get(categories::list_categories))
        .route("/locations/districts", get(locations::list_districts))
        .route("/locations/areas", get(locations::list_areas));

    // Any authenticated user; customer-scoped data is filtered per role
    let authed = Router::new()
        .route("/assignments", get(assignments::list_assignments))
        .route("/assignments/stats", get(assignments::assignment_stats))
        .route("/assignments/:id", get(assignments::get_assignment))
        .route(
            "/product-ownerships/my-ownerships",
            get(ownerships::my_ownerships),
        )
        .route(
            "/service-requests",
            get(service_requests::list_service_requests)
                .post(service_requests::create_service_request),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Admins and sellers
    let staff = Router::new()
        .route("/assignments", post(assignments::create_assignment))
        .route(
            "/assignments/:id",
            patch(assignments::update_assignment).delete(assignments::cancel_assignment),
        )
        .route(
            "/service-requests/:id",
            patch(service_requests::update_service_request),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            staff_middleware,
        ));

    let admin = Router::new()
        .route("/products", post(products::create_product))
        .route(
            "/products/:id",
            patch(products::update_product).delete(products::delete_product),
        )
        .route("/categories", post(categories::create_category))
        .route("/categories/:id", delete(categories::delete_category))
        .route(
            "/deliveries",
            get(deliveries::list_deliveries).post(deliveries::create_delivery),
        )
        .route("/deliveries/stats", get(deliveries::delivery_stats))
        .route(
            "/deliveries/:id",
            get(deliveries::get_delivery)
                .patch(deliveries::update_delivery)
                .delete(deliveries::delete_delivery),
        )
        .route("/delivery-routes/optimize", post(delivery_routes::optimize_route))
        .route(
            "/depots",
            get(depots::list_depots).post(depots::create_depot),
        )
        .route("/depots/default", get(depots::get_default_depot))
        .route(
            "/depots/:id",
            get(depots::get_depot)
                .patch(depots::update_depot)
                .delete(depots::delete_depot),
        )
        .route("/depots/:id/set-default", post(depots::set_default_depot))
        .route("/product-ownerships", post(ownerships::create_ownership))
        .route("/customers", get(customers::list_customers))
        .route(
            "/customers/:id",
            get(customers::get_customer).patch(customers::update_customer),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            admin_middleware,
        ));

    Router::new()
        .nest("/api/v1", public.merge(authed).merge(staff).merge(admin))
        .with_state(state)
}
