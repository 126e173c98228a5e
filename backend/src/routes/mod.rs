//! Route definitions for the School Inventory platform
//!
//! Protected groups run `auth_middleware` first, then a page guard naming
//! the page the group belongs to.

use axum::{
    extract::Request,
    middleware::{self, Next},
    routing::{get, post, put},
    Router,
};
use shared::Page;

use crate::{
    handlers,
    middleware::{auth_middleware, require_page},
    AppState,
};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public and protected)
        .nest("/auth", auth_routes(state.clone()))
        // Dashboard (open to pending accounts)
        .nest("/dashboard", dashboard_routes(state.clone()))
        // Protected routes - product catalog
        .nest("/products", product_routes(state.clone()))
        // Protected routes - stock movements
        .nest("/movements", movement_routes(state.clone()))
        // Protected routes - reports
        .nest("/reports", report_routes(state.clone()))
        // Protected routes - user management (administrators)
        .nest("/profiles", profile_routes(state))
}

/// Authentication routes
fn auth_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/sign-up", post(handlers::sign_up))
        .route("/sign-in", post(handlers::sign_in))
        .route("/refresh", post(handlers::refresh))
        // Reads the bearer token itself so it can answer signed-out
        .route("/session", get(handlers::get_session))
        .merge(settings_routes(state))
}

/// Own-account routes (Settings page, open to pending accounts)
fn settings_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/sign-out", post(handlers::sign_out))
        .route("/profile", put(handlers::update_own_profile))
        .route("/password", put(handlers::update_own_password))
        .route_layer(middleware::from_fn(|req: Request, next: Next| {
            require_page(Page::Settings, req, next)
        }))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

fn dashboard_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::get_dashboard))
        .route_layer(middleware::from_fn(|req: Request, next: Next| {
            require_page(Page::Dashboard, req, next)
        }))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Product catalog routes (protected)
fn product_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route(
            "/:product_id",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .route_layer(middleware::from_fn(|req: Request, next: Next| {
            require_page(Page::Products, req, next)
        }))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Stock movement routes (protected)
fn movement_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_movements).post(handlers::record_movement),
        )
        .route_layer(middleware::from_fn(|req: Request, next: Next| {
            require_page(Page::Inventory, req, next)
        }))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Report routes (protected)
fn report_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/stock", get(handlers::get_stock_report))
        .route("/stock.csv", get(handlers::export_stock_csv))
        .route("/categories", get(handlers::get_categories))
        .route("/consumption", get(handlers::get_consumption))
        .route_layer(middleware::from_fn(|req: Request, next: Next| {
            require_page(Page::Reports, req, next)
        }))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// User management routes (protected, administrators only)
fn profile_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_profiles))
        .route("/:profile_id", put(handlers::update_profile))
        .route_layer(middleware::from_fn(|req: Request, next: Next| {
            require_page(Page::Users, req, next)
        }))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
