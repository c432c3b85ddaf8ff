//! Route definitions for the LoomTrack platform

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Raw whole-collection storage contract
        .nest("/data", data_routes())
        // Roll entry and lifecycle operations
        .nest("/rolls", roll_routes())
        // Work-order management
        .nest("/work-orders", work_order_routes())
        // Reports and exports
        .nest("/reports", report_routes())
        // Snapshot undo
        .route("/undo", post(handlers::undo))
}

/// Whole-collection get/replace endpoints
fn data_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/rolls",
            get(handlers::get_rolls).post(handlers::replace_rolls),
        )
        .route(
            "/work-orders",
            get(handlers::get_work_orders).post(handlers::replace_work_orders),
        )
}

/// Roll entry and lifecycle routes
fn roll_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_rolls).post(handlers::create_roll))
        .route("/bags", get(handlers::bags_produced))
        .route("/import", post(handlers::import_rolls))
        .route("/send-for-lamination", post(handlers::send_for_lamination))
        .route("/receive", post(handlers::mark_received))
        .route("/collaborate", post(handlers::collaborate))
        .route("/send-for-work-order", post(handlers::send_for_work_order))
        .route("/consume", post(handlers::mark_consumed))
        .route("/:roll_id/partial-consume", post(handlers::partial_consume))
}

/// Work-order routes
fn work_order_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_work_orders).post(handlers::create_work_order),
        )
        .route(
            "/:work_order_id/children/:pid/toggle",
            post(handlers::toggle_child_completion),
        )
        .route("/:work_order_id/consume", post(handlers::consume_work_order))
}

/// Report routes
fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/summary", post(handlers::generate_summary))
        .route("/export", get(handlers::export_csv))
        .route("/dispatch-note", post(handlers::dispatch_note))
}
