use std::time::Duration;

use axum::{
    extract::State,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::auth::AuthMiddleware;
use crate::error::AppError;
use crate::routes::{admin, login, notify, registrations};
use crate::state::AppState;

/// Build the Axum router: the public registration flow, the email relay,
/// and the JWT-gated admin dashboard API.
pub fn build_router(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route(
            "/registrations",
            get(admin::list).delete(admin::clear_all),
        )
        .route("/registrations/export", get(admin::export_csv))
        .route(
            "/registrations/:id",
            axum::routing::patch(admin::update).delete(admin::delete_one),
        )
        .route(
            "/registrations/:id/refresh-payment",
            post(admin::refresh_payment),
        )
        .route("/stats", get(admin::stats))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            AuthMiddleware::jwt_auth,
        ));

    Router::new()
        // Simple liveness check; also proves DB connectivity.
        .route("/health", get(health))
        .route("/api/registrations", post(registrations::submit))
        .route("/api/registrations/:id", get(registrations::lookup))
        .route(
            "/api/registrations/:id/payment",
            post(registrations::complete_payment),
        )
        .route("/api/committee-members", get(registrations::committee_members))
        .route("/api/send-email", post(notify::send_email))
        .route("/api/admin/login", post(login::login))
        .nest("/api/admin", admin_routes)
        .with_state(state)
        // Useful default middlewares
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(CorsLayer::permissive()) // tighten later
}

/// Liveness + quick DB probe.
async fn health(State(state): State<AppState>) -> Result<&'static str, AppError> {
    infra::db::ping(&state.db).await?;
    Ok("ok")
}
