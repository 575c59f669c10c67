use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::ControlPlane;

use super::handlers::{
    configuration_history_handler, create_domain_handler, create_route_handler,
    delete_domain_handler, delete_route_handler, deploy_configuration_handler,
    get_configuration_handler, get_domain_handler, get_route_handler, get_settings_handler,
    health_handler, list_domains_handler, list_routes_handler, put_configuration_handler,
    rollback_configuration_handler, update_domain_handler, update_route_handler,
    update_settings_handler, validate_configuration_handler,
};

#[derive(Clone)]
pub struct ApiState {
    pub control: Arc<ControlPlane>,
}

pub fn build_router(control: Arc<ControlPlane>) -> Router {
    let state = ApiState { control };

    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/v1/configuration",
            get(get_configuration_handler).put(put_configuration_handler),
        )
        .route("/api/v1/configuration/validate", post(validate_configuration_handler))
        .route("/api/v1/configuration/deploy", post(deploy_configuration_handler))
        .route("/api/v1/configuration/rollback", post(rollback_configuration_handler))
        .route("/api/v1/configuration/history", get(configuration_history_handler))
        .route("/api/v1/domains", get(list_domains_handler).post(create_domain_handler))
        .route(
            "/api/v1/domains/{domain}",
            get(get_domain_handler).put(update_domain_handler).delete(delete_domain_handler),
        )
        .route(
            "/api/v1/domains/{domain}/routes",
            get(list_routes_handler).post(create_route_handler),
        )
        .route(
            "/api/v1/domains/{domain}/routes/{path}",
            get(get_route_handler).put(update_route_handler).delete(delete_route_handler),
        )
        .route("/api/v1/settings", get(get_settings_handler).put(update_settings_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
