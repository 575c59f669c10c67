//! REST API handlers, grouped by resource.

pub mod config;
pub mod domains;
pub mod health;
pub mod routes;
pub mod settings;

pub use config::{
    configuration_history_handler, deploy_configuration_handler, get_configuration_handler,
    put_configuration_handler, rollback_configuration_handler, validate_configuration_handler,
};
pub use domains::{
    create_domain_handler, delete_domain_handler, get_domain_handler, list_domains_handler,
    update_domain_handler,
};
pub use health::health_handler;
pub use routes::{
    create_route_handler, delete_route_handler, get_route_handler, list_routes_handler,
    update_route_handler,
};
pub use settings::{get_settings_handler, update_settings_handler};
