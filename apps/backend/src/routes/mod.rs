use actix_web::web;

pub mod health;

/// Register every application route.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.configure(health::configure_routes);
}
