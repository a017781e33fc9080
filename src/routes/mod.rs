pub mod admin;
pub mod auth;
pub mod catalogo;
pub mod consultas;
pub mod health;
pub mod lookups;
pub mod propiedades;

use actix_web::web;

use crate::errors::ApiError;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    // Corps JSON / query invalides -> même format que les autres erreurs
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| ApiError::field("body", err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| ApiError::field("query", err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| ApiError::field("path", err.to_string()).into()),
    );

    cfg.service(
        web::scope("/api")
            .service(health::health_check)
            .configure(auth::auth_routes)
            .configure(admin::admin_routes)
            .configure(lookups::lookup_routes)
            .configure(propiedades::propiedad_routes)
            .configure(catalogo::catalogo_routes)
            .configure(consultas::consulta_routes),
    );
}
