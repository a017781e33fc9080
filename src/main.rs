mod config;
mod db;
mod errors;
mod middleware;
mod migration;
mod models;
mod routes;
mod services;
mod telemetry;
mod utils;

#[cfg(test)]
mod test_support;

use std::io;
use std::sync::Arc;

use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};

use config::{AppConfig, AppEnvironment};
use middleware::{JwtSessionResolver, SessionResolver};
use services::notifier::{LogNotifier, MailApiNotifier, Notifier};

#[actix_web::main]
async fn main() -> io::Result<()> {
    // 1. Configuration + logs
    let config = AppConfig::load().map_err(io::Error::other)?;
    telemetry::init(&config.log_level).map_err(io::Error::other)?;

    if config.auth.uses_default_secret() {
        tracing::warn!("JWT_SECRET not set, using the insecure development default");
    }

    // 2. Base de données
    tracing::info!("connecting to database");
    let db = db::establish_connection(&config.database_url)
        .await
        .map_err(io::Error::other)?;
    tracing::info!("database connected, migrations applied");

    // 3. Capacités injectées
    let notifier: Arc<dyn Notifier> = match config.mail.clone() {
        Some(mail) => Arc::new(MailApiNotifier::new(mail)),
        None => {
            tracing::warn!("MAIL_API_KEY / MAIL_SENDER_EMAIL not set, emails will not be delivered");
            Arc::new(LogNotifier::new(config.environment == AppEnvironment::Development))
        }
    };
    let resolver: Arc<dyn SessionResolver> =
        Arc::new(JwtSessionResolver::new(config.auth.jwt_secret.clone()));

    let db = web::Data::new(db);
    let notifier = web::Data::from(notifier);
    let resolver = web::Data::from(resolver);
    let bind = (config.server.host.clone(), config.server.port);
    let config = web::Data::new(config);

    tracing::info!("starting server on http://{}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(db.clone())
            .app_data(config.clone())
            .app_data(notifier.clone())
            .app_data(resolver.clone())
            .configure(routes::configure_routes)
    })
    .bind(bind)?
    .run()
    .await
}
