pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod gate;
pub mod handlers;
pub mod infrastructure;
pub mod media;
pub mod openapi;
pub mod readiness;
pub mod schema;
pub mod session;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

use actix_web::middleware::{from_fn, Logger};
use actix_web::{web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::domain::errors::DomainError;
use crate::handlers::{account, admin, catalog, delivery, health, location, orders, vendor};

pub use config::AppConfig;
pub use db::{create_pool, DbPool};
pub use state::AppState;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), DomainError> {
    let mut conn = pool.get()?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| DomainError::Internal(format!("migrations failed: {e}")))?;
    log::info!("{} migration(s) applied", applied.len());
    Ok(())
}

/// Every route of the service. Customer, vendor, admin and delivery scopes sit behind
/// their session gates; `max_image_bytes` sizes the upload body limits.
pub fn routes(cfg: &mut web::ServiceConfig, max_image_bytes: usize) {
    let raw_upload_limit = max_image_bytes.saturating_mul(2);
    // Hex doubles every byte, plus room for the JSON envelope.
    let batch_limit = max_image_bytes
        .saturating_mul(2 * vendor::MAX_BATCH_FILES)
        .saturating_add(64 * 1024);

    cfg.route("/healthz", web::get().to(health::healthz))
        .route("/readyz", web::get().to(health::readyz))
        .service(
            web::resource("/location")
                .route(web::get().to(location::get_location))
                .route(web::put().to(location::set_location)),
        )
        .route("/products", web::get().to(catalog::list_products))
        .route("/products/{id}", web::get().to(catalog::get_product))
        .route("/categories", web::get().to(catalog::list_categories))
        .route(
            "/categories/{category}/products",
            web::get().to(catalog::list_category_products),
        )
        .route("/stores", web::get().to(catalog::list_stores))
        .service(
            web::scope("/account")
                .wrap(from_fn(gate::customer_gate))
                .route("/login", web::post().to(account::login))
                .route("/register", web::post().to(account::register))
                .route("/logout", web::post().to(account::logout)),
        )
        .service(
            web::scope("/checkout")
                .wrap(from_fn(gate::customer_gate))
                .route("", web::post().to(orders::checkout))
                .route("/success", web::get().to(orders::checkout_success)),
        )
        .service(
            web::scope("/orders")
                .wrap(from_fn(gate::customer_gate))
                .route("", web::get().to(orders::list_customer_orders))
                .route("/{id}", web::get().to(orders::get_order))
                .route("/{id}/cancel", web::post().to(orders::cancel_order)),
        )
        .service(
            web::scope("/vendor")
                .wrap(from_fn(gate::vendor_gate))
                .service(
                    web::resource("/login")
                        .route(web::get().to(vendor::login_page))
                        .route(web::post().to(vendor::login)),
                )
                .route("/register", web::post().to(vendor::register))
                .route("/logout", web::post().to(vendor::logout))
                .route("/status", web::get().to(vendor::status))
                .route("/dashboard", web::get().to(vendor::dashboard))
                .service(
                    web::resource("/profile")
                        .route(web::get().to(vendor::get_profile))
                        .route(web::put().to(vendor::update_profile)),
                )
                .service(
                    web::resource("/products")
                        .route(web::get().to(vendor::list_products))
                        .route(web::post().to(vendor::create_product)),
                )
                .service(
                    web::resource("/products/{id}")
                        .route(web::get().to(vendor::get_product))
                        .route(web::put().to(vendor::update_product))
                        .route(web::delete().to(vendor::delete_product)),
                )
                .service(
                    web::resource("/images/batch")
                        .app_data(web::JsonConfig::default().limit(batch_limit))
                        .route(web::post().to(vendor::upload_images)),
                )
                .service(
                    web::resource("/images")
                        .app_data(web::PayloadConfig::new(raw_upload_limit))
                        .route(web::post().to(vendor::upload_image))
                        .route(web::delete().to(vendor::delete_image)),
                )
                .route("/orders", web::get().to(vendor::list_orders))
                .route("/orders/{id}", web::get().to(vendor::get_order))
                .route("/orders/{id}/advance", web::post().to(vendor::advance_order))
                .route("/orders/{id}/cancel", web::post().to(vendor::cancel_order)),
        )
        .service(
            web::scope("/admin")
                .wrap(from_fn(gate::admin_gate))
                .route("/login", web::post().to(admin::login))
                .route("/logout", web::post().to(admin::logout))
                .route("/vendors", web::get().to(admin::list_vendors))
                .route("/vendors/{id}/status", web::put().to(admin::set_vendor_status))
                .route("/orders", web::get().to(admin::list_orders)),
        )
        .service(
            web::scope("/delivery")
                .wrap(from_fn(gate::delivery_gate))
                .route("/login", web::post().to(delivery::login))
                .route("/logout", web::post().to(delivery::logout))
                .route("/orders", web::get().to(delivery::queue))
                .route("/orders/{id}/assign", web::post().to(delivery::assign))
                .route("/orders/{id}/delivered", web::post().to(delivery::deliver)),
        );
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    state: AppState,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let max_image_bytes = state.uploader.limits().max_bytes;
    let data = web::Data::new(state);
    let api = openapi::ApiDoc::openapi();
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .wrap(Logger::default())
            .configure(|cfg| routes(cfg, max_image_bytes))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", api.clone()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
