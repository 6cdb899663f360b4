use std::sync::Arc;

use crate::application::catalog_service::CatalogService;
use crate::application::order_service::OrderService;
use crate::application::product_service::ProductService;
use crate::application::staff::StaffDirectory;
use crate::application::vendor_service::VendorService;
use crate::config::{AppConfig, ConfigError};
use crate::db::DbPool;
use crate::domain::pincode::Pincode;
use crate::domain::ports::{IdentityProvider, OrderRepository, ProductRepository, VendorRepository};
use crate::infrastructure::{
    CloudinaryHost, DieselOrderRepository, DieselProductRepository, DieselVendorRepository,
    RestIdentityProvider,
};
use crate::media::{ImageHost, ImageUploader, RetryPolicy};
use crate::readiness::Readiness;
use crate::session::SessionKeys;

/// Everything a request handler can reach. Built once and shared through
/// `web::Data`.
#[derive(Clone)]
pub struct AppState {
    pub catalog: CatalogService,
    pub products: ProductService,
    pub vendors: VendorService,
    pub orders: OrderService,
    pub staff: StaffDirectory,
    pub identity: Arc<dyn IdentityProvider>,
    pub uploader: ImageUploader,
    pub sessions: SessionKeys,
    pub default_pincode: Pincode,
    /// Email and password of the test-mode vendor login; `None` in production.
    pub test_login: Option<(String, String)>,
    pub readiness: Readiness,
}

/// The ports an `AppState` is assembled from.
pub struct Ports {
    pub products: Arc<dyn ProductRepository>,
    pub vendors: Arc<dyn VendorRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub identity: Arc<dyn IdentityProvider>,
    pub images: Arc<dyn ImageHost>,
}

impl AppState {
    pub fn assemble(config: &AppConfig, ports: Ports) -> Result<Self, ConfigError> {
        let sessions = SessionKeys::new(
            &config.session.secret,
            config.session.days,
            config.session.secure,
        )?;
        let policy = RetryPolicy::fixed(config.upload_max_attempts, config.upload_retry_delay);
        Ok(Self {
            catalog: CatalogService::new(ports.products.clone(), ports.vendors.clone()),
            products: ProductService::new(
                ports.products.clone(),
                ports.vendors.clone(),
                config.upload.folder.clone(),
            ),
            vendors: VendorService::new(ports.vendors.clone()),
            orders: OrderService::new(ports.orders, ports.products, ports.vendors),
            staff: StaffDirectory::new(
                config.admin_uids.iter().cloned(),
                config.delivery_uids.iter().cloned(),
            ),
            identity: ports.identity,
            uploader: ImageUploader::new(ports.images, policy, config.upload.clone()),
            sessions,
            default_pincode: config.default_pincode.clone(),
            test_login: config.session.test_login.clone(),
            readiness: Readiness::new(),
        })
    }

    /// Production wiring: diesel repositories plus the REST clients.
    pub fn from_config(config: &AppConfig, pool: DbPool) -> Result<Self, ConfigError> {
        let identity = RestIdentityProvider::new(
            &config.identity_api_url,
            &config.identity_api_key,
            config.http_timeout,
        )
        .map_err(|e| ConfigError::Invalid {
            name: "IDENTITY_API_URL",
            reason: e.to_string(),
        })?;
        let images = CloudinaryHost::new(config.cloudinary.clone(), config.http_timeout).map_err(
            |e| ConfigError::Invalid {
                name: "CLOUDINARY_CLOUD_NAME",
                reason: e.to_string(),
            },
        )?;
        if config.cloudinary.cloud_name.is_empty() {
            log::warn!("CLOUDINARY_CLOUD_NAME is not set, image uploads will fail");
        }
        if config.identity_api_key.is_empty() {
            log::warn!("IDENTITY_API_KEY is not set, only the test login will work");
        }

        Self::assemble(
            config,
            Ports {
                products: Arc::new(DieselProductRepository::new(pool.clone())),
                vendors: Arc::new(DieselVendorRepository::new(pool.clone())),
                orders: Arc::new(DieselOrderRepository::new(pool)),
                identity: Arc::new(identity),
                images: Arc::new(images),
            },
        )
    }
}
