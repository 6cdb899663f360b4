//! In-memory ports for unit and handler tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::web;
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::domain::errors::DomainError;
use crate::domain::order::{NewOrder, Order, OrderStatus, PaymentStatus};
use crate::domain::pincode::Pincode;
use crate::domain::ports::{
    Identity, IdentityProvider, ListResult, OrderRepository, ProductRepository, VendorRepository,
};
use crate::domain::product::{NewProduct, Product, ProductStatus};
use crate::domain::session::{LoginFailure, Role, SessionMarker};
use crate::domain::vendor::{NewVendor, Vendor, VendorStatus};
use crate::media::{HostError, HostedImage, ImageHost, PreparedImage};
use crate::state::{AppState, Ports};

#[derive(Default)]
pub struct InMemoryProducts {
    rows: Mutex<Vec<Product>>,
}

impl InMemoryProducts {
    pub fn with(products: Vec<Product>) -> Self {
        Self {
            rows: Mutex::new(products),
        }
    }
}

impl ProductRepository for InMemoryProducts {
    fn visible_in(&self, pincode: &Pincode) -> Result<Vec<Product>, DomainError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().filter(|p| p.is_visible_in(pincode)).cloned().collect())
    }

    fn visible_in_category(
        &self,
        category: &str,
        pincode: &Pincode,
    ) -> Result<Vec<Product>, DomainError> {
        Ok(self
            .visible_in(pincode)?
            .into_iter()
            .filter(|p| p.category == category)
            .collect())
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|p| p.id == id).cloned())
    }

    fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Product>, DomainError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().filter(|p| ids.contains(&p.id)).cloned().collect())
    }

    fn list_by_vendor(&self, vendor_id: &str) -> Result<Vec<Product>, DomainError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|p| p.vendor_id == vendor_id && p.status != ProductStatus::Deleted)
            .cloned()
            .collect())
    }

    fn create(&self, product: NewProduct) -> Result<Product, DomainError> {
        let now = Utc::now();
        let created = Product {
            id: Uuid::new_v4(),
            vendor_id: product.vendor_id,
            name: product.name,
            description: product.description,
            price: product.price,
            mrp: product.mrp,
            category: product.category,
            unit: product.unit,
            stock: product.stock,
            pincodes: product.pincodes,
            images: product.images,
            status: ProductStatus::Active,
            version: 1,
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().unwrap().push(created.clone());
        Ok(created)
    }

    fn update(&self, product: &Product, expected_version: i32) -> Result<Product, DomainError> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|p| p.id == product.id)
            .ok_or(DomainError::NotFound("Product"))?;
        if row.version != expected_version {
            return Err(DomainError::Conflict("product was modified".to_string()));
        }
        *row = Product {
            version: expected_version + 1,
            updated_at: Utc::now(),
            ..product.clone()
        };
        Ok(row.clone())
    }

    fn soft_delete(&self, id: Uuid, expected_version: i32) -> Result<Product, DomainError> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(DomainError::NotFound("Product"))?;
        if row.version != expected_version {
            return Err(DomainError::Conflict("product was modified".to_string()));
        }
        row.status = ProductStatus::Deleted;
        row.version += 1;
        Ok(row.clone())
    }
}

#[derive(Default)]
pub struct InMemoryVendors {
    rows: Mutex<HashMap<String, Vendor>>,
}

impl InMemoryVendors {
    pub fn with(vendors: Vec<Vendor>) -> Self {
        Self {
            rows: Mutex::new(vendors.into_iter().map(|v| (v.id.clone(), v)).collect()),
        }
    }

    fn write(
        &self,
        id: &str,
        expected_version: i32,
        change: impl FnOnce(&mut Vendor),
    ) -> Result<Vendor, DomainError> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows.get_mut(id).ok_or(DomainError::NotFound("Vendor"))?;
        if row.version != expected_version {
            return Err(DomainError::Conflict("vendor was modified".to_string()));
        }
        change(row);
        row.version += 1;
        row.updated_at = Utc::now();
        Ok(row.clone())
    }
}

impl VendorRepository for InMemoryVendors {
    fn find_by_id(&self, id: &str) -> Result<Option<Vendor>, DomainError> {
        Ok(self.rows.lock().unwrap().get(id).cloned())
    }

    fn create(&self, vendor: NewVendor) -> Result<Vendor, DomainError> {
        let now = Utc::now();
        let created = Vendor {
            id: vendor.id,
            name: vendor.name,
            email: vendor.email,
            phone: vendor.phone,
            address: vendor.address,
            pincodes: vendor.pincodes,
            status: VendorStatus::Pending,
            is_open: true,
            version: 1,
            created_at: now,
            updated_at: now,
        };
        self.rows
            .lock()
            .unwrap()
            .insert(created.id.clone(), created.clone());
        Ok(created)
    }

    fn list(&self, status: Option<VendorStatus>) -> Result<Vec<Vendor>, DomainError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .values()
            .filter(|v| status.map_or(true, |s| v.status == s))
            .cloned()
            .collect())
    }

    fn serving(&self, pincode: &Pincode) -> Result<Vec<Vendor>, DomainError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .values()
            .filter(|v| v.is_active() && v.pincodes.contains(pincode))
            .cloned()
            .collect())
    }

    fn update_profile(&self, vendor: &Vendor, expected_version: i32) -> Result<Vendor, DomainError> {
        self.write(&vendor.id, expected_version, |row| {
            row.name = vendor.name.clone();
            row.phone = vendor.phone.clone();
            row.address = vendor.address.clone();
            row.pincodes = vendor.pincodes.clone();
            row.is_open = vendor.is_open;
        })
    }

    fn set_status(
        &self,
        id: &str,
        status: VendorStatus,
        expected_version: i32,
    ) -> Result<Vendor, DomainError> {
        self.write(id, expected_version, |row| row.status = status)
    }
}

#[derive(Default)]
pub struct InMemoryOrders {
    rows: Mutex<Vec<Order>>,
}

impl OrderRepository for InMemoryOrders {
    fn create(&self, order: NewOrder) -> Result<Order, DomainError> {
        let now = Utc::now();
        let created = Order {
            id: Uuid::new_v4(),
            user_id: order.user_id,
            items: order.items,
            subtotal: order.subtotal,
            delivery_fee: order.delivery_fee,
            total: order.total,
            address: order.address,
            payment_method: order.payment_method,
            payment_status: PaymentStatus::Pending,
            status: OrderStatus::Pending,
            delivery_person_id: None,
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().unwrap().push(created.clone());
        Ok(created)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        Ok(self.rows.lock().unwrap().iter().find(|o| o.id == id).cloned())
    }

    fn list_by_user(&self, user_id: &str) -> Result<Vec<Order>, DomainError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().rev().filter(|o| o.user_id == user_id).cloned().collect())
    }

    fn list_by_vendor(&self, vendor_id: &str) -> Result<Vec<Order>, DomainError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .rev()
            .filter(|o| o.involves_vendor(vendor_id))
            .cloned()
            .collect())
    }

    fn list_by_status(&self, statuses: &[OrderStatus]) -> Result<Vec<Order>, DomainError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|o| statuses.contains(&o.status))
            .cloned()
            .collect())
    }

    fn list(&self, page: i64, limit: i64) -> Result<ListResult<Order>, DomainError> {
        let rows = self.rows.lock().unwrap();
        let offset = ((page - 1) * limit).max(0) as usize;
        Ok(ListResult {
            items: rows
                .iter()
                .rev()
                .skip(offset)
                .take(limit.max(0) as usize)
                .cloned()
                .collect(),
            total: rows.len() as i64,
        })
    }

    fn transition(
        &self,
        id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
        delivery_person_id: Option<&str>,
    ) -> Result<Option<Order>, DomainError> {
        let mut rows = self.rows.lock().unwrap();
        let Some(row) = rows.iter_mut().find(|o| o.id == id && o.status == from) else {
            return Ok(None);
        };
        row.status = to;
        if let Some(person) = delivery_person_id {
            row.delivery_person_id = Some(person.to_string());
        }
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }
}

/// Accounts are `(email, password, uid)` triples.
#[derive(Default)]
pub struct FakeIdentity {
    accounts: Mutex<Vec<(String, String, String)>>,
}

impl FakeIdentity {
    pub fn with_account(email: &str, password: &str, uid: &str) -> Self {
        let fake = Self::default();
        fake.accounts
            .lock()
            .unwrap()
            .push((email.to_string(), password.to_string(), uid.to_string()));
        fake
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, DomainError> {
        let accounts = self.accounts.lock().unwrap();
        accounts
            .iter()
            .find(|(e, p, _)| e == email && p == password)
            .map(|(e, _, uid)| Identity {
                uid: uid.clone(),
                email: e.clone(),
            })
            .ok_or(DomainError::Unauthorized(LoginFailure::InvalidCredentials))
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, DomainError> {
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.iter().any(|(e, _, _)| e == email) {
            return Err(DomainError::Unauthorized(LoginFailure::EmailTaken));
        }
        let uid = format!("uid-{}", accounts.len() + 1);
        accounts.push((email.to_string(), password.to_string(), uid.clone()));
        Ok(Identity {
            uid,
            email: email.to_string(),
        })
    }
}

/// Image host that fails the first N uploads / destroys with a transport
/// error and records what it was sent.
#[derive(Default)]
pub struct FakeImageHost {
    fail_uploads: usize,
    fail_destroys: usize,
    uploads: AtomicUsize,
    destroys: AtomicUsize,
    last: Mutex<Option<PreparedImage>>,
}

impl FakeImageHost {
    pub fn failing_uploads(n: usize) -> Self {
        Self {
            fail_uploads: n,
            ..Default::default()
        }
    }

    pub fn failing_destroys(n: usize) -> Self {
        Self {
            fail_destroys: n,
            ..Default::default()
        }
    }

    pub fn upload_calls(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    pub fn destroy_calls(&self) -> usize {
        self.destroys.load(Ordering::SeqCst)
    }

    pub fn last_upload(&self) -> Option<PreparedImage> {
        self.last.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageHost for FakeImageHost {
    async fn upload(&self, image: &PreparedImage) -> Result<HostedImage, HostError> {
        let attempt = self.uploads.fetch_add(1, Ordering::SeqCst) + 1;
        *self.last.lock().unwrap() = Some(image.clone());
        if attempt <= self.fail_uploads {
            return Err(HostError::Transport(format!("upload attempt {attempt} failed")));
        }
        Ok(HostedImage {
            url: format!("https://cdn.test/attempt-{attempt}"),
            public_id: format!("{}/{}", image.folder, image.public_id),
        })
    }

    async fn destroy(&self, _public_id: &str) -> Result<(), HostError> {
        let attempt = self.destroys.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt <= self.fail_destroys {
            return Err(HostError::Transport(format!("destroy attempt {attempt} failed")));
        }
        Ok(())
    }
}

pub const TEST_SECRET: &str = "0123456789abcdef0123456789abcdef";
pub const ADMIN_UID: &str = "admin-1";
pub const RIDER_UID: &str = "rider-1";
pub const DEFAULT_PINCODE: &str = "110001";

/// Application state over in-memory ports, with handles kept on the fakes so
/// tests can seed and inspect them.
pub struct Harness {
    pub state: AppState,
    pub products: Arc<InMemoryProducts>,
    pub vendors: Arc<InMemoryVendors>,
    pub orders: Arc<InMemoryOrders>,
    pub images: Arc<FakeImageHost>,
}

impl Harness {
    pub fn new(products: Vec<Product>, vendors: Vec<Vendor>) -> Self {
        Self::build(products, vendors, FakeIdentity::default(), FakeImageHost::default(), &[])
    }

    pub fn build(
        products: Vec<Product>,
        vendors: Vec<Vendor>,
        identity: FakeIdentity,
        images: FakeImageHost,
        extra_env: &[(&str, &str)],
    ) -> Self {
        let mut env: HashMap<String, String> = [
            ("DATABASE_URL", "postgres://unused"),
            ("SESSION_SECRET", TEST_SECRET),
            ("DEFAULT_PINCODE", DEFAULT_PINCODE),
            ("ADMIN_UIDS", ADMIN_UID),
            ("DELIVERY_UIDS", RIDER_UID),
            ("UPLOAD_RETRY_DELAY_MS", "0"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        for (k, v) in extra_env {
            env.insert(k.to_string(), v.to_string());
        }
        let config = AppConfig::from_lookup(|k| env.get(k).cloned()).expect("test config");

        let products = Arc::new(InMemoryProducts::with(products));
        let vendors = Arc::new(InMemoryVendors::with(vendors));
        let orders = Arc::new(InMemoryOrders::default());
        let images = Arc::new(images);
        let state = AppState::assemble(
            &config,
            Ports {
                products: products.clone(),
                vendors: vendors.clone(),
                orders: orders.clone(),
                identity: Arc::new(identity),
                images: images.clone(),
            },
        )
        .expect("test state");
        Self {
            state,
            products,
            vendors,
            orders,
            images,
        }
    }

    pub fn data(&self) -> web::Data<AppState> {
        web::Data::new(self.state.clone())
    }

    /// Signed session cookies for `actor_id` in `role`.
    pub fn session(&self, role: Role, actor_id: &str) -> Vec<Cookie<'static>> {
        self.state.sessions.issue(&SessionMarker {
            role,
            actor_id: actor_id.to_string(),
            created_at: Some(Utc::now()),
            test_mode: false,
        })
    }
}

/// Cookies a response sets, ready to be sent back on the next request.
pub fn response_cookies<B>(resp: &ServiceResponse<B>) -> Vec<Cookie<'static>> {
    resp.response().cookies().map(|c| c.into_owned()).collect()
}
