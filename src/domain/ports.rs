use async_trait::async_trait;
use uuid::Uuid;

use super::errors::DomainError;
use super::order::{NewOrder, Order, OrderStatus};
use super::pincode::Pincode;
use super::product::{NewProduct, Product};
use super::vendor::{NewVendor, Vendor, VendorStatus};

#[derive(Debug, Clone)]
pub struct ListResult<T> {
    pub items: Vec<T>,
    pub total: i64,
}

/// Product store. Writes that take `expected_version` fail with
/// `DomainError::Conflict` when the stored version has moved on.
pub trait ProductRepository: Send + Sync + 'static {
    /// Active products whose delivery areas contain `pincode`.
    fn visible_in(&self, pincode: &Pincode) -> Result<Vec<Product>, DomainError>;
    fn visible_in_category(
        &self,
        category: &str,
        pincode: &Pincode,
    ) -> Result<Vec<Product>, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, DomainError>;
    fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Product>, DomainError>;
    /// The vendor's products, excluding deleted ones.
    fn list_by_vendor(&self, vendor_id: &str) -> Result<Vec<Product>, DomainError>;
    fn create(&self, product: NewProduct) -> Result<Product, DomainError>;
    fn update(&self, product: &Product, expected_version: i32) -> Result<Product, DomainError>;
    fn soft_delete(&self, id: Uuid, expected_version: i32) -> Result<Product, DomainError>;
}

pub trait VendorRepository: Send + Sync + 'static {
    fn find_by_id(&self, id: &str) -> Result<Option<Vendor>, DomainError>;
    fn create(&self, vendor: NewVendor) -> Result<Vendor, DomainError>;
    fn list(&self, status: Option<VendorStatus>) -> Result<Vec<Vendor>, DomainError>;
    /// Active vendors whose delivery areas contain `pincode`.
    fn serving(&self, pincode: &Pincode) -> Result<Vec<Vendor>, DomainError>;
    fn update_profile(&self, vendor: &Vendor, expected_version: i32)
        -> Result<Vendor, DomainError>;
    fn set_status(
        &self,
        id: &str,
        status: VendorStatus,
        expected_version: i32,
    ) -> Result<Vendor, DomainError>;
}

pub trait OrderRepository: Send + Sync + 'static {
    fn create(&self, order: NewOrder) -> Result<Order, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError>;
    fn list_by_user(&self, user_id: &str) -> Result<Vec<Order>, DomainError>;
    fn list_by_vendor(&self, vendor_id: &str) -> Result<Vec<Order>, DomainError>;
    fn list_by_status(&self, statuses: &[OrderStatus]) -> Result<Vec<Order>, DomainError>;
    fn list(&self, page: i64, limit: i64) -> Result<ListResult<Order>, DomainError>;
    /// Move `id` from `from` to `to`. Returns `None` when the stored status
    /// is no longer `from`.
    fn transition(
        &self,
        id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
        delivery_person_id: Option<&str>,
    ) -> Result<Option<Order>, DomainError>;
}

/// An account known to the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub uid: String,
    pub email: String,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync + 'static {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, DomainError>;
    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, DomainError>;
}
