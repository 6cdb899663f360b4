use std::sync::Arc;

use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::ports::{ProductRepository, VendorRepository};
use crate::domain::product::{
    ensure_own_images, owns_image, NewProduct, Product, ProductStatus, ProductUpdate,
};
use crate::domain::vendor::Vendor;

/// Result of a write that may leave hosted images without a product.
#[derive(Debug, Clone)]
pub struct ProductChange {
    pub product: Product,
    /// Ids of the vendor's own images the product no longer references.
    pub released_images: Vec<String>,
}

/// Vendor-side product management. Every operation is scoped to the
/// calling vendor's own products and images.
#[derive(Clone)]
pub struct ProductService {
    products: Arc<dyn ProductRepository>,
    vendors: Arc<dyn VendorRepository>,
    image_root: String,
}

impl ProductService {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        vendors: Arc<dyn VendorRepository>,
        image_root: impl Into<String>,
    ) -> Self {
        Self {
            products,
            vendors,
            image_root: image_root.into(),
        }
    }

    pub fn owns_image(&self, vendor_id: &str, public_id: &str) -> bool {
        owns_image(&self.image_root, vendor_id, public_id)
    }

    fn released(&self, vendor_id: &str, before: &Product, after: &Product) -> Vec<String> {
        let kept = after.image_ids();
        before
            .image_ids()
            .into_iter()
            .filter(|id| !kept.contains(id) && self.owns_image(vendor_id, id))
            .collect()
    }

    pub fn list_own(&self, vendor_id: &str) -> Result<Vec<Product>, DomainError> {
        let mut products = self.products.list_by_vendor(vendor_id)?;
        products.retain(|p| p.status != ProductStatus::Deleted);
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(products)
    }

    pub fn get_own(&self, vendor_id: &str, id: Uuid) -> Result<Product, DomainError> {
        match self.products.find_by_id(id)? {
            Some(p) if p.vendor_id == vendor_id && p.status != ProductStatus::Deleted => Ok(p),
            _ => Err(DomainError::NotFound("Product")),
        }
    }

    pub fn add(&self, product: NewProduct) -> Result<Product, DomainError> {
        let vendor = self.vendor(&product.vendor_id)?;
        product.validate(&vendor.pincodes)?;
        ensure_own_images(&product.images, &self.image_root, &product.vendor_id)?;
        let created = self.products.create(product)?;
        log::info!("product {} added by vendor {}", created.id, created.vendor_id);
        Ok(created)
    }

    pub fn update(
        &self,
        vendor_id: &str,
        id: Uuid,
        expected_version: i32,
        update: ProductUpdate,
    ) -> Result<ProductChange, DomainError> {
        let current = self.get_own(vendor_id, id)?;
        let vendor = self.vendor(vendor_id)?;
        let replaces_images = update.images.is_some();
        let next = update.apply(&current, &vendor.pincodes)?;
        if replaces_images {
            ensure_own_images(&next.images, &self.image_root, vendor_id)?;
        }
        let product = self.products.update(&next, expected_version)?;
        Ok(ProductChange {
            released_images: self.released(vendor_id, &current, &product),
            product,
        })
    }

    /// Soft delete. Every own image of the product is released for remote
    /// cleanup.
    pub fn remove(
        &self,
        vendor_id: &str,
        id: Uuid,
        expected_version: i32,
    ) -> Result<ProductChange, DomainError> {
        let current = self.get_own(vendor_id, id)?;
        let removed = self.products.soft_delete(current.id, expected_version)?;
        log::info!("product {} deleted by vendor {}", removed.id, vendor_id);
        let released_images = removed
            .image_ids()
            .into_iter()
            .filter(|img| self.owns_image(vendor_id, img))
            .collect();
        Ok(ProductChange {
            product: removed,
            released_images,
        })
    }

    fn vendor(&self, vendor_id: &str) -> Result<Vendor, DomainError> {
        self.vendors
            .find_by_id(vendor_id)?
            .ok_or(DomainError::NotFound("Vendor"))
    }
}
