use std::sync::Arc;

use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::pincode::Pincode;
use crate::domain::ports::{ProductRepository, VendorRepository};
use crate::domain::product::{distinct_categories, sort_for_listing, Product, ProductStatus};
use crate::domain::vendor::Vendor;

/// Customer-facing catalog, scoped by delivery area.
///
/// An empty, unset or malformed pincode yields an empty result rather than
/// an error: no product can be delivered to it.
#[derive(Clone)]
pub struct CatalogService {
    products: Arc<dyn ProductRepository>,
    vendors: Arc<dyn VendorRepository>,
}

impl CatalogService {
    pub fn new(products: Arc<dyn ProductRepository>, vendors: Arc<dyn VendorRepository>) -> Self {
        Self { products, vendors }
    }

    pub fn products_for_pincode(&self, pincode: Option<&str>) -> Result<Vec<Product>, DomainError> {
        let Some(pincode) = coverage_key(pincode) else {
            return Ok(Vec::new());
        };
        let mut products = self.products.visible_in(&pincode)?;
        products.retain(|p| p.is_visible_in(&pincode));
        sort_for_listing(&mut products);
        log::debug!("found {} products for pincode {}", products.len(), pincode);
        Ok(products)
    }

    /// Categories that have at least one deliverable, active product.
    pub fn categories_for_pincode(&self, pincode: Option<&str>) -> Result<Vec<String>, DomainError> {
        let products = self.products_for_pincode(pincode)?;
        Ok(distinct_categories(&products))
    }

    pub fn products_for_category(
        &self,
        category: &str,
        pincode: Option<&str>,
    ) -> Result<Vec<Product>, DomainError> {
        let Some(pincode) = coverage_key(pincode) else {
            return Ok(Vec::new());
        };
        let mut products = self.products.visible_in_category(category, &pincode)?;
        products.retain(|p| p.category == category && p.is_visible_in(&pincode));
        sort_for_listing(&mut products);
        Ok(products)
    }

    /// Product page lookup. Deleted products are gone as far as customers
    /// are concerned.
    pub fn product_by_id(&self, id: Uuid) -> Result<Product, DomainError> {
        match self.products.find_by_id(id)? {
            Some(p) if p.status != ProductStatus::Deleted => Ok(p),
            _ => Err(DomainError::NotFound("Product")),
        }
    }

    pub fn vendors_for_pincode(&self, pincode: Option<&str>) -> Result<Vec<Vendor>, DomainError> {
        let Some(pincode) = coverage_key(pincode) else {
            return Ok(Vec::new());
        };
        let mut vendors = self.vendors.serving(&pincode)?;
        vendors.retain(|v| v.is_active() && v.pincodes.contains(&pincode));
        vendors.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(vendors)
    }
}

fn coverage_key(raw: Option<&str>) -> Option<Pincode> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;
    match raw.parse() {
        Ok(p) => Some(p),
        Err(_) => {
            log::debug!("treating malformed pincode '{}' as uncovered", raw);
            None
        }
    }
}
