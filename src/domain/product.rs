use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::DomainError;
use super::pincode::Pincode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    Active,
    OutOfStock,
    Deleted,
}

impl ProductStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProductStatus::Active => "active",
            ProductStatus::OutOfStock => "out_of_stock",
            ProductStatus::Deleted => "deleted",
        }
    }
}

impl FromStr for ProductStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(ProductStatus::Active),
            "out_of_stock" => Ok(ProductStatus::OutOfStock),
            "deleted" => Ok(ProductStatus::Deleted),
            other => Err(DomainError::invalid(format!("unknown product status '{other}'"))),
        }
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A remotely hosted product photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    pub url: String,
    pub public_id: String,
}

/// Whether `public_id` sits in `owner_id`'s folder under the image root.
pub fn owns_image(root: &str, owner_id: &str, public_id: &str) -> bool {
    if owner_id.is_empty() || public_id.split('/').any(|seg| seg == "..") {
        return false;
    }
    let prefix = format!("{}/{}/", root.trim_end_matches('/'), owner_id);
    public_id.len() > prefix.len() && public_id.starts_with(&prefix)
}

/// Every image must have been uploaded by `owner_id`.
pub fn ensure_own_images(
    images: &[ProductImage],
    root: &str,
    owner_id: &str,
) -> Result<(), DomainError> {
    match images.iter().find(|i| !owns_image(root, owner_id, &i.public_id)) {
        Some(foreign) => Err(DomainError::invalid(format!(
            "image {} was not uploaded by this vendor",
            foreign.public_id
        ))),
        None => Ok(()),
    }
}

#[derive(Debug, Clone)]
pub struct Product {
    pub id: Uuid,
    pub vendor_id: String,
    pub name: String,
    pub description: String,
    pub price: BigDecimal,
    pub mrp: BigDecimal,
    pub category: String,
    pub unit: String,
    pub stock: i32,
    pub pincodes: Vec<Pincode>,
    pub images: Vec<ProductImage>,
    pub status: ProductStatus,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn delivers_to(&self, pincode: &Pincode) -> bool {
        self.pincodes.contains(pincode)
    }

    /// Customer visibility: active and deliverable to `pincode`.
    pub fn is_visible_in(&self, pincode: &Pincode) -> bool {
        self.status == ProductStatus::Active && self.delivers_to(pincode)
    }

    pub fn image_ids(&self) -> Vec<String> {
        self.images.iter().map(|i| i.public_id.clone()).collect()
    }
}

/// Distinct category tags of `products`, sorted.
pub fn distinct_categories<'a, I>(products: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a Product>,
{
    products
        .into_iter()
        .filter(|p| !p.category.is_empty())
        .map(|p| p.category.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Stable presentation order for catalog listings.
pub fn sort_for_listing(products: &mut [Product]) {
    products.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub vendor_id: String,
    pub name: String,
    pub description: String,
    pub price: BigDecimal,
    pub mrp: BigDecimal,
    pub category: String,
    pub unit: String,
    pub stock: i32,
    pub pincodes: Vec<Pincode>,
    pub images: Vec<ProductImage>,
}

impl NewProduct {
    /// Required-field checks and delivery-area coverage against the owning
    /// vendor's own delivery areas.
    pub fn validate(&self, vendor_areas: &[Pincode]) -> Result<(), DomainError> {
        for (field, value) in [
            ("name", &self.name),
            ("description", &self.description),
            ("category", &self.category),
            ("unit", &self.unit),
            ("vendor_id", &self.vendor_id),
        ] {
            if value.trim().is_empty() {
                return Err(DomainError::invalid(format!("missing required field: {field}")));
            }
        }
        if self.images.is_empty() {
            return Err(DomainError::invalid("missing required field: image"));
        }
        validate_money(&self.price, &self.mrp)?;
        if self.stock < 0 {
            return Err(DomainError::invalid("stock cannot be negative"));
        }
        validate_areas(&self.pincodes, vendor_areas)
    }
}

/// Partial update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<BigDecimal>,
    pub mrp: Option<BigDecimal>,
    pub stock: Option<i32>,
    pub status: Option<ProductStatus>,
    pub pincodes: Option<Vec<Pincode>>,
    pub images: Option<Vec<ProductImage>>,
}

impl ProductUpdate {
    /// Apply onto `current`, returning the validated result. Deletion goes
    /// through the dedicated soft-delete path, not through updates.
    pub fn apply(self, current: &Product, vendor_areas: &[Pincode]) -> Result<Product, DomainError> {
        if current.status == ProductStatus::Deleted {
            return Err(DomainError::NotFound("Product"));
        }
        if self.status == Some(ProductStatus::Deleted) {
            return Err(DomainError::invalid("use the delete operation to remove a product"));
        }
        let mut next = current.clone();
        if let Some(name) = self.name {
            if name.trim().is_empty() {
                return Err(DomainError::invalid("missing required field: name"));
            }
            next.name = name;
        }
        if let Some(description) = self.description {
            next.description = description;
        }
        if let Some(price) = self.price {
            next.price = price;
        }
        if let Some(mrp) = self.mrp {
            next.mrp = mrp;
        }
        validate_money(&next.price, &next.mrp)?;
        if let Some(stock) = self.stock {
            if stock < 0 {
                return Err(DomainError::invalid("stock cannot be negative"));
            }
            next.stock = stock;
        }
        if let Some(status) = self.status {
            next.status = status;
        }
        if let Some(pincodes) = self.pincodes {
            validate_areas(&pincodes, vendor_areas)?;
            next.pincodes = pincodes;
        }
        if let Some(images) = self.images {
            if images.is_empty() {
                return Err(DomainError::invalid("missing required field: image"));
            }
            next.images = images;
        }
        Ok(next)
    }
}

fn validate_money(price: &BigDecimal, mrp: &BigDecimal) -> Result<(), DomainError> {
    let zero = BigDecimal::from(0);
    if *price < zero || *mrp < zero {
        return Err(DomainError::invalid("price and mrp cannot be negative"));
    }
    Ok(())
}

fn validate_areas(pincodes: &[Pincode], vendor_areas: &[Pincode]) -> Result<(), DomainError> {
    if pincodes.is_empty() {
        return Err(DomainError::invalid(
            "product must have at least one pincode for delivery area",
        ));
    }
    if let Some(outside) = pincodes.iter().find(|p| !vendor_areas.contains(p)) {
        return Err(DomainError::invalid(format!(
            "pincode {outside} is outside the vendor's delivery areas"
        )));
    }
    Ok(())
}
