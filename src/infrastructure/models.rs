use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{DeliveryAddress, NewOrder, Order, OrderItem};
use crate::domain::pincode::Pincode;
use crate::domain::product::{NewProduct, Product, ProductImage, ProductStatus};
use crate::domain::vendor::{NewVendor, Vendor, VendorStatus};
use crate::schema::{order_items, orders, products, vendors};

fn corrupt(table: &str, id: impl std::fmt::Display, detail: impl std::fmt::Display) -> DomainError {
    DomainError::Internal(format!("malformed {table} row {id}: {detail}"))
}

fn pincodes_from_row(table: &str, id: &str, raw: Vec<String>) -> Result<Vec<Pincode>, DomainError> {
    raw.into_iter()
        .map(|p| p.parse().map_err(|e| corrupt(table, id, e)))
        .collect()
}

pub(crate) fn pincodes_to_row(pincodes: &[Pincode]) -> Vec<String> {
    pincodes.iter().map(|p| p.as_str().to_string()).collect()
}

pub(crate) fn images_to_row(images: &[ProductImage]) -> Value {
    serde_json::to_value(images).unwrap_or(Value::Array(vec![]))
}

// ── products ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductRow {
    pub id: Uuid,
    pub vendor_id: String,
    pub name: String,
    pub description: String,
    pub price: BigDecimal,
    pub mrp: BigDecimal,
    pub category: String,
    pub unit: String,
    pub stock: i32,
    pub pincodes: Vec<String>,
    pub images: Value,
    pub status: String,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = products)]
pub struct NewProductRow {
    pub id: Uuid,
    pub vendor_id: String,
    pub name: String,
    pub description: String,
    pub price: BigDecimal,
    pub mrp: BigDecimal,
    pub category: String,
    pub unit: String,
    pub stock: i32,
    pub pincodes: Vec<String>,
    pub images: Value,
    pub status: String,
}

impl From<NewProduct> for NewProductRow {
    fn from(p: NewProduct) -> Self {
        Self {
            id: Uuid::new_v4(),
            pincodes: pincodes_to_row(&p.pincodes),
            images: images_to_row(&p.images),
            vendor_id: p.vendor_id,
            name: p.name,
            description: p.description,
            price: p.price,
            mrp: p.mrp,
            category: p.category,
            unit: p.unit,
            stock: p.stock,
            status: ProductStatus::Active.as_str().to_string(),
        }
    }
}

/// Columns a vendor edit may touch.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = products)]
pub struct ProductChanges {
    pub name: String,
    pub description: String,
    pub price: BigDecimal,
    pub mrp: BigDecimal,
    pub stock: i32,
    pub pincodes: Vec<String>,
    pub images: Value,
    pub status: String,
}

impl From<&Product> for ProductChanges {
    fn from(p: &Product) -> Self {
        Self {
            name: p.name.clone(),
            description: p.description.clone(),
            price: p.price.clone(),
            mrp: p.mrp.clone(),
            stock: p.stock,
            pincodes: pincodes_to_row(&p.pincodes),
            images: images_to_row(&p.images),
            status: p.status.as_str().to_string(),
        }
    }
}

impl TryFrom<ProductRow> for Product {
    type Error = DomainError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let key = row.id.to_string();
        let images: Vec<ProductImage> =
            serde_json::from_value(row.images).map_err(|e| corrupt("products", &key, e))?;
        Ok(Product {
            id: row.id,
            pincodes: pincodes_from_row("products", &key, row.pincodes)?,
            status: row.status.parse().map_err(|e| corrupt("products", &key, e))?,
            vendor_id: row.vendor_id,
            name: row.name,
            description: row.description,
            price: row.price,
            mrp: row.mrp,
            category: row.category,
            unit: row.unit,
            stock: row.stock,
            images,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// ── vendors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = vendors)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct VendorRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub pincodes: Vec<String>,
    pub status: String,
    pub is_open: bool,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = vendors)]
pub struct NewVendorRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub pincodes: Vec<String>,
    pub status: String,
}

impl From<NewVendor> for NewVendorRow {
    fn from(v: NewVendor) -> Self {
        Self {
            pincodes: pincodes_to_row(&v.pincodes),
            id: v.id,
            name: v.name,
            email: v.email,
            phone: v.phone,
            address: v.address,
            status: VendorStatus::Pending.as_str().to_string(),
        }
    }
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = vendors)]
pub struct VendorProfileChanges {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub pincodes: Vec<String>,
    pub is_open: bool,
}

impl From<&Vendor> for VendorProfileChanges {
    fn from(v: &Vendor) -> Self {
        Self {
            name: v.name.clone(),
            phone: v.phone.clone(),
            address: v.address.clone(),
            pincodes: pincodes_to_row(&v.pincodes),
            is_open: v.is_open,
        }
    }
}

impl TryFrom<VendorRow> for Vendor {
    type Error = DomainError;

    fn try_from(row: VendorRow) -> Result<Self, Self::Error> {
        let pincodes = pincodes_from_row("vendors", &row.id, row.pincodes)?;
        let status = row
            .status
            .parse()
            .map_err(|e| corrupt("vendors", &row.id, e))?;
        Ok(Vendor {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            address: row.address,
            pincodes,
            status,
            is_open: row.is_open,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// ── orders ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: Uuid,
    pub user_id: String,
    pub subtotal: BigDecimal,
    pub delivery_fee: BigDecimal,
    pub total: BigDecimal,
    pub address_name: String,
    pub address_phone: String,
    pub address_line: String,
    pub address_pincode: String,
    pub address_city: String,
    pub payment_method: String,
    pub payment_status: String,
    pub status: String,
    pub delivery_person_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow {
    pub id: Uuid,
    pub user_id: String,
    pub subtotal: BigDecimal,
    pub delivery_fee: BigDecimal,
    pub total: BigDecimal,
    pub address_name: String,
    pub address_phone: String,
    pub address_line: String,
    pub address_pincode: String,
    pub address_city: String,
    pub payment_method: String,
}

impl NewOrderRow {
    pub fn new(id: Uuid, order: &NewOrder) -> Self {
        Self {
            id,
            user_id: order.user_id.clone(),
            subtotal: order.subtotal.clone(),
            delivery_fee: order.delivery_fee.clone(),
            total: order.total.clone(),
            address_name: order.address.name.clone(),
            address_phone: order.address.phone.clone(),
            address_line: order.address.address.clone(),
            address_pincode: order.address.pincode.as_str().to_string(),
            address_city: order.address.city.clone(),
            payment_method: order.payment_method.as_str().to_string(),
        }
    }
}

#[derive(
    Debug, Clone, Queryable, Selectable, Identifiable, Associations,
)]
#[diesel(table_name = order_items)]
#[diesel(belongs_to(OrderRow, foreign_key = order_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub vendor_id: String,
    pub name: String,
    pub price: BigDecimal,
    pub quantity: i32,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_items)]
pub struct NewOrderItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub vendor_id: String,
    pub name: String,
    pub price: BigDecimal,
    pub quantity: i32,
}

impl NewOrderItemRow {
    pub fn new(order_id: Uuid, item: &OrderItem) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id,
            product_id: item.product_id,
            vendor_id: item.vendor_id.clone(),
            name: item.name.clone(),
            price: item.price.clone(),
            quantity: item.quantity,
        }
    }
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        OrderItem {
            product_id: row.product_id,
            vendor_id: row.vendor_id,
            name: row.name,
            price: row.price,
            quantity: row.quantity,
        }
    }
}

impl OrderRow {
    pub fn into_order(self, items: Vec<OrderItemRow>) -> Result<Order, DomainError> {
        let key = self.id;
        let bad = |e: DomainError| corrupt("orders", key, e);
        Ok(Order {
            id: self.id,
            user_id: self.user_id,
            items: items.into_iter().map(OrderItem::from).collect(),
            subtotal: self.subtotal,
            delivery_fee: self.delivery_fee,
            total: self.total,
            address: DeliveryAddress {
                name: self.address_name,
                phone: self.address_phone,
                address: self.address_line,
                pincode: self.address_pincode.parse().map_err(bad)?,
                city: self.address_city,
            },
            payment_method: self.payment_method.parse().map_err(bad)?,
            payment_status: self.payment_status.parse().map_err(bad)?,
            status: self.status.parse().map_err(bad)?,
            delivery_person_id: self.delivery_person_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
