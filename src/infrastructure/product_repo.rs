use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::pincode::Pincode;
use crate::domain::ports::ProductRepository;
use crate::domain::product::{NewProduct, Product, ProductStatus};
use crate::schema::products;

use super::models::{NewProductRow, ProductChanges, ProductRow};

pub struct DieselProductRepository {
    pool: DbPool,
}

impl DieselProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn into_products(rows: Vec<ProductRow>) -> Result<Vec<Product>, DomainError> {
    rows.into_iter().map(Product::try_from).collect()
}

/// Distinguish a missing row from a stale version after a guarded write
/// matched nothing.
fn missed_write(conn: &mut PgConnection, id: Uuid) -> DomainError {
    let exists = products::table
        .filter(products::id.eq(id))
        .count()
        .get_result::<i64>(conn)
        .map(|n| n > 0);
    match exists {
        Ok(true) => DomainError::Conflict(format!("product {id} was modified by someone else")),
        Ok(false) => DomainError::NotFound("Product"),
        Err(e) => e.into(),
    }
}

impl ProductRepository for DieselProductRepository {
    fn visible_in(&self, pincode: &Pincode) -> Result<Vec<Product>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = products::table
            .filter(products::status.eq(ProductStatus::Active.as_str()))
            .filter(products::pincodes.contains(vec![pincode.as_str().to_string()]))
            .select(ProductRow::as_select())
            .load(&mut conn)?;
        into_products(rows)
    }

    fn visible_in_category(
        &self,
        category: &str,
        pincode: &Pincode,
    ) -> Result<Vec<Product>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = products::table
            .filter(products::status.eq(ProductStatus::Active.as_str()))
            .filter(products::category.eq(category))
            .filter(products::pincodes.contains(vec![pincode.as_str().to_string()]))
            .select(ProductRow::as_select())
            .load(&mut conn)?;
        into_products(rows)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        let mut conn = self.pool.get()?;
        products::table
            .filter(products::id.eq(id))
            .select(ProductRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(Product::try_from)
            .transpose()
    }

    fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Product>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = products::table
            .filter(products::id.eq_any(ids))
            .select(ProductRow::as_select())
            .load(&mut conn)?;
        into_products(rows)
    }

    fn list_by_vendor(&self, vendor_id: &str) -> Result<Vec<Product>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = products::table
            .filter(products::vendor_id.eq(vendor_id))
            .filter(products::status.ne(ProductStatus::Deleted.as_str()))
            .order(products::created_at.desc())
            .select(ProductRow::as_select())
            .load(&mut conn)?;
        into_products(rows)
    }

    fn create(&self, product: NewProduct) -> Result<Product, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(products::table)
            .values(&NewProductRow::from(product))
            .returning(ProductRow::as_returning())
            .get_result(&mut conn)?;
        Product::try_from(row)
    }

    fn update(&self, product: &Product, expected_version: i32) -> Result<Product, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::update(
            products::table
                .filter(products::id.eq(product.id))
                .filter(products::version.eq(expected_version)),
        )
        .set((
            ProductChanges::from(product),
            products::version.eq(products::version + 1),
            products::updated_at.eq(Utc::now()),
        ))
        .returning(ProductRow::as_returning())
        .get_result(&mut conn)
        .optional()?;

        match row {
            Some(row) => Product::try_from(row),
            None => Err(missed_write(&mut conn, product.id)),
        }
    }

    fn soft_delete(&self, id: Uuid, expected_version: i32) -> Result<Product, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::update(
            products::table
                .filter(products::id.eq(id))
                .filter(products::version.eq(expected_version)),
        )
        .set((
            products::status.eq(ProductStatus::Deleted.as_str()),
            products::version.eq(products::version + 1),
            products::updated_at.eq(Utc::now()),
        ))
        .returning(ProductRow::as_returning())
        .get_result(&mut conn)
        .optional()?;

        match row {
            Some(row) => Product::try_from(row),
            None => Err(missed_write(&mut conn, id)),
        }
    }
}
