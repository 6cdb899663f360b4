use chrono::Utc;
use diesel::prelude::*;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::pincode::Pincode;
use crate::domain::ports::VendorRepository;
use crate::domain::vendor::{NewVendor, Vendor, VendorStatus};
use crate::schema::vendors;

use super::models::{NewVendorRow, VendorProfileChanges, VendorRow};

pub struct DieselVendorRepository {
    pool: DbPool,
}

impl DieselVendorRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn finish_guarded_write(
        conn: &mut PgConnection,
        id: &str,
        row: Option<VendorRow>,
    ) -> Result<Vendor, DomainError> {
        if let Some(row) = row {
            return Vendor::try_from(row);
        }
        let exists: i64 = vendors::table
            .filter(vendors::id.eq(id))
            .count()
            .get_result(conn)?;
        if exists > 0 {
            Err(DomainError::Conflict(format!(
                "vendor {id} was modified by someone else"
            )))
        } else {
            Err(DomainError::NotFound("Vendor"))
        }
    }
}

impl VendorRepository for DieselVendorRepository {
    fn find_by_id(&self, id: &str) -> Result<Option<Vendor>, DomainError> {
        let mut conn = self.pool.get()?;
        vendors::table
            .filter(vendors::id.eq(id))
            .select(VendorRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(Vendor::try_from)
            .transpose()
    }

    fn create(&self, vendor: NewVendor) -> Result<Vendor, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(vendors::table)
            .values(&NewVendorRow::from(vendor))
            .returning(VendorRow::as_returning())
            .get_result(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::DatabaseError(
                    diesel::result::DatabaseErrorKind::UniqueViolation,
                    _,
                ) => DomainError::Conflict("vendor account already registered".to_string()),
                other => other.into(),
            })?;
        Vendor::try_from(row)
    }

    fn list(&self, status: Option<VendorStatus>) -> Result<Vec<Vendor>, DomainError> {
        let mut conn = self.pool.get()?;
        let mut query = vendors::table
            .select(VendorRow::as_select())
            .order(vendors::created_at.desc())
            .into_boxed();
        if let Some(status) = status {
            query = query.filter(vendors::status.eq(status.as_str()));
        }
        query
            .load(&mut conn)?
            .into_iter()
            .map(Vendor::try_from)
            .collect()
    }

    fn serving(&self, pincode: &Pincode) -> Result<Vec<Vendor>, DomainError> {
        let mut conn = self.pool.get()?;
        vendors::table
            .filter(vendors::status.eq(VendorStatus::Active.as_str()))
            .filter(vendors::pincodes.contains(vec![pincode.as_str().to_string()]))
            .select(VendorRow::as_select())
            .load(&mut conn)?
            .into_iter()
            .map(Vendor::try_from)
            .collect()
    }

    fn update_profile(
        &self,
        vendor: &Vendor,
        expected_version: i32,
    ) -> Result<Vendor, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::update(
            vendors::table
                .filter(vendors::id.eq(&vendor.id))
                .filter(vendors::version.eq(expected_version)),
        )
        .set((
            VendorProfileChanges::from(vendor),
            vendors::version.eq(vendors::version + 1),
            vendors::updated_at.eq(Utc::now()),
        ))
        .returning(VendorRow::as_returning())
        .get_result(&mut conn)
        .optional()?;
        Self::finish_guarded_write(&mut conn, &vendor.id, row)
    }

    fn set_status(
        &self,
        id: &str,
        status: VendorStatus,
        expected_version: i32,
    ) -> Result<Vendor, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::update(
            vendors::table
                .filter(vendors::id.eq(id))
                .filter(vendors::version.eq(expected_version)),
        )
        .set((
            vendors::status.eq(status.as_str()),
            vendors::version.eq(vendors::version + 1),
            vendors::updated_at.eq(Utc::now()),
        ))
        .returning(VendorRow::as_returning())
        .get_result(&mut conn)
        .optional()?;
        Self::finish_guarded_write(&mut conn, id, row)
    }
}
