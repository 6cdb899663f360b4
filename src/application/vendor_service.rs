use std::sync::Arc;

use chrono::Utc;

use crate::domain::errors::DomainError;
use crate::domain::pincode::Pincode;
use crate::domain::ports::{Identity, VendorRepository};
use crate::domain::session::LoginFailure;
use crate::domain::vendor::{NewVendor, Vendor, VendorProfileUpdate, VendorStatus};

/// Account id used by the non-production test login.
pub const TEST_VENDOR_ID: &str = "test-vendor-id";

/// Result of checking a verified identity against the vendor records.
#[derive(Debug, Clone)]
pub enum LoginOutcome {
    Active(Vendor),
    /// Credentials were good but the account may not use the dashboard yet.
    Inactive(Vendor, LoginFailure),
}

impl LoginOutcome {
    pub fn vendor(&self) -> &Vendor {
        match self {
            LoginOutcome::Active(v) | LoginOutcome::Inactive(v, _) => v,
        }
    }
}

/// Details a vendor supplies when registering.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub pincodes: Vec<Pincode>,
}

#[derive(Clone)]
pub struct VendorService {
    vendors: Arc<dyn VendorRepository>,
}

impl VendorService {
    pub fn new(vendors: Arc<dyn VendorRepository>) -> Self {
        Self { vendors }
    }

    pub fn get(&self, id: &str) -> Result<Vendor, DomainError> {
        self.vendors
            .find_by_id(id)?
            .ok_or(DomainError::NotFound("Vendor"))
    }

    /// Current status for the gate; `None` when no vendor record exists.
    pub fn status_of(&self, id: &str) -> Result<Option<VendorStatus>, DomainError> {
        Ok(self.vendors.find_by_id(id)?.map(|v| v.status))
    }

    pub fn resolve_login(&self, identity: &Identity) -> Result<LoginOutcome, DomainError> {
        let vendor = self
            .vendors
            .find_by_id(&identity.uid)?
            .ok_or(DomainError::Unauthorized(LoginFailure::NotAVendor))?;
        Ok(match LoginFailure::for_status(vendor.status) {
            None => LoginOutcome::Active(vendor),
            Some(failure) => {
                log::info!("vendor {} signed in with status {}", vendor.id, vendor.status);
                LoginOutcome::Inactive(vendor, failure)
            }
        })
    }

    /// New vendors wait for admin approval.
    pub fn register(&self, identity: &Identity, details: Registration) -> Result<Vendor, DomainError> {
        if self.vendors.find_by_id(&identity.uid)?.is_some() {
            return Err(DomainError::Conflict(
                "vendor account already registered".to_string(),
            ));
        }
        let new_vendor = NewVendor {
            id: identity.uid.clone(),
            name: details.name,
            email: identity.email.clone(),
            phone: details.phone,
            address: details.address,
            pincodes: details.pincodes,
        };
        new_vendor.validate()?;
        let vendor = self.vendors.create(new_vendor)?;
        log::info!("vendor {} registered, awaiting approval", vendor.id);
        Ok(vendor)
    }

    pub fn update_profile(
        &self,
        id: &str,
        expected_version: i32,
        update: VendorProfileUpdate,
    ) -> Result<Vendor, DomainError> {
        let current = self.get(id)?;
        let next = update.apply(&current)?;
        self.vendors.update_profile(&next, expected_version)
    }

    pub fn list(&self, status: Option<VendorStatus>) -> Result<Vec<Vendor>, DomainError> {
        let mut vendors = self.vendors.list(status)?;
        vendors.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(vendors)
    }

    /// Make sure the synthetic test vendor exists and is active, so the rest
    /// of the dashboard treats it like any other account.
    pub fn ensure_test_vendor(&self, pincode: Pincode) -> Result<Vendor, DomainError> {
        let existing = match self.vendors.find_by_id(TEST_VENDOR_ID)? {
            Some(v) => v,
            None => {
                let v = test_vendor(pincode);
                self.vendors.create(NewVendor {
                    id: v.id,
                    name: v.name,
                    email: v.email,
                    phone: v.phone,
                    address: v.address,
                    pincodes: v.pincodes,
                })?
            }
        };
        if existing.is_active() {
            return Ok(existing);
        }
        self.vendors
            .set_status(TEST_VENDOR_ID, VendorStatus::Active, existing.version)
    }

    /// Admin-only status change.
    pub fn set_status(
        &self,
        id: &str,
        status: VendorStatus,
        expected_version: i32,
    ) -> Result<Vendor, DomainError> {
        let current = self.get(id)?;
        if !current.status.can_transition_to(status) {
            return Err(DomainError::Conflict(format!(
                "vendor {} cannot move from {} to {}",
                id, current.status, status
            )));
        }
        let updated = self.vendors.set_status(id, status, expected_version)?;
        log::info!("vendor {} status {} -> {}", id, current.status, status);
        Ok(updated)
    }
}

/// Synthetic always-active vendor for the non-production test login.
pub fn test_vendor(pincode: Pincode) -> Vendor {
    let now = Utc::now();
    Vendor {
        id: TEST_VENDOR_ID.to_string(),
        name: "Test Vendor".to_string(),
        email: "test@example.com".to_string(),
        phone: "1234567890".to_string(),
        address: "Test Address".to_string(),
        pincodes: vec![pincode],
        status: VendorStatus::Active,
        is_open: true,
        version: 1,
        created_at: now,
        updated_at: now,
    }
}
