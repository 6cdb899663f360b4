use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::DomainError;
use super::pincode::Pincode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VendorStatus {
    Pending,
    Active,
    Blocked,
}

impl VendorStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            VendorStatus::Pending => "pending",
            VendorStatus::Active => "active",
            VendorStatus::Blocked => "blocked",
        }
    }

    /// Admin-driven transitions: approve, reject, block, unblock.
    pub fn can_transition_to(self, next: VendorStatus) -> bool {
        use VendorStatus::*;
        matches!(
            (self, next),
            (Pending, Active) | (Pending, Blocked) | (Active, Blocked) | (Blocked, Active)
        )
    }
}

impl FromStr for VendorStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(VendorStatus::Pending),
            "active" => Ok(VendorStatus::Active),
            "blocked" => Ok(VendorStatus::Blocked),
            other => Err(DomainError::invalid(format!("unknown vendor status '{other}'"))),
        }
    }
}

impl fmt::Display for VendorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Seller account. `id` is the identity provider's account id.
#[derive(Debug, Clone)]
pub struct Vendor {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub pincodes: Vec<Pincode>,
    pub status: VendorStatus,
    pub is_open: bool,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vendor {
    pub fn is_active(&self) -> bool {
        self.status == VendorStatus::Active
    }

    /// Active and open: its active products currently accept orders.
    pub fn accepts_orders(&self) -> bool {
        self.is_active() && self.is_open
    }
}

#[derive(Debug, Clone)]
pub struct NewVendor {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub pincodes: Vec<Pincode>,
}

impl NewVendor {
    pub fn validate(&self) -> Result<(), DomainError> {
        for (field, value) in [
            ("name", &self.name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("address", &self.address),
        ] {
            if value.trim().is_empty() {
                return Err(DomainError::invalid(format!("missing required field: {field}")));
            }
        }
        if self.pincodes.is_empty() {
            return Err(DomainError::invalid("at least one delivery area is required"));
        }
        Ok(())
    }
}

/// Vendor-controlled profile fields.
#[derive(Debug, Clone, Default)]
pub struct VendorProfileUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub pincodes: Option<Vec<Pincode>>,
    pub is_open: Option<bool>,
}

impl VendorProfileUpdate {
    pub fn apply(self, current: &Vendor) -> Result<Vendor, DomainError> {
        let mut next = current.clone();
        if let Some(name) = self.name {
            if name.trim().is_empty() {
                return Err(DomainError::invalid("missing required field: name"));
            }
            next.name = name;
        }
        if let Some(phone) = self.phone {
            next.phone = phone;
        }
        if let Some(address) = self.address {
            next.address = address;
        }
        if let Some(pincodes) = self.pincodes {
            if pincodes.is_empty() {
                return Err(DomainError::invalid("select at least one delivery area"));
            }
            next.pincodes = pincodes;
        }
        if let Some(is_open) = self.is_open {
            next.is_open = is_open;
        }
        Ok(next)
    }
}
