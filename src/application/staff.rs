use std::collections::HashSet;

use crate::domain::errors::DomainError;
use crate::domain::ports::Identity;
use crate::domain::session::{LoginFailure, Role};

/// Identity-provider accounts allowed into the admin and delivery areas.
#[derive(Debug, Clone, Default)]
pub struct StaffDirectory {
    admins: HashSet<String>,
    delivery: HashSet<String>,
}

impl StaffDirectory {
    pub fn new<I, J>(admins: I, delivery: J) -> Self
    where
        I: IntoIterator<Item = String>,
        J: IntoIterator<Item = String>,
    {
        Self {
            admins: admins.into_iter().collect(),
            delivery: delivery.into_iter().collect(),
        }
    }

    pub fn is_member(&self, role: Role, uid: &str) -> bool {
        match role {
            Role::Admin => self.admins.contains(uid),
            Role::Delivery => self.delivery.contains(uid),
            Role::Customer | Role::Vendor => false,
        }
    }

    pub fn authorize(&self, role: Role, identity: &Identity) -> Result<(), DomainError> {
        if self.is_member(role, &identity.uid) {
            Ok(())
        } else {
            log::warn!("{} login refused for {}", role.as_str(), identity.uid);
            Err(DomainError::Unauthorized(LoginFailure::NotAuthorized))
        }
    }
}
