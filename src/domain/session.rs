use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::vendor::VendorStatus;

/// Roles that sign in through the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    Vendor,
    Admin,
    Delivery,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Vendor => "vendor",
            Role::Admin => "admin",
            Role::Delivery => "delivery",
        }
    }
}

/// Why a sign-in was refused. Each kind carries its own user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFailure {
    InvalidCredentials,
    EmailTaken,
    NotAVendor,
    AccountPending,
    AccountBlocked,
    NotAuthorized,
    TooManyAttempts,
}

impl LoginFailure {
    pub fn for_status(status: VendorStatus) -> Option<LoginFailure> {
        match status {
            VendorStatus::Active => None,
            VendorStatus::Pending => Some(LoginFailure::AccountPending),
            VendorStatus::Blocked => Some(LoginFailure::AccountBlocked),
        }
    }

    pub fn kind(self) -> &'static str {
        match self {
            LoginFailure::InvalidCredentials => "invalid_credentials",
            LoginFailure::EmailTaken => "email_taken",
            LoginFailure::NotAVendor => "not_a_vendor",
            LoginFailure::AccountPending => "account_pending",
            LoginFailure::AccountBlocked => "account_blocked",
            LoginFailure::NotAuthorized => "not_authorized",
            LoginFailure::TooManyAttempts => "too_many_attempts",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            LoginFailure::InvalidCredentials => "Invalid email or password",
            LoginFailure::EmailTaken => "An account with this email already exists",
            LoginFailure::NotAVendor => "Account exists but not registered as vendor",
            LoginFailure::AccountPending => {
                "Vendor account is pending approval. Please contact admin."
            }
            LoginFailure::AccountBlocked => "Vendor account is blocked. Please contact admin.",
            LoginFailure::NotAuthorized => "Account is not authorized for this dashboard",
            LoginFailure::TooManyAttempts => {
                "Too many unsuccessful login attempts. Please try again later."
            }
        }
    }

    /// Inactive accounts keep their session so the status-check view can
    /// show them where they stand.
    pub fn keeps_session(self) -> bool {
        matches!(self, LoginFailure::AccountPending | LoginFailure::AccountBlocked)
    }
}

impl fmt::Display for LoginFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Evidence of an authenticated actor, recovered from the session cookies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionMarker {
    pub role: Role,
    pub actor_id: String,
    pub created_at: Option<DateTime<Utc>>,
    pub test_mode: bool,
}
