pub mod account;
pub mod admin;
pub mod catalog;
pub mod delivery;
pub mod health;
pub mod location;
pub mod orders;
pub mod vendor;

use std::str::FromStr;

use actix_web::web;
use bigdecimal::BigDecimal;

use crate::domain::errors::DomainError;
use crate::errors::AppError;

/// Run a blocking repository call on actix's blocking thread pool.
pub(crate) async fn blocking<T, F>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, DomainError> + Send + 'static,
    T: Send + 'static,
{
    web::block(f)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(AppError::from)
}

/// Decimal money sent as a string to avoid floating-point issues, e.g. "9.99".
pub(crate) fn parse_money(field: &str, raw: &str) -> Result<BigDecimal, AppError> {
    BigDecimal::from_str(raw.trim())
        .map_err(|e| AppError::BadRequest(format!("Invalid {field} '{raw}': {e}")))
}
