use actix_web::cookie::{time, Cookie, SameSite};
use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::pincode::Pincode;
use crate::errors::AppError;
use crate::state::AppState;

pub const PINCODE_COOKIE: &str = "pincode";

#[derive(Debug, Deserialize, IntoParams)]
pub struct PincodeQuery {
    /// Delivery pincode; falls back to the location cookie, then the default.
    pub pincode: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetLocationRequest {
    pub pincode: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LocationResponse {
    pub pincode: String,
    /// True when no location was chosen and the default applies.
    pub is_default: bool,
}

/// The pincode a catalog request is scoped to. An explicit query value wins,
/// even when empty, so callers can ask for the "no coverage" state.
pub fn current_pincode(req: &HttpRequest, query: Option<String>, state: &AppState) -> String {
    if let Some(explicit) = query {
        return explicit;
    }
    req.cookie(PINCODE_COOKIE)
        .map(|c| c.value().to_string())
        .unwrap_or_else(|| state.default_pincode.to_string())
}

/// GET /location
#[utoipa::path(
    get,
    path = "/location",
    responses((status = 200, description = "Current delivery pincode", body = LocationResponse)),
    tag = "location"
)]
pub async fn get_location(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let stored = req
        .cookie(PINCODE_COOKIE)
        .and_then(|c| c.value().parse::<Pincode>().ok());
    let body = match stored {
        Some(p) => LocationResponse {
            pincode: p.to_string(),
            is_default: false,
        },
        None => LocationResponse {
            pincode: state.default_pincode.to_string(),
            is_default: true,
        },
    };
    HttpResponse::Ok().json(body)
}

/// PUT /location
#[utoipa::path(
    put,
    path = "/location",
    request_body = SetLocationRequest,
    responses(
        (status = 200, description = "Location saved", body = LocationResponse),
        (status = 400, description = "Pincode is not 6 digits"),
    ),
    tag = "location"
)]
pub async fn set_location(body: web::Json<SetLocationRequest>) -> Result<HttpResponse, AppError> {
    let pincode: Pincode = body.pincode.parse()?;
    let cookie = Cookie::build(PINCODE_COOKIE, pincode.to_string())
        .path("/")
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(365))
        .finish();
    log::debug!("location set to {}", pincode);
    Ok(HttpResponse::Ok().cookie(cookie).json(LocationResponse {
        pincode: pincode.to_string(),
        is_default: false,
    }))
}
