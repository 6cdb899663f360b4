use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::domain::session::{Role, SessionMarker};
use crate::domain::vendor::VendorStatus;
use crate::errors::AppError;
use crate::gate::{ADMIN_AREA, DELIVERY_AREA};
use crate::state::AppState;

use super::blocking;
use super::orders::{ListOrdersParams, ListOrdersResponse};
use super::vendor::VendorResponse;

#[derive(Debug, Deserialize, ToSchema)]
pub struct StaffLoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StaffLoginResponse {
    pub uid: String,
    pub email: String,
    pub redirect: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct VendorFilter {
    /// pending, active or blocked
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct StatusChangeRequest {
    pub status: String,
    pub version: i32,
}

/// Shared by the admin and delivery logins: the identity must be on the
/// role's staff list.
pub(crate) async fn staff_login(
    state: &AppState,
    role: Role,
    body: StaffLoginRequest,
) -> Result<HttpResponse, AppError> {
    let identity = state.identity.sign_in(body.email.trim(), &body.password).await?;
    state.staff.authorize(role, &identity)?;

    let dashboard = match role {
        Role::Delivery => DELIVERY_AREA.dashboard,
        _ => ADMIN_AREA.dashboard,
    };
    let mut builder = HttpResponse::Ok();
    for cookie in state.sessions.issue(&SessionMarker {
        role,
        actor_id: identity.uid.clone(),
        created_at: None,
        test_mode: false,
    }) {
        builder.cookie(cookie);
    }
    log::info!("{} {} signed in", role.as_str(), identity.uid);
    Ok(builder.json(StaffLoginResponse {
        uid: identity.uid,
        email: identity.email,
        redirect: dashboard.to_string(),
    }))
}

pub(crate) fn staff_logout(state: &AppState, role: Role, login: &str) -> HttpResponse {
    let mut builder = HttpResponse::Ok();
    for cookie in state.sessions.clear(role) {
        builder.cookie(cookie);
    }
    builder.json(json!({ "redirect": login }))
}

/// POST /admin/login
#[utoipa::path(
    post,
    path = "/admin/login",
    request_body = StaffLoginRequest,
    responses(
        (status = 200, description = "Signed in", body = StaffLoginResponse),
        (status = 401, description = "Invalid email or password"),
        (status = 403, description = "Account is not an admin"),
    ),
    tag = "admin"
)]
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<StaffLoginRequest>,
) -> Result<HttpResponse, AppError> {
    staff_login(&state, Role::Admin, body.into_inner()).await
}

/// POST /admin/logout
#[utoipa::path(
    post,
    path = "/admin/logout",
    responses((status = 200, description = "Session cleared")),
    tag = "admin"
)]
pub async fn logout(state: web::Data<AppState>) -> HttpResponse {
    staff_logout(&state, Role::Admin, ADMIN_AREA.login)
}

/// GET /admin/vendors
#[utoipa::path(
    get,
    path = "/admin/vendors",
    params(VendorFilter),
    responses(
        (status = 200, description = "Vendors, newest first", body = Vec<VendorResponse>),
        (status = 400, description = "Unknown status filter"),
    ),
    tag = "admin"
)]
pub async fn list_vendors(
    state: web::Data<AppState>,
    query: web::Query<VendorFilter>,
) -> Result<HttpResponse, AppError> {
    let status = query
        .into_inner()
        .status
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<VendorStatus>())
        .transpose()?;
    let vendors = state.vendors.clone();
    let list = blocking(move || vendors.list(status)).await?;
    let body: Vec<VendorResponse> = list.into_iter().map(VendorResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// PUT /admin/vendors/{id}/status
///
/// Approve, reject, block or unblock a vendor.
#[utoipa::path(
    put,
    path = "/admin/vendors/{id}/status",
    params(("id" = String, Path, description = "Vendor account id")),
    request_body = StatusChangeRequest,
    responses(
        (status = 200, description = "Status changed", body = VendorResponse),
        (status = 404, description = "Vendor not found"),
        (status = 409, description = "Transition not allowed, or stale version"),
    ),
    tag = "admin"
)]
pub async fn set_vendor_status(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<StatusChangeRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let req = body.into_inner();
    let status: VendorStatus = req.status.parse()?;
    let vendors = state.vendors.clone();
    let vendor = blocking(move || vendors.set_status(&id, status, req.version)).await?;
    Ok(HttpResponse::Ok().json(VendorResponse::from(vendor)))
}

/// GET /admin/orders
///
/// Every order, newest first, paginated.
#[utoipa::path(
    get,
    path = "/admin/orders",
    params(ListOrdersParams),
    responses(
        (status = 200, description = "Paginated list of orders", body = ListOrdersResponse),
        (status = 400, description = "Invalid pagination parameters"),
    ),
    tag = "admin"
)]
pub async fn list_orders(
    state: web::Data<AppState>,
    query: web::Query<ListOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let ListOrdersParams { page, limit } = query.into_inner();
    if page < 1 {
        return Err(AppError::BadRequest("page must be >= 1".to_string()));
    }
    if !(1..=100).contains(&limit) {
        return Err(AppError::BadRequest(
            "limit must be between 1 and 100".to_string(),
        ));
    }
    let orders = state.orders.clone();
    let result = blocking(move || orders.list(page, limit)).await?;
    Ok(HttpResponse::Ok().json(ListOrdersResponse::new(result, page, limit)))
}
