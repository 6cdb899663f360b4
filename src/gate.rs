//! Role-area gate.
//!
//! `decide` is the whole policy and is pure; the middleware functions only
//! gather its inputs (session marker, current account status) and turn the
//! decision into a redirect or a pass-through.

use std::future::{ready, Ready};

use actix_web::body::{EitherBody, MessageBody};
use actix_web::dev::{Payload, ServiceRequest, ServiceResponse};
use actix_web::http::{header, Method};
use actix_web::middleware::Next;
use actix_web::{web, Error, FromRequest, HttpMessage, HttpRequest, HttpResponse};

use crate::domain::session::{Role, SessionMarker};
use crate::domain::vendor::VendorStatus;
use crate::errors::AppError;
use crate::state::AppState;

/// Route layout of one gated area.
#[derive(Debug)]
pub struct Area {
    pub role: Role,
    /// Path roots the area's gate is mounted on.
    pub prefixes: &'static [&'static str],
    pub login: &'static str,
    pub dashboard: &'static str,
    /// Where inactive accounts are sent. Areas without account status have none.
    pub status_check: Option<&'static str>,
    /// Reachable without a session.
    pub public: &'static [&'static str],
    /// Reachable by any session holder, active or not.
    pub any_session: &'static [&'static str],
}

pub const CUSTOMER_AREA: Area = Area {
    role: Role::Customer,
    prefixes: &["/account", "/checkout", "/orders"],
    login: "/account/login",
    dashboard: "/orders",
    status_check: None,
    public: &["/account/login", "/account/register"],
    any_session: &["/account/logout"],
};

pub const VENDOR_AREA: Area = Area {
    role: Role::Vendor,
    prefixes: &["/vendor"],
    login: "/vendor/login",
    dashboard: "/vendor/dashboard",
    status_check: Some("/vendor/status"),
    public: &["/vendor/login", "/vendor/register"],
    any_session: &["/vendor/status", "/vendor/logout"],
};

pub const ADMIN_AREA: Area = Area {
    role: Role::Admin,
    prefixes: &["/admin"],
    login: "/admin/login",
    dashboard: "/admin/vendors",
    status_check: None,
    public: &["/admin/login"],
    any_session: &["/admin/logout"],
};

pub const DELIVERY_AREA: Area = Area {
    role: Role::Delivery,
    prefixes: &["/delivery"],
    login: "/delivery/login",
    dashboard: "/delivery/orders",
    status_check: None,
    public: &["/delivery/login"],
    any_session: &["/delivery/logout"],
};

/// What the gate knows about the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Anonymous,
    Inactive,
    Active,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Proceed,
    RedirectToLogin { return_to: String },
    RedirectToStatusCheck,
    RedirectToDashboard { target: String },
}

fn normalize(path: &str) -> &str {
    if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    }
}

impl Area {
    /// A return target is honoured only when it stays inside this area and
    /// is not the login page itself.
    pub fn safe_return(&self, target: Option<&str>) -> Option<String> {
        let target = target?.trim();
        let path = target.split(['?', '#']).next().unwrap_or_default();
        let inside = self
            .prefixes
            .iter()
            .any(|prefix| path == *prefix || path.starts_with(&format!("{prefix}/")));
        if !inside || target.starts_with("//") || target.contains('\\') {
            return None;
        }
        if self.public.contains(&normalize(path)) {
            return None;
        }
        Some(target.to_string())
    }

    pub fn login_url(&self, return_to: &str) -> String {
        let mut url = match reqwest::Url::parse(&format!("http://gate{}", self.login)) {
            Ok(url) => url,
            Err(_) => return self.login.to_string(),
        };
        url.query_pairs_mut().append_pair("redirect", return_to);
        match url.query() {
            Some(q) => format!("{}?{}", self.login, q),
            None => self.login.to_string(),
        }
    }
}

/// Gate policy for one request.
///
/// `path` is the request path, `path_and_query` the full target to come back
/// to, and `requested_return` the `redirect` parameter of a login page visit.
pub fn decide(
    area: &Area,
    method: &Method,
    path: &str,
    path_and_query: &str,
    access: Access,
    requested_return: Option<&str>,
) -> GateDecision {
    let path = normalize(path);

    if area.public.contains(&path) {
        if path == area.login && *method == Method::GET && access == Access::Active {
            let target = area
                .safe_return(requested_return)
                .unwrap_or_else(|| area.dashboard.to_string());
            return GateDecision::RedirectToDashboard { target };
        }
        return GateDecision::Proceed;
    }

    match access {
        Access::Anonymous => GateDecision::RedirectToLogin {
            return_to: path_and_query.to_string(),
        },
        _ if area.any_session.contains(&path) => GateDecision::Proceed,
        Access::Inactive => match area.status_check {
            Some(_) => GateDecision::RedirectToStatusCheck,
            None => GateDecision::RedirectToLogin {
                return_to: path_and_query.to_string(),
            },
        },
        Access::Active => GateDecision::Proceed,
    }
}

pub fn access_for_status(status: Option<VendorStatus>) -> Access {
    match status {
        None => Access::Anonymous,
        Some(VendorStatus::Active) => Access::Active,
        Some(_) => Access::Inactive,
    }
}

async fn resolve_access(
    area: &Area,
    state: &AppState,
    marker: Option<&SessionMarker>,
) -> Result<Access, Error> {
    let Some(marker) = marker else {
        return Ok(Access::Anonymous);
    };
    match area.role {
        Role::Customer => Ok(Access::Active),
        Role::Vendor => {
            let vendors = state.vendors.clone();
            let id = marker.actor_id.clone();
            let status = web::block(move || vendors.status_of(&id))
                .await?
                .map_err(AppError::from)?;
            Ok(access_for_status(status))
        }
        role if state.staff.is_member(role, &marker.actor_id) => Ok(Access::Active),
        _ => Ok(Access::Anonymous),
    }
}

fn query_param(query: &str, name: &str) -> Option<String> {
    web::Query::<std::collections::HashMap<String, String>>::from_query(query)
        .ok()
        .and_then(|q| q.get(name).cloned())
}

async fn guard<B: MessageBody>(
    area: &'static Area,
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<EitherBody<B>>, Error> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .cloned()
        .ok_or_else(|| AppError::Internal("application state missing".to_string()))?;

    let marker = state.sessions.read(area.role, |name| req.cookie(name));
    let access = resolve_access(area, &state, marker.as_ref()).await?;

    let path_and_query = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| req.path().to_string());
    let requested_return = query_param(req.query_string(), "redirect");
    let decision = decide(
        area,
        req.method(),
        req.path(),
        &path_and_query,
        access,
        requested_return.as_deref(),
    );

    let location = match decision {
        GateDecision::Proceed => {
            if let (Some(marker), Access::Active | Access::Inactive) = (marker, access) {
                req.extensions_mut().insert(marker);
            }
            return next.call(req).await.map(ServiceResponse::map_into_left_body);
        }
        GateDecision::RedirectToLogin { return_to } => {
            log::debug!("{} gate: anonymous request for {}", area.role.as_str(), return_to);
            area.login_url(&return_to)
        }
        GateDecision::RedirectToStatusCheck => {
            area.status_check.unwrap_or(area.login).to_string()
        }
        GateDecision::RedirectToDashboard { target } => target,
    };

    let response = HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
        .map_into_right_body();
    Ok(req.into_response(response))
}

pub async fn customer_gate<B: MessageBody>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<EitherBody<B>>, Error> {
    guard(&CUSTOMER_AREA, req, next).await
}

pub async fn vendor_gate<B: MessageBody>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<EitherBody<B>>, Error> {
    guard(&VENDOR_AREA, req, next).await
}

pub async fn admin_gate<B: MessageBody>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<EitherBody<B>>, Error> {
    guard(&ADMIN_AREA, req, next).await
}

pub async fn delivery_gate<B: MessageBody>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<EitherBody<B>>, Error> {
    guard(&DELIVERY_AREA, req, next).await
}

/// The session holder admitted by the gate.
#[derive(Debug, Clone)]
pub struct Actor(pub SessionMarker);

impl Actor {
    pub fn id(&self) -> &str {
        &self.0.actor_id
    }
}

impl FromRequest for Actor {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<SessionMarker>()
                .cloned()
                .map(Actor)
                .ok_or(AppError::Unauthenticated),
        )
    }
}
