use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::domain::session::Role;
use crate::errors::AppError;
use crate::gate::{Actor, DELIVERY_AREA};
use crate::state::AppState;

use super::admin::{staff_login, staff_logout, StaffLoginRequest, StaffLoginResponse};
use super::blocking;
use super::orders::{order_list, OrderResponse};

/// POST /delivery/login
#[utoipa::path(
    post,
    path = "/delivery/login",
    request_body = StaffLoginRequest,
    responses(
        (status = 200, description = "Signed in", body = StaffLoginResponse),
        (status = 401, description = "Invalid email or password"),
        (status = 403, description = "Account is not on the delivery roster"),
    ),
    tag = "delivery"
)]
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<StaffLoginRequest>,
) -> Result<HttpResponse, AppError> {
    staff_login(&state, Role::Delivery, body.into_inner()).await
}

/// POST /delivery/logout
#[utoipa::path(
    post,
    path = "/delivery/logout",
    responses((status = 200, description = "Session cleared")),
    tag = "delivery"
)]
pub async fn logout(state: web::Data<AppState>) -> HttpResponse {
    staff_logout(&state, Role::Delivery, DELIVERY_AREA.login)
}

/// GET /delivery/orders
///
/// Orders ready for pickup or already out for delivery.
#[utoipa::path(
    get,
    path = "/delivery/orders",
    responses((status = 200, description = "Delivery queue", body = Vec<OrderResponse>)),
    tag = "delivery"
)]
pub async fn queue(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let orders = state.orders.clone();
    let list = blocking(move || orders.delivery_queue()).await?;
    Ok(HttpResponse::Ok().json(order_list(list)))
}

/// POST /delivery/orders/{id}/assign
#[utoipa::path(
    post,
    path = "/delivery/orders/{id}/assign",
    params(("id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Out for delivery with the caller assigned", body = OrderResponse),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Order is not ready for pickup"),
    ),
    tag = "delivery"
)]
pub async fn assign(
    state: web::Data<AppState>,
    actor: Actor,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let orders = state.orders.clone();
    let rider = actor.id().to_string();
    let order = blocking(move || orders.assign_delivery(&rider, id)).await?;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// POST /delivery/orders/{id}/delivered
#[utoipa::path(
    post,
    path = "/delivery/orders/{id}/delivered",
    params(("id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Order delivered", body = OrderResponse),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Order is not out for delivery with the caller"),
    ),
    tag = "delivery"
)]
pub async fn deliver(
    state: web::Data<AppState>,
    actor: Actor,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let orders = state.orders.clone();
    let rider = actor.id().to_string();
    let order = blocking(move || orders.mark_delivered(&rider, id)).await?;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}
