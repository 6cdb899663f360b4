use actix_web::http::header;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::order::{
    CheckoutLine, CheckoutRequest, DeliveryAddress, DeliveryOption, Order, OrderItem,
    PaymentMethod,
};
use crate::domain::ports::ListResult;
use crate::errors::AppError;
use crate::gate::Actor;
use crate::state::AppState;

use super::blocking;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutLineRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddressRequest {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub pincode: String,
    pub city: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutRequestBody {
    pub items: Vec<CheckoutLineRequest>,
    pub address: AddressRequest,
    /// "standard" (fee 40) or "express" (fee 60). Defaults to standard.
    #[serde(default)]
    pub delivery_option: Option<String>,
    /// "cod" or "online"
    pub payment_method: String,
}

impl CheckoutRequestBody {
    fn into_domain(self, customer_id: &str) -> Result<CheckoutRequest, AppError> {
        let delivery_option = match self.delivery_option.as_deref() {
            None | Some("") => DeliveryOption::Standard,
            Some(raw) => raw.parse::<DeliveryOption>()?,
        };
        Ok(CheckoutRequest {
            user_id: customer_id.to_string(),
            lines: self
                .items
                .into_iter()
                .map(|l| CheckoutLine {
                    product_id: l.product_id,
                    quantity: l.quantity,
                })
                .collect(),
            address: DeliveryAddress {
                name: self.address.name,
                phone: self.address.phone,
                address: self.address.address,
                pincode: self.address.pincode.parse()?,
                city: self.address.city,
            },
            delivery_option,
            payment_method: self.payment_method.parse::<PaymentMethod>()?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub product_id: Uuid,
    pub vendor_id: String,
    pub name: String,
    pub price: String,
    pub quantity: i32,
}

impl From<OrderItem> for OrderItemResponse {
    fn from(i: OrderItem) -> Self {
        Self {
            product_id: i.product_id,
            vendor_id: i.vendor_id,
            name: i.name,
            price: i.price.to_string(),
            quantity: i.quantity,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AddressResponse {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub pincode: String,
    pub city: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub customer_id: String,
    pub status: String,
    pub payment_method: String,
    pub payment_status: String,
    pub subtotal: String,
    pub delivery_fee: String,
    pub total: String,
    pub address: AddressResponse,
    pub delivery_person_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub items: Vec<OrderItemResponse>,
}

impl From<Order> for OrderResponse {
    fn from(o: Order) -> Self {
        Self {
            id: o.id,
            customer_id: o.user_id,
            status: o.status.to_string(),
            payment_method: o.payment_method.as_str().to_string(),
            payment_status: o.payment_status.as_str().to_string(),
            subtotal: o.subtotal.to_string(),
            delivery_fee: o.delivery_fee.to_string(),
            total: o.total.to_string(),
            address: AddressResponse {
                name: o.address.name,
                phone: o.address.phone,
                address: o.address.address,
                pincode: o.address.pincode.to_string(),
                city: o.address.city,
            },
            delivery_person_id: o.delivery_person_id,
            created_at: o.created_at.to_rfc3339(),
            updated_at: o.updated_at.to_rfc3339(),
            items: o.items.into_iter().map(OrderItemResponse::from).collect(),
        }
    }
}

pub(crate) fn order_list(orders: Vec<Order>) -> Vec<OrderResponse> {
    orders.into_iter().map(OrderResponse::from).collect()
}

// ── Pagination ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListOrdersParams {
    /// Page number (1-based). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: i64,
    /// Number of items per page. Defaults to 20, maximum 100.
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListOrdersResponse {
    pub items: Vec<OrderResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

impl ListOrdersResponse {
    pub(crate) fn new(result: ListResult<Order>, page: i64, limit: i64) -> Self {
        Self {
            items: order_list(result.items),
            total: result.total,
            page,
            limit,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct SuccessQuery {
    pub order_id: Uuid,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /checkout
///
/// Prices the cart from the catalog and places the order for the signed-in
/// customer. On success the client is sent to the confirmation page.
#[utoipa::path(
    post,
    path = "/checkout",
    request_body = CheckoutRequestBody,
    responses(
        (status = 303, description = "Order placed; Location points at the confirmation page"),
        (status = 302, description = "Not signed in; sent to the customer login"),
        (status = 400, description = "Cart, address or payment details invalid"),
        (status = 404, description = "A product in the cart does not exist"),
    ),
    tag = "orders"
)]
pub async fn checkout(
    state: web::Data<AppState>,
    actor: Actor,
    body: web::Json<CheckoutRequestBody>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner().into_domain(actor.id())?;
    let orders = state.orders.clone();
    let order = blocking(move || orders.checkout(request)).await?;

    Ok(HttpResponse::SeeOther()
        .insert_header((
            header::LOCATION,
            format!("/checkout/success?orderId={}", order.id),
        ))
        .json(json!({ "id": order.id })))
}

/// GET /checkout/success
#[utoipa::path(
    get,
    path = "/checkout/success",
    params(SuccessQuery),
    responses(
        (status = 200, description = "Order confirmation", body = OrderResponse),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn checkout_success(
    state: web::Data<AppState>,
    actor: Actor,
    query: web::Query<SuccessQuery>,
) -> Result<HttpResponse, AppError> {
    let id = query.into_inner().order_id;
    let orders = state.orders.clone();
    let customer_id = actor.id().to_string();
    let order = blocking(move || orders.get_for_customer(&customer_id, id)).await?;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// GET /orders/{id}
///
/// One of the customer's own orders, with its items.
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "No such order for this customer"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    state: web::Data<AppState>,
    actor: Actor,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let orders = state.orders.clone();
    let customer_id = actor.id().to_string();
    let order = blocking(move || orders.get_for_customer(&customer_id, order_id)).await?;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// GET /orders
///
/// The signed-in customer's orders, newest first.
#[utoipa::path(
    get,
    path = "/orders",
    responses(
        (status = 200, description = "Orders of the customer", body = Vec<OrderResponse>),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn list_customer_orders(
    state: web::Data<AppState>,
    actor: Actor,
) -> Result<HttpResponse, AppError> {
    let customer_id = actor.id().to_string();
    let orders = state.orders.clone();
    let list = blocking(move || orders.list_for_user(&customer_id)).await?;
    Ok(HttpResponse::Ok().json(order_list(list)))
}

/// POST /orders/{id}/cancel
#[utoipa::path(
    post,
    path = "/orders/{id}/cancel",
    params(("id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Order cancelled", body = OrderResponse),
        (status = 404, description = "No such order for this customer"),
        (status = 409, description = "Order already delivered or cancelled"),
    ),
    tag = "orders"
)]
pub async fn cancel_order(
    state: web::Data<AppState>,
    actor: Actor,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let customer_id = actor.id().to_string();
    let orders = state.orders.clone();
    let order = blocking(move || orders.cancel_for_customer(&customer_id, id)).await?;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::{json, Value};
    use uuid::Uuid;

    use crate::domain::product::fixtures::product;
    use crate::domain::product::ProductStatus;
    use crate::domain::session::Role;
    use crate::domain::vendor::fixtures::vendor;
    use crate::domain::vendor::VendorStatus;
    use crate::testing::{Harness, RIDER_UID};

    fn as_customer(req: test::TestRequest, h: &Harness, customer_id: &str) -> test::TestRequest {
        h.session(Role::Customer, customer_id)
            .into_iter()
            .fold(req, |req, c| req.cookie(c))
    }

    fn checkout_body(product_id: Uuid, payment: &str) -> Value {
        json!({
            "items": [{ "product_id": product_id, "quantity": 2 }],
            "address": {
                "name": "Asha",
                "phone": "9000000000",
                "address": "4 Lake View",
                "pincode": "110001",
                "city": "Delhi"
            },
            "delivery_option": "express",
            "payment_method": payment
        })
    }

    #[actix_web::test]
    async fn checkout_redirects_to_confirmation_with_server_prices() {
        let milk = product("Milk", "dairy", &["110001"], ProductStatus::Active);
        let milk_id = milk.id;
        let h = Harness::new(
            vec![milk],
            vec![vendor("vendor-1", VendorStatus::Active, &["110001"])],
        );
        let app = test::init_service(
            App::new()
                .app_data(h.data())
                .configure(|c| crate::routes(c, 1024)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/checkout")
            .set_json(checkout_body(milk_id, "cod"));
        let resp = test::call_service(&app, as_customer(req, &h, "cust-1").to_request()).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        let location = resp
            .headers()
            .get("location")
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(location.starts_with("/checkout/success?orderId="));

        let req = test::TestRequest::get().uri(&location);
        let body: Value =
            test::call_and_read_body_json(&app, as_customer(req, &h, "cust-1").to_request()).await;
        assert_eq!(body["customer_id"], "cust-1");
        assert_eq!(body["status"], "pending");
        assert_eq!(body["payment_status"], "pending");
        assert_eq!(body["subtotal"], "90");
        assert_eq!(body["delivery_fee"], "60");
        assert_eq!(body["total"], "150");
        assert_eq!(body["items"][0]["name"], "Milk");

        let req = test::TestRequest::get().uri("/orders");
        let body: Value =
            test::call_and_read_body_json(&app, as_customer(req, &h, "cust-1").to_request()).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn checkout_rejects_unknown_payment_and_missing_products() {
        let h = Harness::new(vec![], vec![]);
        let app = test::init_service(
            App::new()
                .app_data(h.data())
                .configure(|c| crate::routes(c, 1024)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/checkout")
            .set_json(checkout_body(Uuid::new_v4(), "card"));
        let resp = test::call_service(&app, as_customer(req, &h, "cust-1").to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/checkout")
            .set_json(checkout_body(Uuid::new_v4(), "online"));
        let resp = test::call_service(&app, as_customer(req, &h, "cust-1").to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get().uri(&format!("/orders/{}", Uuid::new_v4()));
        let resp = test::call_service(&app, as_customer(req, &h, "cust-1").to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn order_moves_from_vendor_to_rider_to_customer() {
        let milk = product("Milk", "dairy", &["110001"], ProductStatus::Active);
        let milk_id = milk.id;
        let h = Harness::new(
            vec![milk],
            vec![vendor("vendor-1", VendorStatus::Active, &["110001"])],
        );
        let app = test::init_service(
            App::new()
                .app_data(h.data())
                .configure(|c| crate::routes(c, 1024)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/checkout")
            .set_json(checkout_body(milk_id, "cod"));
        let resp = test::call_service(&app, as_customer(req, &h, "cust-1").to_request()).await;
        let body: Value = test::read_body_json(resp).await;
        let order_id = body["id"].as_str().unwrap().to_string();

        for expected in ["confirmed", "preparing", "ready"] {
            let mut req =
                test::TestRequest::post().uri(&format!("/vendor/orders/{order_id}/advance"));
            for c in h.session(Role::Vendor, "vendor-1") {
                req = req.cookie(c);
            }
            let body: Value = test::call_and_read_body_json(&app, req.to_request()).await;
            assert_eq!(body["status"], expected);
        }

        let mut req = test::TestRequest::get().uri("/delivery/orders");
        for c in h.session(Role::Delivery, RIDER_UID) {
            req = req.cookie(c);
        }
        let body: Value = test::call_and_read_body_json(&app, req.to_request()).await;
        assert_eq!(body.as_array().unwrap().len(), 1);

        for (step, expected) in [("assign", "out_for_delivery"), ("delivered", "delivered")] {
            let mut req =
                test::TestRequest::post().uri(&format!("/delivery/orders/{order_id}/{step}"));
            for c in h.session(Role::Delivery, RIDER_UID) {
                req = req.cookie(c);
            }
            let body: Value = test::call_and_read_body_json(&app, req.to_request()).await;
            assert_eq!(body["status"], expected);
        }

        let req = test::TestRequest::post().uri(&format!("/orders/{order_id}/cancel"));
        let resp = test::call_service(&app, as_customer(req, &h, "cust-1").to_request()).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn delivery_area_rejects_non_roster_sessions() {
        let h = Harness::new(vec![], vec![]);
        let app = test::init_service(
            App::new()
                .app_data(h.data())
                .configure(|c| crate::routes(c, 1024)),
        )
        .await;

        let mut req = test::TestRequest::get().uri("/delivery/orders");
        for c in h.session(Role::Delivery, "stranger") {
            req = req.cookie(c);
        }
        let resp = test::call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(
            resp.headers().get("location").unwrap(),
            "/delivery/login?redirect=%2Fdelivery%2Forders"
        );
    }

    #[actix_web::test]
    async fn customer_routes_need_the_owning_customer() {
        let milk = product("Milk", "dairy", &["110001"], ProductStatus::Active);
        let milk_id = milk.id;
        let h = Harness::new(
            vec![milk],
            vec![vendor("vendor-1", VendorStatus::Active, &["110001"])],
        );
        let app = test::init_service(
            App::new()
                .app_data(h.data())
                .configure(|c| crate::routes(c, 1024)),
        )
        .await;

        // Anonymous checkout goes to the login page and places nothing.
        let req = test::TestRequest::post()
            .uri("/checkout")
            .set_json(checkout_body(milk_id, "cod"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(
            resp.headers().get("location").unwrap(),
            "/account/login?redirect=%2Fcheckout"
        );

        let req = test::TestRequest::post()
            .uri("/checkout")
            .set_json(checkout_body(milk_id, "cod"));
        let resp = test::call_service(&app, as_customer(req, &h, "cust-1").to_request()).await;
        let body: Value = test::read_body_json(resp).await;
        let order_id = body["id"].as_str().unwrap().to_string();

        for uri in [
            format!("/orders/{order_id}"),
            format!("/checkout/success?orderId={order_id}"),
        ] {
            let resp = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
            assert_eq!(resp.status(), StatusCode::FOUND, "{uri}");

            let req = test::TestRequest::get().uri(&uri);
            let resp = test::call_service(&app, as_customer(req, &h, "cust-2").to_request()).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
        }

        let req = test::TestRequest::get().uri("/orders");
        let body: Value =
            test::call_and_read_body_json(&app, as_customer(req, &h, "cust-2").to_request()).await;
        assert!(body.as_array().unwrap().is_empty());

        let req = test::TestRequest::post().uri(&format!("/orders/{order_id}/cancel"));
        let resp = test::call_service(&app, as_customer(req, &h, "cust-2").to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::post().uri(&format!("/orders/{order_id}/cancel"));
        let body: Value =
            test::call_and_read_body_json(&app, as_customer(req, &h, "cust-1").to_request()).await;
        assert_eq!(body["status"], "cancelled");
    }
}
