use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::ports::Identity;
use crate::domain::session::{Role, SessionMarker};
use crate::errors::AppError;
use crate::gate::CUSTOMER_AREA;
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CustomerCredentials {
    pub email: String,
    pub password: String,
    /// Page to return to afterwards; ignored unless inside the customer area.
    #[serde(default)]
    pub redirect: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CustomerSessionResponse {
    pub uid: String,
    pub email: String,
    pub redirect: String,
}

fn signed_in(
    mut builder: actix_web::HttpResponseBuilder,
    state: &AppState,
    identity: Identity,
    redirect: Option<String>,
) -> HttpResponse {
    for cookie in state.sessions.issue(&SessionMarker {
        role: Role::Customer,
        actor_id: identity.uid.clone(),
        created_at: Some(Utc::now()),
        test_mode: false,
    }) {
        builder.cookie(cookie);
    }
    let redirect = CUSTOMER_AREA
        .safe_return(redirect.as_deref())
        .unwrap_or_else(|| CUSTOMER_AREA.dashboard.to_string());
    builder.json(CustomerSessionResponse {
        uid: identity.uid,
        email: identity.email,
        redirect,
    })
}

/// POST /account/login
#[utoipa::path(
    post,
    path = "/account/login",
    request_body = CustomerCredentials,
    responses(
        (status = 200, description = "Signed in", body = CustomerSessionResponse),
        (status = 401, description = "Invalid email or password"),
        (status = 429, description = "Too many attempts"),
        (status = 502, description = "Identity provider unavailable"),
    ),
    tag = "account"
)]
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<CustomerCredentials>,
) -> Result<HttpResponse, AppError> {
    let CustomerCredentials {
        email,
        password,
        redirect,
    } = body.into_inner();
    let identity = state.identity.sign_in(email.trim(), &password).await?;
    log::info!("customer {} signed in", identity.uid);
    Ok(signed_in(HttpResponse::Ok(), &state, identity, redirect))
}

/// POST /account/register
#[utoipa::path(
    post,
    path = "/account/register",
    request_body = CustomerCredentials,
    responses(
        (status = 201, description = "Account created and signed in", body = CustomerSessionResponse),
        (status = 400, description = "Password too weak"),
        (status = 409, description = "Email already in use"),
    ),
    tag = "account"
)]
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<CustomerCredentials>,
) -> Result<HttpResponse, AppError> {
    let CustomerCredentials {
        email,
        password,
        redirect,
    } = body.into_inner();
    let identity = state.identity.sign_up(email.trim(), &password).await?;
    log::info!("customer {} registered", identity.uid);
    Ok(signed_in(HttpResponse::Created(), &state, identity, redirect))
}

/// POST /account/logout
#[utoipa::path(
    post,
    path = "/account/logout",
    responses((status = 200, description = "Session cleared")),
    tag = "account"
)]
pub async fn logout(state: web::Data<AppState>) -> HttpResponse {
    let mut builder = HttpResponse::Ok();
    for cookie in state.sessions.clear(Role::Customer) {
        builder.cookie(cookie);
    }
    builder.json(json!({ "redirect": CUSTOMER_AREA.login }))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::{json, Value};

    use crate::testing::{response_cookies, FakeIdentity, FakeImageHost, Harness};

    #[actix_web::test]
    async fn sign_in_opens_the_order_history() {
        let h = Harness::build(
            vec![],
            vec![],
            FakeIdentity::with_account("asha@example.com", "pw", "cust-1"),
            FakeImageHost::default(),
            &[],
        );
        let app = test::init_service(
            App::new()
                .app_data(h.data())
                .configure(|c| crate::routes(c, 1024)),
        )
        .await;

        let req = test::TestRequest::get().uri("/orders").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(
            resp.headers().get("location").unwrap(),
            "/account/login?redirect=%2Forders"
        );

        let req = test::TestRequest::post()
            .uri("/account/login")
            .set_json(json!({ "email": "asha@example.com", "password": "nope" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(response_cookies(&resp).is_empty());

        let req = test::TestRequest::post()
            .uri("/account/login")
            .set_json(json!({ "email": "asha@example.com", "password": "pw", "redirect": "/checkout" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let cookies = response_cookies(&resp);
        assert!(cookies.iter().any(|c| c.name() == "customer_session"));
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["uid"], "cust-1");
        assert_eq!(body["redirect"], "/checkout");

        let mut req = test::TestRequest::get().uri("/orders");
        for c in cookies {
            req = req.cookie(c);
        }
        let body: Value = test::call_and_read_body_json(&app, req.to_request()).await;
        assert!(body.as_array().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn registration_signs_the_customer_in() {
        let h = Harness::new(vec![], vec![]);
        let app = test::init_service(
            App::new()
                .app_data(h.data())
                .configure(|c| crate::routes(c, 1024)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/account/register")
            .set_json(json!({ "email": "new@example.com", "password": "pw" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert!(response_cookies(&resp)
            .iter()
            .any(|c| c.name() == "customer_session"));
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["redirect"], "/orders");

        let req = test::TestRequest::post()
            .uri("/account/register")
            .set_json(json!({ "email": "new@example.com", "password": "pw" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn vendor_session_is_not_a_customer_session() {
        let h = Harness::new(vec![], vec![]);
        let app = test::init_service(
            App::new()
                .app_data(h.data())
                .configure(|c| crate::routes(c, 1024)),
        )
        .await;

        let mut req = test::TestRequest::get().uri("/orders");
        for c in h.session(crate::domain::session::Role::Vendor, "cust-1") {
            req = req.cookie(c);
        }
        let resp = test::call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
    }
}
