use actix_web::{web, HttpRequest, HttpResponse};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::product::{Product, ProductImage};
use crate::domain::vendor::Vendor;
use crate::errors::AppError;
use crate::state::AppState;

use super::blocking;
use super::location::{current_pincode, PincodeQuery};

// ── Response DTOs ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, ToSchema)]
pub struct ImageResponse {
    pub url: String,
    pub public_id: String,
}

impl From<ProductImage> for ImageResponse {
    fn from(i: ProductImage) -> Self {
        Self {
            url: i.url,
            public_id: i.public_id,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub vendor_id: String,
    pub name: String,
    pub description: String,
    /// Decimal string, e.g. "45.00"
    pub price: String,
    pub mrp: String,
    pub category: String,
    pub unit: String,
    pub stock: i32,
    pub pincodes: Vec<String>,
    pub images: Vec<ImageResponse>,
    pub status: String,
    pub version: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            vendor_id: p.vendor_id,
            name: p.name,
            description: p.description,
            price: p.price.to_string(),
            mrp: p.mrp.to_string(),
            category: p.category,
            unit: p.unit,
            stock: p.stock,
            pincodes: p.pincodes.into_iter().map(String::from).collect(),
            images: p.images.into_iter().map(ImageResponse::from).collect(),
            status: p.status.to_string(),
            version: p.version,
            created_at: p.created_at.to_rfc3339(),
            updated_at: p.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductListResponse {
    pub pincode: String,
    pub items: Vec<ProductResponse>,
    pub total: usize,
}

impl ProductListResponse {
    fn new(pincode: String, products: Vec<Product>) -> Self {
        Self {
            pincode,
            total: products.len(),
            items: products.into_iter().map(ProductResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoriesResponse {
    pub pincode: String,
    pub categories: Vec<String>,
}

/// What customers see of a vendor.
#[derive(Debug, Serialize, ToSchema)]
pub struct StoreResponse {
    pub id: String,
    pub name: String,
    pub address: String,
    pub is_open: bool,
}

impl From<Vendor> for StoreResponse {
    fn from(v: Vendor) -> Self {
        Self {
            id: v.id,
            name: v.name,
            address: v.address,
            is_open: v.is_open,
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /products
///
/// Active products deliverable to the pincode, sorted by name.
#[utoipa::path(
    get,
    path = "/products",
    params(PincodeQuery),
    responses(
        (status = 200, description = "Deliverable products", body = ProductListResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "catalog"
)]
pub async fn list_products(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<PincodeQuery>,
) -> Result<HttpResponse, AppError> {
    let pincode = current_pincode(&req, query.into_inner().pincode, &state);
    let catalog = state.catalog.clone();
    let key = pincode.clone();
    let products = blocking(move || catalog.products_for_pincode(Some(&key))).await?;
    Ok(HttpResponse::Ok().json(ProductListResponse::new(pincode, products)))
}

/// GET /categories
///
/// Categories with at least one deliverable, active product.
#[utoipa::path(
    get,
    path = "/categories",
    params(PincodeQuery),
    responses(
        (status = 200, description = "Categories in coverage", body = CategoriesResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "catalog"
)]
pub async fn list_categories(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<PincodeQuery>,
) -> Result<HttpResponse, AppError> {
    let pincode = current_pincode(&req, query.into_inner().pincode, &state);
    let catalog = state.catalog.clone();
    let key = pincode.clone();
    let categories = blocking(move || catalog.categories_for_pincode(Some(&key))).await?;
    Ok(HttpResponse::Ok().json(CategoriesResponse {
        pincode,
        categories,
    }))
}

/// GET /categories/{category}/products
#[utoipa::path(
    get,
    path = "/categories/{category}/products",
    params(
        ("category" = String, Path, description = "Category slug"),
        PincodeQuery,
    ),
    responses(
        (status = 200, description = "Deliverable products in the category", body = ProductListResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "catalog"
)]
pub async fn list_category_products(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PincodeQuery>,
) -> Result<HttpResponse, AppError> {
    let category = path.into_inner();
    let pincode = current_pincode(&req, query.into_inner().pincode, &state);
    let catalog = state.catalog.clone();
    let key = pincode.clone();
    let products =
        blocking(move || catalog.products_for_category(&category, Some(&key))).await?;
    Ok(HttpResponse::Ok().json(ProductListResponse::new(pincode, products)))
}

/// GET /products/{id}
#[utoipa::path(
    get,
    path = "/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID")),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 404, description = "Product not found"),
    ),
    tag = "catalog"
)]
pub async fn get_product(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let catalog = state.catalog.clone();
    let product = blocking(move || catalog.product_by_id(id)).await?;
    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}

/// GET /stores
///
/// Active vendors serving the pincode.
#[utoipa::path(
    get,
    path = "/stores",
    params(PincodeQuery),
    responses((status = 200, description = "Vendors serving the pincode", body = Vec<StoreResponse>)),
    tag = "catalog"
)]
pub async fn list_stores(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<PincodeQuery>,
) -> Result<HttpResponse, AppError> {
    let pincode = current_pincode(&req, query.into_inner().pincode, &state);
    let catalog = state.catalog.clone();
    let vendors = blocking(move || catalog.vendors_for_pincode(Some(&pincode))).await?;
    let body: Vec<StoreResponse> = vendors.into_iter().map(StoreResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

#[cfg(test)]
mod tests {
    use actix_web::cookie::Cookie;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::Value;

    use crate::domain::product::fixtures::product;
    use crate::domain::product::ProductStatus;
    use crate::testing::Harness;

    fn names(body: &Value) -> Vec<&str> {
        body["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap())
            .collect()
    }

    #[actix_web::test]
    async fn listing_follows_query_then_cookie_then_default() {
        let h = Harness::new(
            vec![
                product("Milk", "dairy", &["110001"], ProductStatus::Active),
                product("Apples", "fruit", &["110002"], ProductStatus::Active),
                product("Bread", "bakery", &["110001"], ProductStatus::OutOfStock),
            ],
            vec![],
        );
        let app = test::init_service(
            App::new()
                .app_data(h.data())
                .configure(|c| crate::routes(c, 1024)),
        )
        .await;

        let req = test::TestRequest::get().uri("/products?pincode=110002").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(names(&body), vec!["Apples"]);

        let req = test::TestRequest::get()
            .uri("/products")
            .cookie(Cookie::new("pincode", "110002"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["pincode"], "110002");

        // Default pincode is 110001; out-of-stock bread stays hidden.
        let req = test::TestRequest::get().uri("/products").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(names(&body), vec!["Milk"]);

        let req = test::TestRequest::get().uri("/products?pincode=").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["total"], 0);
    }

    #[actix_web::test]
    async fn categories_and_deleted_products() {
        let gone = product("Old cheese", "dairy", &["110001"], ProductStatus::Deleted);
        let gone_id = gone.id;
        let h = Harness::new(
            vec![
                product("Milk", "dairy", &["110001"], ProductStatus::Active),
                product("Bananas", "fruit", &["110001"], ProductStatus::Active),
                gone,
            ],
            vec![],
        );
        let app = test::init_service(
            App::new()
                .app_data(h.data())
                .configure(|c| crate::routes(c, 1024)),
        )
        .await;

        let req = test::TestRequest::get().uri("/categories?pincode=110001").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["categories"], serde_json::json!(["dairy", "fruit"]));

        let req = test::TestRequest::get()
            .uri(&format!("/products/{gone_id}"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn location_cookie_round_trip() {
        let h = Harness::new(vec![], vec![]);
        let app = test::init_service(
            App::new()
                .app_data(h.data())
                .configure(|c| crate::routes(c, 1024)),
        )
        .await;

        let req = test::TestRequest::put()
            .uri("/location")
            .set_json(serde_json::json!({ "pincode": "12345" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::put()
            .uri("/location")
            .set_json(serde_json::json!({ "pincode": "560001" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        let cookie = resp.response().cookies().next().unwrap().into_owned();
        assert_eq!(cookie.value(), "560001");

        let req = test::TestRequest::get().uri("/location").cookie(cookie).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["pincode"], "560001");
        assert_eq!(body["is_default"], false);
    }
}
