use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse, HttpResponseBuilder};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::application::vendor_service::{LoginOutcome, Registration};
use crate::domain::pincode::parse_delivery_areas;
use crate::domain::product::{NewProduct, ProductImage, ProductStatus, ProductUpdate};
use crate::domain::session::{LoginFailure, Role, SessionMarker};
use crate::domain::vendor::{Vendor, VendorProfileUpdate};
use crate::errors::AppError;
use crate::gate::{Actor, VENDOR_AREA};
use crate::media::{BatchSummary, HostedImage, ImageFile};
use crate::state::AppState;

use super::blocking;
use super::catalog::{ImageResponse, ProductResponse};
use super::orders::{order_list, OrderResponse};
use super::parse_money;

/// Upper bound on files in one batch upload request.
pub const MAX_BATCH_FILES: usize = 10;

// ── Request / response DTOs ──────────────────────────────────────────────────

/// A vendor as the vendor itself and admins see it.
#[derive(Debug, Serialize, ToSchema)]
pub struct VendorResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub pincodes: Vec<String>,
    pub status: String,
    pub is_open: bool,
    pub version: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Vendor> for VendorResponse {
    fn from(v: Vendor) -> Self {
        Self {
            id: v.id,
            name: v.name,
            email: v.email,
            phone: v.phone,
            address: v.address,
            pincodes: v.pincodes.into_iter().map(String::from).collect(),
            status: v.status.to_string(),
            is_open: v.is_open,
            version: v.version,
            created_at: v.created_at.to_rfc3339(),
            updated_at: v.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    /// Page to return to after signing in; ignored unless inside `/vendor`.
    #[serde(default)]
    pub redirect: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub vendor: VendorResponse,
    pub redirect: String,
    pub test_mode: bool,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct LoginPageQuery {
    pub redirect: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginPageResponse {
    pub redirect: Option<String>,
    /// Whether the non-production test login is enabled.
    pub test_mode_available: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub phone: String,
    pub address: String,
    pub pincodes: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    pub status: String,
    /// Explanation for accounts that cannot use the dashboard yet.
    pub message: Option<String>,
    pub vendor: VendorResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardResponse {
    pub vendor: VendorResponse,
    pub product_count: usize,
    pub open_orders: usize,
    pub test_mode: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    /// Version read by the client; a stale value is rejected with 409.
    pub version: i32,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub pincodes: Option<Vec<String>>,
    pub is_open: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ImageInput {
    pub url: String,
    pub public_id: String,
}

impl From<ImageInput> for ProductImage {
    fn from(i: ImageInput) -> Self {
        ProductImage {
            url: i.url,
            public_id: i.public_id,
        }
    }
}

impl From<HostedImage> for ImageResponse {
    fn from(i: HostedImage) -> Self {
        Self {
            url: i.url,
            public_id: i.public_id,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: String,
    /// Decimal price as a string, e.g. "45.00"
    pub price: String,
    pub mrp: String,
    pub category: String,
    pub unit: String,
    pub stock: i32,
    pub pincodes: Vec<String>,
    pub images: Vec<ImageInput>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub version: i32,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub mrp: Option<String>,
    pub stock: Option<i32>,
    /// "active" or "out_of_stock"
    pub status: Option<String>,
    pub pincodes: Option<Vec<String>>,
    pub images: Option<Vec<ImageInput>>,
}

impl UpdateProductRequest {
    fn into_update(self) -> Result<ProductUpdate, AppError> {
        Ok(ProductUpdate {
            name: self.name,
            description: self.description,
            price: self.price.as_deref().map(|p| parse_money("price", p)).transpose()?,
            mrp: self.mrp.as_deref().map(|p| parse_money("mrp", p)).transpose()?,
            stock: self.stock,
            status: self
                .status
                .as_deref()
                .map(str::parse::<ProductStatus>)
                .transpose()?,
            pincodes: self
                .pincodes
                .as_deref()
                .map(parse_delivery_areas)
                .transpose()?,
            images: self
                .images
                .map(|imgs| imgs.into_iter().map(ProductImage::from).collect()),
        })
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct VersionQuery {
    pub version: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteProductResponse {
    pub product: ProductResponse,
    /// Images the CDN could not remove; they stay behind as orphans.
    pub orphaned_images: usize,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct UploadQuery {
    pub filename: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ImageIdQuery {
    pub public_id: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BatchFile {
    pub filename: String,
    pub content_type: String,
    /// File bytes, hex encoded.
    pub data: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BatchUploadRequest {
    pub files: Vec<BatchFile>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BatchUploadResponse {
    pub success: bool,
    pub total_files: usize,
    pub successful_uploads: usize,
    pub failed_uploads: usize,
    pub uploaded: Vec<ImageResponse>,
    pub errors: Vec<String>,
}

impl From<BatchSummary> for BatchUploadResponse {
    fn from(s: BatchSummary) -> Self {
        Self {
            success: s.success(),
            total_files: s.total_files,
            successful_uploads: s.successful_uploads,
            failed_uploads: s.failed_uploads,
            uploaded: s.uploaded.into_iter().map(ImageResponse::from).collect(),
            errors: s.errors,
        }
    }
}

// ── Session helpers ──────────────────────────────────────────────────────────

fn marker(vendor_id: &str, test_mode: bool) -> SessionMarker {
    SessionMarker {
        role: Role::Vendor,
        actor_id: vendor_id.to_string(),
        created_at: Some(Utc::now()),
        test_mode,
    }
}

fn with_session(
    mut builder: HttpResponseBuilder,
    state: &AppState,
    marker: &SessionMarker,
) -> HttpResponseBuilder {
    for cookie in state.sessions.issue(marker) {
        builder.cookie(cookie);
    }
    builder
}

fn is_test_login(state: &AppState, email: &str, password: &str) -> bool {
    state
        .test_login
        .as_ref()
        .is_some_and(|(e, p)| e.eq_ignore_ascii_case(email.trim()) && p == password)
}

// ── Account ──────────────────────────────────────────────────────────────────

/// GET /vendor/login
#[utoipa::path(
    get,
    path = "/vendor/login",
    params(LoginPageQuery),
    responses(
        (status = 200, description = "Login view", body = LoginPageResponse),
        (status = 302, description = "Already signed in; sent to the dashboard or the requested page"),
    ),
    tag = "vendor"
)]
pub async fn login_page(
    state: web::Data<AppState>,
    query: web::Query<LoginPageQuery>,
) -> HttpResponse {
    HttpResponse::Ok().json(LoginPageResponse {
        redirect: VENDOR_AREA.safe_return(query.redirect.as_deref()),
        test_mode_available: state.test_login.is_some(),
    })
}

/// POST /vendor/login
///
/// Valid credentials always establish a session. An account that is not
/// active yet gets its failure kind and the status-check page to go to.
#[utoipa::path(
    post,
    path = "/vendor/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = LoginResponse),
        (status = 401, description = "Invalid email or password"),
        (status = 403, description = "Not a vendor, or the account is pending or blocked"),
        (status = 429, description = "Too many attempts"),
        (status = 502, description = "Identity provider unavailable"),
    ),
    tag = "vendor"
)]
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let LoginRequest {
        email,
        password,
        redirect,
    } = body.into_inner();
    let redirect = VENDOR_AREA
        .safe_return(redirect.as_deref())
        .unwrap_or_else(|| VENDOR_AREA.dashboard.to_string());

    if is_test_login(&state, &email, &password) {
        let vendors = state.vendors.clone();
        let pincode = state.default_pincode.clone();
        let vendor = blocking(move || vendors.ensure_test_vendor(pincode)).await?;
        log::warn!("test mode login used for {}", email);
        let marker = marker(&vendor.id, true);
        return Ok(with_session(HttpResponse::Ok(), &state, &marker).json(LoginResponse {
            vendor: vendor.into(),
            redirect,
            test_mode: true,
        }));
    }

    let identity = state.identity.sign_in(email.trim(), &password).await?;
    let vendors = state.vendors.clone();
    let outcome = blocking(move || vendors.resolve_login(&identity)).await?;
    let marker = marker(&outcome.vendor().id, false);

    match outcome {
        LoginOutcome::Active(vendor) => {
            log::info!("vendor {} signed in", vendor.id);
            Ok(with_session(HttpResponse::Ok(), &state, &marker).json(LoginResponse {
                vendor: vendor.into(),
                redirect,
                test_mode: false,
            }))
        }
        LoginOutcome::Inactive(vendor, failure) => {
            Ok(with_session(HttpResponse::Forbidden(), &state, &marker).json(json!({
                "error": failure.message(),
                "kind": failure.kind(),
                "status_check": VENDOR_AREA.status_check,
                "vendor": VendorResponse::from(vendor),
            })))
        }
    }
}

/// POST /vendor/register
///
/// Creates the identity account and a pending vendor record. The new
/// session can only reach the status-check page until an admin approves it.
#[utoipa::path(
    post,
    path = "/vendor/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registered, awaiting approval", body = VendorResponse),
        (status = 400, description = "Missing field or bad delivery area"),
        (status = 409, description = "Email already in use"),
    ),
    tag = "vendor"
)]
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    let req = body.into_inner();
    let pincodes = parse_delivery_areas(&req.pincodes)?;
    let identity = state.identity.sign_up(req.email.trim(), &req.password).await?;
    let details = Registration {
        name: req.name,
        phone: req.phone,
        address: req.address,
        pincodes,
    };
    let vendors = state.vendors.clone();
    let vendor = blocking(move || vendors.register(&identity, details)).await?;
    let marker = marker(&vendor.id, false);
    Ok(with_session(HttpResponse::Created(), &state, &marker)
        .insert_header((header::LOCATION, VENDOR_AREA.status_check.unwrap_or(VENDOR_AREA.login)))
        .json(VendorResponse::from(vendor)))
}

/// POST /vendor/logout
#[utoipa::path(
    post,
    path = "/vendor/logout",
    responses((status = 200, description = "Session cleared")),
    tag = "vendor"
)]
pub async fn logout(state: web::Data<AppState>) -> HttpResponse {
    let mut builder = HttpResponse::Ok();
    for cookie in state.sessions.clear(Role::Vendor) {
        builder.cookie(cookie);
    }
    builder.json(json!({ "redirect": VENDOR_AREA.login }))
}

/// GET /vendor/status
#[utoipa::path(
    get,
    path = "/vendor/status",
    responses(
        (status = 200, description = "Account status", body = StatusResponse),
        (status = 302, description = "No session"),
    ),
    tag = "vendor"
)]
pub async fn status(state: web::Data<AppState>, actor: Actor) -> Result<HttpResponse, AppError> {
    let vendors = state.vendors.clone();
    let id = actor.id().to_string();
    let vendor = blocking(move || vendors.get(&id)).await?;
    Ok(HttpResponse::Ok().json(StatusResponse {
        status: vendor.status.to_string(),
        message: LoginFailure::for_status(vendor.status).map(|f| f.message().to_string()),
        vendor: vendor.into(),
    }))
}

/// GET /vendor/dashboard
#[utoipa::path(
    get,
    path = "/vendor/dashboard",
    responses((status = 200, description = "Dashboard summary", body = DashboardResponse)),
    tag = "vendor"
)]
pub async fn dashboard(state: web::Data<AppState>, actor: Actor) -> Result<HttpResponse, AppError> {
    let test_mode = actor.0.test_mode;
    let id = actor.id().to_string();
    let (vendors, products, orders) = (
        state.vendors.clone(),
        state.products.clone(),
        state.orders.clone(),
    );
    let (vendor, product_count, open_orders) = blocking(move || {
        let vendor = vendors.get(&id)?;
        let product_count = products.list_own(&id)?.len();
        let open_orders = orders
            .list_for_vendor(&id)?
            .iter()
            .filter(|o| !o.status.is_terminal())
            .count();
        Ok((vendor, product_count, open_orders))
    })
    .await?;
    Ok(HttpResponse::Ok().json(DashboardResponse {
        vendor: vendor.into(),
        product_count,
        open_orders,
        test_mode,
    }))
}

/// GET /vendor/profile
#[utoipa::path(
    get,
    path = "/vendor/profile",
    responses((status = 200, description = "Own vendor record", body = VendorResponse)),
    tag = "vendor"
)]
pub async fn get_profile(state: web::Data<AppState>, actor: Actor) -> Result<HttpResponse, AppError> {
    let vendors = state.vendors.clone();
    let id = actor.id().to_string();
    let vendor = blocking(move || vendors.get(&id)).await?;
    Ok(HttpResponse::Ok().json(VendorResponse::from(vendor)))
}

/// PUT /vendor/profile
#[utoipa::path(
    put,
    path = "/vendor/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = VendorResponse),
        (status = 400, description = "Invalid field or empty delivery-area set"),
        (status = 409, description = "Stale version"),
    ),
    tag = "vendor"
)]
pub async fn update_profile(
    state: web::Data<AppState>,
    actor: Actor,
    body: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse, AppError> {
    let req = body.into_inner();
    let update = VendorProfileUpdate {
        name: req.name,
        phone: req.phone,
        address: req.address,
        pincodes: req.pincodes.as_deref().map(parse_delivery_areas).transpose()?,
        is_open: req.is_open,
    };
    let vendors = state.vendors.clone();
    let id = actor.id().to_string();
    let vendor = blocking(move || vendors.update_profile(&id, req.version, update)).await?;
    Ok(HttpResponse::Ok().json(VendorResponse::from(vendor)))
}

// ── Products ─────────────────────────────────────────────────────────────────

/// GET /vendor/products
#[utoipa::path(
    get,
    path = "/vendor/products",
    responses((status = 200, description = "Own products, newest first", body = Vec<ProductResponse>)),
    tag = "vendor"
)]
pub async fn list_products(
    state: web::Data<AppState>,
    actor: Actor,
) -> Result<HttpResponse, AppError> {
    let products = state.products.clone();
    let id = actor.id().to_string();
    let list = blocking(move || products.list_own(&id)).await?;
    let body: Vec<ProductResponse> = list.into_iter().map(ProductResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// POST /vendor/products
#[utoipa::path(
    post,
    path = "/vendor/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Missing field, bad price or delivery area outside the vendor's own"),
    ),
    tag = "vendor"
)]
pub async fn create_product(
    state: web::Data<AppState>,
    actor: Actor,
    body: web::Json<CreateProductRequest>,
) -> Result<HttpResponse, AppError> {
    let req = body.into_inner();
    let product = NewProduct {
        vendor_id: actor.id().to_string(),
        name: req.name,
        description: req.description,
        price: parse_money("price", &req.price)?,
        mrp: parse_money("mrp", &req.mrp)?,
        category: req.category,
        unit: req.unit,
        stock: req.stock,
        pincodes: parse_delivery_areas(&req.pincodes)?,
        images: req.images.into_iter().map(ProductImage::from).collect(),
    };
    let products = state.products.clone();
    let created = blocking(move || products.add(product)).await?;
    Ok(HttpResponse::Created().json(ProductResponse::from(created)))
}

/// GET /vendor/products/{id}
#[utoipa::path(
    get,
    path = "/vendor/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID")),
    responses(
        (status = 200, description = "Own product", body = ProductResponse),
        (status = 404, description = "No such product for this vendor"),
    ),
    tag = "vendor"
)]
pub async fn get_product(
    state: web::Data<AppState>,
    actor: Actor,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let products = state.products.clone();
    let vendor_id = actor.id().to_string();
    let product = blocking(move || products.get_own(&vendor_id, id)).await?;
    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}

/// PUT /vendor/products/{id}
///
/// Images dropped from the product are removed from the CDN afterwards.
#[utoipa::path(
    put,
    path = "/vendor/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, description = "Invalid field"),
        (status = 404, description = "No such product for this vendor"),
        (status = 409, description = "Stale version"),
    ),
    tag = "vendor"
)]
pub async fn update_product(
    state: web::Data<AppState>,
    actor: Actor,
    path: web::Path<Uuid>,
    body: web::Json<UpdateProductRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let req = body.into_inner();
    let version = req.version;
    let update = req.into_update()?;
    let products = state.products.clone();
    let vendor_id = actor.id().to_string();
    let change = blocking(move || products.update(&vendor_id, id, version, update)).await?;
    if !change.released_images.is_empty() {
        state.uploader.delete_best_effort(&change.released_images).await;
    }
    Ok(HttpResponse::Ok().json(ProductResponse::from(change.product)))
}

/// DELETE /vendor/products/{id}
///
/// Soft delete, then best-effort removal of the product's images.
#[utoipa::path(
    delete,
    path = "/vendor/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID"), VersionQuery),
    responses(
        (status = 200, description = "Product deleted", body = DeleteProductResponse),
        (status = 404, description = "No such product for this vendor"),
        (status = 409, description = "Stale version"),
    ),
    tag = "vendor"
)]
pub async fn delete_product(
    state: web::Data<AppState>,
    actor: Actor,
    path: web::Path<Uuid>,
    query: web::Query<VersionQuery>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let version = query.into_inner().version;
    let products = state.products.clone();
    let vendor_id = actor.id().to_string();
    let removed = blocking(move || products.remove(&vendor_id, id, version)).await?;
    let orphaned_images = state.uploader.delete_best_effort(&removed.released_images).await;
    Ok(HttpResponse::Ok().json(DeleteProductResponse {
        product: removed.product.into(),
        orphaned_images,
    }))
}

// ── Images ───────────────────────────────────────────────────────────────────

/// POST /vendor/images
///
/// The request body is the raw image; its type comes from `Content-Type`.
#[utoipa::path(
    post,
    path = "/vendor/images",
    params(UploadQuery),
    request_body(content = Vec<u8>, content_type = "image/*"),
    responses(
        (status = 201, description = "Image hosted", body = ImageResponse),
        (status = 400, description = "Not an image, or empty"),
        (status = 413, description = "Image over the size limit"),
        (status = 502, description = "Image host failed after all attempts"),
    ),
    tag = "vendor"
)]
pub async fn upload_image(
    req: HttpRequest,
    state: web::Data<AppState>,
    actor: Actor,
    query: web::Query<UploadQuery>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let file = ImageFile {
        file_name: query.into_inner().filename,
        content_type,
        bytes: body.to_vec(),
    };
    let hosted = state.uploader.upload(file, actor.id()).await?;
    Ok(HttpResponse::Created().json(ImageResponse::from(hosted)))
}

/// POST /vendor/images/batch
///
/// Uploads one file after another; a failed file does not stop the rest.
#[utoipa::path(
    post,
    path = "/vendor/images/batch",
    request_body = BatchUploadRequest,
    responses(
        (status = 200, description = "At least one file uploaded", body = BatchUploadResponse),
        (status = 400, description = "Bad request, or every file failed", body = BatchUploadResponse),
    ),
    tag = "vendor"
)]
pub async fn upload_images(
    state: web::Data<AppState>,
    actor: Actor,
    body: web::Json<BatchUploadRequest>,
) -> Result<HttpResponse, AppError> {
    let files = body.into_inner().files;
    if files.is_empty() {
        return Err(AppError::BadRequest("no files provided".to_string()));
    }
    if files.len() > MAX_BATCH_FILES {
        return Err(AppError::BadRequest(format!(
            "at most {MAX_BATCH_FILES} files per batch"
        )));
    }
    let files = files
        .into_iter()
        .map(|f| {
            let bytes = hex::decode(&f.data)
                .map_err(|e| AppError::BadRequest(format!("{}: bad file data: {e}", f.filename)))?;
            Ok(ImageFile {
                file_name: f.filename,
                content_type: f.content_type,
                bytes,
            })
        })
        .collect::<Result<Vec<_>, AppError>>()?;

    let summary = state.uploader.upload_many(files, actor.id()).await;
    let body = BatchUploadResponse::from(summary);
    if body.success {
        Ok(HttpResponse::Ok().json(body))
    } else {
        Ok(HttpResponse::BadRequest().json(body))
    }
}

/// DELETE /vendor/images
#[utoipa::path(
    delete,
    path = "/vendor/images",
    params(ImageIdQuery),
    responses(
        (status = 204, description = "Image removed"),
        (status = 404, description = "Image does not belong to this vendor"),
        (status = 502, description = "Image host failed after all attempts"),
    ),
    tag = "vendor"
)]
pub async fn delete_image(
    state: web::Data<AppState>,
    actor: Actor,
    query: web::Query<ImageIdQuery>,
) -> Result<HttpResponse, AppError> {
    let public_id = query.into_inner().public_id;
    if !state.products.owns_image(actor.id(), &public_id) {
        return Err(AppError::NotFound("Image not found".to_string()));
    }
    state.uploader.delete(&public_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

// ── Orders ───────────────────────────────────────────────────────────────────

/// GET /vendor/orders
#[utoipa::path(
    get,
    path = "/vendor/orders",
    responses((status = 200, description = "Orders containing the vendor's products", body = Vec<OrderResponse>)),
    tag = "vendor"
)]
pub async fn list_orders(state: web::Data<AppState>, actor: Actor) -> Result<HttpResponse, AppError> {
    let orders = state.orders.clone();
    let id = actor.id().to_string();
    let list = blocking(move || orders.list_for_vendor(&id)).await?;
    Ok(HttpResponse::Ok().json(order_list(list)))
}

/// GET /vendor/orders/{id}
#[utoipa::path(
    get,
    path = "/vendor/orders/{id}",
    params(("id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Order", body = OrderResponse),
        (status = 404, description = "No such order for this vendor"),
    ),
    tag = "vendor"
)]
pub async fn get_order(
    state: web::Data<AppState>,
    actor: Actor,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let orders = state.orders.clone();
    let vendor_id = actor.id().to_string();
    let order = blocking(move || orders.get_for_vendor(&vendor_id, id)).await?;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// POST /vendor/orders/{id}/advance
///
/// Moves the order exactly one step forward.
#[utoipa::path(
    post,
    path = "/vendor/orders/{id}/advance",
    params(("id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Order advanced", body = OrderResponse),
        (status = 404, description = "No such order for this vendor"),
        (status = 409, description = "Order is final, or moved concurrently"),
    ),
    tag = "vendor"
)]
pub async fn advance_order(
    state: web::Data<AppState>,
    actor: Actor,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let orders = state.orders.clone();
    let vendor_id = actor.id().to_string();
    let order = blocking(move || orders.advance_for_vendor(&vendor_id, id)).await?;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// POST /vendor/orders/{id}/cancel
#[utoipa::path(
    post,
    path = "/vendor/orders/{id}/cancel",
    params(("id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Order cancelled", body = OrderResponse),
        (status = 404, description = "No such order for this vendor"),
        (status = 409, description = "Order already delivered or cancelled"),
    ),
    tag = "vendor"
)]
pub async fn cancel_order(
    state: web::Data<AppState>,
    actor: Actor,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let orders = state.orders.clone();
    let vendor_id = actor.id().to_string();
    let order = blocking(move || orders.cancel_for_vendor(&vendor_id, id)).await?;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}
