use utoipa::OpenApi;

use crate::handlers::{account, admin, catalog, delivery, health, location, orders, vendor};

#[derive(OpenApi)]
#[openapi(
    info(title = "Storefront service", description = "Pincode-scoped quick-commerce storefront"),
    paths(
        health::healthz,
        health::readyz,
        location::get_location,
        location::set_location,
        catalog::list_products,
        catalog::list_categories,
        catalog::list_category_products,
        catalog::get_product,
        catalog::list_stores,
        account::login,
        account::register,
        account::logout,
        orders::checkout,
        orders::checkout_success,
        orders::get_order,
        orders::list_customer_orders,
        orders::cancel_order,
        vendor::login_page,
        vendor::login,
        vendor::register,
        vendor::logout,
        vendor::status,
        vendor::dashboard,
        vendor::get_profile,
        vendor::update_profile,
        vendor::list_products,
        vendor::create_product,
        vendor::get_product,
        vendor::update_product,
        vendor::delete_product,
        vendor::upload_image,
        vendor::upload_images,
        vendor::delete_image,
        vendor::list_orders,
        vendor::get_order,
        vendor::advance_order,
        vendor::cancel_order,
        admin::login,
        admin::logout,
        admin::list_vendors,
        admin::set_vendor_status,
        admin::list_orders,
        delivery::login,
        delivery::logout,
        delivery::queue,
        delivery::assign,
        delivery::deliver,
    ),
    tags(
        (name = "catalog", description = "Products visible for a delivery pincode"),
        (name = "location", description = "Customer delivery location"),
        (name = "account", description = "Customer sign-in through the identity provider"),
        (name = "orders", description = "Checkout and customer orders, behind the customer session gate"),
        (name = "vendor", description = "Vendor dashboard, behind the vendor session gate"),
        (name = "admin", description = "Vendor approval and order overview"),
        (name = "delivery", description = "Delivery queue"),
        (name = "health", description = "Liveness and readiness"),
    )
)]
pub struct ApiDoc;
