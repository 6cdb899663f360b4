pub mod catalog_service;
pub mod order_service;
pub mod product_service;
pub mod staff;
pub mod vendor_service;
