pub mod errors;
pub mod order;
pub mod pincode;
pub mod ports;
pub mod product;
pub mod session;
pub mod vendor;
