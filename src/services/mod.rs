pub mod cart_service;
pub mod kot_service;
pub mod log_service;
pub mod order_service;

pub use cart_service::CartService;
pub use kot_service::KotService;
pub use order_service::OrderService;
