pub mod cart;
pub mod kot;
pub mod order;

pub use cart::cart_config;
pub use kot::kot_config;
pub use order::order_config;

use actix_web::HttpRequest;

/// Acting user id, forwarded by the (excluded) auth layer. Absent for
/// guest requests.
pub(crate) fn actor_from_request(req: &HttpRequest) -> Option<i64> {
    req.headers()
        .get("X-Actor-Id")?
        .to_str()
        .ok()?
        .parse()
        .ok()
}
