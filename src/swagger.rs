use actix_web::web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{LogMode, PaymentType};
use crate::handlers;
use crate::models::*;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::order::initialize_order,
        handlers::order::get_orders,
        handlers::order::get_order,
        handlers::order::get_user_orders,
        handlers::order::update_order,
        handlers::order::delete_order,
        handlers::order::mark_done_from_customer,
        handlers::order::start_delivery,
        handlers::order::mark_delivered,
        handlers::cart::add_cart_item,
        handlers::cart::update_cart_item_quantity,
        handlers::cart::remove_cart_item,
        handlers::kot::init_first_batch,
        handlers::kot::generate_next_batch,
        handlers::kot::list_kots,
    ),
    components(
        schemas(
            ApiError,
            CreateOrderRequest,
            UpdateOrderRequest,
            OrderResponse,
            OrderWithCartResponse,
            OrderTotals,
            AddCartItemRequest,
            UpdateQuantityRequest,
            MenuItemBrief,
            CartItemResponse,
            CartMutationResponse,
            CartRemovalResponse,
            KotResponse,
            PaymentType,
            LogMode,
        )
    ),
    tags(
        (name = "order", description = "Order lifecycle"),
        (name = "cart", description = "Cart line engine"),
        (name = "kot", description = "Kitchen order tickets")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    );
}
