use actix_web::{web, HttpRequest, HttpResponse, ResponseError, Result};
use serde_json::json;

use crate::handlers::actor_from_request;
use crate::models::*;
use crate::services::CartService;

#[utoipa::path(
    post,
    path = "/cart/items",
    tag = "cart",
    request_body = AddCartItemRequest,
    responses(
        (status = 200, description = "Line added or resized, totals refreshed", body = CartMutationResponse),
        (status = 404, description = "Order or menu item not found"),
        (status = 409, description = "Order not mutable in its current state")
    )
)]
pub async fn add_cart_item(
    cart_service: web::Data<CartService>,
    req: HttpRequest,
    request: web::Json<AddCartItemRequest>,
) -> Result<HttpResponse> {
    let actor = actor_from_request(&req);
    match cart_service.add_line(actor, request.into_inner()).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": result
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/cart/items/{id}/quantity",
    tag = "cart",
    request_body = UpdateQuantityRequest,
    params(("id" = i64, Path, description = "Cart item id")),
    responses(
        (status = 200, description = "Quantity updated, totals refreshed", body = CartMutationResponse),
        (status = 404, description = "Cart item not found"),
        (status = 409, description = "Order not mutable in its current state")
    )
)]
pub async fn update_cart_item_quantity(
    cart_service: web::Data<CartService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateQuantityRequest>,
) -> Result<HttpResponse> {
    let actor = actor_from_request(&req);
    match cart_service
        .update_quantity(actor, path.into_inner(), request.quantity)
        .await
    {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": result
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/cart/items/{id}",
    tag = "cart",
    params(("id" = i64, Path, description = "Cart item id")),
    responses(
        (status = 200, description = "Line removed, totals refreshed", body = CartRemovalResponse),
        (status = 404, description = "Cart item not found"),
        (status = 409, description = "Order not mutable in its current state")
    )
)]
pub async fn remove_cart_item(
    cart_service: web::Data<CartService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let actor = actor_from_request(&req);
    match cart_service.remove_line(actor, path.into_inner()).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Cart item removed successfully.",
            "data": result
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn cart_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/cart")
            .route("/items", web::post().to(add_cart_item))
            .route("/items/{id}/quantity", web::post().to(update_cart_item_quantity))
            .route("/items/{id}", web::delete().to(remove_cart_item)),
    );
}
