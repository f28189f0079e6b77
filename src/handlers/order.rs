use actix_web::{web, HttpRequest, HttpResponse, ResponseError, Result};
use serde_json::json;

use crate::error::AppError;
use crate::handlers::actor_from_request;
use crate::models::*;
use crate::services::OrderService;

#[utoipa::path(
    post,
    path = "/orders/initialize",
    tag = "order",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order initialized", body = OrderResponse),
        (status = 400, description = "Missing guest fields"),
        (status = 409, description = "Open order already exists")
    )
)]
pub async fn initialize_order(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    request: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse> {
    let request = request.into_inner();
    let identity = match actor_from_request(&req) {
        Some(user_id) => Identity::Registered(user_id),
        None => match request.custom_contact.clone() {
            Some(contact) => Identity::Guest(contact),
            None => {
                return Ok(AppError::ValidationError(
                    "custom_contact is required".to_string(),
                )
                .error_response())
            }
        },
    };

    match order_service.initialize_order(identity, request).await {
        Ok(order) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": order
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/orders",
    tag = "order",
    params(OrderQuery),
    responses(
        (status = 200, description = "Orders with their cart lines, newest first")
    )
)]
pub async fn get_orders(
    order_service: web::Data<OrderService>,
    query: web::Query<OrderQuery>,
) -> Result<HttpResponse> {
    match order_service.list_orders(&query).await {
        Ok(results) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "results": results }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/orders/{id}",
    tag = "order",
    params(("id" = i64, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order with its cart lines", body = OrderWithCartResponse),
        (status = 404, description = "Order not found")
    )
)]
pub async fn get_order(
    order_service: web::Data<OrderService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match order_service.get_order_with_cart(path.into_inner()).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": result
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/orders/user/{user_id}",
    tag = "order",
    params(("user_id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "Order history for the user"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user_orders(
    order_service: web::Data<OrderService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match order_service.user_orders(path.into_inner()).await {
        Ok(results) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "results": results }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/orders/{id}",
    tag = "order",
    request_body = UpdateOrderRequest,
    params(("id" = i64, Path, description = "Order id")),
    responses(
        (status = 200, description = "Totals recomputed with overrides", body = OrderResponse),
        (status = 404, description = "Order not found")
    )
)]
pub async fn update_order(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateOrderRequest>,
) -> Result<HttpResponse> {
    let actor = actor_from_request(&req);
    match order_service
        .update_order(actor, path.into_inner(), request.into_inner())
        .await
    {
        Ok(order) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": order
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/orders/{id}",
    tag = "order",
    params(("id" = i64, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order deleted"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn delete_order(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let actor = actor_from_request(&req);
    match order_service.delete_order(actor, path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Order deleted successfully."
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/orders/{id}/done",
    tag = "order",
    params(("id" = i64, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order submitted; creator resolved and KOT batch 1 issued", body = OrderResponse),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Order already submitted")
    )
)]
pub async fn mark_done_from_customer(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let authenticated = actor_from_request(&req);
    match order_service
        .mark_done_from_customer(authenticated, path.into_inner())
        .await
    {
        Ok(order) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": order
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/orders/{id}/start-delivery",
    tag = "order",
    params(("id" = i64, Path, description = "Order id")),
    responses(
        (status = 200, description = "Delivery started", body = OrderResponse),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Not submitted yet, or already started")
    )
)]
pub async fn start_delivery(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let actor = actor_from_request(&req);
    match order_service.start_delivery(actor, path.into_inner()).await {
        Ok(order) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": order
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/orders/{id}/delivered",
    tag = "order",
    params(("id" = i64, Path, description = "Order id")),
    responses(
        (status = 200, description = "Delivered; close-out transaction created", body = OrderResponse),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Not out for delivery, or already delivered")
    )
)]
pub async fn mark_delivered(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let actor = actor_from_request(&req);
    match order_service.mark_delivered(actor, path.into_inner()).await {
        Ok(order) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": order
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn order_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/orders")
            .route("/initialize", web::post().to(initialize_order))
            .route("", web::get().to(get_orders))
            .route("/user/{user_id}", web::get().to(get_user_orders))
            .route("/{id}", web::get().to(get_order))
            .route("/{id}", web::patch().to(update_order))
            .route("/{id}", web::delete().to(delete_order))
            .route("/{id}/done", web::patch().to(mark_done_from_customer))
            .route("/{id}/start-delivery", web::patch().to(start_delivery))
            .route("/{id}/delivered", web::patch().to(mark_delivered)),
    );
}
