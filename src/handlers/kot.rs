use actix_web::{web, HttpResponse, ResponseError, Result};
use serde_json::json;

use crate::models::*;
use crate::services::KotService;

#[utoipa::path(
    post,
    path = "/kot/orders/{id}/init",
    tag = "kot",
    params(("id" = i64, Path, description = "Order id")),
    responses(
        (status = 201, description = "First batch issued", body = Vec<KotResponse>),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Batches already exist for this order")
    )
)]
pub async fn init_first_batch(
    kot_service: web::Data<KotService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match kot_service.init_first_batch(path.into_inner()).await {
        Ok(rows) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": { "results": rows }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/kot/orders/{id}/generate",
    tag = "kot",
    params(("id" = i64, Path, description = "Order id")),
    responses(
        (status = 201, description = "Next incremental batch issued", body = Vec<KotResponse>),
        (status = 400, description = "No quantity change since the previous batch"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "First batch not issued yet")
    )
)]
pub async fn generate_next_batch(
    kot_service: web::Data<KotService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match kot_service.generate_next_batch(path.into_inner()).await {
        Ok(rows) if rows.is_empty() => Ok(HttpResponse::BadRequest().json(json!({
            "success": false,
            "error": {
                "code": "NO_CHANGE",
                "message": "Order has not been updated since the previous KOT batch."
            }
        }))),
        Ok(rows) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": { "results": rows }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/kot",
    tag = "kot",
    params(KotQuery),
    responses(
        (status = 200, description = "Ticket rows, newest first")
    )
)]
pub async fn list_kots(
    kot_service: web::Data<KotService>,
    query: web::Query<KotQuery>,
) -> Result<HttpResponse> {
    match kot_service.list_kots(&query).await {
        Ok(rows) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "results": rows }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn kot_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/kot")
            .route("", web::get().to(list_kots))
            .route("/orders/{id}/init", web::post().to(init_first_batch))
            .route("/orders/{id}/generate", web::post().to(generate_next_batch)),
    );
}
