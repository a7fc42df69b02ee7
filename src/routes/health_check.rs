//! src/routes/health_check.rs

use crate::error::AppResult;
use crate::storage::Subscriptions;
use actix_web::{web, HttpResponse};

/// Liveness check, also proves the store answers queries.
pub async fn health_check(subscriptions: web::Data<Subscriptions>) -> AppResult<HttpResponse> {
    let active_subscribers = subscriptions.count().await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "active_subscribers": active_subscribers,
    })))
}
