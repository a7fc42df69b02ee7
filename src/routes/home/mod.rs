//! src/routes/home/mod.rs

use crate::storage::Subscriptions;
use actix_web::{web, Responder};
use actix_web_flash_messages::IncomingFlashMessages;
use askama_actix::Template;

#[derive(Template)]
#[template(path = "home.html")]
struct HomeTemplate {
    flash_messages: Vec<String>,
    active_subscribers: Option<i64>,
}

pub async fn home(
    subscriptions: web::Data<Subscriptions>,
    flash_messages: IncomingFlashMessages,
) -> impl Responder {
    let flash_messages: Vec<String> = flash_messages
        .iter()
        .map(|m| m.content().to_string())
        .collect();
    // the forms stay usable even if the count cannot be read
    let active_subscribers = match subscriptions.count().await {
        Ok(count) => Some(count),
        Err(e) => {
            tracing::warn!(
                error.cause_chain = ?e,
                error.message = %e,
                "Failed to count active subscribers"
            );
            None
        }
    };
    HomeTemplate {
        flash_messages,
        active_subscribers,
    }
}
