//! src/routes/subscriptions/post.rs

use crate::error::Error;
use crate::storage::Subscriptions;
use crate::utils::home_redirect;
use actix_web::{error::InternalError, web, Responder};
use askama_actix::Template;

#[derive(serde::Deserialize)]
pub struct FormData {
    email: String,
}

#[derive(Template)]
#[template(path = "subscribed.html")]
struct SubscribedTemplate {
    flash_messages: Vec<String>,
    email: String,
}

#[tracing::instrument(
    name = "Adding a new subscriber.",
    skip(form, subscriptions),
    fields(subscriber_email = %form.email)
)]
pub async fn subscribe(
    form: web::Form<FormData>,
    subscriptions: web::Data<Subscriptions>,
) -> Result<impl Responder, InternalError<Error>> {
    let subscriber = subscriptions
        .subscribe(form.0.email)
        .await
        .map_err(home_redirect)?;
    Ok(SubscribedTemplate {
        flash_messages: Vec::new(),
        email: subscriber.email.to_string(),
    })
}
