//! src/routes/subscriptions/unsubscribe.rs

use crate::error::Error;
use crate::storage::Subscriptions;
use crate::utils::{home_redirect, see_other};
use actix_web::{error::InternalError, web, Either, HttpResponse, Responder};
use actix_web_flash_messages::FlashMessage;
use askama_actix::Template;

#[derive(serde::Deserialize)]
pub struct UnsubscribeQuery {
    token: Option<String>,
}

/// Either field identifies the subscriber, the token wins if both are sent.
#[derive(serde::Deserialize)]
pub struct UnsubscribeFormData {
    token: Option<String>,
    email: Option<String>,
}

#[derive(Template)]
#[template(path = "unsubscribe_confirm.html")]
struct UnsubscribeConfirmTemplate {
    flash_messages: Vec<String>,
    email: String,
    token: String,
}

#[derive(Template)]
#[template(path = "unsubscribed.html")]
struct UnsubscribedTemplate {
    flash_messages: Vec<String>,
    email: String,
}

const UNKNOWN_LINK: &str = "This unsubscribe link is invalid or has already been used.";
const UNKNOWN_EMAIL: &str = "This email address is not subscribed.";

fn back_home(message: &str) -> HttpResponse {
    FlashMessage::info(message).send();
    see_other("/")
}

/// Landing page of the link in every digest: shows which address is about
/// to be removed and asks for confirmation.
#[tracing::instrument(name = "Show unsubscribe confirmation", skip_all)]
pub async fn unsubscribe_form(
    query: web::Query<UnsubscribeQuery>,
    subscriptions: web::Data<Subscriptions>,
) -> Result<Either<impl Responder, HttpResponse>, InternalError<Error>> {
    let Some(token) = query.0.token.filter(|t| !t.is_empty()) else {
        return Ok(Either::Right(back_home(UNKNOWN_LINK)));
    };
    match subscriptions
        .find_by_token(token.clone())
        .await
        .map_err(home_redirect)?
    {
        Some(subscriber) if subscriber.active => Ok(Either::Left(UnsubscribeConfirmTemplate {
            flash_messages: Vec::new(),
            email: subscriber.email.to_string(),
            token,
        })),
        _ => Ok(Either::Right(back_home(UNKNOWN_LINK))),
    }
}

#[tracing::instrument(name = "Removing a subscriber.", skip_all)]
pub async fn unsubscribe(
    form: web::Form<UnsubscribeFormData>,
    subscriptions: web::Data<Subscriptions>,
) -> Result<Either<impl Responder, HttpResponse>, InternalError<Error>> {
    let UnsubscribeFormData { token, email } = form.0;
    let removed = match (token, email) {
        (Some(token), _) if !token.is_empty() => subscriptions
            .deactivate(token)
            .await
            .map_err(home_redirect)?
            .map(|s| s.email.to_string())
            .ok_or(UNKNOWN_LINK),
        (_, Some(email)) if !email.trim().is_empty() => {
            let unsubscribed = subscriptions
                .unsubscribe_email(email.clone())
                .await
                .map_err(home_redirect)?;
            if unsubscribed {
                Ok(email.trim().to_lowercase())
            } else {
                Err(UNKNOWN_EMAIL)
            }
        }
        _ => Err(UNKNOWN_EMAIL),
    };
    match removed {
        Ok(email) => {
            tracing::info!(subscriber_email = %email, "Subscriber is inactive");
            Ok(Either::Left(UnsubscribedTemplate {
                flash_messages: Vec::new(),
                email,
            }))
        }
        Err(message) => Ok(Either::Right(back_home(message))),
    }
}
