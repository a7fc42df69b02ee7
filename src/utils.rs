//! src/utils.rs

use crate::error::Error;
use actix_web::{error::InternalError, http::header::LOCATION, HttpResponse};
use actix_web_flash_messages::FlashMessage;

/// forward to other location
pub fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((LOCATION, location))
        .finish()
}

/// Flash the user facing message of `e` and send the visitor back to the home page.
/// The error itself stays attached to the response, so it ends up in the logs.
pub fn home_redirect(e: Error) -> InternalError<Error> {
    FlashMessage::error(e.user_message()).send();
    let response = see_other("/");
    InternalError::from_response(e, response)
}
