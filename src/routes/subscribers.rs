use actix_web::http::header::LOCATION;
use actix_web::{web, HttpResponse};

use crate::domain::subscriber_id::SubscriberId;
use crate::lifecycle::{self, LifecycleError};
use crate::notification_client::NotificationClient;
use crate::store::SubscriberStore;

pub const SUBSCRIBE_SUCCESS_LOCATION: &str = "/thank-you";
pub const UNSUBSCRIBE_SUCCESS_LOCATION: &str = "/unsubscribed";
pub const DELETE_SUCCESS_LOCATION: &str = "/goodbye";
pub const FALLBACK_LOCATION: &str = "/";

#[tracing::instrument(
    name = "Confirming a subscription handler",
    skip(path, store, notification_client)
)]
pub async fn handle_subscribe(
    path: web::Path<String>,
    store: web::Data<SubscriberStore>,
    notification_client: web::Data<NotificationClient>,
) -> Result<HttpResponse, LifecycleError> {
    let subscriber_id = match parse_subscriber_id(path.into_inner()) {
        Ok(subscriber_id) => subscriber_id,
        Err(response) => return Ok(response),
    };

    lifecycle::subscribe(&store, &notification_client, &subscriber_id).await?;

    // TODO: point this at the survey page once it ships
    Ok(redirect_to(SUBSCRIBE_SUCCESS_LOCATION))
}

#[tracing::instrument(
    name = "Unsubscribing a subscriber handler",
    skip(path, store, notification_client)
)]
pub async fn handle_unsubscribe(
    path: web::Path<String>,
    store: web::Data<SubscriberStore>,
    notification_client: web::Data<NotificationClient>,
) -> Result<HttpResponse, LifecycleError> {
    let subscriber_id = match parse_subscriber_id(path.into_inner()) {
        Ok(subscriber_id) => subscriber_id,
        Err(response) => return Ok(response),
    };

    lifecycle::unsubscribe(&store, &notification_client, &subscriber_id).await?;

    Ok(redirect_to(UNSUBSCRIBE_SUCCESS_LOCATION))
}

#[tracing::instrument(
    name = "Deleting a subscriber handler",
    skip(path, store, notification_client)
)]
pub async fn handle_delete(
    path: web::Path<String>,
    store: web::Data<SubscriberStore>,
    notification_client: web::Data<NotificationClient>,
) -> Result<HttpResponse, LifecycleError> {
    let subscriber_id = match parse_subscriber_id(path.into_inner()) {
        Ok(subscriber_id) => subscriber_id,
        Err(response) => return Ok(response),
    };

    lifecycle::delete(&store, &notification_client, &subscriber_id).await?;

    Ok(redirect_to(DELETE_SUCCESS_LOCATION))
}

// A blank or mangled id in the link gets bounced to the landing page rather
// than shown an error body.
fn parse_subscriber_id(raw: String) -> Result<SubscriberId, HttpResponse> {
    SubscriberId::parse(raw).map_err(|err| {
        tracing::error!("Validation error: {:?}", err);
        redirect_to(FALLBACK_LOCATION)
    })
}

fn redirect_to(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((LOCATION, location))
        .finish()
}
