use actix_web::{web, HttpResponse};

use crate::domain::new_subscriber::{NewSubscriber, NewSubscriberBody};
use crate::lifecycle::{self, LifecycleError};
use crate::notification_client::NotificationClient;
use crate::store::SubscriberStore;

#[tracing::instrument(
    name = "Creating a new subscriber handler",
    skip(body, store, notification_client),
    fields(
        subscriber_email = %body.email,
        subscriber_given_name = %body.given_name
    )
)]
pub async fn handle_create_subscription(
    body: web::Json<NewSubscriberBody>,
    store: web::Data<SubscriberStore>,
    notification_client: web::Data<NotificationClient>,
) -> Result<HttpResponse, LifecycleError> {
    let new_subscriber: NewSubscriber = match body.try_into() {
        Ok(subscriber) => subscriber,
        Err(err) => {
            tracing::error!("Validation error: {:?}", err);
            return Ok(HttpResponse::BadRequest().finish());
        }
    };

    let subscriber = lifecycle::register(&store, new_subscriber).await?;

    // The registration itself already succeeded, so a failed confirmation
    // send is logged instead of failing the request.
    if let Err(err) = notification_client.send_confirmation_email(&subscriber).await {
        tracing::error!(
            "Failed to send a confirmation email to {}: {:?}",
            subscriber.email.as_ref(),
            err
        );
    }

    Ok(HttpResponse::Created().json(&subscriber))
}
