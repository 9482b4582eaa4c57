use actix_web::http::StatusCode;
use actix_web::ResponseError;

use crate::domain::new_subscriber::NewSubscriber;
use crate::domain::subscriber::Subscriber;
use crate::domain::subscriber_id::SubscriberId;
use crate::domain::subscriber_status::SubscriberStatus;
use crate::notification_client::{NotificationClient, NotificationError};
use crate::store::{StoreError, SubscriberStore};

#[derive(thiserror::Error)]
pub enum LifecycleError {
    #[error("A {from} subscriber cannot move to {to}.")]
    InvalidTransition {
        from: SubscriberStatus,
        to: SubscriberStatus,
    },
    #[error("Failed to persist the subscriber transition.")]
    Store(#[from] StoreError),
    #[error("Failed to notify the provider about the transition.")]
    Notification(#[from] NotificationError),
}

impl std::fmt::Debug for LifecycleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Caused by:\n\t({})", self)
    }
}

impl ResponseError for LifecycleError {
    fn status_code(&self) -> StatusCode {
        match self {
            LifecycleError::InvalidTransition { .. } => StatusCode::CONFLICT,
            LifecycleError::Store(StoreError::NotFound) => StatusCode::NOT_FOUND,
            LifecycleError::Store(StoreError::Conflict(_)) => StatusCode::CONFLICT,
            LifecycleError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            // The store mutation already happened and is not rolled back; the
            // caller learns the provider is out of sync.
            LifecycleError::Notification(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

#[tracing::instrument(
    name = "Register a new subscriber",
    skip(store, new_subscriber),
    fields(subscriber_email = %new_subscriber.email.as_ref())
)]
pub async fn register(
    store: &SubscriberStore,
    new_subscriber: NewSubscriber,
) -> Result<Subscriber, LifecycleError> {
    let subscriber = Subscriber::create(new_subscriber.email, new_subscriber.given_name, None, None);

    store.create(&subscriber).await?;

    Ok(subscriber)
}

#[tracing::instrument(
    name = "Confirm a subscription",
    skip(store, notifications),
    fields(subscriber_id = %subscriber_id.as_ref())
)]
pub async fn subscribe(
    store: &SubscriberStore,
    notifications: &NotificationClient,
    subscriber_id: &SubscriberId,
) -> Result<Subscriber, LifecycleError> {
    let subscriber = transition(store, subscriber_id, SubscriberStatus::Subscribed).await?;

    notifications.create_profile(&subscriber).await?;
    notifications.send_welcome_email(&subscriber).await?;

    Ok(subscriber)
}

#[tracing::instrument(
    name = "Unsubscribe a subscriber",
    skip(store, notifications),
    fields(subscriber_id = %subscriber_id.as_ref())
)]
pub async fn unsubscribe(
    store: &SubscriberStore,
    notifications: &NotificationClient,
    subscriber_id: &SubscriberId,
) -> Result<Subscriber, LifecycleError> {
    let subscriber = transition(store, subscriber_id, SubscriberStatus::Unsubscribed).await?;

    notifications
        .send_unsubscribe_confirmation_email(&subscriber)
        .await?;

    Ok(subscriber)
}

#[tracing::instrument(
    name = "Delete a subscriber",
    skip(store, notifications),
    fields(subscriber_id = %subscriber_id.as_ref())
)]
pub async fn delete(
    store: &SubscriberStore,
    notifications: &NotificationClient,
    subscriber_id: &SubscriberId,
) -> Result<(), LifecycleError> {
    let subscriber = store
        .get(subscriber_id)
        .await?
        .ok_or(StoreError::NotFound)?;

    store.delete(subscriber_id).await?;
    notifications.delete_profile(&subscriber).await?;

    Ok(())
}

// Store mutation always happens before any provider call, so the persisted
// state reflects intent even when the provider is unreachable.
async fn transition(
    store: &SubscriberStore,
    subscriber_id: &SubscriberId,
    target: SubscriberStatus,
) -> Result<Subscriber, LifecycleError> {
    let current = store
        .get(subscriber_id)
        .await?
        .ok_or(StoreError::NotFound)?;

    if !current.status.can_become(target) {
        return Err(LifecycleError::InvalidTransition {
            from: current.status,
            to: target,
        });
    }

    Ok(store.update_status(subscriber_id, target).await?)
}
