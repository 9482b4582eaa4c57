use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use std::time;

use crate::domain::subscriber::Subscriber;

const REQUEST_TIMEOUT: time::Duration = time::Duration::from_secs(10);

// Template keys registered with the notification provider.
pub const CONFIRMATION_TEMPLATE: &str = "CONFIRM_CLOUDSPARK_SUBSCRIPTION";
pub const WELCOME_TEMPLATE: &str = "WELCOME_TO_CLOUDSPARK";
pub const UNSUBSCRIBE_TEMPLATE: &str = "CLOUDSPARK_UNSUBSCRIBE_CONFIRMATION";

/// Client for the external provider that mirrors subscriber profiles and
/// sends templated emails. Stateless; one HTTP call per operation, no
/// retries.
pub struct NotificationClient {
    http_client: Client,
    base_url: String,
    auth_token: Secret<String>,
}

#[derive(thiserror::Error)]
pub enum NotificationError {
    #[error("The notification provider responded with {status}: {body}")]
    Provider {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("Failed to reach the notification provider.")]
    Transport(#[from] reqwest::Error),
}

impl std::fmt::Debug for NotificationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Caused by:\n\t({})", self)
    }
}

#[derive(serde::Serialize)]
struct UpsertProfileBody {
    profile: ProviderProfile,
}

#[derive(serde::Serialize)]
struct ProviderProfile {
    email: String,
    email_verified: bool,
    given_name: String,
}

#[derive(serde::Serialize)]
struct SendMessageBody {
    message: ProviderMessage,
}

#[derive(serde::Serialize)]
struct ProviderMessage {
    to: ProviderRecipient,
    data: ProviderTemplateData,
    template: String,
}

#[derive(serde::Serialize)]
struct ProviderRecipient {
    email: String,
}

#[derive(serde::Serialize)]
struct ProviderTemplateData {
    given_name: String,
    subscriber_id: String,
}

impl NotificationClient {
    pub fn new(
        base_url: String,
        auth_token: Secret<String>,
        timeout: Option<time::Duration>,
    ) -> NotificationClient {
        let http_client = Client::builder()
            .timeout(timeout.unwrap_or(REQUEST_TIMEOUT))
            .build()
            .unwrap();

        NotificationClient {
            http_client,
            base_url,
            auth_token,
        }
    }

    #[tracing::instrument(
        name = "Upsert the subscriber profile in the notification provider",
        skip(self, subscriber),
        fields(subscriber_id = %subscriber.subscriber_id.as_ref())
    )]
    pub async fn create_profile(&self, subscriber: &Subscriber) -> Result<(), NotificationError> {
        let url = format!(
            "{}/profiles/{}",
            self.base_url,
            subscriber.subscriber_id.as_ref()
        );
        let body = UpsertProfileBody {
            profile: ProviderProfile {
                email: String::from(subscriber.email.as_ref()),
                email_verified: subscriber.email_verified(),
                given_name: String::from(subscriber.given_name.as_ref()),
            },
        };

        let response = self
            .http_client
            .post(&url)
            .header("Authorization", self.bearer_token())
            .json(&body)
            .send()
            .await?;

        reject_non_success(response).await
    }

    #[tracing::instrument(
        name = "Delete the subscriber profile from the notification provider",
        skip(self, subscriber),
        fields(subscriber_id = %subscriber.subscriber_id.as_ref())
    )]
    pub async fn delete_profile(&self, subscriber: &Subscriber) -> Result<(), NotificationError> {
        let url = format!(
            "{}/profiles/{}",
            self.base_url,
            subscriber.subscriber_id.as_ref()
        );

        let response = self
            .http_client
            .delete(&url)
            .header("Authorization", self.bearer_token())
            .send()
            .await?;

        reject_non_success(response).await
    }

    pub async fn send_confirmation_email(
        &self,
        subscriber: &Subscriber,
    ) -> Result<(), NotificationError> {
        self.send_template(subscriber, CONFIRMATION_TEMPLATE).await
    }

    pub async fn send_welcome_email(
        &self,
        subscriber: &Subscriber,
    ) -> Result<(), NotificationError> {
        self.send_template(subscriber, WELCOME_TEMPLATE).await
    }

    pub async fn send_unsubscribe_confirmation_email(
        &self,
        subscriber: &Subscriber,
    ) -> Result<(), NotificationError> {
        self.send_template(subscriber, UNSUBSCRIBE_TEMPLATE).await
    }

    #[tracing::instrument(
        name = "Send a templated email through the notification provider",
        skip(self, subscriber),
        fields(
            subscriber_id = %subscriber.subscriber_id.as_ref(),
            template = %template
        )
    )]
    async fn send_template(
        &self,
        subscriber: &Subscriber,
        template: &str,
    ) -> Result<(), NotificationError> {
        let url = format!("{}/send", self.base_url);
        let body = SendMessageBody {
            message: ProviderMessage {
                to: ProviderRecipient {
                    email: String::from(subscriber.email.as_ref()),
                },
                data: ProviderTemplateData {
                    given_name: String::from(subscriber.given_name.as_ref()),
                    subscriber_id: String::from(subscriber.subscriber_id.as_ref()),
                },
                template: String::from(template),
            },
        };

        let response = self
            .http_client
            .post(&url)
            .header("Authorization", self.bearer_token())
            .json(&body)
            .send()
            .await?;

        reject_non_success(response).await
    }

    fn bearer_token(&self) -> String {
        format!("Bearer {}", self.auth_token.expose_secret())
    }
}

async fn reject_non_success(response: reqwest::Response) -> Result<(), NotificationError> {
    if response.status().is_success() {
        return Ok(());
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    Err(NotificationError::Provider { status, body })
}
