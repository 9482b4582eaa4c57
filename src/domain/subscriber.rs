use chrono::{DateTime, Utc};

use crate::domain::given_name::GivenName;
use crate::domain::subscriber_email::SubscriberEmail;
use crate::domain::subscriber_id::SubscriberId;
use crate::domain::subscriber_status::SubscriberStatus;

#[derive(Debug, Clone, serde::Serialize)]
pub struct Subscriber {
    pub subscriber_id: SubscriberId,
    pub email: SubscriberEmail,
    pub given_name: GivenName,
    pub status: SubscriberStatus,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    /// Carried untouched from one schema revision. Never interpreted.
    pub ttl: Option<i64>,
}

impl Subscriber {
    /// Builds a fully-populated record. `status` defaults to pending and
    /// `subscriber_id` to a freshly generated token when not supplied.
    pub fn create(
        email: SubscriberEmail,
        given_name: GivenName,
        status: Option<SubscriberStatus>,
        subscriber_id: Option<SubscriberId>,
    ) -> Subscriber {
        let now = Utc::now();

        Subscriber {
            subscriber_id: subscriber_id.unwrap_or_else(SubscriberId::generate),
            email,
            given_name,
            status: status.unwrap_or(SubscriberStatus::Pending),
            created: now,
            updated: now,
            ttl: None,
        }
    }

    /// The external profile mirrors a verified address only once the
    /// subscriber has confirmed.
    pub fn email_verified(&self) -> bool {
        self.status.is_subscribed()
    }
}
