#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriberStatus {
    Pending,
    Subscribed,
    Unsubscribed,
    Deleted,
}

impl SubscriberStatus {
    pub fn parse(status: String) -> Result<SubscriberStatus, String> {
        match status.as_str() {
            "pending" => Ok(SubscriberStatus::Pending),
            "subscribed" => Ok(SubscriberStatus::Subscribed),
            "unsubscribed" => Ok(SubscriberStatus::Unsubscribed),
            // Written by an earlier soft-delete revision of the schema. Current
            // deletes remove the row instead, but those rows must still parse.
            "deleted" => Ok(SubscriberStatus::Deleted),
            _ => Err(format!("{} is not a valid subscriber status", status)),
        }
    }

    /// Whether the lifecycle allows moving from `self` to `target`.
    ///
    /// Re-entering the current state is allowed for `Subscribed` and
    /// `Unsubscribed` so that repeated clicks on a confirmation or
    /// unsubscribe link never fail. A pending subscriber cannot jump
    /// straight to unsubscribed.
    pub fn can_become(&self, target: SubscriberStatus) -> bool {
        match target {
            SubscriberStatus::Pending => false,
            SubscriberStatus::Subscribed => !matches!(self, SubscriberStatus::Deleted),
            SubscriberStatus::Unsubscribed => matches!(
                self,
                SubscriberStatus::Subscribed | SubscriberStatus::Unsubscribed
            ),
            SubscriberStatus::Deleted => true,
        }
    }

    pub fn is_subscribed(&self) -> bool {
        matches!(self, SubscriberStatus::Subscribed)
    }
}

impl AsRef<str> for SubscriberStatus {
    fn as_ref(&self) -> &str {
        match self {
            SubscriberStatus::Pending => "pending",
            SubscriberStatus::Subscribed => "subscribed",
            SubscriberStatus::Unsubscribed => "unsubscribed",
            SubscriberStatus::Deleted => "deleted",
        }
    }
}

impl std::fmt::Display for SubscriberStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}
