use rand::Rng;

const GENERATED_LENGTH: usize = 21;
const MAX_LENGTH: usize = 64;

/// Opaque identifier assigned to a subscriber at creation. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SubscriberId(String);

impl SubscriberId {
    pub fn generate() -> SubscriberId {
        let mut rng = rand::thread_rng();

        let token = std::iter::repeat_with(|| rng.sample(rand::distributions::Alphanumeric))
            .map(char::from)
            .take(GENERATED_LENGTH)
            .collect();

        Self(token)
    }

    /// Parses an identifier coming from an untrusted source, e.g. a path parameter.
    pub fn parse(id: String) -> Result<SubscriberId, String> {
        let is_empty_or_whitespace = id.trim().is_empty();
        let is_too_long = id.len() > MAX_LENGTH;
        let contains_invalid_chars = id
            .chars()
            .any(|char| !char.is_ascii_alphanumeric() && char != '-' && char != '_');

        if is_empty_or_whitespace || is_too_long || contains_invalid_chars {
            return Err(format!("{} is not a valid subscriber id", id));
        }

        Ok(Self(id))
    }
}

impl AsRef<str> for SubscriberId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
