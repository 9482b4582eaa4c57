use unicode_segmentation::UnicodeSegmentation;

const MAX_GRAPHEME_COUNT: usize = 256;
const FORBIDDEN_CHARS: [char; 9] = ['/', '{', '}', '"', '>', '<', '\\', '(', ')'];

#[derive(Debug, Clone, serde::Serialize)]
pub struct GivenName(String);

impl GivenName {
    pub fn parse(name: String) -> Result<GivenName, String> {
        let is_empty_or_whitespace = name.trim().is_empty();
        let is_too_long = name.graphemes(true).count() > MAX_GRAPHEME_COUNT;
        let contains_forbidden_chars = name.chars().any(|char| FORBIDDEN_CHARS.contains(&char));

        if is_empty_or_whitespace || is_too_long || contains_forbidden_chars {
            return Err(format!("{} is not a valid given name", name));
        }

        Ok(Self(name))
    }
}

impl AsRef<str> for GivenName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
