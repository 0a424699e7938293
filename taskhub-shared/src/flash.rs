/// One-shot flash messages
///
/// Messages queued by one request are shown by the next rendered page and
/// then dropped. They travel between the two requests in a cookie whose value
/// is hex-encoded JSON, which keeps it within the cookie value charset.
///
/// # Example
///
/// ```
/// use taskhub_shared::flash::{decode, encode, FlashMessage};
///
/// let messages = vec![FlashMessage::success("Задача успешно создана")];
/// let cookie_value = encode(&messages).unwrap();
///
/// assert_eq!(decode(&cookie_value).unwrap(), messages);
/// ```

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum FlashError {
    #[error("Flash cookie is not valid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("Flash payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Info,
    Error,
}

impl FlashLevel {
    /// CSS class suffix used by the page layout
    pub fn css_class(self) -> &'static str {
        match self {
            FlashLevel::Success => "success",
            FlashLevel::Info => "info",
            FlashLevel::Error => "danger",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub text: String,
}

impl FlashMessage {
    pub fn new(level: FlashLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(FlashLevel::Success, text)
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(FlashLevel::Info, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(FlashLevel::Error, text)
    }
}

/// Serializes messages into a cookie-safe string
pub fn encode(messages: &[FlashMessage]) -> Result<String, FlashError> {
    let json = serde_json::to_vec(messages)?;
    Ok(hex::encode(json))
}

/// Parses a cookie value produced by [`encode`]
pub fn decode(value: &str) -> Result<Vec<FlashMessage>, FlashError> {
    if value.is_empty() {
        return Ok(Vec::new());
    }

    let bytes = hex::decode(value)?;
    Ok(serde_json::from_slice(&bytes)?)
}
