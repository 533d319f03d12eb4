pub mod telegram;

/// A message received from the chat platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    /// Numeric sender id; absent for anonymous channel posts
    pub sender_id: Option<u64>,
    pub content: IncomingContent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncomingContent {
    Text(String),
    /// Stickers, media, service messages and anything else without text
    Other,
}

#[cfg(test)]
impl IncomingMessage {
    pub fn text(sender_id: u64, text: impl Into<String>) -> Self {
        Self {
            sender_id: Some(sender_id),
            content: IncomingContent::Text(text.into()),
        }
    }
}
