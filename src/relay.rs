use std::collections::HashSet;

use tracing::{debug, error, info, warn};

use crate::cleanup::clean_word_analysis;
use crate::llm::TextGenerator;
use crate::platform::{IncomingContent, IncomingMessage};
use crate::prompt::{self, InputKind, TranslationRequest};

pub const UNAUTHORIZED_MESSAGE: &str = "You are not authorized to use this bot.";

pub const GREETING_MESSAGE: &str = "I'm a translator bot! Send me text in English or Persian, \
    and I'll translate it. I can also handle single words and provide part of speech \
    information and IPA pronunciation for English words.";

pub const QUOTA_MESSAGE: &str =
    "Translation service is currently unavailable. Please try again later or check GOOGLE_API_KEY.";

pub const FAILURE_MESSAGE: &str = "An error occurred during translation. Please try again later.";

/// What to send back for an inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Unauthorized,
    Greeting,
    Translation(String),
}

impl Reply {
    pub fn text(&self) -> &str {
        match self {
            Reply::Unauthorized => UNAUTHORIZED_MESSAGE,
            Reply::Greeting => GREETING_MESSAGE,
            Reply::Translation(text) => text,
        }
    }
}

/// Routes messages from the chat platform to the model and back.
/// Platform-agnostic; holds no per-user state.
pub struct Relay {
    generator: Box<dyn TextGenerator>,
    allowed_user_ids: HashSet<i64>,
}

impl Relay {
    pub fn new(generator: Box<dyn TextGenerator>, allowed_user_ids: HashSet<i64>) -> Self {
        Self {
            generator,
            allowed_user_ids,
        }
    }

    pub fn is_allowed(&self, user_id: u64) -> bool {
        i64::try_from(user_id).is_ok_and(|id| self.allowed_user_ids.contains(&id))
    }

    /// Decide on the reply for a message, calling the model when a translation is needed.
    /// `None` means the message is ignored.
    pub async fn handle(&self, incoming: &IncomingMessage) -> Option<Reply> {
        let user_id = incoming.sender_id?;

        if !self.is_allowed(user_id) {
            info!("Rejected message from unauthorized user {}", user_id);
            return Some(Reply::Unauthorized);
        }

        let text = match &incoming.content {
            IncomingContent::Text(text) => text,
            IncomingContent::Other => {
                debug!("Ignoring non-text message from {}", user_id);
                return None;
            }
        };

        if let Some(command) = command_name(text) {
            if command == "start" {
                return Some(Reply::Greeting);
            }
            debug!("Ignoring command /{} from {}", command, user_id);
            return None;
        }

        let request = prompt::detect(text)?;
        Some(Reply::Translation(self.translate(&request).await))
    }

    /// Run a translation. Failures are mapped to a fixed user-facing message.
    pub async fn translate(&self, request: &TranslationRequest) -> String {
        let prompt = prompt::build_prompt(request);

        info!(
            "Translating {:?} ({:?}, {} chars)",
            request.kind,
            request.direction,
            request.text.chars().count()
        );

        match self.generator.generate(&prompt).await {
            Ok(response) => {
                let cleaned = match request.kind {
                    InputKind::SingleWord => clean_word_analysis(&response),
                    InputKind::Text => response.trim().to_string(),
                };
                if cleaned.is_empty() {
                    warn!("Translation was empty after cleanup (raw: {:?})", response);
                    return FAILURE_MESSAGE.to_string();
                }
                cleaned
            }
            Err(e) => {
                error!("Error during translation: {:#}", e);
                fallback_message(&e)
            }
        }
    }
}

fn fallback_message(err: &anyhow::Error) -> String {
    if format!("{:#}", err).contains("400") {
        QUOTA_MESSAGE.to_string()
    } else {
        FAILURE_MESSAGE.to_string()
    }
}

/// Command name of a `/command[@bot] [args]` message. Case-sensitive.
fn command_name(text: &str) -> Option<&str> {
    let rest = text.strip_prefix('/')?;
    let token = rest.split_whitespace().next().unwrap_or("");
    token.split('@').next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    /// Records prompts and answers with a canned result.
    struct StubGenerator {
        prompts: Arc<Mutex<Vec<String>>>,
        answer: std::result::Result<String, String>,
    }

    #[async_trait]
    impl TextGenerator for StubGenerator {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match &self.answer {
                Ok(text) => Ok(text.clone()),
                Err(e) => Err(anyhow::anyhow!(e.clone())),
            }
        }
    }

    fn relay_with(
        answer: std::result::Result<&str, &str>,
    ) -> (Relay, Arc<Mutex<Vec<String>>>) {
        let prompts = Arc::new(Mutex::new(Vec::new()));
        let generator = StubGenerator {
            prompts: prompts.clone(),
            answer: answer.map(str::to_string).map_err(str::to_string),
        };
        let relay = Relay::new(Box::new(generator), HashSet::from([42]));
        (relay, prompts)
    }

    #[tokio::test]
    async fn test_unauthorized_never_reaches_model() {
        let (relay, prompts) = relay_with(Ok("ignored"));

        let reply = relay.handle(&IncomingMessage::text(7, "hello world")).await;
        assert_eq!(reply, Some(Reply::Unauthorized));
        assert_eq!(reply.unwrap().text(), UNAUTHORIZED_MESSAGE);

        let sticker = IncomingMessage {
            sender_id: Some(7),
            content: IncomingContent::Other,
        };
        assert_eq!(relay.handle(&sticker).await, Some(Reply::Unauthorized));

        let start = relay.handle(&IncomingMessage::text(7, "/start")).await;
        assert_eq!(start, Some(Reply::Unauthorized));

        assert!(prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_sender_is_ignored() {
        let (relay, prompts) = relay_with(Ok("ignored"));
        let anonymous = IncomingMessage {
            sender_id: None,
            content: IncomingContent::Text("hello".to_string()),
        };
        assert_eq!(relay.handle(&anonymous).await, None);
        assert!(prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_start_greets() {
        let (relay, prompts) = relay_with(Ok("ignored"));
        for text in ["/start", "/start@translator_bot", "/start payload"] {
            let reply = relay.handle(&IncomingMessage::text(42, text)).await;
            assert_eq!(reply, Some(Reply::Greeting));
        }
        assert!(prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_other_commands_and_non_text_ignored() {
        let (relay, prompts) = relay_with(Ok("ignored"));

        assert_eq!(relay.handle(&IncomingMessage::text(42, "/help")).await, None);
        assert_eq!(relay.handle(&IncomingMessage::text(42, "/startx")).await, None);
        assert_eq!(relay.handle(&IncomingMessage::text(42, "/START")).await, None);

        let photo = IncomingMessage {
            sender_id: Some(42),
            content: IncomingContent::Other,
        };
        assert_eq!(relay.handle(&photo).await, None);

        assert!(prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_single_word_uses_word_template_and_cleanup() {
        let (relay, prompts) = relay_with(Ok(" Translation: سیب (sib)\nPart of Speech: noun \n"));

        let reply = relay.handle(&IncomingMessage::text(42, "apple")).await;
        assert_eq!(
            reply,
            Some(Reply::Translation(
                "Translation: سیب \nPart of Speech: noun".to_string()
            ))
        );

        let prompts = prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Translate the following English word to Persian"));
    }

    #[tokio::test]
    async fn test_persian_word_direction() {
        let (relay, prompts) = relay_with(Ok("Translation: book"));
        relay.handle(&IncomingMessage::text(42, "کتاب")).await;
        assert!(prompts.lock().unwrap()[0].contains("Translate the following Persian word to English"));
    }

    #[tokio::test]
    async fn test_text_uses_translation_template_and_trims() {
        let (relay, prompts) = relay_with(Ok("  صبح بخیر (hello)\n"));

        let reply = relay.handle(&IncomingMessage::text(42, "good morning")).await;
        assert_eq!(reply, Some(Reply::Translation("صبح بخیر (hello)".to_string())));
        assert!(prompts.lock().unwrap()[0].starts_with("Translate the following text to Persian."));
    }

    #[tokio::test]
    async fn test_blank_text_is_ignored() {
        let (relay, prompts) = relay_with(Ok("ignored"));
        assert_eq!(relay.handle(&IncomingMessage::text(42, "   ")).await, None);
        assert!(prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_word_emptied_by_cleanup_gets_failure_message() {
        let (relay, prompts) = relay_with(Ok("(sib) [Persian Translation]"));
        let reply = relay.handle(&IncomingMessage::text(42, "apple")).await;
        assert_eq!(reply, Some(Reply::Translation(FAILURE_MESSAGE.to_string())));
        assert_eq!(prompts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_blank_text_response_gets_failure_message() {
        let (relay, _) = relay_with(Ok(" \n "));
        let reply = relay.handle(&IncomingMessage::text(42, "good night")).await;
        assert_eq!(reply, Some(Reply::Translation(FAILURE_MESSAGE.to_string())));
    }

    #[test]
    fn test_negative_allow_list_entries_match_nobody() {
        let (relay, _) = relay_with(Ok("ignored"));
        let relay = Relay::new(relay.generator, HashSet::from([42, -1001234567890]));
        assert!(relay.is_allowed(42));
        assert!(!relay.is_allowed(1001234567890));
        assert!(!relay.is_allowed(u64::MAX));
    }

    #[tokio::test]
    async fn test_bad_request_maps_to_quota_message() {
        let (relay, _) = relay_with(Err("Gemini API error (400 Bad Request): API key not valid"));
        let reply = relay.handle(&IncomingMessage::text(42, "hello there")).await;
        assert_eq!(reply, Some(Reply::Translation(QUOTA_MESSAGE.to_string())));
    }

    #[tokio::test]
    async fn test_other_errors_map_to_failure_message() {
        let (relay, _) = relay_with(Err("Failed to send request to Gemini"));
        let reply = relay.handle(&IncomingMessage::text(42, "hello")).await;
        assert_eq!(reply, Some(Reply::Translation(FAILURE_MESSAGE.to_string())));
    }

    #[test]
    fn test_fallback_checks_whole_error_chain() {
        let err = anyhow::anyhow!("status 400").context("Gemini call failed");
        assert_eq!(fallback_message(&err), QUOTA_MESSAGE);
    }

    #[test]
    fn test_command_name() {
        assert_eq!(command_name("/start"), Some("start"));
        assert_eq!(command_name("/Start@bot arg"), Some("Start"));
        assert_eq!(command_name("hello /start"), None);
        assert_eq!(command_name("/"), Some(""));
    }
}
