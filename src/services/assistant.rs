use std::sync::Arc;

use tracing::{debug, error};

use crate::modules::catalog::model::Language;
use crate::services::conversation::{ConversationTurn, Role};
use crate::services::intent::{classify, MessageIntent};
use crate::services::llm::{GenerationOptions, TextGenerator};
use crate::services::translator::Translator;

const TRAITS: [&str; 5] = [
    "friendly",
    "helpful",
    "knowledgeable about programming",
    "patient",
    "encouraging",
];

pub const APOLOGY: &str = "I'm sorry, I encountered an error while processing your message. \
Could you try rephrasing or try again later?";

/// A chat message that asks for a translation between two distinct,
/// supported languages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTranslation {
    pub code: String,
    pub source: Language,
    pub target: Language,
}

impl ChatTranslation {
    pub fn detect(message: &str) -> Option<Self> {
        let MessageIntent::Translate {
            code,
            source_language,
            target_language,
        } = classify(message)
        else {
            return None;
        };

        // Loose phrasing like "in my code to something" also matches, so
        // only hand off when both names are real languages.
        let source = source_language.parse::<Language>().ok()?;
        let target = target_language.parse::<Language>().ok()?;
        (source != target).then_some(Self { code, source, target })
    }

    pub fn reply(&self, translated: &str) -> String {
        format!(
            "Here's your translated code from {} to {}:\n\n```{}\n{}\n```\n\n\
             Is there anything else you'd like me to help with?",
            self.source.as_str(),
            self.target.as_str(),
            self.target.as_str(),
            translated
        )
    }
}

/// Conversational front end: routes translation requests found in chat to
/// the translator and everything else to a persona prompt.
#[derive(Clone)]
pub struct ChatAssistant {
    name: String,
    llm: Arc<dyn TextGenerator>,
    translator: Translator,
}

impl ChatAssistant {
    pub fn new(name: impl Into<String>, llm: Arc<dyn TextGenerator>) -> Self {
        Self {
            name: name.into(),
            translator: Translator::new(Arc::clone(&llm)),
            llm,
        }
    }

    pub fn greeting(&self) -> String {
        format!(
            "Hi! I'm {}, your friendly AI code translation assistant. I can help you translate code \
             between different programming languages, answer questions about programming, and provide \
             guidance on best practices. How can I help you today?",
            self.name
        )
    }

    fn system_prompt(&self) -> String {
        format!(
            "You are {}, a {} AI assistant focused on helping with code translation and programming questions. \
             Be concise and helpful.",
            self.name,
            TRAITS.join(", ")
        )
    }

    /// Runs a translation found in chat and wraps the result in a reply.
    /// Returns `(translated_code, reply)`.
    pub async fn translate(&self, request: &ChatTranslation) -> (String, String) {
        debug!(source = request.source.as_str(), target = request.target.as_str(), "translation requested in chat");
        let translated = self
            .translator
            .translate(&request.code, request.source.as_str(), request.target.as_str(), None)
            .await;
        let reply = request.reply(&translated);
        (translated, reply)
    }

    /// `history` is the conversation so far, excluding `message`.
    pub async fn chat(&self, history: &[ConversationTurn], message: &str) -> String {
        let prompt = self.chat_prompt(history, message);
        let options = GenerationOptions {
            temperature: Some(0.7),
            max_tokens: Some(1024),
            ..GenerationOptions::default()
        };

        match self.llm.generate(&prompt, &options).await {
            Ok(reply) => reply.trim().to_string(),
            Err(e) => {
                error!(error = %e, "chat completion failed");
                APOLOGY.to_string()
            }
        }
    }

    pub fn chat_prompt(&self, history: &[ConversationTurn], message: &str) -> String {
        let context = history
            .iter()
            .map(|turn| match turn.role {
                Role::User => format!("User: {}\n", turn.content),
                Role::Assistant => format!("{}: {}\n", self.name, turn.content),
            })
            .collect::<String>();

        format!(
            "{}\n\nConversation history:\n{}\n\nUser: {}\n{}:",
            self.system_prompt(),
            context,
            message,
            self.name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_distinct_supported_languages_count_as_a_translation() {
        let request = ChatTranslation::detect("translate this from py to rust: `print(1)`").unwrap();
        assert_eq!(request.source, Language::Python);
        assert_eq!(request.target, Language::Rust);
        assert_eq!(request.code, "print(1)");

        assert!(ChatTranslation::detect("translate this from python to python: `print(1)`").is_none());
        assert!(ChatTranslation::detect("translate this from python to cobol: `print(1)`").is_none());
        assert!(ChatTranslation::detect("what does `print(1)` do?").is_none());
    }

    #[test]
    fn reply_fences_the_result_in_the_target_language() {
        let request = ChatTranslation {
            code: "print(1)".to_string(),
            source: Language::Python,
            target: Language::Javascript,
        };
        let reply = request.reply("console.log(1);");
        assert!(reply.starts_with("Here's your translated code from python to javascript:"));
        assert!(reply.contains("```javascript\nconsole.log(1);\n```"));
    }
}
