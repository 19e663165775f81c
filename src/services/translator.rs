//! Prompt-and-extract translation.
//!
//! The model is asked for code only, but replies are treated as free text:
//! the first fenced block wins, and the whole reply is the fallback when the
//! model ignored the formatting instruction.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::{error, info};

use crate::services::llm::{GenerationOptions, TextGenerator};

/// Opening fence, optional tag, newline, body, newline, closing fence.
pub(crate) static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```([\w+#.-]*)\r?\n([\s\S]*?)\r?\n```").expect("fenced block pattern")
});

pub fn translation_prompt(source_code: &str, source_lang: &str, target_lang: &str) -> String {
    format!(
        "Translate the following {source_lang} code to {target_lang}:\n\n\
         ```{source_lang}\n{source_code}\n```\n\n\
         Please provide ONLY the translated {target_lang} code without any explanations or markdown formatting.\n"
    )
}

pub fn feedback_prompt(
    source_code: &str,
    translated_code: &str,
    source_lang: &str,
    target_lang: &str,
) -> String {
    format!(
        "Analyze the following code translation from {source_lang} to {target_lang}:\n\n\
         Original {source_lang} code:\n```{source_lang}\n{source_code}\n```\n\n\
         Translated {target_lang} code:\n```{target_lang}\n{translated_code}\n```\n\n\
         Please provide a brief analysis of the translation quality, including:\n\
         1. Accuracy: Does the translated code maintain the same functionality?\n\
         2. Idiomaticity: Does the translated code follow {target_lang} best practices?\n\
         3. Efficiency: Is the translated code as efficient as the original?\n\
         4. Edge cases: Are there inputs the translation handles differently?\n\
         5. Any issues or improvements that could be made.\n\n\
         Keep your response concise and focused on the most important points.\n"
    )
}

/// Body of the first fenced block, trimmed; the trimmed reply if there is none.
pub fn extract_code(reply: &str) -> String {
    match FENCED_BLOCK.captures(reply) {
        Some(caps) => caps[2].trim().to_string(),
        None => reply.trim().to_string(),
    }
}

#[derive(Clone)]
pub struct Translator {
    llm: Arc<dyn TextGenerator>,
}

impl Translator {
    pub fn new(llm: Arc<dyn TextGenerator>) -> Self {
        Self { llm }
    }

    /// Never fails: an upstream error becomes a comment-style message in
    /// place of the translated code.
    pub async fn translate(
        &self,
        source_code: &str,
        source_lang: &str,
        target_lang: &str,
        model: Option<&str>,
    ) -> String {
        let prompt = translation_prompt(source_code, source_lang, target_lang);
        let options = GenerationOptions::with_model(model.map(str::to_string));

        match self.llm.generate(&prompt, &options).await {
            Ok(reply) => {
                info!(source = source_lang, target = target_lang, "translation completed");
                extract_code(&reply)
            }
            Err(e) => {
                error!(error = %e, source = source_lang, target = target_lang, "translation failed");
                format!("// Error translating code: {e}")
            }
        }
    }

    pub async fn feedback(
        &self,
        source_code: &str,
        translated_code: &str,
        source_lang: &str,
        target_lang: &str,
        model: Option<&str>,
    ) -> String {
        let prompt = feedback_prompt(source_code, translated_code, source_lang, target_lang);
        let options = GenerationOptions::with_model(model.map(str::to_string));

        match self.llm.generate(&prompt, &options).await {
            Ok(reply) => reply.trim().to_string(),
            Err(e) => {
                error!(error = %e, "translation feedback failed");
                format!("Error analyzing translation: {e}")
            }
        }
    }
}
