use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::modules::catalog::model::{is_known_model, Language};

/// Upper bound on submitted source, in bytes.
pub const MAX_SOURCE_BYTES: usize = 10 * 1024;

fn default_source_language() -> String {
    "python".to_string()
}

fn default_target_language() -> String {
    "javascript".to_string()
}

fn invalid(code: &'static str, message: String) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Owned(message))
}

fn validate_source_code(code: &str) -> Result<(), ValidationError> {
    if code.trim().is_empty() {
        return Err(invalid("source_code", "Source code cannot be empty".to_string()));
    }
    if code.len() > MAX_SOURCE_BYTES {
        return Err(invalid(
            "source_code",
            format!("Source code exceeds {MAX_SOURCE_BYTES} bytes"),
        ));
    }
    Ok(())
}

fn validate_language(name: &str) -> Result<(), ValidationError> {
    name.parse::<Language>()
        .map(|_| ())
        .map_err(|e| invalid("language", e.to_string()))
}

fn validate_model(model: &str) -> Result<(), ValidationError> {
    if is_known_model(model) {
        Ok(())
    } else {
        Err(invalid("model", format!("Unknown model: {model}")))
    }
}

fn validate_language_pair(request: &TranslateRequest) -> Result<(), ValidationError> {
    let (Ok(source), Ok(target)) = (
        request.source_language.parse::<Language>(),
        request.target_language.parse::<Language>(),
    ) else {
        return Ok(());
    };
    if source == target {
        return Err(invalid(
            "language_pair",
            "Source and target languages must be different".to_string(),
        ));
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "validate_language_pair"))]
pub struct TranslateRequest {
    #[validate(custom(function = "validate_source_code"))]
    pub source_code: String,
    #[serde(default = "default_source_language")]
    #[validate(custom(function = "validate_language"))]
    pub source_language: String,
    #[serde(default = "default_target_language")]
    #[validate(custom(function = "validate_language"))]
    pub target_language: String,
    #[validate(custom(function = "validate_model"))]
    pub model: Option<String>,
}

impl TranslateRequest {
    /// Canonical language pair. Only meaningful after `validate()` passed.
    pub fn languages(&self) -> Option<(Language, Language)> {
        Some((
            self.source_language.parse().ok()?,
            self.target_language.parse().ok()?,
        ))
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct FeedbackRequest {
    #[validate(custom(function = "validate_source_code"))]
    pub source_code: String,
    #[validate(length(min = 1, message = "Translated code cannot be empty"))]
    pub translated_code: String,
    #[serde(default = "default_source_language")]
    #[validate(custom(function = "validate_language"))]
    pub source_language: String,
    #[serde(default = "default_target_language")]
    #[validate(custom(function = "validate_language"))]
    pub target_language: String,
    #[validate(custom(function = "validate_model"))]
    pub model: Option<String>,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum Remaining {
    Count(i64),
    Unlimited(&'static str),
}

impl Remaining {
    pub fn unlimited() -> Self {
        Remaining::Unlimited("unlimited")
    }
}

#[derive(Debug, Serialize)]
pub struct TranslateResponse {
    pub translated_code: String,
    pub feedback: String,
    pub translations_remaining: Remaining,
}

#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub feedback: String,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
    pub offset: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct TranslationEntry {
    pub id: String,
    pub source_code: String,
    pub translated_code: String,
    pub source_language: String,
    pub target_language: String,
    pub feedback: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub success: bool,
    pub translations: Vec<TranslationEntry>,
    pub total_count: u64,
    pub limit: i64,
    pub offset: u64,
}

#[derive(Debug, Serialize)]
pub struct LimitResponse {
    pub success: bool,
    pub plan_id: String,
    pub limit: i64,
    pub used: i64,
    pub remaining: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(code: &str, source: &str, target: &str) -> TranslateRequest {
        TranslateRequest {
            source_code: code.to_string(),
            source_language: source.to_string(),
            target_language: target.to_string(),
            model: None,
        }
    }

    #[test]
    fn accepts_aliases_and_rejects_same_pair() {
        assert!(request("print(1)", "py", "js").validate().is_ok());
        assert!(request("print(1)", "python", "py").validate().is_err());
        assert!(request("print(1)", "python", "cobol").validate().is_err());
    }

    #[test]
    fn source_size_is_bounded_in_bytes() {
        assert!(request("   ", "python", "go").validate().is_err());
        // 4 bytes per char: within 10240 chars but over 10240 bytes.
        let wide = "😀".repeat(MAX_SOURCE_BYTES / 4 + 1);
        assert!(request(&wide, "python", "go").validate().is_err());
        let max = "x".repeat(MAX_SOURCE_BYTES);
        assert!(request(&max, "python", "go").validate().is_ok());
    }

    #[test]
    fn defaults_apply_when_languages_are_omitted() {
        let parsed: TranslateRequest = serde_json::from_str(r#"{"source_code":"x = 1"}"#).unwrap();
        assert_eq!(parsed.languages(), Some((Language::Python, Language::Javascript)));
    }

    #[test]
    fn unknown_model_is_rejected() {
        let mut req = request("x = 1", "python", "go");
        req.model = Some("gpt-nonexistent".to_string());
        assert!(req.validate().is_err());
        req.model = Some("llama-3.1-8b-instant".to_string());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn remaining_serializes_as_number_or_word() {
        assert_eq!(serde_json::to_value(Remaining::Count(3)).unwrap(), serde_json::json!(3));
        assert_eq!(serde_json::to_value(Remaining::unlimited()).unwrap(), serde_json::json!("unlimited"));
    }
}
