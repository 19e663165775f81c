//! Heuristic classification of chat messages.
//!
//! Everything here is ordered first-match-wins pattern matching. It is a
//! best-effort classifier: ambiguous phrasing resolves to whatever the
//! earliest pattern captures, and anything unrecognised degrades to chat.

use std::sync::LazyLock;

use regex::Regex;

use crate::services::translator::FENCED_BLOCK;

static INLINE_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`\n]+)`").expect("inline span pattern"));

const CODE_KEYWORDS: [&str; 4] = ["def ", "function ", "class ", "import "];

/// Tried in order; groups are (source, target, code).
static TRANSLATION_TEMPLATES: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        r"(?i)translate\s+(?:this|the)?\s*(?:code)?\s*(?:from\s+(\w+)\s+to\s+(\w+))?\s*[:\-]?\s*(```[\s\S]*?```|`[\s\S]*?`)",
        r"(?i)convert\s+(?:this|the)?\s*(?:code)?\s*(?:from\s+(\w+)\s+to\s+(\w+))?\s*[:\-]?\s*(```[\s\S]*?```|`[\s\S]*?`)",
        r"(?i)(?:from\s+(\w+)\s+to\s+(\w+)).*?(```[\s\S]*?```|`[\s\S]*?`)",
    ]
    .map(|p| Regex::new(p).expect("translation template"))
});

static LANGUAGE_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:from|in)\s+(\w+).*?(?:to|into)\s+(\w+)").expect("language pair pattern")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeDetection {
    FencedBlock { code: String, language: Option<String> },
    InlineSpan { code: String },
    KeywordHeuristic { code: String },
    None,
}

impl CodeDetection {
    pub fn has_code(&self) -> bool {
        !matches!(self, CodeDetection::None)
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            CodeDetection::FencedBlock { code, .. }
            | CodeDetection::InlineSpan { code }
            | CodeDetection::KeywordHeuristic { code } => Some(code),
            CodeDetection::None => None,
        }
    }

    pub fn language(&self) -> Option<&str> {
        match self {
            CodeDetection::FencedBlock { language, .. } => language.as_deref(),
            _ => None,
        }
    }
}

pub fn detect_code(message: &str) -> CodeDetection {
    if let Some(caps) = FENCED_BLOCK.captures(message) {
        let language = caps
            .get(1)
            .map(|m| m.as_str())
            .filter(|tag| !tag.is_empty())
            .map(str::to_string);
        return CodeDetection::FencedBlock {
            code: caps[2].trim().to_string(),
            language,
        };
    }

    if let Some(caps) = INLINE_SPAN.captures(message) {
        return CodeDetection::InlineSpan {
            code: caps[1].to_string(),
        };
    }

    if CODE_KEYWORDS.iter().any(|kw| message.contains(kw)) {
        return CodeDetection::KeywordHeuristic {
            code: message.to_string(),
        };
    }

    CodeDetection::None
}

/// A message that looks like a translation request. Either language may be
/// missing: the first two templates make the `from X to Y` part optional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationIntent {
    pub code: String,
    pub source_language: Option<String>,
    pub target_language: Option<String>,
}

impl TranslationIntent {
    pub fn language_pair(&self) -> Option<(&str, &str)> {
        Some((self.source_language.as_deref()?, self.target_language.as_deref()?))
    }
}

/// Body of a captured block: a fence loses its tag line, a span its backticks.
fn block_body(block: &str) -> String {
    match FENCED_BLOCK.captures(block) {
        Some(fence) => fence[2].trim().to_string(),
        None => block.trim_matches('`').trim().to_string(),
    }
}

pub fn detect_translation_request(message: &str) -> Option<TranslationIntent> {
    for template in TRANSLATION_TEMPLATES.iter() {
        if let Some(caps) = template.captures(message) {
            let block = caps.get(3).map(|m| m.as_str()).unwrap_or_default();
            return Some(TranslationIntent {
                code: block_body(block),
                source_language: caps.get(1).map(|m| m.as_str().to_string()),
                target_language: caps.get(2).map(|m| m.as_str().to_string()),
            });
        }
    }

    let detection = detect_code(message);
    let code = detection.code()?;
    let caps = LANGUAGE_PAIR.captures(message)?;

    Some(TranslationIntent {
        code: code.to_string(),
        source_language: Some(caps[1].to_string()),
        target_language: Some(caps[2].to_string()),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageIntent {
    Translate {
        code: String,
        source_language: String,
        target_language: String,
    },
    ContainsCode(CodeDetection),
    Chat,
}

impl MessageIntent {
    pub fn is_translation(&self) -> bool {
        matches!(self, MessageIntent::Translate { .. })
    }
}

/// A translation needs code and both language names; without the pair the
/// message falls through to ordinary chat handling.
pub fn classify(message: &str) -> MessageIntent {
    if let Some(intent) = detect_translation_request(message) {
        if let Some((source, target)) = intent.language_pair() {
            if !intent.code.is_empty() {
                return MessageIntent::Translate {
                    source_language: source.to_string(),
                    target_language: target.to_string(),
                    code: intent.code,
                };
            }
        }
    }

    let detection = detect_code(message);
    if detection.has_code() {
        MessageIntent::ContainsCode(detection)
    } else {
        MessageIntent::Chat
    }
}
