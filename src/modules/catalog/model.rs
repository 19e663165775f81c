use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The languages the translator accepts, in the order they are listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    Javascript,
    Java,
    Cpp,
    Csharp,
    Go,
    Ruby,
    Php,
    Swift,
    Kotlin,
    Typescript,
    Rust,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Javascript => "javascript",
            Language::Java => "java",
            Language::Cpp => "cpp",
            Language::Csharp => "csharp",
            Language::Go => "go",
            Language::Ruby => "ruby",
            Language::Php => "php",
            Language::Swift => "swift",
            Language::Kotlin => "kotlin",
            Language::Typescript => "typescript",
            Language::Rust => "rust",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Language::Python => "Python",
            Language::Javascript => "JavaScript",
            Language::Java => "Java",
            Language::Cpp => "C++",
            Language::Csharp => "C#",
            Language::Go => "Go",
            Language::Ruby => "Ruby",
            Language::Php => "PHP",
            Language::Swift => "Swift",
            Language::Kotlin => "Kotlin",
            Language::Typescript => "TypeScript",
            Language::Rust => "Rust",
        }
    }

    pub fn all() -> Vec<Language> {
        vec![
            Language::Python,
            Language::Javascript,
            Language::Java,
            Language::Cpp,
            Language::Csharp,
            Language::Go,
            Language::Ruby,
            Language::Php,
            Language::Swift,
            Language::Kotlin,
            Language::Typescript,
            Language::Rust,
        ]
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLanguage(pub String);

impl fmt::Display for UnknownLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unsupported language: {}", self.0)
    }
}

impl std::error::Error for UnknownLanguage {}

impl FromStr for Language {
    type Err = UnknownLanguage;

    /// Case-insensitive, with the usual short forms.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let language = match s.trim().to_ascii_lowercase().as_str() {
            "python" | "py" => Language::Python,
            "javascript" | "js" => Language::Javascript,
            "java" => Language::Java,
            "cpp" | "c++" => Language::Cpp,
            "csharp" | "c#" | "cs" => Language::Csharp,
            "go" | "golang" => Language::Go,
            "ruby" | "rb" => Language::Ruby,
            "php" => Language::Php,
            "swift" => Language::Swift,
            "kotlin" | "kt" => Language::Kotlin,
            "typescript" | "ts" => Language::Typescript,
            "rust" | "rs" => Language::Rust,
            _ => return Err(UnknownLanguage(s.to_string())),
        };
        Ok(language)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub context_length: u32,
}

pub const MODELS: [ModelInfo; 5] = [
    ModelInfo {
        id: "llama-3.3-70b-versatile",
        name: "Llama 3.3 70B (Groq)",
        description: "Fast general model; good default for short translations.",
        context_length: 131072,
    },
    ModelInfo {
        id: "llama-3.1-8b-instant",
        name: "Llama 3.1 8B Instant (Groq)",
        description: "Lowest latency. Best for small snippets.",
        context_length: 131072,
    },
    ModelInfo {
        id: "mistralai/devstral-2512:free",
        name: "Devstral 2",
        description: "Mistral coding model with a 256K context.",
        context_length: 262144,
    },
    ModelInfo {
        id: "kwaipilot/kat-coder-pro:free",
        name: "KAT-Coder-Pro V1",
        description: "Coding specialist; slower but stronger on large files.",
        context_length: 256000,
    },
    ModelInfo {
        id: "google/gemma-3-27b-it:free",
        name: "Gemma 3 27B",
        description: "Google's mid-size model. Good prose feedback.",
        context_length: 131072,
    },
];

pub fn is_known_model(id: &str) -> bool {
    MODELS.iter().any(|m| m.id == id)
}
