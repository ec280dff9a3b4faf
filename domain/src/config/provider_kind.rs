//! Model provider value object

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Which HTTP model API the assistant talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Local Ollama server (default)
    #[default]
    Ollama,
    /// OpenAI-compatible chat completions
    OpenAi,
    /// Anthropic messages API
    Anthropic,
    /// Google Gemini `generateContent`
    Gemini,
    /// Replicate hosted predictions
    Replicate,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Ollama => "ollama",
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Gemini => "gemini",
            ProviderKind::Replicate => "replicate",
        }
    }

    /// Base URL used when none is configured
    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderKind::Ollama => "http://127.0.0.1:11434",
            ProviderKind::OpenAi => "https://api.openai.com/v1",
            ProviderKind::Anthropic => "https://api.anthropic.com",
            ProviderKind::Gemini => "https://generativelanguage.googleapis.com",
            ProviderKind::Replicate => "https://api.replicate.com",
        }
    }

    /// Model used when the config names none
    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::Ollama => "mistral",
            ProviderKind::OpenAi => "gpt-4.1-mini",
            ProviderKind::Anthropic => "claude-3-haiku-20240307",
            ProviderKind::Gemini => "gemini-2.0-flash",
            ProviderKind::Replicate => "meta/meta-llama-3-8b-instruct",
        }
    }

    /// Environment variable holding the API key when none is configured
    pub fn default_api_key_env(&self) -> Option<&'static str> {
        match self {
            ProviderKind::Ollama => None,
            ProviderKind::OpenAi => Some("OPENAI_API_KEY"),
            ProviderKind::Anthropic => Some("ANTHROPIC_API_KEY"),
            ProviderKind::Gemini => Some("GEMINI_KEY"),
            ProviderKind::Replicate => Some("REPLICATE_API_KEY"),
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(ProviderKind::Ollama),
            "openai" => Ok(ProviderKind::OpenAi),
            "anthropic" | "claude" => Ok(ProviderKind::Anthropic),
            "gemini" => Ok(ProviderKind::Gemini),
            "replicate" => Ok(ProviderKind::Replicate),
            other => Err(DomainError::UnknownProvider(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_ollama() {
        assert_eq!(ProviderKind::default(), ProviderKind::Ollama);
        assert_eq!(
            ProviderKind::default().default_base_url(),
            "http://127.0.0.1:11434"
        );
    }

    #[test]
    fn test_from_str() {
        assert_eq!("OpenAI".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAi);
        assert_eq!("claude".parse::<ProviderKind>().unwrap(), ProviderKind::Anthropic);
        assert_eq!(" Gemini ".parse::<ProviderKind>().unwrap(), ProviderKind::Gemini);
        assert_eq!("replicate".parse::<ProviderKind>().unwrap(), ProviderKind::Replicate);
        assert!("bard".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_hosted_providers_need_keys() {
        assert_eq!(ProviderKind::Gemini.default_api_key_env(), Some("GEMINI_KEY"));
        assert_eq!(
            ProviderKind::Replicate.default_api_key_env(),
            Some("REPLICATE_API_KEY")
        );
        assert_eq!(ProviderKind::Ollama.default_api_key_env(), None);
    }

    #[test]
    fn test_default_models() {
        assert_eq!(ProviderKind::Ollama.default_model(), "mistral");
        assert_eq!(ProviderKind::Gemini.default_model(), "gemini-2.0-flash");
        assert_eq!(
            ProviderKind::Replicate.default_model(),
            "meta/meta-llama-3-8b-instruct"
        );
    }

    #[test]
    fn test_serialize_lowercase() {
        let json = serde_json::to_string(&ProviderKind::OpenAi).unwrap();
        assert_eq!(json, "\"openai\"");
    }
}
