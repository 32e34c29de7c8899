//! Text-generation service clients.
//!
//! The query loop only sees the [`TextGenerator`] trait. Two backends are
//! provided: Google Gemini (hosted, needs an API key) and a local Ollama
//! server.

use crate::error::GenerationError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, error, info};

/// Given a prompt, return the generated answer.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Which text-generation backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Gemini,
    Ollama,
}

impl Provider {
    pub fn default_model(self) -> &'static str {
        match self {
            Provider::Gemini => "gemini-2.0-flash",
            Provider::Ollama => "llama3.2:latest",
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            Provider::Gemini => "https://generativelanguage.googleapis.com/v1beta",
            Provider::Ollama => "http://localhost:11434",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Gemini => write!(f, "gemini"),
            Provider::Ollama => write!(f, "ollama"),
        }
    }
}

/// A service credential. Never printed.
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Read the key from `env_var`; unset or blank is a missing credential.
    pub fn from_env(env_var: &str) -> Result<Self, GenerationError> {
        match std::env::var(env_var) {
            Ok(key) if !key.trim().is_empty() => Ok(Self::new(key.trim())),
            _ => Err(GenerationError::MissingCredential {
                env_var: env_var.to_string(),
            }),
        }
    }

    fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(****)")
    }
}

/// Model and connection settings shared by both backends.
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub timeout_seconds: u64,
}

impl GenerationSettings {
    pub fn for_provider(provider: Provider) -> Self {
        Self {
            model: provider.default_model().to_string(),
            base_url: provider.default_base_url().to_string(),
            temperature: 0.3,
            timeout_seconds: 60,
        }
    }
}

fn http_client(timeout_seconds: u64) -> Result<reqwest::Client, GenerationError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .build()
        .map_err(|e| GenerationError::Request(format!("failed to create HTTP client: {}", e)))
}

fn request_failed(err: reqwest::Error, settings: &GenerationSettings) -> GenerationError {
    if err.is_timeout() {
        GenerationError::Timeout {
            seconds: settings.timeout_seconds,
        }
    } else if err.is_connect() {
        GenerationError::Request(format!("cannot connect to {}", settings.base_url))
    } else {
        GenerationError::Request(err.to_string())
    }
}

/// Build the client for `provider`. Gemini needs the key from `api_key_env`.
pub fn connect(
    provider: Provider,
    settings: GenerationSettings,
    api_key_env: &str,
) -> Result<Box<dyn TextGenerator>, GenerationError> {
    info!("Using {} model {}", provider, settings.model);
    match provider {
        Provider::Gemini => {
            let api_key = ApiKey::from_env(api_key_env)?;
            Ok(Box::new(GeminiClient::new(api_key, settings)?))
        }
        Provider::Ollama => Ok(Box::new(OllamaClient::new(settings)?)),
    }
}

// === Gemini ===

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<Content>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

/// Client for the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    http_client: reqwest::Client,
    api_key: ApiKey,
    settings: GenerationSettings,
}

impl GeminiClient {
    pub fn new(api_key: ApiKey, settings: GenerationSettings) -> Result<Self, GenerationError> {
        Ok(Self {
            http_client: http_client(settings.timeout_seconds)?,
            api_key,
            settings,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.settings.base_url.trim_end_matches('/'),
            self.settings.model
        )
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: self.settings.temperature,
            },
        };

        debug!("Calling Gemini model {}", self.settings.model);

        let response = self
            .http_client
            .post(self.endpoint())
            .header("x-goog-api-key", self.api_key.expose())
            .json(&request)
            .send()
            .await
            .map_err(|e| request_failed(e, &self.settings))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            error!("Gemini API error response: {}", body);
            return Err(GenerationError::Api { status, body });
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Parse(e.to_string()))?;

        let answer: String = gemini_response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        if answer.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(answer)
    }
}

// === Ollama ===

#[derive(Debug, Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: String,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: ChatMessage,
}

/// Client for a local Ollama server's `/api/chat`.
pub struct OllamaClient {
    http_client: reqwest::Client,
    settings: GenerationSettings,
}

impl OllamaClient {
    pub fn new(settings: GenerationSettings) -> Result<Self, GenerationError> {
        Ok(Self {
            http_client: http_client(settings.timeout_seconds)?,
            settings,
        })
    }
}

#[async_trait]
impl TextGenerator for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let url = format!("{}/api/chat", self.settings.base_url.trim_end_matches('/'));

        let request = OllamaChatRequest {
            model: self.settings.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            stream: false,
            options: OllamaOptions {
                temperature: self.settings.temperature,
            },
        };

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| request_failed(e, &self.settings))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api { status, body });
        }

        let chat_response: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Parse(e.to_string()))?;

        if chat_response.message.content.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(chat_response.message.content)
    }
}
