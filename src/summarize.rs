//! The summarize module turns acquired content into a summary using an LLM model.

use llm::builder::{LLMBackend, LLMBuilder};
use llm::chat::{ChatMessage, ChatProvider};
use llm::error::LLMError;
use log::{debug, info};
use std::str::FromStr;
use std::time::Duration;
use url::Url;

use crate::constants::PROMPT_TEMPLATE;
use crate::error::FlowError;

/// Configures a chat model for a given API key.
pub trait ModelFactory: Send + Sync {
    /// Builds a model authorized by `api_key`. The key is not checked here;
    /// a bad key fails on the first request.
    ///
    /// # Errors
    ///
    /// Returns an error if the model client cannot be constructed.
    fn build(&self, api_key: &str) -> Result<Box<dyn ChatProvider>, LLMError>;
}

/// [`ModelFactory`] backed by the `llm` crate.
#[derive(Debug, Clone)]
pub struct LlmModelFactory {
    backend: String,
    model: String,
    timeout: Option<Duration>,
}

impl LlmModelFactory {
    /// Parses a model URL like `google://gemini-1.5-flash`: the scheme names
    /// the backend, the host (joined with the username, if any) the model.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL does not parse, the backend is unknown or
    /// the model name is missing.
    pub fn from_model_url(model: &str, timeout: Option<Duration>) -> anyhow::Result<Self> {
        let model_url =
            Url::parse(model).map_err(|e| anyhow::anyhow!("Invalid model URL: {}", e))?;
        LLMBackend::from_str(model_url.scheme())
            .map_err(|e| anyhow::anyhow!("Invalid LLM backend: {}", e))?;

        let host = model_url
            .host_str()
            .ok_or_else(|| anyhow::anyhow!("Specify model name as host URL."))?;
        let model = [host, model_url.username()]
            .iter()
            .filter(|x| !x.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join(":");

        Ok(Self {
            backend: model_url.scheme().to_owned(),
            model,
            timeout,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl ModelFactory for LlmModelFactory {
    fn build(&self, api_key: &str) -> Result<Box<dyn ChatProvider>, LLMError> {
        let mut builder = LLMBuilder::new()
            .backend(
                LLMBackend::from_str(&self.backend)
                    .map_err(|e| LLMError::InvalidRequest(e.to_string()))?,
            )
            .model(&self.model)
            .api_key(api_key);

        if let Some(timeout) = self.timeout {
            builder = builder.timeout_seconds(timeout.as_secs().max(1));
        }

        let model: Box<dyn ChatProvider> = builder.build()?;
        Ok(model)
    }
}

/// Substitutes `text` into the fixed summary instruction.
pub fn format_prompt(text: &str) -> String {
    PROMPT_TEMPLATE.replace("{text}", text)
}

/// Summarises content with an LLM model and returns the model's answer verbatim.
///
/// The content is sent whole, without truncation or chunking.
///
/// # Errors
///
/// Returns [`FlowError::GenerationFailed`] if the chat request fails or the
/// response carries no text.
pub async fn summarize_content(model: &dyn ChatProvider, text: &str) -> Result<String, FlowError> {
    let prompt = format_prompt(text);
    debug!("Prompt is {} characters long", prompt.len());

    let messages = vec![ChatMessage::user().content(prompt).build()];

    let response = model
        .chat(&messages)
        .await
        .map_err(|err| FlowError::GenerationFailed(format!("LLM error: {err}.")))?;

    let summary = response
        .text()
        .ok_or_else(|| FlowError::GenerationFailed("LLM returned no text.".to_owned()))?;

    info!("Summary generated ({} characters)", summary.len());
    Ok(summary)
}
