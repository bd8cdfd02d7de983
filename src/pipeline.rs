//! The pipeline module runs one summarization request from user input to
//! summary: credential check, URL validation, content acquisition and
//! summarization, strictly in that order.

use log::info;
use std::fmt;

use crate::classify::{UrlKind, classify, validate_url};
use crate::error::FlowError;
use crate::page::PageLoader;
use crate::summarize::{ModelFactory, summarize_content};
use crate::transcript::{CaptionProvider, Strategy, TranscriptProvider, acquire_transcript};

/// The two values typed by the user, passed by value into each run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub api_key: String,
    pub url: String,
}

impl Session {
    pub fn new(api_key: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            url: url.into(),
        }
    }
}

/// States a request passes through. Failures return to `Idle`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FlowState {
    Idle,
    Validating,
    Acquiring,
    Summarizing,
    Displaying,
}

/// A blocking call the user waits on.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Activity {
    FetchingTranscript,
    AlternativeTranscript,
    FetchingWebsite,
    GeneratingSummary,
}

impl fmt::Display for Activity {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Self::FetchingTranscript => "Fetching transcript...",
            Self::AlternativeTranscript => "Using alternative method...",
            Self::FetchingWebsite => "Fetching website content...",
            Self::GeneratingSummary => "Generating summary...",
        };
        formatter.write_str(message)
    }
}

/// Receives progress of a running request.
pub trait Observer {
    fn on_state(&self, _state: FlowState) {}

    fn on_activity(&self, _activity: Activity) {}
}

/// Collaborators used by a summarization request.
pub struct Pipeline<'a> {
    /// Primary video transcript source
    pub transcripts: &'a dyn TranscriptProvider,
    /// Fallback raw caption source
    pub captions: &'a dyn CaptionProvider,
    /// Generic page loader
    pub pages: &'a dyn PageLoader,
    /// Builds the chat model from the session's API key
    pub models: &'a dyn ModelFactory,
    pub observer: &'a dyn Observer,
}

impl Pipeline<'_> {
    /// Runs one request and returns the summary to display.
    ///
    /// The credential is checked before the URL, so a blank key is reported
    /// even when the URL is invalid too. Nothing touches the network before
    /// both checks pass.
    ///
    /// # Errors
    ///
    /// Returns the [`FlowError`] of the first failing step. The observer sees
    /// [`FlowState::Idle`] last in that case.
    pub async fn run(&self, session: &Session) -> Result<String, FlowError> {
        let result = self.run_steps(session).await;

        match &result {
            Ok(_) => self.observer.on_state(FlowState::Displaying),
            Err(_) => self.observer.on_state(FlowState::Idle),
        }

        result
    }

    async fn run_steps(&self, session: &Session) -> Result<String, FlowError> {
        self.observer.on_state(FlowState::Validating);

        let api_key = session.api_key.trim();
        if api_key.is_empty() {
            return Err(FlowError::MissingCredential);
        }
        let url = session.url.trim();
        validate_url(url)?;

        let model = self
            .models
            .build(api_key)
            .map_err(|e| FlowError::Unexpected(anyhow::anyhow!("Failed to build LLM model: {e}")))?;

        self.observer.on_state(FlowState::Acquiring);
        let content = self.acquire(url).await?;
        info!("Acquired {} characters of content", content.len());

        self.observer.on_state(FlowState::Summarizing);
        self.observer.on_activity(Activity::GeneratingSummary);
        summarize_content(model.as_ref(), &content).await
    }

    async fn acquire(&self, url: &str) -> Result<String, FlowError> {
        match classify(url) {
            UrlKind::Video => {
                let on_strategy = |strategy: Strategy| {
                    self.observer.on_activity(match strategy {
                        Strategy::Primary => Activity::FetchingTranscript,
                        Strategy::Fallback => Activity::AlternativeTranscript,
                    });
                };
                acquire_transcript(url, self.transcripts, self.captions, &on_strategy).await
            }
            UrlKind::Generic => {
                self.observer.on_activity(Activity::FetchingWebsite);
                let article = self.pages.fetch(url).await?;
                if let Some(title) = &article.title {
                    info!("Fetched \"{title}\"");
                }
                Ok(article.text)
            }
        }
    }
}
