//! Error types for every step of the summarization flow.

use thiserror::Error;

/// Failure of a single transcript strategy.
#[derive(Error, Debug)]
pub enum TranscriptError {
    #[error("Network request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP error {status} for URL: {url}")]
    Status { status: u16, url: String },

    #[error("Transcript not found: {0}")]
    NotFound(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Cannot extract video ID from: {0}")]
    MissingVideoId(String),
}

impl TranscriptError {
    /// Whether the failure came from the network rather than from the video itself.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Status { .. })
    }
}

/// Failure while loading a generic web page.
#[derive(Error, Debug)]
pub enum PageError {
    #[error("Network request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP error {status} for URL: {url}")]
    Status { status: u16, url: String },

    #[error("Unsupported content type {content_type} for URL: {url}")]
    UnsupportedContent { content_type: String, url: String },

    #[error("Failed to extract text: {0}")]
    Extraction(String),

    #[error("No text content found at {0}")]
    Empty(String),
}

/// Every way a summarization request can end without a summary.
#[derive(Error, Debug)]
pub enum FlowError {
    #[error("API key is missing")]
    MissingCredential,

    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),

    #[error("Unable to retrieve transcript (primary: {primary}; fallback: {fallback})")]
    TranscriptUnavailable {
        primary: TranscriptError,
        fallback: TranscriptError,
    },

    #[error(transparent)]
    ContentFetchFailed(#[from] PageError),

    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl FlowError {
    /// The message shown to the user in place of a summary.
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingCredential => "Please provide a valid Google Gemini API key.".to_owned(),
            Self::InvalidUrl(_) => "Please provide a valid YouTube or website URL.".to_owned(),
            Self::TranscriptUnavailable { .. } => {
                "Unable to retrieve transcript. The video may not have subtitles.".to_owned()
            }
            other => format!("Error: {other}"),
        }
    }
}
