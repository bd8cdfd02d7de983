//! The siftly library fetches the transcript of a YouTube video or the main
//! text of a web page and summarizes it with an LLM model.

pub mod classify;
pub mod constants;
pub mod error;
pub mod http;
pub mod page;
pub mod parse;
pub mod pipeline;
pub mod summarize;
pub mod transcript;
pub mod youtube;

/// Enum representing the text extraction method.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub enum TextBy {
    /// Use dom_smoothie for text extraction
    #[default]
    DomSmoothie,
    /// Use fast_html2md for text extraction
    FastHtml2Md,
}

impl std::str::FromStr for TextBy {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.to_lowercase().as_str() {
            "dom_smoothie" => Ok(TextBy::DomSmoothie),
            "fast_html2md" => Ok(TextBy::FastHtml2Md),
            _ => Err(format!("Invalid text extraction method: {}", input)),
        }
    }
}

pub use classify::{UrlKind, classify, validate_url};
pub use error::{FlowError, PageError, TranscriptError};
pub use pipeline::{Pipeline, Session};
pub use summarize::{LlmModelFactory, summarize_content};
