//! The page module loads generic web pages and extracts their main text.

use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;

use crate::TextBy;
use crate::constants::PAGE_USER_AGENT;
use crate::error::PageError;
use crate::http::build_client;
use crate::parse::{PageArticle, extract_article};

/// Loads the main textual content of a single web page.
#[async_trait]
pub trait PageLoader: Send + Sync {
    /// Fetches `url` and extracts its text.
    ///
    /// # Errors
    ///
    /// Returns a [`PageError`] if the page cannot be loaded or yields no text.
    async fn fetch(&self, url: &str) -> Result<PageArticle, PageError>;
}

/// [`PageLoader`] backed by a plain HTTP GET.
pub struct HttpPageLoader {
    client: Client,
    text_by: TextBy,
}

impl HttpPageLoader {
    /// Creates a loader sending the fixed page user agent.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(text_by: TextBy, timeout: Option<Duration>) -> Result<Self, PageError> {
        Ok(Self {
            client: build_client(PAGE_USER_AGENT, timeout)?,
            text_by,
        })
    }
}

#[async_trait]
impl PageLoader for HttpPageLoader {
    async fn fetch(&self, url: &str) -> Result<PageArticle, PageError> {
        info!("Fetching website content from {url}");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PageError::Status {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("text/html")
            .to_ascii_lowercase();
        let body = response.text().await?;
        debug!("Loaded {} bytes of {content_type} from {url}", body.len());

        let article = article_from_body(url, &body, &content_type, &self.text_by)?;

        if article.text.trim().is_empty() {
            return Err(PageError::Empty(url.to_owned()));
        }

        Ok(article)
    }
}

/// Turns a response body into an article according to its media type.
///
/// # Errors
///
/// Returns [`PageError::UnsupportedContent`] for non-text media types and
/// extraction errors for HTML that yields no article.
pub fn article_from_body(
    url: &str,
    body: &str,
    content_type: &str,
    text_by: &TextBy,
) -> Result<PageArticle, PageError> {
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim();

    match media_type {
        "text/html" | "application/xhtml+xml" => extract_article(body, text_by),
        "text/plain" | "text/markdown" => Ok(PageArticle {
            title: None,
            text: body.trim().to_owned(),
        }),
        other => Err(PageError::UnsupportedContent {
            content_type: other.to_owned(),
            url: url.to_owned(),
        }),
    }
}
