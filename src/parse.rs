use crate::{TextBy, error::PageError};

use dom_smoothie::{Article, CandidateSelectMode, Config, Readability, TextMode};
use html2md;
use scraper::{Html, Selector as ScraperSelector};

/// Represents an article extracted from a webpage.
///
/// This struct contains the title and text content of the article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageArticle {
    /// The title of the article, if available.
    pub title: Option<String>,
    /// The text content of the article.
    pub text: String,
}

/// Extracts the main article from the given HTML content.
///
/// # Arguments
///
/// * `html` - A string slice that holds the HTML content of the webpage.
/// * `text_by` - The method to use for text extraction (dom_smoothie or fast_html2md).
///
/// # Returns
///
/// A `Result` containing a `PageArticle` if the extraction is successful, or an error if it fails.
///
/// # Errors
///
/// This function will return an error if:
///
/// - The chosen extraction method fails to extract an article from the HTML content.
/// - The extracted text is blank.
pub fn extract_article(html: &str, text_by: &TextBy) -> Result<PageArticle, PageError> {
    let title = parse_title(html);

    let text = match text_by {
        TextBy::DomSmoothie => {
            let config = Config {
                text_mode: TextMode::Markdown,
                candidate_select_mode: CandidateSelectMode::DomSmoothie,
                ..Default::default()
            };

            let mut readability = Readability::new(html, None, Some(config))
                .map_err(|e| PageError::Extraction(e.to_string()))?;
            let article: Article = readability
                .parse()
                .map_err(|e| PageError::Extraction(e.to_string()))?;

            article.text_content.to_string()
        }
        TextBy::FastHtml2Md => html2md::parse_html(html, false),
    };

    let text = text.trim().to_owned();
    if text.is_empty() {
        return Err(PageError::Extraction("extracted text is empty".to_owned()));
    }

    Ok(PageArticle { title, text })
}

/// Parses the title from HTML content
fn parse_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    for tag in ["title", "h1", "h2"] {
        if let Ok(tag_selector) = ScraperSelector::parse(tag)
            && let Some(tag_element) = document.select(&tag_selector).next()
        {
            let tag_text = tag_element
                .text()
                .collect::<Vec<_>>()
                .join(" ")
                .trim()
                .to_string();
            if !tag_text.is_empty() {
                return Some(tag_text);
            }
        }
    }

    None
}
