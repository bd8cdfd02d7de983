//! The classify module validates user supplied URLs and decides which
//! acquisition strategy handles them.

use log::debug;
use url::Url;

use crate::constants::VIDEO_HOST_MARKERS;
use crate::error::FlowError;

/// Kind of content behind a URL.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum UrlKind {
    /// A video page whose transcript gets summarized.
    Video,
    /// Any other web page.
    Generic,
}

/// Checks that the input is an absolute `http(s)` URL with a host.
///
/// # Errors
///
/// Returns [`FlowError::InvalidUrl`] if the input does not parse, uses another
/// scheme or has no host.
pub fn validate_url(input: &str) -> Result<Url, FlowError> {
    let url = Url::parse(input.trim()).map_err(|e| FlowError::InvalidUrl(format!("{input}: {e}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(FlowError::InvalidUrl(format!(
            "{input}: unsupported scheme {}",
            url.scheme()
        )));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(FlowError::InvalidUrl(format!("{input}: missing host"))),
    }
}

/// Classifies a URL by plain substring search for a video host marker.
///
/// The whole string is searched, so a generic URL that merely mentions
/// `youtube.com` in its path or query is classified as [`UrlKind::Video`].
pub fn classify(url: &str) -> UrlKind {
    let lowered = url.to_ascii_lowercase();
    let kind = if VIDEO_HOST_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
    {
        UrlKind::Video
    } else {
        UrlKind::Generic
    };

    debug!("Classified {url} as {kind:?}");
    kind
}
