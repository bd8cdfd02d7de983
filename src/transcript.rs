//! The transcript module acquires the transcript of a video URL, trying the
//! transcript provider first and the raw caption provider once after it.

use async_trait::async_trait;
use log::{info, warn};

use crate::error::{FlowError, TranscriptError};
use crate::youtube::{CaptionEntry, VideoTranscript, query_video_id};

/// Fetches a transcript together with video metadata, given the video URL.
#[async_trait]
pub trait TranscriptProvider: Send + Sync {
    /// # Errors
    ///
    /// Returns [`TranscriptError::NotFound`] when the video has no usable
    /// captions and a transport error when the provider cannot be reached.
    async fn fetch(&self, url: &str) -> Result<VideoTranscript, TranscriptError>;
}

/// Fetches the raw, chronologically ordered caption entries of a video id.
#[async_trait]
pub trait CaptionProvider: Send + Sync {
    /// # Errors
    ///
    /// Same failure kinds as [`TranscriptProvider::fetch`].
    async fn fetch(&self, video_id: &str) -> Result<Vec<CaptionEntry>, TranscriptError>;
}

/// Which strategy is about to run.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Strategy {
    Primary,
    Fallback,
}

/// Joins caption texts with single spaces, keeping their order.
pub fn join_entries(entries: &[CaptionEntry]) -> String {
    entries
        .iter()
        .map(|entry| entry.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Retrieves the transcript text of a video URL.
///
/// The primary provider runs first. Whatever its failure, the fallback runs
/// exactly once with the `v` query parameter of the URL as the video id.
/// `on_strategy` is called right before each strategy starts.
///
/// # Errors
///
/// Returns [`FlowError::TranscriptUnavailable`] carrying both failures when
/// neither strategy produced any text.
pub async fn acquire_transcript(
    url: &str,
    transcripts: &dyn TranscriptProvider,
    captions: &dyn CaptionProvider,
    on_strategy: &dyn Fn(Strategy),
) -> Result<String, FlowError> {
    on_strategy(Strategy::Primary);
    let primary = match transcripts.fetch(url).await {
        Ok(transcript) if !transcript.text.trim().is_empty() => {
            info!("Transcript of {} fetched", transcript.info.video_id);
            return Ok(transcript.text);
        }
        Ok(transcript) => TranscriptError::NotFound(format!(
            "transcript of {} is empty",
            transcript.info.video_id
        )),
        Err(error) => error,
    };

    if primary.is_transport() {
        warn!("Transcript request failed, trying alternative method: {primary}");
    } else {
        warn!("Transcript unavailable, trying alternative method: {primary}");
    }

    on_strategy(Strategy::Fallback);
    let fallback = match fetch_caption_text(url, captions).await {
        Ok(text) => {
            info!("Transcript fetched with alternative method");
            return Ok(text);
        }
        Err(error) => error,
    };

    warn!("Alternative transcript method failed: {fallback}");
    Err(FlowError::TranscriptUnavailable { primary, fallback })
}

async fn fetch_caption_text(
    url: &str,
    captions: &dyn CaptionProvider,
) -> Result<String, TranscriptError> {
    let video_id = query_video_id(url)?;
    let text = join_entries(&captions.fetch(&video_id).await?);

    if text.trim().is_empty() {
        return Err(TranscriptError::NotFound(format!(
            "captions of {video_id} are empty"
        )));
    }

    Ok(text)
}
