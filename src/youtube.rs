//! YouTube transcript retrieval.
//!
//! Two independent routes lead to the same caption tracks:
//! the watch page with its embedded player response, which also carries the
//! video metadata, and the innertube player API queried with a bare video id.
//! Both download the chosen track in the `json3` timed-text format.

use async_trait::async_trait;
use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::COOKIE;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use url::Url;

use crate::constants::{
    INNERTUBE_CLIENT_NAME, INNERTUBE_CLIENT_VERSION, INNERTUBE_PLAYER_URL, INNERTUBE_USER_AGENT,
    YOUTUBE_CONSENT_COOKIE, YOUTUBE_USER_AGENT,
};
use crate::error::TranscriptError;
use crate::http::build_client;
use crate::transcript::{CaptionProvider, TranscriptProvider, join_entries};

static PLAYER_RESPONSE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"ytInitialPlayerResponse\s*=\s*\{")
        .expect("Failed to compile PLAYER_RESPONSE regex")
});

/// One timed caption entry. `start` and `duration` are in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionEntry {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

/// Metadata fetched together with a transcript.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VideoInfo {
    pub video_id: String,
    pub title: Option<String>,
    pub author: Option<String>,
    pub length_seconds: Option<u64>,
}

/// Transcript text plus the metadata of its video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoTranscript {
    pub text: String,
    pub info: VideoInfo,
}

/// A caption track advertised by the player response.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTrack {
    pub base_url: String,
    pub language_code: String,
    /// `asr` for automatically generated tracks.
    #[serde(default)]
    pub kind: Option<String>,
}

impl CaptionTrack {
    fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }

    /// URL of this track in the `json3` timed-text format.
    ///
    /// # Errors
    ///
    /// Returns [`TranscriptError::InvalidResponse`] if the base URL does not parse.
    pub fn json3_url(&self) -> Result<Url, TranscriptError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| TranscriptError::InvalidResponse(format!("caption track URL: {e}")))?;

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| key != "fmt")
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        url.query_pairs_mut()
            .clear()
            .extend_pairs(pairs)
            .append_pair("fmt", "json3");

        Ok(url)
    }
}

/// Extracts a video id from the common YouTube URL shapes: `watch?v=<id>`,
/// `youtu.be/<id>`, `/shorts/<id>`, `/embed/<id>` and `/live/<id>`.
pub fn parse_video_id(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_ascii_lowercase();

    if host == "youtu.be" {
        return url
            .path_segments()?
            .next()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(ToOwned::to_owned);
    }

    if !(host == "youtube.com" || host.ends_with(".youtube.com")) {
        return None;
    }

    if let Some(id) = query_param(url, "v") {
        return Some(id);
    }

    let mut segments = url.path_segments()?;
    match (segments.next(), segments.next()) {
        (Some("shorts" | "embed" | "live" | "v"), Some(id)) if !id.trim().is_empty() => {
            Some(id.trim().to_owned())
        }
        _ => None,
    }
}

/// Reads the video id from the `v` query parameter, as used by the fallback route.
///
/// # Errors
///
/// Returns [`TranscriptError::MissingVideoId`] if the URL does not parse or has
/// no non-empty `v` parameter, e.g. for shortened `youtu.be` links.
pub fn query_video_id(url: &str) -> Result<String, TranscriptError> {
    Url::parse(url)
        .ok()
        .and_then(|parsed| query_param(&parsed, "v"))
        .ok_or_else(|| TranscriptError::MissingVideoId(url.to_owned()))
}

fn query_param(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

/// Extracts the `ytInitialPlayerResponse` object embedded in a watch page.
///
/// # Errors
///
/// Returns [`TranscriptError::InvalidResponse`] if the page carries no
/// parseable player response.
pub fn extract_player_response(html: &str) -> Result<Value, TranscriptError> {
    let missing = || TranscriptError::InvalidResponse("player response not found in page".into());

    let marker = PLAYER_RESPONSE_REGEX.find(html).ok_or_else(missing)?;
    // the match ends right after the opening brace
    let object = html.get(marker.end() - 1..).ok_or_else(missing)?;
    let end = balanced_object_end(object).ok_or_else(missing)?;
    let json = object.get(..end).ok_or_else(missing)?;

    serde_json::from_str(json)
        .map_err(|e| TranscriptError::InvalidResponse(format!("player response: {e}")))
}

/// Byte length of the JSON object starting at the beginning of `text`.
fn balanced_object_end(text: &str) -> Option<usize> {
    let mut depth = 0_usize;
    let mut in_string = false;
    let mut escaped = false;

    for (index, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(index + c.len_utf8());
                }
            }
            _ => {}
        }
    }

    None
}

/// Lists caption tracks of a playable video.
///
/// # Errors
///
/// Returns [`TranscriptError::NotFound`] if the video is not playable or has
/// no captions.
pub fn caption_tracks(player: &Value) -> Result<Vec<CaptionTrack>, TranscriptError> {
    let status = player["playabilityStatus"]["status"].as_str().unwrap_or("OK");
    if status != "OK" {
        let reason = player["playabilityStatus"]["reason"]
            .as_str()
            .unwrap_or("no reason given");
        return Err(TranscriptError::NotFound(format!(
            "video is not playable ({status}): {reason}"
        )));
    }

    let tracks = &player["captions"]["playerCaptionsTracklistRenderer"]["captionTracks"];
    let tracks: Vec<CaptionTrack> = match tracks {
        Value::Null => Vec::new(),
        other => serde_json::from_value(other.clone())
            .map_err(|e| TranscriptError::InvalidResponse(format!("caption tracks: {e}")))?,
    };

    if tracks.is_empty() {
        return Err(TranscriptError::NotFound(
            "video has no captions".to_owned(),
        ));
    }

    Ok(tracks)
}

/// Picks a track: manual captions in `language`, then generated ones in
/// `language`, then any manual track, then the first track.
pub fn select_track<'a>(tracks: &'a [CaptionTrack], language: &str) -> Option<&'a CaptionTrack> {
    let in_language = |track: &&CaptionTrack| {
        track.language_code == language
            || track
                .language_code
                .split('-')
                .next()
                .is_some_and(|primary| primary == language)
    };

    tracks
        .iter()
        .filter(in_language)
        .find(|track| !track.is_generated())
        .or_else(|| tracks.iter().find(in_language))
        .or_else(|| tracks.iter().find(|track| !track.is_generated()))
        .or_else(|| tracks.first())
}

/// Reads the metadata of a player response.
pub fn video_info(player: &Value, video_id: &str) -> VideoInfo {
    let details = &player["videoDetails"];
    VideoInfo {
        video_id: video_id.to_owned(),
        title: details["title"].as_str().map(ToOwned::to_owned),
        author: details["author"].as_str().map(ToOwned::to_owned),
        length_seconds: details["lengthSeconds"]
            .as_str()
            .and_then(|length| length.parse().ok()),
    }
}

#[derive(Deserialize)]
struct Json3Transcript {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Json3Event {
    #[serde(default)]
    t_start_ms: u64,
    #[serde(default)]
    d_duration_ms: u64,
    #[serde(default)]
    segs: Vec<Json3Segment>,
}

#[derive(Deserialize)]
struct Json3Segment {
    #[serde(default)]
    utf8: String,
}

/// Parses a `json3` timed-text document into caption entries, in document
/// order. Events without text are dropped.
///
/// # Errors
///
/// Returns [`TranscriptError::InvalidResponse`] if the body is not a `json3` document.
pub fn parse_json3(body: &str) -> Result<Vec<CaptionEntry>, TranscriptError> {
    let transcript: Json3Transcript = serde_json::from_str(body)
        .map_err(|e| TranscriptError::InvalidResponse(format!("timed text: {e}")))?;

    Ok(transcript
        .events
        .into_iter()
        .filter_map(|event| {
            let text = event
                .segs
                .iter()
                .map(|segment| segment.utf8.as_str())
                .collect::<String>()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ");

            (!text.is_empty()).then(|| CaptionEntry {
                text,
                start: event.t_start_ms as f64 / 1000.0,
                duration: event.d_duration_ms as f64 / 1000.0,
            })
        })
        .collect())
}

fn check_status(response: Response) -> Result<Response, TranscriptError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(TranscriptError::Status {
            status: status.as_u16(),
            url: response.url().to_string(),
        })
    }
}

async fn download_entries(
    client: &Client,
    track: &CaptionTrack,
) -> Result<Vec<CaptionEntry>, TranscriptError> {
    debug!(
        "Downloading {} caption track{}",
        track.language_code,
        if track.is_generated() { " (generated)" } else { "" }
    );

    let response = client.get(track.json3_url()?).send().await?;
    let body = check_status(response)?.text().await?;
    let entries = parse_json3(&body)?;

    if entries.is_empty() {
        return Err(TranscriptError::NotFound(
            "caption track is empty".to_owned(),
        ));
    }

    Ok(entries)
}

/// Transcript and metadata read through the public watch page.
pub struct WatchPageTranscripts {
    client: Client,
    language: String,
}

impl WatchPageTranscripts {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(language: &str, timeout: Option<Duration>) -> Result<Self, TranscriptError> {
        Ok(Self {
            client: build_client(YOUTUBE_USER_AGENT, timeout)?,
            language: language.to_owned(),
        })
    }
}

#[async_trait]
impl TranscriptProvider for WatchPageTranscripts {
    async fn fetch(&self, url: &str) -> Result<VideoTranscript, TranscriptError> {
        let video_id = Url::parse(url)
            .ok()
            .as_ref()
            .and_then(parse_video_id)
            .ok_or_else(|| TranscriptError::MissingVideoId(url.to_owned()))?;

        let watch_url = format!("https://www.youtube.com/watch?v={video_id}&hl={}", self.language);
        let response = self
            .client
            .get(&watch_url)
            .header(COOKIE, YOUTUBE_CONSENT_COOKIE)
            .send()
            .await?;
        let html = check_status(response)?.text().await?;

        let player = extract_player_response(&html)?;
        let tracks = caption_tracks(&player)?;
        let track = select_track(&tracks, &self.language)
            .ok_or_else(|| TranscriptError::NotFound("video has no captions".to_owned()))?;
        let entries = download_entries(&self.client, track).await?;

        let info = video_info(&player, &video_id);
        info!(
            "Fetched transcript of \"{}\" by {}",
            info.title.as_deref().unwrap_or("untitled"),
            info.author.as_deref().unwrap_or("unknown author")
        );

        Ok(VideoTranscript {
            text: join_entries(&entries),
            info,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InnertubeRequest<'a> {
    video_id: &'a str,
    context: InnertubeContext<'a>,
    content_check_ok: bool,
    racy_check_ok: bool,
}

#[derive(Serialize)]
struct InnertubeContext<'a> {
    client: InnertubeClient<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InnertubeClient<'a> {
    client_name: &'a str,
    client_version: &'a str,
    hl: &'a str,
}

/// Raw caption entries read through the innertube player API.
pub struct InnertubeCaptions {
    client: Client,
    language: String,
}

impl InnertubeCaptions {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(language: &str, timeout: Option<Duration>) -> Result<Self, TranscriptError> {
        Ok(Self {
            client: build_client(INNERTUBE_USER_AGENT, timeout)?,
            language: language.to_owned(),
        })
    }
}

#[async_trait]
impl CaptionProvider for InnertubeCaptions {
    async fn fetch(&self, video_id: &str) -> Result<Vec<CaptionEntry>, TranscriptError> {
        let request = InnertubeRequest {
            video_id,
            context: InnertubeContext {
                client: InnertubeClient {
                    client_name: INNERTUBE_CLIENT_NAME,
                    client_version: INNERTUBE_CLIENT_VERSION,
                    hl: &self.language,
                },
            },
            content_check_ok: true,
            racy_check_ok: true,
        };

        let response = self
            .client
            .post(INNERTUBE_PLAYER_URL)
            .json(&request)
            .send()
            .await?;
        let player: Value = check_status(response)?.json().await?;

        let tracks = caption_tracks(&player)?;
        let track = select_track(&tracks, &self.language)
            .ok_or_else(|| TranscriptError::NotFound("video has no captions".to_owned()))?;

        download_entries(&self.client, track).await
    }
}
