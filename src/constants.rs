pub const MODEL_API_KEY_ENV_NAME: &str = "SIFTLY_API_KEY";

pub const DEFAULT_MODEL: &str = "google://gemini-1.5-flash";

pub const DEFAULT_CAPTION_LANGUAGE: &str = "en";

/// Substrings marking a URL as a video page.
pub const VIDEO_HOST_MARKERS: [&str; 2] = ["youtube.com", "youtu.be"];

/// User agent sent when loading generic pages.
pub const PAGE_USER_AGENT: &str = "Mozilla/5.0";

pub(crate) const YOUTUBE_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub(crate) const YOUTUBE_CONSENT_COOKIE: &str = "CONSENT=YES+cb; SOCS=CAI";

pub(crate) const INNERTUBE_PLAYER_URL: &str =
    "https://www.youtube.com/youtubei/v1/player?prettyPrint=false";
pub(crate) const INNERTUBE_CLIENT_NAME: &str = "ANDROID";
pub(crate) const INNERTUBE_CLIENT_VERSION: &str = "20.10.38";
pub(crate) const INNERTUBE_USER_AGENT: &str =
    "com.google.android.youtube/20.10.38 (Linux; U; Android 11) gzip";

pub const PROMPT_TEMPLATE: &str = r#"
Summarize the given content in 300 words:
Content: {text}
"#;
