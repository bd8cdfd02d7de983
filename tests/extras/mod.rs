#![allow(dead_code)]

use async_trait::async_trait;
use llm::{
    chat::{ChatMessage, ChatProvider, ChatResponse, Tool},
    error::LLMError,
};
use siftly::{
    PageError, TranscriptError,
    page::PageLoader,
    parse::PageArticle,
    pipeline::{Activity, FlowState, Observer},
    summarize::ModelFactory,
    transcript::{CaptionProvider, TranscriptProvider},
    youtube::{CaptionEntry, VideoInfo, VideoTranscript},
};
use std::cell::RefCell;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug)]
struct StringResponse(String);

impl ChatResponse for StringResponse {
    fn text(&self) -> Option<String> {
        Some(self.0.clone())
    }

    fn tool_calls(&self) -> Option<Vec<llm::ToolCall>> {
        None
    }

    fn thinking(&self) -> Option<String> {
        None
    }

    fn usage(&self) -> Option<llm::chat::Usage> {
        None
    }
}

impl std::fmt::Display for StringResponse {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Chat model answering every request with the same text, or failing.
pub(crate) struct StubLlmProvider {
    response_content: Option<String>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl StubLlmProvider {
    pub fn new(response_content: &str) -> Self {
        StubLlmProvider {
            response_content: Some(response_content.to_owned()),
            prompts: Arc::default(),
        }
    }

    pub fn failing() -> Self {
        StubLlmProvider {
            response_content: None,
            prompts: Arc::default(),
        }
    }
}

#[async_trait]
impl ChatProvider for StubLlmProvider {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<Box<dyn ChatResponse>, LLMError> {
        let mut prompts = self.prompts.lock().expect("prompts mutex poisoned");
        prompts.extend(messages.iter().map(|message| message.content.clone()));

        match &self.response_content {
            Some(content) => Ok(Box::new(StringResponse(content.clone())) as Box<dyn ChatResponse>),
            None => Err(LLMError::ProviderError("quota exceeded".to_owned())),
        }
    }

    async fn chat_with_tools(
        &self,
        messages: &[ChatMessage],
        _tools: Option<&[Tool]>,
    ) -> Result<Box<dyn ChatResponse>, LLMError> {
        self.chat(messages).await
    }
}

/// Model factory handing out [`StubLlmProvider`]s sharing one prompt log.
pub(crate) struct StubModels {
    response_content: Option<String>,
    pub prompts: Arc<Mutex<Vec<String>>>,
    pub api_keys: Mutex<Vec<String>>,
}

impl StubModels {
    pub fn answering(response_content: &str) -> Self {
        StubModels {
            response_content: Some(response_content.to_owned()),
            prompts: Arc::default(),
            api_keys: Mutex::default(),
        }
    }

    pub fn failing() -> Self {
        StubModels {
            response_content: None,
            prompts: Arc::default(),
            api_keys: Mutex::default(),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompts mutex poisoned").clone()
    }
}

impl ModelFactory for StubModels {
    fn build(&self, api_key: &str) -> Result<Box<dyn ChatProvider>, LLMError> {
        self.api_keys
            .lock()
            .expect("api keys mutex poisoned")
            .push(api_key.to_owned());

        let mut provider = match &self.response_content {
            Some(content) => StubLlmProvider::new(content),
            None => StubLlmProvider::failing(),
        };
        provider.prompts = Arc::clone(&self.prompts);
        Ok(Box::new(provider))
    }
}

/// Primary transcript provider returning a fixed text or a `NotFound`.
pub(crate) struct StubTranscripts {
    text: Option<String>,
    pub calls: AtomicUsize,
}

impl StubTranscripts {
    pub fn returning(text: &str) -> Self {
        StubTranscripts {
            text: Some(text.to_owned()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        StubTranscripts {
            text: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranscriptProvider for StubTranscripts {
    async fn fetch(&self, url: &str) -> Result<VideoTranscript, TranscriptError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.text {
            Some(text) => Ok(VideoTranscript {
                text: text.clone(),
                info: VideoInfo {
                    video_id: url.to_owned(),
                    ..VideoInfo::default()
                },
            }),
            None => Err(TranscriptError::NotFound("no captions".to_owned())),
        }
    }
}

/// Fallback caption provider returning fixed entries or a `NotFound`.
pub(crate) struct StubCaptions {
    entries: Option<Vec<CaptionEntry>>,
    pub calls: AtomicUsize,
    pub video_ids: Mutex<Vec<String>>,
}

impl StubCaptions {
    pub fn returning(texts: &[&str]) -> Self {
        let entries = texts
            .iter()
            .enumerate()
            .map(|(index, text)| CaptionEntry {
                text: (*text).to_owned(),
                start: index as f64,
                duration: 1.0,
            })
            .collect();

        StubCaptions {
            entries: Some(entries),
            calls: AtomicUsize::new(0),
            video_ids: Mutex::default(),
        }
    }

    pub fn failing() -> Self {
        StubCaptions {
            entries: None,
            calls: AtomicUsize::new(0),
            video_ids: Mutex::default(),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn video_ids(&self) -> Vec<String> {
        self.video_ids.lock().expect("video ids mutex poisoned").clone()
    }
}

#[async_trait]
impl CaptionProvider for StubCaptions {
    async fn fetch(&self, video_id: &str) -> Result<Vec<CaptionEntry>, TranscriptError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.video_ids
            .lock()
            .expect("video ids mutex poisoned")
            .push(video_id.to_owned());

        self.entries
            .clone()
            .ok_or_else(|| TranscriptError::NotFound("no captions".to_owned()))
    }
}

/// Page loader returning a fixed text or an HTTP error.
pub(crate) struct StubPages {
    text: Option<String>,
    pub urls: Mutex<Vec<String>>,
}

impl StubPages {
    pub fn returning(text: &str) -> Self {
        StubPages {
            text: Some(text.to_owned()),
            urls: Mutex::default(),
        }
    }

    pub fn failing() -> Self {
        StubPages {
            text: None,
            urls: Mutex::default(),
        }
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().expect("urls mutex poisoned").clone()
    }
}

#[async_trait]
impl PageLoader for StubPages {
    async fn fetch(&self, url: &str) -> Result<PageArticle, PageError> {
        self.urls
            .lock()
            .expect("urls mutex poisoned")
            .push(url.to_owned());

        match &self.text {
            Some(text) => Ok(PageArticle {
                title: Some("Stub page".to_owned()),
                text: text.clone(),
            }),
            None => Err(PageError::Status {
                status: 404,
                url: url.to_owned(),
            }),
        }
    }
}

/// Observer remembering everything it is told.
#[derive(Default)]
pub(crate) struct RecordingObserver {
    pub states: RefCell<Vec<FlowState>>,
    pub activities: RefCell<Vec<Activity>>,
}

impl RecordingObserver {
    pub fn states(&self) -> Vec<FlowState> {
        self.states.borrow().clone()
    }

    pub fn activities(&self) -> Vec<Activity> {
        self.activities.borrow().clone()
    }
}

impl Observer for RecordingObserver {
    fn on_state(&self, state: FlowState) {
        self.states.borrow_mut().push(state);
    }

    fn on_activity(&self, activity: Activity) {
        self.activities.borrow_mut().push(activity);
    }
}
