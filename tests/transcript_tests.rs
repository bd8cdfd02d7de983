use crate::extras::{StubCaptions, StubTranscripts};
use siftly::{
    FlowError, TranscriptError,
    transcript::{Strategy, acquire_transcript, join_entries},
    youtube::CaptionEntry,
};
use spectral::prelude::*;
use std::cell::RefCell;

mod extras;

fn entry(text: &str, start: f64) -> CaptionEntry {
    CaptionEntry {
        text: text.to_owned(),
        start,
        duration: 1.0,
    }
}

#[test]
fn entries_are_joined_with_single_spaces_in_order() {
    let entries = vec![entry("a", 0.0), entry("b c", 1.0)];

    assert_that(&join_entries(&entries)).is_equal_to("a b c".to_owned());
}

#[test]
fn no_entries_join_to_empty_text() {
    assert_that(&join_entries(&[])).is_equal_to(String::new());
}

#[tokio::test]
async fn primary_transcript_wins() {
    let transcripts = StubTranscripts::returning("from primary");
    let captions = StubCaptions::returning(&["from fallback"]);
    let strategies = RefCell::new(Vec::new());

    let text = acquire_transcript(
        "https://www.youtube.com/watch?v=ABC123",
        &transcripts,
        &captions,
        &|strategy| strategies.borrow_mut().push(strategy),
    )
    .await
    .expect("Expected a transcript.");

    assert_that(&text).is_equal_to("from primary".to_owned());
    assert_that(&strategies.into_inner()).is_equal_to(vec![Strategy::Primary]);
    assert_that(&captions.calls()).is_equal_to(0);
}

#[tokio::test]
async fn empty_primary_transcript_falls_back() {
    let transcripts = StubTranscripts::returning("   ");
    let captions = StubCaptions::returning(&["from", "fallback"]);

    let text = acquire_transcript(
        "https://www.youtube.com/watch?v=ABC123",
        &transcripts,
        &captions,
        &|_| {},
    )
    .await
    .expect("Expected a transcript.");

    assert_that(&text).is_equal_to("from fallback".to_owned());
    assert_that(&captions.calls()).is_equal_to(1);
}

#[tokio::test]
async fn fallback_runs_exactly_once() {
    let transcripts = StubTranscripts::failing();
    let captions = StubCaptions::failing();
    let strategies = RefCell::new(Vec::new());

    let error = acquire_transcript(
        "https://m.youtube.com/watch?feature=share&v=ABC123",
        &transcripts,
        &captions,
        &|strategy| strategies.borrow_mut().push(strategy),
    )
    .await
    .expect_err("Expected a transcript failure.");

    assert_that(&transcripts.calls()).is_equal_to(1);
    assert_that(&captions.calls()).is_equal_to(1);
    assert_that(&captions.video_ids()).is_equal_to(vec!["ABC123".to_owned()]);
    assert_that(&strategies.into_inner())
        .is_equal_to(vec![Strategy::Primary, Strategy::Fallback]);

    match error {
        FlowError::TranscriptUnavailable { primary, fallback } => {
            assert_that(&matches!(primary, TranscriptError::NotFound(_))).is_true();
            assert_that(&matches!(fallback, TranscriptError::NotFound(_))).is_true();
        }
        other => panic!("Unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn empty_caption_list_is_not_a_transcript() {
    let transcripts = StubTranscripts::failing();
    let captions = StubCaptions::returning(&[]);

    let error = acquire_transcript(
        "https://www.youtube.com/watch?v=ABC123",
        &transcripts,
        &captions,
        &|_| {},
    )
    .await
    .expect_err("Expected a transcript failure.");

    assert_that(&matches!(error, FlowError::TranscriptUnavailable { .. })).is_true();
}
