use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{oneshot, Mutex};

use takhrij_client::types::{GroundingChunk, GroundingMetadata, WebSource};
use takhrij_client::{ClientError, GenerateReply, GenerateRequest, TextGenerator};
use takhrij_core::{HadithStatus, SearchPhase, SearchSession};

fn fenced_verdict(tag: &str) -> String {
    format!(
        "Hasil semakan:\n```json\n{{\n  \"matan\": \"نص {tag}\",\n  \"translation\": \"terjemahan {tag}\",\n  \"status\": \"Sahih\",\n  \"sources\": [\"Sahih Bukhari\"],\n  \"explanation\": \"huraian {tag}\"\n}}\n```"
    )
}

fn chunk(title: Option<&str>, uri: Option<&str>) -> GroundingChunk {
    GroundingChunk {
        web: Some(WebSource {
            uri: uri.map(str::to_string),
            title: title.map(str::to_string),
        }),
    }
}

/// Always returns the same scripted reply, whatever the query.
struct ScriptedBackend {
    reply: Result<GenerateReply, ClientError>,
}

impl ScriptedBackend {
    fn text(text: impl Into<String>, grounding: Option<GroundingMetadata>) -> Self {
        Self {
            reply: Ok(GenerateReply {
                text: text.into(),
                grounding,
            }),
        }
    }

    fn failing(error: ClientError) -> Self {
        Self { reply: Err(error) }
    }
}

#[async_trait]
impl TextGenerator for ScriptedBackend {
    async fn generate(&self, _request: GenerateRequest) -> Result<GenerateReply, ClientError> {
        self.reply.clone()
    }
}

/// Holds the first query at the gate until the test releases it, so a later
/// query can finish first.
struct GatedBackend {
    gate: Mutex<Option<oneshot::Receiver<()>>>,
}

#[async_trait]
impl TextGenerator for GatedBackend {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateReply, ClientError> {
        if request.user_text.contains("hadis pertama") {
            let gate = self.gate.lock().await.take();
            if let Some(rx) = gate {
                let _ = rx.await;
            }
            return Ok(GenerateReply {
                text: fenced_verdict("pertama"),
                grounding: None,
            });
        }
        Ok(GenerateReply {
            text: fenced_verdict("kedua"),
            grounding: None,
        })
    }
}

#[tokio::test]
async fn typed_prefix_surfaces_popular_entry_before_submit() {
    let session = SearchSession::new(ScriptedBackend::text(fenced_verdict("x"), None));

    let state = session.input_changed("Innamal a'm").await;
    assert_eq!(state.phase, SearchPhase::Suggesting);
    assert!(state.suggestions.contains(&"Innamal a'malu binniyat"));
}

#[tokio::test]
async fn whitespace_submit_never_reaches_the_backend() {
    let session = SearchSession::new(ScriptedBackend::failing(ClientError::Http(
        "backend must not be called".to_string(),
    )));

    let state = session.submit().await;
    assert_eq!(state.phase, SearchPhase::Idle);

    session.input_changed("   ").await;
    let state = session.submit().await;
    assert_eq!(state.phase, SearchPhase::Suggesting);
    assert!(state.error_message.is_none());
    assert!(session.recent_queries().await.is_empty());
}

#[tokio::test]
async fn unparseable_reply_publishes_error_with_message() {
    let session = SearchSession::new(ScriptedBackend::text(
        "Maaf, saya tidak pasti tentang hadis ini.",
        None,
    ));

    session.input_changed("Tidur selepas asar gila").await;
    let state = session.submit().await;

    assert_eq!(state.phase, SearchPhase::Error);
    assert!(state.result.is_none());
    let message = state.error_message.expect("error message published");
    assert!(!message.is_empty());
}

#[tokio::test]
async fn transport_failure_publishes_recoverable_error() {
    let session = SearchSession::new(ScriptedBackend::failing(ClientError::Http(
        "connection reset".to_string(),
    )));

    session.input_changed("Solat tiang agama").await;
    let state = session.submit().await;

    assert_eq!(state.phase, SearchPhase::Error);
    assert_eq!(
        state.error_message.as_deref(),
        Some("Berlaku ralat semasa pencarian. Sila cuba lagi.")
    );
}

#[tokio::test]
async fn fenced_reply_with_partial_grounding_yields_two_citations() {
    let grounding = GroundingMetadata {
        grounding_chunks: vec![
            chunk(Some("Dorar Saniyyah"), Some("https://dorar.net/h/1")),
            chunk(Some("Sunnah.com"), Some("https://sunnah.com/bukhari:1")),
            chunk(Some("Tanpa pautan"), None),
        ],
    };
    let session = SearchSession::new(ScriptedBackend::text(
        fenced_verdict("niat"),
        Some(grounding),
    ));

    session.input_changed("Innamal a'malu binniyat").await;
    let state = session.submit().await;

    assert_eq!(state.phase, SearchPhase::Success);
    let result = state.result.expect("verdict published");
    assert_eq!(result.status, HadithStatus::Sahih);
    assert_eq!(state.citations.len(), 2);
    assert_eq!(state.citations[0].title, "Dorar Saniyyah");
    assert_eq!(state.citations[1].title, "Sunnah.com");
    assert!(state.error_message.is_none());
}

#[tokio::test]
async fn superseding_query_wins_even_when_first_reply_arrives_late() {
    let (release_first, gate) = oneshot::channel();
    let session = Arc::new(SearchSession::new(GatedBackend {
        gate: Mutex::new(Some(gate)),
    }));

    session.input_changed("hadis pertama").await;
    let first = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.submit().await })
    };

    // Let the first dispatch reach the backend before superseding it.
    loop {
        if session.snapshot().await.phase == SearchPhase::Querying {
            break;
        }
        tokio::task::yield_now().await;
    }

    let state = session.select_suggestion("Solat tiang agama").await;
    assert_eq!(state.phase, SearchPhase::Success);

    release_first.send(()).expect("first query releases");
    first.await.expect("first submit joins");

    let published = session.snapshot().await;
    assert_eq!(published.phase, SearchPhase::Success);
    let result = published.result.expect("latest result only");
    assert_eq!(result.translation, "terjemahan kedua");
    // Both exchanges completed and were logged; only the latest was published.
    assert_eq!(session.recent_queries().await.len(), 2);
}
