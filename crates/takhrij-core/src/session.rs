//! Search session lifecycle: one long-lived state machine per client.
//!
//! The reducer in [`SearchState::apply`] is the only mutation path; the
//! session serializes every transition behind one lock and keeps the backend
//! await outside it. Superseding is the only cancellation mechanism: a new
//! query takes a fresh ticket and any completion carrying an older ticket is
//! discarded instead of published.

use std::time::Instant;

use serde::Serialize;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use takhrij_client::TextGenerator;

use crate::orchestrator::{Orchestrator, SearchOutcome};
use crate::suggest::filter_suggestions;
use crate::verdict::{Citation, HadithResult};

const QUERY_LOG_CAP: usize = 50;

/// UI-visible lifecycle phase. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchPhase {
    #[default]
    Idle,
    Suggesting,
    Querying,
    Success,
    Error,
}

/// Inbound user intents plus pipeline completions.
#[derive(Debug, Clone)]
pub enum SearchEvent {
    InputChanged(String),
    Submit,
    SuggestionSelected(String),
    PipelineCompleted {
        ticket: u64,
        outcome: Result<SearchOutcome, String>,
    },
}

/// Work order produced by a transition into `Querying`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDispatch {
    pub ticket: u64,
    pub query: String,
}

#[derive(Debug, Clone, Default)]
pub struct SearchState {
    pub query: String,
    pub phase: SearchPhase,
    pub suggestions: Vec<&'static str>,
    pub result: Option<HadithResult>,
    pub citations: Vec<Citation>,
    pub error_message: Option<String>,
    in_flight: Option<u64>,
    next_ticket: u64,
}

impl SearchState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one event and returns the query to dispatch, if the transition
    /// started one.
    pub fn apply(&mut self, event: SearchEvent) -> Option<QueryDispatch> {
        match event {
            SearchEvent::InputChanged(text) => {
                if self.phase == SearchPhase::Querying {
                    // Input is locked while a query is outstanding.
                    return None;
                }
                self.query = text;
                if self.query.chars().count() > 1 {
                    self.suggestions = filter_suggestions(&self.query);
                    self.phase = SearchPhase::Suggesting;
                    // A published outcome only survives in its own phase.
                    self.result = None;
                    self.citations = Vec::new();
                    self.error_message = None;
                } else {
                    self.suggestions.clear();
                }
                None
            }
            SearchEvent::Submit => {
                let query = self.query.trim().to_string();
                if query.is_empty() {
                    // Whitespace-only submits never leave the current state.
                    return None;
                }
                Some(self.begin_query(query))
            }
            SearchEvent::SuggestionSelected(text) => {
                let query = text.trim().to_string();
                if query.is_empty() {
                    return None;
                }
                self.query = text;
                Some(self.begin_query(query))
            }
            SearchEvent::PipelineCompleted { ticket, outcome } => {
                if self.in_flight != Some(ticket) {
                    debug!(ticket, "discarding stale pipeline completion");
                    return None;
                }
                self.in_flight = None;
                match outcome {
                    Ok(outcome) => {
                        self.phase = SearchPhase::Success;
                        self.result = Some(outcome.result);
                        self.citations = outcome.citations;
                        self.error_message = None;
                    }
                    Err(message) => {
                        self.phase = SearchPhase::Error;
                        self.result = None;
                        self.citations = Vec::new();
                        self.error_message = Some(message);
                    }
                }
                None
            }
        }
    }

    /// Starting a query supersedes any prior outcome; the freshly issued
    /// ticket is the only one whose completion will be honored.
    fn begin_query(&mut self, query: String) -> QueryDispatch {
        self.phase = SearchPhase::Querying;
        self.result = None;
        self.citations = Vec::new();
        self.error_message = None;
        self.suggestions.clear();
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.in_flight = Some(ticket);
        QueryDispatch { ticket, query }
    }
}

/// One honored pipeline completion, for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct QueryLogEntry {
    pub query: String,
    pub success: bool,
    pub latency_ms: u64,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// Owns the state machine and the orchestrator that services its dispatches.
pub struct SearchSession<G> {
    orchestrator: Orchestrator<G>,
    state: Mutex<SearchState>,
    query_log: Mutex<Vec<QueryLogEntry>>,
}

impl<G: TextGenerator> SearchSession<G> {
    pub fn new(backend: G) -> Self {
        Self::with_orchestrator(Orchestrator::new(backend))
    }

    pub fn with_orchestrator(orchestrator: Orchestrator<G>) -> Self {
        Self {
            orchestrator,
            state: Mutex::new(SearchState::new()),
            query_log: Mutex::new(Vec::new()),
        }
    }

    pub async fn snapshot(&self) -> SearchState {
        self.state.lock().await.clone()
    }

    pub async fn input_changed(&self, text: &str) -> SearchState {
        let mut state = self.state.lock().await;
        state.apply(SearchEvent::InputChanged(text.to_string()));
        state.clone()
    }

    /// Submits the currently recorded query and drives the pipeline to a
    /// published outcome (or a no-op for empty input).
    pub async fn submit(&self) -> SearchState {
        let dispatch = self.state.lock().await.apply(SearchEvent::Submit);
        self.settle(dispatch).await
    }

    pub async fn select_suggestion(&self, text: &str) -> SearchState {
        let dispatch = self
            .state
            .lock()
            .await
            .apply(SearchEvent::SuggestionSelected(text.to_string()));
        self.settle(dispatch).await
    }

    pub async fn recent_queries(&self) -> Vec<QueryLogEntry> {
        self.query_log.lock().await.clone()
    }

    async fn settle(&self, dispatch: Option<QueryDispatch>) -> SearchState {
        let Some(dispatch) = dispatch else {
            return self.snapshot().await;
        };

        let started = Instant::now();
        let outcome = self.orchestrator.run(&dispatch.query).await;
        let success = outcome.is_ok();
        let completion = outcome.map_err(|err| {
            warn!(error = %err, query = %dispatch.query, "takhrij query failed");
            err.user_message()
        });
        self.record(&dispatch.query, success, started.elapsed().as_millis() as u64)
            .await;

        let mut state = self.state.lock().await;
        state.apply(SearchEvent::PipelineCompleted {
            ticket: dispatch.ticket,
            outcome: completion,
        });
        state.clone()
    }

    async fn record(&self, query: &str, success: bool, latency_ms: u64) {
        let mut log = self.query_log.lock().await;
        log.push(QueryLogEntry {
            query: query.to_string(),
            success,
            latency_ms,
            timestamp: OffsetDateTime::now_utc(),
        });
        if log.len() > QUERY_LOG_CAP {
            let overflow = log.len() - QUERY_LOG_CAP;
            log.drain(0..overflow);
        }
    }
}
