//! Query orchestration and result extraction for hadith takhrij.
//!
//! The pipeline turns free-text user input into a structured verdict:
//! suggestion filtering while typing, one backend exchange per submitted
//! query, extraction of the structured record from non-deterministic model
//! output, citation collection from grounding metadata, and a single-flight
//! session state machine that publishes exactly one outcome at a time.

pub mod citations;
pub mod extract;
pub mod orchestrator;
pub mod session;
pub mod suggest;
pub mod verdict;

pub use citations::collect_citations;
pub use extract::{extract_result, ExtractError};
pub use orchestrator::{Orchestrator, PromptTemplate, SearchError, SearchOutcome};
pub use session::{
    QueryDispatch, QueryLogEntry, SearchEvent, SearchPhase, SearchSession, SearchState,
};
pub use suggest::{filter_suggestions, POPULAR_SEARCHES};
pub use verdict::{Citation, HadithResult, HadithStatus};
