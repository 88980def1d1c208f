//! Converts raw backend text into a [`HadithResult`].
//!
//! The backend is asked for a fenced ```json block but does not always
//! comply, so extraction runs an ordered fallback: the fenced block if one
//! exists, otherwise the whole reply as raw JSON. A fenced block that fails
//! to parse is a contract violation, not an invitation to guess further.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::verdict::{HadithResult, HadithStatus};

static JSON_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```json\s*(.*?)\s*```").expect("fence pattern compiles"));

#[derive(Debug, Clone, Error)]
#[error("backend reply does not match the structured contract: {reason}")]
pub struct ExtractError {
    pub reason: String,
}

/// Mirror of the wire contract. Field names are bit-exact; `status` stays a
/// free string here and is normalized after the parse.
#[derive(Debug, Deserialize)]
struct VerdictWire {
    matan: String,
    translation: String,
    status: String,
    sources: Vec<String>,
    explanation: String,
}

/// All-or-nothing: a parse failure never yields a partially populated result.
pub fn extract_result(raw: &str) -> Result<HadithResult, ExtractError> {
    let fenced = JSON_FENCE
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str());

    let parsed = match fenced {
        Some(block) => serde_json::from_str::<VerdictWire>(block),
        None => serde_json::from_str::<VerdictWire>(raw.trim()),
    };

    match parsed {
        Ok(wire) => Ok(HadithResult {
            matan: wire.matan,
            translation: wire.translation,
            status: HadithStatus::parse(&wire.status),
            sources: wire.sources,
            explanation: wire.explanation,
        }),
        Err(err) => {
            warn!(error = %err, raw, "failed to parse backend reply");
            Err(ExtractError {
                reason: err.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WELL_FORMED: &str = r#"{
        "matan": "إنما الأعمال بالنيات",
        "translation": "Sesungguhnya setiap amalan itu dengan niat.",
        "status": "Sahih",
        "sources": ["Sahih Bukhari", "Sahih Muslim"],
        "explanation": "Hadis ini diriwayatkan oleh Imam Bukhari (No. 1)."
    }"#;

    #[test]
    fn fenced_block_inside_surrounding_text_round_trips() {
        let reply = format!("Berikut hasil semakan:\n```json\n{WELL_FORMED}\n```\nSekian.");
        let result = extract_result(&reply).expect("fenced reply extracts");
        assert_eq!(result.status, HadithStatus::Sahih);
        assert_eq!(result.sources.len(), 2);
        assert_eq!(result.matan, "إنما الأعمال بالنيات");
    }

    #[test]
    fn raw_json_without_fencing_extracts_the_same_record() {
        let fenced = extract_result(&format!("```json\n{WELL_FORMED}\n```"))
            .expect("fenced reply extracts");
        let raw = extract_result(WELL_FORMED).expect("raw reply extracts");
        assert_eq!(fenced, raw);
    }

    #[test]
    fn unparseable_reply_is_an_error_not_a_partial_result() {
        let err = extract_result("Maaf, saya tidak dapat membantu.").expect_err("must fail");
        assert!(!err.reason.is_empty());
    }

    #[test]
    fn fenced_block_with_invalid_json_does_not_fall_back() {
        let reply = "```json\n{not json}\n```\n{\"matan\": \"x\"}";
        assert!(extract_result(reply).is_err());
    }

    #[test]
    fn missing_required_field_fails_extraction() {
        let reply = r#"{
            "matan": "نص",
            "translation": "terjemahan",
            "sources": [],
            "explanation": "huraian"
        }"#;
        assert!(extract_result(reply).is_err());
    }

    #[test]
    fn out_of_vocabulary_status_is_accepted_as_unknown() {
        let reply = r#"{
            "matan": "نص",
            "translation": "terjemahan",
            "status": "Gharib Jiddan",
            "sources": ["Musnad Ahmad"],
            "explanation": "huraian"
        }"#;
        let result = extract_result(reply).expect("extracts despite odd status");
        assert_eq!(result.status, HadithStatus::TidakDiketahui);
    }
}
