//! Verdict data model produced by the extraction pipeline.

use serde::{Deserialize, Serialize};

/// Authenticity grading vocabulary. Closed set; anything else the backend
/// emits is folded into [`HadithStatus::TidakDiketahui`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HadithStatus {
    Sahih,
    Hasan,
    Daif,
    Palsu,
    #[serde(rename = "Tidak Diketahui")]
    TidakDiketahui,
}

impl HadithStatus {
    /// Display label, 1:1 with the enumeration.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Sahih => "Sahih",
            Self::Hasan => "Hasan",
            Self::Daif => "Daif",
            Self::Palsu => "Palsu",
            Self::TidakDiketahui => "Tidak Diketahui",
        }
    }

    /// Normalizes a backend-emitted status string.
    ///
    /// Synonyms the backend is known to emit fold into their canonical grade
    /// (lemah -> Daif, maudhu -> Palsu). Values outside the vocabulary map to
    /// `TidakDiketahui` rather than failing the whole extraction, so a future
    /// backend grade does not break existing clients.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let needle = raw.trim().to_lowercase();
        if needle.contains("sahih") {
            Self::Sahih
        } else if needle.contains("hasan") {
            Self::Hasan
        } else if needle.contains("daif") || needle.contains("lemah") {
            Self::Daif
        } else if needle.contains("palsu") || needle.contains("maudhu") || needle.contains("mawdu")
        {
            Self::Palsu
        } else {
            Self::TidakDiketahui
        }
    }
}

impl std::fmt::Display for HadithStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Structured verdict for one query. Immutable once extracted; discarded when
/// a new query starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HadithResult {
    pub matan: String,
    pub translation: String,
    pub status: HadithStatus,
    pub sources: Vec<String>,
    pub explanation: String,
}

/// Web reference the backend consulted while generating the verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Citation {
    pub title: String,
    pub url: String,
}
