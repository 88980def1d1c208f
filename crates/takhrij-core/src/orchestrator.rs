//! Builds the outbound backend exchange and classifies its outcome.

use thiserror::Error;
use tracing::debug;

use takhrij_client::{ClientError, GenerateRequest, TextGenerator};

use crate::citations::collect_citations;
use crate::extract::{extract_result, ExtractError};
use crate::verdict::{Citation, HadithResult};

/// Instruction asset handed to the backend. The wording is configuration:
/// swap it without touching orchestration code. Only the JSON field names
/// and the status vocabulary inside it are load-bearing.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    pub system_instruction: &'static str,
    pub user_frame: &'static str,
    pub temperature: f32,
}

pub const TAKHRIJ_SYSTEM_INSTRUCTION: &str = r#"Anda adalah pakar rujuk Hadis (Muhaddith) yang berwibawa, teliti, dan akademik.
Tugas anda adalah mencari, menyemak, dan mengesahkan hadis berdasarkan input pengguna.

Sila buat semakan silang menggunakan sumber-sumber autoriti berikut:

SUMBER TEMPATAN & NUSANTARA:
1. https://semakhadis.com/
2. https://hdith.com/
3. https://www.hadits.id/

SUMBER RUJUKAN ARAB/ANTARABANGSA (terjemahkan dapatan ke Bahasa Melayu):
1. https://sunnah.com/
2. https://dorar.net/ (Dorar Saniyyah - rujukan utama status)
3. https://shamela.ws/ (Maktabah Shamela)

PANDUAN PROSES:
1. Cari matan penuh hadis (teks Arab).
2. Cari terjemahan Bahasa Melayu yang tepat.
3. Tentukan status hadis (Sahih, Hasan, Daif, atau Palsu).
4. Lakukan takhrij: kenal pasti kitab yang merekodkannya.
5. Lakukan analisis sanad ringkas jika hadis itu bermasalah.

PENTING - PERATURAN FORMAT JSON:
Output anda MESTI dalam format JSON sahaja di dalam code block ```json,
dengan struktur tepat seperti berikut:
{
  "matan": "Teks Arab lengkap berbaris",
  "translation": "Terjemahan lengkap Bahasa Melayu",
  "status": "Mesti pilih SATU sahaja daripada: 'Sahih', 'Hasan', 'Daif', 'Palsu', atau 'Tidak Diketahui'",
  "sources": ["Nama Kitab 1 (contoh: Sahih Bukhari)", "Nama Kitab 2"],
  "explanation": "Huraian terperinci dan akademik: di mana hadis direkodkan (No. Hadis jika ada), mengapa statusnya begitu, pandangan ulama muktabar, dan kesimpulan hukum beramal dengannya."
}

Jika hadis tidak dijumpai atau input bukan hadis, nyatakan status "Tidak Diketahui"
dan jelaskan dalam "explanation"."#;

const TAKHRIJ_USER_FRAME: &str = "Lakukan takhrij dan semakan terperinci untuk: \"{query}\"";

impl PromptTemplate {
    #[must_use]
    pub fn takhrij() -> Self {
        Self {
            system_instruction: TAKHRIJ_SYSTEM_INSTRUCTION,
            user_frame: TAKHRIJ_USER_FRAME,
            temperature: 0.3,
        }
    }

    fn render_user(&self, query: &str) -> String {
        self.user_frame.replace("{query}", query)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::takhrij()
    }
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("query is empty after trimming")]
    EmptyQuery,
    #[error("backend credential missing: {0}")]
    Config(#[source] ClientError),
    #[error("backend request failed: {0}")]
    Transport(#[source] ClientError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
}

impl From<ClientError> for SearchError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::MissingApiKey => Self::Config(err),
            other => Self::Transport(other),
        }
    }
}

impl SearchError {
    /// Malay copy surfaced in the Error state. The taxonomy, not the message,
    /// drives behavior: config failures are fatal for the session, everything
    /// else is recoverable by re-submitting.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyQuery => "Sila masukkan matan hadis atau kata kunci.".to_string(),
            Self::Config(_) => {
                "API Key tidak dijumpai. Sila pastikan GEMINI_API_KEY disetkan.".to_string()
            }
            Self::Transport(_) => "Berlaku ralat semasa pencarian. Sila cuba lagi.".to_string(),
            Self::Extract(_) => "Gagal memproses data hadis. Sila cuba lagi.".to_string(),
        }
    }
}

/// Completed pipeline output for one query.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub result: HadithResult,
    pub citations: Vec<Citation>,
}

/// Turns a query into a completed backend exchange: template rendering, one
/// `generate` call with web search enabled, extraction, citation collection.
/// Single attempt per query; retry policy belongs to the caller.
pub struct Orchestrator<G> {
    backend: G,
    template: PromptTemplate,
}

impl<G: TextGenerator> Orchestrator<G> {
    pub fn new(backend: G) -> Self {
        Self::with_template(backend, PromptTemplate::default())
    }

    pub fn with_template(backend: G, template: PromptTemplate) -> Self {
        Self { backend, template }
    }

    pub async fn run(&self, query: &str) -> Result<SearchOutcome, SearchError> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        let request = GenerateRequest {
            system_instruction: self.template.system_instruction.to_string(),
            user_text: self.template.render_user(trimmed),
            temperature: self.template.temperature,
            web_search: true,
        };

        debug!(query = trimmed, "dispatching takhrij query");
        let reply = self.backend.generate(request).await?;

        let result = extract_result(&reply.text)?;
        let citations = collect_citations(reply.grounding.as_ref());
        Ok(SearchOutcome { result, citations })
    }
}
