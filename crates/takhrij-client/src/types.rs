//! Wire types for the `generateContent` REST surface.
//!
//! Serialized field names follow the backend schema exactly; everything on
//! the response side is optional so a sparse reply still deserializes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part {
                text: Some(text.into()),
            }],
        }
    }

    /// System instructions carry no role on the wire.
    #[must_use]
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![Part {
                text: Some(text.into()),
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Tool {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_search: Option<GoogleSearch>,
}

impl Tool {
    #[must_use]
    pub fn web_search() -> Self {
        Self {
            google_search: Some(GoogleSearch {}),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GoogleSearch {}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub grounding_metadata: Option<GroundingMetadata>,
}

/// Citations the backend attached to generated text after consulting the web.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingMetadata {
    #[serde(default)]
    pub grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroundingChunk {
    #[serde(default)]
    pub web: Option<WebSource>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebSource {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_with_backend_field_names() {
        let request = GenerateContentRequest {
            system_instruction: Some(Content::system("anda pakar")),
            contents: vec![Content::user("semak hadis ini")],
            generation_config: Some(GenerationConfig { temperature: 0.3 }),
            tools: vec![Tool::web_search()],
        };

        let value = serde_json::to_value(&request).expect("request serializes");
        assert!(value.get("systemInstruction").is_some());
        assert!(value.get("generationConfig").is_some());
        assert_eq!(value["contents"][0]["role"], "user");
        assert!(value["tools"][0].get("google_search").is_some());
        assert!(value["systemInstruction"].get("role").is_none());
    }

    #[test]
    fn sparse_response_still_deserializes() {
        let payload = r#"{"candidates":[{"content":{"parts":[{"text":"ok"}]}}]}"#;
        let response: GenerateContentResponse =
            serde_json::from_str(payload).expect("response deserializes");
        assert_eq!(response.candidates.len(), 1);
        assert!(response.candidates[0].grounding_metadata.is_none());
    }

    #[test]
    fn grounding_chunks_tolerate_missing_web_descriptor() {
        let payload = r#"{
            "groundingChunks": [
                {"web": {"uri": "https://sunnah.com/x", "title": "Sunnah.com"}},
                {}
            ]
        }"#;
        let metadata: GroundingMetadata =
            serde_json::from_str(payload).expect("metadata deserializes");
        assert_eq!(metadata.grounding_chunks.len(), 2);
        assert!(metadata.grounding_chunks[1].web.is_none());
    }
}
