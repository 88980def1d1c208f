//! Normalizes grounding metadata into presentable citations.

use takhrij_client::types::GroundingMetadata;

use crate::verdict::Citation;

/// Keeps chunks whose web descriptor carries both a non-empty title and url,
/// in backend emission order. Pairs that are byte-identical in both fields
/// collapse to their first occurrence; near-duplicates pass through, that is
/// the backend's call. Missing metadata is an empty list, never an error.
#[must_use]
pub fn collect_citations(metadata: Option<&GroundingMetadata>) -> Vec<Citation> {
    let Some(metadata) = metadata else {
        return Vec::new();
    };

    let mut citations: Vec<Citation> = Vec::new();
    for chunk in &metadata.grounding_chunks {
        let Some(web) = &chunk.web else { continue };
        let (Some(title), Some(uri)) = (&web.title, &web.uri) else {
            continue;
        };
        if title.is_empty() || uri.is_empty() {
            continue;
        }

        let citation = Citation {
            title: title.clone(),
            url: uri.clone(),
        };
        if !citations.contains(&citation) {
            citations.push(citation);
        }
    }
    citations
}
