use super::domain::DocumentArtifact;
use super::registry::{self, DocType};

/// Outcome of checking a document set against the mandatory checklist slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletenessReport {
    pub missing: Vec<DocType>,
}

impl CompletenessReport {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Check that every mandatory requirement type is covered by exactly one
/// document. Matching is exact on the type; no name or case normalization
/// happens here.
pub fn evaluate(files: &[DocumentArtifact]) -> CompletenessReport {
    let missing = registry::mandatory_types()
        .filter(|doc_type| !files.iter().any(|f| f.doc_type == *doc_type))
        .collect();

    CompletenessReport { missing }
}
