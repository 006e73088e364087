pub mod gemini;

use async_trait::async_trait;
use mime::Mime;

use super::domain::{DocumentArtifact, Submission, Verdict};
use super::registry::{self, DocType};

/// MIME types the analysis provider can inspect as raw content. Anything
/// else is still described to it by metadata so presence can be assessed.
pub const SUPPORTED_ANALYSIS_MIMES: &[&str] = &[
    "application/pdf",
    "image/png",
    "image/jpeg",
    "image/webp",
    "image/heic",
    "image/heif",
];

/// Whether the provider can read this MIME type. Matching is on the parsed
/// type/subtype essence, so parameters and casing do not matter.
pub fn is_supported_mime(mime_type: &str) -> bool {
    mime_type
        .parse::<Mime>()
        .map(|mime| SUPPORTED_ANALYSIS_MIMES.contains(&mime.essence_str()))
        .unwrap_or(false)
}

/// A document is content-verifiable only when bytes were uploaded and the
/// format is in the supported set.
pub fn content_verifiable(artifact: &DocumentArtifact) -> bool {
    artifact.content.is_some() && is_supported_mime(&artifact.mime_type)
}

/// Fixed grading policy handed to the collaborator with every request.
pub const CHECKLIST_INSTRUCTION: &str = "\
You are a Senior IQA (Internal Quality Assurance) Agent reviewing First Article Inspection (FAI) submissions.

CHECKLIST:
1. Engineering Drawing: Check if dimensions are legible.
2. Process Management Plan: Verify it has a revision number.
3. FAI Report: Match dimensions against the Drawing.
4. Material Cert/CoC: Check for signature and date.
5. RoHS/Packaging: Verify compliance statements.

CRITICAL RULES:
- If any mandatory document is missing, verdict = REJECTED.
- If a document is present but in a format you cannot read, treat it as valid for the presence check but flag that content verification was not performed.
- Use the exact docType strings from the submission inventory in your response.

Return a structured JSON report with overallVerdict, summary, and details.";

/// One line of the submission inventory shown to the collaborator. Every
/// attached document appears here, readable or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryLine {
    pub doc_type: DocType,
    pub name: String,
    pub mime_type: String,
    pub content_attached: bool,
}

impl InventoryLine {
    fn render(&self) -> String {
        let marker = if self.content_attached {
            "[READABLE CONTENT ATTACHED]"
        } else {
            "[METADATA ONLY - FORMAT NOT SUPPORTED FOR CONTENT REVIEW]"
        };
        format!(
            "- [{}] Name: {} (MIME: {}) {}",
            self.doc_type, self.name, self.mime_type, marker
        )
    }
}

/// Raw bytes forwarded to the collaborator for a readable document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPart {
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// Everything the collaborator receives for one grading pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub submission_id: String,
    pub part_number: String,
    pub revision: String,
    pub supplier_name: String,
    pub inventory: Vec<InventoryLine>,
    pub media: Vec<MediaPart>,
}

impl AnalysisRequest {
    pub fn inventory_text(&self) -> String {
        self.inventory
            .iter()
            .map(InventoryLine::render)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn prompt_text(&self) -> String {
        format!(
            "Review FAI Package for Part {} Rev {} from {}.\n\n\
             SUBMISSION INVENTORY:\n{}\n\n\
             Note: only supported formats have been attached as raw data. \
             For other formats, rely on the inventory list to confirm presence.",
            self.part_number,
            self.revision,
            self.supplier_name,
            self.inventory_text()
        )
    }
}

/// Assemble the collaborator request: content for readable documents, a
/// metadata inventory line for every document regardless.
pub fn build_request(submission: &Submission) -> AnalysisRequest {
    let inventory = submission
        .files
        .iter()
        .map(|f| InventoryLine {
            doc_type: f.doc_type,
            name: f.name.clone(),
            mime_type: f.mime_type.clone(),
            content_attached: content_verifiable(f),
        })
        .collect();

    let media = submission
        .files
        .iter()
        .filter(|f| content_verifiable(f))
        .filter_map(|f| {
            f.content.as_ref().map(|data| MediaPart {
                mime_type: f.mime_type.clone(),
                data: data.clone(),
            })
        })
        .collect();

    AnalysisRequest {
        submission_id: submission.id.0.clone(),
        part_number: submission.part_number.clone(),
        revision: submission.revision.clone(),
        supplier_name: submission.supplier_name.clone(),
        inventory,
        media,
    }
}

/// The verdict the checklist policy demands for a document set: any missing
/// mandatory type forces a rejection. Grading is delegated, but this
/// predicate lets the workflow validate collaborator behavior.
pub fn required_verdict(files: &[DocumentArtifact]) -> Verdict {
    let covered = |doc_type: DocType| files.iter().any(|f| f.doc_type == doc_type);
    if registry::mandatory_types().all(covered) {
        Verdict::Approved
    } else {
        Verdict::Rejected
    }
}

/// Failure modes of the analysis collaborator. None of these reach API
/// callers; the workflow absorbs them into a fail-closed rejection.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("analysis transport failed: {0}")]
    Transport(String),
    #[error("analysis request timed out")]
    Timeout,
    #[error("analysis provider returned an error: {0}")]
    Provider(String),
    #[error("analysis response was malformed: {0}")]
    MalformedResponse(String),
}

/// Seam for the external grading provider so the workflow can be exercised
/// with scripted collaborators.
#[async_trait]
pub trait AnalysisCollaborator: Send + Sync {
    async fn analyze(
        &self,
        request: AnalysisRequest,
    ) -> Result<super::domain::AnalysisReport, AnalysisError>;
}
