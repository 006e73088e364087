use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::registry::{self, DocType};

/// Identifier wrapper for FAI submissions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubmissionId(pub String);

/// Roles the identity collaborator can vouch for. The workflow trusts the
/// role as given and performs no further authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActorRole {
    #[serde(rename = "SUPPLIER")]
    Supplier,
    #[serde(rename = "IQA")]
    Iqa,
}

impl ActorRole {
    pub const fn label(self) -> &'static str {
        match self {
            ActorRole::Supplier => "SUPPLIER",
            ActorRole::Iqa => "IQA",
        }
    }
}

/// Authenticated caller identity handed in by the upstream identity layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub role: ActorRole,
    pub organization: String,
}

impl Actor {
    pub fn supplier(organization: impl Into<String>) -> Self {
        Self {
            role: ActorRole::Supplier,
            organization: organization.into(),
        }
    }

    pub fn iqa(organization: impl Into<String>) -> Self {
        Self {
            role: ActorRole::Iqa,
            organization: organization.into(),
        }
    }
}

/// One uploaded artifact inside a submission. Replaced wholesale on
/// resubmission, never partially mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentArtifact {
    pub id: String,
    pub doc_type: DocType,
    pub name: String,
    pub mime_type: String,
    pub last_modified: DateTime<Utc>,
    /// Raw bytes when the uploader attached content; metadata-only references
    /// into external storage carry `None`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<u8>>,
    /// Snapshot of the registry flag at upload time. Deliberately not
    /// re-derived later so historical packages keep their audit meaning.
    pub is_mandatory: bool,
}

/// Caller-facing upload payload. The mandatory flag is stamped on by the
/// workflow from the registry, never accepted from the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentUpload {
    pub id: String,
    pub doc_type: DocType,
    pub name: String,
    pub mime_type: String,
    pub last_modified: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<u8>>,
}

impl DocumentUpload {
    pub fn into_artifact(self) -> DocumentArtifact {
        let is_mandatory = registry::is_mandatory(self.doc_type);
        DocumentArtifact {
            id: self.id,
            doc_type: self.doc_type,
            name: self.name,
            mime_type: self.mime_type,
            last_modified: self.last_modified,
            content: self.content,
            is_mandatory,
        }
    }
}

/// Collapse a batch so each document type appears at most once; a later
/// entry of the same type replaces the earlier one, matching how repeated
/// uploads behave in the portal UI.
pub fn collapse_by_type(uploads: Vec<DocumentUpload>) -> Vec<DocumentArtifact> {
    let mut files: Vec<DocumentArtifact> = Vec::with_capacity(uploads.len());
    for upload in uploads {
        let artifact = upload.into_artifact();
        match files.iter_mut().find(|f| f.doc_type == artifact.doc_type) {
            Some(existing) => *existing = artifact,
            None => files.push(artifact),
        }
    }
    files
}

/// Submission lifecycle status. `Draft` is reserved for a future staged-edit
/// surface and is never produced by the workflow itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubmissionStatus {
    #[serde(rename = "DRAFT")]
    Draft,
    #[serde(rename = "PENDING_AI")]
    PendingAi,
    #[serde(rename = "AI_REVIEWING")]
    AiReviewing,
    #[serde(rename = "PENDING_REVIEW")]
    PendingReview,
    #[serde(rename = "APPROVED")]
    Approved,
    #[serde(rename = "REJECTED")]
    Rejected,
}

impl SubmissionStatus {
    pub const fn label(self) -> &'static str {
        match self {
            SubmissionStatus::Draft => "DRAFT",
            SubmissionStatus::PendingAi => "PENDING_AI",
            SubmissionStatus::AiReviewing => "AI_REVIEWING",
            SubmissionStatus::PendingReview => "PENDING_REVIEW",
            SubmissionStatus::Approved => "APPROVED",
            SubmissionStatus::Rejected => "REJECTED",
        }
    }

    /// Business priority used when ranking submissions for attention:
    /// unreviewed work first, then rejected work awaiting supplier action.
    pub const fn attention_priority(self) -> u8 {
        match self {
            SubmissionStatus::PendingReview => 1,
            SubmissionStatus::Rejected => 2,
            SubmissionStatus::Approved => 3,
            SubmissionStatus::AiReviewing => 4,
            SubmissionStatus::PendingAi => 5,
            SubmissionStatus::Draft => 6,
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, SubmissionStatus::Approved | SubmissionStatus::Rejected)
    }
}

/// Verdict issued either by the analysis collaborator or the IQA reviewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "APPROVED")]
    Approved,
    #[serde(rename = "REJECTED")]
    Rejected,
}

impl Verdict {
    pub const fn as_status(self) -> SubmissionStatus {
        match self {
            Verdict::Approved => SubmissionStatus::Approved,
            Verdict::Rejected => SubmissionStatus::Rejected,
        }
    }
}

/// Who authored the rejection currently recorded in `iqa_remarks`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectionSource {
    #[serde(rename = "REVIEWER")]
    Reviewer,
    #[serde(rename = "SYSTEM")]
    System,
}

/// Per-document grade inside an analysis report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentGrade {
    #[serde(rename = "PASS")]
    Pass,
    #[serde(rename = "FAIL")]
    Fail,
    #[serde(rename = "NOT_APPLICABLE")]
    NotApplicable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisDetail {
    pub doc_type: DocType,
    pub result: DocumentGrade,
    pub notes: String,
}

/// Structured result returned by the analysis collaborator, stored verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub overall_verdict: Verdict,
    pub summary: String,
    pub details: Vec<AnalysisDetail>,
}

/// Operator-facing remark recorded when the analysis collaborator fails and
/// the submission is closed out instead of left in limbo.
pub const SYSTEM_ERROR_REMARK: &str = "System processing error during AI audit.";

/// The central entity: one FAI package and its review state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: SubmissionId,
    pub supplier_name: String,
    pub part_number: String,
    pub revision: String,
    pub submitted_at: DateTime<Utc>,
    pub status: SubmissionStatus,
    pub files: Vec<DocumentArtifact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iqa_remarks: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_source: Option<RejectionSource>,
    pub is_new_verdict: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisReport>,
}

impl Submission {
    pub fn document_of_type(&self, doc_type: DocType) -> Option<&DocumentArtifact> {
        self.files.iter().find(|f| f.doc_type == doc_type)
    }

    /// Wire view with document contents stripped, mirroring what the portal
    /// persists and lists.
    pub fn view(&self) -> SubmissionView {
        SubmissionView {
            id: self.id.clone(),
            supplier_name: self.supplier_name.clone(),
            part_number: self.part_number.clone(),
            revision: self.revision.clone(),
            submitted_at: self.submitted_at,
            status: self.status.label(),
            files: self
                .files
                .iter()
                .map(|f| DocumentView {
                    id: f.id.clone(),
                    doc_type: f.doc_type,
                    name: f.name.clone(),
                    mime_type: f.mime_type.clone(),
                    last_modified: f.last_modified,
                    is_mandatory: f.is_mandatory,
                })
                .collect(),
            iqa_remarks: self.iqa_remarks.clone(),
            rejection_source: self.rejection_source,
            is_new_verdict: self.is_new_verdict,
            analysis: self.analysis.clone(),
        }
    }
}

/// Sort submissions for attention: status priority first, newest first within
/// the same status.
pub fn sort_for_attention(submissions: &mut [Submission]) {
    submissions.sort_by(|a, b| {
        a.status
            .attention_priority()
            .cmp(&b.status.attention_priority())
            .then_with(|| b.submitted_at.cmp(&a.submitted_at))
    });
}

/// Content-free document metadata for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentView {
    pub id: String,
    pub doc_type: DocType,
    pub name: String,
    pub mime_type: String,
    pub last_modified: DateTime<Utc>,
    pub is_mandatory: bool,
}

/// Sanitized representation of a submission's exposed state.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionView {
    pub id: SubmissionId,
    pub supplier_name: String,
    pub part_number: String,
    pub revision: String,
    pub submitted_at: DateTime<Utc>,
    pub status: &'static str,
    pub files: Vec<DocumentView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iqa_remarks: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_source: Option<RejectionSource>,
    pub is_new_verdict: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisReport>,
}

/// Supplier-authored payload for a new submission. The supplier organization
/// is taken from the actor, never from this payload.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionDraft {
    pub part_number: String,
    pub revision: String,
    pub files: Vec<DocumentUpload>,
}
