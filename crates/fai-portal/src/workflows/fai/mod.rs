//! First Article Inspection (FAI) submission workflow.
//!
//! Suppliers assemble a document package for a part/revision, an automated
//! analysis collaborator grades it, and an IQA reviewer issues the final
//! verdict. Rejected packages can be revised and resubmitted, which re-enters
//! the automated audit. The module owns the lifecycle state machine, the
//! mandatory-document completeness gate, the collaborator contract, and the
//! HTTP surface; persistence and identity are pluggable collaborators.

pub mod analysis;
pub mod completeness;
pub mod domain;
pub mod registry;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use analysis::{
    build_request, content_verifiable, is_supported_mime, required_verdict, AnalysisCollaborator,
    AnalysisError, AnalysisRequest, InventoryLine, MediaPart, CHECKLIST_INSTRUCTION,
    SUPPORTED_ANALYSIS_MIMES,
};
pub use analysis::gemini::GeminiAnalysisClient;
pub use completeness::{evaluate, CompletenessReport};
pub use domain::{
    collapse_by_type, sort_for_attention, Actor, ActorRole, AnalysisDetail, AnalysisReport,
    DocumentArtifact, DocumentGrade, DocumentUpload, DocumentView, RejectionSource, Submission,
    SubmissionDraft, SubmissionId, SubmissionStatus, SubmissionView, Verdict, SYSTEM_ERROR_REMARK,
};
pub use registry::{is_mandatory, mandatory_types, requirement, requirements, DocType, DocumentRequirement};
pub use repository::{RepositoryError, SubmissionRepository};
pub use router::{fai_router, ACTOR_ORGANIZATION_HEADER, ACTOR_ROLE_HEADER};
pub use service::{
    DashboardStats, FaiServiceError, FaiSubmissionService, StateConflictError, ValidationError,
};
