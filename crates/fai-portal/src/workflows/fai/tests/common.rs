use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::fai::analysis::{
    AnalysisCollaborator, AnalysisError, AnalysisRequest,
};
use crate::workflows::fai::domain::{
    Actor, AnalysisDetail, AnalysisReport, DocumentGrade, DocumentUpload, Submission,
    SubmissionDraft, SubmissionId, SubmissionStatus, Verdict,
};
use crate::workflows::fai::registry::DocType;
use crate::workflows::fai::repository::{RepositoryError, SubmissionRepository};
use crate::workflows::fai::{fai_router, FaiSubmissionService};

pub(super) fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 11, 3, 9, 30, 0).single().expect("valid timestamp")
}

pub(super) fn supplier() -> Actor {
    Actor::supplier("ABC Manufacturing")
}

pub(super) fn other_supplier() -> Actor {
    Actor::supplier("Tech Components Ltd.")
}

pub(super) fn iqa() -> Actor {
    Actor::iqa("IQA Office")
}

pub(super) fn upload(doc_type: DocType, mime_type: &str, content: Option<&[u8]>) -> DocumentUpload {
    DocumentUpload {
        id: format!("doc-{}", doc_type.label().to_ascii_lowercase().replace(' ', "-")),
        doc_type,
        name: format!("{}.bin", doc_type.label()),
        mime_type: mime_type.to_string(),
        last_modified: base_time(),
        content: content.map(<[u8]>::to_vec),
    }
}

/// One document per mandatory checklist slot. The FAI report is an
/// unsupported spreadsheet format so request assembly always has a
/// metadata-only document to work with.
pub(super) fn complete_uploads() -> Vec<DocumentUpload> {
    vec![
        upload(DocType::EngineeringDrawing, "application/pdf", Some(b"drawing")),
        upload(DocType::ProcessManagementPlan, "application/pdf", Some(b"plan")),
        upload(
            DocType::FaiReportSupplier,
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Some(b"report"),
        ),
        upload(DocType::MaterialCert, "application/pdf", Some(b"cert")),
        upload(DocType::RohsDeclaration, "image/png", Some(b"rohs")),
        upload(DocType::PackagingReq, "application/pdf", Some(b"packaging")),
    ]
}

pub(super) fn incomplete_uploads() -> Vec<DocumentUpload> {
    complete_uploads()
        .into_iter()
        .filter(|u| u.doc_type != DocType::MaterialCert)
        .collect()
}

pub(super) fn draft(files: Vec<DocumentUpload>) -> SubmissionDraft {
    SubmissionDraft {
        part_number: "MOD-1".to_string(),
        revision: "01".to_string(),
        files,
    }
}

pub(super) fn approved_report() -> AnalysisReport {
    AnalysisReport {
        overall_verdict: Verdict::Approved,
        summary: "ok".to_string(),
        details: vec![AnalysisDetail {
            doc_type: DocType::EngineeringDrawing,
            result: DocumentGrade::Pass,
            notes: "Dimensions legible".to_string(),
        }],
    }
}

pub(super) fn rejected_report() -> AnalysisReport {
    AnalysisReport {
        overall_verdict: Verdict::Rejected,
        summary: "FAI report dimensions do not match the drawing".to_string(),
        details: vec![AnalysisDetail {
            doc_type: DocType::FaiReportSupplier,
            result: DocumentGrade::Fail,
            notes: "Dimension 4.2 out of tolerance".to_string(),
        }],
    }
}

/// Direct entity builder for repository-level fixtures that bypass the
/// service lifecycle.
pub(super) fn submission_in_status(
    id: &str,
    organization: &str,
    status: SubmissionStatus,
    age_days: i64,
) -> Submission {
    Submission {
        id: SubmissionId(id.to_string()),
        supplier_name: organization.to_string(),
        part_number: "MOD-1".to_string(),
        revision: "01".to_string(),
        submitted_at: base_time() - Duration::days(age_days),
        status,
        files: Vec::new(),
        iqa_remarks: None,
        rejection_source: None,
        is_new_verdict: false,
        analysis: None,
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    records: Arc<Mutex<HashMap<SubmissionId, Submission>>>,
}

impl SubmissionRepository for MemoryRepository {
    fn insert(&self, submission: Submission) -> Result<Submission, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&submission.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(submission.id.clone(), submission.clone());
        Ok(submission)
    }

    fn fetch(&self, id: &SubmissionId) -> Result<Option<Submission>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn replace_if_status(
        &self,
        id: &SubmissionId,
        expected: SubmissionStatus,
        updated: Submission,
    ) -> Result<Submission, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let current = guard.get(id).ok_or(RepositoryError::NotFound)?;
        if current.status != expected {
            return Err(RepositoryError::StatusMismatch {
                expected,
                actual: current.status,
            });
        }
        guard.insert(id.clone(), updated.clone());
        Ok(updated)
    }

    fn for_supplier(&self, organization: &str) -> Result<Vec<Submission>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|s| s.supplier_name == organization)
            .cloned()
            .collect())
    }

    fn with_status(&self, status: SubmissionStatus) -> Result<Vec<Submission>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|s| s.status == status)
            .cloned()
            .collect())
    }

    fn all(&self) -> Result<Vec<Submission>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}

pub(super) struct UnavailableRepository;

impl SubmissionRepository for UnavailableRepository {
    fn insert(&self, _submission: Submission) -> Result<Submission, RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }

    fn fetch(&self, _id: &SubmissionId) -> Result<Option<Submission>, RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }

    fn replace_if_status(
        &self,
        _id: &SubmissionId,
        _expected: SubmissionStatus,
        _updated: Submission,
    ) -> Result<Submission, RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }

    fn for_supplier(&self, _organization: &str) -> Result<Vec<Submission>, RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }

    fn with_status(&self, _status: SubmissionStatus) -> Result<Vec<Submission>, RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }

    fn all(&self) -> Result<Vec<Submission>, RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }
}

/// Collaborator fake replaying a queue of scripted outcomes and recording
/// every request it receives.
#[derive(Default)]
pub(super) struct ScriptedCollaborator {
    script: Mutex<VecDeque<Result<AnalysisReport, AnalysisError>>>,
    requests: Mutex<Vec<AnalysisRequest>>,
}

impl ScriptedCollaborator {
    pub(super) fn returning(report: AnalysisReport) -> Self {
        let collaborator = Self::default();
        collaborator.push(Ok(report));
        collaborator
    }

    pub(super) fn failing(error: AnalysisError) -> Self {
        let collaborator = Self::default();
        collaborator.push(Err(error));
        collaborator
    }

    pub(super) fn push(&self, outcome: Result<AnalysisReport, AnalysisError>) {
        self.script
            .lock()
            .expect("script mutex poisoned")
            .push_back(outcome);
    }

    pub(super) fn requests(&self) -> Vec<AnalysisRequest> {
        self.requests.lock().expect("request mutex poisoned").clone()
    }
}

#[async_trait::async_trait]
impl AnalysisCollaborator for ScriptedCollaborator {
    async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisReport, AnalysisError> {
        self.requests
            .lock()
            .expect("request mutex poisoned")
            .push(request);
        self.script
            .lock()
            .expect("script mutex poisoned")
            .pop_front()
            .unwrap_or_else(|| Err(AnalysisError::Provider("unscripted call".to_string())))
    }
}

pub(super) type TestService = FaiSubmissionService<MemoryRepository, ScriptedCollaborator>;

pub(super) fn build_service(
    collaborator: ScriptedCollaborator,
) -> (TestService, Arc<MemoryRepository>, Arc<ScriptedCollaborator>) {
    let repository = Arc::new(MemoryRepository::default());
    let collaborator = Arc::new(collaborator);
    let service = FaiSubmissionService::new(repository.clone(), collaborator.clone());
    (service, repository, collaborator)
}

pub(super) fn fai_router_with_service(service: Arc<TestService>) -> axum::Router {
    fai_router(service)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
