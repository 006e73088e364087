use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::analysis::{build_request, AnalysisCollaborator};
use super::completeness;
use super::domain::{
    collapse_by_type, sort_for_attention, Actor, ActorRole, DocumentUpload, RejectionSource,
    Submission, SubmissionDraft, SubmissionId, SubmissionStatus, Verdict, SYSTEM_ERROR_REMARK,
};
use super::registry::DocType;
use super::repository::{RepositoryError, SubmissionRepository};

/// Service composing the completeness gate, repository, and analysis
/// collaborator into the submission lifecycle.
pub struct FaiSubmissionService<R, C> {
    repository: Arc<R>,
    collaborator: Arc<C>,
}

static SUBMISSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_submission_id() -> SubmissionId {
    let id = SUBMISSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    SubmissionId(format!("SUB-{id:05}"))
}

/// Trailing window for the dashboard package counters.
const STATS_WINDOW_DAYS: i64 = 30;

impl<R, C> FaiSubmissionService<R, C>
where
    R: SubmissionRepository + 'static,
    C: AnalysisCollaborator + 'static,
{
    pub fn new(repository: Arc<R>, collaborator: Arc<C>) -> Self {
        Self {
            repository,
            collaborator,
        }
    }

    /// Accept a new FAI package from a supplier. The package must cover
    /// every mandatory checklist slot; nothing is persisted otherwise. The
    /// stored submission is returned in `PENDING_AI` while the automated
    /// audit proceeds in the background.
    pub async fn submit(
        &self,
        actor: &Actor,
        draft: SubmissionDraft,
    ) -> Result<Submission, FaiServiceError> {
        require_role(actor, ActorRole::Supplier, "submit FAI packages")?;

        let files = collapse_by_type(draft.files);
        let report = completeness::evaluate(&files);
        if !report.is_complete() {
            return Err(ValidationError::MissingMandatoryDocuments(report.missing).into());
        }

        let submission = Submission {
            id: next_submission_id(),
            supplier_name: actor.organization.clone(),
            part_number: draft.part_number,
            revision: draft.revision,
            submitted_at: Utc::now(),
            status: SubmissionStatus::PendingAi,
            files,
            iqa_remarks: None,
            rejection_source: None,
            is_new_verdict: false,
            analysis: None,
        };

        let stored = self.repository.insert(submission)?;
        info!(
            id = %stored.id.0,
            supplier = %stored.supplier_name,
            part = %stored.part_number,
            "submission accepted, queuing automated audit"
        );

        let repository = self.repository.clone();
        let collaborator = self.collaborator.clone();
        let id = stored.id.clone();
        tokio::spawn(async move {
            if let Err(err) = Self::drive_analysis(repository, collaborator, &id).await {
                warn!(id = %id.0, error = %err, "background audit aborted");
            }
        });

        Ok(stored)
    }

    /// Run one automated-audit pass for a submission. Normally driven by the
    /// task spawned from `submit`/`resubmit`; exposed so operators and tests
    /// can drive the pipeline explicitly. A pass that loses the claim (the
    /// submission is no longer `PENDING_AI`) backs off without touching
    /// state.
    pub async fn process_analysis(&self, id: &SubmissionId) -> Result<(), FaiServiceError> {
        Self::drive_analysis(self.repository.clone(), self.collaborator.clone(), id).await
    }

    async fn drive_analysis(
        repository: Arc<R>,
        collaborator: Arc<C>,
        id: &SubmissionId,
    ) -> Result<(), FaiServiceError> {
        let submission = repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;

        // AI_REVIEWING doubles as the at-most-one-in-flight marker.
        let mut claim = submission;
        claim.status = SubmissionStatus::AiReviewing;
        let claimed = match repository.replace_if_status(id, SubmissionStatus::PendingAi, claim) {
            Ok(claimed) => claimed,
            Err(RepositoryError::StatusMismatch { actual, .. }) => {
                info!(id = %id.0, status = actual.label(), "audit claim lost, backing off");
                return Ok(());
            }
            Err(other) => return Err(other.into()),
        };

        let request = build_request(&claimed);
        match collaborator.analyze(request).await {
            Ok(analysis) => {
                let verdict = analysis.overall_verdict;
                let mut updated = claimed;
                updated.status = SubmissionStatus::PendingReview;
                updated.analysis = Some(analysis);
                repository.replace_if_status(id, SubmissionStatus::AiReviewing, updated)?;
                info!(
                    id = %id.0,
                    verdict = ?verdict,
                    "automated audit complete, awaiting IQA review"
                );
            }
            Err(err) => {
                // Fail closed: an un-gradeable package must not sit in limbo
                // or default to approval. Resubmission is the recovery path.
                warn!(id = %id.0, error = %err, "automated audit failed, rejecting submission");
                let mut updated = claimed;
                updated.status = SubmissionStatus::Rejected;
                updated.iqa_remarks = Some(SYSTEM_ERROR_REMARK.to_string());
                updated.rejection_source = Some(RejectionSource::System);
                updated.analysis = None;
                repository.replace_if_status(id, SubmissionStatus::AiReviewing, updated)?;
            }
        }

        Ok(())
    }

    /// Record the IQA reviewer's final verdict. Remarks are the durable
    /// audit trail and must not be blank; a submission already decided
    /// cannot be decided again.
    pub fn record_decision(
        &self,
        actor: &Actor,
        id: &SubmissionId,
        verdict: Verdict,
        remarks: &str,
    ) -> Result<Submission, FaiServiceError> {
        require_role(actor, ActorRole::Iqa, "record review decisions")?;

        let trimmed = remarks.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::BlankRemarks.into());
        }

        let current = self.fetch_required(id)?;
        if current.status != SubmissionStatus::PendingReview {
            return Err(StateConflictError {
                required: SubmissionStatus::PendingReview,
                actual: current.status,
            }
            .into());
        }

        let mut updated = current;
        updated.status = verdict.as_status();
        updated.iqa_remarks = Some(trimmed.to_string());
        updated.rejection_source = match verdict {
            Verdict::Rejected => Some(RejectionSource::Reviewer),
            Verdict::Approved => None,
        };
        updated.is_new_verdict = true;

        let stored = self.cas(id, SubmissionStatus::PendingReview, updated)?;
        info!(
            id = %id.0,
            verdict = ?verdict,
            "IQA decision recorded"
        );
        Ok(stored)
    }

    /// Replace a rejected submission's documents wholesale and re-enter the
    /// automated audit. The replacement set faces the same completeness gate
    /// as a first submission, and the audit is sequenced into this call so a
    /// resubmission never sits in `PENDING_AI`.
    pub async fn resubmit(
        &self,
        actor: &Actor,
        id: &SubmissionId,
        new_files: Vec<DocumentUpload>,
    ) -> Result<Submission, FaiServiceError> {
        require_role(actor, ActorRole::Supplier, "resubmit FAI packages")?;

        let current = self.fetch_required(id)?;
        if current.supplier_name != actor.organization {
            return Err(ValidationError::NotSubmissionOwner.into());
        }
        if current.status != SubmissionStatus::Rejected {
            return Err(StateConflictError {
                required: SubmissionStatus::Rejected,
                actual: current.status,
            }
            .into());
        }

        let files = collapse_by_type(new_files);
        let report = completeness::evaluate(&files);
        if !report.is_complete() {
            return Err(ValidationError::MissingMandatoryDocuments(report.missing).into());
        }

        let mut updated = current;
        updated.files = files;
        updated.status = SubmissionStatus::PendingAi;
        updated.analysis = None;
        updated.is_new_verdict = false;

        self.cas(id, SubmissionStatus::Rejected, updated)?;
        info!(id = %id.0, "resubmission accepted, re-running automated audit");

        Self::drive_analysis(self.repository.clone(), self.collaborator.clone(), id).await?;
        self.fetch_required(id).map_err(Into::into)
    }

    /// Clear the supplier-facing "new verdict" indicator. Idempotent; no
    /// status precondition.
    pub fn acknowledge_verdict(
        &self,
        actor: &Actor,
        id: &SubmissionId,
    ) -> Result<Submission, FaiServiceError> {
        require_role(actor, ActorRole::Supplier, "acknowledge verdicts")?;

        let current = self.fetch_required(id)?;
        if current.supplier_name != actor.organization {
            return Err(ValidationError::NotSubmissionOwner.into());
        }
        if !current.is_new_verdict {
            return Ok(current);
        }

        let status = current.status;
        let mut updated = current;
        updated.is_new_verdict = false;
        self.cas(id, status, updated)
    }

    /// Fetch one submission. IQA sees everything; suppliers only their own
    /// organization's packages.
    pub fn get(&self, actor: &Actor, id: &SubmissionId) -> Result<Submission, FaiServiceError> {
        let current = self.fetch_required(id)?;
        if actor.role == ActorRole::Supplier && current.supplier_name != actor.organization {
            return Err(ValidationError::NotSubmissionOwner.into());
        }
        Ok(current)
    }

    /// Actor-scoped listing in attention order: pending reviews first, then
    /// rejected work needing supplier action, newest first within a status.
    pub fn list_for_actor(&self, actor: &Actor) -> Result<Vec<Submission>, FaiServiceError> {
        let mut submissions = match actor.role {
            ActorRole::Iqa => self.repository.all()?,
            ActorRole::Supplier => self.repository.for_supplier(&actor.organization)?,
        };
        sort_for_attention(&mut submissions);
        Ok(submissions)
    }

    /// Submissions awaiting a human decision, newest first.
    pub fn review_queue(&self) -> Result<Vec<Submission>, FaiServiceError> {
        let mut queue = self
            .repository
            .with_status(SubmissionStatus::PendingReview)?;
        queue.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(queue)
    }

    /// Package counters over a trailing 30-day window; the pending-review
    /// count is all-time since it measures the live queue.
    pub fn dashboard_stats(&self, now: DateTime<Utc>) -> Result<DashboardStats, FaiServiceError> {
        let window_start = now - Duration::days(STATS_WINDOW_DAYS);
        let submissions = self.repository.all()?;

        let mut stats = DashboardStats::default();
        for submission in &submissions {
            if submission.status == SubmissionStatus::PendingReview {
                stats.pending_review += 1;
            }
            if submission.submitted_at < window_start {
                continue;
            }
            stats.total += 1;
            match submission.status {
                SubmissionStatus::Approved => stats.approved += 1,
                SubmissionStatus::Rejected => stats.rejected += 1,
                _ => {}
            }
        }
        Ok(stats)
    }

    fn fetch_required(&self, id: &SubmissionId) -> Result<Submission, FaiServiceError> {
        Ok(self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?)
    }

    /// Compare-and-swap with the precondition already verified; a mismatch
    /// here means another actor raced us, which is still a state conflict.
    fn cas(
        &self,
        id: &SubmissionId,
        expected: SubmissionStatus,
        updated: Submission,
    ) -> Result<Submission, FaiServiceError> {
        match self.repository.replace_if_status(id, expected, updated) {
            Ok(stored) => Ok(stored),
            Err(RepositoryError::StatusMismatch { expected, actual }) => {
                Err(StateConflictError {
                    required: expected,
                    actual,
                }
                .into())
            }
            Err(other) => Err(other.into()),
        }
    }
}

fn require_role(
    actor: &Actor,
    required: ActorRole,
    operation: &'static str,
) -> Result<(), ValidationError> {
    if actor.role == required {
        Ok(())
    } else {
        Err(ValidationError::RoleNotPermitted {
            role: actor.role,
            operation,
        })
    }
}

fn missing_list(types: &[DocType]) -> String {
    types
        .iter()
        .map(|doc_type| doc_type.label())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Rejected input; the caller must correct and retry. Never partially
/// applied.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("mandatory documents missing: {}", missing_list(.0))]
    MissingMandatoryDocuments(Vec<DocType>),
    #[error("decision remarks must not be blank")]
    BlankRemarks,
    #[error("role {role} is not permitted to {operation}", role = .role.label())]
    RoleNotPermitted {
        role: ActorRole,
        operation: &'static str,
    },
    #[error("submission belongs to another supplier organization")]
    NotSubmissionOwner,
}

/// Operation attempted against a submission outside its required status.
#[derive(Debug, thiserror::Error)]
#[error("submission must be {required} to apply this operation, but is {actual}",
    required = .required.label(), actual = .actual.label())]
pub struct StateConflictError {
    pub required: SubmissionStatus,
    pub actual: SubmissionStatus,
}

/// Error raised by the submission service.
#[derive(Debug, thiserror::Error)]
pub enum FaiServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    StateConflict(#[from] StateConflictError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Dashboard counters for the IQA landing page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total: usize,
    pub approved: usize,
    pub rejected: usize,
    pub pending_review: usize,
}
