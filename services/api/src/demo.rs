use crate::infra::InMemorySubmissionRepository;
use chrono::Utc;
use clap::Args;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use fai_portal::error::AppError;
use fai_portal::workflows::fai::{
    mandatory_types, requirements, Actor, AnalysisCollaborator, AnalysisDetail, AnalysisError,
    AnalysisReport, AnalysisRequest, DocumentGrade, DocumentUpload, FaiSubmissionService,
    Submission, SubmissionDraft, SubmissionId, SubmissionStatus, Verdict,
};

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Part number for the demo package
    #[arg(long, default_value = "MOD-1")]
    pub(crate) part_number: String,
    /// Drawing revision for the demo package
    #[arg(long, default_value = "01")]
    pub(crate) revision: String,
    /// Simulate an analysis provider outage on the first audit pass
    #[arg(long)]
    pub(crate) fail_first_audit: bool,
}

/// Offline stand-in for the analysis provider: grades a package by checking
/// the request inventory against the mandatory checklist slots.
struct ConsoleGrader {
    fail_next: AtomicBool,
}

impl ConsoleGrader {
    fn new(fail_first: bool) -> Self {
        Self {
            fail_next: AtomicBool::new(fail_first),
        }
    }
}

#[async_trait::async_trait]
impl AnalysisCollaborator for ConsoleGrader {
    async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisReport, AnalysisError> {
        if self.fail_next.swap(false, Ordering::AcqRel) {
            return Err(AnalysisError::Provider(
                "simulated provider outage".to_string(),
            ));
        }

        let covered = |doc_type| request.inventory.iter().any(|line| line.doc_type == doc_type);
        let overall_verdict = if mandatory_types().all(covered) {
            Verdict::Approved
        } else {
            Verdict::Rejected
        };

        let details = request
            .inventory
            .iter()
            .map(|line| AnalysisDetail {
                doc_type: line.doc_type,
                result: DocumentGrade::Pass,
                notes: if line.content_attached {
                    "Content reviewed.".to_string()
                } else {
                    "Presence confirmed; format not readable for content review.".to_string()
                },
            })
            .collect();

        Ok(AnalysisReport {
            overall_verdict,
            summary: format!(
                "Reviewed {} documents for part {} rev {}.",
                request.inventory.len(),
                request.part_number,
                request.revision
            ),
            details,
        })
    }
}

fn demo_package() -> Vec<DocumentUpload> {
    requirements()
        .iter()
        .filter(|entry| entry.mandatory)
        .map(|entry| DocumentUpload {
            id: format!(
                "demo-{}",
                entry.doc_type.label().to_ascii_lowercase().replace(' ', "-")
            ),
            doc_type: entry.doc_type,
            name: format!("{}.pdf", entry.doc_type.label()),
            mime_type: "application/pdf".to_string(),
            last_modified: Utc::now(),
            content: Some(entry.doc_type.label().as_bytes().to_vec()),
        })
        .collect()
}

fn print_submission(label: &str, submission: &Submission) {
    println!("\n{label}");
    println!("  id:       {}", submission.id.0);
    println!("  status:   {}", submission.status.label());
    println!("  supplier: {}", submission.supplier_name);
    if let Some(remarks) = &submission.iqa_remarks {
        println!("  remarks:  {remarks}");
    }
    if let Some(analysis) = &submission.analysis {
        println!(
            "  analysis: {:?} ({} graded documents)",
            analysis.overall_verdict,
            analysis.details.len()
        );
        println!("            {}", analysis.summary);
    }
}

type DemoService = FaiSubmissionService<InMemorySubmissionRepository, ConsoleGrader>;

async fn wait_for_audit(
    service: &DemoService,
    reviewer: &Actor,
    id: &SubmissionId,
) -> Result<Submission, AppError> {
    for _ in 0..200 {
        let submission = service.get(reviewer, id)?;
        if !matches!(
            submission.status,
            SubmissionStatus::PendingAi | SubmissionStatus::AiReviewing
        ) {
            return Ok(submission);
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    Err(AppError::Io(std::io::Error::new(
        std::io::ErrorKind::TimedOut,
        "automated audit did not finish in time",
    )))
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        part_number,
        revision,
        fail_first_audit,
    } = args;

    println!("FAI review portal demo");
    println!("Checklist ({} slots):", requirements().len());
    for entry in requirements() {
        let flag = if entry.mandatory { "mandatory" } else { "optional " };
        println!("  [{flag}] {} -- {}", entry.doc_type.label(), entry.description);
    }

    let supplier = Actor::supplier("ABC Manufacturing");
    let reviewer = Actor::iqa("IQA Office");
    let service = DemoService::new(
        Arc::new(InMemorySubmissionRepository::default()),
        Arc::new(ConsoleGrader::new(fail_first_audit)),
    );

    let stored = service
        .submit(
            &supplier,
            SubmissionDraft {
                part_number,
                revision,
                files: demo_package(),
            },
        )
        .await?;
    print_submission("Package submitted", &stored);

    let mut audited = wait_for_audit(&service, &reviewer, &stored.id).await?;
    print_submission("Automated audit finished", &audited);

    if audited.status == SubmissionStatus::Rejected {
        // The simulated outage path: the audit failed closed and the supplier
        // recovers by resubmitting the same package.
        audited = service
            .resubmit(&supplier, &stored.id, demo_package())
            .await?;
        print_submission("Resubmitted after system rejection", &audited);
    }

    let rejected = service.record_decision(
        &reviewer,
        &stored.id,
        Verdict::Rejected,
        "FAI report dimension 4.2 out of tolerance; please correct and resubmit.",
    )?;
    print_submission("IQA verdict recorded", &rejected);

    let acknowledged = service.acknowledge_verdict(&supplier, &stored.id)?;
    print_submission("Supplier acknowledged the verdict", &acknowledged);

    let resubmitted = service
        .resubmit(&supplier, &stored.id, demo_package())
        .await?;
    print_submission("Corrected package resubmitted", &resubmitted);

    let approved = service.record_decision(
        &reviewer,
        &stored.id,
        Verdict::Approved,
        "Corrected report verified against the drawing.",
    )?;
    print_submission("Final IQA verdict", &approved);

    let queue = service.review_queue()?;
    println!("\nReview queue: {} submission(s) awaiting a decision", queue.len());

    let stats = service.dashboard_stats(Utc::now())?;
    println!(
        "Dashboard (trailing 30 days): total {} / approved {} / rejected {} / pending review {}",
        stats.total, stats.approved, stats.rejected, stats.pending_review
    );

    let listing = service.list_for_actor(&reviewer)?;
    println!("\nAttention-ordered listing:");
    for submission in &listing {
        println!(
            "  {} {} (part {} rev {})",
            submission.id.0,
            submission.status.label(),
            submission.part_number,
            submission.revision
        );
    }

    Ok(())
}
