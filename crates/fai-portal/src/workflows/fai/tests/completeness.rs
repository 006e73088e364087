use crate::workflows::fai::completeness::evaluate;
use crate::workflows::fai::domain::collapse_by_type;
use crate::workflows::fai::registry::DocType;

use super::common::{complete_uploads, upload};

#[test]
fn full_mandatory_set_is_complete() {
    let files = collapse_by_type(complete_uploads());
    let report = evaluate(&files);
    assert!(report.is_complete());
    assert!(report.missing.is_empty());
}

#[test]
fn missing_slots_are_reported_in_checklist_order() {
    let uploads = complete_uploads()
        .into_iter()
        .filter(|u| {
            u.doc_type != DocType::EngineeringDrawing && u.doc_type != DocType::PackagingReq
        })
        .collect();
    let files = collapse_by_type(uploads);

    let report = evaluate(&files);
    assert_eq!(
        report.missing,
        vec![DocType::EngineeringDrawing, DocType::PackagingReq]
    );
}

#[test]
fn optional_documents_do_not_substitute_for_mandatory_ones() {
    let files = collapse_by_type(vec![
        upload(DocType::CleanlinessReport, "application/pdf", Some(b"cleanliness")),
        upload(DocType::Bom, "application/pdf", Some(b"bom")),
    ]);

    let report = evaluate(&files);
    assert_eq!(report.missing.len(), 6);
}

#[test]
fn extra_optional_documents_leave_a_complete_set_complete() {
    let mut uploads = complete_uploads();
    uploads.push(upload(DocType::ReachCompliance, "application/pdf", Some(b"reach")));
    let files = collapse_by_type(uploads);

    assert!(evaluate(&files).is_complete());
    assert_eq!(files.len(), 7);
}

#[test]
fn repeated_type_collapses_to_the_last_upload() {
    let mut first = upload(DocType::EngineeringDrawing, "application/pdf", Some(b"v1"));
    first.name = "drawing-v1.pdf".to_string();
    let mut second = upload(DocType::EngineeringDrawing, "application/pdf", Some(b"v2"));
    second.name = "drawing-v2.pdf".to_string();

    let files = collapse_by_type(vec![first, second]);
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].name, "drawing-v2.pdf");
    assert_eq!(files[0].content.as_deref(), Some(b"v2".as_slice()));
}

#[test]
fn collapse_stamps_the_mandatory_flag_from_the_catalog() {
    let files = collapse_by_type(vec![
        upload(DocType::MaterialCert, "application/pdf", Some(b"cert")),
        upload(DocType::Bom, "application/pdf", Some(b"bom")),
    ]);
    assert!(files[0].is_mandatory);
    assert!(!files[1].is_mandatory);
}
