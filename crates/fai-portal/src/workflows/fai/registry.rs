use serde::{Deserialize, Serialize};

/// Closed enumeration of document kinds accepted in an FAI package.
///
/// The serialized form matches the wording printed on the supplier checklist,
/// and the analysis collaborator is instructed to echo these exact strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DocType {
    #[serde(rename = "Engineering Drawing")]
    EngineeringDrawing,
    #[serde(rename = "Process Management Plan")]
    ProcessManagementPlan,
    #[serde(rename = "FAI Report (Supplier)")]
    FaiReportSupplier,
    #[serde(rename = "Material Certification & CoC")]
    MaterialCert,
    #[serde(rename = "RoHS Certification")]
    RohsDeclaration,
    #[serde(rename = "Packaging Requirements")]
    PackagingReq,
    #[serde(rename = "Cleanliness Report")]
    CleanlinessReport,
    #[serde(rename = "REACH Compliance")]
    ReachCompliance,
    #[serde(rename = "Bill of Materials")]
    Bom,
}

impl DocType {
    pub const fn label(self) -> &'static str {
        match self {
            DocType::EngineeringDrawing => "Engineering Drawing",
            DocType::ProcessManagementPlan => "Process Management Plan",
            DocType::FaiReportSupplier => "FAI Report (Supplier)",
            DocType::MaterialCert => "Material Certification & CoC",
            DocType::RohsDeclaration => "RoHS Certification",
            DocType::PackagingReq => "Packaging Requirements",
            DocType::CleanlinessReport => "Cleanliness Report",
            DocType::ReachCompliance => "REACH Compliance",
            DocType::Bom => "Bill of Materials",
        }
    }
}

impl std::fmt::Display for DocType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Catalog entry describing one document slot in the package checklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DocumentRequirement {
    pub doc_type: DocType,
    pub mandatory: bool,
    pub description: &'static str,
}

/// The checklist, in the order it is presented to suppliers. Mandatory slots
/// first, situational ones after.
const REQUIREMENTS: &[DocumentRequirement] = &[
    DocumentRequirement {
        doc_type: DocType::EngineeringDrawing,
        mandatory: true,
        description: "Including annotation/numbering of features",
    },
    DocumentRequirement {
        doc_type: DocType::ProcessManagementPlan,
        mandatory: true,
        description: "Full manufacturing process flow",
    },
    DocumentRequirement {
        doc_type: DocType::FaiReportSupplier,
        mandatory: true,
        description: "Initial measurement data",
    },
    DocumentRequirement {
        doc_type: DocType::MaterialCert,
        mandatory: true,
        description: "Material Certification and CoC",
    },
    DocumentRequirement {
        doc_type: DocType::RohsDeclaration,
        mandatory: true,
        description: "RoHS Compliance status",
    },
    DocumentRequirement {
        doc_type: DocType::PackagingReq,
        mandatory: true,
        description: "Defined requirements for shipping",
    },
    DocumentRequirement {
        doc_type: DocType::CleanlinessReport,
        mandatory: false,
        description: "IC, NVR, FTIR, Flatness (When required)",
    },
    DocumentRequirement {
        doc_type: DocType::ReachCompliance,
        mandatory: false,
        description: "REACH Compliance status (If applicable)",
    },
    DocumentRequirement {
        doc_type: DocType::Bom,
        mandatory: false,
        description: "Bill of Materials List (If applicable)",
    },
];

/// Full checklist in presentation order.
pub fn requirements() -> &'static [DocumentRequirement] {
    REQUIREMENTS
}

pub fn requirement(doc_type: DocType) -> &'static DocumentRequirement {
    REQUIREMENTS
        .iter()
        .find(|entry| entry.doc_type == doc_type)
        .expect("every DocType has a catalog entry")
}

pub fn is_mandatory(doc_type: DocType) -> bool {
    requirement(doc_type).mandatory
}

/// The mandatory slots, in checklist order.
pub fn mandatory_types() -> impl Iterator<Item = DocType> {
    REQUIREMENTS
        .iter()
        .filter(|entry| entry.mandatory)
        .map(|entry| entry.doc_type)
}
