use super::error::NormalizeError;
use crate::config::Vocabulary;
use crate::models::{UNKNOWN, VinReportTexts};

const LEGAL_PERSON_LINE: usize = 3;
const RESTRICTIONS_LINE: usize = 6;

/// Ownership and legal flags from the VIN report.
#[derive(Debug, Clone, PartialEq)]
pub struct VinFacts {
    pub documents_cond: String,
    pub drivers_count: i32,
    pub was_driven_by_legal_person: bool,
    pub is_under_credit: bool,
}

impl Default for VinFacts {
    fn default() -> Self {
        Self {
            documents_cond: UNKNOWN.to_string(),
            drivers_count: -1,
            was_driven_by_legal_person: false,
            is_under_credit: false,
        }
    }
}

/// Reads the report only when its heading matches the known phrase;
/// otherwise every flag keeps its default.
pub fn parse_vin_report(
    report: Option<&VinReportTexts>,
    vocab: &Vocabulary,
) -> Result<VinFacts, NormalizeError> {
    let Some(report) = report else {
        return Ok(VinFacts::default());
    };
    if report.marker.trim() != vocab.vin_report_marker {
        return Ok(VinFacts::default());
    }

    let [documents, owners, ..] = report.quick_stats.as_slice() else {
        return Err(NormalizeError::MalformedVinReport(format!(
            "{} quick stats, need 2",
            report.quick_stats.len()
        )));
    };

    let drivers_count: i32 = owners
        .split_whitespace()
        .next()
        .and_then(|n| n.parse().ok())
        .ok_or_else(|| NormalizeError::MalformedVinReport(format!("owner count {:?}", owners)))?;

    let line = |i: usize| {
        report
            .lines
            .get(i)
            .map(|l| l.trim())
            .ok_or_else(|| {
                NormalizeError::MalformedVinReport(format!(
                    "{} report lines, need {}",
                    report.lines.len(),
                    i + 1
                ))
            })
    };

    // Kept as the site scrapes it: matching the phrase yields false.
    let was_driven_by_legal_person = line(LEGAL_PERSON_LINE)? != vocab.legal_person_phrase;
    let is_under_credit = line(RESTRICTIONS_LINE)? == vocab.no_restrictions_phrase;

    Ok(VinFacts {
        documents_cond: documents.trim().to_string(),
        drivers_count,
        was_driven_by_legal_person,
        is_under_credit,
    })
}
