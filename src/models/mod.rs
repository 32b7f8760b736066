use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ── Normalized listing ────────────────────────────────────────────────────────

/// One accepted listing. Field order is the CSV column order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListingRecord {
    pub brand: String,
    pub model: String,
    pub year: u16,
    pub price: u64,
    pub mileage: u64, // km, 0 for new / unspecified
    pub engine_capacity: Option<f64>, // litres, None for electric
    pub engine_power: u32, // hp
    pub fuel_type: String,
    pub wd: String,
    pub transmission: String,
    pub body: String,
    pub color: String,
    pub steering_wheel_pos: String,
    pub generation: String,
    pub documents_cond: String,
    pub drivers_count: i32, // -1 when unknown
    pub was_driven_by_legal_person: bool,
    pub is_under_credit: bool,
    #[serde(rename = "without_mileage_in_RF")]
    pub without_mileage_in_rf: Option<bool>,
    pub description_len: Option<usize>,
}

/// Placeholder for string fields the listing does not state.
pub const UNKNOWN: &str = "-";

// ── Raw spec bundle ───────────────────────────────────────────────────────────

/// Raw text fragments captured from one listing, before any parsing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SpecBundle {
    /// Only used to identify the listing in logs.
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub price: String,
    pub specs: SpecSource,
    #[serde(default)]
    pub vin_report: Option<VinReportTexts>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Which layout the specs were scraped from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "schema", rename_all = "snake_case")]
pub enum SpecSource {
    /// Search-results card: positional spec strings, plus whatever the
    /// detail table contributed (may be empty).
    Compact {
        items: Vec<String>,
        #[serde(default)]
        details: BTreeMap<String, String>,
    },
    /// Detail view: label → value table.
    Extended { table: BTreeMap<String, String> },
}

impl Default for SpecSource {
    fn default() -> Self {
        SpecSource::Compact {
            items: Vec::new(),
            details: BTreeMap::new(),
        }
    }
}

impl SpecSource {
    pub fn schema_name(&self) -> &'static str {
        match self {
            SpecSource::Compact { .. } => "compact",
            SpecSource::Extended { .. } => "extended",
        }
    }
}

/// Texts of the VIN report block on a detail page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct VinReportTexts {
    /// Heading text; the report only counts when it matches the known phrase.
    pub marker: String,
    /// Button texts of the quick-stat tiles (documents, owners).
    #[serde(default)]
    pub quick_stats: Vec<String>,
    /// Texts of every report element, in page order.
    #[serde(default)]
    pub lines: Vec<String>,
}
