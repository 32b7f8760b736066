//! Raw listing text → [`ListingRecord`].
//!
//! Each stage (title, price, specs, VIN report) returns its own `Result`; the
//! first failure rejects the whole listing. Nothing here does I/O, so the same
//! bundle always normalizes to the same record.

pub mod cleaner;
pub mod error;
pub mod specs;
pub mod vin;

use crate::config::Vocabulary;
use crate::models::{ListingRecord, SpecBundle, SpecSource};

pub use self::error::NormalizeError;

use self::cleaner::{parse_price, parse_title};
use self::specs::{parse_compact_specs, parse_extended_specs};
use self::vin::parse_vin_report;

pub struct ListingNormalizer {
    vocab: Vocabulary,
}

impl Default for ListingNormalizer {
    fn default() -> Self {
        Self::new(Vocabulary::default())
    }
}

impl ListingNormalizer {
    pub fn new(vocab: Vocabulary) -> Self {
        Self { vocab }
    }

    pub fn normalize(&self, bundle: &SpecBundle) -> Result<ListingRecord, NormalizeError> {
        let title = parse_title(&bundle.title)?;
        let price = parse_price(&bundle.price)?;

        let specs = match &bundle.specs {
            SpecSource::Compact { items, details } => {
                parse_compact_specs(items, details, &self.vocab)?
            }
            SpecSource::Extended { table } => parse_extended_specs(table, &self.vocab)?,
        };

        let vin = parse_vin_report(bundle.vin_report.as_ref(), &self.vocab)?;

        Ok(ListingRecord {
            brand: title.brand,
            model: title.model,
            year: title.year,
            price,
            mileage: specs.mileage,
            engine_capacity: specs.engine_capacity,
            engine_power: specs.engine_power,
            fuel_type: specs.fuel_type,
            wd: specs.wd,
            transmission: specs.transmission,
            body: specs.body,
            color: specs.color,
            steering_wheel_pos: specs.steering_wheel_pos,
            generation: specs.generation,
            documents_cond: vin.documents_cond,
            drivers_count: vin.drivers_count,
            was_driven_by_legal_person: vin.was_driven_by_legal_person,
            is_under_credit: vin.is_under_credit,
            without_mileage_in_rf: specs.without_mileage_in_rf,
            description_len: bundle.description.as_ref().map(|d| d.chars().count()),
        })
    }

    /// Normalize independently, keeping each outcome next to its listing id.
    pub fn normalize_all<'a>(
        &self,
        bundles: &'a [SpecBundle],
    ) -> Vec<(&'a str, Result<ListingRecord, NormalizeError>)> {
        bundles
            .iter()
            .map(|b| (b.id.as_str(), self.normalize(b)))
            .collect()
    }
}
