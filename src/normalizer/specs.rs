use super::cleaner::{leading_number, parse_litres, strip_spaces};
use super::error::NormalizeError;
use crate::config::Vocabulary;
use crate::models::UNKNOWN;
use std::collections::BTreeMap;

/// Engine, drivetrain and body fields shared by both spec layouts.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSpecs {
    pub mileage: u64,
    pub engine_capacity: Option<f64>,
    pub engine_power: u32,
    pub fuel_type: String,
    pub wd: String,
    pub transmission: String,
    pub body: String,
    pub color: String,
    pub steering_wheel_pos: String,
    pub generation: String,
    pub without_mileage_in_rf: Option<bool>,
}

fn label_or_unknown(table: &BTreeMap<String, String>, label: &str) -> String {
    table
        .get(label)
        .map(|v| v.trim().to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

// ── Compact card list ─────────────────────────────────────────────────────────

/// Positional card specs:
/// `["2.0 л (150 л.с.),", "бензин,", "автомат,", "передний,", "45 000 км"]`
/// The mileage item is missing for new cars.
pub fn parse_compact_specs(
    items: &[String],
    details: &BTreeMap<String, String>,
    vocab: &Vocabulary,
) -> Result<EngineSpecs, NormalizeError> {
    if !(4..=5).contains(&items.len()) {
        return Err(NormalizeError::spec(
            &items.join(" | "),
            "expected 4 or 5 spec items",
        ));
    }

    let (engine_capacity, engine_power) = parse_engine_item(&items[0])?;

    let mileage = match items.get(4) {
        Some(item) => parse_card_mileage(item)?,
        None => 0,
    };

    let transmission = details
        .get(&vocab.label_transmission)
        .map(|v| v.trim().to_string())
        .unwrap_or_else(|| items[2].trim().trim_end_matches([',', ' ']).to_string());

    Ok(EngineSpecs {
        mileage,
        engine_capacity: Some(engine_capacity),
        engine_power,
        fuel_type: items[1].trim().trim_end_matches(',').to_string(),
        wd: items[3].trim().trim_end_matches(',').to_string(),
        transmission,
        body: label_or_unknown(details, &vocab.label_body),
        color: label_or_unknown(details, &vocab.label_color),
        steering_wheel_pos: label_or_unknown(details, &vocab.label_steering),
        generation: label_or_unknown(details, &vocab.label_generation),
        without_mileage_in_rf: None,
    })
}

/// "2.0 л (150 л.с.)," → (2.0, 150)
fn parse_engine_item(item: &str) -> Result<(f64, u32), NormalizeError> {
    let trimmed = item.trim().trim_end_matches(',');
    let parts: Vec<&str> = trimmed.split(" (").collect();
    let [capacity, power] = parts.as_slice() else {
        return Err(NormalizeError::spec(item, "engine item is not \"<l> (<hp>)\""));
    };

    let capacity =
        parse_litres(capacity).ok_or_else(|| NormalizeError::spec(item, "bad capacity"))?;
    let power: u32 = power
        .trim_matches(|c: char| " л.с.)".contains(c) || c.is_whitespace())
        .parse()
        .map_err(|_| NormalizeError::spec(item, "bad power"))?;

    Ok((capacity, power))
}

/// "45 000 км" → 45000
fn parse_card_mileage(item: &str) -> Result<u64, NormalizeError> {
    let number = item
        .trim()
        .trim_end_matches(',')
        .trim_end_matches(|c: char| c == 'к' || c == 'м' || c.is_whitespace());
    strip_spaces(number)
        .parse()
        .map_err(|_| NormalizeError::spec(item, "bad mileage"))
}

// ── Extended detail table ─────────────────────────────────────────────────────

/// Detail-view label → value table. Fails as a whole: one bad value and the
/// listing is dropped.
pub fn parse_extended_specs(
    table: &BTreeMap<String, String>,
    vocab: &Vocabulary,
) -> Result<EngineSpecs, NormalizeError> {
    let (mileage, without_mileage_in_rf) = match table.get(&vocab.label_mileage) {
        Some(value) => parse_detail_mileage(&vocab.label_mileage, value, vocab)?,
        None => (0, None),
    };

    let power_raw = required(table, &vocab.label_power)?;
    let engine_power = leading_number(power_raw)
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| NormalizeError::unparsable(&vocab.label_power, power_raw, "no number"))?;

    let engine_raw = required(table, &vocab.label_engine)?;
    let (fuel_type, engine_capacity) = parse_engine_descriptor(engine_raw, vocab)?;

    let wd = required(table, &vocab.label_drivetrain)?.to_string();

    Ok(EngineSpecs {
        mileage,
        engine_capacity,
        engine_power,
        fuel_type,
        wd,
        transmission: label_or_unknown(table, &vocab.label_transmission),
        body: label_or_unknown(table, &vocab.label_body),
        color: label_or_unknown(table, &vocab.label_color),
        steering_wheel_pos: label_or_unknown(table, &vocab.label_steering),
        generation: label_or_unknown(table, &vocab.label_generation),
        without_mileage_in_rf,
    })
}

fn required<'a>(table: &'a BTreeMap<String, String>, label: &str) -> Result<&'a str, NormalizeError> {
    table
        .get(label)
        .map(|v| v.trim())
        .ok_or_else(|| NormalizeError::unparsable(label, "", "missing"))
}

fn parse_detail_mileage(
    label: &str,
    value: &str,
    vocab: &Vocabulary,
) -> Result<(u64, Option<bool>), NormalizeError> {
    let value = value.trim();
    if value == vocab.new_vehicle {
        return Ok((0, None));
    }

    let km = leading_number(value)
        .ok_or_else(|| NormalizeError::unparsable(label, value, "no number"))?;

    if value.ends_with(vocab.no_domestic_mileage.as_str()) {
        Ok((km, Some(true)))
    } else {
        Ok((km, None))
    }
}

/// "бензин, 2.0 л" | "бензин, 1.5 л, гибрид" | "электро"
fn parse_engine_descriptor(
    value: &str,
    vocab: &Vocabulary,
) -> Result<(String, Option<f64>), NormalizeError> {
    if value == vocab.electric {
        return Ok((value.to_string(), None));
    }

    let parts: Vec<&str> = value.split(", ").map(str::trim).collect();
    let (fuel, capacity) = match parts.as_slice() {
        [fuel, capacity] => (*fuel, *capacity),
        [_, capacity, fuel_override] => (*fuel_override, *capacity),
        _ => {
            return Err(NormalizeError::unparsable(
                &vocab.label_engine,
                value,
                "expected \"<fuel>, <litres>[, <kind>]\"",
            ));
        }
    };

    let capacity = parse_litres(capacity)
        .ok_or_else(|| NormalizeError::unparsable(&vocab.label_engine, value, "bad capacity"))?;

    Ok((fuel.to_string(), Some(capacity)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn table(rows: &[(&str, &str)]) -> BTreeMap<String, String> {
        rows.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn base_table() -> BTreeMap<String, String> {
        table(&[
            ("Двигатель", "бензин, 2.0 л"),
            ("Мощность", "150 л.с., налог"),
            ("Привод", "передний"),
        ])
    }

    #[test]
    fn test_compact_five_items() {
        let items = strings(&["2.0 л (150 л.с.),", "бензин,", "автомат,", "передний,", "45 000 км"]);
        let specs = parse_compact_specs(&items, &BTreeMap::new(), &Vocabulary::default()).unwrap();

        assert_eq!(specs.engine_capacity, Some(2.0));
        assert_eq!(specs.engine_power, 150);
        assert_eq!(specs.fuel_type, "бензин");
        assert_eq!(specs.transmission, "автомат");
        assert_eq!(specs.wd, "передний");
        assert_eq!(specs.mileage, 45_000);
        assert_eq!(specs.body, "-");
        assert_eq!(specs.without_mileage_in_rf, None);
    }

    #[test]
    fn test_compact_four_items_means_new() {
        let items = strings(&["1.6 л (106 л.с.),", "бензин,", "механика,", "передний"]);
        let specs = parse_compact_specs(&items, &BTreeMap::new(), &Vocabulary::default()).unwrap();
        assert_eq!(specs.mileage, 0);
        assert_eq!(specs.wd, "передний");
    }

    #[test]
    fn test_compact_nbsp_mileage() {
        let items = strings(&["2.5 л (181 л.с.),", "бензин,", "АКПП,", "4WD,", "120\u{a0}500\u{a0}км"]);
        let specs = parse_compact_specs(&items, &BTreeMap::new(), &Vocabulary::default()).unwrap();
        assert_eq!(specs.mileage, 120_500);
    }

    #[test]
    fn test_compact_details_fill_and_override() {
        let items = strings(&["2.0 л (150 л.с.),", "бензин,", "автомат,", "передний,", "45 000 км"]);
        let details = table(&[
            ("Коробка передач", "вариатор"),
            ("Тип кузова", "седан"),
            ("Цвет", "белый"),
        ]);
        let specs = parse_compact_specs(&items, &details, &Vocabulary::default()).unwrap();
        assert_eq!(specs.transmission, "вариатор");
        assert_eq!(specs.body, "седан");
        assert_eq!(specs.color, "белый");
        assert_eq!(specs.steering_wheel_pos, "-");
    }

    #[test]
    fn test_compact_wrong_length() {
        let items = strings(&["2.0 л (150 л.с.),", "бензин,", "автомат,"]);
        let err = parse_compact_specs(&items, &BTreeMap::new(), &Vocabulary::default()).unwrap_err();
        assert_eq!(err.kind(), "malformed_spec");
    }

    #[test]
    fn test_compact_engine_without_split() {
        let items = strings(&["электро,", "электро,", "автомат,", "передний"]);
        let err = parse_compact_specs(&items, &BTreeMap::new(), &Vocabulary::default()).unwrap_err();
        assert!(matches!(err, NormalizeError::MalformedSpec { .. }));
    }

    #[test]
    fn test_extended_new_vehicle() {
        let mut t = base_table();
        t.insert("Пробег".into(), "новый автомобиль".into());
        let specs = parse_extended_specs(&t, &Vocabulary::default()).unwrap();
        assert_eq!(specs.mileage, 0);
        assert_eq!(specs.without_mileage_in_rf, None);
    }

    #[test]
    fn test_extended_no_domestic_mileage() {
        let mut t = base_table();
        t.insert("Пробег".into(), "10 000 км, без пробега по РФ".into());
        let specs = parse_extended_specs(&t, &Vocabulary::default()).unwrap();
        assert_eq!(specs.mileage, 10_000);
        assert_eq!(specs.without_mileage_in_rf, Some(true));
    }

    #[test]
    fn test_extended_plain_mileage_and_defaults() {
        let mut t = base_table();
        t.insert("Пробег".into(), "87 000 км".into());
        let specs = parse_extended_specs(&t, &Vocabulary::default()).unwrap();
        assert_eq!(specs.mileage, 87_000);
        assert_eq!(specs.engine_power, 150);
        assert_eq!(specs.engine_capacity, Some(2.0));
        assert_eq!(specs.fuel_type, "бензин");
        assert_eq!(specs.body, "-");
        assert_eq!(specs.transmission, "-");
    }

    #[test]
    fn test_extended_electric() {
        let mut t = base_table();
        t.insert("Двигатель".into(), "электро".into());
        let specs = parse_extended_specs(&t, &Vocabulary::default()).unwrap();
        assert_eq!(specs.fuel_type, "электро");
        assert_eq!(specs.engine_capacity, None);
    }

    #[test]
    fn test_extended_fuel_override() {
        let mut t = base_table();
        t.insert("Двигатель".into(), "бензин, 1.5 л, гибрид".into());
        let specs = parse_extended_specs(&t, &Vocabulary::default()).unwrap();
        assert_eq!(specs.fuel_type, "гибрид");
        assert_eq!(specs.engine_capacity, Some(1.5));
    }

    #[test]
    fn test_extended_missing_power_discards() {
        let mut t = base_table();
        t.remove("Мощность");
        let err = parse_extended_specs(&t, &Vocabulary::default()).unwrap_err();
        assert_eq!(err.kind(), "unparsable_listing");
    }

    #[test]
    fn test_extended_bad_engine_discards() {
        let mut t = base_table();
        t.insert("Двигатель".into(), "бензин".into());
        let err = parse_extended_specs(&t, &Vocabulary::default()).unwrap_err();
        assert!(matches!(err, NormalizeError::UnparsableListing { .. }));
    }
}
