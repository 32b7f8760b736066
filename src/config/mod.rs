use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub vocabulary: Vocabulary,
    pub selectors: Selectors,
    pub output: OutputConfig,
    pub pipeline: PipelineConfig,
}

/// Site strings the normalizer matches against: table labels and sentinels.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Vocabulary {
    pub label_mileage: String,
    pub label_power: String,
    pub label_engine: String,
    pub label_drivetrain: String,
    pub label_transmission: String,
    pub label_body: String,
    pub label_color: String,
    pub label_steering: String,
    pub label_generation: String,

    pub new_vehicle: String,
    pub no_domestic_mileage: String,
    pub electric: String,
    pub vin_report_marker: String,
    pub legal_person_phrase: String,
    pub no_restrictions_phrase: String,
}

/// CSS selectors for saved drom pages
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Selectors {
    pub card: String,
    pub card_title: String,
    pub card_spec_item: String,
    pub card_link: String,
    pub price: String,

    pub detail_title: String,
    pub detail_title_prefix: String,
    pub spec_table_row: String,
    pub vin_marker: String,
    pub vin_item: String,
    pub description: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub csv_path: PathBuf,
    pub append: bool,
}

/// Pipeline configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Saved pages parsed at once
    pub concurrency: usize,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            label_mileage: "Пробег".into(),
            label_power: "Мощность".into(),
            label_engine: "Двигатель".into(),
            label_drivetrain: "Привод".into(),
            label_transmission: "Коробка передач".into(),
            label_body: "Тип кузова".into(),
            label_color: "Цвет".into(),
            label_steering: "Руль".into(),
            label_generation: "Поколение".into(),

            new_vehicle: "новый автомобиль".into(),
            no_domestic_mileage: "без пробега по РФ".into(),
            electric: "электро".into(),
            vin_report_marker: "Отчёт о проверке по VIN".into(),
            legal_person_phrase: "Был во владении у юр. лица".into(),
            no_restrictions_phrase: "Ограничений не обнаружено".into(),
        }
    }
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            card: ".css-4zflqt.e1huvdhj1".into(),
            card_title: ".css-16kqa8y.e3f4v4l2".into(),
            card_spec_item: r#"span[data-ftid="bull_description-item"]"#.into(),
            card_link: "a[href]".into(),
            price: r#"[data-ftid="bull_price"]"#.into(),

            detail_title: "h1".into(),
            detail_title_prefix: "Продажа ".into(),
            spec_table_row: ".css-xalqz7.eppj3wm0 tbody tr".into(),
            vin_marker: r#"[data-ftid="vin-report-title"]"#.into(),
            vin_item: ".css-z05wok.eawu4md2".into(),
            description: r#"[data-ftid="info-description"]"#.into(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from("data/listings.csv"),
            append: true,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { concurrency: 4 }
    }
}

// ── Loader ───────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from file + environment overrides
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(config::Environment::with_prefix("DROM").separator("__"))
            .build()?;

        let app_cfg = cfg.try_deserialize().unwrap_or_else(|e| {
            warn!("Config invalid ({}), using defaults", e);
            AppConfig::default()
        });
        Ok(app_cfg)
    }
}
