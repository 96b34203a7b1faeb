use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::config::DatasetConfig;
use crate::error::{AnalyticsError, Result};
use crate::models::{Metric, SkillRecord};

/// One row of the dataset file. Every column is optional here so a missing
/// value surfaces as a schema error naming the field. Errors name the
/// `SkillRecord` field, not the file column.
#[derive(Debug, Deserialize)]
struct CsvRow {
    skill_name: Option<String>,
    skill_category: Option<String>,
    industry: Option<String>,
    ai_exposure_level: Option<f64>,
    automation_risk: Option<f64>,
    current_market_demand: Option<f64>,
    skill_half_life_years: Option<f64>,
    reskilling_frequency_years: Option<f64>,
}

fn required_text(row: usize, field: &'static str, value: Option<String>) -> Result<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AnalyticsError::schema(row, field, "is missing")),
    }
}

fn required_number(row: usize, metric: Metric, value: Option<f64>) -> Result<f64> {
    let field = metric.as_str();
    match value {
        Some(v) if v.is_finite() => Ok(v),
        Some(v) => Err(AnalyticsError::schema(row, field, format!("is not finite ({v})"))),
        None => Err(AnalyticsError::schema(row, field, "is missing")),
    }
}

impl CsvRow {
    fn into_record(self, row: usize, percent_scale: bool) -> Result<SkillRecord> {
        let scale = if percent_scale { 100.0 } else { 1.0 };
        let record = SkillRecord {
            skill_name: required_text(row, "skill_name", self.skill_name)?,
            industry: required_text(row, "industry", self.industry)?,
            category: required_text(row, "category", self.skill_category)?,
            half_life_years: required_number(row, Metric::HalfLife, self.skill_half_life_years)?,
            ai_exposure: required_number(row, Metric::AiExposure, self.ai_exposure_level)? / scale,
            automation_risk: required_number(row, Metric::AutomationRisk, self.automation_risk)?
                / scale,
            market_demand: required_number(row, Metric::MarketDemand, self.current_market_demand)?
                / scale,
            reskilling_frequency: required_number(
                row,
                Metric::ReskillingFrequency,
                self.reskilling_frequency_years,
            )?,
        };
        validate_record(row, &record)?;
        Ok(record)
    }
}

/// Range checks shared by every source of records.
pub fn validate_record(row: usize, record: &SkillRecord) -> Result<()> {
    if record.skill_name.trim().is_empty() {
        return Err(AnalyticsError::schema(row, "skill_name", "is empty"));
    }
    for metric in Metric::ALL {
        let value = record.value(metric);
        if !value.is_finite() {
            return Err(AnalyticsError::schema(
                row,
                metric.as_str(),
                format!("is not finite ({value})"),
            ));
        }
        if metric.is_unit_interval() && !(0.0..=1.0).contains(&value) {
            return Err(AnalyticsError::schema(
                row,
                metric.as_str(),
                format!("{value} is outside [0, 1]"),
            ));
        }
    }
    if record.half_life_years <= 0.0 {
        return Err(AnalyticsError::schema(
            row,
            Metric::HalfLife.as_str(),
            format!("{} must be positive", record.half_life_years),
        ));
    }
    if record.reskilling_frequency < 0.0 {
        return Err(AnalyticsError::schema(
            row,
            Metric::ReskillingFrequency.as_str(),
            format!("{} must not be negative", record.reskilling_frequency),
        ));
    }
    Ok(())
}

/// Snapshot-level checks: unique names and, when configured, known industries.
pub fn validate_dataset(records: &[SkillRecord], options: &DatasetConfig) -> Result<()> {
    let allowed: HashSet<&str> = options
        .allowed_industries
        .iter()
        .map(String::as_str)
        .collect();
    let mut seen: HashSet<&str> = HashSet::new();

    for (index, record) in records.iter().enumerate() {
        let row = index + 1;
        validate_record(row, record)?;
        if !seen.insert(record.skill_name.as_str()) {
            return Err(AnalyticsError::schema(
                row,
                "skill_name",
                format!("duplicates '{}'", record.skill_name),
            ));
        }
        if !allowed.is_empty() && !allowed.contains(record.industry.as_str()) {
            return Err(AnalyticsError::schema(
                row,
                "industry",
                format!("'{}' is not an allowed industry", record.industry),
            ));
        }
    }
    Ok(())
}

pub fn load_reader<R: Read>(reader: R, options: &DatasetConfig) -> Result<Vec<SkillRecord>> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut records = Vec::new();

    reader.headers()?;

    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = index + 1;
        let raw = result.map_err(|err| {
            if matches!(err.kind(), csv::ErrorKind::Deserialize { .. }) {
                AnalyticsError::schema(row, "record", err.to_string())
            } else {
                AnalyticsError::Csv(err)
            }
        })?;
        records.push(raw.into_record(row, options.percent_scale)?);
    }

    validate_dataset(&records, options)?;
    Ok(records)
}

/// Loads and validates a dataset file; any bad row rejects the whole load.
pub fn load_csv(path: &Path, options: &DatasetConfig) -> Result<Vec<SkillRecord>> {
    let file = std::fs::File::open(path)?;
    let records = load_reader(file, options)?;
    tracing::info!(path = %path.display(), records = records.len(), "loaded dataset");
    Ok(records)
}
