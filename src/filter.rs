use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::{Metric, SkillRecord};

/// Inclusive bounds on one metric; a missing side is unbounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeConstraint {
    pub metric: Metric,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl RangeConstraint {
    pub fn contains(&self, value: f64) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }
}

impl FromStr for RangeConstraint {
    type Err = String;

    /// `metric:min:max`, e.g. `risk:0.5:` or `half_life::3`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        let [metric, min, max] = parts.as_slice() else {
            return Err(format!("expected metric:min:max, got '{s}'"));
        };

        let bound = |raw: &str| -> Result<Option<f64>, String> {
            let raw = raw.trim();
            if raw.is_empty() {
                return Ok(None);
            }
            match raw.parse::<f64>() {
                Ok(value) if value.is_finite() => Ok(Some(value)),
                _ => Err(format!("invalid bound '{raw}'")),
            }
        };

        let constraint = RangeConstraint {
            metric: metric.parse()?,
            min: bound(*min)?,
            max: bound(*max)?,
        };
        if let (Some(min), Some(max)) = (constraint.min, constraint.max) {
            if min > max {
                return Err(format!("range minimum {min} exceeds maximum {max}"));
            }
        }
        Ok(constraint)
    }
}

/// Selection made by the user for one dashboard interaction. Empty sets
/// place no constraint on their field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    #[serde(default)]
    pub industries: BTreeSet<String>,
    #[serde(default)]
    pub categories: BTreeSet<String>,
    #[serde(default)]
    pub ranges: Vec<RangeConstraint>,
}

impl FilterSpec {
    pub fn with_industries<I, S>(mut self, industries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.industries.extend(industries.into_iter().map(Into::into));
        self
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories.extend(categories.into_iter().map(Into::into));
        self
    }

    pub fn with_range(mut self, range: RangeConstraint) -> Self {
        self.ranges.push(range);
        self
    }

    pub fn is_noop(&self) -> bool {
        self.industries.is_empty() && self.categories.is_empty() && self.ranges.is_empty()
    }

    pub fn matches(&self, record: &SkillRecord) -> bool {
        (self.industries.is_empty() || self.industries.contains(&record.industry))
            && (self.categories.is_empty() || self.categories.contains(&record.category))
            && self
                .ranges
                .iter()
                .all(|range| range.contains(record.value(range.metric)))
    }

    /// Canonical serialized form; sets are ordered so equal specs share a key.
    pub fn cache_key(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{self:?}"))
    }

    pub fn describe(&self) -> String {
        if self.is_noop() {
            return "all skills".to_string();
        }
        let mut parts = Vec::new();
        if !self.industries.is_empty() {
            let names: Vec<&str> = self.industries.iter().map(String::as_str).collect();
            parts.push(format!("industry in [{}]", names.join(", ")));
        }
        if !self.categories.is_empty() {
            let names: Vec<&str> = self.categories.iter().map(String::as_str).collect();
            parts.push(format!("category in [{}]", names.join(", ")));
        }
        for range in &self.ranges {
            let min = range.min.map_or("-inf".to_string(), |v| v.to_string());
            let max = range.max.map_or("+inf".to_string(), |v| v.to_string());
            parts.push(format!("{} in [{min}, {max}]", range.metric));
        }
        parts.join("; ")
    }
}

/// Records satisfying every predicate of `spec`, in dataset order.
pub fn filter<'a>(dataset: &'a [SkillRecord], spec: &FilterSpec) -> Vec<&'a SkillRecord> {
    let selected: Vec<&SkillRecord> = dataset.iter().filter(|r| spec.matches(r)).collect();
    tracing::debug!(
        total = dataset.len(),
        selected = selected.len(),
        filter = %spec.describe(),
        "filtered dataset"
    );
    selected
}
