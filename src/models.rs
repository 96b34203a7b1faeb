use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillRecord {
    pub skill_name: String,
    pub industry: String,
    pub category: String,
    pub half_life_years: f64,
    pub ai_exposure: f64,
    pub automation_risk: f64,
    pub market_demand: f64,
    pub reskilling_frequency: f64,
}

impl SkillRecord {
    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::HalfLife => self.half_life_years,
            Metric::AiExposure => self.ai_exposure,
            Metric::AutomationRisk => self.automation_risk,
            Metric::MarketDemand => self.market_demand,
            Metric::ReskillingFrequency => self.reskilling_frequency,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    HalfLife,
    AiExposure,
    AutomationRisk,
    MarketDemand,
    ReskillingFrequency,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::HalfLife,
        Metric::AiExposure,
        Metric::AutomationRisk,
        Metric::MarketDemand,
        Metric::ReskillingFrequency,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Metric::HalfLife => "half_life_years",
            Metric::AiExposure => "ai_exposure",
            Metric::AutomationRisk => "automation_risk",
            Metric::MarketDemand => "market_demand",
            Metric::ReskillingFrequency => "reskilling_frequency",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::HalfLife => "Skill half-life (years)",
            Metric::AiExposure => "AI exposure",
            Metric::AutomationRisk => "Automation risk",
            Metric::MarketDemand => "Market demand",
            Metric::ReskillingFrequency => "Reskilling interval (years)",
        }
    }

    /// Metrics bounded to [0, 1].
    pub fn is_unit_interval(self) -> bool {
        matches!(
            self,
            Metric::AiExposure | Metric::AutomationRisk | Metric::MarketDemand
        )
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "half_life" | "half_life_years" | "skill_half_life_years" => Ok(Metric::HalfLife),
            "exposure" | "ai_exposure" | "ai_exposure_level" => Ok(Metric::AiExposure),
            "risk" | "automation_risk" => Ok(Metric::AutomationRisk),
            "demand" | "market_demand" | "current_market_demand" => Ok(Metric::MarketDemand),
            "reskilling" | "reskilling_frequency" | "reskilling_frequency_years" => {
                Ok(Metric::ReskillingFrequency)
            }
            other => Err(format!("unknown metric '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Band {
    Low,
    Medium,
    High,
}

impl Band {
    pub const LOW_CEILING: f64 = 0.40;
    pub const MEDIUM_CEILING: f64 = 0.70;

    pub fn classify(value: f64) -> Band {
        if value <= Self::LOW_CEILING {
            Band::Low
        } else if value <= Self::MEDIUM_CEILING {
            Band::Medium
        } else {
            Band::High
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Band::Low => "Low",
            Band::Medium => "Medium",
            Band::High => "High",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortKey {
    pub metric: Metric,
    pub descending: bool,
}

impl Default for SortKey {
    fn default() -> Self {
        Self {
            metric: Metric::AutomationRisk,
            descending: true,
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    /// `metric` or `metric:asc` / `metric:desc`; descending when omitted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (metric, direction) = match s.split_once(':') {
            Some((metric, direction)) => (metric, Some(direction)),
            None => (s, None),
        };
        let descending = match direction.map(|d| d.trim().to_ascii_lowercase()) {
            None => true,
            Some(d) if d == "desc" => true,
            Some(d) if d == "asc" => false,
            Some(d) => return Err(format!("unknown sort direction '{d}'")),
        };
        Ok(SortKey {
            metric: metric.parse()?,
            descending,
        })
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = if self.descending { "desc" } else { "asc" };
        write!(f, "{}:{}", self.metric, direction)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedSkill {
    pub rank: usize,
    pub skill_name: String,
    pub industry: String,
    pub category: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpis {
    pub mean_half_life_years: f64,
    pub high_exposure_share: f64,
    pub mean_reskilling_interval_years: f64,
    pub high_automation_risk_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub count: usize,
    pub metrics: BTreeMap<Metric, MetricSummary>,
    pub sort_key: SortKey,
    pub ranking: Vec<RankedSkill>,
    pub kpis: Kpis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryMean {
    pub category: String,
    pub mean_half_life_years: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndustryBandCount {
    pub industry: String,
    pub band: Band,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxStats {
    pub category: String,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakdowns {
    pub half_life_by_category: Vec<CategoryMean>,
    pub exposure_by_industry: Vec<IndustryBandCount>,
    pub automation_risk_histogram: Vec<HistogramBin>,
    pub reskilling_by_category: Vec<BoxStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correlation {
    pub a: Metric,
    pub b: Metric,
    pub coefficient: f64,
}
