use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::error::{AnalyticsError, Result};
use crate::models::{
    AggregateResult, Band, BoxStats, Breakdowns, CategoryMean, Correlation, HistogramBin,
    IndustryBandCount, Kpis, Metric, MetricSummary, RankedSkill, SkillRecord, SortKey,
};
use crate::stats;

pub const HISTOGRAM_BINS: usize = 10;

fn records_of<R: Borrow<SkillRecord>>(records: &[R]) -> impl Iterator<Item = &SkillRecord> + '_ {
    records.iter().map(Borrow::<SkillRecord>::borrow)
}

fn values<R: Borrow<SkillRecord>>(records: &[R], metric: Metric) -> Vec<f64> {
    records_of(records).map(|r| r.value(metric)).collect()
}

pub fn summarize_metric<R: Borrow<SkillRecord>>(
    records: &[R],
    metric: Metric,
) -> Result<MetricSummary> {
    let sorted = stats::sorted(&values(records, metric));
    let empty = || AnalyticsError::EmptyInput { metric };

    Ok(MetricSummary {
        mean: stats::mean(&sorted).ok_or_else(empty)?,
        median: stats::quantile_sorted(&sorted, 0.5).ok_or_else(empty)?,
        std_dev: stats::std_dev(&sorted).ok_or_else(empty)?,
        min: *sorted.first().ok_or_else(empty)?,
        max: *sorted.last().ok_or_else(empty)?,
    })
}

/// Records ordered by `key`; ties fall back to skill name so the order is stable
/// across runs.
pub fn rank<R: Borrow<SkillRecord>>(records: &[R], key: SortKey) -> Vec<RankedSkill> {
    let mut ordered: Vec<&SkillRecord> = records_of(records).collect();
    ordered.sort_by(|a, b| {
        compare_values(a.value(key.metric), b.value(key.metric), key.descending)
            .then_with(|| a.skill_name.cmp(&b.skill_name))
    });

    ordered
        .into_iter()
        .enumerate()
        .map(|(index, record)| RankedSkill {
            rank: index + 1,
            skill_name: record.skill_name.clone(),
            industry: record.industry.clone(),
            category: record.category.clone(),
            value: record.value(key.metric),
        })
        .collect()
}

pub fn kpis<R: Borrow<SkillRecord>>(records: &[R]) -> Result<Kpis> {
    let total = records.len();
    if total == 0 {
        return Err(AnalyticsError::EmptyInput {
            metric: Metric::HalfLife,
        });
    }

    let high_exposure = records_of(records)
        .filter(|r| Band::classify(r.ai_exposure) == Band::High)
        .count();
    let high_risk = records_of(records)
        .filter(|r| Band::classify(r.automation_risk) == Band::High)
        .count();

    Ok(Kpis {
        mean_half_life_years: summarize_metric(records, Metric::HalfLife)?.mean,
        high_exposure_share: high_exposure as f64 / total as f64,
        mean_reskilling_interval_years: summarize_metric(records, Metric::ReskillingFrequency)?
            .mean,
        high_automation_risk_count: high_risk,
    })
}

/// Summary statistics, ranking and headline KPIs for a selection.
///
/// Fails with [`AnalyticsError::EmptyInput`] when `records` is empty; no
/// NaN placeholders are ever produced.
pub fn summarize<R: Borrow<SkillRecord>>(records: &[R], sort_key: SortKey) -> Result<AggregateResult> {
    let mut metrics = BTreeMap::new();
    for metric in Metric::ALL {
        metrics.insert(metric, summarize_metric(records, metric)?);
    }

    Ok(AggregateResult {
        count: records.len(),
        metrics,
        sort_key,
        ranking: rank(records, sort_key),
        kpis: kpis(records)?,
    })
}

/// Pearson correlation between two metrics over the selection.
pub fn correlate<R: Borrow<SkillRecord>>(records: &[R], a: Metric, b: Metric) -> Result<f64> {
    if records.len() < 2 {
        return Err(AnalyticsError::InsufficientData {
            needed: 2,
            actual: records.len(),
        });
    }
    let xs = values(records, a);
    let ys = values(records, b);
    for (metric, side) in [(a, &xs), (b, &ys)] {
        if stats::is_constant(side) {
            return Err(AnalyticsError::NoVariance {
                metric,
                records: records.len(),
            });
        }
    }
    stats::pearson(&xs, &ys).ok_or(AnalyticsError::NoVariance {
        metric: a,
        records: records.len(),
    })
}

/// Every distinct metric pair whose coefficient is defined.
pub fn correlation_matrix<R: Borrow<SkillRecord>>(records: &[R]) -> Vec<Correlation> {
    let mut matrix = Vec::new();
    for (i, &a) in Metric::ALL.iter().enumerate() {
        for &b in &Metric::ALL[i + 1..] {
            match correlate(records, a, b) {
                Ok(coefficient) => matrix.push(Correlation { a, b, coefficient }),
                Err(err) => tracing::debug!(%a, %b, error = %err, "correlation skipped"),
            }
        }
    }
    matrix
}

pub fn half_life_by_category<R: Borrow<SkillRecord>>(records: &[R]) -> Vec<CategoryMean> {
    let mut groups: BTreeMap<&str, (usize, f64)> = BTreeMap::new();
    for record in records_of(records) {
        let entry = groups.entry(record.category.as_str()).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += record.half_life_years;
    }

    groups
        .into_iter()
        .map(|(category, (count, total))| CategoryMean {
            category: category.to_string(),
            mean_half_life_years: total / count as f64,
            count,
        })
        .collect()
}

pub fn exposure_by_industry<R: Borrow<SkillRecord>>(records: &[R]) -> Vec<IndustryBandCount> {
    let mut groups: BTreeMap<(&str, Band), usize> = BTreeMap::new();
    for record in records_of(records) {
        *groups
            .entry((record.industry.as_str(), Band::classify(record.ai_exposure)))
            .or_insert(0) += 1;
    }

    groups
        .into_iter()
        .map(|((industry, band), count)| IndustryBandCount {
            industry: industry.to_string(),
            band,
            count,
        })
        .collect()
}

/// Equal-width bins over [0, 1]; the last bin is closed on the right.
pub fn automation_risk_histogram<R: Borrow<SkillRecord>>(records: &[R]) -> Vec<HistogramBin> {
    if records.is_empty() {
        return Vec::new();
    }
    let bin_count = HISTOGRAM_BINS as f64;
    let mut bins: Vec<HistogramBin> = (0..HISTOGRAM_BINS)
        .map(|i| HistogramBin {
            lower: i as f64 / bin_count,
            upper: (i + 1) as f64 / bin_count,
            count: 0,
        })
        .collect();

    // 0.3 / 0.1 floors to 2; scaling by the bin count keeps edges exact.
    for record in records_of(records) {
        let index = ((record.automation_risk * bin_count).floor() as usize).min(HISTOGRAM_BINS - 1);
        bins[index].count += 1;
    }
    bins
}

pub fn reskilling_by_category<R: Borrow<SkillRecord>>(records: &[R]) -> Vec<BoxStats> {
    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for record in records_of(records) {
        groups
            .entry(record.category.as_str())
            .or_default()
            .push(record.reskilling_frequency);
    }

    groups
        .into_iter()
        .filter_map(|(category, values)| {
            let sorted = stats::sorted(&values);
            Some(BoxStats {
                category: category.to_string(),
                min: *sorted.first()?,
                q1: stats::quantile_sorted(&sorted, 0.25)?,
                median: stats::quantile_sorted(&sorted, 0.5)?,
                q3: stats::quantile_sorted(&sorted, 0.75)?,
                max: *sorted.last()?,
            })
        })
        .collect()
}

pub fn breakdowns<R: Borrow<SkillRecord>>(records: &[R]) -> Breakdowns {
    Breakdowns {
        half_life_by_category: half_life_by_category(records),
        exposure_by_industry: exposure_by_industry(records),
        automation_risk_histogram: automation_risk_histogram(records),
        reskilling_by_category: reskilling_by_category(records),
    }
}

pub fn compare_values(a: f64, b: f64, descending: bool) -> Ordering {
    let ordering = a.total_cmp(&b);
    if descending {
        ordering.reverse()
    } else {
        ordering
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{filter, FilterSpec};

    fn record(name: &str, industry: &str, category: &str, values: [f64; 5]) -> SkillRecord {
        SkillRecord {
            skill_name: name.to_string(),
            industry: industry.to_string(),
            category: category.to_string(),
            half_life_years: values[0],
            ai_exposure: values[1],
            automation_risk: values[2],
            market_demand: values[3],
            reskilling_frequency: values[4],
        }
    }

    fn dataset() -> Vec<SkillRecord> {
        vec![
            record("Data Entry", "Finance", "Technical", [1.5, 0.92, 0.88, 0.30, 0.8]),
            record("Negotiation", "Finance", "Soft Skill", [9.0, 0.20, 0.15, 0.75, 4.0]),
            record("Prompt Design", "Tech", "Technical", [2.0, 0.85, 0.35, 0.95, 0.5]),
            record("Team Leadership", "Tech", "Soft Skill", [10.0, 0.30, 0.10, 0.80, 5.0]),
            record("Radiology Reading", "Healthcare", "Technical", [4.5, 0.65, 0.72, 0.60, 1.5]),
        ]
    }

    #[test]
    fn summarize_computes_count_and_means() {
        let data = dataset();
        let result = summarize(&data, SortKey::default()).unwrap();

        assert_eq!(result.count, 5);
        let half_life = &result.metrics[&Metric::HalfLife];
        assert!((half_life.mean - 5.4).abs() < 1e-9);
        assert!((half_life.median - 4.5).abs() < 1e-9);
        assert_eq!(half_life.min, 1.5);
        assert_eq!(half_life.max, 10.0);
    }

    #[test]
    fn ranking_orders_by_sort_key() {
        let data = dataset();
        let result = summarize(&data, SortKey::default()).unwrap();
        let names: Vec<&str> = result
            .ranking
            .iter()
            .map(|r| r.skill_name.as_str())
            .collect();
        assert_eq!(
            names,
            vec![
                "Data Entry",
                "Radiology Reading",
                "Prompt Design",
                "Negotiation",
                "Team Leadership"
            ]
        );
        assert_eq!(result.ranking[0].rank, 1);

        let ascending = SortKey {
            metric: Metric::HalfLife,
            descending: false,
        };
        let ranked = rank(&data, ascending);
        assert_eq!(ranked[0].skill_name, "Data Entry");
        assert_eq!(ranked[4].skill_name, "Team Leadership");
    }

    #[test]
    fn ranking_breaks_ties_by_name() {
        let data = vec![
            record("Zeta", "Tech", "Technical", [1.0, 0.5, 0.5, 0.5, 1.0]),
            record("Alpha", "Tech", "Technical", [1.0, 0.5, 0.5, 0.5, 1.0]),
        ];
        let ranked = rank(&data, SortKey::default());
        assert_eq!(ranked[0].skill_name, "Alpha");
    }

    #[test]
    fn kpis_match_dashboard_definitions() {
        let data = dataset();
        let kpis = summarize(&data, SortKey::default()).unwrap().kpis;
        assert!((kpis.mean_half_life_years - 5.4).abs() < 1e-9);
        // Data Entry and Prompt Design sit above the 0.70 exposure cut
        assert!((kpis.high_exposure_share - 0.4).abs() < 1e-9);
        assert!((kpis.mean_reskilling_interval_years - 2.36).abs() < 1e-9);
        assert_eq!(kpis.high_automation_risk_count, 2);
    }

    #[test]
    fn empty_selection_fails_consistently() {
        let empty: Vec<SkillRecord> = Vec::new();
        assert!(matches!(
            summarize(&empty, SortKey::default()),
            Err(AnalyticsError::EmptyInput { .. })
        ));
        for metric in Metric::ALL {
            match summarize_metric(&empty, metric) {
                Err(AnalyticsError::EmptyInput { metric: reported }) => {
                    assert_eq!(reported, metric)
                }
                other => panic!("expected EmptyInput for {metric}, got {other:?}"),
            }
        }
    }

    #[test]
    fn noop_filter_summary_equals_full_summary() {
        let data = dataset();
        let filtered = filter(&data, &FilterSpec::default());
        assert_eq!(
            summarize(&filtered, SortKey::default()).unwrap(),
            summarize(&data, SortKey::default()).unwrap()
        );
    }

    #[test]
    fn same_filter_yields_identical_results() {
        let data = dataset();
        let spec = FilterSpec::default().with_categories(["Technical"]);
        let first = summarize(&filter(&data, &spec), SortKey::default()).unwrap();
        let second = summarize(&filter(&data, &spec), SortKey::default()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.count, 3);
    }

    #[test]
    fn self_correlation_is_one() {
        let data = dataset();
        for metric in Metric::ALL {
            let r = correlate(&data, metric, metric).unwrap();
            assert!((r - 1.0).abs() < 1e-9, "{metric}: {r}");
        }
    }

    #[test]
    fn exposure_and_half_life_move_against_each_other() {
        let data = dataset();
        let r = correlate(&data, Metric::AiExposure, Metric::HalfLife).unwrap();
        assert!(r < -0.8 && r >= -1.0);
    }

    #[test]
    fn correlation_needs_two_records() {
        let data = dataset();
        let err = correlate(&data[..1], Metric::AiExposure, Metric::HalfLife).unwrap_err();
        assert!(matches!(
            err,
            AnalyticsError::InsufficientData {
                needed: 2,
                actual: 1
            }
        ));
        assert!(err.is_no_data());
    }

    #[test]
    fn constant_metric_reports_missing_variance() {
        let mut data = dataset();
        for record in &mut data {
            record.market_demand = 0.5;
        }
        let err = correlate(&data, Metric::HalfLife, Metric::MarketDemand).unwrap_err();
        assert!(matches!(
            err,
            AnalyticsError::NoVariance {
                metric: Metric::MarketDemand,
                records: 5
            }
        ));
        assert!(err.is_no_data());
        assert_eq!(err.to_string(), "market_demand has no variance across 5 records");
    }

    #[test]
    fn correlation_matrix_covers_distinct_pairs() {
        let data = dataset();
        assert_eq!(correlation_matrix(&data).len(), 10);
        assert!(correlation_matrix(&data[..1]).is_empty());
    }

    #[test]
    fn half_life_grouped_by_category() {
        let data = dataset();
        let groups = half_life_by_category(&data);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].category, "Soft Skill");
        assert!((groups[0].mean_half_life_years - 9.5).abs() < 1e-9);
        assert_eq!(groups[1].category, "Technical");
        assert_eq!(groups[1].count, 3);
    }

    #[test]
    fn exposure_bands_counted_per_industry() {
        let data = dataset();
        let counts = exposure_by_industry(&data);
        let tech_high = counts
            .iter()
            .find(|c| c.industry == "Tech" && c.band == Band::High)
            .unwrap();
        assert_eq!(tech_high.count, 1);
        let total: usize = counts.iter().map(|c| c.count).sum();
        assert_eq!(total, data.len());
    }

    #[test]
    fn histogram_bins_account_for_every_record() {
        let mut data = dataset();
        data.push(record("Edge", "Tech", "Technical", [3.0, 0.5, 1.0, 0.5, 1.0]));
        let bins = automation_risk_histogram(&data);
        assert_eq!(bins.len(), HISTOGRAM_BINS);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), data.len());
        assert_eq!(bins[9].count, 1); // 1.0 lands in the closed last bin
        assert_eq!(bins[8].count, 1); // 0.88
        assert!(automation_risk_histogram(&Vec::<SkillRecord>::new()).is_empty());
    }

    #[test]
    fn whole_percent_risk_lands_on_its_lower_edge() {
        for pct in (10usize..=90).step_by(10) {
            let data = vec![record(
                "Edge Skill",
                "Tech",
                "Technical",
                [3.0, 0.5, pct as f64 / 100.0, 0.5, 1.0],
            )];
            let bins = automation_risk_histogram(&data);
            let expected = pct / 10;
            assert_eq!(bins[expected].count, 1, "risk {pct}% should fall in bin {expected}");
            assert!((bins[expected].lower - pct as f64 / 100.0).abs() < 1e-12);
        }
    }

    #[test]
    fn reskilling_box_stats_per_category() {
        let data = dataset();
        let boxes = reskilling_by_category(&data);
        let technical = boxes.iter().find(|b| b.category == "Technical").unwrap();
        assert_eq!(technical.min, 0.5);
        assert_eq!(technical.median, 0.8);
        assert_eq!(technical.max, 1.5);
        assert!((technical.q1 - 0.65).abs() < 1e-9);
        assert!((technical.q3 - 1.15).abs() < 1e-9);
    }

    #[test]
    fn compare_values_respects_direction() {
        assert_eq!(compare_values(1.0, 2.0, false), Ordering::Less);
        assert_eq!(compare_values(1.0, 2.0, true), Ordering::Greater);
    }
}
