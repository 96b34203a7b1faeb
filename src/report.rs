use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::models::{AggregateResult, Breakdowns, Correlation, Metric};

/// Everything a report renders; `result` is `None` when the selection was
/// empty.
pub struct ReportInput<'a> {
    pub scope: &'a str,
    pub generated_at: DateTime<Utc>,
    pub result: Option<&'a AggregateResult>,
    pub breakdowns: &'a Breakdowns,
    pub correlations: &'a [Correlation],
    pub top_n: usize,
}

pub fn build_report(input: &ReportInput<'_>) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Skill Half-Life in the Age of AI");
    let _ = writeln!(
        output,
        "Generated for {} at {}",
        input.scope,
        input.generated_at.format("%Y-%m-%d %H:%M UTC")
    );
    let _ = writeln!(output);

    let Some(result) = input.result else {
        let _ = writeln!(output, "No skills match this selection.");
        write_limitations(&mut output);
        return output;
    };

    let _ = writeln!(output, "## Key Indicators");
    let kpis = &result.kpis;
    let _ = writeln!(output, "- Skills analysed: {}", result.count);
    let _ = writeln!(
        output,
        "- Mean skill half-life: {:.2} years",
        kpis.mean_half_life_years
    );
    let _ = writeln!(
        output,
        "- High AI exposure skills: {:.1}%",
        kpis.high_exposure_share * 100.0
    );
    let _ = writeln!(
        output,
        "- Mean reskilling interval: {:.2} years",
        kpis.mean_reskilling_interval_years
    );
    let _ = writeln!(
        output,
        "- High automation risk skills: {}",
        kpis.high_automation_risk_count
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Metric Summary");
    let _ = writeln!(output, "| Metric | Mean | Median | Std dev | Min | Max |");
    let _ = writeln!(output, "|---|---|---|---|---|---|");
    for (metric, summary) in &result.metrics {
        let _ = writeln!(
            output,
            "| {} | {:.2} | {:.2} | {:.2} | {:.2} | {:.2} |",
            metric.label(),
            summary.mean,
            summary.median,
            summary.std_dev,
            summary.min,
            summary.max
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Ranking by {}", result.sort_key);
    for skill in result.ranking.iter().take(input.top_n) {
        let _ = writeln!(
            output,
            "{}. {} ({}, {}) {:.2}",
            skill.rank, skill.skill_name, skill.industry, skill.category, skill.value
        );
    }

    write_breakdowns(&mut output, input.breakdowns);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Correlations");
    if input.correlations.is_empty() {
        let _ = writeln!(output, "Not enough varied records to correlate.");
    } else {
        for correlation in input.correlations {
            let _ = writeln!(
                output,
                "- {} vs {}: {:+.3}",
                correlation.a, correlation.b, correlation.coefficient
            );
        }
    }

    write_limitations(&mut output);
    output
}

fn write_breakdowns(output: &mut String, breakdowns: &Breakdowns) {
    let _ = writeln!(output);
    let _ = writeln!(output, "## {} by Category", Metric::HalfLife.label());
    for group in &breakdowns.half_life_by_category {
        let _ = writeln!(
            output,
            "- {}: {:.2} years across {} skills",
            group.category, group.mean_half_life_years, group.count
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Industry Exposure to AI-Driven Skill Decay");
    for entry in &breakdowns.exposure_by_industry {
        let _ = writeln!(
            output,
            "- {} / {} exposure: {}",
            entry.industry, entry.band, entry.count
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Distribution of Automation Risk");
    for bin in &breakdowns.automation_risk_histogram {
        let _ = writeln!(
            output,
            "- {:.1}-{:.1}: {}",
            bin.lower, bin.upper, bin.count
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Reskilling Interval by Category");
    let _ = writeln!(output, "| Category | Min | Q1 | Median | Q3 | Max |");
    let _ = writeln!(output, "|---|---|---|---|---|---|");
    for stats in &breakdowns.reskilling_by_category {
        let _ = writeln!(
            output,
            "| {} | {:.2} | {:.2} | {:.2} | {:.2} | {:.2} |",
            stats.category, stats.min, stats.q1, stats.median, stats.q3, stats.max
        );
    }
}

fn write_limitations(output: &mut String) {
    let _ = writeln!(output);
    let _ = writeln!(output, "## Limitations");
    let _ = writeln!(output, "- Data is synthetic and indicative, not predictive.");
    let _ = writeln!(
        output,
        "- Cultural, regional and economic differences are not modeled."
    );
    let _ = writeln!(
        output,
        "- Automation risk does not imply inevitability of displacement."
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate;
    use crate::filter::tests::skill;
    use crate::models::SortKey;
    use chrono::TimeZone;

    fn generated_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn report_contains_sections_and_ranking() {
        let data = vec![
            skill("Bookkeeping", "Finance", "Technical", 0.85),
            skill("Client Advisory", "Finance", "Soft Skill", 0.25),
        ];
        let result = aggregate::summarize(&data, SortKey::default()).unwrap();
        let breakdowns = aggregate::breakdowns(&data);
        let correlations = aggregate::correlation_matrix(&data);

        let report = build_report(&ReportInput {
            scope: "Finance",
            generated_at: generated_at(),
            result: Some(&result),
            breakdowns: &breakdowns,
            correlations: &correlations,
            top_n: 5,
        });

        assert!(report.contains("Generated for Finance at 2026-03-01 09:30 UTC"));
        assert!(report.contains("- Skills analysed: 2"));
        assert!(report.contains("- High automation risk skills: 1"));
        assert!(report.contains("## Ranking by automation_risk:desc"));
        assert!(report.contains("1. Bookkeeping (Finance, Technical) 0.85"));
        assert!(report.contains("## Distribution of Automation Risk"));
        assert!(report.contains("## Limitations"));
    }

    #[test]
    fn empty_selection_renders_no_data_report() {
        let empty: Vec<crate::models::SkillRecord> = Vec::new();
        let breakdowns = aggregate::breakdowns(&empty);
        let report = build_report(&ReportInput {
            scope: "all skills",
            generated_at: generated_at(),
            result: None,
            breakdowns: &breakdowns,
            correlations: &[],
            top_n: 5,
        });

        assert!(report.contains("No skills match this selection."));
        assert!(!report.contains("## Key Indicators"));
        assert!(report.contains("## Limitations"));
    }
}
