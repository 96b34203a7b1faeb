use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use sqlx::postgres::{PgPool, PgPoolOptions};

use skill_halflife::config::Config;
use skill_halflife::error::AnalyticsError;
use skill_halflife::filter::{self, FilterSpec, RangeConstraint};
use skill_halflife::models::{Correlation, Metric, SkillRecord, SortKey};
use skill_halflife::session::Session;
use skill_halflife::{aggregate, db, loader, logger, report};

#[derive(Parser)]
#[command(name = "skill-halflife")]
#[command(about = "Skill half-life and AI exposure analytics", long_about = None)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
struct Selection {
    /// Read skills from a CSV file instead of Postgres
    #[arg(long)]
    csv: Option<PathBuf>,
    /// Keep only these industries (repeatable)
    #[arg(long = "industry")]
    industries: Vec<String>,
    /// Keep only these skill categories (repeatable)
    #[arg(long = "category")]
    categories: Vec<String>,
    /// Numeric bounds as metric:min:max; either bound may be empty
    #[arg(long = "range")]
    ranges: Vec<RangeConstraint>,
    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

impl Selection {
    fn filter_spec(&self) -> FilterSpec {
        let mut spec = FilterSpec::default()
            .with_industries(self.industries.iter().cloned())
            .with_categories(self.categories.iter().cloned());
        for range in &self.ranges {
            spec = spec.with_range(range.clone());
        }
        spec
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load a small realistic skill set
    Seed,
    /// Import skills from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Headline indicators and per-metric statistics
    Summary {
        #[command(flatten)]
        selection: Selection,
    },
    /// Rank skills by a metric
    Rank {
        #[command(flatten)]
        selection: Selection,
        /// metric[:asc|desc]
        #[arg(long)]
        sort: Option<SortKey>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Pearson correlation between two metrics
    Correlate {
        #[command(flatten)]
        selection: Selection,
        #[arg(long)]
        a: Metric,
        #[arg(long)]
        b: Metric,
    },
    /// Grouped series behind the dashboard charts
    Breakdown {
        #[command(flatten)]
        selection: Selection,
    },
    /// Generate a markdown report
    Report {
        #[command(flatten)]
        selection: Selection,
        #[arg(long)]
        sort: Option<SortKey>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

async fn connect() -> anyhow::Result<PgPool> {
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set when no --csv dataset is given")?;

    PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")
}

async fn load_dataset(selection: &Selection, config: &Config) -> anyhow::Result<Vec<SkillRecord>> {
    match &selection.csv {
        Some(path) => loader::load_csv(path, &config.dataset)
            .with_context(|| format!("failed to load {}", path.display())),
        None => {
            let pool = connect().await?;
            let records = db::fetch_skills(&pool, &selection.filter_spec()).await?;
            loader::validate_dataset(&records, &config.dataset)?;
            Ok(records)
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_no_data(err: &AnalyticsError) {
    tracing::debug!(error = %err, "no data for selection");
    println!("No skills match this selection.");
}

fn write_report(out: &Path, contents: &str) -> anyhow::Result<()> {
    std::fs::write(out, contents).with_context(|| format!("failed to write {}", out.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logger::init_logging("warn");
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::InitDb => {
            let pool = connect().await?;
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            let pool = connect().await?;
            let stored = db::seed(&pool).await?;
            println!("Seeded {stored} skills.");
        }
        Commands::Import { csv } => {
            let pool = connect().await?;
            let stored = db::import_csv(&pool, &csv, &config.dataset).await?;
            println!("Stored {stored} skills from {}.", csv.display());
        }
        Commands::Summary { selection } => {
            let dataset = load_dataset(&selection, &config).await?;
            let mut session = Session::new(&dataset).with_sort_key(config.ranking.default_sort);
            session.set_filter(selection.filter_spec());

            let result = match session.aggregate() {
                Ok(result) => result,
                Err(err) if err.is_no_data() => {
                    print_no_data(&err);
                    return Ok(());
                }
                Err(err) => return Err(err.into()),
            };

            if selection.json {
                return print_json(&result);
            }

            let kpis = &result.kpis;
            println!("Selection: {}", session.filter().describe());
            println!("Skills analysed: {}", result.count);
            println!("Mean skill half-life: {:.2} years", kpis.mean_half_life_years);
            println!(
                "High AI exposure skills: {:.1}%",
                kpis.high_exposure_share * 100.0
            );
            println!(
                "Mean reskilling interval: {:.2} years",
                kpis.mean_reskilling_interval_years
            );
            println!(
                "High automation risk skills: {}",
                kpis.high_automation_risk_count
            );
            println!();
            for (metric, summary) in &result.metrics {
                println!(
                    "- {}: mean {:.2}, median {:.2}, std {:.2}, range {:.2}-{:.2}",
                    metric.label(),
                    summary.mean,
                    summary.median,
                    summary.std_dev,
                    summary.min,
                    summary.max
                );
            }
        }
        Commands::Rank {
            selection,
            sort,
            limit,
        } => {
            let dataset = load_dataset(&selection, &config).await?;
            let sort_key = sort.unwrap_or(config.ranking.default_sort);
            let limit = limit.unwrap_or(config.ranking.limit);
            let mut session = Session::new(&dataset);
            session.set_sort_key(sort_key);
            session.set_filter(selection.filter_spec());

            let result = match session.aggregate() {
                Ok(result) => result,
                Err(err) if err.is_no_data() => {
                    print_no_data(&err);
                    return Ok(());
                }
                Err(err) => return Err(err.into()),
            };

            let top: Vec<_> = result.ranking.into_iter().take(limit).collect();
            if selection.json {
                return print_json(&top);
            }

            println!("Top skills by {sort_key}:");
            for skill in &top {
                println!(
                    "{:>3}. {} ({}, {}) {:.2}",
                    skill.rank, skill.skill_name, skill.industry, skill.category, skill.value
                );
            }
        }
        Commands::Correlate { selection, a, b } => {
            let dataset = load_dataset(&selection, &config).await?;
            let session = {
                let mut session = Session::new(&dataset);
                session.set_filter(selection.filter_spec());
                session
            };
            let selected = session.selection();

            match aggregate::correlate(&selected, a, b) {
                Ok(coefficient) if selection.json => {
                    return print_json(&Correlation { a, b, coefficient });
                }
                Ok(coefficient) => {
                    println!(
                        "Pearson r({a}, {b}) = {coefficient:+.3} over {} skills",
                        selected.len()
                    );
                }
                Err(err) if err.is_no_data() => {
                    println!("Cannot correlate {a} and {b}: {err}.");
                }
                Err(err) => return Err(err.into()),
            }
        }
        Commands::Breakdown { selection } => {
            let dataset = load_dataset(&selection, &config).await?;
            let selected = filter::filter(&dataset, &selection.filter_spec());
            if selected.is_empty() {
                println!("No skills match this selection.");
                return Ok(());
            }

            let breakdowns = aggregate::breakdowns(&selected);
            if selection.json {
                return print_json(&breakdowns);
            }

            println!("Mean half-life by category:");
            for group in &breakdowns.half_life_by_category {
                println!(
                    "- {}: {:.2} years ({} skills)",
                    group.category, group.mean_half_life_years, group.count
                );
            }
            println!();
            println!("Skills by industry and AI exposure band:");
            for entry in &breakdowns.exposure_by_industry {
                println!("- {} / {}: {}", entry.industry, entry.band, entry.count);
            }
            println!();
            println!("Automation risk distribution:");
            for bin in &breakdowns.automation_risk_histogram {
                println!("- {:.1}-{:.1}: {}", bin.lower, bin.upper, bin.count);
            }
            println!();
            println!("Reskilling interval by category (min / q1 / median / q3 / max):");
            for stats in &breakdowns.reskilling_by_category {
                println!(
                    "- {}: {:.2} / {:.2} / {:.2} / {:.2} / {:.2}",
                    stats.category, stats.min, stats.q1, stats.median, stats.q3, stats.max
                );
            }
        }
        Commands::Report {
            selection,
            sort,
            out,
        } => {
            let dataset = load_dataset(&selection, &config).await?;
            let sort_key = sort.unwrap_or(config.ranking.default_sort);
            let mut session = Session::new(&dataset).with_sort_key(sort_key);
            session.set_filter(selection.filter_spec());

            let result = match session.aggregate() {
                Ok(result) => Some(result),
                Err(err) if err.is_no_data() => None,
                Err(err) => return Err(err.into()),
            };
            let selected = session.selection();
            let breakdowns = aggregate::breakdowns(&selected);
            let correlations = aggregate::correlation_matrix(&selected);
            let scope = session.filter().describe();

            let contents = report::build_report(&report::ReportInput {
                scope: &scope,
                generated_at: chrono::Utc::now(),
                result: result.as_ref(),
                breakdowns: &breakdowns,
                correlations: &correlations,
                top_n: config.report.top_n,
            });
            write_report(&out, &contents)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
