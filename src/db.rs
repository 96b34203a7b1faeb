use anyhow::Context;
use sqlx::{PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

use crate::config::DatasetConfig;
use crate::filter::FilterSpec;
use crate::loader;
use crate::models::SkillRecord;

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

fn seed_records() -> Vec<SkillRecord> {
    let rows = [
        ("Python Programming", "Tech", "Technical", 2.5, 0.82, 0.45, 0.92, 1.0),
        ("Manual Data Entry", "Finance", "Technical", 1.2, 0.95, 0.91, 0.25, 0.5),
        ("Financial Modeling", "Finance", "Analytical", 3.8, 0.68, 0.52, 0.74, 2.0),
        ("Negotiation", "Finance", "Soft Skill", 9.5, 0.22, 0.12, 0.71, 4.0),
        ("Medical Imaging Review", "Healthcare", "Technical", 3.0, 0.78, 0.66, 0.81, 1.5),
        ("Patient Communication", "Healthcare", "Soft Skill", 11.0, 0.18, 0.08, 0.86, 5.0),
        ("Copywriting", "Media", "Creative", 2.2, 0.88, 0.73, 0.48, 1.0),
        ("Brand Strategy", "Media", "Creative", 6.5, 0.41, 0.28, 0.66, 3.0),
    ];

    rows.into_iter()
        .map(
            |(name, industry, category, half_life, exposure, risk, demand, reskilling)| SkillRecord {
                skill_name: name.to_string(),
                industry: industry.to_string(),
                category: category.to_string(),
                half_life_years: half_life,
                ai_exposure: exposure,
                automation_risk: risk,
                market_demand: demand,
                reskilling_frequency: reskilling,
            },
        )
        .collect()
}

async fn upsert_skill(
    tx: &mut Transaction<'_, Postgres>,
    record: &SkillRecord,
) -> anyhow::Result<u64> {
    let result = sqlx::query(
        r#"
        INSERT INTO skill_halflife.skills
        (id, skill_name, industry, category, half_life_years, ai_exposure,
         automation_risk, market_demand, reskilling_frequency)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ON CONFLICT (skill_name) DO UPDATE
        SET industry = EXCLUDED.industry,
            category = EXCLUDED.category,
            half_life_years = EXCLUDED.half_life_years,
            ai_exposure = EXCLUDED.ai_exposure,
            automation_risk = EXCLUDED.automation_risk,
            market_demand = EXCLUDED.market_demand,
            reskilling_frequency = EXCLUDED.reskilling_frequency,
            loaded_at = now()
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&record.skill_name)
    .bind(&record.industry)
    .bind(&record.category)
    .bind(record.half_life_years)
    .bind(record.ai_exposure)
    .bind(record.automation_risk)
    .bind(record.market_demand)
    .bind(record.reskilling_frequency)
    .execute(&mut **tx)
    .await
    .with_context(|| format!("failed to store skill '{}'", record.skill_name))?;

    Ok(result.rows_affected())
}

async fn store_all(pool: &PgPool, records: &[SkillRecord]) -> anyhow::Result<usize> {
    let mut tx = pool.begin().await?;
    let mut stored = 0usize;
    for record in records {
        if upsert_skill(&mut tx, record).await? > 0 {
            stored += 1;
        }
    }
    tx.commit().await?;
    Ok(stored)
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<usize> {
    let records = seed_records();
    loader::validate_dataset(&records, &DatasetConfig::default())?;
    store_all(pool, &records).await
}

/// Validates the whole file before writing; a bad row stores nothing.
pub async fn import_csv(
    pool: &PgPool,
    csv_path: &std::path::Path,
    options: &DatasetConfig,
) -> anyhow::Result<usize> {
    let records = loader::load_csv(csv_path, options)
        .with_context(|| format!("failed to load {}", csv_path.display()))?;
    store_all(pool, &records).await
}

/// Industry and category sets are applied in SQL; range constraints are left
/// to the in-memory filter.
pub async fn fetch_skills(pool: &PgPool, spec: &FilterSpec) -> anyhow::Result<Vec<SkillRecord>> {
    let industries: Vec<String> = spec.industries.iter().cloned().collect();
    let categories: Vec<String> = spec.categories.iter().cloned().collect();

    let rows = sqlx::query(
        r#"
        SELECT skill_name, industry, category, half_life_years, ai_exposure,
               automation_risk, market_demand, reskilling_frequency
        FROM skill_halflife.skills
        WHERE (cardinality($1::text[]) = 0 OR industry = ANY($1))
          AND (cardinality($2::text[]) = 0 OR category = ANY($2))
        ORDER BY skill_name
        "#,
    )
    .bind(industries)
    .bind(categories)
    .fetch_all(pool)
    .await
    .context("failed to fetch skills")?;

    let mut skills = Vec::with_capacity(rows.len());
    for (index, row) in rows.into_iter().enumerate() {
        let record = SkillRecord {
            skill_name: row.try_get("skill_name")?,
            industry: row.try_get("industry")?,
            category: row.try_get("category")?,
            half_life_years: row.try_get("half_life_years")?,
            ai_exposure: row.try_get("ai_exposure")?,
            automation_risk: row.try_get("automation_risk")?,
            market_demand: row.try_get("market_demand")?,
            reskilling_frequency: row.try_get("reskilling_frequency")?,
        };
        loader::validate_record(index + 1, &record)?;
        skills.push(record);
    }

    tracing::info!(records = skills.len(), "fetched skills from database");
    Ok(skills)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_records_pass_validation() {
        let records = seed_records();
        assert_eq!(records.len(), 8);
        loader::validate_dataset(&records, &DatasetConfig::default()).unwrap();
    }
}
