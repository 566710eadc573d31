use serde_json::json;

use crate::cli::OutputFormat;
use crate::database::manager::DatabaseManager;

const BASELINE_CATEGORIES: &[(&str, &str)] = &[
    ("Programming", "Software development, languages, and tooling"),
    ("Design", "Visual design, UX, and creative tools"),
    ("Business", "Entrepreneurship, management, and strategy"),
    ("Marketing", "Digital marketing, branding, and growth"),
    ("Data Science", "Statistics, machine learning, and analytics"),
    ("Personal Development", "Productivity, communication, and life skills"),
];

/// Insert baseline categories. Re-running is a no-op for rows that already exist.
pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let pool = DatabaseManager::pool().await?;

    let mut inserted = 0u64;
    for (name, description) in BASELINE_CATEGORIES {
        let result = sqlx::query(
            "INSERT INTO categories (name, description) VALUES ($1, $2)
             ON CONFLICT (name) DO NOTHING",
        )
        .bind(name)
        .bind(description)
        .execute(&pool)
        .await?;

        inserted += result.rows_affected();
    }

    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                json!({ "success": true, "action": "seed", "categories_inserted": inserted })
            );
        }
        OutputFormat::Text => {
            println!(
                "Seed complete: {} of {} categories inserted",
                inserted,
                BASELINE_CATEGORIES.len()
            );
        }
    }

    Ok(())
}
