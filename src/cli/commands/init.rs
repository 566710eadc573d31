use serde_json::json;

use crate::cli::OutputFormat;
use crate::database::manager::DatabaseManager;

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    DatabaseManager::apply_schema().await?;

    match output_format {
        OutputFormat::Json => {
            println!("{}", json!({ "success": true, "action": "init" }));
        }
        OutputFormat::Text => {
            println!("Database schema applied");
        }
    }

    Ok(())
}
