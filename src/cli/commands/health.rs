use anyhow::Context;
use serde_json::{json, Value};

use crate::cli::OutputFormat;

pub async fn handle(base_url: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let url = format!("{}/health", base_url.trim_end_matches('/'));

    let response = reqwest::Client::new()
        .get(&url)
        .send()
        .await
        .with_context(|| format!("failed to reach {}", url))?;

    let status = response.status();
    let body: Value = response
        .json()
        .await
        .unwrap_or_else(|_| json!({ "success": false, "error": "non-JSON response" }));

    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                json!({ "status": status.as_u16(), "response": body })
            );
        }
        OutputFormat::Text => {
            if status.is_success() {
                println!("Server healthy ({})", url);
            } else {
                println!("Server unhealthy: HTTP {} ({})", status, url);
            }
        }
    }

    if !status.is_success() {
        anyhow::bail!("health check failed with HTTP {}", status);
    }

    Ok(())
}
