//! `sydia embed` — Embed a text with the configured embedding provider.

use sydia_config::AppConfig;
use sydia_core::error::Error;
use sydia_providers::Gateway;

/// Number of leading components printed.
const PREVIEW: usize = 8;

pub async fn run(text: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(Error::from)?;
    let gateway = Gateway::from_config(&config.http)?;

    let embedding = config.embedding.provider_config();
    let vector = gateway.embed(&embedding, text).await?;

    println!("Provider:   {}", embedding.provider);
    println!("Model:      {}", embedding.model);
    println!("Dimensions: {}", vector.len());

    let head: Vec<String> = vector.iter().take(PREVIEW).map(|v| format!("{v:.4}")).collect();
    let ellipsis = if vector.len() > PREVIEW { ", ..." } else { "" };
    println!("Vector:     [{}{ellipsis}]", head.join(", "));
    Ok(())
}
