use insights_core::{extract, MetricSample};
use std::path::Path;

pub fn run(file: &Path) -> anyhow::Result<()> {
    let sample = extract_file(file)?;
    if sample.is_empty() {
        tracing::warn!(file = %file.display(), "no metrics found");
    }
    println!("{}", serde_json::to_string_pretty(&sample)?);
    Ok(())
}

pub fn extract_file(file: &Path) -> anyhow::Result<MetricSample> {
    let narrative = std::fs::read_to_string(file)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", file.display()))?;
    Ok(extract(&narrative))
}
