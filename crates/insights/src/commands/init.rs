use insights_core::InsightsConfig;
use insights_fs::Paths;

pub fn run() -> anyhow::Result<()> {
    let paths = Paths::new()?;
    let created_config = init_at(&paths)?;

    println!("✓ Data directory ready at {}", paths.root.display());
    if created_config {
        println!("  - wrote default {}", paths.config_file().display());
    }
    println!("  - record store {}", paths.records_db().display());
    println!("  - reports go to {}", paths.reports_dir().display());
    Ok(())
}

/// Lay out the data directory. Returns true when a default config was written;
/// an existing config is left untouched.
pub fn init_at(paths: &Paths) -> anyhow::Result<bool> {
    std::fs::create_dir_all(paths.reports_dir())?;
    super::open_store(paths)?;

    let config_path = paths.config_file();
    if config_path.exists() {
        // Fail early on a config the other commands could not load
        InsightsConfig::load(paths)?;
        return Ok(false);
    }

    let json = serde_json::to_string_pretty(&InsightsConfig::new())?;
    insights_fs::atomic_write(&config_path, json.as_bytes())?;
    tracing::info!(path = %config_path.display(), "wrote default config");
    Ok(true)
}
