//! Handle `dkl init`: scaffold the project-local configuration.

use anyhow::Context as _;
use std::path::Path;

use crate::cli::GlobalFlags;

pub fn handle(flags: &GlobalFlags) -> anyhow::Result<()> {
    let dir = Path::new(".dakhla");
    let config_path = dir.join("config.toml");
    if config_path.exists() {
        anyhow::bail!("{} already exists", config_path.display());
    }

    std::fs::create_dir_all(dir).context("creating .dakhla")?;

    let config = dakhla_config::DakhlaConfig::default();
    let rendered = toml::to_string_pretty(&config).context("rendering default config")?;
    std::fs::write(&config_path, rendered)
        .with_context(|| format!("writing {}", config_path.display()))?;

    if !flags.quiet {
        println!("{}", serde_json::json!({ "data": { "created": config_path } }));
    }
    Ok(())
}
