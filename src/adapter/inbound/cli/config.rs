//! Handler for the `config` command group.

use std::fs;
use std::path::Path;

use crate::adapter::inbound::cli::output;
use crate::adapter::outbound::neo4j::client::PASSWORD_ENV;
use crate::error::{ConfigError, Result};
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::config::source::SourceConfig;

/// Default config template with documentation.
pub const CONFIG_TEMPLATE: &str = include_str!("../../../../config.toml.example");

/// Execute `config init`.
pub fn execute_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(ConfigError::InvalidValue {
            field: "config",
            reason: "file already exists (use --force to overwrite)".to_string(),
        }
        .into());
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, CONFIG_TEMPLATE)?;
    output::section("Config Initialized");
    output::success("Created configuration file");
    output::field("Path", path.display());
    output::section("Next Steps");
    output::note(&format!("1. Edit {} with your settings", path.display()));
    output::note(&format!("2. Set {PASSWORD_ENV} for a Neo4j source"));
    output::note(&format!(
        "3. Run: oceanus config validate {}",
        path.display()
    ));
    output::note(&format!("4. Run: oceanus analyze -c {}", path.display()));
    Ok(())
}

/// Execute `config show`.
pub fn execute_show(path: &Path) -> Result<()> {
    let config = Config::load(path)?;

    if output::is_json() {
        output::json_output(serde_json::json!({
            "command": "config.show",
            "config": serde_json::to_value(&config)?,
        }));
        return Ok(());
    }

    output::section("Source");
    output::field("Type", config.source.kind());
    match &config.source {
        SourceConfig::Neo4j(neo4j) => {
            output::field("URL", &neo4j.url);
            output::field("Database", &neo4j.database);
            output::field("User", &neo4j.user);
            output::field("Timeout", format!("{}s", neo4j.timeout_secs));
        }
        SourceConfig::Fixture(fixture) => {
            output::field("Path", &fixture.path);
        }
    }

    output::section("Dates");
    output::field("Default start", config.dates.default_start);
    output::field("Default end", config.dates.default_end);
    output::field("Min allowed", config.dates.min_allowed);

    output::section("Matching");
    output::field("Tolerance", format!("{}h", config.matching.tolerance_hours));

    output::section("Anomaly");
    output::field("Window", format!("{} days", config.anomaly.window));
    output::field("z threshold", config.anomaly.z_threshold);
    output::field(
        "Contamination",
        format!("{:.1}%", config.anomaly.contamination * 100.0),
    );
    output::field("Trees", config.anomaly.trees);
    output::field("Sample size", config.anomaly.sample_size);
    output::field("Seed", config.anomaly.seed);

    output::section("Clustering");
    output::field("Matched", config.clustering.matched_clusters);
    output::field("Deliveries", config.clustering.delivery_clusters);
    output::field("Restarts", config.clustering.n_init);
    output::field("Max iterations", config.clustering.max_iter);

    output::section("Decomposition");
    output::field("Period", format!("{} days", config.decomposition.period));
    output::field(
        "Min observations",
        config.decomposition.min_observations,
    );

    output::section("Logging");
    output::field("Level", &config.logging.level);
    output::field("Format", format!("{:?}", config.logging.format).to_lowercase());
    Ok(())
}

/// Problems that do not make the file invalid but will bite at runtime.
fn warnings(config: &Config) -> Vec<String> {
    let mut warnings = Vec::new();
    match &config.source {
        SourceConfig::Neo4j(_) => {
            if std::env::var(PASSWORD_ENV).is_err() {
                warnings.push(format!("{PASSWORD_ENV} is not set"));
            }
        }
        SourceConfig::Fixture(fixture) => {
            if !Path::new(&fixture.path).exists() {
                warnings.push(format!("fixture file {} does not exist", fixture.path));
            }
        }
    }
    if config.decomposition.min_observations < 2 * config.decomposition.period {
        warnings.push(format!(
            "decomposition needs two full periods; {} observations will be required",
            2 * config.decomposition.period
        ));
    }
    warnings
}

/// Execute `config validate`.
pub fn execute_validate(path: &Path) -> Result<()> {
    output::section("Config Validation");
    output::field("Path", path.display());
    let config = Config::load(path)?;
    config.analysis_settings()?;
    output::success("Config file is valid");

    let warnings = warnings(&config);
    if !warnings.is_empty() {
        output::section("Warnings");
        for warning in &warnings {
            output::warning(warning);
        }
    }

    output::hint(&format!("oceanus config show {}", path.display()));
    Ok(())
}
