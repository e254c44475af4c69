// src/pipeline/validate.rs

//! Configuration validation pipeline.

use crate::error::Result;
use crate::models::Config;
use crate::utils::log;

/// Validate the loaded configuration and print a short summary.
pub fn run_validate(config: &Config) -> Result<()> {
    log::header("Validating configuration");

    config.validate()?;

    log::summary(
        "Configuration",
        &[
            ("API keys", config.api.keys.len().to_string()),
            ("Region", config.api.region_code.clone()),
            ("Page size", config.api.page_size.to_string()),
            ("Keywords", config.sampling.keywords.len().to_string()),
            (
                "Date bounds",
                format!(
                    "{} .. {}",
                    config.sampling.published_from, config.sampling.published_to
                ),
            ),
            ("Target count", config.collection.target_count.to_string()),
            ("Save interval", config.collection.save_interval.to_string()),
            ("Output", config.paths.output_file.clone()),
        ],
    );
    log::success("Configuration is valid");

    Ok(())
}
