// src/pipeline/validate.rs

use std::path::Path;

use crate::error::Result;
use crate::models::Config;

/// Load the configuration file strictly, validate it and log the effective
/// settings. Unlike the other commands there is no fallback to defaults: a
/// missing or malformed file is an error.
pub fn run_validate(config_path: &Path) -> Result<()> {
    let config = Config::load(config_path)
        .and_then(|config| config.validate().map(|()| config))
        .inspect_err(|e| {
            log::error!(
                "Config validation failed for {}: {}",
                config_path.display(),
                e
            )
        })?;

    log::info!("Config OK: {}", config_path.display());
    log::info!("    upstream: {}", config.upstream.base_url);
    log::info!("    user agent: {}", config.upstream.user_agent);
    log::info!("    timeout: {}s", config.upstream.timeout_secs);
    log::info!(
        "    feed: {} item(s), {} page(s), {} cached feed(s), {:?} on page failure",
        config.feed.max_items,
        config.feed.page_count,
        config.feed.cache_capacity,
        config.feed.partial_failure
    );
    log::info!(
        "    server: {} (debounce {}s)",
        config.server.bind,
        config.server.debounce_secs
    );
    Ok(())
}
