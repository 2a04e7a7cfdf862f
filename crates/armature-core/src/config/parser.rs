//! TOML parser with helpful error messages

use super::schema::ServiceConfig;
use anyhow::{Context, Result};
use std::path::Path;

/// Parse armature.toml with detailed error messages
///
/// The returned configuration remembers the directory it was loaded from so
/// a relative `arm_template.file` resolves next to the configuration.
pub fn parse_service_toml(path: &Path) -> Result<ServiceConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config = parse_service_toml_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    config.service_path = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    Ok(config)
}

/// Parse armature.toml content from string
pub fn parse_service_toml_str(content: &str) -> Result<ServiceConfig> {
    let config: ServiceConfig =
        toml::from_str(content).map_err(|e| describe_toml_error(e, content))?;

    config.validate()?;

    Ok(config)
}

/// Point a TOML error at the offending line when the parser reports a span.
fn describe_toml_error(error: toml::de::Error, content: &str) -> anyhow::Error {
    let Some(span) = error.span() else {
        return anyhow::anyhow!("TOML parsing error: {}", error.message());
    };

    let line = content[..span.start.min(content.len())].matches('\n').count() + 1;
    let text = content.lines().nth(line - 1).unwrap_or_default();
    anyhow::anyhow!(
        "TOML parsing error at line {}: {}\n  {} | {}",
        line,
        error.message(),
        line,
        text
    )
}
