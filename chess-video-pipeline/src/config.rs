//! TOML + environment configuration loading for the pipeline binary.

use std::path::Path;

use chess_video_core::PipelineError;
use chess_video_types::{PipelineConfig, TrustedChannelFile};

/// Load [`PipelineConfig`] from a TOML file at `path`, then apply the `YOUTUBE_API_KEY`
/// environment override on top.
///
/// # Errors
/// Returns `PipelineError::ConfigInvalid` if the file cannot be read, is malformed
/// TOML, or resolves to an empty API key after the environment override.
pub fn load(path: &Path) -> Result<PipelineConfig, PipelineError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| PipelineError::ConfigInvalid(format!("reading {}: {e}", path.display())))?;
    let mut config: PipelineConfig = toml::from_str(&contents)
        .map_err(|e| PipelineError::ConfigInvalid(format!("parsing {}: {e}", path.display())))?;

    if let Ok(api_key) = std::env::var("YOUTUBE_API_KEY") {
        config.api_key = api_key;
    }
    if config.api_key.is_empty() {
        return Err(PipelineError::ConfigInvalid(
            "api_key is empty: set it in the config file or YOUTUBE_API_KEY".to_string(),
        ));
    }

    Ok(config)
}

/// Load the trusted-channel configuration document from `path`.
///
/// # Errors
/// Returns `PipelineError::ConfigInvalid` if the file cannot be read or is malformed
/// JSON.
pub fn load_trusted_channels(path: &Path) -> Result<TrustedChannelFile, PipelineError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| PipelineError::ConfigInvalid(format!("reading {}: {e}", path.display())))?;
    serde_json::from_str(&contents)
        .map_err(|e| PipelineError::ConfigInvalid(format!("parsing {}: {e}", path.display())))
}
